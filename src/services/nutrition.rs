//! Calorie and macro targets from a biometric profile.
//!
//! BMR uses Mifflin-St Jeor, scaled to TDEE by an activity multiplier and
//! shifted by the user's goal. Two macro splits exist:
//!
//! * [`settings_targets`]: fixed 30/40/30 calorie split. Used when a
//!   profile update recomputes the stored targets.
//! * [`preview_targets`]: 2 g protein per kg, 27.5% fat, carbs fill the
//!   rest. Used by the live profile preview.
//!
//! Both return [`DEFAULT_TARGETS`] when age, height, weight or gender is
//! missing.

use serde::Serialize;

use crate::models::user::{ActivityLevel, Gender, Goal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NutritionTargets {
    pub calories: i32,
    pub protein: i32,
    pub carbs: i32,
    pub fats: i32,
}

pub const DEFAULT_TARGETS: NutritionTargets = NutritionTargets {
    calories: 2000,
    protein: 150,
    carbs: 200,
    fats: 65,
};

const KCAL_PER_G_PROTEIN: f64 = 4.0;
const KCAL_PER_G_CARBS: f64 = 4.0;
const KCAL_PER_G_FAT: f64 = 9.0;

const WEIGHT_LOSS_DEFICIT: f64 = 500.0;
const MUSCLE_GAIN_SURPLUS: f64 = 300.0;

const PREVIEW_PROTEIN_G_PER_KG: f64 = 2.0;
const PREVIEW_FAT_SHARE: f64 = 0.275;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Biometrics {
    pub age: Option<f64>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub gender: Option<Gender>,
    pub activity_level: Option<ActivityLevel>,
    pub goal: Option<Goal>,
}

impl ActivityLevel {
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

/// Rounds half up, the way the web client does.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

fn round_i32(value: f64) -> i32 {
    round_half_up(value) as i32
}

struct Complete {
    age: f64,
    height_cm: f64,
    weight_kg: f64,
    gender: Gender,
}

impl Biometrics {
    fn complete(&self) -> Option<Complete> {
        // Zero counts as missing: the profile form sends 0 for blank inputs.
        let positive = |v: Option<f64>| v.filter(|x| *x > 0.0);
        Some(Complete {
            age: positive(self.age)?,
            height_cm: positive(self.height_cm)?,
            weight_kg: positive(self.weight_kg)?,
            gender: self.gender.clone()?,
        })
    }
}

pub fn bmr(weight_kg: f64, height_cm: f64, age: f64, gender: &Gender) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age;
    match gender {
        Gender::Male => base + 5.0,
        Gender::Female | Gender::Other => base - 161.0,
    }
}

pub fn tdee(bmr: f64, activity: Option<&ActivityLevel>) -> f64 {
    bmr * activity.unwrap_or(&ActivityLevel::Moderate).multiplier()
}

pub fn adjust_for_goal(tdee: f64, goal: Option<&Goal>) -> f64 {
    match goal {
        Some(Goal::WeightLoss) => tdee - WEIGHT_LOSS_DEFICIT,
        Some(Goal::MuscleGain) => tdee + MUSCLE_GAIN_SURPLUS,
        Some(Goal::Maintenance) | None => tdee,
    }
}

/// Goal-adjusted daily calories, unrounded. `None` when the profile is incomplete.
pub fn goal_calories(bio: &Biometrics) -> Option<f64> {
    let c = bio.complete()?;
    let bmr = bmr(c.weight_kg, c.height_cm, c.age, &c.gender);
    let tdee = tdee(bmr, bio.activity_level.as_ref());
    Some(adjust_for_goal(tdee, bio.goal.as_ref()))
}

pub fn settings_targets(bio: &Biometrics) -> NutritionTargets {
    let Some(calories) = goal_calories(bio) else {
        return DEFAULT_TARGETS;
    };
    let calories = round_half_up(calories);
    NutritionTargets {
        calories: calories as i32,
        protein: round_i32(calories * 0.30 / KCAL_PER_G_PROTEIN),
        carbs: round_i32(calories * 0.40 / KCAL_PER_G_CARBS),
        fats: round_i32(calories * 0.30 / KCAL_PER_G_FAT),
    }
}

pub fn preview_targets(bio: &Biometrics) -> NutritionTargets {
    let (Some(calories), Some(weight)) = (goal_calories(bio), bio.weight_kg) else {
        return DEFAULT_TARGETS;
    };
    let protein = round_half_up(weight * PREVIEW_PROTEIN_G_PER_KG);
    let fat_calories = calories * PREVIEW_FAT_SHARE;
    let remaining = calories - protein * KCAL_PER_G_PROTEIN - fat_calories;
    NutritionTargets {
        calories: round_i32(calories),
        protein: protein as i32,
        carbs: round_i32(remaining / KCAL_PER_G_CARBS),
        fats: round_i32(fat_calories / KCAL_PER_G_FAT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_male() -> Biometrics {
        Biometrics {
            age: Some(30.0),
            height_cm: Some(180.0),
            weight_kg: Some(80.0),
            gender: Some(Gender::Male),
            activity_level: Some(ActivityLevel::Moderate),
            goal: Some(Goal::Maintenance),
        }
    }

    #[test]
    fn test_bmr_and_tdee_reference_values() {
        let b = bmr(80.0, 180.0, 30.0, &Gender::Male);
        assert_eq!(b, 1780.0);
        assert!((tdee(b, Some(&ActivityLevel::Moderate)) - 2759.0).abs() < 1e-9);
        assert_eq!(settings_targets(&reference_male()).calories, 2759);
    }

    #[test]
    fn test_non_male_bmr_offset() {
        assert_eq!(bmr(60.0, 165.0, 25.0, &Gender::Female), 1345.25);
        assert_eq!(
            bmr(60.0, 165.0, 25.0, &Gender::Female),
            bmr(60.0, 165.0, 25.0, &Gender::Other)
        );
    }

    #[test]
    fn test_settings_split() {
        // 2759 kcal → 30/40/30
        let t = settings_targets(&reference_male());
        assert_eq!(t.protein, 207); // 827.7 / 4 = 206.9
        assert_eq!(t.carbs, 276); // 1103.6 / 4 = 275.9
        assert_eq!(t.fats, 92); // 827.7 / 9 = 91.97
    }

    #[test]
    fn test_preview_split() {
        let t = preview_targets(&reference_male());
        assert_eq!(t.calories, 2759);
        assert_eq!(t.protein, 160);
        assert_eq!(t.fats, 84); // 758.725 / 9 = 84.3
        assert_eq!(t.carbs, 340); // (2759 - 640 - 758.725) / 4 = 340.07
    }

    #[test]
    fn test_goal_adjustments() {
        let mut bio = reference_male();
        bio.goal = Some(Goal::WeightLoss);
        assert_eq!(settings_targets(&bio).calories, 2259);
        bio.goal = Some(Goal::MuscleGain);
        assert_eq!(settings_targets(&bio).calories, 3059);
    }

    #[test]
    fn test_missing_activity_uses_moderate() {
        let mut bio = reference_male();
        bio.activity_level = None;
        assert_eq!(settings_targets(&bio).calories, 2759);
        bio.activity_level = Some(ActivityLevel::Sedentary);
        assert_eq!(settings_targets(&bio).calories, 2136); // 1780 * 1.2
        bio.activity_level = Some(ActivityLevel::VeryActive);
        assert_eq!(settings_targets(&bio).calories, 3382);
    }

    #[test]
    fn test_any_missing_field_yields_defaults() {
        let strip: [fn(&mut Biometrics); 4] = [
            |b| b.age = None,
            |b| b.height_cm = None,
            |b| b.weight_kg = None,
            |b| b.gender = None,
        ];
        for f in strip {
            let mut bio = reference_male();
            f(&mut bio);
            assert_eq!(settings_targets(&bio), DEFAULT_TARGETS);
            assert_eq!(preview_targets(&bio), DEFAULT_TARGETS);
        }
    }

    #[test]
    fn test_zero_weight_treated_as_missing() {
        let mut bio = reference_male();
        bio.weight_kg = Some(0.0);
        assert_eq!(settings_targets(&bio), DEFAULT_TARGETS);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(2.49), 2.0);
        assert_eq!(round_half_up(-2.5), -2.0);
    }
}

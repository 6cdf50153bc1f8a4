//! Profile and settings payloads.
//!
//! Form clients send numbers as strings and unset selects as `""`, so every
//! field here accepts either form. Empty, zero and missing all mean "keep
//! the stored value".

use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::user::{ActivityLevel, DietPreference, Gender, Goal, User};
use crate::services::nutrition::{round_half_up, NutritionTargets};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid number: {}", s))),
    }
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.is_empty() => T::deserialize(s.into_deserializer()).map(Some),
        _ => Ok(None),
    }
}

/// PUT /api/users/profile and POST /api/users/profile/preview-targets.
/// Unknown fields (the client echoes the whole user back) are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub age: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub height: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub goal: Option<Goal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub diet_preference: Option<DietPreference>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub activity_level: Option<ActivityLevel>,
}

fn in_range(value: f64, min: f64, max: f64, field: &str) -> AppResult<f64> {
    if !(min..=max).contains(&value) {
        return Err(AppError::Validation(format!(
            "{} must be between {} and {}",
            field, min, max
        )));
    }
    Ok(value)
}

fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

impl UpdateProfileRequest {
    /// Merges the populated fields into `user`. Targets are left alone.
    pub fn apply(self, user: &mut User) -> AppResult<()> {
        if let Some(name) = self.name.filter(|n| !n.trim().is_empty()) {
            user.name = name.trim().to_string();
        }
        if let Some(age) = present(self.age) {
            user.age = Some(round_half_up(in_range(age, 1.0, 120.0, "Age")?) as i32);
        }
        if let Some(height) = present(self.height) {
            user.height = Some(in_range(height, 50.0, 300.0, "Height")?);
        }
        if let Some(weight) = present(self.weight) {
            user.weight = Some(in_range(weight, 20.0, 500.0, "Weight")?);
        }
        if let Some(gender) = self.gender {
            user.gender = Some(gender);
        }
        if let Some(goal) = self.goal {
            user.goal = goal;
        }
        if let Some(pref) = self.diet_preference {
            user.diet_preference = pref;
        }
        if let Some(level) = self.activity_level {
            user.activity_level = level;
        }
        Ok(())
    }
}

/// PUT /api/users/settings. Only positive values override.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[serde(default, deserialize_with = "lenient_number")]
    pub calorie_target: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub protein_target: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub carbs_target: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub fats_target: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub water_target: Option<f64>,
}

impl UpdateSettingsRequest {
    pub fn apply(&self, user: &mut User) {
        fn set(slot: &mut i32, value: Option<f64>) {
            if let Some(v) = value.filter(|v| *v > 0.0) {
                *slot = round_half_up(v) as i32;
            }
        }
        set(&mut user.calorie_target, self.calorie_target);
        set(&mut user.protein_target, self.protein_target);
        set(&mut user.carbs_target, self.carbs_target);
        set(&mut user.fats_target, self.fats_target);
        set(&mut user.water_target, self.water_target);
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TargetsResponse {
    pub calorie_target: i32,
    pub protein_target: i32,
    pub carbs_target: i32,
    pub fats_target: i32,
}

impl From<NutritionTargets> for TargetsResponse {
    fn from(t: NutritionTargets) -> Self {
        Self {
            calorie_target: t.calories,
            protein_target: t.protein,
            carbs_target: t.carbs,
            fats_target: t.fats,
        }
    }
}

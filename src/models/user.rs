use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::services::nutrition::{Biometrics, NutritionTargets, DEFAULT_TARGETS};

pub const DEFAULT_WATER_TARGET: i32 = 8;
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_id: Option<String>,
    pub profile_photo: String,
    pub age: Option<i32>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub gender: Option<Gender>,
    pub goal: Goal,
    pub diet_preference: DietPreference,
    pub activity_level: ActivityLevel,
    pub calorie_target: i32,
    pub protein_target: i32,
    pub carbs_target: i32,
    pub fats_target: i32,
    pub water_target: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn biometrics(&self) -> Biometrics {
        Biometrics {
            age: self.age.map(f64::from),
            height_cm: self.height,
            weight_kg: self.weight,
            gender: self.gender.clone(),
            activity_level: Some(self.activity_level.clone()),
            goal: Some(self.goal.clone()),
        }
    }

    pub fn targets(&self) -> NutritionTargets {
        NutritionTargets {
            calories: self.calorie_target,
            protein: self.protein_target,
            carbs: self.carbs_target,
            fats: self.fats_target,
        }
    }

    pub fn apply_targets(&mut self, targets: NutritionTargets) {
        self.calorie_target = targets.calories;
        self.protein_target = targets.protein;
        self.carbs_target = targets.carbs;
        self.fats_target = targets.fats;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "gender", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "goal", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    WeightLoss,
    MuscleGain,
    #[default]
    Maintenance,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "activity_level", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    #[default]
    Moderate,
    Active,
    VeryActive,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "diet_preference", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DietPreference {
    Vegetarian,
    #[default]
    NonVegetarian,
    Vegan,
}

/// A user ready to be persisted. Build through [`NewUser::with_password`]
/// or [`NewUser::with_google`]; at least one credential is always present.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub profile_photo: String,
}

impl NewUser {
    /// Normalizes the email and hashes the password before anything is stored.
    pub fn with_password(name: &str, email: &str, password: &str) -> AppResult<Self> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        let password_hash = hash_password(password)?;
        Self::build(name, email, Some(password_hash), None, String::new())
    }

    pub fn with_google(
        name: &str,
        email: &str,
        google_id: &str,
        profile_photo: Option<&str>,
    ) -> AppResult<Self> {
        if google_id.trim().is_empty() {
            return Err(AppError::Validation("Google id is required".into()));
        }
        Self::build(
            name,
            email,
            None,
            Some(google_id.to_string()),
            profile_photo.unwrap_or_default().to_string(),
        )
    }

    fn build(
        name: &str,
        email: &str,
        password_hash: Option<String>,
        google_id: Option<String>,
        profile_photo: String,
    ) -> AppResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Please provide a name".into()));
        }
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(AppError::Validation("Please provide an email".into()));
        }
        Ok(Self {
            name: name.to_string(),
            email,
            password_hash,
            google_id,
            profile_photo,
        })
    }

    /// The stored row a fresh account starts from.
    pub fn into_user(self, id: Uuid, now: DateTime<Utc>) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            google_id: self.google_id,
            profile_photo: self.profile_photo,
            age: None,
            height: None,
            weight: None,
            gender: None,
            goal: Goal::default(),
            diet_preference: DietPreference::default(),
            activity_level: ActivityLevel::default(),
            calorie_target: DEFAULT_TARGETS.calories,
            protein_target: DEFAULT_TARGETS.protein,
            carbs_target: DEFAULT_TARGETS.carbs,
            fats_target: DEFAULT_TARGETS.fats,
            water_target: DEFAULT_WATER_TARGET,
            created_at: now,
            updated_at: now,
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::services::portion::EntryNutrition;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DietEntry {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_id: Uuid,
    pub food_name: String,
    #[sqlx(rename = "entry_date")]
    pub date: NaiveDate,
    pub category: MealCategory,
    pub quantity: f64,
    pub unit: PortionUnit,
    pub calories: i32,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub completed: bool,
    pub photo_url: String,
    pub ai_detected: bool,
    pub confidence: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DietEntry {
    pub fn apply_nutrition(&mut self, nutrition: EntryNutrition) {
        self.calories = nutrition.calories;
        self.protein = nutrition.protein;
        self.carbs = nutrition.carbs;
        self.fats = nutrition.fats;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, PartialOrd, Ord)]
#[sqlx(type_name = "meal_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MealCategory {
    Breakfast,
    Lunch,
    Snacks,
    Dinner,
}

impl MealCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealCategory::Breakfast => "breakfast",
            MealCategory::Lunch => "lunch",
            MealCategory::Snacks => "snacks",
            MealCategory::Dinner => "dinner",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "portion_unit", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PortionUnit {
    #[default]
    Grams,
    Pieces,
    Ml,
    Cups,
}

#[derive(Debug, Clone)]
pub struct NewDietEntry {
    pub user_id: Uuid,
    pub food_id: Uuid,
    pub food_name: String,
    pub date: NaiveDate,
    pub category: MealCategory,
    pub quantity: f64,
    pub unit: PortionUnit,
    pub nutrition: EntryNutrition,
    pub photo_url: String,
    pub ai_detected: bool,
    pub confidence: Option<f64>,
}

impl NewDietEntry {
    pub fn into_entry(self, id: Uuid, now: DateTime<Utc>) -> DietEntry {
        DietEntry {
            id,
            user_id: self.user_id,
            food_id: self.food_id,
            food_name: self.food_name,
            date: self.date,
            category: self.category,
            quantity: self.quantity,
            unit: self.unit,
            calories: self.nutrition.calories,
            protein: self.nutrition.protein,
            carbs: self.nutrition.carbs,
            fats: self.nutrition.fats,
            completed: false,
            photo_url: self.photo_url,
            ai_detected: self.ai_detected,
            confidence: self.confidence,
            created_at: now,
            updated_at: now,
        }
    }
}

/// POST /api/diet/entries
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDietEntryRequest {
    pub food_id: Uuid,
    pub food_name: Option<String>,
    #[serde(deserialize_with = "crate::models::day::deserialize")]
    pub date: NaiveDate,
    pub category: MealCategory,
    #[validate(range(min = 0.0, message = "Quantity cannot be negative"))]
    pub quantity: f64,
    pub unit: Option<PortionUnit>,
    pub photo_url: Option<String>,
    pub ai_detected: Option<bool>,
    #[validate(range(min = 0.0, max = 100.0, message = "Confidence must be between 0 and 100"))]
    pub confidence: Option<f64>,
}

/// PUT /api/diet/entries/:id
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDietEntryRequest {
    #[validate(range(min = 0.0, message = "Quantity cannot be negative"))]
    pub quantity: Option<f64>,
    pub category: Option<MealCategory>,
    pub completed: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietEntryQuery {
    #[serde(default, deserialize_with = "crate::models::day::deserialize_opt")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "crate::models::day::deserialize_opt")]
    pub end_date: Option<NaiveDate>,
    pub category: Option<MealCategory>,
}

/// Store-level filter. Every query is scoped to one owner.
#[derive(Debug, Clone, Default)]
pub struct DietEntryFilter {
    pub range: Option<crate::models::day::DayRange>,
    pub category: Option<MealCategory>,
    pub completed_only: bool,
}

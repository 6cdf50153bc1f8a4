use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::services::portion::Per100g;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub category: FoodCategory,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub fiber: f64,
    pub user_id: Option<Uuid>,
    pub is_custom: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Food {
    pub fn per_100g(&self) -> Per100g {
        Per100g {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fats: self.fats,
        }
    }

    /// Default foods are shared; custom foods belong to one user.
    pub fn is_visible_to(&self, user_id: Uuid) -> bool {
        !self.is_custom || self.user_id == Some(user_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "food_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FoodCategory {
    Breakfast,
    Lunch,
    Snacks,
    Dinner,
    #[default]
    Other,
}

#[derive(Debug, Clone)]
pub struct NewFood {
    pub name: String,
    pub category: FoodCategory,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub fiber: f64,
    /// `None` for the shared default catalogue.
    pub owner: Option<Uuid>,
}

impl NewFood {
    pub fn into_food(self, id: Uuid, now: DateTime<Utc>) -> Food {
        Food {
            id,
            name: self.name,
            category: self.category,
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fats: self.fats,
            fiber: self.fiber,
            is_custom: self.owner.is_some(),
            user_id: self.owner,
            created_at: now,
            updated_at: now,
        }
    }
}

/// POST /api/foods
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFoodRequest {
    #[validate(length(min = 1, max = 200, message = "Food name is required"))]
    pub name: String,
    pub category: Option<FoodCategory>,
    #[validate(range(min = 0.0, message = "Calories cannot be negative"))]
    pub calories: f64,
    #[validate(range(min = 0.0, message = "Protein cannot be negative"))]
    pub protein: f64,
    #[validate(range(min = 0.0, message = "Carbs cannot be negative"))]
    pub carbs: f64,
    #[validate(range(min = 0.0, message = "Fats cannot be negative"))]
    pub fats: f64,
    #[validate(range(min = 0.0, message = "Fiber cannot be negative"))]
    pub fiber: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FoodListQuery {
    pub category: Option<FoodCategory>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FoodSearchQuery {
    pub q: Option<String>,
}

/// Store-level filter over the foods visible to one user.
#[derive(Debug, Clone, Default)]
pub struct FoodFilter {
    pub category: Option<FoodCategory>,
    pub name_contains: Option<String>,
    pub limit: Option<i64>,
}

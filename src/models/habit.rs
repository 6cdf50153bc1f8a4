use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_HABIT_ICON: &str = "✓";
pub const DEFAULT_HABIT_COLOR: &str = "#3b82f6";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewHabit {
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub color: String,
}

impl NewHabit {
    pub fn into_habit(self, id: Uuid, now: DateTime<Utc>) -> Habit {
        Habit {
            id,
            user_id: self.user_id,
            name: self.name,
            description: self.description,
            icon: self.icon,
            color: self.color,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HabitEntry {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub habit_id: Uuid,
    #[sqlx(rename = "entry_date")]
    pub date: NaiveDate,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateHabitRequest {
    #[validate(length(min = 1, max = 200, message = "Habit name is required"))]
    pub name: String,
    #[validate(length(max = 2000, message = "Description must be under 2000 characters"))]
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

/// PUT /api/habits/:id; empty strings keep the stored value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateHabitRequest {
    #[validate(length(max = 200, message = "Habit name must be under 200 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 2000, message = "Description must be under 2000 characters"))]
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl UpdateHabitRequest {
    pub fn apply(self, habit: &mut Habit) {
        fn merge(slot: &mut String, value: Option<String>) {
            if let Some(v) = value.filter(|v| !v.is_empty()) {
                *slot = v;
            }
        }
        merge(&mut habit.name, self.name);
        merge(&mut habit.description, self.description);
        merge(&mut habit.icon, self.icon);
        merge(&mut habit.color, self.color);
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitEntryQuery {
    #[serde(default, deserialize_with = "crate::models::day::deserialize_opt")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "crate::models::day::deserialize_opt")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StreakResponse {
    pub current_streak: u32,
    pub best_streak: u32,
}

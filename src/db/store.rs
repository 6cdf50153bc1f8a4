use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::day::DayRange;
use crate::models::diet_entry::{DietEntry, DietEntryFilter, NewDietEntry};
use crate::models::food::{Food, FoodFilter, NewFood};
use crate::models::habit::{Habit, HabitEntry, NewHabit};
use crate::models::user::{NewUser, User};
use crate::models::water::WaterIntake;

/// Record store behind every handler.
///
/// Methods taking a `user_id` only ever see rows owned by that user, so a
/// lookup of someone else's record behaves exactly like a missing record.
#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap connectivity probe for readiness checks.
    async fn ping(&self) -> AppResult<()>;

    /// Releases connections. Called once on shutdown.
    async fn close(&self);

    // ── Users ────────────────────────────────────────────────────────────

    /// Fails with `Conflict` when the email is taken.
    async fn create_user(&self, user: NewUser) -> AppResult<User>;

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Persists every mutable column of `user` and bumps `updated_at`.
    async fn save_user(&self, user: &User) -> AppResult<User>;

    // ── Foods ────────────────────────────────────────────────────────────

    async fn insert_food(&self, food: NewFood) -> AppResult<Food>;

    /// Default foods plus the user's own custom foods, sorted by name.
    async fn list_foods(&self, user_id: Uuid, filter: &FoodFilter) -> AppResult<Vec<Food>>;

    async fn find_visible_food(&self, user_id: Uuid, food_id: Uuid) -> AppResult<Option<Food>>;

    async fn count_default_foods(&self) -> AppResult<i64>;

    // ── Diet entries ─────────────────────────────────────────────────────

    async fn insert_diet_entry(&self, entry: NewDietEntry) -> AppResult<DietEntry>;

    /// Sorted by date descending, then meal category.
    async fn list_diet_entries(
        &self,
        user_id: Uuid,
        filter: &DietEntryFilter,
    ) -> AppResult<Vec<DietEntry>>;

    async fn find_diet_entry(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<DietEntry>>;

    async fn save_diet_entry(&self, entry: &DietEntry) -> AppResult<DietEntry>;

    /// Returns whether a row was removed.
    async fn delete_diet_entry(&self, user_id: Uuid, id: Uuid) -> AppResult<bool>;

    // ── Habits ───────────────────────────────────────────────────────────

    async fn insert_habit(&self, habit: NewHabit) -> AppResult<Habit>;

    /// Active habits by creation time.
    async fn list_active_habits(&self, user_id: Uuid) -> AppResult<Vec<Habit>>;

    async fn find_habit(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Habit>>;

    async fn save_habit(&self, habit: &Habit) -> AppResult<Habit>;

    /// Ascending by date.
    async fn list_habit_entries(
        &self,
        user_id: Uuid,
        habit_id: Uuid,
        range: Option<DayRange>,
    ) -> AppResult<Vec<HabitEntry>>;

    /// Creates a completed entry for the day, or flips an existing one.
    async fn toggle_habit_entry(
        &self,
        user_id: Uuid,
        habit_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<HabitEntry>;

    /// Days with a completed entry, newest first.
    async fn completed_habit_days(&self, user_id: Uuid, habit_id: Uuid) -> AppResult<Vec<NaiveDate>>;

    // ── Water ────────────────────────────────────────────────────────────

    /// Adds `glasses` to the day's log, creating it with `target` if absent.
    async fn add_water(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        glasses: i32,
        target: i32,
    ) -> AppResult<WaterIntake>;

    async fn find_water_for_day(&self, user_id: Uuid, date: NaiveDate) -> AppResult<Option<WaterIntake>>;

    /// Newest first.
    async fn list_water(&self, user_id: Uuid, range: Option<DayRange>) -> AppResult<Vec<WaterIntake>>;

    async fn set_water_glasses(
        &self,
        user_id: Uuid,
        id: Uuid,
        glasses: i32,
    ) -> AppResult<Option<WaterIntake>>;
}

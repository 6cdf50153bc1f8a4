use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::store::Store;
use crate::error::{AppError, AppResult};
use crate::models::day::DayRange;
use crate::models::diet_entry::{DietEntry, DietEntryFilter, NewDietEntry};
use crate::models::food::{Food, FoodFilter, NewFood};
use crate::models::habit::{Habit, HabitEntry, NewHabit};
use crate::models::user::{normalize_email, NewUser, User};
use crate::models::water::WaterIntake;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// SQLSTATE `numeric_value_out_of_range`.
const NUMERIC_OUT_OF_RANGE: &str = "22003";

fn is_out_of_range(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(NUMERIC_OUT_OF_RANGE),
        _ => false,
    }
}

fn is_check_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_check_violation())
}

/// Maps constraint failures onto client errors; everything else stays a 500.
fn map_write_error(e: sqlx::Error, conflict: &str) -> AppError {
    if is_out_of_range(&e) {
        return AppError::Validation("Value out of range".into());
    }
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::Conflict(conflict.to_string());
        }
        if db_err.is_check_violation() {
            return AppError::Validation(db_err.message().to_string());
        }
    }
    AppError::Database(e)
}

fn like_pattern(raw: &str) -> String {
    let escaped = raw
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let u = user.into_user(Uuid::new_v4(), Utc::now());
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                id, name, email, password_hash, google_id, profile_photo,
                goal, diet_preference, activity_level,
                calorie_target, protein_target, carbs_target, fats_target, water_target
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(u.id)
        .bind(&u.name)
        .bind(&u.email)
        .bind(&u.password_hash)
        .bind(&u.google_id)
        .bind(&u.profile_photo)
        .bind(&u.goal)
        .bind(&u.diet_preference)
        .bind(&u.activity_level)
        .bind(u.calorie_target)
        .bind(u.protein_target)
        .bind(u.carbs_target)
        .bind(u.fats_target)
        .bind(u.water_target)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "User already exists"))
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn save_user(&self, user: &User) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = $2,
                google_id = $3,
                profile_photo = $4,
                age = $5,
                height = $6,
                weight = $7,
                gender = $8,
                goal = $9,
                diet_preference = $10,
                activity_level = $11,
                calorie_target = $12,
                protein_target = $13,
                carbs_target = $14,
                fats_target = $15,
                water_target = $16,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.google_id)
        .bind(&user.profile_photo)
        .bind(user.age)
        .bind(user.height)
        .bind(user.weight)
        .bind(&user.gender)
        .bind(&user.goal)
        .bind(&user.diet_preference)
        .bind(&user.activity_level)
        .bind(user.calorie_target)
        .bind(user.protein_target)
        .bind(user.carbs_target)
        .bind(user.fats_target)
        .bind(user.water_target)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Google account already linked"))?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    async fn insert_food(&self, food: NewFood) -> AppResult<Food> {
        let f = food.into_food(Uuid::new_v4(), Utc::now());
        sqlx::query_as::<_, Food>(
            r#"
            INSERT INTO foods (id, name, category, calories, protein, carbs, fats, fiber, user_id, is_custom)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(f.id)
        .bind(&f.name)
        .bind(&f.category)
        .bind(f.calories)
        .bind(f.protein)
        .bind(f.carbs)
        .bind(f.fats)
        .bind(f.fiber)
        .bind(f.user_id)
        .bind(f.is_custom)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Food already exists"))
    }

    async fn list_foods(&self, user_id: Uuid, filter: &FoodFilter) -> AppResult<Vec<Food>> {
        let pattern = filter.name_contains.as_deref().map(like_pattern);
        Ok(sqlx::query_as::<_, Food>(
            r#"
            SELECT * FROM foods
            WHERE (is_custom = false OR user_id = $1)
              AND ($2::food_category IS NULL OR category = $2)
              AND ($3::text IS NULL OR name ILIKE $3)
            ORDER BY name ASC
            LIMIT $4
            "#,
        )
        .bind(user_id)
        .bind(&filter.category)
        .bind(pattern)
        .bind(filter.limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_visible_food(&self, user_id: Uuid, food_id: Uuid) -> AppResult<Option<Food>> {
        Ok(sqlx::query_as::<_, Food>(
            "SELECT * FROM foods WHERE id = $1 AND (is_custom = false OR user_id = $2)",
        )
        .bind(food_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn count_default_foods(&self) -> AppResult<i64> {
        Ok(
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM foods WHERE is_custom = false")
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn insert_diet_entry(&self, entry: NewDietEntry) -> AppResult<DietEntry> {
        let e = entry.into_entry(Uuid::new_v4(), Utc::now());
        sqlx::query_as::<_, DietEntry>(
            r#"
            INSERT INTO diet_entries (
                id, user_id, food_id, food_name, entry_date, category, quantity, unit,
                calories, protein, carbs, fats, completed, photo_url, ai_detected, confidence
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(e.id)
        .bind(e.user_id)
        .bind(e.food_id)
        .bind(&e.food_name)
        .bind(e.date)
        .bind(&e.category)
        .bind(e.quantity)
        .bind(&e.unit)
        .bind(e.calories)
        .bind(e.protein)
        .bind(e.carbs)
        .bind(e.fats)
        .bind(e.completed)
        .bind(&e.photo_url)
        .bind(e.ai_detected)
        .bind(e.confidence)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Entry already exists"))
    }

    async fn list_diet_entries(
        &self,
        user_id: Uuid,
        filter: &DietEntryFilter,
    ) -> AppResult<Vec<DietEntry>> {
        Ok(sqlx::query_as::<_, DietEntry>(
            r#"
            SELECT * FROM diet_entries
            WHERE user_id = $1
              AND ($2::date IS NULL OR entry_date >= $2)
              AND ($3::date IS NULL OR entry_date <= $3)
              AND ($4::meal_category IS NULL OR category = $4)
              AND ($5 = false OR completed = true)
            ORDER BY entry_date DESC, category::text ASC
            "#,
        )
        .bind(user_id)
        .bind(filter.range.map(|r| r.start))
        .bind(filter.range.map(|r| r.end))
        .bind(&filter.category)
        .bind(filter.completed_only)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_diet_entry(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<DietEntry>> {
        Ok(sqlx::query_as::<_, DietEntry>(
            "SELECT * FROM diet_entries WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn save_diet_entry(&self, entry: &DietEntry) -> AppResult<DietEntry> {
        sqlx::query_as::<_, DietEntry>(
            r#"
            UPDATE diet_entries SET
                category = $3,
                quantity = $4,
                calories = $5,
                protein = $6,
                carbs = $7,
                fats = $8,
                completed = $9,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(&entry.category)
        .bind(entry.quantity)
        .bind(entry.calories)
        .bind(entry.protein)
        .bind(entry.carbs)
        .bind(entry.fats)
        .bind(entry.completed)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Entry already exists"))?
        .ok_or_else(|| AppError::NotFound("Entry not found".into()))
    }

    async fn delete_diet_entry(&self, user_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM diet_entries WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_habit(&self, habit: NewHabit) -> AppResult<Habit> {
        let h = habit.into_habit(Uuid::new_v4(), Utc::now());
        Ok(sqlx::query_as::<_, Habit>(
            r#"
            INSERT INTO habits (id, user_id, name, description, icon, color, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(h.id)
        .bind(h.user_id)
        .bind(&h.name)
        .bind(&h.description)
        .bind(&h.icon)
        .bind(&h.color)
        .bind(h.active)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_active_habits(&self, user_id: Uuid) -> AppResult<Vec<Habit>> {
        Ok(sqlx::query_as::<_, Habit>(
            r#"
            SELECT * FROM habits
            WHERE user_id = $1 AND active = true
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_habit(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Habit>> {
        Ok(
            sqlx::query_as::<_, Habit>("SELECT * FROM habits WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn save_habit(&self, habit: &Habit) -> AppResult<Habit> {
        sqlx::query_as::<_, Habit>(
            r#"
            UPDATE habits SET
                name = $3,
                description = $4,
                icon = $5,
                color = $6,
                active = $7,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(habit.id)
        .bind(habit.user_id)
        .bind(&habit.name)
        .bind(&habit.description)
        .bind(&habit.icon)
        .bind(&habit.color)
        .bind(habit.active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Habit not found".into()))
    }

    async fn list_habit_entries(
        &self,
        user_id: Uuid,
        habit_id: Uuid,
        range: Option<DayRange>,
    ) -> AppResult<Vec<HabitEntry>> {
        Ok(sqlx::query_as::<_, HabitEntry>(
            r#"
            SELECT * FROM habit_entries
            WHERE user_id = $1 AND habit_id = $2
              AND ($3::date IS NULL OR entry_date >= $3)
              AND ($4::date IS NULL OR entry_date <= $4)
            ORDER BY entry_date ASC
            "#,
        )
        .bind(user_id)
        .bind(habit_id)
        .bind(range.map(|r| r.start))
        .bind(range.map(|r| r.end))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn toggle_habit_entry(
        &self,
        user_id: Uuid,
        habit_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<HabitEntry> {
        // Single statement: concurrent toggles serialize on the unique key.
        Ok(sqlx::query_as::<_, HabitEntry>(
            r#"
            INSERT INTO habit_entries (id, user_id, habit_id, entry_date, completed)
            VALUES ($1, $2, $3, $4, true)
            ON CONFLICT (user_id, habit_id, entry_date) DO UPDATE SET
                completed = NOT habit_entries.completed,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(habit_id)
        .bind(date)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn completed_habit_days(&self, user_id: Uuid, habit_id: Uuid) -> AppResult<Vec<NaiveDate>> {
        Ok(sqlx::query_scalar::<_, NaiveDate>(
            r#"
            SELECT entry_date FROM habit_entries
            WHERE user_id = $1 AND habit_id = $2 AND completed = true
            ORDER BY entry_date DESC
            "#,
        )
        .bind(user_id)
        .bind(habit_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn add_water(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        glasses: i32,
        target: i32,
    ) -> AppResult<WaterIntake> {
        sqlx::query_as::<_, WaterIntake>(
            r#"
            INSERT INTO water_intake (id, user_id, log_date, glasses, target)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, log_date) DO UPDATE SET
                glasses = water_intake.glasses + EXCLUDED.glasses,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(date)
        .bind(glasses)
        .bind(target)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_out_of_range(&e) {
                AppError::Validation("Glasses out of range".into())
            } else if is_check_violation(&e) {
                AppError::Validation("Glasses cannot be negative".into())
            } else {
                map_write_error(e, "Water log already exists")
            }
        })
    }

    async fn find_water_for_day(&self, user_id: Uuid, date: NaiveDate) -> AppResult<Option<WaterIntake>> {
        Ok(sqlx::query_as::<_, WaterIntake>(
            "SELECT * FROM water_intake WHERE user_id = $1 AND log_date = $2",
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_water(&self, user_id: Uuid, range: Option<DayRange>) -> AppResult<Vec<WaterIntake>> {
        Ok(sqlx::query_as::<_, WaterIntake>(
            r#"
            SELECT * FROM water_intake
            WHERE user_id = $1
              AND ($2::date IS NULL OR log_date >= $2)
              AND ($3::date IS NULL OR log_date <= $3)
            ORDER BY log_date DESC
            "#,
        )
        .bind(user_id)
        .bind(range.map(|r| r.start))
        .bind(range.map(|r| r.end))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn set_water_glasses(
        &self,
        user_id: Uuid,
        id: Uuid,
        glasses: i32,
    ) -> AppResult<Option<WaterIntake>> {
        sqlx::query_as::<_, WaterIntake>(
            r#"
            UPDATE water_intake SET glasses = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(glasses)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Water log already exists"))
    }
}

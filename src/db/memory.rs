//! In-process [`Store`] used by tests and for running the API without
//! PostgreSQL. Everything lives behind one lock, so toggles and increments
//! are atomic here too.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::store::Store;
use crate::error::{AppError, AppResult};
use crate::models::day::DayRange;
use crate::models::diet_entry::{DietEntry, DietEntryFilter, NewDietEntry};
use crate::models::food::{Food, FoodFilter, NewFood};
use crate::models::habit::{Habit, HabitEntry, NewHabit};
use crate::models::user::{normalize_email, NewUser, User};
use crate::models::water::WaterIntake;

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    foods: HashMap<Uuid, Food>,
    diet_entries: HashMap<Uuid, DietEntry>,
    habits: HashMap<Uuid, Habit>,
    habit_entries: HashMap<(Uuid, Uuid, NaiveDate), HabitEntry>,
    water: HashMap<(Uuid, NaiveDate), WaterIntake>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn close(&self) {}

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let mut db = self.inner.write().await;
        if db.users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("User already exists".into()));
        }
        let user = user.into_user(Uuid::new_v4(), Utc::now());
        db.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = normalize_email(email);
        Ok(self
            .inner
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn save_user(&self, user: &User) -> AppResult<User> {
        let mut db = self.inner.write().await;
        let slot = db
            .users
            .get_mut(&user.id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        *slot = User {
            updated_at: Utc::now(),
            ..user.clone()
        };
        Ok(slot.clone())
    }

    async fn insert_food(&self, food: NewFood) -> AppResult<Food> {
        let food = food.into_food(Uuid::new_v4(), Utc::now());
        self.inner.write().await.foods.insert(food.id, food.clone());
        Ok(food)
    }

    async fn list_foods(&self, user_id: Uuid, filter: &FoodFilter) -> AppResult<Vec<Food>> {
        let db = self.inner.read().await;
        let mut foods: Vec<Food> = db
            .foods
            .values()
            .filter(|f| f.is_visible_to(user_id))
            .filter(|f| filter.category.as_ref().map_or(true, |c| &f.category == c))
            .filter(|f| {
                filter
                    .name_contains
                    .as_deref()
                    .map_or(true, |q| contains_ignore_case(&f.name, q))
            })
            .cloned()
            .collect();
        foods.sort_by(|a, b| a.name.cmp(&b.name));
        if let Some(limit) = filter.limit {
            foods.truncate(limit.max(0) as usize);
        }
        Ok(foods)
    }

    async fn find_visible_food(&self, user_id: Uuid, food_id: Uuid) -> AppResult<Option<Food>> {
        Ok(self
            .inner
            .read()
            .await
            .foods
            .get(&food_id)
            .filter(|f| f.is_visible_to(user_id))
            .cloned())
    }

    async fn count_default_foods(&self) -> AppResult<i64> {
        let db = self.inner.read().await;
        Ok(db.foods.values().filter(|f| !f.is_custom).count() as i64)
    }

    async fn insert_diet_entry(&self, entry: NewDietEntry) -> AppResult<DietEntry> {
        let entry = entry.into_entry(Uuid::new_v4(), Utc::now());
        self.inner
            .write()
            .await
            .diet_entries
            .insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn list_diet_entries(
        &self,
        user_id: Uuid,
        filter: &DietEntryFilter,
    ) -> AppResult<Vec<DietEntry>> {
        let db = self.inner.read().await;
        let mut entries: Vec<DietEntry> = db
            .diet_entries
            .values()
            .filter(|e| e.user_id == user_id)
            .filter(|e| filter.range.map_or(true, |r| r.contains(e.date)))
            .filter(|e| filter.category.as_ref().map_or(true, |c| &e.category == c))
            .filter(|e| !filter.completed_only || e.completed)
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| a.category.as_str().cmp(b.category.as_str()))
        });
        Ok(entries)
    }

    async fn find_diet_entry(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<DietEntry>> {
        Ok(self
            .inner
            .read()
            .await
            .diet_entries
            .get(&id)
            .filter(|e| e.user_id == user_id)
            .cloned())
    }

    async fn save_diet_entry(&self, entry: &DietEntry) -> AppResult<DietEntry> {
        let mut db = self.inner.write().await;
        let slot = db
            .diet_entries
            .get_mut(&entry.id)
            .filter(|e| e.user_id == entry.user_id)
            .ok_or_else(|| AppError::NotFound("Entry not found".into()))?;
        *slot = DietEntry {
            updated_at: Utc::now(),
            ..entry.clone()
        };
        Ok(slot.clone())
    }

    async fn delete_diet_entry(&self, user_id: Uuid, id: Uuid) -> AppResult<bool> {
        let mut db = self.inner.write().await;
        match db.diet_entries.get(&id) {
            Some(e) if e.user_id == user_id => {
                db.diet_entries.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn insert_habit(&self, habit: NewHabit) -> AppResult<Habit> {
        let habit = habit.into_habit(Uuid::new_v4(), Utc::now());
        self.inner
            .write()
            .await
            .habits
            .insert(habit.id, habit.clone());
        Ok(habit)
    }

    async fn list_active_habits(&self, user_id: Uuid) -> AppResult<Vec<Habit>> {
        let db = self.inner.read().await;
        let mut habits: Vec<Habit> = db
            .habits
            .values()
            .filter(|h| h.user_id == user_id && h.active)
            .cloned()
            .collect();
        habits.sort_by_key(|h| h.created_at);
        Ok(habits)
    }

    async fn find_habit(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Habit>> {
        Ok(self
            .inner
            .read()
            .await
            .habits
            .get(&id)
            .filter(|h| h.user_id == user_id)
            .cloned())
    }

    async fn save_habit(&self, habit: &Habit) -> AppResult<Habit> {
        let mut db = self.inner.write().await;
        let slot = db
            .habits
            .get_mut(&habit.id)
            .filter(|h| h.user_id == habit.user_id)
            .ok_or_else(|| AppError::NotFound("Habit not found".into()))?;
        *slot = Habit {
            updated_at: Utc::now(),
            ..habit.clone()
        };
        Ok(slot.clone())
    }

    async fn list_habit_entries(
        &self,
        user_id: Uuid,
        habit_id: Uuid,
        range: Option<DayRange>,
    ) -> AppResult<Vec<HabitEntry>> {
        let db = self.inner.read().await;
        let mut entries: Vec<HabitEntry> = db
            .habit_entries
            .values()
            .filter(|e| e.user_id == user_id && e.habit_id == habit_id)
            .filter(|e| range.map_or(true, |r| r.contains(e.date)))
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.date);
        Ok(entries)
    }

    async fn toggle_habit_entry(
        &self,
        user_id: Uuid,
        habit_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<HabitEntry> {
        let mut db = self.inner.write().await;
        let now = Utc::now();
        let entry = db
            .habit_entries
            .entry((user_id, habit_id, date))
            .and_modify(|e| {
                e.completed = !e.completed;
                e.updated_at = now;
            })
            .or_insert_with(|| HabitEntry {
                id: Uuid::new_v4(),
                user_id,
                habit_id,
                date,
                completed: true,
                created_at: now,
                updated_at: now,
            });
        Ok(entry.clone())
    }

    async fn completed_habit_days(&self, user_id: Uuid, habit_id: Uuid) -> AppResult<Vec<NaiveDate>> {
        let db = self.inner.read().await;
        let mut days: Vec<NaiveDate> = db
            .habit_entries
            .values()
            .filter(|e| e.user_id == user_id && e.habit_id == habit_id && e.completed)
            .map(|e| e.date)
            .collect();
        days.sort_unstable_by(|a, b| b.cmp(a));
        Ok(days)
    }

    async fn add_water(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        glasses: i32,
        target: i32,
    ) -> AppResult<WaterIntake> {
        let mut db = self.inner.write().await;
        let current = db.water.get(&(user_id, date)).map_or(0, |w| w.glasses);
        let total = current
            .checked_add(glasses)
            .ok_or_else(|| AppError::Validation("Glasses out of range".into()))?;
        if total < 0 {
            return Err(AppError::Validation("Glasses cannot be negative".into()));
        }
        let now = Utc::now();
        let log = db
            .water
            .entry((user_id, date))
            .and_modify(|w| {
                w.glasses = total;
                w.updated_at = now;
            })
            .or_insert_with(|| WaterIntake {
                id: Uuid::new_v4(),
                user_id,
                date,
                glasses,
                target,
                created_at: now,
                updated_at: now,
            });
        Ok(log.clone())
    }

    async fn find_water_for_day(&self, user_id: Uuid, date: NaiveDate) -> AppResult<Option<WaterIntake>> {
        Ok(self.inner.read().await.water.get(&(user_id, date)).cloned())
    }

    async fn list_water(&self, user_id: Uuid, range: Option<DayRange>) -> AppResult<Vec<WaterIntake>> {
        let db = self.inner.read().await;
        let mut logs: Vec<WaterIntake> = db
            .water
            .values()
            .filter(|w| w.user_id == user_id)
            .filter(|w| range.map_or(true, |r| r.contains(w.date)))
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(logs)
    }

    async fn set_water_glasses(
        &self,
        user_id: Uuid,
        id: Uuid,
        glasses: i32,
    ) -> AppResult<Option<WaterIntake>> {
        let mut db = self.inner.write().await;
        let log = db
            .water
            .values_mut()
            .find(|w| w.id == id && w.user_id == user_id);
        Ok(log.map(|w| {
            w.glasses = glasses;
            w.updated_at = Utc::now();
            w.clone()
        }))
    }
}

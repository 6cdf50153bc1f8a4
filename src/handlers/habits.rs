use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::extract::Path;
use crate::models::day::{require_day, today, DayRange};
use crate::models::habit::{
    CreateHabitRequest, Habit, HabitEntry, HabitEntryQuery, NewHabit, StreakResponse,
    UpdateHabitRequest, DEFAULT_HABIT_COLOR, DEFAULT_HABIT_ICON,
};
use crate::services::streak;
use crate::AppState;

async fn owned_habit(state: &AppState, user_id: Uuid, habit_id: Uuid) -> AppResult<Habit> {
    state
        .store
        .find_habit(user_id, habit_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Habit not found".into()))
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

pub async fn list_habits(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Habit>>> {
    Ok(Json(state.store.list_active_habits(auth_user.id).await?))
}

pub async fn create_habit(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateHabitRequest>,
) -> AppResult<(StatusCode, Json<Habit>)> {
    body.validate()?;
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("Habit name is required".into()));
    }

    let habit = state
        .store
        .insert_habit(NewHabit {
            user_id: auth_user.id,
            name: body.name.trim().to_string(),
            description: body.description.unwrap_or_default(),
            icon: or_default(body.icon, DEFAULT_HABIT_ICON),
            color: or_default(body.color, DEFAULT_HABIT_COLOR),
        })
        .await?;
    tracing::debug!(user_id = %auth_user.id, habit_id = %habit.id, "Habit created");

    Ok((StatusCode::CREATED, Json(habit)))
}

pub async fn update_habit(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<Uuid>,
    Json(body): Json<UpdateHabitRequest>,
) -> AppResult<Json<Habit>> {
    body.validate()?;

    let mut habit = owned_habit(&state, auth_user.id, habit_id).await?;
    body.apply(&mut habit);

    Ok(Json(state.store.save_habit(&habit).await?))
}

/// Soft delete: the habit disappears from listings but its history stays.
pub async fn delete_habit(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let mut habit = owned_habit(&state, auth_user.id, habit_id).await?;
    habit.active = false;
    state.store.save_habit(&habit).await?;

    Ok(Json(json!({ "message": "Habit deleted" })))
}

pub async fn list_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<Uuid>,
    Query(query): Query<HabitEntryQuery>,
) -> AppResult<Json<Vec<HabitEntry>>> {
    let habit = owned_habit(&state, auth_user.id, habit_id).await?;
    let range = DayRange::from_bounds(query.start_date, query.end_date);

    Ok(Json(
        state
            .store
            .list_habit_entries(auth_user.id, habit.id, range)
            .await?,
    ))
}

pub async fn toggle_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((habit_id, date)): Path<(Uuid, String)>,
) -> AppResult<Json<HabitEntry>> {
    let day = require_day(&date)?;
    let habit = owned_habit(&state, auth_user.id, habit_id).await?;

    let entry = state
        .store
        .toggle_habit_entry(auth_user.id, habit.id, day)
        .await?;
    tracing::debug!(
        user_id = %auth_user.id,
        habit_id = %habit.id,
        date = %day,
        completed = entry.completed,
        "Habit entry toggled"
    );

    Ok(Json(entry))
}

pub async fn get_streak(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<Uuid>,
) -> AppResult<Json<StreakResponse>> {
    let habit = owned_habit(&state, auth_user.id, habit_id).await?;
    let days = state
        .store
        .completed_habit_days(auth_user.id, habit.id)
        .await?;
    let s = streak::compute(&days, today());

    Ok(Json(StreakResponse {
        current_streak: s.current,
        best_streak: s.best,
    }))
}

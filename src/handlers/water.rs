use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::extract::Path;
use crate::models::day::{today, DayRange};
use crate::models::water::{
    EmptyWaterDay, LogWaterRequest, UpdateWaterRequest, WaterHistoryQuery, WaterIntake,
};
use crate::AppState;

async fn water_target(state: &AppState, auth_user: &AuthUser) -> AppResult<i32> {
    let user = state
        .store
        .find_user(auth_user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(user.water_target)
}

/// Adds to the day's count. Negative increments undo a glass; the count
/// itself never drops below zero.
pub async fn log_water(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<LogWaterRequest>,
) -> AppResult<Json<WaterIntake>> {
    let date = body.date.unwrap_or_else(today);
    let glasses = body.increment();
    let target = water_target(&state, &auth_user).await?;

    let log = state
        .store
        .add_water(auth_user.id, date, glasses, target)
        .await?;
    tracing::debug!(
        user_id = %auth_user.id,
        date = %date,
        glasses = log.glasses,
        "Water logged"
    );

    Ok(Json(log))
}

pub async fn get_today(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Response> {
    let date = today();
    if let Some(log) = state.store.find_water_for_day(auth_user.id, date).await? {
        return Ok(Json(log).into_response());
    }

    let target = water_target(&state, &auth_user).await?;
    Ok(Json(EmptyWaterDay {
        glasses: 0,
        target,
        date,
    })
    .into_response())
}

pub async fn get_history(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<WaterHistoryQuery>,
) -> AppResult<Json<Vec<WaterIntake>>> {
    let range = DayRange::from_bounds(query.start_date, query.end_date);
    Ok(Json(state.store.list_water(auth_user.id, range).await?))
}

pub async fn update_water(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(log_id): Path<Uuid>,
    Json(body): Json<UpdateWaterRequest>,
) -> AppResult<Json<WaterIntake>> {
    body.validate()?;

    let log = state
        .store
        .set_water_glasses(auth_user.id, log_id, body.glasses)
        .await?
        .ok_or_else(|| AppError::NotFound("Water log not found".into()))?;

    Ok(Json(log))
}

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
use crate::models::day::DayRange;
use crate::models::diet_entry::{
    CreateDietEntryRequest, DietEntry, DietEntryFilter, DietEntryQuery, NewDietEntry,
    UpdateDietEntryRequest,
};
use crate::models::food::Food;
use crate::services::portion::scale;
use crate::AppState;

fn entry_not_found() -> AppError {
    AppError::NotFound("Entry not found".into())
}

async fn visible_food(state: &AppState, user_id: Uuid, food_id: Uuid) -> AppResult<Food> {
    state
        .store
        .find_visible_food(user_id, food_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Food not found".into()))
}

async fn owned_entry(state: &AppState, user_id: Uuid, id: Uuid) -> AppResult<DietEntry> {
    state
        .store
        .find_diet_entry(user_id, id)
        .await?
        .ok_or_else(entry_not_found)
}

pub async fn list_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<DietEntryQuery>,
) -> AppResult<Json<Vec<DietEntry>>> {
    let filter = DietEntryFilter {
        range: DayRange::from_bounds(query.start_date, query.end_date),
        category: query.category,
        completed_only: false,
    };
    Ok(Json(
        state.store.list_diet_entries(auth_user.id, &filter).await?,
    ))
}

pub async fn create_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateDietEntryRequest>,
) -> AppResult<(StatusCode, Json<DietEntry>)> {
    body.validate()?;

    let food = visible_food(&state, auth_user.id, body.food_id).await?;
    let nutrition = scale(&food.per_100g(), body.quantity);

    let entry = state
        .store
        .insert_diet_entry(NewDietEntry {
            user_id: auth_user.id,
            food_id: food.id,
            food_name: body
                .food_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or(food.name),
            date: body.date,
            category: body.category,
            quantity: body.quantity,
            unit: body.unit.unwrap_or_default(),
            nutrition,
            photo_url: body.photo_url.unwrap_or_default(),
            ai_detected: body.ai_detected.unwrap_or(false),
            confidence: body.confidence,
        })
        .await?;
    tracing::debug!(
        user_id = %auth_user.id,
        entry_id = %entry.id,
        calories = entry.calories,
        "Diet entry created"
    );

    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
    Json(body): Json<UpdateDietEntryRequest>,
) -> AppResult<Json<DietEntry>> {
    body.validate()?;

    let mut entry = owned_entry(&state, auth_user.id, entry_id).await?;

    if let Some(quantity) = body.quantity.filter(|q| *q > 0.0) {
        let food = visible_food(&state, auth_user.id, entry.food_id).await?;
        entry.quantity = quantity;
        entry.apply_nutrition(scale(&food.per_100g(), quantity));
    }
    if let Some(category) = body.category {
        entry.category = category;
    }
    if let Some(completed) = body.completed {
        entry.completed = completed;
    }

    Ok(Json(state.store.save_diet_entry(&entry).await?))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    if !state.store.delete_diet_entry(auth_user.id, entry_id).await? {
        return Err(entry_not_found());
    }
    Ok(Json(json!({ "message": "Entry removed" })))
}

pub async fn toggle_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<DietEntry>> {
    let mut entry = owned_entry(&state, auth_user.id, entry_id).await?;
    entry.completed = !entry.completed;
    Ok(Json(state.store.save_diet_entry(&entry).await?))
}

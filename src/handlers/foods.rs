use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::diet_entry::PortionUnit;
use crate::models::food::{
    CreateFoodRequest, Food, FoodFilter, FoodListQuery, FoodSearchQuery, NewFood,
};
use crate::services::analyzer::Detection;
use crate::storage::{Upload, UploadKind};
use crate::AppState;

const SEARCH_LIMIT: i64 = 20;

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub async fn list_foods(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<FoodListQuery>,
) -> AppResult<Json<Vec<Food>>> {
    let filter = FoodFilter {
        category: query.category,
        name_contains: non_blank(query.search),
        limit: None,
    };
    Ok(Json(state.store.list_foods(auth_user.id, &filter).await?))
}

pub async fn search_foods(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<FoodSearchQuery>,
) -> AppResult<Json<Vec<Food>>> {
    let Some(q) = non_blank(query.q) else {
        return Ok(Json(Vec::new()));
    };
    let filter = FoodFilter {
        category: None,
        name_contains: Some(q),
        limit: Some(SEARCH_LIMIT),
    };
    Ok(Json(state.store.list_foods(auth_user.id, &filter).await?))
}

pub async fn create_food(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateFoodRequest>,
) -> AppResult<(StatusCode, Json<Food>)> {
    body.validate()?;

    let food = state
        .store
        .insert_food(NewFood {
            name: body.name.trim().to_string(),
            category: body.category.unwrap_or_default(),
            calories: body.calories,
            protein: body.protein,
            carbs: body.carbs,
            fats: body.fats,
            fiber: body.fiber.unwrap_or(0.0),
            owner: Some(auth_user.id),
        })
        .await?;
    tracing::debug!(user_id = %auth_user.id, food_id = %food.id, "Custom food created");

    Ok((StatusCode::CREATED, Json(food)))
}

#[derive(Debug, Serialize)]
pub struct DetectedPortion {
    #[serde(flatten)]
    pub detection: Detection,
    pub quantity: f64,
    pub unit: PortionUnit,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeImageResponse {
    pub success: bool,
    pub detected: DetectedPortion,
    pub image_url: String,
    pub message: String,
}

pub async fn analyze_image(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> AppResult<Json<AnalyzeImageResponse>> {
    let upload = Upload::from_multipart(&mut multipart, "image")
        .await?
        .filter(|u| !u.data.is_empty())
        .ok_or_else(|| AppError::Validation("No image uploaded".into()))?;

    let image_url = state
        .uploads
        .save(UploadKind::FoodImage, auth_user.id, &upload)
        .await?;
    let detection = state.analyzer.analyze(&upload.data).await?;
    tracing::info!(
        user_id = %auth_user.id,
        food = %detection.name,
        confidence = detection.confidence,
        "Food image analyzed"
    );

    Ok(Json(AnalyzeImageResponse {
        success: true,
        detected: DetectedPortion {
            detection,
            quantity: 100.0,
            unit: PortionUnit::Grams,
        },
        image_url,
        message: format!("Food detected successfully ({})", state.analyzer.label()),
    }))
}

use axum::{
    extract::{Multipart, State},
    Extension, Json,
};
use serde_json::{json, Value};

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::profile::{TargetsResponse, UpdateProfileRequest, UpdateSettingsRequest};
use crate::models::user::User;
use crate::services::nutrition::{preview_targets, settings_targets};
use crate::storage::{Upload, UploadKind};
use crate::AppState;

async fn load_user(state: &AppState, auth_user: &AuthUser) -> AppResult<User> {
    state
        .store
        .find_user(auth_user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<User>> {
    Ok(Json(load_user(&state, &auth_user).await?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> AppResult<Json<User>> {
    let mut user = load_user(&state, &auth_user).await?;
    body.apply(&mut user)?;
    user.apply_targets(settings_targets(&user.biometrics()));

    let user = state.store.save_user(&user).await?;
    tracing::info!(
        user_id = %user.id,
        calorie_target = user.calorie_target,
        "Profile updated"
    );
    Ok(Json(user))
}

/// Targets the profile would get, without saving anything.
pub async fn preview_profile_targets(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> AppResult<Json<TargetsResponse>> {
    let mut user = load_user(&state, &auth_user).await?;
    body.apply(&mut user)?;
    Ok(Json(preview_targets(&user.biometrics()).into()))
}

pub async fn update_settings(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpdateSettingsRequest>,
) -> AppResult<Json<User>> {
    let mut user = load_user(&state, &auth_user).await?;
    body.apply(&mut user);
    Ok(Json(state.store.save_user(&user).await?))
}

pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> AppResult<Json<Value>> {
    let upload = Upload::from_multipart(&mut multipart, "photo")
        .await?
        .ok_or_else(|| AppError::Validation("No file uploaded".into()))?;

    let mut user = load_user(&state, &auth_user).await?;
    user.profile_photo = state
        .uploads
        .save(UploadKind::ProfilePhoto, user.id, &upload)
        .await?;
    let user = state.store.save_user(&user).await?;

    Ok(Json(json!({ "profilePhoto": user.profile_photo })))
}

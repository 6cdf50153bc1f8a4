use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{
    jwt::create_token,
    middleware::AuthUser,
    password::verify_password,
};
use crate::error::{AppError, AppResult};
use crate::models::user::{NewUser, User};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAuthRequest {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[validate(length(min = 1, message = "Google id is required"))]
    pub google_id: String,
    pub profile_photo: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
    pub token: String,
}

impl AuthResponse {
    fn issue(user: User, with_photo: bool, state: &AppState) -> AppResult<Self> {
        let token = create_token(user.id, &user.email, &state.config)?;
        Ok(Self {
            id: user.id,
            name: user.name,
            email: user.email,
            profile_photo: with_photo.then_some(user.profile_photo),
            token,
        })
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    body.validate()?;

    if state.store.find_user_by_email(&body.email).await?.is_some() {
        return Err(AppError::Conflict("User already exists".into()));
    }

    let new_user = NewUser::with_password(&body.name, &body.email, &body.password)?;
    let user = state.store.create_user(new_user).await?;
    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::issue(user, false, &state)?),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = state
        .store
        .find_user_by_email(&body.email)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    // Google-only accounts have no password to match.
    let password_hash = user
        .password_hash
        .as_deref()
        .ok_or_else(AppError::invalid_credentials)?;
    if !verify_password(&body.password, password_hash)? {
        return Err(AppError::invalid_credentials());
    }

    Ok(Json(AuthResponse::issue(user, true, &state)?))
}

pub async fn google(
    State(state): State<AppState>,
    Json(body): Json<GoogleAuthRequest>,
) -> AppResult<Json<AuthResponse>> {
    body.validate()?;

    let user = match state.store.find_user_by_email(&body.email).await? {
        Some(mut user) => {
            if user.google_id.is_none() {
                user.google_id = Some(body.google_id);
                user = state.store.save_user(&user).await?;
                tracing::info!(user_id = %user.id, "Linked Google account");
            }
            user
        }
        None => {
            let new_user = NewUser::with_google(
                &body.name,
                &body.email,
                &body.google_id,
                body.profile_photo.as_deref(),
            )?;
            let user = state.store.create_user(new_user).await?;
            tracing::info!(user_id = %user.id, "User registered via Google");
            user
        }
    };

    Ok(Json(AuthResponse::issue(user, true, &state)?))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<User>> {
    let user = state
        .store
        .find_user(auth_user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_rejects_malformed_email() {
        let req = RegisterRequest {
            name: "Ana".into(),
            email: "not-an-email".into(),
            password: "secret1".into(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_google_request_requires_id() {
        let req: GoogleAuthRequest =
            serde_json::from_str(r#"{"email":"a@b.io","name":"A","googleId":""}"#).unwrap();
        assert!(req.validate().is_err());
    }
}

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use uuid::Uuid;

use crate::auth::jwt::verify_token;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
}

/// Resolves the bearer token to a live account. Tokens of deleted users are
/// rejected even while their signature is still valid.
pub async fn require_auth(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) =
        bearer.ok_or_else(|| AppError::Unauthorized("Not authorized, no token".into()))?;

    let token_data = verify_token(bearer.token(), &state.config)?;

    let user = state
        .store
        .find_user(token_data.claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Not authorized, user not found".into()))?;

    req.extensions_mut().insert(AuthUser { id: user.id });
    Ok(next.run(req).await)
}

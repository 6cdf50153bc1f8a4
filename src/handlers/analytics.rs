use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::day::{today, DayRange};
use crate::models::diet_entry::{DietEntry, DietEntryFilter};
use crate::models::user::User;
use crate::services::aggregation::{
    self, daily_series, daily_summary, macro_breakdown, monthly_summary, DailySummary,
    MacroBreakdown, MacroTotals, MonthlySummary,
};
use crate::services::report::WeeklyReport;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DayQuery {
    #[serde(default, deserialize_with = "crate::models::day::deserialize_opt")]
    pub date: Option<NaiveDate>,
}

async fn completed_entries(
    state: &AppState,
    user_id: Uuid,
    range: DayRange,
) -> AppResult<Vec<DietEntry>> {
    let filter = DietEntryFilter {
        range: Some(range),
        category: None,
        completed_only: true,
    };
    state.store.list_diet_entries(user_id, &filter).await
}

async fn load_user(state: &AppState, user_id: Uuid) -> AppResult<User> {
    state
        .store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

pub async fn daily(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<DayQuery>,
) -> AppResult<Json<DailySummary>> {
    let date = query.date.unwrap_or_else(today);
    let entries = completed_entries(&state, auth_user.id, DayRange::new(date, date)).await?;
    let user = load_user(&state, auth_user.id).await?;

    Ok(Json(daily_summary(date, &entries, user.targets())))
}

pub async fn weekly(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<BTreeMap<NaiveDate, MacroTotals>>> {
    let range = aggregation::week_ending(today());
    let entries = completed_entries(&state, auth_user.id, range).await?;

    Ok(Json(daily_series(range, &entries)))
}

pub async fn monthly(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<MonthlySummary>> {
    let range = aggregation::month_ending(today());
    let entries = completed_entries(&state, auth_user.id, range).await?;

    Ok(Json(monthly_summary(&entries)))
}

pub async fn macros(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<DayQuery>,
) -> AppResult<Json<MacroBreakdown>> {
    let date = query.date.unwrap_or_else(today);
    let entries = completed_entries(&state, auth_user.id, DayRange::new(date, date)).await?;

    Ok(Json(macro_breakdown(&aggregation::sum(&entries))))
}

pub async fn export_pdf(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Response> {
    let range = aggregation::week_ending(today());
    let entries = completed_entries(&state, auth_user.id, range).await?;
    let user = load_user(&state, auth_user.id).await?;

    let report = WeeklyReport {
        user_name: &user.name,
        start: range.start,
        end: range.end,
        totals: aggregation::sum(&entries),
    };
    let bytes = report.render()?;
    tracing::info!(user_id = %auth_user.id, size = bytes.len(), "Weekly report exported");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=diet-report.pdf",
            ),
        ],
        bytes,
    )
        .into_response())
}

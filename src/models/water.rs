use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WaterIntake {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(rename = "log_date")]
    pub date: NaiveDate,
    pub glasses: i32,
    pub target: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// POST /api/water
#[derive(Debug, Default, Deserialize)]
pub struct LogWaterRequest {
    #[serde(default, deserialize_with = "crate::models::day::deserialize_opt")]
    pub date: Option<NaiveDate>,
    pub glasses: Option<i32>,
}

impl LogWaterRequest {
    /// Glasses to add. Missing or zero counts as one glass.
    pub fn increment(&self) -> i32 {
        match self.glasses {
            Some(n) if n != 0 => n,
            _ => 1,
        }
    }
}

/// PUT /api/water/:id
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateWaterRequest {
    #[validate(range(min = 0, message = "Glasses cannot be negative"))]
    pub glasses: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterHistoryQuery {
    #[serde(default, deserialize_with = "crate::models::day::deserialize_opt")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "crate::models::day::deserialize_opt")]
    pub end_date: Option<NaiveDate>,
}

/// GET /api/water/today when nothing was logged yet.
#[derive(Debug, Serialize)]
pub struct EmptyWaterDay {
    pub glasses: i32,
    pub target: i32,
    pub date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_defaults_to_one_glass() {
        assert_eq!(LogWaterRequest::default().increment(), 1);
        let zero = LogWaterRequest {
            date: None,
            glasses: Some(0),
        };
        assert_eq!(zero.increment(), 1);
        let three = LogWaterRequest {
            date: None,
            glasses: Some(3),
        };
        assert_eq!(three.increment(), 3);
    }

    #[test]
    fn test_log_request_parses_date() {
        let req: LogWaterRequest = serde_json::from_str(r#"{"date":"2026-04-02"}"#).unwrap();
        assert_eq!(req.date, NaiveDate::from_ymd_opt(2026, 4, 2));
    }

    #[test]
    fn test_negative_glasses_rejected() {
        let req = UpdateWaterRequest { glasses: -2 };
        assert!(req.validate().is_err());
    }
}

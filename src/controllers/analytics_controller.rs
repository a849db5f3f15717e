use axum::{
    Json,
    extract::{Extension, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    AppState,
    controllers::{JsonBody, loose_float, loose_int, non_empty, require_user},
    error::AppError,
    models::{AnalyticsRecord, AnalyticsSummary, CurrentUser},
    services::{
        analytics_service::{self, AnalyticsFilter, NewAnalyticsRecord},
        dustbin_service,
    },
};

/// Calendar date as `YYYY-MM-DD`; `2026-02-30` is rejected.
pub fn check_date(raw: &str, field: &str) -> Result<String, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| {
            AppError::invalid(
                "INVALID_DATE_FORMAT",
                format!("Invalid {field} format. Use YYYY-MM-DD"),
            )
        })
}

fn optional_date(raw: Option<String>, field: &str) -> Result<Option<String>, AppError> {
    non_empty(raw).map(|d| check_date(&d, field)).transpose()
}

#[derive(Deserialize)]
pub struct AnalyticsQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub dustbin_id: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Query(q): Query<AnalyticsQuery>,
) -> Result<Json<Vec<AnalyticsRecord>>, AppError> {
    let u = require_user(user)?;

    let dustbin_id = match non_empty(q.dustbin_id) {
        Some(raw) => Some(raw.parse::<i64>().map_err(|_| {
            AppError::invalid("INVALID_DUSTBIN_ID", "Invalid dustbin_id parameter")
        })?),
        None => None,
    };

    let filter = AnalyticsFilter {
        date_from: optional_date(q.date_from, "date_from")?,
        date_to: optional_date(q.date_to, "date_to")?,
        dustbin_id,
    };

    analytics_service::list_records(&state, &u.id, &filter)
        .await
        .map(Json)
}

#[derive(Deserialize)]
pub struct RecordBody {
    pub dustbin_id: Option<Value>,
    pub date: Option<String>,
    pub waste_collected_kg: Option<Value>,
    pub fill_level_avg: Option<Value>,
    pub collections_count: Option<Value>,
}

pub fn validate_record(body: RecordBody) -> Result<NewAnalyticsRecord, AppError> {
    let dustbin_id = body
        .dustbin_id
        .ok_or_else(|| AppError::invalid("MISSING_DUSTBIN_ID", "dustbin_id is required"))?;
    let date = non_empty(body.date).ok_or_else(|| AppError::invalid("MISSING_DATE", "date is required"))?;
    let waste = body.waste_collected_kg.ok_or_else(|| {
        AppError::invalid("MISSING_WASTE_COLLECTED_KG", "waste_collected_kg is required")
    })?;
    let fill = body
        .fill_level_avg
        .ok_or_else(|| AppError::invalid("MISSING_FILL_LEVEL_AVG", "fill_level_avg is required"))?;
    let count = body.collections_count.ok_or_else(|| {
        AppError::invalid("MISSING_COLLECTIONS_COUNT", "collections_count is required")
    })?;

    let dustbin_id = loose_int(&dustbin_id)
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::invalid("INVALID_DUSTBIN_ID", "dustbin_id must be a valid integer"))?;

    let waste_collected_kg = loose_float(&waste).filter(|kg| *kg >= 0.0).ok_or_else(|| {
        AppError::invalid(
            "INVALID_WASTE_COLLECTED_KG",
            "waste_collected_kg must be a non-negative number",
        )
    })?;

    let fill_level_avg = loose_int(&fill)
        .filter(|l| (0..=100).contains(l))
        .ok_or_else(|| {
            AppError::invalid("INVALID_FILL_LEVEL_AVG", "fill_level_avg must be an integer between 0 and 100")
        })?;

    let collections_count = loose_int(&count).filter(|c| *c >= 0).ok_or_else(|| {
        AppError::invalid(
            "INVALID_COLLECTIONS_COUNT",
            "collections_count must be a non-negative integer",
        )
    })?;

    Ok(NewAnalyticsRecord {
        dustbin_id,
        date: check_date(&date, "date")?,
        waste_collected_kg,
        fill_level_avg,
        collections_count,
    })
}

pub async fn create(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    JsonBody(body): JsonBody<RecordBody>,
) -> Result<impl IntoResponse, AppError> {
    let u = require_user(user)?;
    let new = validate_record(body)?;

    if !dustbin_service::owns_dustbin(&state, &u.id, new.dustbin_id).await? {
        return Err(AppError::not_found("DUSTBIN_NOT_FOUND", "Dustbin not found"));
    }

    let rec = analytics_service::create_record(&state, &u.id, new).await?;
    Ok((StatusCode::CREATED, Json(rec)))
}

#[derive(Deserialize)]
pub struct SummaryQuery {
    pub user_id: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

pub async fn summary(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Query(q): Query<SummaryQuery>,
) -> Result<Json<AnalyticsSummary>, AppError> {
    let u = require_user(user)?;

    if let Some(requested) = non_empty(q.user_id) {
        if requested != u.id {
            return Err(AppError::forbidden(
                "FORBIDDEN",
                "Unauthorized access to analytics data",
            ));
        }
    }

    let from = optional_date(q.date_from, "date_from")?;
    let to = optional_date(q.date_to, "date_to")?;

    analytics_service::summarize(&state, &u.id, from.as_deref(), to.as_deref())
        .await
        .map(Json)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn body(v: Value) -> RecordBody {
        serde_json::from_value(v).unwrap()
    }

    fn valid() -> Value {
        json!({
            "dustbin_id": 3, "date": "2026-03-01", "waste_collected_kg": "12.5",
            "fill_level_avg": 60, "collections_count": 2
        })
    }

    #[test]
    fn dates_must_be_real_calendar_days() {
        assert_eq!(check_date("2026-03-01", "date").unwrap(), "2026-03-01");
        assert_eq!(check_date("2026-02-30", "date").unwrap_err().code(), "INVALID_DATE_FORMAT");
        assert_eq!(check_date("03/01/2026", "date").unwrap_err().code(), "INVALID_DATE_FORMAT");
    }

    #[test]
    fn record_parses_loose_numbers() {
        let r = validate_record(body(valid())).unwrap();
        assert_eq!(r.dustbin_id, 3);
        assert_eq!(r.waste_collected_kg, 12.5);
        assert_eq!(r.collections_count, 2);
    }

    #[test]
    fn record_field_errors() {
        let code = |patch: Value| {
            let mut v = valid();
            for (k, val) in patch.as_object().unwrap() {
                v[k.as_str()] = val.clone();
            }
            validate_record(body(v)).unwrap_err().code()
        };

        assert_eq!(code(json!({ "date": null })), "MISSING_DATE");
        assert_eq!(code(json!({ "waste_collected_kg": -1 })), "INVALID_WASTE_COLLECTED_KG");
        assert_eq!(code(json!({ "fill_level_avg": "lots" })), "INVALID_FILL_LEVEL_AVG");
        assert_eq!(code(json!({ "collections_count": -2 })), "INVALID_COLLECTIONS_COUNT");
        assert_eq!(code(json!({ "date": "2026-13-01" })), "INVALID_DATE_FORMAT");
    }
}

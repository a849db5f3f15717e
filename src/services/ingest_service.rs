//! Fill-level ingestion from bin sensors.
//!
//! Devices authenticate with one shared secret, report `{dustbinId, fillLevel}`
//! and get back the stored state. Crossing into the `full` bucket raises one
//! unread alert for the bin owner; further reports while that alert exists do
//! not raise another.

use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

use crate::{
    AppState,
    config::Settings,
    error::AppError,
    events::{self, DUSTBINS_UPDATED, NOTIFICATIONS_UPDATED},
    models::{FillStatus, Notification, NotificationKind, dustbin::ALERT_THRESHOLD, timestamp_now},
};

pub const DEVICE_KEY_HEADER: &str = "X-API-Key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillReport {
    pub dustbin_id: i64,
    pub fill_level: i64,
}

/// What the device gets back after a successful report.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FillLevelUpdate {
    pub id: i64,
    pub fill_level: i64,
    pub status: FillStatus,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub update: FillLevelUpdate,
    /// The alert raised by this report, if any.
    pub alert: Option<Notification>,
}

#[derive(FromRow)]
struct UpdatedBin {
    id: i64,
    user_id: String,
    name: String,
    fill_level: i64,
    status: FillStatus,
    updated_at: String,
}

/// Integral JSON number, whether written as `80` or `80.0`.
fn integral(v: &Value) -> Option<i64> {
    v.as_i64().or_else(|| {
        v.as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

impl FillReport {
    pub fn from_json(body: &Value) -> Result<Self, AppError> {
        let dustbin_id = body
            .get("dustbinId")
            .and_then(Value::as_i64)
            .filter(|id| *id > 0)
            .ok_or_else(|| AppError::invalid("MISSING_DUSTBIN_ID", "Valid dustbinId is required"))?;

        let fill_level = body
            .get("fillLevel")
            .and_then(integral)
            .filter(|level| (0..=100).contains(level))
            .ok_or_else(|| {
                AppError::invalid(
                    "INVALID_FILL_LEVEL",
                    "Fill level must be a number between 0 and 100",
                )
            })?;

        Ok(Self {
            dustbin_id,
            fill_level,
        })
    }
}

/// Checks the device secret. Fails closed when none is configured.
pub fn verify_device_key(settings: &Settings, presented: Option<&str>) -> Result<(), AppError> {
    let reject = || AppError::unauthorized("INVALID_API_KEY", "Invalid or missing API key");

    let Some(expected) = settings.hardware_api_key.as_deref() else {
        tracing::error!("HARDWARE_API_KEY is not configured -- rejecting device report");
        return Err(reject());
    };

    match presented {
        Some(key) if key == expected => Ok(()),
        _ => Err(reject()),
    }
}

pub fn alert_message(bin_name: &str, fill_level: i64) -> String {
    format!("{bin_name} is {fill_level}% full and needs immediate collection.")
}

/// Stores the reading and raises the alert if one is due.
///
/// Everything runs in one transaction that starts with the bin UPDATE, so the
/// write lock is held across the alert check and insert: two reports for the
/// same bin cannot both see "no alert yet".
pub async fn apply_fill_report(state: &AppState, report: FillReport) -> Result<IngestOutcome, AppError> {
    let status = FillStatus::from_fill_level(report.fill_level);
    let now = timestamp_now();

    let mut tx = state.db.begin().await?;

    let bin = sqlx::query_as::<_, UpdatedBin>(
        r#"
        UPDATE dustbins
        SET fill_level = ?, status = ?, updated_at = ?
        WHERE id = ?
        RETURNING id, user_id, name, fill_level, status, updated_at
        "#,
    )
    .bind(report.fill_level)
    .bind(status)
    .bind(&now)
    .bind(report.dustbin_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(bin) = bin else {
        tracing::warn!(dustbin_id = report.dustbin_id, "fill report for unknown dustbin");
        return Err(AppError::not_found("DUSTBIN_NOT_FOUND", "Dustbin not found"));
    };

    let mut alert = None;

    if report.fill_level >= ALERT_THRESHOLD && !bin.user_id.is_empty() {
        let (already_alerted,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM notifications WHERE dustbin_id = ? AND kind = ?)",
        )
        .bind(bin.id)
        .bind(NotificationKind::Alert)
        .fetch_one(&mut *tx)
        .await?;

        if !already_alerted {
            let created = sqlx::query_as::<_, Notification>(
                r#"
                INSERT INTO notifications (user_id, dustbin_id, message, kind, is_read, created_at)
                VALUES (?, ?, ?, ?, 0, ?)
                RETURNING *
                "#,
            )
            .bind(&bin.user_id)
            .bind(bin.id)
            .bind(alert_message(&bin.name, report.fill_level))
            .bind(NotificationKind::Alert)
            .bind(&now)
            .fetch_one(&mut *tx)
            .await?;

            alert = Some(created);
        }
    }

    tx.commit().await?;

    tracing::info!(
        dustbin_id = bin.id,
        fill_level = bin.fill_level,
        status = bin.status.as_str(),
        alert_raised = alert.is_some(),
        "fill level updated"
    );

    events::publish(&state.events_tx, &bin.user_id, DUSTBINS_UPDATED);
    if alert.is_some() {
        events::publish(&state.events_tx, &bin.user_id, NOTIFICATIONS_UPDATED);
    }

    Ok(IngestOutcome {
        update: FillLevelUpdate {
            id: bin.id,
            fill_level: bin.fill_level,
            status: bin.status,
            updated_at: bin.updated_at,
        },
        alert,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn settings_with_key(key: Option<&str>) -> Settings {
        let mut s = crate::config::load();
        s.hardware_api_key = key.map(str::to_string);
        s
    }

    #[test]
    fn report_parses_valid_body() {
        let r = FillReport::from_json(&json!({ "dustbinId": 7, "fillLevel": 80 })).unwrap();
        assert_eq!(r, FillReport { dustbin_id: 7, fill_level: 80 });
    }

    #[test]
    fn integral_float_fill_level_is_accepted() {
        let r = FillReport::from_json(&json!({ "dustbinId": 7, "fillLevel": 55.0 })).unwrap();
        assert_eq!(r.fill_level, 55);
    }

    #[test]
    fn missing_or_bad_dustbin_id_is_rejected() {
        for body in [
            json!({ "fillLevel": 10 }),
            json!({ "dustbinId": "7", "fillLevel": 10 }),
            json!({ "dustbinId": 0, "fillLevel": 10 }),
            json!({ "dustbinId": 1.5, "fillLevel": 10 }),
            json!([1, 2]),
        ] {
            let err = FillReport::from_json(&body).unwrap_err();
            assert_eq!(err.code(), "MISSING_DUSTBIN_ID", "body {body}");
        }
    }

    #[test]
    fn out_of_range_or_non_numeric_fill_level_is_rejected() {
        for level in [json!(-1), json!(101), json!(150), json!("80"), json!(null), json!(80.5)] {
            let err = FillReport::from_json(&json!({ "dustbinId": 1, "fillLevel": level })).unwrap_err();
            assert_eq!(err.code(), "INVALID_FILL_LEVEL", "level {level}");
        }
        let err = FillReport::from_json(&json!({ "dustbinId": 1 })).unwrap_err();
        assert_eq!(err.code(), "INVALID_FILL_LEVEL");
    }

    #[test]
    fn boundaries_are_inclusive() {
        assert!(FillReport::from_json(&json!({ "dustbinId": 1, "fillLevel": 0 })).is_ok());
        assert!(FillReport::from_json(&json!({ "dustbinId": 1, "fillLevel": 100 })).is_ok());
    }

    #[test]
    fn device_key_must_match() {
        let s = settings_with_key(Some("k-123"));
        assert!(verify_device_key(&s, Some("k-123")).is_ok());
        assert_eq!(verify_device_key(&s, Some("nope")).unwrap_err().code(), "INVALID_API_KEY");
        assert_eq!(verify_device_key(&s, None).unwrap_err().code(), "INVALID_API_KEY");
    }

    #[test]
    fn unconfigured_device_key_fails_closed() {
        let s = settings_with_key(None);
        assert!(verify_device_key(&s, Some("")).is_err());
        assert!(verify_device_key(&s, Some("anything")).is_err());
    }

    #[test]
    fn alert_message_names_bin_and_level() {
        assert_eq!(
            alert_message("Gate 3 (dry)", 80),
            "Gate 3 (dry) is 80% full and needs immediate collection."
        );
    }
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Warning,
    Alert,
}

impl NotificationKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "info" => Some(NotificationKind::Info),
            "warning" => Some(NotificationKind::Warning),
            "alert" => Some(NotificationKind::Alert),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub user_id: String,
    pub dustbin_id: Option<i64>,
    pub message: String,

    #[serde(rename = "type")]
    pub kind: NotificationKind,

    pub is_read: bool,
    pub created_at: String,
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum CollectionStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl CollectionStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(CollectionStatus::Scheduled),
            "in_progress" => Some(CollectionStatus::InProgress),
            "completed" => Some(CollectionStatus::Completed),
            "cancelled" => Some(CollectionStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: i64,
    pub user_id: String,
    pub dustbin_id: i64,
    pub scheduled_date: String,
    pub completed_date: Option<String>,
    pub status: CollectionStatus,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

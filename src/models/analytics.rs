use serde::Serialize;
use sqlx::FromRow;

/// One day of collected-waste figures for a bin.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsRecord {
    pub id: i64,
    pub user_id: String,
    pub dustbin_id: i64,
    pub date: String,
    pub waste_collected_kg: f64,
    pub fill_level_avg: i64,
    pub collections_count: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_waste_kg: f64,
    pub avg_fill_level: f64,
    pub total_collections: i64,
    pub days_tracked: i64,
}

use sqlx::{QueryBuilder, Sqlite};

use crate::{
    AppState,
    error::AppError,
    models::{AnalyticsRecord, AnalyticsSummary, timestamp_now},
};

#[derive(Debug, Clone, Default)]
pub struct AnalyticsFilter {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub dustbin_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewAnalyticsRecord {
    pub dustbin_id: i64,
    pub date: String,
    pub waste_collected_kg: f64,
    pub fill_level_avg: i64,
    pub collections_count: i64,
}

fn push_date_range<'a>(qb: &mut QueryBuilder<'a, Sqlite>, from: Option<&'a str>, to: Option<&'a str>) {
    if let Some(from) = from {
        qb.push(" AND date >= ").push_bind(from);
    }
    if let Some(to) = to {
        qb.push(" AND date <= ").push_bind(to);
    }
}

pub async fn list_records(
    state: &AppState,
    user_id: &str,
    filter: &AnalyticsFilter,
) -> Result<Vec<AnalyticsRecord>, AppError> {
    let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("SELECT * FROM analytics WHERE user_id = ");
    qb.push_bind(user_id);

    push_date_range(&mut qb, filter.date_from.as_deref(), filter.date_to.as_deref());

    if let Some(dustbin_id) = filter.dustbin_id {
        qb.push(" AND dustbin_id = ").push_bind(dustbin_id);
    }

    qb.push(" ORDER BY date DESC, id DESC");

    let items = qb.build_query_as::<AnalyticsRecord>().fetch_all(&state.db).await?;
    Ok(items)
}

/// Caller has already checked that the bin belongs to `user_id`.
pub async fn create_record(
    state: &AppState,
    user_id: &str,
    new: NewAnalyticsRecord,
) -> Result<AnalyticsRecord, AppError> {
    let rec = sqlx::query_as::<_, AnalyticsRecord>(
        r#"
        INSERT INTO analytics
            (user_id, dustbin_id, date, waste_collected_kg, fill_level_avg, collections_count, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(new.dustbin_id)
    .bind(&new.date)
    .bind(new.waste_collected_kg)
    .bind(new.fill_level_avg)
    .bind(new.collections_count)
    .bind(timestamp_now())
    .fetch_one(&state.db)
    .await?;

    Ok(rec)
}

pub async fn summarize(
    state: &AppState,
    user_id: &str,
    date_from: Option<&str>,
    date_to: Option<&str>,
) -> Result<AnalyticsSummary, AppError> {
    let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
        r#"
        SELECT
            CAST(COALESCE(SUM(waste_collected_kg), 0) AS REAL),
            CAST(COALESCE(ROUND(AVG(fill_level_avg), 2), 0) AS REAL),
            CAST(COALESCE(SUM(collections_count), 0) AS INTEGER),
            COUNT(DISTINCT date)
        FROM analytics
        WHERE user_id = "#,
    );
    qb.push_bind(user_id);
    push_date_range(&mut qb, date_from, date_to);

    let (total_waste_kg, avg_fill_level, total_collections, days_tracked): (f64, f64, i64, i64) =
        qb.build_query_as().fetch_one(&state.db).await?;

    if days_tracked == 0 {
        return Ok(AnalyticsSummary::default());
    }

    Ok(AnalyticsSummary {
        total_waste_kg,
        avg_fill_level,
        total_collections,
        days_tracked,
    })
}

use sqlx::{QueryBuilder, Sqlite};

use crate::{
    AppState,
    error::AppError,
    models::{Collection, CollectionStatus, timestamp_now},
};

#[derive(Debug, Clone, Default)]
pub struct CollectionFilter {
    pub status: Option<CollectionStatus>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CollectionChanges {
    pub status: Option<CollectionStatus>,
    pub completed_date: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub scheduled_date: Option<String>,
}

fn not_found() -> AppError {
    AppError::not_found("COLLECTION_NOT_FOUND", "Collection not found")
}

pub async fn list_collections(
    state: &AppState,
    user_id: &str,
    filter: &CollectionFilter,
) -> Result<Vec<Collection>, AppError> {
    let mut qb: QueryBuilder<'_, Sqlite> =
        QueryBuilder::new("SELECT * FROM collections WHERE user_id = ");
    qb.push_bind(user_id);

    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(from) = filter.date_from.as_deref() {
        qb.push(" AND scheduled_date >= ").push_bind(from);
    }
    if let Some(to) = filter.date_to.as_deref() {
        qb.push(" AND scheduled_date <= ").push_bind(to);
    }

    qb.push(" ORDER BY scheduled_date DESC, id DESC");

    let items = qb.build_query_as::<Collection>().fetch_all(&state.db).await?;
    Ok(items)
}

pub async fn get_collection(state: &AppState, user_id: &str, id: i64) -> Result<Collection, AppError> {
    sqlx::query_as::<_, Collection>("SELECT * FROM collections WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(not_found)
}

/// Caller has already checked that the bin belongs to `user_id`.
pub async fn schedule_collection(
    state: &AppState,
    user_id: &str,
    dustbin_id: i64,
    scheduled_date: &str,
    notes: Option<&str>,
) -> Result<Collection, AppError> {
    let now = timestamp_now();

    let c = sqlx::query_as::<_, Collection>(
        r#"
        INSERT INTO collections (user_id, dustbin_id, scheduled_date, status, notes, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(dustbin_id)
    .bind(scheduled_date)
    .bind(CollectionStatus::Scheduled)
    .bind(notes)
    .bind(&now)
    .bind(&now)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(user_id, dustbin_id, collection_id = c.id, "collection scheduled");
    Ok(c)
}

pub async fn update_collection(
    state: &AppState,
    user_id: &str,
    id: i64,
    mut changes: CollectionChanges,
) -> Result<Collection, AppError> {
    let now = timestamp_now();

    // completing without an explicit date stamps "now"
    if changes.status == Some(CollectionStatus::Completed) && changes.completed_date.is_none() {
        changes.completed_date = Some(Some(now.clone()));
    }

    let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("UPDATE collections SET updated_at = ");
    qb.push_bind(now);

    if let Some(status) = changes.status {
        qb.push(", status = ").push_bind(status);
    }
    if let Some(date) = changes.completed_date {
        qb.push(", completed_date = ").push_bind(date);
    }
    if let Some(notes) = changes.notes {
        qb.push(", notes = ").push_bind(notes);
    }
    if let Some(date) = changes.scheduled_date {
        qb.push(", scheduled_date = ").push_bind(date);
    }

    qb.push(" WHERE id = ")
        .push_bind(id)
        .push(" AND user_id = ")
        .push_bind(user_id)
        .push(" RETURNING *");

    qb.build_query_as::<Collection>()
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(not_found)
}

pub async fn cancel_collection(state: &AppState, user_id: &str, id: i64) -> Result<Collection, AppError> {
    let c = update_collection(
        state,
        user_id,
        id,
        CollectionChanges {
            status: Some(CollectionStatus::Cancelled),
            ..Default::default()
        },
    )
    .await?;

    tracing::info!(user_id, collection_id = id, "collection cancelled");
    Ok(c)
}

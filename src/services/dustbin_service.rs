use sqlx::{QueryBuilder, Sqlite};

use crate::{
    AppState,
    error::AppError,
    events::{self, DUSTBINS_UPDATED},
    models::{BinKind, Dustbin, FillStatus, timestamp_now},
};

pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Default)]
pub struct DustbinFilter {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub status: Option<FillStatus>,
    pub kind: Option<BinKind>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewDustbin {
    pub name: String,
    pub kind: BinKind,
    pub location_name: String,
    pub latitude: String,
    pub longitude: String,
}

/// Partial owner edit. `Some(None)` clears a nullable column.
#[derive(Debug, Clone, Default)]
pub struct DustbinChanges {
    pub fill_level: Option<i64>,
    pub name: Option<String>,
    pub location_name: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub last_collection_date: Option<Option<String>>,
    pub next_collection_date: Option<Option<String>>,
    pub is_active: Option<bool>,
}

fn not_found() -> AppError {
    AppError::not_found("DUSTBIN_NOT_FOUND", "Dustbin not found")
}

pub async fn list_dustbins(
    state: &AppState,
    user_id: &str,
    filter: &DustbinFilter,
) -> Result<Vec<Dustbin>, AppError> {
    let limit = filter.limit.unwrap_or(MAX_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = filter.offset.unwrap_or(0).max(0);

    let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("SELECT * FROM dustbins WHERE user_id = ");
    qb.push_bind(user_id);

    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(kind) = filter.kind {
        qb.push(" AND kind = ").push_bind(kind);
    }
    if let Some(active) = filter.is_active {
        qb.push(" AND is_active = ").push_bind(active);
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        qb.push(" AND (name LIKE ")
            .push_bind(pattern.clone())
            .push(" OR location_name LIKE ")
            .push_bind(pattern)
            .push(")");
    }

    qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    let items = qb.build_query_as::<Dustbin>().fetch_all(&state.db).await?;
    Ok(items)
}

pub async fn get_dustbin(state: &AppState, user_id: &str, id: i64) -> Result<Dustbin, AppError> {
    sqlx::query_as::<_, Dustbin>("SELECT * FROM dustbins WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(not_found)
}

/// True when the bin exists and belongs to `user_id` (active or not).
pub async fn owns_dustbin(state: &AppState, user_id: &str, id: i64) -> Result<bool, AppError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM dustbins WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?;
    Ok(row.is_some())
}

pub async fn create_dustbin(
    state: &AppState,
    user_id: &str,
    new: NewDustbin,
) -> Result<Dustbin, AppError> {
    let now = timestamp_now();

    let bin = sqlx::query_as::<_, Dustbin>(
        r#"
        INSERT INTO dustbins
            (user_id, name, kind, location_name, latitude, longitude,
             fill_level, status, is_active, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, 0, ?, 1, ?, ?)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&new.name)
    .bind(new.kind)
    .bind(&new.location_name)
    .bind(&new.latitude)
    .bind(&new.longitude)
    .bind(FillStatus::Empty)
    .bind(&now)
    .bind(&now)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(user_id, dustbin_id = bin.id, "dustbin created");
    events::publish(&state.events_tx, user_id, DUSTBINS_UPDATED);

    Ok(bin)
}

pub async fn update_dustbin(
    state: &AppState,
    user_id: &str,
    id: i64,
    changes: DustbinChanges,
) -> Result<Dustbin, AppError> {
    let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("UPDATE dustbins SET updated_at = ");
    qb.push_bind(timestamp_now());

    if let Some(level) = changes.fill_level {
        qb.push(", fill_level = ").push_bind(level);
        qb.push(", status = ").push_bind(FillStatus::from_fill_level(level));
    }
    if let Some(name) = changes.name {
        qb.push(", name = ").push_bind(name);
    }
    if let Some(location_name) = changes.location_name {
        qb.push(", location_name = ").push_bind(location_name);
    }
    if let Some(latitude) = changes.latitude {
        qb.push(", latitude = ").push_bind(latitude);
    }
    if let Some(longitude) = changes.longitude {
        qb.push(", longitude = ").push_bind(longitude);
    }
    if let Some(date) = changes.last_collection_date {
        qb.push(", last_collection_date = ").push_bind(date);
    }
    if let Some(date) = changes.next_collection_date {
        qb.push(", next_collection_date = ").push_bind(date);
    }
    if let Some(active) = changes.is_active {
        qb.push(", is_active = ").push_bind(active);
    }

    qb.push(" WHERE id = ")
        .push_bind(id)
        .push(" AND user_id = ")
        .push_bind(user_id)
        .push(" RETURNING *");

    let bin = qb
        .build_query_as::<Dustbin>()
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(not_found)?;

    events::publish(&state.events_tx, user_id, DUSTBINS_UPDATED);
    Ok(bin)
}

/// Soft delete: bins are never removed, only deactivated.
pub async fn deactivate_dustbin(state: &AppState, user_id: &str, id: i64) -> Result<Dustbin, AppError> {
    let bin = sqlx::query_as::<_, Dustbin>(
        "UPDATE dustbins SET is_active = 0, updated_at = ? WHERE id = ? AND user_id = ? RETURNING *",
    )
    .bind(timestamp_now())
    .bind(id)
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(not_found)?;

    tracing::info!(user_id, dustbin_id = id, "dustbin deactivated");
    events::publish(&state.events_tx, user_id, DUSTBINS_UPDATED);

    Ok(bin)
}

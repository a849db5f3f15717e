use sqlx::{QueryBuilder, Sqlite};

use crate::{
    AppState,
    error::AppError,
    events::{self, NOTIFICATIONS_UPDATED},
    models::{Notification, NotificationKind, timestamp_now},
};

#[derive(Debug, Clone, Default)]
pub struct NotificationChanges {
    pub message: Option<String>,
    pub kind: Option<NotificationKind>,
    pub is_read: Option<bool>,
    pub dustbin_id: Option<Option<i64>>,
}

fn not_found() -> AppError {
    AppError::not_found("NOTIFICATION_NOT_FOUND", "Notification not found")
}

pub async fn list_notifications(
    state: &AppState,
    user_id: &str,
    is_read: Option<bool>,
) -> Result<Vec<Notification>, AppError> {
    let mut qb: QueryBuilder<'_, Sqlite> =
        QueryBuilder::new("SELECT * FROM notifications WHERE user_id = ");
    qb.push_bind(user_id);

    if let Some(read) = is_read {
        qb.push(" AND is_read = ").push_bind(read);
    }

    qb.push(" ORDER BY created_at DESC, id DESC");

    let items = qb.build_query_as::<Notification>().fetch_all(&state.db).await?;
    Ok(items)
}

pub async fn create_notification(
    state: &AppState,
    user_id: &str,
    message: &str,
    kind: NotificationKind,
    dustbin_id: Option<i64>,
) -> Result<Notification, AppError> {
    let n = sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications (user_id, dustbin_id, message, kind, is_read, created_at)
        VALUES (?, ?, ?, ?, 0, ?)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(dustbin_id)
    .bind(message)
    .bind(kind)
    .bind(timestamp_now())
    .fetch_one(&state.db)
    .await?;

    events::publish(&state.events_tx, user_id, NOTIFICATIONS_UPDATED);
    Ok(n)
}

pub async fn update_notification(
    state: &AppState,
    user_id: &str,
    id: i64,
    changes: NotificationChanges,
) -> Result<Notification, AppError> {
    let no_changes = changes.message.is_none()
        && changes.kind.is_none()
        && changes.is_read.is_none()
        && changes.dustbin_id.is_none();

    if no_changes {
        return sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(not_found);
    }

    let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("UPDATE notifications SET ");
    let mut set = qb.separated(", ");

    if let Some(message) = changes.message {
        set.push("message = ").push_bind_unseparated(message);
    }
    if let Some(kind) = changes.kind {
        set.push("kind = ").push_bind_unseparated(kind);
    }
    if let Some(read) = changes.is_read {
        set.push("is_read = ").push_bind_unseparated(read);
    }
    if let Some(dustbin_id) = changes.dustbin_id {
        set.push("dustbin_id = ").push_bind_unseparated(dustbin_id);
    }

    qb.push(" WHERE id = ")
        .push_bind(id)
        .push(" AND user_id = ")
        .push_bind(user_id)
        .push(" RETURNING *");

    let n = qb
        .build_query_as::<Notification>()
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(not_found)?;

    events::publish(&state.events_tx, user_id, NOTIFICATIONS_UPDATED);
    Ok(n)
}

pub async fn mark_read(state: &AppState, user_id: &str, id: i64) -> Result<Notification, AppError> {
    update_notification(
        state,
        user_id,
        id,
        NotificationChanges {
            is_read: Some(true),
            ..Default::default()
        },
    )
    .await
}

/// Hard delete. Removing a bin's alert lets ingestion raise a new one.
pub async fn delete_notification(state: &AppState, user_id: &str, id: i64) -> Result<Notification, AppError> {
    let n = sqlx::query_as::<_, Notification>(
        "DELETE FROM notifications WHERE id = ? AND user_id = ? RETURNING *",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(not_found)?;

    events::publish(&state.events_tx, user_id, NOTIFICATIONS_UPDATED);
    Ok(n)
}

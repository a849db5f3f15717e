use std::{str::FromStr, time::Duration};

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};

use crate::config::Settings;

/// Opens the pool and makes sure the schema exists.
pub async fn connect(settings: &Settings) -> Result<SqlitePool, sqlx::Error> {
    let in_memory = settings.database_url.contains(":memory:");

    let mut opts = SqliteConnectOptions::from_str(&settings.database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    if !in_memory {
        opts = opts.journal_mode(SqliteJournalMode::Wal);
    }

    // Every connection to `:memory:` is its own database, so keep exactly one
    // and never let the pool recycle it.
    let mut pool_opts = SqlitePoolOptions::new().max_connections(if in_memory { 1 } else { 8 });
    if in_memory {
        pool_opts = pool_opts.idle_timeout(None).max_lifetime(None);
    }

    let pool = pool_opts.connect_with(opts).await?;

    ensure_schema(&pool).await?;
    Ok(pool)
}

pub async fn ensure_schema(db: &SqlitePool) -> Result<(), sqlx::Error> {
    // users: unique email
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id            TEXT PRIMARY KEY,
            name          TEXT NOT NULL,
            email         TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at    TEXT NOT NULL,
            updated_at    TEXT NOT NULL
        )
        "#,
    )
    .execute(db)
    .await?;

    // user_profiles: at most one per user
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_profiles (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id           TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
            organization_name TEXT NOT NULL,
            category          TEXT NOT NULL,
            mobile_number     TEXT NOT NULL,
            created_at        TEXT NOT NULL,
            updated_at        TEXT NOT NULL
        )
        "#,
    )
    .execute(db)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dustbins (
            id                   INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id              TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name                 TEXT NOT NULL,
            kind                 TEXT NOT NULL,
            location_name        TEXT NOT NULL,
            latitude             TEXT NOT NULL,
            longitude            TEXT NOT NULL,
            fill_level           INTEGER NOT NULL DEFAULT 0 CHECK (fill_level BETWEEN 0 AND 100),
            status               TEXT NOT NULL DEFAULT 'empty',
            last_collection_date TEXT,
            next_collection_date TEXT,
            is_active            INTEGER NOT NULL DEFAULT 1,
            created_at           TEXT NOT NULL,
            updated_at           TEXT NOT NULL
        )
        "#,
    )
    .execute(db)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notifications (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id    TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            dustbin_id INTEGER REFERENCES dustbins(id) ON DELETE CASCADE,
            message    TEXT NOT NULL,
            kind       TEXT NOT NULL,
            is_read    INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(db)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS collections (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id        TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            dustbin_id     INTEGER NOT NULL REFERENCES dustbins(id) ON DELETE CASCADE,
            scheduled_date TEXT NOT NULL,
            completed_date TEXT,
            status         TEXT NOT NULL DEFAULT 'scheduled',
            notes          TEXT,
            created_at     TEXT NOT NULL,
            updated_at     TEXT NOT NULL
        )
        "#,
    )
    .execute(db)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS analytics (
            id                 INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id            TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            dustbin_id         INTEGER NOT NULL REFERENCES dustbins(id) ON DELETE CASCADE,
            date               TEXT NOT NULL,
            waste_collected_kg REAL NOT NULL,
            fill_level_avg     INTEGER NOT NULL,
            collections_count  INTEGER NOT NULL,
            created_at         TEXT NOT NULL
        )
        "#,
    )
    .execute(db)
    .await?;

    let indexes = [
        "CREATE INDEX IF NOT EXISTS dustbins_user_id_is_active_idx ON dustbins (user_id, is_active)",
        "CREATE INDEX IF NOT EXISTS dustbins_status_idx ON dustbins (status)",
        "CREATE INDEX IF NOT EXISTS notifications_user_id_is_read_idx ON notifications (user_id, is_read)",
        // alert dedup lookup during ingestion
        "CREATE INDEX IF NOT EXISTS notifications_dustbin_id_kind_idx ON notifications (dustbin_id, kind)",
        "CREATE INDEX IF NOT EXISTS collections_user_id_status_idx ON collections (user_id, status)",
        "CREATE INDEX IF NOT EXISTS collections_scheduled_date_idx ON collections (scheduled_date)",
        "CREATE INDEX IF NOT EXISTS analytics_user_id_date_idx ON analytics (user_id, date)",
        "CREATE INDEX IF NOT EXISTS analytics_dustbin_id_idx ON analytics (dustbin_id)",
    ];

    for ddl in indexes {
        sqlx::query(ddl).execute(db).await?;
    }

    Ok(())
}

pub async fn ping(db: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(db).await?;
    Ok(())
}

//! Library entrypoint for Waste Wizard.
//!
//! This file exists mainly to make controller tests easy (integration tests
//! under `tests/` can import the app state, routers, controllers, services).

pub mod config;
pub mod error;
pub mod events;
pub mod models;

// Kept at crate root so handlers and routes can say `crate::auth`.
#[path = "middleware/auth.rs"]
pub mod auth;

pub mod services;

pub mod controllers;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub settings: config::Settings,
    pub events_tx: tokio::sync::broadcast::Sender<events::AppEvent>,
}

impl AppState {
    pub fn new(db: sqlx::SqlitePool, settings: config::Settings) -> Self {
        let (events_tx, _events_rx) = tokio::sync::broadcast::channel(64);
        Self {
            db,
            settings,
            events_tx,
        }
    }
}

pub mod db_init;

pub mod auth_service;
pub mod user_service;
pub mod dustbin_service;
pub mod ingest_service;
pub mod notification_service;
pub mod collection_service;
pub mod analytics_service;

use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use waste_wizard::{AppState, config, routes, services::db_init};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("waste_wizard=info,tower_http=info")),
        )
        .init();

    let settings = config::load();
    tracing::debug!(?settings, "configuration loaded");

    if settings.uses_dev_jwt_secret() {
        tracing::warn!("JWT_SECRET is not set; using the development secret");
    }
    if settings.hardware_api_key.is_none() {
        tracing::warn!("HARDWARE_API_KEY is not set; device reports will be rejected");
    }

    let db = db_init::connect(&settings).await?;
    tracing::info!(database_url = %settings.database_url, "database ready");

    let addr = SocketAddr::from((settings.host.parse::<std::net::IpAddr>()?, settings.port));
    let app = routes::app(AppState::new(db, settings));

    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

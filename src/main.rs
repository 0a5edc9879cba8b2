use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use photo_gallery::{
    backend::build_backends,
    config::{BackendConfig, GalleryConfig},
    gallery::GalleryStore,
    pages::{self, AppState},
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = GalleryConfig::from_env()?;
    let bind_address = config.bind_address();
    let (records, blobs) = build_backends(&config)?;

    let store = Arc::new(GalleryStore::open(records, blobs).await);
    if let Some(error) = store.error().await {
        warn!("initial image fetch failed: {error}");
    }

    let files_dir = match config.backend {
        BackendConfig::Local => Some(config.files_dir()),
        BackendConfig::Remote { .. } => None,
    };
    let router = pages::router(AppState { store: store.clone() }, files_dir);
    let tcp_listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("gallery started at http://{bind_address}, public url {}", config.public_url);

    axum::serve(tcp_listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    info!("gallery stopped");
    Ok(())
}

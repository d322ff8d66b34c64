mod app;
mod catalog;
mod config;
mod routes;
mod state;
mod store;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use crate::catalog::RegionCatalog;
use crate::state::AppState;
use crate::store::VisitedStore;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let area_property = config::area_property();
    let geojson_path = config::geojson_path();
    tracing::info!(path = %geojson_path.display(), %area_property, "Loading region GeoJSON...");
    let catalog = RegionCatalog::load_or_empty(&geojson_path, &area_property).await;
    if catalog.available.is_empty() {
        tracing::error!(
            path = %geojson_path.display(),
            "no regions available; check GEOJSON_PATH and AREA_PROPERTY"
        );
    }

    let store = VisitedStore::new(config::visited_areas_file());
    let visited = store.load().await;
    tracing::info!(
        path = %store.path().display(),
        visited = visited.len(),
        "Visited areas loaded"
    );

    let state = AppState::new(catalog, store);
    let app = app::build_app(state, &config::static_dir());

    let addr = format!("0.0.0.0:{}", config::server_port());
    tracing::info!("Visit map server listening on {addr}");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind TCP listener");
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server failed");
    }

    tracing::info!("Server shut down gracefully");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                return;
            }
        };
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

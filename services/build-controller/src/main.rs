pub mod app;
pub mod config;
pub mod error;
pub mod implementations;
pub mod services;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::{env, net::SocketAddr};

use factory::factories::{kubernetes::Kubernetes, observability::Observability};
use tokio::task::JoinSet;
use tracing::{error, info};
use utility::shutdown_signal::shutdown_signal;

use crate::{
    config::Config,
    error::AppError,
    services::{
        reconciler::Reconciler, reconciliation_loop::start_reconciliation_loop,
        store::kubernetes::KubeStore,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    // These are baked at COMPILE time
    let cargo_manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let cargo_crate_name = env!("CARGO_CRATE_NAME");
    let cargo_pkg_name = env!("CARGO_PKG_NAME");
    let cargo_pkg_version = env!("CARGO_PKG_VERSION");

    // Load service-specific .env
    dotenvy::from_path(cargo_manifest_dir.join(".env")).ok();
    // Load workspace root .env as fallback
    dotenvy::dotenv().ok();

    let path = env::var("CONFIG").unwrap_or("config.json".to_string());
    let cfg = Config::init(cargo_manifest_dir.join(path)).await?;

    let _guard = Observability::init(
        cargo_crate_name.to_string(),
        cargo_pkg_version.to_string(),
        &cfg.observability,
    )
    .await;

    let kubernetes = Kubernetes::new(&cfg).await?;
    let store = KubeStore::new(
        kubernetes.client.clone(),
        cfg.reconciler.field_manager.clone(),
    );
    let reconciler = Arc::new(Reconciler::new(store, cfg.reconciler.clone()));
    let ready = Arc::new(AtomicBool::new(false));

    let mut set = JoinSet::new();

    set.spawn(start_reconciliation_loop(reconciler, ready.clone()));
    set.spawn(start_health_server(
        cargo_pkg_name,
        cargo_pkg_version,
        cfg.server_address,
        ready,
    ));

    info!("✅ All background tasks started");

    tokio::select! {
        _ = shutdown_signal() => {
            info!("🛑 Shutdown signal received");
            set.shutdown().await;
        }
        Some(result) = set.join_next() => {
            match result {
                Ok(Ok(())) => error!("A background task exited unexpectedly!"),
                Ok(Err(e)) => error!("Task failed: {}", e),
                Err(e) => error!("Task panic: {}", e),
            }
            set.shutdown().await;
        }
    }

    info!("👋 Shutting down gracefully...");

    Ok(())
}

async fn start_health_server(
    cargo_pkg_name: &'static str,
    cargo_pkg_version: &'static str,
    addr: SocketAddr,
    ready: Arc<AtomicBool>,
) -> Result<(), AppError> {
    let app = app::app(cargo_pkg_name, cargo_pkg_version, ready);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("🚀 {} service running at {:#?}", cargo_pkg_name, addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

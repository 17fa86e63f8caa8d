use std::sync::Arc;

use axum::http::Method;
use bookmark_service::config::{Cli, Config, default_config_dir, default_config_path};
use bookmark_service::db::Database;
use bookmark_service::error::unpack_anyhow;
use bookmark_service::handler::{AppState, router};
use bookmark_service::unpack_error;
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    // With --config, data (the database file) lives next to the config file.
    // Otherwise both live in ~/.bookmarks/
    let (config_path, data_dir) = match args.config_path {
        Some(path) => {
            let path = std::path::PathBuf::from(path);
            let dir = path
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| std::path::PathBuf::from("."));
            (path, dir)
        }
        None => (default_config_path(), default_config_dir()),
    };

    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        eprintln!("failed to create data directory {:?}: {}", data_dir, e);
        std::process::exit(1);
    }

    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!("bookmarks.svc starting");

    let cfg = Config::new(&config_path.to_string_lossy()).unwrap_or_else(|e| {
        tracing::error!(error = %unpack_anyhow(&e), path = ?config_path, "failed to load config file");
        std::process::exit(1);
    });
    let identity_header = cfg.auth.header_name().unwrap_or_else(|e| {
        tracing::error!(error = %unpack_anyhow(&e), "invalid auth config");
        std::process::exit(1);
    });
    let db = Arc::new(Database::new(&cfg, &data_dir).await.unwrap_or_else(|e| {
        tracing::error!(error = %unpack_anyhow(&e), "failed to setup database");
        std::process::exit(1);
    }));

    let address = format!("0.0.0.0:{}", cfg.app.get_port());
    let cancellation_token = CancellationToken::new();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    let app = router(AppState {
        db: db.clone(),
        identity_header,
    })
    .layer(cors);

    let listener = tokio::net::TcpListener::bind(&address).await.unwrap_or_else(|e| {
        tracing::error!(error = %unpack_error(&e), "failed to setup tcp listener");
        std::process::exit(1);
    });

    let shutdown = cancellation_token.clone();
    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl+c");
            return;
        }
        tracing::info!("ctrl+c signal received, preparing to shutdown");
        shutdown.cancel();
    });

    tracing::info!("bookmarks.svc running on {}", &address);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(cancellation_token.clone().cancelled_owned());
    if let Err(err) = server.await {
        tracing::error!(error = %unpack_error(&err), "server stopped unexpectedly");
        std::process::exit(1);
    }

    if let Err(e) = db.sync().await {
        tracing::warn!(error = %unpack_anyhow(&e), "final replica sync failed");
    }
    tracing::info!("bookmarks.svc going off, graceful shutdown complete");
}

use std::sync::Arc;

use alliance_hub::config::Config;
use alliance_hub::scheduler::Scheduler;
use alliance_hub::server::{AppState, build_router};
use alliance_hub::store::Store;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alliance_hub=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(?config, "Starting alliance hub");

    let store = match Store::open(&config.data_dir) {
        Ok(store) => Arc::new(RwLock::new(store)),
        Err(e) => {
            error!(error = %e, dir = %config.data_dir.display(), "Failed to open store");
            std::process::exit(1);
        }
    };

    let shutdown = CancellationToken::new();
    let scheduler = if config.scheduler_enabled {
        let scheduler = Scheduler::new(store.clone(), config.scheduler.clone());
        Some(tokio::spawn(scheduler.run(shutdown.clone())))
    } else {
        info!("Scheduler disabled");
        None
    };

    let app = build_router(AppState::new(store, config.scheduler.lookahead_days));
    let listener = match tokio::net::TcpListener::bind(config.addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, addr = %config.addr, "Failed to bind");
            std::process::exit(1);
        }
    };
    info!("listening on {}", config.addr);

    let signal = shutdown.clone();
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutting down");
            signal.cancel();
        })
        .await;
    if let Err(e) = served {
        error!(error = %e, "Server error");
    }

    shutdown.cancel();
    if let Some(handle) = scheduler
        && let Err(e) = handle.await
    {
        error!(error = %e, "Scheduler task failed");
    }
}

pub mod budget_handlers;
pub mod handlers;
pub mod km_handlers;
pub mod kopeg_handlers;
pub mod realtime;
mod routes;

use axum::{routing::get, Router};
use sqlx::{Pool, Sqlite};

use crate::config::ServeArgs;
use realtime::Notifier;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Sqlite>,
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(db: Pool<Sqlite>, broadcast_capacity: usize) -> Self {
        Self {
            db,
            notifier: Notifier::new(broadcast_capacity),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "Backend is running" }))
        .merge(routes::api_routes())
        .with_state(state)
}

pub async fn run_server(pool: Pool<Sqlite>, settings: &ServeArgs) -> anyhow::Result<()> {
    let state = AppState::new(pool, settings.broadcast_capacity);

    if let Some(every) = settings.push_interval() {
        realtime::spawn_periodic_push(state.notifier.clone(), state.db.clone(), every);
    }

    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    tracing::info!(addr = %settings.bind_addr, "server listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

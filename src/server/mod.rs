//! HTTP service.
//!
//! | Route | Method | Handler |
//! |---|---|---|
//! | `/health` | GET | [`handlers::health`] |
//! | `/tasks` | GET, POST | [`handlers::list_tasks`], [`handlers::create_task`] |
//! | `/tasks/stats` | GET | [`handlers::task_stats`] |
//! | `/tasks/{id}` | GET, PUT, DELETE | [`handlers::get_task`], [`handlers::update_task`], [`handlers::delete_task`] |
//! | `/assistant/chat` | POST | [`assistant::chat`] |
//!
//! Every response is wrapped in [`response::Envelope`]. Handlers run store
//! calls on the blocking pool through [`Tasks::run`], so a slow query never
//! holds up a runtime worker.

pub mod assistant;
pub mod handlers;
pub mod request_id;
pub mod response;

use crate::api::llm::{self, ChatCompletion};
use crate::assistant::Assistant;
use crate::db::db::Db;
use crate::db::tasks::Tasks;
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::{msg_error_anyhow, msg_info};
use anyhow::Result;
use axum::routing::{get, post};
use axum::{middleware, Router};
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Handles shared by all routes. Cloning is cheap; the store connection is shared.
#[derive(Clone)]
pub struct AppState {
    pub tasks: Tasks,
    pub assistant: Assistant,
}

impl AppState {
    /// Builds the assistant on top of the same store handle the task routes use.
    pub fn new(tasks: Tasks, llm: Arc<dyn ChatCompletion>) -> Self {
        let assistant = Assistant::new(tasks.clone(), llm);
        AppState { tasks, assistant }
    }
}

/// Builds the application router.
///
/// # Arguments
///
/// * `state` - Store and assistant shared by all handlers
/// * `cors` - Adds a permissive CORS layer for browser front-ends
///
/// # Returns
///
/// A router with request tracing and `x-request-id` propagation on every
/// route. Tests drive it directly with `tower::ServiceExt::oneshot`.
///
/// # Examples
///
/// ```rust,ignore
/// let state = AppState::new(Tasks::new(Db::in_memory()?), Arc::new(llm::Disabled));
/// let app = router(state, false);
/// ```
pub fn router(state: AppState, cors: bool) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health))
        .route("/tasks", get(handlers::list_tasks).post(handlers::create_task))
        .route("/tasks/stats", get(handlers::task_stats))
        .route(
            "/tasks/{id}",
            get(handlers::get_task).put(handlers::update_task).delete(handlers::delete_task),
        )
        .route("/assistant/chat", post(assistant::chat))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id::request_id_middleware));

    if cors {
        router = router.layer(CorsLayer::permissive());
    }

    router
}

/// Opens the store, binds the configured address and serves until Ctrl-C.
///
/// The database is `server.database` when set, otherwise `taskpad.db` in the
/// data directory. Migrations run as it is opened. Without model settings
/// the assistant still answers, with its apology text.
///
/// # Returns
///
/// `Ok(())` after a graceful shutdown. Fails early if the store cannot be
/// opened or the address is taken.
pub async fn serve(config: &Config) -> Result<()> {
    let server = config.server();
    let db = match &server.database {
        Some(path) => Db::open(Path::new(path))?,
        None => Db::new()?,
    };
    let state = AppState::new(Tasks::new(db), llm::from_config_or_disabled(&config.llm()));
    let app = router(state, server.cors);

    let addr = server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| msg_error_anyhow!(Message::ServerBindFailed(addr.clone(), e.to_string())))?;

    msg_info!(Message::ServerStarting(addr));
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    msg_info!(Message::ServerStopped);

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

//! HTTP routes
//!
//! Thin axum layer over the refresh facade. Refreshes block on network and
//! SQLite, so each handler hops onto the blocking pool. Every refresh
//! answers 200 with `{"ok": bool, "updated": bool}`: `ok` says the pass
//! completed, `updated` says the store changed. Pipeline failures are
//! logged in the facade and surface here as `ok: false`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use epiwatch_core::model::Scope;
use epiwatch_engine::{Action, Fetch, Ingestor};
use epiwatch_store::DocumentStore;
use serde::Serialize;

pub struct AppState<S, F> {
    ingestor: Arc<Ingestor<S, F>>,
}

impl<S, F> Clone for AppState<S, F> {
    fn clone(&self) -> Self {
        Self {
            ingestor: self.ingestor.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// The pass completed; a steady-state no-op is still `true`
    pub ok: bool,
    /// The store changed
    pub updated: bool,
}

pub fn router<S, F>(ingestor: Arc<Ingestor<S, F>>) -> Router
where
    S: DocumentStore + Send + 'static,
    F: Fetch + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/refresh/global", post(refresh_global::<S, F>))
        .route("/refresh/country", post(refresh_country::<S, F>))
        .route("/refresh/province/:name", post(refresh_province::<S, F>))
        .with_state(AppState { ingestor })
}

async fn health() -> &'static str {
    "ok"
}

async fn refresh_global<S, F>(State(state): State<AppState<S, F>>) -> Json<RefreshResponse>
where
    S: DocumentStore + Send + 'static,
    F: Fetch + 'static,
{
    let ingestor = state.ingestor.clone();
    run_blocking(move || ingestor.refresh(&Scope::Global)).await
}

async fn refresh_country<S, F>(State(state): State<AppState<S, F>>) -> Json<RefreshResponse>
where
    S: DocumentStore + Send + 'static,
    F: Fetch + 'static,
{
    let ingestor = state.ingestor.clone();
    run_blocking(move || ingestor.refresh(&Scope::Country)).await
}

async fn refresh_province<S, F>(
    State(state): State<AppState<S, F>>,
    Path(name): Path<String>,
) -> Json<RefreshResponse>
where
    S: DocumentStore + Send + 'static,
    F: Fetch + 'static,
{
    let ingestor = state.ingestor.clone();
    run_blocking(move || ingestor.refresh(&Scope::Province(name))).await
}

/// Run a blocking refresh off the async workers. A panicked task is
/// reported as a failed pass.
async fn run_blocking<Job>(job: Job) -> Json<RefreshResponse>
where
    Job: FnOnce() -> Option<Action> + Send + 'static,
{
    let outcome = match tokio::task::spawn_blocking(job).await {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::error!(error = %err, "refresh task aborted");
            None
        }
    };
    Json(RefreshResponse {
        ok: outcome.is_some(),
        updated: outcome.is_some_and(|action| action.updated()),
    })
}

pub mod agent;
pub mod auth;
pub mod config;
pub mod error;
pub mod import;
pub mod observability;
pub mod planning;
pub mod routes;
pub mod store;

use std::sync::Arc;

use tower_http::trace::TraceLayer;

pub use routes::AppState;

/// Build the full application router against the configured LLM provider.
///
/// Useful for integration tests that want the production wiring without
/// binding a socket.
pub async fn create_app(config: config::Config) -> anyhow::Result<axum::Router> {
    let provider = agent::OpenAiProvider::new(&config.llm)?;
    let state = AppState::new(config, Arc::new(provider)).await?;
    Ok(routes::router(state).layer(TraceLayer::new_for_http()))
}

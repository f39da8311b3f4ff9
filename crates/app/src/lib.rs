#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod error;
pub mod extract;

use std::sync::Arc;

use axum::Router;
use services::AppServices;
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LogFormat;

/// Shared handler state.
pub struct AppState {
    pub services: AppServices,
}

impl AppState {
    #[must_use]
    pub fn new(services: AppServices) -> Self {
        Self { services }
    }
}

/// Full HTTP surface with request tracing.
pub fn build_router(state: Arc<AppState>) -> Router {
    api::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Install the global subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init(),
    }
}

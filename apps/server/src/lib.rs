//! HTTP service for the Conductor agent orchestrator.
//!
//! Exposes `POST /execute` (multipart `query` + `files`), its streaming
//! variant `POST /execute/stream`, `GET /health` and `GET /agents`.

pub mod config;
pub mod error;
pub mod logging;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::routing::get;
use conductor_abstraction::WebSearch;
use conductor_orchestrator::Orchestrator;
use conductor_providers::{ExtractorChain, ModelConfig, ModelFactory, ModelType, OfflineSearch, SearxngSearch};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use config::{ConfigError, LogFormat, Settings};
pub use error::ApiError;
pub use logging::{RequestLoggerLayer, init_tracing};

/// Room for multipart boundaries and the query field on top of the file bytes.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared state for all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, settings: Settings) -> Self {
        Self { orchestrator: Arc::new(orchestrator), settings: Arc::new(settings) }
    }

    /// Wires the model, search backend and extractors described by `settings`.
    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        let model_type: ModelType = settings
            .model
            .provider
            .parse()
            .map_err(|()| ConfigError::Invalid(format!("unsupported model provider '{}'", settings.model.provider)))?;

        let mut model_config = ModelConfig::new(model_type, settings.model.model_id.clone());
        if let Some(api_key) = &settings.model.api_key {
            model_config = model_config.with_api_key(api_key.clone());
        }
        if let Some(base_url) = &settings.model.base_url {
            model_config = model_config.with_base_url(base_url.clone());
        }
        let model = ModelFactory::create(model_config).map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let search: Arc<dyn WebSearch> = match &settings.search.searxng_url {
            Some(url) => Arc::new(
                SearxngSearch::new(
                    url.clone(),
                    Duration::from_secs(settings.search.timeout_secs),
                    settings.search.max_results,
                )
                .map_err(|e| ConfigError::Invalid(e.to_string()))?,
            ),
            None => Arc::new(OfflineSearch),
        };

        info!(
            model = %settings.model.provider,
            model_id = %settings.model.model_id,
            search = %search.name(),
            "Collaborators configured"
        );

        let orchestrator =
            Orchestrator::standard(model, search, Arc::new(ExtractorChain::default()), settings.orchestrator.clone())
                .with_limits(settings.request_limits());

        Ok(Self::new(orchestrator, settings))
    }
}

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let body_limit = state.settings.server.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES);

    let router = routes::router()
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit));

    let router = match &state.settings.server.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.route("/", get(routes::banner)),
    };

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(RequestLoggerLayer)
        .with_state(state)
}

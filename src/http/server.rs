//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Give each protected route group its own admission guard
//! - Wire up middleware (request ID, tracing, timeout)
//! - Spawn the admission sweeper and the admin API
//! - Serve until shutdown is broadcast

use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin;
use crate::admission::{admission_middleware, RouteGuard, SharedClock, Sweeper, SystemClock};
use crate::config::validation::validate_config;
use crate::config::{AdmissionConfig, ChefitoConfig, ConfigError, SpeechConfig};
use crate::entitlements::EntitlementCache;
use crate::lifecycle::shutdown;
use crate::recipes::{handlers as recipe_handlers, CatalogError, InMemoryCatalog, RecipeCatalog};
use crate::speech::{handlers as speech_handlers, SpeechSynthesizer, UnavailableSynthesizer};

/// Error type for server construction.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// One admission guard per protected route group.
#[derive(Clone)]
pub struct AdmissionGuards {
    pub recipes: RouteGuard,
    pub speech: RouteGuard,
    pub retention_multiplier: u32,
}

impl AdmissionGuards {
    pub fn from_config(config: &AdmissionConfig, clock: SharedClock) -> Self {
        Self {
            recipes: RouteGuard::from_config(
                "recipes",
                &config.routes.recipes,
                &config.client_header,
                clock.clone(),
            ),
            speech: RouteGuard::from_config("speech", &config.routes.speech, &config.client_header, clock),
            retention_multiplier: config.retention_multiplier,
        }
    }

    pub fn all(&self) -> Vec<RouteGuard> {
        vec![self.recipes.clone(), self.speech.clone()]
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn RecipeCatalog>,
    pub entitlements: EntitlementCache,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub speech_config: SpeechConfig,
    pub guards: AdmissionGuards,
}

/// HTTP server for the Chefito backend.
pub struct HttpServer {
    router: Router,
    config: ChefitoConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a server, loading the recipe catalog named in the config.
    pub fn new(config: ChefitoConfig) -> Result<Self, ServerError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let catalog = match &config.catalog.recipes_path {
            Some(path) => InMemoryCatalog::load_from_file(Path::new(path))?,
            None => {
                tracing::warn!("No catalog.recipes_path configured, serving an empty catalog");
                InMemoryCatalog::new()
            }
        };
        Self::with_collaborators(
            config,
            Arc::new(catalog),
            Arc::new(UnavailableSynthesizer),
            Arc::new(SystemClock),
        )
    }

    /// Create a server around explicit catalog, speech and clock collaborators.
    ///
    /// The config is validated here too; a zero sweep interval or window
    /// would otherwise only fail inside the spawned sweeper.
    pub fn with_collaborators(
        config: ChefitoConfig,
        catalog: Arc<dyn RecipeCatalog>,
        speech: Arc<dyn SpeechSynthesizer>,
        clock: SharedClock,
    ) -> Result<Self, ServerError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let state = AppState {
            catalog,
            entitlements: EntitlementCache::new(config.entitlements.free_recipes),
            speech,
            speech_config: config.speech.clone(),
            guards: AdmissionGuards::from_config(&config.admission, clock),
        };

        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            config,
            state,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ChefitoConfig, state: AppState) -> Router {
        let recipes = Router::new()
            .route("/api/recipes", get(recipe_handlers::list_recipes))
            .route("/api/recipes/{id}", get(recipe_handlers::get_recipe))
            .route_layer(middleware::from_fn_with_state(
                state.guards.recipes.clone(),
                admission_middleware,
            ));

        let speech = Router::new()
            .route("/api/speech", post(speech_handlers::synthesize))
            .route_layer(middleware::from_fn_with_state(
                state.guards.speech.clone(),
                admission_middleware,
            ));

        Router::new()
            .route("/health", get(health_handler))
            .merge(recipes)
            .merge(speech)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let admission = &self.config.admission;
        let sweeper = Sweeper::new(
            self.state.guards.all(),
            Duration::from_secs(admission.sweep_interval_secs),
            admission.retention_multiplier,
        );
        tokio::spawn(sweeper.run(shutdown_rx.resubscribe()));

        if self.config.admin.enabled {
            let admin_listener = TcpListener::bind(&self.config.admin.bind_address).await?;
            let admin_router = admin::setup_admin_router(self.state.clone(), &self.config.admin.api_key);
            let admin_shutdown = shutdown_rx.resubscribe();
            tracing::info!(address = %self.config.admin.bind_address, "Admin API starting");

            tokio::spawn(async move {
                if let Err(e) = axum::serve(admin_listener, admin_router)
                    .with_graceful_shutdown(shutdown::wait(admin_shutdown))
                    .await
                {
                    tracing::error!(error = %e, "Admin API stopped with error");
                }
            });
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &ChefitoConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::ValidationError;

    fn server_with(config: ChefitoConfig) -> Result<HttpServer, ServerError> {
        HttpServer::with_collaborators(
            config,
            Arc::new(InMemoryCatalog::new()),
            Arc::new(UnavailableSynthesizer),
            Arc::new(SystemClock),
        )
    }

    #[test]
    fn test_rejects_zero_sweep_interval() {
        let mut config = ChefitoConfig::default();
        config.admission.sweep_interval_secs = 0;

        match server_with(config) {
            Err(ServerError::Config(ConfigError::Validation(errors))) => {
                assert_eq!(
                    errors,
                    vec![ValidationError::Zero {
                        field: "admission.sweep_interval_secs".into()
                    }]
                );
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("server accepted a zero sweep interval"),
        }
    }

    #[test]
    fn test_new_validates_before_loading_catalog() {
        let mut config = ChefitoConfig::default();
        config.admission.routes.speech.window_ms = 0;
        config.catalog.recipes_path = Some("/nonexistent/recipes.json".into());

        assert!(matches!(
            HttpServer::new(config),
            Err(ServerError::Config(ConfigError::Validation(_)))
        ));
    }

    #[test]
    fn test_default_config_builds_both_guards() {
        let server = server_with(ChefitoConfig::default()).unwrap();
        let guards = server.state().guards.all();
        assert_eq!(guards.len(), 2);
        assert_eq!(guards[0].name(), "recipes");
        assert_eq!(guards[1].name(), "speech");
    }
}

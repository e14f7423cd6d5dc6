//! RESTful API implementation with Axum.

use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod handlers;
pub mod state;

pub use state::AppState;

use crate::config::ServerConfig;
use crate::Result;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Master Patient Index Linkage API",
        version = "0.1.0",
        description = "Probabilistic record-linkage API for a Master Patient Index",
        contact(name = "MPI Development Team", email = "support@example.com")
    ),
    paths(
        handlers::health_check,
        handlers::link_patient,
        handlers::upload_algorithm,
        handlers::get_algorithm,
    ),
    components(
        schemas(
            crate::models::RawPiiRecord,
            crate::models::RawPiiName,
            crate::models::RawPiiAddress,
            crate::models::RawTelecom,
            crate::models::PiiRecord,
            crate::models::Identifier,
            crate::matching::AlgorithmConfig,
            crate::matching::LinkResult,
            handlers::LinkRequest,
            handlers::HealthResponse,
        )
    ),
    tags(
        (name = "linkage", description = "Patient-to-Person linkage"),
        (name = "algorithms", description = "Algorithm configuration management"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Builds the full router: `/link`, algorithm management, the FHIR input
/// adapter, and Swagger UI. Bounds every request by the configured overall
/// timeout (§5), default 30s.
pub fn create_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/link", post(handlers::link_patient))
        .route("/algorithms", post(handlers::upload_algorithm))
        .route("/algorithms/:label", get(handlers::get_algorithm));

    let fhir_routes = Router::new()
        .route("/Patient/$link", post(crate::api::fhir::handlers::link_fhir_patient));

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/fhir", fhir_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .with_state(state)
}

/// Starts the REST API server.
pub async fn serve(config: ServerConfig, state: AppState) -> Result<()> {
    let app = create_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| crate::Error::Api(e.to_string()))?;

    tracing::info!("REST API server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| crate::Error::Api(e.to_string()))?;

    Ok(())
}

mod config;
mod handlers;
mod models;
mod reputation;
mod states;
mod verifier;

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::reputation::IpReputationService;

/// Serves the OpenAPI specification YAML file.
///
/// This endpoint reads the `openapi.yml` file from the filesystem and serves it
/// with the appropriate content type. If the file is not found, it returns a 404 error.
async fn serve_openapi_spec() -> impl IntoResponse {
    match tokio::fs::read_to_string("openapi.yml").await {
        Ok(content) => (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "text/yaml")],
            content,
        )
            .into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "OpenAPI spec not found.").into_response(),
    }
}

/// Serves the Swagger UI HTML page.
///
/// This endpoint returns an HTML page that embeds the Swagger UI, configured to
/// load the OpenAPI specification served by `serve_openapi_spec`.
async fn serve_swagger_ui() -> impl IntoResponse {
    let html = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Lead Verify API - Swagger UI</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        body { margin: 0; padding: 0; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {
            window.ui = SwaggerUIBundle({
                url: "/api-docs/openapi.yml",
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout"
            });
        };
    </script>
</body>
</html>
"#;
    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
}

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - The IP reputation client (degraded mode when no API key is configured).
/// - HTTP routes and middleware (CORS, request tracing, body size limit).
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lead_verify_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize IP reputation client. A missing API key is not fatal: the
    // service starts degraded and every lead is rejected fail-closed.
    let reputation = match IpReputationService::from_config(&config)? {
        Some(client) => {
            tracing::info!("✓ IP reputation client initialized: {}", config.ipqs_base_url);
            Some(client)
        }
        None => {
            tracing::warn!("IP reputation client not configured; starting in degraded mode");
            None
        }
    };

    // Build application state
    let app_state = Arc::new(handlers::AppState { reputation });

    // Build API routes
    let api_routes = Router::new()
        // API Documentation
        .route("/docs", get(serve_swagger_ui))
        .route("/api-docs/openapi.yml", get(serve_openapi_spec))
        // Lead verification endpoint
        .route("/api/v1/leads/verify", post(handlers::verify_lead))
        .layer(
            ServiceBuilder::new()
                // Request size limit: 64KB max payload (lead bodies are tiny)
                .layer(RequestBodyLimitLayer::new(64 * 1024)),
        );

    // Build final app with health check
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(api_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // ConnectInfo supplies the peer address used as the client-IP fallback
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

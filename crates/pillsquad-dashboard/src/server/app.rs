use crate::server::{routes, static_files};
use crate::state::DashboardState;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum application
pub fn build_app(state: DashboardState) -> Router {
    let cors = if state.config.allow_any_origin {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list([
                HeaderValue::from_static("http://localhost:5173"),
                HeaderValue::from_static("http://127.0.0.1:5173"),
            ]))
            .allow_methods(Any)
            .allow_headers(Any)
    };
    let upload_limit = state.config.upload_limit_bytes;

    let api_routes = Router::new()
        .route("/health", get(routes::health))
        // Page analysis
        .route("/analyze", post(routes::analyze))
        .route("/certify", post(routes::certify))
        // Predictions
        .route("/predict", post(routes::predict))
        .route("/predict-company", post(routes::predict_company))
        // Images
        .route("/classify-url", post(routes::classify_url))
        .route("/classify-upload", post(routes::classify_upload));

    Router::new()
        .nest("/api", api_routes)
        .fallback(static_files::serve_static)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(upload_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the server
pub async fn run_server(state: DashboardState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = build_app(state);

    tracing::info!("Starting PillSquad dashboard on {}", addr);
    tracing::info!("Open http://{} in your browser", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

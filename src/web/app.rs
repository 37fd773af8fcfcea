use super::{
    AppState, MAX_UPLOAD_SIZE_BYTES, MULTIPART_OVERHEAD_BYTES, error::panic_response, handlers,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::path::Path;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::Level;

pub fn create_app(state: AppState, public_dir: impl AsRef<Path>) -> Router {
    let run_mode = state.run_mode;

    // Configure the router with all API endpoints
    Router::new()
        .route("/compress", post(handlers::compress_pdf))
        .route("/download/{filename}", get(handlers::download_file))
        .route("/health", get(handlers::health))
        // Everything else is looked up in the static asset directory
        .fallback_service(ServeDir::new(public_dir))
        // Apply a layer to limit the maximum size of request bodies
        .layer(DefaultBodyLimit::max(
            MAX_UPLOAD_SIZE_BYTES + MULTIPART_OVERHEAD_BYTES,
        ))
        // Turn panics into a JSON 500 instead of dropping the connection
        .layer(CatchPanicLayer::custom(panic_response(run_mode)))
        // Add CORS layer for broader client compatibility
        .layer(CorsLayer::permissive())
        // Add tracing for HTTP requests and responses
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::new().level(Level::INFO)))
        // Provide the shared state
        .with_state(state)
}

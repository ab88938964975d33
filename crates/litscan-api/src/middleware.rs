//! Shared tower-http layer stack: tracing, CORS, and a request body limit,
//! wired the same way for both the producer and consumer routers.

use axum::http::{header, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

const MAX_BODY_SIZE_BYTES: usize = 10 * 1024 * 1024;

pub fn with_ambient_layers(router: Router) -> Router {
    let allowed_origins: Vec<_> = litscan_core::config::allowed_origins()
        .into_iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    router
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT]),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE_BYTES))
}

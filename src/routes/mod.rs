use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
};

use crate::{AppState, config::Settings};

pub mod home_routes;
pub mod prices_routes;
pub mod alerts_routes;
pub mod stats_routes;
pub mod email_routes;

pub fn app(state: AppState) -> Router {
    let router = Router::<AppState>::new();

    let router = home_routes::add_routes(router);
    let router = prices_routes::add_routes(router);
    let router = alerts_routes::add_routes(router);
    let router = stats_routes::add_routes(router);
    let router = email_routes::add_routes(router);

    let frontend = state.settings.frontend_dir.clone();

    router
        .route_service("/", ServeFile::new(frontend.join("index.html")))
        .fallback_service(ServeDir::new(&frontend))
        .layer(cors_layer(&state.settings))
        .with_state(state)
}

/// `*` mirrors any origin; otherwise a single origin with credentials.
pub fn cors_layer(settings: &Settings) -> CorsLayer {
    let origin = settings.cors_origin.trim();

    let allow_origin = if origin == "*" {
        AllowOrigin::mirror_request()
    } else {
        match HeaderValue::from_str(origin) {
            Ok(v) => AllowOrigin::exact(v),
            Err(_) => {
                tracing::warn!(%origin, "invalid CORS_ORIGIN, cross-origin requests disabled");
                AllowOrigin::list(Vec::<HeaderValue>::new())
            }
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

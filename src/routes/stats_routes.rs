use axum::{Router, routing::get};
use crate::{AppState, controllers::stats_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/api/stats", get(stats_controller::get_stats))
}

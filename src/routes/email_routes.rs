use axum::{Router, routing::post};
use crate::{AppState, controllers::email_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/api/test-email", post(email_controller::post_test_email))
}

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::AppState;

// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> Response {
    let active = match state.store.count_active().await {
        Ok(n) => n,
        Err(e) => {
            tracing::error!(error = %e, "error fetching stats");
            return e.into_response();
        }
    };

    Json(json!({
        "success": true,
        "data": {
            "monitoredCoins": state.settings.coins.len(),
            "activeAlerts": active,
            "alertsSent": state.monitor.alerts_sent(),
        }
    }))
    .into_response()
}

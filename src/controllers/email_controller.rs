use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;

use crate::{
    AppState,
    models::{Alert, AlertCondition, Quote},
};

fn test_alert() -> (Alert, Quote) {
    let alert = Alert {
        id: 0,
        coin: "bitcoin".to_string(),
        condition: AlertCondition::Above,
        threshold: 50_000.0,
        active: true,
        created_at: Utc::now(),
    };

    let quote = Quote {
        coin: "bitcoin".to_string(),
        display_name: "Bitcoin".to_string(),
        symbol: "BTC".to_string(),
        price: 95_000.0,
        change_24h: 2.45,
    };

    (alert, quote)
}

// POST /api/test-email
pub async fn post_test_email(State(state): State<AppState>) -> Response {
    tracing::info!("sending test email");

    let (alert, quote) = test_alert();

    match state.monitor.notifier().notify(&alert, quote.price, &quote).await {
        Ok(()) => Json(json!({
            "success": true,
            "message": "Test email sent successfully!",
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "error sending test email");
            e.into_response()
        }
    }
}

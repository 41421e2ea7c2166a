use std::collections::BTreeMap;

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};

use crate::{AppState, models::PriceView};

// GET /api/prices
pub async fn get_prices(State(state): State<AppState>) -> Response {
    let outcome = match state.monitor.run_pass().await {
        Ok(o) => o,
        Err(e) => {
            tracing::error!(error = %e, "error fetching crypto prices");
            return e.into_response();
        }
    };

    // prices are still served when only the alert check failed
    if let Err(e) = &outcome.report {
        tracing::error!(error = %e, "error checking alerts");
    }

    let body: BTreeMap<String, PriceView> = outcome
        .quotes
        .iter()
        .map(|q| (q.coin.clone(), PriceView::from(q)))
        .collect();

    Json(body).into_response()
}

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState,
    error::AppError,
    models::{AlertCondition, NewAlert},
};

#[derive(Debug, Deserialize)]
pub struct CreateAlertRequest {
    pub coin: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub threshold: f64,
}

impl CreateAlertRequest {
    fn validate(self, state: &AppState) -> Result<NewAlert, AppError> {
        let coin = self.coin.trim().to_lowercase();
        if !state.settings.is_monitored(&coin) {
            return Err(AppError::BadRequest(format!("Unsupported coin: {coin}")));
        }

        let condition: AlertCondition = self.kind.parse().map_err(|_| {
            AppError::BadRequest("Alert type must be price_above or price_below".to_string())
        })?;

        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(AppError::BadRequest(
                "Threshold must be a positive number".to_string(),
            ));
        }

        Ok(NewAlert {
            coin,
            condition,
            threshold: self.threshold,
        })
    }
}

// GET /api/alerts
pub async fn get_alerts(State(state): State<AppState>) -> Response {
    match state.store.list().await {
        Ok(alerts) => {
            tracing::debug!(count = alerts.len(), "fetched alerts");
            Json(json!({ "success": true, "data": alerts })).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "error fetching alerts");
            e.into_response()
        }
    }
}

// POST /api/alerts
pub async fn post_create_alert(
    State(state): State<AppState>,
    body: Result<Json<CreateAlertRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(rejection) => {
            return AppError::BadRequest(format!("Invalid alert payload: {}", rejection.body_text()))
                .into_response();
        }
    };

    tracing::info!(coin = %req.coin, kind = %req.kind, threshold = req.threshold, "creating new alert");

    let new_alert = match req.validate(&state) {
        Ok(a) => a,
        Err(e) => return e.into_response(),
    };

    match state.store.create(new_alert).await {
        Ok(alert) => Json(json!({
            "success": true,
            "message": "Alert created successfully",
            "alert": alert,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "error creating alert");
            e.into_response()
        }
    }
}

// DELETE /api/alerts/:id
pub async fn delete_alert(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Ok(id) = id.trim().parse::<u64>() else {
        return AppError::BadRequest("Invalid alert id".to_string()).into_response();
    };

    match state.store.delete(id).await {
        Ok(()) => Json(json!({
            "success": true,
            "message": "Alert deleted successfully",
        }))
        .into_response(),
        Err(e) => {
            if !matches!(e, AppError::NotFound(_)) {
                tracing::error!(alert_id = id, error = %e, "error deleting alert");
            }
            e.into_response()
        }
    }
}

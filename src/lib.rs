//! Library entrypoint for coinwatch.
//!
//! The binary only wires things together; integration tests under `tests/`
//! build their own `AppState` with scripted price sources and notifiers.

pub mod config;
pub mod error;
pub mod models;
pub mod telemetry;
pub mod templates;

pub mod services;

pub mod controllers;
pub mod routes;

use services::{alert_monitor::AlertMonitor, alert_store::AlertStore};

#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub store: AlertStore,
    pub monitor: AlertMonitor,
}

pub mod coingecko;
pub mod alert_store;
pub mod notifier;
pub mod alert_monitor;

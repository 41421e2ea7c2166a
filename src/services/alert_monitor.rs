//! Evaluation passes and the background scheduler that drives them.
//!
//! An alert is armed while `active` and fires at most once: on a strict
//! threshold crossing the notifier is called, then the alert is deactivated
//! whatever the notifier reported. Passes are serialized through `pass_lock`
//! so the scheduler and `/api/prices` never evaluate the same snapshot twice.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::{sync::Mutex, task::JoinHandle, time};

use crate::{
    error::AppError,
    models::Quote,
    services::{alert_store::AlertStore, coingecko::PriceSource, notifier::Notifier},
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassReport {
    pub evaluated: usize,
    pub fired: Vec<u64>,
    pub notified: usize,
    pub skipped: usize,
    // triggered but could not be deactivated, still armed for the next pass
    pub failed: Vec<u64>,
}

/// Quotes fetched for a pass plus what evaluating them did. The quotes are
/// still usable when evaluation itself failed.
#[derive(Debug)]
pub struct PassOutcome {
    pub quotes: Vec<Quote>,
    pub report: Result<PassReport, AppError>,
}

#[derive(Clone)]
pub struct AlertMonitor {
    store: AlertStore,
    prices: Arc<dyn PriceSource>,
    notifier: Arc<dyn Notifier>,
    pass_lock: Arc<Mutex<()>>,
    alerts_sent: Arc<AtomicU64>,
}

impl AlertMonitor {
    pub fn new(store: AlertStore, prices: Arc<dyn PriceSource>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            prices,
            notifier,
            pass_lock: Arc::new(Mutex::new(())),
            alerts_sent: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Trigger notifications delivered since process start.
    pub fn alerts_sent(&self) -> u64 {
        self.alerts_sent.load(Ordering::Relaxed)
    }

    /// Fetches a fresh quote batch and evaluates every active alert against it.
    /// A failed fetch leaves every alert untouched.
    pub async fn run_pass(&self) -> Result<PassOutcome, AppError> {
        let _pass = self.pass_lock.lock().await;

        let quotes = self.prices.fetch().await?;
        let report = self.evaluate_locked(&quotes).await;

        Ok(PassOutcome { quotes, report })
    }

    /// Evaluates against a quote batch the caller already holds.
    pub async fn evaluate(&self, quotes: &[Quote]) -> Result<PassReport, AppError> {
        let _pass = self.pass_lock.lock().await;
        self.evaluate_locked(quotes).await
    }

    async fn evaluate_locked(&self, quotes: &[Quote]) -> Result<PassReport, AppError> {
        let by_coin: HashMap<&str, &Quote> = quotes.iter().map(|q| (q.coin.as_str(), q)).collect();

        let snapshot = self.store.list().await?;
        let mut report = PassReport::default();

        for alert in snapshot.iter().filter(|a| a.active) {
            report.evaluated += 1;

            let Some(quote) = by_coin.get(alert.coin.as_str()) else {
                tracing::warn!(alert_id = alert.id, coin = %alert.coin, "no price data for coin, skipping");
                report.skipped += 1;
                continue;
            };

            if !alert.is_triggered_by(quote.price) {
                continue;
            }

            tracing::info!(
                alert_id = alert.id,
                coin = %alert.coin,
                price = quote.price,
                condition = %alert.condition,
                threshold = alert.threshold,
                "alert triggered"
            );

            match self.notifier.notify(alert, quote.price, quote).await {
                Ok(()) => {
                    report.notified += 1;
                    self.alerts_sent.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    tracing::error!(alert_id = alert.id, error = %e, "alert notification failed");
                }
            }

            // deactivate regardless of delivery so a broken transport cannot re-fire forever
            match self.store.deactivate(alert.id).await {
                Ok(_) => {
                    report.fired.push(alert.id);
                    tracing::info!(alert_id = alert.id, "alert deactivated");
                }
                Err(AppError::NotFound(id)) => {
                    tracing::warn!(alert_id = id, "alert deleted before it could be deactivated");
                }
                Err(e) => {
                    tracing::error!(alert_id = alert.id, error = %e, "failed to deactivate alert");
                    report.failed.push(alert.id);
                }
            }
        }

        if !report.failed.is_empty() {
            tracing::warn!(failed = ?report.failed, "pass finished with alerts left armed");
        }

        Ok(report)
    }
}

/// Runs one pass immediately, then one per `every`. Missed ticks are skipped
/// rather than bunched up behind a slow pass.
pub fn spawn_price_alert_monitor(monitor: AlertMonitor, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval(every);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;

            tracing::debug!("checking prices and alerts");

            let outcome = match monitor.run_pass().await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(error = %e, "[alert-monitor] price fetch failed");
                    continue;
                }
            };

            match outcome.report {
                Ok(report) if !report.fired.is_empty() || !report.failed.is_empty() => {
                    tracing::info!(
                        fired = report.fired.len(),
                        notified = report.notified,
                        failed = report.failed.len(),
                        "monitor pass fired alerts"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "[alert-monitor] evaluation failed");
                }
            }
        }
    })
}

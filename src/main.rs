use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;

use coinwatch::{
    AppState, config, routes,
    services::{
        alert_monitor::{self, AlertMonitor},
        alert_store::AlertStore,
        coingecko::CoinGeckoClient,
        notifier::EmailNotifier,
    },
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let settings = config::load();

    let store = AlertStore::open(settings.alerts_file.clone())
        .await
        .with_context(|| format!("cannot open alerts file {}", settings.alerts_file.display()))?;

    let prices = CoinGeckoClient::new(
        &settings.price_api_base_url,
        settings.coins.clone(),
        settings.http_timeout,
    )
    .context("failed to build price client")?;

    let notifier = EmailNotifier::from_settings(&settings).context("invalid email settings")?;
    if let Some(to) = notifier.recipient() {
        tracing::info!(%to, "email notifications enabled");
    }

    let monitor = AlertMonitor::new(store.clone(), Arc::new(prices), Arc::new(notifier));

    let state = AppState {
        settings: settings.clone(),
        store,
        monitor: monitor.clone(),
    };

    let app = routes::app(state);

    let ip = settings
        .host
        .parse::<std::net::IpAddr>()
        .with_context(|| format!("invalid HOST {}", settings.host))?;
    let addr = SocketAddr::from((ip, settings.port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;

    tracing::info!("listening on http://{}", addr);
    tracing::info!(
        interval_ms = settings.alert_check_interval.as_millis() as u64,
        "starting background price monitoring"
    );

    let monitor_task = alert_monitor::spawn_price_alert_monitor(monitor, settings.alert_check_interval);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    monitor_task.abort();
    tracing::info!("shut down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use coinwatch::{
    AppState, config,
    error::AppError,
    models::{Alert, Quote},
    services::{
        alert_monitor::AlertMonitor, alert_store::AlertStore, coingecko::PriceSource,
        notifier::Notifier,
    },
};
use http_body_util::BodyExt;

static NEXT_FILE: AtomicUsize = AtomicUsize::new(0);

/// Fresh alerts file path under the system temp dir, unique per test.
pub fn temp_alerts_path(tag: &str) -> PathBuf {
    let n = NEXT_FILE.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir()
        .join(format!("coinwatch-tests-{}", std::process::id()))
        .join(format!("{tag}-{n}"))
        .join("alerts.json")
}

pub async fn temp_store(tag: &str) -> AlertStore {
    AlertStore::open(temp_alerts_path(tag)).await.expect("open store")
}

/// Makes every store write fail: the store stages writes in a sibling
/// `.json.tmp` file, and a directory sitting there cannot be written.
pub fn block_writes(alerts_path: &std::path::Path) {
    std::fs::create_dir_all(alerts_path.with_extension("json.tmp")).expect("block writes");
}

/// Polls `cond` with short sleeps; fails the test if it never holds.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    panic!("condition not reached");
}

pub fn quote(coin: &str, price: f64) -> Quote {
    let mut name = coin.to_string();
    if let Some(first) = name.get_mut(0..1) {
        first.make_ascii_uppercase();
    }

    Quote {
        coin: coin.to_string(),
        display_name: name,
        symbol: coin.chars().take(3).collect::<String>().to_uppercase(),
        price,
        change_24h: 1.5,
    }
}

/// Price source whose next answer the test controls.
pub struct ScriptedPrices {
    next: Mutex<Result<Vec<Quote>, String>>,
    pub calls: AtomicUsize,
}

impl ScriptedPrices {
    pub fn new(quotes: Vec<Quote>) -> Self {
        Self {
            next: Mutex::new(Ok(quotes)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            next: Mutex::new(Err(msg.to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, quotes: Vec<Quote>) {
        *self.next.lock().unwrap() = Ok(quotes);
    }

    pub fn fail(&self, msg: &str) {
        *self.next.lock().unwrap() = Err(msg.to_string());
    }
}

#[async_trait]
impl PriceSource for ScriptedPrices {
    async fn fetch(&self) -> Result<Vec<Quote>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // yield so concurrent passes get a chance to interleave
        tokio::task::yield_now().await;
        self.next
            .lock()
            .unwrap()
            .clone()
            .map_err(AppError::UpstreamUnavailable)
    }
}

/// Notifier that remembers every call and can be told to fail.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(u64, f64)>>,
    pub fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: AtomicBool::new(true),
        }
    }

    pub fn sent(&self) -> Vec<(u64, f64)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, alert: &Alert, current_price: f64, _quote: &Quote) -> Result<(), AppError> {
        self.sent.lock().unwrap().push((alert.id, current_price));
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Notification("smtp down".to_string()));
        }
        Ok(())
    }
}

pub struct Harness {
    pub state: AppState,
    pub prices: Arc<ScriptedPrices>,
    pub notifier: Arc<RecordingNotifier>,
}

pub async fn harness(tag: &str, prices: ScriptedPrices, notifier: RecordingNotifier) -> Harness {
    let mut settings = config::load();
    settings.alerts_file = temp_alerts_path(tag);
    settings.frontend_dir = std::env::temp_dir().join("coinwatch-no-frontend");
    settings.coins = config::default_coins();

    let store = AlertStore::open(settings.alerts_file.clone())
        .await
        .expect("open store");

    let prices = Arc::new(prices);
    let notifier = Arc::new(notifier);
    let monitor = AlertMonitor::new(store.clone(), prices.clone(), notifier.clone());

    Harness {
        state: AppState {
            settings,
            store,
            monitor,
        },
        prices,
        notifier,
    }
}

pub async fn response_json(res: axum::response::Response) -> serde_json::Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

use std::{env, path::PathBuf, time::Duration};

/// One asset the service monitors: the provider id plus how it is displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct CoinSpec {
    pub id: String,
    pub name: String,
    pub symbol: String,
}

impl CoinSpec {
    pub fn new(id: &str, name: &str, symbol: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            symbol: symbol.to_string(),
        }
    }
}

pub fn default_coins() -> Vec<CoinSpec> {
    vec![
        CoinSpec::new("bitcoin", "Bitcoin", "BTC"),
        CoinSpec::new("ethereum", "Ethereum", "ETH"),
        CoinSpec::new("dogecoin", "Dogecoin", "DOGE"),
        CoinSpec::new("litecoin", "Litecoin", "LTC"),
    ]
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    pub price_api_base_url: String,
    pub coins: Vec<CoinSpec>,
    pub cors_origin: String,

    pub email_host: String,
    pub email_port: u16,
    pub email_user: Option<String>,
    pub email_pass: Option<String>,
    pub notification_email: Option<String>,

    pub alert_check_interval: Duration,
    pub alerts_file: PathBuf,
    pub frontend_dir: PathBuf,

    pub http_timeout: Duration,
    pub smtp_timeout: Duration,
}

impl Settings {
    pub fn is_monitored(&self, coin: &str) -> bool {
        self.coins.iter().any(|c| c.id == coin)
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<T>().ok())
        .unwrap_or(default)
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = parsed("PORT", 3000u16);

    let price_api_base_url = env::var("CRYPTO_API_BASE_URL")
        .unwrap_or_else(|_| "https://api.coingecko.com/api/v3".to_string());

    let cors_origin =
        env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let email_host = env::var("EMAIL_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string());
    let email_port = parsed("EMAIL_PORT", 587u16);
    let email_user = non_empty("EMAIL_USER");
    let email_pass = non_empty("EMAIL_PASS");
    let notification_email = non_empty("NOTIFICATION_EMAIL").or_else(|| email_user.clone());

    // milliseconds, zero would spin the scheduler
    let interval_ms = parsed("ALERT_CHECK_INTERVAL", 60_000u64).max(1);

    let alerts_file = env::var("ALERTS_FILE").unwrap_or_else(|_| "data/alerts.json".to_string());
    let frontend_dir = env::var("FRONTEND_DIR").unwrap_or_else(|_| "frontend".to_string());

    Settings {
        host,
        port,
        price_api_base_url,
        coins: default_coins(),
        cors_origin,
        email_host,
        email_port,
        email_user,
        email_pass,
        notification_email,
        alert_check_interval: Duration::from_millis(interval_ms),
        alerts_file: PathBuf::from(alerts_file),
        frontend_dir: PathBuf::from(frontend_dir),
        // zero would fail every upstream call immediately
        http_timeout: Duration::from_secs(parsed("HTTP_TIMEOUT_SECS", 10u64).max(1)),
        smtp_timeout: Duration::from_secs(parsed("SMTP_TIMEOUT_SECS", 15u64).max(1)),
    }
}

use chrono::{TimeZone, Utc};
use coinwatch::{
    config,
    error::AppError,
    models::{Alert, AlertCondition, Quote},
    services::notifier::{EmailNotifier, Notifier, fmt_change, fmt_usd, render_alert_email},
    templates,
};

fn btc_quote(change: f64) -> Quote {
    Quote {
        coin: "bitcoin".to_string(),
        display_name: "Bitcoin".to_string(),
        symbol: "BTC".to_string(),
        price: 51_000.0,
        change_24h: change,
    }
}

fn btc_alert(condition: AlertCondition, threshold: f64) -> Alert {
    Alert {
        id: 7,
        coin: "bitcoin".to_string(),
        condition,
        threshold,
        active: true,
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
    }
}

#[test]
fn usd_amounts_are_grouped() {
    assert_eq!(fmt_usd(50_000.0), "50,000");
    assert_eq!(fmt_usd(1_234_567.891), "1,234,567.89");
    assert_eq!(fmt_usd(999.5), "999.50");
    assert_eq!(fmt_usd(0.0812), "0.0812");
}

#[test]
fn change_carries_explicit_sign() {
    assert_eq!(fmt_change(2.451), "+2.45%");
    assert_eq!(fmt_change(-1.1), "-1.10%");
    assert_eq!(fmt_change(0.0), "0.00%");
}

#[test]
fn above_alert_email_describes_rise() {
    let hbs = templates::build_handlebars();
    let email = render_alert_email(
        &hbs,
        &btc_alert(AlertCondition::Above, 50_000.0),
        51_000.0,
        &btc_quote(2.45),
    )
    .unwrap();

    assert_eq!(email.subject, "Crypto Alert: Bitcoin has risen above $50,000!");
    assert!(email.html.contains("Bitcoin (BTC) Alert Triggered!"));
    assert!(email.html.contains("$51,000"));
    assert!(email.html.contains("+2.45%"));
    assert!(email.html.contains("#28a745"));
    assert!(email.html.contains("Price risen above $50,000"));
    assert!(email.html.contains("2024-03-01 12:30:00 UTC"));
}

#[test]
fn below_alert_email_describes_drop() {
    let hbs = templates::build_handlebars();
    let email = render_alert_email(
        &hbs,
        &btc_alert(AlertCondition::Below, 52_000.0),
        51_000.0,
        &btc_quote(-3.2),
    )
    .unwrap();

    assert_eq!(email.subject, "Crypto Alert: Bitcoin has dropped below $52,000!");
    assert!(email.html.contains("-3.20%"));
    assert!(email.html.contains("#dc3545"));
}

#[tokio::test]
async fn notifier_without_credentials_reports_failure() {
    let mut settings = config::load();
    settings.email_user = None;
    settings.email_pass = None;
    settings.notification_email = None;

    let notifier = EmailNotifier::from_settings(&settings).unwrap();
    assert!(!notifier.is_enabled());

    let err = notifier
        .notify(&btc_alert(AlertCondition::Above, 1.0), 2.0, &btc_quote(0.0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Notification(_)));
}

#[test]
fn notifier_rejects_malformed_sender_address() {
    let mut settings = config::load();
    settings.email_user = Some("not-an-address".to_string());
    settings.email_pass = Some("secret".to_string());
    settings.notification_email = Some("ops@example.com".to_string());

    assert!(matches!(
        EmailNotifier::from_settings(&settings),
        Err(AppError::Notification(_))
    ));
}

#[tokio::test]
async fn notifier_with_credentials_is_enabled() {
    let mut settings = config::load();
    settings.email_host = "localhost".to_string();
    settings.email_user = Some("alerts@example.com".to_string());
    settings.email_pass = Some("secret".to_string());
    settings.notification_email = Some("ops@example.com".to_string());

    let notifier = EmailNotifier::from_settings(&settings).unwrap();

    assert!(notifier.is_enabled());
    assert_eq!(notifier.recipient().as_deref(), Some("ops@example.com"));
}

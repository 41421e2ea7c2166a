use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use serde_json::json;

use crate::{
    config::Settings,
    error::AppError,
    models::{Alert, Quote},
    templates::{self, Hbs},
};

/// One-shot delivery of a triggered alert. Implementations never retry.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, alert: &Alert, current_price: f64, quote: &Quote) -> Result<(), AppError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertEmail {
    pub subject: String,
    pub html: String,
}

/// Formats a dollar amount with thousands separators. Sub-dollar prices keep
/// up to six decimals so cheap coins stay readable.
pub fn fmt_usd(x: f64) -> String {
    let digits = if x.abs() >= 1.0 { 2 } else { 6 };
    let s = format!("{:.*}", digits, x.abs());
    let (int, frac) = s.split_once('.').unwrap_or((s.as_str(), ""));

    let frac = if digits == 2 {
        if frac == "00" { "" } else { frac }
    } else {
        frac.trim_end_matches('0')
    };

    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if x < 0.0 { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

pub fn fmt_change(change: f64) -> String {
    if change > 0.0 {
        format!("+{:.2}%", change)
    } else {
        format!("{:.2}%", change)
    }
}

pub fn render_alert_email(
    hbs: &Hbs,
    alert: &Alert,
    current_price: f64,
    quote: &Quote,
) -> Result<AlertEmail, AppError> {
    let verb = alert.condition.verb();
    let threshold = fmt_usd(alert.threshold);

    let subject = format!(
        "Crypto Alert: {} has {} ${}!",
        quote.display_name, verb, threshold
    );

    let ctx = json!({
        "name": quote.display_name,
        "symbol": quote.symbol,
        "price": fmt_usd(current_price),
        "change": fmt_change(quote.change_24h),
        "change_up": quote.change_24h > 0.0,
        "verb": verb,
        "threshold": threshold,
        "created_at": alert.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    });

    let html = hbs
        .render(templates::ALERT_EMAIL, &ctx)
        .map_err(|e| AppError::Notification(format!("template error: {e}")))?;

    Ok(AlertEmail { subject, html })
}

struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

/// SMTP notifier. Disabled (every send fails) when credentials are missing.
pub struct EmailNotifier {
    mailer: Option<Mailer>,
    hbs: Hbs,
}

impl EmailNotifier {
    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        let hbs = templates::build_handlebars();

        let (Some(user), Some(pass), Some(to)) = (
            settings.email_user.as_ref(),
            settings.email_pass.as_ref(),
            settings.notification_email.as_ref(),
        ) else {
            tracing::warn!("EMAIL_USER/EMAIL_PASS not set, email notifications are disabled");
            return Ok(Self { mailer: None, hbs });
        };

        let from: Mailbox = user
            .parse()
            .map_err(|e| AppError::Notification(format!("invalid EMAIL_USER: {e}")))?;
        let to: Mailbox = to
            .parse()
            .map_err(|e| AppError::Notification(format!("invalid NOTIFICATION_EMAIL: {e}")))?;

        let builder = if settings.email_port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.email_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.email_host)
        }
        .map_err(|e| AppError::Notification(e.to_string()))?;

        let transport = builder
            .port(settings.email_port)
            .credentials(Credentials::new(user.clone(), pass.clone()))
            .timeout(Some(settings.smtp_timeout))
            .build();

        Ok(Self {
            mailer: Some(Mailer {
                transport,
                from,
                to,
            }),
            hbs,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.mailer.is_some()
    }

    pub fn recipient(&self) -> Option<String> {
        self.mailer.as_ref().map(|m| m.to.to_string())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, alert: &Alert, current_price: f64, quote: &Quote) -> Result<(), AppError> {
        let Some(mailer) = &self.mailer else {
            return Err(AppError::Notification("email transport not configured".to_string()));
        };

        let email = render_alert_email(&self.hbs, alert, current_price, quote)?;

        let message = Message::builder()
            .from(mailer.from.clone())
            .to(mailer.to.clone())
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html)
            .map_err(|e| AppError::Notification(e.to_string()))?;

        mailer
            .transport
            .send(message)
            .await
            .map_err(|e| AppError::Notification(e.to_string()))?;

        tracing::info!(coin = %quote.coin, price = current_price, "alert email sent");

        Ok(())
    }
}

//! Renewal reminder emails.
//!
//! [`EmailSender`] is the only thing the sweep knows about; it reports
//! success as a plain `bool` and never returns an error.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use rust_decimal::Decimal;
use tracing::{error, info, warn};

/// Delivers renewal reminders
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send one reminder. Returns true when the message was accepted for delivery.
    async fn send(
        &self,
        to: &str,
        user_name: &str,
        item_name: &str,
        renewal_date_text: &str,
        price_text: &str,
    ) -> bool;
}

/// Renewal date as shown in reminders, e.g. `Sat Mar 01 2025`
pub fn format_renewal_date(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}

/// Price as shown in reminders, e.g. `USD 9.99` or `EUR 10`.
///
/// Trailing zeros are dropped, so a stored `10.00` reads `10`.
pub fn format_price(currency: &str, price: Decimal) -> String {
    format!("{} {}", currency, price.normalize())
}

/// Rendered content of one reminder
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl ReminderEmail {
    pub fn render(user_name: &str, item_name: &str, renewal_date_text: &str, price_text: &str) -> Self {
        let subject = format!("Renewal Reminder: {}", item_name);

        let text = format!(
            "Hi {},\n\nThis is a reminder that your subscription for {} is set to renew on {}. \
             The cost is {}.\n\nIf you wish to cancel, please do so before the renewal date.\n\n\
             Best,\nRemindMe App",
            user_name, item_name, renewal_date_text, price_text
        );

        let html = format!(
            "<div>\
             <h1>Renewal Reminder</h1>\
             <p>Hi {},</p>\
             <p>This is a reminder that your subscription for <strong>{}</strong> is set to renew on \
             <strong>{}</strong>.</p>\
             <p>The cost is <strong>{}</strong>.</p>\
             <p>If you wish to cancel, please do so before the renewal date.</p>\
             <p>Best,<br/>RemindMe App</p>\
             </div>",
            escape_html(user_name),
            escape_html(item_name),
            escape_html(renewal_date_text),
            escape_html(price_text)
        );

        Self { subject, text, html }
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// SMTP connection settings
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

/// Sends reminders through an SMTP relay with STARTTLS
pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailSender {
    pub fn new(settings: &SmtpSettings) -> Result<Self> {
        info!("Initializing SMTP email sender for {}:{}", settings.host, settings.port);

        let tls_params = TlsParameters::new(settings.host.clone())
            .context("Failed to create TLS parameters")?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
            .context("Failed to create SMTP relay")?
            .port(settings.port)
            .tls(Tls::Required(tls_params));

        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let from = settings
            .from
            .parse::<Mailbox>()
            .context("Failed to parse from email")?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(&self, to: &str, content: ReminderEmail) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(to.parse::<Mailbox>().context("Failed to parse recipient email")?)
            .subject(content.subject)
            .multipart(MultiPart::alternative_plain_html(content.text, content.html))
            .context("Failed to build email")
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(
        &self,
        to: &str,
        user_name: &str,
        item_name: &str,
        renewal_date_text: &str,
        price_text: &str,
    ) -> bool {
        let content = ReminderEmail::render(user_name, item_name, renewal_date_text, price_text);
        let message = match self.build_message(to, content) {
            Ok(message) => message,
            Err(e) => {
                error!("Failed to build reminder for {} to {}: {:#}", item_name, to, e);
                return false;
            }
        };

        match self.transport.send(message).await {
            Ok(_) => {
                info!("Reminder for {} sent to {}", item_name, to);
                true
            }
            Err(e) => {
                error!("Failed to send reminder for {} to {}: {}", item_name, to, e);
                false
            }
        }
    }
}

/// Used when no SMTP host is configured. Nothing is delivered.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledEmailSender;

#[async_trait]
impl EmailSender for DisabledEmailSender {
    async fn send(
        &self,
        to: &str,
        _user_name: &str,
        item_name: &str,
        renewal_date_text: &str,
        _price_text: &str,
    ) -> bool {
        warn!(
            "Email disabled, not sending reminder for {} ({}) to {}",
            item_name, renewal_date_text, to
        );
        false
    }
}

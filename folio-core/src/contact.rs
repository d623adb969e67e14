use folio_provider::providers::resend::api_error_message;
use folio_provider::{OutgoingEmail, ProviderError, ResendClient};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::{error, info};

/// Message submitted through the site's contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContactMessage {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subject: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
}

/// A `null` field counts as missing, same as an absent one.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ContactMessage {
    pub fn validate(&self) -> Result<(), ContactError> {
        let fields = [&self.name, &self.email, &self.subject, &self.message];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(ContactError::MissingFields);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactError {
    #[error("All fields are required")]
    MissingFields,

    #[error("Email service is not configured. Please contact the administrator.")]
    NotConfigured,

    #[error("Failed to send email: {0}")]
    Provider(String),

    #[error("Could not confirm message delivery")]
    Unconfirmed,

    #[error("Failed to send message. Please try again.")]
    Unexpected(String),
}

/// Sender and recipients of contact notifications.
#[derive(Debug, Clone, Default)]
pub struct ContactConfig {
    pub from: Option<String>,
    pub to: Vec<String>,
}

impl ContactConfig {
    pub fn new(from: impl Into<String>, to: Vec<String>) -> Self {
        Self {
            from: Some(from.into()),
            to,
        }
    }

    /// `FOLIO_CONTACT_FROM`, and `FOLIO_CONTACT_TO` as a comma separated list.
    pub fn from_env() -> Self {
        let from = std::env::var("FOLIO_CONTACT_FROM")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let to = std::env::var("FOLIO_CONTACT_TO")
            .map(|v| parse_recipients(&v))
            .unwrap_or_default();
        Self { from, to }
    }

    pub fn is_configured(&self) -> bool {
        self.from.is_some() && !self.to.is_empty()
    }
}

fn parse_recipients(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect()
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

fn field(label: &str, value: &str) -> String {
    format!(
        "<div class=\"field\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>",
        label, value
    )
}

/// Notification body. All visitor input is escaped.
pub fn render_html(message: &ContactMessage) -> String {
    let email = escape_html(&message.email);
    let body = escape_html(&message.message)
        .replace("\r\n", "\n")
        .replace('\n', "<br>");

    let mut html = String::from("<!DOCTYPE html><html><body>");
    html.push_str("<div class=\"header\"><h1>New contact message</h1></div><div class=\"content\">");
    html.push_str(&field("Name", &escape_html(&message.name)));
    html.push_str(&field(
        "Email",
        &format!("<a href=\"mailto:{}\">{}</a>", email, email),
    ));
    html.push_str(&field("Subject", &escape_html(&message.subject)));
    html.push_str(&format!(
        "<div class=\"message-box\"><div class=\"label\">Message</div><div class=\"value\">{}</div></div>",
        body
    ));
    html.push_str("<div class=\"footer\">Sent from the portfolio contact form</div></div></body></html>");
    html
}

/// Forwards contact form submissions to the site owner.
pub struct ContactMailer {
    config: ContactConfig,
    client: ResendClient,
}

impl ContactMailer {
    pub fn new(config: ContactConfig, client: ResendClient) -> Self {
        Self { config, client }
    }

    pub fn from_env() -> Self {
        Self::new(ContactConfig::from_env(), ResendClient::from_env())
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured() && self.client.config().is_configured()
    }

    pub fn compose(&self, message: &ContactMessage) -> Result<OutgoingEmail, ContactError> {
        let from = self.config.from.clone().ok_or(ContactError::NotConfigured)?;
        if self.config.to.is_empty() {
            return Err(ContactError::NotConfigured);
        }
        Ok(OutgoingEmail {
            from,
            to: self.config.to.clone(),
            reply_to: message.email.trim().to_string(),
            subject: format!("New contact message: {}", message.subject.trim()),
            html: render_html(message),
        })
    }

    /// Validate and send. Returns the provider's message id.
    pub async fn send(&self, message: &ContactMessage) -> Result<String, ContactError> {
        message.validate()?;

        if !self.is_configured() {
            error!("Contact mailer is not configured (RESEND_API_KEY, FOLIO_CONTACT_FROM, FOLIO_CONTACT_TO)");
            return Err(ContactError::NotConfigured);
        }

        let email = self.compose(message)?;
        let receipt = self.client.send(&email).await.map_err(|e| match e {
            ProviderError::Configuration(_) => ContactError::NotConfigured,
            ProviderError::Api { body, .. } => ContactError::Provider(api_error_message(&body)),
            ProviderError::Transport(cause) => ContactError::Unexpected(cause),
        })?;

        match receipt.id {
            Some(id) if !id.is_empty() => {
                info!("Email sent successfully: {}", id);
                Ok(id)
            }
            _ => {
                error!("No delivery confirmation received");
                Err(ContactError::Unconfirmed)
            }
        }
    }
}

//! Outbound email dispatch through an HTTP relay.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::config::MailConfig;
use crate::error::{AppError, Result};
use crate::observability::AppMetrics;

/// Outgoing message
#[derive(Debug, Clone, Serialize, Default)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub html: bool,
    pub from: Option<String>,
    pub reply_to: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<String>,
}

/// Mail transport
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<()>;
}

/// Transport posting messages to an HTTP relay
pub struct HttpRelayMailer {
    client: reqwest::Client,
    config: MailConfig,
}

impl HttpRelayMailer {
    pub fn new(config: MailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[derive(Serialize)]
struct RelayPayload<'a> {
    from: String,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
    html: bool,
    reply_to: Option<&'a str>,
    cc: &'a [String],
    bcc: &'a [String],
}

#[async_trait]
impl Mailer for HttpRelayMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        let from = email.from.clone().unwrap_or_else(|| {
            format!("{} <{}>", self.config.from_name, self.config.from_address)
        });

        let payload = RelayPayload {
            from,
            to: &email.to,
            subject: &email.subject,
            body: &email.body,
            html: email.html,
            reply_to: email.reply_to.as_deref(),
            cc: &email.cc,
            bcc: &email.bcc,
        };

        let response = self
            .client
            .post(&self.config.relay_url)
            .bearer_auth(&self.config.api_token)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Connection(format!(
                "Mail relay returned {}",
                response.status()
            )));
        }

        debug!(to = %email.to, subject = %email.subject, "email dispatched");
        Ok(())
    }
}

/// Transport that only logs; used in development and tests
#[derive(Default)]
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        info!(to = %email.to, subject = %email.subject, "mail dispatch disabled, dropping email");
        Ok(())
    }
}

/// Transport wrapper that counts successful dispatches
pub struct MeteredMailer {
    inner: Arc<dyn Mailer>,
    metrics: Arc<AppMetrics>,
}

impl MeteredMailer {
    pub fn new(inner: Arc<dyn Mailer>, metrics: Arc<AppMetrics>) -> Self {
        Self { inner, metrics }
    }
}

#[async_trait]
impl Mailer for MeteredMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        self.inner.send(email).await?;
        self.metrics.record_email_sent();
        Ok(())
    }
}

/// Wrap a fragment in the standard HTML shell
pub fn html_template(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\
         <html><head><meta charset=\"utf-8\"><title>{title}</title></head>\
         <body style=\"font-family: sans-serif; max-width: 600px; margin: 0 auto;\">\
         <h2>{title}</h2>{body}\
         <hr><p style=\"color: #888; font-size: 12px;\">This is an automated message.</p>\
         </body></html>"
    )
}

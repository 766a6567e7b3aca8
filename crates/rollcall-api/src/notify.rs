//! Rule-engine delivery implementations for the server binary.

use reqwest::StatusCode;
use rollcall_core::event::{RuleEngine, RuleEvent};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("rule engine returned {status}")]
  Status { status: StatusCode },
}

// ─── Log-only delivery ───────────────────────────────────────────────────────

/// Logs each batch event instead of delivering it anywhere. The default when
/// no `rule_engine_url` is configured; useful for staging imports.
#[derive(Debug, Clone, Default)]
pub struct LoggingRuleEngine;

impl RuleEngine for LoggingRuleEngine {
  type Error = NotifyError;

  async fn deliver(&self, event: RuleEvent) -> Result<(), NotifyError> {
    tracing::info!(
      event = event.name(),
      changes = event.len(),
      "rule event (log-only delivery)"
    );
    Ok(())
  }
}

// ─── Webhook delivery ────────────────────────────────────────────────────────

/// POSTs each batch event as JSON to the configured rule-engine endpoint.
#[derive(Debug, Clone)]
pub struct WebhookRuleEngine {
  client: reqwest::Client,
  url:    String,
}

impl WebhookRuleEngine {
  pub fn new(url: impl Into<String>) -> WebhookRuleEngine {
    WebhookRuleEngine {
      client: reqwest::Client::new(),
      url:    url.into(),
    }
  }
}

impl RuleEngine for WebhookRuleEngine {
  type Error = NotifyError;

  async fn deliver(&self, event: RuleEvent) -> Result<(), NotifyError> {
    let response = self
      .client
      .post(&self.url)
      .json(&event)
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      return Err(NotifyError::Status { status });
    }

    tracing::debug!(event = event.name(), %status, "rule event delivered");
    Ok(())
  }
}

// ─── Runtime selection ───────────────────────────────────────────────────────

/// The delivery mechanism chosen from configuration at startup.
#[derive(Debug, Clone)]
pub enum Notifier {
  Log(LoggingRuleEngine),
  Webhook(WebhookRuleEngine),
}

impl Notifier {
  pub fn from_url(url: Option<&str>) -> Notifier {
    match url {
      Some(url) => Notifier::Webhook(WebhookRuleEngine::new(url)),
      None => Notifier::Log(LoggingRuleEngine),
    }
  }
}

impl RuleEngine for Notifier {
  type Error = NotifyError;

  async fn deliver(&self, event: RuleEvent) -> Result<(), NotifyError> {
    match self {
      Notifier::Log(engine) => engine.deliver(event).await,
      Notifier::Webhook(engine) => engine.deliver(event).await,
    }
  }
}

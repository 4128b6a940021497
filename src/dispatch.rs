//! Delivery of the payload, or its dry-run rendering as a `curl` command.

use std::borrow::Cow;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::config::DeliveryConfig;
use crate::payload::Payload;

/// Why a delivery failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryReason {
    /// DNS, TLS, connection or timeout failure before a response arrived.
    Transport,
    /// The webhook answered with a non-2xx status.
    Rejected,
}

/// Failure delivering the payload.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum DeliveryError {
    #[error("error sending message to {}", .url.host_str().unwrap_or("webhook"))]
    #[diagnostic(code(slatemess::delivery))]
    Transport {
        url: Url,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("webhook returned an error {status} \"{body}\"")]
    #[diagnostic(code(slatemess::delivery))]
    Rejected { status: u16, body: String },
    #[error("failed to initialise http client")]
    #[diagnostic(code(slatemess::delivery))]
    Client(#[source] reqwest::Error),
}

impl DeliveryError {
    pub fn reason(&self) -> DeliveryReason {
        match self {
            DeliveryError::Rejected { .. } => DeliveryReason::Rejected,
            DeliveryError::Transport { .. } | DeliveryError::Client(_) => DeliveryReason::Transport,
        }
    }
}

/// Sends a JSON body to a webhook.
pub trait Transport {
    fn post_json(&self, url: &Url, body: &str) -> Result<(), DeliveryError>;
}

/// Blocking HTTPS transport.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(DeliveryError::Client)?;
        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn post_json(&self, url: &Url, body: &str) -> Result<(), DeliveryError> {
        let transport_error = |e: reqwest::Error| DeliveryError::Transport {
            url: url.clone(),
            source: Box::new(e),
        };
        let response = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(status = status.as_u16(), "webhook accepted the message");
            return Ok(());
        }
        let body = response.text().map_err(transport_error)?;
        Err(DeliveryError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

/// Terminal outcome of a successful dispatch.
#[derive(Debug, PartialEq, Eq)]
pub enum Dispatched {
    Delivered,
    /// Dry run: the equivalent command, ready to print.
    Printed(String),
}

/// Send the payload, or render the equivalent command when dry-running.
///
/// The transport is never touched in dry-run mode.
pub fn dispatch(
    config: &DeliveryConfig,
    payload: &Payload,
    transport: &dyn Transport,
) -> Result<Dispatched, DeliveryError> {
    if config.dry_run {
        return Ok(Dispatched::Printed(curl_command(&config.hook, payload)));
    }
    transport.post_json(&config.hook, payload.as_json())?;
    Ok(Dispatched::Delivered)
}

/// A shell-quoted `curl` invocation that posts the pretty-printed payload.
pub fn curl_command(url: &Url, payload: &Payload) -> String {
    format!(
        "curl -X POST -H 'Content-type: application/json' {} --data {}",
        quote(url.as_str()),
        quote(payload.as_pretty_json())
    )
}

fn quote(s: &str) -> Cow<'_, str> {
    shell_escape::unix::escape(Cow::Borrowed(s))
}

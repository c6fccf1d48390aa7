//! Shared blocking transport for both registries.
//!
//! Each client owns an [`ApiClient`] bound to its base URL. The client
//! builds requests itself and hands them to [`ApiClient::send_json`] (or
//! [`ApiClient::send`] when it wants to inspect the status), which maps
//! network failures and status codes onto [`ClientError`].

use std::time::Duration;

use catalink_config::TlsSettings;
use reqwest::blocking::{Client, RequestBuilder, Response};

use crate::error::ClientError;

pub(crate) const USER_AGENT: &str = concat!("catalink/", env!("CARGO_PKG_VERSION"));
const TIMEOUT_SECS: u64 = 30;

pub(crate) struct ApiClient {
    http: Client,
    service: &'static str,
    base_url: String,
}

impl ApiClient {
    pub(crate) fn new(
        service: &'static str,
        base_url: &str,
        tls: &TlsSettings,
    ) -> Result<Self, ClientError> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .cookie_store(true);

        if let Some(ref ca_path) = tls.ca_path {
            let pem = std::fs::read(ca_path).map_err(|e| ClientError::Tls {
                service,
                message: format!("cannot read CA {}: {}", ca_path.display(), e),
            })?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| ClientError::Tls {
                service,
                message: format!("invalid CA {}: {}", ca_path.display(), e),
            })?;
            builder = builder.add_root_certificate(cert);
        }
        if tls.insecure {
            tracing::warn!(service, "TLS certificate verification disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder.build().map_err(|e| ClientError::Tls {
            service,
            message: format!("failed to build HTTP client: {}", e),
        })?;

        Ok(Self {
            http,
            service,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send without interpreting the status.
    pub(crate) fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        request.send().map_err(|source| ClientError::Network {
            service: self.service,
            source,
        })
    }

    /// Send and require a 2xx; 401/403 become [`ClientError::Auth`].
    pub(crate) fn send_checked(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let resp = self.send(request)?;
        let status = resp.status().as_u16();
        if resp.status().is_success() {
            return Ok(resp);
        }

        let message = error_message(resp);
        if status == 401 || status == 403 {
            return Err(ClientError::Auth {
                service: self.service,
                status,
                message,
            });
        }
        Err(ClientError::Http {
            service: self.service,
            status,
            message,
        })
    }

    /// Send, require a 2xx, and parse the JSON body.
    pub(crate) fn send_json(&self, request: RequestBuilder) -> Result<serde_json::Value, ClientError> {
        let resp = self.send_checked(request)?;
        self.read_json(resp)
    }

    /// Read as text first so a leading BOM does not break parsing.
    pub(crate) fn read_json(&self, resp: Response) -> Result<serde_json::Value, ClientError> {
        let text = resp.text().map_err(|source| ClientError::Network {
            service: self.service,
            source,
        })?;
        parse_body(self.service, &text)
    }
}

pub(crate) fn parse_body(service: &'static str, text: &str) -> Result<serde_json::Value, ClientError> {
    let trimmed = text.trim_start_matches('\u{feff}');
    serde_json::from_str(trimmed).map_err(|e| {
        ClientError::parse(
            service,
            format!(
                "failed to parse JSON: {} (body: {})",
                e,
                truncate(trimmed, 200)
            ),
        )
    })
}

/// Best-effort message from an error response. Consumes the response.
pub(crate) fn error_message(resp: Response) -> String {
    let status = resp.status().as_u16();
    let text = resp.text().unwrap_or_default();
    let body = serde_json::from_str::<serde_json::Value>(text.trim_start_matches('\u{feff}'))
        .unwrap_or(serde_json::Value::Null);
    extract_error(&body, status, &text)
}

fn extract_error(body: &serde_json::Value, status: u16, raw: &str) -> String {
    for key in ["message", "errorMessage", "error_description", "error"] {
        if let Some(msg) = body[key].as_str() {
            return msg.to_string();
        }
    }
    let raw = raw.trim();
    if raw.is_empty() {
        format!("HTTP {}", status)
    } else {
        truncate(raw, 200).to_string()
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

//! HTTP client for the relay device.
//!
//! The device exposes a tiny GET-only API:
//! `/api/relay?relay=N&state=bool`, `/api/all?state=bool`, `/api/status`,
//! and `/` for a reachability probe. Set calls answer
//! `{"success": bool, "error": "..."}`; status answers a flat map of
//! `relayN` booleans (plus whatever other fields the firmware feels like
//! adding, which are ignored).

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use din_core::types::{DeviceConfig, DeviceStatus};

/// Why a device call produced no usable answer. `Refused` is not here —
/// a parsed `success=false` body is a successful call with a negative
/// answer, see [`ApiReply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The request never completed (timeout, refused connection, DNS...).
    Unreachable(String),
    /// The device answered with a non-200 status.
    BadStatus(u16),
    /// The device answered 200 with a body we couldn't parse.
    BadBody(String),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable(e) => write!(f, "device unreachable: {e}"),
            Self::BadStatus(code) => write!(f, "device answered HTTP {code}"),
            Self::BadBody(e) => write!(f, "unparseable device reply: {e}"),
        }
    }
}

/// Body of a relay/all set call.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct DeviceClient {
    base_url: String,
    client: reqwest::Client,
}

impl DeviceClient {
    pub fn new(config: &DeviceConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Switch one relay. A parsed body with `success=false` is an `Ok` —
    /// the caller decides how to narrate the refusal.
    pub async fn set_relay(&self, relay: u8, state: bool) -> Result<ApiReply, DeviceError> {
        let url = format!("{}/api/relay?relay={relay}&state={state}", self.base_url);
        self.get_reply(&url).await
    }

    /// Switch every relay with one device-side call.
    pub async fn set_all(&self, state: bool) -> Result<ApiReply, DeviceError> {
        let url = format!("{}/api/all?state={state}", self.base_url);
        self.get_reply(&url).await
    }

    /// Fetch relay states. Only boolean-valued fields survive; the relay
    /// count is whatever the device reports.
    pub async fn status(&self) -> Result<DeviceStatus, DeviceError> {
        let url = format!("{}/api/status", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DeviceError::Unreachable(e.to_string()))?;

        let code = resp.status();
        if !code.is_success() {
            return Err(DeviceError::BadStatus(code.as_u16()));
        }

        let fields: serde_json::Map<String, serde_json::Value> = resp
            .json()
            .await
            .map_err(|e| DeviceError::BadBody(e.to_string()))?;

        Ok(fields
            .into_iter()
            .filter_map(|(key, value)| value.as_bool().map(|on| (key, on)))
            .collect())
    }

    /// Any 200 from `/` means the device is reachable.
    pub async fn probe(&self) -> bool {
        match self.client.get(format!("{}/", self.base_url)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn get_reply(&self, url: &str) -> Result<ApiReply, DeviceError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DeviceError::Unreachable(e.to_string()))?;

        let code = resp.status();
        if !code.is_success() {
            return Err(DeviceError::BadStatus(code.as_u16()));
        }

        resp.json::<ApiReply>()
            .await
            .map_err(|e| DeviceError::BadBody(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_parses_success_and_error() {
        let reply: ApiReply = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(reply.success);
        assert!(reply.error.is_none());

        let reply: ApiReply =
            serde_json::from_str(r#"{"success": false, "error": "relay stuck"}"#).unwrap();
        assert!(!reply.success);
        assert_eq!(reply.error.as_deref(), Some("relay stuck"));
    }

    #[test]
    fn reply_defaults_missing_success_to_false() {
        let reply: ApiReply = serde_json::from_str("{}").unwrap();
        assert!(!reply.success);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = DeviceClient::new(&DeviceConfig {
            base_url: "http://10.0.0.7/".into(),
            timeout_secs: 5,
        });
        assert_eq!(client.base_url, "http://10.0.0.7");
    }
}

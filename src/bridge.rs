//! HTTP adapter for the AI bridge.
//!
//! The bridge endpoint accepts `{ model, prompt, systemInstruction, tools }`
//! and answers `{ text }`. Map tool calls happen on the far side.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;
use crate::traits::AiBridge;

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    /// Extra attempts after a connection-level failure.
    pub max_reconnect_attempts: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8787".to_string(),
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            timeout_secs: 10,
            max_reconnect_attempts: 2,
        }
    }
}

/// Owns one lazily built HTTP client and rebuilds it after connection loss.
#[derive(Debug)]
pub struct HttpBridge {
    config: BridgeConfig,
    client: Mutex<Option<reqwest::blocking::Client>>,
}

impl HttpBridge {
    /// Creates the bridge without touching the network.
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            client: Mutex::new(None),
        }
    }

    /// Creates the bridge and builds its client up front.
    pub fn connect(config: BridgeConfig) -> Result<Self, BridgeError> {
        let bridge = Self::new(config);
        bridge.client()?;
        Ok(bridge)
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    fn client(&self) -> Result<reqwest::blocking::Client, BridgeError> {
        let mut slot = self.client.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .build()?;
        *slot = Some(client.clone());
        Ok(client)
    }

    fn reset(&self) {
        *self.client.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn send_once(
        &self,
        client: &reqwest::blocking::Client,
        body: &QueryRequest<'_>,
    ) -> Result<String, BridgeError> {
        let url = format!("{}/v1/query", self.config.base_url.trim_end_matches('/'));
        let mut request = client.post(url).json(body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send()?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(BridgeError::Unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            return Err(BridgeError::Status(status.as_u16()));
        }

        let reply = response.json::<QueryResponse>()?;
        Ok(reply.text)
    }
}

impl AiBridge for HttpBridge {
    fn query(&self, prompt: &str, system_instruction: &str) -> Result<String, BridgeError> {
        let body = QueryRequest {
            model: &self.config.model,
            prompt,
            system_instruction,
            tools: &["maps"],
        };

        let mut attempt = 0;
        loop {
            let client = self.client()?;
            match self.send_once(&client, &body) {
                Err(BridgeError::Http(err))
                    if err.is_connect() && attempt < self.config.max_reconnect_attempts =>
                {
                    attempt += 1;
                    tracing::warn!(attempt, error = %err, "bridge connection lost, reconnecting");
                    self.reset();
                }
                other => return other,
            }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system_instruction: &'a str,
    tools: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    text: String,
}

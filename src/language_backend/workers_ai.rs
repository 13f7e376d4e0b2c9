use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{QueryError, Result};
use crate::language_backend::{ChatMessage, LanguageBackend};

/// Cloudflare Workers AI over its REST API.
pub struct WorkersAiClient {
    http: Client,
    base_url: String,
    account_id: Option<String>,
    api_token: Option<String>,
}

impl WorkersAiClient {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        account_id: Option<String>,
        api_token: Option<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            account_id,
            api_token,
        }
    }
}

#[async_trait]
impl LanguageBackend for WorkersAiClient {
    async fn run(&self, model: &str, messages: &[ChatMessage]) -> Result<Value> {
        let account_id = self
            .account_id
            .as_deref()
            .ok_or(QueryError::ConfigMissing { name: "CLOUDFLARE_ACCOUNT_ID" })?;
        let api_token = self
            .api_token
            .as_deref()
            .ok_or(QueryError::ConfigMissing { name: "CLOUDFLARE_API_TOKEN" })?;

        let url = format!("{}/accounts/{}/ai/run/{}", self.base_url, account_id, model);
        debug!(stage = "extract", %url, "Calling language backend");

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_token)
            .json(&json!({ "messages": messages }))
            .send()
            .await
            .map_err(|e| QueryError::Backend { message: e.to_string() })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| QueryError::Backend { message: e.to_string() })?;

        if !status.is_success() {
            warn!(stage = "extract", status = status.as_u16(), %body, "Language backend returned an error");
            return Err(QueryError::Backend {
                message: format!("status {}", status.as_u16()),
            });
        }

        let envelope: Value = serde_json::from_str(&body)
            .map_err(|e| QueryError::Backend { message: e.to_string() })?;

        // The REST API wraps the model output in `result`; bare replies are passed through.
        Ok(match envelope.get("result") {
            Some(result) => result.clone(),
            None => envelope,
        })
    }
}

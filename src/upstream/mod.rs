use bytes::Bytes;
use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;
use log::{debug, info};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::Config;
use crate::error::UpstreamError;
use crate::web::models::ChatMessage;

const TEMPERATURE: f64 = 0.2;
const MAX_TOKENS: u32 = 1200;

pub type UpstreamBody = BoxStream<'static, Result<Bytes, UpstreamError>>;

// Single-attempt client for the provider's streaming chat-completions endpoint
pub struct UpstreamClient {
    api_url: String,
    api_key: String,
    default_model: String,
    response_timeout: Duration,
    client: Client,
}

impl UpstreamClient {
    /// `None` when no API key is configured.
    pub fn from_config(config: &Config) -> anyhow::Result<Option<Self>> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()?;

        info!("Using upstream provider at: {}", config.api_url);
        Ok(Some(Self {
            api_url: config.api_url.clone(),
            api_key,
            default_model: config.model.clone(),
            response_timeout: config.response_timeout,
            client,
        }))
    }

    pub fn model_for(&self, requested: Option<&str>) -> String {
        requested
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.default_model)
            .to_string()
    }

    /// Sends the conversation with streaming enabled and returns the raw
    /// response body.
    ///
    /// The first non-empty chunk is read before returning, so a refused
    /// connection, a non-2xx status and a body that ends or breaks before
    /// producing anything all surface here as `Err`. Headers and that first
    /// chunk must both arrive within the configured response timeout.
    pub async fn open(
        &self,
        messages: &[ChatMessage],
        model: Option<&str>,
    ) -> Result<UpstreamBody, UpstreamError> {
        let model = self.model_for(model);
        let payload = json!({
            "model": model,
            "messages": messages,
            "stream": true,
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        });

        debug!("Sending {} messages to upstream model {}", messages.len(), model);
        let limit = self.response_timeout;
        let request = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send();
        let response = timeout(limit, request)
            .await
            .map_err(|_| UpstreamError::Timeout(limit))?
            .map_err(UpstreamError::Connect)?;

        let status = response.status();
        if !status.is_success() {
            let body = timeout(limit, response.text())
                .await
                .ok()
                .and_then(Result::ok)
                .unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let mut body = response.bytes_stream();
        let first = loop {
            let next = timeout(limit, body.next())
                .await
                .map_err(|_| UpstreamError::Timeout(limit))?;
            match next {
                Some(Ok(chunk)) if chunk.is_empty() => continue,
                Some(Ok(chunk)) => break chunk,
                Some(Err(e)) => return Err(UpstreamError::Read(e)),
                None => return Err(UpstreamError::EmptyBody),
            }
        };

        let rest = body.map(|item| item.map_err(UpstreamError::Read));
        Ok(stream::once(async move { Ok(first) }).chain(rest).boxed())
    }
}

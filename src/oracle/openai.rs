//! OpenAI-compatible chat completions oracle
//!
//! Works with any endpoint speaking the `/chat/completions` protocol with
//! image content parts (`DashScope` compatible mode, `OpenAI`, vLLM, ...).

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{ContentPart, Oracle, OracleRequest, Role};
use crate::config::OracleConfig;
use crate::{Error, Result};

/// Oracle backed by an OpenAI-compatible chat completions endpoint
pub struct ChatCompletionOracle {
    client: Client,
    endpoint: String,
    api_key: Option<SecretString>,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl std::fmt::Debug for ChatCompletionOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionOracle")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("configured", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

impl ChatCompletionOracle {
    /// Create a client from oracle configuration
    ///
    /// A missing API key is not an error here; calls fail with
    /// `Error::Config` until one is provided.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: &OracleConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config
                .api_key
                .as_ref()
                .map(|k| SecretString::from(k.expose_secret().to_owned())),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn body<'a>(&'a self, request: &'a OracleRequest) -> ChatCompletionRequest<'a> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(WireMessage {
            role: Role::System,
            content: WireContent::Text(&request.system_instruction),
        });
        messages.extend(request.messages.iter().map(|m| WireMessage {
            role: m.role,
            content: WireContent::Parts(&m.content),
        }));

        ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// Longest error body carried into an error message
const MAX_ERROR_BODY_BYTES: usize = 512;

/// Cut an error body to `MAX_ERROR_BODY_BYTES` on a char boundary
fn truncate_body(body: &str) -> &str {
    if body.len() <= MAX_ERROR_BODY_BYTES {
        return body;
    }
    let mut end = MAX_ERROR_BODY_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[async_trait]
impl Oracle for ChatCompletionOracle {
    async fn complete(&self, request: &OracleRequest) -> Result<String> {
        let Some(api_key) = &self.api_key else {
            return Err(Error::Config("oracle API key not configured".to_string()));
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key.expose_secret())
            .json(&self.body(request))
            .send()
            .await
            .map_err(|e| Error::OracleUnavailable(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::OracleUnavailable(format!(
                "API error {status}: {}",
                truncate_body(&body)
            )));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::OracleUnavailable(format!("parse error: {e}")))?;

        let Some(choice) = result.choices.into_iter().next() else {
            return Err(Error::OracleUnavailable("no choices returned".to_string()));
        };

        match choice.message.content {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(Error::OracleUnavailable("empty response".to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "chat-completions"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: WireContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WireContent<'a> {
    Text(&'a str),
    Parts(&'a [ContentPart]),
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

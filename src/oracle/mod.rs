//! Decision oracle boundary
//!
//! The oracle is an external vision-language model. The advisor only needs
//! one capability from it: turn a system instruction plus ordered
//! multimodal content into raw text.

mod openai;

use async_trait::async_trait;
use serde::Serialize;

use crate::Result;

pub use openai::ChatCompletionOracle;

/// Message author role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One piece of multimodal message content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text
    Text { text: String },
    /// Image reference (data URI or URL)
    ImageUrl { image_url: ImageUrl },
}

impl ContentPart {
    /// Text content part
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Image content part
    #[must_use]
    pub fn image(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrl { url: url.into() },
        }
    }
}

/// Image location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// A message in the oracle conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentPart>,
}

/// Everything the oracle needs for one decision
#[derive(Debug, Clone)]
pub struct OracleRequest {
    /// Task instruction, sent as the system message
    pub system_instruction: String,
    /// Ordered conversation
    pub messages: Vec<Message>,
}

impl OracleRequest {
    /// Request with a single user message
    #[must_use]
    pub fn single_turn(system_instruction: impl Into<String>, content: Vec<ContentPart>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            messages: vec![Message {
                role: Role::User,
                content,
            }],
        }
    }
}

/// Produces raw directive text for a request
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Run one completion and return the first choice's text.
    ///
    /// # Errors
    ///
    /// `Error::Config` when the credential is missing, `Error::OracleUnavailable`
    /// when the endpoint fails or yields no usable text.
    async fn complete(&self, request: &OracleRequest) -> Result<String>;

    /// Short identifier for logs
    fn name(&self) -> &'static str;

    /// Whether the oracle has what it needs to be called
    fn is_configured(&self) -> bool {
        true
    }
}

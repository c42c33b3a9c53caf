//! Shared test utilities

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use framing_advisor::{
    Advisor, ContentPart, Error, Oracle, OracleRequest, Result, SessionStore, StoreConfig,
};
use parking_lot::Mutex;

/// Oracle double that replays canned replies in order
#[derive(Default)]
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<Result<String>>>,
    pub requests: Mutex<Vec<OracleRequest>>,
    configured: bool,
}

impl ScriptedOracle {
    pub fn new(replies: Vec<Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::default(),
            configured: true,
        })
    }

    /// An oracle that reports a missing credential
    pub fn unconfigured() -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::default(),
            requests: Mutex::default(),
            configured: false,
        })
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn complete(&self, request: &OracleRequest) -> Result<String> {
        self.requests.lock().push(request.clone());
        if !self.configured {
            return Err(Error::Config("no key".to_string()));
        }
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(Error::OracleUnavailable("no scripted reply".to_string())))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}

/// Oracle double that answers "advice for <latest image>" after a short delay
pub struct EchoOracle {
    pub delay: Duration,
}

#[async_trait]
impl Oracle for EchoOracle {
    async fn complete(&self, request: &OracleRequest) -> Result<String> {
        tokio::time::sleep(self.delay).await;

        let latest = request
            .messages
            .last()
            .and_then(|m| m.content.last())
            .and_then(|part| match part {
                ContentPart::ImageUrl { image_url } => Some(image_url.url.clone()),
                ContentPart::Text { .. } => None,
            })
            .ok_or_else(|| Error::OracleUnavailable("no image in request".to_string()))?;

        Ok(format!(
            r#"{{"ready_to_shoot": 0, "suggestion": "advice for {latest}"}}"#
        ))
    }

    fn name(&self) -> &'static str {
        "echo"
    }
}

/// A not-ready reply with the given suggestion
pub fn reply(suggestion: &str) -> Result<String> {
    Ok(format!(
        r#"{{"ready_to_shoot": 0, "suggestion": "{suggestion}"}}"#
    ))
}

/// Build an advisor over a fresh store
pub fn build_advisor(oracle: Arc<dyn Oracle>, max_queue_length: usize) -> Arc<Advisor> {
    let store = Arc::new(SessionStore::new(StoreConfig {
        max_queue_length,
        ..StoreConfig::default()
    }));
    Arc::new(Advisor::new(store, oracle))
}

//! The advisory decision cycle
//!
//! ```text
//! get_or_create ─► assemble ─► oracle.complete ─► parse_directive ─► record
//!   (lock, sweep)              (no lock held)                      (lock)
//! ```
//!
//! Every failure below this layer becomes a well-formed [`Directive`] so the
//! caller can always keep iterating.

use std::sync::Arc;

use crate::Error;
use crate::interpreter::{Directive, parse_directive};
use crate::oracle::{Oracle, OracleRequest};
use crate::prompt::{self, SYSTEM_PROMPT};
use crate::session::{HistoryEntry, SessionStore};

/// Runs one framing turn per call against a shared session store
pub struct Advisor {
    store: Arc<SessionStore>,
    oracle: Arc<dyn Oracle>,
    system_prompt: String,
    detailed_logging: bool,
}

impl std::fmt::Debug for Advisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Advisor")
            .field("oracle", &self.oracle.name())
            .field("sessions", &self.store.len())
            .finish_non_exhaustive()
    }
}

impl Advisor {
    /// Create an advisor with the default system prompt
    #[must_use]
    pub fn new(store: Arc<SessionStore>, oracle: Arc<dyn Oracle>) -> Self {
        Self {
            store,
            oracle,
            system_prompt: SYSTEM_PROMPT.to_string(),
            detailed_logging: false,
        }
    }

    /// Override the system instruction
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: String) -> Self {
        self.system_prompt = prompt;
        self
    }

    /// Log raw oracle replies at info instead of debug
    #[must_use]
    pub const fn with_detailed_logging(mut self, enabled: bool) -> Self {
        self.detailed_logging = enabled;
        self
    }

    /// Shared session store
    #[must_use]
    pub const fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Oracle in use
    #[must_use]
    pub fn oracle(&self) -> &dyn Oracle {
        self.oracle.as_ref()
    }

    /// Advise on `artifact` in the context of `session_id`'s history.
    ///
    /// History advances only when the oracle reply was interpreted.
    pub async fn advise(&self, session_id: &str, artifact: &str) -> Directive {
        tracing::info!(session_id, "received framing request");

        let history = self.store.get_or_create(session_id);
        let request =
            OracleRequest::single_turn(&self.system_prompt, prompt::assemble(&history, artifact));

        if self.detailed_logging {
            tracing::info!(session_id, images = history.len() + 1, "sending images to oracle");
        }

        let raw = match self.oracle.complete(&request).await {
            Ok(raw) => raw,
            Err(Error::Config(e)) => {
                tracing::error!(session_id, error = %e, "oracle not configured");
                return Directive::not_configured();
            }
            Err(e) => {
                tracing::error!(session_id, oracle = self.oracle.name(), error = %e, "oracle call failed");
                return Directive::processing_failure();
            }
        };

        if self.detailed_logging {
            tracing::info!(session_id, raw = %raw, "oracle raw response");
        } else {
            tracing::debug!(session_id, raw = %raw, "oracle raw response");
        }

        match parse_directive(&raw) {
            Ok(directive) => {
                self.store
                    .record(session_id, HistoryEntry::new(artifact, directive.suggestion.as_str()));
                tracing::info!(
                    session_id,
                    ready = directive.ready_to_proceed,
                    suggestion = %directive.suggestion,
                    "framing advice"
                );
                directive
            }
            Err(e) => {
                tracing::error!(session_id, error = %e, raw = %raw, "failed to parse oracle response");
                Directive::parse_failure()
            }
        }
    }
}

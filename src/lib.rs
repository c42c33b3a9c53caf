//! Framing Advisor - session-aware camera framing advice
//!
//! A caller submits frames tagged with a session id and gets back either
//! "ready to shoot" or a single adjustment to make. Each decision is
//! conditioned on a bounded window of the session's previous frames and the
//! advice they received.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              HTTP API  (POST /generate)             │
//! └────────────────────────┬────────────────────────────┘
//!                          │
//! ┌────────────────────────▼────────────────────────────┐
//! │                      Advisor                        │
//! │  SessionStore │ prompt │ interpreter │ (updater)    │
//! └────────────────────────┬────────────────────────────┘
//!                          │
//! ┌────────────────────────▼────────────────────────────┐
//! │        Oracle (OpenAI-compatible vision model)      │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod advisor;
pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod oracle;
pub mod prompt;
pub mod session;

pub use advisor::Advisor;
pub use config::Config;
pub use error::{Error, Result};
pub use interpreter::{Directive, parse_directive};
pub use oracle::{ChatCompletionOracle, ContentPart, Message, Oracle, OracleRequest, Role};
pub use session::{BoundedHistory, HistoryEntry, SessionStore, StoreConfig};

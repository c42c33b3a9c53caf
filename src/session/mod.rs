//! Per-session bounded history of past framing turns

mod history;
mod store;

pub use history::{BoundedHistory, HistoryEntry};
pub use store::{
    DEFAULT_MAX_QUEUE_LENGTH, DEFAULT_SESSION_TTL, DEFAULT_SHARDS, SessionStore, StoreConfig,
};

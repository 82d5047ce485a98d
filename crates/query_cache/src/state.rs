use chrono::{DateTime, Utc};

/// Lifecycle of a cache entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum QueryStatus {
    /// Known key, never fetched (or last fetch abandoned).
    #[default]
    Idle,
    /// First fetch in progress, no data yet.
    Loading,
    Success,
    /// Last fetch failed. Previously fetched data, if any, is kept.
    Error(String),
}

/// Observable state of a cache entry, published to subscribers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryState {
    pub status: QueryStatus,
    pub updated_at: Option<DateTime<Utc>>,
    /// Set by invalidation; cleared by the next successful fetch.
    pub stale: bool,
    pub is_fetching: bool,
}

impl QueryState {
    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            QueryStatus::Error(message) => Some(message),
            _ => None,
        }
    }
}

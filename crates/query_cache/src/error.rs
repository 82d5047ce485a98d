use thiserror::Error;

/// Errors raised by the cache itself, as opposed to the fetchers it runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("cached value for {key} has a different type")]
    TypeMismatch { key: String },
}

//! Keyed query cache.
//!
//! The cache maps a [`QueryKey`] to the last value fetched for it, together
//! with its status. Mutations mark keys stale through [`QueryCache::invalidate`]
//! and active subscribers refetch in the background. The [`debounce`] helper
//! delays rapidly changing inputs (typically search text) before they are
//! folded into a key.

pub use cache::{CacheConfig, QueryCache, Subscription};
pub use debounce::debounce;
pub use error::CacheError;
pub use key::{KeySegment, QueryKey};
pub use state::{QueryState, QueryStatus};

mod cache;
mod debounce;
mod error;
mod key;
mod state;

//! Async client for the FinFlow personal-finance backend.
//!
//! A [`Client`] owns the authenticated [`Transport`], the [`SessionStore`]
//! and a [`QueryCache`]. Resource handles borrowed from it run queries
//! through the cache and invalidate the affected keys after mutations.

use std::{sync::Arc, time::Duration};

use query_cache::{CacheConfig, QueryCache, QueryKey};
use reqwest::Url;

pub mod accounts;
pub mod auth;
pub mod browser;
pub mod categories;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod metadata;
pub mod normalize;
pub mod session;
pub mod transactions;
pub mod transport;

pub use browser::TransactionBrowser;
pub use error::{ClientError, ErrorKind, Result};
pub use filter::{DEFAULT_PAGE_SIZE, TransactionFilter, TransactionFilterType};
pub use normalize::{TransactionKind, TransactionRecord, TransactionsPage};
pub use session::{Session, SessionStore};
pub use transport::{RequestOptions, Transport};

#[derive(Clone, Debug)]
pub struct Client {
    transport: Transport,
    cache: QueryCache,
    session: SessionStore,
}

impl Client {
    pub fn builder(base_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(base_url)
    }

    /// Client with default cache settings and no session.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::builder(base_url).build()
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn auth(&self) -> auth::Auth<'_> {
        auth::Auth::new(self)
    }

    pub fn accounts(&self) -> accounts::Accounts<'_> {
        accounts::Accounts::new(self)
    }

    pub fn categories(&self) -> categories::Categories<'_> {
        categories::Categories::new(self)
    }

    pub fn dashboard(&self) -> dashboard::DashboardQuery<'_> {
        dashboard::DashboardQuery::new(self)
    }

    pub fn metadata(&self) -> metadata::MetadataQuery<'_> {
        metadata::MetadataQuery::new(self)
    }

    pub fn transactions(&self) -> transactions::Transactions<'_> {
        transactions::Transactions::new(self)
    }

    /// Runs `fetch` for `key` through the cache.
    pub(crate) async fn query<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<Arc<T>>
    where
        T: Send + Sync + 'static,
        F: Fn(Transport) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let transport = self.transport.clone();
        self.cache
            .fetch(key, move || fetch(transport.clone()))
            .await
    }

    /// Marks every key under each prefix stale.
    pub(crate) fn invalidate(&self, prefixes: &[QueryKey]) {
        for prefix in prefixes {
            let marked = self.cache.invalidate(prefix);
            tracing::debug!(%prefix, marked, "invalidated after mutation");
        }
    }
}

#[derive(Debug)]
pub struct ClientBuilder {
    base_url: String,
    cache: CacheConfig,
    session: SessionStore,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            cache: CacheConfig::default(),
            session: SessionStore::default(),
            timeout: None,
        }
    }

    pub fn cache_config(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Starts the client with an already authenticated session.
    pub fn session(self, session: Session) -> Self {
        self.session.set(session);
        self
    }

    pub fn session_store(mut self, session: SessionStore) -> Self {
        self.session = session;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<Client> {
        let url = Url::parse(&self.base_url)
            .map_err(|err| ClientError::Config(format!("invalid base_url: {err}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "invalid base_url: unsupported scheme {}",
                url.scheme()
            )));
        }

        let mut http = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        let http = http
            .build()
            .map_err(|err| ClientError::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(Client {
            transport: Transport::new(http, url, self.session.clone()),
            cache: QueryCache::new(self.cache),
            session: self.session,
        })
    }
}

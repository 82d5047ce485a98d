use std::{sync::Arc, time::Duration};

use api_types::transaction::PageMeta;
use query_cache::{Subscription, debounce};
use tokio::sync::watch;

use crate::{
    Client,
    error::Result,
    filter::{TransactionFilter, TransactionFilterType},
    normalize::TransactionsPage,
};

/// Paginated, searchable view over the transaction list.
///
/// Raw search text goes in through [`type_search`](Self::type_search) and only
/// reaches the filter once it has been quiet for the debounce delay. Every
/// filter maps to its own cache key, so a response for an older filter is
/// stored under that filter and never replaces the current page.
///
/// Must be created inside a Tokio runtime.
pub struct TransactionBrowser {
    client: Client,
    filter: TransactionFilter,
    input: watch::Sender<String>,
    settled: watch::Receiver<String>,
    meta: Option<PageMeta>,
}

impl TransactionBrowser {
    pub fn new(client: Client, page_size: u32, delay: Duration) -> Self {
        let (input, raw) = watch::channel(String::new());
        Self {
            client,
            filter: TransactionFilter::new().with_page_size(page_size),
            input,
            settled: debounce(raw, delay),
            meta: None,
        }
    }

    pub fn filter(&self) -> &TransactionFilter {
        &self.filter
    }

    /// Meta of the last page loaded for the current filter.
    pub fn meta(&self) -> Option<PageMeta> {
        self.meta
    }

    /// Feeds raw search text. Does not touch the filter.
    pub fn type_search(&self, text: &str) {
        self.input.send_replace(text.to_string());
    }

    /// Waits for the debounced search text and folds it into the filter.
    ///
    /// Returns `None` once the debounce task has stopped.
    pub async fn search_settled(&mut self) -> Option<String> {
        self.settled.changed().await.ok()?;
        let text = self.settled.borrow_and_update().clone();
        self.set_filter(self.filter.clone().with_search(&text));
        Some(text)
    }

    pub fn set_kind(&mut self, kind: TransactionFilterType) {
        self.set_filter(self.filter.clone().with_kind(kind));
    }

    /// Moves to the next page if the last loaded meta has one.
    pub fn next_page(&mut self) -> bool {
        let page = self.filter.page();
        match self.meta {
            Some(meta) if page < meta.total_pages => {
                self.set_filter(self.filter.clone().with_page(page + 1));
                true
            }
            _ => false,
        }
    }

    pub fn previous_page(&mut self) -> bool {
        let page = self.filter.page();
        if page <= 1 {
            return false;
        }
        self.set_filter(self.filter.clone().with_page(page - 1));
        true
    }

    /// Fetches (or reads from cache) the page for the current filter.
    pub async fn load(&mut self) -> Result<Arc<TransactionsPage>> {
        let filter = self.filter.clone();
        let page = self.client.transactions().list(&filter).await?;
        if filter == self.filter {
            self.meta = Some(page.meta);
        }
        Ok(page)
    }

    /// Observes the cache entry of the current filter.
    pub fn subscribe(&self) -> Subscription {
        self.client.cache().subscribe(self.filter.query_key())
    }

    fn set_filter(&mut self, filter: TransactionFilter) {
        if filter != self.filter {
            tracing::debug!(key = %filter.query_key(), "transaction filter changed");
            // Page moves keep the page count.
            if filter.clone().with_page(1) != self.filter.clone().with_page(1) {
                self.meta = None;
            }
            self.filter = filter;
        }
    }
}

use std::{
    any::Any,
    collections::HashMap,
    fmt,
    future::Future,
    pin::Pin,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use chrono::Utc;
use tokio::{
    runtime::Handle,
    sync::{Mutex as FetchLock, watch},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};

use crate::{CacheError, QueryKey, QueryState, QueryStatus};

type CachedValue = Arc<dyn Any + Send + Sync>;
type RefetchFuture = Pin<Box<dyn Future<Output = Result<CachedValue, String>> + Send>>;
type Refetch = Arc<dyn Fn() -> RefetchFuture + Send + Sync>;

#[derive(Clone, Copy, Debug)]
pub struct CacheConfig {
    /// How long a successful result is served without refetching.
    pub stale_time: Duration,
    /// How long an unobserved entry survives [`QueryCache::collect_garbage`].
    pub gc_time: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::ZERO,
            gc_time: Duration::from_secs(5 * 60),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct Marker {
    completed: u64,
    invalidations: u64,
}

struct Entry {
    id: u64,
    data: Option<CachedValue>,
    state: watch::Sender<QueryState>,
    fetched_at: Option<Instant>,
    last_used: Instant,
    /// Bumped by every invalidation touching this key.
    invalidations: u64,
    /// Bumped by every fetch that ran to completion.
    completed: u64,
    /// Serializes fetches of this key.
    fetch_lock: Arc<FetchLock<()>>,
    /// Last fetcher registered for this key, reused for background refetches.
    refetch: Option<Refetch>,
    observers: usize,
}

impl Entry {
    fn new(id: u64) -> Self {
        let (state, _) = watch::channel(QueryState::default());
        Self {
            id,
            data: None,
            state,
            fetched_at: None,
            last_used: Instant::now(),
            invalidations: 0,
            completed: 0,
            fetch_lock: Arc::new(FetchLock::new(())),
            refetch: None,
            observers: 0,
        }
    }

    fn marker(&self) -> Marker {
        Marker {
            completed: self.completed,
            invalidations: self.invalidations,
        }
    }

    fn is_fresh(&self, stale_time: Duration) -> bool {
        let state = self.state.borrow();
        state.is_success()
            && !state.stale
            && self.data.is_some()
            && self
                .fetched_at
                .is_some_and(|at| at.elapsed() < stale_time)
    }

    /// Data from a fetch that completed after `marker` was taken, provided
    /// nothing invalidated the key in between.
    fn settled_since(&self, marker: Marker) -> Option<CachedValue> {
        if self.completed == marker.completed || self.invalidations != marker.invalidations {
            return None;
        }
        let state = self.state.borrow();
        if !state.is_success() || state.stale {
            return None;
        }
        self.data.clone()
    }
}

#[derive(Default)]
struct Inner {
    config: CacheConfig,
    next_id: AtomicU64,
    entries: Mutex<HashMap<QueryKey, Entry>>,
}

impl Inner {
    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn new_entry(&self) -> Entry {
        Entry::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

/// Process-local store of query results, addressed by [`QueryKey`].
///
/// The cache is cheap to clone; clones share the same entries. There is no
/// global instance: the owner (usually the API client) creates one and hands
/// it out.
#[derive(Clone, Default)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("config", &self.inner.config)
            .field("entries", &self.len())
            .finish()
    }
}

impl QueryCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                ..Default::default()
            }),
        }
    }

    pub fn config(&self) -> CacheConfig {
        self.inner.config
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.inner.entries()
    }

    /// Returns the value cached under `key`, fetching it when missing, stale
    /// or older than [`CacheConfig::stale_time`].
    ///
    /// Only one fetch per key runs at a time. Callers arriving while a fetch
    /// is in flight wait for it and reuse its result.
    pub async fn fetch<T, E, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<Arc<T>, E>
    where
        T: Send + Sync + 'static,
        E: fmt::Display + From<CacheError> + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let fetcher = Arc::new(fetcher);
        let stale_time = self.inner.config.stale_time;

        let (lock, marker) = {
            let mut entries = self.entries();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| self.inner.new_entry());
            entry.refetch = Some(erase::<T, E, F, Fut>(Arc::clone(&fetcher)));
            entry.last_used = Instant::now();
            if entry.is_fresh(stale_time) {
                if let Some(data) = entry.data.clone() {
                    tracing::debug!(%key, "cache hit");
                    return downcast(&key, data);
                }
            }
            (Arc::clone(&entry.fetch_lock), entry.marker())
        };

        let _guard = lock.lock().await;
        if let Some(data) = self.settled_since(&key, marker) {
            tracing::debug!(%key, "reusing concurrent fetch");
            return downcast(&key, data);
        }

        let in_flight = InFlight::begin(self, &key);
        match (*fetcher)().await {
            Ok(value) => {
                let value = Arc::new(value);
                in_flight.finish(Ok(Arc::clone(&value) as CachedValue));
                Ok(value)
            }
            Err(err) => {
                in_flight.finish(Err(err.to_string()));
                Err(err)
            }
        }
    }

    /// Marks every entry whose key starts with `prefix` as stale.
    ///
    /// Entries with active subscribers are refetched in a background task;
    /// the others refetch on their next [`fetch`](Self::fetch). Returns the
    /// number of entries touched.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut refetches = Vec::new();
        let mut count = 0;
        {
            let mut entries = self.entries();
            for (key, entry) in entries
                .iter_mut()
                .filter(|(key, _)| key.starts_with(prefix))
            {
                count += 1;
                entry.invalidations += 1;
                entry.state.send_modify(|state| state.stale = true);
                if entry.observers > 0 {
                    if let Some(refetch) = &entry.refetch {
                        refetches.push((key.clone(), Arc::clone(refetch)));
                    }
                }
            }
        }

        tracing::debug!(%prefix, count, active = refetches.len(), "invalidated queries");
        for (key, refetch) in refetches {
            self.spawn_refetch(key, refetch);
        }
        count
    }

    fn spawn_refetch(&self, key: QueryKey, refetch: Refetch) {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!(%key, "no async runtime, refetch deferred to next read");
            return;
        };
        let cache = self.clone();
        runtime.spawn(async move {
            if let Err(message) = cache.run_refetch(&key, refetch).await {
                tracing::warn!(%key, "background refetch failed: {message}");
            }
        });
    }

    async fn run_refetch(&self, key: &QueryKey, refetch: Refetch) -> Result<(), String> {
        let snapshot = {
            let entries = self.entries();
            entries
                .get(key)
                .map(|entry| (Arc::clone(&entry.fetch_lock), entry.marker()))
        };
        let Some((lock, marker)) = snapshot else {
            return Ok(());
        };

        let _guard = lock.lock().await;
        if self.settled_since(key, marker).is_some() {
            return Ok(());
        }
        let still_cached = self.entries().contains_key(key);
        if !still_cached {
            return Ok(());
        }

        let in_flight = InFlight::begin(self, key);
        let result = (*refetch)().await;
        let outcome = result.as_ref().map(|_| ()).map_err(String::clone);
        in_flight.finish(result);
        outcome
    }

    fn settled_since(&self, key: &QueryKey, marker: Marker) -> Option<CachedValue> {
        self.entries().get(key)?.settled_since(marker)
    }

    /// Starts observing `key`.
    ///
    /// While at least one subscription is alive, invalidating the key
    /// triggers a background refetch. The entry is created if needed.
    pub fn subscribe(&self, key: QueryKey) -> Subscription {
        let (entry_id, state) = {
            let mut entries = self.entries();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| self.inner.new_entry());
            entry.observers += 1;
            entry.last_used = Instant::now();
            (entry.id, entry.state.subscribe())
        };
        Subscription {
            cache: self.clone(),
            key,
            entry_id,
            state,
        }
    }

    fn release(&self, key: &QueryKey, entry_id: u64) {
        let mut entries = self.entries();
        if let Some(entry) = entries.get_mut(key).filter(|entry| entry.id == entry_id) {
            entry.observers = entry.observers.saturating_sub(1);
            entry.last_used = Instant::now();
        }
    }

    pub fn get<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let data = self.entries().get(key)?.data.clone()?;
        data.downcast::<T>().ok()
    }

    pub fn state(&self, key: &QueryKey) -> Option<QueryState> {
        self.entries()
            .get(key)
            .map(|entry| entry.state.borrow().clone())
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries().contains_key(key)
    }

    /// Cached keys, sorted.
    pub fn keys(&self) -> Vec<QueryKey> {
        let mut keys: Vec<_> = self.entries().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry whose key starts with `prefix`. Subscriptions to
    /// removed entries stop receiving updates.
    pub fn remove(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        before - entries.len()
    }

    pub fn clear(&self) {
        let removed = {
            let mut entries = self.entries();
            let removed = entries.len();
            entries.clear();
            removed
        };
        tracing::debug!(removed, "cache cleared");
    }

    /// Removes entries nobody observes, not being fetched, and unused for
    /// longer than [`CacheConfig::gc_time`].
    pub fn collect_garbage(&self) -> usize {
        let gc_time = self.inner.config.gc_time;
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, entry| {
            entry.observers > 0
                || entry.state.borrow().is_fetching
                || entry.last_used.elapsed() < gc_time
        });
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(removed, "collected unused cache entries");
        }
        removed
    }

    /// Runs [`collect_garbage`](Self::collect_garbage) every `every` until
    /// the last clone of the cache is dropped.
    pub fn spawn_collector(&self, every: Duration) -> JoinHandle<()> {
        let inner = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(inner) = inner.upgrade() else {
                    break;
                };
                QueryCache { inner }.collect_garbage();
            }
        })
    }
}

fn erase<T, E, F, Fut>(fetcher: Arc<F>) -> Refetch
where
    T: Send + Sync + 'static,
    E: fmt::Display + Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    Arc::new(move || {
        let fut = (*fetcher)();
        Box::pin(async move {
            fut.await
                .map(|value| Arc::new(value) as CachedValue)
                .map_err(|err| err.to_string())
        })
    })
}

fn downcast<T, E>(key: &QueryKey, data: CachedValue) -> Result<Arc<T>, E>
where
    T: Send + Sync + 'static,
    E: From<CacheError>,
{
    data.downcast::<T>().map_err(|_| {
        CacheError::TypeMismatch {
            key: key.to_string(),
        }
        .into()
    })
}

/// Bookkeeping for one running fetch. Dropping it before [`finish`] (the
/// caller's future was cancelled) puts the entry back to rest.
///
/// [`finish`]: InFlight::finish
struct InFlight<'a> {
    cache: &'a QueryCache,
    key: &'a QueryKey,
    generation: u64,
    done: bool,
}

impl<'a> InFlight<'a> {
    fn begin(cache: &'a QueryCache, key: &'a QueryKey) -> Self {
        let generation = {
            let mut entries = cache.entries();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| cache.inner.new_entry());
            let has_data = entry.data.is_some();
            entry.state.send_modify(|state| {
                state.is_fetching = true;
                if !has_data {
                    state.status = QueryStatus::Loading;
                }
            });
            entry.invalidations
        };
        tracing::debug!(%key, "fetching");
        Self {
            cache,
            key,
            generation,
            done: false,
        }
    }

    fn finish(mut self, result: Result<CachedValue, String>) {
        self.done = true;
        let cache = self.cache;
        let key = self.key;
        let mut entries = cache.entries();
        let Some(entry) = entries.get_mut(key) else {
            tracing::debug!(%key, "entry removed while fetching, result dropped");
            return;
        };

        entry.completed += 1;
        entry.last_used = Instant::now();
        // Invalidated while in flight: keep the data but leave it stale.
        let superseded = entry.invalidations != self.generation;
        match result {
            Ok(data) => {
                entry.data = Some(data);
                entry.fetched_at = Some(Instant::now());
                entry.state.send_modify(|state| {
                    state.status = QueryStatus::Success;
                    state.updated_at = Some(Utc::now());
                    state.stale = superseded;
                    state.is_fetching = false;
                });
            }
            Err(message) => {
                tracing::warn!(%key, "fetch failed: {message}");
                entry.state.send_modify(|state| {
                    state.status = QueryStatus::Error(message);
                    state.is_fetching = false;
                });
            }
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        let mut entries = self.cache.entries();
        if let Some(entry) = entries.get_mut(self.key) {
            tracing::debug!(key = %self.key, "fetch abandoned");
            entry.state.send_modify(|state| {
                state.is_fetching = false;
                if state.status == QueryStatus::Loading {
                    state.status = QueryStatus::Idle;
                }
            });
        }
    }
}

/// Live view of one cache entry.
#[derive(Debug)]
pub struct Subscription {
    cache: QueryCache,
    key: QueryKey,
    entry_id: u64,
    state: watch::Receiver<QueryState>,
}

impl Subscription {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn state(&self) -> QueryState {
        self.state.borrow().clone()
    }

    pub fn data<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.cache.get(&self.key)
    }

    /// Waits for the next state change.
    ///
    /// Returns `None` once the entry has been removed from the cache.
    pub async fn changed(&mut self) -> Option<QueryState> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cache.release(&self.key, self.entry_id);
    }
}

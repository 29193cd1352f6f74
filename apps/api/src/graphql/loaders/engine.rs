//! Request-scoped batching engine
//!
//! A [`BatchLoader`] sits in front of one [`Loader`] and turns many
//! single-key lookups into one bulk fetch:
//!
//! - the first uncached key opens a batching window and schedules a
//!   dispatcher task; every key requested before the window closes joins it
//!   (in request order, duplicates dropped)
//! - the dispatcher calls the loader exactly once per window and records the
//!   outcome for every key, including explicit absence
//! - a key whose batch is still in flight attaches to that batch instead of
//!   opening another one
//!
//! The cache lives exactly as long as the loader, which is built per request
//! by [`Loaders::new`](super::Loaders::new).

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_graphql::dataloader::Loader;
use futures_util::future::{try_join_all, FutureExt, Shared};
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::Instrument;

use crate::store::StoreError;

/// Failure delivered to every caller waiting on a batch
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    /// The batch-fetch function returned an error
    #[error("{loader} batch fetch failed: {source}")]
    Fetch {
        loader: &'static str,
        source: Arc<StoreError>,
    },

    /// The dispatcher went away before reporting an outcome
    #[error("{0} batch was dropped before it completed")]
    Abandoned(&'static str),
}

/// Tuning for batching windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    /// How long a window stays open after its first key. Zero closes it after
    /// a single scheduler pass.
    pub delay: Duration,
    /// A window holding this many keys is dispatched at once
    pub max_batch_size: usize,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(1),
            max_batch_size: 1000,
        }
    }
}

/// Bounds every loader key satisfies
pub trait LoaderKey: Send + Sync + Hash + Eq + Clone + fmt::Debug + 'static {}

impl<K> LoaderKey for K where K: Send + Sync + Hash + Eq + Clone + fmt::Debug + 'static {}

/// Index rows by a unique key
pub fn index_by<K, V>(rows: Vec<V>, key: impl Fn(&V) -> K) -> HashMap<K, V>
where
    K: Hash + Eq,
{
    rows.into_iter().map(|row| (key(&row), row)).collect()
}

/// Group rows under their key; every requested key gets an entry, possibly empty
pub fn group_by<K, V>(keys: &[K], rows: Vec<V>, key: impl Fn(&V) -> K) -> HashMap<K, Vec<V>>
where
    K: Hash + Eq + Clone,
{
    let mut groups: HashMap<K, Vec<V>> = keys.iter().map(|k| (k.clone(), Vec::new())).collect();
    for row in rows {
        groups.entry(key(&row)).or_default().push(row);
    }
    groups
}

type Outcome<K, V> = Result<Arc<HashMap<K, V>>, LoadError>;
type Batch<K, V> = Shared<oneshot::Receiver<Outcome<K, V>>>;

enum Slot<K, V> {
    Pending(Batch<K, V>),
    /// `None` records that the store had nothing for this key
    Ready(Option<V>),
}

struct Window<K, V> {
    id: u64,
    keys: Vec<K>,
    sender: oneshot::Sender<Outcome<K, V>>,
    batch: Batch<K, V>,
}

impl<K, V> Window<K, V> {
    fn open(id: u64) -> Self {
        let (sender, receiver) = oneshot::channel();
        Self {
            id,
            keys: Vec::new(),
            sender,
            batch: receiver.shared(),
        }
    }
}

struct State<K, V> {
    slots: HashMap<K, Slot<K, V>>,
    window: Option<Window<K, V>>,
    windows_opened: u64,
}

struct Inner<K, T>
where
    K: LoaderKey,
    T: Loader<K>,
{
    name: &'static str,
    loader: T,
    settings: BatchSettings,
    state: Mutex<State<K, T::Value>>,
}

impl<K, T> Inner<K, T>
where
    K: LoaderKey,
    T: Loader<K, Error = Arc<StoreError>>,
{
    fn lock(&self) -> MutexGuard<'_, State<K, T::Value>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run(&self, window: Window<K, T::Value>) {
        let Window { keys, sender, .. } = window;
        tracing::debug!(loader = self.name, keys = keys.len(), "dispatching batch");

        let outcome = self
            .loader
            .load(&keys)
            .await
            .map(Arc::new)
            .map_err(|source| LoadError::Fetch {
                loader: self.name,
                source,
            });

        {
            let mut state = self.lock();
            match &outcome {
                Ok(values) => {
                    for key in &keys {
                        if let Some(slot) = state.slots.get_mut(key) {
                            if matches!(slot, Slot::Pending(_)) {
                                *slot = Slot::Ready(values.get(key).cloned());
                            }
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        loader = self.name,
                        keys = keys.len(),
                        error = %err,
                        "batch fetch failed"
                    );
                    // Failed keys may be asked for again later in the request
                    for key in &keys {
                        if matches!(state.slots.get(key), Some(Slot::Pending(_))) {
                            state.slots.remove(key);
                        }
                    }
                }
            }
        }

        // All waiters may have been dropped already
        let _ = sender.send(outcome);
    }
}

/// Batching, deduplicating, caching front for one [`Loader`]
pub struct BatchLoader<K, T>
where
    K: LoaderKey,
    T: Loader<K>,
{
    inner: Arc<Inner<K, T>>,
}

impl<K, T> BatchLoader<K, T>
where
    K: LoaderKey,
    T: Loader<K, Error = Arc<StoreError>>,
{
    pub fn new(name: &'static str, loader: T, settings: BatchSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                name,
                loader,
                settings,
                state: Mutex::new(State {
                    slots: HashMap::new(),
                    window: None,
                    windows_opened: 0,
                }),
            }),
        }
    }

    /// Resolve one key, suspending until its batch completes.
    ///
    /// `Ok(None)` means the store has no row for `key`.
    pub async fn load(&self, key: K) -> Result<Option<T::Value>, LoadError> {
        let batch = {
            let mut guard = self.inner.lock();
            let state = &mut *guard;
            match state.slots.get(&key) {
                Some(Slot::Ready(value)) => {
                    tracing::trace!(loader = self.inner.name, ?key, "cache hit");
                    return Ok(value.clone());
                }
                Some(Slot::Pending(batch)) => batch.clone(),
                None => self.enqueue(state, key.clone()),
            }
        };

        let values = batch
            .await
            .map_err(|_| LoadError::Abandoned(self.inner.name))??;
        Ok(values.get(&key).cloned())
    }

    /// Resolve several keys; the i-th result belongs to the i-th key
    pub async fn load_many<I>(&self, keys: I) -> Result<Vec<Option<T::Value>>, LoadError>
    where
        I: IntoIterator<Item = K>,
    {
        try_join_all(keys.into_iter().map(|key| self.load(key))).await
    }

    /// Seed the cache; a key that is already pending or resolved is left alone
    pub fn prime(&self, key: K, value: T::Value) {
        self.inner
            .lock()
            .slots
            .entry(key)
            .or_insert(Slot::Ready(Some(value)));
    }

    fn enqueue(&self, state: &mut State<K, T::Value>, key: K) -> Batch<K, T::Value> {
        let mut window = match state.window.take() {
            Some(window) => window,
            None => {
                state.windows_opened += 1;
                let window = Window::open(state.windows_opened);
                self.schedule(window.id);
                window
            }
        };

        window.keys.push(key.clone());
        let batch = window.batch.clone();
        state.slots.insert(key, Slot::Pending(batch.clone()));

        if window.keys.len() >= self.inner.settings.max_batch_size {
            self.dispatch(window);
        } else {
            state.window = Some(window);
        }
        batch
    }

    /// Close window `window_id` once the delay has passed, unless it was
    /// already dispatched for being full
    fn schedule(&self, window_id: u64) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            if inner.settings.delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(inner.settings.delay).await;
            }

            let window = {
                let mut state = inner.lock();
                match state.window.take() {
                    Some(window) if window.id == window_id => window,
                    other => {
                        state.window = other;
                        return;
                    }
                }
            };
            inner.run(window).await;
        }
        .in_current_span());
    }

    fn dispatch(&self, window: Window<K, T::Value>) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.run(window).await }.in_current_span());
    }
}

/// Loader for relations where a key matches at most one row
pub struct OneLoader<K, T>
where
    K: LoaderKey,
    T: Loader<K>,
{
    batcher: BatchLoader<K, T>,
}

impl<K, T> OneLoader<K, T>
where
    K: LoaderKey,
    T: Loader<K, Error = Arc<StoreError>>,
{
    pub fn new(name: &'static str, loader: T, settings: BatchSettings) -> Self {
        Self {
            batcher: BatchLoader::new(name, loader, settings),
        }
    }

    pub async fn load(&self, key: K) -> Result<Option<T::Value>, LoadError> {
        self.batcher.load(key).await
    }

    pub async fn load_many<I>(&self, keys: I) -> Result<Vec<Option<T::Value>>, LoadError>
    where
        I: IntoIterator<Item = K>,
    {
        self.batcher.load_many(keys).await
    }

    pub fn prime(&self, key: K, value: T::Value) {
        self.batcher.prime(key, value);
    }
}

/// Loader for one-to-many relations; a key with no rows yields an empty list
pub struct ManyLoader<K, T>
where
    K: LoaderKey,
    T: Loader<K>,
{
    batcher: BatchLoader<K, T>,
}

impl<K, V, T> ManyLoader<K, T>
where
    K: LoaderKey,
    V: Clone + Send + Sync + 'static,
    T: Loader<K, Value = Vec<V>, Error = Arc<StoreError>>,
{
    pub fn new(name: &'static str, loader: T, settings: BatchSettings) -> Self {
        Self {
            batcher: BatchLoader::new(name, loader, settings),
        }
    }

    pub async fn load(&self, key: K) -> Result<Vec<V>, LoadError> {
        Ok(self.batcher.load(key).await?.unwrap_or_default())
    }

    pub async fn load_many<I>(&self, keys: I) -> Result<Vec<Vec<V>>, LoadError>
    where
        I: IntoIterator<Item = K>,
    {
        Ok(self
            .batcher
            .load_many(keys)
            .await?
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect())
    }

    pub fn prime(&self, key: K, values: Vec<V>) {
        self.batcher.prime(key, values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tracing_test::traced_test;

    /// Squares even keys; odd keys have no row
    #[derive(Clone, Default)]
    struct Squares {
        calls: Arc<Mutex<Vec<Vec<u32>>>>,
        latency: Duration,
        failing: bool,
    }

    impl Squares {
        fn calls(&self) -> Vec<Vec<u32>> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Loader<u32> for Squares {
        type Value = u32;
        type Error = Arc<StoreError>;

        async fn load(&self, keys: &[u32]) -> Result<HashMap<u32, u32>, Self::Error> {
            self.calls.lock().unwrap().push(keys.to_vec());
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            if self.failing {
                return Err(Arc::new(StoreError::Unavailable("squares".to_string())));
            }
            Ok(keys
                .iter()
                .filter(|k| *k % 2 == 0)
                .map(|k| (*k, k * k))
                .collect())
        }
    }

    /// Divisors of each key below 10
    #[derive(Clone, Default)]
    struct Divisors {
        calls: Arc<Mutex<Vec<Vec<u32>>>>,
    }

    impl Loader<u32> for Divisors {
        type Value = Vec<u32>;
        type Error = Arc<StoreError>;

        async fn load(&self, keys: &[u32]) -> Result<HashMap<u32, Vec<u32>>, Self::Error> {
            self.calls.lock().unwrap().push(keys.to_vec());
            let rows: Vec<(u32, u32)> = keys
                .iter()
                .flat_map(|k| (2..10).filter(move |d| k % d == 0).map(move |d| (*k, d)))
                .collect();
            Ok(group_by(keys, rows, |(k, _)| *k)
                .into_iter()
                .map(|(k, rows)| (k, rows.into_iter().map(|(_, d)| d).collect()))
                .collect())
        }
    }

    fn batcher(source: &Squares) -> BatchLoader<u32, Squares> {
        BatchLoader::new("squares", source.clone(), BatchSettings::default())
    }

    #[tokio::test]
    async fn test_concurrent_keys_share_one_fetch() {
        let source = Squares::default();
        let loader = batcher(&source);

        let (a, b, c) = tokio::join!(loader.load(2), loader.load(4), loader.load(6));

        assert_eq!((a.unwrap(), b.unwrap(), c.unwrap()), (Some(4), Some(16), Some(36)));
        assert_eq!(source.calls(), vec![vec![2, 4, 6]]);
    }

    #[tokio::test]
    async fn test_duplicate_keys_are_fetched_once() {
        let source = Squares::default();
        let loader = batcher(&source);

        let (a, b, c) = tokio::join!(loader.load(2), loader.load(4), loader.load(2));

        assert_eq!(a.unwrap(), Some(4));
        assert_eq!(b.unwrap(), Some(16));
        assert_eq!(c.unwrap(), Some(4));
        assert_eq!(source.calls(), vec![vec![2, 4]]);
    }

    #[tokio::test]
    async fn test_resolved_keys_come_from_cache() {
        let source = Squares::default();
        let loader = batcher(&source);

        loader.load(2).await.unwrap();
        loader.load(2).await.unwrap();
        loader.load_many([2, 2]).await.unwrap();

        assert_eq!(source.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_absent_key_is_none_and_cached() {
        let source = Squares::default();
        let loader = batcher(&source);

        assert_eq!(loader.load(3).await.unwrap(), None);
        assert_eq!(loader.load(3).await.unwrap(), None);
        assert_eq!(source.calls(), vec![vec![3]]);
    }

    #[tokio::test]
    async fn test_load_many_preserves_input_order() {
        let source = Squares::default();
        let loader = batcher(&source);

        let values = loader.load_many([6, 3, 2, 6]).await.unwrap();

        assert_eq!(values, vec![Some(36), None, Some(4), Some(36)]);
        assert_eq!(source.calls(), vec![vec![6, 3, 2]]);
    }

    #[tokio::test]
    async fn test_primed_key_skips_fetch() {
        let source = Squares::default();
        let loader = batcher(&source);

        loader.prime(8, 100);

        assert_eq!(loader.load(8).await.unwrap(), Some(100));
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_prime_does_not_overwrite_resolved_value() {
        let source = Squares::default();
        let loader = batcher(&source);

        loader.load(2).await.unwrap();
        loader.prime(2, 999);

        assert_eq!(loader.load(2).await.unwrap(), Some(4));
    }

    #[tokio::test]
    async fn test_load_suspends_until_window_closes() {
        let source = Squares::default();
        let loader = batcher(&source);

        let mut pending = tokio_test::task::spawn(loader.load(2));
        tokio_test::assert_pending!(pending.poll());
        assert!(source.calls().is_empty());
        drop(pending);

        // The window still dispatches; the key is shared with the next caller
        assert_eq!(loader.load(2).await.unwrap(), Some(4));
        assert_eq!(source.calls(), vec![vec![2]]);
    }

    #[tokio::test]
    async fn test_failure_reaches_every_waiter_and_is_not_cached() {
        let source = Squares {
            failing: true,
            ..Default::default()
        };
        let loader = batcher(&source);

        let (a, b) = tokio::join!(loader.load(2), loader.load(4));

        assert_matches!(a, Err(LoadError::Fetch { loader: "squares", .. }));
        assert_matches!(b, Err(LoadError::Fetch { .. }));
        assert_eq!(source.calls().len(), 1);

        assert!(loader.load(2).await.is_err());
        assert_eq!(source.calls().len(), 2);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_failed_batch_is_logged() {
        let source = Squares {
            failing: true,
            ..Default::default()
        };

        let _ = batcher(&source).load(8).await;

        assert!(logs_contain("batch fetch failed"));
        assert!(logs_contain("squares"));
    }

    #[tokio::test]
    async fn test_in_flight_key_attaches_to_running_batch() {
        let source = Squares {
            latency: Duration::from_millis(50),
            ..Default::default()
        };
        let loader = batcher(&source);

        let (first, second, other) = tokio::join!(loader.load(2), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            loader.load(2).await
        }, async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            loader.load(4).await
        });

        assert_eq!(first.unwrap(), Some(4));
        assert_eq!(second.unwrap(), Some(4));
        assert_eq!(other.unwrap(), Some(16));
        // 2 joined the running batch, 4 needed a window of its own
        assert_eq!(source.calls(), vec![vec![2], vec![4]]);
    }

    #[tokio::test]
    async fn test_full_window_dispatches_immediately() {
        let source = Squares::default();
        let loader = BatchLoader::new(
            "squares",
            source.clone(),
            BatchSettings {
                max_batch_size: 2,
                ..Default::default()
            },
        );

        let values = loader.load_many([2, 4, 6]).await.unwrap();

        assert_eq!(values, vec![Some(4), Some(16), Some(36)]);
        assert_eq!(source.calls(), vec![vec![2, 4], vec![6]]);
    }

    #[tokio::test]
    async fn test_zero_delay_still_coalesces_one_pass() {
        let source = Squares::default();
        let loader = BatchLoader::new(
            "squares",
            source.clone(),
            BatchSettings {
                delay: Duration::ZERO,
                ..Default::default()
            },
        );

        let (a, b) = tokio::join!(loader.load(2), loader.load(4));

        assert_eq!((a.unwrap(), b.unwrap()), (Some(4), Some(16)));
        assert_eq!(source.calls(), vec![vec![2, 4]]);
    }

    #[tokio::test]
    async fn test_one_loader_wraps_single_rows() {
        let source = Squares::default();
        let loader = OneLoader::new("squares", source.clone(), BatchSettings::default());

        assert_eq!(loader.load_many([4, 5]).await.unwrap(), vec![Some(16), None]);
        loader.prime(7, 49);
        assert_eq!(loader.load(7).await.unwrap(), Some(49));
        assert_eq!(source.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_many_loader_groups_rows_and_defaults_to_empty() {
        let source = Divisors::default();
        let loader = ManyLoader::new("divisors", source.clone(), BatchSettings::default());

        let (six, eleven) = tokio::join!(loader.load(6), loader.load(11));

        let mut six = six.unwrap();
        six.sort_unstable();
        assert_eq!(six, vec![2, 3, 6]);
        assert!(eleven.unwrap().is_empty());
        assert_eq!(source.calls.lock().unwrap().clone(), vec![vec![6, 11]]);
    }

    #[test]
    fn test_index_by_and_group_by() {
        let indexed = index_by(vec!["apple", "banana"], |s| s.len());
        assert_eq!(indexed.get(&5), Some(&"apple"));

        let grouped = group_by(&[1, 2, 3], vec![(1, 'a'), (1, 'b'), (3, 'c')], |(k, _)| *k);
        assert_eq!(grouped[&1].len(), 2);
        assert!(grouped[&2].is_empty());
        assert_eq!(grouped[&3], vec![(3, 'c')]);
    }
}

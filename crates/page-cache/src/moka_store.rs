//! In-memory store backed by moka.
use std::borrow::Borrow;
use std::convert::Infallible;
use std::fmt::{self, Debug, Formatter};
use std::hash::Hash;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use moka::future::CacheBuilder as MokaCacheBuilder;

use super::{CacheStore, CachedEntry};

/// A builder for [`MokaStore`].
pub struct Builder<K> {
    inner: MokaCacheBuilder<K, CachedEntry, MokaCache<K, CachedEntry>>,
}

impl<K> Debug for Builder<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder").finish_non_exhaustive()
    }
}

impl<K> Builder<K>
where
    K: Hash + Eq + Send + Sync + Clone + 'static,
{
    /// Sets the max number of cached pages.
    #[must_use]
    pub fn max_capacity(mut self, capacity: u64) -> Self {
        self.inner = self.inner.max_capacity(capacity);
        self
    }

    /// Entries expire `duration` after they were stored, whether or not they were read.
    ///
    /// # Panics
    ///
    /// [`Builder::build`] panics if `duration` is longer than 1000 years.
    #[must_use]
    pub fn time_to_live(mut self, duration: Duration) -> Self {
        self.inner = self.inner.time_to_live(duration);
        self
    }

    /// Builds a [`MokaStore`].
    #[must_use]
    pub fn build(self) -> MokaStore<K> {
        MokaStore {
            inner: self.inner.build(),
        }
    }
}

/// In-memory page store.
///
/// Clones share the same entries, so a handle kept elsewhere can clear what
/// the [`PageCache`](crate::PageCache) hoop stored.
#[derive(Clone)]
pub struct MokaStore<K> {
    inner: MokaCache<K, CachedEntry>,
}

impl<K> Debug for MokaStore<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MokaStore")
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}

impl<K> MokaStore<K>
where
    K: Hash + Eq + Send + Sync + Clone + 'static,
{
    /// Creates a store holding at most `max_capacity` pages that never expire.
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: MokaCache::new(max_capacity),
        }
    }

    /// Returns a [`Builder`], which can build a `MokaStore`.
    #[must_use]
    pub fn builder() -> Builder<K> {
        Builder {
            inner: MokaCache::builder(),
        }
    }
}

impl<K> CacheStore for MokaStore<K>
where
    K: Hash + Eq + Send + Sync + Clone + 'static,
{
    type Error = Infallible;
    type Key = K;

    async fn load_entry<Q>(&self, key: &Q) -> Option<CachedEntry>
    where
        Self::Key: Borrow<Q>,
        Q: Hash + Eq + Sync + ?Sized,
    {
        self.inner.get(key).await
    }

    async fn save_entry(&self, key: Self::Key, entry: CachedEntry) -> Result<(), Self::Error> {
        self.inner.insert(key, entry).await;
        Ok(())
    }

    async fn clear(&self) {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks().await;
        tracing::debug!("page cache cleared");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bytes::Bytes;
    use salvo::http::{HeaderMap, StatusCode};

    use super::*;

    fn entry(body: &'static str) -> CachedEntry {
        CachedEntry {
            status_code: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    #[tokio::test]
    async fn test_save_load_and_clear() {
        let store = MokaStore::<String>::new(4);
        let handle = store.clone();
        store.save_entry("index_page".to_owned(), entry("hello")).await.unwrap();
        assert_eq!(handle.load_entry("index_page").await, Some(entry("hello")));

        handle.clear().await;
        assert_eq!(store.load_entry("index_page").await, None);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let store = MokaStore::<String>::builder()
            .time_to_live(Duration::from_millis(50))
            .build();
        store.save_entry("index_page".to_owned(), entry("hello")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(store.load_entry("index_page").await, None);
    }
}

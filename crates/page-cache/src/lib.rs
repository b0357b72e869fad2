//! Whole-response cache for rendered pages.
//!
//! [`PageCache`] is a salvo hoop. On a hit it writes the stored status, headers
//! and body and skips the rest of the chain; on a miss it runs the chain and
//! keeps successful responses for later. Keys come from a [`CacheIssuer`],
//! entries live in a [`CacheStore`].
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use salvo::prelude::*;
//! use yatube_page_cache::{FixedIssuer, MokaStore, PageCache};
//!
//! #[handler]
//! async fn index() -> &'static str {
//!     "expensive page"
//! }
//!
//! let store = MokaStore::builder().time_to_live(Duration::from_secs(20)).build();
//! let router = Router::new()
//!     .hoop(PageCache::new(store, FixedIssuer::new("index_page")))
//!     .get(index);
//! # let _ = router;
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::borrow::Borrow;
use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::hash::Hash;

use bytes::{Bytes, BytesMut};
use salvo::handler::Skipper;
use salvo::http::header::SET_COOKIE;
use salvo::http::{HeaderMap, ResBody, StatusCode};
use salvo::{Depot, FlowCtrl, Handler, Request, Response, async_trait};

mod moka_store;
mod skipper;

pub use moka_store::{Builder, MokaStore};
pub use skipper::MethodSkipper;

/// Produces the cache key for a request. `None` bypasses the cache.
pub trait CacheIssuer: Send + Sync + 'static {
    /// The key type.
    type Key: Hash + Eq + Send + Sync + 'static;

    /// Issues a key for the request.
    fn issue(&self, req: &mut Request, depot: &Depot) -> impl Future<Output = Option<Self::Key>> + Send;
}

/// Uses the same key for every request.
///
/// The cached page is therefore shared by every visitor and every query string.
#[derive(Clone, Debug)]
pub struct FixedIssuer {
    key: String,
}

impl FixedIssuer {
    /// Creates an issuer that always returns `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl CacheIssuer for FixedIssuer {
    type Key = String;

    async fn issue(&self, _req: &mut Request, _depot: &Depot) -> Option<Self::Key> {
        Some(self.key.clone())
    }
}

/// A stored response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedEntry {
    /// Response status.
    pub status_code: StatusCode,
    /// Response headers, without `Set-Cookie`.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
}

impl CachedEntry {
    /// Snapshots a finished response. Streaming bodies can't be replayed and yield `None`.
    pub fn capture(res: &Response) -> Option<Self> {
        let body = match &res.body {
            ResBody::None => Bytes::new(),
            ResBody::Once(bytes) => bytes.clone(),
            ResBody::Chunks(chunks) => concat(chunks),
            _ => return None,
        };
        let mut headers = res.headers().clone();
        headers.remove(SET_COOKIE);
        Some(Self {
            status_code: res.status_code.unwrap_or(StatusCode::OK),
            headers,
            body,
        })
    }

    fn write_to(self, res: &mut Response) {
        res.status_code(self.status_code);
        *res.headers_mut() = self.headers;
        res.body(self.body);
    }
}

fn concat(chunks: &VecDeque<Bytes>) -> Bytes {
    let mut buf = BytesMut::with_capacity(chunks.iter().map(Bytes::len).sum());
    for chunk in chunks {
        buf.extend_from_slice(chunk);
    }
    buf.freeze()
}

/// Storage for cached responses.
pub trait CacheStore: Send + Sync + 'static {
    /// Error returned by the store.
    type Error: StdError + Sync + Send + 'static;
    /// Key type.
    type Key: Hash + Eq + Send + Clone + 'static;

    /// Loads a live entry.
    fn load_entry<Q>(&self, key: &Q) -> impl Future<Output = Option<CachedEntry>> + Send
    where
        Self::Key: Borrow<Q>,
        Q: Hash + Eq + Sync + ?Sized;

    /// Stores an entry, replacing any previous one for the same key.
    fn save_entry(&self, key: Self::Key, entry: CachedEntry) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Drops every entry.
    fn clear(&self) -> impl Future<Output = ()> + Send;
}

/// Caches responses of the routes it is hooped onto.
pub struct PageCache<S, I> {
    store: S,
    issuer: I,
    skipper: Box<dyn Skipper>,
}

impl<S, I> Debug for PageCache<S, I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageCache").finish_non_exhaustive()
    }
}

impl<S, I> PageCache<S, I>
where
    S: CacheStore<Key = I::Key>,
    I: CacheIssuer,
{
    /// Creates a cache that only considers `GET` requests.
    #[inline]
    pub fn new(store: S, issuer: I) -> Self {
        Self {
            store,
            issuer,
            skipper: Box::new(MethodSkipper::new().skip_all().skip_get(false)),
        }
    }

    /// Replaces the skipper deciding which requests bypass the cache.
    #[inline]
    #[must_use]
    pub fn skipper(mut self, skipper: impl Skipper) -> Self {
        self.skipper = Box::new(skipper);
        self
    }
}

#[async_trait]
impl<S, I> Handler for PageCache<S, I>
where
    S: CacheStore<Key = I::Key>,
    I: CacheIssuer,
{
    async fn handle(&self, req: &mut Request, depot: &mut Depot, res: &mut Response, ctrl: &mut FlowCtrl) {
        if self.skipper.skipped(req, depot) {
            return;
        }
        let Some(key) = self.issuer.issue(req, depot).await else {
            return;
        };
        if let Some(entry) = self.store.load_entry(&key).await {
            tracing::debug!(path = %req.uri().path(), "page cache hit");
            entry.write_to(res);
            ctrl.skip_rest();
            return;
        }

        ctrl.call_next(req, depot, res).await;
        if !res.status_code.unwrap_or(StatusCode::OK).is_success() {
            return;
        }
        match CachedEntry::capture(res) {
            Some(entry) => {
                if let Err(e) = self.store.save_entry(key, entry).await {
                    tracing::error!(error = ?e, "page cache save failed");
                }
            }
            None => tracing::debug!(path = %req.uri().path(), "response body is not cacheable"),
        }
    }
}

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use salvo::Depot;
use tera::Tera;
use yatube_page_cache::MokaStore;
use yatube_store::Store;

use crate::error::AppError;
use crate::templates;

/// Entries kept by the page cache. Only the index page is cached today.
const PAGE_CACHE_CAPACITY: u64 = 64;

/// Shared state injected into every request.
#[derive(Clone, Debug)]
pub struct AppState {
    pub store: Store,
    pub templates: Arc<Tera>,
    pub media_root: Arc<PathBuf>,
    /// Handle on the page cache; clearing it forces the next index request to render.
    pub page_cache: MokaStore<String>,
}

impl AppState {
    /// Compiles the templates and creates an empty page cache.
    pub fn new(store: Store, media_root: impl Into<PathBuf>, page_cache_ttl: Duration) -> Result<Self, AppError> {
        let page_cache = MokaStore::builder()
            .max_capacity(PAGE_CACHE_CAPACITY)
            .time_to_live(page_cache_ttl)
            .build();
        Ok(Self {
            store,
            templates: Arc::new(templates::load()?),
            media_root: Arc::new(media_root.into()),
            page_cache,
        })
    }

    #[must_use]
    pub fn media_root(&self) -> &Path {
        &self.media_root
    }

    /// The state injected by the router.
    pub fn from_depot(depot: &Depot) -> Result<&Self, AppError> {
        depot.obtain::<Self>().map_err(|_| AppError::MissingState("AppState"))
    }
}

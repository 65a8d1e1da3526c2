//! Product catalog backed by the KV store.
//!
//! The whole catalog is small, so it is read with one prefix scan and cached
//! in `moka` for a minute. Listing, search and related-product selection run
//! in memory on the cached copy.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument};

use forall_herbals_core::{Product, ProductId, ProductPage, ProductQuery, related_products};
use forall_herbals_core::catalog::RELATED_PRODUCT_COUNT;

use crate::db::{KvStore, RepositoryError, keys};

/// How long a catalog snapshot is served before the next scan.
const CACHE_TTL: Duration = Duration::from_secs(60);

/// The catalog is cached under a single key.
const CATALOG_KEY: &str = "catalog";

/// A product together with a few others from its category.
#[derive(Debug, Clone)]
pub struct ProductDetail {
    pub product: Product,
    pub related: Vec<Product>,
}

/// Cached read access to the product catalog.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<CatalogServiceInner>,
}

struct CatalogServiceInner {
    pool: PgPool,
    cache: Cache<&'static str, Arc<Vec<Product>>>,
}

impl CatalogService {
    /// Create a catalog service over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(CatalogServiceInner { pool, cache }),
        }
    }

    /// Every product, in key order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the scan fails or a document is corrupt.
    #[instrument(skip(self))]
    pub async fn all(&self) -> Result<Arc<Vec<Product>>, RepositoryError> {
        if let Some(products) = self.inner.cache.get(CATALOG_KEY).await {
            debug!("Cache hit for catalog");
            return Ok(products);
        }

        let products: Vec<Product> = KvStore::new(&self.inner.pool)
            .get_by_prefix_json(keys::PRODUCT_PREFIX)
            .await?;
        let products = Arc::new(products);

        self.inner
            .cache
            .insert(CATALOG_KEY, Arc::clone(&products))
            .await;

        Ok(products)
    }

    /// Filter, sort and paginate the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the catalog cannot be loaded.
    pub async fn list(&self, query: &ProductQuery) -> Result<ProductPage, RepositoryError> {
        let products = self.all().await?;
        Ok(query.apply(products.as_ref().clone()))
    }

    /// A product with related products from the same category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the catalog cannot be loaded.
    pub async fn detail(&self, id: &ProductId) -> Result<Option<ProductDetail>, RepositoryError> {
        let products = self.all().await?;
        let Some(product) = products.iter().find(|p| &p.id == id) else {
            return Ok(None);
        };

        Ok(Some(ProductDetail {
            related: related_products(product, &products, RELATED_PRODUCT_COUNT),
            product: product.clone(),
        }))
    }

    /// Read one product straight from the store, bypassing the cache.
    ///
    /// Used where a stale price would be wrong, such as adding to a cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails or the document is corrupt.
    pub async fn get_fresh(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        KvStore::new(&self.inner.pool)
            .get_json(&keys::product(id))
            .await
    }

    /// Drop the cached snapshot.
    pub async fn invalidate(&self) {
        self.inner.cache.invalidate(CATALOG_KEY).await;
    }
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("cached_entries", &self.inner.cache.entry_count())
            .finish_non_exhaustive()
    }
}

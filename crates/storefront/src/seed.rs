//! Sample data for a fresh database.
//!
//! The bundled document (`seed/sample_data.yaml`) is compiled into the binary.
//! [`initialize`] is idempotent: products are written only when the catalog is
//! empty, testimonials and blog posts only when their tables are empty. Each
//! of the three sets is written in its own transaction, all or nothing, under
//! a lock so concurrent callers write it once.

use std::collections::HashSet;

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, instrument};

use forall_herbals_core::{ContentError, NewBlogPost, NewTestimonial, Product};

use crate::db::{BlogRepository, KvStore, RepositoryError, TestimonialRepository, keys};

/// The sample document shipped with the storefront.
pub const BUNDLED_SAMPLE_DATA: &str = include_str!("../seed/sample_data.yaml");

/// Errors from loading or writing sample data.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The YAML document could not be parsed.
    #[error("invalid sample data: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A testimonial or blog post failed validation.
    #[error("invalid sample content: {0}")]
    Content(#[from] ContentError),

    /// Two sample posts share a slug.
    #[error("duplicate blog post slug in sample data: {0}")]
    DuplicateSlug(String),

    /// Storage failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A sample data document.
#[derive(Debug, Deserialize)]
pub struct SampleData {
    pub products: Vec<Product>,
    #[serde(default)]
    pub testimonials: Vec<NewTestimonial>,
    #[serde(default)]
    pub blog_posts: Vec<NewBlogPost>,
}

impl SampleData {
    /// Parse and validate a YAML sample document.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Parse` for malformed YAML and `SeedError::Content`
    /// for invalid testimonials or posts.
    pub fn from_yaml(yaml: &str) -> Result<Self, SeedError> {
        let data: Self = serde_yaml::from_str(yaml)?;
        for testimonial in &data.testimonials {
            testimonial.validate()?;
        }
        let mut slugs = HashSet::new();
        for post in &data.blog_posts {
            post.validate()?;
            if !slugs.insert(post.slug.trim()) {
                return Err(SeedError::DuplicateSlug(post.slug.trim().to_owned()));
            }
        }
        Ok(data)
    }

    /// The document compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns `SeedError` if the bundled document is invalid.
    pub fn bundled() -> Result<Self, SeedError> {
        Self::from_yaml(BUNDLED_SAMPLE_DATA)
    }
}

/// What [`initialize`] wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub products_created: usize,
    pub testimonials_created: usize,
    pub blog_posts_created: usize,
}

impl SeedReport {
    /// Whether anything was written.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.products_created == 0 && self.testimonials_created == 0 && self.blog_posts_created == 0
    }
}

/// Write sample data that is not present yet.
///
/// # Errors
///
/// Returns `SeedError::Repository` if any read or write fails.
#[instrument(skip_all)]
pub async fn initialize(pool: &PgPool, data: &SampleData) -> Result<SeedReport, SeedError> {
    let entries = data
        .products
        .iter()
        .map(|product| Ok((keys::product(&product.id), serde_json::to_value(product)?)))
        .collect::<Result<Vec<_>, serde_json::Error>>()
        .map_err(RepositoryError::from)?;

    let products_created = if KvStore::new(pool)
        .mset_if_prefix_empty(keys::PRODUCT_PREFIX, &entries)
        .await?
    {
        entries.len()
    } else {
        info!("Catalog already initialized");
        0
    };

    let report = SeedReport {
        products_created,
        testimonials_created: TestimonialRepository::new(pool)
            .seed(&data.testimonials)
            .await?,
        blog_posts_created: BlogRepository::new(pool).seed(&data.blog_posts).await?,
    };

    info!(
        products = report.products_created,
        testimonials = report.testimonials_created,
        blog_posts = report.blog_posts_created,
        "Sample data initialized"
    );

    Ok(report)
}

//! Blog post repository.

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use forall_herbals_core::{BlogPost, BlogPostId, NewBlogPost};

use super::RepositoryError;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct BlogPostRow {
    id: i32,
    title: String,
    slug: String,
    excerpt: Option<String>,
    content: String,
    author: String,
    published_at: DateTime<Utc>,
    read_time: i32,
    tags: Vec<String>,
    category: Option<String>,
    featured_image: Option<String>,
    seo_title: Option<String>,
    meta_description: Option<String>,
    related_products: Vec<String>,
    is_published: bool,
    created_at: DateTime<Utc>,
}

impl From<BlogPostRow> for BlogPost {
    fn from(row: BlogPostRow) -> Self {
        Self {
            id: BlogPostId::new(row.id),
            title: row.title,
            slug: row.slug,
            excerpt: row.excerpt,
            content: row.content,
            author: row.author,
            published_at: row.published_at,
            read_time: row.read_time,
            tags: row.tags,
            category: row.category,
            featured_image: row.featured_image,
            seo_title: row.seo_title,
            meta_description: row.meta_description,
            related_products: row.related_products,
            is_published: row.is_published,
            created_at: row.created_at,
        }
    }
}

const COLUMNS: &str = "id, title, slug, excerpt, content, author, published_at, read_time, \
     tags, category, featured_image, seo_title, meta_description, related_products, \
     is_published, created_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for blog posts.
pub struct BlogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BlogRepository<'a> {
    /// Create a new blog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Published posts, most recently published first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_published(&self) -> Result<Vec<BlogPost>, RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM storefront.blog_post \
             WHERE is_published \
             ORDER BY published_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, BlogPostRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// A published post by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM storefront.blog_post \
             WHERE slug = $1 AND is_published"
        );
        let row = sqlx::query_as::<_, BlogPostRow>(&sql)
            .bind(slug)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Insert a post. `published_at` defaults to now.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    /// Returns `RepositoryError::Database` for other failures.
    pub async fn create(&self, new: &NewBlogPost) -> Result<BlogPost, RepositoryError> {
        Self::insert(self.pool, new).await
    }

    /// Insert `posts` if the table is empty, all or nothing.
    ///
    /// The table is locked for the duration so concurrent callers cannot both
    /// see it empty. Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if two posts share a slug and
    /// `RepositoryError::Database` for other failures; nothing is written in
    /// either case.
    pub async fn seed(&self, posts: &[NewBlogPost]) -> Result<usize, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("LOCK TABLE storefront.blog_post IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM storefront.blog_post)")
                .fetch_one(&mut *tx)
                .await?;
        if exists {
            return Ok(0);
        }

        for new in posts {
            Self::insert(&mut *tx, new).await?;
        }

        tx.commit().await?;
        Ok(posts.len())
    }

    async fn insert<'e, E: PgExecutor<'e>>(
        executor: E,
        new: &NewBlogPost,
    ) -> Result<BlogPost, RepositoryError> {
        let sql = format!(
            "INSERT INTO storefront.blog_post \
             (title, slug, excerpt, content, author, published_at, read_time, tags, category, \
              featured_image, seo_title, meta_description, related_products, is_published) \
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()), $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, BlogPostRow>(&sql)
            .bind(new.title.trim())
            .bind(new.slug.trim())
            .bind(new.excerpt.as_deref())
            .bind(&new.content)
            .bind(new.author.trim())
            .bind(new.published_at)
            .bind(new.read_time)
            .bind(&new.tags)
            .bind(new.category.as_deref())
            .bind(new.featured_image.as_deref())
            .bind(new.seo_title.as_deref())
            .bind(new.meta_description.as_deref())
            .bind(&new.related_products)
            .bind(new.is_published)
            .fetch_one(executor)
            .await
            .map_err(|e| RepositoryError::from_insert(e, "blog post slug"))?;

        Ok(row.into())
    }

    /// Whether the table has no rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_empty(&self) -> Result<bool, RepositoryError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM storefront.blog_post)")
                .fetch_one(self.pool)
                .await?;

        Ok(!exists)
    }
}

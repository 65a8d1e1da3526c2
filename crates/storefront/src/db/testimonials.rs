//! Testimonial repository.

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use forall_herbals_core::{NewTestimonial, Testimonial, TestimonialId};

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct TestimonialRow {
    id: i32,
    name: String,
    age: Option<i16>,
    location: Option<String>,
    rating: i16,
    text: String,
    image: Option<String>,
    product: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<TestimonialRow> for Testimonial {
    fn from(row: TestimonialRow) -> Self {
        Self {
            id: TestimonialId::new(row.id),
            name: row.name,
            age: row.age,
            location: row.location,
            rating: row.rating,
            text: row.text,
            image: row.image,
            product: row.product,
            created_at: row.created_at,
        }
    }
}

/// Repository for customer testimonials.
pub struct TestimonialRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TestimonialRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All testimonials, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Testimonial>, RepositoryError> {
        let rows = sqlx::query_as::<_, TestimonialRow>(
            r"
            SELECT id, name, age, location, rating, text, image, product, created_at
            FROM storefront.testimonial
            ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Insert a testimonial. Callers validate the payload first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewTestimonial) -> Result<Testimonial, RepositoryError> {
        Self::insert(self.pool, new).await
    }

    /// Insert `testimonials` if the table is empty, all or nothing.
    ///
    /// The table is locked for the duration so concurrent callers cannot both
    /// see it empty. Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// written in that case.
    pub async fn seed(&self, testimonials: &[NewTestimonial]) -> Result<usize, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("LOCK TABLE storefront.testimonial IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM storefront.testimonial)")
                .fetch_one(&mut *tx)
                .await?;
        if exists {
            return Ok(0);
        }

        for new in testimonials {
            Self::insert(&mut *tx, new).await?;
        }

        tx.commit().await?;
        Ok(testimonials.len())
    }

    async fn insert<'e, E: PgExecutor<'e>>(
        executor: E,
        new: &NewTestimonial,
    ) -> Result<Testimonial, RepositoryError> {
        let row = sqlx::query_as::<_, TestimonialRow>(
            r"
            INSERT INTO storefront.testimonial (name, age, location, rating, text, image, product)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, age, location, rating, text, image, product, created_at
            ",
        )
        .bind(new.name.trim())
        .bind(new.age)
        .bind(new.location.as_deref())
        .bind(new.rating)
        .bind(new.text.trim())
        .bind(new.image.as_deref())
        .bind(new.product.as_deref())
        .fetch_one(executor)
        .await?;

        Ok(row.into())
    }
}

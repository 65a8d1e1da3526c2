//! Marketing content: customer testimonials and blog posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{BlogPostId, TestimonialId};

/// Lowest and highest star ratings.
pub const RATING_RANGE: std::ops::RangeInclusive<i16> = 1..=5;

/// Validation errors for new content.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContentError {
    /// A required text field is blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Rating outside 1..=5.
    #[error("rating must be between 1 and 5")]
    InvalidRating,

    /// Slug contains characters other than lowercase letters, digits and dashes.
    #[error("slug may only contain lowercase letters, digits and dashes")]
    InvalidSlug,
}

/// A customer testimonial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: TestimonialId,
    pub name: String,
    pub age: Option<i16>,
    pub location: Option<String>,
    pub rating: i16,
    pub text: String,
    pub image: Option<String>,
    pub product: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a testimonial.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTestimonial {
    pub name: String,
    pub age: Option<i16>,
    pub location: Option<String>,
    pub rating: i16,
    pub text: String,
    pub image: Option<String>,
    pub product: Option<String>,
}

impl NewTestimonial {
    /// Check required fields and the rating range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ContentError`] found.
    pub fn validate(&self) -> Result<(), ContentError> {
        require("name", &self.name)?;
        require("text", &self.text)?;
        if !RATING_RANGE.contains(&self.rating) {
            return Err(ContentError::InvalidRating);
        }
        Ok(())
    }
}

/// A blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: BlogPostId,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub author: String,
    pub published_at: DateTime<Utc>,
    pub read_time: i32,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub featured_image: Option<String>,
    pub seo_title: Option<String>,
    pub meta_description: Option<String>,
    pub related_products: Vec<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a blog post.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBlogPost {
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub author: String,
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default = "default_read_time")]
    pub read_time: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub featured_image: Option<String>,
    pub seo_title: Option<String>,
    pub meta_description: Option<String>,
    #[serde(default)]
    pub related_products: Vec<String>,
    #[serde(default = "default_published")]
    pub is_published: bool,
}

const fn default_read_time() -> i32 {
    5
}

const fn default_published() -> bool {
    true
}

impl NewBlogPost {
    /// Check required fields and slug shape.
    ///
    /// # Errors
    ///
    /// Returns the first [`ContentError`] found.
    pub fn validate(&self) -> Result<(), ContentError> {
        require("title", &self.title)?;
        require("slug", &self.slug)?;
        require("content", &self.content)?;
        require("author", &self.author)?;
        if !is_valid_slug(&self.slug) {
            return Err(ContentError::InvalidSlug);
        }
        Ok(())
    }
}

/// Whether `slug` is lowercase ASCII letters, digits and single dashes.
#[must_use]
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn require(field: &'static str, value: &str) -> Result<(), ContentError> {
    if value.trim().is_empty() {
        return Err(ContentError::MissingField(field));
    }
    Ok(())
}

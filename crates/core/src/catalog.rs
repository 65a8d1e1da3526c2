//! Product catalog types and the listing query.
//!
//! Products live as JSON documents in the key-value store, so the whole
//! catalog is read at once and filtered, sorted and paginated in memory.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// Default page size for product listings.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Number of related products shown on a product page.
pub const RELATED_PRODUCT_COUNT: usize = 4;

/// Category value that disables category filtering.
const ALL_CATEGORIES: &str = "all";

/// A skincare product.
///
/// Field names on the wire match the site's UI (camelCase, except the
/// `created_at` timestamp).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Price>,
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub usage: String,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub reviews: u32,
    #[serde(default = "default_true")]
    pub in_stock: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(rename = "created_at")]
    pub created_at: DateTime<Utc>,
}

const fn default_true() -> bool {
    true
}

impl Product {
    /// The image used for cart lines and thumbnails.
    #[must_use]
    pub fn primary_image(&self) -> &str {
        self.images.first().map_or("", String::as_str)
    }

    fn matches_category(&self, category: &str) -> bool {
        self.category.to_lowercase() == category.to_lowercase()
    }

    fn matches_search(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self
                .benefits
                .iter()
                .any(|benefit| benefit.to_lowercase().contains(needle))
    }
}

/// Featured products first, then newest first.
fn listing_order(a: &Product, b: &Product) -> Ordering {
    b.featured
        .cmp(&a.featured)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Filters and pagination for a product listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ProductQuery {
    /// Effective page number (1-based, never zero).
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Effective page size, clamped to `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    fn category_filter(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(ALL_CATEGORIES))
    }

    fn search_needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Filter, sort and paginate a catalog.
    #[must_use]
    pub fn apply(&self, mut products: Vec<Product>) -> ProductPage {
        if let Some(category) = self.category_filter() {
            products.retain(|p| p.matches_category(category));
        }

        if let Some(needle) = self.search_needle() {
            products.retain(|p| p.matches_search(&needle));
        }

        products.sort_by(listing_order);

        let page = self.page();
        let limit = self.limit();
        let total = products.len();
        let start = (page as usize - 1).saturating_mul(limit as usize);

        let products = products
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .collect();

        ProductPage {
            products,
            total,
            page,
            total_pages: total.div_ceil(limit as usize),
        }
    }
}

/// One page of a product listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: usize,
    pub page: u32,
    pub total_pages: usize,
}

/// Products in the same category as `product`, excluding it, in catalog order.
#[must_use]
pub fn related_products(product: &Product, catalog: &[Product], count: usize) -> Vec<Product> {
    catalog
        .iter()
        .filter(|p| p.category == product.category && p.id != product.id)
        .take(count)
        .cloned()
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn product(id: &str, category: &str, featured: bool, day: u32) -> Product {
        Product {
            id: ProductId::parse(id).unwrap(),
            name: format!("{id} name"),
            description: format!("{id} description"),
            price: Price::from_dollars(50),
            original_price: None,
            category: category.to_string(),
            images: vec![format!("https://img.example.com/{id}.jpg")],
            benefits: vec!["Hydrating".to_string()],
            ingredients: vec![],
            usage: String::new(),
            rating: 4.5,
            reviews: 10,
            in_stock: true,
            featured,
            created_at: Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0).unwrap(),
        }
    }

    fn ids(page: &ProductPage) -> Vec<&str> {
        page.products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_defaults() {
        let query = ProductQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_page_and_limit_are_clamped() {
        let query = ProductQuery {
            page: Some(0),
            limit: Some(10_000),
            ..Default::default()
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), MAX_PAGE_SIZE);

        let query = ProductQuery {
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(query.limit(), 1);
    }

    #[test]
    fn test_featured_first_then_newest() {
        let catalog = vec![
            product("old-plain", "serums", false, 1),
            product("new-plain", "serums", false, 9),
            product("old-featured", "oils", true, 2),
            product("new-featured", "oils", true, 8),
        ];
        let page = ProductQuery::default().apply(catalog);
        assert_eq!(
            ids(&page),
            ["new-featured", "old-featured", "new-plain", "old-plain"]
        );
    }

    #[test]
    fn test_category_filter_is_case_insensitive() {
        let catalog = vec![
            product("a", "Serums", false, 1),
            product("b", "oils", false, 2),
        ];
        let query = ProductQuery {
            category: Some("serums".to_string()),
            ..Default::default()
        };
        let page = query.apply(catalog);
        assert_eq!(ids(&page), ["a"]);
        assert_eq!(page.total, 1);
    }

    #[test]
    fn test_all_category_disables_filter() {
        let catalog = vec![
            product("a", "serums", false, 1),
            product("b", "oils", false, 2),
        ];
        let query = ProductQuery {
            category: Some("ALL".to_string()),
            ..Default::default()
        };
        assert_eq!(query.apply(catalog).total, 2);
    }

    #[test]
    fn test_search_matches_name_description_and_benefits() {
        let mut by_benefit = product("c", "oils", false, 3);
        by_benefit.benefits = vec!["Dark Circle Reducing".to_string()];
        let catalog = vec![
            product("radiance", "serums", false, 1),
            product("night", "moisturizers", false, 2),
            by_benefit,
        ];

        let search = |term: &str| {
            ProductQuery {
                search: Some(term.to_string()),
                ..Default::default()
            }
            .apply(catalog.clone())
        };

        assert_eq!(ids(&search("RADIANCE")), ["radiance"]);
        assert_eq!(ids(&search("night description")), ["night"]);
        assert_eq!(ids(&search("dark circle")), ["c"]);
        assert_eq!(search("   ").total, 3);
    }

    #[test]
    fn test_pagination_does_not_overlap() {
        let catalog: Vec<Product> = (1..=5)
            .map(|day| product(&format!("p{day}"), "serums", false, day))
            .collect();

        let page = |n: u32| {
            ProductQuery {
                page: Some(n),
                limit: Some(2),
                ..Default::default()
            }
            .apply(catalog.clone())
        };

        let first = page(1);
        assert_eq!(ids(&first), ["p5", "p4"]);
        assert_eq!(first.total, 5);
        assert_eq!(first.total_pages, 3);
        assert_eq!(ids(&page(2)), ["p3", "p2"]);
        assert_eq!(ids(&page(3)), ["p1"]);
        assert!(page(4).products.is_empty());
    }

    #[test]
    fn test_related_products() {
        let current = product("radiance", "serums", true, 1);
        let catalog = vec![
            current.clone(),
            product("s1", "serums", false, 2),
            product("o1", "oils", false, 3),
            product("s2", "serums", false, 4),
            product("s3", "serums", false, 5),
            product("s4", "serums", false, 6),
            product("s5", "serums", false, 7),
        ];
        let related = related_products(&current, &catalog, RELATED_PRODUCT_COUNT);
        let related_ids: Vec<&str> = related.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(related_ids, ["s1", "s2", "s3", "s4"]);
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::json!({
            "id": "radiance-serum",
            "name": "Radiance Renewal Serum",
            "description": "Vitamin C infused serum",
            "price": 89,
            "originalPrice": 119,
            "category": "serums",
            "images": ["https://img.example.com/a.jpg"],
            "benefits": ["Brightening"],
            "ingredients": ["Vitamin C"],
            "usage": "Apply daily",
            "rating": 4.9,
            "reviews": 1247,
            "inStock": true,
            "featured": true,
            "created_at": "2025-01-01T00:00:00Z"
        });
        let parsed: Product = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.original_price, Some(Price::from_dollars(119)));
        assert_eq!(parsed.primary_image(), "https://img.example.com/a.jpg");

        let back = serde_json::to_value(&parsed).unwrap();
        assert_eq!(back["inStock"], true);
        assert_eq!(back["originalPrice"], 119);
        assert!(back.get("created_at").is_some());
    }

    #[test]
    fn test_pages_partition_filtered_listing() {
        let mut catalog: Vec<Product> = (1..=9)
            .map(|day| product(&format!("s{day}"), "serums", day % 3 == 0, day))
            .collect();
        catalog.push(product("oil", "oils", true, 10));

        let query = |page: u32| ProductQuery {
            category: Some("serums".to_string()),
            page: Some(page),
            limit: Some(4),
            ..Default::default()
        };

        let first = query(1).apply(catalog.clone());
        assert_eq!(first.total, 9);
        assert_eq!(first.total_pages, 3);

        let mut seen: Vec<String> = Vec::new();
        for n in 1..=u32::try_from(first.total_pages).unwrap() {
            let page = query(n).apply(catalog.clone());
            for id in ids(&page) {
                assert!(!seen.iter().any(|s| s == id), "{id} on two pages");
                seen.push(id.to_string());
            }
        }

        assert_eq!(seen.len(), 9);
        assert!(seen.iter().all(|id| id.starts_with('s')));
        // Featured serums lead, newest first.
        assert_eq!(&seen[..3], ["s9", "s6", "s3"]);
    }

    #[test]
    fn test_fractional_price_round_trip() {
        let json = serde_json::json!({
            "id": "eye-cream",
            "name": "Brightening Eye Cream",
            "description": "Gentle eye cream",
            "price": 45.99,
            "originalPrice": 59.5,
            "category": "eye-care",
            "created_at": "2025-01-01T00:00:00Z"
        });
        let parsed: Product = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.price.to_string(), "$45.99");
        assert_eq!(parsed.original_price.unwrap().to_string(), "$59.50");

        let back = serde_json::to_value(&parsed).unwrap();
        assert_eq!(back["price"], 45.99);
        assert_eq!(back["originalPrice"], 59.5);

        let again: Product = serde_json::from_value(back).unwrap();
        assert_eq!(again.price, parsed.price);
    }
}

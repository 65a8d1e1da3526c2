//! ForAll Herbals Core - Shared domain library.
//!
//! This crate provides the types and pure logic used across the workspace:
//! - `storefront` - JSON API consumed by the marketing site
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Everything here can be unit tested in isolation.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices and emails
//! - [`catalog`] - Products plus listing filters, sorting and pagination
//! - [`cart`] - Shopping cart lines, totals and the guest cart merge
//! - [`profile`] - User profiles and preference updates
//! - [`content`] - Testimonials and blog posts
//! - [`newsletter`] - Newsletter subscriptions and discount codes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod content;
pub mod newsletter;
pub mod profile;
pub mod types;

pub use cart::{Cart, CartError, CartItem};
pub use catalog::{Product, ProductPage, ProductQuery, related_products};
pub use content::{BlogPost, ContentError, NewBlogPost, NewTestimonial, Testimonial};
pub use newsletter::{DiscountCode, NewsletterStats, NewsletterSubscription, SubscriptionStatus};
pub use profile::{Preferences, PreferencesUpdate, ProfileUpdate, UserProfile};
pub use types::*;

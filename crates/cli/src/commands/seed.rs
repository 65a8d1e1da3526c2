//! Seed the storefront with sample data.
//!
//! Runs the same idempotent initializer as `POST /init-data`. Products are
//! written only when the catalog is empty; testimonials and blog posts only
//! when their tables are empty.

use std::path::Path;

use tracing::info;

use forall_herbals_storefront::seed::{self, SampleData};

/// Seed sample data, from `file_path` if given or the bundled document.
///
/// # Errors
///
/// Returns an error if the file cannot be read, fails validation, or
/// database operations fail.
pub async fn sample_data(file_path: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    // Read and validate YAML before connecting to database
    let data = match file_path {
        Some(file_path) => {
            let path = Path::new(file_path);
            if !path.exists() {
                return Err(format!("File not found: {file_path}").into());
            }
            info!(path = %file_path, "Loading sample data from file");
            let content = tokio::fs::read_to_string(path).await?;
            SampleData::from_yaml(&content)?
        }
        None => SampleData::bundled()?,
    };

    info!(
        products = data.products.len(),
        testimonials = data.testimonials.len(),
        blog_posts = data.blog_posts.len(),
        "Sample data validated"
    );

    let pool = super::connect().await?;
    let report = seed::initialize(&pool, &data).await?;

    if report.is_empty() {
        info!("Nothing to do, sample data already present");
    } else {
        info!("Seeding complete!");
        info!("  Products created: {}", report.products_created);
        info!("  Testimonials created: {}", report.testimonials_created);
        info!("  Blog posts created: {}", report.blog_posts_created);
    }

    Ok(())
}

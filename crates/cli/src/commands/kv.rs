//! Key-value store inspection.

use tracing::{info, warn};

use forall_herbals_storefront::db::KvStore;
use forall_herbals_storefront::services::NewsletterService;

/// Log the values stored under `keys`.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn get(keys: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    let kv = KvStore::new(&pool);

    if let [key] = keys {
        match kv.get(key).await? {
            Some(value) => info!("{key} = {}", serde_json::to_string_pretty(&value)?),
            None => warn!(key = %key, "Key not found"),
        }
        return Ok(());
    }

    let found = kv.mget(keys).await?;
    for (key, value) in &found {
        info!("{key} = {}", serde_json::to_string_pretty(value)?);
    }
    info!(requested = keys.len(), found = found.len(), "Lookup complete");
    Ok(())
}

/// Log every entry under `prefix`.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn list(prefix: &str) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    let entries = KvStore::new(&pool).get_by_prefix(prefix).await?;

    for (key, value) in &entries {
        info!("{key} = {value}");
    }
    info!(prefix = %prefix, count = entries.len(), "Listing complete");
    Ok(())
}

/// Delete `keys`. Missing keys are ignored.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn del(keys: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    let kv = KvStore::new(&pool);

    if let [key] = keys {
        kv.del(key).await?;
    } else {
        kv.mdel(keys).await?;
    }
    info!(count = keys.len(), "Keys deleted");
    Ok(())
}

/// Log newsletter subscriber counters.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn newsletter_stats() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    let stats = NewsletterService::new(KvStore::new(&pool)).stats().await?;

    info!("Newsletter Statistics");
    info!("=====================");
    info!("Total subscribers: {}", stats.total_subscribers);
    Ok(())
}

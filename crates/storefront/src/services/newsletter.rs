//! Newsletter signups.
//!
//! A subscription is stored at `newsletter:{email}` with a welcome discount
//! code. Subscribing again returns the stored code rather than minting a new
//! one. The subscriber counter in `newsletter_stats` is a plain
//! read-modify-write.

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{info, instrument};

use forall_herbals_core::{DiscountCode, Email, NewsletterStats, NewsletterSubscription};

use crate::db::{KvStore, RepositoryError, keys};

/// Result of a subscribe call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeOutcome {
    pub discount_code: DiscountCode,
    pub already_subscribed: bool,
}

/// Newsletter operations for one request.
pub struct NewsletterService<'a> {
    kv: KvStore<'a>,
}

impl<'a> NewsletterService<'a> {
    #[must_use]
    pub const fn new(kv: KvStore<'a>) -> Self {
        Self { kv }
    }

    /// Subscribe `email`, or return its existing code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if storage fails.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn subscribe(&self, email: Email) -> Result<SubscribeOutcome, RepositoryError> {
        let key = keys::newsletter(&email);

        let existing = self.kv.get_json::<NewsletterSubscription>(&key).await?;
        let (outcome, created) = plan_subscription(existing, email, Utc::now(), &mut rand::rng());

        let Some(subscription) = created else {
            return Ok(outcome);
        };
        self.kv.set_json(&key, &subscription).await?;

        let stats = self
            .kv
            .get_json::<NewsletterStats>(keys::NEWSLETTER_STATS)
            .await?
            .unwrap_or_default()
            .record_subscription();
        self.kv.set_json(keys::NEWSLETTER_STATS, &stats).await?;

        info!(total = stats.total_subscribers, "Newsletter subscription created");

        Ok(outcome)
    }

    /// Current subscriber counters.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails.
    pub async fn stats(&self) -> Result<NewsletterStats, RepositoryError> {
        Ok(self
            .kv
            .get_json(keys::NEWSLETTER_STATS)
            .await?
            .unwrap_or_default())
    }
}

/// Outcome of subscribing `email` given its stored subscription.
///
/// An existing subscription keeps its code. Otherwise a new subscription is
/// returned for the caller to store.
pub fn plan_subscription<R: Rng + ?Sized>(
    existing: Option<NewsletterSubscription>,
    email: Email,
    now: DateTime<Utc>,
    rng: &mut R,
) -> (SubscribeOutcome, Option<NewsletterSubscription>) {
    if let Some(existing) = existing {
        let outcome = SubscribeOutcome {
            discount_code: existing.discount_code,
            already_subscribed: true,
        };
        return (outcome, None);
    }

    let subscription = NewsletterSubscription::new(email, generate_discount_code(rng), now);
    let outcome = SubscribeOutcome {
        discount_code: subscription.discount_code.clone(),
        already_subscribed: false,
    };
    (outcome, Some(subscription))
}

/// Draw a `GLOW15-XXXXXXXX` code.
pub fn generate_discount_code<R: Rng + ?Sized>(rng: &mut R) -> DiscountCode {
    let indices = std::array::from_fn(|_| rng.random_range(0..DiscountCode::ALPHABET.len()));
    DiscountCode::from_indices(indices)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_generated_codes_are_well_formed() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let code = generate_discount_code(&mut rng);
            assert!(DiscountCode::is_well_formed(code.as_str()), "{code}");
        }
    }

    #[test]
    fn test_generated_codes_vary() {
        let mut rng = StdRng::seed_from_u64(42);
        let a = generate_discount_code(&mut rng);
        let b = generate_discount_code(&mut rng);
        assert_ne!(a, b);
    }

    #[test]
    fn test_second_subscription_returns_same_code() {
        let mut rng = StdRng::seed_from_u64(1);
        let email = Email::parse("glow@example.com").unwrap();

        let (first, stored) = plan_subscription(None, email.clone(), Utc::now(), &mut rng);
        assert!(!first.already_subscribed);
        let stored = stored.unwrap();
        assert_eq!(stored.discount_code, first.discount_code);

        let (second, created) = plan_subscription(Some(stored), email, Utc::now(), &mut rng);
        assert!(second.already_subscribed);
        assert_eq!(second.discount_code, first.discount_code);
        assert!(created.is_none());
    }
}

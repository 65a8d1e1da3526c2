//! Newsletter subscriptions.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Email;

/// Discount codes handed to new subscribers look like `GLOW15-7K2Q9ZXA`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscountCode(String);

impl DiscountCode {
    /// Prefix shared by every welcome code.
    pub const PREFIX: &'static str = "GLOW15-";

    /// Number of random characters after the prefix.
    pub const SUFFIX_LENGTH: usize = 8;

    /// Alphabet the suffix is drawn from (upper-case base 36).
    pub const ALPHABET: &'static [u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    /// Build a code from a random suffix.
    ///
    /// Returns `None` unless the suffix has the expected length and alphabet.
    #[must_use]
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        let valid = suffix.len() == Self::SUFFIX_LENGTH
            && suffix.bytes().all(|b| Self::ALPHABET.contains(&b));
        valid.then(|| Self(format!("{}{suffix}", Self::PREFIX)))
    }

    /// Build a code from alphabet positions, one per suffix character.
    ///
    /// Positions wrap around the alphabet length.
    #[must_use]
    pub fn from_indices(indices: [usize; Self::SUFFIX_LENGTH]) -> Self {
        let suffix: String = indices
            .iter()
            .map(|&i| {
                Self::ALPHABET
                    .get(i % Self::ALPHABET.len())
                    .map_or('0', |&b| char::from(b))
            })
            .collect();
        Self(format!("{}{suffix}", Self::PREFIX))
    }

    /// Whether `code` has the welcome-code shape.
    #[must_use]
    pub fn is_well_formed(code: &str) -> bool {
        code.strip_prefix(Self::PREFIX)
            .and_then(Self::from_suffix)
            .is_some()
    }

    /// The code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiscountCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Subscription state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Active,
}

/// A stored newsletter subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsletterSubscription {
    pub email: Email,
    pub subscribed_at: DateTime<Utc>,
    #[serde(default)]
    pub status: SubscriptionStatus,
    pub discount_code: DiscountCode,
}

impl NewsletterSubscription {
    /// A new active subscription.
    #[must_use]
    pub const fn new(email: Email, discount_code: DiscountCode, now: DateTime<Utc>) -> Self {
        Self {
            email,
            subscribed_at: now,
            status: SubscriptionStatus::Active,
            discount_code,
        }
    }
}

/// Aggregate newsletter counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewsletterStats {
    #[serde(default)]
    pub total_subscribers: u64,
}

impl NewsletterStats {
    /// Count one more subscriber.
    #[must_use]
    pub const fn record_subscription(self) -> Self {
        Self {
            total_subscribers: self.total_subscribers.saturating_add(1),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_suffix() {
        let code = DiscountCode::from_suffix("7K2Q9ZXA").unwrap();
        assert_eq!(code.as_str(), "GLOW15-7K2Q9ZXA");
        assert!(DiscountCode::from_suffix("7k2q9zxa").is_none());
        assert!(DiscountCode::from_suffix("SHORT").is_none());
    }

    #[test]
    fn test_from_indices() {
        let code = DiscountCode::from_indices([0, 9, 10, 35, 36, 1, 2, 3]);
        assert_eq!(code.as_str(), "GLOW15-09AZ0123");
        assert!(DiscountCode::is_well_formed(code.as_str()));
    }

    #[test]
    fn test_is_well_formed() {
        assert!(DiscountCode::is_well_formed("GLOW15-ABCDEF12"));
        assert!(!DiscountCode::is_well_formed("GLOW20-ABCDEF12"));
        assert!(!DiscountCode::is_well_formed("GLOW15-ABC"));
    }

    #[test]
    fn test_subscription_wire_format() {
        let sub = NewsletterSubscription::new(
            Email::parse("maria@example.com").unwrap(),
            DiscountCode::from_suffix("00000000").unwrap(),
            Utc::now(),
        );
        let json = serde_json::to_value(&sub).unwrap();
        assert_eq!(json["status"], "active");
        assert_eq!(json["discount_code"], "GLOW15-00000000");
    }

    #[test]
    fn test_stats_increment() {
        let stats = NewsletterStats::default().record_subscription();
        assert_eq!(stats.total_subscribers, 1);
    }
}

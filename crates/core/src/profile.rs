//! User profiles.
//!
//! A profile is created at signup next to the hosted auth account and holds
//! the shopper's display name and skincare preferences.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{Email, UserId};

/// Skincare preferences collected by the site.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    pub skin_type: Option<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub newsletter_subscribed: bool,
}

/// A stored user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub preferences: Preferences,
}

/// Partial preference update.
///
/// Each field is `None` when absent (keep the current value) and
/// `Some(None)` when sent as `null` (reset to the default).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesUpdate {
    /// New skin type; an empty string also clears it.
    #[serde(default, deserialize_with = "explicit_null")]
    pub skin_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub concerns: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub newsletter_subscribed: Option<Option<bool>>,
}

/// Body of a profile update request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    /// `null` and absent both leave preferences unchanged.
    #[serde(default, deserialize_with = "null_as_default")]
    pub preferences: PreferencesUpdate,
}

/// Present fields deserialize to `Some`, so a `null` becomes `Some(None)`.
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl UserProfile {
    /// Create a fresh profile with default preferences.
    #[must_use]
    pub fn new(id: UserId, email: Email, name: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            email,
            name,
            created_at: now,
            updated_at: None,
            preferences: Preferences::default(),
        }
    }

    /// Apply a partial update.
    pub fn apply(&mut self, update: ProfileUpdate, now: DateTime<Utc>) {
        if let Some(name) = update.name.filter(|n| !n.trim().is_empty()) {
            self.name = name.trim().to_owned();
        }

        let prefs = update.preferences;
        if let Some(skin_type) = prefs.skin_type {
            self.preferences.skin_type = skin_type
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned);
        }
        if let Some(concerns) = prefs.concerns {
            self.preferences.concerns = concerns.unwrap_or_default();
        }
        if let Some(subscribed) = prefs.newsletter_subscribed {
            self.preferences.newsletter_subscribed = subscribed.unwrap_or_default();
        }

        self.updated_at = Some(now);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;

    fn profile() -> UserProfile {
        UserProfile::new(
            UserId::new(Uuid::nil()),
            Email::parse("emily@example.com").unwrap(),
            "Emily".to_string(),
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_new_profile_has_default_preferences() {
        let json = serde_json::to_value(profile()).unwrap();
        assert_eq!(json["preferences"]["skin_type"], serde_json::Value::Null);
        assert_eq!(json["preferences"]["concerns"], serde_json::json!([]));
        assert_eq!(json["preferences"]["newsletter_subscribed"], false);
        assert!(json.get("updated_at").is_none());
    }

    #[test]
    fn test_apply_merges_preferences() {
        let mut p = profile();
        p.preferences.concerns = vec!["acne".to_string()];
        let now = Utc.with_ymd_and_hms(2025, 3, 2, 12, 0, 0).unwrap();

        let update: ProfileUpdate = serde_json::from_value(serde_json::json!({
            "preferences": { "skin_type": "oily" }
        }))
        .unwrap();
        p.apply(update, now);

        assert_eq!(p.name, "Emily");
        assert_eq!(p.preferences.skin_type.as_deref(), Some("oily"));
        assert_eq!(p.preferences.concerns, ["acne"]);
        assert_eq!(p.updated_at, Some(now));
    }

    #[test]
    fn test_blank_name_is_ignored_and_empty_skin_type_clears() {
        let mut p = profile();
        p.preferences.skin_type = Some("dry".to_string());

        p.apply(
            ProfileUpdate {
                name: Some("   ".to_string()),
                preferences: PreferencesUpdate {
                    skin_type: Some(Some(String::new())),
                    newsletter_subscribed: Some(Some(true)),
                    ..Default::default()
                },
            },
            Utc::now(),
        );

        assert_eq!(p.name, "Emily");
        assert_eq!(p.preferences.skin_type, None);
        assert!(p.preferences.newsletter_subscribed);
    }

    #[test]
    fn test_name_is_trimmed() {
        let mut p = profile();
        p.apply(
            ProfileUpdate {
                name: Some("  Emily Chen ".to_string()),
                ..Default::default()
            },
            Utc::now(),
        );
        assert_eq!(p.name, "Emily Chen");
    }

    #[test]
    fn test_explicit_null_resets_preference() {
        let mut p = profile();
        p.preferences.skin_type = Some("oily".to_string());
        p.preferences.concerns = vec!["acne".to_string()];
        p.preferences.newsletter_subscribed = true;

        let update: ProfileUpdate = serde_json::from_value(serde_json::json!({
            "preferences": { "skin_type": null, "concerns": null }
        }))
        .unwrap();
        p.apply(update, Utc::now());

        assert_eq!(p.preferences.skin_type, None);
        assert!(p.preferences.concerns.is_empty());
        assert!(p.preferences.newsletter_subscribed);
    }

    #[test]
    fn test_null_preferences_leaves_them_unchanged() {
        let mut p = profile();
        p.preferences.skin_type = Some("dry".to_string());

        let update: ProfileUpdate = serde_json::from_value(serde_json::json!({
            "name": "Jo",
            "preferences": null
        }))
        .unwrap();
        p.apply(update, Utc::now());

        assert_eq!(p.name, "Jo");
        assert_eq!(p.preferences.skin_type.as_deref(), Some("dry"));
    }
}

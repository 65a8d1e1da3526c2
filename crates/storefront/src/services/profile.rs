//! User profiles stored at `user_profile:{user_id}`.

use chrono::Utc;

use forall_herbals_core::{Email, ProfileUpdate, UserId, UserProfile};

use crate::db::{KvStore, RepositoryError, keys};

/// Profile operations for one request.
pub struct ProfileService<'a> {
    kv: KvStore<'a>,
}

impl<'a> ProfileService<'a> {
    #[must_use]
    pub const fn new(kv: KvStore<'a>) -> Self {
        Self { kv }
    }

    /// Store a fresh profile for a newly created user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the write fails.
    pub async fn create(
        &self,
        id: UserId,
        email: Email,
        name: String,
    ) -> Result<UserProfile, RepositoryError> {
        let profile = UserProfile::new(id, email, name, Utc::now());
        self.kv.set_json(&keys::profile(id), &profile).await?;
        Ok(profile)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails or the document is corrupt.
    pub async fn get(&self, id: UserId) -> Result<Option<UserProfile>, RepositoryError> {
        self.kv.get_json(&keys::profile(id)).await
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no profile.
    pub async fn update(
        &self,
        id: UserId,
        update: ProfileUpdate,
    ) -> Result<UserProfile, RepositoryError> {
        let mut profile = self.get(id).await?.ok_or(RepositoryError::NotFound)?;
        profile.apply(update, Utc::now());
        self.kv.set_json(&keys::profile(id), &profile).await?;
        Ok(profile)
    }
}

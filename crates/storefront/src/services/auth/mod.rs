//! Hosted auth provider client.
//!
//! User credentials live with the provider. The storefront only creates users
//! through the provider's admin API (with the service-role key) and resolves
//! bearer access tokens back to a user id.

mod error;

pub use error::AuthError;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;
use url::Url;
use uuid::Uuid;

use forall_herbals_core::{Email, UserId};

use crate::config::AuthProviderConfig;

/// Minimum password length accepted at signup.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A user as known to the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub email: Email,
}

/// Validated signup input.
#[derive(Debug)]
pub struct Signup {
    pub email: Email,
    pub password: SecretString,
    pub name: String,
}

impl Signup {
    /// Validate raw signup fields before any network call.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` for blank fields,
    /// `AuthError::InvalidEmail` or `AuthError::WeakPassword` otherwise.
    pub fn parse(email: &str, password: &str, name: &str) -> Result<Self, AuthError> {
        if email.trim().is_empty() {
            return Err(AuthError::MissingField("email"));
        }
        if password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingField("name"));
        }

        let email = Email::parse(email)?;
        validate_password(password)?;

        Ok(Self {
            email,
            password: SecretString::from(password.to_owned()),
            name: name.to_owned(),
        })
    }
}

/// Wire shape of a provider user.
#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: Uuid,
    email: String,
}

impl TryFrom<ProviderUser> for AuthUser {
    type Error = AuthError;

    /// Accounts whose email the storefront cannot use are treated as
    /// unauthenticated rather than as a provider failure.
    fn try_from(user: ProviderUser) -> Result<Self, Self::Error> {
        let email = Email::parse(&user.email).map_err(|e| {
            tracing::warn!(user_id = %user.id, error = %e, "Provider account has unusable email");
            AuthError::InvalidToken
        })?;
        Ok(Self {
            id: UserId::new(user.id),
            email,
        })
    }
}

/// Client for the hosted auth provider's REST API.
#[derive(Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    base_url: Url,
    service_role_key: SecretString,
}

impl AuthClient {
    /// Create a new auth client.
    ///
    /// # Errors
    ///
    /// Returns error if the key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &AuthProviderConfig) -> Result<Self, AuthError> {
        let mut headers = HeaderMap::new();

        // Every provider call carries the project key; user calls override
        // Authorization per request.
        let mut api_key = HeaderValue::from_str(config.service_role_key.expose_secret())
            .map_err(|e| AuthError::Provider {
                status: 0,
                message: format!("invalid service key format: {e}"),
            })?;
        api_key.set_sensitive(true);
        headers.insert("apikey", api_key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.clone(),
            service_role_key: config.service_role_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/auth/v1/{path}",
            self.base_url.as_str().trim_end_matches('/')
        )
    }

    /// Create an auto-confirmed user with the name stored in user metadata.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserAlreadyExists` if the email is registered.
    /// Returns `AuthError::Provider` for other provider failures.
    #[instrument(skip(self, signup), fields(email = %signup.email))]
    pub async fn create_user(&self, signup: &Signup) -> Result<AuthUser, AuthError> {
        let body = serde_json::json!({
            "email": signup.email.as_str(),
            "password": signup.password.expose_secret(),
            "email_confirm": true,
            "user_metadata": { "name": signup.name },
        });

        let response = self
            .client
            .post(self.endpoint("admin/users"))
            .header(
                AUTHORIZATION,
                format!("Bearer {}", self.service_role_key.expose_secret()),
            )
            .json(&body)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            if is_duplicate_user(status, &message) {
                return Err(AuthError::UserAlreadyExists);
            }
            return Err(AuthError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let user: ProviderUser = response.json().await?;
        user.try_into()
    }

    /// Resolve a bearer access token to the user it was issued for.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the provider rejects the token.
    #[instrument(skip_all)]
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        if access_token.trim().is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let response = self
            .client
            .get(self.endpoint("user"))
            .bearer_auth(access_token)
            .send()
            .await?;
        let status = response.status();

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(AuthError::InvalidToken);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let user: ProviderUser = response.json().await?;
        user.try_into()
    }
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("base_url", &self.base_url.as_str())
            .field("service_role_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// The provider answers 422 (or 409 on older versions) for duplicate emails.
fn is_duplicate_user(status: StatusCode, body: &str) -> bool {
    if status == StatusCode::CONFLICT {
        return true;
    }
    let body = body.to_ascii_lowercase();
    status == StatusCode::UNPROCESSABLE_ENTITY
        && (body.contains("already") || body.contains("email_exists"))
}

//! Client for the external identity provider.
//!
//! The provider authenticates users on its own pages and then redirects back
//! to the web client with a one-off session ID. Exchanging that ID at the
//! provider's session-data endpoint yields the user's verified profile and a
//! session token that this service trusts from then on.

use std::fmt::Debug;

use async_trait::async_trait;
use serde::Deserialize;

use crate::Error;

/// The provider's session-data endpoint used when none is configured.
pub const DEFAULT_SESSION_DATA_URL: &str =
    "https://demobackend.emergentagent.com/auth/v1/env/oauth/session-data";

/// The header carrying the provider's session ID, both on the log-in request
/// and on the request to the provider.
pub(crate) const SESSION_ID_HEADER: &str = "X-Session-ID";

/// A verified user profile and session token from the identity provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderSession {
    /// The user's email address.
    pub email: String,
    /// The user's display name.
    pub name: String,
    /// URL of the user's profile picture.
    #[serde(default)]
    pub picture: String,
    /// The token clients present to authenticate with this service.
    pub session_token: String,
}

/// Exchanges a session ID from the identity provider for a user profile.
#[async_trait]
pub trait IdentityProvider: Debug + Send + Sync {
    /// Fetch the profile and session token for `session_id`.
    ///
    /// # Errors
    ///
    /// Returns a:
    /// - [Error::IdentityProviderUnavailable] if the provider could not be reached,
    /// - [Error::IdentityProviderRejected] if the provider did not accept `session_id`,
    /// - or [Error::InvalidSessionData] if the provider's response could not be decoded.
    async fn get_session_data(&self, session_id: &str) -> Result<ProviderSession, Error>;
}

/// An [IdentityProvider] that talks to the provider over HTTP.
#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    session_data_url: String,
}

impl HttpIdentityProvider {
    /// Create a provider client for the session-data endpoint at `session_data_url`.
    pub fn new(session_data_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            session_data_url: session_data_url.to_owned(),
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn get_session_data(&self, session_id: &str) -> Result<ProviderSession, Error> {
        let response = self
            .client
            .get(&self.session_data_url)
            .header(SESSION_ID_HEADER, session_id)
            .send()
            .await
            .map_err(|error| Error::IdentityProviderUnavailable(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Identity provider rejected session ID with status {status}");
            return Err(Error::IdentityProviderRejected);
        }

        response
            .json::<ProviderSession>()
            .await
            .map_err(|error| Error::InvalidSessionData(error.to_string()))
    }
}

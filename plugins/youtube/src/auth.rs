//! The authentication collaborator that hands out API clients.

use crate::error::AuthError;
use crate::oauth::OAuthManager;
use crate::youtube_api::{DEFAULT_BASE_URL, YouTubeApi, YouTubeClient};
use oauth2::TokenResponse;
use oauth2::basic::BasicTokenResponse;
use std::future::Future;
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;
use tracing::instrument;

/// Provides an authenticated API client at the start of every refresh cycle.
pub trait Auth: Send + Sync + 'static {
    type Client: YouTubeApi;

    /// Returns a client whose credentials are valid right now.
    ///
    /// Implementations refresh expired credentials here; if that is not possible the error
    /// is reported as an [`AuthError`] and no API call is made.
    fn live_client(&self) -> impl Future<Output = Result<Self::Client, AuthError>> + Send;
}

#[derive(Debug, Clone)]
pub struct TimeBoundAccessToken {
    token: BasicTokenResponse,
    /// When the current access token expires (with safety buffer)
    expires_at: SystemTime,
}

impl TimeBoundAccessToken {
    /// Creates a new YouTube token that is already expired, forcing immediate refresh.
    ///
    /// This is useful when loading tokens from storage where you want to ensure
    /// they are validated before use.
    pub fn expired(token: BasicTokenResponse) -> Self {
        Self {
            expires_at: SystemTime::UNIX_EPOCH,
            token,
        }
    }

    /// Creates a new YouTube token with calculated expiry time.
    ///
    /// The expiry time is calculated from the token's `expires_in` field minus
    /// a 5-minute safety buffer to prevent edge-case failures.
    pub fn new(token: BasicTokenResponse) -> Self {
        Self {
            expires_at: Self::calculate_token_expiry(&token),
            token,
        }
    }

    pub fn raw_token(&self) -> &BasicTokenResponse {
        &self.token
    }

    pub fn is_expired(&self) -> bool {
        SystemTime::now() >= self.expires_at
    }

    /// Refreshes this token using the provided OAuth manager, preserving the refresh token.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Token was successfully refreshed
    /// * `Ok(false)` - Refresh failed (invalid grant, no refresh token, etc.)
    /// * `Err(_)` - Network or other error occurred
    pub async fn refresh(&mut self, oauth_manager: &OAuthManager) -> eyre::Result<bool> {
        tracing::trace!("refreshing token");
        match oauth_manager.refresh_token(&self.token).await? {
            Some(new_token) => {
                let old_token = std::mem::replace(&mut self.token, new_token);

                // Google usually omits the refresh token from refresh responses.
                if self.token.refresh_token().is_none() {
                    tracing::trace!("new token lacks refresh token, preserving original");
                    self.token
                        .set_refresh_token(old_token.refresh_token().cloned());
                } else {
                    tracing::debug!("new token includes refresh token");
                }

                self.expires_at = Self::calculate_token_expiry(&self.token);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Uses the current time + expires_in duration - 5 minute safety buffer.
    /// If no expires_in is provided, assumes a conservative 55-minute lifetime.
    fn calculate_token_expiry(token: &BasicTokenResponse) -> SystemTime {
        let now = SystemTime::now();
        if let Some(expires_in) = token.expires_in() {
            (now + expires_in)
                .checked_sub(Duration::from_secs(300))
                .unwrap_or(now)
        } else {
            now + Duration::from_secs(3300)
        }
    }
}

/// An [`Auth`] backed by a stored OAuth2 token that is refreshed whenever it has expired.
#[derive(Debug)]
pub struct OAuthSession {
    token: Mutex<TimeBoundAccessToken>,
    oauth_manager: OAuthManager,
    http: reqwest::Client,
    base_url: String,
}

impl OAuthSession {
    pub fn new(
        token: TimeBoundAccessToken,
        oauth_manager: OAuthManager,
        http: reqwest::Client,
    ) -> Self {
        Self {
            token: Mutex::new(token),
            oauth_manager,
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Hands out clients that talk to `base_url` instead of the public API.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Returns the current token, e.g. to persist it after it has been refreshed.
    pub async fn token(&self) -> BasicTokenResponse {
        self.token.lock().await.raw_token().clone()
    }
}

impl Auth for OAuthSession {
    type Client = YouTubeClient;

    #[instrument(skip(self))]
    async fn live_client(&self) -> Result<YouTubeClient, AuthError> {
        let mut token = self.token.lock().await;

        if token.is_expired() {
            tracing::debug!("access token expired, attempting refresh");
            if !token.refresh(&self.oauth_manager).await? {
                tracing::error!("access token refresh was rejected");
                return Err(AuthError::Rejected);
            }
            tracing::debug!("access token successfully refreshed");
        }

        let access_token = token.raw_token().access_token().secret().as_str();
        Ok(YouTubeClient::with_base_url(
            access_token,
            self.http.clone(),
            &self.base_url,
        ))
    }
}

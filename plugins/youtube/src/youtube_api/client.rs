//! Core YouTube API client functionality.

use crate::error::ApiError;
use crate::youtube_api::{
    channels::ChannelListResponse, playlist_items::PlaylistItemListResponse,
};
use http::Method;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use tracing::instrument;

/// Where the YouTube Data API v3 lives.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// The largest page size (and the largest number of ids per request) the list endpoints accept.
pub const MAX_RESULTS_PER_PAGE: usize = 50;

/// The subset of the YouTube Data API that a refresh cycle needs.
///
/// [`YouTubeClient`] is the real implementation. The refresh logic only talks to this trait so
/// that it can be exercised against canned responses.
pub trait YouTubeApi: Clone + Send + Sync + 'static {
    /// Calls `channels.list` for the given channel ids with the `snippet` and `statistics` parts.
    ///
    /// At most [`MAX_RESULTS_PER_PAGE`] ids may be passed at once.
    fn list_channels(
        &self,
        ids: &[String],
    ) -> impl Future<Output = Result<ChannelListResponse, ApiError>> + Send;

    /// Calls `playlistItems.list` for the given playlist with the `snippet` and `contentDetails`
    /// parts, returning at most `max_results` items.
    fn list_playlist_items(
        &self,
        playlist_id: &str,
        max_results: u32,
    ) -> impl Future<Output = Result<PlaylistItemListResponse, ApiError>> + Send;
}

/// Client for interacting with the YouTube Data API v3.
///
/// The client carries a bearer access token that is assumed to be valid for as long as the client
/// is in use. Obtaining (and refreshing) that token is the job of an [`crate::auth::Auth`]
/// implementation, which hands out a fresh client for every refresh cycle.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    access_token: Arc<str>,
    base_url: Arc<str>,
    /// HTTP client for API requests
    client: reqwest::Client,
}

impl YouTubeClient {
    /// Creates a client that talks to the public YouTube Data API.
    pub fn new(access_token: impl Into<Arc<str>>, client: reqwest::Client) -> Self {
        Self::with_base_url(access_token, client, DEFAULT_BASE_URL)
    }

    /// Creates a client that talks to an API at `base_url` instead of the public endpoint.
    ///
    /// A trailing `/` on `base_url` is ignored.
    pub fn with_base_url(
        access_token: impl Into<Arc<str>>,
        client: reqwest::Client,
        base_url: &str,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: base_url.trim_end_matches('/').into(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Makes an authenticated `GET` request to the given API resource and parses the JSON body.
    #[instrument(skip(self), level = "trace")]
    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        query_params: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = format!("{}/{}", self.base_url, resource);
        let method = Method::GET;

        let response = self
            .client
            .request(method.clone(), &url)
            .bearer_auth(&self.access_token)
            .query(query_params)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                method: method.clone(),
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ApiError::Status {
                method,
                url,
                status,
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|source| ApiError::Decode { url, source })
    }
}

impl YouTubeApi for YouTubeClient {
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/channels/list>
    #[instrument(skip(self), fields(channels = ids.len()))]
    async fn list_channels(&self, ids: &[String]) -> Result<ChannelListResponse, ApiError> {
        let ids = ids.join(",");
        let max_results = MAX_RESULTS_PER_PAGE.to_string();
        let query_params = [
            ("part", "snippet,statistics"),
            ("id", ids.as_str()),
            ("maxResults", max_results.as_str()),
        ];

        let channels: ChannelListResponse = self.get_json("channels", &query_params).await?;

        tracing::debug!(
            total_results = channels.page_info.total_results,
            returned_items = channels.items.len(),
            "fetched channels"
        );

        Ok(channels)
    }

    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/playlistItems/list>
    #[instrument(skip(self))]
    async fn list_playlist_items(
        &self,
        playlist_id: &str,
        max_results: u32,
    ) -> Result<PlaylistItemListResponse, ApiError> {
        let max_results = max_results.to_string();
        let query_params = [
            ("part", "snippet,contentDetails"),
            ("playlistId", playlist_id),
            ("maxResults", max_results.as_str()),
        ];

        let items: PlaylistItemListResponse =
            self.get_json("playlistItems", &query_params).await?;

        tracing::debug!(
            playlist_id,
            total_results = items.page_info.total_results,
            returned_items = items.items.len(),
            "fetched playlist items"
        );

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_ignored() {
        let yt = YouTubeClient::with_base_url(
            "token",
            reqwest::Client::new(),
            "http://127.0.0.1:8080/youtube/v3/",
        );
        assert_eq!(yt.base_url(), "http://127.0.0.1:8080/youtube/v3");

        let yt = YouTubeClient::new("token", reqwest::Client::new());
        assert_eq!(yt.base_url(), DEFAULT_BASE_URL);
    }
}

//! Fetching and shaping the per-channel attributes.

use crate::auth::Auth;
use crate::coordinator::Update;
use crate::error::RefreshError;
use crate::youtube_api::{Channel, MAX_RESULTS_PER_PAGE, PlaylistItem, YouTubeApi};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tokio::task::JoinSet;

/// The result of one refresh cycle, keyed by channel id.
pub type ChannelMap = HashMap<String, ChannelData>;

/// Everything a host displays for one configured channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelData {
    pub id: String,
    pub title: String,
    /// URL of the channel's `high` thumbnail.
    pub icon: String,
    pub latest_video: LatestVideo,
    pub subscriber_count: u64,
}

/// The newest entry of a channel's uploads playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestVideo {
    /// Upload time exactly as YouTube reported it.
    pub published_at: String,
    pub title: String,
    pub description: String,
    /// URL of the video's `standard` thumbnail.
    pub thumbnail: String,
    pub video_id: String,
}

/// Returns the id of the playlist that holds all uploads of `channel_id`.
///
/// Channel ids look like `UCxxxxxxxxxxxx` and the matching uploads playlist is
/// `UUxxxxxxxxxxxx`, so no request is needed to look it up. Only the first `UC` is replaced;
/// ids without one are returned unchanged.
pub fn upload_playlist_id(channel_id: &str) -> String {
    channel_id.replacen("UC", "UU", 1)
}

/// Fetches the most recent upload of `channel_id`.
///
/// A channel without any uploads is an error.
pub async fn fetch_latest_video<C: YouTubeApi>(
    client: &C,
    channel_id: &str,
) -> Result<LatestVideo, RefreshError> {
    let playlist_id = upload_playlist_id(channel_id);
    let response = client
        .list_playlist_items(&playlist_id, 1)
        .await
        .map_err(|source| RefreshError::LatestVideo {
            channel_id: channel_id.to_string(),
            source,
        })?;

    let Some(video) = response.items.into_iter().next() else {
        return Err(RefreshError::NoUploads {
            channel_id: channel_id.to_string(),
        });
    };

    LatestVideo::from_playlist_item(channel_id, video)
}

impl LatestVideo {
    fn from_playlist_item(channel_id: &str, item: PlaylistItem) -> Result<Self, RefreshError> {
        let PlaylistItem {
            snippet,
            content_details,
            ..
        } = item;
        let Some(thumbnail) = snippet.thumbnails.standard else {
            return Err(RefreshError::malformed(
                channel_id,
                "latest upload has no standard thumbnail",
            ));
        };

        Ok(Self {
            published_at: snippet.published_at,
            title: snippet.title,
            description: snippet.description,
            thumbnail: thumbnail.url,
            video_id: content_details.video_id,
        })
    }
}

impl ChannelData {
    fn new(channel: Channel, latest_video: LatestVideo) -> Result<Self, RefreshError> {
        let Channel {
            id,
            snippet,
            statistics,
        } = channel;

        let Some(icon) = snippet.thumbnails.high else {
            return Err(RefreshError::malformed(&id, "channel has no high thumbnail"));
        };
        let Some(subscriber_count) = statistics.subscriber_count else {
            return Err(RefreshError::malformed(&id, "subscriber count is missing"));
        };
        let subscriber_count = subscriber_count.parse().map_err(|e| {
            RefreshError::malformed(&id, format!("subscriber count {subscriber_count:?}: {e}"))
        })?;

        Ok(Self {
            id,
            title: snippet.title,
            icon: icon.url,
            latest_video,
            subscriber_count,
        })
    }
}

/// Fetches the latest upload of `channel` and merges the two into one record.
async fn compile_channel<C: YouTubeApi>(
    client: C,
    channel: Channel,
) -> Result<ChannelData, RefreshError> {
    let latest_video = fetch_latest_video(&client, &channel.id).await?;
    ChannelData::new(channel, latest_video)
}

/// Refreshes a fixed set of channels.
#[derive(Debug)]
pub struct ChannelUpdater<A> {
    auth: A,
    channel_ids: Vec<String>,
    max_concurrent_requests: usize,
}

impl<A: Auth> ChannelUpdater<A> {
    /// Creates an updater for `channel_ids`.
    ///
    /// Duplicate ids are dropped. At most `max_concurrent_requests` per-channel fetches run at
    /// the same time (a value of 0 is treated as 1).
    pub fn new(auth: A, channel_ids: Vec<String>, max_concurrent_requests: usize) -> Self {
        let mut seen = HashSet::new();
        let channel_ids = channel_ids
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();
        Self {
            auth,
            channel_ids,
            max_concurrent_requests: max_concurrent_requests.max(1),
        }
    }

    pub fn channel_ids(&self) -> &[String] {
        &self.channel_ids
    }

    pub fn auth(&self) -> &A {
        &self.auth
    }

    /// Runs one refresh cycle.
    ///
    /// Fails as a whole if any channel fails; remaining channel fetches are aborted as soon as
    /// the first failure is seen.
    pub async fn refresh(&self) -> Result<ChannelMap, RefreshError> {
        let client = self.auth.live_client().await?;

        if self.channel_ids.is_empty() {
            tracing::debug!("no channels configured");
            return Ok(ChannelMap::new());
        }

        let mut channels = Vec::with_capacity(self.channel_ids.len());
        for batch in self.channel_ids.chunks(MAX_RESULTS_PER_PAGE) {
            let response = client
                .list_channels(batch)
                .await
                .map_err(RefreshError::ListChannels)?;
            channels.extend(response.items);
        }

        let mut data = ChannelMap::with_capacity(channels.len());
        let mut tasks = JoinSet::new();
        for channel in channels {
            if !self.channel_ids.contains(&channel.id) {
                tracing::warn!(channel = %channel.id, "ignoring channel that was not requested");
                continue;
            }

            while tasks.len() >= self.max_concurrent_requests {
                if let Some(done) = tasks.join_next().await {
                    let done: ChannelData = done??;
                    data.insert(done.id.clone(), done);
                }
            }

            tracing::trace!(channel = %channel.id, "fetching latest upload");
            tasks.spawn(compile_channel(client.clone(), channel));
        }

        while let Some(done) = tasks.join_next().await {
            let done = done??;
            data.insert(done.id.clone(), done);
        }

        let missing = self
            .channel_ids
            .iter()
            .filter(|id| !data.contains_key(*id))
            .count();
        if missing > 0 {
            tracing::debug!(missing, "some configured channels were not returned by YouTube");
        }

        Ok(data)
    }
}

impl<A: Auth> Update for ChannelUpdater<A> {
    type Data = ChannelMap;

    async fn update(&self) -> Result<ChannelMap, RefreshError> {
        self.refresh().await
    }
}

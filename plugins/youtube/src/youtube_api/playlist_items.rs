//! YouTube PlaylistItems API types.
//!
//! Every channel has an "uploads" playlist that holds all of its public videos, newest first.
//! Reading the first item of that playlist is the cheapest way to find a channel's latest upload.

use crate::youtube_api::types::{PageInfo, Thumbnails};
use serde::{Deserialize, Serialize};

/// Response structure for the `playlistItems.list` API call.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems/list>
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaylistItemListResponse {
    /// Identifies the API resource's type.
    ///
    /// The value will be `youtube#playlistItemListResponse`.
    pub kind: String,
    /// A list of playlist items that match the request criteria.
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: PageInfo,
    /// Token that can be used as the value of the pageToken parameter to retrieve the next page in the result set.
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// A `playlistItem` resource identifies a video that is included in a playlist.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems#resource>
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaylistItem {
    /// The ID that YouTube uses to uniquely identify the playlist item.
    pub id: String,
    pub snippet: PlaylistItemSnippet,
    #[serde(rename = "contentDetails")]
    pub content_details: PlaylistItemContentDetails,
}

/// Basic details about the playlist item, such as its title and position in the playlist.
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaylistItemSnippet {
    /// The date and time that the item was added to the playlist.
    ///
    /// For an uploads playlist this is the upload time of the video. Kept as the RFC 3339 string
    /// YouTube sent.
    #[serde(rename = "publishedAt")]
    pub published_at: String,
    /// The item's title.
    pub title: String,
    /// The item's description.
    #[serde(default)]
    pub description: String,
    /// Thumbnail images associated with the playlist item.
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

/// Identifies the video behind the playlist item.
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaylistItemContentDetails {
    /// The ID that YouTube uses to uniquely identify a video.
    #[serde(rename = "videoId")]
    pub video_id: String,
    /// The date and time that the video was published to YouTube.
    #[serde(rename = "videoPublishedAt")]
    pub video_published_at: Option<String>,
}

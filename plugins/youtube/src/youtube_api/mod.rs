//! YouTube Data API v3 client library.
//!
//! Only the two read-only list endpoints that a channel refresh needs are covered:
//!
//! - [`channels.list`](https://developers.google.com/youtube/v3/docs/channels/list) for the
//!   title, icon and subscriber count of a batch of channels, and
//! - [`playlistItems.list`](https://developers.google.com/youtube/v3/docs/playlistItems/list)
//!   for the newest entry of a channel's uploads playlist.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use youtube_channels::youtube_api::{YouTubeApi, YouTubeClient};
//!
//! # async fn example() -> eyre::Result<()> {
//! let client = YouTubeClient::new("ya29.access-token", reqwest::Client::new());
//! let channels = client
//!     .list_channels(&["UC_x5XG1OV2P6uZZ5FSM9Ttw".to_string()])
//!     .await?;
//! for channel in channels.items {
//!     println!("{} ({})", channel.snippet.title, channel.id);
//! }
//! # Ok(())
//! # }
//! ```

pub mod channels;
pub mod client;
pub mod playlist_items;
pub mod types;

pub use client::{DEFAULT_BASE_URL, MAX_RESULTS_PER_PAGE, YouTubeApi, YouTubeClient};
pub use types::{PageInfo, Thumbnail, Thumbnails};

pub use channels::{Channel, ChannelListResponse, ChannelSnippet, ChannelStatistics};
pub use playlist_items::{
    PlaylistItem, PlaylistItemContentDetails, PlaylistItemListResponse, PlaylistItemSnippet,
};

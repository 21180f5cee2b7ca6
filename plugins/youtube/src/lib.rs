//! Keeps title, icon, subscriber count and latest upload of a handful of YouTube channels
//! fresh for a home-automation host.
//!
//! The pieces, leaves first:
//!
//! - [`auth::Auth`] hands out an authenticated [`youtube_api::YouTubeApi`] client per cycle;
//!   [`auth::OAuthSession`] does so from a stored OAuth2 token.
//! - [`update::ChannelUpdater`] lists the configured channels, fetches each channel's latest
//!   upload concurrently and assembles a [`update::ChannelMap`].
//! - [`coordinator::UpdateCoordinator`] runs the updater every 15 minutes (or on demand), never
//!   twice at once, and keeps the last successful result for the host to read.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use youtube_channels::auth::{OAuthSession, TimeBoundAccessToken};
//! use youtube_channels::coordinator::UpdateCoordinator;
//! use youtube_channels::oauth::OAuthManager;
//! use youtube_channels::update::ChannelUpdater;
//!
//! # async fn example(token: oauth2::basic::BasicTokenResponse) -> eyre::Result<()> {
//! let config = youtube_channels::Config::load("youtube.json")?;
//! let auth = OAuthSession::new(
//!     TimeBoundAccessToken::expired(token),
//!     OAuthManager::new("client-id", "client-secret"),
//!     config.http_client()?,
//! )
//! .with_base_url(config.api_base_url.clone());
//! let updater = ChannelUpdater::new(auth, config.channels.clone(), config.max_concurrent_requests);
//! let coordinator = Arc::new(UpdateCoordinator::new("youtube", updater, config.update_interval()));
//! let _ticker = coordinator.spawn_periodic();
//!
//! if let Some(data) = coordinator.data() {
//!     for channel in data.values() {
//!         println!("{}: {} subscribers", channel.title, channel.subscriber_count);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod oauth;
pub mod update;
pub mod youtube_api;

pub use config::Config;
pub use coordinator::UpdateCoordinator;
pub use error::{ApiError, AuthError, ErrorKind, RefreshError};
pub use update::{ChannelData, ChannelMap, ChannelUpdater, LatestVideo};

/// A coordinator for channels authorized through a stored OAuth2 token.
pub type YouTubeCoordinator = UpdateCoordinator<ChannelUpdater<auth::OAuthSession>>;

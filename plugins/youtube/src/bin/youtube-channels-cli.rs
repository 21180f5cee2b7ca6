use eyre::Context;
use oauth2::basic::BasicTokenResponse;
use std::io::IsTerminal;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use youtube_channels::auth::{OAuthSession, TimeBoundAccessToken};
use youtube_channels::coordinator::DisplayChain;
use youtube_channels::oauth::OAuthManager;
use youtube_channels::{ChannelUpdater, Config, UpdateCoordinator, YouTubeCoordinator};

const TOKENS_FILE: &str = "tokens.json";

const USAGE: &str = "usage: youtube-channels-cli <config.json> [--watch]";

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();

    let mut config_path = None;
    let mut watch = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--watch" => watch = true,
            "-h" | "--help" => {
                eprintln!("{USAGE}");
                return Ok(());
            }
            _ if config_path.is_none() => config_path = Some(arg),
            _ => eyre::bail!("unexpected argument {arg:?}\n{USAGE}"),
        }
    }
    let Some(config_path) = config_path else {
        eyre::bail!("{USAGE}");
    };
    let config = Config::load(&config_path)?;

    let client_id = std::env::var("YOUTUBE_CLIENT_ID").context("read YOUTUBE_CLIENT_ID")?;
    let client_secret =
        std::env::var("YOUTUBE_CLIENT_SECRET").context("read YOUTUBE_CLIENT_SECRET")?;

    // Tokens are only ever refreshed here; authorizing from scratch happens elsewhere.
    let tokens = tokio::fs::read_to_string(TOKENS_FILE)
        .await
        .with_context(|| format!("read stored YouTube token from {TOKENS_FILE}"))?;
    let token: BasicTokenResponse =
        serde_json::from_str(&tokens).context("parse stored YouTube token")?;

    let auth = OAuthSession::new(
        TimeBoundAccessToken::expired(token),
        OAuthManager::new(client_id, client_secret),
        config.http_client()?,
    )
    .with_base_url(config.api_base_url.clone());
    let updater = ChannelUpdater::new(
        auth,
        config.channels.clone(),
        config.max_concurrent_requests,
    );
    let coordinator: Arc<YouTubeCoordinator> = Arc::new(UpdateCoordinator::new(
        "youtube",
        updater,
        config.update_interval(),
    ));

    let result = if watch {
        run_periodic(&coordinator).await
    } else {
        run_once(&coordinator).await
    };

    // Persist whatever token we ended up with, refreshed or not.
    let token = coordinator.updater().auth().token().await;
    let json = serde_json::to_string(&token).context("serialize YouTube token")?;
    tokio::fs::write(TOKENS_FILE, &json)
        .await
        .with_context(|| format!("write refreshed YouTube token to {TOKENS_FILE}"))?;

    result
}

async fn run_once(coordinator: &YouTubeCoordinator) -> eyre::Result<()> {
    match coordinator.refresh().await {
        Ok(data) => {
            let json = serde_json::to_string_pretty(&*data).context("serialize channel data")?;
            println!("{json}");
            Ok(())
        }
        Err(e) => eyre::bail!("refresh failed ({:?}): {}", e.kind(), DisplayChain(&*e)),
    }
}

async fn run_periodic(coordinator: &Arc<YouTubeCoordinator>) -> eyre::Result<()> {
    tracing::info!(
        channels = coordinator.updater().channel_ids().len(),
        interval = ?coordinator.update_interval(),
        "refreshing periodically, press Ctrl-C to stop"
    );
    let mut updates = coordinator.subscribe();
    let ticker = coordinator.spawn_periodic();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let Some(data) = updates.borrow_and_update().clone() else {
                    continue;
                };
                for channel in data.values() {
                    tracing::info!(
                        channel = %channel.id,
                        title = %channel.title,
                        subscribers = channel.subscriber_count,
                        latest_video = %channel.latest_video.title,
                        published_at = %channel.latest_video.published_at,
                        "channel"
                    );
                }
            }
            ctrl_c = tokio::signal::ctrl_c() => {
                ctrl_c.context("listen for Ctrl-C")?;
                break;
            }
        }
    }

    ticker.abort();
    Ok(())
}

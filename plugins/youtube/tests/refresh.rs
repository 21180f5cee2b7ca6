//! Drives a full refresh through the real HTTP client against a local fake of the YouTube API.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use serde_json::json;
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use youtube_channels::auth::Auth;
use youtube_channels::youtube_api::YouTubeClient;
use youtube_channels::{AuthError, ChannelUpdater, ErrorKind, RefreshError, UpdateCoordinator};

const TOKEN: &str = "ya29.integration";

#[derive(Debug, Default)]
struct FakeYouTube {
    requests: AtomicUsize,
}

impl FakeYouTube {
    fn respond(&self, req: &Request<Incoming>) -> (StatusCode, serde_json::Value) {
        self.requests.fetch_add(1, Ordering::SeqCst);

        let authorized = req
            .headers()
            .get(hyper::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            == Some(format!("Bearer {TOKEN}").as_str());
        if !authorized {
            return (
                StatusCode::UNAUTHORIZED,
                json!({ "error": { "code": 401, "message": "Invalid Credentials" } }),
            );
        }

        let query: HashMap<String, String> =
            form_urlencoded::parse(req.uri().query().unwrap_or("").as_bytes())
                .into_owned()
                .collect();

        match req.uri().path() {
            "/youtube/v3/channels" => {
                assert_eq!(query["part"], "snippet,statistics");
                assert_eq!(query["maxResults"], "50");
                let items: Vec<_> = query["id"]
                    .split(',')
                    .filter(|id| id.starts_with("UC"))
                    .map(channel)
                    .collect();
                (
                    StatusCode::OK,
                    json!({
                        "kind": "youtube#channelListResponse",
                        "etag": "etag",
                        "pageInfo": { "totalResults": items.len(), "resultsPerPage": items.len() },
                        "items": items,
                    }),
                )
            }
            "/youtube/v3/playlistItems" => {
                assert_eq!(query["part"], "snippet,contentDetails");
                assert_eq!(query["maxResults"], "1");
                let playlist = query["playlistId"].as_str();
                let items = match playlist {
                    "UUempty" => vec![],
                    _ => vec![upload(playlist)],
                };
                (
                    StatusCode::OK,
                    json!({
                        "kind": "youtube#playlistItemListResponse",
                        "etag": "etag",
                        "pageInfo": { "totalResults": items.len(), "resultsPerPage": 1 },
                        "items": items,
                    }),
                )
            }
            path => (
                StatusCode::NOT_FOUND,
                json!({ "error": { "code": 404, "message": format!("no such resource {path}") } }),
            ),
        }
    }
}

fn channel(id: &str) -> serde_json::Value {
    json!({
        "kind": "youtube#channel",
        "etag": "etag",
        "id": id,
        "snippet": {
            "title": format!("Channel {id}"),
            "description": "",
            "customUrl": "@channel",
            "publishedAt": "2010-06-01T00:00:00Z",
            "thumbnails": {
                "default": { "url": format!("https://yt3.ggpht.com/{id}-88"), "width": 88, "height": 88 },
                "medium": { "url": format!("https://yt3.ggpht.com/{id}-240"), "width": 240, "height": 240 },
                "high": { "url": format!("https://yt3.ggpht.com/{id}-800"), "width": 800, "height": 800 }
            },
            "localized": { "title": format!("Channel {id}"), "description": "" },
            "country": "NL"
        },
        "statistics": {
            "viewCount": "123456",
            "subscriberCount": "2290000",
            "hiddenSubscriberCount": false,
            "videoCount": "42"
        }
    })
}

fn upload(playlist: &str) -> serde_json::Value {
    let video_id = format!("v-{playlist}");
    json!({
        "kind": "youtube#playlistItem",
        "etag": "etag",
        "id": format!("item-{playlist}"),
        "snippet": {
            "publishedAt": "2023-05-11T00:20:46Z",
            "channelId": playlist.replacen("UU", "UC", 1),
            "title": "What's new in Google Home",
            "description": "Check out the latest features",
            "thumbnails": {
                "default": { "url": format!("https://i.ytimg.com/vi/{video_id}/default.jpg"), "width": 120, "height": 90 },
                "standard": { "url": format!("https://i.ytimg.com/vi/{video_id}/sddefault.jpg"), "width": 640, "height": 480 }
            },
            "channelTitle": "Channel",
            "playlistId": playlist,
            "position": 0,
            "resourceId": { "kind": "youtube#video", "videoId": video_id },
            "videoOwnerChannelTitle": "Channel",
            "videoOwnerChannelId": playlist.replacen("UU", "UC", 1)
        },
        "contentDetails": {
            "videoId": video_id,
            "videoPublishedAt": "2023-05-11T00:20:46Z"
        }
    })
}

async fn serve(fake: Arc<FakeYouTube>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((conn, _)) = listener.accept().await else {
                break;
            };
            let fake = Arc::clone(&fake);
            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let (status, body) = fake.respond(&req);
                    async move {
                        Ok::<_, Infallible>(
                            Response::builder()
                                .status(status)
                                .header(hyper::header::CONTENT_TYPE, "application/json")
                                .body(Full::new(Bytes::from(body.to_string())))
                                .unwrap(),
                        )
                    }
                });
                let _ = hyper::server::conn::http1::Builder::new()
                    .serve_connection(hyper_util::rt::TokioIo::new(conn), service)
                    .await;
            });
        }
    });
    addr
}

/// Hands out clients for the local server with a fixed token.
struct StaticToken {
    base_url: String,
    token: &'static str,
}

impl Auth for StaticToken {
    type Client = YouTubeClient;

    async fn live_client(&self) -> Result<YouTubeClient, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| AuthError::Refresh(e.into()))?;
        Ok(YouTubeClient::with_base_url(self.token, http, &self.base_url))
    }
}

async fn updater(
    token: &'static str,
    channels: &[&str],
) -> (Arc<FakeYouTube>, ChannelUpdater<StaticToken>) {
    let fake = Arc::new(FakeYouTube::default());
    let addr = serve(Arc::clone(&fake)).await;
    let auth = StaticToken {
        base_url: format!("http://{addr}/youtube/v3"),
        token,
    };
    let channels = channels.iter().map(|c| c.to_string()).collect();
    (fake, ChannelUpdater::new(auth, channels, 2))
}

#[tokio::test]
async fn refresh_against_http_api() {
    let (fake, updater) = updater(TOKEN, &["UCone", "UCtwo", "UCthree"]).await;
    let coordinator = UpdateCoordinator::new("youtube", updater, Duration::from_secs(900));

    let data = coordinator.refresh().await.unwrap();
    assert_eq!(data.len(), 3);
    // one channels.list plus one playlistItems.list per channel
    assert_eq!(fake.requests.load(Ordering::SeqCst), 4);

    let one = &data["UCone"];
    assert_eq!(one.id, "UCone");
    assert_eq!(one.title, "Channel UCone");
    assert_eq!(one.icon, "https://yt3.ggpht.com/UCone-800");
    assert_eq!(one.subscriber_count, 2_290_000);
    assert_eq!(one.latest_video.video_id, "v-UUone");
    assert_eq!(one.latest_video.title, "What's new in Google Home");
    assert_eq!(one.latest_video.description, "Check out the latest features");
    assert_eq!(
        one.latest_video.thumbnail,
        "https://i.ytimg.com/vi/v-UUone/sddefault.jpg"
    );
    assert_eq!(one.latest_video.published_at, "2023-05-11T00:20:46Z");

    assert!(coordinator.last_update_success());
    assert!(Arc::ptr_eq(&coordinator.data().unwrap(), &data));
}

#[tokio::test]
async fn empty_uploads_playlist_fails_the_refresh() {
    let (_fake, updater) = updater(TOKEN, &["UCone", "UCempty"]).await;

    let err = updater.refresh().await.unwrap_err();
    assert!(
        matches!(&err, RefreshError::NoUploads { channel_id } if channel_id == "UCempty"),
        "{err:?}"
    );
    assert_eq!(err.kind(), ErrorKind::Data);
}

#[tokio::test]
async fn rejected_token_is_an_auth_error() {
    let (fake, updater) = updater("ya29.revoked", &["UCone"]).await;

    let err = updater.refresh().await.unwrap_err();
    assert!(matches!(err, RefreshError::ListChannels(_)), "{err:?}");
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert_eq!(fake.requests.load(Ordering::SeqCst), 1);
}

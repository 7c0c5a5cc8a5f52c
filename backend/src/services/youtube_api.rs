use crate::error::UpstreamError;
use crate::models::{ChannelDetails, RawSearchResult, VideoRecord};
use crate::utils::{parse_count, parse_iso8601_duration_to_seconds, parse_iso8601_timestamp};
use log::{debug, info, warn};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Max ids per `videos.list` / `channels.list` call, and max page size.
const BATCH_SIZE: usize = 50;

/// Pause between consecutive paged calls.
const PAGE_DELAY: Duration = Duration::from_millis(100);

const QUOTA_REASONS: &[&str] = &[
    "quotaExceeded",
    "dailyLimitExceeded",
    "rateLimitExceeded",
    "userRateLimitExceeded",
];

/// The video platform as seen by the search pipeline.
#[rocket::async_trait]
pub trait VideoPlatform: Send + Sync {
    /// Keyword search over videos, in relevance order, at most `max_results` hits.
    async fn search(
        &self,
        keyword: &str,
        max_results: usize,
    ) -> Result<Vec<RawSearchResult>, UpstreamError>;

    /// Channel metadata and statistics. Unknown ids are absent from the result.
    async fn channel_details(
        &self,
        channel_ids: &[String],
    ) -> Result<Vec<ChannelDetails>, UpstreamError>;

    /// The channel's most recent uploads, newest first.
    async fn list_videos_for_channel(
        &self,
        channel_id: &str,
        limit: usize,
    ) -> Result<Vec<VideoRecord>, UpstreamError>;
}

/// YouTube Data API v3 client.
///
/// Documentation: https://developers.google.com/youtube/v3/docs
pub struct YouTubeClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, UpstreamError> {
        if api_key.is_empty() {
            return Err(UpstreamError::MissingApiKey);
        }

        Ok(YouTubeClient {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value, UpstreamError> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, endpoint))?;
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
            .append_pair("key", &self.api_key);

        debug!("GET {endpoint} {params:?}");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
            return Err(upstream_error_from_body(status.as_u16(), &body));
        }

        serde_json::from_str(&text)
            .map_err(|e| UpstreamError::InvalidResponse(format!("{endpoint}: {e}")))
    }

    /// Full records for the given video ids, preserving input order.
    async fn video_records(&self, video_ids: &[String]) -> Result<Vec<(VideoRecord, String)>, UpstreamError> {
        let mut records = Vec::with_capacity(video_ids.len());

        for (i, batch) in video_ids.chunks(BATCH_SIZE).enumerate() {
            if i > 0 {
                tokio::time::sleep(PAGE_DELAY).await;
            }
            let body = self
                .get_json(
                    "videos",
                    &[
                        ("part", "snippet,statistics,contentDetails".to_string()),
                        ("id", batch.join(",")),
                        ("maxResults", BATCH_SIZE.to_string()),
                    ],
                )
                .await?;
            records.extend(items(&body).iter().filter_map(normalize_video_item));
        }

        let position = |id: &str| video_ids.iter().position(|v| v == id);
        records.sort_by_key(|(video, _)| position(&video.id));
        Ok(records)
    }
}

#[rocket::async_trait]
impl VideoPlatform for YouTubeClient {
    async fn search(
        &self,
        keyword: &str,
        max_results: usize,
    ) -> Result<Vec<RawSearchResult>, UpstreamError> {
        let mut video_ids: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        let mut page_token: Option<String> = None;

        while video_ids.len() < max_results {
            let mut params = vec![
                ("part", "snippet".to_string()),
                ("type", "video".to_string()),
                ("order", "relevance".to_string()),
                ("q", keyword.to_string()),
                (
                    "maxResults",
                    BATCH_SIZE.min(max_results - video_ids.len()).to_string(),
                ),
            ];
            if let Some(token) = &page_token {
                params.push(("pageToken", token.clone()));
            }

            let body = self.get_json("search", &params).await?;
            for id in items(&body).iter().filter_map(search_item_video_id) {
                if video_ids.len() < max_results && seen.insert(id.clone()) {
                    video_ids.push(id);
                }
            }

            page_token = body["nextPageToken"].as_str().map(String::from);
            if page_token.is_none() {
                break;
            }
            tokio::time::sleep(PAGE_DELAY).await;
        }

        info!("Found {} videos for keyword '{}'", video_ids.len(), keyword);

        let results = self
            .video_records(&video_ids)
            .await?
            .into_iter()
            .map(|(video, channel_title)| RawSearchResult {
                video,
                channel_title,
            })
            .collect();
        Ok(results)
    }

    async fn channel_details(
        &self,
        channel_ids: &[String],
    ) -> Result<Vec<ChannelDetails>, UpstreamError> {
        let mut details = Vec::with_capacity(channel_ids.len());

        for (i, batch) in channel_ids.chunks(BATCH_SIZE).enumerate() {
            if i > 0 {
                tokio::time::sleep(PAGE_DELAY).await;
            }
            let body = self
                .get_json(
                    "channels",
                    &[
                        ("part", "snippet,statistics".to_string()),
                        ("id", batch.join(",")),
                        ("maxResults", BATCH_SIZE.to_string()),
                    ],
                )
                .await?;
            details.extend(items(&body).iter().filter_map(normalize_channel_item));
        }

        Ok(details)
    }

    async fn list_videos_for_channel(
        &self,
        channel_id: &str,
        limit: usize,
    ) -> Result<Vec<VideoRecord>, UpstreamError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let Some(uploads_playlist_id) = uploads_playlist_id(channel_id) else {
            warn!("Channel {channel_id} has no uploads playlist");
            return Ok(Vec::new());
        };

        let body = self
            .get_json(
                "playlistItems",
                &[
                    ("part", "contentDetails".to_string()),
                    ("playlistId", uploads_playlist_id),
                    ("maxResults", limit.min(BATCH_SIZE).to_string()),
                ],
            )
            .await?;
        let video_ids: Vec<String> = items(&body)
            .iter()
            .filter_map(|item| item["contentDetails"]["videoId"].as_str())
            .map(String::from)
            .collect();

        let mut videos: Vec<VideoRecord> = self
            .video_records(&video_ids)
            .await?
            .into_iter()
            .map(|(video, _)| video)
            .collect();
        videos.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        videos.truncate(limit);

        debug!("Fetched {} recent videos for channel {channel_id}", videos.len());
        Ok(videos)
    }
}

/// A channel's uploads playlist shares its id, with `UC` swapped for `UU`.
pub(crate) fn uploads_playlist_id(channel_id: &str) -> Option<String> {
    channel_id
        .strip_prefix("UC")
        .filter(|rest| !rest.is_empty())
        .map(|rest| format!("UU{rest}"))
}

fn items(body: &Value) -> &[Value] {
    body["items"].as_array().map(Vec::as_slice).unwrap_or(&[])
}

pub(crate) fn search_item_video_id(item: &Value) -> Option<String> {
    item["id"]["videoId"].as_str().map(String::from)
}

/// Normalize a `videos.list` item into a record plus its channel title.
/// Items without an id, channel or valid publish date are dropped.
pub(crate) fn normalize_video_item(item: &Value) -> Option<(VideoRecord, String)> {
    let id = item["id"].as_str()?.to_string();
    let snippet = &item["snippet"];
    let statistics = &item["statistics"];

    let channel_id = snippet["channelId"].as_str().filter(|s| !s.is_empty())?;
    let Some(published_at) = snippet["publishedAt"].as_str().and_then(parse_iso8601_timestamp)
    else {
        warn!("Dropping video {id}: missing or invalid publishedAt");
        return None;
    };

    let video = VideoRecord {
        id,
        channel_id: channel_id.to_string(),
        title: snippet["title"].as_str().unwrap_or("").to_string(),
        published_at,
        view_count: parse_count(&statistics["viewCount"]).unwrap_or(0),
        like_count: parse_count(&statistics["likeCount"]).unwrap_or(0),
        comment_count: parse_count(&statistics["commentCount"]).unwrap_or(0),
        duration_seconds: item["contentDetails"]["duration"]
            .as_str()
            .map(parse_iso8601_duration_to_seconds)
            .unwrap_or(0),
    };
    let channel_title = snippet["channelTitle"].as_str().unwrap_or("").to_string();

    Some((video, channel_title))
}

pub(crate) fn normalize_channel_item(item: &Value) -> Option<ChannelDetails> {
    let id = item["id"].as_str()?.to_string();
    let snippet = &item["snippet"];
    let statistics = &item["statistics"];

    let hidden = statistics["hiddenSubscriberCount"].as_bool().unwrap_or(false);
    let subscriber_count = if hidden {
        None
    } else {
        parse_count(&statistics["subscriberCount"])
    };

    Some(ChannelDetails {
        id,
        title: snippet["title"].as_str().unwrap_or("").to_string(),
        description: snippet["description"].as_str().unwrap_or("").to_string(),
        country: snippet["country"].as_str().unwrap_or("").to_string(),
        thumbnail_url: snippet["thumbnails"]["medium"]["url"]
            .as_str()
            .unwrap_or("")
            .to_string(),
        created_at: snippet["publishedAt"].as_str().and_then(parse_iso8601_timestamp),
        subscriber_count,
        total_views: parse_count(&statistics["viewCount"]).unwrap_or(0),
        total_videos: parse_count(&statistics["videoCount"]).unwrap_or(0),
    })
}

/// Map an error body (`{"error": {"code", "message", "errors": [{"reason"}]}}`).
pub(crate) fn upstream_error_from_body(status: u16, body: &Value) -> UpstreamError {
    let error = &body["error"];
    let message = error["message"]
        .as_str()
        .or_else(|| body.as_str())
        .unwrap_or("unknown error")
        .to_string();

    let quota = status == 429
        || error["errors"]
            .as_array()
            .map(|errors| {
                errors.iter().any(|e| {
                    e["reason"]
                        .as_str()
                        .is_some_and(|reason| QUOTA_REASONS.contains(&reason))
                })
            })
            .unwrap_or(false);

    if quota {
        UpstreamError::QuotaExceeded(message)
    } else {
        UpstreamError::Api { status, message }
    }
}

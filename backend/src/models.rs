use crate::error::{DiscoveryError, MetricWarning, UpstreamError};
use chrono::{DateTime, Utc};
use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::Responder;
use rocket::serde::{Deserialize, Serialize};
use rocket::{response, Response};
use std::io::Cursor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: String,
    pub channel_id: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub duration_seconds: u64,
}

/// One video hit returned by a keyword search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSearchResult {
    pub video: VideoRecord,
    pub channel_title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChannelDetails {
    pub id: String,
    pub title: String,
    pub description: String,
    pub country: String,
    pub thumbnail_url: String,
    pub created_at: Option<DateTime<Utc>>,
    /// `None` when the channel hides its subscriber count.
    pub subscriber_count: Option<u64>,
    pub total_views: u64,
    pub total_videos: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub country: String,
    pub thumbnail_url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub subscriber_count: Option<u64>,
    pub total_views: u64,
    pub total_videos: u64,
    /// Search hits that belonged to this channel.
    pub matched_videos: usize,
    /// Most recent videos first.
    pub videos: Vec<VideoRecord>,
}

impl ChannelRecord {
    pub fn url(&self) -> String {
        format!("https://youtube.com/channel/{}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChannelMetrics {
    pub median_views: Option<f64>,
    pub average_views: Option<f64>,
    pub views_to_subscribers_ratio: Option<f64>,
    /// Videos per week.
    pub publish_frequency: Option<f64>,
    pub publish_interval_days: Option<f64>,
    pub engagement_rate: Option<f64>,
    pub median_likes: Option<f64>,
    pub median_comments: Option<f64>,
    pub average_duration_seconds: Option<u64>,
    pub last_published: Option<DateTime<Utc>>,
    /// 0-100
    pub channel_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelResult {
    pub channel: ChannelRecord,
    pub metrics: ChannelMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FilterCriteria {
    pub keyword: String,
    pub min_subscribers: Option<u64>,
    pub max_subscribers: Option<u64>,
    /// Bounds on median views.
    pub min_views: Option<u64>,
    pub max_views: Option<u64>,
    /// Bounds on the channel's total upload count.
    pub min_videos: Option<u64>,
    pub max_videos: Option<u64>,
    /// Most recent upload must be at most this many days old.
    pub active_within_days: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    MedianViews,
    Subscribers,
    ViewsToSubscribersRatio,
    PublishFrequency,
    EngagementRate,
    #[default]
    ChannelScore,
    LastPublished, // most recent upload
}

impl SortBy {
    pub fn key(&self) -> &'static str {
        match self {
            SortBy::MedianViews => "median_views",
            SortBy::Subscribers => "subscribers",
            SortBy::ViewsToSubscribersRatio => "views_to_subscribers_ratio",
            SortBy::PublishFrequency => "publish_frequency",
            SortBy::EngagementRate => "engagement_rate",
            SortBy::ChannelScore => "channel_score",
            SortBy::LastPublished => "last_published",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortBy::MedianViews => "Median Views",
            SortBy::Subscribers => "Subscribers",
            SortBy::ViewsToSubscribersRatio => "Views / Subscribers",
            SortBy::PublishFrequency => "Publish Frequency",
            SortBy::EngagementRate => "Engagement",
            SortBy::ChannelScore => "Channel Score",
            SortBy::LastPublished => "Most Recent",
        }
    }

    pub fn from_key(key: &str) -> Option<SortBy> {
        SortBy::all_variants()
            .into_iter()
            .find(|sort_by| sort_by.key() == key)
    }

    pub fn all_variants() -> Vec<Self> {
        vec![
            SortBy::ChannelScore,
            SortBy::MedianViews,
            SortBy::Subscribers,
            SortBy::ViewsToSubscribersRatio,
            SortBy::PublishFrequency,
            SortBy::EngagementRate,
            SortBy::LastPublished,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn from_key(key: &str) -> Option<SortOrder> {
        match key {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SortSpec {
    pub by: SortBy,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(by: SortBy, order: SortOrder) -> Self {
        Self { by, order }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SearchRequest {
    pub criteria: FilterCriteria,
    pub sort: SortSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub results: Vec<ChannelResult>,
    pub warnings: Vec<MetricWarning>,
    pub videos_found: usize,
    pub channels_found: usize,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<ChannelResult>,
    pub criteria: FilterCriteria,
    pub sort: SortSpec,
    pub warnings: Vec<MetricWarning>,
    pub videos_found: usize,
    pub total_channels: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelLabels {
    pub score: &'static str,
    pub views_to_subscribers: Option<&'static str>,
    pub publish_interval: &'static str,
    pub average_duration: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelProfile {
    pub channel: ChannelRecord,
    pub url: String,
    pub metrics: ChannelMetrics,
    pub labels: ChannelLabels,
    pub warnings: Vec<MetricWarning>,
}

#[derive(Debug, Serialize)]
pub struct PresetOption<T> {
    pub label: &'static str,
    pub value: T,
}

#[derive(Debug, Serialize)]
pub struct SortOption {
    pub key: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PresetsResponse {
    pub views: Vec<PresetOption<(Option<u64>, Option<u64>)>>,
    pub subscribers: Vec<PresetOption<(Option<u64>, Option<u64>)>>,
    pub activity: Vec<PresetOption<Option<u32>>>,
    pub sort_options: Vec<SortOption>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip)]
    pub status: u16,
}

impl From<DiscoveryError> for ErrorResponse {
    fn from(e: DiscoveryError) -> Self {
        let status = match &e {
            DiscoveryError::Configuration(_) => Status::BadRequest,
            DiscoveryError::ChannelNotFound(_) => Status::NotFound,
            DiscoveryError::Upstream(UpstreamError::QuotaExceeded(_)) => Status::TooManyRequests,
            DiscoveryError::Upstream(_) => Status::BadGateway,
        };
        ErrorResponse {
            error: e.kind().to_string(),
            message: e.to_string(),
            status: status.code,
        }
    }
}

impl<'r> Responder<'r, 'static> for ErrorResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let json = serde_json::to_string(&self).map_err(|_| Status::InternalServerError)?;
        Response::build()
            .status(Status::from_code(self.status).unwrap_or(Status::InternalServerError))
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}

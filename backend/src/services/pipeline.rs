use crate::error::{DiscoveryError, Result};
use crate::models::{ChannelProfile, ChannelResult, SearchOutcome, SearchRequest};
use crate::services::aggregation::{aggregate_channels, single_channel};
use crate::services::filters::apply_filters;
use crate::services::metrics::{channel_labels, metric_warnings, MetricsCalculator, ScoringConfig};
use crate::services::sorting::sort_channels;
use crate::services::youtube_api::VideoPlatform;
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::collections::BTreeSet;

/// Recent uploads fetched for a channel profile when searches skip sampling.
const DEFAULT_PROFILE_SAMPLE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    /// Cap on video hits collected per keyword.
    pub max_search_results: usize,
    /// Recent uploads fetched per channel; 0 disables the extra lookups.
    pub sample_size: usize,
    pub scoring: ScoringConfig,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        PipelineSettings {
            max_search_results: 250,
            sample_size: 10,
            scoring: ScoringConfig::default(),
        }
    }
}

/// Run one creator search: fetch, aggregate, score, filter and sort.
///
/// The criteria are validated before the platform is contacted. Any upstream
/// failure aborts the whole search and no partial results are returned.
pub async fn run_search(
    platform: &dyn VideoPlatform,
    request: &SearchRequest,
    settings: &PipelineSettings,
    now: DateTime<Utc>,
) -> Result<SearchOutcome> {
    let criteria = &request.criteria;
    criteria.validate()?;
    let keyword = criteria.keyword.trim();

    info!("Searching for videos matching '{keyword}'...");
    let hits = platform.search(keyword, settings.max_search_results).await?;
    info!("Found {} videos", hits.len());

    let channel_ids: Vec<String> = hits
        .iter()
        .map(|hit| hit.video.channel_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let details = if channel_ids.is_empty() {
        Vec::new()
    } else {
        info!("Fetching statistics for {} channels...", channel_ids.len());
        platform.channel_details(&channel_ids).await?
    };

    let mut recent_uploads = Vec::new();
    if settings.sample_size > 0 {
        info!("Fetching recent uploads for {} channels...", details.len());
        for channel in &details {
            let videos = platform
                .list_videos_for_channel(&channel.id, settings.sample_size)
                .await?;
            recent_uploads.extend(videos);
        }
    }

    let channels = aggregate_channels(&hits, &details, &recent_uploads, settings.sample_size);
    let channels_found = channels.len();

    let calculator = MetricsCalculator::new(settings.scoring);
    let mut warnings = Vec::new();
    let results: Vec<ChannelResult> = channels
        .into_iter()
        .map(|channel| {
            for warning in metric_warnings(&channel) {
                warn!("{warning}");
                warnings.push(warning);
            }
            let metrics = calculator.compute(&channel);
            ChannelResult { channel, metrics }
        })
        .collect();

    let filtered = apply_filters(results, criteria, now);
    let sorted = sort_channels(filtered, &request.sort);
    info!(
        "Found {} creators ({} before filtering), sorted by {} {:?}",
        sorted.len(),
        channels_found,
        request.sort.by.key(),
        request.sort.order,
    );

    Ok(SearchOutcome {
        results: sorted,
        warnings,
        videos_found: hits.len(),
        channels_found,
    })
}

/// Detail view for a single channel.
pub async fn channel_profile(
    platform: &dyn VideoPlatform,
    channel_id: &str,
    settings: &PipelineSettings,
) -> Result<ChannelProfile> {
    let channel_id = channel_id.trim();
    if channel_id.is_empty() {
        return Err(DiscoveryError::config("channel id must not be empty"));
    }

    let details = platform
        .channel_details(&[channel_id.to_string()])
        .await?
        .into_iter()
        .find(|d| d.id == channel_id)
        .ok_or_else(|| DiscoveryError::ChannelNotFound(channel_id.to_string()))?;

    let limit = if settings.sample_size > 0 {
        settings.sample_size
    } else {
        DEFAULT_PROFILE_SAMPLE
    };
    let uploads = platform.list_videos_for_channel(channel_id, limit).await?;

    let channel = single_channel(&details, &uploads);
    let metrics = MetricsCalculator::new(settings.scoring).compute(&channel);
    let warnings = metric_warnings(&channel);
    info!(
        "Profiled channel {} ({}): score {:.0}",
        channel.title, channel.id, metrics.channel_score
    );

    Ok(ChannelProfile {
        url: channel.url(),
        labels: channel_labels(&metrics),
        channel,
        metrics,
        warnings,
    })
}

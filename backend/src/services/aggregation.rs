use crate::models::{ChannelDetails, ChannelRecord, RawSearchResult, VideoRecord};
use chrono::{DateTime, Utc};
use log::debug;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Group video-level search hits into one record per channel.
///
/// Each channel's sample is the union of its search hits and `recent_uploads`,
/// deduplicated by video id, newest first, truncated to `sample_size`
/// (0 keeps every hit). When a video id repeats, the copy with the highest
/// statistics wins.
/// Channels without details are dropped. A blank channel title falls back to
/// the title reported with the search hits. Output is ordered by channel id, so
/// the result does not depend on the order of the inputs.
pub fn aggregate_channels(
    hits: &[RawSearchResult],
    details: &[ChannelDetails],
    recent_uploads: &[VideoRecord],
    sample_size: usize,
) -> Vec<ChannelRecord> {
    let details_by_id: HashMap<&str, &ChannelDetails> =
        details.iter().map(|d| (d.id.as_str(), d)).collect();

    let mut matched: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();
    let mut hit_titles: HashMap<&str, &str> = HashMap::new();
    for hit in hits {
        let channel_id = hit.video.channel_id.as_str();
        matched
            .entry(channel_id)
            .or_default()
            .insert(hit.video.id.as_str());
        if !hit.channel_title.is_empty() {
            hit_titles
                .entry(channel_id)
                .and_modify(|title| *title = (*title).min(hit.channel_title.as_str()))
                .or_insert(hit.channel_title.as_str());
        }
    }

    let mut videos_by_channel: HashMap<&str, BTreeMap<&str, &VideoRecord>> = HashMap::new();
    for video in hits.iter().map(|h| &h.video).chain(recent_uploads) {
        let by_id = videos_by_channel
            .entry(video.channel_id.as_str())
            .or_default();
        match by_id.entry(video.id.as_str()) {
            Entry::Vacant(slot) => {
                slot.insert(video);
            }
            Entry::Occupied(mut slot) => {
                if preference(video) > preference(slot.get()) {
                    slot.insert(video);
                }
            }
        }
    }

    let mut channels = Vec::with_capacity(matched.len());
    for (channel_id, matched_ids) in matched {
        let Some(details) = details_by_id.get(channel_id) else {
            debug!("Skipping channel {channel_id}: no channel details");
            continue;
        };

        let mut videos: Vec<VideoRecord> = videos_by_channel
            .remove(channel_id)
            .map(|by_id| by_id.into_values().cloned().collect())
            .unwrap_or_default();
        sort_newest_first(&mut videos);
        if sample_size > 0 {
            videos.truncate(sample_size);
        }

        let mut record = channel_record(details, matched_ids.len(), videos);
        if record.title.is_empty() {
            if let Some(title) = hit_titles.get(channel_id) {
                record.title = title.to_string();
            }
        }
        channels.push(record);
    }

    channels
}

/// Record for a single channel looked up directly, with no search hits.
pub fn single_channel(details: &ChannelDetails, recent_uploads: &[VideoRecord]) -> ChannelRecord {
    let mut seen = HashSet::new();
    let mut videos: Vec<VideoRecord> = recent_uploads
        .iter()
        .filter(|v| v.channel_id == details.id && seen.insert(v.id.as_str()))
        .cloned()
        .collect();
    sort_newest_first(&mut videos);

    channel_record(details, 0, videos)
}

/// Total order over copies of the same video: freshest statistics first.
fn preference(video: &VideoRecord) -> (u64, u64, u64, DateTime<Utc>, u64, &str) {
    (
        video.view_count,
        video.like_count,
        video.comment_count,
        video.published_at,
        video.duration_seconds,
        video.title.as_str(),
    )
}

fn sort_newest_first(videos: &mut [VideoRecord]) {
    videos.sort_by(|a, b| {
        b.published_at
            .cmp(&a.published_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn channel_record(details: &ChannelDetails, matched_videos: usize, videos: Vec<VideoRecord>) -> ChannelRecord {
    ChannelRecord {
        id: details.id.clone(),
        title: details.title.clone(),
        description: details.description.clone(),
        country: details.country.clone(),
        thumbnail_url: details.thumbnail_url.clone(),
        created_at: details.created_at,
        subscriber_count: details.subscriber_count,
        total_views: details.total_views,
        total_videos: details.total_videos,
        matched_videos,
        videos,
    }
}

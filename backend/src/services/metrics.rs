//! Derived per-channel metrics and their display labels.

use crate::error::MetricWarning;
use crate::models::{ChannelLabels, ChannelMetrics, ChannelRecord};
use chrono::{DateTime, Utc};

const SECONDS_PER_DAY: f64 = 86_400.0;
const SECONDS_PER_WEEK: f64 = 7.0 * SECONDS_PER_DAY;

/// Weights and saturation targets of the channel score.
///
/// Each component is normalized as `min(value / target, 1.0)`, weighted, and the
/// weighted sum is scaled to 0-100. The defaults mirror the product's first
/// scoring model (activity 30%, content performance 35%, engagement 35%) and
/// are meant to be tuned through configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringConfig {
    pub activity_weight: f64,
    pub performance_weight: f64,
    pub engagement_weight: f64,
    /// Uploads per week that earn the full activity component.
    pub target_publish_frequency: f64,
    /// Median views / subscribers that earns the full performance component.
    pub target_views_to_subscribers: f64,
    /// (likes + comments) / views that earns the full engagement component.
    pub target_engagement_rate: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            activity_weight: 0.30,
            performance_weight: 0.35,
            engagement_weight: 0.35,
            target_publish_frequency: 1.0,
            target_views_to_subscribers: 0.20,
            target_engagement_rate: 0.045,
        }
    }
}

pub struct MetricsCalculator {
    scoring: ScoringConfig,
}

impl MetricsCalculator {
    pub fn new(scoring: ScoringConfig) -> Self {
        Self { scoring }
    }

    pub fn compute(&self, channel: &ChannelRecord) -> ChannelMetrics {
        let views: Vec<u64> = channel.videos.iter().map(|v| v.view_count).collect();
        let likes: Vec<u64> = channel.videos.iter().map(|v| v.like_count).collect();
        let comments: Vec<u64> = channel.videos.iter().map(|v| v.comment_count).collect();
        let timestamps: Vec<DateTime<Utc>> =
            channel.videos.iter().map(|v| v.published_at).collect();

        let median_views = median(&views);
        let views_to_subscribers_ratio =
            views_to_subscribers_ratio(median_views, channel.subscriber_count);
        let publish_frequency = publish_frequency(&timestamps);
        let engagement_rate = engagement_rate(channel);

        let channel_score = self.channel_score(
            publish_frequency,
            views_to_subscribers_ratio,
            engagement_rate,
        );

        ChannelMetrics {
            median_views,
            average_views: mean(&views),
            views_to_subscribers_ratio,
            publish_frequency,
            publish_interval_days: publish_interval_days(&timestamps),
            engagement_rate,
            median_likes: median(&likes),
            median_comments: median(&comments),
            average_duration_seconds: average_duration_seconds(channel),
            last_published: timestamps.iter().max().copied(),
            channel_score,
        }
    }

    /// Unknown components contribute nothing to their term.
    pub fn channel_score(
        &self,
        publish_frequency: Option<f64>,
        views_to_subscribers_ratio: Option<f64>,
        engagement_rate: Option<f64>,
    ) -> f64 {
        let s = &self.scoring;
        let total = s.activity_weight * normalize(publish_frequency, s.target_publish_frequency)
            + s.performance_weight
                * normalize(views_to_subscribers_ratio, s.target_views_to_subscribers)
            + s.engagement_weight * normalize(engagement_rate, s.target_engagement_rate);

        (total * 100.0).clamp(0.0, 100.0)
    }
}

fn normalize(value: Option<f64>, target: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() && target > 0.0 => (v / target).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

pub fn median(values: &[u64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;

    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0)
    } else {
        Some(sorted[mid] as f64)
    }
}

fn mean(values: &[u64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64)
}

pub fn views_to_subscribers_ratio(median_views: Option<f64>, subscribers: Option<u64>) -> Option<f64> {
    match (median_views, subscribers) {
        (Some(views), Some(subs)) if subs > 0 => Some(views / subs as f64),
        _ => None,
    }
}

/// Videos per week over the span between the oldest and newest upload in the sample.
pub fn publish_frequency(timestamps: &[DateTime<Utc>]) -> Option<f64> {
    if timestamps.len() < 2 {
        return None;
    }

    let earliest = timestamps.iter().min()?;
    let latest = timestamps.iter().max()?;
    let span_weeks = (*latest - *earliest).num_seconds() as f64 / SECONDS_PER_WEEK;
    if span_weeks <= 0.0 {
        return None;
    }

    Some(timestamps.len() as f64 / span_weeks)
}

/// Mean gap between consecutive uploads, in days.
pub fn publish_interval_days(timestamps: &[DateTime<Utc>]) -> Option<f64> {
    if timestamps.len() < 2 {
        return None;
    }

    let earliest = timestamps.iter().min()?;
    let latest = timestamps.iter().max()?;
    let span_days = (*latest - *earliest).num_seconds() as f64 / SECONDS_PER_DAY;
    Some(span_days / (timestamps.len() - 1) as f64)
}

/// Mean of (likes + comments) / views, skipping videos without views.
pub fn engagement_rate(channel: &ChannelRecord) -> Option<f64> {
    let rates: Vec<f64> = channel
        .videos
        .iter()
        .filter(|v| v.view_count > 0)
        .map(|v| v.like_count.saturating_add(v.comment_count) as f64 / v.view_count as f64)
        .collect();

    if rates.is_empty() {
        return None;
    }
    Some(rates.iter().sum::<f64>() / rates.len() as f64)
}

fn average_duration_seconds(channel: &ChannelRecord) -> Option<u64> {
    let durations: Vec<u64> = channel
        .videos
        .iter()
        .map(|v| v.duration_seconds)
        .filter(|&d| d > 0)
        .collect();

    if durations.is_empty() {
        return None;
    }
    Some(durations.iter().sum::<u64>() / durations.len() as u64)
}

pub fn metric_warnings(channel: &ChannelRecord) -> Vec<MetricWarning> {
    let channel_id = channel.id.clone();
    let mut warnings = Vec::new();

    match channel.videos.len() {
        0 => warnings.push(MetricWarning::EmptySample {
            channel_id: channel_id.clone(),
        }),
        1 => warnings.push(MetricWarning::InsufficientSample {
            channel_id: channel_id.clone(),
        }),
        _ => {}
    }
    if channel.subscriber_count.is_none() {
        warnings.push(MetricWarning::UnknownSubscriberCount { channel_id });
    }

    warnings
}

// ============================================================================
// LABELS
// ============================================================================

pub fn views_to_subscribers_label(ratio: f64) -> &'static str {
    let percent = ratio * 100.0;
    if percent < 5.0 {
        "Poor"
    } else if percent < 10.0 {
        "Below Average"
    } else if percent < 20.0 {
        "Average"
    } else if percent < 50.0 {
        "Good"
    } else {
        "Excellent"
    }
}

pub fn score_label(score: f64) -> &'static str {
    if score >= 80.0 {
        "Excellent"
    } else if score >= 60.0 {
        "Good"
    } else if score >= 40.0 {
        "Average"
    } else {
        "Poor"
    }
}

pub fn publish_interval_label(days: Option<f64>) -> &'static str {
    let Some(days) = days else {
        return "N/A";
    };

    match days {
        d if d < 1.0 => "Multiple per day",
        d if d < 2.0 => "Daily",
        d if d < 4.0 => "Every few days",
        d if d < 8.0 => "Weekly",
        d if d < 15.0 => "Every 2 weeks",
        d if d < 22.0 => "Every 3 weeks",
        d if d < 45.0 => "Monthly",
        d if d < 75.0 => "Every 2 months",
        _ => "Infrequent",
    }
}

/// `H:MM:SS` or `M:SS`
pub fn format_duration(seconds: u64) -> String {
    if seconds == 0 {
        return "0:00".to_string();
    }

    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

pub fn channel_labels(metrics: &ChannelMetrics) -> ChannelLabels {
    ChannelLabels {
        score: score_label(metrics.channel_score),
        views_to_subscribers: metrics
            .views_to_subscribers_ratio
            .map(views_to_subscribers_label),
        publish_interval: publish_interval_label(metrics.publish_interval_days),
        average_duration: format_duration(metrics.average_duration_seconds.unwrap_or(0)),
    }
}

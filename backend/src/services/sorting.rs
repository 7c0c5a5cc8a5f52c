use crate::models::{ChannelResult, SortBy, SortSpec};
use crate::utils::compare_optional_with_order;

/// The value `sort_by` ranks on. `None` means unknown.
pub fn sort_key(result: &ChannelResult, sort_by: SortBy) -> Option<f64> {
    let metrics = &result.metrics;
    match sort_by {
        SortBy::MedianViews => metrics.median_views,
        SortBy::Subscribers => result.channel.subscriber_count.map(|s| s as f64),
        SortBy::ViewsToSubscribersRatio => metrics.views_to_subscribers_ratio,
        SortBy::PublishFrequency => metrics.publish_frequency,
        SortBy::EngagementRate => metrics.engagement_rate,
        SortBy::ChannelScore => Some(metrics.channel_score),
        SortBy::LastPublished => metrics.last_published.map(|t| t.timestamp() as f64),
    }
}

/// Stable sort on the requested metric. Unknown values go last in either
/// direction; equal values fall back to channel id ascending.
pub fn sort_channels(mut results: Vec<ChannelResult>, spec: &SortSpec) -> Vec<ChannelResult> {
    results.sort_by(|a, b| {
        compare_optional_with_order(sort_key(a, spec.by), sort_key(b, spec.by), &spec.order)
            .then_with(|| a.channel.id.cmp(&b.channel.id))
    });
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChannelMetrics, ChannelRecord, SortOrder};

    fn result(id: &str, score: f64, engagement: Option<f64>) -> ChannelResult {
        ChannelResult {
            channel: ChannelRecord {
                id: id.to_string(),
                title: id.to_string(),
                description: String::new(),
                country: String::new(),
                thumbnail_url: String::new(),
                created_at: None,
                subscriber_count: Some(100),
                total_views: 0,
                total_videos: 0,
                matched_videos: 1,
                videos: Vec::new(),
            },
            metrics: ChannelMetrics {
                channel_score: score,
                engagement_rate: engagement,
                ..ChannelMetrics::default()
            },
        }
    }

    fn ids(results: &[ChannelResult]) -> Vec<&str> {
        results.iter().map(|r| r.channel.id.as_str()).collect()
    }

    #[test]
    fn test_descending_by_score() {
        let input = vec![result("a", 10.0, None), result("b", 90.0, None), result("c", 50.0, None)];
        let sorted = sort_channels(input, &SortSpec::new(SortBy::ChannelScore, SortOrder::Desc));
        assert_eq!(ids(&sorted), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_ties_break_on_channel_id() {
        let input = vec![result("B", 10.0, None), result("A", 10.0, None)];
        let desc = sort_channels(input.clone(), &SortSpec::new(SortBy::ChannelScore, SortOrder::Desc));
        assert_eq!(ids(&desc), vec!["A", "B"]);

        let asc = sort_channels(input, &SortSpec::new(SortBy::ChannelScore, SortOrder::Asc));
        assert_eq!(ids(&asc), vec!["A", "B"]);
    }

    #[test]
    fn test_unknown_engagement_sorts_last_both_ways() {
        let input = vec![
            result("unknown", 0.0, None),
            result("low", 0.0, Some(0.01)),
            result("high", 0.0, Some(0.09)),
            result("zero", 0.0, Some(0.0)),
        ];

        let desc = sort_channels(input.clone(), &SortSpec::new(SortBy::EngagementRate, SortOrder::Desc));
        assert_eq!(ids(&desc), vec!["high", "low", "zero", "unknown"]);

        let asc = sort_channels(input, &SortSpec::new(SortBy::EngagementRate, SortOrder::Asc));
        assert_eq!(ids(&asc), vec!["zero", "low", "high", "unknown"]);
    }

    #[test]
    fn test_sorting_twice_is_stable() {
        let input = vec![
            result("c", 5.0, Some(0.1)),
            result("a", 5.0, None),
            result("b", 7.0, Some(0.1)),
        ];
        let spec = SortSpec::new(SortBy::EngagementRate, SortOrder::Desc);
        let once = sort_channels(input, &spec);
        let twice = sort_channels(once.clone(), &spec);
        assert_eq!(ids(&once), vec!["b", "c", "a"]);
        assert_eq!(once, twice);
    }
}

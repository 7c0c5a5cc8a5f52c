use crate::error::DiscoveryError;
use crate::models::{ChannelResult, FilterCriteria, PresetOption};
use chrono::{DateTime, Duration, Utc};

pub type Range = (Option<u64>, Option<u64>);

/// Median-view presets offered by the search form.
pub const VIEW_PRESETS: &[(&str, Range)] = &[
    ("Any", (None, None)),
    ("< 1K", (None, Some(1_000))),
    ("1K - 10K", (Some(1_000), Some(10_000))),
    ("10K - 100K", (Some(10_000), Some(100_000))),
    ("100K+", (Some(100_000), None)),
];

pub const SUBSCRIBER_PRESETS: &[(&str, Range)] = &[
    ("Any", (None, None)),
    ("< 1K", (None, Some(1_000))),
    ("1K - 10K", (Some(1_000), Some(10_000))),
    ("10K - 100K", (Some(10_000), Some(100_000))),
    ("100K - 1M", (Some(100_000), Some(1_000_000))),
    ("1M+", (Some(1_000_000), None)),
];

pub const ACTIVITY_PRESETS: &[(&str, Option<u32>)] = &[
    ("Any", None),
    ("Active (30 days)", Some(30)),
    ("Active (90 days)", Some(90)),
    ("Active (1 year)", Some(365)),
];

pub fn preset_options<T: Copy>(presets: &[(&'static str, T)]) -> Vec<PresetOption<T>> {
    presets
        .iter()
        .map(|&(label, value)| PresetOption { label, value })
        .collect()
}

impl FilterCriteria {
    pub fn validate(&self) -> Result<(), DiscoveryError> {
        if self.keyword.trim().is_empty() {
            return Err(DiscoveryError::config("keyword must not be empty"));
        }
        check_range("subscribers", self.min_subscribers, self.max_subscribers)?;
        check_range("views", self.min_views, self.max_views)?;
        check_range("videos", self.min_videos, self.max_videos)?;
        if self.active_within_days == Some(0) {
            return Err(DiscoveryError::config(
                "active_within_days must be at least 1",
            ));
        }
        Ok(())
    }

    /// All active predicates hold. A metric an active predicate needs that is
    /// unknown fails the predicate.
    pub fn matches(&self, result: &ChannelResult, now: DateTime<Utc>) -> bool {
        let subscribers = result.channel.subscriber_count.map(|s| s as f64);
        if !in_range(subscribers, self.min_subscribers, self.max_subscribers) {
            return false;
        }
        if !in_range(result.metrics.median_views, self.min_views, self.max_views) {
            return false;
        }
        let videos = Some(result.channel.total_videos as f64);
        if !in_range(videos, self.min_videos, self.max_videos) {
            return false;
        }
        if let Some(days) = self.active_within_days {
            let Some(last) = result.metrics.last_published else {
                return false;
            };
            // a window reaching past the earliest representable instant has no cutoff
            let cutoff = Duration::try_days(i64::from(days))
                .and_then(|window| now.checked_sub_signed(window));
            if cutoff.is_some_and(|cutoff| last < cutoff) {
                return false;
            }
        }
        true
    }
}

fn check_range(name: &str, min: Option<u64>, max: Option<u64>) -> Result<(), DiscoveryError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(DiscoveryError::config(format!(
            "min_{name} ({min}) is greater than max_{name} ({max})"
        ))),
        _ => Ok(()),
    }
}

fn in_range(value: Option<f64>, min: Option<u64>, max: Option<u64>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    let Some(value) = value else {
        return false;
    };
    min.map_or(true, |min| value >= min as f64) && max.map_or(true, |max| value <= max as f64)
}

/// Keep the entries matching `criteria`, preserving their order.
pub fn apply_filters(
    results: Vec<ChannelResult>,
    criteria: &FilterCriteria,
    now: DateTime<Utc>,
) -> Vec<ChannelResult> {
    results
        .into_iter()
        .filter(|result| criteria.matches(result, now))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChannelMetrics, ChannelRecord};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn result(id: &str, subscribers: Option<u64>, median_views: Option<f64>, days_ago: Option<i64>) -> ChannelResult {
        ChannelResult {
            channel: ChannelRecord {
                id: id.to_string(),
                title: id.to_string(),
                description: String::new(),
                country: String::new(),
                thumbnail_url: String::new(),
                created_at: None,
                subscriber_count: subscribers,
                total_views: 0,
                total_videos: 0,
                matched_videos: 1,
                videos: Vec::new(),
            },
            metrics: ChannelMetrics {
                median_views,
                last_published: days_ago.map(|d| now() - Duration::days(d)),
                ..ChannelMetrics::default()
            },
        }
    }

    fn criteria() -> FilterCriteria {
        FilterCriteria {
            keyword: "rust".to_string(),
            ..FilterCriteria::default()
        }
    }

    fn ids(results: &[ChannelResult]) -> Vec<&str> {
        results.iter().map(|r| r.channel.id.as_str()).collect()
    }

    #[test]
    fn test_unset_bounds_keep_everything() {
        let input = vec![
            result("a", None, None, None),
            result("b", Some(0), Some(10.0), Some(400)),
        ];
        assert_eq!(apply_filters(input.clone(), &criteria(), now()), input);
    }

    #[test]
    fn test_subscriber_bounds_are_inclusive() {
        let input = vec![
            result("a", Some(99), Some(1.0), Some(1)),
            result("b", Some(100), Some(1.0), Some(1)),
            result("c", Some(1000), Some(1.0), Some(1)),
            result("d", Some(1001), Some(1.0), Some(1)),
        ];
        let c = FilterCriteria {
            min_subscribers: Some(100),
            max_subscribers: Some(1000),
            ..criteria()
        };
        assert_eq!(ids(&apply_filters(input, &c, now())), vec!["b", "c"]);
    }

    #[test]
    fn test_view_bounds_are_inclusive() {
        let input = vec![
            result("a", Some(10), Some(999.0), Some(1)),
            result("b", Some(10), Some(1000.0), Some(1)),
            result("c", Some(10), Some(5000.0), Some(1)),
            result("d", Some(10), Some(5000.5), Some(1)),
        ];
        let c = FilterCriteria {
            min_views: Some(1000),
            max_views: Some(5000),
            ..criteria()
        };
        assert_eq!(ids(&apply_filters(input, &c, now())), vec!["b", "c"]);
    }

    #[test]
    fn test_video_count_bounds_are_inclusive() {
        let input: Vec<ChannelResult> = [("a", 9), ("b", 10), ("c", 200), ("d", 201), ("e", 0)]
            .into_iter()
            .map(|(id, total_videos)| {
                let mut r = result(id, Some(10), Some(1.0), Some(1));
                r.channel.total_videos = total_videos;
                r
            })
            .collect();
        let c = FilterCriteria {
            min_videos: Some(10),
            max_videos: Some(200),
            ..criteria()
        };
        assert_eq!(ids(&apply_filters(input.clone(), &c, now())), vec!["b", "c"]);

        let c = FilterCriteria {
            max_videos: Some(9),
            ..criteria()
        };
        assert_eq!(ids(&apply_filters(input, &c, now())), vec!["a", "e"]);
    }

    #[test]
    fn test_unknown_metric_fails_active_filter() {
        let input = vec![
            result("hidden", None, Some(500.0), Some(1)),
            result("empty", Some(500), None, None),
            result("ok", Some(500), Some(500.0), Some(1)),
        ];
        let c = FilterCriteria {
            min_subscribers: Some(1),
            min_views: Some(1),
            ..criteria()
        };
        assert_eq!(ids(&apply_filters(input, &c, now())), vec!["ok"]);
    }

    #[test]
    fn test_recency_window() {
        let input = vec![
            result("fresh", Some(10), Some(1.0), Some(3)),
            result("edge", Some(10), Some(1.0), Some(30)),
            result("stale", Some(10), Some(1.0), Some(31)),
            result("never", Some(10), Some(1.0), None),
        ];
        let c = FilterCriteria {
            active_within_days: Some(30),
            ..criteria()
        };
        assert_eq!(ids(&apply_filters(input, &c, now())), vec!["fresh", "edge"]);
    }

    #[test]
    fn test_huge_recency_window_does_not_overflow() {
        let input = vec![
            result("today", Some(10), Some(1.0), Some(0)),
            result("ancient", Some(10), Some(1.0), Some(365 * 200)),
            result("never", Some(10), Some(1.0), None),
        ];
        let c = FilterCriteria {
            active_within_days: Some(u32::MAX),
            ..criteria()
        };
        assert!(c.validate().is_ok());
        assert_eq!(ids(&apply_filters(input, &c, now())), vec!["today", "ancient"]);
    }

    #[test]
    fn test_filtering_is_idempotent_and_order_preserving() {
        let input = vec![
            result("z", Some(5000), Some(100.0), Some(2)),
            result("a", Some(0), Some(200.0), Some(2)),
            result("m", Some(1000), Some(500.0), Some(2)),
        ];
        let c = FilterCriteria {
            min_subscribers: Some(1),
            ..criteria()
        };
        let once = apply_filters(input, &c, now());
        let twice = apply_filters(once.clone(), &c, now());
        assert_eq!(ids(&once), vec!["z", "m"]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_validate_rejects_inverted_ranges() {
        let c = FilterCriteria {
            min_subscribers: Some(10),
            max_subscribers: Some(5),
            ..criteria()
        };
        assert!(matches!(c.validate(), Err(DiscoveryError::Configuration(_))));

        let c = FilterCriteria {
            min_views: Some(10),
            max_views: Some(5),
            ..criteria()
        };
        assert!(c.validate().is_err());

        let c = FilterCriteria {
            min_videos: Some(50),
            max_videos: Some(5),
            ..criteria()
        };
        assert!(matches!(c.validate(), Err(DiscoveryError::Configuration(_))));

        let c = FilterCriteria {
            min_views: Some(5),
            max_views: Some(5),
            ..criteria()
        };
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_keyword_and_zero_window() {
        assert!(FilterCriteria::default().validate().is_err());
        let c = FilterCriteria {
            active_within_days: Some(0),
            ..criteria()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_presets_are_valid_ranges() {
        for (label, (min, max)) in VIEW_PRESETS.iter().chain(SUBSCRIBER_PRESETS) {
            if let (Some(min), Some(max)) = (min, max) {
                assert!(min <= max, "preset {label} is inverted");
            }
        }
        assert_eq!(preset_options(ACTIVITY_PRESETS).len(), 4);
    }
}

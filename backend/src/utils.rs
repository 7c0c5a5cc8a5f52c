use crate::models::SortOrder;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Parse an RFC 3339 timestamp as returned by the YouTube API (`2024-05-01T12:00:00Z`).
pub fn parse_iso8601_timestamp(date_str: &str) -> Option<DateTime<Utc>> {
    if date_str.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc3339(date_str)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse ISO8601 duration string (P1DT1H2M3S) to total seconds
pub fn parse_iso8601_duration_to_seconds(duration_str: &str) -> u64 {
    let Some(duration_part) = duration_str.strip_prefix('P') else {
        return 0;
    };

    let mut total_seconds = 0.0;
    let mut current_number = String::new();
    let mut in_time = false;

    for ch in duration_part.chars() {
        if ch.is_ascii_digit() || ch == '.' {
            current_number.push(ch);
            continue;
        }
        if ch == 'T' {
            in_time = true;
            current_number.clear();
            continue;
        }
        if let Ok(num) = current_number.parse::<f64>() {
            match (ch, in_time) {
                ('D', false) => total_seconds += num * 86400.0,
                ('H', true) => total_seconds += num * 3600.0,
                ('M', true) => total_seconds += num * 60.0,
                ('S', true) => total_seconds += num,
                _ => {}
            }
        }
        current_number.clear();
    }

    total_seconds as u64
}

/// Parse a YouTube statistics counter. The API encodes counts as strings.
pub fn parse_count(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::String(s) => s.parse().ok(),
        serde_json::Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

pub fn compare_with_order_float(a: f64, b: f64, order: &SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        SortOrder::Desc => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Unknown values always order after known ones, whatever the direction.
pub fn compare_optional_with_order(a: Option<f64>, b: Option<f64>, order: &SortOrder) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => compare_with_order_float(a, b, order),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_iso8601_duration_to_seconds("PT1H2M3S"), 3723);
        assert_eq!(parse_iso8601_duration_to_seconds("PT45S"), 45);
        assert_eq!(parse_iso8601_duration_to_seconds("PT10M"), 600);
        assert_eq!(parse_iso8601_duration_to_seconds("P1DT1M"), 86460);
        assert_eq!(parse_iso8601_duration_to_seconds(""), 0);
        assert_eq!(parse_iso8601_duration_to_seconds("garbage"), 0);
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_iso8601_timestamp("2024-05-01T12:00:00Z").unwrap();
        assert_eq!(ts.timestamp(), 1_714_564_800);
        assert!(parse_iso8601_timestamp("").is_none());
        assert!(parse_iso8601_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(&json!("1234")), Some(1234));
        assert_eq!(parse_count(&json!(42)), Some(42));
        assert_eq!(parse_count(&json!("n/a")), None);
        assert_eq!(parse_count(&json!(null)), None);
    }

    #[test]
    fn test_unknown_values_order_last() {
        for order in [SortOrder::Asc, SortOrder::Desc] {
            assert_eq!(
                compare_optional_with_order(Some(0.0), None, &order),
                Ordering::Less
            );
            assert_eq!(
                compare_optional_with_order(None, Some(0.0), &order),
                Ordering::Greater
            );
        }
        assert_eq!(
            compare_optional_with_order(Some(1.0), Some(2.0), &SortOrder::Desc),
            Ordering::Greater
        );
    }
}

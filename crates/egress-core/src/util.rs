//! Small helpers shared by the policy crates.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::time::Duration;

/// Returns true if every key/value pair of `subset` is present in `superset`.
#[must_use]
pub fn map_contains(superset: &BTreeMap<String, String>, subset: &BTreeMap<String, String>) -> bool {
    if subset.len() > superset.len() {
        return false;
    }
    subset
        .iter()
        .all(|(key, value)| superset.get(key) == Some(value))
}

/// Render a duration compactly, e.g. `1h0m0s`, `2m5s`, `250ms`.
///
/// Whole seconds are kept once the duration reaches one second.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    if total == 0 {
        let millis = duration.as_millis();
        return if millis == 0 { "0s".to_string() } else { format!("{millis}ms") };
    }

    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    let mut out = String::new();
    if hours > 0 {
        let _ = write!(out, "{hours}h");
    }
    if hours > 0 || minutes > 0 {
        let _ = write!(out, "{minutes}m");
    }
    let _ = write!(out, "{seconds}s");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_subset() {
        let labels = map(&[("app", "web"), ("tier", "frontend")]);
        assert!(map_contains(&labels, &map(&[("app", "web")])));
        assert!(map_contains(&labels, &map(&[])));
        assert!(!map_contains(&labels, &map(&[("app", "db")])));
        assert!(!map_contains(&labels, &map(&[("zone", "a")])));
    }

    #[test]
    fn test_larger_subset_short_circuits() {
        let small = map(&[("app", "web")]);
        let large = map(&[("app", "web"), ("tier", "frontend")]);
        assert!(!map_contains(&small, &large));
    }

    #[test_case(0, "0s")]
    #[test_case(10, "10s")]
    #[test_case(125, "2m5s")]
    #[test_case(3600, "1h0m0s")]
    #[test_case(3661, "1h1m1s")]
    fn test_format_duration(secs: u64, expected: &str) {
        assert_eq!(format_duration(Duration::from_secs(secs)), expected);
    }

    #[test]
    fn test_format_sub_second() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
    }
}

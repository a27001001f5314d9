//! Language representation monitoring.

use std::collections::BTreeMap;

use crate::types::LanguageStats;

/// Build language statistics from per-language counts.
///
/// A language is underrepresented when its count is strictly below
/// `threshold` (an absolute count). Languages with a zero count are dropped
/// from both outputs. `underrepresented` is ordered by count ascending, then
/// by language code.
#[must_use]
pub fn language_stats(counts: &BTreeMap<String, u64>, threshold: u64) -> LanguageStats {
    let language_counts: BTreeMap<String, u64> = counts
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(language, count)| (language.clone(), *count))
        .collect();

    let mut flagged: Vec<(&String, u64)> = language_counts
        .iter()
        .filter(|(_, count)| **count < threshold)
        .map(|(language, count)| (language, *count))
        .collect();
    flagged.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));

    let underrepresented = flagged
        .into_iter()
        .map(|(language, _)| language.clone())
        .collect();

    LanguageStats {
        language_counts,
        underrepresented,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, u64)]) -> BTreeMap<String, u64> {
        pairs.iter().map(|(l, c)| ((*l).to_string(), *c)).collect()
    }

    #[test]
    fn flags_languages_strictly_below_threshold() {
        let stats = language_stats(&counts(&[("en", 2), ("hi", 1)]), 2);
        assert_eq!(stats.underrepresented, vec!["hi".to_string()]);
        assert_eq!(stats.language_counts.get("en"), Some(&2));
    }

    #[test]
    fn ties_at_threshold_are_not_flagged() {
        let stats = language_stats(&counts(&[("en", 5), ("ta", 5)]), 5);
        assert!(stats.underrepresented.is_empty());
    }

    #[test]
    fn underrepresented_sorted_by_count_then_code() {
        let stats = language_stats(
            &counts(&[("en", 100), ("hi", 5), ("ta", 2), ("bn", 5), ("mr", 2)]),
            10,
        );
        assert_eq!(stats.underrepresented, vec!["mr", "ta", "bn", "hi"]);
    }

    #[test]
    fn zero_count_languages_are_never_reported() {
        let stats = language_stats(&counts(&[("en", 3), ("ur", 0)]), 10);
        assert!(!stats.language_counts.contains_key("ur"));
        assert_eq!(stats.underrepresented, vec!["en"]);
    }

    #[test]
    fn zero_threshold_flags_nothing() {
        let stats = language_stats(&counts(&[("en", 1)]), 0);
        assert!(stats.underrepresented.is_empty());
    }

    #[test]
    fn serializes_dashboard_shape() {
        let stats = language_stats(&counts(&[("en", 100), ("hi", 5)]), 10);
        let json = serde_json::to_value(&stats).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "language_counts": {"en": 100, "hi": 5},
                "underrepresented": ["hi"],
            })
        );
    }
}

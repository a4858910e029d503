//! # Filter & Window Builder
//!
//! Normalizes raw request parameters (trailing time windows, label filters,
//! pagination, limits, free-text search) into validated values the engine
//! consumes. Malformed or out-of-range numeric inputs silently fall back to
//! the endpoint's documented default; they never fail the request.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::model::Label;

/// Default page size for listing endpoints.
pub const DEFAULT_PER_PAGE: usize = 20;

/// A trailing time range anchored at "now" when the window is built.
///
/// Each sub-query of a composite operation builds its own window, so two
/// windows within one request may differ by a few milliseconds. Callers
/// must tolerate that skew.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn trailing(span: Duration) -> Self {
        let end = Utc::now();
        Self {
            start: end - span,
            end,
        }
    }

    pub fn last_hours(hours: i64) -> Self {
        Self::trailing(Duration::hours(hours))
    }

    pub fn last_days(days: i64) -> Self {
        Self::trailing(Duration::days(days))
    }

    /// A month is approximated as 30 trailing days.
    pub fn last_months(months: i64) -> Self {
        Self::trailing(Duration::days(months * 30))
    }

    /// Timestamp lies within `[start, end]`.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts <= self.end
    }

    /// Timestamp is no older than the window start. The monthly shapes
    /// only bound the past, matching the upstream queries.
    pub fn since(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start
    }
}

/// Validated pagination: `page >= 1`, `per_page > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: usize,
    pub per_page: usize,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageParams {
    /// Zero-based offset of the first row on this page.
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.per_page
    }
}

/// Positive integer parameter with a default. Missing, unparsable, or
/// non-positive values all fall back to `default`.
pub fn int_param(params: &HashMap<String, String>, key: &str, default: i64) -> i64 {
    match params.get(key).and_then(|v| v.trim().parse::<i64>().ok()) {
        Some(v) if v > 0 => v,
        _ => default,
    }
}

/// Optional entity-id parameter; unparsable values are treated as absent.
pub fn id_param<T: std::str::FromStr>(params: &HashMap<String, String>, key: &str) -> Option<T> {
    params.get(key).and_then(|v| v.trim().parse::<T>().ok())
}

/// Label filter: `fake` or `real` select that bucket; anything else
/// (including the unknown bucket) is treated as no filter.
pub fn label_param(params: &HashMap<String, String>) -> Option<Label> {
    match params
        .get("label")
        .map(|v| v.trim().to_ascii_lowercase())
        .as_deref()
    {
        Some("fake") => Some(Label::Fake),
        Some("real") => Some(Label::Real),
        _ => None,
    }
}

/// Pagination from `page` / `per_page`, clamped to valid ranges.
pub fn page_params(params: &HashMap<String, String>) -> PageParams {
    PageParams {
        page: int_param(params, "page", 1).max(1) as usize,
        per_page: int_param(params, "per_page", DEFAULT_PER_PAGE as i64).max(1) as usize,
    }
}

/// Free-text search term, lowercased for case-insensitive substring
/// matching. Blank values are treated as absent.
pub fn search_param(params: &HashMap<String, String>) -> Option<String> {
    params
        .get("search")
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn int_param_defaults_on_garbage() {
        let p = params(&[("days", "banana"), ("hours", "-3"), ("months", "0")]);
        assert_eq!(int_param(&p, "days", 30), 30);
        assert_eq!(int_param(&p, "hours", 24), 24);
        assert_eq!(int_param(&p, "months", 6), 6);
        assert_eq!(int_param(&p, "missing", 12), 12);
    }

    #[test]
    fn int_param_accepts_valid_values() {
        let p = params(&[("days", " 7 ")]);
        assert_eq!(int_param(&p, "days", 30), 7);
    }

    #[test]
    fn label_param_only_recognizes_fake_and_real() {
        assert_eq!(label_param(&params(&[("label", "fake")])), Some(Label::Fake));
        assert_eq!(label_param(&params(&[("label", "REAL")])), Some(Label::Real));
        assert_eq!(label_param(&params(&[("label", "satire")])), None);
        assert_eq!(label_param(&params(&[])), None);
    }

    #[test]
    fn page_params_clamp_to_valid_ranges() {
        let p = page_params(&params(&[("page", "0"), ("per_page", "-5")]));
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, DEFAULT_PER_PAGE);

        let p = page_params(&params(&[("page", "3"), ("per_page", "10")]));
        assert_eq!(p.offset(), 20);
    }

    #[test]
    fn window_contains_is_inclusive_and_anchored_at_now() {
        let w = Window::last_hours(24);
        assert!(w.contains(w.end));
        assert!(w.contains(w.start));
        assert!(!w.contains(w.start - Duration::seconds(1)));
        assert!(w.since(w.end + Duration::hours(1)));
    }

    #[test]
    fn search_param_lowercases_and_drops_blank() {
        assert_eq!(
            search_param(&params(&[("search", " Election ")])),
            Some("election".to_string())
        );
        assert_eq!(search_param(&params(&[("search", "  ")])), None);
    }
}

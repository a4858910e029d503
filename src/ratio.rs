//! # Ratio & Score Utilities
//!
//! Pure derived-metric formulas shared by every aggregation. All division
//! goes through [`safe_ratio`] / [`safe_avg`] so an empty denominator yields
//! `0.0`, never `NaN` or a panic. Absent sums are already `0` by the time
//! they reach these functions.

/// Percentage `numerator / denominator * 100`, or `0.0` when the
/// denominator is zero. Used for reliability scores, fake percentages,
/// and verified percentages.
pub fn safe_ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator > 0 {
        numerator as f64 / denominator as f64 * 100.0
    } else {
        0.0
    }
}

/// Plain average `numerator / denominator`, or `0.0` when the denominator
/// is zero. Used for per-user post rates and average repost counts.
pub fn safe_avg(numerator: u64, denominator: u64) -> f64 {
    if denominator > 0 {
        numerator as f64 / denominator as f64
    } else {
        0.0
    }
}

/// Fixed-weight engagement composite used to annotate viral-ranking rows.
///
/// The weights (reposts ×2, favorites ×1, posts ×0.5) are a frozen design
/// choice; rankings must stay reproducible across releases.
pub fn engagement_score(total_reposts: u64, total_favorites: u64, post_count: u64) -> f64 {
    total_reposts as f64 * 2.0 + total_favorites as f64 + post_count as f64 * 0.5
}

/// Saturating visual size for a network node: `reach / 1000` clamped to
/// `[10, 50]`.
pub fn node_size(reach: u64) -> f64 {
    (reach as f64 / 1000.0).clamp(10.0, 50.0)
}

/// Round to two decimal places for percentage-style response fields.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

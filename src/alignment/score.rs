//! Identity and coverage score of a partial alignment.
//!
//! Both are computed once when an [`Alignment`](super::Alignment) is built
//! and compared against run thresholds downstream, so the arithmetic must not
//! drift.

/// Alignment identity in `[.., 1.0]`.
///
/// `qspan`/`tspan` are the number of query/target positions the alignment
/// covers. Returns 0.0 for a degenerate span or when no bases were aligned.
pub fn calc_identity(
    qspan: i64,
    tspan: i64,
    qnuminsert: i64,
    mismatch: i64,
    num_bases_aligned: i64,
) -> f64 {
    let maxspan = qspan.min(tspan);
    if maxspan <= 0 || num_bases_aligned <= 0 {
        return 0.0;
    }

    let sizediff = (qspan - tspan).max(0);
    let sizediff_factor = (3.0 * (1.0 + sizediff as f64).ln()).round() as i64;

    let millibad = 1000.0 * (mismatch + qnuminsert + sizediff_factor) as f64 / num_bases_aligned as f64;
    (100.0 - millibad * 0.1) / 100.0
}

/// Percentage of the query covered by the alignment, truncated, never negative.
pub fn calc_score(matches: i64, qnuminsert: i64, tnuminsert: i64, query_len: i64) -> i64 {
    let aligned = matches + qnuminsert + tnuminsert;
    if aligned == 0 || query_len == 0 {
        return 0;
    }
    let coverage = 100.0 * aligned as f64 / query_len as f64;
    (coverage as i64).max(0)
}

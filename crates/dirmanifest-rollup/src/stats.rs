//! Order statistics over ascending-sorted size samples.

use dirmanifest_core::Percentiles;

/// Nearest-rank percentile of an ascending-sorted sample.
///
/// `rank = clamp(ceil(fraction * n), 1, n)`; the result is the
/// `rank`-th smallest sample. Returns `None` for an empty sample.
pub fn nearest_rank(sorted: &[u64], fraction: f64) -> Option<u64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let rank = (fraction * n as f64).ceil() as usize;
    let rank = rank.clamp(1, n);
    Some(sorted[rank - 1])
}

/// p50/p90/p99 of an ascending-sorted sample.
pub fn percentiles(sorted: &[u64]) -> Option<Percentiles> {
    Some(Percentiles {
        p50: nearest_rank(sorted, 0.50)?,
        p90: nearest_rank(sorted, 0.90)?,
        p99: nearest_rank(sorted, 0.99)?,
    })
}

/// Median of an ascending-sorted sample. Even-sized samples average the
/// two middle values, truncating. Returns 0 for an empty sample.
pub fn median(sorted: &[u64]) -> u64 {
    let n = sorted.len();
    if n == 0 {
        return 0;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        let (lo, hi) = (sorted[n / 2 - 1], sorted[n / 2]);
        // Written as lo + half the gap so large sizes cannot overflow
        lo + (hi - lo) / 2
    }
}

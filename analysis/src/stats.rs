use serde::{Deserialize, Serialize};

/// Rank statistics of one value channel over repeated trials (box chart data)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct YStats {
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub lower_quartile: f64,
    pub upper_quartile: f64,
}

/// Compute min, max, median and quartiles of `samples`
///
/// Quartiles use the exclusive median split: the lower quartile is the median
/// of the first `n / 2` sorted samples, the upper quartile the median of the
/// last `n / 2`, so the middle sample of an odd sized set belongs to neither.
/// A single sample is its own quartiles and an empty set is all zeros.
pub fn aggregate(samples: &[f64]) -> YStats {
    let mut sorted = samples.to_vec();
    // stable, duplicates kept
    sorted.sort_by(f64::total_cmp);

    let count = sorted.len();
    match count {
        0 => YStats::default(),
        1 => YStats {
            min: sorted[0],
            max: sorted[0],
            median: sorted[0],
            lower_quartile: sorted[0],
            upper_quartile: sorted[0],
        },
        _ => YStats {
            min: sorted[0],
            max: sorted[count - 1],
            median: median_of_sorted(&sorted),
            lower_quartile: median_of_sorted(&sorted[..count / 2]),
            upper_quartile: median_of_sorted(&sorted[count / 2 + count % 2..]),
        },
    }
}

/// middle element, or the mean of the two central ones; 0 for an empty slice
pub fn median_of_sorted(sorted: &[f64]) -> f64 {
    let count = sorted.len();

    if count == 0 {
        0.0
    } else if count % 2 == 1 {
        sorted[count / 2]
    } else {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    }
}

pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        0.0
    } else {
        samples.iter().sum::<f64>() / samples.len() as f64
    }
}

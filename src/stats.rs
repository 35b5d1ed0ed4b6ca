//! Small summary statistics shared by the delay reports.
//!
//! All functions return `None` for empty input rather than NaN.

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Sort a copy of `values` ascending. NaNs sort last.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}

/// Median that averages the two middle values for even-length input.
pub fn median(values: &[f64]) -> Option<f64> {
    let sorted = sorted(values);
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

/// Nearest-rank percentile over already sorted values: `sorted[floor(n * p)]`.
///
/// No interpolation; `p` is clamped so the index stays in bounds.
pub fn nearest_rank(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let index = (sorted.len() as f64 * p).floor() as usize;
    sorted.get(index.min(sorted.len() - 1)).copied()
}

/// Upper-middle element of already sorted values, `sorted[n / 2]`.
pub fn upper_median(sorted: &[f64]) -> Option<f64> {
    sorted.get(sorted.len() / 2).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_TO_TEN: [f64; 10] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];

    #[test]
    fn test_empty_input() {
        assert_eq!(mean(&[]), None);
        assert_eq!(median(&[]), None);
        assert_eq!(min(&[]), None);
        assert_eq!(max(&[]), None);
        assert_eq!(nearest_rank(&[], 0.9), None);
        assert_eq!(upper_median(&[]), None);
    }

    #[test]
    fn test_nearest_rank_is_not_interpolated() {
        assert_eq!(nearest_rank(&ONE_TO_TEN, 0.9), Some(10.0));
        assert_eq!(nearest_rank(&ONE_TO_TEN, 0.99), Some(10.0));
        assert_eq!(nearest_rank(&ONE_TO_TEN, 0.5), Some(6.0));
    }

    #[test]
    fn test_upper_median_even_length() {
        assert_eq!(upper_median(&ONE_TO_TEN), Some(6.0));
        assert_eq!(upper_median(&[1.0, 2.0, 3.0]), Some(2.0));
    }

    #[test]
    fn test_interpolated_median() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
    }

    #[test]
    fn test_mean_min_max() {
        let values = [2.0, -1.0, 5.0];
        assert_eq!(mean(&values), Some(2.0));
        assert_eq!(min(&values), Some(-1.0));
        assert_eq!(max(&values), Some(5.0));
    }
}

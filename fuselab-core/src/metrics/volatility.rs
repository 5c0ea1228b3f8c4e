//! Trailing rolling volatility.

/// Sample standard deviation over a strictly trailing window.
///
/// `out[t]` covers `values[t+1-window ..= t]` and is null until the
/// window is fully populated with non-null members. A window containing
/// any null yields null; a short-history prefix yields null. No element
/// after `t` is ever read.
///
/// Panics if `window < 2` (a sample deviation needs two observations).
pub fn rolling_volatility(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    assert!(window >= 2, "volatility window must be at least 2");

    let mut out = Vec::with_capacity(values.len());
    for t in 0..values.len() {
        if t + 1 < window {
            out.push(None);
            continue;
        }
        let slice = &values[t + 1 - window..=t];
        out.push(sample_stddev(slice));
    }
    out
}

fn sample_stddev(window: &[Option<f64>]) -> Option<f64> {
    let mut sum = 0.0;
    for v in window {
        sum += (*v)?;
    }
    let n = window.len() as f64;
    let mean = sum / n;
    let mut ss = 0.0;
    for v in window.iter().flatten() {
        let d = v - mean;
        ss += d * d;
    }
    Some((ss / (n - 1.0)).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_prefix_is_null() {
        let v = rolling_volatility(&[Some(0.01), Some(0.02), Some(0.03)], 3);
        assert_eq!(v[0], None);
        assert_eq!(v[1], None);
        assert!(v[2].is_some());
    }

    #[test]
    fn uses_sample_denominator() {
        // stddev of [1, 2, 3] with n-1 denominator is exactly 1.
        let v = rolling_volatility(&[Some(1.0), Some(2.0), Some(3.0)], 3);
        assert!((v[2].unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn any_null_in_window_nulls_the_result() {
        let v = rolling_volatility(&[Some(0.01), None, Some(0.03), Some(0.02)], 2);
        assert_eq!(&v[..3], &[None, None, None]);
        // For two points the sample stddev is |a - b| / sqrt(2).
        assert!((v[3].unwrap() - 0.01 / f64::sqrt(2.0)).abs() < 1e-12);
    }

    #[test]
    fn constant_window_has_zero_volatility() {
        let v = rolling_volatility(&[Some(0.01); 4], 3);
        assert_eq!(v[3], Some(0.0));
    }

    #[test]
    #[should_panic(expected = "window must be at least 2")]
    fn window_of_one_panics() {
        rolling_volatility(&[Some(1.0)], 1);
    }
}

//! Simple daily returns.

/// Day-over-day simple return: `r[t] = close[t] / close[t-1] - 1`.
///
/// The first element is always null. A return is null whenever either
/// operand is null or the previous close is zero. Output length equals
/// input length.
pub fn daily_returns(closes: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(closes.len());
    for (i, close) in closes.iter().enumerate() {
        let r = if i == 0 {
            None
        } else {
            match (closes[i - 1], close) {
                (Some(prev), Some(cur)) if prev != 0.0 => Some(cur / prev - 1.0),
                _ => None,
            }
        };
        out.push(r);
    }
    out
}

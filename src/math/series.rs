//! Differencing and integration of evenly spaced series.

/// Lag-`lag` difference: `out[i] = data[i + lag] - data[i]`.
///
/// The result is `lag` elements shorter than the input (empty if the input is
/// not longer than `lag`).
pub fn difference(data: &[f64], lag: usize) -> Vec<f64> {
    if lag == 0 {
        return data.to_vec();
    }
    data.windows(lag + 1).map(|w| w[lag] - w[0]).collect()
}

/// Apply the first difference `order` times.
pub fn difference_n(data: &[f64], order: usize) -> Vec<f64> {
    let mut result = data.to_vec();
    for _ in 0..order {
        result = difference(&result, 1);
    }
    result
}

/// Reverse `order` first differences for values that continue `history`.
///
/// `forecasts` are on the `order`-times differenced scale; the output is on
/// the scale of `history` and starts right after its last element.
pub fn undifference(history: &[f64], order: usize, forecasts: &[f64]) -> Vec<f64> {
    // Last observed value of each intermediate differencing level.
    let mut anchors = Vec::with_capacity(order);
    let mut level = history.to_vec();
    for _ in 0..order {
        anchors.push(level.last().copied().unwrap_or(0.0));
        level = difference(&level, 1);
    }

    let mut result = forecasts.to_vec();
    for anchor in anchors.into_iter().rev() {
        let mut acc = anchor;
        for v in result.iter_mut() {
            acc += *v;
            *v = acc;
        }
    }
    result
}

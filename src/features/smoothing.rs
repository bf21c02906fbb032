/// Trailing rolling mean over `window` samples.
///
/// Each output averages the non-missing values among the current sample and
/// the `window - 1` before it; the first samples use whatever history exists.
/// An output is `NaN` only when its whole window is missing.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            // Summed per window so long recordings accumulate no drift.
            let span = &values[(i + 1).saturating_sub(window)..=i];
            let (sum, count) = span
                .iter()
                .filter(|v| !v.is_nan())
                .fold((0.0, 0usize), |(sum, count), &v| (sum + v, count + 1));
            if count > 0 {
                sum / count as f64
            } else {
                f64::NAN
            }
        })
        .collect()
}

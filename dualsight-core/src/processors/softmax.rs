//! Numerically stable softmax.

/// Converts raw logits into probabilities.
///
/// The maximum finite logit is subtracted before exponentiating so large
/// logits cannot overflow. Accumulation is done in f64. Non-finite logits
/// contribute probability 0; if no logit is finite every probability is 0.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return vec![0.0; logits.len()];
    }

    let exps: Vec<f64> = logits
        .iter()
        .map(|&v| {
            if v.is_finite() {
                (f64::from(v) - f64::from(max)).exp()
            } else {
                0.0
            }
        })
        .collect();
    // The max element contributes exp(0) = 1, so the sum is at least 1.
    let sum: f64 = exps.iter().sum();

    exps.into_iter().map(|e| (e / sum) as f32).collect()
}

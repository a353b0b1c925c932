use super::stft;
use crate::config::AnalysisConfig;

/// Half-wave rectified log-magnitude flux, one value per analysis frame.
///
/// `novelty[t] = sum_k max(0, ln(1 + g|X_t,k|) - ln(1 + g|X_t-1,k|))`, with `novelty[0] = 0`.
pub fn spectral_novelty(signal: &[f32], conf: &AnalysisConfig) -> Vec<f32> {
  let mags = stft::magnitudes(signal, conf.frame_size, conf.hop);
  let compress = |row: &Vec<f32>| -> Vec<f32> { row.iter().map(|m| (1f32 + conf.gamma * m).ln()).collect() };

  let mut curve = Vec::with_capacity(mags.len());
  let mut previous: Option<Vec<f32>> = None;
  for row in &mags {
    let current = compress(row);
    let flux = match &previous {
      Some(prev) => current.iter().zip(prev.iter()).map(|(c, p)| (c - p).max(0f32)).sum(),
      None => 0f32,
    };
    curve.push(flux);
    previous = Some(current);
  }
  curve
}

/// Scale the curve so its maximum is 1. An all-zero curve is returned untouched.
pub fn normalize(curve: &mut [f32]) {
  let max = curve.iter().copied().fold(0f32, f32::max);
  if max > 0f32 {
    curve.iter_mut().for_each(|v| *v /= max);
  }
}

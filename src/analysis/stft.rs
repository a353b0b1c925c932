use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::synth::pi2;

/// Periodic Hann window of length `n`.
pub fn hann(n: usize) -> Vec<f32> {
  (0..n).map(|i| 0.5 - 0.5 * (pi2 * i as f32 / n as f32).cos()).collect()
}

/// Number of centered frames for a signal of `len` samples. A zero hop gives no frames.
pub fn frame_count(len: usize, hop: usize) -> usize {
  match hop {
    0 => 0,
    _ => 1 + len / hop,
  }
}

/// Magnitude spectrogram, one row of `frame_size / 2 + 1` bins per frame.
///
/// Frames are centered: the signal is zero padded by half a frame on both sides,
/// so frame `t` is centered on sample `t * hop`.
pub fn magnitudes(signal: &[f32], frame_size: usize, hop: usize) -> Vec<Vec<f32>> {
  if frame_size == 0 || hop == 0 {
    return Vec::new();
  }
  let window = hann(frame_size);
  let half = frame_size / 2;
  let n_bins = half + 1;

  let mut padded = vec![0f32; half];
  padded.extend_from_slice(signal);
  padded.resize(padded.len() + half, 0f32);

  let mut planner = FftPlanner::new();
  let fft = planner.plan_fft_forward(frame_size);
  let mut scratch = vec![Complex::new(0f32, 0f32); fft.get_inplace_scratch_len()];
  let mut frame = vec![Complex::new(0f32, 0f32); frame_size];

  (0..frame_count(signal.len(), hop))
    .map(|t| {
      let start = t * hop;
      for (i, slot) in frame.iter_mut().enumerate() {
        let x = padded.get(start + i).copied().unwrap_or(0f32);
        *slot = Complex::new(x * window[i], 0f32);
      }
      fft.process_with_scratch(&mut frame, &mut scratch);
      frame[..n_bins].iter().map(|c| c.norm()).collect()
    })
    .collect()
}

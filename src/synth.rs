/// Click primitives for the metronome renderer.
///
/// A click is a sine burst under an exponential envelope falling from 1 to 2^-10
/// over its length. Clicks are summed into a layer buffer at their onset sample.
use crate::time;
use crate::types::{ClickEvent, SampleBuffer};

pub const pi: f32 = std::f32::consts::PI;
pub const pi2: f32 = pi * 2f32;

/// Envelope floor reached on the last click sample, as a power of two.
const DECAY_OCTAVES: f32 = 10f32;

#[inline]
fn decay(i: usize, n: usize) -> f32 {
  if n < 2 {
    return 1f32;
  }
  2f32.powf(-DECAY_OCTAVES * i as f32 / (n - 1) as f32)
}

/// Render a single click of `freq` Hz lasting `dur` seconds.
pub fn click(sample_rate: u32, freq: f32, dur: f64) -> SampleBuffer {
  let n = (dur * sample_rate as f64).round() as usize;
  let w = pi2 * freq / sample_rate as f32;
  (0..n).map(|i| decay(i, n) * (w * i as f32).sin()).collect()
}

/// Mix `event` into `layer`, truncating anything past the end of the buffer.
pub fn add_click(layer: &mut SampleBuffer, sample_rate: u32, event: &ClickEvent) {
  let start = time::sample_at(sample_rate, event.time);
  if start >= layer.len() {
    return;
  }
  let samples = click(sample_rate, event.frequency, event.duration);
  layer[start..]
    .iter_mut()
    .zip(samples.iter())
    .for_each(|(out, s)| *out += event.amplitude * s);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_click_length_and_envelope() {
    let c = click(1000, 100.0, 0.2);
    assert_eq!(c.len(), 200);
    assert_eq!(c[0], 0.0);
    let peak_head = c[..20].iter().map(|s| s.abs()).fold(0f32, f32::max);
    let peak_tail = c[180..].iter().map(|s| s.abs()).fold(0f32, f32::max);
    assert!(peak_head > 0.5);
    assert!(peak_tail < 0.01);
  }

  #[test]
  fn test_add_click_truncates_at_buffer_end() {
    let mut layer = vec![0f32; 100];
    let event = ClickEvent { time: 0.09, frequency: 250.0, amplitude: 0.5, duration: 0.05 };
    add_click(&mut layer, 1000, &event);
    assert!(layer[..90].iter().all(|s| *s == 0.0));
    assert!(layer[90..].iter().any(|s| *s != 0.0));
  }

  #[test]
  fn test_add_click_past_end_is_ignored() {
    let mut layer = vec![0f32; 10];
    let event = ClickEvent { time: 1.0, frequency: 250.0, amplitude: 1.0, duration: 0.05 };
    add_click(&mut layer, 1000, &event);
    assert!(layer.iter().all(|s| *s == 0.0));
  }
}

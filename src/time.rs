use crate::types::Meter;

/// Index of the sample that contains time `t` seconds.
pub fn sample_at(sample_rate: u32, t: f64) -> usize {
  if t <= 0.0 {
    return 0;
  }
  (t * sample_rate as f64).floor() as usize
}

/// Number of samples needed to hold `dur` seconds of signal.
pub fn samples_of_dur(sample_rate: u32, dur: f64) -> usize {
  sample_at(sample_rate, dur)
}

/// Seconds of a frame index at reduced rate `sample_rate / hop`.
pub fn frame_time(sample_rate: u32, hop: usize, frame: usize) -> f64 {
  (frame * hop) as f64 / sample_rate as f64
}

/// Number of grid beats that start within the whole seconds of `duration`.
pub fn beats_in(duration: f64, meter: &Meter) -> usize {
  let whole = duration.floor();
  if whole <= 0.0 {
    return 0;
  }
  // k * step < whole, with slack for steps like 60/90 that do not divide exactly
  ((whole / meter.beat_step()) - GRID_EPSILON).ceil() as usize
}

const GRID_EPSILON: f64 = 1e-9;

/// Complete measures that fit in `duration` seconds.
pub fn measure_count(duration: f64, meter: &Meter) -> usize {
  let per_measure = meter.beats_per_measure() as usize;
  if per_measure == 0 {
    return 0;
  }
  beats_in(duration, meter) / per_measure
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::TimeSignature;

  #[test]
  fn test_measure_count_four_four() {
    let meter = Meter { bpm: 120, time_signature: TimeSignature::new(4, 4) };
    // 60 s at 0.5 s per beat is 120 beats, 30 measures
    assert_eq!(measure_count(60.0, &meter), 30);
    assert_eq!(measure_count(2.0, &meter), 1);
    assert_eq!(measure_count(0.5, &meter), 0);
  }

  #[test]
  fn test_beats_in_partial_step() {
    let meter = Meter { bpm: 90, time_signature: TimeSignature::new(4, 4) };
    // grid 0, 0.667, 1.333 lies below 2 s
    assert_eq!(beats_in(2.0, &meter), 3);
  }

  #[test]
  fn test_sample_at() {
    assert_eq!(sample_at(22050, 0.1), 2205);
    assert_eq!(sample_at(22050, -1.0), 0);
    assert_eq!(frame_time(16000, 160, 100), 1.0);
  }
}

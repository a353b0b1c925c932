pub mod engrave;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::SynthConfig;
use crate::error::SynthesisError;
use crate::synth;
use crate::time;
use crate::types::{AudioBuffer, ClickEvent, MeasureSchedule, Meter, SampleBuffer};

/// Shared flag for stopping a long render between measures.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
  pub fn new() -> Self {
    CancelToken::default()
  }

  pub fn cancel(&self) {
    self.0.store(true, Ordering::SeqCst);
  }

  pub fn is_cancelled(&self) -> bool {
    self.0.load(Ordering::SeqCst)
  }

  fn check(&self) -> Result<(), SynthesisError> {
    if self.is_cancelled() {
      return Err(SynthesisError::Cancelled);
    }
    Ok(())
  }
}

/// Clicks for one measure, split by the layer they mix into.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasureClicks {
  /// `x`: unaccented beats
  pub normal: Vec<ClickEvent>,
  /// `X`: strong beats and the downbeat overtones
  pub strong: Vec<ClickEvent>,
}

fn tone(time: f64, frequency: f32, amplitude: f32, duration: f64) -> ClickEvent {
  ClickEvent { time, frequency, amplitude, duration }
}

/// Lay out the clicks of measure `index` on the beat grid.
///
/// Times are relative to the end of the lead-in. Strong beats go to the strong layer,
/// suppressed beats are silent, everything else is a normal click. Beats outside
/// `1..=numerator` are ignored.
pub fn measure_clicks(
  index: usize, meter: &Meter, schedule: &MeasureSchedule, pitch: Option<f32>, conf: &SynthConfig,
) -> MeasureClicks {
  let step = meter.beat_step();
  let beats = meter.beats_per_measure() as usize;
  let base = pitch.unwrap_or(conf.default_click_hz);
  let mut clicks = MeasureClicks::default();
  let mut downbeat_marked = false;

  for beat in 1..=beats {
    let t = (index * beats + beat - 1) as f64 * step;
    let b = beat as u32;

    if schedule.strong_beats.contains(&b) {
      clicks.strong.push(tone(t, base, 0.3, 0.2));
      clicks.strong.push(tone(t, base * 0.5, 0.8, 0.2));
      if !downbeat_marked {
        downbeat_marked = true;
        if let Some(p) = pitch {
          let e = conf.emphasis;
          clicks.strong.push(tone(t, p * 3.0, e * 0.02, 2.0));
          clicks.strong.push(tone(t, p * 2.0, e * 0.04, 2.5));
          clicks.strong.push(tone(t, p, e * 0.08, 3.0));
        }
      }
    } else if schedule.suppress_beats.contains(&b) {
      continue;
    } else {
      match pitch {
        Some(p) => {
          clicks.normal.push(tone(t, p, 1.0, 1.0));
          clicks.normal.push(tone(t, p * 2.0, 0.3, 1.0));
        }
        None => clicks.normal.push(tone(t, base, 1.0, 0.2)),
      }
    }
  }
  clicks
}

fn validate(meter: &Meter, duration: f64, conf: &SynthConfig) -> Result<(), SynthesisError> {
  if meter.bpm == 0 {
    return Err(SynthesisError::InvalidBpm);
  }
  let denominator = meter.time_signature.denominator;
  if !denominator.is_power_of_two() {
    return Err(SynthesisError::InvalidDenominator(denominator));
  }
  if !(duration > 0.0) || !duration.is_finite() {
    return Err(SynthesisError::NonPositiveDuration(duration));
  }
  if conf.sample_rate == 0 {
    return Err(SynthesisError::InvalidSampleRate);
  }
  Ok(())
}

/// Render a click track of `duration` seconds from per-measure schedules.
///
/// Click layout runs per measure in parallel; mixing is sequential in measure order so
/// the same input always produces the same samples. The result is
/// `normal_gain * x + strong_gain * X` behind `lead_in` seconds of silence.
/// A cancelled render returns no audio at all.
pub fn metronome(
  meter: &Meter, schedules: &[MeasureSchedule], pitch: Option<f32>, duration: f64, conf: &SynthConfig,
  cancel: &CancelToken,
) -> Result<AudioBuffer, SynthesisError> {
  validate(meter, duration, conf)?;
  let sr = conf.sample_rate;
  let n = time::samples_of_dur(sr, duration);

  let layout: Vec<MeasureClicks> = schedules
    .par_iter()
    .enumerate()
    .map(|(index, schedule)| {
      cancel.check()?;
      Ok(measure_clicks(index, meter, schedule, pitch, conf))
    })
    .collect::<Result<_, SynthesisError>>()?;

  let mut x: SampleBuffer = vec![0f32; n];
  let mut big_x: SampleBuffer = vec![0f32; n];
  for clicks in &layout {
    cancel.check()?;
    clicks.normal.iter().for_each(|c| synth::add_click(&mut x, sr, c));
    clicks.strong.iter().for_each(|c| synth::add_click(&mut big_x, sr, c));
  }

  let lead = (conf.lead_in * sr as f64).round() as usize;
  let mut samples: SampleBuffer = vec![0f32; lead];
  samples.extend(x.iter().zip(big_x.iter()).map(|(a, b)| conf.normal_gain * a + conf.strong_gain * b));

  debug!(measures = schedules.len(), "click layout mixed");
  info!(samples = samples.len(), sample_rate = sr, "metronome rendered");
  Ok(AudioBuffer::new(samples, sr))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::{BeatSet, TimeSignature};

  fn meter() -> Meter {
    Meter { bpm: 120, time_signature: TimeSignature::new(4, 4) }
  }

  fn schedule(strong: &[u32], suppress: &[u32]) -> MeasureSchedule {
    MeasureSchedule::resolve(strong.iter().copied().collect(), suppress.iter().copied().collect())
  }

  #[test]
  fn test_measure_clicks_roles() {
    let conf = SynthConfig::default();
    let clicks = measure_clicks(1, &meter(), &schedule(&[1, 3], &[4]), Some(200.0), &conf);

    let normal_times: Vec<f64> = clicks.normal.iter().map(|c| c.time).collect();
    assert_eq!(normal_times, vec![2.5, 2.5]);

    // beat 1: two strong tones plus three overtones; beat 3: two strong tones
    assert_eq!(clicks.strong.len(), 7);
    assert!(clicks.strong[..5].iter().all(|c| c.time == 2.0));
    assert!(clicks.strong[5..].iter().all(|c| c.time == 3.0));
    assert_eq!(clicks.strong[1].frequency, 100.0);
    assert_eq!(clicks.strong[4].duration, 3.0);
    assert!((clicks.strong[4].amplitude - 0.32).abs() < 1e-6);
  }

  #[test]
  fn test_unpitched_clicks_skip_harmonics() {
    let conf = SynthConfig::default();
    let clicks = measure_clicks(0, &meter(), &schedule(&[1], &[]), None, &conf);
    assert_eq!(clicks.normal.len(), 3);
    assert!(clicks.normal.iter().all(|c| c.duration == 0.2 && c.frequency == conf.default_click_hz));
    assert_eq!(clicks.strong.len(), 2);
  }

  #[test]
  fn test_out_of_range_beats_ignored() {
    let conf = SynthConfig::default();
    let s = MeasureSchedule { strong_beats: BeatSet::from([1]), suppress_beats: BeatSet::from([9]) };
    let clicks = measure_clicks(0, &meter(), &s, Some(300.0), &conf);
    assert_eq!(clicks.normal.len(), 6);
  }

  #[test]
  fn test_empty_schedule_is_silence() {
    let conf = SynthConfig { sample_rate: 8000, ..SynthConfig::default() };
    let audio = metronome(&meter(), &[], Some(300.0), 2.0, &conf, &CancelToken::new()).unwrap();
    assert_eq!(audio.samples.len(), 800 + 16000);
    assert!(audio.samples.iter().all(|s| *s == 0.0));
  }

  #[test]
  fn test_lead_in_is_silent() {
    let conf = SynthConfig { sample_rate: 8000, ..SynthConfig::default() };
    let audio = metronome(&meter(), &[schedule(&[1], &[])], Some(300.0), 2.0, &conf, &CancelToken::new()).unwrap();
    assert!(audio.samples[..800].iter().all(|s| *s == 0.0));
    assert!(audio.samples[800..900].iter().any(|s| *s != 0.0));
  }

  #[test]
  fn test_precondition_errors() {
    let conf = SynthConfig::default();
    let cancel = CancelToken::new();
    let bad = Meter { bpm: 120, time_signature: TimeSignature::new(4, 3) };
    assert_eq!(metronome(&bad, &[], None, 1.0, &conf, &cancel), Err(SynthesisError::InvalidDenominator(3)));
    assert_eq!(metronome(&meter(), &[], None, 0.0, &conf, &cancel), Err(SynthesisError::NonPositiveDuration(0.0)));
    let zero = Meter { bpm: 0, ..meter() };
    assert_eq!(metronome(&zero, &[], None, 1.0, &conf, &cancel), Err(SynthesisError::InvalidBpm));
  }

  #[test]
  fn test_cancelled_render_returns_nothing() {
    let conf = SynthConfig::default();
    let cancel = CancelToken::new();
    cancel.cancel();
    let schedules = vec![schedule(&[1], &[]); 4];
    assert_eq!(metronome(&meter(), &schedules, None, 8.0, &conf, &cancel), Err(SynthesisError::Cancelled));
  }
}

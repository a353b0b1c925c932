//! Onset analysis: recorded claps in, timed clap events out.
//!
//! Audio is framed and windowed, turned into a log-magnitude flux curve, normalized
//! to a peak of 1, and peak-picked by prominence with a minimum spacing.
pub mod novelty;
pub mod stft;
pub mod transient;

use tracing::debug;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::time;
use crate::types::{AudioBuffer, ClapEvent};

/// Onset strength at the reduced rate `sample_rate / hop`.
#[derive(Debug, Clone, PartialEq)]
pub struct NoveltyCurve {
  pub values: Vec<f32>,
  pub sample_rate: u32,
  pub hop: usize,
}

impl NoveltyCurve {
  pub fn frame_rate(&self) -> f64 {
    self.sample_rate as f64 / self.hop as f64
  }

  pub fn time_of(&self, frame: usize) -> f64 {
    time::frame_time(self.sample_rate, self.hop, frame)
  }
}

fn validate(conf: &AnalysisConfig) -> Result<(), AnalysisError> {
  let field = if conf.frame_size == 0 {
    "frame_size"
  } else if conf.hop == 0 {
    "hop"
  } else if !(conf.gamma.is_finite() && conf.gamma >= 0.0) {
    "gamma"
  } else if !(conf.min_spacing.is_finite() && conf.min_spacing >= 0.0) {
    "min_spacing"
  } else {
    return Ok(());
  };
  Err(AnalysisError::InvalidConfig { field })
}

/// Build the normalized novelty curve for `audio`.
pub fn novelty_curve(audio: &AudioBuffer, conf: &AnalysisConfig) -> Result<NoveltyCurve, AnalysisError> {
  validate(conf)?;
  if audio.sample_rate == 0 {
    return Err(AnalysisError::InvalidSampleRate);
  }
  if audio.is_empty() {
    return Err(AnalysisError::EmptyInput);
  }

  let mut values = novelty::spectral_novelty(&audio.samples, conf);
  novelty::normalize(&mut values);
  debug!(frames = values.len(), hop = conf.hop, "novelty curve ready");

  Ok(NoveltyCurve { values, sample_rate: audio.sample_rate, hop: conf.hop })
}

/// Peak-pick a novelty curve into clap events ordered by time.
pub fn pick_claps(curve: &NoveltyCurve, conf: &AnalysisConfig) -> Vec<ClapEvent> {
  let min_distance = (conf.min_spacing * curve.frame_rate()).ceil().max(1.0) as usize;
  transient::pick_peaks(&curve.values, conf.min_prominence, min_distance)
    .into_iter()
    .map(|(frame, prominence)| ClapEvent { time: curve.time_of(frame), prominence })
    .collect()
}

/// Detect clap events in mono audio. Fewer than two claps cannot describe a meter.
pub fn detect_claps(audio: &AudioBuffer, conf: &AnalysisConfig) -> Result<Vec<ClapEvent>, AnalysisError> {
  let curve = novelty_curve(audio, conf)?;
  let claps = pick_claps(&curve, conf);
  debug!(found = claps.len(), "clap events picked");

  if claps.len() < 2 {
    return Err(AnalysisError::InsufficientEvents { found: claps.len() });
  }
  Ok(claps)
}

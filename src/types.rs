use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::error::PatternError;

/// Sample values in -1 to 1
pub type SampleBuffer = Vec<f32>;

/// A 1-based beat position within a measure.
pub type Beat = u32;

/// Ordered, duplicate free set of beat positions.
pub type BeatSet = BTreeSet<Beat>;

/// Mono audio and the rate it was captured at.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
  pub samples: SampleBuffer,
  pub sample_rate: u32,
}

impl AudioBuffer {
  pub fn new(samples: SampleBuffer, sample_rate: u32) -> Self {
    AudioBuffer { samples, sample_rate }
  }

  /// Downmix interleaved PCM by averaging channels, then peak-normalize into [-1, 1].
  /// A silent buffer is left as is.
  pub fn from_interleaved(samples: &[f32], channels: usize, sample_rate: u32) -> Self {
    let channels = channels.max(1);
    let mut mono: SampleBuffer = samples
      .chunks(channels)
      .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
      .collect();

    let peak = mono.iter().map(|s| s.abs()).fold(0f32, f32::max);
    if peak > 0f32 {
      mono.iter_mut().for_each(|s| *s /= peak);
    }
    AudioBuffer { samples: mono, sample_rate }
  }

  pub fn duration(&self) -> f64 {
    if self.sample_rate == 0 {
      return 0.0;
    }
    self.samples.len() as f64 / self.sample_rate as f64
  }

  pub fn is_empty(&self) -> bool {
    self.samples.is_empty()
  }
}

/// A detected clap: onset time in seconds and its peak prominence on the normalized novelty curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClapEvent {
  pub time: f64,
  pub prominence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeSignature {
  pub numerator: u32,
  pub denominator: u32,
}

impl TimeSignature {
  pub fn new(numerator: u32, denominator: u32) -> Self {
    TimeSignature { numerator, denominator }
  }
}

impl fmt::Display for TimeSignature {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.numerator, self.denominator)
  }
}

/// Tempo plus time signature; everything the beat grid needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Meter {
  pub bpm: u32,
  pub time_signature: TimeSignature,
}

impl Meter {
  /// Seconds between two grid beats.
  pub fn beat_step(&self) -> f64 {
    (60.0 / self.bpm as f64) * (4.0 / self.time_signature.denominator as f64)
  }

  pub fn beats_per_measure(&self) -> u32 {
    self.time_signature.numerator
  }
}

/// An accent pattern for one measure shape. Built once, then only read.
///
/// Strong and suppressed beats never overlap and all lie within `1..=numerator`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RhythmPattern {
  bpm: u32,
  time_signature: TimeSignature,
  strong_beats: BeatSet,
  suppress_beats: BeatSet,
}

impl RhythmPattern {
  pub fn new(
    bpm: u32, time_signature: TimeSignature, strong_beats: impl IntoIterator<Item = Beat>,
    suppress_beats: impl IntoIterator<Item = Beat>,
  ) -> Result<Self, PatternError> {
    if bpm == 0 {
      return Err(PatternError::ZeroBpm);
    }
    let TimeSignature { numerator, denominator } = time_signature;
    if numerator == 0 || denominator == 0 {
      return Err(PatternError::InvalidTimeSignature { numerator, denominator });
    }

    let strong_beats: BeatSet = strong_beats.into_iter().collect();
    let suppress_beats: BeatSet = suppress_beats.into_iter().collect();

    if let Some(&beat) = strong_beats.iter().chain(suppress_beats.iter()).find(|&&b| b == 0 || b > numerator) {
      return Err(PatternError::BeatOutOfRange { beat, numerator });
    }
    if let Some(&beat) = strong_beats.intersection(&suppress_beats).next() {
      return Err(PatternError::Overlap(beat));
    }

    Ok(RhythmPattern { bpm, time_signature, strong_beats, suppress_beats })
  }

  pub fn bpm(&self) -> u32 {
    self.bpm
  }

  pub fn time_signature(&self) -> TimeSignature {
    self.time_signature
  }

  pub fn meter(&self) -> Meter {
    Meter { bpm: self.bpm, time_signature: self.time_signature }
  }

  pub fn strong_beats(&self) -> &BeatSet {
    &self.strong_beats
  }

  pub fn suppress_beats(&self) -> &BeatSet {
    &self.suppress_beats
  }

  /// The first strong beat; never removed by variation.
  pub fn anchor(&self) -> Option<Beat> {
    self.strong_beats.iter().next().copied()
  }

  /// The pattern as a single measure schedule.
  pub fn schedule(&self) -> MeasureSchedule {
    MeasureSchedule::resolve(self.strong_beats.clone(), self.suppress_beats.clone())
  }
}

/// Strong and suppressed beats in force for one measure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeasureSchedule {
  pub strong_beats: BeatSet,
  pub suppress_beats: BeatSet,
}

impl MeasureSchedule {
  /// Suppression never wins over emphasis: anything strong is dropped from the suppress set.
  pub fn resolve(strong_beats: BeatSet, suppress_beats: BeatSet) -> Self {
    let suppress_beats = suppress_beats.difference(&strong_beats).copied().collect();
    MeasureSchedule { strong_beats, suppress_beats }
  }

  pub fn matches(&self, pattern: &RhythmPattern) -> bool {
    &self.strong_beats == pattern.strong_beats() && &self.suppress_beats == pattern.suppress_beats()
  }
}

/// One sine burst to be mixed into a layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickEvent {
  pub time: f64,
  pub frequency: f32,
  pub amplitude: f32,
  pub duration: f64,
}

/// Meter inference from clap events.
///
/// The shortest gap between claps is taken as one beat. Every other gap is
/// measured in beats, snapping to whole beats or, when it sits near a half, to
/// an eighth-note grid. The claps are then laid out on that grid to find which
/// beats were clapped, which were left out, and which were accented.
use std::collections::BTreeSet;

use itertools::Itertools;
use tracing::{debug, info};

use crate::config::InferenceConfig;
use crate::error::InferenceError;
use crate::types::{Beat, BeatSet, ClapEvent, RhythmPattern, TimeSignature};

/// Grid the clap gaps were snapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
  Quarter,
  Eighth,
}

impl Resolution {
  pub fn denominator(&self) -> u32 {
    match self {
      Resolution::Quarter => 4,
      Resolution::Eighth => 8,
    }
  }

  /// Grid cells per unit beat.
  fn cells(&self) -> u32 {
    match self {
      Resolution::Quarter => 1,
      Resolution::Eighth => 2,
    }
  }

  /// Grid cells spanned by a gap of `halves` half beats.
  fn grid_length(&self, halves: u32) -> u32 {
    match self {
      Resolution::Quarter => halves / 2,
      Resolution::Eighth => halves,
    }
  }
}

/// Scanner state while walking prominence deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccentState {
  Idle,
  Strong,
}

/// Per-clap outcome of the accent scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accent {
  /// This clap raised the strong flag.
  Rising,
  /// The flag stayed up from an earlier clap.
  Held,
  Weak,
}

fn intervals(claps: &[ClapEvent]) -> Vec<f64> {
  claps.iter().tuple_windows().map(|(a, b)| b.time - a.time).collect()
}

fn half_beats(units: f64, extra: u32, ratio: f64) -> Result<u32, InferenceError> {
  if !(units >= 0.0 && units <= u32::MAX as f64) {
    return Err(InferenceError::IntervalOutOfRange { ratio });
  }
  (units as u32)
    .checked_mul(2)
    .and_then(|h| h.checked_add(extra))
    .ok_or(InferenceError::IntervalOutOfRange { ratio })
}

/// Gap lengths in half beats, plus the grid they call for.
pub fn classify_intervals(
  gaps: &[f64], min_interval: f64, conf: &InferenceConfig,
) -> Result<(Vec<u32>, Resolution), InferenceError> {
  let mut resolution = Resolution::Quarter;
  let halves = gaps
    .iter()
    .map(|gap| {
      let ratio = gap / min_interval;
      let remainder = ratio.rem_euclid(1.0);
      if (remainder - 0.5).abs() < conf.half_unit_tolerance {
        resolution = Resolution::Eighth;
        half_beats(ratio.floor(), 1, ratio)
      } else {
        half_beats(ratio.round(), 0, ratio)
      }
    })
    .collect::<Result<Vec<u32>, _>>()?;
  Ok((halves, resolution))
}

/// Walk the prominences left to right, tracking whether we are inside an accent.
///
/// The first clap opens strong if its absolute prominence clears the seed threshold.
/// Afterwards a drop past `weak_delta` goes idle, a rise past `strong_delta` goes
/// strong, and anything in between keeps the current state.
///
/// Only [`Accent::Rising`] claps mark strong beats. A [`Accent::Held`] clap keeps the
/// state up without adding its own beat; counting held claps would turn an even run
/// of equally loud claps into strong beats 1, 2 and 3 instead of just the downbeat.
pub fn accent_scan(claps: &[ClapEvent], conf: &InferenceConfig) -> Vec<Accent> {
  let mut state = AccentState::Idle;
  let mut accents = Vec::with_capacity(claps.len());
  let mut previous: Option<f32> = None;

  for clap in claps {
    let accent = match previous {
      None if clap.prominence > conf.seed_threshold => {
        state = AccentState::Strong;
        Accent::Rising
      }
      None => Accent::Weak,
      Some(prev) => {
        let delta = clap.prominence - prev;
        if delta < conf.weak_delta {
          state = AccentState::Idle;
          Accent::Weak
        } else if delta > conf.strong_delta {
          state = AccentState::Strong;
          Accent::Rising
        } else {
          match state {
            AccentState::Strong => Accent::Held,
            AccentState::Idle => Accent::Weak,
          }
        }
      }
    };
    accents.push(accent);
    previous = Some(clap.prominence);
  }
  accents
}

/// Infer bpm, time signature, strong and suppressed beats from at least two claps.
pub fn infer_pattern(claps: &[ClapEvent], conf: &InferenceConfig) -> Result<RhythmPattern, InferenceError> {
  if claps.len() < 2 {
    return Err(InferenceError::TooFewEvents { found: claps.len() });
  }

  let gaps = intervals(claps);
  let min_interval = gaps.iter().copied().fold(f64::INFINITY, f64::min);
  if !(min_interval > 0.0) {
    return Err(InferenceError::DegenerateInterval { min_interval });
  }

  let bpm = (60.0 / min_interval).round();
  if !(bpm >= 1.0 && bpm <= u32::MAX as f64) {
    return Err(InferenceError::DegenerateInterval { min_interval });
  }
  let bpm = bpm as u32;

  let (halves, resolution) = classify_intervals(&gaps, min_interval, conf)?;
  let cells = resolution.cells();
  let lengths: Vec<u32> = halves.iter().map(|h| resolution.grid_length(*h)).collect();

  // the implicit leading unit beat closes the measure back onto beat 1
  let span: u64 = cells as u64 + lengths.iter().map(|l| *l as u64).sum::<u64>();
  if span > conf.max_numerator as u64 {
    return Err(InferenceError::MeasureTooLong { numerator: span, max: conf.max_numerator });
  }
  let numerator = span as u32;
  let time_signature = TimeSignature::new(numerator, resolution.denominator());

  let positions: Vec<Beat> = std::iter::once(0)
    .chain(lengths.iter().scan(0, |acc, len| {
      *acc += len;
      Some(*acc)
    }))
    .map(|offset| offset % numerator + 1)
    .collect();

  let accents = accent_scan(claps, conf);
  let strong_beats: BeatSet = positions
    .iter()
    .zip(accents.iter())
    .filter(|(_, accent)| **accent == Accent::Rising)
    .map(|(beat, _)| *beat)
    .filter(|beat| *beat != numerator)
    .collect();

  let clapped: BTreeSet<Beat> = positions.iter().copied().collect();
  let suppress_beats: BeatSet = (1..=numerator).filter(|b| !clapped.contains(b)).collect();

  debug!(?halves, ?resolution, ?positions, ?accents, "clap grid");
  info!(bpm, %time_signature, ?strong_beats, ?suppress_beats, "meter inferred");

  RhythmPattern::new(bpm, time_signature, strong_beats, suppress_beats).map_err(InferenceError::from)
}

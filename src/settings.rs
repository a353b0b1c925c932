/// Plain-text rhythm settings and preset cells.
///
/// The settings file is six newline separated fields:
///
/// ```text
/// 120
/// 4/4
/// 1,3
/// 4
/// C#
/// 3
/// ```
///
/// bpm, time signature, strong beats, suppressed beats, scale, duration in minutes.
/// An empty beat list is an empty line; `None` is accepted in its place.
///
/// A batch file holds one record per line with the same six fields separated by
/// whitespace, for example `120 4/4 1,3 4 C# 3`. Empty beat lists must be written `None`
/// there; blank lines are skipped.
use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use serde::Serialize;

use crate::error::SettingsError;
use crate::scale::Scale;
use crate::types::{BeatSet, RhythmPattern, TimeSignature};

pub const FIELD_COUNT: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
  pub pattern: RhythmPattern,
  pub scale: Scale,
  pub duration_minutes: f32,
}

impl Settings {
  pub fn duration_seconds(&self) -> f64 {
    self.duration_minutes as f64 * 60.0
  }
}

fn bad(field: &'static str, value: &str) -> SettingsError {
  SettingsError::BadField { field, value: value.to_string() }
}

pub fn parse_bpm(value: &str) -> Result<u32, SettingsError> {
  let v = value.trim();
  // preset sheets sometimes carry bpm as a float cell
  v.parse::<u32>()
    .or_else(|_| v.parse::<f64>().ok().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u32).ok_or(()))
    .map_err(|_| bad("bpm", value))
}

pub fn parse_time_signature(value: &str) -> Result<TimeSignature, SettingsError> {
  let (num, den) = value.trim().split_once('/').ok_or_else(|| bad("time_signature", value))?;
  let numerator = num.trim().parse().map_err(|_| bad("time_signature", value))?;
  let denominator = den.trim().parse().map_err(|_| bad("time_signature", value))?;
  Ok(TimeSignature::new(numerator, denominator))
}

pub fn parse_beats(field: &'static str, value: &str) -> Result<BeatSet, SettingsError> {
  let v = value.trim();
  if v.is_empty() || v.eq_ignore_ascii_case("none") {
    return Ok(BeatSet::new());
  }
  v.split(',')
    .map(|b| b.trim().parse::<u32>().map_err(|_| bad(field, value)))
    .collect()
}

pub fn format_beats(beats: &BeatSet) -> String {
  beats.iter().join(",")
}

pub fn parse_duration(value: &str) -> Result<f32, SettingsError> {
  value
    .trim()
    .parse::<f32>()
    .ok()
    .filter(|d| d.is_finite() && *d > 0.0)
    .ok_or_else(|| bad("duration", value))
}

/// The rhythm columns of one preset row, still as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetFields<'a> {
  pub bpm: &'a str,
  pub time_signature: &'a str,
  pub strong_beats: &'a str,
  pub suppress_beats: &'a str,
  pub scale: &'a str,
  pub duration: &'a str,
}

impl PresetFields<'_> {
  pub fn parse(&self) -> Result<Settings, SettingsError> {
    let pattern = RhythmPattern::new(
      parse_bpm(self.bpm)?,
      parse_time_signature(self.time_signature)?,
      parse_beats("strong_beats", self.strong_beats)?,
      parse_beats("suppress_beats", self.suppress_beats)?,
    )?;
    Ok(Settings { pattern, scale: self.scale.parse()?, duration_minutes: parse_duration(self.duration)? })
  }
}

impl Settings {
  /// Parse one whitespace separated batch record.
  pub fn from_record(line: &str) -> Result<Self, SettingsError> {
    let cells: Vec<&str> = line.split_whitespace().collect();
    if cells.len() != FIELD_COUNT {
      return Err(SettingsError::FieldCount { expected: FIELD_COUNT, found: cells.len() });
    }
    PresetFields {
      bpm: cells[0],
      time_signature: cells[1],
      strong_beats: cells[2],
      suppress_beats: cells[3],
      scale: cells[4],
      duration: cells[5],
    }
    .parse()
  }

  /// This value as a single batch record.
  pub fn to_record(&self) -> String {
    let list = |beats: &BeatSet| if beats.is_empty() { "None".to_string() } else { format_beats(beats) };
    let p = &self.pattern;
    format!(
      "{} {} {} {} {} {}",
      p.bpm(),
      p.time_signature(),
      list(p.strong_beats()),
      list(p.suppress_beats()),
      self.scale,
      self.duration_minutes
    )
  }
}

/// Parse a batch file. Errors carry the 1-based line of the offending record.
pub fn parse_batch(text: &str) -> Result<Vec<Settings>, SettingsError> {
  text
    .lines()
    .enumerate()
    .filter(|(_, line)| !line.trim().is_empty())
    .map(|(i, line)| {
      Settings::from_record(line).map_err(|e| SettingsError::Record { line: i + 1, source: Box::new(e) })
    })
    .collect()
}

impl FromStr for Settings {
  type Err = SettingsError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let lines: Vec<&str> = s.trim_end_matches(['\n', '\r']).split('\n').map(|l| l.trim_end_matches('\r')).collect();
    if lines.len() < FIELD_COUNT {
      return Err(SettingsError::FieldCount { expected: FIELD_COUNT, found: lines.len() });
    }
    PresetFields {
      bpm: lines[0],
      time_signature: lines[1],
      strong_beats: lines[2],
      suppress_beats: lines[3],
      scale: lines[4],
      duration: lines[5],
    }
    .parse()
  }
}

impl fmt::Display for Settings {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let p = &self.pattern;
    write!(
      f,
      "{}\n{}\n{}\n{}\n{}\n{}",
      p.bpm(),
      p.time_signature(),
      format_beats(p.strong_beats()),
      format_beats(p.suppress_beats()),
      self.scale,
      self.duration_minutes
    )
  }
}

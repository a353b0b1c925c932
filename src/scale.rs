/// Note names for the click pitch.
///
/// C through G# sound in octave 4, A through B in octave 3, so every scale lands
/// between A3 and G#4. `None` asks for the unpitched default click.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

static NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Scale {
  /// Pitch class, semitones above C
  Note(u8),
  #[default]
  Unpitched,
}

impl Scale {
  /// Frequency of the scale's note in Hz, or None for the default click.
  pub fn hz(&self) -> Option<f32> {
    match self {
      Scale::Note(pc) => {
        let octave: i32 = if *pc <= 8 { 4 } else { 3 };
        let midi = 12 * (octave + 1) + *pc as i32;
        Some(440f32 * 2f32.powf((midi - 69) as f32 / 12f32))
      }
      Scale::Unpitched => None,
    }
  }
}

impl FromStr for Scale {
  type Err = SettingsError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("none") {
      return Ok(Scale::Unpitched);
    }
    NAMES
      .iter()
      .position(|name| name.eq_ignore_ascii_case(s))
      .map(|pc| Scale::Note(pc as u8))
      .ok_or_else(|| SettingsError::UnknownScale(s.to_string()))
  }
}

impl fmt::Display for Scale {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Scale::Note(pc) => write!(f, "{}", NAMES[*pc as usize % 12]),
      Scale::Unpitched => write!(f, "None"),
    }
  }
}

#![allow(non_upper_case_globals)]
//! Clap rhythm in, varied metronome out.
//!
//! A recording of hand claps is reduced to clap events ([`analysis`]), the events to a
//! meter with strong and suppressed beats ([`inference`]), the meter to per-measure
//! variations ([`theka`]), and the variations to a click track ([`render`]).
pub mod analysis;
pub mod config;
pub mod error;
pub mod files;
pub mod inference;
pub mod reader;
pub mod render;
pub mod scale;
pub mod settings;
pub mod synth;
pub mod theka;
pub mod time;
pub mod types;

use rand::Rng;
use tracing::info;

pub use config::Config;
pub use error::{Error, Result};
pub use render::CancelToken;
pub use scale::Scale;
pub use settings::Settings;
pub use types::{AudioBuffer, ClapEvent, MeasureSchedule, RhythmPattern, TimeSignature};

/// What to render from a pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
  pub scale: Scale,
  /// Length of the click track in seconds, lead-in excluded
  pub duration: f64,
  pub temperature: f32,
}

impl RenderRequest {
  pub fn from_settings(settings: &Settings, temperature: f32) -> Self {
    RenderRequest { scale: settings.scale, duration: settings.duration_seconds(), temperature }
  }
}

/// Detect claps in `audio` and infer the pattern they describe.
pub fn infer_from_audio(audio: &AudioBuffer, conf: &Config) -> Result<RhythmPattern> {
  let claps = analysis::detect_claps(audio, &conf.analysis)?;
  Ok(inference::infer_pattern(&claps, &conf.inference)?)
}

/// Vary `pattern` over as many whole measures as fit and synthesize the click track.
pub fn render<R: Rng + ?Sized>(
  pattern: &RhythmPattern, request: &RenderRequest, conf: &Config, rng: &mut R, cancel: &CancelToken,
) -> Result<AudioBuffer> {
  let meter = pattern.meter();
  let measures = time::measure_count(request.duration, &meter);
  info!(measures, temperature = request.temperature, scale = %request.scale, "rendering");

  let schedules = theka::vary(pattern, request.temperature, measures, &conf.variation, rng)?;
  let audio = render::metronome(&meter, &schedules, request.scale.hz(), request.duration, &conf.synth, cancel)?;
  Ok(audio)
}

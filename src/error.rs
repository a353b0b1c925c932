use thiserror::Error;

/// Failures of the onset/novelty stage.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
  #[error("audio buffer holds no samples")]
  EmptyInput,
  #[error("sample rate must be positive")]
  InvalidSampleRate,
  #[error("found {found} clap event(s), at least 2 are needed")]
  InsufficientEvents { found: usize },
  #[error("analysis setting `{field}` is out of range")]
  InvalidConfig { field: &'static str },
}

/// Failures while turning clap events into a meter.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InferenceError {
  #[error("need at least 2 clap events, got {found}")]
  TooFewEvents { found: usize },
  #[error("minimum inter-clap interval {min_interval}s gives no usable tempo")]
  DegenerateInterval { min_interval: f64 },
  #[error("a gap of {ratio} beats does not fit on the beat grid")]
  IntervalOutOfRange { ratio: f64 },
  #[error("claps span {numerator} beats, more than the {max} a measure may hold")]
  MeasureTooLong { numerator: u64, max: u32 },
  #[error(transparent)]
  Pattern(#[from] PatternError),
}

/// A rhythm pattern that breaks its own invariants.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatternError {
  #[error("bpm must be positive")]
  ZeroBpm,
  #[error("time signature {numerator}/{denominator} is not usable")]
  InvalidTimeSignature { numerator: u32, denominator: u32 },
  #[error("beat {beat} lies outside 1..={numerator}")]
  BeatOutOfRange { beat: u32, numerator: u32 },
  #[error("beat {0} is both strong and suppressed")]
  Overlap(u32),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum VariationError {
  #[error("temperature {0} outside [0, 1]")]
  InvalidTemperature(f32),
  #[error("variant lost the anchor beat {anchor}")]
  PoolExhausted { anchor: u32 },
  #[error(transparent)]
  InvalidPattern(#[from] PatternError),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SynthesisError {
  #[error("time signature denominator {0} is not a positive power of two")]
  InvalidDenominator(u32),
  #[error("duration {0}s must be positive")]
  NonPositiveDuration(f64),
  #[error("bpm must be positive")]
  InvalidBpm,
  #[error("sample rate must be positive")]
  InvalidSampleRate,
  #[error("render cancelled")]
  Cancelled,
}

/// Problems reading the settings interchange text or preset cells.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SettingsError {
  #[error("expected {expected} fields, found {found}")]
  FieldCount { expected: usize, found: usize },
  #[error("field `{field}`: cannot parse `{value}`")]
  BadField { field: &'static str, value: String },
  #[error("unknown scale `{0}`")]
  UnknownScale(String),
  #[error("record {line}: {source}")]
  Record { line: usize, source: Box<SettingsError> },
  #[error(transparent)]
  Pattern(#[from] PatternError),
}

/// Any failure of the clap-to-click pipeline, tagged with the stage that raised it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
  #[error("analysis: {0}")]
  Analysis(#[from] AnalysisError),
  #[error("inference: {0}")]
  Inference(#[from] InferenceError),
  #[error("variation: {0}")]
  Variation(#[from] VariationError),
  #[error("synthesis: {0}")]
  Synthesis(#[from] SynthesisError),
  #[error("settings: {0}")]
  Settings(#[from] SettingsError),
}

pub type Result<T> = std::result::Result<T, Error>;

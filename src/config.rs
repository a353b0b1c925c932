/// Tunables for every stage of the clap-to-click pipeline.
///
/// The whole value is handed to the pipeline by reference; each stage reads only its own section.
/// Every field has a default, so a partial JSON file is a valid config.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  pub analysis: AnalysisConfig,
  pub inference: InferenceConfig,
  pub variation: VariationConfig,
  pub synth: SynthConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
  /// FFT frame length in samples
  pub frame_size: usize,
  /// Distance between frame starts in samples
  pub hop: usize,
  /// Log compression factor in ln(1 + gamma |X|)
  pub gamma: f32,
  /// Minimum peak prominence on the normalized novelty curve
  pub min_prominence: f32,
  /// Minimum spacing between accepted events, seconds
  pub min_spacing: f64,
}

impl Default for AnalysisConfig {
  fn default() -> Self {
    AnalysisConfig { frame_size: 512, hop: 160, gamma: 10.0, min_prominence: 0.1, min_spacing: 0.05 }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
  /// How close `ratio mod 1` must be to 0.5 to count as a half-unit beat
  pub half_unit_tolerance: f64,
  /// Absolute prominence the first clap needs to open in the strong state
  pub seed_threshold: f32,
  /// A prominence drop below this leaves the strong state
  pub weak_delta: f32,
  /// A prominence rise above this enters the strong state
  pub strong_delta: f32,
  /// Longest measure, in grid beats, the claps may describe
  pub max_numerator: u32,
}

impl Default for InferenceConfig {
  fn default() -> Self {
    InferenceConfig {
      half_unit_tolerance: 0.15,
      seed_threshold: 0.4,
      weak_delta: -0.1,
      strong_delta: 0.1,
      max_numerator: 128,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariationConfig {
  pub max_pool_size: usize,
  /// Consecutive duplicate candidates tolerated before a role stops generating
  pub max_duplicates: usize,
  /// Highest beat a suppress-role insertion may produce
  pub suppress_ceiling: u32,
}

impl Default for VariationConfig {
  fn default() -> Self {
    VariationConfig { max_pool_size: 50, max_duplicates: 100, suppress_ceiling: 10 }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
  pub sample_rate: u32,
  /// Silence placed before the first beat, seconds
  pub lead_in: f64,
  /// Gain on the overtones marking the first strong beat of a measure
  pub emphasis: f32,
  pub normal_gain: f32,
  pub strong_gain: f32,
  /// Frequency used when no pitch is requested
  pub default_click_hz: f32,
}

impl Default for SynthConfig {
  fn default() -> Self {
    SynthConfig {
      sample_rate: 22050,
      lead_in: 0.1,
      emphasis: 4.0,
      normal_gain: 0.3,
      strong_gain: 0.6,
      default_click_hz: 277.182_63,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_partial_json_uses_defaults() {
    let cfg: Config = serde_json::from_str(r#"{ "synth": { "sample_rate": 44100 } }"#).unwrap();
    assert_eq!(cfg.synth.sample_rate, 44100);
    assert_eq!(cfg.synth.lead_in, 0.1);
    assert_eq!(cfg.analysis, AnalysisConfig::default());
    assert_eq!(cfg.variation.max_pool_size, 50);
  }
}

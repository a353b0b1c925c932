//! Rhythmic variation ("theka") of a base accent pattern.
//!
//! Two pools of variants are grown from the base pattern, one for strong beats and
//! one for suppressed beats. A per-measure walk then decides which variant is in
//! force: every `numerator`th measure returns to the base pattern, and between
//! those the walk either holds the base or enters a run of `numerator` measures
//! that drift through the similarity-ranked pools.
pub mod edit;
pub mod pool;
pub mod sequencer;

use rand::Rng;
use tracing::{debug, info};

use crate::config::VariationConfig;
use crate::error::VariationError;
use crate::types::{MeasureSchedule, RhythmPattern};
use edit::EditRules;
use pool::{Role, ThekaPool};
use sequencer::VariationState;

/// Variant pools for both roles, bound to the pattern they were grown from.
#[derive(Debug, Clone)]
pub struct Thekas {
  base: RhythmPattern,
  temperature: f32,
  strong: ThekaPool,
  suppress: ThekaPool,
}

/// Number of pool members aimed for at `temperature`, the original included.
pub fn target_size(temperature: f32, max_pool_size: usize) -> usize {
  let target = (max_pool_size as f64 * temperature as f64).round() as usize;
  target.clamp(1, max_pool_size.max(1))
}

impl Thekas {
  /// Grow both pools. At temperature 0 each pool holds only the original set.
  pub fn generate<R: Rng + ?Sized>(
    base: &RhythmPattern, temperature: f32, conf: &VariationConfig, rng: &mut R,
  ) -> Result<Self, VariationError> {
    if !(0.0..=1.0).contains(&temperature) {
      return Err(VariationError::InvalidTemperature(temperature));
    }

    let anchor = base.anchor();
    let capacity = conf.max_pool_size;
    let mut strong = ThekaPool::new(Role::Strong, base.strong_beats().clone(), anchor, capacity);
    let mut suppress = ThekaPool::new(Role::Suppress, base.suppress_beats().clone(), None, capacity);

    if temperature > 0.0 {
      let target = target_size(temperature, capacity);
      let strong_rules = EditRules { role: Role::Strong, anchor, ceiling: base.time_signature().numerator };
      let suppress_rules = EditRules { role: Role::Suppress, anchor: None, ceiling: conf.suppress_ceiling };
      edit::fill(&mut strong, &strong_rules, target, conf.max_duplicates, rng)?;
      edit::fill(&mut suppress, &suppress_rules, target, conf.max_duplicates, rng)?;
    }
    info!(temperature, strong = strong.len(), suppress = suppress.len(), "theka pools grown");

    Ok(Thekas { base: base.clone(), temperature, strong, suppress })
  }

  pub fn base(&self) -> &RhythmPattern {
    &self.base
  }

  pub fn temperature(&self) -> f32 {
    self.temperature
  }

  pub fn strong(&self) -> &ThekaPool {
    &self.strong
  }

  pub fn suppress(&self) -> &ThekaPool {
    &self.suppress
  }

  fn resolve(&self, state: &VariationState) -> MeasureSchedule {
    let strong = self.strong.get(state.current_strong).unwrap_or(self.strong.original());
    let suppress = self.suppress.get(state.current_suppress).unwrap_or(self.suppress.original());
    MeasureSchedule::resolve(strong.clone(), suppress.clone())
  }

  /// Resolve measure `index` from the walk state left by the previous measure.
  pub fn step<R: Rng + ?Sized>(
    &self, index: usize, state: VariationState, rng: &mut R,
  ) -> (MeasureSchedule, VariationState) {
    let numerator = self.base.time_signature().numerator as usize;
    if index % numerator == 0 {
      return (self.base.schedule(), state.at_original());
    }

    let mut state = state;
    if !state.in_run() {
      let draw = sequencer::draw_run(self.temperature, rng);
      if !draw.enters_run() {
        return (self.base.schedule(), state.at_original());
      }
      debug!(measure = index, ?draw, "variation run entered");
      state.remaining = numerator as u32;
    }

    state.current_strong = sequencer::transition(&self.strong, state.current_strong, rng);
    state.current_suppress = sequencer::transition(&self.suppress, state.current_suppress, rng);
    state.remaining -= 1;

    let schedule = self.resolve(&state);
    if !state.in_run() {
      state = state.at_original();
    }
    (schedule, state)
  }

  /// Schedules for `measures` consecutive measures.
  pub fn schedules<R: Rng + ?Sized>(&self, measures: usize, rng: &mut R) -> Vec<MeasureSchedule> {
    if self.temperature == 0.0 {
      return vec![self.base.schedule(); measures];
    }

    let mut state = VariationState::default();
    (0..measures)
      .map(|index| {
        let (schedule, next) = self.step(index, state, rng);
        state = next;
        schedule
      })
      .collect()
  }
}

/// Grow pools for `base` and resolve `measures` measures in one call.
pub fn vary<R: Rng + ?Sized>(
  base: &RhythmPattern, temperature: f32, measures: usize, conf: &VariationConfig, rng: &mut R,
) -> Result<Vec<MeasureSchedule>, VariationError> {
  let thekas = Thekas::generate(base, temperature, conf, rng)?;
  Ok(thekas.schedules(measures, rng))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::TimeSignature;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn pattern() -> RhythmPattern {
    RhythmPattern::new(90, TimeSignature::new(4, 4), [1, 3], [4]).unwrap()
  }

  #[test]
  fn test_target_size() {
    assert_eq!(target_size(0.5, 50), 25);
    assert_eq!(target_size(0.001, 50), 1);
    assert_eq!(target_size(1.0, 50), 50);
  }

  #[test]
  fn test_rejects_bad_temperature() {
    let mut rng = StdRng::seed_from_u64(0);
    let conf = VariationConfig::default();
    for t in [-0.1, 1.5, f32::NAN] {
      assert!(matches!(
        Thekas::generate(&pattern(), t, &conf, &mut rng),
        Err(VariationError::InvalidTemperature(_))
      ));
    }
  }

  #[test]
  fn test_zero_temperature_pools_hold_original_only() {
    let mut rng = StdRng::seed_from_u64(0);
    let thekas = Thekas::generate(&pattern(), 0.0, &VariationConfig::default(), &mut rng).unwrap();
    assert_eq!(thekas.strong().len(), 1);
    assert_eq!(thekas.suppress().len(), 1);
  }

  #[test]
  fn test_tonic_measures_use_base() {
    let mut rng = StdRng::seed_from_u64(21);
    let base = RhythmPattern::new(120, TimeSignature::new(6, 8), [1, 2, 4], [3, 5]).unwrap();
    let schedules = vary(&base, 1.0, 60, &VariationConfig::default(), &mut rng).unwrap();
    for (i, s) in schedules.iter().enumerate() {
      if i % 6 == 0 {
        assert!(s.matches(&base), "measure {} strayed", i);
      }
    }
  }

  #[test]
  fn test_step_holds_state_explicitly() {
    let mut rng = StdRng::seed_from_u64(2);
    let thekas = Thekas::generate(&pattern(), 1.0, &VariationConfig::default(), &mut rng).unwrap();
    let (schedule, state) = thekas.step(1, VariationState::default(), &mut rng);
    // at temperature 1 the walk always enters a run
    assert_eq!(state.remaining, 3);
    assert!(schedule.strong_beats.is_disjoint(&schedule.suppress_beats));
    let (schedule, after_tonic) = thekas.step(4, state, &mut rng);
    assert!(schedule.matches(&pattern()));
    assert_eq!(after_tonic.remaining, 3);
    assert_eq!(after_tonic.current_strong, 0);
  }

  #[test]
  fn test_run_ends_back_on_original() {
    let mut rng = StdRng::seed_from_u64(8);
    let thekas = Thekas::generate(&pattern(), 1.0, &VariationConfig::default(), &mut rng).unwrap();
    let mut state = VariationState::default();
    for index in [1, 2, 3] {
      state = thekas.step(index, state, &mut rng).1;
    }
    assert_eq!(state.remaining, 1);
    // the tonic measure does not count toward the run
    state = thekas.step(4, state, &mut rng).1;
    assert_eq!(state.remaining, 1);
    state = thekas.step(5, state, &mut rng).1;
    assert_eq!(state, VariationState::default());
  }

  #[test]
  fn test_same_seed_same_schedules() {
    let conf = VariationConfig::default();
    let a = vary(&pattern(), 0.7, 40, &conf, &mut StdRng::seed_from_u64(99)).unwrap();
    let b = vary(&pattern(), 0.7, 40, &conf, &mut StdRng::seed_from_u64(99)).unwrap();
    assert_eq!(a, b);
  }
}

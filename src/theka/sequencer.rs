use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use super::pool::ThekaPool;

/// Where the measure-to-measure walk stands. Threaded by value from one measure to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VariationState {
  /// Rank of the strong variant in force
  pub current_strong: usize,
  /// Rank of the suppress variant in force
  pub current_suppress: usize,
  /// Measures left in the active run; 0 when no run is active
  pub remaining: u32,
}

impl VariationState {
  pub fn in_run(&self) -> bool {
    self.remaining > 0
  }

  /// Back on the original pattern, run bookkeeping untouched.
  pub fn at_original(self) -> Self {
    VariationState { current_strong: 0, current_suppress: 0, ..self }
  }
}

/// Outcome of the draw made when no run is active.
///
/// Two of the three branches behave the same; both are kept so the draw has the
/// same distribution over outcomes as the three-way choice it models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunDraw {
  Enter,
  EnterAlt,
  Hold,
}

impl RunDraw {
  pub fn enters_run(&self) -> bool {
    matches!(self, RunDraw::Enter | RunDraw::EnterAlt)
  }
}

/// Draw among enter/enter/hold with weights `[(1-m)/2, (1-m)/2, m]`, `m = 1 - temperature`.
pub fn draw_run<R: Rng + ?Sized>(temperature: f32, rng: &mut R) -> RunDraw {
  let hold = (1.0 - temperature as f64).clamp(0.0, 1.0);
  let enter = (1.0 - hold) / 2.0;
  let outcomes = [RunDraw::Enter, RunDraw::EnterAlt, RunDraw::Hold];
  match WeightedIndex::new([enter, enter, hold]) {
    Ok(dist) => outcomes[dist.sample(rng)],
    Err(_) => RunDraw::Hold,
  }
}

/// Transition weights from rank `current` across a pool of `len` members.
///
/// Staying weighs 0.5; moving `d` ranks away weighs `max(0.1, 0.5 - 0.1 d)`.
pub fn transition_weights(len: usize, current: usize) -> Vec<f64> {
  (0..len)
    .map(|i| {
      if i == current {
        0.5
      } else {
        let distance = (i as f64 - current as f64).abs();
        (0.5 - 0.1 * distance).max(0.1)
      }
    })
    .collect()
}

/// Sample the next rank in `pool` from `current`.
pub fn transition<R: Rng + ?Sized>(pool: &ThekaPool, current: usize, rng: &mut R) -> usize {
  if pool.len() < 2 {
    return 0;
  }
  match WeightedIndex::new(transition_weights(pool.len(), current)) {
    Ok(dist) => dist.sample(rng),
    Err(_) => current,
  }
}

use rand::seq::SliceRandom;
use rand::Rng;

use super::pool::{Role, Theka, ThekaPool};
use crate::error::VariationError;
use crate::types::Beat;

/// What a role's candidates may and may not do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditRules {
  pub role: Role,
  /// Never deleted from a strong-role candidate
  pub anchor: Option<Beat>,
  /// Highest beat an insertion may produce
  pub ceiling: Beat,
}

impl EditRules {
  fn deletable(&self, beat: Beat) -> bool {
    !(self.role == Role::Strong && Some(beat) == self.anchor)
  }
}

/// Derive one candidate from `base` by up to `|base| / 2` random edits.
///
/// Each edit flips a coin: delete a random beat (the anchor is off limits), or take a
/// random beat, step it forward by 1 or 2, and keep it if it lands within `1..=ceiling`.
pub fn propose<R: Rng + ?Sized>(base: &Theka, rules: &EditRules, rng: &mut R) -> Theka {
  let edits = rng.gen_range(0..=base.len() / 2);
  let mut beats: Vec<Beat> = base.iter().copied().collect();

  for _ in 0..edits {
    if rng.gen_bool(0.5) {
      let candidates: Vec<usize> = (0..beats.len()).filter(|&i| rules.deletable(beats[i])).collect();
      if let Some(&i) = candidates.choose(rng) {
        beats.remove(i);
      }
    } else if let Some(&from) = beats.choose(rng) {
      let beat = from + rng.gen_range(1..=2);
      if (1..=rules.ceiling).contains(&beat) {
        beats.push(beat);
      }
    }
  }
  beats.into_iter().collect()
}

/// Grow `pool` toward `target` members with proposals derived from its original.
///
/// Generation stops at the target, when the pool is full, or after `max_duplicates`
/// proposals in a row that the pool already held.
pub fn fill<R: Rng + ?Sized>(
  pool: &mut ThekaPool, rules: &EditRules, target: usize, max_duplicates: usize, rng: &mut R,
) -> Result<(), VariationError> {
  let base = pool.original().clone();
  let mut duplicates = 0;
  while pool.len() < target && !pool.is_full() && duplicates < max_duplicates {
    let candidate = propose(&base, rules, rng);
    if pool.try_insert(candidate)? {
      duplicates = 0;
    } else {
      duplicates += 1;
    }
  }
  Ok(())
}

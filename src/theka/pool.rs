use std::collections::HashMap;

use crate::error::VariationError;
use crate::types::{Beat, BeatSet};

/// One candidate beat set for a single role.
pub type Theka = BeatSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
  Strong,
  Suppress,
}

/// Binary membership vector over beat numbers, packed into words.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Indicator(Vec<u64>);

impl Indicator {
  fn of(theka: &Theka) -> Self {
    let words = theka.iter().next_back().map_or(0, |&max| max as usize / 64 + 1);
    let mut bits = vec![0u64; words];
    for &beat in theka {
      bits[beat as usize / 64] |= 1u64 << (beat % 64);
    }
    Indicator(bits)
  }

  fn word(&self, i: usize) -> u64 {
    self.0.get(i).copied().unwrap_or(0)
  }

  /// Jaccard similarity. Two empty sets are identical.
  fn jaccard(&self, other: &Indicator) -> f64 {
    let words = self.0.len().max(other.0.len());
    let (mut inter, mut union) = (0u32, 0u32);
    for i in 0..words {
      let (a, b) = (self.word(i), other.word(i));
      inter += (a & b).count_ones();
      union += (a | b).count_ones();
    }
    if union == 0 {
      return 1.0;
    }
    inter as f64 / union as f64
  }
}

#[derive(Debug, Clone)]
struct Entry {
  theka: Theka,
  indicator: Indicator,
}

/// Similarity ranked variants of one role.
///
/// Members live in an arena in insertion order; `order` holds the ranking. Arena slot 0
/// is the original set and always ranks first. The rest are ordered by descending mean
/// Jaccard similarity to every other member, ties falling back to insertion order.
/// Pairwise similarities are cached as members arrive.
#[derive(Debug, Clone)]
pub struct ThekaPool {
  role: Role,
  anchor: Option<Beat>,
  capacity: usize,
  arena: Vec<Entry>,
  index: HashMap<Theka, usize>,
  similarity: Vec<Vec<f64>>,
  order: Vec<usize>,
}

impl ThekaPool {
  pub fn new(role: Role, original: Theka, anchor: Option<Beat>, capacity: usize) -> Self {
    let indicator = Indicator::of(&original);
    let self_sim = indicator.jaccard(&indicator);
    let mut index = HashMap::new();
    index.insert(original.clone(), 0);
    ThekaPool {
      role,
      anchor,
      capacity: capacity.max(1),
      arena: vec![Entry { theka: original, indicator }],
      index,
      similarity: vec![vec![self_sim]],
      order: vec![0],
    }
  }

  pub fn role(&self) -> Role {
    self.role
  }

  pub fn anchor(&self) -> Option<Beat> {
    self.anchor
  }

  pub fn len(&self) -> usize {
    self.arena.len()
  }

  pub fn is_empty(&self) -> bool {
    self.arena.is_empty()
  }

  pub fn is_full(&self) -> bool {
    self.arena.len() >= self.capacity
  }

  pub fn original(&self) -> &Theka {
    &self.arena[0].theka
  }

  /// Member at `rank` in the current ordering.
  pub fn get(&self, rank: usize) -> Option<&Theka> {
    self.order.get(rank).map(|&id| &self.arena[id].theka)
  }

  pub fn iter(&self) -> impl Iterator<Item = &Theka> + '_ {
    self.order.iter().map(move |&id| &self.arena[id].theka)
  }

  pub fn contains(&self, theka: &Theka) -> bool {
    self.index.contains_key(theka)
  }

  /// Rank of `theka`, if pooled.
  pub fn position(&self, theka: &Theka) -> Option<usize> {
    let id = *self.index.get(theka)?;
    self.order.iter().position(|&o| o == id)
  }

  /// Add a candidate. Returns false for duplicates or when the pool is full.
  ///
  /// A strong-role candidate without the anchor beat is an error rather than a reject.
  pub fn try_insert(&mut self, candidate: Theka) -> Result<bool, VariationError> {
    if let (Role::Strong, Some(anchor)) = (self.role, self.anchor) {
      if !candidate.contains(&anchor) {
        return Err(VariationError::PoolExhausted { anchor });
      }
    }
    if self.is_full() || self.contains(&candidate) {
      return Ok(false);
    }

    let indicator = Indicator::of(&candidate);
    let row: Vec<f64> = self.arena.iter().map(|e| e.indicator.jaccard(&indicator)).collect();
    for (existing, sim) in self.similarity.iter_mut().zip(row.iter()) {
      existing.push(*sim);
    }
    let mut own = row;
    own.push(indicator.jaccard(&indicator));
    self.similarity.push(own);

    let id = self.arena.len();
    self.index.insert(candidate.clone(), id);
    self.arena.push(Entry { theka: candidate, indicator });
    self.order.push(id);
    self.rerank();
    Ok(true)
  }

  /// Mean similarity of arena member `id` to every other member.
  pub fn mean_similarity(&self, id: usize) -> f64 {
    let n = self.arena.len();
    if n < 2 {
      return 0.0;
    }
    let total: f64 = (0..n).filter(|&j| j != id).map(|j| self.similarity[id][j]).sum();
    total / (n - 1) as f64
  }

  /// Recompute the ranking. Calling it again on an unchanged pool gives the same order.
  pub fn rerank(&mut self) {
    let scores: Vec<f64> = (0..self.arena.len()).map(|id| self.mean_similarity(id)).collect();
    let mut rest: Vec<usize> = (1..self.arena.len()).collect();
    rest.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
    self.order = std::iter::once(0).chain(rest).collect();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn set(beats: &[Beat]) -> Theka {
    beats.iter().copied().collect()
  }

  #[test]
  fn test_jaccard() {
    let a = Indicator::of(&set(&[1, 2, 3]));
    let b = Indicator::of(&set(&[2, 3, 4]));
    assert!((a.jaccard(&b) - 0.5).abs() < 1e-12);
    let empty = Indicator::of(&set(&[]));
    assert_eq!(empty.jaccard(&empty), 1.0);
    assert_eq!(empty.jaccard(&a), 0.0);
    let far = Indicator::of(&set(&[1, 70]));
    assert!((far.jaccard(&a) - 0.25).abs() < 1e-12);
  }

  #[test]
  fn test_rejects_duplicates_and_respects_capacity() {
    let mut pool = ThekaPool::new(Role::Suppress, set(&[4]), None, 3);
    assert!(!pool.try_insert(set(&[4])).unwrap());
    assert!(pool.try_insert(set(&[4, 5])).unwrap());
    assert!(pool.try_insert(set(&[])).unwrap());
    assert!(!pool.try_insert(set(&[6])).unwrap());
    assert_eq!(pool.len(), 3);
  }

  #[test]
  fn test_strong_candidate_without_anchor_fails() {
    let mut pool = ThekaPool::new(Role::Strong, set(&[1, 3]), Some(1), 50);
    assert_eq!(pool.try_insert(set(&[3])), Err(VariationError::PoolExhausted { anchor: 1 }));
    assert_eq!(pool.len(), 1);
  }

  #[test]
  fn test_original_stays_first_and_rest_ranked() {
    let mut pool = ThekaPool::new(Role::Strong, set(&[1, 3]), Some(1), 50);
    pool.try_insert(set(&[1, 5, 6, 7])).unwrap();
    pool.try_insert(set(&[1, 3, 4])).unwrap();
    pool.try_insert(set(&[1])).unwrap();
    assert_eq!(pool.get(0), Some(&set(&[1, 3])));
    // [1,3,4] overlaps the others most, [1,5,6,7] least
    assert_eq!(pool.get(1), Some(&set(&[1, 3, 4])));
    assert_eq!(pool.get(3), Some(&set(&[1, 5, 6, 7])));
    assert_eq!(pool.position(&set(&[1, 3, 4])), Some(1));
  }

  #[test]
  fn test_rerank_is_stable() {
    let mut pool = ThekaPool::new(Role::Suppress, set(&[2]), None, 50);
    for s in [set(&[3]), set(&[4]), set(&[2, 3]), set(&[5])] {
      pool.try_insert(s).unwrap();
    }
    let before: Vec<Theka> = pool.iter().cloned().collect();
    pool.rerank();
    pool.rerank();
    let after: Vec<Theka> = pool.iter().cloned().collect();
    assert_eq!(before, after);
  }
}

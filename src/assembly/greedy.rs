//! Greedy constrained selection: bucket candidates by (type, difficulty) and sample each
//! bucket up to its share of the rule.
//!
//! The bucket sampler is also how the genetic optimizer seeds its initial population.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{Difficulty, Question, QuestionType, Rule};

/// Allowed relative deviation between selected and required question counts.
pub const COUNT_TOLERANCE: f64 = 0.2;

/// A bucket that had fewer candidates than the rule asked for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shortfall {
  pub question_type: QuestionType,
  pub difficulty: Difficulty,
  pub required: u32,
  pub available: usize,
}

/// Required count per (type, difficulty) pair, in canonical order. Pairs rounding to zero
/// are omitted.
pub fn bucket_targets(rule: &Rule) -> Vec<((QuestionType, Difficulty), u32)> {
  let mut targets = Vec::new();
  for (&qt, &count) in &rule.question_type_distribution {
    for (&diff, &weight) in &rule.difficulty_distribution {
      let required = (f64::from(count) * weight).round();
      if required >= 1.0 {
        targets.push(((qt, diff), required as u32));
      }
    }
  }
  targets
}

/// True when `actual` is within `COUNT_TOLERANCE` of `required`.
pub fn within_count_tolerance(actual: usize, required: u32) -> bool {
  let required = f64::from(required);
  (actual as f64 - required).abs() <= required * COUNT_TOLERANCE
}

/// Candidates grouped by (type, difficulty), borrowed from the pool.
pub struct BucketIndex<'a> {
  buckets: HashMap<(QuestionType, Difficulty), Vec<&'a Question>>,
  len: usize,
}

impl<'a> BucketIndex<'a> {
  pub fn new(pool: &'a [Question]) -> Self {
    let mut buckets: HashMap<(QuestionType, Difficulty), Vec<&'a Question>> = HashMap::new();
    for q in pool {
      buckets.entry((q.question_type, q.difficulty)).or_default().push(q);
    }
    Self { buckets, len: pool.len() }
  }

  pub fn available(&self, key: (QuestionType, Difficulty)) -> usize {
    self.buckets.get(&key).map_or(0, Vec::len)
  }

  /// One randomized selection following the rule's bucket targets. Never fails; under-filled
  /// buckets contribute what they have and are reported as shortfalls.
  pub fn sample<R: Rng + ?Sized>(&self, rule: &Rule, rng: &mut R) -> (Vec<&'a Question>, Vec<Shortfall>) {
    // never more than the pool holds, whatever the rule asks for
    let mut picked = Vec::with_capacity((rule.target_count() as usize).min(self.len));
    let mut shortfalls = Vec::new();

    for ((qt, diff), required) in bucket_targets(rule) {
      let bucket = self.buckets.get(&(qt, diff)).map(Vec::as_slice).unwrap_or(&[]);
      if bucket.len() < required as usize {
        shortfalls.push(Shortfall { question_type: qt, difficulty: diff, required, available: bucket.len() });
      }
      picked.extend(bucket.choose_multiple(rng, required as usize).copied());
    }

    (picked, shortfalls)
  }
}

/// Result of one greedy pass.
#[derive(Clone, Debug, Default)]
pub struct GreedySelection {
  pub questions: Vec<Question>,
  pub shortfalls: Vec<Shortfall>,
}

pub struct GreedySelector;

impl GreedySelector {
  /// Sample every bucket once. If the aggregate size misses the rule's total by more than
  /// `COUNT_TOLERANCE`, the selection is rejected and comes back empty.
  pub fn select<R: Rng + ?Sized>(pool: &[Question], rule: &Rule, rng: &mut R) -> GreedySelection {
    let index = BucketIndex::new(pool);
    let (picked, shortfalls) = index.sample(rule, rng);
    for s in &shortfalls {
      warn!(
        target: "assembly",
        question_type = %s.question_type,
        difficulty = %s.difficulty,
        required = s.required,
        available = s.available,
        "Bucket under-filled; taking what is available"
      );
    }

    let required = rule.target_count();
    if picked.is_empty() || !within_count_tolerance(picked.len(), required) {
      warn!(target: "assembly", selected = picked.len(), required, "Greedy selection outside count tolerance; rejecting");
      return GreedySelection { questions: Vec::new(), shortfalls };
    }

    debug!(target: "assembly", selected = picked.len(), required, "Greedy selection accepted");
    GreedySelection { questions: picked.into_iter().cloned().collect(), shortfalls }
  }
}

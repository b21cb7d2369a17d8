//! Paper fitness: how well a candidate question list satisfies a rule.
//!
//! Four weighted components, each in [0, 1]. The subject component only applies when the
//! rule names a subject; the total is normalized by the weights that were applied.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{Difficulty, Question, QuestionType, Rule};
use crate::subjects::SubjectLookup;

pub const COUNT_WEIGHT: f64 = 0.30;
pub const TYPE_WEIGHT: f64 = 0.30;
pub const DIFFICULTY_WEIGHT: f64 = 0.25;
pub const SUBJECT_WEIGHT: f64 = 0.15;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FitnessBreakdown {
  pub count: f64,
  pub type_match: f64,
  pub difficulty_match: f64,
  /// `None` when the rule has no subject.
  pub subject_relevance: Option<f64>,
  pub total: f64,
}

/// Fitness evaluator bound to one rule.
pub struct PaperFitness<'r> {
  rule: &'r Rule,
  subjects: &'r dyn SubjectLookup,
  expected_count: u32,
  target_subject_name: Option<&'r str>,
}

impl<'r> PaperFitness<'r> {
  pub fn new(rule: &'r Rule, subjects: &'r dyn SubjectLookup) -> Self {
    Self {
      rule,
      subjects,
      expected_count: rule.target_count(),
      target_subject_name: rule.subject_id.and_then(|s| subjects.name_for_id(s)),
    }
  }

  pub fn evaluate(&self, questions: &[&Question]) -> FitnessBreakdown {
    let count = self.count_score(questions.len());
    let type_match = self.type_score(questions);
    let difficulty_match = self.difficulty_score(questions);
    let subject_relevance = self.subject_score(questions);

    let mut weighted = COUNT_WEIGHT * count + TYPE_WEIGHT * type_match + DIFFICULTY_WEIGHT * difficulty_match;
    let mut applied = COUNT_WEIGHT + TYPE_WEIGHT + DIFFICULTY_WEIGHT;
    if let Some(s) = subject_relevance {
      weighted += SUBJECT_WEIGHT * s;
      applied += SUBJECT_WEIGHT;
    }

    FitnessBreakdown {
      count,
      type_match,
      difficulty_match,
      subject_relevance,
      total: clamp01(weighted / applied),
    }
  }

  pub fn score(&self, questions: &[&Question]) -> f64 {
    self.evaluate(questions).total
  }

  fn count_score(&self, actual: usize) -> f64 {
    let expected = f64::from(self.expected_count);
    clamp01(1.0 - (expected - actual as f64).abs() / expected.max(1.0))
  }

  fn type_score(&self, questions: &[&Question]) -> f64 {
    let total_expected = f64::from(self.expected_count);
    if total_expected == 0.0 {
      return if questions.is_empty() { 1.0 } else { 0.0 };
    }
    let mut actual: BTreeMap<QuestionType, u32> = BTreeMap::new();
    for q in questions {
      *actual.entry(q.question_type).or_default() += 1;
    }
    let diff: f64 = QuestionType::ALL
      .iter()
      .map(|t| {
        let expected = self.rule.question_type_distribution.get(t).copied().unwrap_or(0);
        let got = actual.get(t).copied().unwrap_or(0);
        f64::from(expected.abs_diff(got))
      })
      .sum();
    clamp01(1.0 - diff / (2.0 * total_expected))
  }

  fn difficulty_score(&self, questions: &[&Question]) -> f64 {
    let mut actual: BTreeMap<Difficulty, usize> = BTreeMap::new();
    for q in questions {
      *actual.entry(q.difficulty).or_default() += 1;
    }
    let n = questions.len() as f64;
    let diff: f64 = Difficulty::ALL
      .iter()
      .map(|d| {
        let expected = self.rule.difficulty_distribution.get(d).copied().unwrap_or(0.0);
        let ratio = if n > 0.0 { actual.get(d).copied().unwrap_or(0) as f64 / n } else { 0.0 };
        (expected - ratio).abs()
      })
      .sum();
    clamp01(1.0 - diff / 2.0)
  }

  fn subject_score(&self, questions: &[&Question]) -> Option<f64> {
    let target = self.rule.subject_id?;
    if questions.is_empty() {
      return Some(0.0);
    }
    let matching = questions.iter().filter(|q| self.same_subject(q.subject_id, target)).count();
    Some(matching as f64 / questions.len() as f64)
  }

  /// Subjects match by resolved name; ids are compared when either side has no name.
  fn same_subject(&self, subject_id: u64, target: u64) -> bool {
    match (self.subjects.name_for_id(subject_id), self.target_subject_name) {
      (Some(name), Some(target_name)) => name == target_name,
      _ => subject_id == target,
    }
  }
}

fn clamp01(v: f64) -> f64 {
  v.clamp(0.0, 1.0)
}

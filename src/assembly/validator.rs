//! Rule validation and default injection.
//!
//! Validation never fails loudly: problems are collected into a `ValidationResult`
//! and the caller decides what to do with them.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::domain::{Difficulty, QuestionType, Rule};

pub const DEFAULT_QUESTION_COUNT: u32 = 20;
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;
/// Upper bound on the questions one rule may request.
pub const MAX_QUESTION_COUNT: u32 = 500;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ValidationResult {
  pub valid: bool,
  pub errors: Vec<String>,
}

impl ValidationResult {
  fn from_errors(errors: Vec<String>) -> Self {
    Self { valid: errors.is_empty(), errors }
  }
}

/// Check `rule` and fill in missing distributions, with the default `MAX_QUESTION_COUNT`.
///
/// Defaults are injected before the difficulty weight check, so an empty difficulty
/// distribution is never an error. A rule that is already valid and fully specified is
/// left untouched.
pub fn validate_rule(rule: &mut Rule, default_question_count: u32) -> ValidationResult {
  validate_rule_with_limit(rule, default_question_count, MAX_QUESTION_COUNT)
}

/// Same as `validate_rule`, rejecting rules that request more than `max_question_count`.
pub fn validate_rule_with_limit(rule: &mut Rule, default_question_count: u32, max_question_count: u32) -> ValidationResult {
  let mut errors = Vec::new();

  if rule.title.trim().is_empty() {
    errors.push("paper title must not be blank".to_string());
  }
  if rule.total_score == 0 {
    errors.push("total score must be greater than 0".to_string());
  }
  if rule.duration_minutes == 0 {
    errors.push("duration must be greater than 0 minutes".to_string());
  }

  if rule.question_type_distribution.is_empty() {
    rule.question_type_distribution = default_type_distribution(default_question_count);
    debug!(target: "assembly", target_count = default_question_count, "Injected default question type distribution");
  } else {
    let requested: u64 = rule.question_type_distribution.values().map(|&c| u64::from(c)).sum();
    if requested == 0 {
      errors.push("question type distribution must request at least one question".to_string());
    } else if requested > u64::from(max_question_count) {
      errors.push(format!(
        "question type distribution requests too many questions ({}, maximum {})",
        requested, max_question_count
      ));
    }
  }

  if rule.difficulty_distribution.is_empty() {
    rule.difficulty_distribution = default_difficulty_distribution();
    debug!(target: "assembly", "Injected default difficulty distribution");
  } else {
    for (difficulty, weight) in &rule.difficulty_distribution {
      if *weight < 0.0 {
        errors.push(format!("difficulty weight for {} must not be negative (got {})", difficulty, weight));
      }
    }
    let sum: f64 = rule.difficulty_distribution.values().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
      errors.push(format!(
        "difficulty weights must sum to 1.0 (±{}), got {:.3}",
        WEIGHT_SUM_TOLERANCE, sum
      ));
    }
  }

  ValidationResult::from_errors(errors)
}

/// Half single choice, a third fill-in-the-blank, the rest short answer.
pub fn default_type_distribution(target: u32) -> BTreeMap<QuestionType, u32> {
  let single = target / 2;
  let fill = (u64::from(target) * 33 / 100) as u32;
  let short = target - single - fill;
  BTreeMap::from([
    (QuestionType::SingleChoice, single),
    (QuestionType::FillBlank, fill),
    (QuestionType::ShortAnswer, short),
  ])
}

pub fn default_difficulty_distribution() -> BTreeMap<Difficulty, f64> {
  BTreeMap::from([(Difficulty::Easy, 0.3), (Difficulty::Medium, 0.5), (Difficulty::Hard, 0.2)])
}

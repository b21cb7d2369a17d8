//! Domain models shared by the engine and the service: question tags, questions, rules, papers.
//!
//! `QuestionType` and `Difficulty` are the single tag set used by both the question bank
//! and the rule distributions, so the two can never drift apart.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of question. Declaration order is the canonical iteration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
  SingleChoice,
  MultipleChoice,
  FillBlank,
  TrueFalse,
  ShortAnswer,
}

impl QuestionType {
  pub const ALL: [QuestionType; 5] = [
    QuestionType::SingleChoice,
    QuestionType::MultipleChoice,
    QuestionType::FillBlank,
    QuestionType::TrueFalse,
    QuestionType::ShortAnswer,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      QuestionType::SingleChoice => "SINGLE_CHOICE",
      QuestionType::MultipleChoice => "MULTIPLE_CHOICE",
      QuestionType::FillBlank => "FILL_BLANK",
      QuestionType::TrueFalse => "TRUE_FALSE",
      QuestionType::ShortAnswer => "SHORT_ANSWER",
    }
  }
}

impl fmt::Display for QuestionType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Difficulty tier. Declaration order is the canonical iteration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

  pub fn as_str(self) -> &'static str {
    match self {
      Difficulty::Easy => "EASY",
      Difficulty::Medium => "MEDIUM",
      Difficulty::Hard => "HARD",
    }
  }
}

impl fmt::Display for Difficulty {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A bank question. Read-only for the whole duration of a generation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
  pub id: u64,
  pub title: String,
  #[serde(alias = "question_type", rename = "type")]
  pub question_type: QuestionType,
  pub difficulty: Difficulty,
  #[serde(alias = "subject_id")]
  pub subject_id: u64,
  #[serde(default, alias = "knowledge_point_ids")]
  pub knowledge_point_ids: Vec<u64>,
  #[serde(default, alias = "correct_answer")]
  pub correct_answer: String,
  #[serde(default)]
  pub explanation: String,
}

impl Question {
  pub fn new(
    id: u64,
    title: impl Into<String>,
    question_type: QuestionType,
    difficulty: Difficulty,
    subject_id: u64,
  ) -> Self {
    Self {
      id,
      title: title.into(),
      question_type,
      difficulty,
      subject_id,
      knowledge_point_ids: Vec::new(),
      correct_answer: String::new(),
      explanation: String::new(),
    }
  }
}

/// Declarative description of the paper a caller wants.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
  /// Reference to the stored rule/template this request came from, if any.
  #[serde(default)] pub id: Option<u64>,
  #[serde(default)] pub title: String,
  /// Whole points; allocation splits these exactly across the selected questions.
  #[serde(default)] pub total_score: u32,
  #[serde(default)] pub duration_minutes: u32,
  #[serde(default)] pub subject_id: Option<u64>,
  #[serde(default)] pub question_type_distribution: BTreeMap<QuestionType, u32>,
  #[serde(default)] pub difficulty_distribution: BTreeMap<Difficulty, f64>,
  /// Knowledge-point name -> weight. Weights are informational; names drive pool filtering.
  #[serde(default)] pub knowledge_point_names: BTreeMap<String, f64>,
  #[serde(default)] pub creator_id: Option<u64>,
}

impl Rule {
  /// Nominal paper length: the sum of all per-type counts, saturating at `u32::MAX`.
  pub fn target_count(&self) -> u32 {
    self.question_type_distribution.values().fold(0u32, |acc, &c| acc.saturating_add(c))
  }
}

/// How a paper was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationType {
  Auto,
  Manual,
}

/// One scored slot on a paper.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperQuestion {
  pub question_id: u64,
  pub score: u32,
  /// 1-based position on the paper.
  pub order: usize,
}

/// Output aggregate of one generation request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
  /// Set once the paper has been handed to a store.
  pub id: Option<String>,
  pub title: String,
  pub total_score: u32,
  pub duration_minutes: u32,
  pub subject_id: Option<u64>,
  pub question_ids: Vec<u64>,
  pub questions: Vec<PaperQuestion>,
  pub generation_type: GenerationType,
  pub rule_id: Option<u64>,
}

impl Paper {
  pub fn allocated_score(&self) -> u32 {
    self.questions.iter().map(|q| q.score).sum()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tags_serialize_as_screaming_snake_case() {
    let json = serde_json::to_string(&QuestionType::MultipleChoice).unwrap();
    assert_eq!(json, "\"MULTIPLE_CHOICE\"");
    let d: Difficulty = serde_json::from_str("\"HARD\"").unwrap();
    assert_eq!(d, Difficulty::Hard);
    assert_eq!(GenerationType::Auto, serde_json::from_str("\"AUTO\"").unwrap());
  }

  #[test]
  fn rule_parses_from_camel_case_json_with_enum_keys() {
    let rule: Rule = serde_json::from_str(
      r#"{
        "title": "Unit 3",
        "totalScore": 100,
        "durationMinutes": 90,
        "subjectId": 2,
        "questionTypeDistribution": {"SINGLE_CHOICE": 15, "FILL_BLANK": 5},
        "difficultyDistribution": {"EASY": 0.5, "HARD": 0.5}
      }"#,
    )
    .unwrap();
    assert_eq!(rule.target_count(), 20);
    assert_eq!(rule.question_type_distribution[&QuestionType::SingleChoice], 15);
    assert_eq!(rule.difficulty_distribution[&Difficulty::Hard], 0.5);
    assert!(rule.knowledge_point_names.is_empty());
  }

  #[test]
  fn distribution_iteration_follows_declaration_order() {
    let mut m = BTreeMap::new();
    m.insert(QuestionType::ShortAnswer, 1);
    m.insert(QuestionType::SingleChoice, 1);
    m.insert(QuestionType::FillBlank, 1);
    let order: Vec<_> = m.keys().copied().collect();
    assert_eq!(order, vec![QuestionType::SingleChoice, QuestionType::FillBlank, QuestionType::ShortAnswer]);
  }
}

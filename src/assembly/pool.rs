//! Candidate pool filtering.
//!
//! Knowledge points are matched textually against question titles, not through the
//! question's knowledge point ids.

use std::collections::HashSet;

use tracing::debug;

use crate::domain::{Question, Rule};
use crate::subjects::SubjectLookup;

/// Reduce `questions` to the candidates a rule may draw from. Ids are unique in the result.
pub fn filter_candidates(questions: &[Question], rule: &Rule, subjects: &dyn SubjectLookup) -> Vec<Question> {
  let keywords = rule.subject_id.map(|s| subjects.keywords_for_id(s)).unwrap_or(&[]);
  let kp_names: Vec<String> = rule
    .knowledge_point_names
    .keys()
    .map(|n| n.trim().to_lowercase())
    .filter(|n| !n.is_empty())
    .collect();

  let mut seen = HashSet::new();
  let pool: Vec<Question> = questions
    .iter()
    .filter(|q| matches_subject(q, rule.subject_id, keywords))
    .filter(|q| matches_knowledge_points(q, &kp_names))
    .filter(|q| seen.insert(q.id))
    .cloned()
    .collect();

  debug!(
    target: "assembly",
    total = questions.len(),
    candidates = pool.len(),
    subject_id = ?rule.subject_id,
    knowledge_points = kp_names.len(),
    "Candidate pool filtered"
  );
  pool
}

fn matches_subject(q: &Question, subject_id: Option<u64>, keywords: &[String]) -> bool {
  match subject_id {
    None => true,
    Some(s) => q.subject_id == s && (keywords.is_empty() || keywords.iter().any(|k| q.title.contains(k.as_str()))),
  }
}

fn matches_knowledge_points(q: &Question, names: &[String]) -> bool {
  if names.is_empty() {
    return true;
  }
  let title = q.title.to_lowercase();
  names.iter().any(|n| title.contains(n.as_str()))
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use super::*;
  use crate::domain::{Difficulty, QuestionType};
  use crate::subjects::{SubjectCatalog, SubjectEntry};

  fn q(id: u64, title: &str, subject_id: u64) -> Question {
    Question::new(id, title, QuestionType::SingleChoice, Difficulty::Easy, subject_id)
  }

  fn catalog(keywords: &[&str]) -> SubjectCatalog {
    SubjectCatalog::new(vec![
      SubjectEntry { id: 2, name: "Math".into(), keywords: keywords.iter().map(|k| k.to_string()).collect() },
      SubjectEntry { id: 3, name: "Physics".into(), keywords: vec![] },
    ])
  }

  fn bank() -> Vec<Question> {
    vec![
      q(1, "Solve the equation x + 1 = 2", 2),
      q(2, "Graph of a Linear Function", 2),
      q(3, "Poem recitation", 2),
      q(4, "Newton's second law", 3),
      q(5, "Quadratic equation roots", 3),
    ]
  }

  #[test]
  fn no_subject_keeps_everything() {
    let rule = Rule::default();
    let pool = filter_candidates(&bank(), &rule, &catalog(&["equation"]));
    assert_eq!(pool.len(), 5);
  }

  #[test]
  fn subject_filter_requires_id_and_keyword() {
    let rule = Rule { subject_id: Some(2), ..Rule::default() };
    let pool = filter_candidates(&bank(), &rule, &catalog(&["equation", "Function"]));
    let ids: Vec<u64> = pool.iter().map(|q| q.id).collect();
    assert_eq!(ids, vec![1, 2]);
  }

  #[test]
  fn empty_keyword_list_passes_vacuously() {
    let rule = Rule { subject_id: Some(2), ..Rule::default() };
    let pool = filter_candidates(&bank(), &rule, &catalog(&[]));
    assert_eq!(pool.len(), 3);
  }

  #[test]
  fn knowledge_points_match_case_insensitively() {
    let rule = Rule {
      knowledge_point_names: BTreeMap::from([("linear FUNCTION".to_string(), 1.0), ("newton".to_string(), 0.5)]),
      ..Rule::default()
    };
    let pool = filter_candidates(&bank(), &rule, &catalog(&[]));
    let ids: Vec<u64> = pool.iter().map(|q| q.id).collect();
    assert_eq!(ids, vec![2, 4]);
  }

  #[test]
  fn duplicate_ids_are_dropped() {
    let mut questions = bank();
    questions.push(q(1, "Solve the equation again", 2));
    let pool = filter_candidates(&questions, &Rule::default(), &catalog(&[]));
    assert_eq!(pool.len(), 5);
    assert_eq!(pool[0].title, "Solve the equation x + 1 = 2");
  }

  #[test]
  fn empty_result_is_not_an_error() {
    let rule = Rule { subject_id: Some(42), ..Rule::default() };
    assert!(filter_candidates(&bank(), &rule, &catalog(&[])).is_empty());
  }
}

//! Turn a selection into a scored `Paper`, optionally persisting it.

use tracing::{debug, error, instrument, warn};

use crate::domain::{GenerationType, Paper, PaperQuestion, Question, Rule};
use crate::error::AssemblyError;
use crate::store::PaperStore;

/// Split `total` whole points over `n` questions. The first `total % n` questions get one
/// extra point, so the result always sums to `total`.
pub fn allocate_scores(total: u32, n: usize) -> Vec<u32> {
  if n == 0 {
    return Vec::new();
  }
  let n64 = n as u64;
  let base = (u64::from(total) / n64) as u32;
  let remainder = (u64::from(total) % n64) as usize;
  (0..n).map(|i| if i < remainder { base + 1 } else { base }).collect()
}

/// Build the paper for `questions` in selection order.
///
/// With a store, the paper is saved first and each question row is added afterwards in
/// order; the returned paper carries the store's id. A failed row deletes the saved paper
/// again, so the store never keeps a partial one.
#[instrument(level = "debug", skip_all, fields(title = %rule.title, selected = questions.len(), persist = store.is_some()))]
pub fn assemble(rule: &Rule, questions: &[Question], store: Option<&dyn PaperStore>) -> Result<Paper, AssemblyError> {
  if questions.is_empty() {
    return Err(AssemblyError::EmptySelection);
  }

  let scores = allocate_scores(rule.total_score, questions.len());
  let rows: Vec<PaperQuestion> = questions
    .iter()
    .zip(&scores)
    .enumerate()
    .map(|(i, (q, &score))| PaperQuestion { question_id: q.id, score, order: i + 1 })
    .collect();

  let mut paper = Paper {
    id: None,
    title: rule.title.clone(),
    total_score: rule.total_score,
    duration_minutes: rule.duration_minutes,
    subject_id: rule.subject_id,
    question_ids: questions.iter().map(|q| q.id).collect(),
    questions: rows,
    generation_type: GenerationType::Auto,
    rule_id: rule.id,
  };

  if let Some(store) = store {
    let paper_id = store.save_paper(&paper)?;
    for row in &paper.questions {
      if let Err(e) = store.add_question_to_paper(&paper_id, row.question_id, row.score, row.order) {
        warn!(target: "assembly", %paper_id, order = row.order, error = %e, "Question row rejected; rolling back paper");
        if let Err(rollback) = store.delete_paper(&paper_id) {
          error!(target: "assembly", %paper_id, error = %rollback, "Rollback of partial paper failed");
        }
        return Err(e.into());
      }
    }
    debug!(target: "assembly", %paper_id, rows = paper.questions.len(), "Paper persisted");
    paper.id = Some(paper_id);
  }

  Ok(paper)
}

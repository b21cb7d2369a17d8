//! Core behaviors behind the HTTP handlers.
//!
//! Generation is CPU-bound, so it runs on tokio's blocking pool. Everything else here is a
//! cheap read of shared state.

use std::sync::Arc;

use tracing::{debug, error, instrument};

use crate::assembly::{validate_rule_with_limit, Generated, PaperGenerator};
use crate::domain::Rule;
use crate::error::{AssemblyError, StoreError};
use crate::protocol::{InventoryOut, InventoryRow, ValidateOut};
use crate::state::AppState;
use crate::store::StoredPaper;
use crate::subjects::SubjectLookup;

/// Run the full pipeline on a worker thread. `persist` selects generate vs preview mode.
#[instrument(level = "info", skip(state, rule), fields(title = %rule.title))]
pub async fn generate_paper(state: &Arc<AppState>, rule: Rule, persist: bool) -> Result<Generated, AssemblyError> {
  let state = Arc::clone(state);
  let joined = tokio::task::spawn_blocking(move || {
    let mut rng = state.rng();
    let generator = PaperGenerator::new(&state.engine, state.subjects.as_ref());
    if persist {
      generator.generate(rule, &state.questions, state.papers.as_ref(), &mut rng)
    } else {
      generator.preview(rule, &state.questions, &mut rng)
    }
  })
  .await;

  match joined {
    Ok(result) => result,
    Err(e) => {
      error!(target: "exam_backend", error = %e, "Generation worker did not complete");
      Err(AssemblyError::Worker(e.to_string()))
    }
  }
}

/// Validate without generating. Returns the rule with defaults injected.
pub fn check_rule(state: &AppState, mut rule: Rule) -> ValidateOut {
  let result = validate_rule_with_limit(&mut rule, state.engine.default_question_count, state.engine.max_question_count);
  debug!(target: "exam_backend", valid = result.valid, errors = result.errors.len(), "Rule checked");
  ValidateOut { valid: result.valid, errors: result.errors, rule }
}

pub fn find_paper(state: &AppState, paper_id: &str) -> Result<StoredPaper, AssemblyError> {
  state
    .papers
    .get(paper_id)?
    .ok_or_else(|| AssemblyError::Store(StoreError::NotFound(paper_id.to_string())))
}

pub fn question_inventory(state: &AppState) -> InventoryOut {
  let rows: Vec<InventoryRow> = state
    .inventory()
    .into_iter()
    .map(|((subject_id, question_type, difficulty), count)| InventoryRow {
      subject_id,
      subject_name: state.subjects.name_for_id(subject_id).map(str::to_string),
      question_type,
      difficulty,
      count,
    })
    .collect();
  InventoryOut { total: state.questions.len(), rows }
}

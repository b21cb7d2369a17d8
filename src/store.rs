//! Paper persistence collaborator and the in-memory implementation used by the service.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::Serialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::{Paper, PaperQuestion};
use crate::error::StoreError;

/// Persistence hook called by the assembler when a paper is saved.
///
/// `save_paper` is called once, then `add_question_to_paper` once per question in
/// selection order. If a row cannot be added, `delete_paper` removes the partial paper.
pub trait PaperStore: Send + Sync {
  fn save_paper(&self, paper: &Paper) -> Result<String, StoreError>;

  fn add_question_to_paper(
    &self,
    paper_id: &str,
    question_id: u64,
    score: u32,
    order: usize,
  ) -> Result<(), StoreError>;

  fn delete_paper(&self, paper_id: &str) -> Result<(), StoreError>;
}

/// A stored paper plus the question rows added after it.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPaper {
  pub paper: Paper,
  pub rows: Vec<PaperQuestion>,
}

#[derive(Debug, Default)]
pub struct InMemoryPaperStore {
  papers: RwLock<HashMap<String, StoredPaper>>,
}

impl InMemoryPaperStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, paper_id: &str) -> Result<Option<StoredPaper>, StoreError> {
    let papers = self.papers.read().map_err(|e| StoreError::Unavailable(e.to_string()))?;
    Ok(papers.get(paper_id).cloned())
  }

  pub fn len(&self) -> usize {
    self.papers.read().map(|p| p.len()).unwrap_or(0)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl PaperStore for InMemoryPaperStore {
  #[instrument(level = "debug", skip(self, paper), fields(title = %paper.title))]
  fn save_paper(&self, paper: &Paper) -> Result<String, StoreError> {
    let id = Uuid::new_v4().to_string();
    let mut stored = paper.clone();
    stored.id = Some(id.clone());
    let mut papers = self.papers.write().map_err(|e| StoreError::Unavailable(e.to_string()))?;
    papers.insert(id.clone(), StoredPaper { paper: stored, rows: Vec::new() });
    debug!(target: "exam_backend", paper_id = %id, "Paper saved");
    Ok(id)
  }

  fn add_question_to_paper(
    &self,
    paper_id: &str,
    question_id: u64,
    score: u32,
    order: usize,
  ) -> Result<(), StoreError> {
    let mut papers = self.papers.write().map_err(|e| StoreError::Unavailable(e.to_string()))?;
    let stored = papers
      .get_mut(paper_id)
      .ok_or_else(|| StoreError::NotFound(paper_id.to_string()))?;
    stored.rows.push(PaperQuestion { question_id, score, order });
    Ok(())
  }

  #[instrument(level = "debug", skip(self))]
  fn delete_paper(&self, paper_id: &str) -> Result<(), StoreError> {
    let mut papers = self.papers.write().map_err(|e| StoreError::Unavailable(e.to_string()))?;
    papers
      .remove(paper_id)
      .map(|_| debug!(target: "exam_backend", %paper_id, "Paper deleted"))
      .ok_or_else(|| StoreError::NotFound(paper_id.to_string()))
  }
}

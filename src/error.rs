//! Error types for paper assembly and persistence.

use thiserror::Error;

/// Failure reported by a `PaperStore` implementation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
  #[error("paper not found: {0}")]
  NotFound(String),

  #[error("store unavailable: {0}")]
  Unavailable(String),
}

/// Top-level error for one generation request.
#[derive(Debug, Error)]
pub enum AssemblyError {
  /// The rule is malformed; messages are in validator order.
  #[error("rule validation failed: {}", .0.join("; "))]
  Validation(Vec<String>),

  /// Neither strategy produced a usable selection.
  #[error("insufficient question supply: {required} questions required, {pool_size} candidates available")]
  Infeasible { required: u32, pool_size: usize },

  #[error("cannot assemble a paper from an empty question list")]
  EmptySelection,

  #[error("paper persistence failed: {0}")]
  Store(#[from] StoreError),

  /// The blocking generation task did not complete.
  #[error("generation worker failed: {0}")]
  Worker(String),
}

impl AssemblyError {
  /// Stable machine-readable tag used in API error bodies.
  pub fn kind(&self) -> &'static str {
    match self {
      AssemblyError::Validation(_) => "validation",
      AssemblyError::Infeasible { .. } => "infeasible",
      AssemblyError::EmptySelection => "empty_selection",
      AssemblyError::Store(StoreError::NotFound(_)) => "not_found",
      AssemblyError::Store(_) => "store",
      AssemblyError::Worker(_) => "worker",
    }
  }
}

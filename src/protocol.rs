//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and clients independently.

use serde::Serialize;

use crate::assembly::{FitnessBreakdown, Generated, Shortfall};
use crate::domain::{Difficulty, Paper, QuestionType, Rule};
use crate::subjects::SubjectEntry;

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub questions: usize,
    pub subjects: usize,
}

#[derive(Debug, Serialize)]
pub struct SubjectsOut {
    pub subjects: Vec<SubjectEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRow {
    pub subject_id: u64,
    pub subject_name: Option<String>,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct InventoryOut {
    pub total: usize,
    pub rows: Vec<InventoryRow>,
}

/// Validation report plus the rule as it looks after default injection.
#[derive(Debug, Serialize)]
pub struct ValidateOut {
    pub valid: bool,
    pub errors: Vec<String>,
    pub rule: Rule,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperOut {
    pub paper: Paper,
    /// Which strategy produced the selection: "genetic", "greedy" or "greedy_fallback".
    pub origin: &'static str,
    pub fitness: FitnessBreakdown,
    pub shortfalls: Vec<Shortfall>,
    pub pool_size: usize,
}

impl From<Generated> for PaperOut {
    fn from(g: Generated) -> Self {
        Self { paper: g.paper, origin: g.origin, fitness: g.fitness, shortfalls: g.shortfalls, pool_size: g.pool_size }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

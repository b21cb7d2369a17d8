//! Strategy orchestration: validate, filter, select, fall back, assemble.
//!
//! The primary strategy is configurable. A genetic result has to pass the same count gate as
//! a greedy one; when it does not, the greedy selector gets a turn over the same pool. Every
//! result reports which path produced it.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::assembly::assembler::assemble;
use crate::assembly::fitness::{FitnessBreakdown, PaperFitness};
use crate::assembly::genetic::{GeneticOptimizer, GeneticSettings};
use crate::assembly::greedy::{within_count_tolerance, GreedySelector, Shortfall};
use crate::assembly::pool::filter_candidates;
use crate::assembly::validator::{validate_rule_with_limit, DEFAULT_QUESTION_COUNT, MAX_QUESTION_COUNT};
use crate::domain::{Paper, Question, Rule};
use crate::error::AssemblyError;
use crate::store::PaperStore;
use crate::subjects::SubjectLookup;

pub const ORIGIN_GENETIC: &str = "genetic";
pub const ORIGIN_GREEDY: &str = "greedy";
pub const ORIGIN_GREEDY_FALLBACK: &str = "greedy_fallback";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
  #[default]
  Genetic,
  Greedy,
}

/// Engine configuration, read from the `[engine]` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
  pub strategy: Strategy,
  pub default_question_count: u32,
  /// Rules requesting more questions than this are rejected.
  pub max_question_count: u32,
  /// Fixed RNG seed for reproducible runs; entropy when absent.
  pub seed: Option<u64>,
  pub genetic: GeneticSettings,
}

impl Default for EngineSettings {
  fn default() -> Self {
    Self {
      strategy: Strategy::default(),
      default_question_count: DEFAULT_QUESTION_COUNT,
      max_question_count: MAX_QUESTION_COUNT,
      seed: None,
      genetic: GeneticSettings::default(),
    }
  }
}

/// Chosen questions plus how they were chosen.
#[derive(Clone, Debug)]
pub struct Selection {
  pub questions: Vec<Question>,
  pub origin: &'static str,
  pub fitness: FitnessBreakdown,
  pub shortfalls: Vec<Shortfall>,
}

/// A finished generation request.
#[derive(Clone, Debug)]
pub struct Generated {
  pub paper: Paper,
  pub origin: &'static str,
  pub fitness: FitnessBreakdown,
  pub shortfalls: Vec<Shortfall>,
  pub pool_size: usize,
}

pub struct PaperGenerator<'s> {
  settings: &'s EngineSettings,
  subjects: &'s dyn SubjectLookup,
}

impl<'s> PaperGenerator<'s> {
  pub fn new(settings: &'s EngineSettings, subjects: &'s dyn SubjectLookup) -> Self {
    Self { settings, subjects }
  }

  /// Generate and persist a paper through `store`.
  pub fn generate<R: Rng + ?Sized>(
    &self,
    rule: Rule,
    questions: &[Question],
    store: &dyn PaperStore,
    rng: &mut R,
  ) -> Result<Generated, AssemblyError> {
    self.run(rule, questions, Some(store), rng)
  }

  /// Same pipeline as `generate`, nothing is persisted.
  pub fn preview<R: Rng + ?Sized>(
    &self,
    rule: Rule,
    questions: &[Question],
    rng: &mut R,
  ) -> Result<Generated, AssemblyError> {
    self.run(rule, questions, None, rng)
  }

  #[instrument(level = "info", skip_all, fields(title = %rule.title, strategy = ?self.settings.strategy, persist = store.is_some()))]
  fn run<R: Rng + ?Sized>(
    &self,
    mut rule: Rule,
    questions: &[Question],
    store: Option<&dyn PaperStore>,
    rng: &mut R,
  ) -> Result<Generated, AssemblyError> {
    let validation =
      validate_rule_with_limit(&mut rule, self.settings.default_question_count, self.settings.max_question_count);
    if !validation.valid {
      warn!(target: "assembly", errors = ?validation.errors, "Rule rejected");
      return Err(AssemblyError::Validation(validation.errors));
    }

    let pool = filter_candidates(questions, &rule, self.subjects);
    let selection = self.select(&rule, &pool, rng)?;
    let paper = assemble(&rule, &selection.questions, store)?;

    info!(
      target: "assembly",
      origin = selection.origin,
      selected = paper.question_ids.len(),
      required = rule.target_count(),
      fitness = selection.fitness.total,
      paper_id = ?paper.id,
      "Paper generated"
    );
    Ok(Generated {
      paper,
      origin: selection.origin,
      fitness: selection.fitness,
      shortfalls: selection.shortfalls,
      pool_size: pool.len(),
    })
  }

  /// Run the primary strategy and the greedy fallback over an already filtered pool.
  pub fn select<R: Rng + ?Sized>(&self, rule: &Rule, pool: &[Question], rng: &mut R) -> Result<Selection, AssemblyError> {
    let required = rule.target_count();
    let fitness = PaperFitness::new(rule, self.subjects);

    if self.settings.strategy == Strategy::Genetic {
      let outcome = GeneticOptimizer::new(&self.settings.genetic, self.subjects).optimize(pool, rule, rng);
      let selected = outcome.questions.len();
      if selected > 0 && within_count_tolerance(selected, required) {
        let refs: Vec<&Question> = outcome.questions.iter().collect();
        return Ok(Selection {
          fitness: outcome.fitness.unwrap_or_else(|| fitness.evaluate(&refs)),
          questions: outcome.questions,
          origin: ORIGIN_GENETIC,
          shortfalls: Vec::new(),
        });
      }
      warn!(
        target: "assembly",
        selected,
        required,
        stop_reason = ?outcome.stop_reason,
        "Genetic result unusable; falling back to greedy selection"
      );
    }

    let origin = match self.settings.strategy {
      Strategy::Genetic => ORIGIN_GREEDY_FALLBACK,
      Strategy::Greedy => ORIGIN_GREEDY,
    };
    let greedy = GreedySelector::select(pool, rule, rng);
    if greedy.questions.is_empty() {
      warn!(target: "assembly", required, pool_size = pool.len(), "No strategy produced a usable selection");
      return Err(AssemblyError::Infeasible { required, pool_size: pool.len() });
    }
    let refs: Vec<&Question> = greedy.questions.iter().collect();
    Ok(Selection {
      fitness: fitness.evaluate(&refs),
      questions: greedy.questions,
      origin,
      shortfalls: greedy.shortfalls,
    })
  }
}

//! Paper assembly engine.
//!
//! Pipeline for one request:
//!   1. `validator`  checks the rule and injects default distributions
//!   2. `pool`       narrows the question bank to candidates
//!   3. `genetic` / `greedy` pick questions (see `strategy` for the fallback order)
//!   4. `assembler`  allocates scores and optionally persists the paper
//!
//! The engine is synchronous. All randomness comes from the caller's `Rng`.

pub mod assembler;
pub mod fitness;
pub mod genetic;
pub mod greedy;
pub mod pool;
pub mod strategy;
pub mod validator;

pub use assembler::{allocate_scores, assemble};
pub use fitness::{FitnessBreakdown, PaperFitness};
pub use genetic::{GeneticOptimizer, GeneticOutcome, GeneticSettings, StopReason};
pub use greedy::{GreedySelection, GreedySelector, Shortfall};
pub use pool::filter_candidates;
pub use strategy::{EngineSettings, Generated, PaperGenerator, Selection, Strategy};
pub use validator::{validate_rule, validate_rule_with_limit, ValidationResult};

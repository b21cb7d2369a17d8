//! Application state: question bank, subject catalog, paper store and engine settings.
//!
//! The bank and catalog are loaded once at startup (TOML config, else built-in seeds) and
//! shared read-only. Papers go to the in-memory store, which synchronizes internally.

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, instrument, warn};

use crate::assembly::EngineSettings;
use crate::config::load_app_config_from_env;
use crate::domain::{Difficulty, Question, QuestionType};
use crate::seeds::{seed_questions, seed_subjects};
use crate::store::InMemoryPaperStore;
use crate::subjects::{SubjectCatalog, SubjectLookup};

#[derive(Clone)]
pub struct AppState {
    pub questions: Arc<Vec<Question>>,
    pub subjects: Arc<SubjectCatalog>,
    pub papers: Arc<InMemoryPaperStore>,
    pub engine: Arc<EngineSettings>,
}

impl AppState {
    /// Build state from env: load config, fall back to seeds, log the inventory.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_app_config_from_env().unwrap_or_default();

        let subjects = if cfg.subjects.is_empty() {
            info!(target: "exam_backend", "No subjects configured; using built-in seed catalog");
            seed_subjects()
        } else {
            cfg.subjects
        };
        let questions = if cfg.questions.is_empty() {
            info!(target: "exam_backend", "No questions configured; using built-in seed bank");
            seed_questions()
        } else {
            cfg.questions
        };

        Self::from_parts(cfg.engine, SubjectCatalog::new(subjects), questions)
    }

    pub fn from_parts(engine: EngineSettings, subjects: SubjectCatalog, questions: Vec<Question>) -> Self {
        let state = Self {
            questions: Arc::new(questions),
            subjects: Arc::new(subjects),
            papers: Arc::new(InMemoryPaperStore::new()),
            engine: Arc::new(engine),
        };
        state.log_inventory();
        state
    }

    /// Question counts per (subject, type, difficulty), in canonical order.
    pub fn inventory(&self) -> BTreeMap<(u64, QuestionType, Difficulty), usize> {
        let mut counts = BTreeMap::new();
        for q in self.questions.iter() {
            *counts.entry((q.subject_id, q.question_type, q.difficulty)).or_insert(0) += 1;
        }
        counts
    }

    /// Fresh RNG for one request: fixed seed when configured, entropy otherwise.
    pub fn rng(&self) -> StdRng {
        match self.engine.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn log_inventory(&self) {
        let mut by_subject: BTreeMap<u64, usize> = BTreeMap::new();
        for q in self.questions.iter() {
            *by_subject.entry(q.subject_id).or_insert(0) += 1;
        }
        for (subject_id, count) in &by_subject {
            match self.subjects.name_for_id(*subject_id) {
                Some(name) => info!(target: "exam_backend", subject_id, subject = name, questions = count, "Startup question inventory"),
                None => warn!(target: "exam_backend", subject_id, questions = count, "Questions reference an unknown subject"),
            }
        }
        info!(
            target: "exam_backend",
            questions = self.questions.len(),
            subjects = self.subjects.len(),
            strategy = ?self.engine.strategy,
            seeded_rng = self.engine.seed.is_some(),
            "Assembly engine ready"
        );
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_parts(EngineSettings::default(), SubjectCatalog::new(seed_subjects()), seed_questions())
    }
}

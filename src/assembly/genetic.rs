//! Genetic search over candidate papers.
//!
//! An individual is an ordered, duplicate-free list of pool questions. The initial
//! population comes from the greedy bucket sampler; each generation keeps an elite,
//! then fills up with tournament-selected, crossed-over and mutated children. The best
//! individual ever evaluated is returned, not the last generation's leader.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::assembly::fitness::{FitnessBreakdown, PaperFitness};
use crate::assembly::greedy::BucketIndex;
use crate::domain::{Question, QuestionType, Rule};
use crate::subjects::SubjectLookup;

/// Tuning knobs for the optimizer. Defaults are the production values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticSettings {
  pub population_size: usize,
  pub max_generations: usize,
  pub crossover_rate: f64,
  /// Probability that a child gets one point mutation.
  pub mutation_rate: f64,
  /// Fraction of each generation copied unchanged into the next (at least one individual).
  pub elite_ratio: f64,
  pub tournament_size: usize,
  /// Stop as soon as a generation's best fitness reaches this value.
  pub target_fitness: f64,
  /// Optional wall-clock budget for one run, checked once per generation.
  pub time_budget_ms: Option<u64>,
}

impl Default for GeneticSettings {
  fn default() -> Self {
    Self {
      population_size: 50,
      max_generations: 200,
      crossover_rate: 0.8,
      mutation_rate: 0.1,
      elite_ratio: 0.1,
      tournament_size: 3,
      target_fitness: 0.95,
      time_budget_ms: None,
    }
  }
}

impl GeneticSettings {
  pub fn elite_count(&self) -> usize {
    let pop = self.population_size.max(1);
    if self.elite_ratio <= 0.0 {
      return 0;
    }
    ((pop as f64 * self.elite_ratio).floor() as usize).clamp(1, pop)
  }
}

/// One candidate paper.
#[derive(Clone, Debug)]
pub struct Individual<'a> {
  pub genes: Vec<&'a Question>,
  pub fitness: f64,
}

impl<'a> Individual<'a> {
  pub fn new(genes: Vec<&'a Question>) -> Self {
    Self { genes, fitness: 0.0 }
  }

  pub fn ids(&self) -> Vec<u64> {
    self.genes.iter().map(|q| q.id).collect()
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
  EmptyPool,
  TargetReached,
  MaxGenerations,
  TimeBudget,
}

#[derive(Clone, Debug)]
pub struct GeneticOutcome {
  /// Best-ever individual's questions, in order. Empty if nothing was evaluated.
  pub questions: Vec<Question>,
  pub fitness: Option<FitnessBreakdown>,
  pub generations: usize,
  pub stop_reason: StopReason,
}

pub struct GeneticOptimizer<'s> {
  settings: &'s GeneticSettings,
  subjects: &'s dyn SubjectLookup,
}

impl<'s> GeneticOptimizer<'s> {
  pub fn new(settings: &'s GeneticSettings, subjects: &'s dyn SubjectLookup) -> Self {
    Self { settings, subjects }
  }

  /// Run the search. Never fails: an empty or short result is for the caller to judge.
  #[instrument(level = "debug", skip_all, fields(pool = pool.len(), required = rule.target_count()))]
  pub fn optimize<R: Rng + ?Sized>(&self, pool: &[Question], rule: &Rule, rng: &mut R) -> GeneticOutcome {
    if pool.is_empty() {
      debug!(target: "assembly", "Empty candidate pool; skipping genetic search");
      return GeneticOutcome { questions: Vec::new(), fitness: None, generations: 0, stop_reason: StopReason::EmptyPool };
    }

    let settings = self.settings;
    let deadline = settings.time_budget_ms.map(|ms| Instant::now() + Duration::from_millis(ms));
    let fitness = PaperFitness::new(rule, self.subjects);
    let buckets = BucketIndex::new(pool);
    let by_type = group_by_type(pool);
    let target_len = rule.target_count() as usize;
    let pop_size = settings.population_size.max(1);
    let elite = settings.elite_count();

    let mut population: Vec<Individual<'_>> =
      (0..pop_size).map(|_| Individual::new(buckets.sample(rule, rng).0)).collect();
    let mut best: Option<Individual<'_>> = None;
    let mut generations = 0;
    let mut stop_reason = StopReason::MaxGenerations;

    for generation in 0..settings.max_generations {
      generations = generation + 1;
      for ind in population.iter_mut() {
        ind.fitness = fitness.score(&ind.genes);
      }
      population.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

      let leader = &population[0];
      if best.as_ref().map_or(true, |b| leader.fitness > b.fitness) {
        best = Some(leader.clone());
      }
      trace!(target: "assembly", generation, best = leader.fitness, len = leader.genes.len(), "Generation evaluated");

      if leader.fitness >= settings.target_fitness {
        stop_reason = StopReason::TargetReached;
        break;
      }
      if deadline.is_some_and(|d| Instant::now() >= d) {
        stop_reason = StopReason::TimeBudget;
        break;
      }
      if generations == settings.max_generations {
        break;
      }

      let mut next: Vec<Individual<'_>> = Vec::with_capacity(pop_size);
      next.extend(population.iter().take(elite).cloned());
      while next.len() < pop_size {
        let p1 = tournament(&population, settings.tournament_size, rng);
        let p2 = tournament(&population, settings.tournament_size, rng);
        let mut child = if rng.gen::<f64>() < settings.crossover_rate {
          crossover(&p1.genes, &p2.genes, target_len, rng)
        } else {
          p1.genes.clone()
        };
        if rng.gen::<f64>() < settings.mutation_rate {
          mutate(&mut child, &by_type, rng);
        }
        next.push(Individual::new(child));
      }
      population = next;
    }

    let outcome = match best {
      Some(b) => GeneticOutcome {
        fitness: Some(fitness.evaluate(&b.genes)),
        questions: b.genes.into_iter().cloned().collect(),
        generations,
        stop_reason,
      },
      None => GeneticOutcome { questions: Vec::new(), fitness: None, generations, stop_reason },
    };
    debug!(
      target: "assembly",
      generations = outcome.generations,
      stop_reason = ?outcome.stop_reason,
      best = outcome.fitness.map(|f| f.total).unwrap_or(0.0),
      selected = outcome.questions.len(),
      "Genetic search finished"
    );
    outcome
  }
}

/// Best of `size` independent uniform draws, with replacement. A size of 0 counts as 1.
pub fn tournament<'p, 'a, R: Rng + ?Sized>(
  population: &'p [Individual<'a>],
  size: usize,
  rng: &mut R,
) -> &'p Individual<'a> {
  let winner = (0..size.max(1))
    .map(|_| rng.gen_range(0..population.len()))
    .max_by(|&a, &b| population[a].fitness.total_cmp(&population[b].fitness))
    .unwrap_or(0);
  &population[winner]
}

/// Single-point crossover that never repeats a question id.
///
/// The child takes parent 1 up to the cut, then parent 2 from the cut on. If duplicates left
/// it shorter than `target_len`, parent 1's remaining questions top it up.
pub fn crossover<'a, R: Rng + ?Sized>(
  parent1: &[&'a Question],
  parent2: &[&'a Question],
  target_len: usize,
  rng: &mut R,
) -> Vec<&'a Question> {
  let span = parent1.len().min(parent2.len());
  let cut = if span == 0 { 0 } else { rng.gen_range(0..span) };

  let mut taken = HashSet::with_capacity(parent1.len().max(parent2.len()));
  let mut child: Vec<&'a Question> = Vec::with_capacity(parent1.len().max(parent2.len()));
  for &q in parent1[..cut].iter().chain(&parent2[cut..]) {
    if taken.insert(q.id) {
      child.push(q);
    }
  }
  for &q in &parent1[cut..] {
    if child.len() >= target_len {
      break;
    }
    if taken.insert(q.id) {
      child.push(q);
    }
  }
  child
}

/// Replace one random question with an unused pool question of the same type.
/// Returns false (and leaves `genes` alone) when no replacement exists.
pub fn mutate<'a, R: Rng + ?Sized>(
  genes: &mut [&'a Question],
  by_type: &HashMap<QuestionType, Vec<&'a Question>>,
  rng: &mut R,
) -> bool {
  if genes.is_empty() {
    return false;
  }
  let pos = rng.gen_range(0..genes.len());
  let present: HashSet<u64> = genes.iter().map(|q| q.id).collect();
  let candidates: Vec<&'a Question> = by_type
    .get(&genes[pos].question_type)
    .map(|qs| qs.iter().copied().filter(|q| !present.contains(&q.id)).collect())
    .unwrap_or_default();
  match candidates.choose(rng) {
    Some(&q) => {
      genes[pos] = q;
      true
    }
    None => false,
  }
}

pub fn group_by_type(pool: &[Question]) -> HashMap<QuestionType, Vec<&Question>> {
  let mut by_type: HashMap<QuestionType, Vec<&Question>> = HashMap::new();
  for q in pool {
    by_type.entry(q.question_type).or_default().push(q);
  }
  by_type
}

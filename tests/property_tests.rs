//! Property-based tests for the assembly engine.
//!
//! Uses proptest to verify invariants that must hold for any rule and pool.

use std::collections::{BTreeMap, HashSet};

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use exam_backend::assembly::genetic::{crossover, group_by_type, mutate};
use exam_backend::assembly::greedy::within_count_tolerance;
use exam_backend::assembly::{
  allocate_scores, validate_rule, GeneticOptimizer, GeneticSettings, GreedySelector, PaperFitness,
};
use exam_backend::domain::{Difficulty, Question, QuestionType, Rule};
use exam_backend::subjects::{SubjectCatalog, SubjectEntry};

fn build_pool(specs: &[(usize, usize, u64)]) -> Vec<Question> {
  specs
    .iter()
    .enumerate()
    .map(|(i, &(t, d, s))| {
      Question::new(i as u64 + 1, format!("q{i}"), QuestionType::ALL[t], Difficulty::ALL[d], s)
    })
    .collect()
}

fn pool_strategy(max: usize) -> impl Strategy<Value = Vec<Question>> {
  prop::collection::vec((0usize..5, 0usize..3, 1u64..4), 0..max).prop_map(|specs| build_pool(&specs))
}

fn rule_strategy() -> impl Strategy<Value = Rule> {
  (prop::collection::vec(0u32..8, 5), 0u32..=10, 0u32..=10, prop::option::of(1u64..4)).prop_map(
    |(counts, easy, medium, subject_id)| {
      let counts: BTreeMap<QuestionType, u32> =
        QuestionType::ALL.iter().copied().zip(counts).filter(|(_, c)| *c > 0).collect();
      let hard = 20u32.saturating_sub(easy + medium);
      let total = f64::from(easy + medium + hard);
      Rule {
        title: "generated".into(),
        total_score: 100,
        duration_minutes: 60,
        subject_id,
        question_type_distribution: counts,
        difficulty_distribution: BTreeMap::from([
          (Difficulty::Easy, f64::from(easy) / total),
          (Difficulty::Medium, f64::from(medium) / total),
          (Difficulty::Hard, f64::from(hard) / total),
        ]),
        ..Rule::default()
      }
    },
  )
}

fn catalog() -> SubjectCatalog {
  SubjectCatalog::new(vec![
    SubjectEntry { id: 1, name: "Math".into(), keywords: vec![] },
    SubjectEntry { id: 2, name: "Physics".into(), keywords: vec![] },
    SubjectEntry { id: 3, name: "Math".into(), keywords: vec![] },
  ])
}

fn assert_unique(ids: impl IntoIterator<Item = u64>) -> Result<(), TestCaseError> {
  let mut seen = HashSet::new();
  for id in ids {
    prop_assert!(seen.insert(id), "duplicate id {}", id);
  }
  Ok(())
}

proptest! {
  // ==================== Score allocation ====================

  #[test]
  fn allocation_sums_exactly(total in 0u32..1_000, n in 1usize..60) {
    let scores = allocate_scores(total, n);
    prop_assert_eq!(scores.len(), n);
    prop_assert_eq!(scores.iter().sum::<u32>(), total);
    // non-increasing, and never more than one point apart
    prop_assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    prop_assert!(scores[0] - scores[n - 1] <= 1);
  }

  // ==================== Validator ====================

  #[test]
  fn validation_is_idempotent(rule in rule_strategy(), wipe_types in any::<bool>(), wipe_diff in any::<bool>()) {
    let mut rule = rule;
    if wipe_types { rule.question_type_distribution.clear(); }
    if wipe_diff { rule.difficulty_distribution.clear(); }
    let first = validate_rule(&mut rule, 20);
    let snapshot = rule.clone();
    let second = validate_rule(&mut rule, 20);
    prop_assert_eq!(first, second);
    prop_assert_eq!(rule, snapshot);
  }

  // ==================== Greedy selector ====================

  #[test]
  fn greedy_is_empty_or_within_tolerance(pool in pool_strategy(120), rule in rule_strategy(), seed in any::<u64>()) {
    let mut rng = StdRng::seed_from_u64(seed);
    let sel = GreedySelector::select(&pool, &rule, &mut rng);
    prop_assert!(sel.questions.is_empty() || within_count_tolerance(sel.questions.len(), rule.target_count()));
    assert_unique(sel.questions.iter().map(|q| q.id))?;
  }

  // ==================== Fitness ====================

  #[test]
  fn fitness_stays_in_unit_interval(pool in pool_strategy(40), rule in rule_strategy()) {
    let subjects = catalog();
    let refs: Vec<&Question> = pool.iter().collect();
    let f = PaperFitness::new(&rule, &subjects).evaluate(&refs);
    for v in [f.count, f.type_match, f.difficulty_match, f.total, f.subject_relevance.unwrap_or(0.0)] {
      prop_assert!((0.0..=1.0).contains(&v), "{:?}", f);
    }
  }

  // ==================== Operators ====================

  #[test]
  fn crossover_children_have_unique_ids(
    pool in pool_strategy(60),
    picks1 in prop::collection::vec(any::<prop::sample::Index>(), 0..25),
    picks2 in prop::collection::vec(any::<prop::sample::Index>(), 0..25),
    target in 0usize..30,
    seed in any::<u64>(),
  ) {
    prop_assume!(!pool.is_empty());
    let parent = |picks: &[prop::sample::Index]| {
      let mut seen = HashSet::new();
      picks.iter().map(|ix| &pool[ix.index(pool.len())]).filter(|q| seen.insert(q.id)).collect::<Vec<_>>()
    };
    let (p1, p2) = (parent(&picks1[..]), parent(&picks2[..]));
    let mut rng = StdRng::seed_from_u64(seed);
    let child = crossover(&p1, &p2, target, &mut rng);
    assert_unique(child.iter().map(|q| q.id))?;
  }

  #[test]
  fn mutation_preserves_types_and_uniqueness(pool in pool_strategy(60), take in 1usize..20, seed in any::<u64>()) {
    let by_type = group_by_type(&pool);
    let mut genes: Vec<&Question> = pool.iter().take(take).collect();
    let before: Vec<QuestionType> = genes.iter().map(|q| q.question_type).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    mutate(&mut genes, &by_type, &mut rng);
    let after: Vec<QuestionType> = genes.iter().map(|q| q.question_type).collect();
    prop_assert_eq!(before, after);
    assert_unique(genes.iter().map(|q| q.id))?;
  }
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(48))]

  // ==================== Genetic optimizer ====================

  #[test]
  fn genetic_output_never_repeats_a_question(pool in pool_strategy(80), rule in rule_strategy(), seed in any::<u64>()) {
    let settings = GeneticSettings { population_size: 12, max_generations: 15, ..GeneticSettings::default() };
    let subjects = catalog();
    let mut rng = StdRng::seed_from_u64(seed);
    let out = GeneticOptimizer::new(&settings, &subjects).optimize(&pool, &rule, &mut rng);
    prop_assert!(out.generations <= 15);
    if !pool.is_empty() {
      prop_assert!(out.fitness.is_some());
    }
    assert_unique(out.questions.iter().map(|q| q.id))?;
  }
}

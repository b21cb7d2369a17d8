//! Built-in subjects and question bank, so the service is usable without any config.

use crate::domain::{Difficulty, Question, QuestionType};
use crate::subjects::SubjectEntry;

/// Questions generated per (subject, type, difficulty) bucket.
pub const SEED_QUESTIONS_PER_BUCKET: usize = 6;

pub fn seed_subjects() -> Vec<SubjectEntry> {
  vec![
    SubjectEntry { id: 1, name: "数学".into(), keywords: vec!["函数".into(), "方程".into(), "几何".into()] },
    SubjectEntry { id: 2, name: "物理".into(), keywords: vec!["力学".into(), "电路".into(), "光学".into()] },
    SubjectEntry { id: 3, name: "英语".into(), keywords: vec!["语法".into(), "阅读".into(), "词汇".into()] },
  ]
}

/// An evenly distributed synthetic bank: every subject has the same number of questions in
/// every (type, difficulty) bucket, and every title carries one of its subject's keywords.
pub fn seed_questions() -> Vec<Question> {
  let mut out = Vec::new();
  let mut id = 0u64;
  for subject in seed_subjects() {
    for qt in QuestionType::ALL {
      for diff in Difficulty::ALL {
        for i in 0..SEED_QUESTIONS_PER_BUCKET {
          id += 1;
          let k = i % subject.keywords.len().max(1);
          let keyword = subject.keywords.get(k).map(String::as_str).unwrap_or("综合");
          let mut q = Question::new(id, format!("{keyword}·{}·{} #{id}", type_label(qt), difficulty_label(diff)), qt, diff, subject.id);
          q.knowledge_point_ids = vec![subject.id * 100 + k as u64];
          q.correct_answer = sample_answer(qt).into();
          out.push(q);
        }
      }
    }
  }
  out
}

fn type_label(qt: QuestionType) -> &'static str {
  match qt {
    QuestionType::SingleChoice => "单选",
    QuestionType::MultipleChoice => "多选",
    QuestionType::FillBlank => "填空",
    QuestionType::TrueFalse => "判断",
    QuestionType::ShortAnswer => "简答",
  }
}

fn difficulty_label(d: Difficulty) -> &'static str {
  match d {
    Difficulty::Easy => "基础",
    Difficulty::Medium => "提高",
    Difficulty::Hard => "拓展",
  }
}

fn sample_answer(qt: QuestionType) -> &'static str {
  match qt {
    QuestionType::SingleChoice => "A",
    QuestionType::MultipleChoice => "AC",
    QuestionType::FillBlank => "见解析",
    QuestionType::TrueFalse => "正确",
    QuestionType::ShortAnswer => "略",
  }
}

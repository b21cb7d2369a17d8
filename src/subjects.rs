//! Subject lookup: subject id -> display name and relevance keywords.
//!
//! The engine only sees the `SubjectLookup` trait. The service builds a `SubjectCatalog`
//! once at startup (TOML config or seeds) and shares it read-only.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub trait SubjectLookup: Send + Sync {
  fn name_for_id(&self, id: u64) -> Option<&str>;

  /// Empty slice means "no keyword restriction".
  fn keywords_for_id(&self, id: u64) -> &[String];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubjectEntry {
  pub id: u64,
  pub name: String,
  #[serde(default)]
  pub keywords: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct SubjectCatalog {
  by_id: BTreeMap<u64, SubjectEntry>,
}

impl SubjectCatalog {
  /// Later entries with the same id replace earlier ones.
  pub fn new(entries: impl IntoIterator<Item = SubjectEntry>) -> Self {
    let by_id = entries.into_iter().map(|e| (e.id, e)).collect();
    Self { by_id }
  }

  pub fn entries(&self) -> impl Iterator<Item = &SubjectEntry> {
    self.by_id.values()
  }

  pub fn len(&self) -> usize {
    self.by_id.len()
  }

  pub fn is_empty(&self) -> bool {
    self.by_id.is_empty()
  }
}

impl SubjectLookup for SubjectCatalog {
  fn name_for_id(&self, id: u64) -> Option<&str> {
    self.by_id.get(&id).map(|e| e.name.as_str())
  }

  fn keywords_for_id(&self, id: u64) -> &[String] {
    self.by_id.get(&id).map(|e| e.keywords.as_slice()).unwrap_or(&[])
  }
}

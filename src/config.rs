//! Loading service configuration (engine knobs, subject catalog, question bank) from TOML.
//!
//! Every table is optional. See `AppConfig` for the expected schema.

use serde::Deserialize;
use tracing::{error, info};

use crate::assembly::EngineSettings;
use crate::domain::Question;
use crate::subjects::SubjectEntry;

pub const CONFIG_PATH_ENV: &str = "ASSEMBLY_CONFIG_PATH";

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppConfig {
  #[serde(default)]
  pub engine: EngineSettings,
  #[serde(default)]
  pub subjects: Vec<SubjectEntry>,
  /// Local question bank. Empty means "use the built-in seed bank".
  #[serde(default)]
  pub questions: Vec<Question>,
}

pub fn parse_app_config(s: &str) -> Result<AppConfig, toml::de::Error> {
  toml::from_str::<AppConfig>(s)
}

/// Attempt to load `AppConfig` from ASSEMBLY_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_app_config_from_env() -> Option<AppConfig> {
  let path = std::env::var(CONFIG_PATH_ENV).ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_app_config(&s) {
      Ok(cfg) => {
        info!(
          target: "exam_backend",
          %path,
          subjects = cfg.subjects.len(),
          questions = cfg.questions.len(),
          strategy = ?cfg.engine.strategy,
          "Loaded assembly config (TOML)"
        );
        Some(cfg)
      }
      Err(e) => {
        error!(target: "exam_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "exam_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

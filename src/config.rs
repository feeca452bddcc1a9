//! Loading practice configuration (prompts + runner settings) from TOML.
//!
//! See `PracticeConfig`, `Prompts`, `RunnerConfig` and `SessionConfig` for expected schema.
//! Every table and field is optional; missing ones keep their defaults.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct PracticeConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub runner: RunnerConfig,
  #[serde(default)]
  pub sessions: SessionConfig,
}

/// Prompts used by the OpenAI client. Placeholders:
/// `{topic}` in the problem template, `{problem}` and `{code}` in the hint template.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  // Problem generation
  pub problem_system: String,
  pub problem_user_template: String,
  // Hints for incorrect submissions
  pub hint_system: String,
  pub hint_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      problem_system: "You create Python coding problems that use print() statements. The expected output must match exactly what print() would display. Respond ONLY with a JSON object.".into(),
      problem_user_template: concat!(
        "Create a simple Python problem about {topic} that uses print() statements.\n\n",
        "Return a JSON object of this shape:\n",
        "{\"problem\": \"Clear problem description\", \"expected_output\": \"The exact output print() would show\"}\n\n",
        "If the solution prints several lines, join them with \\n in expected_output.\n\n",
        "Example:\n",
        "{\"problem\": \"Write a loop that prints even numbers from 1 to 10\", \"expected_output\": \"2\\n4\\n6\\n8\\n10\"}",
      ).into(),
      hint_system: concat!(
        "You are a helpful coding coach. Give VERY VAGUE hints when students have errors.\n\n",
        "Rules:\n",
        "- Never give the solution or write code.\n",
        "- Never point to specific lines.\n",
        "- Never mention specific variable names.\n",
        "- Never tell them which exact construct to use.\n",
        "- Keep hints to 1-2 sentences.\n",
        "- Be encouraging and positive.\n\n",
        "Good hints: \"Think about the order of your operations.\", \"Remember what each loop iteration should do.\"\n",
        "Bad hints: \"You forgot a colon on line 3.\", \"Change 'x' to 'y'.\", \"Use a for loop instead of while.\"",
      ).into(),
      hint_user_template: "Problem: {problem}\n\nStudent's code (which has an error):\n```python\n{code}\n```\n\nGive one brief, vague hint that helps them think about the problem differently.".into(),
    }
  }
}

/// How submitted code is executed.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
  /// Interpreter binary; receives the temp file path as its only argument.
  pub interpreter: String,
  pub timeout_secs: u64,
}

impl Default for RunnerConfig {
  fn default() -> Self {
    Self { interpreter: "python3".into(), timeout_secs: 5 }
  }
}

/// Bounds on the in-memory session store.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
  /// Records not written for this long are dropped.
  pub idle_ttl_secs: u64,
  pub max_sessions: usize,
}

impl Default for SessionConfig {
  fn default() -> Self {
    Self { idle_ttl_secs: 24 * 60 * 60, max_sessions: 10_000 }
  }
}

/// Attempt to load `PracticeConfig` from PRACTICE_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_practice_config_from_env() -> Option<PracticeConfig> {
  let path = std::env::var("PRACTICE_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_practice_config(&s) {
      Ok(cfg) => {
        info!(target: "adaptipy", %path, "Loaded practice config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "adaptipy", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "adaptipy", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

pub fn parse_practice_config(s: &str) -> Result<PracticeConfig, toml::de::Error> {
  toml::from_str::<PracticeConfig>(s)
}

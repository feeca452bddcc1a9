//! Core behaviors behind the practice page.
//!
//! This includes:
//!   - Generating a problem for a topic (OpenAI, else the built-in table)
//!   - Advising a vague hint for an incorrect submission (OpenAI, else a fixed line)
//!   - The stateless topic recommendation

use tracing::{error, info, instrument, warn};

use crate::domain::{Problem, ProblemSource, Topic};
use crate::error::ModelError;
use crate::protocol::RecommendOut;
use crate::seeds::{fallback_problem, FALLBACK_HINT};
use crate::state::AppState;
use crate::util::trunc_for_log;

/// Problem for `topic`. Never fails: model errors fall back to the static table.
#[instrument(level = "info", skip(state), fields(%topic))]
pub async fn generate_problem(state: &AppState, topic: Topic) -> (Problem, ProblemSource) {
  let result = match &state.openai {
    Some(oa) => oa.generate_problem(&state.prompts, topic).await,
    None => Err(ModelError::Disabled),
  };

  match result {
    Ok(p) => {
      info!(target: "problem", %topic, source = "generated", problem = %trunc_for_log(&p.description, 80), expected = ?trunc_for_log(&p.expected_output, 40), "Problem ready");
      (p, ProblemSource::Generated)
    }
    Err(e) => {
      match e {
        ModelError::Disabled => warn!(target: "problem", %topic, "OPENAI_API_KEY not set; using built-in problem"),
        e => error!(target: "problem", %topic, error = %e, "Problem generation failed; using built-in problem"),
      }
      let p = fallback_problem(topic);
      info!(target: "problem", %topic, source = "fallback", problem = %trunc_for_log(&p.description, 80), expected = ?trunc_for_log(&p.expected_output, 40), "Problem ready");
      (p, ProblemSource::Fallback)
    }
  }
}

/// One or two vague, encouraging sentences. Never fails.
#[instrument(level = "info", skip(state, code, problem), fields(code_len = code.len()))]
pub async fn advise_hint(state: &AppState, code: &str, problem: &str) -> String {
  let result = match &state.openai {
    Some(oa) => oa.hint(&state.prompts, code, problem).await,
    None => Err(ModelError::Disabled),
  };

  match result {
    Ok(t) => t,
    Err(ModelError::Disabled) => FALLBACK_HINT.to_string(),
    Err(e) => {
      error!(target: "problem", error = %e, "OpenAI hint failed; using fallback hint.");
      FALLBACK_HINT.to_string()
    }
  }
}

/// Static acknowledgment for a weak area. No model call, no session access.
pub fn recommend_problem(weakness: Option<&str>) -> RecommendOut {
  let weakness = weakness
    .map(str::trim)
    .filter(|w| !w.is_empty())
    .unwrap_or(Topic::Loops.as_str())
    .to_string();
  RecommendOut {
    recommended_topic: weakness.clone(),
    message: format!("Try practicing {} problems!", weakness),
    weakness,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::Prompts;
  use crate::openai::OpenAI;
  use crate::runner::CodeRunner;

  fn offline_state() -> AppState {
    AppState::from_parts(None, Prompts::default(), CodeRunner::default())
  }

  fn unreachable_model_state() -> AppState {
    let oa = OpenAI::new("sk-test".into(), "http://127.0.0.1:9/v1".into(), "gpt-3.5-turbo".into());
    AppState::from_parts(oa, Prompts::default(), CodeRunner::default())
  }

  #[tokio::test]
  async fn every_topic_yields_content_without_a_model() {
    let state = offline_state();
    for t in Topic::ALL {
      let (p, source) = generate_problem(&state, t).await;
      assert_eq!(source, ProblemSource::Fallback);
      assert!(!p.description.is_empty());
      assert!(!p.expected_output.is_empty());
    }
  }

  #[tokio::test]
  async fn failing_model_call_falls_back_to_table() {
    let state = unreachable_model_state();
    let (p, source) = generate_problem(&state, Topic::Strings).await;
    assert_eq!(source, ProblemSource::Fallback);
    assert_eq!(p, fallback_problem(Topic::Strings));
  }

  #[tokio::test]
  async fn unrecognized_topic_label_gets_loops_problem() {
    let state = offline_state();
    let (p, _) = generate_problem(&state, Topic::resolve("quantum computing")).await;
    assert_eq!(p.description, "Write a loop that prints numbers 1 to 5");
    assert_eq!(p.expected_output, "1\n2\n3\n4\n5");
  }

  #[tokio::test]
  async fn hint_falls_back_to_fixed_message() {
    assert_eq!(advise_hint(&offline_state(), "print(1)", "Print 2").await, FALLBACK_HINT);
    assert_eq!(advise_hint(&unreachable_model_state(), "print(1)", "Print 2").await, FALLBACK_HINT);
  }

  #[test]
  fn recommend_defaults_to_loops() {
    let out = recommend_problem(None);
    let v = serde_json::to_value(&out).expect("serialize");
    assert_eq!(
      v,
      serde_json::json!({
        "weakness": "loops",
        "recommended_topic": "loops",
        "message": "Try practicing loops problems!"
      })
    );
  }

  #[test]
  fn recommend_echoes_supplied_weakness() {
    let out = recommend_problem(Some("recursion"));
    assert_eq!(out.weakness, "recursion");
    assert_eq!(out.recommended_topic, "recursion");
    assert_eq!(out.message, "Try practicing recursion problems!");
    assert_eq!(recommend_problem(Some("  ")).weakness, "loops");
  }
}

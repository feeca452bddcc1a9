//! Minimal OpenAI client for our use-cases.
//!
//! We only call chat.completions and request either plain text or a strict JSON object.
//! Calls are instrumented and log model names, latencies, and response sizes (not contents).
//!
//! NOTE: We never log the API key or the learner's code.

use std::time::{Duration, Instant};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::Prompts;
use crate::domain::{Problem, Topic};
use crate::error::ModelError;
use crate::util::{fill_template, trunc_for_log};

const PROBLEM_MAX_TOKENS: u32 = 150;
const PROBLEM_TEMPERATURE: f32 = 0.7;
const HINT_MAX_TOKENS: u32 = 100;
const HINT_TEMPERATURE: f32 = 0.3;

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

/// Shape we ask the model to produce for a new problem.
#[derive(Deserialize)]
struct GeneratedProblem {
  problem: String,
  expected_output: String,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".into());
    Self::new(api_key, base_url, model)
  }

  pub fn new(api_key: String, base_url: String, model: String) -> Option<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;
    let base_url = base_url.trim_end_matches('/').to_string();
    Some(Self { client, api_key, base_url, model })
  }

  /// Send one chat completion and return the first choice's text, trimmed.
  async fn chat(&self, req: &ChatCompletionRequest) -> Result<String, ModelError> {
    let url = format!("{}/chat/completions", self.base_url);
    let res = self.client.post(&url)
      .header(USER_AGENT, "adaptipy-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(req).send().await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or(body);
      return Err(ModelError::Http { status, message });
    }

    let body: ChatCompletionResponse = res
      .json()
      .await
      .map_err(|e| ModelError::Malformed(format!("completion envelope: {}", e)))?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let text = body.choices.into_iter().next()
      .and_then(|c| c.message.content)
      .unwrap_or_default().trim().to_string();

    if text.is_empty() {
      return Err(ModelError::EmptyReply);
    }
    Ok(text)
  }

  /// Plain-text chat completion. Used for hints.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model))]
  async fn chat_plain(
    &self,
    system: &str,
    user: &str,
    temperature: f32,
    max_tokens: u32,
  ) -> Result<String, ModelError> {
    let req = ChatCompletionRequest::new(&self.model, system, user, temperature, max_tokens, None);
    self.chat(&req).await
  }

  /// JSON-object chat completion. Returns the raw reply text; callers validate the shape.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model))]
  async fn chat_json(
    &self,
    system: &str,
    user: &str,
    temperature: f32,
    max_tokens: u32,
  ) -> Result<String, ModelError> {
    let req = ChatCompletionRequest::new(
      &self.model,
      system,
      user,
      temperature,
      max_tokens,
      Some(ResponseFormat { r#type: "json_object".into() }),
    );
    self.chat(&req).await
  }

  // --- High-level helpers (domain-specialized) ---

  /// Ask for a new problem and its exact expected output.
  #[instrument(level = "info", skip(self, prompts, topic), fields(%topic, model = %self.model))]
  pub async fn generate_problem(&self, prompts: &Prompts, topic: Topic) -> Result<Problem, ModelError> {
    let user = fill_template(&prompts.problem_user_template, &[("topic", topic.as_str())]);
    let start = Instant::now();
    let result = self
      .chat_json(&prompts.problem_system, &user, PROBLEM_TEMPERATURE, PROBLEM_MAX_TOKENS)
      .await
      .and_then(|text| parse_generated_problem(&text));
    let elapsed = start.elapsed();

    match &result {
      Ok(p) => info!(
        ?elapsed,
        problem_preview = %trunc_for_log(&p.description, 60),
        expected_preview = ?trunc_for_log(&p.expected_output, 40),
        "Problem generated"
      ),
      Err(e) => error!(?elapsed, error = %e, "Model call failed during problem generation"),
    }
    result
  }

  /// Ask for a short, vague hint about an incorrect submission.
  #[instrument(level = "info", skip(self, prompts, code, problem), fields(code_len = code.len(), problem_len = problem.len()))]
  pub async fn hint(&self, prompts: &Prompts, code: &str, problem: &str) -> Result<String, ModelError> {
    let user = hint_prompt(prompts, code, problem);
    self.chat_plain(&prompts.hint_system, &user, HINT_TEMPERATURE, HINT_MAX_TOKENS).await
  }
}

/// User message for a hint request. Braces inside the problem or the code are kept as typed.
pub fn hint_prompt(prompts: &Prompts, code: &str, problem: &str) -> String {
  fill_template(&prompts.hint_user_template, &[("problem", problem), ("code", code)])
}

/// Validate the model's free-form JSON. Anything other than an object with two
/// non-blank string fields is `Malformed`.
pub fn parse_generated_problem(text: &str) -> Result<Problem, ModelError> {
  let gen: GeneratedProblem = serde_json::from_str(text.trim())
    .map_err(|e| ModelError::Malformed(e.to_string()))?;
  if gen.problem.trim().is_empty() {
    return Err(ModelError::Malformed("blank 'problem'".into()));
  }
  if gen.expected_output.trim().is_empty() {
    return Err(ModelError::Malformed("blank 'expected_output'".into()));
  }
  Ok(Problem::new(gen.problem, gen.expected_output))
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
}

impl ChatCompletionRequest {
  fn new(
    model: &str,
    system: &str,
    user: &str,
    temperature: f32,
    max_tokens: u32,
    response_format: Option<ResponseFormat>,
  ) -> Self {
    Self {
      model: model.to_string(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
      response_format,
      max_tokens: Some(max_tokens),
    }
  }
}

#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_well_formed_problem() {
    let p = parse_generated_problem(
      r#"{"problem": "Print 1 to 3", "expected_output": "1\n2\n3"}"#,
    ).expect("valid reply");
    assert_eq!(p.description, "Print 1 to 3");
    assert_eq!(p.expected_output, "1\n2\n3");
  }

  #[test]
  fn rejects_non_json_text() {
    let err = parse_generated_problem("Sure! Here is a problem: print hello").unwrap_err();
    assert!(matches!(err, ModelError::Malformed(_)));
  }

  #[test]
  fn rejects_missing_or_mistyped_fields() {
    assert!(matches!(
      parse_generated_problem(r#"{"problem": "Print hi"}"#),
      Err(ModelError::Malformed(_))
    ));
    assert!(matches!(
      parse_generated_problem(r#"{"problem": "Print 1", "expected_output": 1}"#),
      Err(ModelError::Malformed(_))
    ));
    assert!(matches!(
      parse_generated_problem(r#"{"problem": "  ", "expected_output": "1"}"#),
      Err(ModelError::Malformed(_))
    ));
  }

  #[test]
  fn extracts_provider_error_message() {
    let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
    assert_eq!(extract_openai_error(body).as_deref(), Some("Incorrect API key provided"));
    assert_eq!(extract_openai_error("<html>bad gateway</html>"), None);
  }

  #[test]
  fn request_carries_token_bound_and_json_mode() {
    let req = ChatCompletionRequest::new(
      "gpt-3.5-turbo",
      "sys",
      "user",
      0.7,
      150,
      Some(ResponseFormat { r#type: "json_object".into() }),
    );
    let v = serde_json::to_value(&req).expect("serialize");
    assert_eq!(v["max_tokens"], 150);
    assert_eq!(v["response_format"]["type"], "json_object");
    assert_eq!(v["messages"][0]["role"], "system");
    assert_eq!(v["messages"][1]["content"], "user");
  }

  #[test]
  fn hint_prompt_keeps_braces_from_the_problem_text() {
    let prompts = Prompts::default();
    let user = hint_prompt(&prompts, "print(x)", "Use f'{code}' to print the value");
    assert!(user.contains("Problem: Use f'{code}' to print the value"));
    assert_eq!(user.matches("print(x)").count(), 1);
  }

  #[tokio::test]
  async fn unreachable_endpoint_is_a_transport_error() {
    let oa = OpenAI::new("sk-test".into(), "http://127.0.0.1:9/v1/".into(), "gpt-3.5-turbo".into())
      .expect("client");
    assert_eq!(oa.base_url, "http://127.0.0.1:9/v1");
    let err = oa.generate_problem(&Prompts::default(), Topic::Loops).await.unwrap_err();
    assert!(matches!(err, ModelError::Transport(_)), "got {err}");
  }
}

//! Error types for the two fallible external calls: the model API and the code runner.
//!
//! Neither ever reaches the learner. Callers match on them, log, and fall back.

use std::time::Duration;

/// Failure talking to the chat-completions endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
  /// No API key configured, so no client was built.
  #[error("model disabled (OPENAI_API_KEY not set)")]
  Disabled,

  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("OpenAI HTTP {status}: {message}")]
  Http { status: u16, message: String },

  #[error("model returned an empty reply")]
  EmptyReply,

  /// Reply was not JSON, or lacked the expected fields, or had the wrong types.
  #[error("malformed model reply: {0}")]
  Malformed(String),
}

/// Failure running submitted code. All variants grade as incorrect.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
  #[error("could not prepare temp file: {0}")]
  TempFile(#[source] std::io::Error),

  #[error("could not start '{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  #[error("wait for child failed: {0}")]
  Wait(#[source] std::io::Error),

  #[error("timed out after {0:?}")]
  Timeout(Duration),

  #[error("could not remove temp file: {0}")]
  Cleanup(#[source] std::io::Error),
}

//! Domain models used by the backend: topics, problems, and grading results.

use std::fmt;

/// Which programming concept a generated problem should exercise?
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
  Loops,
  Strings,
  Arrays,
  Recursion,
  Conditionals,
  Variables,
}
impl Default for Topic {
  fn default() -> Self { Topic::Loops }
}

impl Topic {
  /// Every topic, in the order they are offered to the learner.
  pub const ALL: [Topic; 6] = [
    Topic::Loops,
    Topic::Strings,
    Topic::Arrays,
    Topic::Recursion,
    Topic::Conditionals,
    Topic::Variables,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Topic::Loops => "loops",
      Topic::Strings => "strings",
      Topic::Arrays => "arrays",
      Topic::Recursion => "recursion",
      Topic::Conditionals => "conditionals",
      Topic::Variables => "variables",
    }
  }

  /// Case-insensitive lookup of a label; `None` for anything outside the set.
  pub fn from_label(label: &str) -> Option<Topic> {
    let label = label.trim();
    Topic::ALL.into_iter().find(|t| t.as_str().eq_ignore_ascii_case(label))
  }

  /// Like `from_label`, but unknown labels resolve to `Loops`.
  pub fn resolve(label: &str) -> Topic {
    Topic::from_label(label).unwrap_or_default()
  }
}

impl fmt::Display for Topic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Where did the current problem come from?
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProblemSource {
  Generated, // model reply, validated
  Fallback,  // static table
}

impl ProblemSource {
  pub fn as_str(self) -> &'static str {
    match self {
      ProblemSource::Generated => "generated",
      ProblemSource::Fallback => "fallback",
    }
  }
}

/// A practice exercise. Description and expected output always travel together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Problem {
  pub description: String,
  /// Exact stdout of a correct solution, lines joined by '\n'.
  pub expected_output: String,
}

impl Problem {
  pub fn new(description: impl Into<String>, expected_output: impl Into<String>) -> Self {
    Self { description: description.into(), expected_output: expected_output.into() }
  }
}

/// Outcome of one grading attempt. Never stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionResult {
  pub is_correct: bool,
  /// Trimmed stdout; empty on any execution failure.
  pub actual_output: String,
}

impl SubmissionResult {
  pub fn failed() -> Self {
    Self { is_correct: false, actual_output: String::new() }
  }
}

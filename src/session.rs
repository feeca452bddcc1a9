//! Per-learner session record and the request flow that drives it.
//!
//! A request carries any combination of intents, applied in this order:
//! select topic, new problem, ensure a problem exists, grade submitted code.
//! The flow takes the session by value and hands back the updated record; the
//! route handler is responsible for storing it.

use tracing::{info, instrument};

use crate::domain::{Problem, Topic};
use crate::logic::{advise_hint, generate_problem};
use crate::protocol::{PracticeForm, PracticeView};
use crate::state::AppState;

/// Mutable state of one learner. The problem and its expected output live in
/// one `Option`, so they are always present or absent together.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub selected_topic: Topic,
    pub current: Option<Problem>,
}

impl SessionState {
    /// Switch topic and drop the current problem so the next view regenerates.
    pub fn select_topic(&mut self, topic: Topic) {
        self.selected_topic = topic;
        self.current = None;
    }

    /// Drop the current problem; topic unchanged.
    pub fn new_problem(&mut self) {
        self.current = None;
    }
}

/// Feedback for one graded submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub correct: bool,
    pub message: String,
    pub hint: Option<String>,
}

/// Generate and store a problem if none is held. Returns the held problem.
#[instrument(level = "info", skip(state, session), fields(topic = %session.selected_topic))]
pub async fn ensure_problem(state: &AppState, session: &mut SessionState) -> Problem {
    if let Some(p) = &session.current {
        return p.clone();
    }
    let (p, source) = generate_problem(state, session.selected_topic).await;
    info!(target: "problem", topic = %session.selected_topic, source = source.as_str(), "Stored new problem in session");
    session.current = Some(p.clone());
    p
}

/// Grade `code` against `problem`. Correct answers clear the session problem;
/// incorrect ones keep it and come with a hint.
#[instrument(level = "info", skip(state, session, code, problem), fields(code_len = code.len()))]
pub async fn submit(
    state: &AppState,
    session: &mut SessionState,
    code: &str,
    problem: &Problem,
) -> SubmitOutcome {
    let run = state.runner.run_and_check(code, &problem.expected_output).await;
    if run.is_correct {
        info!(target: "problem", topic = %session.selected_topic, "Correct submission; clearing problem");
        session.new_problem();
        SubmitOutcome {
            correct: true,
            message: format!("Correct! Your output: {}", run.actual_output),
            hint: None,
        }
    } else {
        info!(target: "problem", topic = %session.selected_topic, got_output = !run.actual_output.is_empty(), "Incorrect submission");
        let got = if run.actual_output.is_empty() { "No output" } else { run.actual_output.as_str() };
        let message = format!("Not quite right. Expected: {}, Got: {}", problem.expected_output, got);
        let hint = advise_hint(state, code, &problem.description).await;
        SubmitOutcome { correct: false, message, hint: Some(hint) }
    }
}

/// Apply one request's intents to `session` and build the page view.
#[instrument(level = "info", skip(state, session, form), fields(
    select_topic = form.select_topic.is_some(),
    new_problem = form.new_problem.is_some(),
    has_code = form.code.is_some()
))]
pub async fn handle_request(
    state: &AppState,
    mut session: SessionState,
    form: &PracticeForm,
) -> (SessionState, PracticeView) {
    if form.select_topic.is_some() {
        let topic = Topic::resolve(form.topic.as_deref().unwrap_or_default());
        session.select_topic(topic);
    }
    if form.new_problem.is_some() {
        session.new_problem();
    }

    let problem = ensure_problem(state, &mut session).await;

    let user_code = form.code.clone().unwrap_or_default();
    let outcome = if user_code.is_empty() {
        None
    } else {
        Some(submit(state, &mut session, &user_code, &problem).await)
    };

    let view = PracticeView {
        result: outcome.as_ref().map(|o| o.message.clone()),
        correct: outcome.as_ref().map(|o| o.correct),
        user_code,
        problem: problem.description,
        topics: Topic::ALL.to_vec(),
        selected_topic: session.selected_topic,
        hint: outcome.and_then(|o| o.hint),
    };
    (session, view)
}

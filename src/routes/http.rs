//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs basic result info.

use std::sync::Arc;
use axum::{
  extract::{Query, State},
  http::{header::SET_COOKIE, HeaderMap},
  response::{Html, IntoResponse},
  Form, Json,
};
use tracing::{info, instrument};

use crate::protocol::*;
use crate::logic::recommend_problem;
use crate::render::render_practice_page;
use crate::session::handle_request;
use crate::state::AppState;
use crate::util::cookie_value;

pub const SESSION_COOKIE: &str = "adaptipy_session";

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state, headers))]
pub async fn http_get_practice(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
) -> impl IntoResponse {
  practice(&state, &headers, PracticeForm::default()).await
}

#[instrument(level = "info", skip(state, headers, form))]
pub async fn http_post_practice(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  Form(form): Form<PracticeForm>,
) -> impl IntoResponse {
  practice(&state, &headers, form).await
}

/// Load the caller's session, run the flow, store the result, render the page.
async fn practice(state: &AppState, headers: &HeaderMap, form: PracticeForm) -> impl IntoResponse {
  let cookie = cookie_value(headers, SESSION_COOKIE);
  let (sid, session) = state.load_session(cookie.as_deref()).await;

  let (session, view) = handle_request(state, session, &form).await;
  info!(target: "adaptipy", topic = %view.selected_topic, graded = view.correct.is_some(), correct = ?view.correct, "Practice page served");
  state.save_session(&sid, session).await;

  let set_cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, sid);
  ([(SET_COOKIE, set_cookie)], Html(render_practice_page(&view)))
}

#[instrument(level = "info", skip(q), fields(weakness = ?q.weakness))]
pub async fn http_get_recommend(Query(q): Query<RecommendQuery>) -> impl IntoResponse {
  Json(recommend_problem(q.weakness.as_deref()))
}

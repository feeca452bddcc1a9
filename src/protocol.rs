//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::Topic;

/// Form fields accepted by `POST /`. Presence of a key is the intent; several
/// intents may arrive together.
#[derive(Debug, Default, Deserialize)]
pub struct PracticeForm {
    /// Present when the topic picker was submitted; `topic` carries the choice.
    #[serde(default)]
    pub select_topic: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub new_problem: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

/// Everything the practice page shows for one request.
#[derive(Debug)]
pub struct PracticeView {
    pub result: Option<String>,
    /// Set together with `result`.
    pub correct: Option<bool>,
    pub user_code: String,
    pub problem: String,
    pub topics: Vec<Topic>,
    pub selected_topic: Topic,
    pub hint: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    pub weakness: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendOut {
    pub weakness: String,
    pub recommended_topic: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

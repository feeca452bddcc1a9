//! Adaptipy · Coding Practice Backend
//!
//! - Axum HTTP server rendering a generated Python exercise
//! - Submitted code runs in a child process with a wall-clock timeout
//! - Optional OpenAI integration for problems and hints (via environment variables)
//!
//! Important env variables:
//!   PORT                 : u16 (default 3000)
//!   OPENAI_API_KEY       : enables OpenAI integration if present
//!   OPENAI_BASE_URL      : default "https://api.openai.com/v1"
//!   OPENAI_MODEL         : default "gpt-3.5-turbo"
//!   PRACTICE_CONFIG_PATH : path to TOML config (prompts + runner settings)
//!   LOG_LEVEL            : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT           : "pretty" (default) or "json"
//!
//! A `.env` file in the working directory is loaded first when present.

mod telemetry;
mod util;
mod domain;
mod error;
mod config;
mod seeds;
mod openai;
mod runner;
mod state;
mod session;
mod protocol;
mod logic;
mod render;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  let dotenv = dotenvy::dotenv();
  telemetry::init_tracing();
  match dotenv {
    Ok(path) => info!(target: "adaptipy", path = %path.display(), "Loaded .env"),
    Err(e) if e.not_found() => {}
    Err(e) => warn!(target: "adaptipy", error = %e, "Failed to load .env"),
  }

  // Build shared application state (session store, OpenAI client, prompts, runner).
  let state = Arc::new(AppState::new());

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "adaptipy", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

/// Resolves on Ctrl-C so in-flight requests can finish.
async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(target: "adaptipy", error = %e, "Failed to listen for Ctrl-C");
    std::future::pending::<()>().await;
  }
  info!(target: "adaptipy", "Shutdown signal received");
}

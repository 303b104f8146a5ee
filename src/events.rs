//! Append-only event log.
//!
//! Every state-changing command records an event in NDJSON format (one JSON
//! object per line) at `{home}/events/events.ndjson`. The log is an audit
//! trail only; nothing reads it back at run time.
//!
//! Each line carries:
//! - `ts`: RFC3339 timestamp
//! - `action`: what happened (create, fork, run_dispatch, run_complete)
//! - `actor`: `user@host` of whoever ran the command
//! - `agent`: optional agent id
//! - `details`: freeform action-specific object

use crate::context::AppContext;
use crate::error::{AgentryError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;

/// Actions recorded in the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Agent created.
    Create,
    /// Agent duplicated from an existing record.
    Fork,
    /// Run handed to a backend.
    RunDispatch,
    /// Backend process finished.
    RunComplete,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Create => write!(f, "create"),
            EventAction::Fork => write!(f, "fork"),
            EventAction::RunDispatch => write!(f, "run_dispatch"),
            EventAction::RunComplete => write!(f, "run_complete"),
        }
    }
}

/// One audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// When the event occurred.
    pub ts: DateTime<Utc>,

    /// What happened.
    pub action: EventAction,

    /// Who did it, as `user@host`.
    pub actor: String,

    /// The agent involved, when the action concerns one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<u64>,

    /// Action-specific details.
    pub details: Value,
}

impl Event {
    /// Create an event stamped with the current time and actor.
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: actor_string(),
            agent: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    /// Attach the agent id this event concerns.
    pub fn with_agent(mut self, id: u64) -> Self {
        self.agent = Some(id);
        self
    }

    /// Attach action-specific details.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize to a single NDJSON line (no trailing newline).
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| AgentryError::UserError(format!("failed to serialize event: {}", e)))
    }
}

fn actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Append an event to the log, creating the file on first use.
pub fn append_event(ctx: &AppContext, event: &Event) -> Result<()> {
    let json_line = event.to_ndjson_line()?;

    let events_dir = ctx.events_dir();
    if !events_dir.exists() {
        fs::create_dir_all(&events_dir).map_err(|e| {
            AgentryError::UserError(format!(
                "failed to create events directory '{}': {}",
                events_dir.display(),
                e
            ))
        })?;
    }

    let events_file = ctx.events_file();
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&events_file)
        .map_err(|e| {
            AgentryError::UserError(format!(
                "failed to open events file '{}': {}",
                events_file.display(),
                e
            ))
        })?;

    writeln!(file, "{}", json_line).map_err(|e| {
        AgentryError::UserError(format!(
            "failed to write event to '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    file.sync_all().map_err(|e| {
        AgentryError::UserError(format!(
            "failed to sync events file '{}': {}",
            events_file.display(),
            e
        ))
    })
}

//! Execution backends.
//!
//! A backend is an external command that receives the effective prompt and
//! runs it, typically an LLM CLI. Profiles live in `backends.yaml`; the
//! executor renders a profile's command template, spawns the process with
//! inherited stdio so output streams straight to the terminal, and enforces
//! a timeout.

pub mod config;
pub mod executor;

pub use config::{BackendDefaults, BackendProfile, BackendsConfig};
pub use executor::{RunOutcome, RunRequest, execute_backend};

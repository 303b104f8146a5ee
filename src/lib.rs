//! Agentry: author, share and run parameterized agent prompts.
//!
//! The heart of the crate is [`vars`], a small templating engine for prompts
//! carrying an embedded parameter schema. Around it sit a file-backed agent
//! store, share-link helpers, and subprocess execution backends.

pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod fs;
pub mod share;
pub mod store;
pub mod vars;

//! Prompt template engine for agent prompts.
//!
//! An agent prompt is a single stored string with two logical parts:
//!
//! 1. An optional schema block declaring named parameters, delimited by
//!    `<!-- VARS` / `VARS -->` markers with a JSON object between them.
//! 2. A body: free text referencing parameters as `{name}` tokens.
//!
//! ```text
//! <!-- VARS
//! { "topic": { "label": "Topic", "required": true } }
//! VARS -->
//! Research {topic} and summarize the findings.
//! ```
//!
//! This module provides:
//!
//! - **Schema**: parameter specs and the total JSON decoder ([`ParamSpec`],
//!   [`ParamSchema`], [`normalize_param_name`])
//! - **Block**: splitting a prompt into schema + body and recombining them
//!   ([`extract_vars`], [`compose_prompt`])
//! - **Subst**: value substitution and required-parameter gating
//!   ([`apply_values`], [`override_prompt`])
//!
//! # Failure semantics
//!
//! The engine never errors. A missing or malformed schema block degrades to
//! "no schema, whole string is body"; invalid schema entries are dropped
//! per-entry; substitution only performs literal matches it can find. All
//! functions are pure and hold no state between calls.

mod block;
mod schema;
mod subst;

pub use block::{BLOCK_END, BLOCK_START, PromptParts, compose_prompt, extract_vars};
pub use schema::{ParamKind, ParamSchema, ParamSpec, normalize_param_name};
pub use subst::{apply_values, missing_required, override_prompt};

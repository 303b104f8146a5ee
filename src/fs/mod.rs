//! Filesystem utilities.
//!
//! Agent records and run artifacts are plain files, so a crash mid-write must
//! never leave a half-written record behind. Everything that persists state
//! goes through [`atomic_write`].

mod atomic;

pub use atomic::{atomic_write, atomic_write_file};

//! Exit code constants for the agentry CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid input)
//! - 2: Not found (unknown agent id / share slug)
//! - 3: Validation failure (config problems)
//! - 4: Backend failure (spawn error, non-zero exit, timeout)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or invalid input.
pub const USER_ERROR: i32 = 1;

/// Lookup failure: agent id or share slug did not resolve to a record.
pub const NOT_FOUND: i32 = 2;

/// Validation failure: backends.yaml or config.yaml is invalid.
pub const VALIDATION_FAILURE: i32 = 3;

/// Backend failure: the execution backend could not be run or failed.
pub const BACKEND_FAILURE: i32 = 4;

//! Standard exit codes for CLI operations
//!
//! Every fatal condition maps to the general error code; callers and scripts
//! only distinguish success from failure.

#![allow(dead_code)]

/// Success - every missing chart was downloaded
pub const SUCCESS: i32 = 0;

/// General error - bad configuration, manifest failure or an exhausted retry budget
pub const ERROR: i32 = 1;

/// Process exit codes.
pub mod exit {
    pub const SUCCESS: i32 = 0;
    pub const OPERATIONAL_FAILURE: i32 = 1;
    /// The edited list was rejected; nothing was changed.
    pub const PLAN_FAILURE: i32 = 2;
    /// Some actions were applied before one failed.
    pub const PARTIAL_FAILURE: i32 = 3;
    pub const INTERRUPTED: i32 = 130;
}

use crate::error::Error;

/// Exit code for an error surfaced by the core.
pub fn for_error(error: &Error) -> i32 {
    match error {
        e if e.is_plan_error() => exit::PLAN_FAILURE,
        Error::Partial { .. } => exit::PARTIAL_FAILURE,
        _ => exit::OPERATIONAL_FAILURE,
    }
}

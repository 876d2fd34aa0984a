/// Exit codes for scripts and automation.
pub const SUCCESS: i32 = 0;
pub const INVALID_REQUEST: i32 = 2;
pub const OPERATION_FAILED: i32 = 3;
pub const RUNTIME_ERROR: i32 = 4;
pub const RETRIES_EXHAUSTED: i32 = 5;

//! Process execution (the command invoker).
//!
//! External commands are considered "world-touching" and must go through the HAL so we can
//! test mount flows without spawning real processes.

use crate::{Env, HalResult};
use std::process::Output;

/// External command runner.
pub trait ProcessOps {
    /// Run `program` to completion, or until the env's deadline or cancellation fires.
    ///
    /// A non-zero exit status is reported as `HalError::CommandFailed`; the returned
    /// `Output` always belongs to a successful run.
    fn invoke(&self, env: &Env, program: &str, args: &[String]) -> HalResult<Output>;
}

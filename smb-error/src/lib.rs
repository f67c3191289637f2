use std::fmt;
use std::io;
use thiserror::Error;

pub type HalResult<T> = Result<T, HalError>;
pub type DriverResult<T> = Result<T, DriverError>;

/// Failures reported by the command invoker and filesystem collaborators.
#[derive(Error, Debug)]
pub enum HalError {
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Command failed: {program} (exit={code:?}): {stderr}")]
    CommandFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Command timed out: {program} after {timeout_ms}ms")]
    CommandTimeout { program: String, timeout_ms: u64 },

    #[error("Command cancelled: {program}")]
    Cancelled { program: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Other(String),
}

/// Rejections raised while loading the option rules at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Malformed default assignment (expected name:value): {0}")]
    MalformedDefault(String),

    #[error("Options cannot be both mandatory and defaulted: {}", .0.join(", "))]
    RequiredHasDefault(Vec<String>),

    #[error("Options are supplied positionally and cannot be required or defaulted: {}", .0.join(", "))]
    ReservedInRules(Vec<String>),
}

/// Error whose rendered text is guaranteed to be free of credential values.
///
/// The message is redacted when the error is built; the original cause is
/// not retained so neither `Display` nor `Debug` can leak it later.
#[derive(Clone, PartialEq, Eq)]
pub struct SafeError {
    message: String,
}

pub const REDACTED: &str = "***";

impl SafeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Wrap a collaborator failure, scrubbing every secret value from its text.
    pub fn from_hal(context: &str, err: &HalError, secrets: &[&str]) -> Self {
        let cause = redact(&err.to_string(), secrets);
        Self::new(format!("{}: {}", context, cause))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SafeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Debug for SafeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SafeError").field(&self.message).finish()
    }
}

impl std::error::Error for SafeError {}

/// Replace every occurrence of each non-empty secret in `text`.
pub fn redact(text: &str, secrets: &[&str]) -> String {
    let mut out = text.to_string();
    // Longest first so a secret containing another is scrubbed whole.
    let mut ordered: Vec<&str> = secrets.iter().copied().filter(|s| !s.is_empty()).collect();
    ordered.sort_by_key(|s| std::cmp::Reverse(s.len()));
    for secret in ordered {
        out = out.replace(secret, REDACTED);
    }
    out
}

/// Errors returned to callers of the mount operations.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Missing mandatory options: {}", .0.join(", "))]
    MissingOptions(Vec<String>),

    #[error("Not allowed options: {}", .0.join(", "))]
    DisallowedOptions(Vec<String>),

    #[error("Options are supplied positionally and cannot be overridden: {}", .0.join(", "))]
    ReservedOptionOverride(Vec<String>),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Safe(#[from] SafeError),
}

impl DriverError {
    /// True for errors the caller can fix by changing the supplied options.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            DriverError::MissingOptions(_)
                | DriverError::DisallowedOptions(_)
                | DriverError::ReservedOptionOverride(_)
        )
    }
}

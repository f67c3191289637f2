//! SMB mount driver core.
//!
//! Validates a caller's mount options against the deployment's rules, renders
//! them into the argument vector of the host's mount tooling and runs it
//! through the [`smb_hal`] collaborators.

pub mod config;
pub mod mounter;
pub mod options;
pub mod render;

pub use config::{MountConfig, RESERVED_OPTIONS};
pub use mounter::{SmbMounter, CHECK_TIMEOUT};
pub use options::{OptionSet, OptionValue, RawOptions};
pub use render::{
    Invocation, Platform, PurgeStep, Removal, Renderer, ScriptRenderer, UnixRenderer,
    DEFAULT_SCRIPTS_DIR,
};
pub use smb_error::{ConfigError, DriverError, DriverResult, SafeError};

//! Collaborator layer for the SMB mount driver.
//!
//! Everything that touches the world (spawning `mount`, reading a directory,
//! following a link) goes through the traits in [`hal`] so the driver can be
//! exercised against [`FakeHal`] without root privileges or a network share.

pub mod env;
pub mod hal;

pub use env::Env;
pub use hal::{
    DirEntryInfo, DriverHal, FakeFailure, FakeHal, FsOps, Operation, OsHal, ProcessOps,
    DEFAULT_COMMAND_TIMEOUT,
};
pub use smb_error::{HalError, HalResult};

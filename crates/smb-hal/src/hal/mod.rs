//! HAL trait definitions and implementations.
//!
//! This module defines the collaborator traits the mount driver depends on
//! and provides both real (OsHal) and fake (FakeHal) implementations.

pub mod fake_hal;
pub mod fs_ops;
pub mod os_hal;
pub mod process_ops;

pub use fake_hal::{FakeFailure, FakeHal, Operation};
pub use fs_ops::{DirEntryInfo, FsOps};
pub use os_hal::{OsHal, DEFAULT_COMMAND_TIMEOUT};
pub use process_ops::ProcessOps;

/// Complete HAL combining every collaborator the driver needs.
pub trait DriverHal: ProcessOps + FsOps + Send + Sync {}

/// Automatically implement DriverHal for any type implementing all required traits.
impl<T> DriverHal for T where T: ProcessOps + FsOps + Send + Sync {}

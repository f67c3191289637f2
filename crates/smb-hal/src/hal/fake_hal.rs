//! Fake HAL implementation for testing.
//!
//! This implementation records all operations without executing them,
//! allowing for CI-safe testing without root privileges or a reachable share.

use super::{DirEntryInfo, FsOps, ProcessOps};
use crate::{Env, HalError, HalResult};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[cfg(unix)]
use std::os::unix::process::ExitStatusExt;
#[cfg(windows)]
use std::os::windows::process::ExitStatusExt;

/// Operation records for testing and verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Command {
        program: String,
        args: Vec<String>,
        /// Time left on the env's deadline when the command was issued.
        deadline: Option<Duration>,
    },
    ReadDir {
        path: PathBuf,
    },
    Remove {
        path: PathBuf,
    },
    RemoveAll {
        path: PathBuf,
    },
    ReadLink {
        path: PathBuf,
    },
}

/// Scripted outcome for a program the fake should fail.
#[derive(Debug, Clone)]
pub enum FakeFailure {
    Exit { code: i32, stderr: String },
    Timeout,
    NotFound,
}

/// Shared state for FakeHal operations.
#[derive(Debug, Default)]
struct FakeHalState {
    /// All operations that were recorded
    operations: Vec<Operation>,
    command_failures: HashMap<String, FakeFailure>,
    dirs: HashMap<PathBuf, Vec<DirEntryInfo>>,
    links: HashMap<PathBuf, String>,
    failing_paths: HashSet<PathBuf>,
}

/// Fake HAL implementation that records operations without executing them.
///
/// Clones share state, so a test can keep one handle while the mounter owns another.
#[derive(Debug, Clone, Default)]
pub struct FakeHal {
    state: Arc<Mutex<FakeHalState>>,
}

impl FakeHal {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeHalState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<Operation> {
        self.state().operations.clone()
    }

    /// Get the number of operations recorded.
    pub fn operation_count(&self) -> usize {
        self.state().operations.len()
    }

    /// Check if a specific operation was recorded.
    pub fn has_operation(&self, check: impl Fn(&Operation) -> bool) -> bool {
        self.state().operations.iter().any(check)
    }

    /// Recorded commands as `(program, args)` pairs, in call order.
    pub fn commands(&self) -> Vec<(String, Vec<String>)> {
        self.state()
            .operations
            .iter()
            .filter_map(|op| match op {
                Operation::Command { program, args, .. } => Some((program.clone(), args.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn command_count(&self) -> usize {
        self.commands().len()
    }

    /// Paths passed to `remove` and `remove_all`, in call order.
    pub fn removed_paths(&self) -> Vec<PathBuf> {
        self.state()
            .operations
            .iter()
            .filter_map(|op| match op {
                Operation::Remove { path } | Operation::RemoveAll { path } => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    /// Clear recorded operations; scripted behaviour is kept.
    pub fn clear(&self) {
        self.state().operations.clear();
    }

    /// Make every later invocation of `program` fail with `failure`.
    pub fn fail_command(&self, program: impl Into<String>, failure: FakeFailure) {
        self.state()
            .command_failures
            .insert(program.into(), failure);
    }

    /// Script the listing returned for `path`.
    pub fn set_dir(&self, path: impl Into<PathBuf>, entries: Vec<DirEntryInfo>) {
        self.state().dirs.insert(path.into(), entries);
    }

    /// Script a link at `path` pointing to `target`.
    pub fn set_link(&self, path: impl Into<PathBuf>, target: impl Into<String>) {
        self.state().links.insert(path.into(), target.into());
    }

    pub fn has_link(&self, path: &Path) -> bool {
        self.state().links.contains_key(path)
    }

    /// Make `remove`/`remove_all` of `path` fail.
    pub fn fail_path(&self, path: impl Into<PathBuf>) {
        self.state().failing_paths.insert(path.into());
    }

    fn record_operation(&self, op: Operation) {
        self.state().operations.push(op);
    }

    fn removal(&self, path: &Path, op: Operation) -> HalResult<()> {
        self.record_operation(op);
        let mut state = self.state();
        if state.failing_paths.contains(path) {
            return Err(HalError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("fake removal failure: {}", path.display()),
            )));
        }
        state.links.remove(path);
        Ok(())
    }
}

impl ProcessOps for FakeHal {
    fn invoke(&self, env: &Env, program: &str, args: &[String]) -> HalResult<Output> {
        log::info!("FAKE HAL: {} {}", program, args.len());

        self.record_operation(Operation::Command {
            program: program.to_string(),
            args: args.to_vec(),
            deadline: env.remaining(),
        });

        let failure = self.state().command_failures.get(program).cloned();
        match failure {
            Some(FakeFailure::Exit { code, stderr }) => Err(HalError::CommandFailed {
                program: program.to_string(),
                code: Some(code),
                stderr,
            }),
            Some(FakeFailure::Timeout) => Err(HalError::CommandTimeout {
                program: program.to_string(),
                timeout_ms: env
                    .remaining()
                    .map(|d| d.as_millis() as u64)
                    .unwrap_or_default(),
            }),
            Some(FakeFailure::NotFound) => Err(HalError::CommandNotFound(program.to_string())),
            None => Ok(Output {
                status: std::process::ExitStatus::from_raw(0),
                stdout: Vec::new(),
                stderr: Vec::new(),
            }),
        }
    }
}

impl FsOps for FakeHal {
    fn read_dir(&self, path: &Path) -> HalResult<Vec<DirEntryInfo>> {
        self.record_operation(Operation::ReadDir {
            path: path.to_path_buf(),
        });
        self.state().dirs.get(path).cloned().ok_or_else(|| {
            HalError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory: {}", path.display()),
            ))
        })
    }

    fn remove(&self, path: &Path) -> HalResult<()> {
        self.removal(
            path,
            Operation::Remove {
                path: path.to_path_buf(),
            },
        )
    }

    fn remove_all(&self, path: &Path) -> HalResult<()> {
        self.removal(
            path,
            Operation::RemoveAll {
                path: path.to_path_buf(),
            },
        )
    }

    fn read_link(&self, path: &Path) -> HalResult<String> {
        self.record_operation(Operation::ReadLink {
            path: path.to_path_buf(),
        });
        self.state().links.get(path).cloned().ok_or_else(|| {
            HalError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("not a link: {}", path.display()),
            ))
        })
    }
}

//! Host HAL implementation using real processes and the local filesystem.

use super::{DirEntryInfo, FsOps, ProcessOps};
use crate::{Env, HalError, HalResult};
use std::fs;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

/// Ceiling for invocations whose env carries no deadline.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Cancellation is noticed at this granularity.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Real HAL implementation.
#[derive(Debug, Clone, Default)]
pub struct OsHal;

impl OsHal {
    pub fn new() -> Self {
        Self
    }
}

fn map_command_err(program: &str, err: std::io::Error) -> HalError {
    if err.kind() == std::io::ErrorKind::NotFound {
        return HalError::CommandNotFound(program.to_string());
    }
    HalError::Io(err)
}

fn output_failed(program: &str, output: &Output) -> HalError {
    HalError::CommandFailed {
        program: program.to_string(),
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

/// Kill the child and return at once; reaping and pipe draining finish on a
/// detached thread since a process stuck in kernel I/O may never exit.
fn abort(mut child: Child, handles: [JoinHandle<Vec<u8>>; 2]) {
    let _ = child.kill();
    std::thread::spawn(move || {
        let _ = child.wait();
        for handle in handles {
            let _ = handle.join();
        }
    });
}

fn output_with_env(program: &str, cmd: &mut Command, env: &Env) -> HalResult<Output> {
    let started = Instant::now();
    let deadline = env
        .deadline()
        .unwrap_or(started + DEFAULT_COMMAND_TIMEOUT);
    let timeout_ms = deadline.saturating_duration_since(started).as_millis() as u64;

    if env.is_cancelled() {
        return Err(HalError::Cancelled {
            program: program.to_string(),
        });
    }
    if deadline <= started {
        return Err(HalError::CommandTimeout {
            program: program.to_string(),
            timeout_ms,
        });
    }

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = cmd.spawn().map_err(|e| map_command_err(program, e))?;

    // Drain pipes concurrently to avoid deadlocks on large output.
    let stdout_handle = drain(child.stdout.take());
    let stderr_handle = drain(child.stderr.take());

    let status = loop {
        if env.is_cancelled() {
            abort(child, [stdout_handle, stderr_handle]);
            return Err(HalError::Cancelled {
                program: program.to_string(),
            });
        }

        let now = Instant::now();
        if now >= deadline {
            abort(child, [stdout_handle, stderr_handle]);
            return Err(HalError::CommandTimeout {
                program: program.to_string(),
                timeout_ms,
            });
        }

        let slice = (deadline - now).min(POLL_INTERVAL);
        if let Some(status) = child.wait_timeout(slice).map_err(HalError::Io)? {
            break status;
        }
    };

    let stdout = stdout_handle.join().unwrap_or_default();
    let stderr = stderr_handle.join().unwrap_or_default();
    Ok(Output {
        status,
        stdout,
        stderr,
    })
}

impl ProcessOps for OsHal {
    fn invoke(&self, env: &Env, program: &str, args: &[String]) -> HalResult<Output> {
        log::debug!("{}: exec {} ({} args)", env.session(), program, args.len());

        let mut cmd = Command::new(program);
        cmd.args(args);
        let output = output_with_env(program, &mut cmd, env)?;
        if !output.status.success() {
            return Err(output_failed(program, &output));
        }
        Ok(output)
    }
}

impl FsOps for OsHal {
    fn read_dir(&self, path: &Path) -> HalResult<Vec<DirEntryInfo>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            // Not followed: a link to a directory is listed as a plain entry.
            let is_dir = entry.file_type()?.is_dir();
            entries.push(DirEntryInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn remove(&self, path: &Path) -> HalResult<()> {
        let meta = fs::symlink_metadata(path)?;
        if meta.is_dir() {
            fs::remove_dir(path)?;
            return Ok(());
        }
        if let Err(err) = fs::remove_file(path) {
            // Windows directory links are removed as directories.
            if meta.file_type().is_symlink() {
                fs::remove_dir(path)?;
            } else {
                return Err(err.into());
            }
        }
        Ok(())
    }

    fn remove_all(&self, path: &Path) -> HalResult<()> {
        let meta = fs::symlink_metadata(path)?;
        if meta.is_dir() {
            fs::remove_dir_all(path)?;
            Ok(())
        } else {
            self.remove(path)
        }
    }

    fn read_link(&self, path: &Path) -> HalResult<String> {
        let target = fs::read_link(path)?;
        Ok(target.to_string_lossy().into_owned())
    }
}

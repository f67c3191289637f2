//! Turning validated options into the exact commands a platform runs.

mod script;
mod unix;

pub use script::{ScriptRenderer, DEFAULT_SCRIPTS_DIR};
pub use unix::UnixRenderer;

use crate::options::OptionSet;
use serde::{Deserialize, Serialize};
use smb_error::{redact, DriverResult};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// One external program call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Command line with every secret replaced, fit for logs.
    pub fn redacted(&self, secrets: &[&str]) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&redact(arg, secrets));
        }
        line
    }
}

/// How a purged directory is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Only if empty; a share still mounted underneath makes it fail.
    Dir,
    Tree,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeStep {
    pub unmount: Option<Invocation>,
    pub removal: Removal,
}

/// Platform-specific command rendering.
///
/// Implementations are pure: the same inputs always give the same tokens.
pub trait Renderer: Send + Sync + fmt::Debug {
    /// Commands that attach `source` at `target`, run in order.
    fn attach(&self, source: &str, target: &Path, options: &OptionSet)
        -> DriverResult<Vec<Invocation>>;

    /// Commands that detach `target`; `remote` is the resolved link target
    /// when [`Renderer::keeps_link`] is true.
    fn detach(&self, target: &Path, remote: Option<&str>) -> Vec<Invocation>;

    /// Whether attach leaves a local link recording the remote path.
    fn keeps_link(&self) -> bool;

    /// Read-only probe that succeeds only when `mount_point` is attached.
    fn check(&self, mount_point: &str) -> Invocation;

    fn purge(&self, entry: &Path) -> PurgeStep;
}

/// Which renderer a deployment uses; chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// `mount -t cifs` and friends.
    #[default]
    Unix,
    /// PowerShell scripts plus directory links.
    Script,
}

impl Platform {
    /// Platform matching the host this binary was built for.
    pub fn host() -> Self {
        if cfg!(windows) {
            Platform::Script
        } else {
            Platform::Unix
        }
    }

    pub fn renderer(self, scripts_dir: Option<&str>) -> Box<dyn Renderer> {
        match self {
            Platform::Unix => Box::new(UnixRenderer),
            Platform::Script => Box::new(ScriptRenderer::new(
                scripts_dir.unwrap_or(DEFAULT_SCRIPTS_DIR),
            )),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Unix => f.write_str("unix"),
            Platform::Script => f.write_str("script"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unix" | "linux" | "darwin" => Ok(Platform::Unix),
            "script" | "windows" => Ok(Platform::Script),
            other => Err(format!("unknown platform: {other} (expected unix or script)")),
        }
    }
}

pub(crate) fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

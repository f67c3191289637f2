//! PowerShell script rendering for hosts whose SMB client has no local mount point.
//!
//! The remote share is attached by `mounter.ps1`; the local path then becomes
//! a directory link to the share, created with `cmd /c mklink /d`.

use super::{path_arg, Invocation, PurgeStep, Removal, Renderer};
use crate::options::OptionSet;
use smb_error::{DriverError, DriverResult};
use std::path::Path;

pub const DEFAULT_SCRIPTS_DIR: &str = "C:/var/vcap/jobs/smbdriver-windows/scripts";

const POWERSHELL: &str = "powershell.exe";

#[derive(Debug, Clone)]
pub struct ScriptRenderer {
    scripts_dir: String,
}

impl Default for ScriptRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_SCRIPTS_DIR)
    }
}

impl ScriptRenderer {
    pub fn new(scripts_dir: impl Into<String>) -> Self {
        Self {
            scripts_dir: scripts_dir.into(),
        }
    }

    pub fn script(&self, name: &str) -> String {
        format!(
            "{}/{}",
            self.scripts_dir.trim_end_matches(|c: char| c == '/' || c == '\\'),
            name
        )
    }

    fn run_script(&self, name: &str, params: Vec<String>) -> Invocation {
        let mut args = vec!["-file".to_string(), self.script(name)];
        args.extend(params);
        Invocation::new(POWERSHELL, args)
    }
}

impl Renderer for ScriptRenderer {
    fn attach(
        &self,
        source: &str,
        target: &Path,
        options: &OptionSet,
    ) -> DriverResult<Vec<Invocation>> {
        let username = options.get_string("username");
        let password = options.get_string("password");
        let (username, password) = match (username, password) {
            (Some(u), Some(p)) => (u, p),
            (u, p) => {
                let mut missing = Vec::new();
                if p.is_none() {
                    missing.push("password".to_string());
                }
                if u.is_none() {
                    missing.push("username".to_string());
                }
                return Err(DriverError::MissingOptions(missing));
            }
        };

        let target = path_arg(target);
        let mount = self.run_script(
            "mounter.ps1",
            vec![
                "-username".to_string(),
                username,
                "-password".to_string(),
                password,
                "-remotePath".to_string(),
                source.to_string(),
                "-localPath".to_string(),
                target.clone(),
            ],
        );
        let link = Invocation::new(
            "cmd",
            [
                "/c".to_string(),
                "mklink".to_string(),
                "/d".to_string(),
                target,
                source.to_string(),
            ],
        );
        Ok(vec![mount, link])
    }

    fn detach(&self, target: &Path, remote: Option<&str>) -> Vec<Invocation> {
        let remote = remote.map(String::from).unwrap_or_else(|| path_arg(target));
        vec![self.run_script(
            "unmounter.ps1",
            vec!["-remotePath".to_string(), remote],
        )]
    }

    fn keeps_link(&self) -> bool {
        true
    }

    fn check(&self, mount_point: &str) -> Invocation {
        self.run_script(
            "check_mount.ps1",
            vec!["-remotePath".to_string(), mount_point.to_string()],
        )
    }

    fn purge(&self, _entry: &Path) -> PurgeStep {
        PurgeStep {
            unmount: None,
            removal: Removal::Tree,
        }
    }
}

//! Mount, unmount, check and purge entry points.

use crate::config::{MountConfig, RESERVED_OPTIONS};
use crate::options::RawOptions;
use crate::render::{Invocation, Removal, Renderer};
use smb_error::{DriverResult, SafeError};
use smb_hal::{DriverHal, Env, HalResult};
use std::path::Path;
use std::time::Duration;

/// Deadline for the mount probe, so a hung share cannot stall the caller.
pub const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Logs `<session> start` now and `<session> end` when dropped.
struct SessionLog {
    env: Env,
}

impl SessionLog {
    fn start(parent: &Env, session: &str) -> Self {
        let env = parent.with_session(session);
        log::info!("{} start", env.session());
        Self { env }
    }
}

impl Drop for SessionLog {
    fn drop(&mut self) {
        log::info!("{} end", self.env.session());
    }
}

/// SMB mount operations over a HAL and a platform renderer.
///
/// Holds only the read-only rule template; every call works on its own copy,
/// so one mounter can serve concurrent requests for different mount points.
#[derive(Debug)]
pub struct SmbMounter<H: DriverHal> {
    hal: H,
    renderer: Box<dyn Renderer>,
    config: MountConfig,
}

impl<H: DriverHal> SmbMounter<H> {
    pub fn new(hal: H, renderer: Box<dyn Renderer>, config: MountConfig) -> Self {
        Self {
            hal,
            renderer,
            config,
        }
    }

    pub fn config(&self) -> &MountConfig {
        &self.config
    }

    fn run(&self, env: &Env, invocation: &Invocation, secrets: &[&str]) -> HalResult<()> {
        log::debug!(
            "{}: {}",
            env.session(),
            invocation.redacted(secrets)
        );
        self.hal
            .invoke(env, &invocation.program, &invocation.args)
            .map(|_| ())
    }

    /// Attach `source` at `target`.
    ///
    /// Option errors are returned before any command runs. Command failures
    /// come back as [`SafeError`]s with credential values scrubbed.
    pub fn mount(
        &self,
        env: &Env,
        source: &str,
        target: &Path,
        options: &RawOptions,
    ) -> DriverResult<()> {
        let session = SessionLog::start(env, "smb-mount");
        let env = &session.env;

        let mut config = self.config.clone();
        if let Err(err) = config.set_entries(options, RESERVED_OPTIONS) {
            log::debug!(
                "{}: error-parse-entries source={} target={} names=[{}]: {}",
                env.session(),
                source,
                target.display(),
                options.keys().cloned().collect::<Vec<_>>().join(","),
                err
            );
            return Err(err);
        }

        let invocations = self
            .renderer
            .attach(source, target, config.options())?;

        let credentials = config.options().credentials();
        let secrets: Vec<&str> = credentials.iter().map(String::as_str).collect();

        for invocation in &invocations {
            if let Err(err) = self.run(env, invocation, &secrets) {
                let safe = SafeError::from_hal(
                    &format!("{} failed for {}", invocation.program, target.display()),
                    &err,
                    &secrets,
                );
                log::error!("{}: {}", env.session(), safe);
                return Err(safe.into());
            }
        }
        Ok(())
    }

    /// Detach whatever is mounted at `target`.
    pub fn unmount(&self, env: &Env, target: &Path) -> DriverResult<()> {
        let session = SessionLog::start(env, "smb-umount");
        let env = &session.env;

        let keeps_link = self.renderer.keeps_link();
        let remote = if keeps_link {
            let remote = self.hal.read_link(target).map_err(|err| {
                SafeError::from_hal(
                    &format!("unable to resolve mount record {}", target.display()),
                    &err,
                    &[],
                )
            })?;
            log::debug!("{}: {} -> {}", env.session(), target.display(), remote);
            Some(remote)
        } else {
            None
        };

        for invocation in self.renderer.detach(target, remote.as_deref()) {
            self.run(env, &invocation, &[]).map_err(|err| {
                let safe = SafeError::from_hal(
                    &format!("{} failed for {}", invocation.program, target.display()),
                    &err,
                    &[],
                );
                log::error!("{}: {}", env.session(), safe);
                safe
            })?;
        }

        if keeps_link {
            self.hal.remove(target).map_err(|err| {
                SafeError::from_hal(
                    &format!("unable to remove mount record {}", target.display()),
                    &err,
                    &[],
                )
            })?;
        }
        Ok(())
    }

    /// Probe `mount_point`; false on any failure, including the probe timing out.
    pub fn check(&self, env: &Env, name: &str, mount_point: &str) -> bool {
        let session = SessionLog::start(env, "smb-check-mountpoint");
        let env = session.env.with_timeout(CHECK_TIMEOUT);

        let invocation = self.renderer.check(mount_point);
        match self.run(&env, &invocation, &[]) {
            Ok(()) => true,
            Err(err) => {
                // Volumes with no confirmable mount are reported unmounted so they get cleaned up.
                log::info!("unable to verify volume {} ({})", name, err);
                false
            }
        }
    }

    /// Best-effort sweep of every directory under `path`.
    pub fn purge(&self, env: &Env, path: &Path) {
        let session = SessionLog::start(env, "purge");
        let env = &session.env;

        let entries = match self.hal.read_dir(path) {
            Ok(entries) => entries,
            Err(err) => {
                log::error!(
                    "{}: purge-readdir-failed path={}: {}",
                    env.session(),
                    path.display(),
                    err
                );
                return;
            }
        };

        for entry in entries.iter().filter(|e| e.is_dir) {
            let entry_path = path.join(&entry.name);
            let step = self.renderer.purge(&entry_path);

            if let Some(unmount) = &step.unmount {
                if let Err(err) = self.run(env, unmount, &[]) {
                    log::warn!(
                        "{}: warning-umount-intermediate-failed path={}: {}",
                        env.session(),
                        entry_path.display(),
                        err
                    );
                }
            }

            let removed = match step.removal {
                Removal::Dir => self.hal.remove(&entry_path),
                Removal::Tree => self.hal.remove_all(&entry_path),
            };
            if let Err(err) = removed {
                log::error!(
                    "{}: purge-cannot-remove-directory name={} path={}: {}",
                    env.session(),
                    entry.name,
                    path.display(),
                    err
                );
            }
        }
    }
}

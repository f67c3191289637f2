use clap::{Parser, Subcommand};
use smb_driver::Platform;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "smbdriver", version, about = "Attach, detach, verify and purge SMB shares")]
pub struct Cli {
    /// TOML settings file; flags below override its values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Comma-separated options every mount must supply
    #[arg(long, value_name = "LIST")]
    pub required: Option<String>,

    /// Comma-separated options a mount may supply
    #[arg(long, value_name = "LIST")]
    pub allowed: Option<String>,

    /// Comma-separated name:value defaults injected when absent
    #[arg(long, value_name = "LIST")]
    pub defaults: Option<String>,

    /// Mount tooling to drive: unix (mount.cifs) or script (PowerShell)
    #[arg(long)]
    pub platform: Option<Platform>,

    /// Directory holding mounter.ps1, unmounter.ps1 and check_mount.ps1
    #[arg(long, value_name = "DIR")]
    pub scripts_dir: Option<String>,

    /// Overall deadline for the command, in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Attach a share (e.g. //host/share) at a local path
    Mount {
        source: String,
        target: PathBuf,

        /// Mount options as a JSON object, e.g. '{"username":"u","ro":true}'
        #[arg(long, short = 'o', value_name = "JSON")]
        options: Option<String>,
    },

    /// Detach the share mounted at a local path
    Unmount { target: PathBuf },

    /// Exit 0 when the mount point is attached, 1 otherwise
    Check { name: String, mount_point: String },

    /// Unmount and remove every directory below a path
    Purge { path: PathBuf },
}

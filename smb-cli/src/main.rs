mod cli;
mod logging;
mod settings;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use settings::Settings;
use serde_json::{Map, Value};
use smb_driver::{OptionValue, RawOptions, SmbMounter};
use smb_hal::{Env, OsHal};
use std::process::ExitCode;
use std::time::Duration;

/// Numbers that are not integers keep their JSON spelling (`3.0` stays "3.0").
fn option_value(name: &str, value: Value) -> Result<OptionValue> {
    Ok(match value {
        Value::Bool(b) => OptionValue::Bool(b),
        Value::String(s) => OptionValue::Str(s),
        Value::Number(n) => match n.as_i64() {
            Some(i) => OptionValue::Int(i),
            None => OptionValue::Str(n.to_string()),
        },
        Value::Null => bail!("mount option {} must not be null", name),
        Value::Array(_) | Value::Object(_) => {
            bail!("mount option {} must be a string, number or boolean", name)
        }
    })
}

fn parse_options(json: Option<&str>) -> Result<RawOptions> {
    let Some(json) = json else {
        return Ok(RawOptions::new());
    };
    let map: Map<String, Value> =
        serde_json::from_str(json).context("mount options must be a JSON object")?;
    map.into_iter()
        .map(|(name, value)| {
            let value = option_value(&name, value)?;
            Ok((name, value))
        })
        .collect()
}

fn run(cli: Cli) -> Result<ExitCode> {
    let settings = Settings::resolve(&cli)?;
    let config = settings.mount_config()?;
    let platform = settings.platform();
    log::debug!("platform: {}", platform);

    let mounter = SmbMounter::new(
        OsHal::new(),
        platform.renderer(settings.scripts_dir.as_deref()),
        config,
    );

    let env = Env::new("smbdriver");
    let env = match cli.timeout_secs {
        Some(secs) => env.with_timeout(Duration::from_secs(secs)),
        None => env,
    };

    match cli.command {
        Commands::Mount {
            source,
            target,
            options,
        } => {
            let options = parse_options(options.as_deref())?;
            mounter.mount(&env, &source, &target, &options)?;
            println!("mounted {} at {}", source, target.display());
        }
        Commands::Unmount { target } => {
            mounter.unmount(&env, &target)?;
            println!("unmounted {}", target.display());
        }
        Commands::Check { name, mount_point } => {
            if !mounter.check(&env, &name, &mount_point) {
                println!("{}: not mounted", name);
                return Ok(ExitCode::from(1));
            }
            println!("{}: mounted", name);
        }
        Commands::Purge { path } => {
            mounter.purge(&env, &path);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    logging::init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            log::error!("{:#}", err);
            ExitCode::from(2)
        }
    }
}

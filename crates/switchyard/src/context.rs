//! Per-invocation wiring: configuration, acting user and the controller.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use switchyard_config::{self as config, Config};
use switchyard_core::{Controller, ControllerParts, RequestContext, TransportFactory, User};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;
use crate::store::{self, FileActivityLog, FileSessionStore};

/// Everything a command handler needs.
pub struct Context {
    pub controller: Controller,
    pub request: RequestContext,
    pub output: OutputFormat,
    pub color: bool,
    pub quiet: bool,
    pub yes: bool,
    counters_path: PathBuf,
}

/// The config file named on the command line, else the platform default.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config::config_path)
}

/// `--output`, else `defaults.output` from the file, else table.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> OutputFormat {
    use clap::ValueEnum;

    global.output.unwrap_or_else(|| {
        OutputFormat::from_str(&cfg.defaults.output, true).unwrap_or(OutputFormat::Table)
    })
}

impl Context {
    pub fn build(global: &GlobalOpts) -> Result<Self, CliError> {
        let path = config_file(global);
        let cfg = config::load_config_from(&path)?;
        cfg.validate()?;

        let user = acting_user(global, &cfg, &path)?;
        let profiles = cfg.credential_profiles()?;
        let core = cfg.core_config();
        let data_dir = cfg.data_dir();
        debug!(data_dir = %data_dir.display(), user = %user.name, "building controller");

        let drivers = TransportFactory::new(profiles, core.snmp.clone());
        let controller = Controller::new(ControllerParts {
            config: core,
            inventory: Arc::new(cfg.inventory()),
            sessions: Arc::new(FileSessionStore::new(&data_dir)),
            drivers: Arc::new(drivers),
            activity: Arc::new(FileActivityLog::new(&data_dir)),
            catalog: cfg.catalog(),
        })?;

        let counters_path = store::counters_path(&data_dir);
        controller
            .counters()
            .restore(&store::load_counters(&counters_path));

        Ok(Self {
            controller,
            request: RequestContext::new(user),
            output: output_format(global, &cfg),
            color: output::should_color(global.color),
            quiet: global.quiet,
            yes: global.yes,
            counters_path,
        })
    }

    /// Resolve a switch id, name or hostname to `(group id, device id)`.
    pub fn resolve_switch(&self, identifier: &str) -> Result<(u32, u32), CliError> {
        let device = self.controller.inventory().find_device(identifier)?;
        Ok((device.group_id, device.id))
    }

    /// Persist usage counters for the next invocation.
    pub fn finish(&self) -> Result<(), CliError> {
        store::save_counters(&self.counters_path, &self.controller.counters().snapshot())
            .map_err(CliError::from)
    }

    /// Print a line to stderr unless `--quiet`.
    pub fn say(&self, line: &str) {
        if !self.quiet {
            eprintln!("{line}");
        }
    }
}

fn acting_user(global: &GlobalOpts, cfg: &Config, path: &Path) -> Result<User, CliError> {
    let name = global
        .user
        .clone()
        .or_else(|| cfg.defaults.user.clone())
        .or_else(|| std::env::var("USER").ok())
        .ok_or_else(|| CliError::Validation {
            field: "user".into(),
            reason: "no acting user; pass --user or set defaults.user".into(),
        })?;

    cfg.users
        .iter()
        .find(|u| u.name == name)
        .cloned()
        .ok_or_else(|| CliError::UnknownUser {
            name,
            path: path.display().to_string(),
        })
}


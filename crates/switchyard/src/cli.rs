//! Clap derive structures for the `switchyard` CLI.
//!
//! Defines the command tree, global flags and the value enums shared by the
//! handlers.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use switchyard_core::{LogAction, LogType};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// switchyard -- manage layer-2 switches from the command line
#[derive(Debug, Parser)]
#[command(
    name = "switchyard",
    version,
    about = "Manage layer-2 switch ports, VLANs and PoE from the command line",
    long_about = "Views and changes access switches over SNMP, SSH and vendor REST APIs.\n\n\
        Switches are organised in groups; every change is checked against the\n\
        acting user's group permissions and recorded in the activity log.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, env = "SWITCHYARD_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Act as this user (defaults to `defaults.user`, then $USER)
    #[arg(long, short = 'u', env = "SWITCHYARD_USER", global = true)]
    pub user: Option<String>,

    /// Output format (defaults to `defaults.output`)
    #[arg(long, short = 'o', env = "SWITCHYARD_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the switch groups and switches you may manage
    #[command(alias = "ls")]
    Groups,

    /// Find switches by name or hostname (regular expression)
    Search {
        pattern: String,
    },

    /// Show a switch: interfaces, hardware or connected clients
    #[command(alias = "s")]
    Show(ShowArgs),

    /// Drop the cached state and read the switch again
    Reload(ShowArgs),

    /// Change one interface
    #[command(alias = "if")]
    Interface(InterfaceArgs),

    /// Apply the same change to several interfaces
    BulkEdit(BulkEditArgs),

    /// Create, rename or delete VLANs
    Vlan(VlanArgs),

    /// Write the running configuration to startup
    Save {
        /// Switch id, name or hostname
        switch: String,
    },

    /// Run a predefined command on a switch
    Exec(ExecArgs),

    /// Run a command template with your own values
    Template(TemplateArgs),

    /// Read the activity log
    Logs(LogsArgs),

    /// Usage statistics (staff only)
    Stats,

    /// Manage the configuration file and stored secrets
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Switch views ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ViewArg {
    /// Interfaces and VLANs
    #[default]
    Basic,
    /// System facts and hardware inventory
    Hardware,
    /// Ethernet addresses and LLDP neighbors per interface
    Clients,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Switch id, name or hostname
    pub switch: String,

    /// What to show
    #[arg(long, value_enum, default_value_t)]
    pub view: ViewArg,
}

// ── Interface changes ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InterfaceArgs {
    /// Switch id, name or hostname
    pub switch: String,

    /// Interface key, as shown by `switchyard show`
    pub interface: String,

    #[command(subcommand)]
    pub command: InterfaceCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PoeArg {
    On,
    Off,
    /// Power off, wait, power on
    Cycle,
}

#[derive(Debug, Subcommand)]
pub enum InterfaceCommand {
    /// Enable the interface
    Up,
    /// Disable the interface
    Down,
    /// Disable, wait, enable
    Bounce,
    /// Change Power-over-Ethernet
    Poe {
        #[arg(value_enum)]
        state: PoeArg,
    },
    /// Set the untagged (access) VLAN
    Vlan {
        vlan: u16,
    },
    /// Set the interface description
    #[command(alias = "desc")]
    Describe {
        text: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AdminArg {
    Up,
    Down,
    Toggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BulkPoeArg {
    On,
    Off,
    /// Flip the current state
    Toggle,
    /// Power off, wait, power on
    Cycle,
}

#[derive(Debug, Args)]
pub struct BulkEditArgs {
    /// Switch id, name or hostname
    pub switch: String,

    /// Interface keys to change
    #[arg(long, short = 'i', value_delimiter = ',', required = true)]
    pub interfaces: Vec<String>,

    /// Admin status change
    #[arg(long, value_enum)]
    pub admin: Option<AdminArg>,

    /// PoE change
    #[arg(long, value_enum)]
    pub poe: Option<BulkPoeArg>,

    /// New untagged VLAN
    #[arg(long)]
    pub vlan: Option<u16>,

    /// New description
    #[arg(long)]
    pub description: Option<String>,

    /// Append to the current description instead of replacing it
    #[arg(long, requires = "description")]
    pub append: bool,
}

// ── VLANs ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct VlanArgs {
    /// Switch id, name or hostname
    pub switch: String,

    #[command(subcommand)]
    pub command: VlanCommand,
}

#[derive(Debug, Subcommand)]
pub enum VlanCommand {
    /// Create a VLAN
    Create { id: u16, name: String },
    /// Rename a VLAN
    Rename { id: u16, name: String },
    /// Delete a VLAN
    Delete { id: u16 },
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ExecArgs {
    /// Switch id, name or hostname
    pub switch: String,

    /// Command id (see --list)
    #[arg(conflicts_with_all = ["raw", "list"])]
    pub command: Option<u32>,

    /// Interface key for interface commands
    #[arg(long, short = 'i')]
    pub interface: Option<String>,

    /// Run an arbitrary command line (admins only)
    #[arg(long, conflicts_with = "list")]
    pub raw: Option<String>,

    /// List the commands available for this switch
    #[arg(long)]
    pub list: bool,
}

#[derive(Debug, Args)]
pub struct TemplateArgs {
    /// Switch id, name or hostname
    pub switch: String,

    /// Template id
    pub id: u32,

    /// Template values as key=value
    #[arg(long = "set", short = 's', value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub values: Vec<(String, String)>,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_owned(), value.to_owned()))
}

// ── Logs ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LogsArgs {
    /// Only entries for this switch
    #[arg(long)]
    pub switch: Option<String>,

    /// Only entries by this user
    #[arg(long)]
    pub by: Option<String>,

    /// Only this action (e.g. interface-down, vlan-create)
    #[arg(long)]
    pub action: Option<LogAction>,

    /// Minimum entry type: view, change, command, warning, error
    #[arg(long)]
    pub min_type: Option<LogType>,

    /// Maximum number of entries
    #[arg(long, short = 'n', default_value = "50")]
    pub limit: usize,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SecretKind {
    /// SNMP v2c community
    Community,
    /// SNMP v3 auth passphrase
    SnmpAuth,
    /// SNMP v3 privacy passphrase
    SnmpPriv,
    /// SSH login password
    SshPassword,
    /// Vendor API password
    ApiPassword,
}

impl SecretKind {
    /// Profile section and field name under which the keyring stores it.
    pub fn keyring_parts(self) -> (&'static str, &'static str) {
        match self {
            Self::Community => ("snmp", "community"),
            Self::SnmpAuth => ("snmp", "auth"),
            Self::SnmpPriv => ("snmp", "priv"),
            Self::SshPassword => ("ssh", "password"),
            Self::ApiPassword => ("api", "password"),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a starter configuration file
    Init,
    /// Print the effective configuration (secrets redacted)
    Show,
    /// Print the configuration file path
    Path,
    /// Check the configuration for dangling references and missing secrets
    Validate,
    /// Store a secret in the system keyring
    SetSecret {
        #[arg(value_enum)]
        kind: SecretKind,
        /// Profile name
        #[arg(default_value = "default")]
        profile: String,
    },
    /// Remove a secret from the system keyring
    DeleteSecret {
        #[arg(value_enum)]
        kind: SecretKind,
        #[arg(default_value = "default")]
        profile: String,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn key_value_pairs_split_on_first_equals() {
        assert_eq!(
            parse_key_val("filter=a=b"),
            Ok(("filter".to_owned(), "a=b".to_owned()))
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }
}

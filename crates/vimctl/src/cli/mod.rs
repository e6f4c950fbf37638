//! CLI structure and command definitions

use clap::{Args, Parser, Subcommand};

/// vSphere inventory CLI
#[derive(Parser, Debug)]
#[command(name = "vimctl")]
#[command(
    version,
    about = "Create vSphere folders, datacenters, clusters and standalone hosts"
)]
#[command(long_about = "
Create vSphere folders, datacenters, clusters and standalone hosts

Connection settings come from flags, VIMCTL_* environment variables or a
named profile in the config file.

EXAMPLES:
    # Save a profile for a vCenter
    vimctl profile set lab --url https://vcenter.lab.local --username administrator@vsphere.local

    # Create a datacenter under the 'Datacenters' folder
    vimctl create --parentname Datacenters --itemtype Datacenter --itemname dc-east

    # Add a standalone host, connecting with the session credentials
    vimctl create --parentname host --itemtype Host-Standalone --itemname esx01.lab.local

    # One-off connection without a profile
    vimctl --url https://vcenter --username admin --insecure \\
        create --parentname vm --itemtype Folder --itemname myFolder

For more help on a specific command, run:
    vimctl <command> --help
")]
pub struct Cli {
    /// Profile to use for this command
    #[arg(long, short, global = true, env = "VIMCTL_PROFILE")]
    pub profile: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, global = true, env = "VIMCTL_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Server URL (overrides the profile)
    #[arg(long, global = true, env = "VIMCTL_URL")]
    pub url: Option<String>,

    /// Login user name (overrides the profile)
    #[arg(long, global = true, env = "VIMCTL_USERNAME")]
    pub username: Option<String>,

    /// Login password (prompted for when absent)
    #[arg(long, global = true, env = "VIMCTL_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Accept self-signed server certificates
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "auto")]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text for people
    Auto,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an inventory entity under a parent folder
    #[command(after_help = "ITEM TYPES:
    Folder, Datacenter, Cluster, Host-Standalone

EXAMPLES:
    vimctl create --parentname vm --itemtype Folder --itemname myFolder
    vimctl create --parentname Datacenters --itemtype Datacenter --itemname dc-east
    vimctl create --parentname host --itemtype Cluster --itemname prod
    vimctl create --parentname host --itemtype Host-Standalone --itemname esx01 --licensekey XXXXX")]
    Create(CreateArgs),

    /// Profile management
    #[command(subcommand, visible_alias = "prof", visible_alias = "pr")]
    Profile(ProfileCommands),

    /// Version information
    #[command(visible_alias = "ver", visible_alias = "v")]
    Version,

    /// Generate shell completions
    #[command(visible_alias = "comp")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for `vimctl create`
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Name of the existing folder to create under
    #[arg(long = "parentname", visible_alias = "parent-name", value_name = "NAME")]
    pub parent_name: String,

    /// Kind of entity: Folder, Datacenter, Cluster or Host-Standalone
    #[arg(long = "itemtype", visible_alias = "item-type", value_name = "TYPE")]
    pub item_type: String,

    /// Name of the new entity (the host name for Host-Standalone)
    #[arg(long = "itemname", visible_alias = "item-name", value_name = "NAME")]
    pub item_name: String,

    /// License key assigned to a new standalone host
    #[arg(long = "licensekey", visible_alias = "license-key", value_name = "KEY")]
    pub license_key: Option<String>,

    /// Maximum seconds to wait for the host task (profile or 600 when unset)
    #[arg(long, value_name = "SECS")]
    pub wait_timeout: Option<u64>,

    /// Seconds between task polls (profile or 2 when unset)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub wait_interval: Option<u64>,
}

/// Supported shells for completion generation
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
    Elvish,
}

/// Profile management commands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List all configured profiles
    #[command(visible_alias = "ls", visible_alias = "l")]
    List,

    /// Show the path to the configuration file
    Path,

    /// Show details of a specific profile
    #[command(visible_alias = "sh", visible_alias = "get")]
    Show {
        /// Profile name to show
        name: String,
    },

    /// Create or update a profile
    ///
    /// Connection values come from the global --url, --username, --password
    /// and --insecure flags.
    #[command(visible_alias = "add", visible_alias = "create")]
    #[command(after_help = "EXAMPLES:
    vimctl profile set lab --url https://vcenter.lab.local --username administrator@vsphere.local
    vimctl profile set esx --url https://esx01 --username root --password '${ESX_PASSWORD}' --insecure")]
    Set {
        /// Profile name
        name: String,

        /// Path to a PEM CA certificate to trust
        #[arg(long)]
        ca_cert: Option<String>,

        /// API release segment, e.g. 8.0.1.0
        #[arg(long)]
        release: Option<String>,

        /// Default task wait timeout in seconds
        #[arg(long)]
        task_timeout: Option<u64>,

        /// Default task poll interval in seconds
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        task_interval: Option<u64>,

        /// Store the password in the OS keyring
        #[cfg(feature = "secure-storage")]
        #[arg(long)]
        use_keyring: bool,
    },

    /// Remove a profile
    #[command(visible_alias = "rm", visible_alias = "del", visible_alias = "delete")]
    Remove {
        /// Profile name to remove
        name: String,
    },

    /// Set the default profile
    #[command(visible_alias = "def")]
    Default {
        /// Profile name to set as default
        name: String,
    },
}

use crate::request::{
    AppRequest, ConfigRequest, HostFlags, Request, ResourceKind, SettingRequest, SettingType,
    State,
};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "occctl")]
#[command(version)]
#[command(about = "Converge Nextcloud apps and settings through occ", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: <config dir>/occctl/config.toml)
    #[arg(long, global = true, env = "OCCCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// PHP interpreter or wrapper, e.g. "sudo -u www-data php"
    #[arg(long, global = true, env = "OCCCTL_PHP")]
    pub php: Option<String>,

    /// Path of the occ script, relative to the Nextcloud root
    #[arg(long = "occ", global = true, env = "OCCCTL_OCC")]
    pub occ: Option<String>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON object on stdout
    Json,
    /// Coloured summary for humans
    Text,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install, enable, disable or remove an app
    App(AppArgs),

    /// Set or unset a scalar config value
    Config(ConfigArgs),

    /// Set or delete a setting of any JSON type
    Setting(SettingArgs),

    /// Run from a JSON parameter object, as an orchestration host does
    Module {
        /// Resource kind the parameters describe
        #[arg(value_enum)]
        kind: ResourceKind,

        /// Parameter file, or "-" for stdin
        #[arg(default_value = "-")]
        params: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Flags shared by every resource subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Report what would change without changing anything
    #[arg(long)]
    pub check: bool,

    /// Include before/after values in the result
    #[arg(long)]
    pub diff: bool,

    /// Nextcloud root directory
    #[arg(short = 'C', long, visible_alias = "nextcloud-root")]
    pub root_directory: Option<PathBuf>,
}

impl RunArgs {
    fn host_flags(&self) -> HostFlags {
        HostFlags {
            check_mode: self.check,
            diff: self.diff,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct AppArgs {
    /// App id, e.g. "calendar"
    pub name: String,

    #[arg(long, value_enum, default_value_t = State::Present)]
    pub state: State,

    /// Whether a present app should be enabled (yes/no)
    #[arg(long, action = ArgAction::Set, default_value_t = true, value_parser = BoolishValueParser::new())]
    pub enabled: bool,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Key name; for app keys without --owner, "<app> <key>"
    pub name: String,

    /// Namespace of the key
    #[arg(long = "type", value_enum)]
    pub kind: SettingType,

    /// Value, compared as text
    #[arg(long)]
    pub value: Option<String>,

    #[arg(long, value_enum, default_value_t = State::Present)]
    pub state: State,

    /// Position inside a list-valued system key
    #[arg(long)]
    pub index: Option<u32>,

    /// App owning the key (type=app)
    #[arg(long, visible_alias = "appname")]
    pub owner: Option<String>,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Args, Debug, Clone)]
pub struct SettingArgs {
    /// Setting name
    pub name: String,

    /// Namespace of the setting
    #[arg(long = "type", value_enum)]
    pub kind: SettingType,

    /// App owning the setting (type=app)
    #[arg(long, visible_alias = "appname")]
    pub owner: Option<String>,

    /// Value as JSON; text that is not valid JSON is taken as a string
    #[arg(long, value_parser = parse_json_value)]
    pub value: Option<Value>,

    #[arg(long, value_enum, default_value_t = State::Present)]
    pub state: State,

    #[command(flatten)]
    pub run: RunArgs,
}

fn parse_json_value(raw: &str) -> Result<Value, String> {
    Ok(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())))
}

impl From<AppArgs> for Request {
    fn from(args: AppArgs) -> Self {
        Request::App(AppRequest {
            name: args.name,
            state: args.state,
            enabled: args.enabled,
            host: args.run.host_flags(),
            root_directory: args.run.root_directory,
        })
    }
}

impl From<ConfigArgs> for Request {
    fn from(args: ConfigArgs) -> Self {
        Request::Config(ConfigRequest {
            name: args.name,
            kind: args.kind,
            value: args.value,
            state: args.state,
            index: args.index,
            owner: args.owner,
            host: args.run.host_flags(),
            root_directory: args.run.root_directory,
        })
    }
}

impl From<SettingArgs> for Request {
    fn from(args: SettingArgs) -> Self {
        Request::Setting(SettingRequest {
            name: args.name,
            kind: args.kind,
            owner: args.owner,
            value: args.value,
            state: args.state,
            host: args.run.host_flags(),
            root_directory: args.run.root_directory,
        })
    }
}

//! Real occ backend that runs `php occ` inside the Nextcloud root.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::types::{ActionOutput, AppAction, AppList, ConfigKey, ConfigListing};
use shell_escape::escape;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Default PHP interpreter.
pub const DEFAULT_PHP: &str = "php";

/// Default path of the occ script, relative to the Nextcloud root.
pub const DEFAULT_SCRIPT: &str = "occ";

/// Backend that executes real occ commands.
///
/// Arguments are passed as an argv vector, never through a shell, so values
/// reach occ byte for byte.
#[derive(Debug, Clone)]
pub struct OccBackend {
    /// Interpreter (or wrapper) to launch
    program: String,
    /// Arguments of the wrapper, before the script
    program_args: Vec<String>,
    /// Script passed as first argument to the program, if any
    script: Option<String>,
    /// Nextcloud root; working directory of every command
    root: PathBuf,
}

impl OccBackend {
    /// Create a backend running `php occ` in `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            program: DEFAULT_PHP.to_string(),
            program_args: Vec::new(),
            script: Some(DEFAULT_SCRIPT.to_string()),
            root: root.into(),
        }
    }

    /// Replace the launcher, e.g. `("php8.2", Some("occ"))` or a wrapper
    /// script that needs no interpreter.
    ///
    /// `program` is split on whitespace, so `sudo -u www-data php` runs
    /// `sudo` with the rest as leading arguments. No shell is involved.
    pub fn with_launcher(mut self, program: &str, script: Option<String>) -> Self {
        let mut words = program.split_whitespace().map(str::to_string);
        self.program = words.next().unwrap_or_else(|| DEFAULT_PHP.to_string());
        self.program_args = words.collect();
        self.script = script.filter(|s| !s.is_empty());
        self
    }

    /// The Nextcloud root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Shell-quoted command line, for logs and error messages.
    pub fn command_line(&self, args: &[String]) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.program_args.iter().map(String::as_str))
            .chain(self.script.as_deref())
            .chain(args.iter().map(String::as_str))
            .map(|part| escape(Cow::Borrowed(part)).into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run occ and return its raw output.
    fn run_occ(&self, args: &[String]) -> Result<Output> {
        let command_line = self.command_line(args);
        log::debug!("Running {} (in {})", command_line, self.root.display());

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.program_args);
        if let Some(script) = &self.script {
            cmd.arg(script);
        }
        let output = cmd
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|source| Error::Spawn {
                command: command_line.clone(),
                source,
            })?;

        log::trace!("{} exited with {}", command_line, output.status);
        Ok(output)
    }

    /// Run a read-only subcommand and return stdout.
    fn query(&self, args: &[String]) -> Result<String> {
        let output = self.run_occ(args)?;

        if !output.status.success() {
            return Err(Error::Observation {
                command: self.command_line(args),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run a mutating subcommand and capture both streams.
    fn mutate(&self, name: &str, args: &[String]) -> Result<ActionOutput> {
        let output = self.run_occ(args)?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(Error::Action {
                action: args.first().cloned().unwrap_or_default(),
                name: name.to_string(),
                code: output.status.code(),
                stdout,
                stderr,
            });
        }

        Ok(ActionOutput { stdout, stderr })
    }
}

impl Backend for OccBackend {
    fn list_apps(&self) -> Result<AppList> {
        let stdout = self.query(&owned(&["app:list", "--output=json"]))?;
        Ok(serde_json::from_str(&stdout)?)
    }

    fn app_action(&self, action: AppAction, name: &str) -> Result<ActionOutput> {
        log::info!("{} {}", action, name);
        self.mutate(name, &owned(&[action.subcommand(), name]))
    }

    fn get_value(&self, key: &ConfigKey) -> Result<String> {
        let stdout = self.query(&key.get_args())?;
        Ok(stdout.trim_end_matches(['\r', '\n']).to_string())
    }

    fn set_value(&self, key: &ConfigKey, value: &str) -> Result<ActionOutput> {
        log::info!("Setting {} ({})", key, key.scope);
        self.mutate(&key.to_string(), &key.set_args(value))
    }

    fn delete_value(&self, key: &ConfigKey) -> Result<ActionOutput> {
        log::info!("Deleting {} ({})", key, key.scope);
        self.mutate(&key.to_string(), &key.delete_args())
    }

    fn list_config(&self) -> Result<ConfigListing> {
        let stdout = self.query(&owned(&["config:list", "--private", "--output=json"]))?;
        Ok(serde_json::from_str(&stdout)?)
    }

    fn import_config(&self, path: &Path) -> Result<ActionOutput> {
        let path = path.to_string_lossy().into_owned();
        log::info!("Importing configuration from {}", path);
        self.mutate(&path, &["config:import".to_string(), path.clone()])
    }
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| (*a).to_string()).collect()
}

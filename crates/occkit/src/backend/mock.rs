//! In-memory backend for tests.
//!
//! Keeps a small model of app and configuration state, applies mutations to
//! it the way occ would, and records every command it was asked to run.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::types::{ActionOutput, AppAction, AppList, AppState, ConfigKey, ConfigListing, Scope};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Mock backend recording calls against an in-memory model.
#[derive(Debug, Default)]
pub struct MockBackend {
    apps: RefCell<AppList>,
    config: RefCell<ConfigListing>,
    calls: RefCell<Vec<String>>,
    imports: RefCell<Vec<Value>>,
    failures: HashMap<String, (i32, String)>,
    install_keeps_disabled: bool,
}

impl MockBackend {
    /// Empty installation: no apps, no settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an app in the given state.
    pub fn with_app(self, name: &str, state: AppState) -> Self {
        set_app_state(&mut self.apps.borrow_mut(), name, state);
        self
    }

    /// Seed a setting.
    pub fn with_setting(self, scope: Scope, name: &str, value: Value) -> Self {
        insert_setting(&mut self.config.borrow_mut(), &scope, name, value);
        self
    }

    /// Leave freshly installed apps disabled, as occ does for apps that
    /// fail their compatibility check on install.
    pub fn install_keeps_disabled(mut self) -> Self {
        self.install_keeps_disabled = true;
        self
    }

    /// Make every command with this subcommand exit with `code`.
    pub fn fail(mut self, subcommand: &str, code: i32, stderr: &str) -> Self {
        self.failures
            .insert(subcommand.to_string(), (code, stderr.to_string()));
        self
    }

    /// Every command run so far, as `subcommand args...`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Commands that would change state.
    pub fn mutations(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| !is_read(c.split(' ').next().unwrap_or_default()))
            .cloned()
            .collect()
    }

    /// Number of times a subcommand ran.
    pub fn count(&self, subcommand: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.split(' ').next() == Some(subcommand))
            .count()
    }

    /// Documents passed to `config:import`, read when the import ran.
    pub fn imports(&self) -> Vec<Value> {
        self.imports.borrow().clone()
    }

    /// Current state of an app in the model.
    pub fn app_state(&self, name: &str) -> AppState {
        self.apps.borrow().state(name)
    }

    /// Current value of a setting in the model.
    pub fn setting(&self, scope: &Scope, name: &str) -> Option<Value> {
        self.config.borrow().get(scope, name).cloned()
    }

    fn run(&self, args: &[String]) -> Result<()> {
        self.calls.borrow_mut().push(args.join(" "));

        let subcommand = args.first().map(String::as_str).unwrap_or_default();
        let Some((code, stderr)) = self.failures.get(subcommand) else {
            return Ok(());
        };

        if is_read(subcommand) {
            Err(Error::Observation {
                command: format!("php occ {}", args.join(" ")),
                code: Some(*code),
                stderr: stderr.clone(),
            })
        } else {
            Err(Error::Action {
                action: subcommand.to_string(),
                name: args.get(1).cloned().unwrap_or_default(),
                code: Some(*code),
                stdout: String::new(),
                stderr: stderr.clone(),
            })
        }
    }
}

impl Backend for MockBackend {
    fn list_apps(&self) -> Result<AppList> {
        self.run(&["app:list".to_string()])?;
        Ok(self.apps.borrow().clone())
    }

    fn app_action(&self, action: AppAction, name: &str) -> Result<ActionOutput> {
        self.run(&[action.subcommand().to_string(), name.to_string()])?;

        let state = match action {
            AppAction::Install if self.install_keeps_disabled => AppState::Disabled,
            AppAction::Install | AppAction::Enable => AppState::Enabled,
            AppAction::Disable => AppState::Disabled,
            AppAction::Remove => AppState::Absent,
        };
        set_app_state(&mut self.apps.borrow_mut(), name, state);

        Ok(ActionOutput {
            stdout: format!("{name} {}\n", action.subcommand()),
            stderr: String::new(),
        })
    }

    fn get_value(&self, key: &ConfigKey) -> Result<String> {
        self.run(&key.get_args())?;

        let config = self.config.borrow();
        let value = config.get(&key.scope, &key.name);
        let value = match (key.index, value) {
            (Some(i), Some(Value::Array(items))) => items.get(i as usize),
            (Some(_), _) => None,
            (None, value) => value,
        };

        Ok(match value {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        })
    }

    fn set_value(&self, key: &ConfigKey, value: &str) -> Result<ActionOutput> {
        self.run(&key.set_args(value))?;

        let mut config = self.config.borrow_mut();
        let new_value = match key.index {
            None => Value::String(value.to_string()),
            Some(i) => {
                let mut items = match config.get(&key.scope, &key.name) {
                    Some(Value::Array(items)) => items.clone(),
                    _ => Vec::new(),
                };
                let i = i as usize;
                if items.len() <= i {
                    items.resize(i + 1, Value::String(String::new()));
                }
                items[i] = Value::String(value.to_string());
                Value::Array(items)
            }
        };
        insert_setting(&mut config, &key.scope, &key.name, new_value);

        Ok(ActionOutput {
            stdout: format!("Config value {} set to {value}\n", key.name),
            stderr: String::new(),
        })
    }

    fn delete_value(&self, key: &ConfigKey) -> Result<ActionOutput> {
        self.run(&key.delete_args())?;

        let mut config = self.config.borrow_mut();
        match key.index {
            Some(i) => {
                if let Some(Value::Array(items)) = config.get(&key.scope, &key.name).cloned() {
                    let kept = items
                        .into_iter()
                        .enumerate()
                        .filter(|(n, _)| *n != i as usize)
                        .map(|(_, v)| v)
                        .collect();
                    insert_setting(&mut config, &key.scope, &key.name, Value::Array(kept));
                }
            }
            None => match &key.scope {
                Scope::System => {
                    config.system.remove(&key.name);
                }
                Scope::App(owner) => {
                    if let Some(app) = config.apps.get_mut(owner) {
                        app.remove(&key.name);
                    }
                }
            },
        }

        Ok(ActionOutput {
            stdout: format!("Config value {} deleted\n", key.name),
            stderr: String::new(),
        })
    }

    fn list_config(&self) -> Result<ConfigListing> {
        self.run(&[
            "config:list".to_string(),
            "--private".to_string(),
            "--output=json".to_string(),
        ])?;
        Ok(self.config.borrow().clone())
    }

    fn import_config(&self, path: &Path) -> Result<ActionOutput> {
        self.run(&["config:import".to_string(), path.display().to_string()])?;

        let document: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
        let imported: ConfigListing = serde_json::from_value(document.clone())?;
        self.imports.borrow_mut().push(document);

        let mut config = self.config.borrow_mut();
        for (name, value) in imported.system {
            config.system.insert(name, value);
        }
        for (owner, settings) in imported.apps {
            config.apps.entry(owner).or_default().extend(settings);
        }

        Ok(ActionOutput {
            stdout: "Config successfully imported\n".to_string(),
            stderr: String::new(),
        })
    }
}

fn is_read(subcommand: &str) -> bool {
    subcommand == "app:list" || subcommand == "config:list" || subcommand.ends_with(":get")
}

fn set_app_state(apps: &mut AppList, name: &str, state: AppState) {
    apps.enabled.remove(name);
    apps.disabled.remove(name);
    match state {
        AppState::Enabled => {
            apps.enabled.insert(name.to_string());
        }
        AppState::Disabled => {
            apps.disabled.insert(name.to_string());
        }
        AppState::Absent => {}
    }
}

fn insert_setting(config: &mut ConfigListing, scope: &Scope, name: &str, value: Value) {
    match scope {
        Scope::System => {
            config.system.insert(name.to_string(), value);
        }
        Scope::App(owner) => {
            config
                .apps
                .entry(owner.clone())
                .or_default()
                .insert(name.to_string(), value);
        }
    }
}

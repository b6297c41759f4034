//! Desired-state parameters supplied by the caller
//!
//! The same structs are filled from CLI flags or from a JSON parameter
//! object written by the orchestration host. Validation turns them into
//! resources; any inconsistency is an `occkit::Error::Validation`.

use crate::resource::{ConfigValue, NextcloudApp, NextcloudSetting};
use clap::ValueEnum;
use declarative::Resource;
use occkit::backend::Backend;
use occkit::{AppState, ConfigKey, Error, Scope, SettingValue};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// Whether the resource should exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum State {
    #[default]
    Present,
    Absent,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Present => write!(f, "present"),
            State::Absent => write!(f, "absent"),
        }
    }
}

/// Namespace of a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SettingType {
    System,
    App,
}

impl fmt::Display for SettingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingType::System => write!(f, "system"),
            SettingType::App => write!(f, "app"),
        }
    }
}

/// Which resource a parameter object describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceKind {
    /// Installed/enabled apps
    App,
    /// Scalar values set with `config:*:set`
    Config,
    /// Typed values, structured ones imported with `config:import`
    Setting,
}

/// Flags the host adds to every parameter object
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct HostFlags {
    #[serde(default, rename = "_ansible_check_mode", deserialize_with = "flexible_bool")]
    pub check_mode: bool,
    #[serde(default, rename = "_ansible_diff", deserialize_with = "flexible_bool")]
    pub diff: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppRequest {
    pub name: String,
    #[serde(default)]
    pub state: State,
    #[serde(default = "default_true", deserialize_with = "flexible_bool")]
    pub enabled: bool,
    #[serde(default, alias = "nextcloud_root", alias = "root-directory")]
    pub root_directory: Option<PathBuf>,
    #[serde(flatten)]
    pub host: HostFlags,
}

impl AppRequest {
    /// Lifecycle state asked for
    pub fn desired(&self) -> AppState {
        match (self.state, self.enabled) {
            (State::Absent, _) => AppState::Absent,
            (State::Present, true) => AppState::Enabled,
            (State::Present, false) => AppState::Disabled,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SettingType,
    #[serde(default, deserialize_with = "scalar_string")]
    pub value: Option<String>,
    #[serde(default)]
    pub state: State,
    #[serde(default)]
    pub index: Option<u32>,
    /// App owning the key when `type` is `app`
    #[serde(default, alias = "appname")]
    pub owner: Option<String>,
    #[serde(default, alias = "nextcloud_root", alias = "root-directory")]
    pub root_directory: Option<PathBuf>,
    #[serde(flatten)]
    pub host: HostFlags,
}

impl ConfigRequest {
    /// Address of the value
    ///
    /// App keys without `owner` may be given as `"<app> <key>"`.
    pub fn key(&self) -> occkit::Result<ConfigKey> {
        match self.kind {
            SettingType::System => Ok(ConfigKey::system(&self.name).with_index(self.index)),
            SettingType::App => {
                if self.index.is_some() {
                    return Err(Error::validation(
                        "index is only supported for system settings",
                    ));
                }
                match &self.owner {
                    Some(owner) => Ok(ConfigKey::app(owner, &self.name)),
                    None => split_owner(&self.name)
                        .map(|(owner, name)| ConfigKey::app(owner, name))
                        .ok_or_else(|| {
                            Error::validation(
                                "owner is required when type=app (or name it as \"<app> <key>\")",
                            )
                        }),
                }
            }
        }
    }

    /// Value asked for, `None` to unset
    pub fn desired(&self) -> occkit::Result<Option<String>> {
        match self.state {
            State::Absent => Ok(None),
            State::Present => self
                .value
                .clone()
                .map(Some)
                .ok_or_else(|| Error::validation("value is required when state=present")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SettingRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SettingType,
    #[serde(default, alias = "appname")]
    pub owner: Option<String>,
    #[serde(default, alias = "values")]
    pub value: Option<Value>,
    #[serde(default)]
    pub state: State,
    #[serde(default, alias = "nextcloud_root", alias = "root-directory")]
    pub root_directory: Option<PathBuf>,
    #[serde(flatten)]
    pub host: HostFlags,
}

impl SettingRequest {
    pub fn scope(&self) -> occkit::Result<Scope> {
        match (self.kind, &self.owner) {
            (SettingType::System, owner) => {
                if let Some(owner) = owner {
                    log::warn!("Ignoring owner {owner} for system setting {}", self.name);
                }
                Ok(Scope::System)
            }
            (SettingType::App, Some(owner)) if !owner.trim().is_empty() => {
                Ok(Scope::App(owner.clone()))
            }
            (SettingType::App, _) => Err(Error::validation("owner is required when type=app")),
        }
    }

    /// Value asked for, `None` to delete
    pub fn desired(&self) -> occkit::Result<Option<SettingValue>> {
        match (self.state, &self.value) {
            (State::Absent, _) => Ok(None),
            (State::Present, None | Some(Value::Null)) => {
                Err(Error::validation("value is required when state=present"))
            }
            (State::Present, Some(value)) => Ok(Some(SettingValue::from_json(value.clone()))),
        }
    }
}

/// A validated-on-build request for one resource
#[derive(Debug, Clone)]
pub enum Request {
    App(AppRequest),
    Config(ConfigRequest),
    Setting(SettingRequest),
}

impl Request {
    /// Parse a host parameter object
    pub fn from_params(kind: ResourceKind, params: Value) -> occkit::Result<Self> {
        let invalid = |e: serde_json::Error| Error::validation(format!("invalid parameters: {e}"));
        Ok(match kind {
            ResourceKind::App => Self::App(serde_json::from_value(params).map_err(invalid)?),
            ResourceKind::Config => Self::Config(serde_json::from_value(params).map_err(invalid)?),
            ResourceKind::Setting => {
                Self::Setting(serde_json::from_value(params).map_err(invalid)?)
            }
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Self::App(r) => &r.name,
            Self::Config(r) => &r.name,
            Self::Setting(r) => &r.name,
        }
    }

    pub fn state(&self) -> State {
        match self {
            Self::App(r) => r.state,
            Self::Config(r) => r.state,
            Self::Setting(r) => r.state,
        }
    }

    /// `type` of a setting request; apps have none
    pub fn setting_type(&self) -> Option<SettingType> {
        match self {
            Self::App(_) => None,
            Self::Config(r) => Some(r.kind),
            Self::Setting(r) => Some(r.kind),
        }
    }

    pub fn root_directory(&self) -> Option<&Path> {
        match self {
            Self::App(r) => r.root_directory.as_deref(),
            Self::Config(r) => r.root_directory.as_deref(),
            Self::Setting(r) => r.root_directory.as_deref(),
        }
    }

    pub fn host_flags(&self) -> HostFlags {
        match self {
            Self::App(r) => r.host,
            Self::Config(r) => r.host,
            Self::Setting(r) => r.host,
        }
    }

    /// Validate and build the resource
    pub fn build<'a, B>(&self, backend: B) -> occkit::Result<Box<dyn Resource + 'a>>
    where
        B: Backend + fmt::Debug + 'a,
    {
        if self.name().trim().is_empty() {
            return Err(Error::validation("name must not be empty"));
        }

        Ok(match self {
            Self::App(r) => Box::new(NextcloudApp::new(backend, &r.name, r.desired())),
            Self::Config(r) => Box::new(ConfigValue::new(backend, r.key()?, r.desired()?)),
            Self::Setting(r) => Box::new(NextcloudSetting::new(
                backend,
                r.scope()?,
                &r.name,
                r.desired()?,
            )),
        })
    }
}

fn default_true() -> bool {
    true
}

/// `"<app> <key>"` -> (app, key)
fn split_owner(name: &str) -> Option<(&str, &str)> {
    let (owner, key) = name.trim().split_once(char::is_whitespace)?;
    let key = key.trim();
    (!owner.is_empty() && !key.is_empty()).then_some((owner, key))
}

/// Booleans as hosts write them: `true`, `"yes"`, `"on"`, `1`...
fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::Number(n) if n.as_i64() == Some(1) => Ok(true),
        Value::Number(n) if n.as_i64() == Some(0) => Ok(false),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" | "on" | "1" => Ok(true),
            "no" | "n" | "false" | "off" | "0" => Ok(false),
            _ => Err(D::Error::custom(format!("invalid boolean: {s}"))),
        },
        other => Err(D::Error::custom(format!("invalid boolean: {other}"))),
    }
}

/// Scalars are accepted as text; occ stores them as text anyway
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(D::Error::custom(format!(
            "value must be a string, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use occkit::ErrorCategory;
    use serde_json::json;

    #[test]
    fn test_app_defaults_and_aliases() {
        let req = Request::from_params(
            ResourceKind::App,
            json!({"name": "calendar", "nextcloud_root": "/var/www/nextcloud"}),
        )
        .unwrap();
        let Request::App(app) = &req else {
            panic!("expected app request")
        };
        assert_eq!(app.state, State::Present);
        assert!(app.enabled);
        assert_eq!(app.desired(), AppState::Enabled);
        assert_eq!(req.root_directory(), Some(Path::new("/var/www/nextcloud")));
        assert!(!req.host_flags().check_mode);
    }

    #[test]
    fn test_enabled_accepts_yes_no() {
        let req: AppRequest =
            serde_json::from_value(json!({"name": "news", "enabled": "no"})).unwrap();
        assert_eq!(req.desired(), AppState::Disabled);

        let err = serde_json::from_value::<AppRequest>(json!({"name": "news", "enabled": "maybe"}))
            .unwrap_err();
        assert!(err.to_string().contains("invalid boolean"));
    }

    #[test]
    fn test_absent_ignores_enabled() {
        let req: AppRequest =
            serde_json::from_value(json!({"name": "news", "state": "absent", "enabled": false}))
                .unwrap();
        assert_eq!(req.desired(), AppState::Absent);
    }

    #[test]
    fn test_host_flags() {
        let req = Request::from_params(
            ResourceKind::App,
            json!({
                "name": "news",
                "_ansible_check_mode": true,
                "_ansible_diff": "yes",
                "_ansible_verbosity": 2
            }),
        )
        .unwrap();
        let flags = req.host_flags();
        assert!(flags.check_mode);
        assert!(flags.diff);
    }

    #[test]
    fn test_config_value_required_when_present() {
        let req: ConfigRequest =
            serde_json::from_value(json!({"name": "debug", "type": "system"})).unwrap();
        let err = req.desired().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation);

        let req: ConfigRequest =
            serde_json::from_value(json!({"name": "debug", "type": "system", "state": "absent"}))
                .unwrap();
        assert_eq!(req.desired().unwrap(), None);
    }

    #[test]
    fn test_config_scalar_numbers_become_text() {
        let req: ConfigRequest = serde_json::from_value(
            json!({"name": "trusted_domains", "type": "system", "value": 1, "index": 2}),
        )
        .unwrap();
        assert_eq!(req.desired().unwrap(), Some("1".to_string()));
        assert_eq!(req.key().unwrap().index, Some(2));
    }

    #[test]
    fn test_config_app_key_from_name() {
        let req: ConfigRequest = serde_json::from_value(
            json!({"name": "files_sharing  lookupServerEnabled", "type": "app", "value": "no"}),
        )
        .unwrap();
        assert_eq!(
            req.key().unwrap(),
            ConfigKey::app("files_sharing", "lookupServerEnabled")
        );

        let req: ConfigRequest = serde_json::from_value(
            json!({"name": "lookupServerEnabled", "type": "app", "appname": "files_sharing", "value": "no"}),
        )
        .unwrap();
        assert_eq!(
            req.key().unwrap(),
            ConfigKey::app("files_sharing", "lookupServerEnabled")
        );
    }

    #[test]
    fn test_config_app_key_needs_owner() {
        let req: ConfigRequest =
            serde_json::from_value(json!({"name": "enabled", "type": "app", "value": "yes"}))
                .unwrap();
        assert_eq!(req.key().unwrap_err().category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_setting_owner_required_for_app() {
        let req: SettingRequest =
            serde_json::from_value(json!({"name": "types", "type": "app", "value": "x"})).unwrap();
        assert!(req.scope().is_err());

        let req: SettingRequest = serde_json::from_value(
            json!({"name": "types", "type": "app", "appname": "news", "value": "x"}),
        )
        .unwrap();
        assert_eq!(req.scope().unwrap(), Scope::App("news".to_string()));
    }

    #[test]
    fn test_setting_value_tagging() {
        let req: SettingRequest = serde_json::from_value(
            json!({"name": "redis", "type": "system", "values": {"host": "x", "port": 0}}),
        )
        .unwrap();
        assert_eq!(
            req.desired().unwrap(),
            Some(SettingValue::Json(json!({"host": "x", "port": 0})))
        );

        let req: SettingRequest = serde_json::from_value(
            json!({"name": "overwrite.cli.url", "type": "system", "value": "https://example.com"}),
        )
        .unwrap();
        assert!(matches!(req.desired().unwrap(), Some(SettingValue::Str(_))));
    }

    #[test]
    fn test_setting_null_value_is_missing() {
        let req: SettingRequest =
            serde_json::from_value(json!({"name": "redis", "type": "system", "value": null}))
                .unwrap();
        assert!(req.desired().is_err());
    }

    #[test]
    fn test_unknown_state_is_rejected() {
        let err = Request::from_params(
            ResourceKind::App,
            json!({"name": "news", "state": "latest"}),
        )
        .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_split_owner() {
        assert_eq!(split_owner("news feeds"), Some(("news", "feeds")));
        assert_eq!(split_owner("news"), None);
        assert_eq!(split_owner("news   "), None);
    }
}

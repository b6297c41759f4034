//! Core types for occ observations and requests.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Lifecycle state of a Nextcloud app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppState {
    /// Not installed
    Absent,
    /// Installed and enabled
    Enabled,
    /// Installed but disabled
    Disabled,
}

impl AppState {
    /// Short label used in diffs and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        }
    }
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Mutating app subcommands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppAction {
    /// Download and install the app (occ enables it as well)
    Install,
    /// Uninstall the app
    Remove,
    /// Enable an installed app
    Enable,
    /// Disable an installed app
    Disable,
}

impl AppAction {
    /// The occ subcommand for this action.
    pub fn subcommand(&self) -> &'static str {
        match self {
            Self::Install => "app:install",
            Self::Remove => "app:remove",
            Self::Enable => "app:enable",
            Self::Disable => "app:disable",
        }
    }
}

impl fmt::Display for AppAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.subcommand())
    }
}

/// Output of `occ app:list --output=json`.
///
/// occ prints each list as an object of `name -> version`, and PHP encodes an
/// empty object as `[]`, so both shapes are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppList {
    /// Installed and enabled apps
    #[serde(default, deserialize_with = "app_names")]
    pub enabled: BTreeSet<String>,
    /// Installed but disabled apps
    #[serde(default, deserialize_with = "app_names")]
    pub disabled: BTreeSet<String>,
}

impl AppList {
    /// Whether the app is installed (enabled or disabled).
    pub fn is_installed(&self, name: &str) -> bool {
        self.enabled.contains(name) || self.disabled.contains(name)
    }

    /// Whether the app is installed and enabled.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled.contains(name)
    }

    /// Lifecycle state of an app.
    pub fn state(&self, name: &str) -> AppState {
        if self.is_enabled(name) {
            AppState::Enabled
        } else if self.is_installed(name) {
            AppState::Disabled
        } else {
            AppState::Absent
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NameSet {
    Names(Vec<String>),
    Versions(BTreeMap<String, Value>),
}

fn app_names<'de, D>(deserializer: D) -> std::result::Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match NameSet::deserialize(deserializer)? {
        NameSet::Names(names) => names.into_iter().collect(),
        NameSet::Versions(versions) => versions.into_keys().collect(),
    })
}

/// Namespace a setting lives in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Global `config.php` settings
    System,
    /// Settings owned by the named app
    App(String),
}

impl Scope {
    /// `system` or `app`, as used in occ subcommand names.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::App(_) => "app",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::App(owner) => write!(f, "app:{owner}"),
        }
    }
}

/// Address of a single configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigKey {
    /// Namespace of the setting
    pub scope: Scope,
    /// Setting name, e.g. `overwrite.cli.url`
    pub name: String,
    /// Position within a list-valued system setting (e.g. `trusted_domains`)
    pub index: Option<u32>,
}

impl ConfigKey {
    /// A system setting.
    pub fn system(name: impl Into<String>) -> Self {
        Self {
            scope: Scope::System,
            name: name.into(),
            index: None,
        }
    }

    /// A setting owned by an app.
    pub fn app(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            scope: Scope::App(owner.into()),
            name: name.into(),
            index: None,
        }
    }

    /// Address one element of a list-valued setting.
    pub fn with_index(mut self, index: Option<u32>) -> Self {
        self.index = index;
        self
    }

    /// Positional arguments identifying this key, after the subcommand.
    fn target_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(3);
        if let Scope::App(owner) = &self.scope {
            args.push(owner.clone());
        }
        args.push(self.name.clone());
        if let Some(index) = self.index {
            args.push(index.to_string());
        }
        args
    }

    fn with_subcommand(&self, verb: &str) -> Vec<String> {
        let mut args = vec![format!("config:{}:{verb}", self.scope.kind())];
        args.extend(self.target_args());
        args
    }

    /// Arguments for reading the value; unset keys read as an empty string.
    pub fn get_args(&self) -> Vec<String> {
        let mut args = self.with_subcommand("get");
        args.push("--default-value=".to_string());
        args
    }

    /// Arguments for setting the value. The value is one argv element.
    pub fn set_args(&self, value: &str) -> Vec<String> {
        let mut args = self.with_subcommand("set");
        args.push(format!("--value={value}"));
        args
    }

    /// Arguments for deleting the value.
    pub fn delete_args(&self) -> Vec<String> {
        self.with_subcommand("delete")
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Scope::System => write!(f, "{}", self.name)?,
            Scope::App(owner) => write!(f, "{owner}.{}", self.name)?,
        }
        if let Some(index) = self.index {
            write!(f, "[{index}]")?;
        }
        Ok(())
    }
}

/// Output of `occ config:list --private --output=json`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConfigListing {
    /// System settings by name
    #[serde(default, deserialize_with = "settings_map")]
    pub system: BTreeMap<String, Value>,
    /// App settings by owner, then name
    #[serde(default, deserialize_with = "app_settings_map")]
    pub apps: BTreeMap<String, BTreeMap<String, Value>>,
}

impl ConfigListing {
    /// Current value of a setting, if it is set.
    pub fn get(&self, scope: &Scope, name: &str) -> Option<&Value> {
        match scope {
            Scope::System => self.system.get(name),
            Scope::App(owner) => self.apps.get(owner).and_then(|app| app.get(name)),
        }
    }

    /// Whether a setting is set.
    pub fn contains(&self, scope: &Scope, name: &str) -> bool {
        self.get(scope, name).is_some()
    }
}

/// A JSON object, or `[]` when PHP encoded an empty one.
#[derive(Deserialize)]
#[serde(untagged)]
enum ObjectOrList<T> {
    Object(BTreeMap<String, T>),
    List(Vec<T>),
}

impl<T> ObjectOrList<T> {
    fn into_map(self) -> BTreeMap<String, T> {
        match self {
            Self::Object(map) => map,
            Self::List(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
        }
    }
}

fn settings_map<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(ObjectOrList::<Value>::deserialize(deserializer)?.into_map())
}

fn app_settings_map<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, BTreeMap<String, Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(ObjectOrList::<ObjectOrList<Value>>::deserialize(deserializer)?
        .into_map()
        .into_iter()
        .map(|(owner, settings)| (owner, settings.into_map()))
        .collect())
}

/// Desired value of a structured setting.
///
/// Strings go through `config:*:set`; anything else needs `config:import`.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    /// Plain string value
    Str(String),
    /// Any other JSON value (object, array, number, boolean, null)
    Json(Value),
}

impl SettingValue {
    /// Tag a JSON value.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::String(s) => Self::Str(s),
            other => Self::Json(other),
        }
    }

    /// The value as JSON, for comparisons and import documents.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Str(s) => Value::String(s.clone()),
            Self::Json(v) => v.clone(),
        }
    }

    /// Compare against an observed value.
    pub fn matches(&self, current: Option<&Value>) -> bool {
        json_eq(&self.to_json(), current.unwrap_or(&Value::Null))
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

/// Deep structural equality where numbers compare by numeric value, so an
/// observed `0` matches a desired `0.0`.
///
/// Two integers compare exactly; the float comparison only applies when
/// one side is a float.
pub fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            x == y
                || ((x.is_f64() || y.is_f64())
                    && matches!((x.as_f64(), y.as_f64()), (Some(x), Some(y)) if x == y))
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_eq(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| json_eq(x, y)))
        }
        _ => a == b,
    }
}

/// Captured streams of a successful occ command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOutput {
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_app_list_versions_object() {
        let list: AppList = serde_json::from_str(
            r#"{"enabled":{"files":"1.20.0","calendar":"4.5.0"},"disabled":{"news":"24.0.0"}}"#,
        )
        .unwrap();
        assert_eq!(list.state("calendar"), AppState::Enabled);
        assert_eq!(list.state("news"), AppState::Disabled);
        assert_eq!(list.state("deck"), AppState::Absent);
        assert!(list.is_installed("news"));
        assert!(!list.is_enabled("news"));
    }

    #[test]
    fn test_app_list_empty_php_array() {
        let list: AppList =
            serde_json::from_str(r#"{"enabled":{"files":"1.0"},"disabled":[]}"#).unwrap();
        assert!(list.disabled.is_empty());
        assert!(list.is_enabled("files"));
    }

    #[test]
    fn test_app_list_name_arrays() {
        let list: AppList =
            serde_json::from_str(r#"{"enabled":["files"],"disabled":["news"]}"#).unwrap();
        assert_eq!(list.state("news"), AppState::Disabled);
    }

    #[test]
    fn test_config_key_args() {
        let key = ConfigKey::system("trusted_domains").with_index(Some(1));
        assert_eq!(
            key.get_args(),
            vec!["config:system:get", "trusted_domains", "1", "--default-value="]
        );
        assert_eq!(
            key.set_args("cloud.example.com"),
            vec!["config:system:set", "trusted_domains", "1", "--value=cloud.example.com"]
        );

        let key = ConfigKey::app("files_sharing", "incoming_server2server_share_enabled");
        assert_eq!(
            key.delete_args(),
            vec![
                "config:app:delete",
                "files_sharing",
                "incoming_server2server_share_enabled"
            ]
        );
    }

    #[test]
    fn test_set_args_keep_value_in_one_argument() {
        let key = ConfigKey::system("mail_from_address");
        let args = key.set_args(r#"it's "quoted" $HOME; rm -rf /"#);
        assert_eq!(args.len(), 3);
        assert_eq!(args[2], r#"--value=it's "quoted" $HOME; rm -rf /"#);
    }

    #[test]
    fn test_config_listing_lookup() {
        let listing: ConfigListing = serde_json::from_str(
            r#"{"system":{"redis":{"host":"x","port":0}},"apps":{"core":{"installedat":"1"},"news":[]}}"#,
        )
        .unwrap();
        assert_eq!(
            listing.get(&Scope::System, "redis"),
            Some(&json!({"host": "x", "port": 0}))
        );
        assert!(listing.contains(&Scope::App("core".into()), "installedat"));
        assert!(!listing.contains(&Scope::App("news".into()), "enabled"));
        assert!(!listing.contains(&Scope::App("missing".into()), "enabled"));
    }

    #[test]
    fn test_setting_value_tagging() {
        assert_eq!(
            SettingValue::from_json(json!("https://example.com")),
            SettingValue::Str("https://example.com".into())
        );
        assert_eq!(
            SettingValue::from_json(json!(true)),
            SettingValue::Json(json!(true))
        );
        assert!(matches!(
            SettingValue::from_json(json!({"a": 1})),
            SettingValue::Json(_)
        ));
    }

    #[test]
    fn test_setting_value_matches() {
        let desired = SettingValue::Json(json!({"host": "x", "port": 0}));
        assert!(desired.matches(Some(&json!({"port": 0, "host": "x"}))));
        assert!(!desired.matches(Some(&json!({"host": "y", "port": 0}))));
        assert!(!desired.matches(None));

        let desired = SettingValue::Json(json!({"timeout": 0.0}));
        assert!(desired.matches(Some(&json!({"timeout": 0}))));
    }

    #[test]
    fn test_json_eq_strings_are_not_coerced() {
        assert!(!json_eq(&json!("1"), &json!(1)));
        assert!(!json_eq(&json!("true"), &json!(true)));
        assert!(!json_eq(&json!([1, 2]), &json!([2, 1])));
    }

    #[test]
    fn test_json_eq_large_integers_are_exact() {
        // both round to 2^53 as f64
        assert!(!json_eq(
            &json!(9_007_199_254_740_993_u64),
            &json!(9_007_199_254_740_992_u64)
        ));
        assert!(!json_eq(
            &json!({"quota": 9_007_199_254_740_993_u64}),
            &json!({"quota": 9_007_199_254_740_992_u64})
        ));
        assert!(json_eq(&json!(-3), &json!(-3.0)));
    }
}

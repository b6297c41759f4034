//! Scalar config value resource - `occ config:system|app:get/set/delete`
//!
//! Values are compared as text, exactly as occ prints them minus the line
//! terminator. `"true"` and
//! `"1"` are different values here.

use anyhow::Result;
use declarative::{ApplyContext, ApplyResult, Resource, ResourceState};
use occkit::backend::Backend;
use occkit::{ConfigKey, ObservationCache};

/// A single config value addressed by scope, name and optional index
#[derive(Debug)]
pub struct ConfigValue<B> {
    pub key: ConfigKey,
    /// `None` means the value should be unset
    pub desired: Option<String>,
    backend: B,
    current: ObservationCache<String>,
}

impl<B: Backend> ConfigValue<B> {
    pub fn new(backend: B, key: ConfigKey, desired: Option<String>) -> Self {
        Self {
            key,
            desired,
            backend,
            current: ObservationCache::new(),
        }
    }

    /// Current value; empty when unset
    fn read_current(&mut self) -> Result<String> {
        let backend = &self.backend;
        let key = &self.key;
        Ok(self.current.fetch(|| backend.get_value(key))?.clone())
    }
}

impl<B: Backend + std::fmt::Debug> Resource for ConfigValue<B> {
    fn id(&self) -> String {
        self.key.to_string()
    }

    fn description(&self) -> String {
        format!("Config value {} ({})", self.key, self.key.scope)
    }

    fn resource_type(&self) -> &'static str {
        "nextcloud_config"
    }

    fn current_state(&mut self) -> Result<ResourceState> {
        let current = self.read_current()?;

        Ok(match &self.desired {
            Some(desired) if *desired == current => ResourceState::Present {
                details: Some(current),
            },
            _ if current.is_empty() => ResourceState::Absent,
            Some(desired) => ResourceState::Modified {
                from: current,
                to: desired.clone(),
            },
            None => ResourceState::Present {
                details: Some(current),
            },
        })
    }

    fn desired_state(&self) -> ResourceState {
        match &self.desired {
            Some(value) => ResourceState::Present {
                details: Some(value.clone()),
            },
            None => ResourceState::Absent,
        }
    }

    fn apply(&mut self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        let current = self.read_current()?;

        let (output, result) = match &self.desired {
            None if current.is_empty() => return Ok(ApplyResult::NoChange),
            None => (
                self.backend.delete_value(&self.key)?,
                ApplyResult::Removed,
            ),
            Some(desired) if *desired == current => return Ok(ApplyResult::NoChange),
            Some(desired) => {
                let output = self.backend.set_value(&self.key, desired)?;
                if current.is_empty() {
                    (output, ApplyResult::Created)
                } else {
                    (output, ApplyResult::Modified)
                }
            }
        };

        ctx.record(&output.stdout, &output.stderr);
        self.current.invalidate();
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::{ApplyOptions, reconcile};
    use occkit::Scope;
    use occkit::backend::mock::MockBackend;
    use serde_json::json;

    fn mock_with(value: &str) -> MockBackend {
        MockBackend::new().with_setting(Scope::System, "overwriteprotocol", json!(value))
    }

    #[test]
    fn test_equal_value_is_noop() {
        let mock = mock_with("a");
        let mut value = ConfigValue::new(
            &mock,
            ConfigKey::system("overwriteprotocol"),
            Some("a".to_string()),
        );
        let outcome = reconcile(&mut value, ApplyOptions::default()).unwrap();
        assert!(!outcome.changed);
        assert!(mock.mutations().is_empty());
    }

    #[test]
    fn test_different_value_sets_once() {
        let mock = mock_with("a");
        let mut value = ConfigValue::new(
            &mock,
            ConfigKey::system("overwriteprotocol"),
            Some("b".to_string()),
        );
        let outcome = reconcile(&mut value, ApplyOptions::default()).unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.result, ApplyResult::Modified);
        assert_eq!(
            mock.mutations(),
            vec!["config:system:set overwriteprotocol --value=b"]
        );

        let again = reconcile(&mut value, ApplyOptions::default()).unwrap();
        assert!(!again.changed);
        assert_eq!(mock.mutations().len(), 1);
    }

    #[test]
    fn test_boolean_like_strings_are_not_coerced() {
        let mock = MockBackend::new().with_setting(Scope::System, "debug", json!("1"));
        let mut value =
            ConfigValue::new(&mock, ConfigKey::system("debug"), Some("true".to_string()));
        let outcome = reconcile(&mut value, ApplyOptions::default()).unwrap();
        assert!(outcome.changed);
    }

    #[test]
    fn test_surrounding_whitespace_is_kept_and_idempotent() {
        let mock = MockBackend::new();
        let mut value = ConfigValue::new(
            &mock,
            ConfigKey::system("mail_from_address"),
            Some("admin ".to_string()),
        );
        let first = reconcile(&mut value, ApplyOptions::default()).unwrap();
        assert!(first.changed);

        let second = reconcile(&mut value, ApplyOptions::default()).unwrap();
        assert!(!second.changed);
        assert_eq!(
            mock.mutations(),
            vec!["config:system:set mail_from_address --value=admin "]
        );
    }

    #[test]
    fn test_absent_on_unset_is_noop() {
        let mock = MockBackend::new();
        let mut value = ConfigValue::new(&mock, ConfigKey::system("overwritehost"), None);
        let outcome = reconcile(&mut value, ApplyOptions::default()).unwrap();
        assert!(!outcome.changed);
        assert!(mock.mutations().is_empty());
    }

    #[test]
    fn test_absent_deletes_set_value() {
        let mock = mock_with("https");
        let mut value = ConfigValue::new(&mock, ConfigKey::system("overwriteprotocol"), None);
        let outcome = reconcile(&mut value, ApplyOptions::default()).unwrap();
        assert_eq!(outcome.result, ApplyResult::Removed);
        assert_eq!(
            mock.mutations(),
            vec!["config:system:delete overwriteprotocol"]
        );
        assert_eq!(mock.setting(&Scope::System, "overwriteprotocol"), None);
    }

    #[test]
    fn test_indexed_value() {
        let mock = MockBackend::new().with_setting(
            Scope::System,
            "trusted_domains",
            json!(["localhost"]),
        );
        let key = ConfigKey::system("trusted_domains").with_index(Some(1));
        let mut value = ConfigValue::new(&mock, key, Some("cloud.example.com".to_string()));
        let outcome = reconcile(&mut value, ApplyOptions::default()).unwrap();
        assert_eq!(outcome.result, ApplyResult::Created);
        assert_eq!(
            mock.mutations(),
            vec!["config:system:set trusted_domains 1 --value=cloud.example.com"]
        );
    }

    #[test]
    fn test_app_scoped_value() {
        let mock = MockBackend::new();
        let key = ConfigKey::app("theming", "name");
        let mut value = ConfigValue::new(&mock, key, Some("My Cloud".to_string()));
        reconcile(&mut value, ApplyOptions::default()).unwrap();
        assert_eq!(
            mock.mutations(),
            vec!["config:app:set theming name --value=My Cloud"]
        );
        assert_eq!(
            mock.setting(&Scope::App("theming".into()), "name"),
            Some(json!("My Cloud"))
        );
    }

    #[test]
    fn test_read_failure_aborts() {
        let mock = mock_with("a").fail("config:system:get", 1, "Nextcloud is not installed");
        let mut value = ConfigValue::new(
            &mock,
            ConfigKey::system("overwriteprotocol"),
            Some("b".to_string()),
        );
        assert!(reconcile(&mut value, ApplyOptions::default()).is_err());
        assert!(mock.mutations().is_empty());
    }

    #[test]
    fn test_set_failure_surfaces_stderr() {
        let mock = mock_with("a").fail("config:system:set", 1, "config is read only\n");
        let mut value = ConfigValue::new(
            &mock,
            ConfigKey::system("overwriteprotocol"),
            Some("b".to_string()),
        );
        let err = reconcile(&mut value, ApplyOptions::default()).unwrap_err();
        let err = err.downcast_ref::<occkit::Error>().unwrap();
        assert_eq!(err.stderr(), Some("config is read only\n"));
    }

    #[test]
    fn test_mutation_invalidates_cache() {
        let mock = mock_with("a");
        let mut value = ConfigValue::new(
            &mock,
            ConfigKey::system("overwriteprotocol"),
            Some("b".to_string()),
        );
        reconcile(&mut value, ApplyOptions::default()).unwrap();
        assert!(!value.current.is_cached());
        assert_eq!(
            value.current_state().unwrap(),
            ResourceState::Present {
                details: Some("b".to_string())
            }
        );
        assert_eq!(mock.count("config:system:get"), 2);
    }
}

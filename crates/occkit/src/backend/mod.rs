//! Backend abstraction for occ operations.
//!
//! The [`Backend`] trait defines the interface for interacting with occ,
//! allowing for different implementations (real CLI, mock for testing).

#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod occ;

use crate::error::Result;
use crate::types::{ActionOutput, AppAction, AppList, ConfigKey, ConfigListing};
use std::path::Path;

/// Backend trait for occ operations.
///
/// Read methods fail with [`Error::Observation`](crate::Error::Observation)
/// and mutating methods with [`Error::Action`](crate::Error::Action) when occ
/// exits with a non-zero status.
pub trait Backend {
    /// List installed apps (`app:list`).
    fn list_apps(&self) -> Result<AppList>;

    /// Install, remove, enable or disable an app.
    fn app_action(&self, action: AppAction, name: &str) -> Result<ActionOutput>;

    /// Read a single value as text (`config:*:get`), without the line terminator.
    fn get_value(&self, key: &ConfigKey) -> Result<String>;

    /// Set a single value from text (`config:*:set`).
    fn set_value(&self, key: &ConfigKey, value: &str) -> Result<ActionOutput>;

    /// Delete a single value (`config:*:delete`).
    fn delete_value(&self, key: &ConfigKey) -> Result<ActionOutput>;

    /// List all configuration (`config:list --private`).
    fn list_config(&self) -> Result<ConfigListing>;

    /// Merge a JSON document into the configuration (`config:import`).
    fn import_config(&self, path: &Path) -> Result<ActionOutput>;
}

impl<B: Backend + ?Sized> Backend for &B {
    fn list_apps(&self) -> Result<AppList> {
        (**self).list_apps()
    }

    fn app_action(&self, action: AppAction, name: &str) -> Result<ActionOutput> {
        (**self).app_action(action, name)
    }

    fn get_value(&self, key: &ConfigKey) -> Result<String> {
        (**self).get_value(key)
    }

    fn set_value(&self, key: &ConfigKey, value: &str) -> Result<ActionOutput> {
        (**self).set_value(key, value)
    }

    fn delete_value(&self, key: &ConfigKey) -> Result<ActionOutput> {
        (**self).delete_value(key)
    }

    fn list_config(&self) -> Result<ConfigListing> {
        (**self).list_config()
    }

    fn import_config(&self, path: &Path) -> Result<ActionOutput> {
        (**self).import_config(path)
    }
}

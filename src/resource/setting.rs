//! Typed setting resource - any JSON value, set directly or via `config:import`

use anyhow::{Context, Result};
use declarative::{ApplyContext, ApplyResult, Resource, ResourceState};
use occkit::backend::Backend;
use occkit::{
    ActionOutput, ConfigKey, ConfigListing, ObservationCache, Scope, SettingValue, import_document,
    write_import_file,
};
use serde_json::Value;

/// A system or app setting holding an arbitrary JSON value
#[derive(Debug)]
pub struct NextcloudSetting<B> {
    pub scope: Scope,
    pub name: String,
    /// `None` means the setting should be deleted
    pub desired: Option<SettingValue>,
    backend: B,
    listing: ObservationCache<ConfigListing>,
}

impl<B: Backend> NextcloudSetting<B> {
    pub fn new(backend: B, scope: Scope, name: &str, desired: Option<SettingValue>) -> Self {
        Self {
            scope,
            name: name.to_string(),
            desired,
            backend,
            listing: ObservationCache::new(),
        }
    }

    fn key(&self) -> ConfigKey {
        ConfigKey {
            scope: self.scope.clone(),
            name: self.name.clone(),
            index: None,
        }
    }

    /// Current value from the cached `config:list`
    fn read_current(&mut self) -> Result<Option<Value>> {
        let backend = &self.backend;
        let listing = self.listing.fetch(|| backend.list_config())?;
        Ok(listing.get(&self.scope, &self.name).cloned())
    }

    /// Write a structured value through a private import document
    fn import(&self, value: &Value) -> Result<ActionOutput> {
        let document = import_document(&self.scope, &self.name, value);
        let file = write_import_file(&document)
            .with_context(|| format!("Failed to write import document for {}", self.key()))?;

        let output = self.backend.import_config(file.path())?;

        let path = file.path().to_path_buf();
        if let Err(e) = file.close() {
            log::warn!("Could not remove {}: {}", path.display(), e);
        }
        Ok(output)
    }
}

impl<B: Backend + std::fmt::Debug> Resource for NextcloudSetting<B> {
    fn id(&self) -> String {
        self.key().to_string()
    }

    fn description(&self) -> String {
        format!("Setting {} ({})", self.name, self.scope)
    }

    fn resource_type(&self) -> &'static str {
        "nextcloud_setting"
    }

    fn current_state(&mut self) -> Result<ResourceState> {
        let current = self.read_current()?;

        Ok(match (current, &self.desired) {
            (None, _) => ResourceState::Absent,
            (Some(value), Some(desired)) if desired.matches(Some(&value)) => {
                ResourceState::Present {
                    details: Some(render_desired(desired)),
                }
            }
            (Some(value), Some(desired)) => ResourceState::Modified {
                from: render(&value),
                to: render_desired(desired),
            },
            (Some(value), None) => ResourceState::Present {
                details: Some(render(&value)),
            },
        })
    }

    fn desired_state(&self) -> ResourceState {
        match &self.desired {
            Some(value) => ResourceState::Present {
                details: Some(render_desired(value)),
            },
            None => ResourceState::Absent,
        }
    }

    fn apply(&mut self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        let current = self.read_current()?;

        let (output, result) = match &self.desired {
            None if current.is_none() => return Ok(ApplyResult::NoChange),
            None => (
                self.backend.delete_value(&self.key())?,
                ApplyResult::Removed,
            ),
            Some(desired) if desired.matches(current.as_ref()) => {
                return Ok(ApplyResult::NoChange);
            }
            Some(desired) => {
                let output = match desired {
                    SettingValue::Str(s) => self.backend.set_value(&self.key(), s)?,
                    SettingValue::Json(v) => self.import(v)?,
                };
                if current.is_none() {
                    (output, ApplyResult::Created)
                } else {
                    (output, ApplyResult::Modified)
                }
            }
        };

        ctx.record(&output.stdout, &output.stderr);
        self.listing.invalidate();
        Ok(result)
    }
}

/// Strings render bare, everything else as indented JSON
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => format!("{other:#}"),
    }
}

fn render_desired(value: &SettingValue) -> String {
    match value {
        SettingValue::Str(s) => s.clone(),
        SettingValue::Json(v) => render(v),
    }
}

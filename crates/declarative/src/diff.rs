//! Diff computation for resources

use crate::resource::Resource;
use crate::types::ResourceState;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A diff between current and desired state of a resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDiff {
    /// Unique identifier of the resource
    pub resource_id: String,
    /// Type of the resource
    pub resource_type: String,
    /// Human-readable description
    pub description: String,
    /// Current state
    pub current: ResourceState,
    /// Desired state
    pub desired: ResourceState,
}

impl ResourceDiff {
    /// Observe a resource and compare it with its desired state
    pub fn from_resource(resource: &mut dyn Resource) -> Result<Self> {
        let current = resource.current_state()?;
        let desired = resource.desired_state();

        Ok(Self {
            resource_id: resource.id(),
            resource_type: resource.resource_type().to_string(),
            description: resource.description(),
            current,
            desired,
        })
    }

    /// Whether current and desired state differ
    pub fn has_changes(&self) -> bool {
        self.current != self.desired
    }

    /// Rendering of the current state, for `before` in diff output
    pub fn before(&self) -> String {
        self.current.render()
    }

    /// Rendering of the desired state, for `after` in diff output
    pub fn after(&self) -> String {
        self.desired.render()
    }
}

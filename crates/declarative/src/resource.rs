//! Resource trait for declarative state management
//!
//! A Resource represents something that can be in a certain state,
//! and can be changed to reach a desired state.

use crate::context::ApplyContext;
use crate::types::{ApplyResult, ResourceState};
use anyhow::Result;
use std::fmt;

/// Core trait for declarative resources
///
/// Every resource in the system implements this trait, which provides:
/// - Identity (id, description, type)
/// - State detection (current vs desired)
/// - State convergence (apply)
///
/// State detection takes `&mut self` so a resource can memoize what it
/// observed and invalidate it after a mutation.
///
/// # Example
///
/// ```ignore
/// use declarative::{Resource, ResourceState, ApplyResult, ApplyContext};
///
/// #[derive(Debug)]
/// struct FileResource {
///     path: String,
///     content: String,
/// }
///
/// impl Resource for FileResource {
///     fn id(&self) -> String {
///         self.path.clone()
///     }
///
///     fn description(&self) -> String {
///         format!("Ensure file exists at {}", self.path)
///     }
///
///     fn resource_type(&self) -> &'static str {
///         "file"
///     }
///
///     fn current_state(&mut self) -> Result<ResourceState> {
///         if std::path::Path::new(&self.path).exists() {
///             Ok(ResourceState::Present { details: None })
///         } else {
///             Ok(ResourceState::Absent)
///         }
///     }
///
///     fn desired_state(&self) -> ResourceState {
///         ResourceState::Present { details: None }
///     }
///
///     fn apply(&mut self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
///         std::fs::write(&self.path, &self.content)?;
///         ctx.record(&format!("wrote {}", self.path), "");
///         Ok(ApplyResult::Created)
///     }
/// }
/// ```
pub trait Resource: fmt::Debug {
    /// Unique identifier for this resource
    ///
    /// Examples:
    /// - "calendar" for an app
    /// - "trusted_domains[1]" for an indexed system value
    /// - "richdocuments.wopi_url" for an app setting
    fn id(&self) -> String;

    /// Human-readable description of what this resource does
    fn description(&self) -> String;

    /// Resource type category, e.g. "nextcloud_app"
    fn resource_type(&self) -> &'static str;

    /// Detect the current state of this resource
    fn current_state(&mut self) -> Result<ResourceState>;

    /// Get the desired state for this resource
    fn desired_state(&self) -> ResourceState;

    /// Apply changes to reach the desired state
    ///
    /// Only called outside check mode, once `current_state` differs from
    /// `desired_state`. This method should:
    /// 1. Check if already in desired state (return NoChange)
    /// 2. Make the necessary changes, recording their output in `ctx`
    /// 3. Return the appropriate ApplyResult
    fn apply(&mut self, ctx: &mut ApplyContext) -> Result<ApplyResult>;
}

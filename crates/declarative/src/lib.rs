//! # Declarative
//!
//! A framework for declarative resource management.
//!
//! This crate provides the core abstractions for declaring desired state,
//! detecting current state, and converging systems to match the desired state.
//!
//! ## Core Concepts
//!
//! - **Resource**: Something with state that can be managed (apps, settings)
//! - **ResourceState**: The current or desired state of a resource
//! - **ResourceDiff**: Current vs desired, classified as addition/removal/modification
//! - **reconcile**: Observe, compare, apply only when needed, report
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{ApplyOptions, reconcile};
//!
//! let mut resource = MyResource::new();
//! let outcome = reconcile(&mut resource, ApplyOptions::default())?;
//! println!("changed: {}", outcome.changed);
//! ```

pub mod context;
pub mod diff;
pub mod reconcile;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use context::ApplyContext;
pub use diff::ResourceDiff;
pub use reconcile::{Reconciliation, reconcile};
pub use resource::Resource;
pub use types::{ApplyOptions, ApplyResult, Diagnostics, ResourceState};

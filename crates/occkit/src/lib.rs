//! # occkit
//!
//! Rust library for driving Nextcloud's `occ` administration tool.
//!
//! This crate provides:
//! - A [`Backend`](backend::Backend) trait over the occ subcommands used to
//!   inspect and change apps and configuration
//! - [`OccBackend`](backend::occ::OccBackend), which runs `php occ` inside
//!   the Nextcloud root
//! - Typed observations ([`AppList`], [`ConfigListing`]) parsed from occ's
//!   JSON output
//! - An [`ObservationCache`] so one reconciliation queries occ once
//! - Private temporary import documents for structured values
//!
//! ## Example
//!
//! ```no_run
//! use occkit::backend::{Backend, occ::OccBackend};
//! use occkit::{AppAction, ConfigKey};
//!
//! let occ = OccBackend::new("/var/www/nextcloud");
//!
//! let apps = occ.list_apps().expect("occ app:list failed");
//! if !apps.is_installed("calendar") {
//!     occ.app_action(AppAction::Install, "calendar").expect("install failed");
//! }
//!
//! let url = occ.get_value(&ConfigKey::system("overwrite.cli.url")).unwrap();
//! println!("CLI url: {url}");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod cache;
pub mod error;
pub mod import;
pub mod types;

pub use cache::ObservationCache;
pub use error::{Error, ErrorCategory, Result};
pub use import::{import_document, write_import_file};
pub use types::{
    ActionOutput, AppAction, AppList, AppState, ConfigKey, ConfigListing, Scope, SettingValue,
    json_eq,
};

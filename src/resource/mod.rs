//! Nextcloud resources managed through occ
//!
//! Each resource owns its backend and an observation cache, so the state
//! it reads from occ is queried once per reconciliation and re-queried
//! only after it changed something.

pub mod app;
pub mod config_value;
pub mod setting;

pub use app::NextcloudApp;
pub use config_value::ConfigValue;
pub use setting::NextcloudSetting;

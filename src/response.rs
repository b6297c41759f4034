//! Result objects written back to the caller

use crate::request::{Request, SettingType, State};
use declarative::Reconciliation;
use serde::Serialize;

/// Successful reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleResult {
    pub name: String,
    pub state: State,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub setting_type: Option<SettingType>,
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<DiffPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffPayload {
    pub before: String,
    pub after: String,
}

impl ModuleResult {
    pub fn new(request: &Request, outcome: &Reconciliation, with_diff: bool) -> Self {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

        Self {
            name: request.name().to_string(),
            state: request.state(),
            setting_type: request.setting_type(),
            changed: outcome.changed,
            stdout: non_empty(&outcome.diagnostics.stdout),
            stderr: non_empty(&outcome.diagnostics.stderr),
            diff: with_diff.then(|| DiffPayload {
                before: outcome.diff.before(),
                after: outcome.diff.after(),
            }),
        }
    }
}

/// Terminal failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleFailure {
    pub failed: bool,
    pub name: String,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rc: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

impl ModuleFailure {
    /// Build from an error chain, picking up occ's exit code and streams
    pub fn new(name: &str, err: &anyhow::Error) -> Self {
        let occ = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<occkit::Error>());

        if let Some(e) = occ
            && e.category().may_have_mutated()
        {
            log::warn!("{name} may be partially changed; re-run to converge");
        }

        Self {
            failed: true,
            name: name.to_string(),
            msg: format!("{err:#}"),
            rc: occ.and_then(occkit::Error::exit_code),
            stdout: occ.and_then(occkit::Error::stdout).map(str::to_string),
            stderr: occ.and_then(occkit::Error::stderr).map(str::to_string),
        }
    }
}

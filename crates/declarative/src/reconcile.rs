//! Reconciliation driver - observe, compare, apply or not, report

use crate::context::ApplyContext;
use crate::diff::ResourceDiff;
use crate::resource::Resource;
use crate::types::{ApplyOptions, ApplyResult, Diagnostics};
use anyhow::Result;

/// Outcome of reconciling one resource
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// What apply did
    pub result: ApplyResult,
    /// Whether anything changed (or would change, in check mode)
    pub changed: bool,
    /// Output of the mutating commands that ran
    pub diagnostics: Diagnostics,
    /// State before reconciliation and the state asked for
    pub diff: ResourceDiff,
}

/// Bring a resource to its desired state
///
/// The current state is observed first; an error there aborts before any
/// change is attempted. Resources already in the desired state are not
/// applied at all. In check mode the diff decides `changed` and nothing is
/// applied.
pub fn reconcile(resource: &mut dyn Resource, opts: ApplyOptions) -> Result<Reconciliation> {
    let diff = ResourceDiff::from_resource(resource)?;

    if !diff.has_changes() {
        log::debug!("{} is up to date", diff.description);
        return Ok(Reconciliation {
            result: ApplyResult::NoChange,
            changed: false,
            diagnostics: Diagnostics::default(),
            diff,
        });
    }

    log::info!(
        "{}: {} -> {}",
        diff.description,
        diff.before(),
        diff.after()
    );

    if opts.check_mode {
        return Ok(Reconciliation {
            result: ApplyResult::Skipped {
                reason: "Check mode".to_string(),
            },
            changed: true,
            diagnostics: Diagnostics::default(),
            diff,
        });
    }

    let mut ctx = ApplyContext::new();
    let result = resource.apply(&mut ctx)?;

    Ok(Reconciliation {
        changed: result.is_change(),
        result,
        diagnostics: ctx.into_diagnostics(),
        diff,
    })
}

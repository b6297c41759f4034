//! Running a request end to end and reporting the outcome

pub mod module;

use crate::Context;
use crate::cli::OutputFormat;
use crate::config::OccctlConfig;
use crate::paths;
use crate::request::Request;
use crate::response::{ModuleFailure, ModuleResult};
use crate::ui;
use anyhow::{Context as _, Result};
use declarative::{ApplyOptions, reconcile};
use occkit::backend::Backend;
use occkit::backend::occ::OccBackend;
use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;

/// Converge one request against the real occ and print the result
pub fn run(ctx: &Context, request: &Request) -> ExitCode {
    match converge(ctx, request) {
        Ok(result) => report(ctx, &result),
        Err(err) => fail(ctx, &ModuleFailure::new(request.name(), &err)),
    }
}

fn converge(ctx: &Context, request: &Request) -> Result<ModuleResult> {
    let config = OccctlConfig::load(ctx.config_path.as_deref())?
        .with_overrides(ctx.php.clone(), ctx.occ.clone());
    let root = root_directory(request, &config)?;

    let backend = OccBackend::new(root)
        .with_launcher(config.occ.php(), Some(config.occ.script().to_string()));
    log::debug!("Nextcloud root: {}", backend.root().display());

    reconcile_request(request, backend)
}

/// Request first, then the config file default
fn root_directory(request: &Request, config: &OccctlConfig) -> Result<PathBuf> {
    if let Some(root) = request.root_directory() {
        return Ok(paths::expand(&root.to_string_lossy()));
    }
    config.occ.root_directory().ok_or_else(|| {
        occkit::Error::validation(
            "root_directory is required (or set [occ] root_directory in the config file)",
        )
        .into()
    })
}

/// Build the resource on `backend` and reconcile it
pub fn reconcile_request<B>(request: &Request, backend: B) -> Result<ModuleResult>
where
    B: Backend + fmt::Debug,
{
    let flags = request.host_flags();
    let opts = ApplyOptions {
        check_mode: flags.check_mode,
    };

    let mut resource = request.build(backend)?;
    let outcome = reconcile(resource.as_mut(), opts)
        .with_context(|| format!("Failed to reconcile {}", resource.description()))?;

    Ok(ModuleResult::new(request, &outcome, flags.diff))
}

fn report(ctx: &Context, result: &ModuleResult) -> ExitCode {
    match ctx.format {
        OutputFormat::Text => ui::print_result(result),
        OutputFormat::Json => match serde_json::to_string(result) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                log::error!("Failed to serialize result: {e}");
                return ExitCode::FAILURE;
            }
        },
    }
    ExitCode::SUCCESS
}

/// Print a failure and return the failing exit status
pub fn fail(ctx: &Context, failure: &ModuleFailure) -> ExitCode {
    match ctx.format {
        OutputFormat::Text => ui::print_failure(failure),
        OutputFormat::Json => match serde_json::to_string(failure) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("Failed to serialize failure: {e}"),
        },
    }
    ExitCode::FAILURE
}

//! `occctl module <kind> <params>` - JSON parameters in, one JSON object out

use crate::Context;
use crate::request::{Request, ResourceKind};
use crate::response::ModuleFailure;
use anyhow::{Context as _, Result};
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

pub fn run(ctx: &Context, kind: ResourceKind, source: &str) -> ExitCode {
    let params = match read_params(source) {
        Ok(params) => params,
        Err(err) => return super::fail(ctx, &ModuleFailure::new("", &err)),
    };

    let name = params
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match Request::from_params(kind, params) {
        Ok(request) => super::run(ctx, &request),
        Err(err) => super::fail(ctx, &ModuleFailure::new(&name, &anyhow::Error::new(err))),
    }
}

/// Parameter object from a file, or stdin for `-`
fn read_params(source: &str) -> Result<Value> {
    let content = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Could not read parameters from stdin")?;
        buf
    } else {
        let path = Path::new(source);
        std::fs::read_to_string(path)
            .with_context(|| format!("Could not read parameters: {}", path.display()))?
    };

    parse_params(&content)
}

fn parse_params(content: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(content).context("Parameters are not valid JSON")?;
    if !value.is_object() {
        anyhow::bail!("Parameters must be a JSON object");
    }
    Ok(value)
}

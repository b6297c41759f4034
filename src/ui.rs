use crate::response::{DiffPayload, ModuleFailure, ModuleResult};
use colored::Colorize;

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a change message
pub fn changed(msg: &str) {
    println!("{} {}", "~".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Summary of a reconciliation
pub fn print_result(result: &ModuleResult) {
    let label = match result.setting_type {
        Some(kind) => format!("{} ({kind}, {})", result.name, result.state),
        None => format!("{} ({})", result.name, result.state),
    };

    if result.changed {
        changed(&format!("{label} changed"));
    } else {
        success(&format!("{label} ok"));
    }

    if let Some(diff) = &result.diff {
        print_diff(diff);
    }
    for line in result.stdout.iter().flat_map(|s| s.lines()) {
        dim(line);
    }
    for line in result.stderr.iter().flat_map(|s| s.lines()) {
        dim(line);
    }
}

pub fn print_failure(failure: &ModuleFailure) {
    error(&format!("{}: {}", failure.name, failure.msg));
    if let Some(rc) = failure.rc {
        eprintln!("  {}: {}", "exit code".dimmed(), rc);
    }
    for line in failure.stderr.iter().flat_map(|s| s.lines()) {
        eprintln!("  {}", line.dimmed());
    }
}

/// Line diff of the before/after renderings
fn print_diff(diff: &DiffPayload) {
    if diff.before == diff.after {
        kv("value", &diff.after);
        return;
    }

    for line in diff_lines(&diff.before, &diff.after) {
        match line {
            DiffLine::Removed(text) => println!("    {}", format!("- {text}").red()),
            DiffLine::Added(text) => println!("    {}", format!("+ {text}").green()),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum DiffLine {
    Removed(String),
    Added(String),
}

fn diff_lines(before: &str, after: &str) -> Vec<DiffLine> {
    let diff = similar::TextDiff::from_lines(before, after);
    diff.iter_all_changes()
        .filter_map(|change| {
            let text = change.value().trim_end_matches('\n').to_string();
            match change.tag() {
                similar::ChangeTag::Delete => Some(DiffLine::Removed(text)),
                similar::ChangeTag::Insert => Some(DiffLine::Added(text)),
                similar::ChangeTag::Equal => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_lines_scalar() {
        assert_eq!(
            diff_lines("http", "https"),
            vec![
                DiffLine::Removed("http".to_string()),
                DiffLine::Added("https".to_string())
            ]
        );
    }

    #[test]
    fn test_diff_lines_skips_equal_lines() {
        let before = "{\n  \"host\": \"x\",\n  \"port\": 0\n}";
        let after = "{\n  \"host\": \"x\",\n  \"port\": 6379\n}";
        assert_eq!(
            diff_lines(before, after),
            vec![
                DiffLine::Removed("  \"port\": 0".to_string()),
                DiffLine::Added("  \"port\": 6379".to_string())
            ]
        );
    }
}

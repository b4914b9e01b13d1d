use std::path::PathBuf;

use pongo::CheckResult;

pub(crate) fn run(plugin_dir: PathBuf, format: super::Format) {
    let report = match pongo::validate(&plugin_dir) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("pongo validate: {e}");
            std::process::exit(1);
        }
    };

    match format {
        super::Format::Text => {
            for (category, result) in report.iter() {
                eprintln!("{category}: {}", describe(result));
            }
            let failed = report.failed_categories().len();
            if failed == 0 {
                eprintln!("ok");
            } else {
                let noun = if failed == 1 { "check" } else { "checks" };
                eprintln!("FAIL ({failed} {noun} failed)");
            }
        }
        super::Format::Json => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("pongo validate: {e}");
                std::process::exit(1);
            }
        },
    }

    if !report.is_valid() {
        std::process::exit(1);
    }
}

/// One-line summary of a check: `ok`, or what is missing or deprecated.
fn describe(result: &CheckResult) -> String {
    if result.valid {
        return "ok".to_string();
    }
    let mut parts = Vec::new();
    if let Some(deprecated) = result.deprecated_found.as_ref().filter(|d| !d.is_empty()) {
        parts.push(format!("deprecated {}", deprecated.join(", ")));
    }
    if !result.missing.is_empty() {
        parts.push(format!("missing {}", result.missing.join(", ")));
    }
    parts.join("; ")
}

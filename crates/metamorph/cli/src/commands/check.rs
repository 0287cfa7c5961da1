//! Manifest checking

use crate::error::{CliError, CliResult};
use crate::output::OutputFormat;
use colored::Colorize;
use metamorph_core::{FamilyManifest, ManifestReport, Policy, Registry};
use std::path::Path;
use tracing::info;

/// Load `manifest`, register it into a fresh registry and report every class.
pub fn execute(manifest: &Path, policy: Option<&Path>, format: OutputFormat) -> CliResult<()> {
    let mut families = FamilyManifest::load(manifest)?;
    if let Some(path) = policy {
        let policy = Policy::load(path)?;
        info!(path = %path.display(), strict = policy.strict, "Policy override loaded");
        families.override_policy(&policy);
    }

    let mut registry = Registry::new();
    let report = families.register(&mut registry);

    match format {
        OutputFormat::Text => print_text(&report),
        OutputFormat::Json => print_json(&report)?,
    }

    let rejected = report.rejected().count();
    if rejected > 0 {
        return Err(CliError::Rejected {
            rejected,
            total: report.outcomes.len(),
        });
    }
    Ok(())
}

fn print_text(report: &ManifestReport) {
    let mut family: Option<&str> = None;
    for outcome in &report.outcomes {
        if family != Some(outcome.family.as_str()) {
            println!("{}", outcome.family.bold().cyan());
            family = Some(outcome.family.as_str());
        }
        let role = if outcome.name == outcome.family {
            " (root)".dimmed().to_string()
        } else {
            String::new()
        };
        match &outcome.result {
            Ok(_) => println!("  {} {}{}", "✓".green(), outcome.name, role),
            Err(e) => println!("  {} {}{}: {}", "✗".red(), outcome.name.bold(), role, e),
        }
    }
    println!();
    println!(
        "{} accepted, {} rejected",
        report.accepted().count().to_string().green(),
        report.rejected().count().to_string().red()
    );
}

fn print_json(report: &ManifestReport) -> CliResult<()> {
    let classes: Vec<_> = report
        .outcomes
        .iter()
        .map(|o| {
            serde_json::json!({
                "family": o.family,
                "class": o.name,
                "accepted": o.is_accepted(),
                "error": o.result.as_ref().err().map(|e| e.to_string()),
            })
        })
        .collect();
    let json = serde_json::json!({
        "accepted": report.accepted().count(),
        "rejected": report.rejected().count(),
        "classes": classes,
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

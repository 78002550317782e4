//! Human-readable report summary.

use comfy_table::{Table, presets::UTF8_FULL_CONDENSED};

use sip_model::{FrozenReport, Severity, ValidationOutcome};

/// Print the per-document table and any warnings/errors.
pub fn print_summary(report: &FrozenReport) {
    println!(
        "build {}: {} ({} error(s), {} warning(s))",
        report.state,
        if report.success { "success" } else { "failure" },
        report.error_count(),
        report.warning_count()
    );
    if let Some(output) = &report.output {
        println!("output: {}", output.display());
    }

    if !report.documents.is_empty() {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(["document", "synthesized", "validation"]);
        for status in &report.documents {
            table.add_row([
                status.kind.as_str().to_string(),
                if status.synthesized {
                    "yes".to_string()
                } else {
                    format!("failed: {}", status.detail.as_deref().unwrap_or("unknown"))
                },
                describe_outcome(status.outcome.as_ref()),
            ]);
        }
        println!("{table}");
    }

    let notable: Vec<_> = report
        .entries
        .iter()
        .filter(|entry| entry.severity != Severity::Info)
        .collect();
    if !notable.is_empty() {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(["severity", "stage", "message", "locator"]);
        for entry in notable {
            table.add_row([
                match entry.severity {
                    Severity::Warning => "warning",
                    Severity::Error => "error",
                    Severity::Info => "info",
                }
                .to_string(),
                entry.stage.to_string(),
                entry.message.clone(),
                entry.locator.clone().unwrap_or_else(|| "-".to_string()),
            ]);
        }
        println!("{table}");
    }
}

fn describe_outcome(outcome: Option<&ValidationOutcome>) -> String {
    match outcome {
        None => "-".to_string(),
        Some(ValidationOutcome::Pending) => "pending".to_string(),
        Some(ValidationOutcome::Skipped) => "skipped".to_string(),
        Some(ValidationOutcome::Unvalidated) => "unvalidated".to_string(),
        Some(ValidationOutcome::Valid { schema, fallback }) => {
            if *fallback {
                format!("valid ({schema}, fallback)")
            } else {
                format!("valid ({schema})")
            }
        }
        Some(ValidationOutcome::Invalid {
            schema, violations, ..
        }) => format!("invalid ({} violation(s), {schema})", violations.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_descriptions() {
        assert_eq!(describe_outcome(None), "-");
        assert_eq!(
            describe_outcome(Some(&ValidationOutcome::Valid {
                schema: "dc.xml schema".to_string(),
                fallback: true,
            })),
            "valid (dc.xml schema, fallback)"
        );
        assert_eq!(
            describe_outcome(Some(&ValidationOutcome::Invalid {
                schema: "mets".to_string(),
                fallback: false,
                violations: vec![],
            })),
            "invalid (0 violation(s), mets)"
        );
    }
}

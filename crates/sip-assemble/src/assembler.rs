//! The per-build state machine.
//!
//! `Pending -> Extracting -> Synthesizing -> Validating -> Assembling ->
//! {Completed, Failed}`. Extraction failure and filesystem failure are
//! fatal; per-document failures are recorded and the remaining documents
//! are still attempted, so partial SIPs stay inspectable.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, info_span, warn};

use sip_compose::{Synthesizer, default_synthesizers};
use sip_model::{
    BuildReport, BuildStage, BuildState, DocumentKind, DocumentStatus, FrozenReport,
    GeneratedDocument, ValidationOutcome,
};
use sip_standards::{BuilderConfig, SchemaRegistry};
use sip_validate::{SchemaCache, ValidateError, XmlValidator};

pub struct Assembler {
    registry: SchemaRegistry,
    validator: XmlValidator,
    synthesizers: Vec<Box<dyn Synthesizer + Send + Sync>>,
}

impl Assembler {
    /// Build an assembler from the startup configuration and an injected
    /// schema cache (one per process; tests supply their own).
    pub fn new(config: &BuilderConfig, cache: Arc<SchemaCache>) -> Result<Self, ValidateError> {
        Ok(Self {
            registry: SchemaRegistry::from_config(config),
            validator: XmlValidator::new(cache, config.fetch_timeout)?,
            synthesizers: default_synthesizers(),
        })
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Run one build: one IP in, one SIP directory under `output_root`
    /// out, plus the frozen report for the orchestration layer.
    pub fn build(&self, ip_path: &Path, output_root: &Path) -> FrozenReport {
        let span = info_span!("sip_build", ip = %ip_path.display());
        let _guard = span.enter();

        let mut report = BuildReport::new();

        // Extracting
        report.transition(BuildState::Extracting);
        report.info(
            BuildStage::Extraction,
            format!("reading IP '{}'", ip_path.display()),
        );
        let extraction = match sip_ingest::extract(ip_path) {
            Ok(extraction) => extraction,
            Err(error) => {
                warn!(%error, "extraction failed, aborting build");
                report.error(BuildStage::Extraction, error.to_string());
                report.transition(BuildState::Failed);
                return report.finalize();
            }
        };
        for warning in &extraction.warnings {
            report.warning(BuildStage::Extraction, warning.clone());
        }

        // Synthesizing: every document kind is attempted, failures are
        // per-document.
        report.transition(BuildState::Synthesizing);
        let mut documents: Vec<GeneratedDocument> = Vec::new();
        for synthesizer in &self.synthesizers {
            let kind = synthesizer.kind();
            match synthesizer.synthesize(&extraction.metadata) {
                Ok(Some(document)) => {
                    report.info(BuildStage::Synthesis, format!("synthesized {kind}"));
                    report.record_document(DocumentStatus {
                        kind,
                        synthesized: true,
                        detail: None,
                        outcome: None,
                    });
                    documents.push(document);
                }
                Ok(None) => {
                    report.info(
                        BuildStage::Synthesis,
                        format!("no metadata for {kind}, document omitted"),
                    );
                }
                Err(error) => {
                    warn!(%kind, %error, "document synthesis failed");
                    report.error(
                        BuildStage::Synthesis,
                        format!("synthesis of {kind} failed: {error:#}"),
                    );
                    report.record_document(DocumentStatus {
                        kind,
                        synthesized: false,
                        detail: Some(format!("{error:#}")),
                        outcome: None,
                    });
                }
            }
        }

        // Validating: per document, no short-circuit.
        report.transition(BuildState::Validating);
        for document in &mut documents {
            let kind = document.kind;
            let references = self.registry.resolve(kind);
            let outcome = self.validator.validate(document, references);
            match &outcome {
                ValidationOutcome::Valid { schema, fallback } => {
                    let via = if *fallback { " (fallback)" } else { "" };
                    report.info(
                        BuildStage::Validation,
                        format!("{kind} is valid against schema '{schema}'{via}"),
                    );
                }
                ValidationOutcome::Invalid {
                    schema, violations, ..
                } => {
                    for violation in violations {
                        match &violation.locator {
                            Some(locator) => report.error_at(
                                BuildStage::Validation,
                                violation.message.clone(),
                                locator.clone(),
                            ),
                            None => {
                                report.error(BuildStage::Validation, violation.message.clone());
                            }
                        }
                    }
                    report.error(
                        BuildStage::Validation,
                        format!(
                            "{kind} failed validation against schema '{schema}' ({} violation(s))",
                            violations.len()
                        ),
                    );
                }
                ValidationOutcome::Skipped => {
                    report.info(
                        BuildStage::Validation,
                        format!("validation for {kind} is deactivated, skipped"),
                    );
                }
                ValidationOutcome::Unvalidated => {
                    report.warning(
                        BuildStage::Validation,
                        format!("no schema reference loadable for {kind}, left unvalidated"),
                    );
                }
                ValidationOutcome::Pending => {}
            }
            report.update_document(kind, outcome);
        }

        let failed_mandatory = self.failed_mandatory_kinds(&report);

        // Assembling: write the layout even with failed documents so a
        // partial SIP remains available for diagnosis.
        report.transition(BuildState::Assembling);
        let sip_root = output_root.join(sip_directory_name(ip_path));
        report.set_output(sip_root.clone());
        let layout = crate::layout::plan_layout(&sip_root, ip_path, &extraction.metadata, &documents);
        if let Err(error) = crate::layout::write_layout(&layout, &documents) {
            warn!(%error, "assembly failed, partial layout left in place");
            report.error(BuildStage::Assembly, error.to_string());
            report.transition(BuildState::Failed);
            return report.finalize();
        }
        match crate::layout::write_fixity_manifest(&layout) {
            Ok(_) => {
                report.info(
                    BuildStage::Assembly,
                    format!(
                        "assembled SIP at '{}' ({} file(s))",
                        sip_root.display(),
                        layout.entries.len()
                    ),
                );
            }
            Err(error) => {
                report.error(BuildStage::Assembly, error.to_string());
                report.transition(BuildState::Failed);
                return report.finalize();
            }
        }

        if failed_mandatory.is_empty() {
            report.transition(BuildState::Completed);
        } else {
            let kinds: Vec<&str> = failed_mandatory.iter().map(|k| k.as_str()).collect();
            report.error(
                BuildStage::Assembly,
                format!("mandatory document(s) failed: {}", kinds.join(", ")),
            );
            report.transition(BuildState::Failed);
        }

        let frozen = report.finalize();
        info!(
            success = frozen.success,
            errors = frozen.error_count(),
            warnings = frozen.warning_count(),
            "build finished"
        );
        frozen
    }

    /// Mandatory kinds that were not produced, failed synthesis, or
    /// failed validation.
    fn failed_mandatory_kinds(&self, report: &BuildReport) -> Vec<DocumentKind> {
        DocumentKind::ALL
            .into_iter()
            .filter(|kind| self.registry.is_mandatory(*kind))
            .filter(|kind| {
                let acceptable = report
                    .documents()
                    .iter()
                    .find(|status| status.kind == *kind)
                    .map(|status| {
                        status.synthesized
                            && status
                                .outcome
                                .as_ref()
                                .is_some_and(ValidationOutcome::is_acceptable)
                    })
                    .unwrap_or(false);
                !acceptable
            })
            .collect()
    }
}

/// SIPs are addressed by the IP directory name under the output root.
fn sip_directory_name(ip_path: &Path) -> String {
    ip_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sip".to_string())
}

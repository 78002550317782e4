//! Append-only build report and the build state machine.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{DocumentKind, ValidationOutcome};

/// States a build moves through. Transitions are strictly sequential;
/// `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildState {
    #[default]
    Pending,
    Extracting,
    Synthesizing,
    Validating,
    Assembling,
    Completed,
    Failed,
}

impl BuildState {
    pub fn is_terminal(self) -> bool {
        matches!(self, BuildState::Completed | BuildState::Failed)
    }
}

impl std::fmt::Display for BuildState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BuildState::Pending => "pending",
            BuildState::Extracting => "extracting",
            BuildState::Synthesizing => "synthesizing",
            BuildState::Validating => "validating",
            BuildState::Assembling => "assembling",
            BuildState::Completed => "completed",
            BuildState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Pipeline stage an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildStage {
    Extraction,
    Synthesis,
    Validation,
    Assembly,
}

impl std::fmt::Display for BuildStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BuildStage::Extraction => "extraction",
            BuildStage::Synthesis => "synthesis",
            BuildStage::Validation => "validation",
            BuildStage::Assembly => "assembly",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One typed report entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    pub stage: BuildStage,
    pub severity: Severity,
    pub message: String,
    /// Document-relative locator (element path) where applicable.
    pub locator: Option<String>,
    pub at: DateTime<Utc>,
}

/// Per-document result tracked alongside the entry log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStatus {
    pub kind: DocumentKind,
    pub synthesized: bool,
    /// Failure detail when synthesis did not produce a document.
    pub detail: Option<String>,
    /// Validation outcome once attached; `None` while synthesis failed
    /// or the document was not produced.
    pub outcome: Option<ValidationOutcome>,
}

/// Mutable, append-only report for one build.
///
/// Finalization consumes the report, so it can be frozen exactly once.
#[derive(Debug, Default)]
pub struct BuildReport {
    state: BuildState,
    output: Option<PathBuf>,
    entries: Vec<ReportEntry>,
    documents: Vec<DocumentStatus>,
}

impl BuildReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Move to the next state. Terminal states are sticky: once failed,
    /// a report cannot be revived.
    pub fn transition(&mut self, state: BuildState) {
        if self.state.is_terminal() {
            return;
        }
        self.state = state;
    }

    pub fn set_output(&mut self, path: PathBuf) {
        self.output = Some(path);
    }

    pub fn output(&self) -> Option<&PathBuf> {
        self.output.as_ref()
    }

    pub fn info(&mut self, stage: BuildStage, message: impl Into<String>) {
        self.push(stage, Severity::Info, message.into(), None);
    }

    pub fn warning(&mut self, stage: BuildStage, message: impl Into<String>) {
        self.push(stage, Severity::Warning, message.into(), None);
    }

    pub fn warning_at(
        &mut self,
        stage: BuildStage,
        message: impl Into<String>,
        locator: impl Into<String>,
    ) {
        self.push(stage, Severity::Warning, message.into(), Some(locator.into()));
    }

    pub fn error(&mut self, stage: BuildStage, message: impl Into<String>) {
        self.push(stage, Severity::Error, message.into(), None);
    }

    pub fn error_at(
        &mut self,
        stage: BuildStage,
        message: impl Into<String>,
        locator: impl Into<String>,
    ) {
        self.push(stage, Severity::Error, message.into(), Some(locator.into()));
    }

    fn push(&mut self, stage: BuildStage, severity: Severity, message: String, locator: Option<String>) {
        self.entries.push(ReportEntry {
            stage,
            severity,
            message,
            locator,
            at: Utc::now(),
        });
    }

    pub fn record_document(&mut self, status: DocumentStatus) {
        self.documents.push(status);
    }

    /// Update the recorded status for a document kind (outcome attachment).
    pub fn update_document(&mut self, kind: DocumentKind, outcome: ValidationOutcome) {
        if let Some(status) = self.documents.iter_mut().find(|d| d.kind == kind) {
            status.outcome = Some(outcome);
        }
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn documents(&self) -> &[DocumentStatus] {
        &self.documents
    }

    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.severity == Severity::Warning)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|e| e.severity == Severity::Error)
    }

    /// Freeze the report. The success flag reflects the terminal state
    /// only; warnings never flip it.
    pub fn finalize(self) -> FrozenReport {
        FrozenReport {
            success: self.state == BuildState::Completed,
            state: self.state,
            output: self.output,
            entries: self.entries,
            documents: self.documents,
        }
    }
}

/// Immutable result handed back to the orchestration layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrozenReport {
    pub success: bool,
    pub state: BuildState,
    pub output: Option<PathBuf>,
    pub entries: Vec<ReportEntry>,
    pub documents: Vec<DocumentStatus>,
}

impl FrozenReport {
    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.severity == Severity::Warning)
            .count()
    }
}

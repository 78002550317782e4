//! XSD validation with primary/fallback schema resolution.

use std::sync::Arc;
use std::time::Duration;

use libxml::parser::Parser;
use libxml::schemas::{SchemaParserContext, SchemaValidationContext};
use tracing::{debug, warn};

use sip_model::{GeneratedDocument, SchemaReference, SchemaViolation, ValidationOutcome};

use crate::cache::SchemaCache;
use crate::error::ValidateError;
use crate::fetch::SchemaFetcher;

pub struct XmlValidator {
    cache: Arc<SchemaCache>,
    fetcher: SchemaFetcher,
}

impl XmlValidator {
    pub fn new(cache: Arc<SchemaCache>, fetch_timeout: Duration) -> Result<Self, ValidateError> {
        Ok(Self {
            cache,
            fetcher: SchemaFetcher::new(fetch_timeout)?,
        })
    }

    /// Validate a document against an ordered reference list and attach
    /// the outcome.
    ///
    /// - no references: the kind is deactivated, outcome `Skipped`;
    /// - a reference that fails to *load* (fetch or compile) is skipped
    ///   in favor of the next one;
    /// - the first loadable reference decides `Valid`/`Invalid`;
    /// - if nothing loads the outcome is `Unvalidated`: schema sources
    ///   are often hosted externally and transient fetch failures must
    ///   not fail preservation builds.
    pub fn validate(
        &self,
        document: &mut GeneratedDocument,
        references: &[SchemaReference],
    ) -> ValidationOutcome {
        let outcome = self.resolve_outcome(document, references);
        document.attach_outcome(outcome.clone());
        outcome
    }

    fn resolve_outcome(
        &self,
        document: &GeneratedDocument,
        references: &[SchemaReference],
    ) -> ValidationOutcome {
        if references.is_empty() {
            debug!(kind = %document.kind, "validation skipped: no schema configured");
            return ValidationOutcome::Skipped;
        }

        for reference in references {
            match self.validate_against(document, reference) {
                Ok(violations) if violations.is_empty() => {
                    debug!(kind = %document.kind, schema = %reference.name, "document is schema-valid");
                    return ValidationOutcome::Valid {
                        schema: reference.name.clone(),
                        fallback: reference.fallback,
                    };
                }
                Ok(violations) => {
                    debug!(
                        kind = %document.kind,
                        schema = %reference.name,
                        violations = violations.len(),
                        "document failed schema validation"
                    );
                    return ValidationOutcome::Invalid {
                        schema: reference.name.clone(),
                        fallback: reference.fallback,
                        violations,
                    };
                }
                Err(error) => {
                    warn!(
                        kind = %document.kind,
                        schema = %reference.name,
                        %error,
                        "schema reference failed to load, trying next"
                    );
                }
            }
        }

        warn!(kind = %document.kind, "no schema reference loadable, document left unvalidated");
        ValidationOutcome::Unvalidated
    }

    /// Run one validation. `Err` means the schema could not be loaded;
    /// `Ok` carries all violations found (empty when valid).
    fn validate_against(
        &self,
        document: &GeneratedDocument,
        reference: &SchemaReference,
    ) -> Result<Vec<SchemaViolation>, ValidateError> {
        let source = self
            .cache
            .get_or_load(reference, |r| self.fetcher.fetch(r))?;

        let mut parser_context = SchemaParserContext::from_buffer(&source.bytes);
        let mut schema = SchemaValidationContext::from_parser(&mut parser_context).map_err(
            |errors| ValidateError::Compile {
                name: reference.name.clone(),
                message: join_messages(&errors),
            },
        )?;

        let text = match std::str::from_utf8(&document.bytes) {
            Ok(text) => text,
            Err(error) => {
                return Ok(vec![SchemaViolation {
                    message: format!("document is not valid UTF-8: {error}"),
                    locator: None,
                    line: None,
                }]);
            }
        };
        let parsed = match Parser::default().parse_string(text) {
            Ok(parsed) => parsed,
            Err(error) => {
                return Ok(vec![SchemaViolation {
                    message: format!("malformed XML: {error:?}"),
                    locator: None,
                    line: None,
                }]);
            }
        };

        match schema.validate_document(&parsed) {
            Ok(()) => Ok(Vec::new()),
            Err(errors) => Ok(errors.iter().map(to_violation).collect()),
        }
    }
}

fn to_violation(error: &libxml::error::StructuredError) -> SchemaViolation {
    let message = error
        .message
        .as_deref()
        .unwrap_or("schema violation")
        .trim()
        .to_string();
    SchemaViolation {
        locator: extract_locator(&message),
        line: error.line.and_then(|line| u32::try_from(line).ok()),
        message,
    }
}

fn join_messages(errors: &[libxml::error::StructuredError]) -> String {
    let mut messages: Vec<String> = errors
        .iter()
        .filter_map(|e| e.message.as_deref())
        .map(|m| m.trim().to_string())
        .collect();
    if messages.is_empty() {
        messages.push("unknown schema parser error".to_string());
    }
    messages.join("; ")
}

/// libxml2 violation messages lead with the offending element; use it as
/// the document-relative locator.
fn extract_locator(message: &str) -> Option<String> {
    let rest = message.strip_prefix("Element '")?;
    let end = rest.find('\'')?;
    Some(rest[..end].to_string())
}

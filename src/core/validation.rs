use super::evaluation::{evaluate_input_descriptor, CredentialResults};
use super::presentation_definition::PresentationDefinition;
use super::presentation_submission::{DescriptorMap, PresentationSubmission};

use serde::Serialize;
use serde_json::Value;

/// The terminal verdict of validating a submission or application: one
/// [CredentialResults] per input descriptor, in definition order.
///
/// Immutable once constructed; acceptance and errors are derived on demand
/// from the stored results, so they can never drift from the field-level
/// detail.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ValidationCheck {
    checks: Vec<CredentialResults>,
}

impl ValidationCheck {
    pub fn new(checks: Vec<CredentialResults>) -> Self {
        Self { checks }
    }

    /// Returns whether every input descriptor in scope was satisfied.
    pub fn accepted(&self) -> bool {
        self.checks.iter().all(CredentialResults::is_satisfied)
    }

    /// Returns one structured error per failing input descriptor.
    ///
    /// Field-level detail stays reachable via [ValidationCheck::results];
    /// the error carries only the descriptor id and a rendered message.
    pub fn errors(&self) -> Vec<ValidationError> {
        self.checks
            .iter()
            .filter(|check| !check.is_satisfied())
            .map(|check| ValidationError::new(check.input_descriptor_id()))
            .collect()
    }

    /// Returns the full ordered results, present regardless of acceptance.
    pub fn results(&self) -> &[CredentialResults] {
        &self.checks
    }
}

/// A structured constraint-failure error, one per failing input descriptor.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    input_descriptor_id: String,
    message: String,
}

impl ValidationError {
    fn new(input_descriptor_id: &str) -> Self {
        Self {
            input_descriptor_id: input_descriptor_id.to_string(),
            message: format!(
                "Credential failed to meet criteria specified by input descriptor {input_descriptor_id}"
            ),
        }
    }

    pub fn input_descriptor_id(&self) -> &str {
        &self.input_descriptor_id
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Structural submission errors.
///
/// These are fatal to the whole call and deliberately distinct from
/// constraint failures: a structural error means the submission cannot even
/// be lined up against the definition, so no partial [ValidationCheck] is
/// produced.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    /// The submission answers a different presentation definition.
    #[error("submission definition id `{submitted}` does not match presentation definition `{expected}`")]
    DefinitionIdMismatch { expected: String, submitted: String },

    /// The application answers a different credential manifest.
    #[error("application manifest id `{submitted}` does not match credential manifest `{expected}`")]
    ManifestIdMismatch { expected: String, submitted: String },

    /// The descriptor map carries no entry for a required input descriptor.
    #[error("no descriptor map entry for input descriptor `{0}`")]
    MissingDescriptorMapEntry(String),

    /// A descriptor map entry is present at the wrong position or binds an
    /// id the definition does not declare there. Descriptor map entries
    /// must mirror the definition's input descriptors one-to-one, in
    /// order.
    #[error("descriptor map entry {position} binds `{found}`, expected input descriptor `{expected}`")]
    DescriptorMapMismatch {
        position: usize,
        expected: String,
        found: String,
    },

    /// The descriptor map has more entries than the definition has input
    /// descriptors.
    #[error("descriptor map has {found} entries, definition declares {expected} input descriptors")]
    ExtraDescriptorMapEntries { expected: usize, found: usize },

    /// A descriptor map path did not resolve to a credential object within
    /// the envelope.
    #[error("descriptor map path `{path}` for input descriptor `{id}` does not resolve to a credential")]
    CredentialNotFound { id: String, path: String },

    /// The decoded envelope payload is missing or carries unparseable
    /// exchange metadata.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// No credential manifest is known under the id an application
    /// references.
    #[error("no credential manifest found for id `{0}`")]
    UnknownManifest(String),
}

/// Line a submission up against a definition and evaluate every input
/// descriptor.
///
/// Shared by the verifier-side submission flow and the issuer-side
/// application flow; both produce the same verdict shape.
pub(crate) fn process_submission(
    definition: &PresentationDefinition,
    submission: &PresentationSubmission,
    presentation: &Value,
) -> Result<ValidationCheck, SubmissionError> {
    if submission.definition_id() != definition.id() {
        return Err(SubmissionError::DefinitionIdMismatch {
            expected: definition.id().to_string(),
            submitted: submission.definition_id().to_string(),
        });
    }

    validate_descriptor_map(definition, submission.descriptor_map())?;

    let mut checks = Vec::with_capacity(definition.input_descriptors().len());
    for (input_descriptor, entry) in definition
        .input_descriptors()
        .iter()
        .zip(submission.descriptor_map())
    {
        let credential = entry
            .path()
            .resolve(presentation)
            .filter(|value| value.is_object())
            .ok_or_else(|| SubmissionError::CredentialNotFound {
                id: input_descriptor.id().to_string(),
                path: entry.path().to_string(),
            })?;

        checks.push(evaluate_input_descriptor(input_descriptor, credential));
    }

    Ok(ValidationCheck::new(checks))
}

/// Check the positional correspondence between a definition's input
/// descriptors and a submission's descriptor map: same length, same ids,
/// same order. The correspondence is validated, never trusted.
fn validate_descriptor_map(
    definition: &PresentationDefinition,
    descriptor_map: &[DescriptorMap],
) -> Result<(), SubmissionError> {
    for (position, input_descriptor) in definition.input_descriptors().iter().enumerate() {
        match descriptor_map.get(position) {
            None => {
                return Err(SubmissionError::MissingDescriptorMapEntry(
                    input_descriptor.id().to_string(),
                ))
            }
            Some(entry) if entry.id() != input_descriptor.id() => {
                return Err(SubmissionError::DescriptorMapMismatch {
                    position,
                    expected: input_descriptor.id().to_string(),
                    found: entry.id().to_string(),
                })
            }
            Some(_) => {}
        }
    }

    if descriptor_map.len() > definition.input_descriptors().len() {
        return Err(SubmissionError::ExtraDescriptorMapEntries {
            expected: definition.input_descriptors().len(),
            found: descriptor_map.len(),
        });
    }

    Ok(())
}

use super::credential_format::ClaimFormatDesignation;
use super::json_path::JsonPath;
use super::validation::SubmissionError;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// A DescriptorMapId is a unique identifier for a DescriptorMap.
pub type DescriptorMapId = String;

/// Presentation Submissions are objects embedded within a Verifiable
/// Presentation that express how the submitted items satisfy the
/// requirements of a [PresentationDefinition](super::presentation_definition::PresentationDefinition).
///
/// Embedded presentation submission objects are located within the envelope
/// payload as the value of a `presentation_submission` property.
///
/// See: <https://identity.foundation/presentation-exchange/spec/v2.0.0/#presentation-submission>
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresentationSubmission {
    id: uuid::Uuid,
    definition_id: String,
    descriptor_map: Vec<DescriptorMap>,
}

impl PresentationSubmission {
    /// The presentation submission MUST contain an id (a UUID), the id of
    /// the [PresentationDefinition](super::presentation_definition::PresentationDefinition)
    /// it answers, and one [DescriptorMap] entry per input descriptor of
    /// that definition, in the same order.
    pub fn new(
        id: uuid::Uuid,
        definition_id: String,
        descriptor_map: Vec<DescriptorMap>,
    ) -> Self {
        Self {
            id,
            definition_id,
            descriptor_map,
        }
    }

    /// Return the id of the presentation submission.
    pub fn id(&self) -> &uuid::Uuid {
        &self.id
    }

    /// Return the definition id of the presentation submission.
    pub fn definition_id(&self) -> &str {
        &self.definition_id
    }

    /// Return the descriptor map of the presentation submission.
    pub fn descriptor_map(&self) -> &[DescriptorMap] {
        &self.descriptor_map
    }
}

impl TryFrom<Json> for PresentationSubmission {
    type Error = anyhow::Error;

    fn try_from(raw: Json) -> Result<Self, Self::Error> {
        serde_json::from_value(raw).map_err(Into::into)
    }
}

impl From<PresentationSubmission> for Json {
    fn from(value: PresentationSubmission) -> Self {
        serde_json::to_value(value)
            // SAFETY: by definition, a presentation submission has a valid
            //         JSON representation.
            .unwrap()
    }
}

/// A descriptor map entry binds one input descriptor id to the location and
/// format of the submitted item claiming to satisfy it.
///
/// See: <https://identity.foundation/presentation-exchange/spec/v2.0.0/#presentation-submission>
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DescriptorMap {
    id: DescriptorMapId,
    format: ClaimFormatDesignation,
    path: JsonPath,
}

impl DescriptorMap {
    /// The `id` MUST match the id of an input descriptor in the definition
    /// this submission is related to.
    ///
    /// The `format` names the claim encoding of the submitted item; it is a
    /// fixed tag, never inferred from content.
    ///
    /// The `path` locates the submitted item within the envelope the
    /// submission is embedded in, e.g. `$.verifiableCredential[0]`.
    pub fn new(
        id: impl Into<DescriptorMapId>,
        format: impl Into<ClaimFormatDesignation>,
        path: JsonPath,
    ) -> Self {
        Self {
            id: id.into(),
            format: format.into(),
            path,
        }
    }

    /// Return the input descriptor id the entry binds.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Return the claim format of the submitted item.
    pub fn format(&self) -> &ClaimFormatDesignation {
        &self.format
    }

    /// Return the path into the envelope where the submitted item lives.
    pub fn path(&self) -> &JsonPath {
        &self.path
    }
}

/// A decoded Verifiable Presentation envelope carrying a presentation
/// submission.
///
/// The envelope codec collaborator produces the decoded document tree; this
/// type extracts the embedded submission metadata while keeping the whole
/// payload available, since descriptor map paths resolve against the
/// envelope root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationSubmission {
    presentation_submission: PresentationSubmission,
    presentation: Json,
}

impl VerificationSubmission {
    /// Build a submission view from an already-decoded envelope payload.
    ///
    /// Fails with a structural error when the payload carries no parseable
    /// `presentation_submission` property.
    pub fn from_envelope(presentation: Json) -> Result<Self, SubmissionError> {
        let raw = presentation.get("presentation_submission").ok_or_else(|| {
            SubmissionError::MalformedEnvelope(
                "missing `presentation_submission` property".to_string(),
            )
        })?;

        let presentation_submission =
            serde_json::from_value(raw.clone()).map_err(|e| {
                SubmissionError::MalformedEnvelope(format!(
                    "invalid `presentation_submission` property: {e}"
                ))
            })?;

        Ok(Self {
            presentation_submission,
            presentation,
        })
    }

    /// Return the embedded presentation submission metadata.
    pub fn presentation_submission(&self) -> &PresentationSubmission {
        &self.presentation_submission
    }

    /// Return the decoded presentation envelope payload.
    pub fn presentation(&self) -> &Json {
        &self.presentation
    }
}

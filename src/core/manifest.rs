use super::credential_format::ClaimFormatDesignation;
use super::presentation_definition::PresentationDefinition;
use super::presentation_submission::PresentationSubmission;
use super::validation::SubmissionError;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// A Credential Manifest is the issuer-side analogue of a presentation
/// definition: it describes the credentials an issuer offers and, through
/// its embedded [PresentationDefinition], what a holder must present to
/// apply for them.
///
/// See: <https://identity.foundation/credential-manifest/>
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialManifest {
    id: String,
    issuer: CredentialIssuer,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    output_descriptors: Vec<OutputDescriptor>,
    presentation_definition: PresentationDefinition,
}

impl CredentialManifest {
    pub fn new(
        id: String,
        issuer: CredentialIssuer,
        presentation_definition: PresentationDefinition,
    ) -> Self {
        Self {
            id,
            issuer,
            output_descriptors: Vec::new(),
            presentation_definition,
        }
    }

    /// Return the id of the credential manifest.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Return the issuer of the credential manifest.
    pub fn issuer(&self) -> &CredentialIssuer {
        &self.issuer
    }

    /// Add an output descriptor describing a credential this manifest
    /// offers.
    pub fn add_output_descriptor(mut self, output_descriptor: OutputDescriptor) -> Self {
        self.output_descriptors.push(output_descriptor);
        self
    }

    /// Return the output descriptors of the credential manifest.
    pub fn output_descriptors(&self) -> &[OutputDescriptor] {
        &self.output_descriptors
    }

    /// Return the presentation definition an application against this
    /// manifest is validated against.
    pub fn presentation_definition(&self) -> &PresentationDefinition {
        &self.presentation_definition
    }
}

/// The entity issuing credentials described by a manifest.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialIssuer {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl CredentialIssuer {
    pub fn new(id: String) -> Self {
        Self { id, name: None }
    }

    /// Return the issuer identifier, typically a DID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Set the human-readable name of the issuer.
    pub fn set_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    /// Return the human-readable name of the issuer.
    pub fn name(&self) -> Option<&String> {
        self.name.as_ref()
    }
}

/// Describes one credential a manifest offers as the outcome of a
/// successful application.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputDescriptor {
    id: String,
    schema: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl OutputDescriptor {
    pub fn new(id: String, schema: String) -> Self {
        Self {
            id,
            schema,
            name: None,
            description: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn set_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    pub fn name(&self) -> Option<&String> {
        self.name.as_ref()
    }

    pub fn set_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn description(&self) -> Option<&String> {
        self.description.as_ref()
    }
}

/// Metadata identifying which manifest a credential application answers and
/// in which format the applicant expects fulfillment.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplicationDescriptor {
    id: uuid::Uuid,
    manifest_id: String,
    format: ClaimFormatDesignation,
}

impl ApplicationDescriptor {
    pub fn new(id: uuid::Uuid, manifest_id: String, format: ClaimFormatDesignation) -> Self {
        Self {
            id,
            manifest_id,
            format,
        }
    }

    pub fn id(&self) -> &uuid::Uuid {
        &self.id
    }

    pub fn manifest_id(&self) -> &str {
        &self.manifest_id
    }

    pub fn format(&self) -> &ClaimFormatDesignation {
        &self.format
    }
}

/// A decoded credential application envelope: the issuer-side analogue of
/// [VerificationSubmission](super::presentation_submission::VerificationSubmission).
///
/// Carries the application metadata referencing a [CredentialManifest], the
/// embedded presentation submission, and the full envelope payload the
/// descriptor map paths resolve against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CredentialApplication {
    credential_application: ApplicationDescriptor,
    presentation_submission: PresentationSubmission,
    presentation: Json,
}

impl CredentialApplication {
    /// Build an application view from an already-decoded envelope payload.
    ///
    /// Fails with a structural error when the payload carries no parseable
    /// `credential_application` or `presentation_submission` property.
    pub fn from_envelope(presentation: Json) -> Result<Self, SubmissionError> {
        let credential_application = Self::required_property(&presentation, "credential_application")?;
        let presentation_submission = Self::required_property(&presentation, "presentation_submission")?;

        Ok(Self {
            credential_application,
            presentation_submission,
            presentation,
        })
    }

    fn required_property<T: serde::de::DeserializeOwned>(
        presentation: &Json,
        property: &str,
    ) -> Result<T, SubmissionError> {
        let raw = presentation.get(property).ok_or_else(|| {
            SubmissionError::MalformedEnvelope(format!("missing `{property}` property"))
        })?;

        serde_json::from_value(raw.clone()).map_err(|e| {
            SubmissionError::MalformedEnvelope(format!("invalid `{property}` property: {e}"))
        })
    }

    /// Return the application metadata.
    pub fn credential_application(&self) -> &ApplicationDescriptor {
        &self.credential_application
    }

    /// Return the id of the manifest this application answers.
    pub fn manifest_id(&self) -> &str {
        self.credential_application.manifest_id()
    }

    /// Return the embedded presentation submission metadata.
    pub fn presentation_submission(&self) -> &PresentationSubmission {
        &self.presentation_submission
    }

    /// Return the decoded application envelope payload.
    pub fn presentation(&self) -> &Json {
        &self.presentation
    }
}

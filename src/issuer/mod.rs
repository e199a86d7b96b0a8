//! Issuer-side processing of credential applications.

use serde::{Deserialize, Serialize};

use crate::core::manifest::{CredentialApplication, CredentialManifest};
use crate::core::validation::{process_submission, SubmissionError, ValidationCheck};
use crate::external::ManifestStore;

/// Validate a decoded credential application against the manifest it
/// references.
///
/// Applications are validated exactly like verification submissions, over
/// the manifest's presentation definition instead of a standalone one; the
/// verdict shape is identical. A `manifest_id` that does not match the
/// supplied manifest is a structural error.
pub fn process_credential_application(
    application: &CredentialApplication,
    manifest: &CredentialManifest,
) -> Result<ValidationCheck, SubmissionError> {
    if application.manifest_id() != manifest.id() {
        return Err(SubmissionError::ManifestIdMismatch {
            expected: manifest.id().to_string(),
            submitted: application.manifest_id().to_string(),
        });
    }

    process_submission(
        manifest.presentation_definition(),
        application.presentation_submission(),
        application.presentation(),
    )
}

/// Resolve the manifest an application references and validate the
/// application against it.
///
/// An unknown manifest id is a structural error; the store lookup is the
/// only collaborator involved and completes before the engine runs.
pub async fn validate_credential_submission(
    application: &CredentialApplication,
    store: &impl ManifestStore,
) -> Result<ValidationCheck, SubmissionError> {
    let manifest = store
        .find_manifest_by_id(application.manifest_id())
        .await
        .ok_or_else(|| SubmissionError::UnknownManifest(application.manifest_id().to_string()))?;

    process_credential_application(application, &manifest)
}

/// A reference to the revocation status slot assigned to a newly issued
/// credential, pointing into an externally maintained status list
/// credential.
///
/// Produced by a [RevocationStatusSource](crate::external::RevocationStatusSource)
/// during issuance and embedded verbatim into the fulfilled credential; the
/// validation engine never interprets it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusListReference {
    pub id: String,
    #[serde(rename = "type")]
    pub status_type: String,
    pub status_list_index: String,
    pub status_list_credential: String,
}

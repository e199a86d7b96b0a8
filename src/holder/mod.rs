//! Holder-side construction of submissions and applications.
//!
//! The builder produces the descriptor map binding each input descriptor to
//! the credential slot claimed to satisfy it, then assembles the
//! presentation payload and hands it to the external codec for signing.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::core::credential_format::ClaimFormatDesignation;
use crate::core::json_path::JsonPath;
use crate::core::manifest::{ApplicationDescriptor, CredentialManifest};
use crate::core::presentation_definition::PresentationDefinition;
use crate::core::presentation_submission::{DescriptorMap, PresentationSubmission};
use crate::external::EnvelopeCodec;

const VERIFIABLE_PRESENTATION_TYPE: &str = "VerifiablePresentation";
const PRESENTATION_SUBMISSION_TYPE: &str = "PresentationSubmission";
const CREDENTIAL_APPLICATION_TYPE: &str = "CredentialApplication";
const CREDENTIALS_V1_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

/// The fixed claim format of submitted credentials. The format tag is a
/// constant per encoding in use, never inferred from content.
const SUBMISSION_CLAIM_FORMAT: ClaimFormatDesignation = ClaimFormatDesignation::JwtVc;

/// Build the presentation submission metadata answering a definition.
///
/// Generates a fresh random submission id and one descriptor map entry per
/// input descriptor, in the definition's declared order. With a single
/// credential every entry points at the first credential slot; with several,
/// each descriptor maps to the slot matching its declared position. The
/// receiving validation engine relies on this positional correspondence.
pub fn build_presentation_submission(
    definition: &PresentationDefinition,
    credential_count: usize,
) -> PresentationSubmission {
    let descriptor_map = definition
        .input_descriptors()
        .iter()
        .enumerate()
        .map(|(position, input_descriptor)| {
            let slot = if credential_count > 1 { position } else { 0 };
            DescriptorMap::new(
                input_descriptor.id(),
                SUBMISSION_CLAIM_FORMAT,
                JsonPath::root().key("verifiableCredential").index(slot),
            )
        })
        .collect();

    PresentationSubmission::new(Uuid::new_v4(), definition.id().to_string(), descriptor_map)
}

/// Assemble and sign a verification submission envelope answering a
/// presentation definition.
pub async fn create_verification_submission<C: EnvelopeCodec>(
    codec: &C,
    holder_did: &str,
    definition: &PresentationDefinition,
    credentials: &[Value],
) -> Result<String> {
    let submission = build_presentation_submission(definition, credentials.len());

    let mut payload = presentation_payload(holder_did, credentials, PRESENTATION_SUBMISSION_TYPE);
    insert_metadata(&mut payload, "presentation_submission", &submission)?;

    codec
        .encode(
            &payload,
            &[VERIFIABLE_PRESENTATION_TYPE, PRESENTATION_SUBMISSION_TYPE],
        )
        .await
        .context("failed to encode verification submission envelope")
}

/// Assemble and sign a credential application envelope answering a
/// credential manifest.
pub async fn create_credential_application<C: EnvelopeCodec>(
    codec: &C,
    holder_did: &str,
    manifest: &CredentialManifest,
    credentials: &[Value],
) -> Result<String> {
    let submission =
        build_presentation_submission(manifest.presentation_definition(), credentials.len());
    let application = ApplicationDescriptor::new(
        Uuid::new_v4(),
        manifest.id().to_string(),
        SUBMISSION_CLAIM_FORMAT,
    );

    let mut payload = presentation_payload(holder_did, credentials, CREDENTIAL_APPLICATION_TYPE);
    insert_metadata(&mut payload, "credential_application", &application)?;
    insert_metadata(&mut payload, "presentation_submission", &submission)?;

    codec
        .encode(
            &payload,
            &[VERIFIABLE_PRESENTATION_TYPE, CREDENTIAL_APPLICATION_TYPE],
        )
        .await
        .context("failed to encode credential application envelope")
}

fn presentation_payload(holder_did: &str, credentials: &[Value], exchange_type: &str) -> Value {
    json!({
        "@context": [CREDENTIALS_V1_CONTEXT],
        "type": [VERIFIABLE_PRESENTATION_TYPE, exchange_type],
        "holder": holder_did,
        "verifiableCredential": credentials,
    })
}

fn insert_metadata(payload: &mut Value, property: &str, metadata: &impl serde::Serialize) -> Result<()> {
    let value = serde_json::to_value(metadata)
        .with_context(|| format!("failed to serialize `{property}` metadata"))?;
    if let Some(obj) = payload.as_object_mut() {
        obj.insert(property.to_string(), value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input_descriptor::{Constraints, ConstraintsField, InputDescriptor};

    fn descriptor(id: &str) -> InputDescriptor {
        InputDescriptor::new(
            id.to_string(),
            Constraints::new()
                .add_constraint(ConstraintsField::new("$.issuer.id".parse().unwrap())),
        )
    }

    fn definition() -> PresentationDefinition {
        PresentationDefinition::new("def".to_string(), descriptor("a"))
            .add_input_descriptor(descriptor("b"))
            .and_then(|definition| definition.add_input_descriptor(descriptor("c")))
            .unwrap()
    }

    #[test]
    fn one_entry_per_input_descriptor_in_order() {
        let definition = definition();
        let submission = build_presentation_submission(&definition, 1);

        assert_eq!(submission.definition_id(), "def");
        assert_eq!(submission.descriptor_map().len(), 3);
        let ids: Vec<&str> = submission
            .descriptor_map()
            .iter()
            .map(DescriptorMap::id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn single_credential_maps_every_descriptor_to_slot_zero() {
        let submission = build_presentation_submission(&definition(), 1);
        for entry in submission.descriptor_map() {
            assert_eq!(entry.path().as_str(), "$.verifiableCredential[0]");
            assert_eq!(entry.format(), &ClaimFormatDesignation::JwtVc);
        }
    }

    #[test]
    fn multiple_credentials_map_positionally() {
        let submission = build_presentation_submission(&definition(), 3);
        let paths: Vec<&str> = submission
            .descriptor_map()
            .iter()
            .map(|entry| entry.path().as_str())
            .collect();
        assert_eq!(
            paths,
            vec![
                "$.verifiableCredential[0]",
                "$.verifiableCredential[1]",
                "$.verifiableCredential[2]"
            ]
        );
    }

    #[test]
    fn submission_ids_are_fresh() {
        let definition = definition();
        let first = build_presentation_submission(&definition, 1);
        let second = build_presentation_submission(&definition, 1);
        assert_ne!(first.id(), second.id());
    }
}

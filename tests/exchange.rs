use std::collections::HashMap;

use async_trait::async_trait;
use base64::prelude::{Engine as _, BASE64_URL_SAFE_NO_PAD};
use serde_json::{json, Value};

use presentation_exchange::core::input_descriptor::{
    Constraints, ConstraintsField, InputDescriptor,
};
use presentation_exchange::core::manifest::{
    CredentialApplication, CredentialIssuer, CredentialManifest,
};
use presentation_exchange::core::presentation_definition::PresentationDefinition;
use presentation_exchange::core::presentation_submission::VerificationSubmission;
use presentation_exchange::external::{CodecError, EnvelopeCodec, ManifestStore};
use presentation_exchange::holder::{create_credential_application, create_verification_submission};
use presentation_exchange::issuer::validate_credential_submission;
use presentation_exchange::verifier::process_verification_submission;
use presentation_exchange::SubmissionError;

/// Test codec producing unsecured envelopes: the payload is carried
/// base64url-encoded, without a proof. Real deployments plug in a signing
/// codec; the engine never looks at the envelope itself.
struct UnsecuredEnvelopeCodec;

#[async_trait]
impl EnvelopeCodec for UnsecuredEnvelopeCodec {
    async fn decode(&self, envelope: &str) -> Result<Value, CodecError> {
        let bytes = BASE64_URL_SAFE_NO_PAD
            .decode(envelope)
            .map_err(|e| CodecError::Malformed(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| CodecError::Malformed(e.to_string()))
    }

    async fn encode(&self, payload: &Value, _envelope_types: &[&str]) -> Result<String, CodecError> {
        let bytes = serde_json::to_vec(payload).map_err(|e| CodecError::Signing(e.to_string()))?;
        Ok(BASE64_URL_SAFE_NO_PAD.encode(bytes))
    }
}

struct InMemoryManifestStore {
    manifests: HashMap<String, CredentialManifest>,
}

impl InMemoryManifestStore {
    fn with(manifest: CredentialManifest) -> Self {
        let mut manifests = HashMap::new();
        manifests.insert(manifest.id().to_string(), manifest);
        Self { manifests }
    }
}

#[async_trait]
impl ManifestStore for InMemoryManifestStore {
    async fn find_manifest_by_id(&self, id: &str) -> Option<CredentialManifest> {
        self.manifests.get(id).cloned()
    }
}

const HOLDER_DID: &str = "did:key:z6MkHolder";

fn kyc_definition() -> PresentationDefinition {
    PresentationDefinition::new(
        "KYCAMLPresentationDefinition".to_string(),
        InputDescriptor::new(
            "kycaml_input".to_string(),
            Constraints::new()
                .add_constraint(ConstraintsField::new("$.issuer.id".parse().unwrap())),
        ),
    )
}

fn kyc_credential() -> Value {
    json!({
        "id": "urn:uuid:8f3a9b2e-1d44-4c5e-9f2a-0b7c6d5e4f3a",
        "type": ["VerifiableCredential", "KYCAMLAttestation"],
        "issuer": {"id": "did:key:z6MkAttestor"},
        "credentialSubject": {
            "id": HOLDER_DID,
            "KYCAMLAttestation": {"process": "https://verite.id/definitions/processes/kycaml/0.0.1/usa"}
        }
    })
}

fn kyc_manifest() -> CredentialManifest {
    CredentialManifest::new(
        "KYCAMLAttestation".to_string(),
        CredentialIssuer::new("did:key:z6MkAttestor".to_string()),
        PresentationDefinition::new(
            "KYCAMLApplicationDefinition".to_string(),
            InputDescriptor::new(
                "proof_of_control".to_string(),
                Constraints::new().add_constraint(ConstraintsField::new(
                    "$.credentialSubject.id".parse().unwrap(),
                )),
            ),
        ),
    )
}

#[tokio::test]
async fn validates_a_verification_submission() {
    let codec = UnsecuredEnvelopeCodec;
    let definition = kyc_definition();

    let envelope =
        create_verification_submission(&codec, HOLDER_DID, &definition, &[kyc_credential()])
            .await
            .unwrap();

    let payload = codec.decode(&envelope).await.unwrap();
    let submission = VerificationSubmission::from_envelope(payload).unwrap();

    let check = process_verification_submission(&submission, &definition).unwrap();
    assert!(check.accepted());
    assert_eq!(check.errors(), vec![]);

    let results = check.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].input_descriptor_id(), "kycaml_input");
    assert_eq!(results[0].results().len(), 1);
    let success = results[0].results()[0].matched_path().unwrap();
    assert_eq!(success.path(), "$.issuer.id");
    assert_eq!(success.value(), Some(&json!("did:key:z6MkAttestor")));
}

#[tokio::test]
async fn validation_is_idempotent() {
    let codec = UnsecuredEnvelopeCodec;
    let definition = kyc_definition();

    let envelope =
        create_verification_submission(&codec, HOLDER_DID, &definition, &[kyc_credential()])
            .await
            .unwrap();
    let payload = codec.decode(&envelope).await.unwrap();
    let submission = VerificationSubmission::from_envelope(payload).unwrap();

    let first = process_verification_submission(&submission, &definition).unwrap();
    let second = process_verification_submission(&submission, &definition).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_value(first.results()).unwrap(),
        serde_json::to_value(second.results()).unwrap()
    );
}

#[tokio::test]
async fn missing_descriptor_map_coverage_is_structural() {
    let codec = UnsecuredEnvelopeCodec;
    let definition = kyc_definition();

    // A two-descriptor definition answered with a single-entry descriptor
    // map: the submission was built for a smaller definition.
    let wider_definition = kyc_definition()
        .add_input_descriptor(InputDescriptor::new(
            "residence_input".to_string(),
            Constraints::new().add_constraint(ConstraintsField::new(
                "$.credentialSubject.country".parse().unwrap(),
            )),
        ))
        .unwrap();

    let envelope =
        create_verification_submission(&codec, HOLDER_DID, &definition, &[kyc_credential()])
            .await
            .unwrap();
    let payload = codec.decode(&envelope).await.unwrap();
    let submission = VerificationSubmission::from_envelope(payload).unwrap();

    let err = process_verification_submission(&submission, &wider_definition).unwrap_err();
    assert!(matches!(
        err,
        SubmissionError::MissingDescriptorMapEntry(id) if id == "residence_input"
    ));
}

#[tokio::test]
async fn rejects_a_submission_that_fails_its_filter() {
    let codec = UnsecuredEnvelopeCodec;

    let definition = PresentationDefinition::new(
        "KYCAMLPresentationDefinition".to_string(),
        InputDescriptor::new(
            "kycaml_input".to_string(),
            Constraints::new().add_constraint(
                ConstraintsField::new("$.issuer.id".parse().unwrap())
                    .set_filter(json!({"type": "string", "pattern": "^did:web:"})),
            ),
        ),
    );

    let envelope =
        create_verification_submission(&codec, HOLDER_DID, &definition, &[kyc_credential()])
            .await
            .unwrap();
    let payload = codec.decode(&envelope).await.unwrap();
    let submission = VerificationSubmission::from_envelope(payload).unwrap();

    let check = process_verification_submission(&submission, &definition).unwrap();
    assert!(!check.accepted());

    let errors = check.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message(),
        "Credential failed to meet criteria specified by input descriptor kycaml_input"
    );

    // The filter-rejected value stays reachable for rendering.
    let failures = check.results()[0].results()[0].failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].value(), Some(&json!("did:key:z6MkAttestor")));
}

#[tokio::test]
async fn validates_a_credential_application() {
    let codec = UnsecuredEnvelopeCodec;
    let manifest = kyc_manifest();
    let store = InMemoryManifestStore::with(manifest.clone());

    // Applying for a credential: the holder proves control of their DID by
    // presenting a self-attested credential subject.
    let proof_of_control = json!({
        "type": ["VerifiableCredential"],
        "credentialSubject": {"id": HOLDER_DID}
    });

    let envelope =
        create_credential_application(&codec, HOLDER_DID, &manifest, &[proof_of_control])
            .await
            .unwrap();
    let payload = codec.decode(&envelope).await.unwrap();
    let application = CredentialApplication::from_envelope(payload).unwrap();

    let check = validate_credential_submission(&application, &store)
        .await
        .unwrap();
    assert!(check.accepted());
    assert_eq!(check.results().len(), 1);
    assert_eq!(check.results()[0].input_descriptor_id(), "proof_of_control");
}

#[tokio::test]
async fn unknown_manifest_is_structural() {
    let codec = UnsecuredEnvelopeCodec;
    let manifest = kyc_manifest();
    let store = InMemoryManifestStore {
        manifests: HashMap::new(),
    };

    let envelope = create_credential_application(&codec, HOLDER_DID, &manifest, &[])
        .await
        .unwrap();
    let payload = codec.decode(&envelope).await.unwrap();
    let application = CredentialApplication::from_envelope(payload).unwrap();

    let err = validate_credential_submission(&application, &store)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SubmissionError::UnknownManifest(id) if id == "KYCAMLAttestation"
    ));
}

#[tokio::test]
async fn codec_errors_are_not_constraint_failures() {
    let codec = UnsecuredEnvelopeCodec;
    let err = codec.decode("not-base64!").await.unwrap_err();
    assert!(matches!(err, CodecError::Malformed(_)));
}

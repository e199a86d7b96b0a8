//! Collaborator interfaces consumed at the boundary of the validation
//! engine.
//!
//! The engine itself is pure and synchronous; everything that signs,
//! verifies, resolves or looks things up lives behind these traits and must
//! complete before the engine runs. Implementations are expected to impose
//! their own timeouts and retries; the engine never retries.

use async_trait::async_trait;
use serde_json::Value;

use crate::core::manifest::CredentialManifest;
use crate::core::presentation_definition::PresentationDefinition;
use crate::issuer::StatusListReference;

/// Error raised by an [EnvelopeCodec].
///
/// Codec errors are always propagated as-is: the engine never reinterprets
/// a cryptographic or encoding failure as a constraint-evaluation failure.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The envelope could not be parsed at all.
    #[error("malformed envelope: {0}")]
    Malformed(String),

    /// The envelope parsed but its proof could not be verified.
    #[error("envelope verification failed: {0}")]
    Unverifiable(String),

    /// The payload could not be signed into an envelope.
    #[error("envelope signing failed: {0}")]
    Signing(String),
}

/// Encodes and decodes signed credential envelopes (e.g. JWT-secured
/// Verifiable Presentations).
///
/// The codec owns its signing key and DID material; the engine only ever
/// sees the decoded document tree.
#[async_trait]
pub trait EnvelopeCodec {
    /// Decode and verify a signed envelope into its payload document.
    async fn decode(&self, envelope: &str) -> Result<Value, CodecError>;

    /// Sign a payload document into an envelope, tagging it with the given
    /// envelope types (e.g. `["VerifiablePresentation",
    /// "PresentationSubmission"]`).
    async fn encode(&self, payload: &Value, envelope_types: &[&str]) -> Result<String, CodecError>;
}

/// Looks up credential manifests by id. Absence is a normal outcome.
#[async_trait]
pub trait ManifestStore {
    async fn find_manifest_by_id(&self, id: &str) -> Option<CredentialManifest>;
}

/// Looks up presentation definitions by id. Absence is a normal outcome.
#[async_trait]
pub trait DefinitionStore {
    async fn find_definition_by_id(&self, id: &str) -> Option<PresentationDefinition>;
}

/// Provides the revocation status slot to embed in newly issued
/// credentials. Consumed by issuance flows, never by the validation engine.
#[async_trait]
pub trait RevocationStatusSource {
    async fn current_revocation_status(&self) -> StatusListReference;
}

//! This library provides a validation engine for [DIF Presentation
//! Exchange].
//!
//! [DIF Presentation Exchange]: <https://identity.foundation/presentation-exchange/spec/v2.0.0/>
//!
//! A verifier declares, in a machine-readable
//! [`PresentationDefinition`], which credentials and which of their fields
//! it requires. A holder answers with a Verifiable Presentation wrapping
//! one or more credentials plus a [`PresentationSubmission`]: a descriptor
//! map claiming which submitted item satisfies which input descriptor. The
//! engine lines the two up and deterministically evaluates every declared
//! field constraint against the submitted data, producing a structured,
//! explainable [`ValidationCheck`] verdict.
//!
//! # Verifier usage
//!
//! ```
//! use presentation_exchange::core::input_descriptor::{
//!     Constraints, ConstraintsField, InputDescriptor,
//! };
//! use presentation_exchange::core::presentation_definition::PresentationDefinition;
//! use presentation_exchange::core::presentation_submission::VerificationSubmission;
//! use presentation_exchange::verifier::process_verification_submission;
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let definition = PresentationDefinition::new(
//!     "KYCAMLPresentationDefinition".to_string(),
//!     InputDescriptor::new(
//!         "kycaml_input".to_string(),
//!         Constraints::new()
//!             .add_constraint(ConstraintsField::new("$.issuer.id".parse()?)),
//!     ),
//! );
//!
//! // The envelope payload, as produced by the holder and decoded (and
//! // signature-verified) by the external envelope codec.
//! let envelope = json!({
//!     "presentation_submission": {
//!         "id": "a50e8db8-ffa0-4a9f-91cd-1b9ee7fc5a7f",
//!         "definition_id": "KYCAMLPresentationDefinition",
//!         "descriptor_map": [
//!             {"id": "kycaml_input", "format": "jwt_vc", "path": "$.verifiableCredential[0]"}
//!         ]
//!     },
//!     "verifiableCredential": [{"issuer": {"id": "did:key:z6MkExample"}}]
//! });
//!
//! let submission = VerificationSubmission::from_envelope(envelope)?;
//! let check = process_verification_submission(&submission, &definition)?;
//! assert!(check.accepted());
//! # Ok(())
//! # }
//! ```
//!
//! # Holder usage
//!
//! [`holder::build_presentation_submission`] builds the descriptor map for
//! a definition — one entry per input descriptor, in declared order — and
//! [`holder::create_verification_submission`] assembles the presentation
//! payload and hands it to an [`external::EnvelopeCodec`] for signing.
//!
//! # Issuer usage
//!
//! Credential applications (the issuance-time analogue of a verification
//! submission, addressed to a [`CredentialManifest`]) are validated with
//! the same engine via [`issuer::process_credential_application`] or the
//! store-backed [`issuer::validate_credential_submission`].
//!
//! # Scope
//!
//! The engine is pure and synchronous: it performs no I/O, holds no locks,
//! and keeps no state across calls, so any number of callers may run it
//! concurrently over shared definitions and documents. Everything
//! cryptographic or stateful — envelope signing and verification, DID
//! resolution, manifest and definition storage, revocation status — lives
//! behind the collaborator traits in [`external`] and must complete before
//! the engine runs.
//!
//! [`PresentationDefinition`]: crate::core::presentation_definition::PresentationDefinition
//! [`PresentationSubmission`]: crate::core::presentation_submission::PresentationSubmission
//! [`ValidationCheck`]: crate::core::validation::ValidationCheck
//! [`CredentialManifest`]: crate::core::manifest::CredentialManifest

pub mod core;
pub mod external;
pub mod holder;
pub mod issuer;
pub mod utils;
pub mod verifier;

pub use crate::core::json_path::JsonPath;
pub use crate::core::validation::{SubmissionError, ValidationCheck, ValidationError};

//! Verifier-side processing of verification submissions.

use crate::core::presentation_definition::PresentationDefinition;
use crate::core::presentation_submission::VerificationSubmission;
use crate::core::validation::{process_submission, SubmissionError, ValidationCheck};

/// Validate a decoded verification submission against a presentation
/// definition.
///
/// For each input descriptor of the definition, the credential the
/// submission's descriptor map claims satisfies it is resolved by path from
/// the envelope, then every declared field constraint is evaluated against
/// it. Constraint failures are collected into the returned
/// [ValidationCheck] so the caller sees every failure at once; structural
/// problems — descriptor map entries that do not mirror the definition's
/// input descriptors one-to-one and in order, or paths that do not resolve
/// to a credential object — fail the whole call with a [SubmissionError]
/// instead.
pub fn process_verification_submission(
    submission: &VerificationSubmission,
    definition: &PresentationDefinition,
) -> Result<ValidationCheck, SubmissionError> {
    let check = process_submission(
        definition,
        submission.presentation_submission(),
        submission.presentation(),
    )?;

    if !check.accepted() {
        tracing::debug!(
            definition_id = definition.id(),
            failing = check.errors().len(),
            "verification submission rejected by constraint evaluation"
        );
    }

    Ok(check)
}

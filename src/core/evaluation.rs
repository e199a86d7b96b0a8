use super::input_descriptor::{ConstraintsField, InputDescriptor};
use super::json_path::JsonPath;
use crate::utils::NonEmptyVec;

use jsonschema::{JSONSchema, ValidationError};
use serde::Serialize;
use serde_json::Value;

/// The outcome of trying one candidate path against a credential document:
/// the path, whether it matched, and the resolved value when one was found
/// (a filter-rejected value is recorded, an unresolvable path is not).
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct PathEvaluation {
    path: String,
    #[serde(rename = "match")]
    matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
}

impl PathEvaluation {
    /// Record a successful resolution.
    pub fn matched(path: impl Into<String>, value: Value) -> Self {
        Self {
            path: path.into(),
            matched: true,
            value: Some(value),
        }
    }

    /// Record a failed candidate: either unresolvable (`value` absent) or
    /// resolved but rejected by the field's filter (`value` present).
    pub fn failed(path: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            path: path.into(),
            matched: false,
            value,
        }
    }

    /// Return the candidate path this outcome refers to.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Return whether the candidate matched.
    pub fn is_match(&self) -> bool {
        self.matched
    }

    /// Return the resolved value, when one was found.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }
}

/// The outcome of evaluating one constraint field against one credential
/// document: the field itself plus either the single successful candidate or
/// the full, ordered list of failed attempts. Exactly one of the two is
/// present, enforced by the sum type.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct FieldConstraintEvaluation {
    field: ConstraintsField,
    #[serde(flatten)]
    outcome: EvaluationOutcome,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub enum EvaluationOutcome {
    /// The first candidate path that resolved and passed the filter.
    #[serde(rename = "match")]
    Match(PathEvaluation),

    /// One failed attempt per candidate path, in declared order.
    #[serde(rename = "failures")]
    Failures(NonEmptyVec<PathEvaluation>),
}

impl FieldConstraintEvaluation {
    /// Wrap a successful evaluation.
    pub fn matched(field: ConstraintsField, success: PathEvaluation) -> Self {
        Self {
            field,
            outcome: EvaluationOutcome::Match(success),
        }
    }

    /// Wrap a failed evaluation.
    pub fn failed(field: ConstraintsField, failures: NonEmptyVec<PathEvaluation>) -> Self {
        Self {
            field,
            outcome: EvaluationOutcome::Failures(failures),
        }
    }

    /// Return the constraint field this evaluation is about.
    pub fn field(&self) -> &ConstraintsField {
        &self.field
    }

    /// Return the successful candidate, if the field matched.
    pub fn matched_path(&self) -> Option<&PathEvaluation> {
        match &self.outcome {
            EvaluationOutcome::Match(success) => Some(success),
            EvaluationOutcome::Failures(_) => None,
        }
    }

    /// Return the failed attempts; empty when the field matched.
    pub fn failures(&self) -> &[PathEvaluation] {
        match &self.outcome {
            EvaluationOutcome::Match(_) => &[],
            EvaluationOutcome::Failures(failures) => failures,
        }
    }

    /// Return whether the field matched.
    pub fn is_match(&self) -> bool {
        matches!(self.outcome, EvaluationOutcome::Match(_))
    }
}

/// All field evaluations for one submitted credential against one input
/// descriptor. The evaluation list preserves the descriptor's declared field
/// order and has exactly one entry per constraint field.
///
/// Descriptor-level success carries no stored boolean; callers derive it by
/// scanning the evaluations.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialResults {
    input_descriptor_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    credential_id: Option<String>,
    #[serde(rename = "results")]
    evaluations: Vec<FieldConstraintEvaluation>,
}

impl CredentialResults {
    pub fn new(
        input_descriptor_id: String,
        credential_id: Option<String>,
        evaluations: Vec<FieldConstraintEvaluation>,
    ) -> Self {
        Self {
            input_descriptor_id,
            credential_id,
            evaluations,
        }
    }

    /// Return the id of the input descriptor these results belong to.
    pub fn input_descriptor_id(&self) -> &str {
        &self.input_descriptor_id
    }

    /// Return the identifier of the evaluated credential, when it carries
    /// one.
    pub fn credential_id(&self) -> Option<&String> {
        self.credential_id.as_ref()
    }

    /// Return the field evaluations, in declared field order.
    pub fn results(&self) -> &[FieldConstraintEvaluation] {
        &self.evaluations
    }

    /// Returns whether every required field evaluation succeeded.
    ///
    /// A failed evaluation of a field marked `optional` does not reject the
    /// descriptor; its attempts stay visible in [CredentialResults::results].
    pub fn is_satisfied(&self) -> bool {
        self.evaluations
            .iter()
            .all(|evaluation| evaluation.is_match() || evaluation.field().is_optional())
    }
}

/// Evaluate one constraint field against a credential document.
///
/// Candidate paths are tried in declared order; the first one that resolves
/// to a non-null value and satisfies the field's filter (when present) wins.
/// A resolved-but-filter-rejected value is recorded as a failed attempt and
/// evaluation continues with the next path. Pure: no side effects beyond
/// debug logging of filter rejections.
pub fn evaluate_field(field: &ConstraintsField, credential: &Value) -> FieldConstraintEvaluation {
    let validator = field.validator();

    let first = evaluate_candidate(field.path().first(), credential, &validator);
    if first.is_match() {
        return FieldConstraintEvaluation::matched(field.clone(), first);
    }

    let mut attempts = NonEmptyVec::new(first);
    for path in &field.path()[1..] {
        let evaluation = evaluate_candidate(path, credential, &validator);
        if evaluation.is_match() {
            return FieldConstraintEvaluation::matched(field.clone(), evaluation);
        }
        attempts.push(evaluation);
    }

    FieldConstraintEvaluation::failed(field.clone(), attempts)
}

fn evaluate_candidate(
    path: &JsonPath,
    credential: &Value,
    validator: &Option<Result<JSONSchema, ValidationError>>,
) -> PathEvaluation {
    let Some(value) = path.resolve(credential) else {
        return PathEvaluation::failed(path.as_str(), None);
    };

    // Only a successfully compiled filter constrains the value; an invalid
    // filter schema was already surfaced by `ConstraintsField::validator`.
    if let Some(Ok(schema)) = validator {
        if let Err(errors) = schema.validate(value) {
            for error in errors {
                tracing::debug!(%path, "value rejected by constraint filter: {error}");
            }
            return PathEvaluation::failed(path.as_str(), Some(value.clone()));
        }
    }

    PathEvaluation::matched(path.as_str(), value.clone())
}

/// Evaluate every constraint field of an input descriptor against the same
/// credential document, preserving declared field order.
pub fn evaluate_input_descriptor(
    input_descriptor: &InputDescriptor,
    credential: &Value,
) -> CredentialResults {
    let evaluations = input_descriptor
        .constraints()
        .fields()
        .iter()
        .map(|field| evaluate_field(field, credential))
        .collect();

    CredentialResults::new(
        input_descriptor.id().to_string(),
        credential_id(credential),
        evaluations,
    )
}

fn credential_id(credential: &Value) -> Option<String> {
    credential
        .get("id")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input_descriptor::Constraints;
    use serde_json::json;

    fn field(paths: &[&str]) -> ConstraintsField {
        let mut iter = paths.iter();
        let mut field = ConstraintsField::new(iter.next().unwrap().parse().unwrap());
        for path in iter {
            field = field.add_path(path.parse().unwrap());
        }
        field
    }

    #[test]
    fn first_match_wins_in_declared_order() {
        // Both paths resolve; the first declared one must be reported.
        let credential = json!({
            "issuer": {"id": "did:key:z6MkFirst"},
            "vc": {"issuer": {"id": "did:key:z6MkSecond"}}
        });
        let field = field(&["$.issuer.id", "$.vc.issuer.id"]);

        let evaluation = evaluate_field(&field, &credential);
        let success = evaluation.matched_path().expect("field should match");
        assert_eq!(success.path(), "$.issuer.id");
        assert_eq!(success.value(), Some(&json!("did:key:z6MkFirst")));
        assert!(evaluation.failures().is_empty());
    }

    #[test]
    fn falls_through_to_later_candidates() {
        let credential = json!({
            "vc": {"issuer": {"id": "did:key:z6MkSecond"}}
        });
        let field = field(&["$.issuer.id", "$.vc.issuer.id"]);

        let evaluation = evaluate_field(&field, &credential);
        assert_eq!(
            evaluation.matched_path().map(PathEvaluation::path),
            Some("$.vc.issuer.id")
        );
    }

    #[test]
    fn failure_records_one_attempt_per_candidate_in_order() {
        let credential = json!({"credentialSubject": {}});
        let field = field(&["$.issuer.id", "$.vc.issuer.id", "$.iss"]);

        let evaluation = evaluate_field(&field, &credential);
        assert!(!evaluation.is_match());
        let failures = evaluation.failures();
        assert_eq!(failures.len(), 3);
        assert_eq!(failures[0].path(), "$.issuer.id");
        assert_eq!(failures[1].path(), "$.vc.issuer.id");
        assert_eq!(failures[2].path(), "$.iss");
        assert!(failures.iter().all(|f| !f.is_match() && f.value().is_none()));
    }

    #[test]
    fn filter_rejected_value_is_recorded_and_evaluation_continues() {
        let credential = json!({
            "issuer": {"id": "did:web:example.com"},
            "vc": {"issuer": {"id": "did:key:z6MkTrusted"}}
        });
        let field = field(&["$.issuer.id", "$.vc.issuer.id"])
            .set_filter(json!({"type": "string", "pattern": "^did:key:"}));

        let evaluation = evaluate_field(&field, &credential);
        let success = evaluation.matched_path().expect("second path should pass");
        assert_eq!(success.path(), "$.vc.issuer.id");
    }

    #[test]
    fn filter_rejection_on_every_candidate_keeps_resolved_values() {
        let credential = json!({"issuer": {"id": "did:web:example.com"}});
        let field = field(&["$.issuer.id"])
            .set_filter(json!({"type": "string", "pattern": "^did:key:"}));

        let evaluation = evaluate_field(&field, &credential);
        let failures = evaluation.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].value(), Some(&json!("did:web:example.com")));
    }

    #[test]
    fn evaluation_is_deterministic() {
        let credential = json!({"issuer": {"id": "did:key:z6Mk"}});
        let field = field(&["$.issuer.id", "$.iss"]);
        assert_eq!(
            evaluate_field(&field, &credential),
            evaluate_field(&field, &credential)
        );
    }

    #[test]
    fn descriptor_evaluation_preserves_field_order_and_credential_id() {
        let descriptor = InputDescriptor::new(
            "kycaml_input".to_string(),
            Constraints::new()
                .add_constraint(field(&["$.issuer.id"]))
                .add_constraint(field(&["$.credentialSubject.status"])),
        );
        let credential = json!({
            "id": "urn:uuid:credential-1",
            "issuer": {"id": "did:key:z6Mk"},
            "credentialSubject": {"status": "approved"}
        });

        let results = evaluate_input_descriptor(&descriptor, &credential);
        assert_eq!(results.input_descriptor_id(), "kycaml_input");
        assert_eq!(
            results.credential_id(),
            Some(&"urn:uuid:credential-1".to_string())
        );
        assert_eq!(results.results().len(), 2);
        assert!(results.is_satisfied());
        assert_eq!(
            results.results()[1].matched_path().map(PathEvaluation::path),
            Some("$.credentialSubject.status")
        );
    }

    #[test]
    fn optional_field_failure_does_not_reject_the_descriptor() {
        let descriptor = InputDescriptor::new(
            "kycaml_input".to_string(),
            Constraints::new()
                .add_constraint(field(&["$.issuer.id"]))
                .add_constraint(field(&["$.credentialSubject.middleName"]).set_optional(true)),
        );
        let credential = json!({"issuer": {"id": "did:key:z6Mk"}});

        let results = evaluate_input_descriptor(&descriptor, &credential);
        assert!(results.is_satisfied());

        // The optional field's failed attempts stay visible.
        assert_eq!(results.results().len(), 2);
        assert!(!results.results()[1].is_match());
        assert_eq!(
            results.results()[1].failures()[0].path(),
            "$.credentialSubject.middleName"
        );
    }

    #[test]
    fn required_field_failure_still_rejects_the_descriptor() {
        let descriptor = InputDescriptor::new(
            "kycaml_input".to_string(),
            Constraints::new()
                .add_constraint(field(&["$.issuer.id"]))
                .add_constraint(field(&["$.credentialSubject.status"]).set_optional(false)),
        );
        let credential = json!({"issuer": {"id": "did:key:z6Mk"}});

        let results = evaluate_input_descriptor(&descriptor, &credential);
        assert!(!results.is_satisfied());
    }

    #[test]
    fn serialized_evaluation_shape() {
        let field = field(&["$.issuer.id"]);
        let evaluation = FieldConstraintEvaluation::matched(
            field,
            PathEvaluation::matched("$.issuer.id", json!("did:key:z6Mk")),
        );

        assert_eq!(
            serde_json::to_value(&evaluation).unwrap(),
            json!({
                "field": {"path": ["$.issuer.id"]},
                "match": {
                    "path": "$.issuer.id",
                    "match": true,
                    "value": "did:key:z6Mk"
                }
            })
        );
    }
}

use super::json_path::JsonPath;
use crate::utils::NonEmptyVec;

use jsonschema::{JSONSchema, ValidationError};
use serde::{Deserialize, Serialize};

/// Input Descriptors describe the information a verifier requires of a
/// holder: which credential is expected and which of its fields must be
/// present (and, optionally, what values they may take).
///
/// All Input Descriptors of a definition must be satisfied for a submission
/// to be accepted.
///
/// See: <https://identity.foundation/presentation-exchange/spec/v2.0.0/#input-descriptor-object>
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputDescriptor {
    id: String,
    #[serde(default)]
    constraints: Constraints,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    purpose: Option<String>,
}

impl InputDescriptor {
    /// Create a new input descriptor with the given id and constraints.
    ///
    /// The id must be a string that does not conflict with the id of another
    /// input descriptor in the same presentation definition.
    pub fn new(id: String, constraints: Constraints) -> Self {
        Self {
            id,
            constraints,
            name: None,
            purpose: None,
        }
    }

    /// Return the id of the input descriptor.
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Return the constraints of the input descriptor.
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Set the name of the input descriptor.
    pub fn set_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    /// Return the name of the input descriptor.
    pub fn name(&self) -> Option<&String> {
        self.name.as_ref()
    }

    /// Set the purpose of the input descriptor.
    ///
    /// If present, the purpose MUST be a string that describes the purpose
    /// for which the claim's data is being requested.
    pub fn set_purpose(mut self, purpose: String) -> Self {
        self.purpose = Some(purpose);
        self
    }

    /// Return the purpose of the input descriptor.
    pub fn purpose(&self) -> Option<&String> {
        self.purpose.as_ref()
    }
}

/// The constraints a holder must satisfy to fulfill an [InputDescriptor].
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    fields: Vec<ConstraintsField>,
}

impl Constraints {
    /// Returns an empty constraints object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field constraint to the constraints list.
    pub fn add_constraint(mut self, field: ConstraintsField) -> Self {
        self.fields.push(field);
        self
    }

    /// Returns the declared field constraints, in order.
    pub fn fields(&self) -> &[ConstraintsField] {
        self.fields.as_ref()
    }

    /// Returns whether no field constraints are declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One required field within an input descriptor: an ordered, non-empty list
/// of candidate paths, an optional human-readable purpose, and an optional
/// JSON Schema filter the resolved value must satisfy.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConstraintsField {
    path: NonEmptyVec<JsonPath>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    optional: Option<bool>,
}

impl From<NonEmptyVec<JsonPath>> for ConstraintsField {
    fn from(path: NonEmptyVec<JsonPath>) -> Self {
        Self {
            path,
            id: None,
            purpose: None,
            name: None,
            filter: None,
            optional: None,
        }
    }
}

impl ConstraintsField {
    /// Create a new constraints field with a single candidate path.
    ///
    /// Use [ConstraintsField::add_path] or the `From<NonEmptyVec<JsonPath>>`
    /// conversion when more than one candidate path is known.
    pub fn new(path: JsonPath) -> ConstraintsField {
        NonEmptyVec::new(path).into()
    }

    /// Add a candidate path to the constraints field.
    pub fn add_path(mut self, path: JsonPath) -> Self {
        self.path.push(path);
        self
    }

    /// Return the candidate paths of the constraints field, in declared
    /// order.
    pub fn path(&self) -> &NonEmptyVec<JsonPath> {
        &self.path
    }

    /// Set the id of the constraints field.
    pub fn set_id(mut self, id: String) -> Self {
        self.id = Some(id);
        self
    }

    /// Return the id of the constraints field.
    pub fn id(&self) -> Option<&String> {
        self.id.as_ref()
    }

    /// Set the purpose of the constraints field.
    ///
    /// If present, its value MUST be a string that describes the purpose for
    /// which the field is being requested.
    pub fn set_purpose(mut self, purpose: String) -> Self {
        self.purpose = Some(purpose);
        self
    }

    /// Return the purpose of the constraints field.
    pub fn purpose(&self) -> Option<&String> {
        self.purpose.as_ref()
    }

    /// Set the name of the constraints field.
    pub fn set_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    /// Return the name of the constraints field.
    pub fn name(&self) -> Option<&String> {
        self.name.as_ref()
    }

    /// Set the filter of the constraints field.
    ///
    /// If present its value MUST be a JSON Schema descriptor used to filter
    /// the values resolved by the candidate path expressions.
    pub fn set_filter(mut self, filter: serde_json::Value) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Return the raw filter of the constraints field.
    pub fn filter(&self) -> Option<&serde_json::Value> {
        self.filter.as_ref()
    }

    /// Return a JSON Schema validator compiled from the internal filter.
    ///
    /// Returns `None` when the field declares no filter.
    ///
    /// # Errors
    ///
    /// If the filter is not a valid schema, this will return an error.
    pub fn validator(&self) -> Option<Result<JSONSchema, ValidationError>> {
        self.filter.as_ref().map(JSONSchema::compile)
    }

    /// Set the optional value of the constraints field.
    ///
    /// True indicates the field is optional; false or non-presence indicates
    /// the field is required. An optional field is still evaluated and its
    /// outcome recorded, but a failed evaluation does not reject the
    /// descriptor.
    pub fn set_optional(mut self, optional: bool) -> Self {
        self.optional = Some(optional);
        self
    }

    /// Return the optional value of the constraints field.
    pub fn is_optional(&self) -> bool {
        self.optional.unwrap_or(false)
    }

    /// Inverse alias for `!is_optional()`.
    pub fn is_required(&self) -> bool {
        !self.is_optional()
    }
}

use std::collections::HashSet;

use super::credential_format::*;
use super::input_descriptor::*;
use crate::utils::NonEmptyVec;

use serde::{de, Deserialize, Deserializer, Serialize};

/// Error raised when a presentation definition would violate its own
/// structural invariants.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PresentationDefinitionError {
    /// Input descriptor ids must be unique within a definition; a duplicate
    /// would make descriptor map entries ambiguous.
    #[error("duplicate input descriptor id `{0}`")]
    DuplicateInputDescriptorId(String),
}

/// A presentation definition is the verifier's machine-readable statement of
/// which credentials and which of their fields it requires.
///
/// It is composed of one or more [InputDescriptor]s, each naming one
/// credential requirement. A conforming submission binds exactly one
/// submitted item to each input descriptor, in declared order.
///
/// See: <https://identity.foundation/presentation-exchange/spec/v2.0.0/#presentation-definition>
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresentationDefinition {
    id: String,
    #[serde(deserialize_with = "deserialize_input_descriptors")]
    input_descriptors: NonEmptyVec<InputDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<ClaimFormatMap>,
}

/// Input descriptor lists must be non-empty and carry unique ids; both are
/// rejected at deserialization time, like malformed path expressions.
fn deserialize_input_descriptors<'de, D>(
    deserializer: D,
) -> Result<NonEmptyVec<InputDescriptor>, D::Error>
where
    D: Deserializer<'de>,
{
    let input_descriptors = Vec::deserialize(deserializer)?;
    let input_descriptors = NonEmptyVec::try_from(input_descriptors).map_err(de::Error::custom)?;
    ensure_unique_ids(&input_descriptors).map_err(de::Error::custom)?;
    Ok(input_descriptors)
}

fn ensure_unique_ids(
    input_descriptors: &[InputDescriptor],
) -> Result<(), PresentationDefinitionError> {
    let mut seen = HashSet::with_capacity(input_descriptors.len());
    for input_descriptor in input_descriptors {
        if !seen.insert(input_descriptor.id()) {
            return Err(PresentationDefinitionError::DuplicateInputDescriptorId(
                input_descriptor.id().to_string(),
            ));
        }
    }
    Ok(())
}

impl PresentationDefinition {
    /// The presentation definition MUST contain an id and a non-empty list
    /// of input descriptors; the first one is supplied here, more can be
    /// added with [PresentationDefinition::add_input_descriptor].
    pub fn new(id: String, input_descriptor: InputDescriptor) -> Self {
        Self {
            id,
            input_descriptors: NonEmptyVec::new(input_descriptor),
            name: None,
            purpose: None,
            format: None,
        }
    }

    /// Return the id of the presentation definition.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Add an input descriptor to the presentation definition.
    ///
    /// Fails when the definition already declares an input descriptor with
    /// the same id.
    pub fn add_input_descriptor(
        mut self,
        input_descriptor: InputDescriptor,
    ) -> Result<Self, PresentationDefinitionError> {
        if self
            .input_descriptors
            .iter()
            .any(|existing| existing.id() == input_descriptor.id())
        {
            return Err(PresentationDefinitionError::DuplicateInputDescriptorId(
                input_descriptor.id().to_string(),
            ));
        }
        self.input_descriptors.push(input_descriptor);
        Ok(self)
    }

    /// Return the input descriptors of the presentation definition, in
    /// declared order. Guaranteed non-empty.
    pub fn input_descriptors(&self) -> &[InputDescriptor] {
        self.input_descriptors.as_ref()
    }

    /// Set the name of the presentation definition.
    pub fn set_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    /// Return the name of the presentation definition.
    pub fn name(&self) -> Option<&String> {
        self.name.as_ref()
    }

    /// Set the purpose of the presentation definition.
    pub fn set_purpose(mut self, purpose: String) -> Self {
        self.purpose = Some(purpose);
        self
    }

    /// Return the purpose of the presentation definition.
    pub fn purpose(&self) -> Option<&String> {
        self.purpose.as_ref()
    }

    /// Attach a claim format map to the presentation definition, informing
    /// the holder of the claim format configurations the verifier can
    /// process.
    pub fn set_format(mut self, format: ClaimFormatMap) -> Self {
        self.format = Some(format);
        self
    }

    /// Return the format of the presentation definition.
    pub fn format(&self) -> Option<&ClaimFormatMap> {
        self.format.as_ref()
    }
}

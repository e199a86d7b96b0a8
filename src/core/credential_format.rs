use std::{borrow::Cow, collections::HashMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

const FORMAT_JWT_VC: &str = "jwt_vc";
const FORMAT_JWT_VP: &str = "jwt_vp";
const FORMAT_LDP_VC: &str = "ldp_vc";
const FORMAT_LDP_VP: &str = "ldp_vp";

/// A Json object of claim formats, keyed by designation.
pub type ClaimFormatMap = HashMap<ClaimFormatDesignation, ClaimFormatPayload>;

/// The claim format designation names the encoding of a submitted credential
/// or presentation, e.g. `jwt_vc`.
///
/// Descriptor map entries carry a designation so the verifier knows how to
/// hand the referenced item to its envelope codec; the engine itself never
/// infers the format from content.
///
/// Registry of claim format types: <https://identity.foundation/claim-format-registry/#registry>
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClaimFormatDesignation {
    /// A W3C Verifiable Credential secured as a JWT, submitted as a
    /// JWT-encoded string.
    JwtVc,

    /// A W3C Verifiable Presentation secured as a JWT.
    JwtVp,

    /// A W3C Verifiable Credential with a Linked Data Proof, submitted as a
    /// JSON object.
    LdpVc,

    /// A W3C Verifiable Presentation with a Linked Data Proof.
    LdpVp,

    /// Claim format designations not covered by the above, carried verbatim.
    Other(String),
}

impl ClaimFormatDesignation {
    pub fn from_name(name: Cow<str>) -> Self {
        match name.as_ref() {
            FORMAT_JWT_VC => Self::JwtVc,
            FORMAT_JWT_VP => Self::JwtVp,
            FORMAT_LDP_VC => Self::LdpVc,
            FORMAT_LDP_VP => Self::LdpVp,
            _ => Self::Other(name.into_owned()),
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::JwtVc => FORMAT_JWT_VC,
            Self::JwtVp => FORMAT_JWT_VP,
            Self::LdpVc => FORMAT_LDP_VC,
            Self::LdpVp => FORMAT_LDP_VP,
            Self::Other(other) => other,
        }
    }
}

impl From<&str> for ClaimFormatDesignation {
    fn from(s: &str) -> Self {
        Self::from_name(Cow::Borrowed(s))
    }
}

impl From<String> for ClaimFormatDesignation {
    fn from(value: String) -> Self {
        Self::from_name(Cow::Owned(value))
    }
}

impl FromStr for ClaimFormatDesignation {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.into())
    }
}

impl From<ClaimFormatDesignation> for String {
    fn from(format: ClaimFormatDesignation) -> Self {
        format.name().to_string()
    }
}

impl fmt::Display for ClaimFormatDesignation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name().fmt(f)
    }
}

impl Serialize for ClaimFormatDesignation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.name().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ClaimFormatDesignation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Into::into)
    }
}

/// The format-specific configuration a definition advertises for a claim
/// format, e.g. the signing algorithms the verifier can process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClaimFormatPayload {
    #[serde(rename = "alg")]
    Alg(Vec<String>),

    #[serde(rename = "proof_type")]
    ProofType(Vec<String>),

    #[serde(untagged)]
    Other(serde_json::Value),
}

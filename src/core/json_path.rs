use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// One step of a compiled path expression.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    /// Object member access, e.g. `.issuer` or `["issuer"]`.
    Field(String),
    /// Array element access, e.g. `[0]`.
    Index(usize),
}

/// A restricted JSONPath expression over a JSON document, compiled once at
/// parse time.
///
/// Only the concrete forms that presentation definitions and descriptor maps
/// actually use are part of the grammar: the root (`$`), dot member access
/// (`$.issuer.id`), quoted bracket member access (`$["@context"]`) and
/// numeric array indexing (`$.verifiableCredential[0]`). Wildcards, slices,
/// filters and recursive descent are rejected at parse time.
///
/// Resolution walks the compiled segments over a [serde_json::Value] tree.
/// An absent member, an index into a non-array, a member access on a
/// non-object, or a JSON `null` all resolve to `None`; absence is a normal
/// outcome, never an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JsonPath {
    raw: String,
    segments: Vec<Segment>,
}

/// Error raised when a path expression does not conform to the restricted
/// grammar.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum JsonPathParseError {
    #[error("path expression `{0}` must start with `$`")]
    MissingRoot(String),

    #[error("empty member name at byte {position} in `{path}`")]
    EmptyMember { path: String, position: usize },

    #[error("invalid array index at byte {position} in `{path}`")]
    InvalidIndex { path: String, position: usize },

    #[error("unterminated bracket selector at byte {position} in `{path}`")]
    UnterminatedBracket { path: String, position: usize },

    #[error("unexpected character `{found}` at byte {position} in `{path}`")]
    UnexpectedCharacter {
        path: String,
        position: usize,
        found: char,
    },
}

impl JsonPath {
    /// Returns the root path `$`, selecting the whole document.
    pub fn root() -> Self {
        Self {
            raw: "$".to_string(),
            segments: Vec::new(),
        }
    }

    /// Extends the path with an object member access.
    pub fn key(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.raw.push('.');
        self.raw.push_str(&name);
        self.segments.push(Segment::Field(name));
        self
    }

    /// Extends the path with an array element access.
    pub fn index(mut self, index: usize) -> Self {
        self.raw.push('[');
        self.raw.push_str(&index.to_string());
        self.raw.push(']');
        self.segments.push(Segment::Index(index));
        self
    }

    /// Returns the source form of the expression.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Evaluate the path against `document`.
    ///
    /// Returns the selected value, or `None` if any segment is absent, of
    /// the wrong shape, or selects JSON `null`. Deterministic: the same
    /// document and path always yield the same result.
    pub fn resolve<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        let mut current = document;
        for segment in &self.segments {
            current = match segment {
                Segment::Field(name) => current.as_object()?.get(name)?,
                Segment::Index(index) => current.as_array()?.get(*index)?,
            };
        }
        if current.is_null() {
            None
        } else {
            Some(current)
        }
    }
}

impl FromStr for JsonPath {
    type Err = JsonPathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix('$')
            .ok_or_else(|| JsonPathParseError::MissingRoot(s.to_string()))?;

        let mut segments = Vec::new();
        let mut chars = rest.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            // Positions are reported relative to the full expression,
            // including the leading `$`.
            let position = i + 1;
            match c {
                '.' => {
                    let mut name = String::new();
                    while let Some(&(_, next)) = chars.peek() {
                        if next == '.' || next == '[' {
                            break;
                        }
                        name.push(next);
                        chars.next();
                    }
                    if name.is_empty() {
                        return Err(JsonPathParseError::EmptyMember {
                            path: s.to_string(),
                            position,
                        });
                    }
                    segments.push(Segment::Field(name));
                }
                '[' => match chars.peek().copied() {
                    Some((_, quote @ ('"' | '\''))) => {
                        chars.next();
                        let mut name = String::new();
                        let mut closed = false;
                        for (_, next) in chars.by_ref() {
                            if next == quote {
                                closed = true;
                                break;
                            }
                            name.push(next);
                        }
                        if !closed || !matches!(chars.next(), Some((_, ']'))) {
                            return Err(JsonPathParseError::UnterminatedBracket {
                                path: s.to_string(),
                                position,
                            });
                        }
                        if name.is_empty() {
                            return Err(JsonPathParseError::EmptyMember {
                                path: s.to_string(),
                                position,
                            });
                        }
                        segments.push(Segment::Field(name));
                    }
                    Some((_, digit)) if digit.is_ascii_digit() => {
                        let mut digits = String::new();
                        while let Some(&(_, next)) = chars.peek() {
                            if next.is_ascii_digit() {
                                digits.push(next);
                                chars.next();
                            } else {
                                break;
                            }
                        }
                        if !matches!(chars.next(), Some((_, ']'))) {
                            return Err(JsonPathParseError::UnterminatedBracket {
                                path: s.to_string(),
                                position,
                            });
                        }
                        let index =
                            digits
                                .parse()
                                .map_err(|_| JsonPathParseError::InvalidIndex {
                                    path: s.to_string(),
                                    position,
                                })?;
                        segments.push(Segment::Index(index));
                    }
                    Some((j, other)) => {
                        return Err(JsonPathParseError::UnexpectedCharacter {
                            path: s.to_string(),
                            position: j + 1,
                            found: other,
                        })
                    }
                    None => {
                        return Err(JsonPathParseError::UnterminatedBracket {
                            path: s.to_string(),
                            position,
                        })
                    }
                },
                other => {
                    return Err(JsonPathParseError::UnexpectedCharacter {
                        path: s.to_string(),
                        position,
                        found: other,
                    })
                }
            }
        }

        Ok(Self {
            raw: s.to_string(),
            segments,
        })
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.raw.fmt(f)
    }
}

impl From<JsonPath> for String {
    fn from(path: JsonPath) -> Self {
        path.raw
    }
}

impl Serialize for JsonPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for JsonPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

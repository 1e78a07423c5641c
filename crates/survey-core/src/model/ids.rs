use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SurveyError};

/// Identifier of a questionnaire row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct QuestionnaireId(pub u32);

/// Identifier of a question row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct QuestionId(pub u32);

/// Identifier of a submission; every answer row of one visit shares it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct ResponseId(pub u32);

/// Account name of an authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ids that arrive as raw path segments and must be parsed before any lookup.
pub trait ResourceId: Sized + Copy + fmt::Display {
    const LABEL: &'static str;

    fn from_raw(value: u32) -> Self;
}

macro_rules! resource_id {
    ($ty:ident, $label:literal) => {
        impl ResourceId for $ty {
            const LABEL: &'static str = $label;

            fn from_raw(value: u32) -> Self {
                $ty(value)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

resource_id!(QuestionnaireId, "questionnaireID");
resource_id!(QuestionId, "questionID");
resource_id!(ResponseId, "responseID");

/// Parses a raw path segment such as `"12"` into a typed id.
pub fn parse_resource_id<T: ResourceId>(raw: &str) -> Result<T> {
    raw.parse::<u32>()
        .map(T::from_raw)
        .map_err(|err| SurveyError::BadRequest(format!("invalid {}:{} ({})", T::LABEL, raw, err)))
}

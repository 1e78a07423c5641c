use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionId;

/// Submitted value for one question.
///
/// Checkbox answers carry a list of selections; every other type carries a
/// single string, where `""` means the question was left blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AnswerBody {
    Single(String),
    Multiple(Vec<String>),
}

impl AnswerBody {
    pub fn is_blank(&self) -> bool {
        match self {
            AnswerBody::Single(body) => body.is_empty(),
            AnswerBody::Multiple(selections) => selections.iter().all(String::is_empty),
        }
    }

    /// Values in the order they were given, skipping nothing.
    pub fn values(&self) -> Vec<&str> {
        match self {
            AnswerBody::Single(body) => vec![body.as_str()],
            AnswerBody::Multiple(selections) => selections.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for AnswerBody {
    fn from(value: &str) -> Self {
        AnswerBody::Single(value.to_string())
    }
}

/// One answer of a submission as received from the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Answer {
    pub question_id: QuestionId,
    pub body: AnswerBody,
}

/// A validated row ready to be written for a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResponseMeta {
    pub question_id: QuestionId,
    pub data: String,
}

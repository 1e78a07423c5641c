use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SurveyError};
use crate::model::ids::{QuestionId, QuestionnaireId};

/// Supported question types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum QuestionType {
    MultipleChoice,
    Checkbox,
    Dropdown,
    LinearScale,
    Number,
    Text,
}

impl QuestionType {
    pub const ALL: [QuestionType; 6] = [
        QuestionType::MultipleChoice,
        QuestionType::Checkbox,
        QuestionType::Dropdown,
        QuestionType::LinearScale,
        QuestionType::Number,
        QuestionType::Text,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "MultipleChoice",
            QuestionType::Checkbox => "Checkbox",
            QuestionType::Dropdown => "Dropdown",
            QuestionType::LinearScale => "LinearScale",
            QuestionType::Number => "Number",
            QuestionType::Text => "Text",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = SurveyError;

    fn from_str(raw: &str) -> Result<Self> {
        QuestionType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == raw)
            .ok_or_else(|| SurveyError::BadRequest(format!("unknown question type '{raw}'")))
    }
}

/// Ordered choices of a MultipleChoice, Checkbox or Dropdown question.
///
/// Option numbers are positional: the first body is option 1.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Options(Vec<String>);

/// A stored option row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OptionRow {
    pub option_num: u32,
    pub body: String,
}

impl Options {
    pub fn new<I, S>(bodies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(bodies.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, body: &str) -> bool {
        self.0.iter().any(|option| option == body)
    }

    pub fn rows(&self) -> Vec<OptionRow> {
        self.0
            .iter()
            .enumerate()
            .map(|(index, body)| OptionRow {
                option_num: index as u32 + 1,
                body: body.clone(),
            })
            .collect()
    }
}

/// Labels and range of a LinearScale question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScaleLabel {
    #[serde(default)]
    pub label_left: String,
    #[serde(default)]
    pub label_right: String,
    pub scale_min: i64,
    pub scale_max: i64,
}

/// Optional answer constraint of a Number or Text question.
///
/// Bounds are stored as text; a non-empty bound must parse as an integer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Validation {
    #[serde(default)]
    pub regex_pattern: String,
    #[serde(default)]
    pub min_bound: String,
    #[serde(default)]
    pub max_bound: String,
}

impl Validation {
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self {
            regex_pattern: pattern.into(),
            ..Self::default()
        }
    }

    pub fn bounds(min_bound: impl Into<String>, max_bound: impl Into<String>) -> Self {
        Self {
            regex_pattern: String::new(),
            min_bound: min_bound.into(),
            max_bound: max_bound.into(),
        }
    }
}

/// Type of a question together with exactly the side data that type uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "question_type")]
pub enum QuestionKind {
    MultipleChoice {
        options: Options,
    },
    Checkbox {
        options: Options,
    },
    Dropdown {
        options: Options,
    },
    LinearScale {
        scale_label: ScaleLabel,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        validation: Option<Validation>,
    },
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        validation: Option<Validation>,
    },
}

impl QuestionKind {
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::MultipleChoice { .. } => QuestionType::MultipleChoice,
            QuestionKind::Checkbox { .. } => QuestionType::Checkbox,
            QuestionKind::Dropdown { .. } => QuestionType::Dropdown,
            QuestionKind::LinearScale { .. } => QuestionType::LinearScale,
            QuestionKind::Number { .. } => QuestionType::Number,
            QuestionKind::Text { .. } => QuestionType::Text,
        }
    }

    pub fn options(&self) -> Option<&Options> {
        match self {
            QuestionKind::MultipleChoice { options }
            | QuestionKind::Checkbox { options }
            | QuestionKind::Dropdown { options } => Some(options),
            _ => None,
        }
    }

    pub fn validation(&self) -> Option<&Validation> {
        match self {
            QuestionKind::Number { validation } | QuestionKind::Text { validation } => {
                validation.as_ref()
            }
            _ => None,
        }
    }
}

/// Stored question row with its side data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Question {
    pub id: QuestionId,
    pub questionnaire_id: QuestionnaireId,
    #[serde(default = "default_page_num")]
    pub page_num: u32,
    pub question_num: u32,
    pub body: String,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

fn default_page_num() -> u32 {
    1
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_numbers_are_dense_and_one_based() {
        let options = Options::new(["red", "green", "blue"]);
        let nums: Vec<u32> = options.rows().iter().map(|row| row.option_num).collect();
        assert_eq!(nums, vec![1, 2, 3]);
    }

    #[test]
    fn question_kind_is_tagged_by_question_type() {
        let question: Question = serde_json::from_value(serde_json::json!({
            "id": 3,
            "questionnaire_id": 1,
            "question_num": 2,
            "body": "Favourite colour?",
            "question_type": "Dropdown",
            "options": ["red", "green"]
        }))
        .expect("question");
        assert_eq!(question.question_type(), QuestionType::Dropdown);
        assert_eq!(question.page_num, 1);
        assert!(question.kind.options().unwrap().contains("green"));
        assert!(question.kind.validation().is_none());
    }

    #[test]
    fn unknown_question_type_name_is_rejected() {
        assert!("Essay".parse::<QuestionType>().is_err());
        assert_eq!(
            "LinearScale".parse::<QuestionType>().unwrap(),
            QuestionType::LinearScale
        );
    }
}

//! Which side table each question type owns.
//!
//! Choice types own option rows, LinearScale owns a single scale label row and
//! Number/Text own an optional validation row. A question never holds side
//! data belonging to another type; authoring input that tries to is rejected
//! here before anything reaches persistence.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SurveyError};
use crate::model::{
    Options, Question, QuestionId, QuestionKind, QuestionType, QuestionnaireId, ScaleLabel,
    Validation,
};
use crate::validate::{check_bounds_well_formed, compile_pattern};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SideTable {
    Options,
    ScaleLabel,
    Validation,
}

impl SideTable {
    pub const ALL: [SideTable; 3] = [SideTable::Options, SideTable::ScaleLabel, SideTable::Validation];

    pub fn as_str(&self) -> &'static str {
        match self {
            SideTable::Options => "options",
            SideTable::ScaleLabel => "scale_label",
            SideTable::Validation => "validation",
        }
    }
}

impl fmt::Display for SideTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl QuestionType {
    pub fn side_table(&self) -> SideTable {
        match self {
            QuestionType::MultipleChoice | QuestionType::Checkbox | QuestionType::Dropdown => {
                SideTable::Options
            }
            QuestionType::LinearScale => SideTable::ScaleLabel,
            QuestionType::Number | QuestionType::Text => SideTable::Validation,
        }
    }

    /// Whether the side table is mandatory (options, scale) or optional (validation).
    pub fn requires_side_data(&self) -> bool {
        !matches!(self.side_table(), SideTable::Validation)
    }
}

/// Side-table writes the persistence layer owes for one question save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SideTablePlan {
    /// Table to upsert, if the question carries side data.
    pub write: Option<SideTable>,
    /// Tables whose rows for this question must be deleted.
    pub clear: Vec<SideTable>,
}

pub fn plan_side_tables(kind: &QuestionKind) -> SideTablePlan {
    let owned = kind.question_type().side_table();
    let write = match kind {
        QuestionKind::Number { validation } | QuestionKind::Text { validation }
            if validation.is_none() =>
        {
            None
        }
        _ => Some(owned),
    };
    let clear = SideTable::ALL
        .into_iter()
        .filter(|table| Some(*table) != write)
        .collect();
    SideTablePlan { write, clear }
}

/// Authoring-time question body as an administrator submits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionDraft {
    pub questionnaire_id: QuestionnaireId,
    pub question_type: String,
    #[serde(default = "default_page_num")]
    pub page_num: u32,
    pub question_num: u32,
    pub body: String,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_label: Option<ScaleLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Validation>,
}

fn default_page_num() -> u32 {
    1
}

impl QuestionDraft {
    /// Resolves the draft's side data into the variant its type owns.
    pub fn to_kind(&self) -> Result<QuestionKind> {
        let question_type: QuestionType = self.question_type.parse()?;
        let owned = question_type.side_table();

        for (table, present) in [
            (SideTable::Options, self.options.is_some()),
            (SideTable::ScaleLabel, self.scale_label.is_some()),
            (SideTable::Validation, self.validation.is_some()),
        ] {
            if present && table != owned {
                return Err(mismatch(question_type, table.as_str()));
            }
        }

        match question_type {
            QuestionType::MultipleChoice | QuestionType::Checkbox | QuestionType::Dropdown => {
                let options = match &self.options {
                    Some(bodies) if !bodies.is_empty() => Options::new(bodies.iter().cloned()),
                    _ => return Err(mismatch(question_type, "an empty option list")),
                };
                Ok(match question_type {
                    QuestionType::MultipleChoice => QuestionKind::MultipleChoice { options },
                    QuestionType::Checkbox => QuestionKind::Checkbox { options },
                    _ => QuestionKind::Dropdown { options },
                })
            }
            QuestionType::LinearScale => {
                let Some(scale_label) = self.scale_label.clone() else {
                    return Err(mismatch(question_type, "a missing scale_label"));
                };
                if scale_label.scale_min > scale_label.scale_max {
                    return Err(SurveyError::InvalidNumber(format!(
                        "scale_min must not exceed scale_max (scale_min: {}, scale_max: {})",
                        scale_label.scale_min, scale_label.scale_max
                    )));
                }
                Ok(QuestionKind::LinearScale { scale_label })
            }
            QuestionType::Number => {
                let validation = normalize(self.validation.clone());
                if let Some(validation) = &validation {
                    if !validation.regex_pattern.is_empty() {
                        return Err(mismatch(question_type, "regex_pattern"));
                    }
                    check_bounds_well_formed(&validation.min_bound, &validation.max_bound)?;
                }
                Ok(QuestionKind::Number { validation })
            }
            QuestionType::Text => {
                let validation = normalize(self.validation.clone());
                if let Some(validation) = &validation {
                    if !validation.min_bound.is_empty() || !validation.max_bound.is_empty() {
                        return Err(mismatch(question_type, "min_bound/max_bound"));
                    }
                    compile_pattern(&validation.regex_pattern)?;
                }
                Ok(QuestionKind::Text { validation })
            }
        }
    }

    pub fn into_question(self, id: QuestionId) -> Result<Question> {
        let kind = self.to_kind()?;
        Ok(Question {
            id,
            questionnaire_id: self.questionnaire_id,
            page_num: self.page_num,
            question_num: self.question_num,
            body: self.body,
            is_required: self.is_required,
            deleted_at: None,
            kind,
        })
    }
}

fn normalize(validation: Option<Validation>) -> Option<Validation> {
    validation.filter(|validation| *validation != Validation::default())
}

fn mismatch(question_type: QuestionType, side_table: &'static str) -> SurveyError {
    SurveyError::SideDataMismatch {
        question_type,
        side_table,
    }
}

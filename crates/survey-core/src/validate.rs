use std::collections::BTreeSet;

use regex::Regex;

use crate::error::{BoundSide, Result, SurveyError};
use crate::model::{AnswerBody, Options, QuestionKind, ScaleLabel, Validation};

/// Parsed numeric bounds of a Number question. `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NumberBounds {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl NumberBounds {
    pub fn check(&self, number: i64) -> Result<()> {
        if let Some(min) = self.min
            && number < min
        {
            return Err(SurveyError::NumberBoundary {
                number,
                bound: min,
                side: BoundSide::Below,
            });
        }
        if let Some(max) = self.max
            && number > max
        {
            return Err(SurveyError::NumberBoundary {
                number,
                bound: max,
                side: BoundSide::Above,
            });
        }
        Ok(())
    }
}

/// Checks administrator-entered bounds at authoring time.
///
/// Each bound is empty or an integer, and `min <= max` when both are set.
pub fn check_bounds_well_formed(min_bound: &str, max_bound: &str) -> Result<NumberBounds> {
    let min = parse_bound(min_bound, "min_bound")?;
    let max = parse_bound(max_bound, "max_bound")?;

    if let (Some(min), Some(max)) = (min, max)
        && min > max
    {
        return Err(SurveyError::InvalidNumber(format!(
            "min_bound must not exceed max_bound (min_bound: {min}, max_bound: {max})"
        )));
    }

    Ok(NumberBounds { min, max })
}

fn parse_bound(raw: &str, name: &str) -> Result<Option<i64>> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i64>().map(Some).map_err(|_| {
        SurveyError::InvalidNumber(format!("{name} '{raw}' is not a numerical value"))
    })
}

/// Validates one submitted answer against its question.
pub fn validate_answer(kind: &QuestionKind, body: &AnswerBody) -> Result<()> {
    match kind {
        QuestionKind::Number { validation } => {
            check_number(validation.as_ref(), single_value(kind, body)?)
        }
        QuestionKind::Text { validation } => {
            check_text(validation.as_ref(), single_value(kind, body)?)
        }
        QuestionKind::MultipleChoice { options } | QuestionKind::Dropdown { options } => {
            check_choice(options, body, false)
        }
        QuestionKind::Checkbox { options } => check_choice(options, body, true),
        QuestionKind::LinearScale { scale_label } => {
            check_scale(scale_label, single_value(kind, body)?)
        }
    }
}

// A list of at most one value stands for that value, as it does for
// single-choice questions.
fn single_value<'a>(kind: &QuestionKind, body: &'a AnswerBody) -> Result<&'a str> {
    match body {
        AnswerBody::Single(value) => Ok(value),
        AnswerBody::Multiple(values) => match values.as_slice() {
            [] => Ok(""),
            [value] => Ok(value),
            _ => Err(SurveyError::BadRequest(format!(
                "{} questions take a single value",
                kind.question_type()
            ))),
        },
    }
}

/// Number answers: blank is accepted, otherwise an integer within bounds.
pub fn check_number(validation: Option<&Validation>, body: &str) -> Result<()> {
    if body.is_empty() {
        return Ok(());
    }

    let bounds = match validation {
        Some(validation) => check_bounds_well_formed(&validation.min_bound, &validation.max_bound)?,
        None => NumberBounds::default(),
    };

    let number = body
        .parse::<i64>()
        .map_err(|_| SurveyError::InvalidNumber(format!("'{body}' is not an integer")))?;

    bounds.check(number)
}

/// Text answers: a blank pattern accepts anything, a blank body is exempt.
pub fn check_text(validation: Option<&Validation>, body: &str) -> Result<()> {
    let Some(pattern) = validation
        .map(|validation| validation.regex_pattern.as_str())
        .filter(|pattern| !pattern.is_empty())
    else {
        return Ok(());
    };

    let regex = compile_pattern(pattern)?;

    if !body.is_empty() && !regex.is_match(body) {
        return Err(SurveyError::TextMatching {
            body: body.to_string(),
            pattern: pattern.to_string(),
        });
    }

    Ok(())
}

pub(crate) fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|err| SurveyError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: err.to_string(),
    })
}

/// Choice answers must be drawn from the configured options.
pub fn check_choice(options: &Options, body: &AnswerBody, allow_many: bool) -> Result<()> {
    if body.is_blank() {
        return Ok(());
    }

    let values = body.values();
    if !allow_many && values.len() > 1 {
        return Err(SurveyError::InvalidChoice(format!(
            "{} selections given where one is allowed",
            values.len()
        )));
    }

    let mut seen = BTreeSet::new();
    for value in values {
        if !options.contains(value) {
            return Err(SurveyError::InvalidChoice(value.to_string()));
        }
        if !seen.insert(value) {
            return Err(SurveyError::InvalidChoice(format!("{value} (selected twice)")));
        }
    }

    Ok(())
}

/// LinearScale answers: blank is accepted, otherwise a point on the scale.
pub fn check_scale(scale: &ScaleLabel, body: &str) -> Result<()> {
    if body.is_empty() {
        return Ok(());
    }

    let number = body
        .parse::<i64>()
        .map_err(|_| SurveyError::InvalidNumber(format!("'{body}' is not a scale value")))?;

    NumberBounds {
        min: Some(scale.scale_min),
        max: Some(scale.scale_max),
    }
    .check(number)
}

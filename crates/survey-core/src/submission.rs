use std::collections::BTreeMap;

use tracing::warn;

use crate::error::{Result, SurveyError};
use crate::model::{Answer, AnswerBody, Question, QuestionId, ResponseMeta};
use crate::validate::validate_answer;

/// Checks a whole submission and returns the rows to persist.
///
/// Nothing is returned unless every answer passes; the first failure is
/// reported with its kind intact. Questions are visited in page/question
/// order so the reported failure is deterministic.
pub fn prepare_submission(questions: &[Question], answers: &[Answer]) -> Result<Vec<ResponseMeta>> {
    let mut live: Vec<&Question> = questions.iter().filter(|q| !q.is_deleted()).collect();
    live.sort_by_key(|question| (question.page_num, question.question_num));

    let mut by_question: BTreeMap<QuestionId, &AnswerBody> = BTreeMap::new();
    for answer in answers {
        if !live.iter().any(|question| question.id == answer.question_id) {
            return Err(SurveyError::RecordNotFound(format!(
                "question {}",
                answer.question_id
            )));
        }
        if by_question.insert(answer.question_id, &answer.body).is_some() {
            return Err(SurveyError::BadRequest(format!(
                "question {} answered more than once",
                answer.question_id
            )));
        }
    }

    let mut rows = Vec::new();
    for question in live {
        let body = by_question.get(&question.id).copied();
        if question.is_required && body.is_none_or(AnswerBody::is_blank) {
            return Err(SurveyError::RequiredAnswerMissing(question.id));
        }
        let Some(body) = body.filter(|body| !body.is_blank()) else {
            continue;
        };

        validate_answer(&question.kind, body).inspect_err(|err| {
            warn!(question_id = %question.id, error = %err, "rejected answer");
        })?;

        match body {
            AnswerBody::Single(value) => rows.push(ResponseMeta {
                question_id: question.id,
                data: value.clone(),
            }),
            AnswerBody::Multiple(selections) => {
                rows.extend(selections.iter().map(|selection| ResponseMeta {
                    question_id: question.id,
                    data: selection.clone(),
                }))
            }
        }
    }

    Ok(rows)
}

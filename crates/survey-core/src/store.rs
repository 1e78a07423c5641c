use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{
    Administrator, Question, QuestionId, Questionnaire, QuestionnaireId, Respondent, Response,
    ResponseId, ResponseMeta, ResponseReadPrivilegeInfo, Target, UserId,
};

/// Failure reported by a persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("no {0} record was updated")]
    NoRecordUpdated(String),
    #[error("no {0} record was deleted")]
    NoRecordDeleted(String),
    #[error("store backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Reads the access gate needs. Implementations must not cache across requests.
pub trait PrivilegeStore {
    fn is_administrator(&self, user: &UserId, questionnaire: QuestionnaireId) -> StoreResult<bool>;

    /// Whether `user` administers the questionnaire that owns `question`.
    fn is_question_administrator(&self, user: &UserId, question: QuestionId) -> StoreResult<bool>;

    /// Whether `user` is the respondent who created `response`.
    fn is_response_owner(&self, user: &UserId, response: ResponseId) -> StoreResult<bool>;

    /// Fails with `NotFound` when the questionnaire is missing or soft-deleted.
    fn read_privilege_by_questionnaire(
        &self,
        user: &UserId,
        questionnaire: QuestionnaireId,
    ) -> StoreResult<ResponseReadPrivilegeInfo>;

    /// Fails with `NotFound` when the response or its questionnaire is missing.
    fn read_privilege_by_response(
        &self,
        user: &UserId,
        response: ResponseId,
    ) -> StoreResult<ResponseReadPrivilegeInfo>;
}

/// Questionnaire and question reads used by submission and listing.
pub trait QuestionnaireStore {
    fn questionnaire(&self, id: QuestionnaireId) -> StoreResult<Questionnaire>;

    /// Questions of a questionnaire ordered by page then question number.
    fn questions(&self, questionnaire: QuestionnaireId) -> StoreResult<Vec<Question>>;

    fn questionnaires(&self) -> StoreResult<Vec<Questionnaire>>;

    fn targets(&self) -> StoreResult<Vec<Target>>;
}

/// Writes one whole submission; must be all-or-nothing.
pub trait ResponseWriter {
    fn insert_submission(
        &mut self,
        questionnaire: QuestionnaireId,
        user: &UserId,
        submitted_at: DateTime<Utc>,
        rows: &[ResponseMeta],
    ) -> StoreResult<ResponseId>;
}

/// Snapshot of records held in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MemoryStore {
    #[serde(default)]
    pub questionnaires: Vec<Questionnaire>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub targets: Vec<Target>,
    #[serde(default)]
    pub administrators: Vec<Administrator>,
    #[serde(default)]
    pub respondents: Vec<Respondent>,
    #[serde(default)]
    pub responses: Vec<Response>,
}

impl MemoryStore {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    fn live_questionnaire(&self, id: QuestionnaireId) -> StoreResult<&Questionnaire> {
        self.questionnaires
            .iter()
            .find(|questionnaire| questionnaire.id == id && !questionnaire.is_deleted())
            .ok_or_else(|| StoreError::NotFound(format!("questionnaire {id}")))
    }

    fn has_submitted(&self, user: &UserId, questionnaire: QuestionnaireId) -> bool {
        self.respondents.iter().any(|respondent| {
            respondent.questionnaire_id == questionnaire
                && respondent.user_id == *user
                && respondent.submitted_at.is_some()
        })
    }

    fn privilege_info(
        &self,
        user: &UserId,
        questionnaire: &Questionnaire,
    ) -> StoreResult<ResponseReadPrivilegeInfo> {
        Ok(ResponseReadPrivilegeInfo {
            res_shared_to: questionnaire.res_shared_to.clone(),
            is_administrator: self.is_administrator(user, questionnaire.id)?,
            is_respondent: self.has_submitted(user, questionnaire.id),
        })
    }
}

impl PrivilegeStore for MemoryStore {
    fn is_administrator(&self, user: &UserId, questionnaire: QuestionnaireId) -> StoreResult<bool> {
        Ok(self
            .administrators
            .iter()
            .any(|admin| admin.questionnaire_id == questionnaire && admin.user_id == *user))
    }

    fn is_question_administrator(&self, user: &UserId, question: QuestionId) -> StoreResult<bool> {
        let Some(question) = self
            .questions
            .iter()
            .find(|candidate| candidate.id == question && !candidate.is_deleted())
        else {
            return Ok(false);
        };
        self.is_administrator(user, question.questionnaire_id)
    }

    fn is_response_owner(&self, user: &UserId, response: ResponseId) -> StoreResult<bool> {
        Ok(self
            .respondents
            .iter()
            .any(|respondent| respondent.response_id == response && respondent.user_id == *user))
    }

    fn read_privilege_by_questionnaire(
        &self,
        user: &UserId,
        questionnaire: QuestionnaireId,
    ) -> StoreResult<ResponseReadPrivilegeInfo> {
        let questionnaire = self.live_questionnaire(questionnaire)?;
        self.privilege_info(user, questionnaire)
    }

    fn read_privilege_by_response(
        &self,
        user: &UserId,
        response: ResponseId,
    ) -> StoreResult<ResponseReadPrivilegeInfo> {
        let respondent = self
            .respondents
            .iter()
            .find(|respondent| respondent.response_id == response)
            .ok_or_else(|| StoreError::NotFound(format!("response {response}")))?;
        let questionnaire = self.live_questionnaire(respondent.questionnaire_id)?;
        self.privilege_info(user, questionnaire)
    }
}

impl QuestionnaireStore for MemoryStore {
    fn questionnaire(&self, id: QuestionnaireId) -> StoreResult<Questionnaire> {
        self.questionnaires
            .iter()
            .find(|questionnaire| questionnaire.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("questionnaire {id}")))
    }

    fn questions(&self, questionnaire: QuestionnaireId) -> StoreResult<Vec<Question>> {
        let mut questions: Vec<Question> = self
            .questions
            .iter()
            .filter(|question| question.questionnaire_id == questionnaire)
            .cloned()
            .collect();
        questions.sort_by_key(|question| (question.page_num, question.question_num));
        Ok(questions)
    }

    fn questionnaires(&self) -> StoreResult<Vec<Questionnaire>> {
        Ok(self.questionnaires.clone())
    }

    fn targets(&self) -> StoreResult<Vec<Target>> {
        Ok(self.targets.clone())
    }
}

impl ResponseWriter for MemoryStore {
    fn insert_submission(
        &mut self,
        questionnaire: QuestionnaireId,
        user: &UserId,
        submitted_at: DateTime<Utc>,
        rows: &[ResponseMeta],
    ) -> StoreResult<ResponseId> {
        let next = self
            .respondents
            .iter()
            .map(|respondent| respondent.response_id.0)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| StoreError::Backend("response id space exhausted".to_string()))?;
        let response_id = ResponseId(next);

        self.respondents.push(Respondent {
            response_id,
            questionnaire_id: questionnaire,
            user_id: user.clone(),
            submitted_at: Some(submitted_at),
        });
        self.responses.extend(rows.iter().map(|row| Response {
            response_id,
            question_id: row.question_id,
            body: row.data.clone(),
        }));

        Ok(response_id)
    }
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{QuestionId, QuestionType, QuestionnaireId};
use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, SurveyError>;

/// Which side of a numeric range an answer fell outside of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BoundSide {
    Below,
    Above,
}

impl std::fmt::Display for BoundSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundSide::Below => f.write_str("below the minimum"),
            BoundSide::Above => f.write_str("above the maximum"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurveyError {
    #[error("res_shared_to '{0}' is not one of public, administrators, respondents")]
    InvalidSharingPolicy(String),
    #[error("caller is not logged in")]
    Unauthorized,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("invalid number: {0}")]
    InvalidNumber(String),
    #[error("number {number} is {side} ({bound})")]
    NumberBoundary {
        number: i64,
        bound: i64,
        side: BoundSide,
    },
    #[error("'{body}' does not match the pattern {pattern}")]
    TextMatching { body: String, pattern: String },
    #[error("'{0}' is not an option of this question")]
    InvalidChoice(String),
    #[error("invalid regex pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("{question_type} questions do not take {side_table}")]
    SideDataMismatch {
        question_type: QuestionType,
        side_table: &'static str,
    },
    #[error("question {0} requires an answer")]
    RequiredAnswerMissing(QuestionId),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("record not found: {0}")]
    RecordNotFound(String),
    #[error("no record updated: {0}")]
    NoRecordUpdated(String),
    #[error("no record deleted: {0}")]
    NoRecordDeleted(String),
    #[error("invalid sort param '{0}'")]
    InvalidSortParam(String),
    #[error("page {page} is past the last page ({last_page})")]
    TooLargePageNum { page: usize, last_page: usize },
    #[error("internal error: {0}")]
    Internal(String),
}

/// Kind tag of a [`SurveyError`], stable for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidSharingPolicy,
    Unauthorized,
    Forbidden,
    InvalidNumber,
    NumberBoundary,
    TextMatching,
    InvalidChoice,
    InvalidPattern,
    SideDataMismatch,
    RequiredAnswerMissing,
    BadRequest,
    RecordNotFound,
    NoRecordUpdated,
    NoRecordDeleted,
    InvalidSortParam,
    TooLargePageNum,
    Internal,
}

/// Status vocabulary of the surrounding HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    InternalServerError,
}

impl Status {
    pub fn code(&self) -> u16 {
        match self {
            Status::BadRequest => 400,
            Status::Unauthorized => 401,
            Status::Forbidden => 403,
            Status::NotFound => 404,
            Status::InternalServerError => 500,
        }
    }
}

impl ErrorKind {
    pub fn status(&self) -> Status {
        match self {
            ErrorKind::Unauthorized => Status::Unauthorized,
            ErrorKind::Forbidden => Status::Forbidden,
            ErrorKind::RecordNotFound => Status::NotFound,
            ErrorKind::InvalidSharingPolicy
            | ErrorKind::InvalidNumber
            | ErrorKind::NumberBoundary
            | ErrorKind::TextMatching
            | ErrorKind::InvalidChoice
            | ErrorKind::InvalidPattern
            | ErrorKind::SideDataMismatch
            | ErrorKind::RequiredAnswerMissing
            | ErrorKind::BadRequest
            | ErrorKind::InvalidSortParam
            | ErrorKind::TooLargePageNum => Status::BadRequest,
            ErrorKind::NoRecordUpdated | ErrorKind::NoRecordDeleted | ErrorKind::Internal => {
                Status::InternalServerError
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidSharingPolicy => "invalid_sharing_policy",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::InvalidNumber => "invalid_number",
            ErrorKind::NumberBoundary => "number_boundary",
            ErrorKind::TextMatching => "text_matching",
            ErrorKind::InvalidChoice => "invalid_choice",
            ErrorKind::InvalidPattern => "invalid_pattern",
            ErrorKind::SideDataMismatch => "side_data_mismatch",
            ErrorKind::RequiredAnswerMissing => "required_answer_missing",
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::RecordNotFound => "record_not_found",
            ErrorKind::NoRecordUpdated => "no_record_updated",
            ErrorKind::NoRecordDeleted => "no_record_deleted",
            ErrorKind::InvalidSortParam => "invalid_sort_param",
            ErrorKind::TooLargePageNum => "too_large_page_num",
            ErrorKind::Internal => "internal",
        }
    }
}

impl SurveyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SurveyError::InvalidSharingPolicy(_) => ErrorKind::InvalidSharingPolicy,
            SurveyError::Unauthorized => ErrorKind::Unauthorized,
            SurveyError::Forbidden(_) => ErrorKind::Forbidden,
            SurveyError::InvalidNumber(_) => ErrorKind::InvalidNumber,
            SurveyError::NumberBoundary { .. } => ErrorKind::NumberBoundary,
            SurveyError::TextMatching { .. } => ErrorKind::TextMatching,
            SurveyError::InvalidChoice(_) => ErrorKind::InvalidChoice,
            SurveyError::InvalidPattern { .. } => ErrorKind::InvalidPattern,
            SurveyError::SideDataMismatch { .. } => ErrorKind::SideDataMismatch,
            SurveyError::RequiredAnswerMissing(_) => ErrorKind::RequiredAnswerMissing,
            SurveyError::BadRequest(_) => ErrorKind::BadRequest,
            SurveyError::RecordNotFound(_) => ErrorKind::RecordNotFound,
            SurveyError::NoRecordUpdated(_) => ErrorKind::NoRecordUpdated,
            SurveyError::NoRecordDeleted(_) => ErrorKind::NoRecordDeleted,
            SurveyError::InvalidSortParam(_) => ErrorKind::InvalidSortParam,
            SurveyError::TooLargePageNum { .. } => ErrorKind::TooLargePageNum,
            SurveyError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Shorthand for `self.kind().status()`.
    pub fn status(&self) -> Status {
        self.kind().status()
    }

    pub(crate) fn questionnaire_not_found(id: QuestionnaireId) -> Self {
        SurveyError::RecordNotFound(format!("questionnaire {id}"))
    }
}

impl From<StoreError> for SurveyError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => SurveyError::RecordNotFound(what),
            StoreError::NoRecordUpdated(what) => SurveyError::NoRecordUpdated(what),
            StoreError::NoRecordDeleted(what) => SurveyError::NoRecordDeleted(what),
            StoreError::Backend(message) => SurveyError::Internal(message),
        }
    }
}

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SurveyError};
use crate::model::ids::{QuestionId, QuestionnaireId, ResponseId, UserId};

/// Who may read the responses and results of a questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResSharedTo {
    /// Any authenticated user.
    Public,
    /// Administrators of the questionnaire only.
    Administrators,
    /// Administrators plus anyone who has submitted.
    Respondents,
}

impl ResSharedTo {
    pub const ALL: [ResSharedTo; 3] = [
        ResSharedTo::Public,
        ResSharedTo::Administrators,
        ResSharedTo::Respondents,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResSharedTo::Public => "public",
            ResSharedTo::Administrators => "administrators",
            ResSharedTo::Respondents => "respondents",
        }
    }
}

impl fmt::Display for ResSharedTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResSharedTo {
    type Err = SurveyError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw {
            "public" => Ok(ResSharedTo::Public),
            "administrators" => Ok(ResSharedTo::Administrators),
            "respondents" => Ok(ResSharedTo::Respondents),
            other => Err(SurveyError::InvalidSharingPolicy(other.to_string())),
        }
    }
}

/// Stored questionnaire row.
///
/// `res_shared_to` keeps the raw column value: an unknown policy is a
/// data-integrity error reported when a decision needs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Questionnaire {
    pub id: QuestionnaireId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub res_time_limit: Option<DateTime<Utc>>,
    pub res_shared_to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Questionnaire {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A user explicitly invited to answer. Says nothing about submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Target {
    pub questionnaire_id: QuestionnaireId,
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Administrator {
    pub questionnaire_id: QuestionnaireId,
    pub user_id: UserId,
}

/// Created when a user submits answers; one row per submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Respondent {
    pub response_id: ResponseId,
    pub questionnaire_id: QuestionnaireId,
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// One answered question of one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Response {
    pub response_id: ResponseId,
    pub question_id: QuestionId,
    pub body: String,
}

/// Privilege-relevant projection of a questionnaire for one caller.
///
/// Built per request and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResponseReadPrivilegeInfo {
    pub res_shared_to: String,
    #[serde(default)]
    pub is_administrator: bool,
    #[serde(default)]
    pub is_respondent: bool,
}

impl ResponseReadPrivilegeInfo {
    pub fn new(res_shared_to: ResSharedTo, is_administrator: bool, is_respondent: bool) -> Self {
        Self {
            res_shared_to: res_shared_to.as_str().to_string(),
            is_administrator,
            is_respondent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_names_round_trip_through_from_str() {
        for policy in ResSharedTo::ALL {
            assert_eq!(policy.as_str().parse::<ResSharedTo>().unwrap(), policy);
        }
    }

    #[test]
    fn unknown_policy_is_a_data_integrity_error() {
        let err = "Public".parse::<ResSharedTo>().unwrap_err();
        assert_eq!(err, SurveyError::InvalidSharingPolicy("Public".into()));
    }
}

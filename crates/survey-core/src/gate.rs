//! Request enforcement in front of mutation and read endpoints.
//!
//! A request moves `Unauthenticated -> Identified -> Authorized | Rejected`.
//! [`identify`] produces the [`Caller`]; every `authorize_*` method either
//! returns an [`Authorized`] token or the rejection. All checks run before
//! any write, so a rejected request has no side effects.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::SuperuserSet;
use crate::error::{Result, SurveyError};
use crate::model::{
    Answer, QuestionId, QuestionnaireId, ResponseId, ResponseMeta, ResponseReadPrivilegeInfo,
    UserId, parse_resource_id,
};
use crate::privilege::PrivilegeResolver;
use crate::store::{PrivilegeStore, QuestionnaireStore, ResponseWriter, StoreError};
use crate::submission::prepare_submission;

/// Identity value the session layer reports for a caller without a token.
pub const NO_IDENTITY: &str = "-";

/// An identified caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    user_id: UserId,
}

impl Caller {
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}

/// Turns the presented identity into a [`Caller`].
pub fn identify(token: Option<&str>) -> Result<Caller> {
    match token.map(str::trim) {
        None | Some("") | Some(NO_IDENTITY) => {
            debug!("request carries no identity");
            Err(SurveyError::Unauthorized)
        }
        Some(user) => Ok(Caller {
            user_id: UserId::from(user),
        }),
    }
}

/// Why a request was let through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    Superuser,
    Administrator,
    ResponseOwner,
    SharingPolicy,
}

impl Grant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grant::Superuser => "superuser",
            Grant::Administrator => "administrator",
            Grant::ResponseOwner => "response_owner",
            Grant::SharingPolicy => "sharing_policy",
        }
    }
}

/// Proof that a request passed the gate for resource `T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authorized<T> {
    id: T,
    grant: Grant,
}

impl<T: Copy> Authorized<T> {
    pub fn id(&self) -> T {
        self.id
    }

    pub fn grant(&self) -> Grant {
        self.grant
    }
}

/// A stored submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    pub response_id: ResponseId,
    pub rows: Vec<ResponseMeta>,
}

pub struct AccessGate<S> {
    store: S,
    resolver: PrivilegeResolver,
}

impl<S> AccessGate<S> {
    pub fn new(store: S, superusers: SuperuserSet) -> Self {
        Self {
            store,
            resolver: PrivilegeResolver::new(superusers),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn superuser_grant(&self, caller: &Caller) -> Option<Grant> {
        self.resolver
            .is_superuser(caller.user_id())
            .then_some(Grant::Superuser)
    }
}

impl<S: PrivilegeStore> AccessGate<S> {
    /// Edit/delete of a questionnaire: administrators and superusers only.
    pub fn authorize_admin_operation(
        &self,
        caller: &Caller,
        raw_questionnaire_id: &str,
    ) -> Result<Authorized<QuestionnaireId>> {
        let id: QuestionnaireId = parse_resource_id(raw_questionnaire_id)?;
        if let Some(grant) = self.superuser_grant(caller) {
            info!(user = %caller.user_id(), questionnaire_id = %id, "superuser administers questionnaire");
            return Ok(Authorized { id, grant });
        }

        let is_admin = self
            .store
            .is_administrator(caller.user_id(), id)
            .map_err(internal)?;
        if !is_admin {
            debug!(user = %caller.user_id(), questionnaire_id = %id, "caller is not an administrator");
            return Err(SurveyError::Forbidden(
                "you are not an administrator of this questionnaire".into(),
            ));
        }
        Ok(Authorized {
            id,
            grant: Grant::Administrator,
        })
    }

    /// Edit/delete of a question: administrators of the owning questionnaire.
    pub fn authorize_question_admin(
        &self,
        caller: &Caller,
        raw_question_id: &str,
    ) -> Result<Authorized<QuestionId>> {
        let id: QuestionId = parse_resource_id(raw_question_id)?;
        if let Some(grant) = self.superuser_grant(caller) {
            info!(user = %caller.user_id(), question_id = %id, "superuser administers question");
            return Ok(Authorized { id, grant });
        }

        let is_admin = self
            .store
            .is_question_administrator(caller.user_id(), id)
            .map_err(internal)?;
        if !is_admin {
            debug!(user = %caller.user_id(), question_id = %id, "caller does not administer question");
            return Err(SurveyError::Forbidden(
                "you are not an administrator of this questionnaire".into(),
            ));
        }
        Ok(Authorized {
            id,
            grant: Grant::Administrator,
        })
    }

    /// Aggregated results of a questionnaire.
    pub fn authorize_result_read(
        &self,
        caller: &Caller,
        raw_questionnaire_id: &str,
    ) -> Result<Authorized<QuestionnaireId>> {
        let id: QuestionnaireId = parse_resource_id(raw_questionnaire_id)?;
        if let Some(grant) = self.superuser_grant(caller) {
            return Ok(Authorized { id, grant });
        }

        let info = self
            .store
            .read_privilege_by_questionnaire(caller.user_id(), id)
            .map_err(projection)?;
        self.check_read(caller, &info)?;
        Ok(Authorized {
            id,
            grant: Grant::SharingPolicy,
        })
    }

    /// One submission: its owner, or anyone the sharing policy admits.
    pub fn authorize_response_read(
        &self,
        caller: &Caller,
        raw_response_id: &str,
    ) -> Result<Authorized<ResponseId>> {
        let id: ResponseId = parse_resource_id(raw_response_id)?;
        if let Some(grant) = self.superuser_grant(caller) {
            return Ok(Authorized { id, grant });
        }

        let is_owner = self
            .store
            .is_response_owner(caller.user_id(), id)
            .map_err(internal)?;
        if is_owner {
            return Ok(Authorized {
                id,
                grant: Grant::ResponseOwner,
            });
        }

        let info = self
            .store
            .read_privilege_by_response(caller.user_id(), id)
            .map_err(projection)?;
        self.check_read(caller, &info)?;
        Ok(Authorized {
            id,
            grant: Grant::SharingPolicy,
        })
    }

    /// Editing or deleting a submission: only the respondent who made it.
    pub fn authorize_response_owner(
        &self,
        caller: &Caller,
        raw_response_id: &str,
    ) -> Result<Authorized<ResponseId>> {
        let id: ResponseId = parse_resource_id(raw_response_id)?;
        let is_owner = self
            .store
            .is_response_owner(caller.user_id(), id)
            .map_err(internal)?;
        if !is_owner {
            debug!(user = %caller.user_id(), response_id = %id, "caller does not own response");
            return Err(SurveyError::Forbidden(
                "you are not the respondent of this response".into(),
            ));
        }
        Ok(Authorized {
            id,
            grant: Grant::ResponseOwner,
        })
    }

    fn check_read(&self, caller: &Caller, info: &ResponseReadPrivilegeInfo) -> Result<()> {
        if self.resolver.can_read(caller.user_id(), info)? {
            Ok(())
        } else {
            Err(SurveyError::Forbidden(
                "responses of this questionnaire are not shared with you".into(),
            ))
        }
    }
}

impl<S: QuestionnaireStore + ResponseWriter> AccessGate<S> {
    /// Validates every answer, then writes the submission in one call.
    pub fn submit(
        &mut self,
        caller: &Caller,
        raw_questionnaire_id: &str,
        answers: &[Answer],
        now: DateTime<Utc>,
    ) -> Result<Submitted> {
        let id: QuestionnaireId = parse_resource_id(raw_questionnaire_id)?;
        let questionnaire = self.store.questionnaire(id)?;
        if questionnaire.is_deleted() {
            return Err(SurveyError::questionnaire_not_found(id));
        }

        let questions = self.store.questions(id)?;
        let rows = prepare_submission(&questions, answers).inspect_err(|err| {
            warn!(user = %caller.user_id(), questionnaire_id = %id, error = %err, "submission rejected");
        })?;

        let response_id = self
            .store
            .insert_submission(id, caller.user_id(), now, &rows)?;
        info!(
            user = %caller.user_id(),
            questionnaire_id = %id,
            response_id = %response_id,
            rows = rows.len(),
            "submission stored"
        );
        Ok(Submitted { response_id, rows })
    }
}

fn internal(err: StoreError) -> SurveyError {
    SurveyError::Internal(err.to_string())
}

// A missing questionnaire or response while building the privilege
// projection is reported as a bad request, not as not-found.
fn projection(err: StoreError) -> SurveyError {
    match err {
        StoreError::NotFound(what) => SurveyError::BadRequest(format!("{what} not found")),
        other => internal(other),
    }
}

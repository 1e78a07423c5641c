use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use survey_core::{
    AccessGate, Answer, AnswerBody, ConfigError, ErrorKind, MemoryStore, PageRequest,
    PrivilegeResolver, Question, QuestionKind, ResponseReadPrivilegeInfo, SortOrder,
    SurveyConfig, SurveyError, TargetFilter, UserId, check_bounds_well_formed, identify,
    list_questionnaires,
};

#[derive(Debug, Error)]
enum ComponentError {
    #[error("failed to parse {0}: {1}")]
    Parse(&'static str, #[source] serde_json::Error),
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Survey(#[from] SurveyError),
}

impl ComponentError {
    fn kind(&self) -> ErrorKind {
        match self {
            ComponentError::Parse(..) => ErrorKind::BadRequest,
            ComponentError::JsonEncode(_) | ComponentError::Config(_) => ErrorKind::Internal,
            ComponentError::Survey(err) => err.kind(),
        }
    }
}

/// Gate operation named by an `authorize` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    Admin,
    QuestionAdmin,
    ResultRead,
    ResponseRead,
    ResponseOwner,
}

#[derive(Debug, Deserialize)]
struct AuthorizeRequest {
    #[serde(default)]
    user: Option<String>,
    operation: Operation,
    id: String,
}

#[derive(Debug, Deserialize)]
struct ListRequest {
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    sort: String,
    #[serde(default)]
    page: Option<String>,
    #[serde(default)]
    filter: TargetFilter,
}

fn parse<T: for<'de> Deserialize<'de>>(what: &'static str, raw: &str) -> Result<T, ComponentError> {
    serde_json::from_str(raw).map_err(|err| ComponentError::Parse(what, err))
}

fn load_config(config_json: &str) -> Result<SurveyConfig, ComponentError> {
    Ok(SurveyConfig::from_json(config_json)?)
}

fn load_store(store_json: &str) -> Result<MemoryStore, ComponentError> {
    MemoryStore::from_json(store_json).map_err(|err| ComponentError::Parse("store", err))
}

fn error_value(err: &ComponentError) -> Value {
    let kind = err.kind();
    json!({
        "error": err.to_string(),
        "kind": kind.as_str(),
        "status": kind.status().code(),
    })
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            error_value(&ComponentError::JsonEncode(error)).to_string()
        }),
        Err(err) => error_value(&err).to_string(),
    }
}

/// Decides read access for a ready-made privilege projection.
pub fn resolve_read_privilege(info_json: &str, user: &str, config_json: &str) -> String {
    respond((|| {
        let info: ResponseReadPrivilegeInfo = parse("privilege info", info_json)?;
        let config = load_config(config_json)?;
        let resolver = PrivilegeResolver::new(config.superusers);
        let allowed = resolver.can_read(&UserId::from(user), &info)?;
        Ok(json!({ "allowed": allowed }))
    })())
}

/// Validates one answer against a question type with its side data.
pub fn validate_answer(question_json: &str, body_json: &str) -> String {
    respond((|| {
        let kind: QuestionKind = parse("question", question_json)?;
        let body: AnswerBody = parse("answer body", body_json)?;
        survey_core::validate_answer(&kind, &body)?;
        Ok(json!({ "valid": true }))
    })())
}

/// Authoring-time bound check for Number questions.
pub fn check_bounds(min_bound: &str, max_bound: &str) -> String {
    respond(
        check_bounds_well_formed(min_bound, max_bound)
            .map(|bounds| json!({ "valid": true, "min": bounds.min, "max": bounds.max }))
            .map_err(ComponentError::from),
    )
}

/// Runs one gate operation against a JSON snapshot of records.
pub fn authorize(store_json: &str, config_json: &str, request_json: &str) -> String {
    respond((|| {
        let request: AuthorizeRequest = parse("request", request_json)?;
        let caller = identify(request.user.as_deref())?;
        let config = load_config(config_json)?;
        let gate = AccessGate::new(load_store(store_json)?, config.superusers);

        let (id, grant) = match request.operation {
            Operation::Admin => {
                let granted = gate.authorize_admin_operation(&caller, &request.id)?;
                (granted.id().0, granted.grant())
            }
            Operation::QuestionAdmin => {
                let granted = gate.authorize_question_admin(&caller, &request.id)?;
                (granted.id().0, granted.grant())
            }
            Operation::ResultRead => {
                let granted = gate.authorize_result_read(&caller, &request.id)?;
                (granted.id().0, granted.grant())
            }
            Operation::ResponseRead => {
                let granted = gate.authorize_response_read(&caller, &request.id)?;
                (granted.id().0, granted.grant())
            }
            Operation::ResponseOwner => {
                let granted = gate.authorize_response_owner(&caller, &request.id)?;
                (granted.id().0, granted.grant())
            }
        };

        Ok(json!({
            "allowed": true,
            "id": id,
            "grant": grant.as_str(),
        }))
    })())
}

/// Checks a whole submission and returns the rows that would be written.
pub fn prepare_submission(questions_json: &str, answers_json: &str) -> String {
    respond((|| {
        let questions: Vec<Question> = parse("questions", questions_json)?;
        let answers: Vec<Answer> = parse("answers", answers_json)?;
        let rows = survey_core::prepare_submission(&questions, &answers)?;
        let rows = serde_json::to_value(rows).map_err(ComponentError::JsonEncode)?;
        Ok(json!({ "rows": rows }))
    })())
}

/// Lists the caller's questionnaire index.
pub fn list(store_json: &str, config_json: &str, request_json: &str) -> String {
    respond((|| {
        let request: ListRequest = parse("request", request_json)?;
        let caller = identify(request.user.as_deref())?;
        let config = load_config(config_json)?;
        let store = load_store(store_json)?;
        let page = list_questionnaires(
            &store,
            &caller,
            request.filter,
            SortOrder::parse(&request.sort)?,
            PageRequest::parse(request.page.as_deref())?,
            config.page_size,
        )?;
        serde_json::to_value(page).map_err(ComponentError::JsonEncode)
    })())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORE: &str = include_str!("../../survey-core/tests/fixtures/survey_store.json");

    fn parsed(payload: &str) -> Value {
        serde_json::from_str(payload).expect("json")
    }

    #[test]
    fn resolve_reports_allowed_flag() {
        let info = json!({ "res_shared_to": "respondents", "is_respondent": true });
        let result = parsed(&resolve_read_privilege(&info.to_string(), "carol", ""));
        assert_eq!(result["allowed"], true);

        let info = json!({ "res_shared_to": "administrators" });
        let result = parsed(&resolve_read_privilege(&info.to_string(), "carol", ""));
        assert_eq!(result["allowed"], false);
    }

    #[test]
    fn resolve_honours_configured_superusers() {
        let info = json!({ "res_shared_to": "administrators" });
        let config = json!({ "superusers": ["ops"] });
        let result = parsed(&resolve_read_privilege(
            &info.to_string(),
            "ops",
            &config.to_string(),
        ));
        assert_eq!(result["allowed"], true);
    }

    #[test]
    fn resolve_surfaces_invalid_sharing_policy() {
        let info = json!({ "res_shared_to": "invalid value", "is_administrator": true });
        let result = parsed(&resolve_read_privilege(&info.to_string(), "alice", ""));
        assert_eq!(result["kind"], "invalid_sharing_policy");
        assert_eq!(result["status"], 400);
    }

    #[test]
    fn validate_answer_reports_kind() {
        let question = json!({
            "question_type": "Number",
            "validation": { "min_bound": "5", "max_bound": "10" }
        });
        let ok = parsed(&validate_answer(&question.to_string(), r#""7""#));
        assert_eq!(ok["valid"], true);

        let below = parsed(&validate_answer(&question.to_string(), r#""3""#));
        assert_eq!(below["kind"], "number_boundary");
        assert_eq!(below["status"], 400);
    }

    #[test]
    fn validate_answer_accepts_checkbox_lists() {
        let question = json!({ "question_type": "Checkbox", "options": ["a", "b"] });
        let ok = parsed(&validate_answer(&question.to_string(), r#"["a","b"]"#));
        assert_eq!(ok["valid"], true);
        let bad = parsed(&validate_answer(&question.to_string(), r#"["c"]"#));
        assert_eq!(bad["kind"], "invalid_choice");
    }

    #[test]
    fn malformed_json_is_a_bad_request() {
        let result = parsed(&validate_answer("{", r#""1""#));
        assert_eq!(result["kind"], "bad_request");
        assert_eq!(result["status"], 400);
    }

    #[test]
    fn check_bounds_returns_parsed_values() {
        let ok = parsed(&check_bounds("1", "9"));
        assert_eq!(ok["min"], 1);
        assert_eq!(ok["max"], 9);
        let inverted = parsed(&check_bounds("10", "5"));
        assert_eq!(inverted["kind"], "invalid_number");
    }

    #[test]
    fn authorize_maps_outcomes_to_status_codes() {
        let request = json!({ "user": "alice", "operation": "admin", "id": "1" });
        let ok = parsed(&authorize(STORE, "", &request.to_string()));
        assert_eq!(ok["allowed"], true);
        assert_eq!(ok["grant"], "administrator");

        let request = json!({ "user": "bob", "operation": "result-read", "id": "1" });
        let forbidden = parsed(&authorize(STORE, "", &request.to_string()));
        assert_eq!(forbidden["status"], 403);

        let request = json!({ "operation": "admin", "id": "1" });
        let anonymous = parsed(&authorize(STORE, "", &request.to_string()));
        assert_eq!(anonymous["status"], 401);

        let request = json!({ "user": "alice", "operation": "response-read", "id": "x" });
        let malformed = parsed(&authorize(STORE, "", &request.to_string()));
        assert_eq!(malformed["status"], 400);
    }

    #[test]
    fn prepare_submission_returns_rows() {
        let questions = json!([{
            "id": 1,
            "questionnaire_id": 1,
            "question_num": 1,
            "body": "Age",
            "is_required": true,
            "question_type": "Number",
            "validation": { "min_bound": "0" }
        }]);
        let answers = json!([{ "question_id": 1, "body": "30" }]);
        let result = parsed(&prepare_submission(
            &questions.to_string(),
            &answers.to_string(),
        ));
        assert_eq!(result["rows"][0]["data"], "30");

        let answers = json!([{ "question_id": 1, "body": "-1" }]);
        let rejected = parsed(&prepare_submission(
            &questions.to_string(),
            &answers.to_string(),
        ));
        assert_eq!(rejected["kind"], "number_boundary");
    }

    #[test]
    fn list_reports_too_large_pages() {
        let request = json!({ "user": "bob", "page": "2" });
        let result = parsed(&list(STORE, "", &request.to_string()));
        assert_eq!(result["kind"], "too_large_page_num");

        let request = json!({ "user": "bob", "filter": "targeted" });
        let page = parsed(&list(STORE, "", &request.to_string()));
        assert_eq!(page["items"].as_array().expect("items").len(), 3);
    }
}

#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod gate;
pub mod listing;
pub mod model;
pub mod privilege;
pub mod registry;
pub mod store;
pub mod submission;
pub mod validate;

pub use config::{ConfigError, SuperuserSet, SurveyConfig};
pub use error::{BoundSide, ErrorKind, Result, Status, SurveyError};
pub use gate::{AccessGate, Authorized, Caller, Grant, NO_IDENTITY, Submitted, identify};
pub use listing::{
    PageRequest, QuestionnairePage, QuestionnaireSummary, SortField, SortOrder, TargetFilter,
    list_questionnaires,
};
pub use model::{
    Answer, AnswerBody, Options, Question, QuestionId, QuestionKind, QuestionType, Questionnaire,
    QuestionnaireId, ResSharedTo, ResponseId, ResponseMeta, ResponseReadPrivilegeInfo, ScaleLabel,
    UserId, Validation, parse_resource_id,
};
pub use privilege::{PrivilegeResolver, resolve};
pub use registry::{QuestionDraft, SideTable, SideTablePlan, plan_side_tables};
pub use store::{
    MemoryStore, PrivilegeStore, QuestionnaireStore, ResponseWriter, StoreError, StoreResult,
};
pub use submission::prepare_submission;
pub use validate::{
    NumberBounds, check_bounds_well_formed, check_choice, check_number, check_scale, check_text,
    validate_answer,
};

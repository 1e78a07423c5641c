pub mod answer;
pub mod ids;
pub mod question;
pub mod questionnaire;

pub use answer::{Answer, AnswerBody, ResponseMeta};
pub use ids::{QuestionId, QuestionnaireId, ResourceId, ResponseId, UserId, parse_resource_id};
pub use question::{
    OptionRow, Options, Question, QuestionKind, QuestionType, ScaleLabel, Validation,
};
pub use questionnaire::{
    Administrator, Questionnaire, ResSharedTo, Respondent, Response, ResponseReadPrivilegeInfo,
    Target,
};

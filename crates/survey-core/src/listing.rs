use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SurveyError};
use crate::gate::Caller;
use crate::model::{Questionnaire, QuestionnaireId};
use crate::store::QuestionnaireStore;

/// Target name that stands for every member.
pub const ALL_MEMBERS_GROUP: &str = "traP";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    CreatedAt,
    Title,
    ModifiedAt,
}

/// Parsed `sort` query parameter. A leading `-` means descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortOrder {
    pub field: Option<SortField>,
    pub descending: bool,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Result<Self> {
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let field = match name {
            "" if !descending => return Ok(Self::default()),
            "created_at" => SortField::CreatedAt,
            "title" => SortField::Title,
            "modified_at" => SortField::ModifiedAt,
            _ => return Err(SurveyError::InvalidSortParam(raw.to_string())),
        };
        Ok(Self {
            field: Some(field),
            descending,
        })
    }

    fn sort(&self, items: &mut [QuestionnaireSummary]) {
        match self.field {
            // Unsorted requests list the most recently modified first.
            None => items.sort_by(|a, b| b.modified_at.cmp(&a.modified_at).then(a.id.cmp(&b.id))),
            Some(field) => {
                items.sort_by(|a, b| {
                    let ordering = match field {
                        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                        SortField::Title => a.title.cmp(&b.title),
                        SortField::ModifiedAt => a.modified_at.cmp(&b.modified_at),
                    };
                    let ordering = if self.descending {
                        ordering.reverse()
                    } else {
                        ordering
                    };
                    ordering.then(a.id.cmp(&b.id))
                });
            }
        }
    }
}

/// 1-based page number from the `page` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest(usize);

impl PageRequest {
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        let raw = raw.unwrap_or("").trim();
        if raw.is_empty() {
            return Ok(Self(1));
        }
        match raw.parse::<usize>() {
            Ok(0) | Err(_) => Err(SurveyError::BadRequest(format!("invalid page '{raw}'"))),
            Ok(page) => Ok(Self(page)),
        }
    }

    pub fn number(&self) -> usize {
        self.0
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TargetFilter {
    #[default]
    All,
    Targeted,
    Nontargeted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionnaireSummary {
    pub id: QuestionnaireId,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub res_time_limit: Option<DateTime<Utc>>,
    pub res_shared_to: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub is_targeted: bool,
}

impl QuestionnaireSummary {
    fn new(questionnaire: Questionnaire, is_targeted: bool) -> Self {
        Self {
            id: questionnaire.id,
            title: questionnaire.title,
            description: questionnaire.description,
            res_time_limit: questionnaire.res_time_limit,
            res_shared_to: questionnaire.res_shared_to,
            created_at: questionnaire.created_at,
            modified_at: questionnaire.modified_at,
            is_targeted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionnairePage {
    pub page: usize,
    pub last_page: usize,
    pub items: Vec<QuestionnaireSummary>,
}

/// Lists live questionnaires visible in the caller's index.
pub fn list_questionnaires<S: QuestionnaireStore>(
    store: &S,
    caller: &Caller,
    filter: TargetFilter,
    sort: SortOrder,
    page: PageRequest,
    page_size: usize,
) -> Result<QuestionnairePage> {
    let page_size = page_size.max(1);
    let targets = store.targets()?;
    let is_targeted = |id: QuestionnaireId| {
        targets.iter().any(|target| {
            target.questionnaire_id == id
                && (target.user_id == *caller.user_id()
                    || target.user_id.as_str() == ALL_MEMBERS_GROUP)
        })
    };

    let mut items: Vec<QuestionnaireSummary> = store
        .questionnaires()?
        .into_iter()
        .filter(|questionnaire| !questionnaire.is_deleted())
        .map(|questionnaire| {
            let targeted = is_targeted(questionnaire.id);
            QuestionnaireSummary::new(questionnaire, targeted)
        })
        .filter(|summary| match filter {
            TargetFilter::All => true,
            TargetFilter::Targeted => summary.is_targeted,
            TargetFilter::Nontargeted => !summary.is_targeted,
        })
        .collect();

    sort.sort(&mut items);

    let last_page = items.len().div_ceil(page_size).max(1);
    if page.number() > last_page {
        return Err(SurveyError::TooLargePageNum {
            page: page.number(),
            last_page,
        });
    }

    let items = items
        .into_iter()
        .skip((page.number() - 1) * page_size)
        .take(page_size)
        .collect();

    Ok(QuestionnairePage {
        page: page.number(),
        last_page,
        items,
    })
}

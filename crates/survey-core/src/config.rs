use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::UserId;

pub const SUPERUSERS_ENV: &str = "SURVEY_SUPERUSERS";
pub const PAGE_SIZE_ENV: &str = "SURVEY_PAGE_SIZE";
pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// Operators allowed to manage and read every questionnaire.
///
/// Membership bypasses ownership and sharing-policy checks entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SuperuserSet(BTreeSet<UserId>);

impl SuperuserSet {
    pub fn new<I, U>(users: I) -> Self
    where
        I: IntoIterator<Item = U>,
        U: Into<UserId>,
    {
        Self(users.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, user: &UserId) -> bool {
        self.0.contains(user)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Parses a comma-separated list, trimming whitespace and dropping blanks.
    pub fn parse_list(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|user| !user.is_empty())
                .map(UserId::from)
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SurveyConfig {
    #[serde(default)]
    pub superusers: SuperuserSet,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            superusers: SuperuserSet::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SurveyConfig {
    /// Reads the optional JSON file, then applies process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let env: HashMap<String, String> = std::env::vars().collect();
        base.with_overrides(&env)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_json::from_str(raw)?;
        config.validated()
    }

    /// Builds a config from defaults plus an explicit key/value map.
    pub fn from_kv(kv: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::default().with_overrides(kv)
    }

    pub fn with_overrides(mut self, kv: &HashMap<String, String>) -> Result<Self, ConfigError> {
        if let Some(raw) = kv.get(SUPERUSERS_ENV) {
            self.superusers = SuperuserSet::parse_list(raw);
        }
        if let Some(raw) = kv.get(PAGE_SIZE_ENV) {
            self.page_size = raw
                .trim()
                .parse::<usize>()
                .map_err(|err| ConfigError::InvalidValue {
                    key: PAGE_SIZE_ENV,
                    message: err.to_string(),
                })?;
        }
        self.validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "page_size",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(self)
    }
}

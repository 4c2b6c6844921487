//! Templates, drafts, AI-model records and the content quality rules.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const DEFAULT_TEMPLATE_CATEGORY: &str = "General";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModelType {
    Gpt4Turbo,
    CustomChecker,
}

impl ModelType {
    pub const ALL: [ModelType; 2] = [ModelType::Gpt4Turbo, ModelType::CustomChecker];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Gpt4Turbo => "GPT_4_TURBO",
            ModelType::CustomChecker => "CUSTOM_CHECKER",
        }
    }

    /// Human-facing model name, e.g. `gpt-4-turbo`.
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelType::Gpt4Turbo => "gpt-4-turbo",
            ModelType::CustomChecker => "custom-checker",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ModelType::Gpt4Turbo => "Primary model for drafting cold email content",
            ModelType::CustomChecker => "Secondary model that reviews generated content",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "GPT_4_TURBO" => Ok(ModelType::Gpt4Turbo),
            "CUSTOM_CHECKER" => Ok(ModelType::CustomChecker),
            other => Err(CoreError::UnknownVariant {
                kind: "model type",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DraftStatus {
    Generated,
    Edited,
    Finalized,
}

impl DraftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftStatus::Generated => "GENERATED",
            DraftStatus::Edited => "EDITED",
            DraftStatus::Finalized => "FINALIZED",
        }
    }
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DraftStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "GENERATED" => Ok(DraftStatus::Generated),
            "EDITED" => Ok(DraftStatus::Edited),
            "FINALIZED" => Ok(DraftStatus::Finalized),
            other => Err(CoreError::UnknownVariant {
                kind: "draft status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateTemplateParams {
    pub title: String,
    pub content: String,
    pub category: String,
}

impl CreateTemplateParams {
    /// Category comes from `metadata["category"]` when present and non-blank.
    pub fn from_metadata(
        title: String,
        content: String,
        metadata: &HashMap<String, String>,
    ) -> Self {
        let category = metadata
            .get("category")
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_TEMPLATE_CATEGORY)
            .to_string();
        Self {
            title,
            content,
            category,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpdateTemplateParams {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Anything other than `asc` (case-insensitive) sorts newest first.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TemplateQuery {
    pub page: Page,
    pub category: Option<String>,
    pub sort: SortOrder,
}

/// 1-based page with a clamped size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub limit: i64,
}

impl Page {
    pub const MAX_LIMIT: i64 = 100;
    /// Highest page whose offset fits in an `i64` at any allowed limit.
    pub const MAX_NUMBER: i64 = i64::MAX / Self::MAX_LIMIT;

    pub fn new(number: Option<i64>, limit: Option<i64>, default_limit: i64) -> Self {
        Self {
            number: number.unwrap_or(1).clamp(1, Self::MAX_NUMBER),
            limit: limit.unwrap_or(default_limit).clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1).saturating_mul(self.limit)
    }
}

pub fn total_pages(total: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    pub id: String,
    pub user_id: String,
    pub model_id: Option<String>,
    pub content: String,
    pub status: DraftStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Draft {
    pub fn is_editable(&self) -> bool {
        self.status != DraftStatus::Finalized
    }
}

#[derive(Debug, Clone)]
pub struct CreateDraftParams {
    pub user_id: String,
    pub model_id: Option<String>,
    pub content: String,
    pub status: DraftStatus,
}

/// Partial draft update. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateDraftParams {
    pub content: Option<String>,
    pub status: Option<DraftStatus>,
    pub model_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiModel {
    pub id: String,
    pub name: String,
    pub description: String,
    pub model_type: ModelType,
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

/// A reviewer note attached to a draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edit {
    pub id: String,
    pub draft_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFeedback {
    pub id: String,
    pub model_id: String,
    pub metric_name: String,
    pub value: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Inputs the writer supplies when asking for generated content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentParameters {
    pub intro: String,
    pub context: String,
    pub closing: String,
}

impl ContentParameters {
    pub fn compose(&self) -> String {
        format!("{}\n{}\n{}", self.intro, self.context, self.closing)
    }
}

pub const MIN_CONTENT_CHARS: usize = 100;
pub const GENERIC_GREETING: &str = "Dear Partner";
pub const SUGGEST_PERSONALIZE: &str =
    "Consider personalizing the greeting with the recipient's name.";
pub const ERROR_TOO_SHORT: &str =
    "Content is too short, consider adding more detailed information.";
pub const ERROR_CHECKER_FAILED: &str = "Content validation failed by the AI model standards.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentValidation {
    pub is_valid: bool,
    pub error_messages: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Apply the static quality rules to `content`.
///
/// Errors only invalidate the content when a `CUSTOM_CHECKER` model is
/// registered; without one everything passes with its warnings attached.
pub fn validate_content(content: &str, checker_available: bool) -> ContentValidation {
    let mut error_messages = Vec::new();
    let mut suggestions = Vec::new();

    if content.contains(GENERIC_GREETING) {
        suggestions.push(SUGGEST_PERSONALIZE.to_string());
    }
    if content.chars().count() < MIN_CONTENT_CHARS {
        error_messages.push(ERROR_TOO_SHORT.to_string());
    }

    let is_valid = !checker_available || error_messages.is_empty();
    if !is_valid {
        error_messages.push(ERROR_CHECKER_FAILED.to_string());
    }

    ContentValidation {
        is_valid,
        error_messages,
        suggestions,
    }
}

use crate::error::{Result, TaskgenError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    #[default]
    Web,
    Mobile,
    Internal,
}

impl Template {
    pub fn all() -> &'static [Template] {
        &[Template::Web, Template::Mobile, Template::Internal]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Template::Web => "web",
            Template::Mobile => "mobile",
            Template::Internal => "internal",
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Template {
    type Err = TaskgenError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "web" => Ok(Template::Web),
            "mobile" => Ok(Template::Mobile),
            "internal" => Ok(Template::Internal),
            _ => Err(TaskgenError::Validation(format!("unknown template: {s}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectRequest
// ---------------------------------------------------------------------------

/// Input describing a feature to expand into stories and tasks.
///
/// `template` keeps the caller's raw text so that an unrecognized value is
/// recorded as given; [`ProjectRequest::template_kind`] is what the generator
/// consults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRequest {
    pub goal: String,
    pub users: String,
    pub template: String,
    pub constraints: Option<String>,
    pub risks: Option<String>,
}

impl ProjectRequest {
    pub fn new(goal: impl Into<String>, users: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            users: users.into(),
            template: Template::default().as_str().to_string(),
            constraints: None,
            risks: None,
        }
    }

    /// Build a request from loosely-typed input, as received over HTTP or the
    /// command line. Missing `goal`/`users` become empty strings and are
    /// rejected later by [`ProjectRequest::validate`].
    pub fn from_parts(
        goal: Option<String>,
        users: Option<String>,
        template: Option<String>,
        constraints: Option<String>,
        risks: Option<String>,
    ) -> Self {
        Self {
            goal: goal.unwrap_or_default(),
            users: users.unwrap_or_default(),
            template: normalize_template(template.as_deref()),
            constraints,
            risks,
        }
    }

    pub fn with_template(mut self, template: impl AsRef<str>) -> Self {
        self.template = normalize_template(Some(template.as_ref()));
        self
    }

    pub fn with_constraints(mut self, constraints: impl Into<String>) -> Self {
        self.constraints = Some(constraints.into());
        self
    }

    pub fn with_risks(mut self, risks: impl Into<String>) -> Self {
        self.risks = Some(risks.into());
        self
    }

    /// The recognized template, or `None` for free-form values.
    pub fn template_kind(&self) -> Option<Template> {
        self.template.parse().ok()
    }

    /// Constraint text when present and non-blank.
    pub fn constraints_text(&self) -> Option<&str> {
        non_blank(self.constraints.as_deref())
    }

    /// Risk text when present and non-blank.
    pub fn risks_text(&self) -> Option<&str> {
        non_blank(self.risks.as_deref())
    }

    pub fn validate(&self) -> Result<()> {
        if self.goal.trim().is_empty() || self.users.trim().is_empty() {
            return Err(TaskgenError::Validation(
                "Goal and users are required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Absent or blank template text falls back to `web`; anything else is kept.
pub fn normalize_template(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => Template::default().as_str().to_string(),
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// GeneratedSpec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSpec {
    pub stories: Vec<String>,
    pub tasks: Vec<String>,
}

// ---------------------------------------------------------------------------
// HistoryRecord
// ---------------------------------------------------------------------------

/// A persisted, timestamped request and the spec generated from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub goal: String,
    pub users: String,
    #[serde(default)]
    pub constraints: Option<String>,
    pub template: String,
    #[serde(default)]
    pub risks: Option<String>,
    pub stories: Vec<String>,
    pub tasks: Vec<String>,
}

impl HistoryRecord {
    pub fn new(
        id: u64,
        created_at: DateTime<Utc>,
        request: ProjectRequest,
        spec: GeneratedSpec,
    ) -> Self {
        Self {
            id,
            created_at,
            goal: request.goal,
            users: request.users,
            constraints: request.constraints,
            template: request.template,
            risks: request.risks,
            stories: spec.stories,
            tasks: spec.tasks,
        }
    }
}

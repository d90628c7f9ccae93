use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Issue model - one tracked unit of work within a project
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Issue {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub project: String,
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub assigned_to: String,
    pub status_text: String,
    pub open: bool,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

/// Response for API
///
/// `project` is only present on the create response; listings hide it.
#[derive(Debug, Serialize)]
pub struct IssueResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub assigned_to: String,
    pub status_text: String,
    pub open: bool,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl Issue {
    /// Converts to the default projection (no `project`)
    pub fn to_response(&self) -> IssueResponse {
        IssueResponse {
            id: self.id,
            project: None,
            issue_title: self.issue_title.clone(),
            issue_text: self.issue_text.clone(),
            created_by: self.created_by.clone(),
            assigned_to: self.assigned_to.clone(),
            status_text: self.status_text.clone(),
            open: self.open,
            created_on: self.created_on,
            updated_on: self.updated_on,
        }
    }

    /// Converts to the full record, `project` included
    pub fn to_full_response(&self) -> IssueResponse {
        IssueResponse {
            project: Some(self.project.clone()),
            ..self.to_response()
        }
    }

    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::IssueTitle => &self.issue_title,
            TextField::IssueText => &self.issue_text,
            TextField::CreatedBy => &self.created_by,
            TextField::AssignedTo => &self.assigned_to,
            TextField::StatusText => &self.status_text,
        }
    }

    fn text_mut(&mut self, field: TextField) -> &mut String {
        match field {
            TextField::IssueTitle => &mut self.issue_title,
            TextField::IssueText => &mut self.issue_text,
            TextField::CreatedBy => &mut self.created_by,
            TextField::AssignedTo => &mut self.assigned_to,
            TextField::StatusText => &mut self.status_text,
        }
    }
}

/// Client-writable string attributes of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TextField {
    IssueTitle,
    IssueText,
    CreatedBy,
    AssignedTo,
    StatusText,
}

impl TextField {
    pub const ALL: [TextField; 5] = [
        TextField::IssueTitle,
        TextField::IssueText,
        TextField::CreatedBy,
        TextField::AssignedTo,
        TextField::StatusText,
    ];

    /// Column and wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            TextField::IssueTitle => "issue_title",
            TextField::IssueText => "issue_text",
            TextField::CreatedBy => "created_by",
            TextField::AssignedTo => "assigned_to",
            TextField::StatusText => "status_text",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

impl std::fmt::Display for TextField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// DTO for creating a new issue
///
/// Required fields are optional here so that a missing field surfaces as a
/// validation error instead of a body parse failure. Keys outside this list
/// (`_id`, `project`, timestamps) are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct CreateIssue {
    #[serde(default)]
    pub issue_title: Option<String>,
    #[serde(default)]
    pub issue_text: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub status_text: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub open: Option<bool>,
}

/// Validated issue ready to be persisted
///
/// The store assigns `id`, `created_on` and `updated_on`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIssue {
    pub project: String,
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub assigned_to: String,
    pub status_text: String,
    pub open: bool,
}

/// DTO for a partial update
#[derive(Debug, Default, Deserialize)]
pub struct UpdateIssue {
    #[serde(rename = "_id", default, deserialize_with = "deserialize_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub issue_title: Option<String>,
    #[serde(default)]
    pub issue_text: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub status_text: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub open: Option<bool>,
}

impl UpdateIssue {
    /// Splits the request into the target id and the fields to change
    ///
    /// Blank strings count as not sent: HTML forms submit every input.
    pub fn into_parts(self) -> (Option<String>, IssuePatch) {
        let mut patch = IssuePatch {
            open: self.open,
            ..IssuePatch::default()
        };

        let fields = [
            (TextField::IssueTitle, self.issue_title),
            (TextField::IssueText, self.issue_text),
            (TextField::CreatedBy, self.created_by),
            (TextField::AssignedTo, self.assigned_to),
            (TextField::StatusText, self.status_text),
        ];
        for (field, value) in fields {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                patch.text.insert(field, value);
            }
        }

        let id = self.id.filter(|id| !id.is_empty());
        (id, patch)
    }
}

/// DTO for deleting an issue
#[derive(Debug, Default, Deserialize)]
pub struct DeleteIssue {
    #[serde(rename = "_id", default, deserialize_with = "deserialize_id")]
    pub id: Option<String>,
}

/// Fields changed by an update. `project`, `id` and timestamps are not
/// patchable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssuePatch {
    pub text: BTreeMap<TextField, String>,
    pub open: Option<bool>,
}

impl IssuePatch {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.open.is_none()
    }

    /// Applies the supplied fields; `updated_on` is the caller's business
    pub fn apply_to(&self, issue: &mut Issue) {
        for (field, value) in &self.text {
            *issue.text_mut(*field) = value.clone();
        }
        if let Some(open) = self.open {
            issue.open = open;
        }
    }
}

/// Outcome of a successful update or delete
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationResult {
    pub result: &'static str,
    #[serde(rename = "_id")]
    pub id: String,
}

/// Accepts an identifier as a string or a bare JSON number. Numbers never
/// name a stored issue, they simply fail the lookup like any other id.
fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        None => None,
        Some(RawId::Text(s)) => Some(s),
        Some(RawId::Number(n)) => Some(n.to_string()),
    })
}

/// Accepts `true`/`false` as JSON booleans or as strings (form bodies).
/// An empty string means the flag was not sent.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Flag::Bool(b)) => Ok(Some(b)),
        Some(Flag::Text(s)) => match s.as_str() {
            "" => Ok(None),
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            other => Err(serde::de::Error::custom(format!(
                "invalid value for open: '{}'",
                other
            ))),
        },
    }
}

//! Typed list filters.
//!
//! Query strings only carry text, so each known field is coerced to its
//! declared type before it reaches a store. A value that cannot be coerced,
//! or a field the issue does not have, can never match a stored record and
//! turns the whole filter unsatisfiable instead of failing the request.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::issue::{Issue, TextField};

/// One equality condition on an issue attribute
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Id(Uuid),
    Text(TextField, String),
    Open(bool),
    CreatedOn(DateTime<Utc>),
    UpdatedOn(DateTime<Utc>),
}

impl Condition {
    pub fn matches(&self, issue: &Issue) -> bool {
        match self {
            Condition::Id(id) => issue.id == *id,
            Condition::Text(field, value) => issue.text(*field) == value,
            Condition::Open(open) => issue.open == *open,
            Condition::CreatedOn(ts) => issue.created_on == *ts,
            Condition::UpdatedOn(ts) => issue.updated_on == *ts,
        }
    }
}

/// Conjunction of equality conditions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueFilter {
    conditions: Vec<Condition>,
    unsatisfiable: bool,
}

impl IssueFilter {
    /// Builds a filter from raw query pairs
    ///
    /// `project` is skipped: the path segment always scopes a listing.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut filter = Self::default();
        for (key, value) in pairs {
            filter.push(key.as_ref(), value.into());
        }
        filter
    }

    fn push(&mut self, key: &str, value: String) {
        let condition = match key {
            "project" => return,
            "_id" => Uuid::parse_str(&value).ok().map(Condition::Id),
            "open" => match value.as_str() {
                "true" => Some(Condition::Open(true)),
                "false" => Some(Condition::Open(false)),
                _ => None,
            },
            "created_on" => parse_timestamp(&value).map(Condition::CreatedOn),
            "updated_on" => parse_timestamp(&value).map(Condition::UpdatedOn),
            other => match TextField::parse(other) {
                Some(field) => Some(Condition::Text(field, value)),
                None => {
                    log::debug!("Filter on unknown field {} can never match", other);
                    None
                }
            },
        };

        match condition {
            Some(condition) => self.conditions.push(condition),
            None => self.unsatisfiable = true,
        }
    }

    pub fn with(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// True when no record can satisfy the filter
    pub fn is_unsatisfiable(&self) -> bool {
        self.unsatisfiable
    }

    pub fn matches(&self, issue: &Issue) -> bool {
        !self.unsatisfiable && self.conditions.iter().all(|c| c.matches(issue))
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// A listing request: project scope plus filter
#[derive(Debug, Clone, PartialEq)]
pub struct IssueQuery {
    pub project: String,
    pub filter: IssueFilter,
}

impl IssueQuery {
    pub fn new(project: impl Into<String>, filter: IssueFilter) -> Self {
        Self {
            project: project.into(),
            filter,
        }
    }

    pub fn matches(&self, issue: &Issue) -> bool {
        issue.project == self.project && self.filter.matches(issue)
    }
}

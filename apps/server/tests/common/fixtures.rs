//! Test fixtures and data builders

use std::sync::Arc;

use actix_web::web;
use issuetracker::store::{IssueStore, MemoryIssueStore};
use serde_json::{json, Value};

/// Fresh in-memory store, shaped for `App::app_data`
pub fn memory_store() -> web::Data<dyn IssueStore> {
    let store: Arc<dyn IssueStore> = Arc::new(MemoryIssueStore::new());
    web::Data::from(store)
}

/// Builds issue creation bodies with sensible defaults
pub struct IssueBuilder {
    issue_title: Option<String>,
    issue_text: Option<String>,
    created_by: Option<String>,
    assigned_to: Option<String>,
    status_text: Option<String>,
}

impl Default for IssueBuilder {
    fn default() -> Self {
        Self {
            issue_title: Some("Issue 1".to_string()),
            issue_text: Some("There is an issue".to_string()),
            created_by: Some("Wunderwaffe".to_string()),
            assigned_to: None,
            status_text: None,
        }
    }
}

#[allow(dead_code)]
impl IssueBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.issue_title = Some(title.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.issue_text = Some(text.to_string());
        self
    }

    pub fn with_created_by(mut self, created_by: &str) -> Self {
        self.created_by = Some(created_by.to_string());
        self
    }

    pub fn with_assigned_to(mut self, assigned_to: &str) -> Self {
        self.assigned_to = Some(assigned_to.to_string());
        self
    }

    pub fn with_status_text(mut self, status_text: &str) -> Self {
        self.status_text = Some(status_text.to_string());
        self
    }

    pub fn without_title(mut self) -> Self {
        self.issue_title = None;
        self
    }

    pub fn without_text(mut self) -> Self {
        self.issue_text = None;
        self
    }

    pub fn without_created_by(mut self) -> Self {
        self.created_by = None;
        self
    }

    pub fn build(self) -> Value {
        let mut issue = json!({});

        if let Some(t) = self.issue_title {
            issue["issue_title"] = json!(t);
        }
        if let Some(t) = self.issue_text {
            issue["issue_text"] = json!(t);
        }
        if let Some(c) = self.created_by {
            issue["created_by"] = json!(c);
        }
        if let Some(a) = self.assigned_to {
            issue["assigned_to"] = json!(a);
        }
        if let Some(s) = self.status_text {
            issue["status_text"] = json!(s);
        }

        issue
    }
}

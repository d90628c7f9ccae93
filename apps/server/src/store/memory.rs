use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{next_updated_on, now, IssueStore, StoreResult};
use crate::models::{Issue, IssuePatch, IssueQuery, NewIssue};

/// Process-local issue store
///
/// Issues live in a vector, so iteration order is insertion order.
#[derive(Debug, Default)]
pub struct MemoryIssueStore {
    issues: RwLock<Vec<Issue>>,
}

impl MemoryIssueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.issues.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.issues.read().await.is_empty()
    }
}

#[async_trait]
impl IssueStore for MemoryIssueStore {
    async fn insert(&self, issue: NewIssue) -> StoreResult<Issue> {
        let timestamp = now();
        let issue = Issue {
            id: Uuid::new_v4(),
            project: issue.project,
            issue_title: issue.issue_title,
            issue_text: issue.issue_text,
            created_by: issue.created_by,
            assigned_to: issue.assigned_to,
            status_text: issue.status_text,
            open: issue.open,
            created_on: timestamp,
            updated_on: timestamp,
        };

        self.issues.write().await.push(issue.clone());
        Ok(issue)
    }

    async fn find_many(&self, query: &IssueQuery) -> StoreResult<Vec<Issue>> {
        if query.filter.is_unsatisfiable() {
            return Ok(Vec::new());
        }

        let issues = self.issues.read().await;
        Ok(issues.iter().filter(|i| query.matches(i)).cloned().collect())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Issue>> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let issues = self.issues.read().await;
        Ok(issues.iter().find(|i| i.id == id).cloned())
    }

    async fn patch_by_id(&self, id: &str, patch: &IssuePatch) -> StoreResult<()> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(());
        };

        let mut issues = self.issues.write().await;
        if let Some(issue) = issues.iter_mut().find(|i| i.id == id) {
            patch.apply_to(issue);
            issue.updated_on = next_updated_on(issue.updated_on);
        }
        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<()> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(());
        };

        self.issues.write().await.retain(|i| i.id != id);
        Ok(())
    }

    async fn ping(&self) -> bool {
        true
    }
}

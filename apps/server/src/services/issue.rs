use crate::error::{AppError, AppResult};
use crate::models::{
    CreateIssue, DeleteIssue, Issue, IssueFilter, IssueQuery, MutationResult, NewIssue,
    UpdateIssue,
};
use crate::store::IssueStore;

pub const REQUIRED_FIELDS_MISSING: &str = "required field(s) missing";
pub const MISSING_ID: &str = "missing _id";
pub const NO_UPDATE_FIELDS: &str = "no update field(s) sent";
pub const COULD_NOT_UPDATE: &str = "could not update";
pub const COULD_NOT_DELETE: &str = "could not delete";
pub const SUCCESSFULLY_UPDATED: &str = "successfully updated";
pub const SUCCESSFULLY_DELETED: &str = "successfully deleted";

pub struct IssueService;

impl IssueService {
    /// Lists a project's issues matching every filter condition
    pub async fn list(
        store: &dyn IssueStore,
        project: &str,
        filter: IssueFilter,
    ) -> AppResult<Vec<Issue>> {
        let query = IssueQuery::new(project, filter);
        let issues = store.find_many(&query).await?;

        log::debug!(
            "Listed {} issue(s) for project {} ({} condition(s))",
            issues.len(),
            project,
            query.filter.conditions().len()
        );

        Ok(issues)
    }

    /// Creates a new issue in the project
    ///
    /// Nothing is written unless the title, text and author are present
    /// and non-empty.
    pub async fn create(
        store: &dyn IssueStore,
        project: &str,
        input: CreateIssue,
    ) -> AppResult<Issue> {
        let new_issue = Self::validate_new_issue(project, input)?;
        let issue = store.insert(new_issue).await?;

        log::info!("Created issue {} in project {}", issue.id, issue.project);

        Ok(issue)
    }

    /// Checks required fields and fills defaults
    pub fn validate_new_issue(project: &str, input: CreateIssue) -> AppResult<NewIssue> {
        fn required(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }

        if project.is_empty() {
            return Err(AppError::validation(REQUIRED_FIELDS_MISSING));
        }

        match (
            required(input.issue_title),
            required(input.issue_text),
            required(input.created_by),
        ) {
            (Some(issue_title), Some(issue_text), Some(created_by)) => Ok(NewIssue {
                project: project.to_string(),
                issue_title,
                issue_text,
                created_by,
                assigned_to: input.assigned_to.unwrap_or_default(),
                status_text: input.status_text.unwrap_or_default(),
                open: input.open.unwrap_or(true),
            }),
            _ => Err(AppError::validation(REQUIRED_FIELDS_MISSING)),
        }
    }

    /// Applies a partial update to an issue of the project
    ///
    /// Checks run in order: `_id` present, at least one field to change,
    /// issue exists in this project. Store failures on this path are
    /// reported as "could not update".
    pub async fn update(
        store: &dyn IssueStore,
        project: &str,
        input: UpdateIssue,
    ) -> AppResult<MutationResult> {
        let (id, patch) = input.into_parts();
        let id = id.ok_or_else(|| AppError::validation(MISSING_ID))?;

        if patch.is_empty() {
            return Err(AppError::validation_for(NO_UPDATE_FIELDS, id));
        }

        if !Self::exists_in_project(store, project, &id).await {
            return Err(AppError::not_found(COULD_NOT_UPDATE, id));
        }

        if let Err(e) = store.patch_by_id(&id, &patch).await {
            log::warn!("Failed to update issue {}: {}", id, e);
            return Err(AppError::not_found(COULD_NOT_UPDATE, id));
        }

        log::info!(
            "Updated issue {} in project {} ({} field(s))",
            id,
            project,
            patch.text.len() + usize::from(patch.open.is_some())
        );

        Ok(MutationResult {
            result: SUCCESSFULLY_UPDATED,
            id,
        })
    }

    /// Permanently deletes an issue of the project
    pub async fn remove(
        store: &dyn IssueStore,
        project: &str,
        input: DeleteIssue,
    ) -> AppResult<MutationResult> {
        let id = input
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::validation(MISSING_ID))?;

        if !Self::exists_in_project(store, project, &id).await {
            return Err(AppError::not_found(COULD_NOT_DELETE, id));
        }

        if let Err(e) = store.delete_by_id(&id).await {
            log::warn!("Failed to delete issue {}: {}", id, e);
            return Err(AppError::not_found(COULD_NOT_DELETE, id));
        }

        log::info!("Deleted issue {} from project {}", id, project);

        Ok(MutationResult {
            result: SUCCESSFULLY_DELETED,
            id,
        })
    }

    /// Resolves `id` within the project. Lookup failures count as absent.
    async fn exists_in_project(store: &dyn IssueStore, project: &str, id: &str) -> bool {
        match store.find_by_id(id).await {
            Ok(Some(issue)) => issue.project == project,
            Ok(None) => false,
            Err(e) => {
                log::warn!("Failed to look up issue {}: {}", id, e);
                false
            }
        }
    }
}

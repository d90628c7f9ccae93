pub mod filter;
pub mod issue;

pub use filter::{Condition, IssueFilter, IssueQuery};
pub use issue::{
    CreateIssue, DeleteIssue, Issue, IssuePatch, IssueResponse, MutationResult, NewIssue,
    TextField, UpdateIssue,
};

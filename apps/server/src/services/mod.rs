pub mod issue;

pub use issue::IssueService;

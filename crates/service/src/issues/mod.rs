pub mod model;
pub mod query;
pub mod repository;

pub use model::{DeletedIssue, FieldPatch, Issue, IssueCollection, IssuePatch, NewIssue};
pub use query::{IssuePage, IssueQuery, SortDirection, SortField, SortOutcome};
pub use repository::IssueRepository;

use crate::errors::ServiceError;
use async_trait::async_trait;

use super::{DeletedIssue, Issue, IssuePage, IssuePatch, IssueQuery, NewIssue};

/// Trait abstraction for issue persistence.
/// The HTTP layer only sees this; the JSON file store is one implementation.
#[async_trait]
pub trait IssueRepository: Send + Sync {
    async fn list(&self, query: &IssueQuery) -> Result<IssuePage, ServiceError>;
    async fn get(&self, id: u64) -> Result<Issue, ServiceError>;
    async fn create(&self, input: NewIssue) -> Result<Issue, ServiceError>;
    async fn update(&self, id: u64, patch: IssuePatch) -> Result<Issue, ServiceError>;
    async fn delete(&self, id: u64) -> Result<DeletedIssue, ServiceError>;
}

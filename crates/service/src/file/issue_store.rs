use std::{path::PathBuf, sync::Arc};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::errors::ServiceError;
use crate::issues::{
    DeletedIssue, Issue, IssueCollection, IssuePage, IssuePatch, IssueQuery, IssueRepository, NewIssue,
    SortOutcome,
};
use crate::storage::json_document_store::JsonDocumentStore;

/// File-backed issue store.
/// Every call re-reads the whole collection; mutations rewrite it under the write lock.
#[derive(Clone)]
pub struct IssueStore {
    store: Arc<JsonDocumentStore<IssueCollection>>,
}

impl IssueStore {
    /// Bind to a JSON file. A missing file reads as an empty collection.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonDocumentStore::<IssueCollection>::new(path).await?;
        Ok(Arc::new(Self { store }))
    }

    /// Full collection snapshot, as persisted.
    pub async fn snapshot(&self) -> Result<IssueCollection, ServiceError> {
        self.store.load().await
    }

    /// Filter, sort and paginate.
    pub async fn list(&self, query: &IssueQuery) -> Result<IssuePage, ServiceError> {
        let collection = self.store.load().await?;
        let (page, outcome) = query.run(collection.issues);
        if let SortOutcome::Skipped(unknown) = outcome {
            debug!(sort_by = %unknown.0, "unsortable field; keeping filter order");
        }
        debug!(total = page.total, returned = page.items.len(), page = page.page, "listed issues");
        Ok(page)
    }

    pub async fn get(&self, id: u64) -> Result<Issue, ServiceError> {
        let collection = self.store.load().await?;
        collection.find(id).cloned().ok_or_else(|| ServiceError::not_found("issue"))
    }

    /// Validate, assign the next id and persist counter and record in one write.
    pub async fn create(&self, input: NewIssue) -> Result<Issue, ServiceError> {
        input.validate()?;
        let created = self
            .store
            .update(move |collection| {
                let id = collection.allocate_id()?;
                let issue = input.into_issue(id, Utc::now());
                collection.issues.push(issue.clone());
                Ok(issue)
            })
            .await?;
        info!(issue_id = created.id, "created issue");
        Ok(created)
    }

    /// Apply only the fields present in `patch`.
    pub async fn update(&self, id: u64, patch: IssuePatch) -> Result<Issue, ServiceError> {
        patch.validate()?;
        let updated = self
            .store
            .update(move |collection| {
                let issue = collection.find_mut(id).ok_or_else(|| ServiceError::not_found("issue"))?;
                patch.apply_to(issue, Utc::now());
                Ok(issue.clone())
            })
            .await
            .inspect_err(|e| {
                if matches!(e, ServiceError::NotFound(_)) {
                    warn!(issue_id = id, "update of unknown issue");
                }
            })?;
        info!(issue_id = id, "updated issue");
        Ok(updated)
    }

    /// Remove the issue; its id is never handed out again.
    pub async fn delete(&self, id: u64) -> Result<DeletedIssue, ServiceError> {
        self.store
            .update(|collection| {
                collection
                    .remove(id)
                    .map(|_| ())
                    .ok_or_else(|| ServiceError::not_found("issue"))
            })
            .await?;
        info!(issue_id = id, "deleted issue");
        Ok(DeletedIssue::new(id))
    }
}

#[async_trait::async_trait]
impl IssueRepository for IssueStore {
    async fn list(&self, query: &IssueQuery) -> Result<IssuePage, ServiceError> { self.list(query).await }
    async fn get(&self, id: u64) -> Result<Issue, ServiceError> { self.get(id).await }
    async fn create(&self, input: NewIssue) -> Result<Issue, ServiceError> { self.create(input).await }
    async fn update(&self, id: u64, patch: IssuePatch) -> Result<Issue, ServiceError> { self.update(id, patch).await }
    async fn delete(&self, id: u64) -> Result<DeletedIssue, ServiceError> { self.delete(id).await }
}

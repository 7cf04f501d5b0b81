//! Issue change repository port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{FieldDiffs, IssueChange, IssueComment};

/// Repository interface for issue change persistence.
#[async_trait]
pub trait IssueChangeRepository: Send + Sync {
    /// Insert a new change record.
    async fn insert(&self, change: &IssueChange) -> DomainResult<()>;

    /// Apply the mutable fields (`change_data`, `updated_at`) of a change.
    ///
    /// Returns `true` iff a record with the same key existed.
    async fn update(&self, change: &IssueChange) -> DomainResult<bool>;

    /// Delete a change by key. Returns `true` iff a record was removed.
    async fn delete(&self, key: &str) -> DomainResult<bool>;

    /// Get a comment change by key.
    async fn select_comment_by_key(&self, key: &str) -> DomainResult<Option<IssueChange>>;

    /// Get a comment by key, converted to its comment view.
    async fn select_default_comment_by_key(&self, key: &str) -> DomainResult<Option<IssueComment>>;

    /// Comments of the given issues, in chronological order.
    ///
    /// Any number of keys is accepted; an empty input returns without touching storage.
    async fn select_comments_by_issues(&self, issue_keys: &[String]) -> DomainResult<Vec<IssueComment>>;

    /// Changelog of one issue, in chronological order.
    async fn select_changelog_by_issue(&self, issue_key: &str) -> DomainResult<Vec<FieldDiffs>>;

    /// Diff records of every non-closed issue of a component. Order is unspecified.
    async fn select_changelog_of_non_closed_issues_by_component(
        &self,
        component_uuid: &str,
    ) -> DomainResult<Vec<IssueChange>>;
}

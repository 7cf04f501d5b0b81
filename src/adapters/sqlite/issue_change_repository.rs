//! SQLite implementation of the IssueChangeRepository.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use super::{parse_millis, parse_optional_millis};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ChangeType, FieldDiffs, IssueChange, IssueComment};
use crate::domain::ports::IssueChangeRepository;

/// Upper bound on bound parameters per statement (SQLite's historical
/// `SQLITE_MAX_VARIABLE_NUMBER`).
pub const MAX_KEYS_PER_QUERY: usize = 999;

const COLUMNS: &str = "ic.id AS id, ic.kee AS kee, ic.issue_key AS issue_key, ic.user_login AS user_login, \
                       ic.change_type AS change_type, ic.change_data AS change_data, ic.created_at AS created_at, \
                       ic.updated_at AS updated_at, ic.issue_change_creation_date AS issue_change_creation_date";

pub struct SqliteIssueChangeRepository {
    pool: SqlitePool,
}

impl SqliteIssueChangeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn select_comment_rows_for_chunk(&self, keys: &[&str]) -> DomainResult<Vec<IssueChangeRow>> {
        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
            "SELECT {COLUMNS} FROM issue_changes ic WHERE ic.change_type = 'comment' AND ic.issue_key IN ("
        ));
        let mut separated = query.separated(", ");
        for key in keys {
            separated.push_bind(*key);
        }
        separated.push_unseparated(")");

        let rows = query.build_query_as::<IssueChangeRow>().fetch_all(&self.pool).await?;
        Ok(rows)
    }
}

#[async_trait]
impl IssueChangeRepository for SqliteIssueChangeRepository {
    async fn insert(&self, change: &IssueChange) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO issue_changes (kee, issue_key, user_login, change_type, change_data, created_at, updated_at, issue_change_creation_date)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#
        )
        .bind(&change.key)
        .bind(&change.issue_key)
        .bind(&change.user_login)
        .bind(change.change_type.as_str())
        .bind(&change.change_data)
        .bind(change.created_at.timestamp_millis())
        .bind(change.updated_at.timestamp_millis())
        .bind(change.issue_change_creation_date.map(|dt| dt.timestamp_millis()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, change: &IssueChange) -> DomainResult<bool> {
        let result = sqlx::query("UPDATE issue_changes SET change_data = ?, updated_at = ? WHERE kee = ?")
            .bind(&change.change_data)
            .bind(change.updated_at.timestamp_millis())
            .bind(&change.key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, key: &str) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM issue_changes WHERE kee = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn select_comment_by_key(&self, key: &str) -> DomainResult<Option<IssueChange>> {
        let row: Option<IssueChangeRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM issue_changes ic WHERE ic.kee = ? AND ic.change_type = 'comment'"
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn select_default_comment_by_key(&self, key: &str) -> DomainResult<Option<IssueComment>> {
        let change = self.select_comment_by_key(key).await?;
        Ok(change.and_then(|c| c.to_comment()))
    }

    async fn select_comments_by_issues(&self, issue_keys: &[String]) -> DomainResult<Vec<IssueComment>> {
        if issue_keys.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<&str> = issue_keys
            .iter()
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut comments = Vec::new();
        for chunk in keys.chunks(MAX_KEYS_PER_QUERY) {
            debug!(keys = chunk.len(), "selecting comments for issue chunk");
            for row in self.select_comment_rows_for_chunk(chunk).await? {
                let change = IssueChange::try_from(row)?;
                comments.extend(change.to_comment());
            }
        }

        // Chunks are queried independently, so order the merged result here.
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.key.cmp(&b.key)));
        Ok(comments)
    }

    async fn select_changelog_by_issue(&self, issue_key: &str) -> DomainResult<Vec<FieldDiffs>> {
        let rows: Vec<IssueChangeRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM issue_changes ic WHERE ic.issue_key = ? AND ic.change_type = 'diff' \
             ORDER BY COALESCE(ic.issue_change_creation_date, ic.created_at), ic.id"
        ))
        .bind(issue_key)
        .fetch_all(&self.pool)
        .await?;

        let mut changelog = Vec::with_capacity(rows.len());
        for row in rows {
            let change = IssueChange::try_from(row)?;
            changelog.extend(change.to_field_diffs());
        }
        Ok(changelog)
    }

    async fn select_changelog_of_non_closed_issues_by_component(
        &self,
        component_uuid: &str,
    ) -> DomainResult<Vec<IssueChange>> {
        let rows: Vec<IssueChangeRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM issue_changes ic INNER JOIN issues i ON i.kee = ic.issue_key \
             WHERE i.component_uuid = ? AND i.status <> 'CLOSED' AND ic.change_type = 'diff'"
        ))
        .bind(component_uuid)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[derive(sqlx::FromRow)]
struct IssueChangeRow {
    id: i64,
    kee: String,
    issue_key: String,
    user_login: Option<String>,
    change_type: String,
    change_data: Option<String>,
    created_at: i64,
    updated_at: i64,
    issue_change_creation_date: Option<i64>,
}

impl TryFrom<IssueChangeRow> for IssueChange {
    type Error = DomainError;

    fn try_from(row: IssueChangeRow) -> Result<Self, Self::Error> {
        let change_type = ChangeType::from_str(&row.change_type)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid change type: {}", row.change_type)))?;

        Ok(Self {
            id: Some(row.id),
            key: row.kee,
            issue_key: row.issue_key,
            user_login: row.user_login,
            change_type,
            change_data: row.change_data,
            created_at: parse_millis(row.created_at)?,
            updated_at: parse_millis(row.updated_at)?,
            issue_change_creation_date: parse_optional_millis(row.issue_change_creation_date)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use chrono::{DateTime, Utc};

    async fn setup_test_repo() -> (SqliteIssueChangeRepository, SqlitePool) {
        let pool = create_migrated_test_pool().await.unwrap();
        (SqliteIssueChangeRepository::new(pool.clone()), pool)
    }

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    fn comment(key: &str, issue_key: &str, text: &str, created: i64) -> IssueChange {
        IssueChange {
            id: None,
            key: key.to_string(),
            issue_key: issue_key.to_string(),
            user_login: Some("arthur".to_string()),
            change_type: ChangeType::Comment,
            change_data: Some(text.to_string()),
            created_at: at(created),
            updated_at: at(created),
            issue_change_creation_date: Some(at(created)),
        }
    }

    fn diff(key: &str, issue_key: &str, data: &str, created: i64) -> IssueChange {
        IssueChange {
            change_type: ChangeType::Diff,
            change_data: Some(data.to_string()),
            ..comment(key, issue_key, "", created)
        }
    }

    #[tokio::test]
    async fn test_insert_and_select_comment_by_key() {
        let (repo, _pool) = setup_test_repo().await;
        let change = IssueChange {
            user_login: Some("emmerik".to_string()),
            created_at: at(1_500_000_000_000),
            updated_at: at(1_501_000_000_000),
            issue_change_creation_date: Some(at(1_502_000_000_000)),
            ..comment("EFGH", "ABCDE", "Some text", 0)
        };
        repo.insert(&change).await.unwrap();

        let found = repo.select_comment_by_key("EFGH").await.unwrap().unwrap();
        assert!(found.id.is_some());
        assert_eq!(IssueChange { id: None, ..found }, change);
    }

    #[tokio::test]
    async fn test_select_comment_by_key_ignores_diffs() {
        let (repo, _pool) = setup_test_repo().await;
        repo.insert(&diff("D1", "1000", "severity=MAJOR|BLOCKER", 10)).await.unwrap();

        assert!(repo.select_comment_by_key("D1").await.unwrap().is_none());
        assert!(repo.select_default_comment_by_key("UNKNOWN").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_select_default_comment_by_key() {
        let (repo, _pool) = setup_test_repo().await;
        repo.insert(&comment("FGHIJ", "1000", "recent comment", 20)).await.unwrap();

        let found = repo.select_default_comment_by_key("FGHIJ").await.unwrap().unwrap();
        assert_eq!(found.key, "FGHIJ");
        assert_eq!(found.user_login.as_deref(), Some("arthur"));
        assert_eq!(found.markdown_text, "recent comment");
    }

    #[tokio::test]
    async fn test_select_comments_by_issues_in_chronological_order() {
        let (repo, _pool) = setup_test_repo().await;
        repo.insert(&comment("FGHIJ", "1000", "recent comment", 2_000)).await.unwrap();
        repo.insert(&comment("ABCDE", "1000", "old comment", 1_000)).await.unwrap();
        repo.insert(&comment("OTHER", "1001", "other issue", 1_500)).await.unwrap();
        repo.insert(&diff("DIFF1", "1000", "severity=MAJOR|BLOCKER", 1_200)).await.unwrap();

        let comments = repo.select_comments_by_issues(&["1000".to_string()]).await.unwrap();
        let texts: Vec<_> = comments.iter().map(|c| c.markdown_text.as_str()).collect();
        assert_eq!(texts, vec!["old comment", "recent comment"]);
    }

    #[tokio::test]
    async fn test_select_comments_orders_across_chunks() {
        let (repo, _pool) = setup_test_repo().await;
        let mut keys: Vec<String> = (0..MAX_KEYS_PER_QUERY * 2).map(|i| format!("ISSUE-{i:05}")).collect();
        // Last key lands in the second chunk but has the oldest comment.
        repo.insert(&comment("LATE", &keys[0], "newest", 3_000)).await.unwrap();
        repo.insert(&comment("EARLY", keys.last().unwrap(), "oldest", 1_000)).await.unwrap();
        keys.push(keys[0].clone());

        let comments = repo.select_comments_by_issues(&keys).await.unwrap();
        let texts: Vec<_> = comments.iter().map(|c| c.markdown_text.as_str()).collect();
        assert_eq!(texts, vec!["oldest", "newest"]);
    }

    #[tokio::test]
    async fn test_select_comments_by_issues_on_huge_number_of_issues() {
        let (repo, _pool) = setup_test_repo().await;
        repo.insert(&comment("FGHIJ", "1000", "recent comment", 2_000)).await.unwrap();

        let keys: Vec<String> = (0..4500).map(|i| format!("ABCD{i}")).collect();
        let comments = repo.select_comments_by_issues(&keys).await.unwrap();
        assert!(comments.is_empty());
    }

    #[tokio::test]
    async fn test_select_comments_by_issues_empty_input() {
        let (repo, pool) = setup_test_repo().await;
        pool.close().await;

        // A closed pool would fail any query.
        let comments = repo.select_comments_by_issues(&[]).await.unwrap();
        assert!(comments.is_empty());
    }

    #[tokio::test]
    async fn test_select_changelog_by_issue() {
        let (repo, _pool) = setup_test_repo().await;
        repo.insert(&diff("D2", "1000", "status=OPEN|CONFIRMED", 2_000)).await.unwrap();
        repo.insert(&diff("D1", "1000", "severity=MAJOR|BLOCKER", 1_000)).await.unwrap();
        repo.insert(&comment("C1", "1000", "a comment", 1_500)).await.unwrap();
        repo.insert(&diff("D3", "2000", "severity=MINOR|MAJOR", 500)).await.unwrap();

        let changelog = repo.select_changelog_by_issue("1000").await.unwrap();
        assert_eq!(changelog.len(), 2);

        let severity = changelog[0].get("severity").unwrap();
        assert_eq!(severity.old_value.as_deref(), Some("MAJOR"));
        assert_eq!(severity.new_value.as_deref(), Some("BLOCKER"));
        assert_eq!(changelog[0].user_login.as_deref(), Some("arthur"));
        assert_eq!(changelog[0].creation_date, Some(at(1_000)));
        assert!(changelog[1].get("status").is_some());
    }

    #[tokio::test]
    async fn test_select_changelog_of_non_closed_issues_by_component() {
        let (repo, pool) = setup_test_repo().await;
        sqlx::raw_sql(
            "INSERT INTO issues (kee, component_uuid, status) VALUES
                ('ISSUE_1', 'FILE_1', 'OPEN'),
                ('ISSUE_2', 'FILE_1', 'CLOSED'),
                ('ISSUE_3', 'FILE_2', 'OPEN')",
        )
        .execute(&pool)
        .await
        .unwrap();

        repo.insert(&diff("D1", "ISSUE_1", "severity=MAJOR|BLOCKER", 1)).await.unwrap();
        repo.insert(&diff("D2", "ISSUE_2", "severity=MAJOR|BLOCKER", 2)).await.unwrap();
        repo.insert(&diff("D3", "ISSUE_3", "severity=MAJOR|BLOCKER", 3)).await.unwrap();
        repo.insert(&comment("C1", "ISSUE_1", "comment", 4)).await.unwrap();
        repo.insert(&diff("D4", "ISSUE_1", "status=OPEN|CONFIRMED", 5)).await.unwrap();

        let changes = repo
            .select_changelog_of_non_closed_issues_by_component("FILE_1")
            .await
            .unwrap();
        let mut keys: Vec<_> = changes.iter().map(|c| c.key.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["D1", "D4"]);
    }

    #[tokio::test]
    async fn test_update_applies_only_mutable_fields() {
        let (repo, _pool) = setup_test_repo().await;
        repo.insert(&comment("COMMENT-2", "1000", "old text", 1_000)).await.unwrap();

        let change = IssueChange {
            user_login: Some("someone-else".to_string()),
            change_data: Some("new comment".to_string()),
            updated_at: at(1_500_000_000_000),
            ..comment("COMMENT-2", "9999", "", 5_000)
        };
        assert!(repo.update(&change).await.unwrap());

        let stored = repo.select_comment_by_key("COMMENT-2").await.unwrap().unwrap();
        assert_eq!(stored.change_data.as_deref(), Some("new comment"));
        assert_eq!(stored.updated_at, at(1_500_000_000_000));
        assert_eq!(stored.issue_key, "1000");
        assert_eq!(stored.user_login.as_deref(), Some("arthur"));
        assert_eq!(stored.created_at, at(1_000));
    }

    #[tokio::test]
    async fn test_update_unknown_key() {
        let (repo, _pool) = setup_test_repo().await;
        repo.insert(&comment("COMMENT-1", "1000", "text", 1_000)).await.unwrap();

        let change = comment("UNKNOWN", "1000", "new comment", 2_000);
        assert!(!repo.update(&change).await.unwrap());

        let stored = repo.select_comment_by_key("COMMENT-1").await.unwrap().unwrap();
        assert_eq!(stored.change_data.as_deref(), Some("text"));
        assert!(repo.select_comment_by_key("UNKNOWN").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let (repo, _pool) = setup_test_repo().await;
        repo.insert(&comment("COMMENT-1", "1000", "first", 1_000)).await.unwrap();
        repo.insert(&comment("COMMENT-2", "1000", "second", 2_000)).await.unwrap();

        assert!(repo.delete("COMMENT-2").await.unwrap());
        assert!(repo.select_comment_by_key("COMMENT-2").await.unwrap().is_none());
        assert!(repo.select_comment_by_key("COMMENT-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_unknown_key() {
        let (repo, _pool) = setup_test_repo().await;
        assert!(!repo.delete("UNKNOWN").await.unwrap());
    }
}

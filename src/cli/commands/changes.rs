//! Issue change CLI commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::adapters::sqlite::{initialize_database, SqliteIssueChangeRepository};
use crate::cli::output::{output, truncate, CommandOutput};
use crate::domain::models::{Config, FieldDiffs, IssueComment};
use crate::domain::ports::IssueChangeRepository;

#[derive(Args, Debug)]
pub struct ChangesArgs {
    #[command(subcommand)]
    pub command: ChangesCommands,
}

#[derive(Subcommand, Debug)]
pub enum ChangesCommands {
    /// List comments of one or more issues, oldest first
    Comments {
        /// Issue keys
        #[arg(required = true)]
        issue_keys: Vec<String>,
    },
    /// Show a single comment
    Comment {
        /// Comment key
        key: String,
    },
    /// Show the changelog of an issue
    Changelog {
        /// Issue key
        issue_key: String,
    },
    /// Delete a comment or changelog entry
    Delete {
        /// Change key
        key: String,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct CommentListOutput {
    pub comments: Vec<IssueComment>,
    pub total: usize,
}

impl CommandOutput for CommentListOutput {
    fn to_human(&self) -> String {
        if self.comments.is_empty() {
            return "No comments found.".to_string();
        }

        let mut lines = vec![format!("Found {} comment(s):\n", self.total)];
        lines.push(format!(
            "{:<25} {:<16} {:<16} {:<40}",
            "CREATED", "ISSUE", "AUTHOR", "TEXT"
        ));
        lines.push("-".repeat(100));

        for comment in &self.comments {
            lines.push(format!(
                "{:<25} {:<16} {:<16} {:<40}",
                comment.created_at.to_rfc3339(),
                truncate(&comment.issue_key, 16),
                truncate(comment.user_login.as_deref().unwrap_or("-"), 16),
                truncate(&comment.markdown_text.replace('\n', " "), 40),
            ));
        }

        lines.join("\n")
    }
}

#[derive(Debug, serde::Serialize)]
pub struct CommentDetailOutput {
    pub comment: Option<IssueComment>,
    pub key: String,
}

impl CommandOutput for CommentDetailOutput {
    fn to_human(&self) -> String {
        match self.comment {
            Some(ref c) => [
                format!("Comment: {}", c.key),
                format!("Issue: {}", c.issue_key),
                format!("Author: {}", c.user_login.as_deref().unwrap_or("-")),
                format!("Created: {}", c.created_at.to_rfc3339()),
                format!("Updated: {}", c.updated_at.to_rfc3339()),
                String::new(),
                c.markdown_text.clone(),
            ]
            .join("\n"),
            None => format!("Comment not found: {}", self.key),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ChangelogOutput {
    pub issue_key: String,
    pub changelog: Vec<FieldDiffs>,
}

impl CommandOutput for ChangelogOutput {
    fn to_human(&self) -> String {
        if self.changelog.is_empty() {
            return format!("No changelog for issue {}.", self.issue_key);
        }

        let mut lines = vec![format!("Changelog of {}:", self.issue_key)];
        for entry in &self.changelog {
            let when = entry
                .creation_date
                .map_or_else(|| "-".to_string(), |d| d.to_rfc3339());
            let who = entry.user_login.as_deref().unwrap_or("-");
            lines.push(format!("\n{when} by {who}"));
            for (field, diff) in entry.diffs() {
                lines.push(format!(
                    "  {field}: {} -> {}",
                    diff.old_value.as_deref().unwrap_or("(none)"),
                    diff.new_value.as_deref().unwrap_or("(none)")
                ));
            }
        }
        lines.join("\n")
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ChangeActionOutput {
    pub success: bool,
    pub message: String,
}

impl CommandOutput for ChangeActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }
}

pub async fn execute(args: ChangesArgs, config: &Config, json_mode: bool) -> Result<()> {
    let pool = initialize_database(&config.database)
        .await
        .with_context(|| format!("Failed to open issue change store at {}", config.database.path))?;
    let repo = SqliteIssueChangeRepository::new(pool);

    match args.command {
        ChangesCommands::Comments { issue_keys } => {
            let comments = repo.select_comments_by_issues(&issue_keys).await?;
            let out = CommentListOutput {
                total: comments.len(),
                comments,
            };
            output(&out, json_mode);
        }

        ChangesCommands::Comment { key } => {
            let comment = repo.select_default_comment_by_key(&key).await?;
            let out = CommentDetailOutput { comment, key };
            output(&out, json_mode);
        }

        ChangesCommands::Changelog { issue_key } => {
            let changelog = repo.select_changelog_by_issue(&issue_key).await?;
            let out = ChangelogOutput {
                issue_key,
                changelog,
            };
            output(&out, json_mode);
        }

        ChangesCommands::Delete { key } => {
            let deleted = repo.delete(&key).await?;
            let out = ChangeActionOutput {
                success: deleted,
                message: if deleted {
                    format!("Deleted change {key}")
                } else {
                    format!("Change not found: {key}")
                },
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}

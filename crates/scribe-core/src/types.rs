use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScribeError;

/// A GitHub repository identity (`owner/repo`).
///
/// # Examples
///
/// ```
/// use scribe_core::RepoId;
///
/// let id = RepoId::parse("rust-lang/rust").unwrap();
/// assert_eq!(id.owner, "rust-lang");
/// assert_eq!(id.repo, "rust");
/// assert_eq!(id.to_string(), "rust-lang/rust");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    /// Owning user or organization.
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

impl RepoId {
    /// Parse `owner/repo`.
    ///
    /// # Errors
    ///
    /// Returns [`ScribeError::Config`] unless the input is exactly two
    /// non-empty segments separated by `/`.
    pub fn parse(raw: &str) -> Result<Self, ScribeError> {
        let invalid =
            || ScribeError::Config(format!("invalid repository '{raw}', expected owner/repo"));
        let (owner, repo) = raw.trim().split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// A GitHub account as embedded in API payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubUser {
    /// Account login.
    pub login: String,
}

/// A review submission as returned by `GET /pulls/{n}/reviews`.
///
/// Fields GitHub may omit or null are optional; nothing here is validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawThreadReview {
    /// Reviewer, `None` for deleted accounts.
    #[serde(default)]
    pub user: Option<GitHubUser>,
    /// Review state (`APPROVED`, `CHANGES_REQUESTED`, `COMMENTED`, ...).
    #[serde(default)]
    pub state: Option<String>,
    /// Top-level review text, often empty for plain approvals.
    #[serde(default)]
    pub body: Option<String>,
    /// Submission time, `None` for pending reviews.
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// A line comment as returned by `GET /pulls/{n}/comments`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInlineComment {
    /// Commenter, `None` for deleted accounts.
    #[serde(default)]
    pub user: Option<GitHubUser>,
    /// File the comment is attached to.
    #[serde(default)]
    pub path: String,
    /// Line in the diff; `None` when the comment is outdated.
    #[serde(default)]
    pub line: Option<u64>,
    /// Comment text.
    #[serde(default)]
    pub body: String,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Which upstream shape a [`Comment`] came from.
///
/// # Examples
///
/// ```
/// use scribe_core::CommentKind;
///
/// assert_eq!(CommentKind::Thread.to_string(), "thread");
/// assert_eq!(CommentKind::Inline.to_string(), "inline");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentKind {
    /// Attached to a whole review submission.
    Thread,
    /// Attached to a file and line in the diff.
    Inline,
}

impl fmt::Display for CommentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommentKind::Thread => write!(f, "thread"),
            CommentKind::Inline => write!(f, "inline"),
        }
    }
}

/// Fields that only exist for one kind of comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CommentDetail {
    /// Review-level comment.
    #[serde(rename_all = "camelCase")]
    Thread {
        /// Review verdict, if GitHub reported one.
        review_state: Option<String>,
    },
    /// Line comment.
    #[serde(rename_all = "camelCase")]
    Inline {
        /// File the comment is attached to.
        file_path: String,
        /// Line in the diff, if still known.
        line_number: Option<u64>,
    },
}

/// One normalized piece of review feedback.
///
/// # Examples
///
/// ```
/// use scribe_core::{Comment, CommentDetail, CommentKind};
///
/// let comment = Comment {
///     author: "bob".into(),
///     body: "document the retry policy".into(),
///     timestamp: None,
///     detail: CommentDetail::Inline {
///         file_path: "x.go".into(),
///         line_number: Some(10),
///     },
/// };
/// assert_eq!(comment.kind(), CommentKind::Inline);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Login of the person who wrote the comment.
    pub author: String,
    /// Comment text.
    pub body: String,
    /// Creation or submission time.
    pub timestamp: Option<DateTime<Utc>>,
    /// Kind-specific fields.
    #[serde(flatten)]
    pub detail: CommentDetail,
}

impl Comment {
    /// The upstream shape this comment was normalized from.
    pub fn kind(&self) -> CommentKind {
        match self.detail {
            CommentDetail::Thread { .. } => CommentKind::Thread,
            CommentDetail::Inline { .. } => CommentKind::Inline,
        }
    }
}

/// Pull request metadata captured once per run.
///
/// # Examples
///
/// ```
/// use scribe_core::PullRequestContext;
///
/// let pr = PullRequestContext {
///     title: "Add retries".into(),
///     description: None,
///     author: "alice".into(),
/// };
/// assert!(pr.description.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestContext {
    /// PR title.
    pub title: String,
    /// PR body, `None` when the author left it blank.
    pub description: Option<String>,
    /// Login of the PR author.
    pub author: String,
}

/// The target document before and after synthesis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentState {
    /// Content on disk before the run; empty if the document does not exist.
    pub existing_content: String,
    /// Content proposed by the model; empty means no change requested.
    pub proposed_content: String,
}

/// What the pipeline decided to do with the model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateDecision {
    /// Persist this exact content.
    Write(String),
    /// The model returned nothing (or only whitespace).
    SkipEmpty,
    /// The model returned the document unchanged.
    SkipUnchanged,
}

/// Why a run finished without writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipReason {
    /// The model had nothing relevant to add.
    Empty,
    /// The proposed content matched the existing document.
    Unchanged,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Empty => write!(f, "empty"),
            SkipReason::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Terminal, non-error result of a sync run.
///
/// # Examples
///
/// ```
/// use scribe_core::{RunOutcome, SkipReason};
///
/// let outcome = RunOutcome::Skipped {
///     document: "AGENTS.md".into(),
///     reason: SkipReason::Unchanged,
/// };
/// assert_eq!(outcome.to_string(), "skipped AGENTS.md: unchanged");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RunOutcome {
    /// The document was written.
    Wrote {
        /// Document that was written.
        document: PathBuf,
    },
    /// The model was consulted but nothing was written.
    Skipped {
        /// Document that was left alone.
        document: PathBuf,
        /// Why nothing was written.
        reason: SkipReason,
    },
    /// The pull request had no review comments, so the model was never called.
    NothingToProcess {
        /// Document that was left alone.
        document: PathBuf,
    },
}

impl RunOutcome {
    /// Build the outcome that corresponds to a decision.
    pub fn from_decision(document: PathBuf, decision: &UpdateDecision) -> Self {
        match decision {
            UpdateDecision::Write(_) => RunOutcome::Wrote { document },
            UpdateDecision::SkipEmpty => RunOutcome::Skipped {
                document,
                reason: SkipReason::Empty,
            },
            UpdateDecision::SkipUnchanged => RunOutcome::Skipped {
                document,
                reason: SkipReason::Unchanged,
            },
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Wrote { document } => write!(f, "wrote {}", document.display()),
            RunOutcome::Skipped { document, reason } => {
                write!(f, "skipped {}: {reason}", document.display())
            }
            RunOutcome::NothingToProcess { document } => {
                write!(f, "skipped {}: nothing to process", document.display())
            }
        }
    }
}

/// Output format for CLI subcommands.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument parsing.
///
/// # Examples
///
/// ```
/// use scribe_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One human-readable outcome line.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("sarif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn output_format_default_is_text() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }

    #[test]
    fn repo_id_rejects_bad_shapes() {
        assert!(RepoId::parse("owner").is_err());
        assert!(RepoId::parse("/repo").is_err());
        assert!(RepoId::parse("owner/").is_err());
        assert!(RepoId::parse("a/b/c").is_err());
    }

    #[test]
    fn raw_review_tolerates_nulls() {
        let json = r#"{"user":null,"state":"APPROVED","body":null,"submitted_at":null}"#;
        let review: RawThreadReview = serde_json::from_str(json).unwrap();
        assert!(review.user.is_none());
        assert!(review.body.is_none());
        assert_eq!(review.state.as_deref(), Some("APPROVED"));
    }

    #[test]
    fn raw_inline_comment_parses_github_payload() {
        let json = r#"{
            "id": 1,
            "user": {"login": "bob", "id": 2},
            "path": "src/lib.rs",
            "line": 12,
            "body": "nit",
            "created_at": "2024-05-01T10:00:00Z"
        }"#;
        let comment: RawInlineComment = serde_json::from_str(json).unwrap();
        assert_eq!(comment.user.unwrap().login, "bob");
        assert_eq!(comment.line, Some(12));
        assert!(comment.created_at.is_some());
    }

    #[test]
    fn outcome_lines() {
        let doc = PathBuf::from("AGENTS.md");
        assert_eq!(
            RunOutcome::Wrote {
                document: doc.clone()
            }
            .to_string(),
            "wrote AGENTS.md"
        );
        assert_eq!(
            RunOutcome::from_decision(doc.clone(), &UpdateDecision::SkipEmpty).to_string(),
            "skipped AGENTS.md: empty"
        );
        assert_eq!(
            RunOutcome::NothingToProcess { document: doc }.to_string(),
            "skipped AGENTS.md: nothing to process"
        );
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let outcome = RunOutcome::Skipped {
            document: PathBuf::from("AGENTS.md"),
            reason: SkipReason::Empty,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"], "empty");
        assert_eq!(json["document"], "AGENTS.md");
    }

    #[test]
    fn comment_serializes_flat_with_kind() {
        let comment = Comment {
            author: "bob".into(),
            body: "x".into(),
            timestamp: None,
            detail: CommentDetail::Inline {
                file_path: "a.rs".into(),
                line_number: Some(3),
            },
        };
        let json = serde_json::to_value(&comment).unwrap();
        assert_eq!(json["kind"], "inline");
        assert_eq!(json["filePath"], "a.rs");
        assert_eq!(json["lineNumber"], 3);
    }
}

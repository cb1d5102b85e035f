//! Core types, configuration, and error handling for scribe.
//!
//! This crate provides the shared foundation used by the sync pipeline and
//! the CLI:
//! - [`ScribeError`]: one error variant per pipeline stage, using `thiserror`
//! - [`ScribeConfig`]: configuration loaded from `.scribe.toml`
//! - [`RunConfig`]: validated parameters for one run
//! - Shared types: [`Comment`], [`PullRequestContext`], [`UpdateDecision`],
//!   [`RunOutcome`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{
    parse_pr_number, GitHubConfig, LlmConfig, RunArgs, RunConfig, ScribeConfig, SyncConfig,
};
pub use error::ScribeError;
pub use types::{
    Comment, CommentDetail, CommentKind, DocumentState, GitHubUser, OutputFormat,
    PullRequestContext, RawInlineComment, RawThreadReview, RepoId, RunOutcome, SkipReason,
    UpdateDecision,
};

/// A convenience `Result` type for scribe operations.
pub type Result<T> = std::result::Result<T, ScribeError>;

use std::fmt::Write;

use scribe_core::{Comment, CommentDetail, PullRequestContext};

/// Shown in place of a missing PR description.
pub const NO_DESCRIPTION: &str = "No description provided";

/// Shown in place of a missing or empty document.
pub const EMPTY_DOCUMENT: &str = "(Empty - needs to be created)";

/// A rendered instruction/context pair for the generation backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// System instruction.
    pub system: String,
    /// User prompt carrying the PR, its comments, and the current document.
    pub user: String,
}

/// Build the full prompt for one document.
///
/// Pure and deterministic: identical inputs render byte-identical text.
/// Comments are rendered in the order given, none are dropped or shortened.
///
/// # Examples
///
/// ```
/// use scribe_core::PullRequestContext;
/// use scribe_sync::prompt::build_prompt;
///
/// let pr = PullRequestContext {
///     title: "Add retries".into(),
///     description: None,
///     author: "alice".into(),
/// };
/// let prompt = build_prompt(&pr, &[], "AGENTS.md", "");
/// assert!(prompt.system.contains("AGENTS.md"));
/// assert!(prompt.user.contains("No description provided"));
/// assert!(prompt.user.contains("(Empty - needs to be created)"));
/// ```
pub fn build_prompt(
    pr: &PullRequestContext,
    comments: &[Comment],
    document: &str,
    existing: &str,
) -> Prompt {
    Prompt {
        system: build_system_prompt(document),
        user: build_sync_prompt(pr, comments, document, existing),
    }
}

/// Build the system instruction for updating `document`.
///
/// # Examples
///
/// ```
/// use scribe_sync::prompt::build_system_prompt;
///
/// let prompt = build_system_prompt("AGENTS.md");
/// assert!(prompt.contains("AGENTS.md"));
/// assert!(prompt.contains("plain text"));
/// ```
pub fn build_system_prompt(document: &str) -> String {
    format!(
        "\
You are a documentation assistant. You update or create the {document} file \
using the review comments left on a pull request.

{document} documents AI agents, automated processes, agent-related patterns, \
and agent implementation details discussed in pull request reviews.

Rules:
- Preserve every existing functionality, requirement, and instruction in {document}.
- Only add or clarify based on the review comments. Never remove or reduce \
existing content unless a comment explicitly asks for it.
- If no review comment is relevant to {document}, return an empty response \
(no text at all).
- Otherwise return the full updated content of {document} as plain text, \
not JSON and not wrapped in a code block."
    )
}

/// Build the user prompt: PR metadata, every comment, and the current document.
pub fn build_sync_prompt(
    pr: &PullRequestContext,
    comments: &[Comment],
    document: &str,
    existing: &str,
) -> String {
    let mut prompt =
        format!("Update the {document} documentation using these pull request review comments:\n\n");
    prompt.push_str(&render_pr_context(pr, comments));

    let current = if existing.is_empty() {
        EMPTY_DOCUMENT
    } else {
        existing
    };
    let _ = write!(
        prompt,
        "\nExisting documentation:\n\nCurrent {document}:\n{current}\n\n"
    );
    let _ = write!(
        prompt,
        "Produce the full updated content of {document}, incorporating what the review \
comments add. If none of the comments are relevant to {document}, return empty text."
    );
    prompt
}

fn render_pr_context(pr: &PullRequestContext, comments: &[Comment]) -> String {
    let description = pr
        .description
        .as_deref()
        .filter(|d| !d.is_empty())
        .unwrap_or(NO_DESCRIPTION);

    let mut text = String::new();
    let _ = writeln!(text, "PR Title: {}", pr.title);
    let _ = writeln!(text, "PR Description: {description}");
    let _ = writeln!(text, "PR Author: {}", pr.author);
    let _ = writeln!(text);
    let _ = writeln!(text, "Review Comments ({} total):", comments.len());

    for (idx, comment) in comments.iter().enumerate() {
        let _ = writeln!(text);
        let _ = writeln!(text, "Comment {}:", idx + 1);
        let _ = writeln!(text, "  Type: {}", comment.kind());
        let _ = writeln!(text, "  Author: {}", comment.author);
        match &comment.detail {
            CommentDetail::Thread {
                review_state: Some(state),
            } => {
                let _ = writeln!(text, "  State: {state}");
            }
            CommentDetail::Thread { review_state: None } => {}
            CommentDetail::Inline {
                file_path,
                line_number: Some(line),
            } => {
                let _ = writeln!(text, "  File: {file_path} (Line {line})");
            }
            CommentDetail::Inline {
                file_path,
                line_number: None,
            } => {
                let _ = writeln!(text, "  File: {file_path}");
            }
        }
        let _ = writeln!(text, "  Body: {}", comment.body);
    }
    text
}

use scribe_core::{Comment, CommentDetail, GitHubUser, RawInlineComment, RawThreadReview};

/// Login used when GitHub no longer knows the account behind a comment.
pub const GHOST_AUTHOR: &str = "ghost";

/// Merge review submissions and line comments into one ordered sequence.
///
/// Reviews come first, in upstream order, followed by line comments in
/// upstream order. Nothing is re-sorted by time, so identical upstream data
/// always yields the identical sequence. Reviews without a body (plain
/// approvals, for instance) are dropped; line comments are always kept.
///
/// # Examples
///
/// ```
/// use scribe_core::{CommentKind, RawInlineComment, RawThreadReview};
/// use scribe_sync::normalize::normalize_comments;
///
/// let reviews = vec![RawThreadReview {
///     body: Some("Looks good, but document the retry policy".into()),
///     state: Some("APPROVED".into()),
///     ..RawThreadReview::default()
/// }];
/// let inline = vec![RawInlineComment {
///     path: "x.go".into(),
///     line: Some(10),
///     body: "why 3 retries?".into(),
///     ..RawInlineComment::default()
/// }];
/// let comments = normalize_comments(&reviews, &inline);
/// assert_eq!(comments.len(), 2);
/// assert_eq!(comments[0].kind(), CommentKind::Thread);
/// assert_eq!(comments[1].kind(), CommentKind::Inline);
/// ```
pub fn normalize_comments(
    reviews: &[RawThreadReview],
    inline: &[RawInlineComment],
) -> Vec<Comment> {
    let threads = reviews.iter().filter_map(thread_comment);
    let lines = inline.iter().map(inline_comment);
    threads.chain(lines).collect()
}

fn thread_comment(review: &RawThreadReview) -> Option<Comment> {
    let body = review.body.as_deref().filter(|b| !b.is_empty())?;
    Some(Comment {
        author: author_login(review.user.as_ref()),
        body: body.to_string(),
        timestamp: review.submitted_at,
        detail: CommentDetail::Thread {
            review_state: review.state.clone(),
        },
    })
}

fn inline_comment(comment: &RawInlineComment) -> Comment {
    Comment {
        author: author_login(comment.user.as_ref()),
        body: comment.body.clone(),
        timestamp: comment.created_at,
        detail: CommentDetail::Inline {
            file_path: comment.path.clone(),
            line_number: comment.line,
        },
    }
}

fn author_login(user: Option<&GitHubUser>) -> String {
    user.map(|u| u.login.clone())
        .unwrap_or_else(|| GHOST_AUTHOR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_core::CommentKind;

    fn review(author: &str, body: Option<&str>, state: Option<&str>) -> RawThreadReview {
        RawThreadReview {
            user: Some(GitHubUser {
                login: author.into(),
            }),
            state: state.map(Into::into),
            body: body.map(Into::into),
            submitted_at: None,
        }
    }

    fn line_comment(author: &str, path: &str, line: u64, body: &str) -> RawInlineComment {
        RawInlineComment {
            user: Some(GitHubUser {
                login: author.into(),
            }),
            path: path.into(),
            line: Some(line),
            body: body.into(),
            created_at: None,
        }
    }

    #[test]
    fn empty_inputs_give_empty_output() {
        assert!(normalize_comments(&[], &[]).is_empty());
    }

    #[test]
    fn drops_reviews_without_body() {
        let reviews = vec![
            review("alice", None, Some("APPROVED")),
            review("bob", Some(""), Some("COMMENTED")),
            review("carol", Some("please add docs"), Some("CHANGES_REQUESTED")),
        ];
        let comments = normalize_comments(&reviews, &[]);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].author, "carol");
        assert!(comments.iter().all(|c| !c.body.is_empty()));
    }

    #[test]
    fn keeps_whitespace_only_review_body() {
        // Only literally empty bodies are dropped.
        let comments = normalize_comments(&[review("alice", Some(" "), None)], &[]);
        assert_eq!(comments.len(), 1);
    }

    #[test]
    fn inline_comments_are_always_kept() {
        let inline = vec![line_comment("bob", "a.rs", 1, "")];
        let comments = normalize_comments(&[], &inline);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].kind(), CommentKind::Inline);
    }

    #[test]
    fn threads_precede_inline_in_upstream_order() {
        let reviews = vec![
            review("r1", Some("first review"), None),
            review("r2", Some("second review"), None),
        ];
        let inline = vec![
            line_comment("i1", "b.rs", 9, "first line comment"),
            line_comment("i2", "a.rs", 1, "second line comment"),
        ];
        let authors: Vec<String> = normalize_comments(&reviews, &inline)
            .into_iter()
            .map(|c| c.author)
            .collect();
        assert_eq!(authors, ["r1", "r2", "i1", "i2"]);
    }

    #[test]
    fn order_ignores_timestamps() {
        let mut early = line_comment("early", "a.rs", 1, "x");
        early.created_at = Some("2020-01-01T00:00:00Z".parse().unwrap());
        let mut late = review("late", Some("y"), None);
        late.submitted_at = Some("2030-01-01T00:00:00Z".parse().unwrap());
        let comments = normalize_comments(&[late], &[early]);
        assert_eq!(comments[0].author, "late");
        assert_eq!(comments[1].author, "early");
    }

    #[test]
    fn maps_fields() {
        let mut r = review("alice", Some("ship it"), Some("APPROVED"));
        r.submitted_at = Some("2024-05-01T10:00:00Z".parse().unwrap());
        let comments = normalize_comments(&[r.clone()], &[line_comment("bob", "x.go", 10, "why")]);

        assert_eq!(comments[0].timestamp, r.submitted_at);
        assert_eq!(
            comments[0].detail,
            CommentDetail::Thread {
                review_state: Some("APPROVED".into())
            }
        );
        assert_eq!(
            comments[1].detail,
            CommentDetail::Inline {
                file_path: "x.go".into(),
                line_number: Some(10)
            }
        );
    }

    #[test]
    fn missing_user_becomes_ghost() {
        let comment = RawInlineComment {
            body: "orphan".into(),
            ..RawInlineComment::default()
        };
        let comments = normalize_comments(&[], &[comment]);
        assert_eq!(comments[0].author, GHOST_AUTHOR);
    }
}

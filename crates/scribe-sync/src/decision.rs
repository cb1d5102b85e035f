use scribe_core::{DocumentState, UpdateDecision};

/// Decide what to do with the model's proposed content.
///
/// - empty or whitespace-only proposal: [`UpdateDecision::SkipEmpty`]
/// - proposal byte-identical to the existing content: [`UpdateDecision::SkipUnchanged`]
/// - anything else: [`UpdateDecision::Write`] with the proposal untouched
///
/// Trimming is only used for the emptiness test; the written content is
/// exactly what the model returned.
///
/// # Examples
///
/// ```
/// use scribe_core::UpdateDecision;
/// use scribe_sync::decision::decide;
///
/// assert_eq!(decide("   \n", "# Agents\n"), UpdateDecision::SkipEmpty);
/// assert_eq!(decide("# Agents\n", "# Agents\n"), UpdateDecision::SkipUnchanged);
/// assert_eq!(
///     decide("# Agents\nnew\n", "# Agents\n"),
///     UpdateDecision::Write("# Agents\nnew\n".into()),
/// );
/// ```
pub fn decide(proposed: &str, existing: &str) -> UpdateDecision {
    if proposed.trim().is_empty() {
        return UpdateDecision::SkipEmpty;
    }
    if proposed == existing {
        return UpdateDecision::SkipUnchanged;
    }
    UpdateDecision::Write(proposed.to_string())
}

/// [`decide`] over a [`DocumentState`].
pub fn decide_state(state: &DocumentState) -> UpdateDecision {
    decide(&state.proposed_content, &state.existing_content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_proposal_is_skipped_for_any_existing() {
        for existing in ["", "   ", "# Agents\n"] {
            assert_eq!(decide("", existing), UpdateDecision::SkipEmpty);
        }
    }

    #[test]
    fn whitespace_proposal_is_skipped() {
        assert_eq!(decide("   ", "x"), UpdateDecision::SkipEmpty);
        assert_eq!(decide("\n\t \r\n", ""), UpdateDecision::SkipEmpty);
    }

    #[test]
    fn whitespace_proposal_equal_to_existing_is_still_empty() {
        assert_eq!(decide("  ", "  "), UpdateDecision::SkipEmpty);
    }

    #[test]
    fn identical_proposal_is_unchanged() {
        let doc = "# Agents\n\nRetries: 3 attempts.\n";
        assert_eq!(decide(doc, doc), UpdateDecision::SkipUnchanged);
    }

    #[test]
    fn equality_is_exact() {
        let existing = "# Agents\n";
        assert_eq!(
            decide("# Agents", existing),
            UpdateDecision::Write("# Agents".into())
        );
        assert_eq!(
            decide("# Agents\n\n", existing),
            UpdateDecision::Write("# Agents\n\n".into())
        );
    }

    #[test]
    fn write_keeps_surrounding_whitespace() {
        let proposed = "\n  # Agents\n\nRetries: 3 attempts.\n\n";
        assert_eq!(
            decide(proposed, ""),
            UpdateDecision::Write(proposed.to_string())
        );
    }

    #[test]
    fn decide_state_uses_both_sides() {
        let state = DocumentState {
            existing_content: "old\n".into(),
            proposed_content: "new\n".into(),
        };
        assert_eq!(decide_state(&state), UpdateDecision::Write("new\n".into()));
    }
}

use std::fmt;

use scribe_core::{DocumentState, RunConfig, RunOutcome, ScribeError, UpdateDecision};
use serde::Serialize;
use tracing::{debug, info};

use crate::decision::decide_state;
use crate::github::ReviewSource;
use crate::llm::{GenerationRequest, TextGenerator};
use crate::normalize::normalize_comments;
use crate::prompt::build_prompt;
use crate::store::DocumentStore;

/// Result of a completed sync run.
///
/// # Examples
///
/// ```
/// use scribe_core::RunOutcome;
/// use scribe_sync::pipeline::SyncResult;
///
/// let result = SyncResult {
///     outcome: RunOutcome::Wrote { document: "AGENTS.md".into() },
///     comments: 3,
///     model: "gpt-4o".into(),
/// };
/// assert_eq!(result.to_string(), "wrote AGENTS.md");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    /// What the run did to the document.
    #[serde(flatten)]
    pub outcome: RunOutcome,
    /// Number of normalized review comments considered.
    pub comments: usize,
    /// Model identifier the run was configured with.
    pub model: String,
}

impl fmt::Display for SyncResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.outcome)
    }
}

/// Sync orchestrator: review data in, at most one document write out.
///
/// Runs every step sequentially: fetch PR metadata, line comments and
/// reviews; normalize; read the document; build the prompt; make one
/// synthesis call; decide; write. Any failure ends the run immediately with
/// the stage's [`ScribeError`] variant. The document is read once and written
/// at most once; nothing guards against a concurrent writer.
pub struct SyncPipeline<S, D, G> {
    run: RunConfig,
    source: S,
    store: D,
    generator: G,
}

impl<S, D, G> SyncPipeline<S, D, G>
where
    S: ReviewSource,
    D: DocumentStore,
    G: TextGenerator,
{
    /// Create a pipeline for one repository, pull request, and document.
    pub fn new(run: RunConfig, source: S, store: D, generator: G) -> Self {
        Self {
            run,
            source,
            store,
            generator,
        }
    }

    /// Execute the sync.
    ///
    /// # Errors
    ///
    /// - [`ScribeError::Fetch`] if any review data fetch fails
    /// - [`ScribeError::DocumentRead`] if the document exists but can't be read
    /// - [`ScribeError::Synthesis`] if the generation backend fails
    /// - [`ScribeError::DocumentWrite`] if a decided write fails
    pub async fn run(&self) -> Result<SyncResult, ScribeError> {
        let run = &self.run;
        info!(
            pr = run.pr_number,
            repository = %run.repository,
            document = %run.document.display(),
            "processing pull request"
        );

        let pr = self
            .source
            .pull_request(&run.repository, run.pr_number)
            .await?;
        let inline = self
            .source
            .inline_comments(&run.repository, run.pr_number)
            .await?;
        let reviews = self
            .source
            .thread_reviews(&run.repository, run.pr_number)
            .await?;

        let comments = normalize_comments(&reviews, &inline);
        info!(count = comments.len(), "found review comments");

        if comments.is_empty() {
            info!("no comments to process");
            let outcome = RunOutcome::NothingToProcess {
                document: run.document.clone(),
            };
            return Ok(self.finish(outcome, 0));
        }

        let existing = match self.store.read(&run.document)? {
            Some(content) => content,
            None => {
                info!(document = %run.document.display(), "document does not exist yet");
                String::new()
            }
        };

        let document_name = run.document.display().to_string();
        let prompt = build_prompt(&pr, &comments, &document_name, &existing);
        debug!(
            system_len = prompt.system.len(),
            prompt_len = prompt.user.len(),
            "built synthesis prompt"
        );

        info!(model = %run.model, "calling LLM to generate documentation");
        let request = GenerationRequest::new(prompt.system, prompt.user, run.model.clone());
        let proposed = self.generator.generate(&request).await?;

        let state = DocumentState {
            existing_content: existing,
            proposed_content: proposed,
        };
        let decision = decide_state(&state);
        match &decision {
            UpdateDecision::Write(content) => {
                self.store.write(&run.document, content)?;
                info!(document = %document_name, bytes = content.len(), "updated document");
            }
            UpdateDecision::SkipEmpty => {
                info!(document = %document_name, "no relevant changes, skipping update");
            }
            UpdateDecision::SkipUnchanged => {
                info!(document = %document_name, "content unchanged, skipping update");
            }
        }

        let outcome = RunOutcome::from_decision(run.document.clone(), &decision);
        Ok(self.finish(outcome, comments.len()))
    }

    fn finish(&self, outcome: RunOutcome, comments: usize) -> SyncResult {
        SyncResult {
            outcome,
            comments,
            model: self.run.model.clone(),
        }
    }
}

//! Review-driven documentation sync.
//!
//! Provides the sync pipeline: comment normalization, prompt construction,
//! the LLM client, the update decision, document storage, and GitHub PR
//! integration.

pub mod decision;
pub mod github;
pub mod llm;
pub mod normalize;
pub mod pipeline;
pub mod prompt;
pub mod store;

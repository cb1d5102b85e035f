use std::path::PathBuf;

/// Errors that can occur while syncing a document from review feedback.
///
/// Each pipeline stage has its own variant so a failed run always says where
/// it stopped. Library crates use this type directly; the binary renders it
/// through `miette` at the boundary.
///
/// # Examples
///
/// ```
/// use scribe_core::ScribeError;
///
/// let err = ScribeError::Config("missing PR number".into());
/// assert!(err.to_string().contains("missing PR number"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ScribeError {
    /// Invalid or missing run parameter.
    #[error("configuration error: {0}")]
    #[diagnostic(code(scribe::config))]
    Config(String),

    /// The review data source could not be queried.
    #[error("failed to fetch review data: {0}")]
    #[diagnostic(
        code(scribe::fetch),
        help("check GITHUB_TOKEN and that the pull request exists")
    )]
    Fetch(String),

    /// The target document exists but could not be read.
    #[error("failed to read {}: {message}", .path.display())]
    #[diagnostic(code(scribe::document_read))]
    DocumentRead {
        /// Document that was being read.
        path: PathBuf,
        /// Underlying failure.
        message: String,
    },

    /// The generation backend failed or returned an unusable envelope.
    #[error("synthesis failed: {0}")]
    #[diagnostic(code(scribe::synthesis))]
    Synthesis(String),

    /// Content was generated but could not be persisted.
    #[error("generated content for {} was not written: {message}", .path.display())]
    #[diagnostic(code(scribe::document_write))]
    DocumentWrite {
        /// Document that was being written.
        path: PathBuf,
        /// Underlying failure.
        message: String,
    },

    /// Filesystem I/O failure outside the document itself.
    #[error("IO error: {0}")]
    #[diagnostic(code(scribe::io))]
    Io(#[from] std::io::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    #[diagnostic(code(scribe::toml))]
    Toml(#[from] toml::de::Error),
}

impl ScribeError {
    /// Short name of the stage that failed, for machine-readable reports.
    ///
    /// # Examples
    ///
    /// ```
    /// use scribe_core::ScribeError;
    ///
    /// assert_eq!(ScribeError::Synthesis("429".into()).stage(), "synthesis");
    /// ```
    pub fn stage(&self) -> &'static str {
        match self {
            ScribeError::Config(_) | ScribeError::Toml(_) => "config",
            ScribeError::Fetch(_) => "fetch",
            ScribeError::DocumentRead { .. } => "documentRead",
            ScribeError::Synthesis(_) => "synthesis",
            ScribeError::DocumentWrite { .. } => "documentWrite",
            ScribeError::Io(_) => "io",
        }
    }
}

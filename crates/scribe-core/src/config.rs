use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ScribeError;
use crate::types::RepoId;

/// Top-level configuration loaded from `.scribe.toml`.
///
/// Supports layered resolution: CLI flags > env vars > local config > defaults.
///
/// # Examples
///
/// ```
/// use scribe_core::ScribeConfig;
///
/// let config = ScribeConfig::default();
/// assert_eq!(config.llm.provider, "anthropic");
/// assert!(config.llm.model.is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScribeConfig {
    /// Generation backend settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// GitHub access settings.
    #[serde(default)]
    pub github: GitHubConfig,
    /// Which document to keep in sync.
    #[serde(default)]
    pub sync: SyncConfig,
}

impl ScribeConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ScribeError::Io`] if the file cannot be read, or
    /// [`ScribeError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use scribe_core::ScribeConfig;
    /// use std::path::Path;
    ///
    /// let config = ScribeConfig::from_file(Path::new(".scribe.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, ScribeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ScribeError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use scribe_core::ScribeConfig;
    ///
    /// let toml = r#"
    /// [sync]
    /// document = "AGENTS.md"
    /// "#;
    /// let config = ScribeConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.sync.document.unwrap().to_str(), Some("AGENTS.md"));
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, ScribeError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// Generation backend configuration.
///
/// The model has no default: every run must name the model it synthesizes
/// with, either here, through `LLM_MODEL`, or on the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name (`"anthropic"` or `"openai"`; any OpenAI-compatible
    /// endpoint works with the latter).
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model identifier.
    pub model: Option<String>,
    /// API key for the provider.
    pub api_key: Option<String>,
    /// Custom base URL for API requests.
    pub base_url: Option<String>,
}

fn default_provider() -> String {
    "anthropic".into()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            api_key: None,
            base_url: None,
        }
    }
}

impl LlmConfig {
    /// Environment variables consulted for the API key, in priority order.
    ///
    /// # Examples
    ///
    /// ```
    /// use scribe_core::LlmConfig;
    ///
    /// let vars = LlmConfig::default().api_key_env_vars();
    /// assert_eq!(vars, ["LLM_API_KEY", "ANTHROPIC_API_KEY"]);
    /// ```
    pub fn api_key_env_vars(&self) -> [&'static str; 2] {
        let provider_var = match self.provider.as_str() {
            "anthropic" => "ANTHROPIC_API_KEY",
            _ => "OPENAI_API_KEY",
        };
        ["LLM_API_KEY", provider_var]
    }
}

/// GitHub access configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Personal access token. Falls back to `GITHUB_TOKEN` / `GH_TOKEN`.
    pub token: Option<String>,
    /// API root for GitHub Enterprise installs.
    pub api_base: Option<String>,
}

/// Document sync configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Document to create or update (e.g. `AGENTS.md`).
    pub document: Option<PathBuf>,
}

/// Raw run parameters as they arrive from the command line or environment.
///
/// Everything is optional and unvalidated; [`RunConfig::resolve`] turns it
/// into a checked [`RunConfig`].
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    /// Repository identity in `owner/repo` form.
    pub repository: Option<String>,
    /// Pull request number, still as text.
    pub pr_number: Option<String>,
    /// Target document.
    pub document: Option<PathBuf>,
    /// Model identifier.
    pub model: Option<String>,
}

/// Validated parameters for a single sync run.
///
/// Built once at the process boundary and handed to the pipeline by value.
///
/// # Examples
///
/// ```
/// use scribe_core::{RunArgs, RunConfig, ScribeConfig};
///
/// let args = RunArgs {
///     repository: Some("octocat/hello-world".into()),
///     pr_number: Some("42".into()),
///     document: Some("AGENTS.md".into()),
///     model: Some("claude-sonnet-4-20250514".into()),
/// };
/// let run = RunConfig::resolve(args, &ScribeConfig::default()).unwrap();
/// assert_eq!(run.pr_number, 42);
/// assert_eq!(run.repository.to_string(), "octocat/hello-world");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Repository the pull request belongs to.
    pub repository: RepoId,
    /// Pull request number.
    pub pr_number: u64,
    /// Document to create or update.
    pub document: PathBuf,
    /// Model identifier passed to the generation backend.
    pub model: String,
}

impl RunConfig {
    /// Validate run parameters, filling gaps from the config file.
    ///
    /// # Errors
    ///
    /// Returns [`ScribeError::Config`] if any parameter is missing or
    /// malformed.
    pub fn resolve(args: RunArgs, config: &ScribeConfig) -> Result<Self, ScribeError> {
        let repository = args
            .repository
            .ok_or_else(|| missing("repository", "--repository or REPOSITORY"))?;
        let repository = RepoId::parse(&repository)?;

        let pr_number = args
            .pr_number
            .ok_or_else(|| missing("pull request number", "--pr-number or PR_NUMBER"))?;
        let pr_number = parse_pr_number(&pr_number)?;

        let document = args
            .document
            .or_else(|| config.sync.document.clone())
            .filter(|d| !d.as_os_str().is_empty())
            .ok_or_else(|| missing("document", "--doc, DOC_FILE or [sync] document"))?;

        let model = args
            .model
            .or_else(|| config.llm.model.clone())
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .ok_or_else(|| missing("model", "--model, LLM_MODEL or [llm] model"))?;

        Ok(Self {
            repository,
            pr_number,
            document,
            model,
        })
    }
}

/// Parse a pull request number, rejecting zero and non-numeric input.
///
/// # Errors
///
/// Returns [`ScribeError::Config`] if `raw` is not a positive integer.
///
/// # Examples
///
/// ```
/// use scribe_core::parse_pr_number;
///
/// assert_eq!(parse_pr_number(" 17 ").unwrap(), 17);
/// assert!(parse_pr_number("seventeen").is_err());
/// ```
pub fn parse_pr_number(raw: &str) -> Result<u64, ScribeError> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(ScribeError::Config(format!(
            "invalid pull request number '{raw}'"
        ))),
        Ok(n) => Ok(n),
    }
}

fn missing(what: &str, sources: &str) -> ScribeError {
    ScribeError::Config(format!("no {what} given (set {sources})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_args() -> RunArgs {
        RunArgs {
            repository: Some("acme/widgets".into()),
            pr_number: Some("7".into()),
            document: Some(PathBuf::from("AGENTS.md")),
            model: Some("gpt-4o".into()),
        }
    }

    #[test]
    fn default_config_has_expected_values() {
        let config = ScribeConfig::default();
        assert_eq!(config.llm.provider, "anthropic");
        assert!(config.llm.model.is_none());
        assert!(config.llm.api_key.is_none());
        assert!(config.github.token.is_none());
        assert!(config.sync.document.is_none());
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[llm]
provider = "openai"
model = "gpt-4o"
base_url = "http://localhost:11434"

[github]
api_base = "https://github.example.com/api/v3"

[sync]
document = "docs/AGENTS.md"
"#;
        let config = ScribeConfig::from_toml(toml).unwrap();
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model.as_deref(), Some("gpt-4o"));
        assert_eq!(
            config.llm.base_url.as_deref(),
            Some("http://localhost:11434")
        );
        assert_eq!(
            config.github.api_base.as_deref(),
            Some("https://github.example.com/api/v3")
        );
        assert_eq!(
            config.sync.document,
            Some(PathBuf::from("docs/AGENTS.md"))
        );
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = ScribeConfig::from_toml("").unwrap();
        assert_eq!(config.llm.provider, "anthropic");
        assert!(config.sync.document.is_none());
    }

    #[test]
    fn invalid_toml_returns_error() {
        let result = ScribeConfig::from_toml("{{invalid}}");
        assert!(result.is_err());
    }

    #[test]
    fn api_key_env_vars_follow_provider() {
        let openai = LlmConfig {
            provider: "openai".into(),
            ..LlmConfig::default()
        };
        assert_eq!(openai.api_key_env_vars(), ["LLM_API_KEY", "OPENAI_API_KEY"]);
    }

    #[test]
    fn resolve_accepts_complete_args() {
        let run = RunConfig::resolve(full_args(), &ScribeConfig::default()).unwrap();
        assert_eq!(run.repository.owner, "acme");
        assert_eq!(run.repository.repo, "widgets");
        assert_eq!(run.pr_number, 7);
        assert_eq!(run.document, PathBuf::from("AGENTS.md"));
        assert_eq!(run.model, "gpt-4o");
    }

    #[test]
    fn resolve_falls_back_to_config_file() {
        let mut config = ScribeConfig::default();
        config.sync.document = Some(PathBuf::from("CLAUDE.md"));
        config.llm.model = Some("claude-sonnet-4-20250514".into());
        let args = RunArgs {
            document: None,
            model: None,
            ..full_args()
        };
        let run = RunConfig::resolve(args, &config).unwrap();
        assert_eq!(run.document, PathBuf::from("CLAUDE.md"));
        assert_eq!(run.model, "claude-sonnet-4-20250514");
    }

    #[test]
    fn cli_args_override_config_file() {
        let mut config = ScribeConfig::default();
        config.sync.document = Some(PathBuf::from("CLAUDE.md"));
        let run = RunConfig::resolve(full_args(), &config).unwrap();
        assert_eq!(run.document, PathBuf::from("AGENTS.md"));
    }

    #[test]
    fn resolve_rejects_missing_repository() {
        let args = RunArgs {
            repository: None,
            ..full_args()
        };
        let err = RunConfig::resolve(args, &ScribeConfig::default()).unwrap_err();
        assert!(matches!(err, ScribeError::Config(_)));
        assert!(err.to_string().contains("repository"));
    }

    #[test]
    fn resolve_rejects_malformed_repository() {
        let args = RunArgs {
            repository: Some("just-a-name".into()),
            ..full_args()
        };
        let err = RunConfig::resolve(args, &ScribeConfig::default()).unwrap_err();
        assert!(matches!(err, ScribeError::Config(_)));
    }

    #[test]
    fn resolve_rejects_unparsable_pr_number() {
        let args = RunArgs {
            pr_number: Some("12abc".into()),
            ..full_args()
        };
        let err = RunConfig::resolve(args, &ScribeConfig::default()).unwrap_err();
        assert!(err.to_string().contains("12abc"));
    }

    #[test]
    fn resolve_rejects_blank_model() {
        let args = RunArgs {
            model: Some("   ".into()),
            ..full_args()
        };
        let err = RunConfig::resolve(args, &ScribeConfig::default()).unwrap_err();
        assert!(err.to_string().contains("model"));
    }

    #[test]
    fn pr_number_zero_is_rejected() {
        assert!(parse_pr_number("0").is_err());
    }
}

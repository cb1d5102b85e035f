use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use scribe_core::{OutputFormat, RunArgs, RunConfig, ScribeConfig, ScribeError};
use scribe_sync::github::{parse_pr_reference, GitHubClient};
use scribe_sync::llm::LlmClient;
use scribe_sync::pipeline::{SyncPipeline, SyncResult};
use scribe_sync::store::FsDocumentStore;
use tracing_subscriber::EnvFilter;

const CONFIG_FILE: &str = ".scribe.toml";

#[derive(Parser)]
#[command(
    name = "scribe",
    version,
    about = "Sync agent instruction files from pull request reviews",
    long_about = "Scribe reads the review discussion on a GitHub pull request and asks an LLM\n\
                   to fold it into an agent instructions file such as AGENTS.md.\n\n\
                   The document is only written when the model proposes a real change.\n\n\
                   Examples:\n  \
                     scribe sync --pr owner/repo#42 --doc AGENTS.md --model gpt-4o\n  \
                     REPOSITORY=owner/repo PR_NUMBER=42 DOC_FILE=AGENTS.md scribe sync\n  \
                     scribe init                       Create a .scribe.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (default: .scribe.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for the run outcome.\n\n\
                       Formats:\n  \
                         text  One outcome line, e.g. 'wrote AGENTS.md' (default)\n  \
                         json  Machine-readable JSON with camelCase keys"
    )]
    format: OutputFormat,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Update a document from a pull request's review comments
    #[command(long_about = "Update a document from a pull request's review comments.\n\n\
        Collects review submissions and line comments, sends them with the current\n\
        document to the LLM, and writes the result only if it is non-empty and\n\
        differs from what is already there.\n\n\
        Examples:\n  scribe sync --pr owner/repo#42 --doc AGENTS.md --model gpt-4o\n  \
        scribe sync --repository owner/repo --pr-number 42 --doc CLAUDE.md")]
    Sync(SyncArgs),
    /// Create a default .scribe.toml configuration file
    #[command(long_about = "Create a default .scribe.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .scribe.toml already exists.")]
    Init,
}

#[derive(clap::Args)]
struct SyncArgs {
    /// Repository in owner/repo form
    #[arg(long, env = "REPOSITORY")]
    repository: Option<String>,

    /// Pull request number
    #[arg(long, env = "PR_NUMBER")]
    pr_number: Option<String>,

    /// Pull request as owner/repo#number (overrides --repository and --pr-number)
    #[arg(long)]
    pr: Option<String>,

    /// Document to create or update
    #[arg(long, env = "DOC_FILE")]
    doc: Option<PathBuf>,

    /// Model identifier
    #[arg(long, env = "LLM_MODEL")]
    model: Option<String>,

    /// Directory that relative document paths resolve against
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

const DEFAULT_CONFIG: &str = r#"# Scribe Configuration

[llm]
# provider = "anthropic"   # or "openai" for any OpenAI-compatible endpoint
# model = "claude-sonnet-4-20250514"
# base_url = "https://api.anthropic.com"
# api_key: prefer LLM_API_KEY / ANTHROPIC_API_KEY / OPENAI_API_KEY

[github]
# token: prefer GITHUB_TOKEN / GH_TOKEN
# api_base = "https://github.example.com/api/v3"

[sync]
# document = "AGENTS.md"
"#;

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Init => {
            let path = Path::new(CONFIG_FILE);
            if path.exists() {
                miette::bail!(miette::miette!(
                    help = "Edit the existing file or remove it first",
                    "{} already exists",
                    CONFIG_FILE
                ));
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created {CONFIG_FILE} with default configuration");
        }
        Command::Sync(args) => match sync(cli.config.as_deref(), args).await {
            Ok(result) => match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&result).into_diagnostic()?
                    );
                }
                OutputFormat::Text => println!("{result}"),
            },
            Err(e) => {
                match cli.format {
                    OutputFormat::Json => {
                        let report = serde_json::json!({
                            "status": "failed",
                            "stage": e.stage(),
                            "error": e.to_string(),
                        });
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&report).into_diagnostic()?
                        );
                    }
                    OutputFormat::Text => println!("failed: {e}"),
                }
                return Err(miette::Report::new(e).wrap_err("failed"));
            }
        },
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("scribe={default_level},scribe_sync={default_level}"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ScribeConfig, ScribeError> {
    match path {
        Some(path) => ScribeConfig::from_file(path),
        None => {
            let default_path = Path::new(CONFIG_FILE);
            if default_path.exists() {
                ScribeConfig::from_file(default_path)
            } else {
                Ok(ScribeConfig::default())
            }
        }
    }
}

async fn sync(config_path: Option<&Path>, args: SyncArgs) -> Result<SyncResult, ScribeError> {
    let config = load_config(config_path)?;

    let (repository, pr_number) = match &args.pr {
        Some(pr_ref) => {
            let (repo, number) = parse_pr_reference(pr_ref)?;
            (Some(repo.to_string()), Some(number.to_string()))
        }
        None => (args.repository, args.pr_number),
    };
    let run = RunConfig::resolve(
        RunArgs {
            repository,
            pr_number,
            document: args.doc,
            model: args.model,
        },
        &config,
    )?;

    let mut llm_config = config.llm.clone();
    if llm_config.api_key.is_none() {
        llm_config.api_key = llm_config
            .api_key_env_vars()
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()));
    }
    if llm_config.api_key.is_none() && llm_config.base_url.is_none() {
        let [generic, provider] = llm_config.api_key_env_vars();
        return Err(ScribeError::Config(format!(
            "no API key for LLM provider '{}'. Set {generic} or {provider}, or add api_key under [llm]",
            llm_config.provider
        )));
    }

    tracing::debug!(
        provider = %llm_config.provider,
        model = %run.model,
        root = %args.root.display(),
        "resolved run configuration"
    );

    let github = GitHubClient::new(
        config.github.token.as_deref(),
        config.github.api_base.as_deref(),
    )?;
    let llm = LlmClient::new(&llm_config)?;
    let store = FsDocumentStore::new(args.root);

    SyncPipeline::new(run, github, store, llm).run().await
}

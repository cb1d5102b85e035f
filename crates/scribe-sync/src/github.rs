use async_trait::async_trait;
use scribe_core::{
    parse_pr_number, GitHubUser, PullRequestContext, RawInlineComment, RawThreadReview, RepoId,
    ScribeError,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const PER_PAGE: usize = 100;

/// Read-only access to a pull request and its review discussion.
///
/// Every failure is reported as [`ScribeError::Fetch`].
#[async_trait]
pub trait ReviewSource: Send + Sync {
    /// Title, description, and author of the pull request.
    async fn pull_request(
        &self,
        repo: &RepoId,
        number: u64,
    ) -> Result<PullRequestContext, ScribeError>;

    /// Every line comment on the pull request, oldest first.
    async fn inline_comments(
        &self,
        repo: &RepoId,
        number: u64,
    ) -> Result<Vec<RawInlineComment>, ScribeError>;

    /// Every review submission on the pull request, oldest first.
    async fn thread_reviews(
        &self,
        repo: &RepoId,
        number: u64,
    ) -> Result<Vec<RawThreadReview>, ScribeError>;
}

/// GitHub REST client for pull request review data.
///
/// # Examples
///
/// ```
/// use scribe_sync::github::parse_pr_reference;
///
/// let (repo, number) = parse_pr_reference("rust-lang/rust#12345").unwrap();
/// assert_eq!(repo.owner, "rust-lang");
/// assert_eq!(repo.repo, "rust");
/// assert_eq!(number, 12345);
/// ```
pub struct GitHubClient {
    octocrab: octocrab::Octocrab,
}

#[derive(Deserialize)]
struct RawPullRequest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    user: Option<GitHubUser>,
}

#[derive(Serialize)]
struct PageParams {
    per_page: usize,
    page: u32,
}

impl GitHubClient {
    /// Create a client from an explicit token or the `GITHUB_TOKEN` / `GH_TOKEN`
    /// environment variables.
    ///
    /// `api_base` points the client at a GitHub Enterprise install.
    ///
    /// # Errors
    ///
    /// Returns [`ScribeError::Config`] if no token is available or the API
    /// base is not a valid URI, or [`ScribeError::Fetch`] if the client
    /// cannot be built.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use scribe_sync::github::GitHubClient;
    ///
    /// let client = GitHubClient::new(Some("ghp_xxxx"), None).unwrap();
    /// ```
    pub fn new(token: Option<&str>, api_base: Option<&str>) -> Result<Self, ScribeError> {
        let token = match token {
            Some(t) => t.to_string(),
            None => std::env::var("GITHUB_TOKEN")
                .or_else(|_| std::env::var("GH_TOKEN"))
                .map_err(|_| {
                    ScribeError::Config(
                        "GITHUB_TOKEN not set. Set GITHUB_TOKEN, GH_TOKEN, or [github] token".into(),
                    )
                })?,
        };

        let mut builder = octocrab::Octocrab::builder().personal_token(token);
        if let Some(base) = api_base {
            builder = builder.base_uri(base).map_err(|e| {
                ScribeError::Config(format!("invalid GitHub API base '{base}': {e}"))
            })?;
        }
        let octocrab = builder
            .build()
            .map_err(|e| ScribeError::Fetch(format!("failed to create GitHub client: {e}")))?;

        Ok(Self { octocrab })
    }

    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        route: &str,
        what: &str,
    ) -> Result<Vec<T>, ScribeError> {
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let params = PageParams {
                per_page: PER_PAGE,
                page,
            };
            let batch: Vec<T> = self
                .octocrab
                .get(route, Some(&params))
                .await
                .map_err(|e| ScribeError::Fetch(format!("failed to list {what}: {e}")))?;
            let done = batch.len() < PER_PAGE;
            items.extend(batch);
            if done {
                return Ok(items);
            }
            page += 1;
        }
    }
}

#[async_trait]
impl ReviewSource for GitHubClient {
    async fn pull_request(
        &self,
        repo: &RepoId,
        number: u64,
    ) -> Result<PullRequestContext, ScribeError> {
        let route = format!("/repos/{}/{}/pulls/{number}", repo.owner, repo.repo);
        let pr: RawPullRequest = self
            .octocrab
            .get(route, None::<&()>)
            .await
            .map_err(|e| ScribeError::Fetch(format!("failed to fetch PR #{number}: {e}")))?;

        Ok(PullRequestContext {
            title: pr.title.unwrap_or_default(),
            description: pr.body,
            author: pr
                .user
                .map(|u| u.login)
                .unwrap_or_else(|| crate::normalize::GHOST_AUTHOR.to_string()),
        })
    }

    async fn inline_comments(
        &self,
        repo: &RepoId,
        number: u64,
    ) -> Result<Vec<RawInlineComment>, ScribeError> {
        let route = format!("/repos/{}/{}/pulls/{number}/comments", repo.owner, repo.repo);
        self.get_all_pages(&route, "review comments").await
    }

    async fn thread_reviews(
        &self,
        repo: &RepoId,
        number: u64,
    ) -> Result<Vec<RawThreadReview>, ScribeError> {
        let route = format!("/repos/{}/{}/pulls/{number}/reviews", repo.owner, repo.repo);
        self.get_all_pages(&route, "reviews").await
    }
}

/// Parse a PR reference string (`owner/repo#number`) into its components.
///
/// # Errors
///
/// Returns [`ScribeError::Config`] if the format is invalid.
///
/// # Examples
///
/// ```
/// use scribe_sync::github::parse_pr_reference;
///
/// let (repo, num) = parse_pr_reference("octocat/hello-world#42").unwrap();
/// assert_eq!(repo.to_string(), "octocat/hello-world");
/// assert_eq!(num, 42);
/// ```
pub fn parse_pr_reference(pr_ref: &str) -> Result<(RepoId, u64), ScribeError> {
    let Some((owner_repo, number_str)) = pr_ref.split_once('#') else {
        return Err(ScribeError::Config(format!(
            "invalid PR reference '{pr_ref}', expected owner/repo#number"
        )));
    };
    let repo = RepoId::parse(owner_repo)?;
    let number = parse_pr_number(number_str)?;
    Ok((repo, number))
}

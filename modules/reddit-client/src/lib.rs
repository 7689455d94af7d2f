pub mod error;
pub mod types;

pub use error::{RedditError, Result};
pub use types::{
    AccessTokenResponse, Listing, ListingData, SearchParams, SortOrder, Submission, Thing,
    TimeFilter,
};

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

const AUTH_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE_URL: &str = "https://oauth.reddit.com";

/// Refresh the token this long before Reddit says it expires.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Application-only OAuth client for the Reddit REST API.
pub struct RedditClient {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<CachedToken>>,
}

impl RedditClient {
    pub fn new(client_id: &str, client_secret: &str, user_agent: &str) -> Result<Self> {
        // Reddit answers searches of missing subreddits with a redirect to the
        // subreddit search page; keep the 3xx so it can be reported.
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            token: Mutex::new(None),
        })
    }

    /// Return a valid bearer token, fetching a new one if the cached token is stale.
    pub async fn access_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        let resp = self
            .client
            .post(AUTH_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RedditError::Auth {
                status: status.as_u16(),
                message: body,
            });
        }

        let token: AccessTokenResponse = resp.json().await?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_REFRESH_MARGIN);
        tracing::debug!(expires_in = token.expires_in, "Obtained Reddit access token");

        *guard = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }

    /// Search one subreddit, following the `after` cursor until `params.limit`
    /// submissions are collected or the listing runs out.
    pub async fn search_subreddit(
        &self,
        subreddit: &str,
        params: &SearchParams,
    ) -> Result<Vec<Submission>> {
        tracing::debug!(subreddit, query = %params.query, limit = params.limit, "Searching subreddit");

        let mut submissions: Vec<Submission> = Vec::new();
        let mut after: Option<String> = None;

        while (submissions.len() as u32) < params.limit {
            let remaining = params.limit - submissions.len() as u32;
            let page = self.search_page(subreddit, params, after.as_deref(), remaining).await?;

            let page_len = page.data.children.len();
            submissions.extend(
                page.data
                    .children
                    .into_iter()
                    .filter(|thing| thing.kind == "t3")
                    .map(|thing| thing.data)
                    .take(remaining as usize),
            );

            match page.data.after {
                Some(cursor) if page_len > 0 => after = Some(cursor),
                _ => break,
            }
        }

        tracing::debug!(subreddit, count = submissions.len(), "Subreddit search complete");
        Ok(submissions)
    }

    async fn search_page(
        &self,
        subreddit: &str,
        params: &SearchParams,
        after: Option<&str>,
        remaining: u32,
    ) -> Result<Listing<Submission>> {
        let token = self.access_token().await?;
        let url = format!("{}/r/{}/search", API_BASE_URL, subreddit);

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .query(&params.page_query(after, remaining))
            .send()
            .await?;

        log_rate_limit(resp.headers());

        let status = resp.status();
        if status.is_redirection() || status == reqwest::StatusCode::NOT_FOUND {
            return Err(RedditError::NotFound(subreddit.to_string()));
        }
        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(RedditError::Forbidden(subreddit.to_string()));
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            // Token revoked early; drop it so the next call re-authenticates.
            self.token.lock().await.take();
            let body = resp.text().await.unwrap_or_default();
            return Err(RedditError::Auth {
                status: status.as_u16(),
                message: body,
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RedditError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        let listing: Listing<Submission> = serde_json::from_str(&body)?;
        Ok(listing)
    }
}

fn log_rate_limit(headers: &reqwest::header::HeaderMap) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    if let Some(remaining) = header("x-ratelimit-remaining") {
        tracing::debug!(
            remaining = %remaining,
            reset_secs = header("x-ratelimit-reset").as_deref().unwrap_or("?"),
            "Reddit rate limit"
        );
    }
}

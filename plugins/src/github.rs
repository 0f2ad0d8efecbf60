use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};

use triage_core::api::{Commenter, GithubConfig};

use crate::http::{ensure_success, HttpError};

const API_VERSION: &str = "2022-11-28";

/// Posts issue comments through the GitHub REST API.
pub struct GithubCommenter {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl GithubCommenter {
    pub fn new(cfg: &GithubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&cfg.user_agent)?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self {
            http,
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            token: cfg.token.clone(),
        })
    }

    fn comments_url(&self, repository: &str, issue: u64) -> Result<String> {
        let (owner, repo) = split_repository(repository)?;
        Ok(format!(
            "{}/repos/{owner}/{repo}/issues/{issue}/comments",
            self.api_base
        ))
    }
}

fn split_repository(repository: &str) -> Result<(&str, &str)> {
    match repository.split_once('/') {
        Some((owner, repo))
            if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
        {
            Ok((owner, repo))
        }
        _ => Err(anyhow!("repository must be owner/name, got: {repository}")),
    }
}

#[async_trait]
impl Commenter for GithubCommenter {
    async fn comment(&self, repository: &str, issue: u64, body: &str) -> Result<()> {
        let url = self.comments_url(repository, issue)?;
        tracing::debug!(stage = "github.comment.in", url = %url, body_len = body.len());

        let mut req = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "body": body }));
        if !self.token.trim().is_empty() {
            req = req.bearer_auth(&self.token);
        }
        let resp = req
            .send()
            .await
            .map_err(|err| HttpError::from_reqwest(err, url.clone()))?;
        let status = resp.status();
        ensure_success(resp).await?;
        tracing::debug!(stage = "github.comment.out", status = %status);
        Ok(())
    }
}

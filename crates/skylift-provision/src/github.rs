//! GitHub REST client.
//!
//! One operation: create a repository for the deployment when the env file
//! carries a token but no repo. Uses the classic `token` authorization
//! scheme, which works for both classic and fine-grained PATs.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use skylift_core::error::{SkyliftError, SkyliftResult};

use crate::graphql::transport_error;

/// Public GitHub REST base URL.
pub const GITHUB_API_URL: &str = "https://api.github.com";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = "skylift";

/// Request body for a new repository under the authenticated user.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRepo {
    pub name: String,
    pub description: String,
    pub private: bool,
    pub auto_init: bool,
}

impl CreateRepo {
    /// Public auto-initialized repository, ready to receive a push.
    pub fn public(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            private: false,
            auto_init: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubRepo {
    pub full_name: String,
    pub clone_url: String,
}

/// GitHub API client (`token` auth).
#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    base_url: String,
    token: String,
}

impl GithubClient {
    pub fn new(token: impl Into<String>) -> SkyliftResult<Self> {
        Self::with_base_url(token, GITHUB_API_URL)
    }

    /// Client against a non-default base URL (used by tests).
    pub fn with_base_url(
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> SkyliftResult<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(transport_error)?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            token: token.into(),
        })
    }

    /// Create a repository under the authenticated user and return its
    /// clone URL.
    pub async fn create_repo(&self, request: &CreateRepo) -> SkyliftResult<GithubRepo> {
        let response = self
            .client
            .post(format!("{}/user/repos", self.base_url))
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", "application/vnd.github.v3+json")
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(SkyliftError::unauthorized(
                "GitHub rejected the token (HTTP 401)",
            ));
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SkyliftError::api(format!(
                "GitHub returned HTTP {}: {}",
                status, body
            )));
        }
        response.json().await.map_err(transport_error)
    }
}

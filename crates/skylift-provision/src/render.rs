//! Render REST client.
//!
//! Small surface: list owners, create a web service. Render's API is plain
//! REST with JSON bodies, so the envelope handling here is just status-code
//! classification.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use skylift_core::artifacts::EnvVarEntry;
use skylift_core::error::{SkyliftError, SkyliftResult};

use crate::graphql::transport_error;

/// Public Render REST base URL.
pub const RENDER_BASE_URL: &str = "https://api.render.com/v1";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// An account or team that can own services.
#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Request body for a new web service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWebService {
    #[serde(rename = "type")]
    pub service_type: String,
    pub name: String,
    pub owner_id: String,
    pub repo: String,
    pub branch: String,
    pub plan_id: String,
    pub region: String,
    pub build_command: String,
    pub start_command: String,
    pub env_vars: Vec<EnvVarEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderService {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub service_details_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateServiceResponse {
    service: RenderService,
}

/// Render API client (bearer-token auth).
#[derive(Clone)]
pub struct RenderClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RenderClient {
    pub fn new(api_key: impl Into<String>) -> SkyliftResult<Self> {
        Self::with_base_url(api_key, RENDER_BASE_URL)
    }

    /// Client against a non-default base URL (used by tests).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> SkyliftResult<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(transport_error)?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    async fn check(&self, response: reqwest::Response) -> SkyliftResult<reqwest::Response> {
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(SkyliftError::unauthorized(
                "Render API key invalid or expired",
            ));
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SkyliftError::api(format!(
                "Render returned HTTP {}: {}",
                status, body
            )));
        }
        Ok(response)
    }

    /// Owners visible to the key. The first entry is the personal account.
    pub async fn list_owners(&self) -> SkyliftResult<Vec<Owner>> {
        let response = self
            .client
            .get(format!("{}/owners", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(transport_error)?;
        let response = self.check(response).await?;

        // Each element wraps the owner in an `owner` key.
        #[derive(Deserialize)]
        struct OwnerWrapper {
            owner: Owner,
        }
        let wrapped: Vec<OwnerWrapper> = response.json().await.map_err(transport_error)?;
        Ok(wrapped.into_iter().map(|w| w.owner).collect())
    }

    pub async fn create_web_service(
        &self,
        request: &CreateWebService,
    ) -> SkyliftResult<RenderService> {
        let response = self
            .client
            .post(format!("{}/services", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;
        let response = self.check(response).await?;
        let body: CreateServiceResponse = response.json().await.map_err(transport_error)?;
        Ok(body.service)
    }
}

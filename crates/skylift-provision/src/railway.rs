//! Railway GraphQL client.
//!
//! Covers the operations the provisioning driver needs: project and service
//! listing, creation, variable upserts, start-command updates, repo linking,
//! and Redis connection discovery. No retry policy lives here beyond the
//! observed serviceCreate variant fallback; callers decide whether to poll.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, warn};

use skylift_core::error::{SkyliftError, SkyliftResult};
use skylift_core::resource::ResourceRef;

use crate::graphql::{classify_errors, transport_error, GraphqlRequest, GraphqlResponse};

/// Public Railway GraphQL endpoint.
pub const RAILWAY_ENDPOINT: &str = "https://backboard.railway.app/graphql/v2";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where a new service pulls its code or image from.
#[derive(Debug, Clone)]
pub enum ServiceSource {
    /// A GitHub `owner/repo` slug plus branch.
    Repo { repo: String, branch: String },
    /// A container image reference.
    Image { image: String },
}

impl ServiceSource {
    pub fn repo(repo: impl Into<String>) -> Self {
        Self::Repo {
            repo: repo.into(),
            branch: "main".to_string(),
        }
    }

    pub fn image(image: impl Into<String>) -> Self {
        Self::Image {
            image: image.into(),
        }
    }

    fn config(&self, name: &str) -> Value {
        match self {
            ServiceSource::Repo { repo, branch } => json!({
                "name": name,
                "source": { "repo": repo, "branch": branch }
            }),
            ServiceSource::Image { image } => json!({
                "name": name,
                "source": { "image": image }
            }),
        }
    }

    /// Alternate mutation shape tried after an application-level error on
    /// a repo source (observed variant-A-then-variant-B pattern).
    fn fallback_config(&self, name: &str) -> Option<Value> {
        match self {
            ServiceSource::Repo { repo, .. } => Some(json!({
                "name": name,
                "template": "railway",
                "source": { "repo": repo }
            })),
            ServiceSource::Image { .. } => None,
        }
    }
}

/// A service together with its remote variable table.
#[derive(Debug, Clone)]
pub struct ServiceVariables {
    pub service: ResourceRef,
    pub variables: HashMap<String, String>,
}

/// Railway API client (bearer-token auth).
#[derive(Clone)]
pub struct RailwayClient {
    client: Client,
    endpoint: String,
    token: String,
}

impl RailwayClient {
    pub fn new(token: impl Into<String>) -> SkyliftResult<Self> {
        Self::with_endpoint(token, RAILWAY_ENDPOINT)
    }

    /// Client against a non-default endpoint (used by tests).
    pub fn with_endpoint(
        token: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> SkyliftResult<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(transport_error)?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
        })
    }

    /// Send one GraphQL request and unwrap the envelope. Transport failures
    /// become `Network`, an `errors` array becomes `Api`/`Unauthorized`.
    async fn execute(&self, query: &str, variables: Option<Value>) -> SkyliftResult<Value> {
        debug!(endpoint = %self.endpoint, "Sending GraphQL request");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&GraphqlRequest { query, variables })
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(SkyliftError::unauthorized(
                "Railway rejected the API token (HTTP 401)",
            ));
        }
        if !response.status().is_success() {
            return Err(SkyliftError::api(format!(
                "Railway returned HTTP {}",
                response.status()
            )));
        }

        let body: GraphqlResponse = response.json().await.map_err(transport_error)?;
        if let Some(errors) = &body.errors {
            if !errors.is_empty() {
                return Err(classify_errors(errors));
            }
        }
        body.data
            .ok_or_else(|| SkyliftError::api("GraphQL response carried no data"))
    }

    /// Projects visible to the token.
    pub async fn list_projects(&self) -> SkyliftResult<Vec<ResourceRef>> {
        const QUERY: &str =
            "query { me { projects { edges { node { id name } } } } }";
        let data = self.execute(QUERY, None).await?;
        Ok(collect_edges(&data["me"]["projects"]))
    }

    /// Services of one project.
    pub async fn list_services(&self, project_id: &str) -> SkyliftResult<Vec<ResourceRef>> {
        const QUERY: &str = "query Services($projectId: String!) { project(id: $projectId) { services { edges { node { id name } } } } }";
        let data = self
            .execute(QUERY, Some(json!({ "projectId": project_id })))
            .await?;
        Ok(collect_edges(&data["project"]["services"]))
    }

    pub async fn create_project(&self, name: &str) -> SkyliftResult<ResourceRef> {
        const MUTATION: &str = "mutation ProjectCreate($name: String!) { projectCreate(input: { name: $name }) { project { id name } } }";
        let data = self.execute(MUTATION, Some(json!({ "name": name }))).await?;
        node_ref(&data["projectCreate"]["project"])
            .ok_or_else(|| SkyliftError::api("projectCreate returned no project"))
    }

    /// Create a service. On an application-level error with a repo source
    /// the template-based mutation variant is tried once before giving up;
    /// transport and authorization failures propagate immediately.
    pub async fn create_service(
        &self,
        project_id: &str,
        name: &str,
        source: &ServiceSource,
    ) -> SkyliftResult<ResourceRef> {
        const MUTATION: &str = "mutation ServiceCreate($projectId: String!, $config: ServiceCreateConfig!) { serviceCreate(projectId: $projectId, config: $config) { id name } }";

        let variables = json!({ "projectId": project_id, "config": source.config(name) });
        let first = self.execute(MUTATION, Some(variables)).await;
        let err = match first {
            Ok(data) => {
                return node_ref(&data["serviceCreate"])
                    .ok_or_else(|| SkyliftError::api("serviceCreate returned no service"));
            }
            Err(e @ SkyliftError::Api(_)) => e,
            Err(e) => return Err(e),
        };

        let Some(fallback) = source.fallback_config(name) else {
            return Err(err);
        };
        warn!(service = name, error = %err, "serviceCreate failed, trying template variant");
        let variables = json!({ "projectId": project_id, "config": fallback });
        let data = self.execute(MUTATION, Some(variables)).await?;
        node_ref(&data["serviceCreate"])
            .ok_or_else(|| SkyliftError::api("serviceCreate returned no service"))
    }

    /// Create-if-absent-else-update for one environment variable.
    pub async fn upsert_variable(
        &self,
        service_id: &str,
        name: &str,
        value: &str,
    ) -> SkyliftResult<()> {
        const MUTATION: &str = "mutation VariableUpsert($serviceId: String!, $name: String!, $value: String!) { variableUpsert(serviceId: $serviceId, name: $name, value: $value) { id name } }";
        self.execute(
            MUTATION,
            Some(json!({ "serviceId": service_id, "name": name, "value": value })),
        )
        .await
        .map(|_| ())
    }

    pub async fn set_start_command(&self, service_id: &str, command: &str) -> SkyliftResult<()> {
        const MUTATION: &str = "mutation ServiceUpdate($id: String!, $startCommand: String!) { serviceUpdate(id: $id, input: { startCommand: $startCommand }) { id } }";
        self.execute(
            MUTATION,
            Some(json!({ "id": service_id, "startCommand": command })),
        )
        .await
        .map(|_| ())
    }

    /// Link a GitHub `owner/repo` slug to a project.
    pub async fn link_repo(&self, project_id: &str, repo: &str) -> SkyliftResult<()> {
        const MUTATION: &str = "mutation ProjectUpdate($id: String!, $repo: String!) { projectUpdate(id: $id, input: { githubRepo: $repo }) { id } }";
        self.execute(MUTATION, Some(json!({ "id": project_id, "repo": repo })))
            .await
            .map(|_| ())
    }

    /// Services of a project together with their variable tables.
    pub async fn service_variables(
        &self,
        project_id: &str,
    ) -> SkyliftResult<Vec<ServiceVariables>> {
        const QUERY: &str = "query ServiceVariables($projectId: String!) { project(id: $projectId) { services { edges { node { id name variables { edges { node { name value } } } } } } } }";
        let data = self
            .execute(QUERY, Some(json!({ "projectId": project_id })))
            .await?;

        let mut result = Vec::new();
        let Some(edges) = data["project"]["services"]["edges"].as_array() else {
            return Ok(result);
        };
        for edge in edges {
            let node = &edge["node"];
            let Some(service) = node_ref(node) else {
                continue;
            };
            let mut variables = HashMap::new();
            if let Some(var_edges) = node["variables"]["edges"].as_array() {
                for var_edge in var_edges {
                    let var = &var_edge["node"];
                    if let (Some(name), Some(value)) = (var["name"].as_str(), var["value"].as_str())
                    {
                        variables.insert(name.to_string(), value.to_string());
                    }
                }
            }
            result.push(ServiceVariables { service, variables });
        }
        Ok(result)
    }

    /// Assemble a Redis connection URL from a project's valkey/redis
    /// service variables, if the service has been provisioned far enough
    /// to expose them.
    pub async fn find_redis_url(&self, project_id: &str) -> SkyliftResult<Option<String>> {
        let services = self.service_variables(project_id).await?;
        for entry in services {
            let name = entry.service.name.to_ascii_lowercase();
            if !name.contains("valkey") && !name.contains("redis") {
                continue;
            }
            let host = entry.variables.get("RAILWAY_PRIVATE_DOMAIN");
            let password = entry
                .variables
                .get("VALKEY_PASSWORD")
                .or_else(|| entry.variables.get("REDIS_PASSWORD"));
            let port = entry
                .variables
                .get("PORT")
                .map(String::as_str)
                .unwrap_or("6379");
            if let (Some(host), Some(password)) = (host, password) {
                return Ok(Some(format!(
                    "redis://default:{}@{}:{}",
                    password, host, port
                )));
            }
        }
        Ok(None)
    }
}

fn collect_edges(connection: &Value) -> Vec<ResourceRef> {
    connection["edges"]
        .as_array()
        .map(|edges| edges.iter().filter_map(|e| node_ref(&e["node"])).collect())
        .unwrap_or_default()
}

fn node_ref(node: &Value) -> Option<ResourceRef> {
    Some(ResourceRef::new(
        node["id"].as_str()?,
        node["name"].as_str().unwrap_or_default(),
    ))
}

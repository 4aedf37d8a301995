//! Idempotent provisioning driver.
//!
//! Every run walks the same path: list what the platform already has, reuse
//! a match when one exists, create otherwise, then apply attributes one by
//! one. Attribute failures are isolated so a single refused upsert never
//! aborts the run; they surface in the report instead.

use tracing::{debug, info, warn};

use skylift_core::config::DeployInputs;
use skylift_core::error::SkyliftResult;
use skylift_core::resource::{
    AttributeOutcome, EnvVarSet, ProvisionReport, ProvisionState, ResourceRef,
};

use crate::railway::{RailwayClient, ServiceSource};

/// Everything needed to provision one service end to end.
#[derive(Debug, Clone)]
pub struct ServicePlan {
    /// Project the service lives in.
    pub project: ResourceRef,
    /// Substring used to recognize an existing service.
    pub fragment: String,
    /// Name used when the service has to be created.
    pub name: String,
    pub source: ServiceSource,
    pub variables: EnvVarSet,
    pub start_command: Option<String>,
}

/// Drives Railway resources from listing through attribute configuration.
pub struct ProvisionDriver<'a> {
    railway: &'a RailwayClient,
}

impl<'a> ProvisionDriver<'a> {
    pub fn new(railway: &'a RailwayClient) -> Self {
        Self { railway }
    }

    /// Find a project whose name contains `fragment` (case-insensitive,
    /// first match), creating `create_name` when none does.
    pub async fn ensure_project(
        &self,
        fragment: &str,
        create_name: &str,
    ) -> SkyliftResult<(ResourceRef, ProvisionState)> {
        let projects = self.railway.list_projects().await?;
        debug!(count = projects.len(), "Listed projects");
        if let Some(existing) = find_by_fragment(&projects, fragment) {
            info!(project = %existing, "Reusing existing project");
            return Ok((existing.clone(), ProvisionState::Found));
        }
        info!(name = create_name, "No matching project, creating one");
        let created = self.railway.create_project(create_name).await?;
        Ok((created, ProvisionState::Created))
    }

    /// Same contract as [`ensure_project`](Self::ensure_project), for
    /// services within a project.
    pub async fn ensure_service(
        &self,
        project_id: &str,
        fragment: &str,
        create_name: &str,
        source: &ServiceSource,
    ) -> SkyliftResult<(ResourceRef, ProvisionState)> {
        let services = self.railway.list_services(project_id).await?;
        debug!(count = services.len(), "Listed services");
        if let Some(existing) = find_by_fragment(&services, fragment) {
            info!(service = %existing, "Reusing existing service");
            return Ok((existing.clone(), ProvisionState::Found));
        }
        info!(name = create_name, "No matching service, creating one");
        let created = self
            .railway
            .create_service(project_id, create_name, source)
            .await?;
        Ok((created, ProvisionState::Created))
    }

    /// Upsert each variable independently, collecting one outcome per
    /// entry. Failures are logged and kept for the report.
    pub async fn apply_variables(
        &self,
        service_id: &str,
        vars: &EnvVarSet,
    ) -> Vec<AttributeOutcome> {
        let mut outcomes = Vec::with_capacity(vars.len());
        for (name, value) in vars.iter() {
            match self.railway.upsert_variable(service_id, name, value).await {
                Ok(()) => {
                    debug!(variable = name, "Variable applied");
                    outcomes.push(AttributeOutcome::ok(name));
                }
                Err(e) => {
                    warn!(variable = name, error = %e, "Variable upsert failed");
                    outcomes.push(AttributeOutcome::failed(name, e.to_string()));
                }
            }
        }
        outcomes
    }

    pub async fn apply_start_command(
        &self,
        service_id: &str,
        command: &str,
    ) -> AttributeOutcome {
        match self.railway.set_start_command(service_id, command).await {
            Ok(()) => AttributeOutcome::ok("start command"),
            Err(e) => {
                warn!(error = %e, "Start command update failed");
                AttributeOutcome::failed("start command", e.to_string())
            }
        }
    }

    /// Run one plan end to end and summarize the outcome.
    ///
    /// Listing and creation failures propagate (nothing to configure
    /// without a service); attribute failures do not.
    pub async fn provision_service(&self, plan: &ServicePlan) -> SkyliftResult<ProvisionReport> {
        let (service, state) = self
            .ensure_service(&plan.project.id, &plan.fragment, &plan.name, &plan.source)
            .await?;
        let reused = state == ProvisionState::Found;

        let mut attributes = self.apply_variables(&service.id, &plan.variables).await;
        if let Some(command) = &plan.start_command {
            attributes.push(self.apply_start_command(&service.id, command).await);
        }

        let state = if attributes.iter().all(AttributeOutcome::succeeded) {
            ProvisionState::Done
        } else {
            ProvisionState::PartiallyDone
        };
        Ok(ProvisionReport {
            resource: service,
            state,
            reused,
            attributes,
        })
    }
}

fn find_by_fragment<'r>(resources: &'r [ResourceRef], fragment: &str) -> Option<&'r ResourceRef> {
    let fragment = fragment.to_ascii_lowercase();
    resources
        .iter()
        .find(|r| r.name.to_ascii_lowercase().contains(&fragment))
}

/// Variable table for the background worker service.
pub fn worker_variables(
    inputs: &DeployInputs,
    redis_url: Option<&str>,
    secret_key: &str,
) -> EnvVarSet {
    let mut vars = EnvVarSet::new();
    vars.set("DATABASE_URL", &inputs.database_url)
        .set_opt("REDIS_URL", redis_url)
        .set("SECRET_KEY_BASE", secret_key)
        .set("FRONTEND_URL", &inputs.frontend_url)
        .set("RAILS_ENV", "production")
        .set("NODE_ENV", "production")
        .set("RAILS_LOG_TO_STDOUT", "true")
        .set("RAILS_MAX_THREADS", "5")
        .set(
            "WORKER_COMMAND",
            skylift_core::artifacts::WORKER_START_COMMAND,
        );
    vars
}

/// Variable table for the web service.
pub fn web_variables(
    inputs: &DeployInputs,
    redis_url: Option<&str>,
    secret_key: &str,
) -> EnvVarSet {
    let mut vars = EnvVarSet::new();
    vars.set("DATABASE_URL", &inputs.database_url)
        .set_opt("REDIS_URL", redis_url)
        .set("SECRET_KEY_BASE", secret_key)
        .set("FRONTEND_URL", &inputs.frontend_url)
        .set("RAILS_ENV", "production")
        .set("NODE_ENV", "production")
        .set("RAILS_LOG_TO_STDOUT", "true")
        .set("RAILS_MAX_THREADS", "5")
        .set("RAILS_SERVE_STATIC_FILES", "true")
        .set("WEB_CONCURRENCY", "2");
    vars
}

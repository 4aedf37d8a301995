//! Provision only the background worker service.

use std::path::Path;

use skylift_core::artifacts::WORKER_START_COMMAND;
use skylift_core::config::{repo_slug, DeployInputs};
use skylift_core::envfile::EnvFile;
use skylift_core::error::{SkyliftError, SkyliftResult};
use skylift_core::resource::ResourceRef;
use skylift_core::secret::generate_secret_key;
use skylift_provision::railway::RailwayClient;
use skylift_provision::{worker_variables, ProvisionDriver, ServicePlan, ServiceSource};

use crate::output;

const RAILWAY_DASHBOARD: &str = "https://railway.app/dashboard";

/// Execute the worker command
pub async fn execute(
    env_file: &Path,
    project_id: Option<String>,
    repo: Option<String>,
) -> SkyliftResult<()> {
    output::banner("Worker Service");

    let env = EnvFile::load(env_file)?;
    let inputs = DeployInputs::from_env_file(&env)?;

    let repo_url = repo.or_else(|| inputs.github_repo.clone());
    let slug = repo_url
        .as_deref()
        .and_then(repo_slug)
        .ok_or_else(|| {
            SkyliftError::config(
                "a GitHub repository is required: pass --repo or set GITHUB_REPO in the env file",
            )
        })?;

    let secret_key = inputs
        .secret_key_base
        .clone()
        .unwrap_or_else(generate_secret_key);

    let railway = RailwayClient::new(&inputs.railway_token)?;
    let driver = ProvisionDriver::new(&railway);

    let project = match project_id {
        Some(id) => ResourceRef::new(id, inputs.worker_name()),
        None => {
            let (project, _) = driver
                .ensure_project("worker", &inputs.worker_name())
                .await?;
            project
        }
    };

    let plan = ServicePlan {
        project: project.clone(),
        fragment: "worker".to_string(),
        name: inputs.worker_name(),
        source: ServiceSource::repo(slug),
        variables: worker_variables(&inputs, inputs.redis_url.as_deref(), &secret_key),
        start_command: Some(WORKER_START_COMMAND.to_string()),
    };

    let report = match driver.provision_service(&plan).await {
        Ok(report) => report,
        Err(e) => {
            output::warn_line(&format!("Service creation failed: {}", e));
            output::item(&format!("Open {}", RAILWAY_DASHBOARD));
            output::item(&format!("Create a service named \"{}\" in project {}", plan.name, project));
            output::item("Connect the GitHub repository and set the variables from railway.toml");
            return Err(e);
        }
    };

    output::success(&format!("{} configured", report.resource));
    for name in report.applied() {
        output::item(&format!("{} applied", name));
    }
    if report.is_partial() {
        output::warn_line("Some attributes could not be applied:");
        for step in report.manual_steps(RAILWAY_DASHBOARD) {
            output::item(&step);
        }
    }
    Ok(())
}

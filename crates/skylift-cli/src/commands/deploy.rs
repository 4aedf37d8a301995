//! Full deployment pipeline: Redis, artifacts, git, worker service.

use std::path::Path;

use tracing::{info, warn};

use skylift_core::artifacts::{self, RailwayManifest, RenderBlueprint, WORKER_START_COMMAND};
use skylift_core::config::{mask_credentials, repo_slug, DeployInputs};
use skylift_core::envfile::EnvFile;
use skylift_core::error::SkyliftResult;
use skylift_core::retry::{poll_until, PollPolicy};
use skylift_core::secret::generate_secret_key;
use skylift_provision::github::{CreateRepo, GithubClient};
use skylift_provision::railway::RailwayClient;
use skylift_provision::{worker_variables, web_variables, ProvisionDriver, ServicePlan, ServiceSource};

use crate::gitops;
use crate::output;

const VALKEY_IMAGE: &str = "valkey/valkey:8";
const RAILWAY_DASHBOARD: &str = "https://railway.app/dashboard";

/// Execute the deploy command
pub async fn execute(
    env_file: &Path,
    repo: Option<String>,
    no_git: bool,
    output_dir: &Path,
) -> SkyliftResult<()> {
    output::banner("Skylift Deploy");

    let env = EnvFile::load(env_file)?;
    let inputs = DeployInputs::from_env_file(&env)?;
    info!(app = inputs.app_name, "Deployment inputs resolved");

    let secret_key = match &inputs.secret_key_base {
        Some(key) => key.clone(),
        None => {
            output::item("SECRET_KEY_BASE not provided, generating one");
            generate_secret_key()
        }
    };

    let railway = RailwayClient::new(&inputs.railway_token)?;
    let driver = ProvisionDriver::new(&railway);

    // Phase 1: Redis. An existing REDIS_URL short-circuits provisioning.
    output::step(1, "Redis");
    let redis_url = match &inputs.redis_url {
        Some(url) => {
            output::success(&format!("Using provided {}", mask_credentials(url)));
            Some(url.clone())
        }
        None => ensure_redis(&driver, &railway, &inputs).await?,
    };

    // Phase 2: local artifacts.
    output::step(2, "Artifacts");
    let worker_vars = worker_variables(&inputs, redis_url.as_deref(), &secret_key);
    let web_vars = web_variables(&inputs, redis_url.as_deref(), &secret_key);

    let blueprint_path = RenderBlueprint::web(&inputs.app_name, &web_vars).write(output_dir)?;
    let manifest_path = RailwayManifest::worker(&inputs.app_name, &worker_vars).write(output_dir)?;
    let env_path = artifacts::write_env_deploy(output_dir, &worker_vars)?;
    output::success(&format!(
        "Wrote {}, {}, {}",
        blueprint_path.display(),
        manifest_path.display(),
        env_path.display()
    ));

    // Phase 3: git push. Without a configured repo, a GitHub token is
    // enough: a fresh repository is created to push into.
    output::step(3, "Git");
    let mut repo_url = repo.or_else(|| inputs.github_repo.clone());
    if repo_url.is_none() {
        repo_url = create_github_repo(&inputs).await?;
    }
    if no_git {
        output::item("Skipped (--no-git)");
    } else if let Some(url) = &repo_url {
        match gitops::sync_repo(output_dir, url) {
            Ok(()) => output::success("Pushed to remote"),
            Err(e) => {
                warn!(error = %e, "Git sync failed");
                output::warn_line(&format!("Git push failed: {}. Push manually and re-run.", e));
            }
        }
    } else {
        output::item("No repository configured, skipping");
    }

    // Phase 4: worker service on Railway.
    output::step(4, "Worker service");
    let Some(slug) = repo_url.as_deref().and_then(repo_slug) else {
        output::warn_line("No GitHub repository resolved, cannot create the worker service:");
        output::item("Pass --repo or set GITHUB_REPO in the env file");
        output::item(&format!("Then create \"{}\" from {}", inputs.worker_name(), RAILWAY_DASHBOARD));
        return Ok(());
    };
    let (project, _) = driver
        .ensure_project("worker", &inputs.worker_name())
        .await?;

    if let Err(e) = railway.link_repo(&project.id, &slug).await {
        if e.is_unauthorized() {
            return Err(e);
        }
        warn!(error = %e, "Repo link failed");
        output::warn_line(&format!("Could not link {}: {}", slug, e));
    }

    let plan = ServicePlan {
        project: project.clone(),
        fragment: "worker".to_string(),
        name: inputs.worker_name(),
        source: ServiceSource::repo(slug),
        variables: worker_vars,
        start_command: Some(WORKER_START_COMMAND.to_string()),
    };
    let report = driver.provision_service(&plan).await?;

    // Summary. Attribute failures leave exit code zero; the checklist
    // tells the operator what to finish by hand.
    output::banner("Summary");
    output::success(&format!(
        "{} ({})",
        report.resource,
        if report.reused { "reused" } else { "created" }
    ));
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

/// Create a repository for the deployment when the env file has a GitHub
/// token but no repo. Failure degrades to manual instructions; a rejected
/// token stays fatal.
async fn create_github_repo(inputs: &DeployInputs) -> SkyliftResult<Option<String>> {
    let Some(token) = &inputs.github_token else {
        return Ok(None);
    };
    output::item("GITHUB_REPO not set but GITHUB_TOKEN present, creating a repository");

    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let request = CreateRepo::public(
        format!("{}-deploy-{}", inputs.app_name, stamp),
        format!("{} deployment configuration", inputs.app_name),
    );

    let github = GithubClient::new(token)?;
    match github.create_repo(&request).await {
        Ok(created) => {
            output::success(&format!("Created {}", created.full_name));
            Ok(Some(created.clone_url))
        }
        Err(e) if e.is_unauthorized() => Err(e),
        Err(e) => {
            warn!(error = %e, "GitHub repository creation failed");
            output::warn_line(&format!("Could not create a repository: {}", e));
            output::item("Create one manually and set GITHUB_REPO in the env file");
            Ok(None)
        }
    }
}

/// Provision the Valkey service and poll until its connection variables
/// appear. Application-level refusals degrade to a manual checklist;
/// authorization failures stay fatal.
async fn ensure_redis(
    driver: &ProvisionDriver<'_>,
    railway: &RailwayClient,
    inputs: &DeployInputs,
) -> SkyliftResult<Option<String>> {
    let result = async {
        let (project, _) = driver
            .ensure_project("redis", &inputs.redis_project_name())
            .await?;
        driver
            .ensure_service(
                &project.id,
                "valkey",
                "valkey",
                &ServiceSource::image(VALKEY_IMAGE),
            )
            .await?;
        poll_until(PollPolicy::default(), "redis connection details", || {
            railway.find_redis_url(&project.id)
        })
        .await
    }
    .await;

    match result {
        Ok(url) => {
            output::success(&format!("Redis ready at {}", mask_credentials(&url)));
            Ok(Some(url))
        }
        Err(e) if e.is_unauthorized() => Err(e),
        Err(e) => {
            warn!(error = %e, "Redis provisioning incomplete");
            output::warn_line(&format!("Redis not provisioned: {}", e));
            output::item("Create a Valkey service from the Railway dashboard");
            output::item("Set REDIS_URL in the env file and re-run");
            Ok(None)
        }
    }
}

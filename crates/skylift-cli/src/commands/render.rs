//! Create the web service on Render.

use std::path::Path;

use skylift_core::artifacts::{EnvVarEntry, WEB_BUILD_COMMAND, WEB_START_COMMAND};
use skylift_core::config::{repo_slug, DeployInputs};
use skylift_core::envfile::EnvFile;
use skylift_core::error::{SkyliftError, SkyliftResult};
use skylift_core::secret::generate_secret_key;
use skylift_provision::{web_variables, CreateWebService, RenderClient};

use crate::output;

const RENDER_PLAN: &str = "starter";
const RENDER_REGION: &str = "oregon";

/// Execute the render command
pub async fn execute(env_file: &Path, repo: Option<String>) -> SkyliftResult<()> {
    output::banner("Render Web Service");

    let env = EnvFile::load(env_file)?;
    let inputs = DeployInputs::from_env_file(&env)?;

    let api_key = inputs.render_api_key.clone().ok_or_else(|| {
        SkyliftError::config("RENDER_API_KEY (or an alias) is required for the render command")
    })?;
    let repo_url = repo
        .or_else(|| inputs.github_repo.clone())
        .ok_or_else(|| {
            SkyliftError::config(
                "a GitHub repository is required: pass --repo or set GITHUB_REPO in the env file",
            )
        })?;
    let slug = repo_slug(&repo_url).ok_or_else(|| {
        SkyliftError::config(format!("could not parse a GitHub slug from {}", repo_url))
    })?;

    let secret_key = inputs
        .secret_key_base
        .clone()
        .unwrap_or_else(generate_secret_key);
    let vars = web_variables(&inputs, inputs.redis_url.as_deref(), &secret_key);

    let client = RenderClient::new(&api_key)?;
    let owners = client.list_owners().await?;
    let owner = owners
        .first()
        .ok_or_else(|| SkyliftError::api("Render returned no owners for this key"))?;
    output::item(&format!("Owner: {}", owner.name));

    let request = CreateWebService {
        service_type: "web_service".to_string(),
        name: inputs.web_name(),
        owner_id: owner.id.clone(),
        repo: format!("https://github.com/{}", slug),
        branch: "main".to_string(),
        plan_id: RENDER_PLAN.to_string(),
        region: RENDER_REGION.to_string(),
        build_command: WEB_BUILD_COMMAND.to_string(),
        start_command: WEB_START_COMMAND.to_string(),
        env_vars: vars
            .iter()
            .map(|(key, value)| EnvVarEntry {
                key: key.to_string(),
                value: value.to_string(),
            })
            .collect(),
    };

    let service = client.create_web_service(&request).await?;
    output::success(&format!("Created {} ({})", service.name, service.id));
    if let Some(url) = &service.service_details_url {
        output::item(&format!("Dashboard: {}", url));
    }
    Ok(())
}

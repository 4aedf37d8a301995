//! Check credentials, artifacts, git state, and remote services.

use std::path::Path;

use skylift_core::artifacts::{RailwayManifest, RenderBlueprint};
use skylift_core::config::{mask_credentials, DeployInputs, NOT_PROVIDED};
use skylift_core::envfile::EnvFile;
use skylift_core::error::SkyliftResult;
use skylift_provision::railway::RailwayClient;

use crate::gitops;
use crate::output;

/// Execute the verify command
pub async fn execute(env_file: &Path, project_ids: &[String], output_dir: &Path) -> SkyliftResult<()> {
    output::banner("Verify");

    let env = EnvFile::load(env_file)?;
    let inputs = DeployInputs::from_env_file(&env)?;

    let mut problems = 0usize;

    output::step(1, "Credentials");
    output::success(&format!(
        "DATABASE_URL = {}",
        output::truncate(&mask_credentials(&inputs.database_url))
    ));
    output::success("RAILWAY_TOKEN present");
    output::success(&format!("FRONTEND_URL = {}", inputs.frontend_url));
    for (name, value) in [
        ("RENDER_API_KEY", inputs.render_api_key.is_some()),
        ("GITHUB_REPO", inputs.github_repo.is_some()),
        ("GITHUB_TOKEN", inputs.github_token.is_some()),
        ("REDIS_URL", inputs.redis_url.is_some()),
        ("SECRET_KEY_BASE", inputs.secret_key_base.is_some()),
    ] {
        if value {
            output::success(&format!("{} present", name));
        } else {
            output::warn_line(&format!("{} {}", name, NOT_PROVIDED));
            problems += 1;
        }
    }

    output::step(2, "Artifacts");
    problems += check_artifact(output_dir.join("render.yaml"), |content| {
        RenderBlueprint::from_yaml(content).map(|_| ())
    });
    problems += check_artifact(output_dir.join("railway.toml"), |content| {
        RailwayManifest::from_toml(content).map(|_| ())
    });

    output::step(3, "Git");
    let git = gitops::status(output_dir);
    match (&git.remote, &git.branch, &git.last_commit) {
        (Some(remote), Some(branch), Some(commit)) => {
            output::success(&format!("{} @ {} ({})", remote, branch, commit));
        }
        _ => {
            output::warn_line("Repository not fully configured (remote, branch, or commit missing)");
            problems += 1;
        }
    }

    output::step(4, "Remote services");
    if project_ids.is_empty() {
        output::item("No --project-id given, skipping");
    } else {
        let railway = RailwayClient::new(&inputs.railway_token)?;
        for project_id in project_ids {
            match railway.list_services(project_id).await {
                Ok(services) if services.is_empty() => {
                    output::warn_line(&format!("Project {} has no services", project_id));
                    problems += 1;
                }
                Ok(services) => {
                    output::success(&format!("Project {}:", project_id));
                    for service in services {
                        output::item(&service.to_string());
                    }
                }
                Err(e) if e.is_unauthorized() => return Err(e),
                Err(e) => {
                    output::warn_line(&format!("Could not list project {}: {}", project_id, e));
                    problems += 1;
                }
            }
        }
    }

    output::banner("Summary");
    if problems == 0 {
        output::success("Everything checks out");
    } else {
        output::warn_line(&format!("{} item(s) need attention", problems));
    }
    Ok(())
}

fn check_artifact<F>(path: std::path::PathBuf, parse: F) -> usize
where
    F: FnOnce(&str) -> SkyliftResult<()>,
{
    match std::fs::read_to_string(&path) {
        Ok(content) => match parse(&content) {
            Ok(()) => {
                output::success(&format!("{} parses", path.display()));
                0
            }
            Err(e) => {
                output::warn_line(&format!("{} is invalid: {}", path.display(), e));
                1
            }
        },
        Err(_) => {
            output::warn_line(&format!("{} missing", path.display()));
            1
        }
    }
}

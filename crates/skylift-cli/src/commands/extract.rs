//! Print resolved deployment inputs and write a `.env.example` reference.

use std::path::Path;

use skylift_core::artifacts::write_env_example;
use skylift_core::config::{mask_credentials, DeployInputs, NOT_PROVIDED};
use skylift_core::envfile::EnvFile;
use skylift_core::error::SkyliftResult;

use crate::output;

/// Execute the extract command
pub fn execute(env_file: &Path, output_dir: &Path) -> SkyliftResult<()> {
    output::banner("Extracted Inputs");

    let env = EnvFile::load(env_file)?;
    let inputs = DeployInputs::from_env_file(&env)?;

    let show = |name: &str, value: Option<&str>| match value {
        Some(value) => output::item(&format!(
            "{} = {}",
            name,
            output::truncate(&mask_credentials(value))
        )),
        None => output::item(&format!("{} = {}", name, NOT_PROVIDED)),
    };

    show("APP_NAME", Some(&inputs.app_name));
    show("DATABASE_URL", Some(&inputs.database_url));
    show("RAILWAY_TOKEN", Some(&inputs.railway_token));
    show("FRONTEND_URL", Some(&inputs.frontend_url));
    show("RENDER_API_KEY", inputs.render_api_key.as_deref());
    show("GITHUB_REPO", inputs.github_repo.as_deref());
    show("GITHUB_TOKEN", inputs.github_token.as_deref());
    show("REDIS_URL", inputs.redis_url.as_deref());
    show("SECRET_KEY_BASE", inputs.secret_key_base.as_deref());

    let path = write_env_example(
        output_dir,
        &[
            ("APP_NAME", Some(inputs.app_name.as_str())),
            ("DATABASE_URL", Some(inputs.database_url.as_str())),
            ("RAILWAY_TOKEN", Some(inputs.railway_token.as_str())),
            ("FRONTEND_URL", Some(inputs.frontend_url.as_str())),
            ("RENDER_API_KEY", inputs.render_api_key.as_deref()),
            ("GITHUB_REPO", inputs.github_repo.as_deref()),
            ("GITHUB_TOKEN", inputs.github_token.as_deref()),
            ("REDIS_URL", inputs.redis_url.as_deref()),
            ("SECRET_KEY_BASE", inputs.secret_key_base.as_deref()),
        ],
    )?;
    output::success(&format!("Wrote {}", path.display()));
    Ok(())
}

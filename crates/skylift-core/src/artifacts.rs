//! Deployment descriptors consumed by the hosting platforms.
//!
//! Skylift writes these files but never reads them back at runtime: the
//! Render blueprint (`render.yaml`), the Railway manifest (`railway.toml`),
//! and plain env-file renders (`.env.deploy`, `.env.example`).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SkyliftResult;
use crate::resource::EnvVarSet;

/// Build command for the web service (asset precompilation included).
pub const WEB_BUILD_COMMAND: &str = "export NODE_OPTIONS=\"--max-old-space-size=2048\"\ncorepack enable\ncorepack prepare pnpm@10.2.0 --activate\nbundle install --jobs 2 --retry 3\npnpm install --frozen-lockfile\nbundle exec rails assets:precompile RAILS_ENV=production\n";

/// Start command for the web service.
pub const WEB_START_COMMAND: &str =
    "export RAILS_LOG_TO_STDOUT=true\nbundle exec rails s -p $PORT -b 0.0.0.0\n";

/// Start command for the background worker.
pub const WORKER_START_COMMAND: &str = "bundle exec sidekiq -C config/sidekiq.yml";

pub const DEFAULT_PLAN: &str = "free";
pub const DEFAULT_REGION: &str = "oregon";

/// One `key: value` entry in a platform variable list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVarEntry {
    pub key: String,
    pub value: String,
}

/// Render blueprint (`render.yaml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderBlueprint {
    pub services: Vec<RenderServiceSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderServiceSpec {
    #[serde(rename = "type")]
    pub service_type: String,
    pub name: String,
    pub plan: String,
    pub region: String,
    pub build_command: String,
    pub start_command: String,
    pub env_vars: Vec<EnvVarEntry>,
}

impl RenderBlueprint {
    /// Blueprint for a single web service named `{app}-web` with the
    /// standard build/start commands.
    pub fn web(app_name: &str, vars: &EnvVarSet) -> Self {
        Self {
            services: vec![RenderServiceSpec {
                service_type: "web".to_string(),
                name: format!("{}-web", app_name),
                plan: DEFAULT_PLAN.to_string(),
                region: DEFAULT_REGION.to_string(),
                build_command: WEB_BUILD_COMMAND.to_string(),
                start_command: WEB_START_COMMAND.to_string(),
                env_vars: vars
                    .iter()
                    .map(|(key, value)| EnvVarEntry {
                        key: key.to_string(),
                        value: value.to_string(),
                    })
                    .collect(),
            }],
        }
    }

    pub fn to_yaml(&self) -> SkyliftResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_yaml(content: &str) -> SkyliftResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Write `render.yaml` under `dir` and return its path.
    pub fn write(&self, dir: &Path) -> SkyliftResult<PathBuf> {
        let path = dir.join("render.yaml");
        std::fs::write(&path, self.to_yaml()?)?;
        Ok(path)
    }
}

/// Railway manifest (`railway.toml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RailwayManifest {
    pub build: BuildSection,
    pub deploy: DeploySection,
    pub service: ServiceSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSection {
    pub builder: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploySection {
    pub start_command: String,
    pub restart_policy_type: String,
    pub restart_policy_max_retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSection {
    pub name: String,
    pub variables: BTreeMap<String, String>,
}

impl RailwayManifest {
    /// Manifest for the worker service: nixpacks build, on-failure restart
    /// policy, and the full variable table.
    pub fn worker(app_name: &str, vars: &EnvVarSet) -> Self {
        Self {
            build: BuildSection {
                builder: "nixpacks".to_string(),
            },
            deploy: DeploySection {
                start_command: WORKER_START_COMMAND.to_string(),
                restart_policy_type: "on_failure".to_string(),
                restart_policy_max_retries: 10,
            },
            service: ServiceSection {
                name: format!("{}-worker", app_name),
                variables: vars
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            },
        }
    }

    pub fn to_toml(&self) -> SkyliftResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn from_toml(content: &str) -> SkyliftResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Write `railway.toml` under `dir` and return its path.
    pub fn write(&self, dir: &Path) -> SkyliftResult<PathBuf> {
        let path = dir.join("railway.toml");
        std::fs::write(&path, self.to_toml()?)?;
        Ok(path)
    }
}

/// Render a variable set as `KEY="value"` lines.
pub fn render_env_file(vars: &EnvVarSet) -> String {
    let mut out = String::new();
    for (key, value) in vars.iter() {
        out.push_str(&format!("{}=\"{}\"\n", key, value));
    }
    out
}

/// Write `.env.deploy` under `dir` and return its path.
pub fn write_env_deploy(dir: &Path, vars: &EnvVarSet) -> SkyliftResult<PathBuf> {
    let path = dir.join(".env.deploy");
    std::fs::write(&path, render_env_file(vars))?;
    Ok(path)
}

/// Render a `.env.example` reference: resolved fields as `KEY=value`,
/// missing ones as a commented placeholder.
pub fn render_env_example(fields: &[(&str, Option<&str>)]) -> String {
    let mut out = String::new();
    for (key, value) in fields {
        match value {
            Some(value) => out.push_str(&format!("{}={}\n", key, value)),
            None => out.push_str(&format!("# {}=your_value_here\n", key)),
        }
    }
    out
}

/// Write `.env.example` under `dir` and return its path.
pub fn write_env_example(dir: &Path, fields: &[(&str, Option<&str>)]) -> SkyliftResult<PathBuf> {
    let path = dir.join(".env.example");
    std::fs::write(&path, render_env_example(fields))?;
    Ok(path)
}

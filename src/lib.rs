//! Skylift - cloud provisioning toolkit for hybrid application deployments.
//!
//! Reads credentials from a local environment file and provisions the
//! remote pieces of a hybrid deployment: Railway projects and services
//! over GraphQL, Render web services over REST, plus the descriptor files
//! the platforms consume (`render.yaml`, `railway.toml`).

pub use skylift_cli::{run, Cli, Commands};
pub use skylift_core::{DeployInputs, EnvFile, SkyliftError, SkyliftResult};
pub use skylift_provision::{ProvisionDriver, RailwayClient, RenderClient};

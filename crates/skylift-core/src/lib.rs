//! Core types and configuration for the Skylift provisioning toolkit.

pub mod artifacts;
pub mod config;
pub mod envfile;
pub mod error;
pub mod resource;
pub mod retry;
pub mod secret;

pub use config::DeployInputs;
pub use envfile::EnvFile;
pub use error::{SkyliftError, SkyliftResult};
pub use resource::{AttributeOutcome, EnvVarSet, ProvisionReport, ProvisionState, ResourceRef};
pub use retry::{poll_until, PollPolicy};

//! Remote platform clients and the provisioning driver.

pub mod driver;
pub mod github;
pub mod graphql;
pub mod railway;
pub mod render;

pub use driver::{worker_variables, web_variables, ProvisionDriver, ServicePlan};
pub use github::{CreateRepo, GithubClient, GITHUB_API_URL};
pub use railway::{RailwayClient, ServiceSource, RAILWAY_ENDPOINT};
pub use render::{CreateWebService, RenderClient, RenderService, RENDER_BASE_URL};

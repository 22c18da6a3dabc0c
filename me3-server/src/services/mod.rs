mod name_update;
mod site_deployer;

pub use name_update::{NameUpdateError, NameUpdateService};
pub use site_deployer::{encode_links, DeployError, DeployRequest, Deployment, SiteDeployer};

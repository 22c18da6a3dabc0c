use std::sync::Arc;

use super::auth::BearerAuth;
use crate::services::{NameUpdateService, SiteDeployer};

#[derive(Clone, Debug)]
pub(crate) struct AppState {
    pub(crate) deployer: Arc<SiteDeployer>,
    pub(crate) name_updates: Arc<NameUpdateService>,
    pub(crate) auth: BearerAuth,
}

impl AppState {
    pub fn new(deployer: SiteDeployer, name_updates: NameUpdateService, auth: BearerAuth) -> Self {
        Self {
            deployer: Arc::new(deployer),
            name_updates: Arc::new(name_updates),
            auth,
        }
    }
}

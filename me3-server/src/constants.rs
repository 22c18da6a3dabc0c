/// Overrides `content_store.api_token`.
pub const CONTENT_STORE_TOKEN_ENV: &str = "WEB3_STORAGE_API_KEY";

/// Overrides `name_service.incoming_api_key`.
pub const INCOMING_API_KEY_ENV: &str = "INCOMING_API_KEY";

/// Deploy requests without a `version` are treated as this one.
pub const DEFAULT_DEPLOY_VERSION: &str = "1.0";

pub const DEPLOY_PATH: &str = "/ipfs-deploy";
pub const NAME_UPDATE_PATH: &str = "/ipns-update";

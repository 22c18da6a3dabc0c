use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    constants::DEFAULT_DEPLOY_VERSION,
    server::app_state::AppState,
    services::DeployRequest,
    shared::{HttpError, HttpResult},
};

#[derive(Debug, Deserialize)]
struct DeployBody {
    #[serde(default)]
    version: Option<Value>,
    #[serde(default)]
    subdomain: Option<String>,
    #[serde(default)]
    links: Option<Value>,
    #[serde(default)]
    avatar: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeployResponse {
    pub hash: String,
}

/// Validate a raw deploy body.
///
/// Version `1.0` (or no version) only carries a subdomain, `2.0` adds links and avatar.
pub(crate) fn parse_deploy_body(body: &[u8]) -> HttpResult<DeployRequest> {
    let body: DeployBody = serde_json::from_slice(body)?;

    let version = match &body.version {
        None | Some(Value::Null) => DEFAULT_DEPLOY_VERSION.to_string(),
        Some(Value::String(v)) if v.is_empty() => DEFAULT_DEPLOY_VERSION.to_string(),
        Some(Value::String(v)) => v.clone(),
        Some(_) => return Err(HttpError::bad_request("Unsupported version")),
    };

    let subdomain = body
        .subdomain
        .filter(|s| !s.is_empty())
        .ok_or_else(|| HttpError::bad_request("Missing subdomain"))?;

    let with_extras = version != DEFAULT_DEPLOY_VERSION;
    Ok(DeployRequest {
        version,
        subdomain,
        links: body.links.filter(|_| with_extras).filter(|l| !l.is_null()),
        avatar: body.avatar.filter(|_| with_extras),
    })
}

pub(crate) async fn deploy(
    State(state): State<AppState>,
    body: Bytes,
) -> HttpResult<Json<DeployResponse>> {
    let request = parse_deploy_body(&body)?;
    let deployment = state.deployer.deploy(&request).await?;
    Ok(Json(DeployResponse {
        hash: deployment.cid.to_string(),
    }))
}

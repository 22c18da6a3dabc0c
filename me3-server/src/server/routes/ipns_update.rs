use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use me3_publisher::Cid;
use serde::{Deserialize, Serialize};

use crate::{
    server::app_state::AppState,
    shared::{HttpError, HttpResult},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NameUpdateBody {
    #[serde(default)]
    subdomain: Option<String>,
    #[serde(default)]
    ipfs_hash: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NameUpdateResponse {
    pub ipns_hash: String,
}

/// Body fields are checked before credentials.
pub(crate) async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> HttpResult<Json<NameUpdateResponse>> {
    let body: NameUpdateBody = serde_json::from_slice(&body)?;
    let subdomain = body
        .subdomain
        .filter(|s| !s.is_empty())
        .ok_or_else(|| HttpError::bad_request("Missing subdomain"))?;
    let ipfs_hash = body
        .ipfs_hash
        .filter(|s| !s.is_empty())
        .ok_or_else(|| HttpError::bad_request("Missing IPFS hash"))?;

    state.auth.check(&headers)?;

    let cid: Cid = ipfs_hash.parse()?;
    let record = state.name_updates.update(&subdomain, &cid).await?;
    Ok(Json(NameUpdateResponse {
        ipns_hash: record.name,
    }))
}

use serde::{Deserialize, Serialize};
use tabwarden_protocol::error::{HousekeeperError, HousekeeperResult};

use crate::controller::{SweepOutcome, TabHousekeeper};

/// Inbound request from the user-facing UI. Serializes to the
/// `{"action": "..."}` wire shape used across the extension boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum HousekeeperRequest {
    DeduplicateAll,
}

impl TabHousekeeper {
    pub async fn handle_request(
        &self,
        request: HousekeeperRequest,
    ) -> HousekeeperResult<SweepOutcome> {
        match request {
            HousekeeperRequest::DeduplicateAll => self.deduplicate_all().await,
        }
    }

    /// JSON round trip for untyped bridge callers: decodes the request,
    /// dispatches it, and encodes the response.
    pub async fn handle_request_json(&self, payload: &str) -> HousekeeperResult<String> {
        let request: HousekeeperRequest = serde_json::from_str(payload).map_err(|error| {
            HousekeeperError::Protocol(format!("unrecognized housekeeper request: {error}"))
        })?;
        let outcome = self.handle_request(request).await?;
        serde_json::to_string(&outcome).map_err(|error| {
            HousekeeperError::Internal(format!("failed to encode housekeeper response: {error}"))
        })
    }
}

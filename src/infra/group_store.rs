// HTTP client for the external group document store

use crate::core::errors::ServiceError;
use crate::core::models::GroupRecord;
use crate::keys::GroupStore;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;
use tracing::{debug, error};

/// Read-only client for the document store holding group records.
///
/// Documents live at `{base_url}/groups/{group_id}` and carry a `members`
/// array. The store is external and opaque; this client never writes.
pub struct GroupStoreClient {
    client: Client,
    base_url: String,
    bearer_token: Option<Secret<String>>,
}

impl GroupStoreClient {
    pub fn new(
        base_url: &str,
        bearer_token: Option<Secret<String>>,
        timeout_secs: u64,
    ) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(2))
            .build()
            .map_err(|e| {
                ServiceError::Internal(format!("Failed to create group store client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token,
        })
    }
}

#[async_trait]
impl GroupStore for GroupStoreClient {
    async fn fetch_group(&self, group_id: &str) -> Result<Option<GroupRecord>, ServiceError> {
        let url = format!("{}/groups/{}", self.base_url, group_id);
        debug!(group_id = %group_id, "Fetching group record");

        let mut request = self.client.get(&url);
        if let Some(ref token) = self.bearer_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, group_id = %group_id, "Group store request failed");
            ServiceError::Internal(format!("Group store request failed: {}", e))
        })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, group_id = %group_id, "Group store returned HTTP error");
            return Err(ServiceError::Internal(format!(
                "Group store HTTP error: {}",
                status
            )));
        }

        let record: GroupRecord = response.json().await.map_err(|e| {
            error!(error = %e, group_id = %group_id, "Failed to deserialize group record");
            ServiceError::Internal(format!("Failed to deserialize group record: {}", e))
        })?;

        Ok(Some(record))
    }
}

// Razorpay Orders API client

use crate::core::errors::ServiceError;
use crate::core::models::GatewayCredentials;
use crate::payments::{GatewayOrder, OrderGateway, OrderPayload};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use std::time::Duration;
use tracing::{debug, error, info};

/// HTTP client for Razorpay's order-creation endpoint.
///
/// Credentials are passed per call rather than held here; the credential
/// precondition lives in the payment service.
pub struct RazorpayClient {
    http_client: Client,
    base_url: String,
}

impl RazorpayClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ServiceError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(2))
            .build()
            .map_err(|e| {
                ServiceError::Internal(format!("Failed to create gateway client: {}", e))
            })?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl OrderGateway for RazorpayClient {
    async fn create_order(
        &self,
        credentials: &GatewayCredentials,
        payload: &OrderPayload,
    ) -> Result<GatewayOrder, ServiceError> {
        let url = format!("{}/v1/orders", self.base_url);

        debug!(
            amount = payload.amount,
            receipt = %payload.receipt,
            "Sending order to gateway"
        );

        let response = self
            .http_client
            .post(&url)
            .basic_auth(
                &credentials.key_id,
                Some(credentials.key_secret.expose_secret()),
            )
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Gateway request failed");
                if e.is_timeout() {
                    ServiceError::GatewayUnavailable("request timed out".to_string())
                } else if e.is_connect() {
                    ServiceError::GatewayUnavailable("connection failed".to_string())
                } else {
                    ServiceError::GatewayUnavailable(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Gateway returned HTTP error");
            return Err(ServiceError::GatewayUnavailable(format!(
                "HTTP {}",
                status
            )));
        }

        let order: GatewayOrder = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse gateway response");
            ServiceError::GatewayUnavailable(format!("invalid response: {}", e))
        })?;

        info!(order_id = %order.id, "Gateway order created");
        Ok(order)
    }
}

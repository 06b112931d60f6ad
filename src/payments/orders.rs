// Order validation and forwarding - bad requests never reach the gateway

use crate::core::errors::ServiceError;
use crate::core::models::{AuthContext, GatewayCredentials, OrderRequest, OrderResult};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Smallest chargeable amount the gateway accepts, in minor units.
pub const MIN_ORDER_MINOR_UNITS: i64 = 100;

/// All orders are created in INR; amounts are paise.
pub const ORDER_CURRENCY: &str = "INR";

/// The order-creation request as sent to the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct OrderPayload {
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
}

/// Gateway-assigned order, as returned by the order-creation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
}

/// Order-creation capability of the external payment gateway.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn create_order(
        &self,
        credentials: &GatewayCredentials,
        payload: &OrderPayload,
    ) -> Result<GatewayOrder, ServiceError>;
}

/// Gates and forwards order-creation requests.
///
/// Amount and configuration invariants are enforced before any network call,
/// so malformed or adversarial requests never reach the gateway with billing
/// consequences. No retries happen here; retry policy belongs to the caller.
pub struct PaymentOrderService {
    credentials: Option<GatewayCredentials>,
    gateway: Arc<dyn OrderGateway>,
    max_minor_units: i64,
    receipt_prefix: String,
}

impl PaymentOrderService {
    pub fn new(
        credentials: Option<GatewayCredentials>,
        gateway: Arc<dyn OrderGateway>,
        max_minor_units: i64,
        receipt_prefix: String,
    ) -> Self {
        Self {
            credentials,
            gateway,
            max_minor_units,
            receipt_prefix,
        }
    }

    pub async fn create_order(
        &self,
        ctx: &AuthContext,
        req: &OrderRequest,
    ) -> Result<OrderResult, ServiceError> {
        let principal = ctx.principal()?;

        let credentials = self.credentials.as_ref().ok_or_else(|| {
            ServiceError::PreconditionFailed("Razorpay not configured.".to_string())
        })?;

        let amount = validate_amount(req.amount_minor_units.as_ref(), self.max_minor_units)?;

        // An empty caller receipt counts as absent, same as no receipt at all
        let receipt = req
            .receipt
            .clone()
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| synthesize_receipt(&self.receipt_prefix, &principal.uid));

        info!(
            uid = %principal.uid,
            amount = amount,
            receipt = %receipt,
            "Forwarding order to gateway"
        );

        let payload = OrderPayload {
            amount,
            currency: ORDER_CURRENCY.to_string(),
            receipt,
        };

        let order = self.gateway.create_order(credentials, &payload).await?;

        Ok(OrderResult {
            order_id: order.id,
            key_id: credentials.key_id.clone(),
        })
    }
}

/// Validate and coerce the requested amount against policy bounds.
///
/// Accepted shapes: integer JSON number, integral float, or a string that
/// parses as an integer. Everything else, and anything outside
/// `[MIN_ORDER_MINOR_UNITS, max]`, is an `InvalidArgument`.
fn validate_amount(raw: Option<&Value>, max: i64) -> Result<i64, ServiceError> {
    let amount = raw.and_then(coerce_integer).ok_or_else(|| {
        ServiceError::InvalidArgument("amountMinorUnits must be an integer >= 100.".to_string())
    })?;

    if amount < MIN_ORDER_MINOR_UNITS {
        return Err(ServiceError::InvalidArgument(
            "amountMinorUnits must be an integer >= 100.".to_string(),
        ));
    }
    if amount > max {
        return Err(ServiceError::InvalidArgument(
            "amountMinorUnits exceeds maximum allowed.".to_string(),
        ));
    }
    Ok(amount)
}

fn coerce_integer(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    // JSON numbers like 100.0 are integral; 99.5 is not
    if let Some(f) = value.as_f64() {
        if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
            return Some(f as i64);
        }
        return None;
    }
    if let Some(s) = value.as_str() {
        return s.trim().parse::<i64>().ok();
    }
    None
}

/// Receipt synthesized when the caller supplied none: unique per request via
/// the millisecond timestamp, without caller coordination.
fn synthesize_receipt(prefix: &str, uid: &str) -> String {
    format!("{}_{}_{}", prefix, uid, Utc::now().timestamp_millis())
}

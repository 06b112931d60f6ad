// Payment order creation against the external gateway

pub mod orders;

pub use orders::{
    GatewayOrder, OrderGateway, OrderPayload, PaymentOrderService, MIN_ORDER_MINOR_UNITS,
    ORDER_CURRENCY,
};

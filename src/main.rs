// Main entry point for the Expenso backend service

use expenso_backend::api::{create_router, AppState};
use expenso_backend::auth::IdentityVerifier;
use expenso_backend::config::Config;
use expenso_backend::gateway::RazorpayClient;
use expenso_backend::infra::GroupStoreClient;
use expenso_backend::keys::{GroupStore, KeyDerivationService};
use expenso_backend::payments::{OrderGateway, PaymentOrderService};

use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load and validate configuration first (before any logging)
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // 2. Initialize tracing subscriber with config values
    init_tracing(&config)?;

    info!("Starting Expenso backend");

    info!(
        bind_address = %config.bind_address,
        port = config.port,
        "Configuration loaded"
    );

    if config.master_secret.is_none() {
        warn!("DATA_ENCRYPTION_MASTER_KEY not set; key derivation will refuse requests");
    }
    if config.gateway_credentials.is_none() {
        warn!("Razorpay credentials not set; order creation will refuse requests");
    }

    // 3. Group document store client
    let group_store: Arc<dyn GroupStore> = Arc::new(GroupStoreClient::new(
        &config.group_store_url,
        config.group_store_token.clone(),
        config.store_timeout_secs,
    )?);

    info!("Group store client initialized");

    // 4. Payment gateway client
    let gateway: Arc<dyn OrderGateway> = Arc::new(RazorpayClient::new(
        &config.gateway_api_url,
        config.gateway_timeout_secs,
    )?);

    info!("Gateway client initialized");

    // 5. Core services
    let keys = Arc::new(KeyDerivationService::new(
        config.master_secret.clone(),
        group_store,
    ));
    let payments = Arc::new(PaymentOrderService::new(
        config.gateway_credentials.clone(),
        gateway,
        config.order_max_minor_units,
        config.receipt_prefix.clone(),
    ));

    // 6. Identity verifier
    let verifier = Arc::new(IdentityVerifier::new(&config.auth_jwt_secret));

    // 7. Router
    let app_state = AppState {
        keys,
        payments,
        config: Arc::new(config.clone()),
    };
    let router = create_router(app_state, verifier);

    info!("Router created");

    // 8. Start HTTP server
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(addr = %addr, "Server listening");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing subscriber based on configuration
fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    // RUST_LOG takes precedence over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_env_filter(filter);

    if config.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            info!("SIGTERM received, starting graceful shutdown");
        },
    }
}

//! Startup Wiring
//!
//! Reads configuration once, builds the HTTP services and hands out
//! `CheckoutFlow` instances wired to the host's cart, auth and navigator.

use std::sync::Arc;

use checkout_core::{
    AuthProvider, CartProvider, CheckoutConfig, CheckoutContext, CheckoutFlow, Navigator,
};
use checkout_payments::{DEFAULT_API_BASE_URL, GatewayConfig, HostedCheckoutGateway, join_url};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::orders::HttpOrderService;

pub const DEFAULT_ORDERS_PATH: &str = "/api/orders";

/// Install the global tracing subscriber
///
/// Filter comes from `RUST_LOG`, defaulting to `info`. Calling this twice is
/// harmless; the second call leaves the first subscriber in place.
pub fn init_tracing() {
    let installed = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Everything read from the environment at startup
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub checkout: CheckoutConfig,

    /// `None` disables card payments
    pub gateway: Option<GatewayConfig>,

    pub orders_endpoint: String,
}

impl RuntimeConfig {
    /// Load `.env` (if present) and read the environment
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let checkout = CheckoutConfig::from_env();
        let gateway = match GatewayConfig::from_env() {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("⚠ Card payments disabled: {}", e);
                tracing::warn!("  Set STRIPE_PUBLISHABLE_KEY in .env to enable them");
                None
            }
        };

        let api_base = std::env::var("CHECKOUT_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.into());
        let orders_path =
            std::env::var("CHECKOUT_ORDERS_PATH").unwrap_or_else(|_| DEFAULT_ORDERS_PATH.into());

        Self {
            checkout,
            gateway,
            orders_endpoint: join_url(&api_base, &orders_path),
        }
    }
}

/// Long-lived services shared by every checkout page
pub struct CheckoutRuntime {
    config: RuntimeConfig,
    orders: Arc<HttpOrderService>,
}

impl CheckoutRuntime {
    pub fn new(config: RuntimeConfig) -> Self {
        let orders = Arc::new(HttpOrderService::new(config.orders_endpoint.clone()));
        tracing::info!(
            orders = %orders.endpoint(),
            card_payments = config.gateway.is_some(),
            "Checkout runtime ready"
        );
        Self { config, orders }
    }

    pub fn from_env() -> Self {
        Self::new(RuntimeConfig::from_env())
    }

    pub const fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Build a workflow for one checkout page
    pub fn flow(
        &self,
        cart: Arc<dyn CartProvider>,
        auth: Arc<dyn AuthProvider>,
        navigator: Arc<dyn Navigator>,
    ) -> CheckoutFlow {
        let mut context = CheckoutContext::new(cart, auth, self.orders.clone(), navigator.clone());
        if let Some(gateway) = &self.config.gateway {
            context = context.with_gateway(Arc::new(HostedCheckoutGateway::new(
                gateway.clone(),
                navigator,
            )));
        }

        CheckoutFlow::new(context, self.config.checkout.clone())
    }
}

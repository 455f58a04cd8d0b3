//! # checkout-payments
//!
//! Hosted card checkout for the course marketplace.
//!
//! **Flow:** Checkout page → shop backend creates a session → processor's hosted page
//!
//! ```text
//! ┌─────────────┐  POST items   ┌──────────────┐  session id  ┌─────────────────┐
//! │  Checkout   │──────────────▶│ Shop backend │─────────────▶│  Hosted         │
//! │  page       │               │ (secret key) │   redirect   │  checkout page  │
//! └─────────────┘               └──────────────┘              └─────────────────┘
//! ```
//!
//! Only the public key lives on this side. It is read once at startup and
//! used to check that sessions and key belong to the same mode.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use checkout_payments::HostedCheckoutGateway;
//!
//! let gateway = HostedCheckoutGateway::from_env(navigator.clone())?;
//! let context = CheckoutContext::new(cart, auth, orders, navigator)
//!     .with_gateway(Arc::new(gateway));
//! ```

mod config;
mod error;
mod gateway;
mod session;

pub use config::{
    DEFAULT_API_BASE_URL, DEFAULT_CHECKOUT_URL, DEFAULT_SESSION_PATH, GatewayConfig, KeyMode,
    PublishableKey, join_url,
};
pub use error::{PaymentError, Result};
pub use gateway::HostedCheckoutGateway;
pub use session::HttpSessionClient;

//! # checkout-runtime
//!
//! HTTP services and startup wiring for the checkout workflow.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use checkout_runtime::{CheckoutRuntime, init_tracing};
//!
//! init_tracing();
//! let runtime = CheckoutRuntime::from_env();
//! let flow = runtime.flow(cart, auth, navigator);
//! let view = flow.render();
//! ```

pub mod bootstrap;
pub mod orders;

pub use bootstrap::{CheckoutRuntime, RuntimeConfig, init_tracing};
pub use orders::HttpOrderService;

// Re-export core types for convenience
pub use checkout_core::{
    CheckoutConfig, CheckoutError, CheckoutFlow, CheckoutView, Result, SubmitOutcome,
};

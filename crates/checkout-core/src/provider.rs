//! Collaborator Interfaces
//!
//! The checkout workflow owns none of the state or services it touches.
//! Cart, identity, order persistence, the payment gateway and navigation are
//! all injected through these traits, so hosts can wire in their own stores
//! and HTTP clients without changing workflow logic.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use checkout_core::{CheckoutContext, CheckoutFlow, CheckoutConfig};
//!
//! let context = CheckoutContext::new(cart, auth, orders, navigator)
//!     .with_gateway(gateway);
//! let flow = CheckoutFlow::new(context, CheckoutConfig::default());
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Cart, HostedSessionRequest, OrderReceipt, OrderRequest, SessionId, User};

/// Read access to the shopping cart, plus clearing
pub trait CartProvider: Send + Sync {
    /// Current cart contents
    fn cart(&self) -> Cart;

    /// Remove every item
    fn clear(&self);
}

/// The signed-in identity, if any
pub trait AuthProvider: Send + Sync {
    fn current_user(&self) -> Option<User>;
}

/// Records orders placed for manual payment
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Create an order record
    ///
    /// A refusal should be reported as `CheckoutError::OrderRejected` so the
    /// remote message reaches the buyer.
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderReceipt>;
}

/// Client for a processor's hosted checkout pages
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout session for the given line items
    async fn create_hosted_session(&self, request: &HostedSessionRequest) -> Result<SessionId>;

    /// Send the buyer to the hosted checkout page for `session`
    async fn redirect_to_hosted_checkout(&self, session: &SessionId) -> Result<()>;
}

/// Moves the host application to another route
pub trait Navigator: Send + Sync {
    fn redirect(&self, path: &str);
}

/// Everything the workflow depends on, passed explicitly to its constructor
#[derive(Clone)]
pub struct CheckoutContext {
    pub cart: Arc<dyn CartProvider>,
    pub auth: Arc<dyn AuthProvider>,
    pub orders: Arc<dyn OrderService>,
    pub navigator: Arc<dyn Navigator>,

    /// Card payments are only offered when a gateway is configured
    pub gateway: Option<Arc<dyn PaymentGateway>>,
}

impl CheckoutContext {
    pub fn new(
        cart: Arc<dyn CartProvider>,
        auth: Arc<dyn AuthProvider>,
        orders: Arc<dyn OrderService>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            cart,
            auth,
            orders,
            navigator,
            gateway: None,
        }
    }

    #[must_use]
    pub fn with_gateway(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }
}

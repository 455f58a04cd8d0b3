//! In-memory Collaborators
//!
//! Cart, auth, order, gateway and navigation implementations backed by plain
//! memory. Useful for development, demos and tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{CheckoutError, Result};
use crate::model::{Cart, CartItem, HostedSessionRequest, OrderReceipt, OrderRequest, SessionId, User};
use crate::provider::{AuthProvider, CartProvider, Navigator, OrderService, PaymentGateway};

/// Cart held in memory
#[derive(Default)]
pub struct MemoryCart {
    cart: Mutex<Cart>,
}

impl MemoryCart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<CartItem>) -> Self {
        Self {
            cart: Mutex::new(Cart::from_items(items)),
        }
    }

    pub fn add(&self, item: CartItem) -> bool {
        self.cart.lock().add(item)
    }

    pub fn remove(&self, id: &str) -> Option<CartItem> {
        self.cart.lock().remove(id)
    }
}

impl CartProvider for MemoryCart {
    fn cart(&self) -> Cart {
        self.cart.lock().clone()
    }

    fn clear(&self) {
        self.cart.lock().clear();
    }
}

/// Auth provider with a fixed (possibly absent) user
#[derive(Default)]
pub struct StaticAuth {
    user: Mutex<Option<User>>,
}

impl StaticAuth {
    pub fn new(user: Option<User>) -> Self {
        Self {
            user: Mutex::new(user),
        }
    }

    pub fn sign_in(&self, user: User) {
        *self.user.lock() = Some(user);
    }

    pub fn sign_out(&self) {
        *self.user.lock() = None;
    }
}

impl AuthProvider for StaticAuth {
    fn current_user(&self) -> Option<User> {
        self.user.lock().clone()
    }
}

/// Order service that records requests and answers from a script
pub struct MemoryOrderService {
    /// `None` succeeds; `Some(message)` rejects with that message
    failure: Mutex<Option<Option<String>>>,
    requests: Mutex<Vec<OrderRequest>>,
}

impl MemoryOrderService {
    pub fn succeeding() -> Self {
        Self {
            failure: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: Option<&str>) -> Self {
        let service = Self::succeeding();
        service.fail_with(message);
        service
    }

    pub fn succeed(&self) {
        *self.failure.lock() = None;
    }

    pub fn fail_with(&self, message: Option<&str>) {
        *self.failure.lock() = Some(message.map(str::to_string));
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests(&self) -> Vec<OrderRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl OrderService for MemoryOrderService {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderReceipt> {
        let call = {
            let mut requests = self.requests.lock();
            requests.push(request.clone());
            requests.len()
        };

        match self.failure.lock().clone() {
            Some(message) => Err(CheckoutError::order_rejected(message)),
            None => Ok(OrderReceipt {
                order_id: Some(format!("order_{call}")),
            }),
        }
    }
}

#[derive(Default)]
struct GatewayScript {
    session_error: Option<String>,
    redirect_error: Option<Option<String>>,
    panic_on_session: bool,
}

/// Payment gateway that hands out sequential session ids
#[derive(Default)]
pub struct MockPaymentGateway {
    script: Mutex<GatewayScript>,
    session_requests: Mutex<Vec<HostedSessionRequest>>,
    redirects: Mutex<Vec<SessionId>>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make session creation fail with a transport-style error
    pub fn fail_session(&self, reason: &str) {
        self.script.lock().session_error = Some(reason.to_string());
    }

    /// Make the redirect fail, optionally with a remote message
    pub fn fail_redirect(&self, message: Option<&str>) {
        self.script.lock().redirect_error = Some(message.map(str::to_string));
    }

    /// Panic inside session creation
    pub fn panic_on_session(&self) {
        self.script.lock().panic_on_session = true;
    }

    pub fn session_requests(&self) -> Vec<HostedSessionRequest> {
        self.session_requests.lock().clone()
    }

    pub fn redirects(&self) -> Vec<SessionId> {
        self.redirects.lock().clone()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_hosted_session(&self, request: &HostedSessionRequest) -> Result<SessionId> {
        let (should_panic, session_error) = {
            let script = self.script.lock();
            (script.panic_on_session, script.session_error.clone())
        };
        assert!(!should_panic, "mock gateway asked to panic");
        if let Some(reason) = session_error {
            return Err(CheckoutError::SessionRequest(reason));
        }

        let mut requests = self.session_requests.lock();
        requests.push(request.clone());
        Ok(SessionId::new(format!("cs_test_{}", requests.len())))
    }

    async fn redirect_to_hosted_checkout(&self, session: &SessionId) -> Result<()> {
        let redirect_error = self.script.lock().redirect_error.clone();
        if let Some(message) = redirect_error {
            return Err(CheckoutError::redirect(message));
        }

        self.redirects.lock().push(session.clone());
        Ok(())
    }
}

/// Navigator that remembers every destination
#[derive(Default)]
pub struct RecordingNavigator {
    visits: Mutex<VecDeque<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().iter().cloned().collect()
    }

    pub fn last(&self) -> Option<String> {
        self.visits.lock().back().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, path: &str) {
        self.visits.lock().push_back(path.to_string());
    }
}

//! Checkout Workflow
//!
//! ```text
//!            render()                 complete_purchase()
//!   ┌──────────────────┐       ┌──────────┐  ok   ┌──────────┐  +delay  clear cart,
//!   │ guard: cart,user │──────▶│   Form   │──────▶│ Complete │────────▶ go to courses
//!   └──────────────────┘       └──────────┘       └──────────┘
//!            │ unmet              ▲    │ pay_with_card()
//!            ▼                    │    ▼
//!      redirect away          err └─ Submitting ──ok──▶ hosted checkout (leaves app)
//! ```
//!
//! The loading flag is the only gate against double submission, so it is
//! checked and set under the same lock before any service is called.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use parking_lot::Mutex;

use crate::config::CheckoutConfig;
use crate::deferred::DeferredTask;
use crate::error::{CheckoutError, Result};
use crate::instructions::PaymentInstructions;
use crate::model::{Cart, HostedSessionRequest, OrderRequest, SessionId, User};
use crate::provider::CheckoutContext;
use crate::state::{CheckoutForm, CheckoutUiState, CheckoutView};

/// Result of a buyer action
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Order recorded; the cart clears after the configured delay
    Completed { order_id: Option<String> },

    /// Buyer handed off to the hosted checkout page
    Redirected { session_id: SessionId },

    /// Attempt failed; `message` is now shown on the form
    Failed { message: String },

    /// A submission is already running or the purchase is complete
    Busy,

    /// Preconditions no longer hold; the navigator was sent to `to`
    Blocked { to: String },
}

/// The checkout workflow for one page instance
pub struct CheckoutFlow {
    context: CheckoutContext,
    config: CheckoutConfig,
    state: Mutex<CheckoutUiState>,
    deferred: Mutex<Option<DeferredTask>>,
}

/// Clears the loading flag whichever way the handler exits
///
/// `finish` records the outcome and clears loading under one lock, so no
/// other submission can slip in between. Dropping an unfinished guard (the
/// handler future was cancelled or panicked) only clears loading.
struct LoadingGuard<'a> {
    state: &'a Mutex<CheckoutUiState>,
    armed: bool,
}

impl<'a> LoadingGuard<'a> {
    const fn new(state: &'a Mutex<CheckoutUiState>) -> Self {
        Self { state, armed: true }
    }

    fn finish(mut self, outcome: impl FnOnce(&mut CheckoutUiState)) {
        let mut state = self.state.lock();
        outcome(&mut state);
        state.loading = false;
        self.armed = false;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.lock().loading = false;
        }
    }
}

impl CheckoutFlow {
    pub fn new(context: CheckoutContext, config: CheckoutConfig) -> Self {
        Self {
            context,
            config,
            state: Mutex::new(CheckoutUiState::default()),
            deferred: Mutex::new(None),
        }
    }

    pub const fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    /// Snapshot of the UI state
    pub fn state(&self) -> CheckoutUiState {
        self.state.lock().clone()
    }

    pub fn card_payment_available(&self) -> bool {
        self.context.gateway.is_some()
    }

    /// Check preconditions, redirecting when they are not met
    ///
    /// The empty-cart check runs before the sign-in check.
    fn guard(&self) -> std::result::Result<(Cart, User), String> {
        let cart = self.context.cart.cart();
        if cart.is_empty() {
            return Err(self.redirect(&self.config.courses_path));
        }

        let Some(user) = self.context.auth.current_user() else {
            return Err(self.redirect(&self.config.login_path));
        };

        Ok((cart, user))
    }

    fn redirect(&self, path: &str) -> String {
        tracing::debug!(to = %path, "Checkout precondition unmet, redirecting");
        self.context.navigator.redirect(path);
        path.to_string()
    }

    /// Produce the current view
    pub fn render(&self) -> CheckoutView {
        let cart = match self.guard() {
            Ok((cart, _)) => cart,
            Err(to) => return CheckoutView::Redirect { to },
        };

        let state = self.state.lock().clone();
        if state.purchase_complete {
            return CheckoutView::complete();
        }

        CheckoutView::Form(CheckoutForm::build(
            &cart,
            &state,
            PaymentInstructions::for_payee(&self.config.payee_email),
            self.card_payment_available(),
        ))
    }

    /// Record an order for manual payment
    ///
    /// On success the cart clear is scheduled on the current tokio runtime.
    /// Outside a runtime the purchase still completes but the cart is left
    /// for the host to clear.
    pub async fn complete_purchase(&self) -> SubmitOutcome {
        let (cart, user) = match self.guard() {
            Ok(found) => found,
            Err(to) => return SubmitOutcome::Blocked { to },
        };

        if !self.state.lock().try_begin() {
            tracing::debug!("Submission ignored, checkout busy");
            return SubmitOutcome::Busy;
        }
        let loading = LoadingGuard::new(&self.state);

        let request = OrderRequest::new(&user, &cart);
        tracing::info!(
            request_id = %request.request_id,
            user_id = %request.user_id,
            items = request.items.len(),
            total = %request.total,
            "Submitting order"
        );

        match self.context.orders.create_order(&request).await {
            Ok(receipt) => {
                loading.finish(CheckoutUiState::complete);
                tracing::info!(
                    request_id = %request.request_id,
                    order_id = ?receipt.order_id,
                    "Order recorded"
                );
                self.schedule_clear();
                SubmitOutcome::Completed {
                    order_id: receipt.order_id,
                }
            }
            Err(e) => {
                let message = e.user_message(&self.config.order_error_fallback);
                tracing::warn!(request_id = %request.request_id, error = %e, "Order failed");
                loading.finish(|state| state.fail(message.clone()));
                SubmitOutcome::Failed { message }
            }
        }
    }

    fn schedule_clear(&self) {
        let cart = self.context.cart.clone();
        let navigator = self.context.navigator.clone();
        let destination = self.config.courses_path.clone();

        let Some(task) = DeferredTask::schedule(self.config.clear_delay, move || {
            cart.clear();
            navigator.redirect(&destination);
            tracing::debug!(to = %destination, "Cart cleared after purchase");
        }) else {
            return;
        };

        if let Some(previous) = self.deferred.lock().replace(task) {
            previous.cancel();
        }
    }

    /// Pay by card through the hosted checkout page
    pub async fn pay_with_card(&self) -> SubmitOutcome {
        let (cart, user) = match self.guard() {
            Ok(found) => found,
            Err(to) => return SubmitOutcome::Blocked { to },
        };

        if !self.state.lock().try_begin() {
            tracing::debug!("Card checkout ignored, checkout busy");
            return SubmitOutcome::Busy;
        }

        let loading = LoadingGuard::new(&self.state);
        let result = AssertUnwindSafe(self.start_hosted_checkout(&cart, &user))
            .catch_unwind()
            .await;

        match result {
            Ok(Ok(session_id)) => {
                loading.finish(|_| {});
                tracing::info!(session_id = %session_id, "Redirected to hosted checkout");
                SubmitOutcome::Redirected { session_id }
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Card checkout failed");
                let message = match &e {
                    CheckoutError::Redirect { .. } => e.user_message(&self.config.card_error_fallback),
                    _ => self.config.card_error_fallback.clone(),
                };
                loading.finish(|state| state.fail(message.clone()));
                SubmitOutcome::Failed { message }
            }
            Err(_) => {
                tracing::error!("Card checkout panicked");
                let message = self.config.card_error_fallback.clone();
                loading.finish(|state| state.fail(message.clone()));
                SubmitOutcome::Failed { message }
            }
        }
    }

    async fn start_hosted_checkout(&self, cart: &Cart, user: &User) -> Result<SessionId> {
        let gateway = self
            .context
            .gateway
            .as_ref()
            .ok_or_else(|| CheckoutError::Config("card payments are not configured".into()))?;

        let request = HostedSessionRequest::new(user, cart)?;
        let session = gateway.create_hosted_session(&request).await?;
        gateway.redirect_to_hosted_checkout(&session).await?;
        Ok(session)
    }

    /// Cancel the pending cart clear, if any
    pub fn teardown(&self) {
        if let Some(task) = self.deferred.lock().take() {
            task.cancel();
        }
    }
}

impl Drop for CheckoutFlow {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{
        MemoryCart, MemoryOrderService, MockPaymentGateway, RecordingNavigator, StaticAuth,
    };
    use crate::model::CartItem;
    use crate::provider::{CartProvider, OrderService};
    use crate::state::{CheckoutPhase, PROCESSING_LABEL};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    struct Harness {
        cart: Arc<MemoryCart>,
        navigator: Arc<RecordingNavigator>,
        orders: Arc<MemoryOrderService>,
        gateway: Arc<MockPaymentGateway>,
        flow: CheckoutFlow,
    }

    fn courses() -> Vec<CartItem> {
        vec![
            CartItem::new("c1", "Rust Basics", dec!(19.99), "Ada"),
            CartItem::new("c2", "Async Rust", dec!(30), "Grace").with_thumbnail("/img/async.png"),
        ]
    }

    fn harness(items: Vec<CartItem>, user: Option<User>, orders: MemoryOrderService) -> Harness {
        let cart = Arc::new(MemoryCart::with_items(items));
        let navigator = Arc::new(RecordingNavigator::new());
        let orders = Arc::new(orders);
        let gateway = Arc::new(MockPaymentGateway::new());
        let context = CheckoutContext::new(
            cart.clone(),
            Arc::new(StaticAuth::new(user)),
            orders.clone(),
            navigator.clone(),
        )
        .with_gateway(gateway.clone());

        Harness {
            cart,
            navigator,
            orders,
            gateway,
            flow: CheckoutFlow::new(context, CheckoutConfig::default()),
        }
    }

    fn buyer() -> Option<User> {
        Some(User::new("u1", "buyer@example.com"))
    }

    #[test]
    fn test_empty_cart_redirects_to_courses() {
        let h = harness(Vec::new(), buyer(), MemoryOrderService::succeeding());
        let view = h.flow.render();

        assert_eq!(view, CheckoutView::Redirect { to: "/courses".into() });
        assert_eq!(h.navigator.visits(), vec!["/courses".to_string()]);
    }

    #[test]
    fn test_empty_cart_checked_before_sign_in() {
        let h = harness(Vec::new(), None, MemoryOrderService::succeeding());
        assert_eq!(h.flow.render(), CheckoutView::Redirect { to: "/courses".into() });
        assert_eq!(h.navigator.visits(), vec!["/courses".to_string()]);
    }

    #[test]
    fn test_anonymous_buyer_redirects_to_login() {
        let h = harness(courses(), None, MemoryOrderService::succeeding());
        assert_eq!(h.flow.render(), CheckoutView::Redirect { to: "/login".into() });
        assert_eq!(h.navigator.visits(), vec!["/login".to_string()]);
    }

    #[test]
    fn test_form_lists_cart() {
        let h = harness(courses(), buyer(), MemoryOrderService::succeeding());
        let CheckoutView::Form(form) = h.flow.render() else {
            panic!("expected form");
        };

        assert_eq!(form.lines.len(), 2);
        assert_eq!(form.lines[0].price, "$19.99");
        assert_eq!(form.total, "$49.99");
        assert_eq!(form.subtotal, form.total);
        assert!(form.card_payment_available);
        assert!(form.error.is_none());
        assert_eq!(form.instructions.contact_email, "info@aga.social");
        assert!(h.navigator.visits().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_order_clears_cart_after_delay() {
        let h = harness(courses(), buyer(), MemoryOrderService::succeeding());

        let outcome = h.flow.complete_purchase().await;
        assert!(matches!(outcome, SubmitOutcome::Completed { .. }));
        assert_eq!(h.flow.state().phase(), CheckoutPhase::Complete);
        assert!(matches!(h.flow.render(), CheckoutView::Complete { .. }));

        let requests = h.orders.requests();
        let request = &requests[0];
        assert_eq!(request.user_id, "u1");
        assert_eq!(request.user_email, "buyer@example.com");
        assert_eq!(request.items.len(), 2);
        assert_eq!(request.total, dec!(49.99));

        tokio::time::sleep(Duration::from_millis(2_999)).await;
        assert_eq!(h.cart.cart().len(), 2);
        assert!(h.navigator.visits().is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(h.cart.cart().is_empty());
        assert_eq!(h.navigator.visits(), vec!["/courses".to_string()]);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(h.navigator.visits().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_order_shows_message_and_allows_retry() {
        let h = harness(courses(), buyer(), MemoryOrderService::failing(Some("X")));

        let outcome = h.flow.complete_purchase().await;
        assert_eq!(outcome, SubmitOutcome::Failed { message: "X".into() });
        let state = h.flow.state();
        assert_eq!(state.error, "X");
        assert!(!state.loading);
        assert!(!state.purchase_complete);

        let CheckoutView::Form(form) = h.flow.render() else {
            panic!("expected form");
        };
        assert_eq!(form.error.as_deref(), Some("X"));

        h.flow.complete_purchase().await;
        assert_eq!(h.orders.calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_order_without_message_uses_fallback() {
        let h = harness(courses(), buyer(), MemoryOrderService::failing(None));

        h.flow.complete_purchase().await;
        assert_eq!(h.flow.state().error, "Failed to create order");
    }

    #[tokio::test]
    async fn test_retry_clears_previous_error() {
        let h = harness(courses(), buyer(), MemoryOrderService::failing(Some("X")));
        h.flow.complete_purchase().await;

        h.orders.succeed();
        let outcome = h.flow.complete_purchase().await;
        assert!(matches!(outcome, SubmitOutcome::Completed { .. }));
        assert!(h.flow.state().error.is_empty());
    }

    struct GatedOrders {
        gate: Notify,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl OrderService for GatedOrders {
        async fn create_order(&self, _request: &OrderRequest) -> Result<crate::model::OrderReceipt> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            Ok(crate::model::OrderReceipt::default())
        }
    }

    #[tokio::test]
    async fn test_no_second_order_while_loading() {
        let orders = Arc::new(GatedOrders {
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
        });
        let context = CheckoutContext::new(
            Arc::new(MemoryCart::with_items(courses())),
            Arc::new(StaticAuth::new(buyer())),
            orders.clone(),
            Arc::new(RecordingNavigator::new()),
        );
        let flow = CheckoutFlow::new(context, CheckoutConfig::default());

        let first = flow.complete_purchase();
        let second = async {
            tokio::task::yield_now().await;
            let CheckoutView::Form(form) = flow.render() else {
                panic!("expected form");
            };
            assert!(form.loading);
            assert_eq!(form.submit_label, PROCESSING_LABEL);

            let outcome = flow.complete_purchase().await;
            orders.gate.notify_one();
            outcome
        };

        let (first, second) = tokio::join!(first, second);
        assert!(matches!(first, SubmitOutcome::Completed { .. }));
        assert_eq!(second, SubmitOutcome::Busy);
        assert_eq!(orders.calls.load(Ordering::SeqCst), 1);
    }

    /// First call never resolves, later calls succeed
    struct StallingOrders {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl OrderService for StallingOrders {
        async fn create_order(&self, _request: &OrderRequest) -> Result<crate::model::OrderReceipt> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                futures::future::pending::<()>().await;
            }
            Ok(crate::model::OrderReceipt::default())
        }
    }

    struct PanickingOrders;

    #[async_trait]
    impl OrderService for PanickingOrders {
        async fn create_order(&self, _request: &OrderRequest) -> Result<crate::model::OrderReceipt> {
            panic!("order service blew up");
        }
    }

    fn flow_with_orders(orders: Arc<dyn OrderService>) -> CheckoutFlow {
        let context = CheckoutContext::new(
            Arc::new(MemoryCart::with_items(courses())),
            Arc::new(StaticAuth::new(buyer())),
            orders,
            Arc::new(RecordingNavigator::new()),
        );
        CheckoutFlow::new(context, CheckoutConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_submission_can_be_retried() {
        let orders = Arc::new(StallingOrders {
            calls: AtomicUsize::new(0),
        });
        let flow = flow_with_orders(orders.clone());

        let timed_out = tokio::time::timeout(Duration::from_millis(10), flow.complete_purchase())
            .await
            .is_err();
        assert!(timed_out);
        assert_eq!(flow.state().phase(), CheckoutPhase::Form);

        let outcome = flow.complete_purchase().await;
        assert!(matches!(outcome, SubmitOutcome::Completed { .. }));
        assert_eq!(orders.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_order_service_panic_clears_loading() {
        let flow = flow_with_orders(Arc::new(PanickingOrders));
        let result = AssertUnwindSafe(flow.complete_purchase()).catch_unwind().await;

        assert!(result.is_err());
        let state = flow.state();
        assert!(!state.loading);
        assert!(!state.purchase_complete);
    }

    #[test]
    fn test_purchase_outside_runtime_does_not_panic() {
        let h = harness(courses(), buyer(), MemoryOrderService::succeeding());

        let outcome = futures::executor::block_on(h.flow.complete_purchase());
        assert!(matches!(outcome, SubmitOutcome::Completed { .. }));
        assert_eq!(h.flow.state().phase(), CheckoutPhase::Complete);
        assert_eq!(h.cart.cart().len(), 2);
        assert!(h.navigator.visits().is_empty());
    }

    #[test]
    fn test_loading_guard_records_outcome_with_loading_cleared() {
        let state = Mutex::new(CheckoutUiState::default());
        assert!(state.lock().try_begin());

        LoadingGuard::new(&state).finish(|s| s.fail("declined"));
        let snapshot = state.lock().clone();
        assert!(!snapshot.loading);
        assert_eq!(snapshot.error, "declined");

        assert!(state.lock().try_begin());
        drop(LoadingGuard::new(&state));
        let snapshot = state.lock().clone();
        assert!(!snapshot.loading);
        assert!(snapshot.error.is_empty());
    }

    #[tokio::test]
    async fn test_no_submission_after_complete() {
        let h = harness(courses(), buyer(), MemoryOrderService::succeeding());
        h.flow.complete_purchase().await;

        assert_eq!(h.flow.complete_purchase().await, SubmitOutcome::Busy);
        assert_eq!(h.flow.pay_with_card().await, SubmitOutcome::Busy);
        assert_eq!(h.orders.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_discards_pending_clear() {
        let h = harness(courses(), buyer(), MemoryOrderService::succeeding());
        h.flow.complete_purchase().await;
        h.flow.teardown();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(h.cart.cart().len(), 2);
        assert!(h.navigator.visits().is_empty());
    }

    #[tokio::test]
    async fn test_card_checkout_redirects_to_session() {
        let h = harness(courses(), buyer(), MemoryOrderService::succeeding());

        let outcome = h.flow.pay_with_card().await;
        assert_eq!(
            outcome,
            SubmitOutcome::Redirected {
                session_id: SessionId::new("cs_test_1")
            }
        );
        assert!(!h.flow.state().loading);
        assert_eq!(h.gateway.redirects(), vec![SessionId::new("cs_test_1")]);

        let requests = h.gateway.session_requests();
        let request = &requests[0];
        assert_eq!(request.user_id, "u1");
        assert_eq!(request.items[0].price, 1999);
        assert_eq!(request.items[1].price, 3000);
        assert_eq!(h.orders.calls(), 0);
    }

    #[tokio::test]
    async fn test_redirect_failure_surfaces_remote_message() {
        let h = harness(courses(), buyer(), MemoryOrderService::succeeding());
        h.gateway.fail_redirect(Some("Y"));

        let outcome = h.flow.pay_with_card().await;
        assert_eq!(outcome, SubmitOutcome::Failed { message: "Y".into() });
        let state = h.flow.state();
        assert_eq!(state.error, "Y");
        assert!(!state.loading);
        assert!(!state.purchase_complete);
    }

    #[tokio::test]
    async fn test_session_failure_uses_generic_message() {
        let h = harness(courses(), buyer(), MemoryOrderService::succeeding());
        h.gateway.fail_session("upstream 502");

        h.flow.pay_with_card().await;
        let state = h.flow.state();
        assert_eq!(state.error, CheckoutConfig::default().card_error_fallback);
        assert!(!state.loading);
        assert!(h.gateway.redirects().is_empty());
    }

    #[tokio::test]
    async fn test_gateway_panic_is_contained() {
        let h = harness(courses(), buyer(), MemoryOrderService::succeeding());
        h.gateway.panic_on_session();

        let outcome = h.flow.pay_with_card().await;
        assert!(matches!(outcome, SubmitOutcome::Failed { .. }));
        assert!(!h.flow.state().loading);
    }

    #[tokio::test]
    async fn test_card_checkout_without_gateway() {
        let context = CheckoutContext::new(
            Arc::new(MemoryCart::with_items(courses())),
            Arc::new(StaticAuth::new(buyer())),
            Arc::new(MemoryOrderService::succeeding()),
            Arc::new(RecordingNavigator::new()),
        );
        let flow = CheckoutFlow::new(context, CheckoutConfig::default());

        let CheckoutView::Form(form) = flow.render() else {
            panic!("expected form");
        };
        assert!(!form.card_payment_available);
        assert!(matches!(flow.pay_with_card().await, SubmitOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn test_submit_with_empty_cart_is_blocked() {
        let h = harness(Vec::new(), buyer(), MemoryOrderService::succeeding());
        assert_eq!(
            h.flow.complete_purchase().await,
            SubmitOutcome::Blocked { to: "/courses".into() }
        );
        assert_eq!(h.orders.calls(), 0);
    }
}

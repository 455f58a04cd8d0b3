//! Checkout UI State and View Model

use serde::{Deserialize, Serialize};

use crate::instructions::PaymentInstructions;
use crate::model::{Cart, CartItem, format_usd};

pub const SUBMIT_LABEL: &str = "Complete Purchase";
pub const PROCESSING_LABEL: &str = "Processing...";
pub const CONFIRMATION_HEADING: &str = "Thank you for your purchase!";
pub const CONFIRMATION_MESSAGE: &str = "Please check your email for course access instructions.";

/// Where the workflow is in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutPhase {
    /// Waiting for the buyer; may carry an error from the last attempt
    Form,

    /// A submission is in flight
    Submitting,

    /// Order recorded, terminal
    Complete,
}

/// Per-instance UI state
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutUiState {
    pub purchase_complete: bool,
    pub loading: bool,

    /// Empty when there is nothing to show
    pub error: String,
}

impl CheckoutUiState {
    pub const fn phase(&self) -> CheckoutPhase {
        if self.purchase_complete {
            CheckoutPhase::Complete
        } else if self.loading {
            CheckoutPhase::Submitting
        } else {
            CheckoutPhase::Form
        }
    }

    /// Enter `Submitting`, clearing the previous error
    ///
    /// Returns false when a submission is already running or the purchase
    /// is complete; the caller must not contact any service in that case.
    pub(crate) fn try_begin(&mut self) -> bool {
        if self.phase() != CheckoutPhase::Form {
            return false;
        }
        self.loading = true;
        self.error.clear();
        true
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.error = message.into();
        self.loading = false;
    }

    pub(crate) fn complete(&mut self) {
        self.loading = false;
        self.purchase_complete = true;
    }

    pub fn error(&self) -> Option<&str> {
        (!self.error.is_empty()).then_some(self.error.as_str())
    }
}

/// A cart line as displayed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineView {
    pub id: String,
    pub title: String,
    pub instructor: String,
    pub thumbnail: Option<String>,
    pub price: String,
}

impl From<&CartItem> for LineView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            instructor: item.instructor.clone(),
            thumbnail: item.thumbnail.clone(),
            price: format_usd(item.price),
        }
    }
}

/// The interactive checkout form
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutForm {
    pub lines: Vec<LineView>,
    pub subtotal: String,
    pub total: String,
    pub instructions: PaymentInstructions,
    pub error: Option<String>,
    pub loading: bool,
    pub card_payment_available: bool,
    pub submit_label: String,
}

impl CheckoutForm {
    pub(crate) fn build(
        cart: &Cart,
        state: &CheckoutUiState,
        instructions: PaymentInstructions,
        card_payment_available: bool,
    ) -> Self {
        let total = format_usd(cart.total());
        Self {
            lines: cart.items().iter().map(LineView::from).collect(),
            subtotal: total.clone(),
            total,
            instructions,
            error: state.error().map(str::to_string),
            loading: state.loading,
            card_payment_available,
            submit_label: if state.loading { PROCESSING_LABEL } else { SUBMIT_LABEL }.to_string(),
        }
    }
}

/// What a render produced
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum CheckoutView {
    /// A precondition failed; the navigator was sent to `to`
    Redirect { to: String },

    /// Order recorded
    Complete { heading: String, message: String },

    Form(CheckoutForm),
}

impl CheckoutView {
    pub(crate) fn complete() -> Self {
        Self::Complete {
            heading: CONFIRMATION_HEADING.into(),
            message: CONFIRMATION_MESSAGE.into(),
        }
    }

    pub const fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }
}

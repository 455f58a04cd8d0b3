//! # checkout-core
//!
//! Checkout workflow for the course marketplace, independent of any UI toolkit,
//! order backend or payment processor.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        CheckoutFlow                           │
//! │  ┌─────────────┐  ┌──────────────┐  ┌──────────────────────┐  │
//! │  │ Precondition│  │ UI state     │  │ CheckoutContext      │  │
//! │  │ guard       │──│ + deferred   │──│ cart · auth · orders │  │
//! │  │             │  │   cart clear │  │ gateway · navigator  │  │
//! │  └─────────────┘  └──────────────┘  └──────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every collaborator is a trait object handed to the constructor, so the same
//! workflow runs against in-memory stores in tests and HTTP clients in
//! production.

pub mod config;
pub mod deferred;
pub mod error;
pub mod flow;
pub mod instructions;
pub mod memory;
pub mod model;
pub mod provider;
pub mod state;

pub use config::CheckoutConfig;
pub use error::{CheckoutError, Result};
pub use flow::{CheckoutFlow, SubmitOutcome};
pub use model::{
    Cart, CartItem, HostedSessionRequest, OrderReceipt, OrderRequest, SessionId, SessionLineItem,
    User,
};
pub use provider::{
    AuthProvider, CartProvider, CheckoutContext, Navigator, OrderService, PaymentGateway,
};
pub use state::{CheckoutPhase, CheckoutUiState, CheckoutView};

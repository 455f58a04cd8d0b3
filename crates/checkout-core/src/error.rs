//! Error Types

use thiserror::Error;

/// Result type alias for checkout operations
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Checkout error types
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// Order service refused or failed to record the order
    #[error("Order rejected: {}", .message.as_deref().unwrap_or("no message"))]
    OrderRejected { message: Option<String> },

    /// Hosted checkout session could not be created
    #[error("Hosted session request failed: {0}")]
    SessionRequest(String),

    /// Gateway could not redirect to the hosted checkout
    #[error("Hosted checkout redirect failed: {}", .message.as_deref().unwrap_or("no message"))]
    Redirect { message: Option<String> },

    /// Price cannot be expressed in minor currency units
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Network failure talking to a remote service
    #[error("Network error: {0}")]
    Network(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl CheckoutError {
    /// Build an order rejection with an optional remote message
    pub fn order_rejected(message: Option<impl Into<String>>) -> Self {
        Self::OrderRejected {
            message: message.map(Into::<String>::into).filter(|m| !m.is_empty()),
        }
    }

    /// Build a redirect failure with an optional remote message
    pub fn redirect(message: Option<impl Into<String>>) -> Self {
        Self::Redirect {
            message: message.map(Into::<String>::into).filter(|m| !m.is_empty()),
        }
    }

    /// Check if the user may simply try again
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::OrderRejected { .. }
                | Self::SessionRequest(_)
                | Self::Redirect { .. }
                | Self::Network(_)
        )
    }

    /// Message supplied by the remote side, if any
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::OrderRejected { message } | Self::Redirect { message } => message.as_deref(),
            _ => None,
        }
    }

    /// Convert to a user-facing message, falling back when the remote gave none
    pub fn user_message(&self, fallback: &str) -> String {
        self.remote_message().unwrap_or(fallback).to_string()
    }
}

impl From<anyhow::Error> for CheckoutError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

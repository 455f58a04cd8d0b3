//! Payment Error Types

use checkout_core::CheckoutError;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment-related errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Session endpoint answered with an error
    #[error("Session error: {0}")]
    Session(String),

    /// Hosted checkout redirect refused
    #[error("Redirect error: {0}")]
    Redirect(String),

    /// Publishable key missing or malformed
    #[error("Invalid publishable key: {0}")]
    InvalidKey(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Malformed response body
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PaymentError {
    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Session(_) | Self::Network(_))
    }

    /// Get user-friendly message
    pub fn user_message(&self) -> &str {
        match self {
            Self::Redirect(message) => message,
            Self::Session(_) | Self::Network(_) => "Payment processing failed. Please try again.",
            Self::InvalidKey(_) | Self::Config(_) => "Service configuration error.",
            Self::Serialization(_) => "An error occurred processing your request.",
        }
    }
}

impl From<PaymentError> for CheckoutError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Redirect(message) => Self::redirect(Some(message)),
            PaymentError::Session(message) => Self::SessionRequest(message),
            PaymentError::Network(e) => Self::Network(e.to_string()),
            PaymentError::InvalidKey(message) | PaymentError::Config(message) => Self::Config(message),
            PaymentError::Serialization(e) => Self::Json(e),
        }
    }
}

//! Manual Payment Instructions
//!
//! Out-of-band payment options shown beside the cart. The buyer pays through
//! one of these services and then emails the transaction details, which is
//! why the order record is created before any money moves.

use serde::{Deserialize, Serialize};

/// Out-of-band payment service
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManualMethod {
    Zelle,
    PayPal,
}

impl ManualMethod {
    pub const ALL: [Self; 2] = [Self::Zelle, Self::PayPal];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Zelle => "Zelle",
            Self::PayPal => "PayPal",
        }
    }
}

/// One payment option with the address to pay
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOption {
    pub method: ManualMethod,
    pub payee: String,
}

/// Everything the buyer needs to pay manually
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInstructions {
    pub options: Vec<PaymentOption>,

    /// Where transaction details must be emailed
    pub contact_email: String,

    /// Details the buyer must include in that email
    pub required_details: Vec<String>,
}

impl PaymentInstructions {
    pub fn for_payee(payee: &str) -> Self {
        Self {
            options: ManualMethod::ALL
                .into_iter()
                .map(|method| PaymentOption {
                    method,
                    payee: payee.to_string(),
                })
                .collect(),
            contact_email: payee.to_string(),
            required_details: vec![
                "Your registered email".into(),
                "Transaction ID or reference number".into(),
                "Course(s) purchased".into(),
            ],
        }
    }

    /// The "Important" notice text
    pub fn notice(&self) -> String {
        format!(
            "After sending payment, please email your transaction details to {} including:",
            self.contact_email
        )
    }
}

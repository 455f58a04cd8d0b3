//! Checkout Configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Delay between a confirmed order and clearing the cart
pub const DEFAULT_CLEAR_DELAY: Duration = Duration::from_secs(3);

/// Workflow settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Where buyers land when there is nothing to check out
    #[serde(default = "default_courses_path")]
    pub courses_path: String,

    /// Where anonymous buyers are sent
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Delay before the cart is cleared after a confirmed order
    #[serde(default = "default_clear_delay", with = "millis")]
    pub clear_delay: Duration,

    /// Shown when the order service fails without a message
    #[serde(default = "default_order_error")]
    pub order_error_fallback: String,

    /// Shown when a card checkout cannot be started
    #[serde(default = "default_card_error")]
    pub card_error_fallback: String,

    /// Address manual payments are sent to
    #[serde(default = "default_payee_email")]
    pub payee_email: String,
}

fn default_courses_path() -> String { "/courses".into() }
fn default_login_path() -> String { "/login".into() }
const fn default_clear_delay() -> Duration { DEFAULT_CLEAR_DELAY }
fn default_order_error() -> String { "Failed to create order".into() }
fn default_card_error() -> String { "Failed to start card checkout. Please try again.".into() }
fn default_payee_email() -> String { "info@aga.social".into() }

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            courses_path: default_courses_path(),
            login_path: default_login_path(),
            clear_delay: default_clear_delay(),
            order_error_fallback: default_order_error(),
            card_error_fallback: default_card_error(),
            payee_email: default_payee_email(),
        }
    }
}

impl CheckoutConfig {
    /// Defaults overridden by `CHECKOUT_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(email) = std::env::var("CHECKOUT_PAYEE_EMAIL") {
            config.payee_email = email;
        }
        if let Some(delay) = std::env::var("CHECKOUT_CLEAR_DELAY_MS")
            .ok()
            .and_then(|ms| ms.parse().ok())
        {
            config.clear_delay = Duration::from_millis(delay);
        }
        if let Ok(path) = std::env::var("CHECKOUT_COURSES_PATH") {
            config.courses_path = path;
        }
        if let Ok(path) = std::env::var("CHECKOUT_LOGIN_PATH") {
            config.login_path = path;
        }

        config
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(delay: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

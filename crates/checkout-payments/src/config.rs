//! Gateway Configuration

use serde::{Deserialize, Serialize};

use crate::error::{PaymentError, Result};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_SESSION_PATH: &str = "/api/create-checkout-session";
pub const DEFAULT_CHECKOUT_URL: &str = "https://checkout.stripe.com/c/pay";

/// Whether a key or session belongs to the test or live environment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyMode {
    Test,
    Live,
}

impl KeyMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Live => "live",
        }
    }
}

/// Public client key (`pk_test_...` / `pk_live_...`)
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublishableKey {
    key: String,
    mode: KeyMode,
}

impl PublishableKey {
    pub fn parse(key: impl Into<String>) -> Result<Self> {
        let key = key.into().trim().to_string();
        let mode = if key.starts_with("pk_test_") {
            KeyMode::Test
        } else if key.starts_with("pk_live_") {
            KeyMode::Live
        } else {
            return Err(PaymentError::InvalidKey(
                "expected a key starting with pk_test_ or pk_live_".into(),
            ));
        };

        Ok(Self { key, mode })
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub const fn mode(&self) -> KeyMode {
        self.mode
    }
}

impl std::fmt::Debug for PublishableKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishableKey")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl TryFrom<String> for PublishableKey {
    type Error = PaymentError;

    fn try_from(key: String) -> Result<Self> {
        Self::parse(key)
    }
}

impl From<PublishableKey> for String {
    fn from(key: PublishableKey) -> Self {
        key.key
    }
}

/// Settings for the hosted checkout client
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub publishable_key: PublishableKey,

    /// Origin the session endpoint is served from
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_session_path")]
    pub session_path: String,

    /// Hosted checkout page; the session id is appended
    #[serde(default = "default_checkout_url")]
    pub checkout_url: String,
}

fn default_api_base_url() -> String { DEFAULT_API_BASE_URL.into() }
fn default_session_path() -> String { DEFAULT_SESSION_PATH.into() }
fn default_checkout_url() -> String { DEFAULT_CHECKOUT_URL.into() }

impl GatewayConfig {
    pub fn new(publishable_key: PublishableKey) -> Self {
        Self {
            publishable_key,
            api_base_url: default_api_base_url(),
            session_path: default_session_path(),
            checkout_url: default_checkout_url(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let key = std::env::var("STRIPE_PUBLISHABLE_KEY")
            .map_err(|_| PaymentError::Config("STRIPE_PUBLISHABLE_KEY not set".into()))?;

        let mut config = Self::new(PublishableKey::parse(key)?);
        if let Ok(base) = std::env::var("CHECKOUT_API_BASE_URL") {
            config.api_base_url = base;
        }
        if let Ok(path) = std::env::var("CHECKOUT_SESSION_PATH") {
            config.session_path = path;
        }
        if let Ok(url) = std::env::var("STRIPE_CHECKOUT_URL") {
            config.checkout_url = url;
        }

        Ok(config)
    }

    /// Absolute URL of the session endpoint
    pub fn session_endpoint(&self) -> String {
        join_url(&self.api_base_url, &self.session_path)
    }
}

/// Join a base URL and a path without doubling or dropping the slash
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_modes() {
        assert_eq!(PublishableKey::parse("pk_test_abc").unwrap().mode(), KeyMode::Test);
        assert_eq!(PublishableKey::parse(" pk_live_abc ").unwrap().mode(), KeyMode::Live);
        assert!(PublishableKey::parse("sk_test_abc").is_err());
        assert!(PublishableKey::parse("").is_err());
    }

    #[test]
    fn test_key_debug_is_redacted() {
        let key = PublishableKey::parse("pk_test_secretish").unwrap();
        assert!(!format!("{key:?}").contains("secretish"));
    }

    #[test]
    fn test_session_endpoint() {
        let mut config = GatewayConfig::new(PublishableKey::parse("pk_test_abc").unwrap());
        assert_eq!(
            config.session_endpoint(),
            "http://localhost:3000/api/create-checkout-session"
        );

        config.api_base_url = "https://shop.example.com/".into();
        assert_eq!(
            config.session_endpoint(),
            "https://shop.example.com/api/create-checkout-session"
        );
    }

    #[test]
    fn test_config_from_json_rejects_bad_key() {
        let ok: GatewayConfig = serde_json::from_str(r#"{"publishable_key": "pk_test_1"}"#).unwrap();
        assert_eq!(ok.checkout_url, DEFAULT_CHECKOUT_URL);

        let bad = serde_json::from_str::<GatewayConfig>(r#"{"publishable_key": "nope"}"#);
        assert!(bad.is_err());
    }
}

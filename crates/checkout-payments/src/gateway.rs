//! Hosted Checkout Gateway
//!
//! `PaymentGateway` implementation for a processor's hosted checkout page:
//! sessions come from the shop backend, and the redirect sends the buyer's
//! navigator to the hosted page for that session.

use std::sync::Arc;

use async_trait::async_trait;
use checkout_core::{HostedSessionRequest, Navigator, PaymentGateway, SessionId};

use crate::config::{GatewayConfig, KeyMode, PublishableKey, join_url};
use crate::error::{PaymentError, Result};
use crate::session::HttpSessionClient;

/// Gateway client initialized with the public key at startup
pub struct HostedCheckoutGateway {
    publishable_key: PublishableKey,
    sessions: HttpSessionClient,
    checkout_url: String,
    navigator: Arc<dyn Navigator>,
}

impl HostedCheckoutGateway {
    pub fn new(config: GatewayConfig, navigator: Arc<dyn Navigator>) -> Self {
        let sessions = HttpSessionClient::new(config.session_endpoint());
        Self::with_sessions(config, sessions, navigator)
    }

    pub fn with_sessions(
        config: GatewayConfig,
        sessions: HttpSessionClient,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        tracing::info!(
            mode = config.publishable_key.mode().as_str(),
            endpoint = %sessions.endpoint(),
            "Hosted checkout gateway ready"
        );
        Self {
            publishable_key: config.publishable_key,
            sessions,
            checkout_url: config.checkout_url,
            navigator,
        }
    }

    /// Create from environment variables
    pub fn from_env(navigator: Arc<dyn Navigator>) -> Result<Self> {
        Ok(Self::new(GatewayConfig::from_env()?, navigator))
    }

    pub const fn mode(&self) -> KeyMode {
        self.publishable_key.mode()
    }

    /// Hosted page URL for `session`, checked against the key's mode
    pub fn checkout_url_for(&self, session: &SessionId) -> Result<String> {
        let id = session.as_str();
        let session_mode = if id.starts_with("cs_test_") {
            KeyMode::Test
        } else if id.starts_with("cs_live_") {
            KeyMode::Live
        } else {
            return Err(PaymentError::Redirect(
                "The checkout session id is not valid.".into(),
            ));
        };

        if session_mode != self.publishable_key.mode() {
            return Err(PaymentError::Redirect(format!(
                "This checkout session was created in {} mode, but the publishable key is in {} mode.",
                session_mode.as_str(),
                self.publishable_key.mode().as_str()
            )));
        }

        Ok(join_url(&self.checkout_url, id))
    }
}

#[async_trait]
impl PaymentGateway for HostedCheckoutGateway {
    async fn create_hosted_session(
        &self,
        request: &HostedSessionRequest,
    ) -> checkout_core::Result<SessionId> {
        Ok(self.sessions.create_session(request).await?)
    }

    async fn redirect_to_hosted_checkout(&self, session: &SessionId) -> checkout_core::Result<()> {
        let url = self.checkout_url_for(session)?;
        tracing::info!(session_id = %session, "Leaving for hosted checkout");
        self.navigator.redirect(&url);
        Ok(())
    }
}

//! HTTP Order Service
//!
//! Implementation of `OrderService` against the shop backend's orders endpoint.

use async_trait::async_trait;
use checkout_core::{CheckoutError, OrderReceipt, OrderRequest, OrderService, Result};
use serde::Deserialize;

/// Header carrying the request id so a retried POST is not recorded twice
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Body returned by the orders endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderResponse {
    #[serde(default)]
    success: bool,

    #[serde(default)]
    error: Option<String>,

    #[serde(default)]
    order_id: Option<String>,
}

/// Order service backed by an HTTP endpoint
#[derive(Clone, Debug)]
pub struct HttpOrderService {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpOrderService {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_request(&self, request: &OrderRequest) -> Result<reqwest::Request> {
        self.client
            .post(&self.endpoint)
            .header(IDEMPOTENCY_HEADER, request.request_id.to_string())
            .json(request)
            .build()
            .map_err(|e| CheckoutError::Network(e.to_string()))
    }
}

#[async_trait]
impl OrderService for HttpOrderService {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderReceipt> {
        let response = self
            .client
            .execute(self.build_request(request)?)
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))?;

        let result = parse_order_response(status, &body);
        if let Err(e) = &result {
            tracing::warn!(
                request_id = %request.request_id,
                status = status.as_u16(),
                error = %e,
                "Orders endpoint refused order"
            );
        }
        result
    }
}

fn parse_order_response(status: reqwest::StatusCode, body: &str) -> Result<OrderReceipt> {
    match serde_json::from_str::<OrderResponse>(body) {
        Ok(response) if status.is_success() && response.success => Ok(OrderReceipt {
            order_id: response.order_id,
        }),
        Ok(response) => Err(CheckoutError::order_rejected(response.error)),
        Err(_) => Err(CheckoutError::order_rejected(None::<String>)),
    }
}

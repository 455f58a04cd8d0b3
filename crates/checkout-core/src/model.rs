//! Domain Models
//!
//! Cart, user and order types consumed by the checkout workflow.
//! Uses `rust_decimal` for all monetary values - never use f64 for money!

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CheckoutError, Result};

/// Minor units per major currency unit (cents per dollar)
const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// A course in the cart
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Course identifier
    pub id: String,

    /// Course title
    pub title: String,

    /// Price in major currency units (e.g. dollars)
    pub price: Decimal,

    /// Optional thumbnail URL
    #[serde(default)]
    pub thumbnail: Option<String>,

    /// Instructor display name
    pub instructor: String,
}

impl CartItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        price: Decimal,
        instructor: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            thumbnail: None,
            instructor: instructor.into(),
        }
    }

    #[must_use]
    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    /// Unit price in minor currency units, rounded half away from zero
    pub fn unit_amount_minor(&self) -> Result<i64> {
        to_minor_units(self.price)
    }
}

/// Convert a major-unit amount to minor units
pub fn to_minor_units(amount: Decimal) -> Result<i64> {
    if amount.is_sign_negative() {
        return Err(CheckoutError::InvalidAmount(format!("negative amount {amount}")));
    }

    (amount * Decimal::from(MINOR_UNITS_PER_MAJOR))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| CheckoutError::InvalidAmount(format!("{amount} does not fit in minor units")))
}

/// Format an amount for display, e.g. `$12.50`
pub fn format_usd(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("${rounded:.2}")
}

/// The shopping cart: ordered items plus the derived total
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn from_items(items: Vec<CartItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of item prices
    pub fn total(&self) -> Decimal {
        self.items.iter().map(|item| item.price).sum()
    }

    /// Add an item; a course already in the cart is not added twice
    pub fn add(&mut self, item: CartItem) -> bool {
        if self.items.iter().any(|existing| existing.id == item.id) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn remove(&mut self, id: &str) -> Option<CartItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// The signed-in user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
}

impl User {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }
}

/// Snapshot of a purchase, built once when the buyer confirms
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// Client-generated id, doubles as idempotency key
    pub request_id: Uuid,

    pub user_id: String,

    pub user_email: String,

    pub items: Vec<CartItem>,

    pub total: Decimal,

    pub submitted_at: DateTime<Utc>,
}

impl OrderRequest {
    pub fn new(user: &User, cart: &Cart) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            user_id: user.id.clone(),
            user_email: user.email.clone(),
            items: cart.items().to_vec(),
            total: cart.total(),
            submitted_at: Utc::now(),
        }
    }
}

/// Acknowledgement from the order service
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    #[serde(default)]
    pub order_id: Option<String>,
}

/// One line of a hosted checkout session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLineItem {
    /// Display name shown on the hosted page
    pub name: String,

    /// Instructor credit line
    pub description: String,

    /// Unit price in minor currency units
    pub price: i64,

    pub quantity: u32,
}

impl TryFrom<&CartItem> for SessionLineItem {
    type Error = CheckoutError;

    fn try_from(item: &CartItem) -> Result<Self> {
        Ok(Self {
            name: item.title.clone(),
            description: format!("by {}", item.instructor),
            price: item.unit_amount_minor()?,
            quantity: 1,
        })
    }
}

/// Request for a hosted checkout session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostedSessionRequest {
    pub items: Vec<SessionLineItem>,
    pub user_id: String,
    pub user_email: String,
}

impl HostedSessionRequest {
    pub fn new(user: &User, cart: &Cart) -> Result<Self> {
        let items = cart
            .items()
            .iter()
            .map(SessionLineItem::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            items,
            user_id: user.id.clone(),
            user_email: user.email.clone(),
        })
    }
}

/// Opaque id of a hosted checkout session
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//! Order model and boundary validation
//!
//! The HTTP layer hands over raw string fields; [`Order::from_raw_items`]
//! validates the whole submission before any device I/O happens.

use serde::{Deserialize, Serialize};

use crate::error::DisplayError;

/// One line item as received over the wire (all fields as text)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLineItem {
    /// Item name shown on the display
    pub name: String,
    /// Unit price as decimal text
    pub price: String,
    /// Quantity as integer text
    pub quantity: String,
}

/// A validated line item
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    /// Item name
    pub name: String,
    /// Non-negative unit price in currency units
    pub unit_price: f64,
    /// Positive quantity
    pub quantity: u32,
}

impl LineItem {
    /// Item total rounded half-up to the nearest currency unit.
    ///
    /// Rounding happens per item, before summation into the order
    /// total. This is the single rounding rule used everywhere.
    pub fn rounded_total(&self) -> i64 {
        round_half_up(self.unit_price * self.quantity as f64)
    }
}

/// An ordered sequence of validated line items
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Order {
    items: Vec<LineItem>,
}

impl Order {
    /// Build an order from pre-validated items
    pub fn new(items: Vec<LineItem>) -> Self {
        Self { items }
    }

    /// Validate raw boundary items into an order.
    ///
    /// Rejects an empty submission, and rejects the whole submission
    /// on the first malformed item: empty name, unparseable or
    /// negative price, unparseable or non-positive quantity.
    pub fn from_raw_items(raw: &[RawLineItem]) -> Result<Self, DisplayError> {
        if raw.is_empty() {
            return Err(DisplayError::Validation("no items provided".to_string()));
        }

        let mut items = Vec::with_capacity(raw.len());
        for (index, item) in raw.iter().enumerate() {
            let name = item.name.trim();
            if name.is_empty() {
                return Err(DisplayError::Validation(format!(
                    "item {index}: name is empty"
                )));
            }

            let unit_price: f64 = item.price.trim().parse().map_err(|_| {
                DisplayError::Validation(format!(
                    "item {index} ({name}): price {:?} is not numeric",
                    item.price
                ))
            })?;
            if !unit_price.is_finite() || unit_price < 0.0 {
                return Err(DisplayError::Validation(format!(
                    "item {index} ({name}): price {unit_price} is negative"
                )));
            }

            let quantity: u32 = item.quantity.trim().parse().map_err(|_| {
                DisplayError::Validation(format!(
                    "item {index} ({name}): quantity {:?} is not an integer",
                    item.quantity
                ))
            })?;
            if quantity == 0 {
                return Err(DisplayError::Validation(format!(
                    "item {index} ({name}): quantity must be positive"
                )));
            }

            items.push(LineItem {
                name: name.to_string(),
                unit_price,
                quantity,
            });
        }
        Ok(Self { items })
    }

    /// Line items in input order
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Number of line items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the order has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Order total: sum of per-item rounded totals
    pub fn total(&self) -> i64 {
        self.items.iter().map(LineItem::rounded_total).sum()
    }
}

/// Round a non-negative amount half-up to the nearest integer.
///
/// Pinned by tests; 0.5 always rounds away from zero.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

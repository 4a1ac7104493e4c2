//! Cart and orders

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::products::ProductId;

/// Product details embedded in cart and order lines
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LineProduct {
    #[serde(default)]
    pub id: Option<ProductId>,
    pub name: String,
    pub price: f64,
}

/// Single line of a cart or an order
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Line {
    /// Line id, used to remove the line from the cart
    pub id: i64,
    pub product: LineProduct,
    pub quantity: u32,
}

impl Line {
    pub fn subtotal(&self) -> f64 {
        f64::from(self.quantity) * self.product.price
    }
}

/// Current user's cart
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<Line>,
    /// Total as computed by the backend
    #[serde(default)]
    pub total: f64,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Item added to the cart
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NewCartItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Placed order
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Order {
    pub id: i64,
    #[serde(deserialize_with = "super::deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub items: Vec<Line>,
}

impl Order {
    /// Order total; the backend does not report it, so it is summed from the lines
    pub fn total(&self) -> f64 {
        self.items.iter().map(Line::subtotal).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn order_total_sums_lines() {
        let order: Order = serde_json::from_value(json!({
            "id": 3,
            "created_at": "2024-05-01T12:30:00",
            "status": "completed",
            "items": [
                { "id": 1, "product": { "name": "Kettle", "price": 24.5 }, "quantity": 2 },
                { "id": 2, "product": { "name": "Mug", "price": 4.25 }, "quantity": 4 },
            ],
        }))
        .unwrap();

        assert_eq!(order.items[0].subtotal(), 49.0);
        assert_eq!(order.total(), 66.0);
    }

    #[test]
    fn empty_cart() {
        let cart: Cart = serde_json::from_value(json!({ "items": [], "total": 0.0 })).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart, Cart::default());
    }
}

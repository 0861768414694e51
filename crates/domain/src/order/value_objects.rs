//! Value objects for the order domain.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

/// A line in an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// The product identifier.
    pub product_id: ProductId,

    /// Quantity ordered.
    pub quantity: u32,

    /// Price per unit in cents.
    pub unit_price: Money,
}

impl LineItem {
    /// Creates a new line item.
    pub fn new(product_id: impl Into<ProductId>, quantity: u32, unit_price: Money) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns quantity * unit_price, or `None` on overflow.
    pub fn total_price(&self) -> Option<Money> {
        self.unit_price.checked_multiply(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_item_total_price() {
        let item = LineItem::new("product-1", 2, Money::from_cents(99999));
        assert_eq!(item.total_price(), Some(Money::from_cents(199998)));
    }

    #[test]
    fn test_line_item_total_overflow() {
        let item = LineItem::new("product-1", u32::MAX, Money::from_cents(i64::MAX / 2));
        assert_eq!(item.total_price(), None);
    }

    #[test]
    fn test_line_item_serialization() {
        let item = LineItem::new("product-2", 1, Money::from_cents(2999));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["product_id"], "product-2");
        assert_eq!(json["unit_price"], 2999);
        let back: LineItem = serde_json::from_value(json).unwrap();
        assert_eq!(item, back);
    }
}

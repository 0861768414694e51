//! The order record.

use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId};
use serde::{Deserialize, Serialize};

use super::{LineItem, OrderError, OrderStatus};

/// A customer order.
///
/// Identity, customer, line items and total are fixed at construction;
/// only the status (and with it `updated_at`) changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    customer_id: CustomerId,
    items: Vec<LineItem>,
    total_amount: Money,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Validates the input and builds a `Pending` order with a fresh ID.
    ///
    /// Rejects a blank customer, an empty item list, blank product IDs,
    /// zero quantities, negative prices and totals that overflow.
    pub fn new(customer_id: CustomerId, items: Vec<LineItem>) -> Result<Self, OrderError> {
        if customer_id.is_blank() {
            return Err(OrderError::CustomerIdRequired);
        }
        if items.is_empty() {
            return Err(OrderError::NoItems);
        }

        let mut total_amount = Money::zero();
        for (index, item) in items.iter().enumerate() {
            if item.product_id.is_blank() {
                return Err(OrderError::ProductIdRequired { index });
            }
            if item.quantity == 0 {
                return Err(OrderError::InvalidQuantity {
                    product_id: item.product_id.clone(),
                    quantity: item.quantity,
                });
            }
            if item.unit_price.is_negative() {
                return Err(OrderError::InvalidPrice {
                    product_id: item.product_id.clone(),
                    price: item.unit_price,
                });
            }
            total_amount = item
                .total_price()
                .and_then(|line_total| total_amount.checked_add(line_total))
                .ok_or(OrderError::TotalOverflow)?;
        }

        let now = Utc::now();
        Ok(Self {
            id: OrderId::new(),
            customer_id,
            items,
            total_amount,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrites the status and refreshes `updated_at`.
    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Sum of quantity * unit price over all items, computed at creation.
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<LineItem> {
        vec![
            LineItem::new("product-1", 2, Money::from_cents(99999)),
            LineItem::new("product-2", 1, Money::from_cents(2999)),
        ]
    }

    #[test]
    fn test_new_order_is_pending_with_total() {
        let order = Order::new(CustomerId::new("customer-123"), items()).unwrap();

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.total_amount(), Money::from_cents(202997));
        assert_eq!(order.items().len(), 2);
        assert_eq!(order.items()[0].product_id.as_str(), "product-1");
        assert_eq!(order.created_at(), order.updated_at());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Order::new(CustomerId::new("c"), items()).unwrap();
        let b = Order::new(CustomerId::new("c"), items()).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_free_items_are_allowed() {
        let order = Order::new(
            CustomerId::new("c"),
            vec![LineItem::new("sample", 3, Money::zero())],
        )
        .unwrap();
        assert!(order.total_amount().is_zero());
    }

    #[test]
    fn test_rejects_blank_customer() {
        let err = Order::new(CustomerId::new(" "), items()).unwrap_err();
        assert_eq!(err, OrderError::CustomerIdRequired);
    }

    #[test]
    fn test_rejects_empty_items() {
        let err = Order::new(CustomerId::new("c"), vec![]).unwrap_err();
        assert_eq!(err, OrderError::NoItems);
    }

    #[test]
    fn test_rejects_zero_quantity() {
        let err = Order::new(
            CustomerId::new("c"),
            vec![LineItem::new("product-1", 0, Money::from_cents(100))],
        )
        .unwrap_err();
        assert!(matches!(err, OrderError::InvalidQuantity { quantity: 0, .. }));
    }

    #[test]
    fn test_rejects_negative_price() {
        let err = Order::new(
            CustomerId::new("c"),
            vec![LineItem::new("product-1", 1, Money::from_cents(-1))],
        )
        .unwrap_err();
        assert!(matches!(err, OrderError::InvalidPrice { .. }));
    }

    #[test]
    fn test_rejects_blank_product() {
        let err = Order::new(
            CustomerId::new("c"),
            vec![
                LineItem::new("product-1", 1, Money::from_cents(1)),
                LineItem::new("", 1, Money::from_cents(1)),
            ],
        )
        .unwrap_err();
        assert_eq!(err, OrderError::ProductIdRequired { index: 1 });
    }

    #[test]
    fn test_rejects_overflowing_total() {
        let err = Order::new(
            CustomerId::new("c"),
            vec![
                LineItem::new("a", 1, Money::from_cents(i64::MAX)),
                LineItem::new("b", 1, Money::from_cents(1)),
            ],
        )
        .unwrap_err();
        assert_eq!(err, OrderError::TotalOverflow);
    }

    #[test]
    fn test_set_status_refreshes_updated_at() {
        let mut order = Order::new(CustomerId::new("c"), items()).unwrap();
        let created = order.created_at();

        order.set_status(OrderStatus::Processing);

        assert_eq!(order.status(), OrderStatus::Processing);
        assert!(order.updated_at() >= created);
        assert_eq!(order.created_at(), created);
    }

    #[test]
    fn test_timestamps_serialize_as_rfc3339() {
        let order = Order::new(CustomerId::new("c"), items()).unwrap();
        let json = serde_json::to_value(&order).unwrap();
        let created = json["created_at"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(created).is_ok());
        assert_eq!(json["status"], "PENDING");
    }
}

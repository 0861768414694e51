//! Inventory service trait and in-memory stock ledger.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use common::{Money, OrderId, ProductId};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use crate::error::ServiceError;

const SERVICE: &str = "inventory";

/// A product and its available stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub stock_quantity: u32,
    pub price: Money,
}

impl Product {
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        stock_quantity: u32,
        price: Money,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            stock_quantity,
            price,
        }
    }
}

/// Result of a reserve call. `success == false` is a normal decline, not a fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationOutcome {
    pub success: bool,
    pub message: String,
    pub reserved_quantity: u32,
}

impl ReservationOutcome {
    pub fn reserved(quantity: u32) -> Self {
        Self {
            success: true,
            message: "Stock reserved successfully".to_string(),
            reserved_quantity: quantity,
        }
    }

    pub fn declined(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            reserved_quantity: 0,
        }
    }
}

/// Result of a release call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseOutcome {
    pub success: bool,
    pub message: String,
}

impl ReleaseOutcome {
    pub fn released() -> Self {
        Self {
            success: true,
            message: "Stock released successfully".to_string(),
        }
    }

    pub fn declined(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Trait for stock management operations.
///
/// Reservations are not tracked as records: the ledger only holds aggregate
/// quantities and trusts callers to release exactly what they reserved.
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Takes `quantity` units of a product out of available stock.
    ///
    /// Unknown products and insufficient stock are declined outcomes.
    async fn reserve_stock(
        &self,
        product_id: &ProductId,
        quantity: u32,
        order_id: OrderId,
    ) -> Result<ReservationOutcome, ServiceError>;

    /// Puts `quantity` units back into available stock.
    ///
    /// No check is made against earlier reservations.
    async fn release_stock(
        &self,
        product_id: &ProductId,
        quantity: u32,
        order_id: OrderId,
    ) -> Result<ReleaseOutcome, ServiceError>;

    /// Returns a snapshot of the product record.
    async fn get_product_stock(&self, product_id: &ProductId) -> Result<Product, ServiceError>;
}

#[derive(Debug, Default)]
struct FaultInjection {
    fail_on_reserve: AtomicBool,
    fail_on_release: AtomicBool,
}

/// In-memory stock ledger.
///
/// Each product sits behind its own mutex, so reserve/release on one product
/// is serialized while different products proceed in parallel. The outer
/// lock is only taken for writing when products are added.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventoryService {
    products: Arc<RwLock<HashMap<ProductId, Arc<Mutex<Product>>>>>,
    faults: Arc<FaultInjection>,
}

impl InMemoryInventoryService {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger holding the given products.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let products = products
            .into_iter()
            .map(|product| (product.id.clone(), Arc::new(Mutex::new(product))))
            .collect();
        Self {
            products: Arc::new(RwLock::new(products)),
            faults: Arc::default(),
        }
    }

    /// Creates a ledger stocked with the demo catalog.
    pub fn with_sample_catalog() -> Self {
        Self::with_products(sample_catalog())
    }

    /// Adds a product, replacing any existing record with the same ID.
    pub async fn add_product(&self, product: Product) {
        record_stock_level(&product);
        self.products
            .write()
            .await
            .insert(product.id.clone(), Arc::new(Mutex::new(product)));
    }

    /// Returns the available quantity of a product, if it exists.
    pub async fn stock_level(&self, product_id: &ProductId) -> Option<u32> {
        let entry = self.entry(product_id).await?;
        let product = entry.lock().await;
        Some(product.stock_quantity)
    }

    /// Makes every reserve call fail with an `Unavailable` error.
    pub fn set_fail_on_reserve(&self, fail: bool) {
        self.faults.fail_on_reserve.store(fail, Ordering::SeqCst);
    }

    /// Makes every release call fail with an `Unavailable` error.
    pub fn set_fail_on_release(&self, fail: bool) {
        self.faults.fail_on_release.store(fail, Ordering::SeqCst);
    }

    async fn entry(&self, product_id: &ProductId) -> Option<Arc<Mutex<Product>>> {
        self.products.read().await.get(product_id).cloned()
    }
}

/// The products the demo server starts with.
pub fn sample_catalog() -> Vec<Product> {
    vec![
        Product::new("product-1", "Laptop", 50, Money::from_cents(99999)),
        Product::new("product-2", "Mouse", 100, Money::from_cents(2999)),
        Product::new("product-3", "Keyboard", 75, Money::from_cents(7999)),
    ]
}

fn validate_quantity(quantity: u32) -> Result<(), ServiceError> {
    if quantity == 0 {
        return Err(ServiceError::InvalidArgument(
            "quantity must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

fn record_stock_level(product: &Product) {
    metrics::gauge!("current_stock", "product_id" => product.id.to_string())
        .set(f64::from(product.stock_quantity));
}

#[async_trait]
impl InventoryService for InMemoryInventoryService {
    #[tracing::instrument(skip(self))]
    async fn reserve_stock(
        &self,
        product_id: &ProductId,
        quantity: u32,
        order_id: OrderId,
    ) -> Result<ReservationOutcome, ServiceError> {
        if self.faults.fail_on_reserve.load(Ordering::SeqCst) {
            return Err(ServiceError::unavailable(SERVICE, "reserve rejected"));
        }
        validate_quantity(quantity)?;

        let Some(entry) = self.entry(product_id).await else {
            tracing::warn!(%order_id, %product_id, "product not found");
            metrics::counter!("inventory_reservations_total", "status" => "not_found").increment(1);
            return Ok(ReservationOutcome::declined(format!(
                "Product not found: {product_id}"
            )));
        };

        let mut product = entry.lock().await;
        if product.stock_quantity < quantity {
            tracing::warn!(
                %order_id,
                %product_id,
                available = product.stock_quantity,
                requested = quantity,
                "insufficient stock"
            );
            metrics::counter!("inventory_reservations_total", "status" => "insufficient")
                .increment(1);
            return Ok(ReservationOutcome::declined(format!(
                "Insufficient stock. Available: {}, Requested: {}",
                product.stock_quantity, quantity
            )));
        }

        product.stock_quantity -= quantity;
        record_stock_level(&product);
        metrics::counter!("inventory_reservations_total", "status" => "reserved").increment(1);
        tracing::info!(
            %order_id,
            %product_id,
            reserved_quantity = quantity,
            remaining_stock = product.stock_quantity,
            "stock reserved"
        );

        Ok(ReservationOutcome::reserved(quantity))
    }

    #[tracing::instrument(skip(self))]
    async fn release_stock(
        &self,
        product_id: &ProductId,
        quantity: u32,
        order_id: OrderId,
    ) -> Result<ReleaseOutcome, ServiceError> {
        if self.faults.fail_on_release.load(Ordering::SeqCst) {
            return Err(ServiceError::unavailable(SERVICE, "release rejected"));
        }
        validate_quantity(quantity)?;

        let Some(entry) = self.entry(product_id).await else {
            tracing::warn!(%order_id, %product_id, "product not found for stock release");
            return Ok(ReleaseOutcome::declined(format!(
                "Product not found: {product_id}"
            )));
        };

        let mut product = entry.lock().await;
        let Some(restored) = product.stock_quantity.checked_add(quantity) else {
            tracing::error!(
                %order_id,
                %product_id,
                current_stock = product.stock_quantity,
                quantity,
                "stock release would overflow"
            );
            return Ok(ReleaseOutcome::declined(format!(
                "Release of {quantity} would overflow stock for {product_id}"
            )));
        };

        product.stock_quantity = restored;
        record_stock_level(&product);
        tracing::info!(
            %order_id,
            %product_id,
            released_quantity = quantity,
            current_stock = product.stock_quantity,
            "stock released"
        );

        Ok(ReleaseOutcome::released())
    }

    #[tracing::instrument(skip(self))]
    async fn get_product_stock(&self, product_id: &ProductId) -> Result<Product, ServiceError> {
        let entry = self.entry(product_id).await.ok_or_else(|| {
            tracing::warn!(%product_id, "product not found");
            ServiceError::ProductNotFound(product_id.clone())
        })?;
        let product = entry.lock().await;
        Ok(product.clone())
    }
}

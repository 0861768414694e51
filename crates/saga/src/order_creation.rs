//! Order creation workflow constants.

/// Step name: reserve stock for each line item.
pub const STEP_RESERVE_STOCK: &str = "reserve_stock";

/// Step name: charge the order total.
pub const STEP_PROCESS_PAYMENT: &str = "process_payment";

/// Step name: store the created order.
pub const STEP_STORE_ORDER: &str = "store_order";

/// Currency sent with every charge unless configured otherwise.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Payment method sent with every charge unless configured otherwise.
pub const DEFAULT_PAYMENT_METHOD: &str = "credit_card";

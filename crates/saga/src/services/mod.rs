//! Collaborator traits and their in-memory implementations.

pub mod inventory;
pub mod payment;

pub use inventory::{
    InMemoryInventoryService, InventoryService, Product, ReleaseOutcome, ReservationOutcome,
    sample_catalog,
};
pub use payment::{
    InMemoryPaymentService, PaymentBehavior, PaymentOutcome, PaymentRequest, PaymentService,
    PaymentSimulation, PaymentStatus, SimulatedPaymentService,
};

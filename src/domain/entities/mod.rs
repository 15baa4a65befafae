pub mod audit_entry;
pub mod gateway_outcome;
pub mod payment;
pub mod payment_status;
pub mod plan;
pub mod settlement;
pub mod subscription;

pub mod orders;
pub mod payment;
pub mod settlement;
pub mod verification;
pub mod webhook;

//! Test utilities for unit and HTTP-level testing.
//!
//! This module provides:
//! - Test data factories for creating valid test fixtures
//! - An in-memory payment store standing in for Postgres
//! - A scripted gateway and signed webhook builders
//! - `CapturedLogs` for asserting on structured log fields
//! - `TestAppStateBuilder` for exercising routes without a database

mod factories;
mod gateway_mocks;
mod log_capture;
mod payment_mocks;
mod webhook_fixtures;

pub use app_state_builder::*;
pub use factories::*;
pub use gateway_mocks::*;
pub use log_capture::*;
pub use payment_mocks::*;
pub use webhook_fixtures::*;

//! Shared domain core for the services marketplace
//!
//! Booking records, the booking lifecycle state machine, commission and
//! revenue calculations, and booking aggregation. Nothing in this crate does
//! I/O; the backend feeds it fetched records and the WASM module exposes the
//! pure functions to browser dashboards.

pub mod aggregation;
pub mod error;
pub mod finance;
pub mod lifecycle;
pub mod models;
pub mod types;
pub mod validation;

pub use aggregation::*;
pub use error::*;
pub use finance::*;
pub use lifecycle::*;
pub use models::*;
pub use types::*;
pub use validation::*;

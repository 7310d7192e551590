//! HTTP handlers for the services marketplace API

pub mod booking;
pub mod business;
pub mod finance;
pub mod health;
pub mod payment;
pub mod review;

pub use booking::*;
pub use business::*;
pub use finance::*;
pub use health::*;
pub use payment::*;
pub use review::*;

//! Domain models for the services marketplace

mod booking;
mod business;
mod commission;
mod payment;
mod user;

pub use booking::*;
pub use business::*;
pub use commission::*;
pub use payment::*;
pub use user::*;

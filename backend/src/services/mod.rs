//! Business logic services for the services marketplace

pub mod booking;
pub mod business;
pub mod finance;
pub mod payment;
pub mod review;

#[cfg(test)]
pub(crate) mod fixtures;

pub use booking::BookingService;
pub use business::BusinessService;
pub use finance::FinanceService;
pub use payment::PaymentService;
pub use review::ReviewService;

use shared::CommissionDefaults;

use crate::error::AppResult;
use crate::gateway::MarketplaceGateway;

/// Built-in category rates, then the stored table, then configured overrides
pub(crate) async fn commission_table(
    gateway: &dyn MarketplaceGateway,
    overrides: &CommissionDefaults,
) -> AppResult<CommissionDefaults> {
    let stored = gateway.fetch_commission_defaults().await?;
    Ok(CommissionDefaults::builtin()
        .merge(stored)
        .merge(overrides.clone()))
}

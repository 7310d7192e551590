//! Business discovery and platform administration

use std::sync::Arc;

use rust_decimal::Decimal;
use shared::{validate_commission_rate, Business, BusinessStatus, Service};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::gateway::MarketplaceGateway;
use crate::middleware::AuthUser;

/// Business service backed by the persistence gateway
#[derive(Clone)]
pub struct BusinessService {
    gateway: Arc<dyn MarketplaceGateway>,
}

impl BusinessService {
    pub fn new(gateway: Arc<dyn MarketplaceGateway>) -> Self {
        Self { gateway }
    }

    /// Approved businesses, featured first, then by rating
    pub async fn list_approved(&self, category: Option<&str>) -> AppResult<Vec<Business>> {
        let mut businesses = self
            .gateway
            .fetch_businesses(Some(BusinessStatus::Approved))
            .await?;

        if let Some(category) = category.map(str::trim).filter(|c| !c.is_empty()) {
            businesses.retain(|b| b.category.eq_ignore_ascii_case(category));
        }
        businesses.sort_by(|a, b| {
            b.featured
                .cmp(&a.featured)
                .then_with(|| b.rating.cmp(&a.rating))
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(businesses)
    }

    /// Active services of a bookable business, cheapest first
    pub async fn list_services(&self, business_id: Uuid) -> AppResult<Vec<Service>> {
        let business = self
            .gateway
            .fetch_business(business_id)
            .await?
            .filter(Business::is_bookable)
            .ok_or_else(|| AppError::NotFound("Business".to_string()))?;

        let mut services: Vec<Service> = self
            .gateway
            .fetch_services(business.id)
            .await?
            .into_iter()
            .filter(|s| s.is_active)
            .collect();
        services.sort_by(|a, b| a.price.cmp(&b.price).then_with(|| a.name.cmp(&b.name)));

        Ok(services)
    }

    /// Approve or reject a business
    pub async fn update_status(
        &self,
        user: &AuthUser,
        business_id: Uuid,
        status: BusinessStatus,
    ) -> AppResult<Business> {
        user.require_admin()?;

        if !self.gateway.update_business_status(business_id, status).await? {
            return Err(AppError::NotFound("Business".to_string()));
        }
        tracing::info!(
            business_id = %business_id,
            status = status.as_str(),
            admin = %user.user_id,
            "Business status updated"
        );

        self.fetch(business_id).await
    }

    /// Set or clear a business's explicit commission rate
    pub async fn update_commission_rate(
        &self,
        user: &AuthUser,
        business_id: Uuid,
        rate: Option<Decimal>,
    ) -> AppResult<Business> {
        user.require_admin()?;
        if let Some(rate) = rate {
            validate_commission_rate(rate)
                .map_err(|msg| AppError::validation("commission_rate", msg))?;
        }

        if !self
            .gateway
            .update_business_commission_rate(business_id, rate)
            .await?
        {
            return Err(AppError::NotFound("Business".to_string()));
        }
        tracing::info!(
            business_id = %business_id,
            rate = ?rate,
            admin = %user.user_id,
            "Business commission rate updated"
        );

        self.fetch(business_id).await
    }

    async fn fetch(&self, business_id: Uuid) -> AppResult<Business> {
        self.gateway
            .fetch_business(business_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Business".to_string()))
    }
}

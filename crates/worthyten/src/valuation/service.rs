use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::{
    LegacyCalculateRequest, LegacyCalculateResponse, ValuationQuote, ValuationRequest,
};
use crate::catalog::{CatalogError, Product, ProductCatalog, ProductId};
use crate::pricing::{
    price_breakdown, resolve_rules, PricingRulesStore, ResolvedRules, RulesStoreError,
};

/// Service composing the product catalog, rules resolution and the calculator.
pub struct ValuationService<C, S> {
    catalog: Arc<C>,
    rules: Arc<S>,
}

impl<C, S> ValuationService<C, S>
where
    C: ProductCatalog + 'static,
    S: PricingRulesStore + 'static,
{
    pub fn new(catalog: Arc<C>, rules: Arc<S>) -> Self {
        Self { catalog, rules }
    }

    /// Price a full assessment against the product's resolved rules.
    pub fn quote(&self, request: ValuationRequest) -> Result<ValuationQuote, ValuationServiceError> {
        let product = self.product(&request.product_id)?;
        let resolved = resolve_rules(self.rules.as_ref(), &product.id)?;

        let valuation = price_breakdown(
            product.base_price,
            &request.answers,
            &resolved.rules,
            &product.brand,
        );

        info!(
            product_id = %product.id,
            rules_source = resolved.source.label(),
            base_price = valuation.base_price,
            final_price = valuation.final_price,
            "valuation quoted"
        );

        Ok(ValuationQuote {
            product,
            rules_source: resolved.source,
            valuation,
            quoted_at: Utc::now(),
        })
    }

    /// Price the legacy `condition`/`usage`/`accessories` form.
    pub fn legacy_calculate(
        &self,
        request: LegacyCalculateRequest,
    ) -> Result<LegacyCalculateResponse, ValuationServiceError> {
        request
            .validate()
            .map_err(ValuationServiceError::Validation)?;

        let quote = self.quote(ValuationRequest {
            product_id: request.product_id.clone(),
            answers: request.to_answers(),
        })?;

        Ok(LegacyCalculateResponse {
            product_id: request.product_id,
            base_price: quote.valuation.base_price,
            estimated_value: quote.valuation.final_price,
            condition: request.condition,
            usage: request.usage,
            accessories: request.accessories,
        })
    }

    /// Rules that would price the product right now.
    pub fn rules_for(&self, product_id: &str) -> Result<ResolvedRules, ValuationServiceError> {
        let product = self.product(product_id)?;
        Ok(resolve_rules(self.rules.as_ref(), &product.id)?)
    }

    fn product(&self, raw_id: &str) -> Result<Product, ValuationServiceError> {
        let trimmed = raw_id.trim();
        if trimmed.is_empty() {
            return Err(ValuationServiceError::Validation(
                "productId is required".to_string(),
            ));
        }

        let id = ProductId(trimmed.to_string());
        self.catalog
            .fetch(&id)?
            .ok_or(ValuationServiceError::ProductNotFound(id))
    }
}

/// Error raised by the valuation service.
#[derive(Debug, thiserror::Error)]
pub enum ValuationServiceError {
    #[error("product {0} not found")]
    ProductNotFound(ProductId),
    #[error("invalid request: {0}")]
    Validation(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Rules(#[from] RulesStoreError),
}

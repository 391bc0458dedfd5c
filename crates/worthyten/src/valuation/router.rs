use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tracing::error;

use super::domain::{LegacyCalculateRequest, ValuationRequest};
use super::service::{ValuationService, ValuationServiceError};
use crate::catalog::ProductCatalog;
use crate::pricing::PricingRulesStore;

/// Router builder exposing the valuation endpoints.
pub fn valuation_router<C, S>(service: Arc<ValuationService<C, S>>) -> Router
where
    C: ProductCatalog + 'static,
    S: PricingRulesStore + 'static,
{
    Router::new()
        .route("/api/calculate", post(legacy_calculate_handler::<C, S>))
        .route("/api/v1/valuations", post(quote_handler::<C, S>))
        .route(
            "/api/v1/products/:product_id/pricing-rules",
            get(rules_handler::<C, S>),
        )
        .with_state(service)
}

pub(crate) async fn legacy_calculate_handler<C, S>(
    State(service): State<Arc<ValuationService<C, S>>>,
    axum::Json(request): axum::Json<LegacyCalculateRequest>,
) -> Response
where
    C: ProductCatalog + 'static,
    S: PricingRulesStore + 'static,
{
    match service.legacy_calculate(request) {
        Ok(response) => (StatusCode::OK, axum::Json(response)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn quote_handler<C, S>(
    State(service): State<Arc<ValuationService<C, S>>>,
    axum::Json(request): axum::Json<ValuationRequest>,
) -> Response
where
    C: ProductCatalog + 'static,
    S: PricingRulesStore + 'static,
{
    match service.quote(request) {
        Ok(quote) => (StatusCode::OK, axum::Json(quote)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn rules_handler<C, S>(
    State(service): State<Arc<ValuationService<C, S>>>,
    Path(product_id): Path<String>,
) -> Response
where
    C: ProductCatalog + 'static,
    S: PricingRulesStore + 'static,
{
    match service.rules_for(&product_id) {
        Ok(resolved) => (StatusCode::OK, axum::Json(resolved)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: ValuationServiceError) -> Response {
    let status = match &err {
        ValuationServiceError::ProductNotFound(_) => StatusCode::NOT_FOUND,
        ValuationServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ValuationServiceError::Catalog(_) | ValuationServiceError::Rules(_) => {
            error!(error = %err, "valuation backend failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": err.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

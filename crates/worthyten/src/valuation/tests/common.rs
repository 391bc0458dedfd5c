use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::catalog::{CatalogError, DeviceCategory, InMemoryCatalog, Product, ProductCatalog, ProductId};
use crate::pricing::{InMemoryRulesStore, PricingRules, PricingRulesStore, Question, RulesStoreError};
use crate::valuation::{valuation_router, LegacyCalculateRequest, ValuationRequest, ValuationService};

pub(super) const CAMERA_ID: &str = "eos-r6";
pub(super) const PHONE_ID: &str = "galaxy-s22";

pub(super) fn camera() -> Product {
    Product {
        id: ProductId(CAMERA_ID.to_string()),
        name: "EOS R6".to_string(),
        brand: "Canon".to_string(),
        category: DeviceCategory::Camera,
        base_price: 50_000,
        display_price: Some(58_000),
    }
}

pub(super) fn phone() -> Product {
    Product {
        id: ProductId(PHONE_ID.to_string()),
        name: "Galaxy S22".to_string(),
        brand: "Samsung".to_string(),
        category: DeviceCategory::Phone,
        base_price: 30_000,
        display_price: None,
    }
}

pub(super) fn camera_rules() -> PricingRules {
    PricingRules::new()
        .with_adjustment(Question::BodyCondition, "good", -2000)
        .with_adjustment(Question::BodyCondition, "poor", -9000)
        .with_adjustment(Question::Age, "fourToTwelveMonths", -1500)
        .with_adjustment(Question::Accessories, "box", 500)
        .with_adjustment(Question::Accessories, "charger", 300)
        .with_adjustment(Question::LensCondition, "fungus", -800)
}

pub(super) fn global_rules() -> PricingRules {
    PricingRules::new()
        .with_adjustment(Question::PowerOn, "no", -10_000)
        .with_adjustment(Question::SPenWorking, "no", -1_200)
}

pub(super) type MemoryService = ValuationService<InMemoryCatalog, InMemoryRulesStore>;

pub(super) fn build_service() -> MemoryService {
    let catalog = InMemoryCatalog::with_products([camera(), phone()]);
    let rules = InMemoryRulesStore::new()
        .with_global(global_rules())
        .with_product(ProductId(CAMERA_ID.to_string()), camera_rules());
    ValuationService::new(Arc::new(catalog), Arc::new(rules))
}

pub(super) fn scenario_request() -> ValuationRequest {
    ValuationRequest {
        product_id: CAMERA_ID.to_string(),
        answers: crate::pricing::AnswerMap::new()
            .with("bodyCondition", "good")
            .with("age", "fourToTwelveMonths")
            .with("accessories", vec!["box", "charger"]),
    }
}

pub(super) fn legacy_request() -> LegacyCalculateRequest {
    LegacyCalculateRequest {
        product_id: CAMERA_ID.to_string(),
        condition: Some("good".to_string()),
        usage: Some("fourToTwelveMonths".to_string()),
        accessories: vec!["box".to_string(), "charger".to_string()],
    }
}

pub(super) struct UnavailableCatalog;

impl ProductCatalog for UnavailableCatalog {
    fn fetch(&self, _id: &ProductId) -> Result<Option<Product>, CatalogError> {
        Err(CatalogError::Unavailable("catalog offline".to_string()))
    }
}

pub(super) struct UnavailableRules;

impl PricingRulesStore for UnavailableRules {
    fn product_rules(&self, _id: &ProductId) -> Result<Option<PricingRules>, RulesStoreError> {
        Err(RulesStoreError::Unavailable("rules offline".to_string()))
    }

    fn global_rules(&self) -> Result<Option<PricingRules>, RulesStoreError> {
        Err(RulesStoreError::Unavailable("rules offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    valuation_router(Arc::new(service))
}

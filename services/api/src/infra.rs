use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use worthyten::catalog::{
    CatalogImporter, DeviceCategory, InMemoryCatalog, Product, ProductId,
};
use worthyten::config::PricingConfig;
use worthyten::error::AppError;
use worthyten::pricing::{
    CachedRulesStore, InMemoryRulesStore, JsonDirectoryRulesStore, PricingRules,
    PricingRulesStore, Question, RulesStoreError,
};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Rules backend chosen from configuration.
pub(crate) enum ConfiguredRulesStore {
    Directory(CachedRulesStore<JsonDirectoryRulesStore>),
    Sample(InMemoryRulesStore),
}

impl PricingRulesStore for ConfiguredRulesStore {
    fn product_rules(
        &self,
        product_id: &ProductId,
    ) -> Result<Option<PricingRules>, RulesStoreError> {
        match self {
            ConfiguredRulesStore::Directory(store) => store.product_rules(product_id),
            ConfiguredRulesStore::Sample(store) => store.product_rules(product_id),
        }
    }

    fn global_rules(&self) -> Result<Option<PricingRules>, RulesStoreError> {
        match self {
            ConfiguredRulesStore::Directory(store) => store.global_rules(),
            ConfiguredRulesStore::Sample(store) => store.global_rules(),
        }
    }
}

pub(crate) fn rules_store(config: &PricingConfig) -> ConfiguredRulesStore {
    match &config.rules_dir {
        Some(dir) => {
            info!(rules_dir = %dir.display(), ttl_secs = config.rules_cache_ttl.as_secs(), "loading pricing rules from directory");
            ConfiguredRulesStore::Directory(CachedRulesStore::new(
                JsonDirectoryRulesStore::new(dir),
                config.rules_cache_ttl,
            ))
        }
        None => {
            info!("PRICING_RULES_DIR unset; using built-in sample pricing rules");
            ConfiguredRulesStore::Sample(sample_rules_store())
        }
    }
}

pub(crate) fn catalog(config: &PricingConfig) -> Result<InMemoryCatalog, AppError> {
    match &config.catalog_csv {
        Some(path) => {
            let catalog = CatalogImporter::from_path(path)?;
            info!(catalog_csv = %path.display(), products = catalog.len(), "imported product catalog");
            Ok(catalog)
        }
        None => Ok(sample_catalog()),
    }
}

pub(crate) fn sample_catalog() -> InMemoryCatalog {
    InMemoryCatalog::with_products([
        product("canon-eos-r6", "EOS R6", "Canon", DeviceCategory::Camera, 50_000, Some(58_000)),
        product("sony-a7-iii", "Alpha 7 III", "Sony", DeviceCategory::Camera, 62_000, Some(69_990)),
        product("iphone-13", "iPhone 13", "Apple", DeviceCategory::Phone, 32_000, Some(35_000)),
        product("galaxy-s22-ultra", "Galaxy S22 Ultra", "Samsung", DeviceCategory::Phone, 38_000, None),
        product("macbook-air-m1", "MacBook Air M1", "Apple", DeviceCategory::Laptop, 41_000, Some(44_500)),
        product("ipad-air-5", "iPad Air (5th gen)", "Apple", DeviceCategory::Tablet, 27_000, None),
    ])
}

fn product(
    id: &str,
    name: &str,
    brand: &str,
    category: DeviceCategory,
    base_price: i64,
    display_price: Option<i64>,
) -> Product {
    Product {
        id: ProductId(id.to_string()),
        name: name.to_string(),
        brand: brand.to_string(),
        category,
        base_price,
        display_price,
    }
}

pub(crate) fn sample_rules_store() -> InMemoryRulesStore {
    let global = PricingRules::new()
        .with_adjustment(Question::PowerOn, "no", -15_000)
        .with_adjustment(Question::WaterDamage, "yes", -5_000)
        .with_adjustment(Question::ScreenTouchWorking, "no", -6_000)
        .with_adjustment(Question::ChargingPortWorking, "no", -1_500)
        .with_adjustment(Question::FaceIdWorking, "no", -4_000)
        .with_adjustment(Question::KeyboardWorking, "no", -4_000)
        .with_adjustment(Question::SPenWorking, "no", -1_200)
        .with_adjustment(Question::SamsungAccountRemoved, "no", -3_000)
        .with_adjustment(Question::HasOriginalBill, "yes", 700)
        .with_adjustment(Question::BatteryHealth, "below70", -2_500)
        .with_adjustment(Question::BodyCondition, "excellent", 0)
        .with_adjustment(Question::BodyCondition, "good", -2_000)
        .with_adjustment(Question::BodyCondition, "fair", -4_500)
        .with_adjustment(Question::BodyCondition, "poor", -9_000)
        .with_adjustment(Question::Age, "lessThanThreeMonths", 0)
        .with_adjustment(Question::Age, "fourToTwelveMonths", -1_500)
        .with_adjustment(Question::Age, "oneToTwoYears", -3_500)
        .with_adjustment(Question::Age, "aboveTwoYears", -6_000)
        .with_adjustment(Question::Accessories, "box", 500)
        .with_adjustment(Question::Accessories, "charger", 300)
        .with_adjustment(Question::FunctionalIssues, "noIssues", 1_000)
        .with_adjustment(Question::FunctionalIssues, "speakerIssue", -1_800)
        .with_adjustment(Question::FunctionalIssues, "cameraIssue", -3_000);

    let camera = global
        .clone()
        .with_adjustment(Question::LensCondition, "good", 500)
        .with_adjustment(Question::LensCondition, "fungus", -800)
        .with_adjustment(Question::FungusDustCondition, "heavyFungus", -4_000)
        .with_adjustment(Question::ShutterCount, "above100k", -7_000)
        .with_adjustment(Question::Accessories, "battery", 1_200)
        .with_adjustment(Question::Accessories, "lensCap", 200);

    InMemoryRulesStore::new()
        .with_global(global)
        .with_product(ProductId("canon-eos-r6".to_string()), camera.clone())
        .with_product(ProductId("sony-a7-iii".to_string()), camera)
}

pub(crate) fn read_answers(path: &std::path::Path) -> Result<worthyten::pricing::AnswerMap, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

use crate::infra::{self, read_answers, sample_catalog, sample_rules_store};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use worthyten::catalog::ProductCatalog;
use worthyten::config::AppConfig;
use worthyten::error::AppError;
use worthyten::pricing::{AnswerMap, PricingRulesStore};
use worthyten::valuation::{
    LegacyCalculateRequest, ValuationQuote, ValuationRequest, ValuationService,
};

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// Catalog product to price
    #[arg(long)]
    pub(crate) product_id: String,
    /// JSON object mapping question keys to answers. Omit to price the bare product.
    #[arg(long)]
    pub(crate) answers: Option<PathBuf>,
    /// Catalog CSV to price against instead of CATALOG_CSV
    #[arg(long)]
    pub(crate) catalog_csv: Option<PathBuf>,
    /// Pricing rules directory to use instead of PRICING_RULES_DIR
    #[arg(long)]
    pub(crate) rules_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Product used for the walkthrough. Defaults to the sample camera.
    #[arg(long)]
    pub(crate) product_id: Option<String>,
}

pub(crate) fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let QuoteArgs {
        product_id,
        answers,
        catalog_csv,
        rules_dir,
    } = args;

    let mut config = AppConfig::load()?;
    if catalog_csv.is_some() {
        config.pricing.catalog_csv = catalog_csv;
    }
    if rules_dir.is_some() {
        config.pricing.rules_dir = rules_dir;
    }

    let answers = match answers {
        Some(path) => read_answers(&path)?,
        None => AnswerMap::new(),
    };

    let service = ValuationService::new(
        Arc::new(infra::catalog(&config.pricing)?),
        Arc::new(infra::rules_store(&config.pricing)),
    );
    let quote = service.quote(ValuationRequest {
        product_id,
        answers,
    })?;

    let rendered = serde_json::to_string_pretty(&quote)?;
    println!("{rendered}");
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let product_id = args
        .product_id
        .unwrap_or_else(|| "canon-eos-r6".to_string());
    let service = ValuationService::new(Arc::new(sample_catalog()), Arc::new(sample_rules_store()));

    println!("=== WorthyTen Valuation Demo ===");
    println!();

    println!("-- Legacy calculator form --");
    let legacy = service.legacy_calculate(LegacyCalculateRequest {
        product_id: product_id.clone(),
        condition: Some("good".to_string()),
        usage: Some("fourToTwelveMonths".to_string()),
        accessories: vec!["box".to_string(), "charger".to_string()],
    })?;
    println!(
        "{}: base ₹{} -> estimated ₹{} (condition good, 4-12 months, box + charger)",
        legacy.product_id, legacy.base_price, legacy.estimated_value
    );
    println!();

    println!("-- Full assessment, device with issues --");
    let worn = AnswerMap::new()
        .with("powerOn", "yes")
        .with("bodyCondition", vec!["fair", "scratches"])
        .with("age", "aboveTwoYears")
        .with("functionalIssues", vec!["speakerIssue", "cameraIssue"])
        .with("accessories", vec!["charger"]);
    print_scenario(&service, &product_id, worn)?;

    println!("-- Full assessment, clean device --");
    let clean = AnswerMap::new()
        .with("powerOn", "yes")
        .with("bodyCondition", vec!["excellent"])
        .with("age", "lessThanThreeMonths")
        .with("functionalIssues", vec!["noIssues", "speakerIssue"])
        .with("accessories", vec!["box", "charger"])
        .with("hasOriginalBill", "yes");
    print_scenario(&service, &product_id, clean)?;

    println!("-- Dead device --");
    let dead = AnswerMap::new()
        .with("powerOn", "no")
        .with("waterDamage", "yes")
        .with("bodyCondition", vec!["poor"])
        .with("age", "aboveTwoYears")
        .with("functionalIssues", vec!["speakerIssue", "cameraIssue"]);
    print_scenario(&service, "ipad-air-5", dead)?;

    Ok(())
}

fn print_scenario<C, S>(
    service: &ValuationService<C, S>,
    product_id: &str,
    answers: AnswerMap,
) -> Result<(), AppError>
where
    C: ProductCatalog + 'static,
    S: PricingRulesStore + 'static,
{
    let quote = service.quote(ValuationRequest {
        product_id: product_id.to_string(),
        answers,
    })?;
    render_quote(&quote);
    println!();
    Ok(())
}

fn render_quote(quote: &ValuationQuote) {
    let product = &quote.product;
    let valuation = &quote.valuation;

    println!(
        "{} {} ({}) using {} rules",
        product.brand,
        product.name,
        product.category.label(),
        quote.rules_source.label()
    );
    println!(
        "Base ₹{} | Adjustments {:+} | Offer ₹{}",
        valuation.base_price, valuation.total_adjustment, valuation.final_price
    );

    for adjustment in &valuation.adjustments {
        println!(
            "  {:<22} {:<20} {:+}",
            adjustment.question.key(),
            adjustment.option,
            adjustment.delta
        );
    }
    for ignored in &valuation.ignored {
        println!("  {:<22} ignored: {:?}", ignored.question, ignored.reason);
    }
}

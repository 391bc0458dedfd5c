use super::rules::PricingRules;
use crate::catalog::ProductId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::debug;

/// Where configured pricing rules come from.
pub trait PricingRulesStore: Send + Sync {
    fn product_rules(&self, product_id: &ProductId)
        -> Result<Option<PricingRules>, RulesStoreError>;
    fn global_rules(&self) -> Result<Option<PricingRules>, RulesStoreError>;
}

/// Error enumeration for rules store failures.
#[derive(Debug, thiserror::Error)]
pub enum RulesStoreError {
    #[error("failed to read pricing rules at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid pricing rules document at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("pricing rules store unavailable: {0}")]
    Unavailable(String),
}

/// Which layer of the lookup chain supplied the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RulesSource {
    Product,
    Global,
    Zero,
}

impl RulesSource {
    pub const fn label(self) -> &'static str {
        match self {
            RulesSource::Product => "product",
            RulesSource::Global => "global",
            RulesSource::Zero => "zero",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRules {
    pub source: RulesSource,
    pub rules: PricingRules,
}

/// Product override, then global default, then the all-zero table.
pub fn resolve_rules<S>(store: &S, product_id: &ProductId) -> Result<ResolvedRules, RulesStoreError>
where
    S: PricingRulesStore + ?Sized,
{
    let resolved = if let Some(rules) = store.product_rules(product_id)? {
        ResolvedRules {
            source: RulesSource::Product,
            rules,
        }
    } else if let Some(rules) = store.global_rules()? {
        ResolvedRules {
            source: RulesSource::Global,
            rules,
        }
    } else {
        ResolvedRules {
            source: RulesSource::Zero,
            rules: PricingRules::zero(),
        }
    };

    debug!(product_id = %product_id.0, source = resolved.source.label(), "resolved pricing rules");
    Ok(resolved)
}

/// Process-local store used by the demo, the default server wiring and tests.
#[derive(Debug, Default)]
pub struct InMemoryRulesStore {
    global: RwLock<Option<PricingRules>>,
    products: RwLock<HashMap<ProductId, PricingRules>>,
}

impl InMemoryRulesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_global(self, rules: PricingRules) -> Self {
        self.set_global(rules);
        self
    }

    pub fn with_product(self, product_id: ProductId, rules: PricingRules) -> Self {
        self.set_product(product_id, rules);
        self
    }

    pub fn set_global(&self, rules: PricingRules) {
        *self.global.write().expect("rules lock poisoned") = Some(rules);
    }

    pub fn set_product(&self, product_id: ProductId, rules: PricingRules) {
        self.products
            .write()
            .expect("rules lock poisoned")
            .insert(product_id, rules);
    }
}

impl PricingRulesStore for InMemoryRulesStore {
    fn product_rules(
        &self,
        product_id: &ProductId,
    ) -> Result<Option<PricingRules>, RulesStoreError> {
        let guard = self.products.read().expect("rules lock poisoned");
        Ok(guard.get(product_id).cloned())
    }

    fn global_rules(&self) -> Result<Option<PricingRules>, RulesStoreError> {
        Ok(self.global.read().expect("rules lock poisoned").clone())
    }
}

//! Trade-in pricing: the question catalogue, adjustment tables, the price
//! calculator and resolution of which rules table applies to a product.
//!
//! The calculator is a pure function over already-resolved rules. Gaps in the
//! configuration (unknown questions, options without a rule) price at zero and
//! are reported in the breakdown instead of failing the valuation.

mod answers;
mod calculator;
mod question;
mod resolution;
mod rules;
mod store;

pub use answers::{Answer, AnswerMap};
pub use calculator::{
    calculate_price, price_breakdown, Adjustment, IgnoredAnswer, IgnoredReason, Valuation,
    ValuationEngine,
};
pub use question::{Question, QuestionKind, NO_ISSUES};
pub use resolution::{
    resolve_rules, InMemoryRulesStore, PricingRulesStore, ResolvedRules, RulesSource,
    RulesStoreError,
};
pub use rules::{AdjustmentTable, PricingRules};
pub use store::{CachedRulesStore, JsonDirectoryRulesStore};

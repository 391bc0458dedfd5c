//! Customer-facing valuation: product lookup, rules resolution and pricing
//! composed behind a service facade and its HTTP router.

pub mod domain;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    LegacyCalculateRequest, LegacyCalculateResponse, ValuationQuote, ValuationRequest,
    LEGACY_CONDITIONS,
};
pub use router::valuation_router;
pub use service::{ValuationService, ValuationServiceError};

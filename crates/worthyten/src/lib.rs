//! Trade-in valuation for cameras, phones, laptops and tablets.
//!
//! [`pricing`] holds the pure calculator and rules resolution, [`catalog`] the
//! products and their internal base prices, and [`valuation`] composes both
//! behind a service and HTTP router.

pub mod catalog;
pub mod config;
pub mod error;
pub mod pricing;
pub mod telemetry;
pub mod valuation;

//! # Pricing Engine
//!
//! Turns a transformer catalog row plus the options chosen on a quote into a unit
//! sale price that still yields the target margin once every tax is deducted.
//!
//! Two product lines are priced with different formula shapes:
//!
//! - **MT** (medium voltage): the catalog price is grossed up by the aggregated
//!   tax/markup fraction, enclosure, K-factor and accessory additions are stacked on
//!   a running total, and the result goes through a truncating tax back-out.
//! - **BT** (low voltage): the item is priced at the catalog tier covering its
//!   K-factor-derated power, plus additive option costs. No tax back-out applies.
//!
//! Every call is a pure function of its inputs and an immutable [`Catalog`] snapshot.

pub mod accessories;
pub mod calculator;
pub mod catalog;
pub mod config;
pub mod derating;
pub mod enclosure;
pub mod engine;
pub mod error;
pub mod tax;
pub mod types;



pub use calculator::PriceCalculator;
pub use catalog::{Catalog, CatalogEntry};
pub use config::EngineConfig;
pub use engine::QuoteEngine;
pub use error::{PricingError, Result};
pub use tax::TaxAggregator;
pub use types::*;

/// Current version of the pricing engine
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

use crate::calculator::PriceCalculator;
use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::types::{ItemConfiguration, PricedItem, PricedQuote, TaxInputs};
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

/// Prices whole quotes against one catalog snapshot
#[derive(Debug, Clone)]
pub struct QuoteEngine {
    calculator: PriceCalculator,
    catalog: Arc<Catalog>,
}

impl QuoteEngine {
    pub fn new(config: EngineConfig, catalog: Arc<Catalog>) -> Self {
        info!("Creating quote engine over {} catalog rows", catalog.len());
        Self { calculator: PriceCalculator::new(config), catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn calculator(&self) -> &PriceCalculator {
        &self.calculator
    }

    /// Price a single item
    pub fn price_item(&self, tax: &TaxInputs, item: &ItemConfiguration) -> Result<PricedItem> {
        self.calculator.price_item(&self.catalog, tax, item)
    }

    /// Price every item of a quote, keeping request order.
    ///
    /// The first failing item fails the whole quote.
    pub fn price_quote(&self, tax: &TaxInputs, items: &[ItemConfiguration]) -> Result<PricedQuote> {
        tax.validate()?;

        let threshold = self.calculator.config().pricing.parallel_threshold;
        let priced: Vec<PricedItem> = if items.len() > threshold {
            items.par_iter().map(|item| self.price_item(tax, item)).collect::<Result<_>>()?
        } else {
            items.iter().map(|item| self.price_item(tax, item)).collect::<Result<_>>()?
        };

        let grand_total: Decimal = priced.iter().map(|item| item.total_price).sum();

        info!(
            "Priced quote: {} items, grand total {} ({})",
            priced.len(),
            grand_total,
            if items.len() > threshold { "parallel" } else { "sequential" }
        );

        Ok(PricedQuote { items: priced, grand_total })
    }
}

//! Catalog and quote request files

use anyhow::{Context, Result};
use pricing_engine::{Catalog, CatalogEntry, ItemConfiguration, TaxInputs};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// A quote request as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub tax: TaxInputs,
    pub items: Vec<ItemConfiguration>,
}

/// Load a catalog snapshot from a JSON array of rows
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    let entries: Vec<CatalogEntry> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse catalog {}", path.display()))?;
    let catalog = Catalog::new(entries).context("Catalog rejected")?;
    info!("Loaded {} catalog rows from {}", catalog.len(), path.display());
    Ok(catalog)
}

/// Load a quote request
pub fn load_quote(path: &Path) -> Result<QuoteRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read quote {}", path.display()))?;
    let request: QuoteRequest = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse quote {}", path.display()))?;
    info!("Loaded quote with {} items from {}", request.items.len(), path.display());
    Ok(request)
}

//! Catalog snapshot and row lookup
//!
//! The catalog is built once from rows supplied by the caller and never mutated
//! afterwards, so a single snapshot can be shared across pricing threads.

use crate::error::{PricingError, Result};
use crate::types::{CatalogRef, ProductLine};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// A read-only catalog row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub description: String,
    pub product_line: ProductLine,

    /// BT selection key, e.g. "TRAFO SECO"
    #[serde(default)]
    pub product: Option<String>,

    /// BT selection key, e.g. "COBRE" or "ALUMINIO"
    #[serde(default)]
    pub material: Option<String>,

    /// Nameplate power in kVA
    pub nominal_power: Decimal,

    #[serde(default)]
    pub losses_code: Option<String>,

    /// "15kV", "24kV" or "36kV" for MT; free-form for BT
    #[serde(default)]
    pub voltage_class: String,

    pub base_price: Decimal,

    /// Fraction of the price attributable to the core transformer (p_trafo)
    #[serde(default)]
    pub transformer_fraction: Decimal,

    /// Fraction of the price attributable to the box (p_caixa)
    #[serde(default)]
    pub box_fraction: Decimal,

    /// Additional enclosure cost for IP21/IP23
    #[serde(default)]
    pub ip_low_value: Decimal,

    /// Additional enclosure cost for IP54
    #[serde(default)]
    pub ip_high_value: Decimal,

    /// Flat BT box price for this tier
    #[serde(default)]
    pub box_cost: Decimal,

    #[serde(default)]
    pub projection_code_cost: Option<String>,

    #[serde(default)]
    pub projection_code_box: Option<String>,
}

/// Immutable catalog snapshot with precomputed indexes
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,

    /// Map from id to entry index
    by_id: HashMap<String, usize>,

    /// Map from description to entry index (first row wins)
    by_description: HashMap<String, usize>,

    /// BT entry indexes per product, then material, ascending by power
    tiers: HashMap<String, HashMap<String, Vec<usize>>>,
}

impl Catalog {
    /// Build a snapshot from catalog rows
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(entries.len());
        let mut by_description = HashMap::with_capacity(entries.len());
        let mut tiers: HashMap<String, HashMap<String, Vec<usize>>> = HashMap::new();

        for (idx, entry) in entries.iter().enumerate() {
            if entry.base_price.is_sign_negative() && !entry.base_price.is_zero() {
                return Err(PricingError::validation(format!(
                    "catalog row '{}' has a negative base price",
                    entry.id
                )));
            }

            if by_id.insert(entry.id.clone(), idx).is_some() {
                return Err(PricingError::validation(format!(
                    "duplicate catalog id '{}'",
                    entry.id
                )));
            }

            let description = entry.description.trim().to_string();
            if by_description.contains_key(&description) {
                warn!("Duplicate catalog description '{}', keeping first row", description);
            } else {
                by_description.insert(description, idx);
            }

            if entry.product_line == ProductLine::Bt {
                let (Some(product), Some(material)) = (&entry.product, &entry.material) else {
                    return Err(PricingError::validation(format!(
                        "BT catalog row '{}' needs product and material",
                        entry.id
                    )));
                };
                tiers
                    .entry(product.clone())
                    .or_default()
                    .entry(material.clone())
                    .or_default()
                    .push(idx);
            }
        }

        for indexes in tiers.values_mut().flat_map(|materials| materials.values_mut()) {
            indexes.sort_by(|a, b| entries[*a].nominal_power.cmp(&entries[*b].nominal_power));
        }
        let group_count: usize = tiers.values().map(HashMap::len).sum();

        info!(
            "Loaded catalog snapshot: {} rows, {} BT tier groups",
            entries.len(),
            group_count
        );

        Ok(Self { entries, by_id, by_description, tiers })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get_by_id(&self, id: &str) -> Result<&CatalogEntry> {
        self.by_id
            .get(id)
            .map(|idx| &self.entries[*idx])
            .ok_or_else(|| PricingError::not_found(format!("id '{id}'")))
    }

    pub fn get_by_description(&self, description: &str) -> Result<&CatalogEntry> {
        self.by_description
            .get(description.trim())
            .map(|idx| &self.entries[*idx])
            .ok_or_else(|| PricingError::not_found(format!("description '{description}'")))
    }

    /// BT rows of (product, material) in ascending power order
    pub fn tier_entries(&self, product: &str, material: &str) -> Result<Vec<&CatalogEntry>> {
        let indexes = self
            .tiers
            .get(product)
            .and_then(|materials| materials.get(material))
            .filter(|indexes| !indexes.is_empty())
            .ok_or_else(|| PricingError::not_found(format!("{product}/{material}")))?;
        Ok(indexes.iter().map(|idx| &self.entries[*idx]).collect())
    }

    /// Manufactured power tiers of (product, material), ascending
    pub fn power_tiers(&self, product: &str, material: &str) -> Result<Vec<Decimal>> {
        Ok(self.tier_entries(product, material)?.iter().map(|e| e.nominal_power).collect())
    }

    /// First row of (product, material) whose power covers `power`, else the largest row
    pub fn select_tier(&self, product: &str, material: &str, power: Decimal) -> Result<&CatalogEntry> {
        let candidates = self.tier_entries(product, material)?;
        match candidates.iter().copied().find(|e| e.nominal_power >= power) {
            Some(entry) => {
                debug!("Selected {} for {}/{} at {} kVA", entry.id, product, material, power);
                Ok(entry)
            }
            None => {
                // non-empty, checked by tier_entries
                let largest = candidates[candidates.len() - 1];
                warn!(
                    "No {}/{} tier covers {} kVA, falling back to largest ({} kVA)",
                    product, material, power, largest.nominal_power
                );
                Ok(largest)
            }
        }
    }

    /// Resolve a reference without derating
    pub fn resolve(&self, catalog_ref: &CatalogRef) -> Result<&CatalogEntry> {
        match catalog_ref {
            CatalogRef::Id(id) => self.get_by_id(id),
            CatalogRef::Description(description) => self.get_by_description(description),
            CatalogRef::Tier { product, material, power } => {
                self.select_tier(product, material, *power)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn mt_entry(id: &str, base_price: Decimal) -> CatalogEntry {
        CatalogEntry {
            id: id.to_string(),
            description: format!("TRAFO MT {id}"),
            product_line: ProductLine::Mt,
            product: None,
            material: None,
            nominal_power: Decimal::from(75),
            losses_code: Some("NBR-A".to_string()),
            voltage_class: "15kV".to_string(),
            base_price,
            transformer_fraction: Decimal::ZERO,
            box_fraction: Decimal::ZERO,
            ip_low_value: Decimal::ZERO,
            ip_high_value: Decimal::ZERO,
            box_cost: Decimal::ZERO,
            projection_code_cost: Some(format!("PC-{id}")),
            projection_code_box: Some(format!("PB-{id}")),
        }
    }

    pub fn bt_entry(id: &str, material: &str, power: u32, base_price: Decimal) -> CatalogEntry {
        CatalogEntry {
            id: id.to_string(),
            description: format!("TRAFO SECO {power} kVA {material}"),
            product_line: ProductLine::Bt,
            product: Some("TRAFO SECO".to_string()),
            material: Some(material.to_string()),
            nominal_power: Decimal::from(power),
            losses_code: None,
            voltage_class: "380/220V".to_string(),
            base_price,
            transformer_fraction: Decimal::ZERO,
            box_fraction: Decimal::ZERO,
            ip_low_value: Decimal::ZERO,
            ip_high_value: Decimal::ZERO,
            box_cost: Decimal::from(1000),
            projection_code_cost: Some(format!("PC-{id}")),
            projection_code_box: None,
        }
    }

    /// Copper tiers 45..1500 kVA priced at 10 per kVA, listed out of order
    pub fn bt_catalog() -> Catalog {
        let powers = [300, 75, 1500, 112, 150, 225, 500, 750, 1000, 1250, 45];
        let mut entries: Vec<CatalogEntry> = powers
            .iter()
            .map(|p| bt_entry(&format!("bt-cu-{p}"), "COBRE", *p, Decimal::from(p * 10)))
            .collect();
        entries.push(bt_entry("bt-al-300", "ALUMINIO", 300, Decimal::from(2500)));
        entries.push(mt_entry("mt-1", Decimal::from(1000)));
        Catalog::new(entries).unwrap()
    }
}

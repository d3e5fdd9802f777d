use crate::accessories;
use crate::catalog::{Catalog, CatalogEntry};
use crate::config::EngineConfig;
use crate::derating;
use crate::enclosure;
use crate::error::{checked_div, PricingError, Result};
use crate::tax::TaxAggregator;
use crate::types::*;
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Unit price resolver for MT and BT items
#[derive(Debug, Clone)]
pub struct PriceCalculator {
    config: EngineConfig,
    taxes: TaxAggregator,
}

impl PriceCalculator {
    /// Create a new price calculator
    pub fn new(config: EngineConfig) -> Self {
        let taxes = TaxAggregator::new(config.tax.clone());
        Self { config, taxes }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Gross-up fraction for a set of tax inputs
    pub fn gross_up(&self, tax: &TaxInputs) -> Decimal {
        self.taxes.gross_up(tax)
    }

    /// Price one item against a catalog snapshot
    pub fn price_item(
        &self,
        catalog: &Catalog,
        tax: &TaxInputs,
        item: &ItemConfiguration,
    ) -> Result<PricedItem> {
        tax.validate()?;
        item.validate()?;
        accessories::validate(&item.accessories)?;

        let referenced = catalog.resolve(&item.catalog_ref)?;
        let (entry, unit_price, breakdown) = match referenced.product_line {
            ProductLine::Mt => {
                let (unit_price, breakdown) = self.price_mt(referenced, item, tax)?;
                (referenced, unit_price, breakdown)
            }
            ProductLine::Bt => {
                let entry = self.resolve_bt_tier(catalog, referenced, item)?;
                let (unit_price, breakdown) = self.price_bt(entry, item)?;
                (entry, unit_price, breakdown)
            }
        };

        let total_price = unit_price * Decimal::from(item.quantity);

        debug!(
            "Priced {} ({}) x{}: unit {}, total {}",
            entry.id, entry.product_line, item.quantity, unit_price, total_price
        );

        Ok(PricedItem {
            unit_price,
            total_price,
            quantity: item.quantity,
            product_line: entry.product_line,
            catalog_id: entry.id.clone(),
            projection_code_cost: entry.projection_code_cost.clone(),
            projection_code_box: entry.projection_code_box.clone(),
            breakdown,
            configuration: item.clone(),
        })
    }

    /// MT unit price: grossed-up base, enclosure, K-factor and accessories, then the tax back-out
    pub fn price_mt(
        &self,
        entry: &CatalogEntry,
        item: &ItemConfiguration,
        tax: &TaxInputs,
    ) -> Result<(Decimal, PriceBreakdown)> {
        let voltage_class: VoltageClass = entry.voltage_class.parse()?;

        let gross_up = self.taxes.gross_up(tax);
        let base_price_1 = checked_div(
            "base_price_1",
            entry.base_price,
            Decimal::ONE - entry.transformer_fraction - gross_up,
        )?;
        debug!("{}: gross-up {}, base price 1 {}", entry.id, gross_up, base_price_1);

        let ip_addition = enclosure::ip_addition(
            item.ip_rating,
            entry.ip_low_value,
            entry.ip_high_value,
            entry.box_fraction,
            gross_up,
        )?;
        let enclosure_surcharge = enclosure::enclosure_surcharge(voltage_class, ip_addition);
        let k_addon = base_price_1 * item.k_factor.mt_markup();

        let opening_total = base_price_1 + ip_addition + k_addon + enclosure_surcharge;
        let totals =
            accessories::apply(&item.accessories, base_price_1, opening_total, gross_up)?;
        let working_price = totals.running_total;

        let back_out = checked_div(
            "tax_back_out",
            working_price * (Decimal::ONE - self.taxes.constants().icms_base),
            self.taxes.back_out_denominator(tax),
        )?;
        // truncation toward zero, not rounding
        let truncated_price = back_out.trunc();
        let unit_price = truncated_price + totals.fixed_addon_total;

        Ok((
            unit_price,
            PriceBreakdown::Mt {
                gross_up,
                base_price_1,
                ip_addition,
                enclosure_surcharge,
                k_addon,
                working_price,
                truncated_price,
                fixed_addon_total: totals.fixed_addon_total,
            },
        ))
    }

    /// Catalog row a BT item is priced at, after K-factor derating.
    ///
    /// A row named by id or description is kept unless derating moves the item to
    /// a different power tier of its (product, material) group.
    pub fn resolve_bt_tier<'c>(
        &self,
        catalog: &'c Catalog,
        referenced: &'c CatalogEntry,
        item: &ItemConfiguration,
    ) -> Result<&'c CatalogEntry> {
        let (product, material, requested) = match &item.catalog_ref {
            CatalogRef::Tier { product, material, power } => {
                (product.as_str(), material.as_str(), *power)
            }
            CatalogRef::Id(_) | CatalogRef::Description(_) => {
                if item.k_factor.value() <= derating::DERATING_THRESHOLD {
                    return Ok(referenced);
                }
                match (referenced.product.as_deref(), referenced.material.as_deref()) {
                    (Some(product), Some(material)) => {
                        (product, material, referenced.nominal_power)
                    }
                    _ => {
                        return Err(PricingError::validation(format!(
                            "BT catalog row '{}' has no product/material",
                            referenced.id
                        )))
                    }
                }
            }
        };

        let tiers = catalog.power_tiers(product, material)?;
        let power = derating::resolve_power(requested, item.k_factor, &tiers)?;
        if power == referenced.nominal_power {
            return Ok(referenced);
        }
        if power != requested {
            debug!(
                "{}/{}: {} kVA at {} resolves to the {} kVA tier",
                product, material, requested, item.k_factor, power
            );
        }
        catalog.select_tier(product, material, power)
    }

    /// BT unit price: catalog price plus additive option costs, no tax back-out
    pub fn price_bt(
        &self,
        entry: &CatalogEntry,
        item: &ItemConfiguration,
    ) -> Result<(Decimal, PriceBreakdown)> {
        if !item.accessories.is_empty() {
            return Err(PricingError::validation(format!(
                "BT item '{}' cannot carry MT accessories",
                entry.id
            )));
        }

        let adders = &self.config.bt;
        let options = &item.bt_options;
        let transformer_price = entry.base_price;

        let enclosure = enclosure::bt_enclosure(item.ip_rating, options.flange_level, entry.box_cost);

        let frequency_addon = if options.frequency_50hz {
            transformer_price * adders.frequency_50hz_fraction
        } else {
            Decimal::ZERO
        };

        let shielding_addon = if options.electrostatic_shielding {
            transformer_price * adders.shielding_fraction
        } else {
            Decimal::ZERO
        };

        let relay_addon = match options.relay_price {
            Some(relay_price) => {
                relay_price + adders.relay_wiring_unit * Decimal::from(adders.relay_wiring_count)
            }
            None => Decimal::ZERO,
        };

        let mut test_addon = Decimal::ZERO;
        if options.temperature_rise_test {
            test_addon += self.temperature_rise_surcharge(entry.nominal_power);
        }
        if options.noise_level_test {
            test_addon += adders.noise_level_test;
        }

        let unit_price = transformer_price
            + enclosure.box_cost
            + enclosure.flange_cost
            + frequency_addon
            + shielding_addon
            + relay_addon
            + test_addon;

        Ok((
            unit_price,
            PriceBreakdown::Bt {
                resolved_power: entry.nominal_power,
                transformer_price,
                enclosure_cost: enclosure.box_cost,
                flange_cost: enclosure.flange_cost,
                frequency_addon,
                shielding_addon,
                relay_addon,
                test_addon,
            },
        ))
    }

    /// Temperature-rise test surcharge for a resolved power tier
    pub fn temperature_rise_surcharge(&self, power: Decimal) -> Decimal {
        let adders = &self.config.bt;
        if power < adders.temperature_rise_small_below {
            adders.temperature_rise_small
        } else {
            if power < adders.temperature_rise_large_from {
                warn!(
                    "No temperature-rise surcharge catalogued for {} kVA, charging the large-tier {}",
                    power, adders.temperature_rise_large
                );
            }
            adders.temperature_rise_large
        }
    }
}

impl Default for PriceCalculator {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

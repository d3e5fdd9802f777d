//! Configuration for the pricing engine

use crate::error::{PricingError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the pricing engine
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed regulatory constants folded into the gross-up
    pub tax: TaxConstants,

    /// Low-voltage option adders
    pub bt: BtAdders,

    /// Quote-level pricing behaviour
    pub pricing: PricingConfig,

    /// Logging configuration for tools embedding the engine
    pub logging: LoggingConfig,
}

/// Fixed tax and overhead fractions (0.12 = 12%)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TaxConstants {
    /// ICMS base rate, also used as the MT back-out numerator
    pub icms_base: Decimal,

    /// IRPJ + CSLL
    pub irpj_cssl: Decimal,

    /// Administrative and marketing overhead
    pub admin_marketing: Decimal,

    /// Fixed company overhead
    pub fixed_overhead: Decimal,

    /// PIS + COFINS
    pub pis_cofins: Decimal,
}

/// Fixed per-option adders for the BT product line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BtAdders {
    /// Fraction of transformer price added for the 50 Hz option
    pub frequency_50hz_fraction: Decimal,

    /// Fraction of transformer price added for electrostatic shielding
    pub shielding_fraction: Decimal,

    /// Wiring cost per relay connection
    pub relay_wiring_unit: Decimal,

    /// Number of wiring connections charged when a relay is selected
    pub relay_wiring_count: u32,

    /// Temperature-rise test surcharge below `temperature_rise_small_below`
    pub temperature_rise_small: Decimal,

    /// Temperature-rise test surcharge at or above `temperature_rise_small_below`
    pub temperature_rise_large: Decimal,

    /// Power (kVA) under which the small temperature-rise surcharge applies
    pub temperature_rise_small_below: Decimal,

    /// Power (kVA) from which the large surcharge is the catalogued value
    pub temperature_rise_large_from: Decimal,

    /// Noise-level test surcharge
    pub noise_level_test: Decimal,
}

/// Quote-level pricing behaviour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PricingConfig {
    /// Quotes with more items than this are priced in parallel
    pub parallel_threshold: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (pretty, json)
    pub format: String,
}

impl Default for TaxConstants {
    fn default() -> Self {
        Self {
            icms_base: dec!(0.12),
            irpj_cssl: dec!(0.0228),
            admin_marketing: dec!(0.037),
            fixed_overhead: dec!(0.20),
            pis_cofins: dec!(0.0925),
        }
    }
}

impl Default for BtAdders {
    fn default() -> Self {
        Self {
            frequency_50hz_fraction: dec!(0.20),
            shielding_fraction: dec!(0.03),
            relay_wiring_unit: dec!(51.83),
            relay_wiring_count: 3,
            temperature_rise_small: dec!(2910),
            temperature_rise_large: dec!(4807),
            temperature_rise_small_below: dec!(1000),
            temperature_rise_large_from: dec!(1250),
            noise_level_test: dec!(1265),
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self { parallel_threshold: 32 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            PricingError::Configuration(format!("{}: {e}", path.as_ref().display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| PricingError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| PricingError::Configuration(e.to_string()))?;
        std::fs::write(path.as_ref(), content).map_err(|e| {
            PricingError::Configuration(format!("{}: {e}", path.as_ref().display()))
        })
    }

    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields from `QUOTE_*` environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(level) = std::env::var("QUOTE_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(format) = std::env::var("QUOTE_LOG_FORMAT") {
            self.logging.format = format;
        }

        if let Ok(threshold) = std::env::var("QUOTE_PARALLEL_THRESHOLD") {
            self.pricing.parallel_threshold = threshold.parse().map_err(|_| {
                PricingError::Configuration(format!(
                    "QUOTE_PARALLEL_THRESHOLD is not a number: {threshold}"
                ))
            })?;
        }

        self.validate()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let tax = &self.tax;
        for (name, value) in [
            ("icms_base", tax.icms_base),
            ("irpj_cssl", tax.irpj_cssl),
            ("admin_marketing", tax.admin_marketing),
            ("fixed_overhead", tax.fixed_overhead),
            ("pis_cofins", tax.pis_cofins),
        ] {
            if value < Decimal::ZERO || value >= Decimal::ONE {
                return Err(PricingError::Configuration(format!(
                    "tax.{name} must be a fraction in [0, 1): {value}"
                )));
            }
        }

        if self.bt.temperature_rise_small_below > self.bt.temperature_rise_large_from {
            return Err(PricingError::Configuration(
                "bt.temperature_rise_small_below exceeds bt.temperature_rise_large_from"
                    .to_string(),
            ));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(PricingError::Configuration(format!("Invalid log level: {other}")))
            }
        }

        match self.logging.format.as_str() {
            "json" | "pretty" => {}
            other => {
                return Err(PricingError::Configuration(format!("Invalid log format: {other}")))
            }
        }

        Ok(())
    }
}

//! Type definitions for quote configuration and priced output

use crate::error::PricingError;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Transformer product line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductLine {
    /// Medium voltage
    #[serde(rename = "MT")]
    Mt,
    /// Low voltage
    #[serde(rename = "BT")]
    Bt,
}

impl fmt::Display for ProductLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductLine::Mt => write!(f, "MT"),
            ProductLine::Bt => write!(f, "BT"),
        }
    }
}

/// Harmonic derating factor a transformer is rated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum KFactor {
    K1,
    K4,
    K6,
    K8,
    K13,
    K20,
}

impl KFactor {
    pub const ALL: [KFactor; 6] =
        [KFactor::K1, KFactor::K4, KFactor::K6, KFactor::K8, KFactor::K13, KFactor::K20];

    pub fn value(self) -> u8 {
        match self {
            KFactor::K1 => 1,
            KFactor::K4 => 4,
            KFactor::K6 => 6,
            KFactor::K8 => 8,
            KFactor::K13 => 13,
            KFactor::K20 => 20,
        }
    }

    /// Fraction of base price 1 added for MT transformers rated for this K-factor.
    ///
    /// K8 has no catalogued markup and prices at zero.
    pub fn mt_markup(self) -> Decimal {
        match self {
            KFactor::K4 => dec!(0.0502),
            KFactor::K6 => dec!(0.0917),
            KFactor::K13 => dec!(0.2317),
            KFactor::K20 => dec!(0.3359),
            KFactor::K1 | KFactor::K8 => Decimal::ZERO,
        }
    }
}

impl TryFrom<u8> for KFactor {
    type Error = PricingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(KFactor::K1),
            4 => Ok(KFactor::K4),
            6 => Ok(KFactor::K6),
            8 => Ok(KFactor::K8),
            13 => Ok(KFactor::K13),
            20 => Ok(KFactor::K20),
            other => Err(PricingError::validation(format!("unknown K-factor: {other}"))),
        }
    }
}

impl From<KFactor> for u8 {
    fn from(k: KFactor) -> Self {
        k.value()
    }
}

impl fmt::Display for KFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "K-{}", self.value())
    }
}

/// Ingress protection rating of the enclosure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IpRating {
    Ip00,
    Ip21,
    Ip23,
    Ip54,
}

impl IpRating {
    pub fn code(self) -> &'static str {
        match self {
            IpRating::Ip00 => "00",
            IpRating::Ip21 => "21",
            IpRating::Ip23 => "23",
            IpRating::Ip54 => "54",
        }
    }

    pub fn numeric(self) -> u8 {
        match self {
            IpRating::Ip00 => 0,
            IpRating::Ip21 => 21,
            IpRating::Ip23 => 23,
            IpRating::Ip54 => 54,
        }
    }
}

impl FromStr for IpRating {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let code = trimmed
            .strip_prefix("IP")
            .or_else(|| trimmed.strip_prefix("ip"))
            .unwrap_or(trimmed)
            .trim();
        match code {
            "00" => Ok(IpRating::Ip00),
            "21" => Ok(IpRating::Ip21),
            "23" => Ok(IpRating::Ip23),
            "54" => Ok(IpRating::Ip54),
            _ => Err(PricingError::validation(format!("unknown IP rating: {s}"))),
        }
    }
}

impl TryFrom<String> for IpRating {
    type Error = PricingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IpRating> for String {
    fn from(ip: IpRating) -> Self {
        ip.code().to_string()
    }
}

impl fmt::Display for IpRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IP{}", self.code())
    }
}

/// MT voltage class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoltageClass {
    Kv15,
    Kv24,
    Kv36,
}

impl FromStr for VoltageClass {
    type Err = PricingError;

    /// Accepts "15kV", "15 kV", "15KV" and bare "15"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let upper = compact.to_uppercase();
        let digits = upper.strip_suffix("KV").unwrap_or(&upper);
        match digits {
            "15" => Ok(VoltageClass::Kv15),
            "24" => Ok(VoltageClass::Kv24),
            "36" => Ok(VoltageClass::Kv36),
            _ => Err(PricingError::validation(format!("unknown MT voltage class: {s}"))),
        }
    }
}

impl fmt::Display for VoltageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoltageClass::Kv15 => write!(f, "15 kV"),
            VoltageClass::Kv24 => write!(f, "24 kV"),
            VoltageClass::Kv36 => write!(f, "36 kV"),
        }
    }
}

/// Number of flanged sides on a BT enclosure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FlangeLevel {
    #[default]
    None,
    Single,
    Double,
}

impl TryFrom<u8> for FlangeLevel {
    type Error = PricingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FlangeLevel::None),
            1 => Ok(FlangeLevel::Single),
            2 => Ok(FlangeLevel::Double),
            other => Err(PricingError::validation(format!("unknown flange level: {other}"))),
        }
    }
}

impl From<FlangeLevel> for u8 {
    fn from(level: FlangeLevel) -> Self {
        match level {
            FlangeLevel::None => 0,
            FlangeLevel::Single => 1,
            FlangeLevel::Double => 2,
        }
    }
}

/// Per-quote commercial inputs, all in percent (12 = 12%)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxInputs {
    pub profit_pct: Decimal,
    pub icms_pct: Decimal,
    pub commission_pct: Decimal,
    pub freight_pct: Decimal,
    pub difal_pct: Decimal,
    pub poverty_fund_pct: Decimal,

    /// ICMS taxpayers are exempt from DIFAL and the poverty fund
    pub icms_taxpayer: bool,
}

impl TaxInputs {
    /// Reject negative percentages
    pub fn validate(&self) -> crate::Result<()> {
        for (name, value) in [
            ("profit_pct", self.profit_pct),
            ("icms_pct", self.icms_pct),
            ("commission_pct", self.commission_pct),
            ("freight_pct", self.freight_pct),
            ("difal_pct", self.difal_pct),
            ("poverty_fund_pct", self.poverty_fund_pct),
        ] {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(PricingError::validation(format!("{name} is negative: {value}")));
            }
        }
        Ok(())
    }

    pub fn effective_difal_pct(&self) -> Decimal {
        if self.icms_taxpayer {
            Decimal::ZERO
        } else {
            self.difal_pct
        }
    }

    pub fn effective_poverty_fund_pct(&self) -> Decimal {
        if self.icms_taxpayer {
            Decimal::ZERO
        } else {
            self.poverty_fund_pct
        }
    }
}

/// How an accessory amount is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessoryKind {
    /// Absolute currency amount, grossed up by the tax fraction
    FixedValue,
    /// Percentage of the calculation base
    Percentage,
}

/// What a percentage accessory is computed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalcBase {
    #[serde(rename = "BASE_PRICE_1")]
    BasePrice1,
    RunningTotal,
}

/// An optional accessory chosen for an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessorySelection {
    #[serde(default)]
    pub name: Option<String>,
    pub kind: AccessoryKind,
    pub amount: Decimal,
    pub calc_base: CalcBase,
}

impl AccessorySelection {
    pub fn fixed(amount: Decimal, calc_base: CalcBase) -> Self {
        Self { name: None, kind: AccessoryKind::FixedValue, amount, calc_base }
    }

    pub fn percentage(amount: Decimal, calc_base: CalcBase) -> Self {
        Self { name: None, kind: AccessoryKind::Percentage, amount, calc_base }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// How an item points at its catalog row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogRef {
    Id(String),
    Description(String),
    /// BT selection: smallest tier of (product, material) covering `power`
    Tier { product: String, material: String, power: Decimal },
}

impl fmt::Display for CatalogRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogRef::Id(id) => write!(f, "id '{id}'"),
            CatalogRef::Description(description) => write!(f, "description '{description}'"),
            CatalogRef::Tier { product, material, power } => {
                write!(f, "{product}/{material} at {power} kVA")
            }
        }
    }
}

/// Options only the BT line prices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BtOptions {
    pub frequency_50hz: bool,
    pub electrostatic_shielding: bool,
    pub relay_price: Option<Decimal>,
    pub temperature_rise_test: bool,
    pub noise_level_test: bool,
    pub flange_level: FlangeLevel,
}

/// One line item of a quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemConfiguration {
    pub catalog_ref: CatalogRef,
    pub k_factor: KFactor,
    pub ip_rating: IpRating,
    pub quantity: u32,
    #[serde(default)]
    pub accessories: Vec<AccessorySelection>,
    #[serde(default)]
    pub bt_options: BtOptions,
}

impl ItemConfiguration {
    pub fn new(catalog_ref: CatalogRef, k_factor: KFactor, ip_rating: IpRating, quantity: u32) -> Self {
        Self {
            catalog_ref,
            k_factor,
            ip_rating,
            quantity,
            accessories: Vec::new(),
            bt_options: BtOptions::default(),
        }
    }

    pub fn with_accessories(mut self, accessories: Vec<AccessorySelection>) -> Self {
        self.accessories = accessories;
        self
    }

    pub fn with_bt_options(mut self, bt_options: BtOptions) -> Self {
        self.bt_options = bt_options;
        self
    }

    /// Checks that need no catalog access
    pub fn validate(&self) -> crate::Result<()> {
        if self.quantity == 0 {
            return Err(PricingError::validation("quantity must be positive"));
        }
        if let Some(relay_price) = self.bt_options.relay_price {
            if relay_price.is_sign_negative() && !relay_price.is_zero() {
                return Err(PricingError::validation(format!(
                    "relay price is negative: {relay_price}"
                )));
            }
        }
        if let CatalogRef::Tier { power, .. } = &self.catalog_ref {
            if *power <= Decimal::ZERO {
                return Err(PricingError::validation(format!(
                    "requested power must be positive: {power}"
                )));
            }
        }
        Ok(())
    }
}

/// Intermediate values behind a unit price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "line")]
pub enum PriceBreakdown {
    #[serde(rename = "MT")]
    Mt {
        gross_up: Decimal,
        base_price_1: Decimal,
        ip_addition: Decimal,
        enclosure_surcharge: Decimal,
        k_addon: Decimal,
        working_price: Decimal,
        truncated_price: Decimal,
        fixed_addon_total: Decimal,
    },
    #[serde(rename = "BT")]
    Bt {
        resolved_power: Decimal,
        transformer_price: Decimal,
        enclosure_cost: Decimal,
        flange_cost: Decimal,
        frequency_addon: Decimal,
        shielding_addon: Decimal,
        relay_addon: Decimal,
        test_addon: Decimal,
    },
}

/// A configuration with its resolved price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedItem {
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub quantity: u32,
    pub product_line: ProductLine,
    pub catalog_id: String,
    pub projection_code_cost: Option<String>,
    pub projection_code_box: Option<String>,
    pub breakdown: PriceBreakdown,
    pub configuration: ItemConfiguration,
}

/// All priced items of a quote, in request order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedQuote {
    pub items: Vec<PricedItem>,
    pub grand_total: Decimal,
}

/// Round a currency amount to cents for display
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

//! K-factor derating to an equivalent catalog power tier
//!
//! Transformers feeding harmonic-rich loads lose usable nameplate power. The
//! loss curve is a 6th-degree fit of the manufacturer derating table; the
//! equivalent power is then snapped up to a manufactured tier.

use crate::error::{checked_div, PricingError, Result};
use crate::types::KFactor;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, warn};

/// Highest K-factor that needs no derating
pub const DERATING_THRESHOLD: u8 = 5;

/// Curve coefficients, constant term first
const CURVE: [Decimal; 7] = [
    dec!(101.826204136368),
    dec!(-1.369407483908),
    dec!(-0.345600795014),
    dec!(0.040938237195),
    dec!(-0.001966117106),
    dec!(0.000044437349),
    dec!(-0.000000391396),
];

/// Usable power, in percent of nameplate, at K-factor `k`
pub fn usable_power_pct(k: Decimal) -> Decimal {
    CURVE.iter().rev().fold(Decimal::ZERO, |acc, coefficient| acc * k + *coefficient)
}

/// Nameplate power needed to deliver `nominal_power` at `k_factor`, before tier snapping
pub fn equivalent_power(nominal_power: Decimal, k_factor: KFactor) -> Result<Decimal> {
    if k_factor.value() <= DERATING_THRESHOLD {
        return Ok(nominal_power);
    }
    let usable = usable_power_pct(Decimal::from(k_factor.value()));
    let equivalent = checked_div("derating", nominal_power, usable)? * dec!(100);
    debug!(
        "Derated {} kVA at {}: usable {}%, equivalent {} kVA",
        nominal_power, k_factor, usable, equivalent
    );
    Ok(equivalent)
}

/// Smallest tier at or above `power`, else the largest tier
pub fn snap_to_tier(power: Decimal, tiers: &[Decimal]) -> Result<Decimal> {
    let mut sorted = tiers.to_vec();
    sorted.sort();
    match sorted.iter().find(|tier| **tier >= power) {
        Some(tier) => Ok(*tier),
        None => {
            let largest = sorted
                .last()
                .copied()
                .ok_or_else(|| PricingError::not_found("no power tiers to snap to"))?;
            warn!("Equivalent power {} kVA exceeds every tier, using {} kVA", power, largest);
            Ok(largest)
        }
    }
}

/// Power tier to price `nominal_power` at for `k_factor`.
///
/// K-factors up to 5 pass the nominal power through untouched.
pub fn resolve_power(
    nominal_power: Decimal,
    k_factor: KFactor,
    tiers: &[Decimal],
) -> Result<Decimal> {
    if k_factor.value() <= DERATING_THRESHOLD {
        return Ok(nominal_power);
    }
    let equivalent = equivalent_power(nominal_power, k_factor)?;
    snap_to_tier(equivalent, tiers)
}

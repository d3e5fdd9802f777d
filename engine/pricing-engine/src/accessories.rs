//! Accessory aggregation
//!
//! Accessories are applied in the order they were selected. Percentage
//! accessories computed on the running total compound on everything applied
//! before them, so reordering the list can change the price.

use crate::error::{checked_div, PricingError, Result};
use crate::types::{AccessoryKind, AccessorySelection, CalcBase};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

/// Result of running the accessory ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessoryTotals {
    /// Running total after every accessory, still subject to the tax back-out
    pub running_total: Decimal,

    /// Grossed-up fixed accessories added after the tax back-out
    pub fixed_addon_total: Decimal,
}

/// Reject accessories that cannot be priced
pub fn validate(accessories: &[AccessorySelection]) -> Result<()> {
    for (position, accessory) in accessories.iter().enumerate() {
        if accessory.amount.is_sign_negative() && !accessory.amount.is_zero() {
            return Err(PricingError::validation(format!(
                "accessory #{} ({}) has a negative amount: {}",
                position + 1,
                accessory.name.as_deref().unwrap_or("unnamed"),
                accessory.amount
            )));
        }
    }
    Ok(())
}

fn gross_up_fixed(amount: Decimal, gross_up: Decimal) -> Result<Decimal> {
    checked_div("fixed_accessory", amount, Decimal::ONE - gross_up)
}

/// One step of the running-total fold
fn apply_one(
    running_total: Decimal,
    accessory: &AccessorySelection,
    base_price_1: Decimal,
    gross_up: Decimal,
) -> Result<Decimal> {
    let addition = match (accessory.kind, accessory.calc_base) {
        // counted in the fixed addon pass
        (AccessoryKind::FixedValue, CalcBase::BasePrice1) => Decimal::ZERO,
        (AccessoryKind::FixedValue, CalcBase::RunningTotal) => {
            gross_up_fixed(accessory.amount, gross_up)?
        }
        (AccessoryKind::Percentage, CalcBase::BasePrice1) => {
            base_price_1 * accessory.amount / dec!(100)
        }
        (AccessoryKind::Percentage, CalcBase::RunningTotal) => {
            running_total * accessory.amount / dec!(100)
        }
    };
    Ok(running_total + addition)
}

/// Run the ledger over `accessories` starting from `opening_total`
pub fn apply(
    accessories: &[AccessorySelection],
    base_price_1: Decimal,
    opening_total: Decimal,
    gross_up: Decimal,
) -> Result<AccessoryTotals> {
    let fixed_addon_total = accessories
        .iter()
        .filter(|a| a.kind == AccessoryKind::FixedValue && a.calc_base == CalcBase::BasePrice1)
        .map(|a| gross_up_fixed(a.amount, gross_up))
        .sum::<Result<Decimal>>()?;

    let running_total = accessories.iter().try_fold(opening_total, |running, accessory| {
        apply_one(running, accessory, base_price_1, gross_up)
    })?;

    if !accessories.is_empty() {
        debug!(
            "Applied {} accessories: running total {} -> {}, fixed addon {}",
            accessories.len(),
            opening_total,
            running_total,
            fixed_addon_total
        );
    }

    Ok(AccessoryTotals { running_total, fixed_addon_total })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_accessories_keeps_opening_total() {
        let totals = apply(&[], dec!(2500), dec!(2625.5), dec!(0.5)).unwrap();
        assert_eq!(
            totals,
            AccessoryTotals { running_total: dec!(2625.5), fixed_addon_total: Decimal::ZERO }
        );
    }

    #[test]
    fn test_fixed_base_price_accessory_is_kept_apart() {
        let accessories = vec![AccessorySelection::fixed(dec!(100), CalcBase::BasePrice1)];
        let totals = apply(&accessories, dec!(2500), dec!(2500), dec!(0.5)).unwrap();
        assert_eq!(totals.running_total, dec!(2500));
        assert_eq!(totals.fixed_addon_total, dec!(200));
    }

    #[test]
    fn test_fixed_running_total_accessory_joins_running_total() {
        let accessories = vec![AccessorySelection::fixed(dec!(100), CalcBase::RunningTotal)];
        let totals = apply(&accessories, dec!(2500), dec!(2500), dec!(0.5)).unwrap();
        assert_eq!(totals.running_total, dec!(2700));
        assert_eq!(totals.fixed_addon_total, Decimal::ZERO);
    }

    #[test]
    fn test_percentage_on_base_price_does_not_compound() {
        let accessories = vec![
            AccessorySelection::percentage(dec!(10), CalcBase::BasePrice1),
            AccessorySelection::percentage(dec!(10), CalcBase::BasePrice1),
        ];
        let totals = apply(&accessories, dec!(1000), dec!(1200), dec!(0.5)).unwrap();
        assert_eq!(totals.running_total, dec!(1400));
    }

    #[test]
    fn test_percentage_on_running_total_compounds() {
        let accessories = vec![
            AccessorySelection::percentage(dec!(10), CalcBase::RunningTotal),
            AccessorySelection::percentage(dec!(10), CalcBase::RunningTotal),
        ];
        let totals = apply(&accessories, dec!(1000), dec!(1000), dec!(0.5)).unwrap();
        assert_eq!(totals.running_total, dec!(1210));
    }

    #[test]
    fn test_order_is_observable() {
        let base = AccessorySelection::percentage(dec!(20), CalcBase::BasePrice1);
        let running = AccessorySelection::percentage(dec!(10), CalcBase::RunningTotal);

        let base_first =
            apply(&[base.clone(), running.clone()], dec!(1000), dec!(1000), dec!(0.5)).unwrap();
        let running_first =
            apply(&[running, base], dec!(1000), dec!(1000), dec!(0.5)).unwrap();

        // (1000 + 200) * 1.1 vs 1000 * 1.1 + 200
        assert_eq!(base_first.running_total, dec!(1320));
        assert_eq!(running_first.running_total, dec!(1300));
    }

    #[test]
    fn test_fixed_accessory_with_full_gross_up_fails() {
        let accessories = vec![AccessorySelection::fixed(dec!(100), CalcBase::BasePrice1)];
        let result = apply(&accessories, dec!(1000), dec!(1000), Decimal::ONE);
        assert!(matches!(
            result,
            Err(PricingError::DivisionDomain { stage: "fixed_accessory", .. })
        ));
    }

    #[test]
    fn test_percentage_only_ledger_ignores_gross_up_domain() {
        let accessories = vec![AccessorySelection::percentage(dec!(5), CalcBase::RunningTotal)];
        let totals = apply(&accessories, dec!(1000), dec!(1000), dec!(1.2)).unwrap();
        assert_eq!(totals.running_total, dec!(1050));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let accessories = vec![
            AccessorySelection::percentage(dec!(5), CalcBase::RunningTotal),
            AccessorySelection::fixed(dec!(-10), CalcBase::BasePrice1).named("discount"),
        ];
        assert!(matches!(validate(&accessories), Err(PricingError::Validation(_))));
    }
}

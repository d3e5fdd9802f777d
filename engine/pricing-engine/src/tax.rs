//! Gross-up aggregation of taxes and markups

use crate::config::TaxConstants;
use crate::types::TaxInputs;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const HUNDRED: Decimal = dec!(100);

/// Folds per-quote percentages and the fixed regulatory constants into one fraction
#[derive(Debug, Clone)]
pub struct TaxAggregator {
    constants: TaxConstants,
}

impl TaxAggregator {
    pub fn new(constants: TaxConstants) -> Self {
        Self { constants }
    }

    pub fn constants(&self) -> &TaxConstants {
        &self.constants
    }

    /// Fraction of the sale price consumed by taxes and markups.
    ///
    /// Callers subtract this from 1 in a denominator; the result is not range-checked here.
    pub fn gross_up(&self, tax: &TaxInputs) -> Decimal {
        let c = &self.constants;
        tax.profit_pct / HUNDRED
            + c.icms_base
            + tax.commission_pct / HUNDRED
            + tax.freight_pct / HUNDRED
            + c.irpj_cssl
            + c.admin_marketing
            + c.fixed_overhead
            + c.pis_cofins
    }

    /// Denominator of the final MT tax back-out: 1 - difal - poverty fund - icms
    pub fn back_out_denominator(&self, tax: &TaxInputs) -> Decimal {
        Decimal::ONE
            - tax.effective_difal_pct() / HUNDRED
            - tax.effective_poverty_fund_pct() / HUNDRED
            - tax.icms_pct / HUNDRED
    }
}

impl Default for TaxAggregator {
    fn default() -> Self {
        Self::new(TaxConstants::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gross_up_constants_only() {
        let aggregator = TaxAggregator::default();
        // 0.12 + 0.0228 + 0.037 + 0.20 + 0.0925
        assert_eq!(aggregator.gross_up(&TaxInputs::default()), dec!(0.4723));
    }

    #[test]
    fn test_gross_up_with_percentages() {
        let aggregator = TaxAggregator::default();
        let tax = TaxInputs {
            profit_pct: dec!(10),
            commission_pct: dec!(3),
            freight_pct: dec!(2.5),
            // not part of the gross-up
            icms_pct: dec!(18),
            difal_pct: dec!(4),
            ..Default::default()
        };
        assert_eq!(aggregator.gross_up(&tax), dec!(0.6273));
    }

    #[test]
    fn test_back_out_denominator_respects_taxpayer_flag() {
        let aggregator = TaxAggregator::default();
        let mut tax = TaxInputs {
            icms_pct: dec!(12),
            difal_pct: dec!(6),
            poverty_fund_pct: dec!(2),
            ..Default::default()
        };
        assert_eq!(aggregator.back_out_denominator(&tax), dec!(0.80));

        tax.icms_taxpayer = true;
        assert_eq!(aggregator.back_out_denominator(&tax), dec!(0.88));
    }
}

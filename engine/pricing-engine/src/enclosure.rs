//! Enclosure (IP rating) cost model

use crate::error::{checked_div, Result};
use crate::types::{FlangeLevel, IpRating, VoltageClass};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Grossed-up additional cost of an IP rating.
///
/// IP00 costs nothing and never touches the denominator.
pub fn ip_addition(
    ip_rating: IpRating,
    ip_low_value: Decimal,
    ip_high_value: Decimal,
    box_fraction: Decimal,
    gross_up: Decimal,
) -> Result<Decimal> {
    if ip_rating == IpRating::Ip00 {
        return Ok(Decimal::ZERO);
    }
    let numerator = if ip_rating.numeric() < 54 { ip_low_value } else { ip_high_value };
    checked_div("ip_addition", numerator, Decimal::ONE - gross_up - box_fraction)
}

/// Fraction of the IP addition charged on top for the MT voltage class
pub fn voltage_surcharge_fraction(voltage_class: VoltageClass) -> Decimal {
    match voltage_class {
        VoltageClass::Kv15 => Decimal::ZERO,
        VoltageClass::Kv24 => dec!(0.30),
        VoltageClass::Kv36 => dec!(0.50),
    }
}

/// MT box surcharge for the voltage class
pub fn enclosure_surcharge(voltage_class: VoltageClass, ip_addition: Decimal) -> Decimal {
    ip_addition * voltage_surcharge_fraction(voltage_class)
}

/// Fraction of the BT box cost charged for flanges
pub fn flange_factor(ip_rating: IpRating, flange_level: FlangeLevel) -> Decimal {
    match (ip_rating, flange_level) {
        (_, FlangeLevel::None) | (IpRating::Ip00, _) => Decimal::ZERO,
        (IpRating::Ip21 | IpRating::Ip23, FlangeLevel::Single) => dec!(0.3),
        (IpRating::Ip21 | IpRating::Ip23, FlangeLevel::Double) => dec!(0.5),
        (IpRating::Ip54, FlangeLevel::Single) => dec!(0.8),
        (IpRating::Ip54, FlangeLevel::Double) => dec!(1.5),
    }
}

/// BT enclosure costs derived from the tier's flat box price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BtEnclosureCost {
    /// Box price, charged for IP21/IP23 only
    pub box_cost: Decimal,
    /// Flange adder on the box price
    pub flange_cost: Decimal,
}

pub fn bt_enclosure(ip_rating: IpRating, flange_level: FlangeLevel, box_cost: Decimal) -> BtEnclosureCost {
    let charged_box = match ip_rating {
        IpRating::Ip21 | IpRating::Ip23 => box_cost,
        IpRating::Ip00 | IpRating::Ip54 => Decimal::ZERO,
    };
    BtEnclosureCost {
        box_cost: charged_box,
        flange_cost: box_cost * flange_factor(ip_rating, flange_level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PricingError;

    #[test]
    fn test_ip00_is_free_even_with_bad_denominator() {
        let amount = ip_addition(IpRating::Ip00, dec!(100), dec!(200), dec!(0.9), dec!(0.9)).unwrap();
        assert_eq!(amount, Decimal::ZERO);
    }

    #[test]
    fn test_low_and_high_values() {
        let low = ip_addition(IpRating::Ip23, dec!(100), dec!(400), dec!(0.2), dec!(0.4)).unwrap();
        assert_eq!(low, dec!(250));
        let high = ip_addition(IpRating::Ip54, dec!(100), dec!(400), dec!(0.2), dec!(0.4)).unwrap();
        assert_eq!(high, dec!(1000));
    }

    #[test]
    fn test_24kv_surcharge() {
        let addition = ip_addition(IpRating::Ip21, dec!(100), Decimal::ZERO, dec!(0.2), dec!(0.5)).unwrap();
        assert_eq!(addition.round_dp(2), dec!(333.33));
        let surcharge = enclosure_surcharge(VoltageClass::Kv24, addition);
        assert_eq!(surcharge.round_dp(2), dec!(100.00));
    }

    #[test]
    fn test_voltage_surcharge_table() {
        assert_eq!(enclosure_surcharge(VoltageClass::Kv15, dec!(200)), Decimal::ZERO);
        assert_eq!(enclosure_surcharge(VoltageClass::Kv24, dec!(200)), dec!(60));
        assert_eq!(enclosure_surcharge(VoltageClass::Kv36, dec!(200)), dec!(100));
    }

    #[test]
    fn test_negative_denominator_fails() {
        let result = ip_addition(IpRating::Ip21, dec!(100), dec!(100), dec!(0.45), dec!(0.6));
        assert!(matches!(
            result,
            Err(PricingError::DivisionDomain { stage: "ip_addition", .. })
        ));
    }

    #[test]
    fn test_flange_factor_table() {
        assert_eq!(flange_factor(IpRating::Ip21, FlangeLevel::None), Decimal::ZERO);
        assert_eq!(flange_factor(IpRating::Ip23, FlangeLevel::Single), dec!(0.3));
        assert_eq!(flange_factor(IpRating::Ip21, FlangeLevel::Double), dec!(0.5));
        assert_eq!(flange_factor(IpRating::Ip54, FlangeLevel::Single), dec!(0.8));
        assert_eq!(flange_factor(IpRating::Ip54, FlangeLevel::Double), dec!(1.5));
        assert_eq!(flange_factor(IpRating::Ip00, FlangeLevel::Double), Decimal::ZERO);
    }

    #[test]
    fn test_bt_enclosure() {
        let ip21 = bt_enclosure(IpRating::Ip21, FlangeLevel::Single, dec!(1000));
        assert_eq!(ip21, BtEnclosureCost { box_cost: dec!(1000), flange_cost: dec!(300) });

        let ip54 = bt_enclosure(IpRating::Ip54, FlangeLevel::Double, dec!(1000));
        assert_eq!(ip54, BtEnclosureCost { box_cost: Decimal::ZERO, flange_cost: dec!(1500) });

        let ip00 = bt_enclosure(IpRating::Ip00, FlangeLevel::Double, dec!(1000));
        assert_eq!(ip00, BtEnclosureCost { box_cost: Decimal::ZERO, flange_cost: Decimal::ZERO });
    }
}

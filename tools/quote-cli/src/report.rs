//! Plain-text rendering of priced quotes

use pricing_engine::{round_currency, PriceBreakdown, PricedItem, PricedQuote};
use std::fmt::Write;

const RULE_WIDTH: usize = 86;

/// Render a priced quote as a fixed-width table
pub fn render_table(quote: &PricedQuote) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<4} {:<20} {:<4} {:<5} {:<5} {:>5} {:>18} {:>18}",
        "#", "Catalog id", "Line", "K", "IP", "Qty", "Unit price", "Total"
    );
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));

    for (index, item) in quote.items.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<4} {:<20} {:<4} {:<5} {:<5} {:>5} {:>18} {:>18}",
            index + 1,
            item.catalog_id,
            item.product_line.to_string(),
            item.configuration.k_factor.to_string(),
            item.configuration.ip_rating.to_string(),
            item.quantity,
            round_currency(item.unit_price).to_string(),
            round_currency(item.total_price).to_string(),
        );
    }

    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    let _ = writeln!(out, "{:<67} {:>18}", "Grand total", round_currency(quote.grand_total).to_string());
    out
}

/// Render the stage-by-stage breakdown of one item
pub fn render_breakdown(item: &PricedItem) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", item.catalog_id, item.product_line);

    let rows: Vec<(&str, rust_decimal::Decimal)> = match &item.breakdown {
        PriceBreakdown::Mt {
            gross_up,
            base_price_1,
            ip_addition,
            enclosure_surcharge,
            k_addon,
            working_price,
            truncated_price,
            fixed_addon_total,
        } => {
            let _ = writeln!(out, "  {:<22} {}", "gross-up", gross_up);
            vec![
                ("base price 1", *base_price_1),
                ("ip addition", *ip_addition),
                ("enclosure surcharge", *enclosure_surcharge),
                ("k-factor addon", *k_addon),
                ("working price", *working_price),
                ("after tax back-out", *truncated_price),
                ("fixed accessories", *fixed_addon_total),
            ]
        }
        PriceBreakdown::Bt {
            resolved_power,
            transformer_price,
            enclosure_cost,
            flange_cost,
            frequency_addon,
            shielding_addon,
            relay_addon,
            test_addon,
        } => {
            let _ = writeln!(out, "  {:<22} {} kVA", "resolved tier", resolved_power);
            vec![
                ("transformer", *transformer_price),
                ("enclosure", *enclosure_cost),
                ("flanges", *flange_cost),
                ("50 Hz", *frequency_addon),
                ("shielding", *shielding_addon),
                ("relay", *relay_addon),
                ("tests", *test_addon),
            ]
        }
    };

    for (label, amount) in rows {
        let _ = writeln!(out, "  {:<22} {:>18}", label, round_currency(amount).to_string());
    }
    let _ = writeln!(out, "  {:<22} {:>18}", "unit price", round_currency(item.unit_price).to_string());
    out
}

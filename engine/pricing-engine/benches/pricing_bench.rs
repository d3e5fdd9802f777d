use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pricing_engine::{
    AccessorySelection, BtOptions, CalcBase, Catalog, CatalogEntry, CatalogRef, EngineConfig,
    FlangeLevel, IpRating, ItemConfiguration, KFactor, PriceCalculator, ProductLine, QuoteEngine,
    TaxInputs,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

const BT_TIERS: [u32; 11] = [45, 75, 112, 150, 225, 300, 500, 750, 1000, 1250, 1500];

fn bench_price_mt_item(c: &mut Criterion) {
    let catalog = create_catalog();
    let calculator = PriceCalculator::default();
    let tax = create_tax();
    let item = create_mt_item();

    c.bench_function("price_mt_item", |b| {
        b.iter(|| {
            let result = calculator.price_item(black_box(&catalog), black_box(&tax), black_box(&item));
            black_box(result).unwrap();
        })
    });
}

fn bench_price_bt_item(c: &mut Criterion) {
    let catalog = create_catalog();
    let calculator = PriceCalculator::default();
    let tax = create_tax();
    let item = create_bt_item(dec!(300));

    c.bench_function("price_bt_item_derated", |b| {
        b.iter(|| {
            let result = calculator.price_item(black_box(&catalog), black_box(&tax), black_box(&item));
            black_box(result).unwrap();
        })
    });
}

fn bench_price_quote(c: &mut Criterion) {
    let catalog = Arc::new(create_catalog());
    let tax = create_tax();
    let mut group = c.benchmark_group("price_quote");

    for size in [8usize, 64, 512] {
        let items: Vec<ItemConfiguration> = (0..size)
            .map(|i| if i % 2 == 0 { create_mt_item() } else { create_bt_item(Decimal::from(BT_TIERS[i % 11])) })
            .collect();

        // Default threshold switches to rayon above 32 items
        let engine = QuoteEngine::new(EngineConfig::default(), catalog.clone());
        group.bench_with_input(BenchmarkId::from_parameter(size), &items, |b, items| {
            b.iter(|| black_box(engine.price_quote(black_box(&tax), black_box(items))).unwrap())
        });
    }
    group.finish();
}

fn create_catalog() -> Catalog {
    let mut entries = vec![CatalogEntry {
        id: "mt-150-24".to_string(),
        description: "TRAFO MT 150 kVA 24kV".to_string(),
        product_line: ProductLine::Mt,
        product: None,
        material: None,
        nominal_power: dec!(150),
        losses_code: None,
        voltage_class: "24kV".to_string(),
        base_price: dec!(26000),
        transformer_fraction: dec!(0.08),
        box_fraction: dec!(0.04),
        ip_low_value: dec!(1500),
        ip_high_value: dec!(3400),
        box_cost: Decimal::ZERO,
        projection_code_cost: None,
        projection_code_box: None,
    }];

    for power in BT_TIERS {
        entries.push(CatalogEntry {
            id: format!("bt-cu-{power}"),
            description: format!("TRAFO SECO {power} kVA COBRE"),
            product_line: ProductLine::Bt,
            product: Some("TRAFO SECO".to_string()),
            material: Some("COBRE".to_string()),
            nominal_power: Decimal::from(power),
            losses_code: None,
            voltage_class: "380/220V".to_string(),
            base_price: Decimal::from(power * 120),
            transformer_fraction: Decimal::ZERO,
            box_fraction: Decimal::ZERO,
            ip_low_value: Decimal::ZERO,
            ip_high_value: Decimal::ZERO,
            box_cost: Decimal::from(power * 15),
            projection_code_cost: None,
            projection_code_box: None,
        });
    }

    Catalog::new(entries).unwrap()
}

fn create_tax() -> TaxInputs {
    TaxInputs {
        profit_pct: dec!(10),
        icms_pct: dec!(18),
        commission_pct: dec!(3),
        freight_pct: dec!(2),
        difal_pct: dec!(4),
        poverty_fund_pct: dec!(2),
        icms_taxpayer: false,
    }
}

fn create_mt_item() -> ItemConfiguration {
    ItemConfiguration::new(CatalogRef::Id("mt-150-24".to_string()), KFactor::K6, IpRating::Ip23, 2)
        .with_accessories(vec![
            AccessorySelection::percentage(dec!(4), CalcBase::BasePrice1),
            AccessorySelection::percentage(dec!(1.5), CalcBase::RunningTotal),
            AccessorySelection::fixed(dec!(650), CalcBase::BasePrice1),
        ])
}

fn create_bt_item(power: Decimal) -> ItemConfiguration {
    ItemConfiguration::new(
        CatalogRef::Tier { product: "TRAFO SECO".to_string(), material: "COBRE".to_string(), power },
        KFactor::K13,
        IpRating::Ip21,
        1,
    )
    .with_bt_options(BtOptions {
        frequency_50hz: true,
        temperature_rise_test: true,
        flange_level: FlangeLevel::Double,
        ..Default::default()
    })
}

criterion_group!(benches, bench_price_mt_item, bench_price_bt_item, bench_price_quote);
criterion_main!(benches);

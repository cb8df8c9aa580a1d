use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal_macros::dec;

use ar_perceptions::core::*;
use ar_perceptions::partner::FiscalPosition;
use ar_perceptions::tax::*;

fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn company() -> Company {
    Company {
        id: 1,
        name: "Benchmark SA".into(),
        currency: Currency::new("ARS"),
    }
}

fn iva21() -> Tax {
    TaxBuilder::new(1, "IVA 21%", TaxGroup::Vat, dec!(21))
        .account(AccountId(2130))
        .refund_account(AccountId(2131))
        .build()
}

fn perception(slot: u32) -> Perception {
    let tax = TaxBuilder::new(20 + slot, format!("Perc {slot}"), TaxGroup::Perception, dec!(3))
        .account(AccountId(2150 + slot * 10))
        .refund_account(AccountId(2151 + slot * 10))
        .build();
    PerceptionBuilder::new(slot, format!("Perc {slot}"), "provincial", tax)
        .state("Buenos Aires")
        .build()
}

fn customer() -> Party {
    PartyBuilder::new(
        "Kunde SA",
        AddressBuilder::new("La Plata", "1900", "AR")
            .state("Buenos Aires")
            .build(),
    )
    .fiscal_position(FiscalPosition {
        id: 1,
        name: "Responsable Inscripto".into(),
        perceptions: (0..4).map(perception).collect(),
    })
    .build()
}

fn build_invoice(lines: usize, perceptions: usize) -> Invoice {
    let mut builder = InvoiceBuilder::new("BENCH-001", company())
        .issue_date(test_date())
        .currency(Currency::new("USD"))
        .partner(customer());

    for i in 1..=lines {
        builder = builder.add_line(
            LineItemBuilder::new(i.to_string(), format!("Item {i}"), dec!(2), dec!(9.99), AccountId(4100))
                .tax(iva21())
                .build(),
        );
    }
    for i in 0..perceptions {
        builder = builder.add_perception(
            PerceptionLineBuilder::new(perception((i % 4) as u32), dec!(100), dec!(3)).build(),
        );
    }

    builder.build().unwrap()
}

fn rates() -> RateTable {
    RateTable::new("ARS").with_rate("USD", test_date(), dec!(0.00112))
}

fn options() -> ComputeOptions {
    ComputeOptionsBuilder::new().today(test_date()).build()
}

fn bench_compute_taxes(c: &mut Criterion) {
    let invoice = build_invoice(10, 4);
    let rates = rates();
    let ctx = TaxContext::new(&rates, options());
    let hook = PerceptionTaxHook::new(StandardTaxHook);
    c.bench_function("compute_taxes_10_lines", |b| {
        b.iter(|| black_box(hook.compute_taxes(black_box(&invoice), &ctx)));
    });
}

fn bench_perception_aggregation_1000(c: &mut Criterion) {
    let invoice = build_invoice(1, 1000);
    let rates = rates();
    let ctx = TaxContext::new(&rates, options());
    c.bench_function("perception_aggregation_1000_lines", |b| {
        b.iter(|| black_box(compute_perception_invoice_taxes(black_box(&invoice), &ctx)));
    });
}

fn bench_recompute(c: &mut Criterion) {
    let invoice = build_invoice(10, 0);
    let rates = rates();
    let ctx = TaxContext::new(&rates, options());
    let hook = PerceptionTaxHook::new(StandardTaxHook);
    c.bench_function("recompute_from_partner", |b| {
        b.iter(|| {
            let mut inv = invoice.clone();
            black_box(hook.recompute(&mut inv, &ctx))
        });
    });
}

criterion_group!(
    benches,
    bench_compute_taxes,
    bench_perception_aggregation_1000,
    bench_recompute,
);
criterion_main!(benches);

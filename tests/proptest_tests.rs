//! Property-based tests for perception aggregation.
//!
//! Run with: `cargo test --test proptest_tests`

#![cfg(feature = "core")]

use std::collections::BTreeMap;

use ar_perceptions::core::*;
use ar_perceptions::partner::PartnerPerception;
use ar_perceptions::tax::*;
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn perception(slot: u32) -> Perception {
    let tax = TaxBuilder::new(20 + slot, format!("Perc {slot}"), TaxGroup::Perception, dec!(3))
        .account(AccountId(2150 + slot * 10))
        .refund_account(AccountId(2151 + slot * 10))
        .build();
    PerceptionBuilder::new(slot, format!("Perc {slot}"), "provincial", tax).build()
}

fn build(invoice_type: InvoiceType, lines: &[PerceptionLine]) -> Invoice {
    let company = Company {
        id: 1,
        name: "Yerbatera SA".into(),
        currency: Currency::new("ARS"),
    };
    let mut builder = InvoiceBuilder::new("FA-A 0001-00000001", company)
        .issue_date(date(2024, 6, 15))
        .invoice_type(invoice_type)
        .partner(
            PartyBuilder::new("Kunde SA", AddressBuilder::new("La Plata", "1900", "AR").build())
                .build(),
        );
    for line in lines {
        builder = builder.add_perception(line.clone());
    }
    builder.build().unwrap()
}

fn compute(invoice: &Invoice, compute_perceptions: bool) -> TaxGrouped {
    let rates = RateTable::new("ARS");
    let ctx = TaxContext::new(
        &rates,
        ComputeOptionsBuilder::new()
            .today(date(2024, 6, 20))
            .compute_perceptions(compute_perceptions)
            .build(),
    );
    PerceptionTaxHook::new(StandardTaxHook)
        .compute_taxes(invoice, &ctx)
        .unwrap()
}

// ── Proptest Strategies ─────────────────────────────────────────────────────

/// Amount in cents (0.00 to 99999.99).
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0u64..10_000_000u64).prop_map(|cents| Decimal::new(cents as i64, 2))
}

/// A perception line on one of four ledger accounts.
fn arb_line() -> impl Strategy<Value = PerceptionLine> {
    (0u32..4, arb_amount(), arb_amount()).prop_map(|(slot, base, amount)| {
        PerceptionLineBuilder::new(perception(slot), base, amount).build()
    })
}

fn arb_lines() -> impl Strategy<Value = Vec<PerceptionLine>> {
    prop::collection::vec(arb_line(), 0..=12)
}

// ── Property Tests ──────────────────────────────────────────────────────────

proptest! {
    /// One entry per account, holding the sum of its lines.
    #[test]
    fn one_entry_per_account(lines in arb_lines()) {
        let taxes = compute(&build(InvoiceType::OutInvoice, &lines), true);

        let mut expected: BTreeMap<AccountId, (Decimal, Decimal)> = BTreeMap::new();
        for line in &lines {
            let account = line.perception.tax.account.unwrap();
            let sums = expected.entry(account).or_default();
            sums.0 += line.base;
            sums.1 += line.amount;
        }

        prop_assert_eq!(taxes.perceptions().count(), expected.len());
        for (account, (base, amount)) in expected {
            let entry = taxes.get(&TaxKey::Perception(account)).unwrap();
            prop_assert_eq!(entry.base, base);
            prop_assert_eq!(entry.amount, amount);
        }
    }

    /// A credit note with the same lines yields the negated entries on refund accounts.
    #[test]
    fn credit_note_negates_entries(lines in arb_lines()) {
        let out = compute(&build(InvoiceType::OutInvoice, &lines), true);
        let back = compute(&build(InvoiceType::OutRefund, &lines), true);

        prop_assert_eq!(out.perceptions().count(), back.perceptions().count());
        for entry in out.perceptions() {
            let refund_account = AccountId(entry.account.0 + 1);
            let reversed = back.get(&TaxKey::Perception(refund_account)).unwrap();
            prop_assert_eq!(reversed.base, -entry.base);
            prop_assert_eq!(reversed.amount, -entry.amount);
        }
    }

    /// Switching perceptions off leaves no perception entry behind.
    #[test]
    fn disabled_perceptions_add_nothing(lines in arb_lines()) {
        let taxes = compute(&build(InvoiceType::OutInvoice, &lines), false);
        prop_assert_eq!(taxes.perceptions().count(), 0);
    }

    /// An exclusion never increases the perceived amount.
    #[test]
    fn exclusion_never_increases_amount(
        base in arb_amount(),
        percent in (0u32..=1000).prop_map(|p| Decimal::new(p as i64, 2)),
        excluded in (0u32..=100).prop_map(Decimal::from),
    ) {
        let mut party = PartyBuilder::new("Kunde SA", AddressBuilder::new("La Plata", "1900", "AR").build())
            .add_perception(PartnerPerception {
                perception: perception(0),
                activity: None,
                percent,
                excluded_percent: excluded,
                ex_date_from: None,
                ex_date_to: None,
                iibb_situation: None,
                from_registry: false,
            })
            .build();
        let applied = party.perceptions_to_apply(1).remove(&0).unwrap();
        let with_exclusion = applied.compute_amount(base, date(2024, 6, 15));

        party.perceptions[0].excluded_percent = Decimal::ZERO;
        let plain = party.perceptions_to_apply(1).remove(&0).unwrap().compute_amount(base, date(2024, 6, 15));

        prop_assert!(with_exclusion <= plain);
        prop_assert!(with_exclusion >= Decimal::ZERO);
    }
}

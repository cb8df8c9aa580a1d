#![cfg(feature = "core")]

use ar_perceptions::core::*;
use ar_perceptions::refund::{RefundOptions, prepare_refund};
use ar_perceptions::tax::*;
use chrono::NaiveDate;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn iibb_ba() -> Perception {
    let tax = TaxBuilder::new(20, "Perc IIBB Buenos Aires", TaxGroup::Perception, dec!(3))
        .account(AccountId(2150))
        .refund_account(AccountId(2151))
        .build();
    PerceptionBuilder::new(1, "IIBB Buenos Aires", "provincial", tax)
        .state("Buenos Aires")
        .build()
}

fn ganancias() -> Perception {
    let tax = TaxBuilder::new(23, "Perc Ganancias", TaxGroup::Perception, dec!(2))
        .account(AccountId(2170))
        .refund_account(AccountId(2171))
        .build();
    PerceptionBuilder::new(4, "Ganancias RG 830", "nacional", tax)
        .kind(PerceptionKind::Profit)
        .build()
}

fn invoice() -> Invoice {
    let company = Company {
        id: 1,
        name: "Yerbatera del Litoral SA".into(),
        currency: Currency::new("ARS"),
    };
    let partner = PartyBuilder::new(
        "Almacén Don Pepe SRL",
        AddressBuilder::new("La Plata", "1900", "AR")
            .state("Buenos Aires")
            .build(),
    )
    .vat("30712345679")
    .build();
    let iva = TaxBuilder::new(1, "IVA 21%", TaxGroup::Vat, dec!(21))
        .account(AccountId(2130))
        .refund_account(AccountId(2131))
        .build();

    InvoiceBuilder::new("FA-A 0001-00000200", company)
        .id(200)
        .issue_date(date(2024, 3, 10))
        .description("Pedido 4471")
        .journal_id(2)
        .partner(partner)
        .shipping_address(
            AddressBuilder::new("Mar del Plata", "7600", "AR")
                .street("Av. Independencia 2100")
                .state("Buenos Aires")
                .build(),
        )
        .add_line(
            LineItemBuilder::new("1", "Yerba mate 1kg", dec!(40), dec!(25), AccountId(4100))
                .tax(iva)
                .build(),
        )
        .add_perception(
            PerceptionLineBuilder::new(iibb_ba(), dec!(1000), dec!(30))
                .id(501)
                .concept(Concept {
                    id: 3,
                    name: "IIBB".into(),
                    kind: PerceptionKind::GrossIncome,
                })
                .tax_application(TaxApplication {
                    id: 1,
                    name: "Venta de bienes".into(),
                })
                .company_amounts(dec!(1000), dec!(30))
                .invoice_tax_id(77)
                .reg_code(212)
                .partner("Almacén Don Pepe SRL", Some("30712345679".into()))
                .company_id(1)
                .date(date(2024, 3, 10))
                .build(),
        )
        .add_perception(
            PerceptionLineBuilder::new(ganancias(), dec!(1000), dec!(20))
                .id(502)
                .manual(false)
                .build(),
        )
        .build()
        .unwrap()
}

#[test]
fn perception_lines_are_copied_field_by_field() {
    let source = invoice();
    let refund = prepare_refund(&source, &RefundOptions::default()).unwrap();

    assert_eq!(refund.perceptions.len(), source.perceptions.len());
    for (copied, original) in refund.perceptions.iter().zip(&source.perceptions) {
        assert_eq!(copied.id, None);
        let mut expected = original.clone();
        expected.id = None;
        assert_eq!(copied, &expected);
    }
}

#[test]
fn shipping_address_is_carried_over() {
    let source = invoice();
    let refund = prepare_refund(&source, &RefundOptions::default()).unwrap();
    assert_eq!(refund.shipping_address, source.shipping_address);
    assert_eq!(
        refund.shipping_address.as_ref().map(|a| a.city.as_str()),
        Some("Mar del Plata")
    );
}

#[test]
fn refund_header() {
    let source = invoice();
    let refund = prepare_refund(
        &source,
        &RefundOptions {
            number: Some("NC-A 0001-00000009".into()),
            issue_date: Some(date(2024, 4, 2)),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(refund.invoice_type, InvoiceType::OutRefund);
    assert_eq!(refund.number, "NC-A 0001-00000009");
    assert_eq!(refund.origin.as_deref(), Some("FA-A 0001-00000200"));
    assert_eq!(refund.issue_date, Some(date(2024, 4, 2)));
    assert_eq!(refund.description.as_deref(), Some("Pedido 4471"));
    assert_eq!(refund.journal_id, Some(2));
    assert_eq!(refund.lines.len(), 1);
}

#[test]
fn invoice_without_number_cannot_be_refunded() {
    let mut source = invoice();
    source.number = "  ".into();
    let err = prepare_refund(&source, &RefundOptions::default()).unwrap_err();
    assert!(matches!(err, PerceptionError::Validation(_)));
}

#[test]
fn refund_entries_mirror_invoice_entries() {
    let source = invoice();
    let refund = prepare_refund(
        &source,
        &RefundOptions {
            number: Some("NC-A 0001-00000009".into()),
            ..Default::default()
        },
    )
    .unwrap();

    let rates = RateTable::new("ARS");
    let ctx = TaxContext::new(
        &rates,
        ComputeOptionsBuilder::new().today(date(2024, 4, 2)).build(),
    );

    let original = compute_perception_invoice_taxes(&source, &ctx).unwrap();
    let reversed = compute_perception_invoice_taxes(&refund, &ctx).unwrap();
    assert_eq!(original.len(), reversed.len());

    for (account, refund_account) in [(2150, 2151), (2170, 2171)] {
        let out = original.get(&TaxKey::Perception(AccountId(account))).unwrap();
        let back = reversed
            .get(&TaxKey::Perception(AccountId(refund_account)))
            .unwrap();
        assert_eq!(back.base, -out.base);
        assert_eq!(back.amount, -out.amount);
    }
}

#[test]
fn refunding_a_credit_note_restores_the_sign() {
    let source = invoice();
    let refund = prepare_refund(&source, &RefundOptions::default()).unwrap();
    let back = prepare_refund(
        &Invoice {
            number: "NC-A 0001-00000009".into(),
            ..refund
        },
        &RefundOptions::default(),
    )
    .unwrap();

    assert_eq!(back.invoice_type, InvoiceType::OutInvoice);
    assert_eq!(back.sign(), dec!(1));
    assert_eq!(back.perceptions[0].amount, dec!(30));
}

#[test]
fn company_amounts_keep_invoice_sign_until_refreshed() {
    let source = invoice();
    let mut refund = prepare_refund(&source, &RefundOptions::default()).unwrap();
    assert_eq!(refund.perceptions[0].base_amount, dec!(1000));
    assert_eq!(refund.perceptions[0].tax_amount, dec!(30));

    let rates = RateTable::new("ARS");
    let ctx = TaxContext::new(
        &rates,
        ComputeOptionsBuilder::new().today(date(2024, 4, 2)).build(),
    );
    let snapshot = refund.clone();
    for line in &mut refund.perceptions {
        line.fill_company_amounts(&snapshot, &ctx).unwrap();
    }
    assert_eq!(refund.perceptions[0].base_amount, dec!(-1000));
    assert_eq!(refund.perceptions[0].tax_amount, dec!(-30));
    assert_eq!(refund.perceptions[1].tax_amount, dec!(-20));
}

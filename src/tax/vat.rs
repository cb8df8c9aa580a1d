//! VAT phase: the host's standard line-tax computation.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{TaxContext, TaxEntry, TaxGrouped, TaxHook, TaxKey};
use crate::core::{AccountId, Invoice, PerceptionError, TaxGroup};

/// Sequence of tax entries computed from invoice lines.
const LINE_TAX_SEQUENCE: u32 = 1;

/// Standard tax computation: groups line taxes by tax and account.
///
/// Perception taxes are never computed from lines; they come from the
/// invoice's perception lines in the second phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTaxHook;

impl TaxHook for StandardTaxHook {
    fn compute_taxes(
        &self,
        invoice: &Invoice,
        _ctx: &TaxContext<'_>,
    ) -> Result<TaxGrouped, PerceptionError> {
        let mut grouped = TaxGrouped::new();

        for line in &invoice.lines {
            let base = line.subtotal();
            for tax in line
                .taxes
                .iter()
                .filter(|t| t.group != TaxGroup::Perception)
            {
                let account = if invoice.is_refund() {
                    tax.refund_account
                } else {
                    tax.account
                }
                .unwrap_or(line.account);

                let entry = TaxEntry {
                    group: tax.group,
                    name: tax.name.clone(),
                    tax_id: tax.id,
                    account,
                    base,
                    amount: base * tax.rate / Decimal::ONE_HUNDRED,
                    manual: false,
                    sequence: LINE_TAX_SEQUENCE,
                    is_exempt: tax.is_exempt,
                    invoice_id: invoice.id,
                };
                grouped.accumulate(
                    TaxKey::Tax {
                        tax_id: tax.id,
                        account,
                    },
                    entry,
                );
            }
        }

        grouped.round_with(|v| invoice.currency.round(v));
        tracing::debug!(
            invoice = %invoice.number,
            entries = grouped.len(),
            "computed line taxes"
        );
        Ok(grouped)
    }
}

/// VAT detail of one tax on one line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineVatTax {
    pub name: String,
    /// Base in invoice currency.
    pub base: Decimal,
    /// Amount in invoice currency.
    pub amount: Decimal,
    /// Base in company currency (unrounded).
    pub base_amount: Decimal,
    /// Amount in company currency (unrounded).
    pub tax_amount: Decimal,
    pub account: AccountId,
}

/// VAT summary of one invoice line, as printed on fiscal documents.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LineVatSummary {
    /// Unit price after discount.
    pub price_unit: Decimal,
    pub amount_untaxed: Decimal,
    pub amount_total: Decimal,
    /// Part of the subtotal not subject to VAT.
    pub amount_no_taxed: Decimal,
    /// Part of the subtotal under exempt VAT taxes.
    pub amount_exempt: Decimal,
    /// Part of the subtotal under non-exempt VAT taxes.
    pub amount_taxed: Decimal,
    /// VAT detail keyed by tax id.
    pub vat_taxes: BTreeMap<u32, LineVatTax>,
}

/// Per-line VAT breakdown, keyed by line id. Only VAT-group taxes count.
pub fn compute_line_vat(
    invoice: &Invoice,
    ctx: &TaxContext<'_>,
) -> Result<BTreeMap<String, LineVatSummary>, PerceptionError> {
    let date = ctx.date_for(invoice);
    let currency = &invoice.currency;
    let company_currency = &invoice.company.currency;

    let mut result = BTreeMap::new();
    for line in &invoice.lines {
        let price_unit = line.price_unit_after_discount();
        let amount_untaxed = line.subtotal();

        let mut vat_taxes = BTreeMap::new();
        let mut amount_tax = Decimal::ZERO;
        let mut amount_taxed = Decimal::ZERO;
        let mut amount_exempt = Decimal::ZERO;

        for tax in line.taxes.iter().filter(|t| t.group == TaxGroup::Vat) {
            let base = amount_untaxed;
            let amount = currency.round(base * tax.rate / Decimal::ONE_HUNDRED);
            let converter = ctx.converter();

            vat_taxes.insert(
                tax.id,
                LineVatTax {
                    name: tax.name.clone(),
                    base,
                    amount,
                    base_amount: converter.compute(base, currency, company_currency, date, false)?,
                    tax_amount: converter.compute(amount, currency, company_currency, date, false)?,
                    account: tax.account.unwrap_or(line.account),
                },
            );

            amount_tax += amount;
            if tax.is_exempt {
                amount_exempt += base;
            } else {
                amount_taxed += base;
            }
        }

        result.insert(
            line.id.clone(),
            LineVatSummary {
                price_unit,
                amount_untaxed,
                amount_total: amount_untaxed + amount_tax,
                amount_no_taxed: amount_untaxed - amount_taxed - amount_exempt,
                amount_exempt,
                amount_taxed,
                vat_taxes,
            },
        );
    }

    Ok(result)
}

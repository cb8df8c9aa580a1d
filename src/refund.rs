//! Credit-note preparation.
//!
//! Refunding an invoice copies its perception lines as they are: amounts stay
//! unsigned on the credit note, and the aggregator negates them through the
//! document sign.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{Invoice, PerceptionError, PerceptionLine};

/// Overrides for the credit note.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefundOptions {
    /// Number of the credit note; empty until the host assigns one.
    pub number: Option<String>,
    /// Credit note date; defaults to the refunded invoice's date.
    pub issue_date: Option<NaiveDate>,
    /// Accounting date.
    pub accounting_date: Option<NaiveDate>,
    /// Reason; defaults to the refunded invoice's description.
    pub description: Option<String>,
    /// Journal; defaults to the refunded invoice's journal.
    pub journal_id: Option<u32>,
}

/// Build the credit note reversing `invoice`.
///
/// The shipping address and every perception line are carried over; lines
/// lose their record ids since they belong to a new document.
///
/// `base_amount` and `tax_amount` are copied as recorded on the invoice, so
/// they keep the invoice's sign. Call
/// [`PerceptionLine::fill_company_amounts`] on the credit note to get the
/// values signed for it.
pub fn prepare_refund(invoice: &Invoice, options: &RefundOptions) -> Result<Invoice, PerceptionError> {
    if invoice.number.trim().is_empty() {
        return Err(PerceptionError::Validation(
            "cannot refund an invoice without number".into(),
        ));
    }

    let perceptions = invoice.perceptions.iter().map(refund_line).collect();

    let refund = Invoice {
        id: None,
        number: options.number.clone().unwrap_or_default(),
        issue_date: options.issue_date.or(invoice.issue_date),
        invoice_type: invoice.invoice_type.refund_type(),
        currency: invoice.currency.clone(),
        company: invoice.company.clone(),
        partner: invoice.partner.clone(),
        shipping_address: invoice.shipping_address.clone(),
        lines: invoice.lines.clone(),
        perceptions,
        origin: Some(invoice.number.clone()),
        description: options
            .description
            .clone()
            .or_else(|| invoice.description.clone()),
        accounting_date: options.accounting_date,
        journal_id: options.journal_id.or(invoice.journal_id),
    };

    tracing::debug!(
        invoice = %invoice.number,
        perceptions = refund.perceptions.len(),
        "prepared credit note"
    );
    Ok(refund)
}

fn refund_line(p: &PerceptionLine) -> PerceptionLine {
    PerceptionLine {
        id: None,
        name: p.name.clone(),
        perception: p.perception.clone(),
        concept: p.concept.clone(),
        tax_application: p.tax_application.clone(),
        base: p.base,
        amount: p.amount,
        base_amount: p.base_amount,
        tax_amount: p.tax_amount,
        account: p.account,
        invoice_tax_id: p.invoice_tax_id,
        manual: p.manual,
        reg_code: p.reg_code,
        state: p.state.clone(),
        partner: p.partner.clone(),
        vat: p.vat.clone(),
        company_id: p.company_id,
        date: p.date,
    }
}

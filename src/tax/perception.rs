//! Perception phase: aggregation of perception lines into tax entries.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{TaxContext, TaxEntry, TaxGrouped, TaxHook, TaxKey};
use crate::core::{
    Currency, Invoice, Jurisdiction, PerceptionBase, PerceptionError, PerceptionLine, TaxGroup,
};
use crate::partner::AppliedPerception;

/// Tax entries produced by the VAT phase.
///
/// Only [`PerceptionTaxHook`] creates this value, by running its inner hook,
/// so a perception phase can never run ahead of the VAT phase.
#[derive(Debug, Clone, PartialEq)]
pub struct VatTaxes {
    grouped: TaxGrouped,
}

impl VatTaxes {
    fn new(grouped: TaxGrouped) -> Self {
        Self { grouped }
    }

    pub fn grouped(&self) -> &TaxGrouped {
        &self.grouped
    }

    /// Total VAT amount, the base of VAT perceptions.
    pub fn vat_amount(&self) -> Decimal {
        self.grouped.group(TaxGroup::Vat).map(|e| e.amount).sum()
    }

    pub fn into_grouped(self) -> TaxGrouped {
        self.grouped
    }
}

/// Everything the perception phase needs to know about the invoice.
#[derive(Debug, Clone)]
pub struct PerceptionScope<'a> {
    pub currency: &'a Currency,
    pub company_currency: &'a Currency,
    /// +1 for invoices, -1 for credit notes.
    pub sign: Decimal,
    pub invoice_id: Option<u32>,
    /// Date of the conversion rates.
    pub date: NaiveDate,
}

impl<'a> PerceptionScope<'a> {
    pub fn of(invoice: &'a Invoice, ctx: &TaxContext<'_>) -> Self {
        Self {
            currency: &invoice.currency,
            company_currency: &invoice.company.currency,
            sign: invoice.sign(),
            invoice_id: invoice.id,
            date: ctx.date_for(invoice),
        }
    }

    fn to_company(&self, value: Decimal, ctx: &TaxContext<'_>) -> Result<Decimal, PerceptionError> {
        ctx.converter()
            .compute(value, self.currency, self.company_currency, self.date, false)
    }
}

/// Build the (unrounded) tax entry of a single perception line.
///
/// Base and amount are signed and converted to company currency without
/// rounding. Credit notes post to the tax's refund account.
pub fn prepare_perception_tax_line(
    line: &PerceptionLine,
    scope: &PerceptionScope<'_>,
    ctx: &TaxContext<'_>,
) -> Result<TaxEntry, PerceptionError> {
    let tax = &line.perception.tax;

    let account = if scope.sign > Decimal::ZERO {
        tax.account.ok_or_else(|| PerceptionError::MissingAccount {
            perception: line.perception.name.clone(),
            tax: tax.name.clone(),
        })?
    } else {
        tax.refund_account
            .ok_or_else(|| PerceptionError::MissingRefundAccount {
                perception: line.perception.name.clone(),
                tax: tax.name.clone(),
            })?
    };

    Ok(TaxEntry {
        group: TaxGroup::Perception,
        name: line.name.clone(),
        tax_id: tax.id,
        account,
        base: scope.to_company(line.base * scope.sign, ctx)?,
        amount: scope.to_company(line.amount * scope.sign, ctx)?,
        manual: false,
        sequence: ctx.options().sequence,
        is_exempt: false,
        invoice_id: scope.invoice_id,
    })
}

/// Group perception lines by ledger account, then round each entry once.
pub fn compute_perception_taxes(
    perceptions: &[PerceptionLine],
    scope: &PerceptionScope<'_>,
    ctx: &TaxContext<'_>,
) -> Result<TaxGrouped, PerceptionError> {
    let mut grouped = TaxGrouped::new();

    for line in perceptions {
        let entry = prepare_perception_tax_line(line, scope, ctx)?;
        tracing::trace!(
            line = %line.name,
            account = %entry.account,
            base = %entry.base,
            amount = %entry.amount,
            "perception contribution"
        );
        grouped.accumulate(TaxKey::Perception(entry.account), entry);
    }

    grouped.round_with(|v| scope.currency.round(v));
    Ok(grouped)
}

/// Perception tax entries of `invoice`, keyed by account.
pub fn compute_perception_invoice_taxes(
    invoice: &Invoice,
    ctx: &TaxContext<'_>,
) -> Result<TaxGrouped, PerceptionError> {
    let scope = PerceptionScope::of(invoice, ctx);
    compute_perception_taxes(&invoice.perceptions, &scope, ctx)
}

impl PerceptionLine {
    /// Signed company-currency `(tax_amount, base_amount)` of this line on `invoice`.
    pub fn compute(
        &self,
        invoice: &Invoice,
        ctx: &TaxContext<'_>,
    ) -> Result<(Decimal, Decimal), PerceptionError> {
        let scope = PerceptionScope::of(invoice, ctx);
        let base_amount = scope.to_company(self.base * scope.sign, ctx)?;
        let tax_amount = scope.to_company(self.amount * scope.sign, ctx)?;
        Ok((tax_amount, base_amount))
    }

    /// Fill `tax_amount` and `base_amount` from [`compute`](Self::compute).
    pub fn fill_company_amounts(
        &mut self,
        invoice: &Invoice,
        ctx: &TaxContext<'_>,
    ) -> Result<(), PerceptionError> {
        let (tax_amount, base_amount) = self.compute(invoice, ctx)?;
        self.tax_amount = tax_amount;
        self.base_amount = base_amount;
        Ok(())
    }
}

/// Create automatic perception lines from the partner's configuration.
///
/// Provincial perceptions of another province than the shipping address are
/// skipped, as are perceptions whose amount rounds to zero.
pub fn create_perceptions_from_partner(
    invoice: &Invoice,
    vat: &VatTaxes,
    ctx: &TaxContext<'_>,
) -> Result<Vec<PerceptionLine>, PerceptionError> {
    let date = ctx.date_for(invoice);
    let untaxed = invoice.amount_untaxed();
    let vat_amount = vat.vat_amount();
    let shipping_state = invoice
        .shipping_address
        .as_ref()
        .and_then(|a| a.state.as_deref());

    let mut lines = Vec::new();
    for applied in invoice.partner.perceptions_to_apply(invoice.company.id).into_values() {
        let perception = &applied.perception;
        let jurisdiction =
            perception
                .jurisdiction()
                .ok_or_else(|| PerceptionError::UnknownJurisdiction {
                    line: perception.name.clone(),
                    value: perception.jurisdiction.clone(),
                })?;

        if jurisdiction == Jurisdiction::Provincial {
            if let (Some(levied_by), Some(shipped_to)) = (perception.state.as_deref(), shipping_state)
            {
                if levied_by != shipped_to {
                    tracing::debug!(
                        perception = %perception.name,
                        levied_by,
                        shipped_to,
                        "skipping perception of another province"
                    );
                    continue;
                }
            }
        }

        let base = match perception.base {
            PerceptionBase::Untaxed => untaxed,
            PerceptionBase::Vat => vat_amount,
        };
        let amount = invoice.currency.round(applied.compute_amount(base, date));
        if amount.is_zero() {
            tracing::warn!(
                perception = %perception.name,
                %base,
                "perception amount is zero, not applied"
            );
            continue;
        }

        let mut line = automatic_line(&applied, invoice, invoice.currency.round(base), amount, date);
        line.fill_company_amounts(invoice, ctx)?;
        lines.push(line);
    }

    Ok(lines)
}

fn automatic_line(
    applied: &AppliedPerception,
    invoice: &Invoice,
    base: Decimal,
    amount: Decimal,
    date: NaiveDate,
) -> PerceptionLine {
    let perception = applied.perception.clone();
    PerceptionLine {
        id: None,
        name: perception.name.clone(),
        account: perception.tax.account,
        state: perception.state.clone(),
        perception,
        concept: None,
        tax_application: None,
        base,
        amount,
        base_amount: Decimal::ZERO,
        tax_amount: Decimal::ZERO,
        invoice_tax_id: None,
        manual: false,
        reg_code: None,
        partner: Some(invoice.partner.name.clone()),
        vat: invoice.partner.vat.clone(),
        company_id: Some(invoice.company.id),
        date: Some(date),
    }
}

/// Wraps the host's tax hook and adds perception entries in a second phase.
///
/// The inner hook runs with perceptions switched off in the context; its
/// output becomes the [`VatTaxes`] the perception phase builds on.
#[derive(Debug, Clone, Default)]
pub struct PerceptionTaxHook<H> {
    inner: H,
}

impl<H: TaxHook> PerceptionTaxHook<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    /// Phase one: the inner hook's taxes, computed without perceptions.
    pub fn vat_phase(
        &self,
        invoice: &Invoice,
        ctx: &TaxContext<'_>,
    ) -> Result<VatTaxes, PerceptionError> {
        let grouped = self
            .inner
            .compute_taxes(invoice, &ctx.without_perceptions())?;
        tracing::debug!(
            invoice = %invoice.number,
            entries = grouped.len(),
            "vat phase done"
        );
        Ok(VatTaxes::new(grouped))
    }

    /// Phase two: merge the perception entries into the VAT result.
    /// A no-op when the context disables perceptions.
    pub fn perception_phase(
        &self,
        invoice: &Invoice,
        ctx: &TaxContext<'_>,
        vat: VatTaxes,
    ) -> Result<TaxGrouped, PerceptionError> {
        let mut grouped = vat.into_grouped();
        if !ctx.options().compute_perceptions {
            tracing::debug!(invoice = %invoice.number, "perceptions disabled, skipping");
            return Ok(grouped);
        }

        let perceptions = compute_perception_invoice_taxes(invoice, ctx)?;
        tracing::debug!(
            invoice = %invoice.number,
            lines = invoice.perceptions.len(),
            entries = perceptions.len(),
            "perception phase done"
        );
        grouped.extend(perceptions);
        Ok(grouped)
    }

    /// Regenerate automatic perception lines and compute all taxes.
    ///
    /// Manual lines are kept. Automatic lines are only generated on
    /// customer documents, from the partner configuration and the VAT
    /// computed in phase one.
    pub fn recompute(
        &self,
        invoice: &mut Invoice,
        ctx: &TaxContext<'_>,
    ) -> Result<TaxGrouped, PerceptionError> {
        let vat = self.vat_phase(invoice, ctx)?;

        if ctx.options().compute_perceptions && invoice.invoice_type.is_sale() {
            let generated = create_perceptions_from_partner(invoice, &vat, ctx)?;
            invoice.perceptions.retain(|line| line.manual);
            tracing::debug!(
                invoice = %invoice.number,
                generated = generated.len(),
                "automatic perceptions refreshed"
            );
            invoice.perceptions.extend(generated);
        }

        self.perception_phase(invoice, ctx, vat)
    }
}

impl<H: TaxHook> TaxHook for PerceptionTaxHook<H> {
    fn compute_taxes(
        &self,
        invoice: &Invoice,
        ctx: &TaxContext<'_>,
    ) -> Result<TaxGrouped, PerceptionError> {
        let vat = self.vat_phase(invoice, ctx)?;
        self.perception_phase(invoice, ctx, vat)
    }
}

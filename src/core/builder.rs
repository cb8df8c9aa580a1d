use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::currencies::Currency;
use super::error::{PerceptionError, join_errors};
use super::types::*;
use super::validation;
use crate::partner::{FiscalPosition, PartnerPerception};

/// Builder for constructing invoices.
///
/// ```
/// use ar_perceptions::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let company = Company { id: 1, name: "Yerbatera SA".into(), currency: Currency::new("ARS") };
/// let iva = TaxBuilder::new(1, "IVA 21%", TaxGroup::Vat, dec!(21))
///     .account(AccountId(2130))
///     .refund_account(AccountId(2131))
///     .build();
///
/// let invoice = InvoiceBuilder::new("FA-A 0001-00000001", company)
///     .issue_date(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
///     .partner(PartyBuilder::new("Kunde SA", AddressBuilder::new("La Plata", "1900", "AR").build())
///         .vat("30712345679")
///         .build())
///     .add_line(LineItemBuilder::new("1", "Yerba 1kg", dec!(10), dec!(150), AccountId(4100))
///         .tax(iva)
///         .build())
///     .build()
///     .unwrap();
///
/// assert_eq!(invoice.amount_untaxed(), dec!(1500));
/// ```
pub struct InvoiceBuilder {
    id: Option<u32>,
    number: String,
    issue_date: Option<NaiveDate>,
    invoice_type: InvoiceType,
    currency: Currency,
    company: Company,
    partner: Option<Party>,
    shipping_address: Option<Address>,
    lines: Vec<LineItem>,
    perceptions: Vec<PerceptionLine>,
    origin: Option<String>,
    description: Option<String>,
    accounting_date: Option<NaiveDate>,
    journal_id: Option<u32>,
}

impl InvoiceBuilder {
    /// New customer invoice in the company currency.
    pub fn new(number: impl Into<String>, company: Company) -> Self {
        Self {
            id: None,
            number: number.into(),
            issue_date: None,
            invoice_type: InvoiceType::OutInvoice,
            currency: company.currency.clone(),
            company,
            partner: None,
            shipping_address: None,
            lines: Vec::new(),
            perceptions: Vec::new(),
            origin: None,
            description: None,
            accounting_date: None,
            journal_id: None,
        }
    }

    pub fn id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn issue_date(mut self, date: NaiveDate) -> Self {
        self.issue_date = Some(date);
        self
    }

    pub fn invoice_type(mut self, invoice_type: InvoiceType) -> Self {
        self.invoice_type = invoice_type;
        self
    }

    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Set the partner. The shipping address defaults to its delivery address.
    pub fn partner(mut self, party: Party) -> Self {
        self.shipping_address = Some(party.delivery_address().clone());
        self.partner = Some(party);
        self
    }

    /// Override the shipping address. Call after [`partner`](Self::partner).
    pub fn shipping_address(mut self, address: Address) -> Self {
        self.shipping_address = Some(address);
        self
    }

    pub fn add_line(mut self, line: LineItem) -> Self {
        self.lines.push(line);
        self
    }

    pub fn add_perception(mut self, line: PerceptionLine) -> Self {
        self.perceptions.push(line);
        self
    }

    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn accounting_date(mut self, date: NaiveDate) -> Self {
        self.accounting_date = Some(date);
        self
    }

    pub fn journal_id(mut self, journal_id: u32) -> Self {
        self.journal_id = Some(journal_id);
        self
    }

    /// Build the invoice and run perception validation.
    /// Returns all validation errors (not just the first).
    pub fn build(self) -> Result<Invoice, PerceptionError> {
        let invoice = self.build_unchecked()?;

        let errors = validation::validate_invoice(&invoice);
        if !errors.is_empty() {
            return Err(join_errors(&errors));
        }

        Ok(invoice)
    }

    /// Build without validation, e.g. when importing host records as they are.
    pub fn build_unchecked(self) -> Result<Invoice, PerceptionError> {
        let partner = self
            .partner
            .ok_or_else(|| PerceptionError::Builder("partner is required".into()))?;

        if self.number.len() > 200 {
            return Err(PerceptionError::Builder(
                "invoice number cannot exceed 200 characters".into(),
            ));
        }

        Ok(Invoice {
            id: self.id,
            number: self.number,
            issue_date: self.issue_date,
            invoice_type: self.invoice_type,
            currency: self.currency,
            company: self.company,
            partner,
            shipping_address: self.shipping_address,
            lines: self.lines,
            perceptions: self.perceptions,
            origin: self.origin,
            description: self.description,
            accounting_date: self.accounting_date,
            journal_id: self.journal_id,
        })
    }
}

/// Builder for Party (customer/supplier).
pub struct PartyBuilder {
    id: Option<u32>,
    name: String,
    vat: Option<String>,
    lang: Option<String>,
    iibb_number: Option<String>,
    address: Address,
    delivery_address: Option<Address>,
    fiscal_position: Option<FiscalPosition>,
    perceptions: Vec<PartnerPerception>,
}

impl PartyBuilder {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            id: None,
            name: name.into(),
            vat: None,
            lang: None,
            iibb_number: None,
            address,
            delivery_address: None,
            fiscal_position: None,
            perceptions: Vec::new(),
        }
    }

    pub fn id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    /// CUIT.
    pub fn vat(mut self, vat: impl Into<String>) -> Self {
        self.vat = Some(vat.into());
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn iibb_number(mut self, number: impl Into<String>) -> Self {
        self.iibb_number = Some(number.into());
        self
    }

    pub fn delivery_address(mut self, address: Address) -> Self {
        self.delivery_address = Some(address);
        self
    }

    pub fn fiscal_position(mut self, position: FiscalPosition) -> Self {
        self.fiscal_position = Some(position);
        self
    }

    pub fn add_perception(mut self, perception: PartnerPerception) -> Self {
        self.perceptions.push(perception);
        self
    }

    pub fn build(self) -> Party {
        Party {
            id: self.id,
            name: self.name,
            vat: self.vat,
            lang: self.lang,
            iibb_number: self.iibb_number,
            address: self.address,
            delivery_address: self.delivery_address,
            fiscal_position: self.fiscal_position,
            perceptions: self.perceptions,
        }
    }
}

/// Builder for Address.
pub struct AddressBuilder {
    street: Option<String>,
    city: String,
    postal_code: String,
    state: Option<String>,
    country_code: String,
}

impl AddressBuilder {
    pub fn new(
        city: impl Into<String>,
        postal_code: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            street: None,
            city: city.into(),
            postal_code: postal_code.into(),
            state: None,
            country_code: country_code.into(),
        }
    }

    pub fn street(mut self, street: impl Into<String>) -> Self {
        self.street = Some(street.into());
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn build(self) -> Address {
        Address {
            street: self.street,
            city: self.city,
            postal_code: self.postal_code,
            state: self.state,
            country_code: self.country_code,
        }
    }
}

/// Builder for LineItem.
pub struct LineItemBuilder {
    id: String,
    name: String,
    quantity: Decimal,
    unit_price: Decimal,
    discount: Decimal,
    account: AccountId,
    taxes: Vec<Tax>,
}

impl LineItemBuilder {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
        account: AccountId,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            quantity,
            unit_price,
            discount: Decimal::ZERO,
            account,
            taxes: Vec::new(),
        }
    }

    /// Discount percentage.
    pub fn discount(mut self, percent: Decimal) -> Self {
        self.discount = percent;
        self
    }

    pub fn tax(mut self, tax: Tax) -> Self {
        self.taxes.push(tax);
        self
    }

    pub fn build(self) -> LineItem {
        LineItem {
            id: self.id,
            name: self.name,
            quantity: self.quantity,
            unit_price: self.unit_price,
            discount: self.discount,
            account: self.account,
            taxes: self.taxes,
        }
    }
}

/// Builder for Tax.
pub struct TaxBuilder {
    tax: Tax,
}

impl TaxBuilder {
    pub fn new(id: u32, name: impl Into<String>, group: TaxGroup, rate: Decimal) -> Self {
        Self {
            tax: Tax {
                id,
                name: name.into(),
                group,
                rate,
                is_exempt: false,
                account: None,
                refund_account: None,
            },
        }
    }

    pub fn account(mut self, account: AccountId) -> Self {
        self.tax.account = Some(account);
        self
    }

    pub fn refund_account(mut self, account: AccountId) -> Self {
        self.tax.refund_account = Some(account);
        self
    }

    pub fn exempt(mut self) -> Self {
        self.tax.is_exempt = true;
        self
    }

    pub fn build(self) -> Tax {
        self.tax
    }
}

/// Builder for Perception definitions.
pub struct PerceptionBuilder {
    perception: Perception,
}

impl PerceptionBuilder {
    /// `jurisdiction` is the stored value: "nacional", "provincial" or "municipal".
    pub fn new(id: u32, name: impl Into<String>, jurisdiction: impl Into<String>, tax: Tax) -> Self {
        Self {
            perception: Perception {
                id,
                name: name.into(),
                jurisdiction: jurisdiction.into(),
                kind: PerceptionKind::GrossIncome,
                tax,
                base: PerceptionBase::Untaxed,
                state: None,
                company_id: None,
            },
        }
    }

    pub fn kind(mut self, kind: PerceptionKind) -> Self {
        self.perception.kind = kind;
        self
    }

    pub fn base(mut self, base: PerceptionBase) -> Self {
        self.perception.base = base;
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.perception.state = Some(state.into());
        self
    }

    pub fn company_id(mut self, company_id: u32) -> Self {
        self.perception.company_id = Some(company_id);
        self
    }

    pub fn build(self) -> Perception {
        self.perception
    }
}

/// Builder for PerceptionLine.
///
/// Lines are manual by default; the name, account and province are taken
/// from the perception unless overridden.
pub struct PerceptionLineBuilder {
    line: PerceptionLine,
}

impl PerceptionLineBuilder {
    pub fn new(perception: Perception, base: Decimal, amount: Decimal) -> Self {
        Self {
            line: PerceptionLine {
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
                manual: true,
                reg_code: None,
                partner: None,
                vat: None,
                company_id: None,
                date: None,
            },
        }
    }

    pub fn id(mut self, id: u32) -> Self {
        self.line.id = Some(id);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.line.name = name.into();
        self
    }

    pub fn concept(mut self, concept: Concept) -> Self {
        self.line.concept = Some(concept);
        self
    }

    pub fn tax_application(mut self, application: TaxApplication) -> Self {
        self.line.tax_application = Some(application);
        self
    }

    /// Company-currency amounts, as recorded by the host.
    pub fn company_amounts(mut self, base_amount: Decimal, tax_amount: Decimal) -> Self {
        self.line.base_amount = base_amount;
        self.line.tax_amount = tax_amount;
        self
    }

    pub fn account(mut self, account: AccountId) -> Self {
        self.line.account = Some(account);
        self
    }

    pub fn invoice_tax_id(mut self, id: u32) -> Self {
        self.line.invoice_tax_id = Some(id);
        self
    }

    pub fn manual(mut self, manual: bool) -> Self {
        self.line.manual = manual;
        self
    }

    pub fn reg_code(mut self, code: i32) -> Self {
        self.line.reg_code = Some(code);
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.line.state = Some(state.into());
        self
    }

    pub fn partner(mut self, name: impl Into<String>, vat: Option<String>) -> Self {
        self.line.partner = Some(name.into());
        self.line.vat = vat;
        self
    }

    pub fn company_id(mut self, company_id: u32) -> Self {
        self.line.company_id = Some(company_id);
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.line.date = Some(date);
        self
    }

    pub fn build(self) -> PerceptionLine {
        self.line
    }
}

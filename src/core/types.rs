use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::currencies::Currency;
use super::error::PerceptionError;
use super::jurisdiction::Jurisdiction;
use crate::partner::{FiscalPosition, PartnerPerception};

/// Ledger account identifier (as assigned by the host's chart of accounts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub u32);

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Invoice: the document perceptions are levied on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Host record id, if the invoice is persisted.
    pub id: Option<u32>,
    /// Document number (e.g. "FA-A 0001-00000042").
    pub number: String,
    /// Invoice date. When absent, computations use the context's "today".
    pub issue_date: Option<NaiveDate>,
    /// Direction and kind of document.
    pub invoice_type: InvoiceType,
    /// Invoice currency.
    pub currency: Currency,
    /// Issuing company (owns the company currency).
    pub company: Company,
    /// Customer or supplier.
    pub partner: Party,
    /// Shipping address; gross-income perceptions depend on the delivery province.
    pub shipping_address: Option<Address>,
    /// Invoice lines.
    pub lines: Vec<LineItem>,
    /// Perception lines recorded on the invoice.
    pub perceptions: Vec<PerceptionLine>,
    /// Source document (set on credit notes to the refunded invoice number).
    pub origin: Option<String>,
    /// Free-text reference / reason.
    pub description: Option<String>,
    /// Accounting date, if different from the invoice date.
    pub accounting_date: Option<NaiveDate>,
    /// Journal the invoice is posted in.
    pub journal_id: Option<u32>,
}

impl Invoice {
    /// +1 for invoices, -1 for credit notes.
    pub fn sign(&self) -> Decimal {
        self.invoice_type.sign()
    }

    /// True for credit notes.
    pub fn is_refund(&self) -> bool {
        self.invoice_type.is_refund()
    }

    /// Date used for rate lookups: the invoice date, or `today` when unset.
    pub fn effective_date(&self, today: NaiveDate) -> NaiveDate {
        self.issue_date.unwrap_or(today)
    }

    /// Sum of line subtotals (after discount, before taxes).
    pub fn amount_untaxed(&self) -> Decimal {
        self.lines.iter().map(LineItem::subtotal).sum()
    }

    /// Change the partner and pick its delivery address as shipping address.
    pub fn set_partner(&mut self, partner: Party) {
        self.shipping_address = Some(partner.delivery_address().clone());
        self.partner = partner;
    }
}

/// Invoice direction and kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceType {
    /// Customer invoice.
    OutInvoice,
    /// Vendor bill.
    InInvoice,
    /// Customer credit note.
    OutRefund,
    /// Vendor credit note.
    InRefund,
}

impl InvoiceType {
    /// True for credit notes.
    pub fn is_refund(&self) -> bool {
        matches!(self, Self::OutRefund | Self::InRefund)
    }

    /// True for customer documents (the ones perceptions are levied on).
    pub fn is_sale(&self) -> bool {
        matches!(self, Self::OutInvoice | Self::OutRefund)
    }

    /// Sign applied to perception amounts: +1 for invoices, -1 for credit notes.
    pub fn sign(&self) -> Decimal {
        if self.is_refund() {
            Decimal::NEGATIVE_ONE
        } else {
            Decimal::ONE
        }
    }

    /// Type of the document that reverses this one.
    pub fn refund_type(&self) -> Self {
        match self {
            Self::OutInvoice => Self::OutRefund,
            Self::InInvoice => Self::InRefund,
            Self::OutRefund => Self::OutInvoice,
            Self::InRefund => Self::InInvoice,
        }
    }
}

/// Company issuing the invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: u32,
    pub name: String,
    /// Company (accounting) currency.
    pub currency: Currency,
}

/// Postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub city: String,
    pub postal_code: String,
    /// Province; drives which provincial perceptions apply.
    pub state: Option<String>,
    /// ISO 3166-1 alpha-2.
    pub country_code: String,
}

/// Customer or supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    pub id: Option<u32>,
    pub name: String,
    /// CUIT.
    pub vat: Option<String>,
    /// Preferred language for document texts.
    pub lang: Option<String>,
    /// Gross income (IIBB) registration number, max 15 chars.
    pub iibb_number: Option<String>,
    /// Main address.
    pub address: Address,
    /// Delivery address, if different from the main one.
    pub delivery_address: Option<Address>,
    /// Fiscal position; lists the perceptions applied by default.
    pub fiscal_position: Option<FiscalPosition>,
    /// Partner-specific perception exceptions.
    pub perceptions: Vec<PartnerPerception>,
}

impl Party {
    /// Delivery address, falling back to the main address.
    pub fn delivery_address(&self) -> &Address {
        self.delivery_address.as_ref().unwrap_or(&self.address)
    }
}

/// Invoice line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Discount percentage (0-100).
    pub discount: Decimal,
    /// Income/expense account of the line.
    pub account: AccountId,
    /// Taxes applied to the line.
    pub taxes: Vec<Tax>,
}

impl LineItem {
    /// Unit price after discount.
    pub fn price_unit_after_discount(&self) -> Decimal {
        self.unit_price * (Decimal::ONE - self.discount / Decimal::ONE_HUNDRED)
    }

    /// Line subtotal before taxes.
    pub fn subtotal(&self) -> Decimal {
        self.price_unit_after_discount() * self.quantity
    }
}

/// Tax group as configured on the tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxGroup {
    /// IVA.
    Vat,
    /// Tax backing a perception.
    Perception,
    /// Internal taxes and anything else.
    Other,
}

/// A tax definition with its posting accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tax {
    pub id: u32,
    pub name: String,
    pub group: TaxGroup,
    /// Percentage rate (e.g. 21 for 21%).
    pub rate: Decimal,
    pub is_exempt: bool,
    /// Account used on invoices.
    pub account: Option<AccountId>,
    /// Account used on credit notes.
    pub refund_account: Option<AccountId>,
}

/// Kind of perception. Concepts are typed the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerceptionKind {
    /// Percepción de IVA.
    Vat,
    /// Percepción de Ingresos Brutos.
    GrossIncome,
    /// Percepción de Ganancias.
    Profit,
    Other,
}

/// What the perception percentage is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerceptionBase {
    /// Untaxed invoice amount.
    #[default]
    Untaxed,
    /// VAT amount computed in the first phase.
    Vat,
}

/// Perception definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perception {
    pub id: u32,
    pub name: String,
    /// Raw jurisdiction value as stored by the host ("nacional", "provincial", "municipal").
    pub jurisdiction: String,
    pub kind: PerceptionKind,
    /// Tax the perception posts through.
    pub tax: Tax,
    pub base: PerceptionBase,
    /// Province levying the perception (provincial perceptions only).
    pub state: Option<String>,
    /// Owning company; `None` means shared by all companies.
    pub company_id: Option<u32>,
}

impl Perception {
    /// Parsed jurisdiction, or `None` if the stored value is not recognized.
    pub fn jurisdiction(&self) -> Option<Jurisdiction> {
        Jurisdiction::from_value(&self.jurisdiction)
    }
}

/// Perception concept (regime), restricted to perceptions of the same kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub id: u32,
    pub name: String,
    pub kind: PerceptionKind,
}

/// Tax application (aliquot table entry) used to compute a perception.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxApplication {
    pub id: u32,
    pub name: String,
}

/// A perception recorded on an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerceptionLine {
    /// Host record id, if persisted.
    pub id: Option<u32>,
    /// Description printed on the document.
    pub name: String,
    pub perception: Perception,
    pub concept: Option<Concept>,
    pub tax_application: Option<TaxApplication>,
    /// Base in invoice currency.
    pub base: Decimal,
    /// Perceived amount in invoice currency.
    pub amount: Decimal,
    /// Signed base in company currency.
    pub base_amount: Decimal,
    /// Signed amount in company currency.
    pub tax_amount: Decimal,
    /// Ledger account the line originated from.
    pub account: Option<AccountId>,
    /// Invoice tax record this line was posted into.
    pub invoice_tax_id: Option<u32>,
    /// Entered by hand (kept on recomputation) or generated.
    pub manual: bool,
    /// Regime registration code.
    pub reg_code: Option<i32>,
    /// Province.
    pub state: Option<String>,
    /// Partner name.
    pub partner: Option<String>,
    /// Partner CUIT.
    pub vat: Option<String>,
    pub company_id: Option<u32>,
    pub date: Option<NaiveDate>,
}

impl PerceptionLine {
    /// Short name used in error messages, e.g. `RTL(#7)[IIBB BA-Kunde SA]`.
    pub fn readable_name(&self) -> String {
        let id = self.id.map(|id| id.to_string()).unwrap_or_default();
        let partner = self.partner.as_deref().unwrap_or("Undefined");
        format!("RTL(#{id})[{}-{partner}]", self.name)
    }

    /// Jurisdiction of the underlying perception.
    ///
    /// Fails with [`PerceptionError::UnknownJurisdiction`] when the stored
    /// value is absent or not one of the three levels.
    pub fn jurisdiction(&self) -> Result<Jurisdiction, PerceptionError> {
        self.perception
            .jurisdiction()
            .ok_or_else(|| PerceptionError::UnknownJurisdiction {
                line: self.readable_name(),
                value: self.perception.jurisdiction.clone(),
            })
    }
}

//! Two-phase invoice tax computation.
//!
//! The host's tax hook computes VAT first. Perceptions are computed in a
//! second phase, because a perception base may be the VAT amount itself.
//! The phases are chained by [`PerceptionTaxHook`], which wraps any
//! [`TaxHook`] and only runs its perception phase on a [`VatTaxes`] value
//! produced by the inner hook.
//!
//! # Example
//!
//! ```
//! use ar_perceptions::core::*;
//! use ar_perceptions::tax::*;
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//!
//! let company = Company { id: 1, name: "Yerbatera SA".into(), currency: Currency::new("ARS") };
//! let iibb = TaxBuilder::new(20, "Perc IIBB BA", TaxGroup::Perception, dec!(3))
//!     .account(AccountId(2150))
//!     .refund_account(AccountId(2151))
//!     .build();
//! let perception = PerceptionBuilder::new(1, "IIBB BA", "provincial", iibb).build();
//!
//! let invoice = InvoiceBuilder::new("FA-A 0001-00000001", company)
//!     .issue_date(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
//!     .partner(PartyBuilder::new("Kunde SA", AddressBuilder::new("La Plata", "1900", "AR").build()).build())
//!     .add_perception(PerceptionLineBuilder::new(perception, dec!(1000), dec!(30)).build())
//!     .build()
//!     .unwrap();
//!
//! let rates = RateTable::new("ARS");
//! let ctx = TaxContext::new(&rates, ComputeOptions::default());
//! let taxes = PerceptionTaxHook::<StandardTaxHook>::default()
//!     .compute_taxes(&invoice, &ctx)
//!     .unwrap();
//!
//! let entry = taxes.get(&TaxKey::Perception(AccountId(2150))).unwrap();
//! assert_eq!(entry.amount, dec!(30));
//! ```

mod config;
mod perception;
mod vat;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AccountId, CurrencyConverter, Invoice, PerceptionError, TaxGroup};

pub use config::{ComputeOptions, ComputeOptionsBuilder};
pub use perception::{
    PerceptionScope, PerceptionTaxHook, VatTaxes, compute_perception_invoice_taxes,
    compute_perception_taxes, create_perceptions_from_partner, prepare_perception_tax_line,
};
pub use vat::{LineVatSummary, LineVatTax, StandardTaxHook, compute_line_vat};

/// Key of an aggregated tax entry.
///
/// VAT entries are keyed by tax and account, perception entries by account
/// only, so both kinds can share one map without overwriting each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaxKey {
    /// Host tax entry (VAT and other line taxes).
    Tax { tax_id: u32, account: AccountId },
    /// Perception entry.
    Perception(AccountId),
}

/// Aggregated tax entry, ready to become an invoice tax record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxEntry {
    pub group: TaxGroup,
    pub name: String,
    pub tax_id: u32,
    pub account: AccountId,
    /// Taxable base.
    pub base: Decimal,
    /// Tax amount.
    pub amount: Decimal,
    pub manual: bool,
    pub sequence: u32,
    pub is_exempt: bool,
    pub invoice_id: Option<u32>,
}

/// Ledger-keyed tax entries of one invoice, in key order (VAT before perceptions).
///
/// Entries under [`TaxKey::Tax`] are in invoice currency; entries under
/// [`TaxKey::Perception`] are converted to company currency. When the two
/// currencies differ, sum each kind on its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxGrouped {
    entries: BTreeMap<TaxKey, TaxEntry>,
}

impl TaxGrouped {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &TaxKey) -> Option<&TaxEntry> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: TaxKey, entry: TaxEntry) -> Option<TaxEntry> {
        self.entries.insert(key, entry)
    }

    /// Add `entry` to the entry under `key`, inserting it if absent.
    pub fn accumulate(&mut self, key: TaxKey, entry: TaxEntry) {
        match self.entries.get_mut(&key) {
            Some(existing) => {
                existing.base += entry.base;
                existing.amount += entry.amount;
            }
            None => {
                self.entries.insert(key, entry);
            }
        }
    }

    /// Round every entry's base and amount with `round`.
    pub fn round_with(&mut self, round: impl Fn(Decimal) -> Decimal) {
        for entry in self.entries.values_mut() {
            entry.base = round(entry.base);
            entry.amount = round(entry.amount);
        }
    }

    /// Merge another set of entries into this one.
    pub fn extend(&mut self, other: TaxGrouped) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TaxKey, &TaxEntry)> {
        self.entries.iter()
    }

    /// Entries of a given tax group.
    pub fn group(&self, group: TaxGroup) -> impl Iterator<Item = &TaxEntry> {
        self.entries.values().filter(move |e| e.group == group)
    }

    /// Perception entries.
    pub fn perceptions(&self) -> impl Iterator<Item = &TaxEntry> {
        self.entries
            .iter()
            .filter(|(k, _)| matches!(k, TaxKey::Perception(_)))
            .map(|(_, e)| e)
    }
}

/// Context of a tax computation: the host's converter and the options.
#[derive(Clone, Copy)]
pub struct TaxContext<'a> {
    converter: &'a dyn CurrencyConverter,
    options: ComputeOptions,
}

impl<'a> TaxContext<'a> {
    pub fn new(converter: &'a dyn CurrencyConverter, options: ComputeOptions) -> Self {
        Self { converter, options }
    }

    pub fn converter(&self) -> &'a dyn CurrencyConverter {
        self.converter
    }

    pub fn options(&self) -> &ComputeOptions {
        &self.options
    }

    /// Date used for rate lookups on `invoice`.
    pub fn date_for(&self, invoice: &Invoice) -> NaiveDate {
        invoice.effective_date(self.options.today)
    }

    /// Same context with perception computation switched off.
    pub fn without_perceptions(&self) -> Self {
        Self {
            converter: self.converter,
            options: ComputeOptions {
                compute_perceptions: false,
                ..self.options
            },
        }
    }
}

impl std::fmt::Debug for TaxContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaxContext")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// The host's invoice tax computation.
pub trait TaxHook {
    /// Compute the grouped tax entries of `invoice`.
    fn compute_taxes(
        &self,
        invoice: &Invoice,
        ctx: &TaxContext<'_>,
    ) -> Result<TaxGrouped, PerceptionError>;
}

impl<H: TaxHook + ?Sized> TaxHook for &H {
    fn compute_taxes(
        &self,
        invoice: &Invoice,
        ctx: &TaxContext<'_>,
    ) -> Result<TaxGrouped, PerceptionError> {
        (**self).compute_taxes(invoice, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(account: u32, base: Decimal, amount: Decimal) -> TaxEntry {
        TaxEntry {
            group: TaxGroup::Perception,
            name: "Perc".into(),
            tax_id: 1,
            account: AccountId(account),
            base,
            amount,
            manual: false,
            sequence: 10,
            is_exempt: false,
            invoice_id: None,
        }
    }

    #[test]
    fn accumulate_sums_same_key() {
        let mut grouped = TaxGrouped::new();
        let key = TaxKey::Perception(AccountId(1));
        grouped.accumulate(key, entry(1, dec!(100), dec!(3)));
        grouped.accumulate(key, entry(1, dec!(50), dec!(1.5)));
        assert_eq!(grouped.len(), 1);
        let e = grouped.get(&key).unwrap();
        assert_eq!(e.base, dec!(150));
        assert_eq!(e.amount, dec!(4.5));
    }

    #[test]
    fn vat_and_perception_keys_do_not_collide() {
        let mut grouped = TaxGrouped::new();
        grouped.insert(
            TaxKey::Tax {
                tax_id: 1,
                account: AccountId(1),
            },
            entry(1, dec!(100), dec!(21)),
        );
        let mut perceptions = TaxGrouped::new();
        perceptions.insert(TaxKey::Perception(AccountId(1)), entry(1, dec!(100), dec!(3)));
        grouped.extend(perceptions);
        assert_eq!(grouped.len(), 2);
        // VAT keys sort before perception keys
        let first = grouped.iter().next().unwrap().0;
        assert!(matches!(first, TaxKey::Tax { .. }));
    }

    #[test]
    fn round_with_rounds_all_entries() {
        let mut grouped = TaxGrouped::new();
        grouped.insert(TaxKey::Perception(AccountId(1)), entry(1, dec!(1.005), dec!(0.125)));
        grouped.round_with(|v| v.round_dp(2));
        let e = grouped.get(&TaxKey::Perception(AccountId(1))).unwrap();
        assert_eq!(e.base, dec!(1.00));
        assert_eq!(e.amount, dec!(0.12));
    }
}

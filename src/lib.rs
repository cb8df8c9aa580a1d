//! # ar-perceptions
//!
//! Argentine tax perceptions on invoices: percepciones de IVA, Ingresos
//! Brutos and Ganancias levied at national, provincial or municipal level,
//! computed on top of the invoice's VAT.
//!
//! All monetary values use [`rust_decimal::Decimal`]; never floating point.
//! The invoicing platform itself (records, persistence, conversion rates)
//! stays with the host; this crate plugs into it through the
//! [`core::CurrencyConverter`], [`tax::TaxHook`] and `wsfe::TributeHook`
//! traits.
//!
//! ## Quick Start
//!
//! ```rust
//! use ar_perceptions::core::*;
//! use ar_perceptions::tax::*;
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//!
//! let company = Company { id: 1, name: "Yerbatera SA".into(), currency: Currency::new("ARS") };
//! let iva = TaxBuilder::new(1, "IVA 21%", TaxGroup::Vat, dec!(21)).account(AccountId(2130)).build();
//! let perc_iva = TaxBuilder::new(2, "Perc IVA", TaxGroup::Perception, dec!(3))
//!     .account(AccountId(2140))
//!     .refund_account(AccountId(2141))
//!     .build();
//! let perception = PerceptionBuilder::new(1, "Perc IVA RG 2408", "nacional", perc_iva)
//!     .kind(PerceptionKind::Vat)
//!     .build();
//!
//! let invoice = InvoiceBuilder::new("FA-A 0001-00000001", company)
//!     .issue_date(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
//!     .partner(PartyBuilder::new("Kunde SA", AddressBuilder::new("La Plata", "1900", "AR").build()).build())
//!     .add_line(LineItemBuilder::new("1", "Yerba 1kg", dec!(10), dec!(100), AccountId(4100)).tax(iva).build())
//!     .add_perception(PerceptionLineBuilder::new(perception, dec!(1000), dec!(30)).build())
//!     .build()
//!     .unwrap();
//!
//! let rates = RateTable::new("ARS");
//! let ctx = TaxContext::new(&rates, ComputeOptions::default());
//! let taxes = PerceptionTaxHook::new(StandardTaxHook).compute_taxes(&invoice, &ctx).unwrap();
//!
//! assert_eq!(taxes.len(), 2);
//! assert_eq!(taxes.get(&TaxKey::Perception(AccountId(2140))).unwrap().amount, dec!(30));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Types, two-phase tax computation, partner perceptions, refunds |
//! | `wsfe` | AFIP WSFE `Tributos` export |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "core")]
pub mod partner;

#[cfg(feature = "core")]
pub mod refund;

#[cfg(feature = "core")]
pub mod tax;

#[cfg(feature = "wsfe")]
pub mod wsfe;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;

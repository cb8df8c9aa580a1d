//! `Tributos` group of the WSFE detail.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::core::{Invoice, PerceptionError};

/// Fiscal document detail as built by the host.
///
/// Only the `Tributos` group is typed; every other field the host put in
/// the detail is preserved as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FiscalDetail {
    #[serde(rename = "Tributos", default, skip_serializing_if = "Option::is_none")]
    pub tributos: Option<Tributos>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// `Tributos` group. Unknown keys of the group are kept like in [`FiscalDetail`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tributos {
    #[serde(rename = "Tributo", default)]
    pub tributo: Vec<Tributo>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// One tribute (other tax) of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tributo {
    /// Tribute code: "1" national, "2" provincial, "3" municipal for
    /// perceptions. Host tributes may carry it as a number.
    #[serde(rename = "Id", deserialize_with = "tribute_id")]
    pub id: String,
    #[serde(rename = "BaseImp", with = "rust_decimal::serde::float")]
    pub base_imp: Decimal,
    #[serde(rename = "Importe", with = "rust_decimal::serde::float")]
    pub importe: Decimal,
    #[serde(rename = "Alic", with = "rust_decimal::serde::float")]
    pub alic: Decimal,
    #[serde(rename = "Desc")]
    pub desc: String,
}

fn tribute_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(id) => id,
        Id::Number(id) => id.to_string(),
    })
}

/// Tributes for every perception line of `invoice`, in line order.
///
/// Fails on the first line whose jurisdiction is absent or unknown.
pub fn perception_tributes(invoice: &Invoice) -> Result<Vec<Tributo>, PerceptionError> {
    invoice
        .perceptions
        .iter()
        .map(|line| {
            let jurisdiction = line.jurisdiction()?;
            Ok(Tributo {
                id: jurisdiction.afip_code().to_string(),
                base_imp: line.base,
                importe: line.amount,
                alic: Decimal::ZERO,
                desc: line.name.clone(),
            })
        })
        .collect()
}

/// Append the perception tributes of `invoice` to `detail`.
///
/// Existing tributes are kept; the `Tributos` group is created when absent.
/// Nothing is appended if any perception cannot be mapped.
pub fn add_perception_tributes(
    invoice: &Invoice,
    mut detail: FiscalDetail,
) -> Result<FiscalDetail, PerceptionError> {
    let tributes = perception_tributes(invoice)?;
    tracing::debug!(
        invoice = %invoice.number,
        tributes = tributes.len(),
        "adding perception tributes"
    );
    detail
        .tributos
        .get_or_insert_with(Tributos::default)
        .tributo
        .extend(tributes);
    Ok(detail)
}

/// The host's hook that fills the taxes of the fiscal document detail.
pub trait TributeHook {
    fn add_taxes(
        &self,
        invoice: &Invoice,
        detail: FiscalDetail,
    ) -> Result<FiscalDetail, PerceptionError>;
}

/// Hook that adds nothing; the end of a hook chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseTributes;

impl TributeHook for BaseTributes {
    fn add_taxes(
        &self,
        _invoice: &Invoice,
        detail: FiscalDetail,
    ) -> Result<FiscalDetail, PerceptionError> {
        Ok(detail)
    }
}

/// Wraps a host hook and appends perception tributes after it ran.
#[derive(Debug, Clone, Default)]
pub struct PerceptionTributes<H> {
    inner: H,
}

impl<H: TributeHook> PerceptionTributes<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H: TributeHook> TributeHook for PerceptionTributes<H> {
    fn add_taxes(
        &self,
        invoice: &Invoice,
        detail: FiscalDetail,
    ) -> Result<FiscalDetail, PerceptionError> {
        let detail = self.inner.add_taxes(invoice, detail)?;
        add_perception_tributes(invoice, detail)
    }
}

//! Perception configuration on partners and fiscal positions.
//!
//! A fiscal position lists the perceptions applied to every partner that
//! uses it. A partner can override any of them (different percentage,
//! temporary exclusion) through its own perception entries.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{Party, Perception};

/// Fiscal position with its default perceptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalPosition {
    pub id: u32,
    pub name: String,
    pub perceptions: Vec<Perception>,
}

/// Perception exception configured on a partner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerPerception {
    pub perception: Perception,
    /// Economic activity the rate was assigned for.
    pub activity: Option<String>,
    /// Percentage to apply instead of the tax rate.
    pub percent: Decimal,
    /// Percentage of the perception the partner is exempted from.
    pub excluded_percent: Decimal,
    /// Exclusion window start (inclusive).
    pub ex_date_from: Option<NaiveDate>,
    /// Exclusion window end (inclusive).
    pub ex_date_to: Option<NaiveDate>,
    /// Gross income situation (local, multilateral agreement, ...).
    pub iibb_situation: Option<String>,
    /// Rate was loaded from a tax authority registry (padrón).
    pub from_registry: bool,
}

/// A perception resolved for a partner, ready to be computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedPerception {
    pub perception: Perception,
    pub activity: Option<String>,
    /// `None` means "use the tax's own rate".
    pub percent: Option<Decimal>,
    pub excluded_percent: Decimal,
    pub ex_date_from: Option<NaiveDate>,
    pub ex_date_to: Option<NaiveDate>,
    pub iibb_situation: Option<String>,
    pub from_registry: bool,
}

impl AppliedPerception {
    fn from_fiscal_position(perception: &Perception) -> Self {
        Self {
            perception: perception.clone(),
            activity: None,
            percent: None,
            excluded_percent: Decimal::ZERO,
            ex_date_from: None,
            ex_date_to: None,
            iibb_situation: None,
            from_registry: false,
        }
    }

    fn from_partner(p: &PartnerPerception) -> Self {
        Self {
            perception: p.perception.clone(),
            activity: p.activity.clone(),
            percent: Some(p.percent),
            excluded_percent: p.excluded_percent,
            ex_date_from: p.ex_date_from,
            ex_date_to: p.ex_date_to,
            iibb_situation: p.iibb_situation.clone(),
            from_registry: p.from_registry,
        }
    }

    /// Percentage actually applied.
    pub fn effective_percent(&self) -> Decimal {
        self.percent.unwrap_or(self.perception.tax.rate)
    }

    /// True if an exclusion is configured and `date` falls inside its window.
    pub fn is_excluded_on(&self, date: NaiveDate) -> bool {
        if self.excluded_percent <= Decimal::ZERO {
            return false;
        }
        let after_start = self.ex_date_from.is_none_or(|from| date >= from);
        let before_end = self.ex_date_to.is_none_or(|to| date <= to);
        after_start && before_end
    }

    /// Perceived amount for `base` on `date` (unrounded).
    pub fn compute_amount(&self, base: Decimal, date: NaiveDate) -> Decimal {
        let amount = base * self.effective_percent() / Decimal::ONE_HUNDRED;
        if self.is_excluded_on(date) {
            amount * (Decimal::ONE - self.excluded_percent / Decimal::ONE_HUNDRED)
        } else {
            amount
        }
    }
}

fn visible_to(perception: &Perception, company_id: u32) -> bool {
    perception.company_id.is_none_or(|id| id == company_id)
}

impl Party {
    /// Perceptions to apply to this partner for `company_id`, keyed by perception id.
    ///
    /// Fiscal position perceptions come first; partner entries for the same
    /// perception replace them. Perceptions owned by another company are ignored.
    pub fn perceptions_to_apply(&self, company_id: u32) -> BTreeMap<u32, AppliedPerception> {
        let mut perceptions = BTreeMap::new();

        if let Some(position) = &self.fiscal_position {
            for perc in position
                .perceptions
                .iter()
                .filter(|p| visible_to(p, company_id))
            {
                perceptions.insert(perc.id, AppliedPerception::from_fiscal_position(perc));
            }
        }

        for p_perc in self
            .perceptions
            .iter()
            .filter(|p| visible_to(&p.perception, company_id))
        {
            perceptions.insert(p_perc.perception.id, AppliedPerception::from_partner(p_perc));
        }

        perceptions
    }
}

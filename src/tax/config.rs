//! Options for a tax computation run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default sequence of perception tax entries.
pub const PERCEPTION_SEQUENCE: u32 = 10;

/// Options for a tax computation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeOptions {
    /// Run the perception phase. Off while the VAT phase runs, so a
    /// wrapped hook never computes perceptions twice.
    pub compute_perceptions: bool,
    /// Date used when the invoice has none.
    pub today: NaiveDate,
    /// Sequence assigned to perception tax entries.
    pub sequence: u32,
}

impl Default for ComputeOptions {
    fn default() -> Self {
        Self {
            compute_perceptions: true,
            today: chrono::Local::now().date_naive(),
            sequence: PERCEPTION_SEQUENCE,
        }
    }
}

/// Builder for [`ComputeOptions`].
///
/// # Example
///
/// ```
/// use ar_perceptions::tax::ComputeOptionsBuilder;
/// use chrono::NaiveDate;
///
/// let options = ComputeOptionsBuilder::new()
///     .today(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
///     .compute_perceptions(false)
///     .build();
/// assert!(!options.compute_perceptions);
/// ```
#[derive(Debug, Default)]
pub struct ComputeOptionsBuilder {
    options: ComputeOptions,
}

impl ComputeOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the perception phase.
    pub fn compute_perceptions(mut self, enabled: bool) -> Self {
        self.options.compute_perceptions = enabled;
        self
    }

    /// Fallback date for invoices without a date.
    pub fn today(mut self, date: NaiveDate) -> Self {
        self.options.today = date;
        self
    }

    /// Sequence of perception tax entries.
    pub fn sequence(mut self, sequence: u32) -> Self {
        self.options.sequence = sequence;
        self
    }

    pub fn build(self) -> ComputeOptions {
        self.options
    }
}

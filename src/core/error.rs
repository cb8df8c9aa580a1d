use thiserror::Error;

/// Errors that can occur while computing or exporting invoice perceptions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PerceptionError {
    /// A perception carries an absent or unrecognized jurisdiction value.
    #[error("{line}: unknown jurisdiction '{value}'")]
    UnknownJurisdiction {
        /// Readable name of the offending perception line.
        line: String,
        /// Raw jurisdiction value as stored on the perception.
        value: String,
    },

    /// The tax behind a perception has no ledger account configured.
    #[error("tax '{tax}' of perception '{perception}' has no account configured")]
    MissingAccount { perception: String, tax: String },

    /// A credit note needs the refund account, which is not configured.
    #[error("tax '{tax}' of perception '{perception}' has no refund account configured")]
    MissingRefundAccount { perception: String, tax: String },

    /// No conversion rate is known for a currency at a given date.
    #[error("no rate for currency {currency} on {date}")]
    MissingRate {
        currency: String,
        date: chrono::NaiveDate,
    },

    /// Currency misconfiguration (unknown code, non-positive rate, ...).
    #[error("currency error: {0}")]
    Currency(String),

    /// One or more validation rules failed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Builder encountered invalid or missing configuration.
    #[error("builder error: {0}")]
    Builder(String),
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "perceptions[0].concept").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// Rule identifier if applicable (e.g. "PERC-02").
    pub rule: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "[{}] {}: {}", rule, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    /// Create a validation error with a rule ID.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }
}

/// Fold a list of validation errors into a single [`PerceptionError::Validation`].
pub(crate) fn join_errors(errors: &[ValidationError]) -> PerceptionError {
    let msg = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    PerceptionError::Validation(msg)
}

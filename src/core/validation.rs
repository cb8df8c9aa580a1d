use rust_decimal::Decimal;

use super::error::ValidationError;
use super::types::*;
use crate::partner::PartnerPerception;

/// Validate an invoice and its perception data.
/// Returns all validation errors found (not just the first).
pub fn validate_invoice(invoice: &Invoice) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // INV-01: An invoice shall have a number
    if invoice.number.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            "number",
            "invoice number must not be empty",
            "INV-01",
        ));
    }

    // INV-02: Currencies shall be known ISO 4217 codes
    validate_currency_code(&invoice.currency.code, "currency", &mut errors);
    validate_currency_code(
        &invoice.company.currency.code,
        "company.currency",
        &mut errors,
    );

    for (i, line) in invoice.perceptions.iter().enumerate() {
        validate_perception_line(line, i, invoice.is_refund(), &mut errors);
    }

    errors.extend(validate_partner(&invoice.partner));

    errors
}

/// Validate the perception configuration of a partner.
pub fn validate_partner(partner: &Party) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // PART-04: IIBB registration number is at most 15 characters
    if let Some(number) = &partner.iibb_number {
        if number.chars().count() > 15 {
            errors.push(ValidationError::with_rule(
                "partner.iibb_number",
                "gross income registration number cannot exceed 15 characters",
                "PART-04",
            ));
        }
    }

    for (i, p) in partner.perceptions.iter().enumerate() {
        validate_partner_perception(p, &format!("partner.perceptions[{i}]"), &mut errors);
    }

    errors
}

fn validate_currency_code(code: &str, field: &str, errors: &mut Vec<ValidationError>) {
    if code.len() != 3 {
        errors.push(ValidationError::with_rule(
            field,
            "currency code must be 3 characters (ISO 4217)",
            "INV-02",
        ));
    } else if !super::currencies::is_known_currency_code(code) {
        errors.push(ValidationError::with_rule(
            field,
            format!("currency code '{code}' is not a known ISO 4217 code"),
            "INV-02",
        ));
    }
}

fn validate_perception_line(
    line: &PerceptionLine,
    index: usize,
    is_refund: bool,
    errors: &mut Vec<ValidationError>,
) {
    let prefix = format!("perceptions[{index}]");

    // PERC-01: jurisdiction must be national, provincial or municipal
    if line.perception.jurisdiction().is_none() {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.perception.jurisdiction"),
            format!(
                "{}: unknown jurisdiction '{}'",
                line.readable_name(),
                line.perception.jurisdiction
            ),
            "PERC-01",
        ));
    }

    // PERC-02: the concept must be of the same kind as the perception
    if let Some(concept) = &line.concept {
        if concept.kind != line.perception.kind {
            errors.push(ValidationError::with_rule(
                format!("{prefix}.concept"),
                format!(
                    "concept '{}' ({:?}) does not match perception kind {:?}",
                    concept.name, concept.kind, line.perception.kind
                ),
                "PERC-02",
            ));
        }
    }

    // PERC-03: amounts are recorded unsigned; the document type carries the sign
    if line.base < Decimal::ZERO {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.base"),
            "base must not be negative",
            "PERC-03",
        ));
    }
    if line.amount < Decimal::ZERO {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.amount"),
            "amount must not be negative",
            "PERC-03",
        ));
    }

    // PERC-04 / PERC-05: the posting account for the document type must exist
    let tax = &line.perception.tax;
    if is_refund {
        if tax.refund_account.is_none() {
            errors.push(ValidationError::with_rule(
                format!("{prefix}.perception.tax.refund_account"),
                format!("tax '{}' has no refund account configured", tax.name),
                "PERC-05",
            ));
        }
    } else if tax.account.is_none() {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.perception.tax.account"),
            format!("tax '{}' has no account configured", tax.name),
            "PERC-04",
        ));
    }

    // PERC-06: perceptions post through perception taxes
    if tax.group != TaxGroup::Perception {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.perception.tax.group"),
            format!("tax '{}' is not a perception tax", tax.name),
            "PERC-06",
        ));
    }
}

fn validate_partner_perception(
    p: &PartnerPerception,
    prefix: &str,
    errors: &mut Vec<ValidationError>,
) {
    // PART-01
    if p.percent < Decimal::ZERO {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.percent"),
            "percent must not be negative",
            "PART-01",
        ));
    }

    // PART-02
    if p.excluded_percent < Decimal::ZERO || p.excluded_percent > Decimal::ONE_HUNDRED {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.excluded_percent"),
            "exclusion percentage must be between 0 and 100",
            "PART-02",
        ));
    }

    // PART-03
    if let (Some(from), Some(to)) = (p.ex_date_from, p.ex_date_to) {
        if from > to {
            errors.push(ValidationError::with_rule(
                format!("{prefix}.ex_date_from"),
                format!("exclusion starts ({from}) after it ends ({to})"),
                "PART-03",
            ));
        }
    }
}

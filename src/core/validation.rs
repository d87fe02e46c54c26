//! Validator - maps a draft to its field errors.
//!
//! [`validate`] is pure and synchronous. It applies the per-field rules declared
//! in each entity's schema (required, length cap, amount shape, future dates,
//! known-option dropdowns) and then the cross-field rules that need more than
//! one value: utilized vs approved on a budget line, milestone amount vs the
//! remaining PO balance, allocation amount vs the budget line's headroom.
//! Submission proceeds only when the returned map is empty.

use crate::core::amount::{format_currency, parse_amount};
use crate::core::draft::{DraftRecord, FieldValue};
use crate::entities::{
    EntityKind, FieldKind, FieldSpec, Selection, allocation, budget_line, milestone,
    purchase_order,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// field name -> message
pub type ErrorMap = BTreeMap<String, String>;

/// Facts from outside the draft that some rules need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationContext {
    /// "Today" for future-date rules
    pub today: NaiveDate,
    /// ISO currency code used in messages
    pub currency: String,
    /// Remaining balance on the parent PO (milestone forms)
    pub po_balance: Option<Decimal>,
    /// Remaining headroom on the parent budget line (allocation forms)
    pub allocation_headroom: Option<Decimal>,
}

impl ValidationContext {
    /// Context with no balances, in USD.
    #[must_use]
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            currency: "USD".to_string(),
            po_balance: None,
            allocation_headroom: None,
        }
    }

    /// Context for the local calendar day.
    #[must_use]
    pub fn for_today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    /// Sets the message currency.
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Sets the remaining PO balance.
    #[must_use]
    pub const fn with_po_balance(mut self, balance: Decimal) -> Self {
        self.po_balance = Some(balance);
        self
    }

    /// Sets the remaining allocation headroom.
    #[must_use]
    pub const fn with_allocation_headroom(mut self, headroom: Decimal) -> Self {
        self.allocation_headroom = Some(headroom);
        self
    }
}

/// Runs every rule for the draft's entity kind.
#[must_use]
pub fn validate(draft: &DraftRecord, ctx: &ValidationContext) -> ErrorMap {
    let mut errors = ErrorMap::new();
    for spec in draft.kind().fields() {
        if let Some(message) = check_field(spec, draft.value(spec.name), ctx) {
            errors.insert(spec.name.to_string(), message);
        }
    }
    check_cross_field(draft, ctx, &mut errors);
    errors
}

fn is_blank(value: Option<&FieldValue>) -> bool {
    match value {
        None => true,
        Some(FieldValue::Text(text)) => text.trim().is_empty(),
        Some(FieldValue::Choice(selection)) => selection.is_blank(),
        Some(FieldValue::Date(_)) => false,
    }
}

fn check_field(
    spec: &FieldSpec,
    value: Option<&FieldValue>,
    ctx: &ValidationContext,
) -> Option<String> {
    if is_blank(value) {
        return spec.required.then(|| format!("{} is required", spec.label));
    }
    let value = value?;

    match (spec.kind, value) {
        (FieldKind::Text, FieldValue::Text(text)) => too_long(spec, text),
        (FieldKind::Amount, FieldValue::Text(text)) => match parse_amount(text) {
            Err(_) => Some(format!(
                "{} must be a number with at most 13 digits and 2 decimals",
                spec.label
            )),
            Ok(amount) if spec.required && amount.is_zero() => {
                Some(format!("{} must be greater than zero", spec.label))
            }
            Ok(_) => None,
        },
        (FieldKind::DerivedAmount, _) => None,
        (FieldKind::Date { future_only }, FieldValue::Date(date)) => (future_only
            && *date <= ctx.today)
            .then(|| format!("{} must be a future date", spec.label)),
        (FieldKind::Choice { freeform_key }, FieldValue::Choice(selection)) => match selection {
            Selection::Known(_) => None,
            Selection::Freeform(_) if freeform_key.is_none() => Some(format!(
                "Select a {} from the list",
                mid_sentence(spec.label)
            )),
            Selection::Freeform(text) => too_long(spec, text),
        },
        _ => Some(format!("{} has an unexpected value", spec.label)),
    }
}

/// A label as it reads inside a sentence. Leading acronyms keep their case.
fn mid_sentence(label: &str) -> String {
    let first_word = label.split_whitespace().next().unwrap_or_default();
    let is_acronym = first_word.chars().filter(|c| c.is_alphabetic()).count() > 1
        && !first_word.chars().any(char::is_lowercase);
    if is_acronym {
        return label.to_string();
    }
    let mut chars = label.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_lowercase().chain(chars).collect()
    })
}

fn too_long(spec: &FieldSpec, text: &str) -> Option<String> {
    let max = spec.max_len?;
    (text.trim().chars().count() > max)
        .then(|| format!("{} must be at most {max} characters", spec.label))
}

fn check_cross_field(draft: &DraftRecord, ctx: &ValidationContext, errors: &mut ErrorMap) {
    let mut flag = |field: &str, message: String| {
        errors.entry(field.to_string()).or_insert(message);
    };

    match draft.kind() {
        EntityKind::BudgetLine => match (
            draft.amount(budget_line::AMOUNT_APPROVED),
            draft.amount(budget_line::AMOUNT_UTILIZED),
        ) {
            (Some(approved), Some(utilized)) if utilized > approved => flag(
                budget_line::AMOUNT_UTILIZED,
                "Utilized amount cannot exceed the approved amount".to_string(),
            ),
            _ => {}
        },
        EntityKind::Milestone => match (draft.amount(milestone::MILESTONE_AMOUNT), ctx.po_balance) {
            (Some(amount), Some(balance)) if amount > balance => flag(
                milestone::MILESTONE_AMOUNT,
                format!(
                    "Milestone amount cannot exceed the remaining PO balance of {}",
                    format_currency(balance, &ctx.currency)
                ),
            ),
            _ => {}
        },
        EntityKind::Allocation => match (
            draft.amount(allocation::ALLOCATION_AMOUNT),
            ctx.allocation_headroom,
        ) {
            (Some(amount), Some(headroom)) if amount > headroom => flag(
                allocation::ALLOCATION_AMOUNT,
                format!(
                    "Allocation amount cannot exceed the available budget of {}",
                    format_currency(headroom, &ctx.currency)
                ),
            ),
            _ => {}
        },
        EntityKind::PurchaseOrder => match (
            draft.date(purchase_order::START_DATE),
            draft.date(purchase_order::END_DATE),
        ) {
            (Some(start), Some(end)) if end < start => flag(
                purchase_order::END_DATE,
                "End date cannot be before the start date".to_string(),
            ),
            _ => {}
        },
        EntityKind::Task => {}
    }
}

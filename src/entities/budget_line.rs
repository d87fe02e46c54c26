//! Budget line - an approved spending envelope that allocations draw from.
//!
//! `amountAvailable` is never typed: it is always `amountApproved - amountUtilized`.
//! Updating a budget line may replace the record server-side, returning a new id.

use crate::entities::field::FieldSpec;

/// Budget name
pub const BUDGET_NAME: &str = "budgetName";
/// Internal budget code
pub const BUDGET_CODE: &str = "budgetCode";
/// Approved amount
pub const AMOUNT_APPROVED: &str = "amountApproved";
/// Amount already spent
pub const AMOUNT_UTILIZED: &str = "amountUtilized";
/// Approved minus utilized
pub const AMOUNT_AVAILABLE: &str = "amountAvailable";
/// ISO currency code
pub const CURRENCY: &str = "currency";
/// Free-form notes
pub const DESCRIPTION: &str = "description";

/// Form schema
pub const FIELDS: &[FieldSpec] = &[
    FieldSpec::text(BUDGET_NAME, "Budget name", 100).required(),
    FieldSpec::text(BUDGET_CODE, "Budget code", 50),
    FieldSpec::amount(AMOUNT_APPROVED, "Approved amount").required(),
    FieldSpec::amount(AMOUNT_UTILIZED, "Utilized amount"),
    FieldSpec::derived_amount(AMOUNT_AVAILABLE, "Available amount"),
    FieldSpec::text(CURRENCY, "Currency", 3),
    FieldSpec::text(DESCRIPTION, "Description", 500),
];

//! Derived money figures.
//!
//! These functions are framework-agnostic and pure; the async loaders in
//! [`crate::core::context`] feed them with records fetched from the backend.
//! Arithmetic is checked: `None` means the figures overflowed.

use rust_decimal::Decimal;

/// Amount still available on a budget line.
#[must_use]
pub fn available_amount(approved: Decimal, utilized: Decimal) -> Option<Decimal> {
    approved.checked_sub(utilized)
}

/// Headroom left under a ceiling after existing draws.
///
/// `existing` holds every persisted draw against the ceiling, including the
/// record currently being edited; `editing` is that record's persisted amount,
/// which is added back so the user can re-enter (or lower) it without tripping
/// the limit on their own previous value.
#[must_use]
pub fn remaining_headroom(
    ceiling: Decimal,
    existing: impl IntoIterator<Item = Decimal>,
    editing: Option<Decimal>,
) -> Option<Decimal> {
    let drawn = existing
        .into_iter()
        .try_fold(Decimal::ZERO, Decimal::checked_add)?;
    ceiling
        .checked_sub(drawn)?
        .checked_add(editing.unwrap_or(Decimal::ZERO))
}

/// Remaining balance on a purchase order for a new or edited milestone.
#[must_use]
pub fn remaining_po_balance(
    po_amount: Decimal,
    milestone_amounts: impl IntoIterator<Item = Decimal>,
    editing: Option<Decimal>,
) -> Option<Decimal> {
    remaining_headroom(po_amount, milestone_amounts, editing)
}

/// Amount a budget line can still allocate for a new or edited allocation.
#[must_use]
pub fn allocation_headroom(
    approved: Decimal,
    allocation_amounts: impl IntoIterator<Item = Decimal>,
    editing: Option<Decimal>,
) -> Option<Decimal> {
    remaining_headroom(approved, allocation_amounts, editing)
}

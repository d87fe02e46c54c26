//! Milestone - a billable deliverable checkpoint of a purchase order.
//!
//! The sum of a PO's milestone amounts may not exceed the PO amount.

use crate::entities::field::FieldSpec;

/// Parent purchase order
pub const PO_ID: &str = "poId";
/// Milestone name
pub const MILESTONE_NAME: &str = "milestoneName";
/// What is delivered
pub const MILESTONE_DESCRIPTION: &str = "milestoneDescription";
/// Billable amount
pub const MILESTONE_AMOUNT: &str = "milestoneAmount";
/// Due date
pub const END_DATE: &str = "endDate";

/// Form schema (the parent PO id is supplied by the form, not typed)
pub const FIELDS: &[FieldSpec] = &[
    FieldSpec::text(MILESTONE_NAME, "Milestone name", 100).required(),
    FieldSpec::text(MILESTONE_DESCRIPTION, "Milestone description", 500).required(),
    FieldSpec::amount(MILESTONE_AMOUNT, "Milestone amount").required(),
    FieldSpec::date(END_DATE, "End date", true),
];

//! Allocation - a portion of a budget line assigned to a vendor or system.
//!
//! Allocations carry no documents.

use crate::entities::field::FieldSpec;

/// Parent budget line
pub const BUDGET_LINE_ID: &str = "budgetLineId";
/// Vendor or system receiving the allocation (creatable dropdown)
pub const ALLOCATED_TO: &str = "allocatedTo";
/// Allocated amount
pub const ALLOCATION_AMOUNT: &str = "allocationAmount";
/// Free-form notes
pub const REMARKS: &str = "remarks";

/// Form schema (the parent budget line id is supplied by the form)
pub const FIELDS: &[FieldSpec] = &[
    FieldSpec::choice(ALLOCATED_TO, "Allocated to", Some("allocatedToName"))
        .required()
        .max_len(100),
    FieldSpec::amount(ALLOCATION_AMOUNT, "Allocation amount").required(),
    FieldSpec::text(REMARKS, "Remarks", 250),
];

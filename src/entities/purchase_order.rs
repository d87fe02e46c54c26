//! Purchase order - the top-level procurement record.
//!
//! A purchase order is raised for a customer, has a type and a total amount,
//! an optional single point of contact (SPOC) and up to four documents.

use crate::entities::field::FieldSpec;

/// PO number as printed on the order
pub const PO_NUMBER: &str = "poNumber";
/// PO type (known options only)
pub const PO_TYPE: &str = "poType";
/// Total order amount
pub const PO_AMOUNT: &str = "poAmount";
/// ISO currency code of the amounts
pub const CURRENCY: &str = "currency";
/// Customer (creatable dropdown)
pub const CUSTOMER: &str = "customer";
/// Single point of contact (creatable dropdown)
pub const SPOC: &str = "spoc";
/// Start of the PO period
pub const START_DATE: &str = "startDate";
/// End of the PO period
pub const END_DATE: &str = "endDate";
/// Free-form notes
pub const DESCRIPTION: &str = "description";

/// Form schema
pub const FIELDS: &[FieldSpec] = &[
    FieldSpec::text(PO_NUMBER, "PO number", 50).required(),
    FieldSpec::choice(PO_TYPE, "PO type", None).required(),
    FieldSpec::amount(PO_AMOUNT, "PO amount").required(),
    FieldSpec::text(CURRENCY, "Currency", 3),
    FieldSpec::choice(CUSTOMER, "Customer", Some("customerName"))
        .required()
        .max_len(100),
    FieldSpec::choice(SPOC, "SPOC", Some("spocName")).max_len(100),
    FieldSpec::date(START_DATE, "Start date", false),
    FieldSpec::date(END_DATE, "End date", true),
    FieldSpec::text(DESCRIPTION, "Description", 500),
];

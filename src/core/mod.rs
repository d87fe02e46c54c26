/// Decimal(15,2) input handling and currency display
pub mod amount;

/// Derived money figures
pub mod budget;

/// Cascading loads for cross-record rules
pub mod context;

/// Form state holder
pub mod draft;

/// Flows and open forms
pub mod form;

/// User-facing notifications
pub mod notify;

/// Two-phase submission of a record and its documents
pub mod orchestrator;

/// Attachment staging area
pub mod staging;

/// Field and cross-field rules
pub mod validation;

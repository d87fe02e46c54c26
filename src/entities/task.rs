//! Task - a work item with optional documents.

use crate::entities::field::FieldSpec;

/// Task name
pub const TASK_NAME: &str = "taskName";
/// Details
pub const DESCRIPTION: &str = "description";
/// Person responsible (creatable dropdown)
pub const ASSIGNEE: &str = "assignee";
/// Workflow status label
pub const STATUS: &str = "status";
/// Due date
pub const DUE_DATE: &str = "dueDate";

/// Form schema
pub const FIELDS: &[FieldSpec] = &[
    FieldSpec::text(TASK_NAME, "Task name", 100).required(),
    FieldSpec::text(DESCRIPTION, "Description", 500),
    FieldSpec::choice(ASSIGNEE, "Assignee", Some("assigneeName")).max_len(100),
    FieldSpec::text(STATUS, "Status", 50),
    FieldSpec::date(DUE_DATE, "Due date", true),
];

//! The record types managed by the desk.

use crate::entities::field::FieldSpec;
use crate::entities::{allocation, budget_line, milestone, purchase_order, task};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A kind of parent record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    /// Purchase order
    PurchaseOrder,
    /// Budget line (top-level allocation envelope)
    BudgetLine,
    /// Billable checkpoint of a purchase order
    Milestone,
    /// Work item
    Task,
    /// Portion of a budget line assigned to a vendor or system
    Allocation,
}

impl EntityKind {
    /// Every kind, in display order.
    pub const ALL: [Self; 5] = [
        Self::PurchaseOrder,
        Self::BudgetLine,
        Self::Milestone,
        Self::Task,
        Self::Allocation,
    ];

    /// Lower-case label for messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PurchaseOrder => "purchase order",
            Self::BudgetLine => "budget line",
            Self::Milestone => "milestone",
            Self::Task => "task",
            Self::Allocation => "allocation",
        }
    }

    /// REST collection segment.
    #[must_use]
    pub const fn resource(self) -> &'static str {
        match self {
            Self::PurchaseOrder => "purchase-orders",
            Self::BudgetLine => "budget-lines",
            Self::Milestone => "milestones",
            Self::Task => "tasks",
            Self::Allocation => "allocations",
        }
    }

    /// `level` tag used by the document service, or `None` if this kind
    /// carries no documents.
    #[must_use]
    pub const fn attachment_level(self) -> Option<&'static str> {
        match self {
            Self::PurchaseOrder => Some("PO"),
            Self::BudgetLine => Some("BUDGET_LINE"),
            Self::Milestone => Some("MILESTONE"),
            Self::Task => Some("TASK"),
            Self::Allocation => None,
        }
    }

    /// Payload key linking a child record to its parent.
    #[must_use]
    pub const fn parent_key(self) -> Option<&'static str> {
        match self {
            Self::Milestone => Some(milestone::PO_ID),
            Self::Allocation => Some(allocation::BUDGET_LINE_ID),
            Self::PurchaseOrder | Self::BudgetLine | Self::Task => None,
        }
    }

    /// Form schema.
    #[must_use]
    pub const fn fields(self) -> &'static [FieldSpec] {
        match self {
            Self::PurchaseOrder => purchase_order::FIELDS,
            Self::BudgetLine => budget_line::FIELDS,
            Self::Milestone => milestone::FIELDS,
            Self::Task => task::FIELDS,
            Self::Allocation => allocation::FIELDS,
        }
    }

    /// Looks up one field of the schema.
    #[must_use]
    pub fn field(self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|spec| spec.name == name)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().replace(' ', "-") == wanted || kind.resource() == wanted)
            .ok_or_else(|| format!("unknown record kind '{s}'"))
    }
}

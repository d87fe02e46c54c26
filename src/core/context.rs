//! Cascading loads that feed the cross-record validation rules.
//!
//! A milestone form needs its purchase order and sibling milestones to know the
//! remaining PO balance; an allocation form needs its budget line and sibling
//! allocations. When a record is being edited its own persisted amount is added
//! back so the user is not limited by their previous value.

use crate::api::{ProcurementApi, list_children};
use crate::core::budget::{allocation_headroom, remaining_po_balance};
use crate::core::validation::ValidationContext;
use crate::entities::{
    EntityId, EntityKind, PersistedEntity, allocation, budget_line, milestone, purchase_order,
};
use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use tracing::debug;

fn sibling_amounts(
    siblings: &[PersistedEntity],
    amount_key: &str,
    editing: Option<&EntityId>,
) -> (Vec<Decimal>, Option<Decimal>) {
    let amounts = siblings
        .iter()
        .map(|record| record.amount(amount_key).unwrap_or(Decimal::ZERO))
        .collect();
    let editing_amount = editing.and_then(|id| {
        siblings
            .iter()
            .find(|record| record.id.same_as(id))
            .and_then(|record| record.amount(amount_key))
    });
    (amounts, editing_amount)
}

fn overflowed(what: &str, id: &EntityId) -> Error {
    Error::InvalidResponse {
        message: format!("amounts on {what} {id} overflow"),
    }
}

fn with_record_currency(ctx: ValidationContext, record: &PersistedEntity, key: &str) -> ValidationContext {
    match record.text(key).map(str::trim) {
        Some(code) if !code.is_empty() => ctx.with_currency(code),
        _ => ctx,
    }
}

/// Adds the remaining balance of purchase order `po_id` to `ctx`.
pub async fn load_milestone_context(
    api: &dyn ProcurementApi,
    ctx: ValidationContext,
    po_id: &EntityId,
    editing: Option<&EntityId>,
) -> Result<ValidationContext> {
    let po = api.fetch(EntityKind::PurchaseOrder, po_id).await?;
    let milestones = list_children(api, EntityKind::Milestone, po_id).await?;

    let po_amount = po.amount(purchase_order::PO_AMOUNT).unwrap_or(Decimal::ZERO);
    let (amounts, editing_amount) =
        sibling_amounts(&milestones, milestone::MILESTONE_AMOUNT, editing);
    let balance = remaining_po_balance(po_amount, amounts, editing_amount)
        .ok_or_else(|| overflowed("purchase order", po_id))?;
    debug!(
        "PO {} balance {} across {} milestone(s)",
        po_id,
        balance,
        milestones.len()
    );

    Ok(with_record_currency(ctx, &po, purchase_order::CURRENCY).with_po_balance(balance))
}

/// Adds the unallocated amount of budget line `budget_line_id` to `ctx`.
pub async fn load_allocation_context(
    api: &dyn ProcurementApi,
    ctx: ValidationContext,
    budget_line_id: &EntityId,
    editing: Option<&EntityId>,
) -> Result<ValidationContext> {
    let line = api.fetch(EntityKind::BudgetLine, budget_line_id).await?;
    let allocations = list_children(api, EntityKind::Allocation, budget_line_id).await?;

    let approved = line
        .amount(budget_line::AMOUNT_APPROVED)
        .unwrap_or(Decimal::ZERO);
    let (amounts, editing_amount) =
        sibling_amounts(&allocations, allocation::ALLOCATION_AMOUNT, editing);
    let headroom = allocation_headroom(approved, amounts, editing_amount)
        .ok_or_else(|| overflowed("budget line", budget_line_id))?;
    debug!(
        "Budget line {} headroom {} across {} allocation(s)",
        budget_line_id,
        headroom,
        allocations.len()
    );

    Ok(with_record_currency(ctx, &line, budget_line::CURRENCY).with_allocation_headroom(headroom))
}

/// Loads whatever `kind` needs. Kinds without a parent get `ctx` back as is.
pub async fn load_context(
    api: &dyn ProcurementApi,
    ctx: ValidationContext,
    kind: EntityKind,
    parent_id: Option<&EntityId>,
    editing: Option<&EntityId>,
) -> Result<ValidationContext> {
    match (kind, parent_id) {
        (EntityKind::Milestone, Some(po_id)) => {
            load_milestone_context(api, ctx, po_id, editing).await
        }
        (EntityKind::Allocation, Some(line_id)) => {
            load_allocation_context(api, ctx, line_id, editing).await
        }
        _ => Ok(ctx),
    }
}

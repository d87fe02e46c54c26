//! Forms - one open create, edit or view flow for a record.
//!
//! Each [`Flow`] fixes the record kind, whether the form creates, edits or only
//! shows a record, and when removed documents are deleted on the server. An
//! [`EntityForm`] owns its draft and staging area exclusively.

use crate::api::{Payload, ProcurementApi};
use crate::config::policy::AttachmentPolicy;
use crate::core::context::load_context;
use crate::core::draft::DraftRecord;
use crate::core::notify::{Notification, NotificationSink};
use crate::core::staging::{AddReport, AttachmentStaging, StagedAttachment};
use crate::core::validation::ValidationContext;
use crate::entities::{EntityId, EntityKind, PendingFile, PersistedEntity, Selection};
use crate::errors::{Error, Result};
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// What a form does with its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    /// New record
    Create,
    /// Existing record, saved on submit
    Edit,
    /// Existing record, read-only
    View,
}

/// When a removed pre-existing document is deleted on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// On successful submit of the parent record
    Deferred,
    /// As soon as it is removed from the form
    Immediate,
    /// Never; the form cannot remove documents
    Never,
}

/// Fixed configuration of a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowSpec {
    /// Record kind
    pub kind: EntityKind,
    /// Create, edit or view
    pub mode: FormMode,
    /// Deletion timing for documents
    pub delete_policy: DeletePolicy,
    /// Whether the form carries documents at all
    pub attachments: bool,
    /// Reject new files whose name matches a staged or stored one
    pub reject_duplicate_names: bool,
}

/// Every form the desk can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    /// New purchase order
    AddPurchaseOrder,
    /// Edit a purchase order
    EditPurchaseOrder,
    /// Show a purchase order and its documents
    ViewPurchaseOrder,
    /// New budget line
    AddBudgetLine,
    /// Edit a budget line; the backend may store it under a new id
    EditBudgetLine,
    /// New milestone under a purchase order
    AddMilestone,
    /// Edit a milestone; removed documents are deleted at once
    EditMilestone,
    /// New task
    AddTask,
    /// Edit a task
    EditTask,
    /// New allocation under a budget line
    AddAllocation,
    /// Edit an allocation
    EditAllocation,
}

impl Flow {
    /// Every flow, in menu order.
    pub const ALL: [Self; 11] = [
        Self::AddPurchaseOrder,
        Self::EditPurchaseOrder,
        Self::ViewPurchaseOrder,
        Self::AddBudgetLine,
        Self::EditBudgetLine,
        Self::AddMilestone,
        Self::EditMilestone,
        Self::AddTask,
        Self::EditTask,
        Self::AddAllocation,
        Self::EditAllocation,
    ];

    /// The flow's fixed configuration.
    #[must_use]
    pub const fn spec(self) -> FlowSpec {
        const fn flow(kind: EntityKind, mode: FormMode, delete_policy: DeletePolicy) -> FlowSpec {
            FlowSpec {
                kind,
                mode,
                delete_policy,
                attachments: kind.attachment_level().is_some(),
                reject_duplicate_names: false,
            }
        }

        use DeletePolicy::{Deferred, Immediate, Never};
        use EntityKind::{Allocation, BudgetLine, Milestone, PurchaseOrder, Task};
        use FormMode::{Create, Edit, View};

        match self {
            Self::AddPurchaseOrder => flow(PurchaseOrder, Create, Deferred),
            Self::EditPurchaseOrder => flow(PurchaseOrder, Edit, Deferred),
            Self::ViewPurchaseOrder => flow(PurchaseOrder, View, Never),
            Self::AddBudgetLine => flow(BudgetLine, Create, Deferred),
            Self::EditBudgetLine => flow(BudgetLine, Edit, Deferred),
            Self::AddMilestone => flow(Milestone, Create, Deferred),
            Self::EditMilestone => FlowSpec {
                reject_duplicate_names: true,
                ..flow(Milestone, Edit, Immediate)
            },
            Self::AddTask => flow(Task, Create, Deferred),
            Self::EditTask => flow(Task, Edit, Deferred),
            Self::AddAllocation => flow(Allocation, Create, Never),
            Self::EditAllocation => flow(Allocation, Edit, Never),
        }
    }

    /// Kebab-case name, as used on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AddPurchaseOrder => "add-purchase-order",
            Self::EditPurchaseOrder => "edit-purchase-order",
            Self::ViewPurchaseOrder => "view-purchase-order",
            Self::AddBudgetLine => "add-budget-line",
            Self::EditBudgetLine => "edit-budget-line",
            Self::AddMilestone => "add-milestone",
            Self::EditMilestone => "edit-milestone",
            Self::AddTask => "add-task",
            Self::EditTask => "edit-task",
            Self::AddAllocation => "add-allocation",
            Self::EditAllocation => "edit-allocation",
        }
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Flow {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let squash = |text: &str| {
            text.chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_ascii_lowercase()
        };
        let wanted = squash(s);
        Self::ALL
            .into_iter()
            .find(|flow| squash(flow.name()) == wanted)
            .ok_or_else(|| format!("unknown flow '{s}'"))
    }
}

/// One open form.
#[derive(Debug, Clone)]
pub struct EntityForm {
    flow: Flow,
    draft: DraftRecord,
    staging: Option<AttachmentStaging>,
    record: Option<PersistedEntity>,
    parent_id: Option<EntityId>,
}

impl EntityForm {
    fn blank(flow: Flow, policy: &AttachmentPolicy) -> Self {
        let spec = flow.spec();
        let staging = spec.attachments.then(|| {
            AttachmentStaging::new(policy.clone())
                .with_duplicate_name_check(spec.reject_duplicate_names)
        });
        Self {
            flow,
            draft: DraftRecord::new(spec.kind),
            staging,
            record: None,
            parent_id: None,
        }
    }

    /// Opens an empty create form.
    ///
    /// # Errors
    /// Returns [`Error::Config`] for edit and view flows, which need a record.
    pub fn open_create(flow: Flow, policy: &AttachmentPolicy) -> Result<Self> {
        if flow.spec().mode != FormMode::Create {
            return Err(Error::Config {
                message: format!("{flow} needs an existing record id"),
            });
        }
        debug!("Opening {}", flow);
        Ok(Self::blank(flow, policy))
    }

    /// Opens an edit or view form, fetching the record and its documents fresh.
    ///
    /// # Errors
    /// Create flows are refused with [`Error::Config`]; fetch failures propagate.
    pub async fn open_existing(
        api: &dyn ProcurementApi,
        flow: Flow,
        id: &EntityId,
        policy: &AttachmentPolicy,
    ) -> Result<Self> {
        let spec = flow.spec();
        if spec.mode == FormMode::Create {
            return Err(Error::Config {
                message: format!("{flow} does not take a record id"),
            });
        }
        debug!("Opening {} for {} {}", flow, spec.kind, id);

        let record = api.fetch(spec.kind, id).await?;
        let mut form = Self::blank(flow, policy);
        if let Some(staging) = form.staging.as_mut() {
            let existing = api.list_attachments(spec.kind, &record.id).await?;
            staging.load_existing(existing);
        }
        form.draft = DraftRecord::from_entity(&record);
        form.parent_id = spec
            .kind
            .parent_key()
            .and_then(|key| record.reference(key));
        form.record = Some(record);
        Ok(form)
    }

    /// Sets the owning record (purchase order of a milestone, budget line of
    /// an allocation).
    #[must_use]
    pub fn with_parent(mut self, parent_id: EntityId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// The flow this form was opened for.
    #[must_use]
    pub const fn flow(&self) -> Flow {
        self.flow
    }

    /// Shorthand for `self.flow().spec()`.
    #[must_use]
    pub const fn spec(&self) -> FlowSpec {
        self.flow.spec()
    }

    /// Current draft.
    #[must_use]
    pub const fn draft(&self) -> &DraftRecord {
        &self.draft
    }

    /// Staging area, for flows that carry documents.
    #[must_use]
    pub const fn staging(&self) -> Option<&AttachmentStaging> {
        self.staging.as_ref()
    }

    /// Record the form was opened with (edit and view flows).
    #[must_use]
    pub const fn record(&self) -> Option<&PersistedEntity> {
        self.record.as_ref()
    }

    /// Id of the record the form was opened with.
    #[must_use]
    pub fn record_id(&self) -> Option<&EntityId> {
        self.record.as_ref().map(|record| &record.id)
    }

    /// Owning record id, if any.
    #[must_use]
    pub const fn parent_id(&self) -> Option<&EntityId> {
        self.parent_id.as_ref()
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.spec().mode == FormMode::View {
            return Err(Error::ReadOnly {
                target: format!("{} form", self.flow),
            });
        }
        Ok(())
    }

    fn staging_mut(&mut self) -> Result<&mut AttachmentStaging> {
        let kind = self.spec().kind;
        self.staging.as_mut().ok_or_else(|| Error::ReadOnly {
            target: format!("{kind} documents"),
        })
    }

    /// Applies typed input to a field.
    pub fn set_text(&mut self, field: &str, raw: &str) -> Result<()> {
        self.ensure_writable()?;
        self.draft.set_text(field, raw)
    }

    /// Sets a date field.
    pub fn set_date(&mut self, field: &str, date: NaiveDate) -> Result<()> {
        self.ensure_writable()?;
        self.draft.set_date(field, date)
    }

    /// Sets a dropdown field.
    pub fn set_choice(&mut self, field: &str, selection: Selection) -> Result<()> {
        self.ensure_writable()?;
        self.draft.set_choice(field, selection)
    }

    /// Stages new files.
    ///
    /// Skipped files and a batch refused for exceeding the document cap are
    /// reported to `sink` as warnings.
    pub fn add_attachments(
        &mut self,
        files: Vec<PendingFile>,
        sink: &dyn NotificationSink,
    ) -> Result<AddReport> {
        self.ensure_writable()?;
        match self.staging_mut()?.add(files) {
            Ok(report) => {
                for message in &report.skipped {
                    sink.notify(Notification::warning(message.clone()));
                }
                Ok(report)
            }
            Err(e) => {
                if let Error::Guard(rejection) = &e {
                    sink.notify(Notification::warning(rejection.to_string()));
                }
                Err(e)
            }
        }
    }

    /// Unstages the document at `index`.
    ///
    /// For flows with [`DeletePolicy::Immediate`] an existing document is
    /// deleted on the server right away; if that call fails the document stays
    /// staged, `sink` gets an error and the error is returned.
    pub async fn remove_attachment(
        &mut self,
        api: &dyn ProcurementApi,
        sink: &dyn NotificationSink,
        index: usize,
    ) -> Result<StagedAttachment> {
        self.ensure_writable()?;
        let policy = self.spec().delete_policy;
        if policy == DeletePolicy::Never {
            return Err(Error::ReadOnly {
                target: format!("{} documents", self.spec().kind),
            });
        }

        let staging = self.staging_mut()?;
        let removed = staging.remove(index)?;
        let server_id = removed
            .server_id()
            .filter(|_| policy == DeletePolicy::Immediate)
            .cloned();
        let Some(server_id) = server_id else {
            return Ok(removed);
        };

        match api.delete_attachment(&server_id).await {
            Ok(()) => {
                info!("Deleted document '{}' ({})", removed.name(), server_id);
                staging.forget_original(&server_id);
                Ok(removed)
            }
            Err(e) => {
                warn!("Failed to delete document '{}': {}", removed.name(), e);
                sink.notify(Notification::error(format!(
                    "Could not delete {}: {}",
                    removed.name(),
                    e
                )));
                staging.restore(index, removed);
                Err(e)
            }
        }
    }

    /// Unstages every document. Existing documents removed this way are
    /// deleted by the submit-time diff, which refuses to delete all of them.
    pub fn clear_attachments(&mut self) -> Result<()> {
        self.ensure_writable()?;
        self.staging_mut()?.unstage_all();
        Ok(())
    }

    /// Body for the create or update call, including the owning record
    /// reference. Edit forms send cleared fields as `null`.
    #[must_use]
    pub fn payload(&self) -> Payload {
        let mut payload = match self.spec().mode {
            FormMode::Edit => self.draft.to_update_payload(),
            FormMode::Create | FormMode::View => self.draft.to_payload(),
        };
        if let (Some(key), Some(parent)) = (self.spec().kind.parent_key(), &self.parent_id) {
            payload.insert(key.to_string(), parent.to_json());
        }
        payload
    }

    /// Loads the cross-record facts this form's rules need.
    pub async fn load_context(
        &self,
        api: &dyn ProcurementApi,
        ctx: ValidationContext,
    ) -> Result<ValidationContext> {
        load_context(
            api,
            ctx,
            self.spec().kind,
            self.parent_id.as_ref(),
            self.record_id(),
        )
        .await
    }

    /// Text that labels uploaded documents: the record's first field value, or
    /// its kind.
    #[must_use]
    pub fn document_description(&self) -> String {
        self.spec()
            .kind
            .fields()
            .first()
            .and_then(|spec| self.draft.text(spec.name))
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map_or_else(|| self.spec().kind.label().to_string(), str::to_string)
    }

    pub(crate) fn draft_mut(&mut self) -> &mut DraftRecord {
        &mut self.draft
    }

    /// Discards the draft and staged documents.
    pub fn reset(&mut self) {
        self.draft.reset();
        if let Some(staging) = self.staging.as_mut() {
            staging.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{milestone, purchase_order, task};
    use crate::core::notify::Severity;
    use crate::test_utils::{ApiCall, FakeApi, RecordingSink, pdf};
    use serde_json::{Value, json};

    fn policy() -> AttachmentPolicy {
        AttachmentPolicy::default()
    }

    fn api_with_milestone() -> FakeApi {
        let api = FakeApi::new();
        api.seed(
            EntityKind::Milestone,
            json!({
                "id": 9,
                "poId": 3,
                "milestoneName": "Kickoff",
                "milestoneDescription": "Project start",
                "milestoneAmount": "1000.00"
            }),
        );
        api.seed_attachment(EntityKind::Milestone, EntityId::Int(9), 1, "Plan.pdf");
        api.seed_attachment(EntityKind::Milestone, EntityId::Int(9), 2, "Budget.xlsx");
        api
    }

    #[test]
    fn test_flow_catalogue() {
        let edit_milestone = Flow::EditMilestone.spec();
        assert_eq!(edit_milestone.delete_policy, DeletePolicy::Immediate);
        assert!(edit_milestone.reject_duplicate_names);

        let view = Flow::ViewPurchaseOrder.spec();
        assert_eq!(view.mode, FormMode::View);
        assert_eq!(view.delete_policy, DeletePolicy::Never);

        assert!(!Flow::AddAllocation.spec().attachments);
        for flow in [Flow::EditPurchaseOrder, Flow::EditBudgetLine, Flow::EditTask] {
            assert_eq!(flow.spec().delete_policy, DeletePolicy::Deferred, "{flow}");
            assert!(!flow.spec().reject_duplicate_names, "{flow}");
        }
    }

    #[test]
    fn test_flow_from_str_is_lenient() {
        assert_eq!("edit-milestone".parse::<Flow>().unwrap(), Flow::EditMilestone);
        assert_eq!("EditMilestone".parse::<Flow>().unwrap(), Flow::EditMilestone);
        assert_eq!("add_budget_line".parse::<Flow>().unwrap(), Flow::AddBudgetLine);
        assert!("archive-po".parse::<Flow>().is_err());
        for flow in Flow::ALL {
            assert_eq!(flow.to_string().parse::<Flow>().unwrap(), flow);
        }
    }

    #[test]
    fn test_open_create_refuses_edit_flows() {
        assert!(matches!(
            EntityForm::open_create(Flow::EditTask, &policy()),
            Err(Error::Config { .. })
        ));
        let form = EntityForm::open_create(Flow::AddTask, &policy()).unwrap();
        assert!(form.draft().is_empty());
        assert!(form.staging().unwrap().is_empty());
        assert!(form.record_id().is_none());
    }

    #[tokio::test]
    async fn test_open_existing_fetches_record_and_documents() {
        let api = api_with_milestone();

        let form = EntityForm::open_existing(&api, Flow::EditMilestone, &EntityId::Int(9), &policy())
            .await
            .unwrap();

        assert_eq!(
            api.calls(),
            [
                ApiCall::Fetch {
                    kind: EntityKind::Milestone,
                    id: EntityId::Int(9)
                },
                ApiCall::ListAttachments {
                    kind: EntityKind::Milestone,
                    parent_id: EntityId::Int(9)
                },
            ]
        );
        assert_eq!(form.draft().text(milestone::MILESTONE_NAME), Some("Kickoff"));
        assert_eq!(form.parent_id(), Some(&EntityId::Int(3)));
        assert_eq!(form.staging().unwrap().len(), 2);
        assert_eq!(form.payload()["poId"], json!(3));
    }

    #[tokio::test]
    async fn test_open_existing_refuses_create_flows() {
        let api = FakeApi::new();
        let result = EntityForm::open_existing(&api, Flow::AddTask, &EntityId::Int(1), &policy()).await;
        assert!(matches!(result, Err(Error::Config { .. })));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_view_form_is_read_only() {
        let api = FakeApi::new();
        api.seed(EntityKind::PurchaseOrder, json!({"id": 4, "poNumber": "PO-4"}));
        api.seed_attachment(EntityKind::PurchaseOrder, EntityId::Int(4), 1, "po.pdf");

        let mut form =
            EntityForm::open_existing(&api, Flow::ViewPurchaseOrder, &EntityId::Int(4), &policy())
                .await
                .unwrap();

        assert_eq!(form.staging().unwrap().len(), 1);
        assert!(matches!(
            form.set_text(purchase_order::PO_NUMBER, "PO-5"),
            Err(Error::ReadOnly { .. })
        ));
        assert!(matches!(
            form.add_attachments(vec![pdf("x.pdf")], &RecordingSink::default()),
            Err(Error::ReadOnly { .. })
        ));
        assert!(matches!(
            form.remove_attachment(&api, &RecordingSink::default(), 0).await,
            Err(Error::ReadOnly { .. })
        ));
        assert_eq!(form.draft().text(purchase_order::PO_NUMBER), Some("PO-4"));
    }

    #[tokio::test]
    async fn test_edit_milestone_deletes_removed_document_immediately() {
        let api = api_with_milestone();
        let mut form =
            EntityForm::open_existing(&api, Flow::EditMilestone, &EntityId::Int(9), &policy())
                .await
                .unwrap();

        let removed = form
            .remove_attachment(&api, &RecordingSink::default(), 0)
            .await
            .unwrap();

        assert_eq!(removed.name(), "Plan.pdf");
        assert_eq!(
            api.calls().last(),
            Some(&ApiCall::DeleteAttachment(EntityId::Int(1)))
        );
        assert_eq!(api.stored_attachments(EntityKind::Milestone, &EntityId::Int(9)).len(), 1);
        assert!(form.staging().unwrap().diff().removed.is_empty());
    }

    #[tokio::test]
    async fn test_failed_immediate_delete_keeps_document_staged() {
        let api = api_with_milestone();
        api.fail_delete_of(EntityId::Int(2));
        let mut form =
            EntityForm::open_existing(&api, Flow::EditMilestone, &EntityId::Int(9), &policy())
                .await
                .unwrap();

        let sink = RecordingSink::default();

        let result = form.remove_attachment(&api, &sink, 1).await;

        assert!(matches!(result, Err(Error::Api { status: 500, .. })));
        let notes = sink.take();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity, Severity::Error);
        assert!(notes[0].message.starts_with("Could not delete Budget.xlsx"));
        let names: Vec<_> = form
            .staging()
            .unwrap()
            .items()
            .iter()
            .map(StagedAttachment::name)
            .collect();
        assert_eq!(names, ["Plan.pdf", "Budget.xlsx"]);
    }

    #[tokio::test]
    async fn test_edit_milestone_rejects_duplicate_names() {
        let api = api_with_milestone();
        let mut form =
            EntityForm::open_existing(&api, Flow::EditMilestone, &EntityId::Int(9), &policy())
                .await
                .unwrap();

        let sink = RecordingSink::default();

        let report = form.add_attachments(vec![pdf("plan.PDF")], &sink).unwrap();

        assert_eq!(report.added, 0);
        assert_eq!(report.skipped, ["plan.PDF is already attached"]);
        assert_eq!(
            sink.take(),
            [Notification::warning("plan.PDF is already attached")]
        );
    }

    #[tokio::test]
    async fn test_edit_task_defers_deletion_to_submit() {
        let api = FakeApi::new();
        api.seed(EntityKind::Task, json!({"id": 6, "taskName": "Review"}));
        api.seed_attachment(EntityKind::Task, EntityId::Int(6), 1, "notes.txt");
        let mut form = EntityForm::open_existing(&api, Flow::EditTask, &EntityId::Int(6), &policy())
            .await
            .unwrap();
        let calls_before = api.calls().len();

        form.remove_attachment(&api, &RecordingSink::default(), 0)
            .await
            .unwrap();

        assert_eq!(api.calls().len(), calls_before);
        assert_eq!(form.staging().unwrap().diff().removed.len(), 1);
    }

    #[test]
    fn test_clear_attachments_keeps_snapshot_for_diff() {
        let mut form = EntityForm::open_create(Flow::AddTask, &policy()).unwrap();
        form.add_attachments(vec![pdf("a.pdf"), pdf("b.pdf")], &RecordingSink::default())
            .unwrap();

        form.clear_attachments().unwrap();

        let diff = form.staging().unwrap().diff();
        assert!(diff.added.is_empty());
        assert!(diff.removed.is_empty());
    }

    #[test]
    fn test_allocation_forms_carry_no_documents() {
        let mut form = EntityForm::open_create(Flow::AddAllocation, &policy()).unwrap();
        assert!(form.staging().is_none());
        assert!(matches!(
            form.add_attachments(vec![pdf("a.pdf")], &RecordingSink::default()),
            Err(Error::ReadOnly { .. })
        ));
    }

    #[test]
    fn test_refused_batch_is_reported_as_warning() {
        let mut form = EntityForm::open_create(Flow::AddTask, &policy()).unwrap();
        let sink = RecordingSink::default();
        let files = ["a", "b", "c", "d", "e"].map(|name| pdf(&format!("{name}.pdf")));

        let result = form.add_attachments(Vec::from(files), &sink);

        assert!(matches!(result, Err(Error::Guard(_))));
        assert!(form.staging().unwrap().is_empty());
        assert_eq!(sink.take(), [Notification::warning("Maximum 4 documents allowed")]);
    }

    #[test]
    fn test_payload_includes_parent_reference() {
        let mut form = EntityForm::open_create(Flow::AddAllocation, &policy())
            .unwrap()
            .with_parent(EntityId::from("BL-1"));
        form.set_text("allocationAmount", "250").unwrap();

        let payload = form.payload();
        assert_eq!(payload["budgetLineId"], json!("BL-1"));
        assert_eq!(payload["allocationAmount"], json!("250.00"));
    }

    #[tokio::test]
    async fn test_edit_payload_nulls_cleared_fields() {
        let api = FakeApi::new();
        api.seed(
            EntityKind::PurchaseOrder,
            json!({
                "id": 7,
                "poNumber": "PO-7",
                "poType": 2,
                "poAmount": "5000.00",
                "customer": 3,
                "spoc": 4,
                "endDate": "2031-01-01",
                "description": "Old notes"
            }),
        );
        let mut form =
            EntityForm::open_existing(&api, Flow::EditPurchaseOrder, &EntityId::Int(7), &policy())
                .await
                .unwrap();

        form.set_text(purchase_order::DESCRIPTION, "").unwrap();
        form.set_text(purchase_order::SPOC, "").unwrap();
        form.set_text(purchase_order::END_DATE, "").unwrap();
        let payload = form.payload();

        assert_eq!(payload["poNumber"], json!("PO-7"));
        assert_eq!(payload["customer"], json!(3));
        assert_eq!(payload["customerName"], Value::Null);
        assert_eq!(payload["description"], Value::Null);
        assert_eq!(payload["spoc"], Value::Null);
        assert_eq!(payload["spocName"], Value::Null);
        assert_eq!(payload["endDate"], Value::Null);
    }

    #[test]
    fn test_create_payload_omits_empty_fields() {
        let mut form = EntityForm::open_create(Flow::AddPurchaseOrder, &policy()).unwrap();
        form.set_text(purchase_order::PO_NUMBER, "PO-8").unwrap();
        form.set_text(purchase_order::DESCRIPTION, "").unwrap();

        let payload = form.payload();

        assert_eq!(payload.len(), 1);
        assert_eq!(payload["poNumber"], json!("PO-8"));
    }

    #[test]
    fn test_document_description_uses_first_field() {
        let mut form = EntityForm::open_create(Flow::AddTask, &policy()).unwrap();
        assert_eq!(form.document_description(), "task");
        form.set_text(task::TASK_NAME, "  Site survey ").unwrap();
        assert_eq!(form.document_description(), "Site survey");
    }
}

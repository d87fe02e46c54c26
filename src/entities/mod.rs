//! Entity module - record kinds, their form schemas and the shapes the backend
//! returns. Each record kind has its own module listing its field names and
//! schema; the rest of the crate works from [`EntityKind`] generically.

pub mod allocation;
pub mod attachment;
pub mod budget_line;
pub mod field;
pub mod kind;
pub mod milestone;
pub mod persisted;
pub mod purchase_order;
pub mod task;

pub use attachment::{AttachmentMeta, AttachmentUpload, PendingFile};
pub use field::{FieldKind, FieldSpec, Selection};
pub use kind::EntityKind;
pub use persisted::{EntityId, PersistedEntity};

//! REST path shapes.

use crate::entities::{EntityId, EntityKind};

/// Resource that stores documents for every parent kind.
pub const DOCUMENTS: &str = "documents";

/// `POST {base}/{resource}/add`
#[must_use]
pub fn create(base: &str, kind: EntityKind) -> String {
    format!("{base}/{}/add", kind.resource())
}

/// `PUT {base}/{resource}/edit/{id}`
#[must_use]
pub fn update(base: &str, kind: EntityKind, id: &EntityId) -> String {
    format!("{base}/{}/edit/{id}", kind.resource())
}

/// `GET` or `DELETE {base}/{resource}/{id}`
#[must_use]
pub fn item(base: &str, kind: EntityKind, id: &EntityId) -> String {
    format!("{base}/{}/{id}", kind.resource())
}

/// `GET {base}/{resource}`
#[must_use]
pub fn collection(base: &str, kind: EntityKind) -> String {
    format!("{base}/{}", kind.resource())
}

/// `POST {base}/documents/upload`
#[must_use]
pub fn upload(base: &str) -> String {
    format!("{base}/{DOCUMENTS}/upload")
}

/// `DELETE {base}/documents/{id}`
#[must_use]
pub fn attachment(base: &str, id: &EntityId) -> String {
    format!("{base}/{DOCUMENTS}/{id}")
}

/// `GET {base}/documents/filter`, queried with `level` and `referenceId`
#[must_use]
pub fn attachment_filter(base: &str) -> String {
    format!("{base}/{DOCUMENTS}/filter")
}

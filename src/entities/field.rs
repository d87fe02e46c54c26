//! Field schema shared by every entity form.
//!
//! An entity is described by a static list of [`FieldSpec`]s. The draft record,
//! the validator and the payload builder all work from that list, so adding a
//! field to an entity is a one-line change in its module.

use crate::entities::persisted::EntityId;
use serde::{Deserialize, Serialize};

/// How a field's value is entered, stored and sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text, trimmed on submit
    Text,
    /// decimal(15,2) money amount typed by the user
    Amount,
    /// decimal(15,2) money amount computed from other fields, never typed
    DerivedAmount,
    /// Calendar date
    Date {
        /// Reject today and earlier dates
        future_only: bool,
    },
    /// Dropdown value
    Choice {
        /// Payload key for text the user typed instead of picking an option.
        /// `None` means only known options are accepted.
        freeform_key: Option<&'static str>,
    },
}

/// One field of an entity form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Payload / JSON key
    pub name: &'static str,
    /// Label used in messages
    pub label: &'static str,
    /// Value kind
    pub kind: FieldKind,
    /// Must be filled before submit
    pub required: bool,
    /// Maximum length in characters (text fields)
    pub max_len: Option<usize>,
}

impl FieldSpec {
    /// Optional text field with a length cap.
    #[must_use]
    pub const fn text(name: &'static str, label: &'static str, max_len: usize) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Text,
            required: false,
            max_len: Some(max_len),
        }
    }

    /// Optional amount field.
    #[must_use]
    pub const fn amount(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Amount,
            required: false,
            max_len: None,
        }
    }

    /// Computed amount field.
    #[must_use]
    pub const fn derived_amount(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::DerivedAmount,
            required: false,
            max_len: None,
        }
    }

    /// Optional date field.
    #[must_use]
    pub const fn date(name: &'static str, label: &'static str, future_only: bool) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Date { future_only },
            required: false,
            max_len: None,
        }
    }

    /// Optional dropdown field.
    #[must_use]
    pub const fn choice(
        name: &'static str,
        label: &'static str,
        freeform_key: Option<&'static str>,
    ) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Choice { freeform_key },
            required: false,
            max_len: None,
        }
    }

    /// Marks the field as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Overrides the length cap (used for freeform choice text).
    #[must_use]
    pub const fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }
}

/// A dropdown value. Creatable dropdowns let the user type a value that is not
/// in the fetched option list; that case is kept distinct instead of being
/// guessed later from the value's shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    /// An option the server already knows, by id
    Known(EntityId),
    /// Text typed by the user
    Freeform(String),
}

impl Selection {
    /// Whether the selection carries nothing usable.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Known(_) => false,
            Self::Freeform(text) => text.trim().is_empty(),
        }
    }
}

//! Draft record - the form state of one entity being created or edited.
//!
//! A draft holds the current value of every field the user touched plus the
//! field errors from the last validation run. Keystroke input is normalized on
//! the way in: text is cut at the field's length cap and amounts are clamped to
//! decimal(15,2). Derived fields are recomputed after every change.

use crate::core::amount::{format_amount, parse_amount, sanitize_amount};
use crate::core::budget::available_amount;
use crate::core::validation::ErrorMap;
use crate::entities::persisted::decimal_from_json;
use crate::entities::{
    EntityId, EntityKind, FieldKind, FieldSpec, PersistedEntity, Selection, budget_line,
};
use crate::errors::{Error, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Date format used on the wire and in text input
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The value of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Text and amount fields (amounts are kept as sanitized text)
    Text(String),
    /// Date fields
    Date(NaiveDate),
    /// Dropdown fields
    Choice(Selection),
}

/// Parses a `YYYY-MM-DD` date, tolerating a trailing time part.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).map_err(|_| Error::InvalidDate {
        input: input.to_string(),
    })
}

/// Form state for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftRecord {
    kind: EntityKind,
    values: BTreeMap<&'static str, FieldValue>,
    errors: ErrorMap,
}

impl DraftRecord {
    /// An empty draft, as when a create form opens.
    #[must_use]
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            values: BTreeMap::new(),
            errors: ErrorMap::new(),
        }
    }

    /// A draft pre-populated from a fetched record, as when an edit form opens.
    ///
    /// Values are taken as stored; over-long text is kept so that validation
    /// reports it instead of silently truncating server data.
    #[must_use]
    pub fn from_entity(entity: &PersistedEntity) -> Self {
        let mut draft = Self::new(entity.kind);
        for spec in entity.kind.fields() {
            let raw = entity.body.get(spec.name);
            let value = match spec.kind {
                FieldKind::Text => raw.and_then(Value::as_str).map(|s| FieldValue::Text(s.to_string())),
                FieldKind::Amount | FieldKind::DerivedAmount => raw
                    .and_then(decimal_from_json)
                    .map(|amount| FieldValue::Text(format_amount(amount))),
                FieldKind::Date { .. } => raw
                    .and_then(Value::as_str)
                    .and_then(|s| parse_date(s).ok())
                    .map(FieldValue::Date),
                FieldKind::Choice { freeform_key } => raw
                    .and_then(EntityId::from_json)
                    .map(Selection::Known)
                    .or_else(|| {
                        freeform_key
                            .and_then(|key| entity.body.get(key))
                            .and_then(Value::as_str)
                            .filter(|text| !text.trim().is_empty())
                            .map(|text| Selection::Freeform(text.to_string()))
                    })
                    .map(FieldValue::Choice),
            };
            if let Some(value) = value {
                draft.values.insert(spec.name, value);
            }
        }
        draft.recompute_derived();
        draft
    }

    /// Which entity this draft is for.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    fn spec(&self, field: &str) -> Result<&'static FieldSpec> {
        self.kind.field(field).ok_or_else(|| Error::UnknownField {
            entity: self.kind.label().to_string(),
            field: field.to_string(),
        })
    }

    fn store(&mut self, spec: &'static FieldSpec, value: Option<FieldValue>) {
        match value {
            Some(value) => {
                self.values.insert(spec.name, value);
            }
            None => {
                self.values.remove(spec.name);
            }
        }
        self.errors.remove(spec.name);
        self.recompute_derived();
    }

    /// Applies raw typed input to a field.
    ///
    /// Text is cut at the field's length cap, amounts are clamped, dates are
    /// parsed and dropdown text becomes a freeform selection. Empty input
    /// clears the field.
    ///
    /// # Errors
    /// Unknown fields, computed fields and unparsable dates are rejected.
    pub fn set_text(&mut self, field: &str, raw: &str) -> Result<()> {
        let spec = self.spec(field)?;
        let value = match spec.kind {
            FieldKind::DerivedAmount => {
                return Err(Error::ReadOnly {
                    target: spec.label.to_string(),
                });
            }
            FieldKind::Text => Some(truncate(raw, spec.max_len)),
            FieldKind::Amount => Some(FieldValue::Text(sanitize_amount(raw))),
            FieldKind::Date { .. } if raw.trim().is_empty() => None,
            FieldKind::Date { .. } => Some(FieldValue::Date(parse_date(raw)?)),
            FieldKind::Choice { .. } => Some(FieldValue::Choice(Selection::Freeform(
                truncate_str(raw, spec.max_len),
            ))),
        };
        let value = value.filter(|v| match v {
            FieldValue::Text(text) => !text.is_empty(),
            FieldValue::Choice(selection) => !selection.is_blank(),
            FieldValue::Date(_) => true,
        });
        self.store(spec, value);
        Ok(())
    }

    /// Sets a date field.
    pub fn set_date(&mut self, field: &str, date: NaiveDate) -> Result<()> {
        let spec = self.spec(field)?;
        if !matches!(spec.kind, FieldKind::Date { .. }) {
            return Err(Error::InvalidDate {
                input: format!("{field} is not a date field"),
            });
        }
        self.store(spec, Some(FieldValue::Date(date)));
        Ok(())
    }

    /// Sets a dropdown field.
    pub fn set_choice(&mut self, field: &str, selection: Selection) -> Result<()> {
        let spec = self.spec(field)?;
        let FieldKind::Choice { .. } = spec.kind else {
            return Err(Error::UnknownField {
                entity: self.kind.label().to_string(),
                field: format!("{field} (not a dropdown)"),
            });
        };
        let selection = match selection {
            Selection::Freeform(text) => Selection::Freeform(truncate_str(&text, spec.max_len)),
            known @ Selection::Known(_) => known,
        };
        self.store(spec, Some(FieldValue::Choice(selection)));
        Ok(())
    }

    /// Clears one field.
    pub fn clear_field(&mut self, field: &str) -> Result<()> {
        let spec = self.spec(field)?;
        self.store(spec, None);
        Ok(())
    }

    /// Current value of a field.
    #[must_use]
    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Text (or amount text) of a field.
    #[must_use]
    pub fn text(&self, field: &str) -> Option<&str> {
        match self.values.get(field)? {
            FieldValue::Text(text) => Some(text),
            FieldValue::Date(_) | FieldValue::Choice(_) => None,
        }
    }

    /// Parsed amount of a field, if it holds a valid one.
    #[must_use]
    pub fn amount(&self, field: &str) -> Option<Decimal> {
        self.text(field).and_then(|text| parse_amount(text).ok())
    }

    /// Date of a field.
    #[must_use]
    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        match self.values.get(field)? {
            FieldValue::Date(date) => Some(*date),
            FieldValue::Text(_) | FieldValue::Choice(_) => None,
        }
    }

    /// Selection of a dropdown field.
    #[must_use]
    pub fn choice(&self, field: &str) -> Option<&Selection> {
        match self.values.get(field)? {
            FieldValue::Choice(selection) => Some(selection),
            FieldValue::Text(_) | FieldValue::Date(_) => None,
        }
    }

    /// Errors from the last validation run.
    #[must_use]
    pub const fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    /// Replaces the displayed field errors.
    pub fn set_errors(&mut self, errors: ErrorMap) {
        self.errors = errors;
    }

    /// Whether no field has a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Discards every value and error.
    pub fn reset(&mut self) {
        self.values.clear();
        self.errors.clear();
    }

    /// Serializable payload for the create call.
    ///
    /// Empty fields are omitted. Amounts are sent as two-decimal strings, dates
    /// as `YYYY-MM-DD`. A known dropdown option is sent under the field's own
    /// key; freeform text goes under the field's freeform key instead.
    #[must_use]
    pub fn to_payload(&self) -> Map<String, Value> {
        self.build_payload(false)
    }

    /// Payload for the update call: like [`Self::to_payload`], but every
    /// empty field is sent as `null` so the server clears its stored value.
    /// The unused key of a dropdown with a freeform key is nulled as well.
    #[must_use]
    pub fn to_update_payload(&self) -> Map<String, Value> {
        self.build_payload(true)
    }

    fn build_payload(&self, send_cleared: bool) -> Map<String, Value> {
        let mut payload = Map::new();
        let clear = |payload: &mut Map<String, Value>, key: &str| {
            if send_cleared {
                payload.insert(key.to_string(), Value::Null);
            }
        };
        for spec in self.kind.fields() {
            let freeform_key = match spec.kind {
                FieldKind::Choice { freeform_key } => freeform_key,
                _ => None,
            };
            let Some(value) = self.values.get(spec.name) else {
                clear(&mut payload, spec.name);
                if let Some(key) = freeform_key {
                    clear(&mut payload, key);
                }
                continue;
            };
            match (spec.kind, value) {
                (FieldKind::Amount | FieldKind::DerivedAmount, FieldValue::Text(text)) => {
                    let rendered = parse_amount(text).map_or_else(|_| text.clone(), format_amount);
                    payload.insert(spec.name.to_string(), Value::String(rendered));
                }
                (_, FieldValue::Text(text)) => {
                    let trimmed = text.trim();
                    if trimmed.is_empty() {
                        clear(&mut payload, spec.name);
                    } else {
                        payload.insert(spec.name.to_string(), Value::String(trimmed.to_string()));
                    }
                }
                (_, FieldValue::Date(date)) => {
                    payload.insert(
                        spec.name.to_string(),
                        Value::String(date.format(DATE_FORMAT).to_string()),
                    );
                }
                (_, FieldValue::Choice(Selection::Known(id))) => {
                    payload.insert(spec.name.to_string(), id.to_json());
                    if let Some(key) = freeform_key {
                        clear(&mut payload, key);
                    }
                }
                (_, FieldValue::Choice(Selection::Freeform(text))) => {
                    let text = text.trim();
                    match freeform_key {
                        Some(key) if !text.is_empty() => {
                            payload.insert(key.to_string(), Value::String(text.to_string()));
                        }
                        Some(key) => clear(&mut payload, key),
                        None => {}
                    }
                    clear(&mut payload, spec.name);
                }
            }
        }
        payload
    }

    fn recompute_derived(&mut self) {
        if self.kind != EntityKind::BudgetLine {
            return;
        }
        let approved = self.amount(budget_line::AMOUNT_APPROVED);
        let utilized = self
            .amount(budget_line::AMOUNT_UTILIZED)
            .unwrap_or(Decimal::ZERO);
        match approved.and_then(|approved| available_amount(approved, utilized)) {
            Some(available) => {
                self.values.insert(
                    budget_line::AMOUNT_AVAILABLE,
                    FieldValue::Text(format_amount(available)),
                );
            }
            None => {
                self.values.remove(budget_line::AMOUNT_AVAILABLE);
            }
        }
    }
}

fn truncate_str(raw: &str, max_len: Option<usize>) -> String {
    match max_len {
        Some(max) => raw.chars().take(max).collect(),
        None => raw.to_string(),
    }
}

fn truncate(raw: &str, max_len: Option<usize>) -> FieldValue {
    FieldValue::Text(truncate_str(raw, max_len))
}

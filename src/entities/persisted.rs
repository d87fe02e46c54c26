//! Records as the backend returns them.
//!
//! The backend is an external collaborator; its JSON bodies are kept as-is in
//! [`PersistedEntity::body`] and read through the typed accessors below.

use crate::entities::kind::EntityKind;
use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Server-assigned identifier. Some resources use integers, others strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    /// Numeric id
    Int(i64),
    /// String id
    Text(String),
}

impl EntityId {
    /// Reads an id from a JSON value (number or non-empty string).
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self::Int),
            Value::String(s) if !s.trim().is_empty() => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// JSON form of the id, preserving its original type.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Int(n) => Value::from(*n),
            Self::Text(s) => Value::from(s.as_str()),
        }
    }

    /// Loose equality used when matching references: `12` and `"12"` are the
    /// same record.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl FromStr for EntityId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("id cannot be empty".to_string());
        }
        Ok(trimmed
            .parse::<i64>()
            .map_or_else(|_| Self::Text(trimmed.to_string()), Self::Int))
    }
}

/// Reads a money amount from a JSON number or numeric string.
#[must_use]
pub fn decimal_from_json(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

/// A record that exists in the remote store.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedEntity {
    /// What kind of record this is
    pub kind: EntityKind,
    /// Server-assigned id
    pub id: EntityId,
    /// Full JSON body as returned
    pub body: Value,
}

impl PersistedEntity {
    /// Wraps a response body, extracting its `id`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidResponse`] when the body has no usable `id`.
    pub fn from_json(kind: EntityKind, body: Value) -> Result<Self> {
        let id = body
            .get("id")
            .and_then(EntityId::from_json)
            .ok_or_else(|| Error::InvalidResponse {
                message: format!("{} response has no id", kind.label()),
            })?;
        Ok(Self { kind, id, body })
    }

    /// String field, if present.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.body.get(key).and_then(Value::as_str)
    }

    /// Money field, if present and numeric.
    #[must_use]
    pub fn amount(&self, key: &str) -> Option<Decimal> {
        self.body.get(key).and_then(decimal_from_json)
    }

    /// Reference to another record, if present.
    #[must_use]
    pub fn reference(&self, key: &str) -> Option<EntityId> {
        self.body.get(key).and_then(EntityId::from_json)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_id_parsing() {
        assert_eq!("42".parse::<EntityId>().unwrap(), EntityId::Int(42));
        assert_eq!(
            "PO-7".parse::<EntityId>().unwrap(),
            EntityId::Text("PO-7".to_string())
        );
        assert!("  ".parse::<EntityId>().is_err());
    }

    #[test]
    fn test_entity_id_json_keeps_type() {
        assert_eq!(EntityId::Int(5).to_json(), json!(5));
        assert_eq!(EntityId::from("a1").to_json(), json!("a1"));
        assert_eq!(EntityId::from_json(&json!(9)), Some(EntityId::Int(9)));
        assert_eq!(EntityId::from_json(&json!("")), None);
        assert_eq!(EntityId::from_json(&json!(null)), None);
        assert!(EntityId::Int(12).same_as(&EntityId::from("12")));
    }

    #[test]
    fn test_persisted_entity_accessors() {
        let entity = PersistedEntity::from_json(
            EntityKind::PurchaseOrder,
            json!({"id": 3, "poNumber": "PO-1", "poAmount": 1500.5, "customer": "12"}),
        )
        .unwrap();

        assert_eq!(entity.id, EntityId::Int(3));
        assert_eq!(entity.text("poNumber"), Some("PO-1"));
        assert_eq!(entity.amount("poAmount"), Some(Decimal::new(15005, 1)));
        assert_eq!(entity.reference("customer"), Some(EntityId::from("12")));
        assert_eq!(entity.amount("missing"), None);
    }

    #[test]
    fn test_persisted_entity_requires_id() {
        let result = PersistedEntity::from_json(EntityKind::Task, json!({"taskName": "x"}));
        assert!(matches!(result, Err(Error::InvalidResponse { .. })));
    }

    #[test]
    fn test_decimal_from_json_string() {
        assert_eq!(
            decimal_from_json(&json!("1000.00")),
            Some(Decimal::new(100_000, 2))
        );
        assert_eq!(decimal_from_json(&json!("abc")), None);
        assert_eq!(decimal_from_json(&json!(true)), None);
    }
}

//! Field Normalizer
//!
//! Bidirectional translation between the backend's heterogeneous records
//! (mixed `snake_case` / `camelCase`, legacy aliases such as `image_url` or
//! `src`) and the canonical models in [`crate::models`].
//!
//! Every alias the client tolerates is enumerated in one table per entity
//! kind (see [`schemas`]). Nothing outside this module branches on which
//! alias the server used.
//!
//! All functions here are pure and deterministic.

mod menu;
pub mod schemas;

pub use menu::normalize_menu;
pub use schemas::schema_for;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::iter;

use crate::models::{Entity, EntityKind};
use crate::{Error, Result};

/// JSON object as sent to / received from the backend
pub type WirePayload = Map<String, Value>;

/// Value a canonical field takes when no key in its alias set is populated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    Null,
    EmptyText,
    False,
}

impl FieldDefault {
    fn value(self) -> Value {
        match self {
            FieldDefault::Null => Value::Null,
            FieldDefault::EmptyText => Value::String(String::new()),
            FieldDefault::False => Value::Bool(false),
        }
    }
}

/// One canonical field and the wire names that may carry it
#[derive(Debug)]
pub struct FieldSpec {
    /// Canonical key, also the key emitted in outgoing payloads
    pub canonical: &'static str,
    /// Legacy / alternate wire keys, in lookup order
    pub aliases: &'static [&'static str],
    pub default: FieldDefault,
    /// Included in outgoing mutation payloads
    pub writable: bool,
    /// Strings are trimmed and blank becomes `null`, in both directions
    pub blank_is_null: bool,
}

impl FieldSpec {
    /// Server-assigned field, never sent back
    pub const fn read_only(
        canonical: &'static str,
        aliases: &'static [&'static str],
        default: FieldDefault,
    ) -> Self {
        Self {
            canonical,
            aliases,
            default,
            writable: false,
            blank_is_null: false,
        }
    }

    /// Field the client may send in create/update payloads
    pub const fn writable(
        canonical: &'static str,
        aliases: &'static [&'static str],
        default: FieldDefault,
    ) -> Self {
        Self {
            canonical,
            aliases,
            default,
            writable: true,
            blank_is_null: false,
        }
    }

    /// Writable URL-like field where a blank string means "no value"
    pub const fn nullable_url(canonical: &'static str, aliases: &'static [&'static str]) -> Self {
        Self {
            canonical,
            aliases,
            default: FieldDefault::Null,
            writable: true,
            blank_is_null: true,
        }
    }

    /// Canonical key followed by every alias
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        iter::once(self.canonical).chain(self.aliases.iter().copied())
    }

    /// First non-null value among the canonical key and its aliases
    fn resolve<'a>(&self, raw: &'a WirePayload) -> Option<&'a Value> {
        self.keys()
            .filter_map(|k| raw.get(k))
            .find(|v| !v.is_null())
    }

    /// First key of the alias set that is present at all, null or not
    fn present<'a>(&self, raw: &'a WirePayload) -> Option<&'a Value> {
        self.keys().find_map(|k| raw.get(k))
    }
}

/// Trim strings; blank strings become null
fn blank_to_null(value: &Value) -> Value {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Value::Null
            } else {
                Value::String(trimmed.to_string())
            }
        }
        other => other.clone(),
    }
}

/// Alias table of one entity kind
#[derive(Debug)]
pub struct Schema {
    pub kind: EntityKind,
    pub fields: &'static [FieldSpec],
}

impl Schema {
    /// Look up a field by canonical key
    pub fn field(&self, canonical: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.canonical == canonical)
    }

    /// Map a raw wire record to a canonical JSON object
    ///
    /// Every canonical field is present in the result: either the first
    /// populated value of its alias set, or the declared default. Keys that
    /// belong to no field are dropped.
    pub fn canonicalize(&self, raw: &Value) -> Result<WirePayload> {
        let obj = raw
            .as_object()
            .ok_or_else(|| Error::normalize(self.kind, "expected a JSON object"))?;

        let mut out = Map::with_capacity(self.fields.len());
        for field in self.fields {
            let value = match field.resolve(obj) {
                Some(v) if field.blank_is_null => blank_to_null(v),
                Some(v) => v.clone(),
                None => field.default.value(),
            };
            out.insert(field.canonical.to_string(), value);
        }
        Ok(out)
    }

    /// Build an outgoing payload from a partial record
    ///
    /// Only writable fields whose canonical key or an alias is present in
    /// `partial` are emitted, always under the canonical key. Null inputs
    /// are omitted, except for `blank_is_null` fields whose presence is
    /// always forwarded (trimmed, blank -> null).
    pub fn wire_payload(&self, partial: &WirePayload) -> WirePayload {
        let mut out = Map::new();
        for field in self.fields.iter().filter(|f| f.writable) {
            let value = if field.blank_is_null {
                field.present(partial).map(blank_to_null)
            } else {
                field.resolve(partial).cloned()
            };
            if let Some(value) = value {
                out.insert(field.canonical.to_string(), value);
            }
        }
        out
    }
}

/// Canonical entities that have an alias table
pub trait Canonical: Entity + Serialize + DeserializeOwned {
    const SCHEMA: &'static Schema;
}

/// Untyped canonicalization for a given kind
pub fn to_canonical_value(kind: EntityKind, raw: &Value) -> Result<WirePayload> {
    schema_for(kind).canonicalize(raw)
}

/// Normalize one wire record into its canonical type
pub fn to_canonical<T: Canonical>(raw: &Value) -> Result<T> {
    let canonical = T::SCHEMA.canonicalize(raw)?;
    serde_json::from_value(Value::Object(canonical))
        .map_err(|e| Error::normalize(T::KIND, e.to_string()))
}

/// Normalize a list response; anything other than an array yields no items
pub fn to_canonical_list<T: Canonical>(raw: &Value) -> Result<Vec<T>> {
    match raw.as_array() {
        Some(items) => items.iter().map(to_canonical).collect(),
        None => Ok(Vec::new()),
    }
}

/// Build the outgoing payload for `kind` from a partial record
pub fn to_wire_payload(kind: EntityKind, partial: &WirePayload) -> WirePayload {
    schema_for(kind).wire_payload(partial)
}

/// Serialize any value (a canonical entity or a `json!` partial) and build
/// the outgoing payload for `kind` from it
pub fn payload_of<P: Serialize + ?Sized>(kind: EntityKind, value: &P) -> Result<WirePayload> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(to_wire_payload(kind, &map)),
        Ok(_) => Err(Error::InvalidInput(format!(
            "{kind} payload must serialize to a JSON object"
        ))),
        Err(e) => Err(Error::InvalidInput(e.to_string())),
    }
}

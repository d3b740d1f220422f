//! Records and patches
//!
//! A [`Record`] is one applicant, vacancy, vacancy request or employee as the
//! backend returned it. The core only relies on the `_id` field; everything
//! else is carried as JSON in the order it arrived.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::error::ValidationError;

/// Name of the identifier field used by the backend
pub const ID_FIELD: &str = "_id";

/// Ordered field storage for a record or a patch
pub type Fields = IndexMap<String, Value>;

/// One entity as received from the backend
///
/// The identifier is immutable for the lifetime of the record: patches that
/// mention `_id` leave it untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "_id")]
    id: String,

    #[serde(flatten)]
    fields: Fields,
}

impl Record {
    /// Create a record from an id and its remaining fields
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        let mut fields = fields;
        fields.shift_remove(ID_FIELD);
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Build a record from a JSON object carrying an `_id`
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Serialize back into a JSON object
    pub fn to_value(&self) -> Value {
        let mut object = Map::with_capacity(self.fields.len() + 1);
        object.insert(ID_FIELD.to_string(), Value::String(self.id.clone()));
        for (key, value) in &self.fields {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Look up a field by name or dotted path (`vacancyId.position`)
    ///
    /// Returns `None` when any segment is absent or traverses a non-object.
    pub fn get(&self, path: &str) -> Option<&Value> {
        if path == ID_FIELD {
            return None;
        }
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.fields.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Look up a string field
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Check that every dotted key in `patch` can be applied
    ///
    /// A dotted key may create missing objects but never goes through a
    /// value that is not an object: `vacancyId.position` on a bare
    /// `"vacancyId": "v1"` reference is refused.
    pub fn check_patch(&self, patch: &Patch) -> Result<(), ValidationError> {
        for (key, change) in patch.changes() {
            if matches!(change, Change::Unset) {
                continue;
            }
            if let Some(blocked) = self.blocking_prefix(key) {
                return Err(ValidationError::FieldError {
                    field: key.clone(),
                    message: format!("'{blocked}' is not an object"),
                });
            }
        }
        Ok(())
    }

    /// Apply a patch in place
    ///
    /// - a set replaces the stored value, `null` included
    /// - an unset removes the field
    /// - dotted keys address a nested field and create missing parents
    ///
    /// Entries whose dotted path runs through a non-object value are
    /// skipped. Applying the same patch twice yields the same record.
    pub fn apply_patch(&mut self, patch: &Patch) {
        for (key, change) in patch.changes() {
            if key == ID_FIELD || key.starts_with("_id.") {
                continue;
            }
            match change {
                Change::Set(value) => {
                    if self.blocking_prefix(key).is_some() {
                        continue;
                    }
                    set_path(&mut self.fields, key, value.clone());
                }
                Change::Unset => unset_path(&mut self.fields, key),
            }
        }
    }

    /// First prefix of a dotted key that holds a non-object value
    fn blocking_prefix<'a>(&self, key: &'a str) -> Option<&'a str> {
        let (head, rest) = key.split_once('.')?;
        let mut current = self.fields.get(head)?;
        let mut end = head.len();
        let mut remaining = rest;
        loop {
            let Value::Object(object) = current else {
                return Some(&key[..end]);
            };
            let Some((segment, tail)) = remaining.split_once('.') else {
                return None;
            };
            current = object.get(segment)?;
            end += segment.len() + 1;
            remaining = tail;
        }
    }
}

fn set_path(fields: &mut Fields, path: &str, value: Value) {
    let Some((head, rest)) = path.split_once('.') else {
        fields.insert(path.to_string(), value);
        return;
    };
    let slot = fields
        .entry(head.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(object) = slot {
        set_object_path(object, rest, value);
    }
}

fn set_object_path(object: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            object.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let slot = object
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(inner) = slot {
                set_object_path(inner, rest, value);
            }
        }
    }
}

fn unset_path(fields: &mut Fields, path: &str) {
    let Some((head, rest)) = path.split_once('.') else {
        fields.shift_remove(path);
        return;
    };
    let mut current = fields.get_mut(head);
    let mut remaining = rest;
    while let Some(Value::Object(object)) = current {
        match remaining.split_once('.') {
            None => {
                object.remove(remaining);
                return;
            }
            Some((segment, tail)) => {
                current = object.get_mut(segment);
                remaining = tail;
            }
        }
    }
}

/// One entry of a [`Patch`]
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Store this value, `null` included
    Set(Value),
    /// Remove the field
    Unset,
}

static NULL: Value = Value::Null;

impl Change {
    /// The value sent to the backend; an unset goes out as `null`
    pub fn as_value(&self) -> &Value {
        match self {
            Change::Set(value) => value,
            Change::Unset => &NULL,
        }
    }
}

/// A partial-field update addressed to one record
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Fields")]
pub struct Patch(IndexMap<String, Change>);

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), Change::Set(value.into()));
        self
    }

    /// Builder-style removal
    pub fn unset(mut self, field: impl Into<String>) -> Self {
        self.0.insert(field.into(), Change::Unset);
        self
    }

    /// Read a patch from a JSON object; anything else is rejected
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(object) => Some(object.into_iter().collect::<Fields>().into()),
            _ => None,
        }
    }

    /// The patch that undoes `self` when applied to `record`
    ///
    /// Fields the patch would create are unset again. For a dotted key the
    /// unset targets the outermost parent that did not exist yet.
    pub fn inverse_for(&self, record: &Record) -> Patch {
        let mut inverse = IndexMap::new();
        for (key, change) in self.changes() {
            if key == ID_FIELD {
                continue;
            }
            if matches!(change, Change::Set(_)) && record.blocking_prefix(key).is_some() {
                // never applied, nothing to undo
                continue;
            }
            let (target, undo) = undo_entry(record, key);
            inverse.entry(target).or_insert(undo);
        }
        Patch(inverse)
    }

    /// Value set for `field`, if the patch sets it
    pub fn get(&self, field: &str) -> Option<&Value> {
        match self.0.get(field)? {
            Change::Set(value) => Some(value),
            Change::Unset => None,
        }
    }

    /// Every entry, removals included
    pub fn changes(&self) -> impl Iterator<Item = (&String, &Change)> {
        self.0.iter()
    }

    /// Entries that store a value
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter().filter_map(|(key, change)| match change {
            Change::Set(value) => Some((key, value)),
            Change::Unset => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, change)| (k.clone(), change.as_value().clone()))
                .collect(),
        )
    }
}

/// Key and change restoring what `record` holds under `key`
fn undo_entry(record: &Record, key: &str) -> (String, Change) {
    let Some((head, rest)) = key.split_once('.') else {
        return match record.fields.get(key) {
            Some(previous) => (key.to_string(), Change::Set(previous.clone())),
            None => (key.to_string(), Change::Unset),
        };
    };
    let Some(mut current) = record.fields.get(head) else {
        return (head.to_string(), Change::Unset);
    };
    let mut end = head.len();
    for segment in rest.split('.') {
        end += segment.len() + 1;
        match current.as_object().and_then(|object| object.get(segment)) {
            Some(next) => current = next,
            None => return (key[..end].to_string(), Change::Unset),
        }
    }
    (key.to_string(), Change::Set(current.clone()))
}

impl From<Fields> for Patch {
    fn from(fields: Fields) -> Self {
        Self(
            fields
                .into_iter()
                .map(|(key, value)| (key, Change::Set(value)))
                .collect(),
        )
    }
}

impl Serialize for Patch {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(key, change)| (key, change.as_value())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn applicant() -> Record {
        Record::from_value(json!({
            "_id": "app1",
            "fullName": "John Smith",
            "status": "pending",
            "vacancyId": {"_id": "vac1", "position": "Lecturer"},
            "review": {"status": "pending", "score": 3}
        }))
        .unwrap()
    }

    #[test]
    fn test_from_value_requires_id() {
        assert!(Record::from_value(json!({"fullName": "No Id"})).is_err());
    }

    #[test]
    fn test_field_order_preserved() {
        let record = applicant();
        let keys: Vec<&str> = record.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["fullName", "status", "vacancyId", "review"]);
    }

    #[test]
    fn test_get_nested_path() {
        let record = applicant();
        assert_eq!(record.get_str("vacancyId.position"), Some("Lecturer"));
        assert_eq!(record.get("vacancyId.missing"), None);
        assert_eq!(record.get("fullName.first"), None);
    }

    #[test]
    fn test_patch_replaces_top_level() {
        let mut record = applicant();
        record.apply_patch(&Patch::new().set("status", "rejected"));
        assert_eq!(record.get_str("status"), Some("rejected"));
        assert_eq!(record.get_str("fullName"), Some("John Smith"));
    }

    #[test]
    fn test_object_value_replaces_field() {
        let mut record = applicant();
        record.apply_patch(&Patch::new().set("review", json!({"status": "shortlisted"})));
        assert_eq!(record.get_str("review.status"), Some("shortlisted"));
        assert_eq!(record.get("review.score"), None);
    }

    #[test]
    fn test_null_is_stored_and_unset_removes() {
        let mut record = applicant();
        record.apply_patch(&Patch::new().set("fullName", Value::Null).unset("status"));
        assert_eq!(record.get("fullName"), Some(&Value::Null));
        assert_eq!(record.get("status"), None);
    }

    #[test]
    fn test_dotted_patch_through_scalar_refused() {
        let mut record =
            Record::from_value(json!({"_id": "app2", "vacancyId": "v1"})).unwrap();
        let patch = Patch::new().set("vacancyId.position", "Lecturer");
        assert!(matches!(
            record.check_patch(&patch),
            Err(ValidationError::FieldError { ref message, .. }) if message.contains("vacancyId")
        ));
        record.apply_patch(&patch);
        assert_eq!(record.get_str("vacancyId"), Some("v1"));
        assert!(patch.inverse_for(&record).is_empty());
    }

    #[test]
    fn test_unset_goes_out_as_null() {
        let patch = Patch::new().set("status", "selected").unset("feedback");
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"status": "selected", "feedback": null})
        );
        assert_eq!(patch.iter().count(), 1);
    }

    #[test]
    fn test_patch_never_touches_id() {
        let mut record = applicant();
        record.apply_patch(&Patch::new().set("_id", "other"));
        assert_eq!(record.id(), "app1");
    }

    #[test]
    fn test_dotted_patch_creates_parents() {
        let mut record = applicant();
        record.apply_patch(&Patch::new().set("interview.room", "B12"));
        assert_eq!(record.get_str("interview.room"), Some("B12"));
    }

    #[test]
    fn test_patch_is_idempotent() {
        let patch = Patch::new()
            .set("status", "interviewed")
            .set("review", json!({"feedback": "ok"}));
        let mut once = applicant();
        once.apply_patch(&patch);
        let mut twice = once.clone();
        twice.apply_patch(&patch);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_inverse_restores_record() {
        let original = applicant();
        let patch = Patch::new()
            .set("status", "selected")
            .set("feedback", "Welcome aboard")
            .set("review", json!({"status": "done", "notes": "n/a"}))
            .set("vacancyId.position", "Senior Lecturer");
        let inverse = patch.inverse_for(&original);

        let mut record = original.clone();
        record.apply_patch(&patch);
        assert_ne!(record, original);
        record.apply_patch(&inverse);
        assert_eq!(record, original);
    }

    #[test]
    fn test_inverse_removes_created_parent() {
        let original = applicant();
        let patch = Patch::new().set("interview.slot.room", "B12");
        let inverse = patch.inverse_for(&original);
        assert_eq!(inverse.to_value(), json!({"interview": null}));

        let mut record = original.clone();
        record.apply_patch(&patch);
        record.apply_patch(&inverse);
        assert_eq!(record, original);
    }

    #[test]
    fn test_to_value_includes_id() {
        let value = applicant().to_value();
        assert_eq!(value["_id"], "app1");
        assert_eq!(value["fullName"], "John Smith");
    }

    #[test]
    fn test_patch_from_value_rejects_non_object() {
        assert!(Patch::from_value(json!([1, 2])).is_none());
        assert_eq!(Patch::from_value(json!({"a": 1})).map(|p| p.len()), Some(1));
    }
}

//! Purpose: Schema-bound record whose every assignment is validated.
//! Exports: `Record`.
//! Role: Generic storage behind each typed model and for late-bound payloads.
//! Invariants: A record is bound to exactly one schema for its lifetime.
//! Invariants: A field appears at most once; re-assignment replaces the value.
//! Invariants: Bulk construction and `update` validate every field before committing any.
use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::core::error::{Error, ErrorKind};
use crate::core::schema::Schema;
use crate::core::validate::Validator;
use crate::core::value::FieldValue;

#[derive(Clone, Debug)]
pub struct Record {
    schema: &'static Schema,
    validator: Validator,
    fields: Vec<(&'static str, FieldValue)>,
}

impl Record {
    pub fn new(schema: &'static Schema) -> Self {
        Self::with_validator(schema, Validator::default())
    }

    pub fn with_validator(schema: &'static Schema, validator: Validator) -> Self {
        Self {
            schema,
            validator,
            fields: Vec::new(),
        }
    }

    pub fn from_values(
        schema: &'static Schema,
        values: BTreeMap<String, FieldValue>,
    ) -> Result<Self, Error> {
        Self::from_values_with(schema, values, Validator::default())
    }

    /// Builds a record from raw values; keys the schema does not declare are skipped.
    pub fn from_values_with(
        schema: &'static Schema,
        values: BTreeMap<String, FieldValue>,
        validator: Validator,
    ) -> Result<Self, Error> {
        let mut record = Self::with_validator(schema, validator);
        record.update(values)?;
        Ok(record)
    }

    pub fn from_json_map(schema: &'static Schema, map: &Map<String, Value>) -> Result<Self, Error> {
        Self::from_json_map_with(schema, map, Validator::default())
    }

    pub fn from_json_map_with(
        schema: &'static Schema,
        map: &Map<String, Value>,
        validator: Validator,
    ) -> Result<Self, Error> {
        let values = map
            .iter()
            .map(|(key, value)| (key.clone(), FieldValue::from_json(value)))
            .collect();
        Self::from_values_with(schema, values, validator)
    }

    pub fn from_json_str(schema: &'static Schema, raw: &str) -> Result<Self, Error> {
        Self::from_json_str_with(schema, raw, Validator::default())
    }

    pub fn from_json_str_with(
        schema: &'static Schema,
        raw: &str,
        validator: Validator,
    ) -> Result<Self, Error> {
        let value: Value = serde_json::from_str(raw).map_err(|err| {
            Error::new(ErrorKind::Decode)
                .with_message(format!("invalid {} json", schema.name()))
                .with_source(err)
        })?;
        match value {
            Value::Object(map) => Self::from_json_map_with(schema, &map, validator),
            other => Err(Error::new(ErrorKind::Decode)
                .with_message(format!("{} json must be an object", schema.name()))
                .with_value(other.to_string())),
        }
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    pub fn validator(&self) -> Validator {
        self.validator
    }

    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), Error> {
        let field = self.schema.field(name).ok_or_else(|| self.unknown_field(name))?;
        let value = self.validator.prepare(field, value.into())?;
        self.store(field.name(), value);
        Ok(())
    }

    /// Applies several assignments; nothing is stored unless all of them validate.
    pub fn update(&mut self, values: BTreeMap<String, FieldValue>) -> Result<(), Error> {
        let mut prepared = Vec::with_capacity(values.len());
        for (name, value) in values {
            let Some(field) = self.schema.field(&name) else {
                tracing::trace!(schema = self.schema.name(), field = %name, "skipping undeclared field");
                continue;
            };
            prepared.push((field.name(), self.validator.prepare(field, value)?));
        }
        for (name, value) in prepared {
            self.store(name, value);
        }
        Ok(())
    }

    /// Stored value; `UnknownField` for undeclared names, `MissingValue` when never assigned.
    pub fn get(&self, name: &str) -> Result<&FieldValue, Error> {
        if self.schema.field(name).is_none() {
            return Err(self.unknown_field(name));
        }
        self.get_opt(name).ok_or_else(|| {
            Error::new(ErrorKind::MissingValue)
                .with_message(format!("{} field has not been assigned", self.schema.name()))
                .with_field(name)
        })
    }

    pub fn get_opt(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get_opt(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Assigned fields in assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (*name, value))
    }

    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        for (name, value) in &self.fields {
            out.insert((*name).to_string(), value.to_json());
        }
        Value::Object(out)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get_opt(name).and_then(FieldValue::as_text)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get_opt(name).and_then(FieldValue::as_i64)
    }

    pub fn uint(&self, name: &str) -> Option<u64> {
        self.get_opt(name).and_then(FieldValue::as_u64)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.get_opt(name).and_then(FieldValue::as_f64)
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.get_opt(name).and_then(FieldValue::as_bool)
    }

    pub fn timestamp(&self, name: &str) -> Option<time::OffsetDateTime> {
        self.get_opt(name).and_then(FieldValue::as_timestamp)
    }

    pub fn list(&self, name: &str) -> Option<&[FieldValue]> {
        self.get_opt(name).and_then(FieldValue::as_list)
    }

    pub fn record(&self, name: &str) -> Option<&Record> {
        self.get_opt(name).and_then(FieldValue::as_record)
    }

    /// Nested records held in a list field, skipping non-record elements.
    pub fn records(&self, name: &str) -> Vec<&Record> {
        self.list(name)
            .map(|items| items.iter().filter_map(FieldValue::as_record).collect())
            .unwrap_or_default()
    }

    fn store(&mut self, name: &'static str, value: FieldValue) {
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    fn unknown_field(&self, name: &str) -> Error {
        Error::new(ErrorKind::UnknownField)
            .with_message(format!("{} has no field {name}", self.schema.name()))
            .with_field(name)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema
            && self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .all(|(name, value)| other.get_opt(name) == Some(value))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.schema.name())?;
        writeln!(f, "FIELDS:")?;
        writeln!(f, "{}", self.to_json())
    }
}

//! Purpose: Decide whether a value conforms to a field's declared shape and choices.
//! Exports: `Validator`, `CollectionMatch`, `in_choices`.
//! Role: Every record assignment passes through `Validator::prepare`.
//! Invariants: Coercion always runs before shape and choice checks.
//! Invariants: An `Int` value satisfies a `Long` declaration (integer widening).
//! Notes: `CollectionMatch::Sample` keeps the legacy partial-match rules for lists and dicts.
use crate::core::error::{Error, ErrorKind};
use crate::core::record::Record;
use crate::core::schema::{Choice, FieldDef, ScalarKind, Shape, describe_choices};
use crate::core::timestamp;
use crate::core::value::FieldValue;

/// How list and dict values are matched against their element shapes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CollectionMatch {
    /// Every element (every key/value pair) must conform.
    #[default]
    Every,
    /// One conforming list element, or a conforming first dict pair, is enough.
    Sample,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Validator {
    collection_match: CollectionMatch,
}

impl Validator {
    pub fn new(collection_match: CollectionMatch) -> Self {
        Self { collection_match }
    }

    pub fn collection_match(&self) -> CollectionMatch {
        self.collection_match
    }

    /// Coerces, shape-checks and choice-checks a value destined for `field`.
    pub fn prepare(&self, field: &FieldDef, value: FieldValue) -> Result<FieldValue, Error> {
        let value = match field.coercion() {
            Some(coerce) => coerce(value),
            None => Ok(value),
        }
        .and_then(|value| self.coerce(value, field.shape()))
        .map_err(|err| {
            if err.field().is_none() {
                err.with_field(field.name())
            } else {
                err
            }
        })?;

        if !self.conforms(&value, field.shape()) {
            return Err(Error::new(ErrorKind::Validation)
                .with_message(format!(
                    "{} value does not validate against allowed shapes",
                    value.kind_name()
                ))
                .with_field(field.name())
                .with_value(value.to_string())
                .with_allowed(field.shape().to_string()));
        }

        if let Some(choices) = field.allowed_choices()
            && !in_choices(&value, choices)
        {
            return Err(Error::new(ErrorKind::Choice)
                .with_message("value is not present in choices")
                .with_field(field.name())
                .with_value(value.to_string())
                .with_allowed(describe_choices(choices)));
        }

        Ok(value)
    }

    /// Converts raw inputs into the canonical form the shape expects.
    pub fn coerce(&self, value: FieldValue, shape: &Shape) -> Result<FieldValue, Error> {
        match shape {
            Shape::Scalar(ScalarKind::Timestamp) => coerce_timestamp(value),
            Shape::Scalar(_) | Shape::TypedDict(..) => Ok(value),
            Shape::ListOf(element) => match value {
                FieldValue::List(items) => items
                    .into_iter()
                    .map(|item| self.coerce(item, element))
                    .collect::<Result<Vec<_>, _>>()
                    .map(FieldValue::List),
                other => Ok(other),
            },
            Shape::Nested(schema) => match value {
                FieldValue::Map(map) => {
                    Record::from_values_with(*schema, map, *self).map(FieldValue::from)
                }
                other => Ok(other),
            },
            Shape::OneOf(alternatives) => {
                if alternatives.iter().any(|alt| self.conforms(&value, alt)) {
                    return Ok(value);
                }
                let mut first_err = None;
                for alternative in alternatives.iter() {
                    match self.coerce(value.clone(), alternative) {
                        Ok(candidate) if self.conforms(&candidate, alternative) => {
                            return Ok(candidate);
                        }
                        Ok(_) => {}
                        Err(err) => {
                            first_err.get_or_insert(err);
                        }
                    }
                }
                match first_err {
                    Some(err) => Err(err),
                    None => Ok(value),
                }
            }
        }
    }

    pub fn conforms(&self, value: &FieldValue, shape: &Shape) -> bool {
        match shape {
            Shape::Scalar(kind) => scalar_matches(value, *kind),
            Shape::ListOf(element) => {
                let Some(items) = value.as_list() else {
                    return false;
                };
                match self.collection_match {
                    CollectionMatch::Every => items.iter().all(|item| self.conforms(item, element)),
                    CollectionMatch::Sample => items.iter().any(|item| self.conforms(item, element)),
                }
            }
            Shape::TypedDict(key_kind, value_kind) => {
                let Some(map) = value.as_map() else {
                    return false;
                };
                let pair_matches = |(key, item): (&String, &FieldValue)| {
                    key_matches(key, *key_kind) && scalar_matches(item, *value_kind)
                };
                match self.collection_match {
                    CollectionMatch::Every => map.iter().all(pair_matches),
                    CollectionMatch::Sample => map.iter().next().is_some_and(pair_matches),
                }
            }
            Shape::Nested(schema) => value
                .as_record()
                .is_some_and(|record| record.schema() == *schema),
            Shape::OneOf(alternatives) => alternatives.iter().any(|alt| self.conforms(value, alt)),
        }
    }
}

/// Membership test against a declared choice set.
///
/// A list value checked against scalar choices passes when every element is
/// itself a permitted choice.
pub fn in_choices(value: &FieldValue, choices: &[Choice]) -> bool {
    if choices.iter().any(|choice| choice_equals(value, choice)) {
        return true;
    }
    let scalar_choices = choices
        .iter()
        .all(|choice| matches!(choice, Choice::Int(_) | Choice::Text(_)));
    match value {
        FieldValue::List(items) if scalar_choices && !items.is_empty() => items
            .iter()
            .all(|item| choices.iter().any(|choice| choice_equals(item, choice))),
        _ => false,
    }
}

fn choice_equals(value: &FieldValue, choice: &Choice) -> bool {
    match (choice, value) {
        (Choice::Int(expected), value) => value.as_i64() == Some(*expected),
        (Choice::Text(expected), FieldValue::Text(text)) => text == expected,
        (Choice::IntList(expected), FieldValue::List(items)) => {
            items.len() == expected.len()
                && items
                    .iter()
                    .zip(expected.iter())
                    .all(|(item, expected)| item.as_i64() == Some(*expected))
        }
        (Choice::TextList(expected), FieldValue::List(items)) => {
            items.len() == expected.len()
                && items
                    .iter()
                    .zip(expected.iter())
                    .all(|(item, expected)| item.as_text() == Some(*expected))
        }
        _ => false,
    }
}

fn scalar_matches(value: &FieldValue, kind: ScalarKind) -> bool {
    matches!(
        (kind, value),
        (ScalarKind::Opaque, _)
            | (ScalarKind::Text, FieldValue::Text(_))
            | (ScalarKind::Int, FieldValue::Int(_))
            | (ScalarKind::Long, FieldValue::Int(_) | FieldValue::Long(_))
            | (ScalarKind::Float, FieldValue::Float(_))
            | (ScalarKind::Bool, FieldValue::Bool(_))
            | (ScalarKind::Timestamp, FieldValue::Timestamp(_))
            | (ScalarKind::Null, FieldValue::Null)
    )
}

// JSON object keys are always text; numeric kinds match keys that parse as numbers.
fn key_matches(key: &str, kind: ScalarKind) -> bool {
    match kind {
        ScalarKind::Text | ScalarKind::Opaque => true,
        ScalarKind::Int => key.parse::<i64>().is_ok(),
        ScalarKind::Long => key.parse::<i64>().is_ok() || key.parse::<u64>().is_ok(),
        _ => false,
    }
}

fn coerce_timestamp(value: FieldValue) -> Result<FieldValue, Error> {
    match value {
        FieldValue::Int(seconds) => timestamp::from_unix(seconds).map(FieldValue::Timestamp),
        FieldValue::Long(seconds) => Err(Error::new(ErrorKind::Validation)
            .with_message("unix timestamp out of range")
            .with_value(seconds.to_string())),
        FieldValue::Text(text) => timestamp::parse_text(&text).map(FieldValue::Timestamp),
        other => Ok(other),
    }
}

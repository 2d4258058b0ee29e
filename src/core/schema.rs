//! Purpose: Declarative field schemas for record types.
//! Exports: `Schema`, `FieldDef`, `Shape`, `ScalarKind`, `Choice`, `CoerceFn`, shape constants.
//! Role: Static tables consulted by the validator and by `Record` on every assignment.
//! Invariants: Schemas are `'static` and immutable; records hold a reference for life.
//! Invariants: Field names are unique within a schema (`Schema::check`).
use std::collections::HashSet;
use std::fmt;

use crate::core::error::{Error, ErrorKind};
use crate::core::value::FieldValue;

/// Field-specific conversion applied before the shape-driven coercions.
pub type CoerceFn = fn(FieldValue) -> Result<FieldValue, Error>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScalarKind {
    Text,
    Int,
    /// Wide integer; also accepts `Int` values.
    Long,
    Float,
    Bool,
    Timestamp,
    Null,
    /// Accepted without inspection (upload handles and similar).
    Opaque,
}

impl ScalarKind {
    pub fn label(self) -> &'static str {
        match self {
            ScalarKind::Text => "text",
            ScalarKind::Int => "int",
            ScalarKind::Long => "long",
            ScalarKind::Float => "float",
            ScalarKind::Bool => "bool",
            ScalarKind::Timestamp => "timestamp",
            ScalarKind::Null => "null",
            ScalarKind::Opaque => "any",
        }
    }
}

#[derive(Clone, Copy)]
pub enum Shape {
    Scalar(ScalarKind),
    ListOf(&'static Shape),
    TypedDict(ScalarKind, ScalarKind),
    Nested(&'static Schema),
    OneOf(&'static [Shape]),
}

pub const TEXT: Shape = Shape::Scalar(ScalarKind::Text);
pub const INT: Shape = Shape::Scalar(ScalarKind::Int);
pub const LONG: Shape = Shape::Scalar(ScalarKind::Long);
pub const FLOAT: Shape = Shape::Scalar(ScalarKind::Float);
pub const BOOL: Shape = Shape::Scalar(ScalarKind::Bool);
pub const TIMESTAMP: Shape = Shape::Scalar(ScalarKind::Timestamp);
pub const NULL: Shape = Shape::Scalar(ScalarKind::Null);
pub const OPAQUE: Shape = Shape::Scalar(ScalarKind::Opaque);

pub const TEXT_LIST: Shape = Shape::ListOf(&TEXT);
pub const INT_LIST: Shape = Shape::ListOf(&INT);
pub const LONG_LIST: Shape = Shape::ListOf(&LONG);
pub const TEXT_OR_NULL: Shape = Shape::OneOf(&[TEXT, NULL]);
pub const TIMESTAMP_OR_NULL: Shape = Shape::OneOf(&[TIMESTAMP, NULL]);

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar(kind) => f.write_str(kind.label()),
            Shape::ListOf(element) => write!(f, "[{element}]"),
            Shape::TypedDict(key, value) => write!(f, "{{{}: {}}}", key.label(), value.label()),
            Shape::Nested(schema) => f.write_str(schema.name()),
            Shape::OneOf(alternatives) => {
                for (idx, alternative) in alternatives.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{alternative}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shape({self})")
    }
}

/// Literal permitted value for an enumerated field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Choice {
    Int(i64),
    Text(&'static str),
    IntList(&'static [i64]),
    TextList(&'static [&'static str]),
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Int(value) => write!(f, "{value}"),
            Choice::Text(value) => write!(f, "{value:?}"),
            Choice::IntList(values) => write!(f, "{values:?}"),
            Choice::TextList(values) => write!(f, "{values:?}"),
        }
    }
}

pub fn describe_choices(choices: &[Choice]) -> String {
    let items: Vec<String> = choices.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}

#[derive(Clone, Copy)]
pub struct FieldDef {
    name: &'static str,
    shape: Shape,
    choices: Option<&'static [Choice]>,
    create_only: bool,
    coerce: Option<CoerceFn>,
}

impl FieldDef {
    pub const fn new(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            choices: None,
            create_only: false,
            coerce: None,
        }
    }

    pub const fn choices(mut self, choices: &'static [Choice]) -> Self {
        self.choices = Some(choices);
        self
    }

    /// Advisory: settable at creation, not meant to change afterwards.
    pub const fn create_only(mut self) -> Self {
        self.create_only = true;
        self
    }

    pub const fn coerce_with(mut self, coerce: CoerceFn) -> Self {
        self.coerce = Some(coerce);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn allowed_choices(&self) -> Option<&'static [Choice]> {
        self.choices
    }

    pub fn is_create_only(&self) -> bool {
        self.create_only
    }

    pub fn coercion(&self) -> Option<CoerceFn> {
        self.coerce
    }
}

impl fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .field("choices", &self.choices)
            .field("create_only", &self.create_only)
            .finish()
    }
}

pub struct Schema {
    name: &'static str,
    fields: &'static [FieldDef],
}

impl Schema {
    pub const fn new(name: &'static str, fields: &'static [FieldDef]) -> Self {
        Self { name, fields }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &'static [FieldDef] {
        self.fields
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn create_only_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|field| field.create_only)
            .map(|field| field.name)
    }

    /// Rejects tables that declare the same field name twice.
    pub fn check(&self) -> Result<(), Error> {
        let mut seen = HashSet::new();
        for field in self.fields {
            if !seen.insert(field.name) {
                return Err(Error::new(ErrorKind::Internal)
                    .with_message(format!("schema {} declares a field twice", self.name))
                    .with_field(field.name));
            }
        }
        Ok(())
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other) || self.name == other.name
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.fields.iter().map(|field| field.name).collect();
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("fields", &names)
            .finish()
    }
}

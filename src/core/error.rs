//! Purpose: Single error type shared by the record engine, the client, and the CLI.
//! Exports: `Error`, `ErrorKind`, `to_exit_code`.
//! Role: Kinds are coarse and stable; context rides along as optional builder fields.
//! Invariants: Exit codes for existing kinds never change once published.
//! Invariants: Remote error payloads are carried verbatim, never reinterpreted.
use std::error::Error as StdError;
use std::fmt;

use serde_json::Value;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Internal,
    Usage,
    Configuration,
    Argument,
    UnknownField,
    MissingValue,
    Validation,
    Choice,
    Remote,
    Decode,
    Io,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    hint: Option<String>,
    field: Option<String>,
    value: Option<String>,
    allowed: Option<String>,
    payload: Option<Value>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            hint: None,
            field: None,
            value: None,
            allowed: None,
            payload: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// Field the error refers to, when raised by record assignment.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Rendering of the offending value.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Allowed shapes (validation) or permitted set (choices).
    pub fn allowed(&self) -> Option<&str> {
        self.allowed.as_deref()
    }

    /// Raw `error` object returned by the remote API.
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_allowed(mut self, allowed: impl Into<String>) -> Self {
        self.allowed = Some(allowed.into());
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(field) = &self.field {
            write!(f, " (field: {field})")?;
        }
        if let Some(value) = &self.value {
            write!(f, " (value: {value})")?;
        }
        if let Some(allowed) = &self.allowed {
            write!(f, " (allowed: {allowed})")?;
        }
        if let Some(payload) = &self.payload {
            write!(f, " (payload: {payload})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
        ErrorKind::Configuration => 3,
        ErrorKind::Argument => 4,
        ErrorKind::UnknownField => 5,
        ErrorKind::MissingValue => 6,
        ErrorKind::Validation => 7,
        ErrorKind::Choice => 8,
        ErrorKind::Remote => 9,
        ErrorKind::Decode => 10,
        ErrorKind::Io => 11,
    }
}

// Core record engine: values, schemas, validation, schema-bound records, errors.
pub mod error;
pub mod record;
pub mod schema;
pub mod timestamp;
pub mod validate;
pub mod value;

use crate::error::JonError;
use crate::parser::Parser;
use crate::schema::{Schema, ValidationResult};
use crate::value::Value;
use log::debug;
use std::fs;
use std::path::Path;

pub use crate::schema::validate;

/// Name used for diagnostics when the caller does not supply one.
pub const DEFAULT_SOURCE_NAME: &str = "source.jon";

/// Parses a jon document into a value tree.
///
/// # Errors
///
/// Returns a `JonError` if scanning or parsing fails.
pub fn parse(source: &str) -> Result<Value, JonError> {
    parse_with_name(source, DEFAULT_SOURCE_NAME)
}

/// Parses a jon document, using `name` to label diagnostics.
///
/// # Errors
///
/// Returns a `JonError` if scanning or parsing fails.
pub fn parse_with_name(source: &str, name: &str) -> Result<Value, JonError> {
    let mut parser = Parser::new_with_name(source, name.to_string())?;
    let value = parser.parse_document()?;
    debug!("parsed `{name}` into a {} value", value.value_type());
    Ok(value)
}

/// Reads and parses a jon file. The file name labels any diagnostics.
///
/// # Errors
///
/// Returns `JonError::Io` if the file cannot be read as UTF-8 text, or the
/// parse error otherwise.
pub fn from_file(path: impl AsRef<Path>) -> Result<Value, JonError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|err| JonError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    parse_with_name(&source, &path.display().to_string())
}

/// Parses a data document and a schema document, then validates one against
/// the other.
///
/// # Errors
///
/// Returns a `JonError` if either document fails to parse or the schema
/// document is not a valid schema. Violations are reported in the `Ok` result.
pub fn check(source: &str, schema_source: &str) -> Result<ValidationResult, JonError> {
    let value = parse_with_name(source, DEFAULT_SOURCE_NAME)?;
    let schema = parse_with_name(schema_source, "schema.jon")?;
    let schema = Schema::from_value(&schema)?;
    Ok(schema.validate(&value))
}

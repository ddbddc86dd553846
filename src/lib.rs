pub mod api;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod schema;
pub mod utils;
pub mod value;
mod serialization;

pub use api::{check, from_file, parse, parse_with_name, validate};
pub use error::{JonError, LexerError, ParserError, SchemaError, ValueError};
pub use schema::{Schema, ValidationResult, Violation};
pub use value::{FromValue, Object, Value, ValueType};

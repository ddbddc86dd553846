use crate::utils::point_at;
use crate::value::ValueType;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Any failure of the scan/parse pipeline, or of the helpers built on top of it.
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum JonError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lexer(#[from] LexerError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parser(#[from] ParserError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),

    #[error("Failed to read `{path}`: {message}")]
    #[diagnostic(code(jon::io))]
    Io { path: String, message: String },
}

impl JonError {
    /// Renders the error as a plain diagnostic: the offending source line, a caret
    /// aligned under the error position and the error message.
    ///
    /// Errors without a source position render as their message.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            JonError::Lexer(err) => err.render(),
            JonError::Parser(err) => err.render(),
            JonError::Schema(_) | JonError::Io { .. } => self.to_string(),
        }
    }

    /// Location of the error in its source, if it has one.
    #[must_use]
    pub fn span(&self) -> Option<SourceSpan> {
        match self {
            JonError::Lexer(err) => Some(err.location().1),
            JonError::Parser(err) => Some(err.location().1),
            JonError::Schema(_) | JonError::Io { .. } => None,
        }
    }
}

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum LexerError {
    #[error("Unterminated string, expected closing {delimiter}")]
    #[diagnostic(
        code(lexer::unterminated_string),
        help("Single-line strings must be closed before the end of the line. Use triple quotes for multi-line strings.")
    )]
    UnterminatedString {
        #[source_code]
        src: NamedSource<String>,
        #[label("string starts here")]
        span: SourceSpan,
        delimiter: String,
    },

    #[error("Unterminated block comment")]
    #[diagnostic(
        code(lexer::unterminated_comment),
        help("Every `/*` needs a matching `*/`, including nested ones.")
    )]
    UnterminatedComment {
        #[source_code]
        src: NamedSource<String>,
        #[label("comment starts here")]
        span: SourceSpan,
    },

    #[error("Expected {expected}, got {found}")]
    #[diagnostic(code(lexer::invalid_digit))]
    InvalidDigit {
        #[source_code]
        src: NamedSource<String>,
        #[label("expected {expected}")]
        span: SourceSpan,
        expected: String,
        found: String,
    },

    #[error("Signed {base} numbers are not allowed")]
    #[diagnostic(
        code(lexer::signed_prefixed_number),
        help("Only decimal numbers may carry a `+` or `-` sign.")
    )]
    SignedPrefixedNumber {
        #[source_code]
        src: NamedSource<String>,
        #[label("sign is not allowed here")]
        span: SourceSpan,
        base: String,
    },

    #[error("Expected fractional part of number, got {found}")]
    #[diagnostic(code(lexer::missing_fraction))]
    MissingFraction {
        #[source_code]
        src: NamedSource<String>,
        #[label("expected a digit after `.`")]
        span: SourceSpan,
        found: String,
    },

    #[error("Unexpected character {found}")]
    #[diagnostic(code(lexer::unexpected_character))]
    UnexpectedCharacter {
        #[source_code]
        src: NamedSource<String>,
        #[label("unexpected character")]
        span: SourceSpan,
        found: String,
    },
}

impl LexerError {
    pub(crate) fn location(&self) -> (&NamedSource<String>, SourceSpan) {
        match self {
            LexerError::UnterminatedString { src, span, .. }
            | LexerError::UnterminatedComment { src, span }
            | LexerError::InvalidDigit { src, span, .. }
            | LexerError::SignedPrefixedNumber { src, span, .. }
            | LexerError::MissingFraction { src, span, .. }
            | LexerError::UnexpectedCharacter { src, span, .. } => (src, *span),
        }
    }

    /// See [`JonError::render`].
    #[must_use]
    pub fn render(&self) -> String {
        let (src, span) = self.location();
        point_at(src.inner(), span.offset(), &self.to_string())
    }
}

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ParserError {
    #[error("Expected {expected}, got {found}")]
    #[diagnostic(
        code(parser::unexpected_token),
        help("The parser found a token it did not expect in this position.")
    )]
    UnexpectedToken {
        #[source_code]
        src: NamedSource<String>,
        #[label("Expected {expected}, but found this")]
        span: SourceSpan,
        expected: String,
        found: String,
    },

    #[error("Expected `{closer}` to close `{opener}` opened at {line}:{column}, got {found}")]
    #[diagnostic(
        code(parser::unclosed_delimiter),
        help("Every `{{` needs a matching `}}` and every `[` a matching `]`.")
    )]
    UnclosedDelimiter {
        #[source_code]
        src: NamedSource<String>,
        #[label("Expected `{closer}` here")]
        span: SourceSpan,
        #[label("unclosed `{opener}`")]
        opener_span: SourceSpan,
        opener: char,
        closer: char,
        line: usize,
        column: usize,
        found: String,
    },

    #[error("Duplicate key `{key}`")]
    #[diagnostic(
        code(parser::duplicate_key),
        help("Keys must be unique within one object.")
    )]
    DuplicateKey {
        #[source_code]
        src: NamedSource<String>,
        #[label("duplicate defined here")]
        span: SourceSpan,
        #[label("first defined here")]
        first_span: SourceSpan,
        key: String,
    },

    #[error("Nesting deeper than {limit} levels")]
    #[diagnostic(
        code(parser::nesting_too_deep),
        help("Objects and arrays may be nested at most {limit} levels deep.")
    )]
    NestingTooDeep {
        #[source_code]
        src: NamedSource<String>,
        #[label("too deeply nested")]
        span: SourceSpan,
        limit: usize,
    },

    #[error("Integer literal `{literal}` does not fit in 64 bits")]
    #[diagnostic(code(parser::integer_out_of_range))]
    IntegerOutOfRange {
        #[source_code]
        src: NamedSource<String>,
        #[label("out of range")]
        span: SourceSpan,
        literal: String,
    },
}

impl ParserError {
    pub(crate) fn location(&self) -> (&NamedSource<String>, SourceSpan) {
        match self {
            ParserError::UnexpectedToken { src, span, .. }
            | ParserError::UnclosedDelimiter { src, span, .. }
            | ParserError::DuplicateKey { src, span, .. }
            | ParserError::NestingTooDeep { src, span, .. }
            | ParserError::IntegerOutOfRange { src, span, .. } => (src, *span),
        }
    }

    /// See [`JonError::render`].
    #[must_use]
    pub fn render(&self) -> String {
        let (src, span) = self.location();
        point_at(src.inner(), span.offset(), &self.to_string())
    }
}

/// A schema document that does not describe a valid schema.
///
/// These are reported separately from validation violations: a broken schema is a
/// caller bug, a document that fails a schema is data.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Schema node at {path} must be an object, got {found}")]
    #[diagnostic(code(schema::not_an_object))]
    NotAnObject { path: String, found: ValueType },

    #[error("Schema node at {path} has no `type`")]
    #[diagnostic(
        code(schema::missing_type),
        help("Add `type` with one of: null, bool, int, float, string, object, array.")
    )]
    MissingType { path: String },

    #[error("Schema node at {path} has unknown type `{name}`")]
    #[diagnostic(
        code(schema::unknown_type),
        help("Known types are: null, bool, int, float, string, object, array.")
    )]
    UnknownType { path: String, name: String },

    #[error("Schema key `{key}` at {path} must be {expected}, got {found}")]
    #[diagnostic(code(schema::invalid_constraint))]
    InvalidConstraint {
        path: String,
        key: String,
        expected: String,
        found: String,
    },

    #[error("Schema node at {path} is nested deeper than {limit} levels")]
    #[diagnostic(code(schema::nesting_too_deep))]
    NestingTooDeep { path: String, limit: usize },

    #[error("Array schema at {path} has no `items`")]
    #[diagnostic(code(schema::missing_items))]
    MissingItems { path: String },

    #[error("Object schema at {path} has no `props`")]
    #[diagnostic(code(schema::missing_props))]
    MissingProps { path: String },
}

/// Failures of typed retrieval and navigation on a [`crate::value::Value`].
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum ValueError {
    #[error("Type mismatch: requested {expected}, but value is {found}")]
    #[diagnostic(code(value::type_mismatch))]
    TypeMismatch {
        expected: ValueType,
        found: ValueType,
    },

    #[error("Key `{key}` not found")]
    #[diagnostic(code(value::key_not_found))]
    KeyNotFound { key: String },

    #[error("Index {index} out of range for array of length {len}")]
    #[diagnostic(code(value::index_out_of_range))]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Cannot index into {found} with {index}")]
    #[diagnostic(code(value::not_indexable))]
    NotIndexable { found: ValueType, index: String },

    #[error("Duplicate key `{key}`")]
    #[diagnostic(code(value::duplicate_key))]
    DuplicateKey { key: String },
}

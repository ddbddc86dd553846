// Additional parser error path tests
// These systematically test unhappy paths of the scanner and parser

use jon_core::error::{JonError, LexerError, ParserError};
use jon_core::parse;

fn parser_error(source: &str) -> ParserError {
    match parse(source) {
        Err(JonError::Parser(err)) => err,
        other => panic!("Expected a parser error for {source:?}, got {other:?}"),
    }
}

fn lexer_error(source: &str) -> LexerError {
    match parse(source) {
        Err(JonError::Lexer(err)) => err,
        other => panic!("Expected a lexer error for {source:?}, got {other:?}"),
    }
}

#[test]
fn test_parser_error_missing_closing_brace() {
    let err = parser_error("{ key: 123");
    assert!(
        matches!(err, ParserError::UnclosedDelimiter { closer: '}', line: 1, column: 1, .. }),
        "Should fail with missing }}"
    );
}

#[test]
fn test_parser_error_missing_closing_bracket() {
    let err = parser_error("{ arr: [1, 2, 3 }");
    assert!(
        matches!(err, ParserError::UnclosedDelimiter { closer: ']', column: 8, .. }),
        "Should fail with missing ]"
    );
}

#[test]
fn test_parser_error_missing_colon() {
    let err = parser_error("{ key 123 }");
    assert_eq!(err.to_string(), "Expected `:`, got `}`");
}

#[test]
fn test_parser_error_unexpected_eof() {
    let err = parser_error("{ key: ");
    assert_eq!(err.to_string(), "Expected a value, got [EOF]");
}

#[test]
fn test_parser_error_key_must_be_string() {
    let err = parser_error("{ 1: one }");
    assert!(matches!(err, ParserError::UnexpectedToken { ref expected, .. } if expected == "a key"));
}

#[test]
fn test_parser_error_double_comma() {
    assert!(parse("[1,, 2]").is_err(), "Should fail with empty element");
    assert!(parse("{ a: 1,, b: 2 }").is_err(), "Should fail with empty entry");
}

#[test]
fn test_parser_error_leading_comma() {
    assert!(parse("[, 1]").is_err());
}

#[test]
fn test_parser_error_missing_separator() {
    let err = parser_error("[1 2]");
    assert!(matches!(err, ParserError::UnclosedDelimiter { closer: ']', .. }));
}

#[test]
fn test_parser_error_two_root_values() {
    let err = parser_error("1\n2");
    assert_eq!(err.to_string(), "Expected end of input, got number `2`");
}

#[test]
fn test_parser_error_duplicate_key_in_braceless_root() {
    let err = parser_error("a: 1\nb: 2\na: 3");
    assert!(matches!(err, ParserError::DuplicateKey { ref key, .. } if key == "a"));
}

#[test]
fn test_parser_error_integer_overflow() {
    let err = parser_error("0x8000_0000_0000_0000");
    assert_eq!(
        err.to_string(),
        "Integer literal `0x8000000000000000` does not fit in 64 bits"
    );
    assert!(parse("0x7FFF_FFFF_FFFF_FFFF").is_ok());
    assert!(parse("-9223372036854775808").is_ok());
}

#[test]
fn test_lexer_error_unterminated_comment() {
    let err = lexer_error("/* outer /* inner */ still open\n null");
    assert!(matches!(err, LexerError::UnterminatedComment { .. }));
}

#[test]
fn test_lexer_error_unterminated_multiline_string() {
    let err = lexer_error("text: '''\nnever closed\n");
    assert!(matches!(err, LexerError::UnterminatedString { ref delimiter, .. } if delimiter == "`'''`"));
}

#[test]
fn test_lexer_error_string_broken_by_newline() {
    let err = lexer_error("{ a: \"one\ntwo\" }");
    assert!(matches!(err, LexerError::UnterminatedString { .. }));
}

#[test]
fn test_lexer_error_signed_hex() {
    let err = lexer_error("-0xFF");
    assert_eq!(err.to_string(), "Signed hexadecimal numbers are not allowed");
}

#[test]
fn test_lexer_error_missing_fraction() {
    let err = lexer_error("[1.]");
    assert_eq!(err.to_string(), "Expected fractional part of number, got `]`");
}

#[test]
fn test_lexer_error_invalid_octal_digit() {
    let err = lexer_error("0o78");
    assert_eq!(err.to_string(), "Expected octal digit, got `8`");
}

#[test]
fn test_lexer_error_control_character() {
    let err = lexer_error("{ a: \u{7} }");
    assert!(matches!(err, LexerError::UnexpectedCharacter { .. }));
}

#[test]
fn test_parser_error_deep_nesting_is_reported() {
    let source = format!("{}{}", "[".repeat(50_000), "]".repeat(50_000));
    let err = parser_error(&source);
    assert!(matches!(err, ParserError::NestingTooDeep { .. }));
    assert_eq!(err.to_string(), "Nesting deeper than 128 levels");

    let source = format!("{}null{}", "{ k: ".repeat(50_000), " }".repeat(50_000));
    assert!(matches!(parser_error(&source), ParserError::NestingTooDeep { .. }));
}

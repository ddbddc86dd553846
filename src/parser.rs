use crate::error::{JonError, ParserError};
use crate::lexer::{Lexer, Span, Token, TokenKind};
use crate::utils::get_line_and_column;
use crate::value::{Object, Value};
use log::debug;
use miette::NamedSource;
use std::collections::HashMap;
use std::sync::Arc;

/// Deepest accepted nesting of objects and arrays. Parsing recurses once per
/// level, so the limit keeps hostile input from exhausting the stack.
pub const MAX_DEPTH: usize = 128;

/// A recursive descent parser for jon documents, one token of lookahead.
#[derive(Debug)]
pub struct Parser<'a> {
    source: Arc<NamedSource<String>>,
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
    source_text: &'a str,
}

impl<'a> Parser<'a> {
    pub fn new(source_text: &'a str) -> Result<Self, JonError> {
        Self::new_with_name(source_text, "source.jon".to_string())
    }

    /// Scans `source_text` up front; a scan error is returned before any parsing happens.
    pub fn new_with_name(source_text: &'a str, name: String) -> Result<Self, JonError> {
        let tokens = Lexer::with_name(source_text, name.as_str()).lex()?;
        Ok(Self::from_tokens(tokens, source_text, name))
    }

    /// Builds a parser over an already scanned token sequence.
    ///
    /// `source_text` must be the text the tokens were scanned from; it is only
    /// used for diagnostics. A missing trailing `Eof` token is added.
    pub fn from_tokens(mut tokens: Vec<Token>, source_text: &'a str, name: String) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            tokens.push(Token::new(
                TokenKind::Eof,
                String::new(),
                Span::new(source_text.len(), 0),
            ));
        }
        Self {
            source: Arc::new(NamedSource::new(name, source_text.to_string())),
            tokens,
            position: 0,
            depth: 0,
            source_text,
        }
    }

    // === Main Parsing Methods ===

    /// Document ::= NL* ( Value | Members ) NL* Eof
    ///
    /// A document starting with `key:` is an object written without braces.
    pub fn parse_document(&mut self) -> Result<Value, JonError> {
        self.skip_newlines();

        let root = if self.check(TokenKind::String) && self.peek_is(TokenKind::Colon) {
            Value::Object(self.parse_members(TokenKind::Eof, None)?)
        } else {
            let value = self.parse_value()?;
            self.skip_newlines();
            if !self.check(TokenKind::Eof) {
                return self.err_unexpected("end of input");
            }
            value
        };

        debug!(
            "parsed {} into a {} value",
            self.source.name(),
            root.value_type()
        );
        Ok(root)
    }

    /// Value ::= Keyword | Int | Float | String | Object | Array
    fn parse_value(&mut self) -> Result<Value, JonError> {
        let token = self.current_token().clone();

        let value = match token.kind {
            TokenKind::LBrace => return self.parse_object(),
            TokenKind::LBracket => return self.parse_array(),
            TokenKind::Null => Value::Null,
            TokenKind::False => Value::Bool(false),
            TokenKind::True => Value::Bool(true),
            TokenKind::NaN => Value::Float(f64::NAN),
            TokenKind::Inf => Value::Float(f64::INFINITY),
            TokenKind::NegInf => Value::Float(f64::NEG_INFINITY),
            TokenKind::BinInt | TokenKind::OctInt | TokenKind::DecInt | TokenKind::HexInt => {
                Value::Int(self.parse_int(&token)?)
            }
            TokenKind::Float => match token.text.parse::<f64>() {
                Ok(f) => Value::Float(f),
                Err(_) => return self.err_unexpected("a float literal"),
            },
            TokenKind::String => Value::String(token.text),
            _ => return self.err_unexpected("a value"),
        };

        self.advance();
        Ok(value)
    }

    /// Object ::= "{" NL* [ Members ] "}"
    fn parse_object(&mut self) -> Result<Value, JonError> {
        let opener = self.current_token().clone();
        self.expect(TokenKind::LBrace)?;
        self.enter(&opener)?;
        let object = self.parse_members(TokenKind::RBrace, Some(&opener))?;
        self.depth -= 1;
        Ok(Value::Object(object))
    }

    /// Members ::= Entry ( Sep Entry )* Sep?
    /// Entry   ::= String ":" NL* Value
    ///
    /// Consumes the closing token. `closer` is `Eof` for a brace-less root object.
    fn parse_members(
        &mut self,
        closer: TokenKind,
        opener: Option<&Token>,
    ) -> Result<Object, JonError> {
        let mut object = Object::new();
        let mut key_spans: HashMap<String, Span> = HashMap::new();

        self.skip_newlines();
        while !self.check(closer) && !self.check(TokenKind::Eof) {
            let (key, key_span) = self.parse_key()?;
            self.expect(TokenKind::Colon)?;
            self.skip_newlines();
            let value = self.parse_value()?;

            if object.insert(key.clone(), value).is_err() {
                let first_span = key_spans.get(&key).copied().unwrap_or(key_span);
                return Err(ParserError::DuplicateKey {
                    src: (*self.source).clone(),
                    span: key_span.into(),
                    first_span: first_span.into(),
                    key,
                }
                .into());
            }
            key_spans.insert(key, key_span);

            if !self.parse_separator() {
                break;
            }
        }

        self.expect_closer(closer, opener)?;
        Ok(object)
    }

    /// Array ::= "[" NL* [ Value ( Sep Value )* Sep? ] "]"
    fn parse_array(&mut self) -> Result<Value, JonError> {
        let opener = self.current_token().clone();
        self.expect(TokenKind::LBracket)?;
        self.enter(&opener)?;
        let mut values = Vec::new();

        self.skip_newlines();
        while !self.check(TokenKind::RBracket) && !self.check(TokenKind::Eof) {
            values.push(self.parse_value()?);
            if !self.parse_separator() {
                break;
            }
        }

        self.expect_closer(TokenKind::RBracket, Some(&opener))?;
        self.depth -= 1;
        Ok(Value::Array(values))
    }

    /// Key ::= String
    ///
    /// Bare identifiers scan as strings, so `key` and `'key'` are the same key.
    fn parse_key(&mut self) -> Result<(String, Span), JonError> {
        let token = self.current_token();
        if token.kind != TokenKind::String {
            return self.err_unexpected("a key");
        }
        let key = (token.text.clone(), token.span);
        self.advance();
        Ok(key)
    }

    /// Sep ::= NL* "," NL* | NL+
    ///
    /// Returns whether a separator was consumed.
    fn parse_separator(&mut self) -> bool {
        let newlines = self.skip_newlines();
        if self.match_token(TokenKind::Comma) {
            self.skip_newlines();
            true
        } else {
            newlines > 0
        }
    }

    fn parse_int(&self, token: &Token) -> Result<i64, JonError> {
        let base = token.int_base().unwrap_or(10);
        i64::from_str_radix(&token.text, base).map_err(|_| {
            ParserError::IntegerOutOfRange {
                src: (*self.source).clone(),
                span: token.span.into(),
                literal: token.literal(),
            }
            .into()
        })
    }

    /// Opens one nesting level for the container starting at `opener`.
    fn enter(&mut self, opener: &Token) -> Result<(), JonError> {
        if self.depth >= MAX_DEPTH {
            return Err(ParserError::NestingTooDeep {
                src: (*self.source).clone(),
                span: opener.span.into(),
                limit: MAX_DEPTH,
            }
            .into());
        }
        self.depth += 1;
        Ok(())
    }

    // === Tokenizer Helper Methods ===

    /// The parser never moves past the trailing `Eof`, so there always is a current token.
    fn current_token(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn advance(&mut self) {
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }

    fn skip_newlines(&mut self) -> usize {
        let mut count = 0;
        while self.match_token(TokenKind::Newline) {
            count += 1;
        }
        count
    }

    fn expect(&mut self, expected: TokenKind) -> Result<(), JonError> {
        if self.check(expected) {
            self.advance();
            Ok(())
        } else {
            self.err_unexpected(expected.describe())
        }
    }

    /// Consumes the closing token of a container, or reports the unmatched opener.
    fn expect_closer(&mut self, closer: TokenKind, opener: Option<&Token>) -> Result<(), JonError> {
        if self.check(closer) {
            self.advance();
            return Ok(());
        }

        let Some(opener) = opener else {
            return self.err_unexpected("`,`, new line or end of input");
        };

        let token = self.current_token();
        let (line, column) = get_line_and_column(self.source_text, opener.span.offset);
        let (opener_char, closer_char) = match closer {
            TokenKind::RBracket => ('[', ']'),
            _ => ('{', '}'),
        };
        Err(ParserError::UnclosedDelimiter {
            src: (*self.source).clone(),
            span: token.span.into(),
            opener_span: opener.span.into(),
            opener: opener_char,
            closer: closer_char,
            line,
            column,
            found: token.to_string(),
        }
        .into())
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current_token().kind == kind
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.tokens
            .get(self.position + 1)
            .is_some_and(|token| token.kind == kind)
    }

    fn err_unexpected<T>(&self, expected: &str) -> Result<T, JonError> {
        let token = self.current_token();
        Err(ParserError::UnexpectedToken {
            src: (*self.source).clone(),
            span: token.span.into(),
            expected: expected.to_string(),
            found: token.to_string(),
        }
        .into())
    }
}

use crate::error::{JonError, LexerError};
use log::debug;
use miette::{NamedSource, SourceSpan};
use std::fmt::{self, Display};

/// Represents the different kinds of tokens that the lexer can produce.
/// Each token is a meaningful unit of the jon syntax.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenKind {
    // == Special Tokens ==
    /// Represents the end of the input.
    Eof,
    /// A line break. Newlines separate values and entries, so they are real tokens.
    Newline,

    // == Punctuation ==
    /// Comma: `,`
    Comma,
    /// Colon: `:`
    Colon,
    /// Left Brace: `{`
    LBrace,
    /// Right Brace: `}`
    RBrace,
    /// Left Bracket: `[`
    LBracket,
    /// Right Bracket: `]`
    RBracket,

    // == Keywords ==
    Null,
    False,
    True,
    /// `nan`
    NaN,
    /// `inf`
    Inf,
    /// `-inf`
    NegInf,

    // == Literals ==
    /// `0b` prefixed integer; the token text holds the digits only.
    BinInt,
    /// `0o` prefixed integer.
    OctInt,
    /// Decimal integer, sign included in the text.
    DecInt,
    /// `0x` prefixed integer.
    HexInt,
    Float,
    /// A quoted string, or a bare identifier.
    String,
}

impl TokenKind {
    /// Human-readable name, used in "expected ..." messages.
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Eof => "[EOF]",
            TokenKind::Newline => "new line",
            TokenKind::Comma => "`,`",
            TokenKind::Colon => "`:`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::Null => "`null`",
            TokenKind::False => "`false`",
            TokenKind::True => "`true`",
            TokenKind::NaN => "`nan`",
            TokenKind::Inf => "`inf`",
            TokenKind::NegInf => "`-inf`",
            TokenKind::BinInt
            | TokenKind::OctInt
            | TokenKind::DecInt
            | TokenKind::HexInt
            | TokenKind::Float => "number",
            TokenKind::String => "string",
        }
    }
}

/// Location of a token: byte offset and byte length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

impl Span {
    #[must_use]
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    #[must_use]
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        (span.offset, span.len).into()
    }
}

/// A token with its kind, literal payload and position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: String, span: Span) -> Token {
        Token { kind, text, span }
    }

    /// Radix of an integer token, `None` for every other kind.
    #[must_use]
    pub fn int_base(&self) -> Option<u32> {
        match self.kind {
            TokenKind::BinInt => Some(2),
            TokenKind::OctInt => Some(8),
            TokenKind::DecInt => Some(10),
            TokenKind::HexInt => Some(16),
            _ => None,
        }
    }

    /// Numeric literal as written, minus group separators: `0x1F`, `-12`, `2.5`.
    #[must_use]
    pub fn literal(&self) -> String {
        match self.kind {
            TokenKind::BinInt => format!("0b{}", self.text),
            TokenKind::OctInt => format!("0o{}", self.text),
            TokenKind::HexInt => format!("0x{}", self.text),
            _ => self.text.clone(),
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::String => write!(f, "string '{}'", self.text.escape_debug()),
            TokenKind::BinInt
            | TokenKind::OctInt
            | TokenKind::DecInt
            | TokenKind::HexInt
            | TokenKind::Float => write!(f, "number `{}`", self.literal()),
            kind => f.write_str(kind.describe()),
        }
    }
}

fn is_stray_control(c: char) -> bool {
    c.is_control() && !matches!(c, '\t' | '\r' | '\n')
}

fn is_delimiter(c: char) -> bool {
    matches!(c, ',' | ':' | '{' | '}' | '[' | ']' | '\'' | '"' | '\n')
}

fn describe_char(c: Option<char>) -> String {
    match c {
        None => "[EOF]".to_string(),
        Some('\n') => "new line".to_string(),
        Some(c) => format!("`{}`", c.escape_debug()),
    }
}

pub struct Lexer<'a> {
    input: &'a str,
    name: String,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_name(input, "source.jon")
    }

    /// Creates a lexer whose diagnostics refer to the source as `name`.
    pub fn with_name(input: &'a str, name: impl Into<String>) -> Self {
        Self {
            input,
            name: name.into(),
            position: 0,
        }
    }

    /// Scans the whole input. The returned sequence always ends with an `Eof` token.
    pub fn lex(&mut self) -> Result<Vec<Token>, JonError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            if token.kind == TokenKind::Eof {
                tokens.push(token);
                break;
            }
            tokens.push(token);
        }
        debug!("scanned {} tokens from {}", tokens.len(), self.name);
        Ok(tokens)
    }

    /// Produces the next significant token, skipping whitespace and comments.
    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        self.skip_trivia()?;
        let start = self.position;

        let Some(c) = self.peek() else {
            return Ok(Token::new(TokenKind::Eof, String::new(), Span::new(start, 0)));
        };

        let kind = match c {
            '\n' => TokenKind::Newline,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '\'' | '"' => return self.read_string(c),
            c if c.is_ascii_digit() => return self.read_number(),
            '+' | '-' if self.peek_nth(1).is_some_and(|d| d.is_ascii_digit()) => {
                return self.read_number()
            }
            c if is_stray_control(c) => return Err(self.unexpected_character(c)),
            _ => return self.read_identifier(),
        };

        self.advance();
        Ok(Token::new(kind, String::new(), Span::new(start, 1)))
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += c.len_utf8();
        Some(c)
    }

    fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            self.advance();
        }
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn at_comment_start(&self) -> bool {
        let rest = self.rest();
        rest.starts_with("//") || rest.starts_with("/*")
    }

    fn skip_trivia(&mut self) -> Result<(), LexerError> {
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r') => {
                    self.advance();
                }
                Some('/') if self.rest().starts_with("//") => self.skip_line_comment(),
                Some('/') if self.rest().starts_with("/*") => self.skip_block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    /// Skips to the end of the line. The newline itself is left for the next token.
    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Block comments nest: every `/*` must be matched by its own `*/`.
    fn skip_block_comment(&mut self) -> Result<(), LexerError> {
        let start = self.position;
        self.advance_by(2);
        let mut depth = 1usize;

        while depth > 0 {
            if self.rest().starts_with("/*") {
                depth += 1;
                self.advance_by(2);
            } else if self.rest().starts_with("*/") {
                depth -= 1;
                self.advance_by(2);
            } else if self.advance().is_none() {
                return Err(LexerError::UnterminatedComment {
                    src: self.source(),
                    span: (start, 2).into(),
                });
            }
        }
        Ok(())
    }

    fn read_string(&mut self, quote: char) -> Result<Token, LexerError> {
        let triple: String = [quote; 3].iter().collect();
        if self.rest().starts_with(&triple) {
            self.read_multiline_string(&triple)
        } else {
            self.read_single_line_string(quote)
        }
    }

    /// Triple-quoted strings run verbatim, newlines included, up to the closing triple.
    fn read_multiline_string(&mut self, triple: &str) -> Result<Token, LexerError> {
        let start = self.position;
        self.position += triple.len();

        let Some(len) = self.rest().find(triple) else {
            return Err(LexerError::UnterminatedString {
                src: self.source(),
                span: (start, triple.len()).into(),
                delimiter: format!("`{triple}`"),
            });
        };

        let value = self.rest()[..len].to_string();
        self.position += len + triple.len();
        Ok(Token::new(
            TokenKind::String,
            value,
            Span::new(start, self.position - start),
        ))
    }

    fn read_single_line_string(&mut self, quote: char) -> Result<Token, LexerError> {
        let start = self.position;
        self.advance(); // Consume the opening quote
        let mut value = String::new();

        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(LexerError::UnterminatedString {
                        src: self.source(),
                        span: (start, 1).into(),
                        delimiter: format!("`{quote}`"),
                    });
                }
                Some(c) if c == quote => {
                    self.advance(); // Consume the closing quote
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        Some(escaped @ ('\\' | '\'' | '"')) => {
                            self.advance();
                            value.push(escaped);
                        }
                        Some('n') => {
                            self.advance();
                            value.push('\n');
                        }
                        Some('r') => {
                            self.advance();
                            value.push('\r');
                        }
                        Some('t') => {
                            self.advance();
                            value.push('\t');
                        }
                        // Unknown escapes are kept as written; a trailing backslash
                        // before the line end falls through to the unterminated error.
                        _ => value.push('\\'),
                    }
                }
                Some(c) => {
                    self.advance();
                    value.push(c);
                }
            }
        }

        Ok(Token::new(
            TokenKind::String,
            value,
            Span::new(start, self.position - start),
        ))
    }

    fn read_number(&mut self) -> Result<Token, LexerError> {
        let start = self.position;
        let mut text = String::new();

        let signed = match self.peek() {
            Some('+') => {
                self.advance();
                true
            }
            Some('-') => {
                self.advance();
                text.push('-');
                true
            }
            _ => false,
        };

        let prefixed = match (self.peek(), self.peek_nth(1)) {
            (Some('0'), Some('b' | 'B')) => Some((TokenKind::BinInt, "binary", 2)),
            (Some('0'), Some('o' | 'O')) => Some((TokenKind::OctInt, "octal", 8)),
            (Some('0'), Some('x' | 'X')) => Some((TokenKind::HexInt, "hexadecimal", 16)),
            _ => None,
        };

        if let Some((kind, base, radix)) = prefixed {
            if signed {
                return Err(LexerError::SignedPrefixedNumber {
                    src: self.source(),
                    span: (start, 1).into(),
                    base: base.to_string(),
                });
            }
            self.advance_by(2);
            let digits = self.read_digits(radix);
            let expected = format!("{base} digit");
            if digits.is_empty() {
                return Err(self.invalid_digit(&expected));
            }
            self.expect_number_end(&expected)?;
            return Ok(Token::new(
                kind,
                digits,
                Span::new(start, self.position - start),
            ));
        }

        text.push_str(&self.read_digits(10));
        let mut kind = TokenKind::DecInt;

        if self.peek() == Some('.') {
            self.advance();
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err(LexerError::MissingFraction {
                    src: self.source(),
                    span: (self.position, self.peek().map_or(0, char::len_utf8)).into(),
                    found: describe_char(self.peek()),
                });
            }
            text.push('.');
            text.push_str(&self.read_digits(10));
            kind = TokenKind::Float;
        }

        self.expect_number_end("decimal digit")?;
        Ok(Token::new(
            kind,
            text,
            Span::new(start, self.position - start),
        ))
    }

    /// Reads digits of the given radix, dropping `_` group separators.
    fn read_digits(&mut self, radix: u32) -> String {
        let mut digits = String::new();
        while let Some(c) = self.peek() {
            if c == '_' {
                self.advance();
            } else if c.is_digit(radix) {
                self.advance();
                digits.push(c);
            } else {
                break;
            }
        }
        digits
    }

    /// A number must be followed by something that cannot continue it.
    fn expect_number_end(&self, expected: &str) -> Result<(), LexerError> {
        match self.peek() {
            None => Ok(()),
            Some(c) if is_delimiter(c) || matches!(c, ' ' | '\t' | '\r') => Ok(()),
            Some(_) if self.at_comment_start() => Ok(()),
            Some(_) => Err(self.invalid_digit(expected)),
        }
    }

    fn invalid_digit(&self, expected: &str) -> LexerError {
        LexerError::InvalidDigit {
            src: self.source(),
            span: (self.position, self.peek().map_or(0, char::len_utf8)).into(),
            expected: expected.to_string(),
            found: describe_char(self.peek()),
        }
    }

    fn unexpected_character(&self, c: char) -> LexerError {
        LexerError::UnexpectedCharacter {
            src: self.source(),
            span: (self.position, c.len_utf8()).into(),
            found: describe_char(Some(c)),
        }
    }

    /// Identifier is anything not containing punctuation, quotes or a line break.
    /// Identifiers spelling a constant become keyword tokens, anything else is a string.
    fn read_identifier(&mut self) -> Result<Token, LexerError> {
        let start = self.position;
        while let Some(c) = self.peek() {
            if is_delimiter(c) || self.at_comment_start() {
                break;
            }
            if is_stray_control(c) {
                return Err(self.unexpected_character(c));
            }
            self.advance();
        }

        // Leading whitespace was skipped as trivia; trailing whitespace is not part of the value.
        let ident = self.input[start..self.position].trim_end_matches([' ', '\t', '\r']);
        let kind = match ident {
            "null" => TokenKind::Null,
            "false" => TokenKind::False,
            "true" => TokenKind::True,
            "nan" => TokenKind::NaN,
            "inf" => TokenKind::Inf,
            "-inf" => TokenKind::NegInf,
            _ => TokenKind::String,
        };
        let text = if kind == TokenKind::String {
            ident.to_string()
        } else {
            String::new()
        };

        Ok(Token::new(kind, text, Span::new(start, ident.len())))
    }

    fn source(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.input.to_string())
    }
}

//! Tokenizer and recursive-descent parser for the plist dialect.

use crate::error::{PlistError, PlistResult};
use crate::value::{Dictionary, Value};

/// Characters allowed in an unquoted string token.
fn is_unquoted_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '/' | ':' | '.' | '-')
}

/// Returns `true` if the raw document text contains version-control conflict
/// markers.
///
/// Checked against the raw text before any structural parsing, so a
/// conflicted document is rejected without ever producing a partial result.
pub fn contains_merge_conflicts(text: &str) -> bool {
    text.lines().any(|line| {
        line.starts_with("<<<<<<< ")
            || line.starts_with(">>>>>>> ")
            || line.starts_with("|||||||")
            || line == "======="
    })
}

/// Parse a complete document into a [`Value`].
///
/// The `// !$*UTF8*$!` header is an ordinary line comment and is skipped
/// like any other. Trailing junk after the top-level value is an error.
pub fn parse_document(text: &str) -> PlistResult<Value> {
    let tokens = Lexer::new(text).run()?;
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.parse_value()?;
    if let Some(tok) = parser.peek() {
        return Err(PlistError::syntax(
            tok.line,
            format!("trailing content after document: {}", tok.kind.describe()),
        ));
    }
    Ok(value)
}

// ---------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
enum TokenKind {
    LBrace,
    RBrace,
    LParen,
    RParen,
    Equals,
    Semicolon,
    Comma,
    Str(String),
}

impl TokenKind {
    fn describe(&self) -> String {
        match self {
            TokenKind::LBrace => "'{'".into(),
            TokenKind::RBrace => "'}'".into(),
            TokenKind::LParen => "'('".into(),
            TokenKind::RParen => "')'".into(),
            TokenKind::Equals => "'='".into(),
            TokenKind::Semicolon => "';'".into(),
            TokenKind::Comma => "','".into(),
            TokenKind::Str(s) => format!("string {s:?}"),
        }
    }
}

#[derive(Clone, Debug)]
struct Token {
    kind: TokenKind,
    line: usize,
}

// ---------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            line: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line += 1;
        }
        c
    }

    fn run(mut self) -> PlistResult<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(&c) = self.chars.peek() {
            match c {
                c if c.is_whitespace() => {
                    self.bump();
                }
                '/' => {
                    if !self.skip_comment()? {
                        // A bare '/' starts an unquoted token (paths).
                        tokens.push(self.unquoted()?);
                    }
                }
                '{' | '}' | '(' | ')' | '=' | ';' | ',' => {
                    let line = self.line;
                    self.bump();
                    let kind = match c {
                        '{' => TokenKind::LBrace,
                        '}' => TokenKind::RBrace,
                        '(' => TokenKind::LParen,
                        ')' => TokenKind::RParen,
                        '=' => TokenKind::Equals,
                        ';' => TokenKind::Semicolon,
                        _ => TokenKind::Comma,
                    };
                    tokens.push(Token { kind, line });
                }
                '"' => tokens.push(self.quoted()?),
                c if is_unquoted_char(c) => tokens.push(self.unquoted()?),
                other => {
                    return Err(PlistError::syntax(
                        self.line,
                        format!("unexpected character {other:?}"),
                    ));
                }
            }
        }
        Ok(tokens)
    }

    /// Consume a comment if one starts here. Returns `false` when the
    /// leading '/' is not a comment opener (and consumes nothing).
    fn skip_comment(&mut self) -> PlistResult<bool> {
        let mut lookahead = self.chars.clone();
        lookahead.next();
        match lookahead.peek() {
            Some('/') => {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
                Ok(true)
            }
            Some('*') => {
                let start = self.line;
                self.bump();
                self.bump();
                let mut prev = '\0';
                loop {
                    match self.bump() {
                        Some('/') if prev == '*' => return Ok(true),
                        Some(c) => prev = c,
                        None => {
                            return Err(PlistError::syntax(start, "unterminated block comment"));
                        }
                    }
                }
            }
            _ => Ok(false),
        }
    }

    fn quoted(&mut self) -> PlistResult<Token> {
        let line = self.line;
        self.bump(); // opening quote
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(PlistError::UnexpectedEof),
                Some('"') => break,
                Some('\\') => match self.bump() {
                    None => return Err(PlistError::UnexpectedEof),
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some(other) => out.push(other),
                },
                Some(c) => out.push(c),
            }
        }
        Ok(Token {
            kind: TokenKind::Str(decode_numeric_refs(&out)),
            line,
        })
    }

    fn unquoted(&mut self) -> PlistResult<Token> {
        let line = self.line;
        let mut out = String::new();
        while let Some(&c) = self.chars.peek() {
            if is_unquoted_char(c) {
                out.push(c);
                self.bump();
            } else {
                break;
            }
        }
        Ok(Token {
            kind: TokenKind::Str(out),
            line,
        })
    }
}

/// Decode decimal numeric character references (`&#12431;` → `わ`).
///
/// Malformed references are left in place verbatim; only a well-formed
/// `&#<digits>;` naming a valid scalar is replaced.
fn decode_numeric_refs(s: &str) -> String {
    if !s.contains("&#") {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("&#") {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        let digits: String = tail.chars().take_while(char::is_ascii_digit).collect();
        let after = &tail[digits.len()..];
        match (digits.is_empty(), after.starts_with(';')) {
            (false, true) => {
                let decoded = digits
                    .parse::<u32>()
                    .ok()
                    .and_then(char::from_u32);
                match decoded {
                    Some(c) => {
                        out.push(c);
                        rest = &after[1..];
                    }
                    None => {
                        out.push_str("&#");
                        rest = tail;
                    }
                }
            }
            _ => {
                out.push_str("&#");
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

// ---------------------------------------------------------------
// Parser
// ---------------------------------------------------------------

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> PlistResult<Token> {
        let tok = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(PlistError::UnexpectedEof)?;
        self.pos += 1;
        Ok(tok)
    }

    fn expect(&mut self, kind: TokenKind) -> PlistResult<()> {
        let tok = self.next()?;
        if tok.kind == kind {
            Ok(())
        } else {
            Err(PlistError::syntax(
                tok.line,
                format!("expected {}, found {}", kind.describe(), tok.kind.describe()),
            ))
        }
    }

    fn parse_value(&mut self) -> PlistResult<Value> {
        let tok = self.next()?;
        match tok.kind {
            TokenKind::Str(s) => Ok(Value::String(s)),
            TokenKind::LBrace => self.parse_dict(),
            TokenKind::LParen => self.parse_array(),
            other => Err(PlistError::syntax(
                tok.line,
                format!("expected a value, found {}", other.describe()),
            )),
        }
    }

    fn parse_dict(&mut self) -> PlistResult<Value> {
        let mut entries = Dictionary::new();
        loop {
            let tok = self.next()?;
            match tok.kind {
                TokenKind::RBrace => return Ok(Value::Dict(entries)),
                TokenKind::Str(key) => {
                    self.expect(TokenKind::Equals)?;
                    let value = self.parse_value()?;
                    self.expect(TokenKind::Semicolon)?;
                    entries.insert(key, value);
                }
                other => {
                    return Err(PlistError::syntax(
                        tok.line,
                        format!("expected a key or '}}', found {}", other.describe()),
                    ));
                }
            }
        }
    }

    fn parse_array(&mut self) -> PlistResult<Value> {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                Some(tok) if tok.kind == TokenKind::RParen => {
                    self.pos += 1;
                    return Ok(Value::Array(items));
                }
                Some(_) => {
                    items.push(self.parse_value()?);
                    // Separator: a comma, possibly trailing before ')'.
                    match self.peek() {
                        Some(tok) if tok.kind == TokenKind::Comma => self.pos += 1,
                        Some(tok) if tok.kind == TokenKind::RParen => {}
                        Some(tok) => {
                            return Err(PlistError::syntax(
                                tok.line,
                                format!(
                                    "expected ',' or ')', found {}",
                                    tok.kind.describe()
                                ),
                            ));
                        }
                        None => return Err(PlistError::UnexpectedEof),
                    }
                }
                None => return Err(PlistError::UnexpectedEof),
            }
        }
    }
}

//! Lexical analysis: turns the raw input string into a vector of tokens.
//!
//! The tokenizer knows nothing about the grammar. It never fails either:
//! anything it cannot classify becomes an `Invalid` token and the generator
//! reports it when it trips over it. String and char literals are kept raw,
//! escape decoding happens later in the generator.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Kinds of tokens recognised by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
  // Literal classes
  Number,
  String,
  Char,
  Identifier,
  // Structural
  Invalid,
  EndOfFile,
  // Reserved words
  Return,
  Auto,
  Extern,
  // Symbols
  Plus,
  Minus,
  Star,
  Slash,
  Equal,
  Comma,
  Ampersand,
  Semicolon,
  OpenParen,
  CloseParen,
  OpenBrace,
  CloseBrace,
}

static KEYWORDS: LazyLock<HashMap<&'static str, TokenKind>> = LazyLock::new(|| {
  HashMap::from([
    ("return", TokenKind::Return),
    ("auto", TokenKind::Auto),
    ("extrn", TokenKind::Extern),
  ])
});

impl TokenKind {
  /// Reserved word for `text`, if any.
  pub fn keyword(text: &str) -> Option<TokenKind> {
    KEYWORDS.get(text).copied()
  }

  /// Single-character symbol table.
  pub fn symbol(c: char) -> Option<TokenKind> {
    let kind = match c {
      '+' => TokenKind::Plus,
      '-' => TokenKind::Minus,
      '*' => TokenKind::Star,
      '/' => TokenKind::Slash,
      '=' => TokenKind::Equal,
      ',' => TokenKind::Comma,
      '&' => TokenKind::Ampersand,
      ';' => TokenKind::Semicolon,
      '(' => TokenKind::OpenParen,
      ')' => TokenKind::CloseParen,
      '{' => TokenKind::OpenBrace,
      '}' => TokenKind::CloseBrace,
      _ => return None,
    };
    Some(kind)
  }
}

/// Text carried by the trailing `EndOfFile` token and by unterminated literals.
pub const END_OF_FILE_TEXT: &str = "end of file";

/// Thin wrapper for lexical information needed by later stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub kind: TokenKind,
  pub text: String,
  pub line: usize,
}

impl Token {
  pub fn new(kind: TokenKind, text: impl Into<String>, line: usize) -> Self {
    Self {
      kind,
      text: text.into(),
      line,
    }
  }
}

/// Cursor over the source bytes. Newlines bump the line counter as they are
/// stepped over, so a token always reports the line it starts on.
struct Scanner<'a> {
  input: &'a str,
  bytes: &'a [u8],
  pos: usize,
  line: usize,
  tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
  fn new(input: &'a str) -> Self {
    Self {
      input,
      bytes: input.as_bytes(),
      pos: 0,
      line: 1,
      tokens: Vec::new(),
    }
  }

  fn at(&self) -> Option<u8> {
    self.bytes.get(self.pos).copied()
  }

  fn advance(&mut self) {
    if self.at() == Some(b'\n') {
      self.line += 1;
    }
    self.pos += 1;
  }

  fn push(&mut self, kind: TokenKind, text: impl Into<String>) {
    self.tokens.push(Token::new(kind, text, self.line));
  }

  fn run(mut self) -> Vec<Token> {
    while let Some(c) = self.at() {
      match c {
        b' ' | b'\r' | b'\n' => self.advance(),
        b'\'' | b'"' => self.lex_string(c),
        c if c.is_ascii_alphabetic() || c == b'_' => self.lex_ident(),
        c if c.is_ascii_digit() => self.lex_number(),
        _ => self.lex_symbol(),
      }
    }

    self.push(TokenKind::EndOfFile, END_OF_FILE_TEXT);
    self.tokens
  }

  fn lex_string(&mut self, quote: u8) {
    let kind = if quote == b'\'' {
      TokenKind::Char
    } else {
      TokenKind::String
    };
    let line = self.line;
    self.advance();
    let start = self.pos;

    while let Some(c) = self.at()
      && c != quote
    {
      self.advance();
    }

    if self.at().is_none() {
      self.push(TokenKind::Invalid, END_OF_FILE_TEXT);
      return;
    }

    // Quotes are ASCII, so both ends sit on char boundaries.
    let text = &self.input[start..self.pos];
    self.advance();
    self.tokens.push(Token::new(kind, text, line));
  }

  fn lex_ident(&mut self) {
    let start = self.pos;
    while let Some(c) = self.at()
      && (c.is_ascii_alphanumeric() || c == b'_')
    {
      self.advance();
    }
    let text = &self.input[start..self.pos];
    let kind = TokenKind::keyword(text).unwrap_or(TokenKind::Identifier);
    self.push(kind, text);
  }

  fn lex_number(&mut self) {
    let start = self.pos;
    while let Some(c) = self.at()
      && c.is_ascii_digit()
    {
      self.advance();
    }
    let text = &self.input[start..self.pos];
    self.push(TokenKind::Number, text);
  }

  fn lex_symbol(&mut self) {
    let Some(c) = self.input[self.pos..].chars().next() else {
      self.pos = self.bytes.len();
      return;
    };
    let kind = TokenKind::symbol(c).unwrap_or(TokenKind::Invalid);
    self.push(kind, c.to_string());
    self.pos += c.len_utf8();
  }
}

/// Lex the input into a flat vector of tokens terminated by one `EndOfFile`.
pub fn tokenize(input: &str) -> Vec<Token> {
  let tokens = Scanner::new(input).run();
  tracing::debug!(count = tokens.len(), "tokenized source");
  tokens
}

/// Human-friendly description used in diagnostics.
pub fn describe_token(token: &Token) -> &str {
  &token.text
}

//! Recursive-descent IR generator.
//!
//! The grammar helpers follow the usual precedence ladder (`add` → `mult` →
//! `ref` → `primary`) but emit straight into the current label instead of
//! building a tree: every expression leaves one value for the stack machine.
//! Nothing here aborts. A wrong token is recorded in the diagnostics and the
//! helpers keep consuming input, so one pass reports every problem it sees.

use crate::error::Diagnostics;
use crate::escape::{EscapeError, decode_escape, unescape};
use crate::ir::{IrInfo, IrOp, IrValue};
use crate::scope::{ScopeTable, Slot};
use crate::tokenizer::{END_OF_FILE_TEXT, Token, TokenKind, describe_token};

/// Lightweight cursor over the token vector.
///
/// The last token is always `EndOfFile` and the cursor never moves past it,
/// so every loop that stops at `EndOfFile` terminates.
#[derive(Debug, Default)]
struct TokenStream {
  tokens: Vec<Token>,
  pos: usize,
}

impl TokenStream {
  fn new(mut tokens: Vec<Token>) -> Self {
    if tokens.last().map(|t| t.kind) != Some(TokenKind::EndOfFile) {
      let line = tokens.last().map_or(1, |t| t.line);
      tokens.push(Token::new(TokenKind::EndOfFile, END_OF_FILE_TEXT, line));
    }
    Self { tokens, pos: 0 }
  }

  fn current(&self) -> &Token {
    &self.tokens[self.pos]
  }

  fn kind(&self) -> TokenKind {
    self.current().kind
  }

  fn at(&self, kind: TokenKind) -> bool {
    self.kind() == kind
  }

  fn is_eof(&self) -> bool {
    self.at(TokenKind::EndOfFile)
  }

  /// Look `offset` tokens ahead, clamped to the trailing `EndOfFile`.
  fn peek(&self, offset: usize) -> &Token {
    let last = self.tokens.len() - 1;
    &self.tokens[(self.pos + offset).min(last)]
  }

  /// The token most recently consumed, or the current one at the start.
  fn previous(&self) -> &Token {
    &self.tokens[self.pos.saturating_sub(1)]
  }

  fn advance(&mut self) {
    if !self.is_eof() {
      self.pos += 1;
    }
  }

  fn eat(&mut self) -> Token {
    let token = self.current().clone();
    self.advance();
    token
  }
}

/// Turns a token stream into an `IrInfo`, one label per function.
#[derive(Debug)]
pub struct IrGenerator {
  source_name: String,
  stream: TokenStream,
  scopes: ScopeTable,
  ir: IrInfo,
  diagnostics: Diagnostics,
  current_label: Option<String>,
  /// Braces opened and not yet closed.
  open_blocks: usize,
}

impl IrGenerator {
  pub fn new(source_name: impl Into<String>) -> Self {
    Self {
      source_name: source_name.into(),
      stream: TokenStream::default(),
      scopes: ScopeTable::new(),
      ir: IrInfo::new(),
      diagnostics: Diagnostics::new(),
      current_label: None,
      open_blocks: 0,
    }
  }

  /// Generate IR for one source unit. State from earlier calls is discarded.
  pub fn generate(&mut self, tokens: Vec<Token>) -> IrInfo {
    self.stream = TokenStream::new(tokens);
    self.scopes.reset();
    self.ir = IrInfo::new();
    self.diagnostics.clear();
    self.current_label = None;
    self.open_blocks = 0;

    while !self.stream.is_eof() {
      self.gen_stmt();
    }

    tracing::debug!(
      source = %self.source_name,
      labels = self.ir.labels().len(),
      strings = self.ir.strings.len(),
      errors = self.diagnostics.len(),
      "generated ir"
    );
    std::mem::take(&mut self.ir)
  }

  pub fn has_errors(&self) -> bool {
    self.diagnostics.has_errors()
  }

  pub fn diagnostics(&self) -> &Diagnostics {
    &self.diagnostics
  }

  pub fn take_diagnostics(&mut self) -> Diagnostics {
    std::mem::take(&mut self.diagnostics)
  }

  /// Every recorded error as one text block.
  pub fn report(&self) -> String {
    self.diagnostics.report()
  }

  fn error(&mut self, message: impl Into<String>) {
    let line = self.stream.previous().line;
    self
      .diagnostics
      .error(self.current_label.as_deref(), &self.source_name, line, message);
  }

  /// Consume one token, reporting it if it is not `kind`.
  fn expect(&mut self, kind: TokenKind, message: &str) -> Token {
    let token = self.stream.eat();
    if token.kind != kind {
      self.error(format!("{message}, got '{}'", describe_token(&token)));
    }
    token
  }

  fn open_label(&mut self, name: &str) {
    tracing::debug!(label = name, "opening label");
    self.ir.add_label(name);
    self.current_label = Some(name.to_string());
  }

  fn emit(&mut self, value: impl Into<IrValue>) {
    let value = value.into();
    match &self.current_label {
      Some(label) => self.ir.push(label, value),
      None => tracing::trace!(?value, "no active label, dropping"),
    }
  }

  fn emit_with(&mut self, op: IrOp, operand: String) {
    self.emit(op);
    self.emit(operand);
  }

  fn report_escape(&mut self, err: EscapeError) {
    self.error(err.to_string());
  }

  /// Resolve a name to its slot. `report` is off at declaration sites, where
  /// a miss just means the name is new.
  fn local(&mut self, name: &str, report: bool) -> Option<Slot> {
    let slot = self.scopes.lookup(name);
    if slot.is_none() && report {
      self.error(format!("local '{name}' does not exist"));
    }
    slot
  }

  fn gen_primary(&mut self) {
    let token = self.stream.eat();
    match token.kind {
      TokenKind::Number => self.emit_with(IrOp::LoadNumber, token.text),
      TokenKind::String => {
        let mut errors = Vec::new();
        let bytes = unescape(&token.text, |err| errors.push(err));
        for err in errors {
          self.report_escape(err);
        }
        let offset = self.ir.intern_string(bytes);
        self.emit_with(IrOp::LoadNumber, offset.to_string());
      }
      TokenKind::Char => {
        let mut cursor = 0;
        let byte = match decode_escape(token.text.as_bytes(), &mut cursor) {
          Ok(byte) => byte,
          Err(err) => {
            self.report_escape(err);
            0
          }
        };
        self.emit_with(IrOp::LoadNumber, byte.to_string());
      }
      TokenKind::Identifier => {
        if let Some(slot) = self.local(&token.text, true) {
          self.emit_with(IrOp::LoadStack, slot.offset().to_string());
        }
      }
      _ => self.error(format!("unexpected symbol '{}'", describe_token(&token))),
    }
  }

  fn gen_ref(&mut self) {
    match self.stream.kind() {
      TokenKind::Star => {
        let mut depth = 0;
        while self.stream.at(TokenKind::Star) {
          self.stream.advance();
          depth += 1;
        }
        self.gen_primary();
        for _ in 0..depth {
          self.emit(IrOp::Deref);
        }
      }
      TokenKind::Ampersand => {
        self.stream.advance();
        let token = self.expect(
          TokenKind::Identifier,
          "expected lvalue next to address-of operator",
        );
        // Same encoding as a plain load; a later stage tells them apart.
        if token.kind == TokenKind::Identifier
          && let Some(slot) = self.local(&token.text, true)
        {
          self.emit_with(IrOp::LoadStack, slot.offset().to_string());
        }
      }
      _ => self.gen_primary(),
    }
  }

  fn gen_mult(&mut self) {
    self.gen_ref();

    loop {
      let op = match self.stream.kind() {
        TokenKind::Star => IrOp::Mul,
        TokenKind::Slash => IrOp::Div,
        _ => break,
      };
      self.stream.advance();
      self.gen_ref();
      self.emit(op);
    }
  }

  fn gen_add(&mut self) {
    self.gen_mult();

    loop {
      let op = match self.stream.kind() {
        TokenKind::Plus => IrOp::Add,
        TokenKind::Minus => IrOp::Sub,
        _ => break,
      };
      self.stream.advance();
      self.gen_mult();
      self.emit(op);
    }
  }

  fn gen_expr(&mut self) {
    self.gen_add();
  }

  fn gen_function(&mut self) {
    let name = self.stream.eat().text;
    self.open_label(&name);
    self.stream.advance();
    self.scopes.clear_parameters();

    // Position of the next parameter, 1-based.
    let mut position = 1;
    let mut params = Vec::new();

    if !self.stream.at(TokenKind::CloseParen) {
      let token = self.expect(TokenKind::Identifier, "invalid parameter #1");
      if token.kind == TokenKind::Identifier {
        params.push(token.text);
      }
      position += 1;
    }

    while !self.stream.at(TokenKind::CloseParen) && !self.stream.is_eof() {
      self.expect(
        TokenKind::Comma,
        &format!("expected ',' beside parameter #{}", position - 1),
      );
      let token = self.expect(
        TokenKind::Identifier,
        &format!("invalid parameter #{position}"),
      );
      if token.kind == TokenKind::Identifier {
        params.push(token.text);
      }
      position += 1;
    }

    self.expect(TokenKind::CloseParen, "expected ')' when closing parameters");

    if params.len() == position - 1 {
      self.scopes.bind_parameters(&params);
    } else {
      tracing::debug!(
        label = %name,
        parsed = params.len(),
        declared = position - 1,
        "malformed parameter list, parameters left unbound"
      );
    }

    // Inside a block the enclosing `gen_block` loop walks this body too.
    if self.open_blocks == 0 {
      self.gen_block();
    } else {
      self.open_block();
    }
  }

  fn open_block(&mut self) {
    self.expect(TokenKind::OpenBrace, "expected '{' when opening scope");
    self.scopes.push_block();
    self.open_blocks += 1;
  }

  fn close_block(&mut self) {
    self.scopes.pop_block();
    self.open_blocks -= 1;
    self.expect(TokenKind::CloseBrace, "expected '}' when closing scope");
  }

  /// Parse a block and everything nested in it without recursing per brace,
  /// so nesting depth is bounded by the input only.
  fn gen_block(&mut self) {
    let base = self.open_blocks;
    self.open_block();
    while self.open_blocks > base {
      match self.stream.kind() {
        TokenKind::OpenBrace => self.open_block(),
        TokenKind::CloseBrace | TokenKind::EndOfFile => self.close_block(),
        _ => self.gen_stmt(),
      }
    }
  }

  fn gen_var_decl(&mut self) {
    let name = self.stream.eat().text;
    let existing = self.local(&name, false);
    self.stream.advance();

    match existing {
      Some(slot) => {
        self.gen_expr();
        self.emit_with(IrOp::Assign, slot.offset().to_string());
      }
      None => {
        // The freshly computed value initializes the new slot; no store.
        if self.scopes.declare_local(&name).is_none() {
          self.error(format!("variable '{name}' declared outside of a function"));
        }
        self.gen_expr();
      }
    }
  }

  fn gen_decl(&mut self) {
    match self.stream.peek(1).kind {
      TokenKind::OpenParen => self.gen_function(),
      TokenKind::Equal => self.gen_var_decl(),
      _ => {
        self.stream.advance();
        self.error("expected declaration");
        self.gen_expr();
      }
    }
  }

  fn gen_stmt(&mut self) {
    match self.stream.kind() {
      TokenKind::Identifier => self.gen_decl(),
      TokenKind::OpenBrace => self.gen_block(),
      TokenKind::Semicolon => self.stream.advance(),
      _ => {
        self.error("expected declaration");
        self.gen_expr();
      }
    }
  }
}

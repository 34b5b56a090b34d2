use bfront::escape::unescape;
use bfront::{IrGenerator, Token, TokenKind, tokenize};
use proptest::prelude::*;

/// One lexical unit whose quotes are always balanced.
fn unit() -> impl Strategy<Value = String> {
  prop_oneof![
    "[a-z_][a-z0-9_]{0,8}",
    "[0-9]{1,6}",
    "\"[a-z \\\\]{0,10}\"",
    "'[a-z]{0,2}'",
    prop::sample::select(vec!["+", "-", "*", "/", "=", ",", "&", ";", "(", ")", "{", "}"])
      .prop_map(str::to_string),
  ]
}

fn kind() -> impl Strategy<Value = TokenKind> {
  prop::sample::select(vec![
    TokenKind::Number,
    TokenKind::String,
    TokenKind::Char,
    TokenKind::Identifier,
    TokenKind::Invalid,
    TokenKind::Return,
    TokenKind::Plus,
    TokenKind::Minus,
    TokenKind::Star,
    TokenKind::Slash,
    TokenKind::Equal,
    TokenKind::Comma,
    TokenKind::Ampersand,
    TokenKind::Semicolon,
    TokenKind::OpenParen,
    TokenKind::CloseParen,
    TokenKind::OpenBrace,
    TokenKind::CloseBrace,
  ])
}

proptest! {
  #[test]
  fn one_token_per_unit_plus_eof(units in prop::collection::vec(unit(), 0..40)) {
    let source = units.join(" ");
    let tokens = tokenize(&source);
    prop_assert_eq!(tokens.len(), units.len() + 1);
    let eofs = tokens.iter().filter(|t| t.kind == TokenKind::EndOfFile).count();
    prop_assert_eq!(eofs, 1);
    prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::EndOfFile));
  }

  #[test]
  fn eof_line_matches_newline_count(source in "[a-z0-9 \n+(){}]{0,80}") {
    let tokens = tokenize(&source);
    let newlines = source.matches('\n').count();
    prop_assert_eq!(tokens.last().map(|t| t.line), Some(newlines + 1));
  }

  #[test]
  fn unescape_is_identity_without_backslash(text in "[^\\\\]{0,64}") {
    let bytes = unescape(&text, |_| panic!("no escapes present"));
    prop_assert_eq!(bytes, text.as_bytes());
  }

  #[test]
  fn generator_terminates_on_token_soup(
    kinds in prop::collection::vec(kind(), 0..60)
  ) {
    let tokens: Vec<_> = kinds
      .into_iter()
      .map(|kind| Token::new(kind, "t", 1))
      .collect();
    let mut generator = IrGenerator::new("soup");
    let _ = generator.generate(tokens);
  }

  #[test]
  fn generator_terminates_on_arbitrary_source(source in "[ -~\n]{0,120}") {
    let mut generator = IrGenerator::new("fuzz");
    let _ = generator.generate(tokenize(&source));
  }
}

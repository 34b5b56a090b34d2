use std::path::Path;

use bfront::{
  CompileError, Instruction, IrGenerator, IrOp, TokenKind, compile_file, compile_source,
  escape::unescape, tokenize,
};

fn ins(op: IrOp, operands: &[&str]) -> Instruction {
  Instruction::new(op, operands)
}

#[test]
fn end_to_end_main_label() {
  let ir = compile_source("main(){ a = 1 + 2 * 3 }", "main.b").expect("compiles");
  assert_eq!(
    ir.instructions("main"),
    Some(vec![
      ins(IrOp::LoadNumber, &["1"]),
      ins(IrOp::LoadNumber, &["2"]),
      ins(IrOp::LoadNumber, &["3"]),
      ins(IrOp::Mul, &[]),
      ins(IrOp::Add, &[]),
    ])
  );
  assert!(ir.referencing.is_empty());
}

#[test]
fn unresolved_identifier_fails_the_pass() {
  let mut generator = IrGenerator::new("u.b");
  let ir = generator.generate(tokenize("f(){ x = y }"));
  assert!(generator.has_errors());
  let loads = ir
    .instructions("f")
    .unwrap_or_default()
    .into_iter()
    .filter(|i| i.op == IrOp::LoadStack)
    .count();
  assert_eq!(loads, 0);

  match compile_source("f(){ x = y }", "u.b") {
    Err(CompileError::Generation { count, report }) => {
      assert_eq!(count, 1);
      assert_eq!(report, "[ERROR]: f: u.b:1: local 'y' does not exist\n");
    }
    other => panic!("unexpected {other:?}"),
  }
}

#[test]
fn unterminated_string_yields_single_invalid() {
  let tokens = tokenize("\"abc");
  let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
  assert_eq!(kinds, [TokenKind::Invalid, TokenKind::EndOfFile]);
  assert_eq!(tokens[0].text, "end of file");
}

#[test]
fn unterminated_string_is_reported_by_the_generator() {
  let mut generator = IrGenerator::new("s.b");
  generator.generate(tokenize("f(){ x = \"abc }"));
  assert!(
    generator
      .report()
      .contains("unexpected symbol 'end of file'")
  );
}

#[test]
fn escape_round_trips() {
  assert_eq!(unescape(r"\x41\x42", |_| panic!("no errors")), b"AB");
  assert_eq!(unescape(r"\n", |_| panic!("no errors")), [10u8]);
}

#[test]
fn scope_slots_are_reused_after_inner_block() {
  let ir = compile_source("f(a,b){ c = a; { c = b; d = 1; } e = 2; e = 3; }", "s.b")
    .expect("compiles");
  let assigns: Vec<_> = ir
    .instructions("f")
    .unwrap_or_default()
    .into_iter()
    .filter(|i| i.op == IrOp::Assign)
    .collect();
  // `c` stays in slot 0; `e` lands in slot 1, the slot `d` held.
  assert_eq!(assigns, vec![ins(IrOp::Assign, &["0"]), ins(IrOp::Assign, &["-1"])]);
}

#[test]
fn string_pool_offsets_index_into_the_pool() {
  let ir = compile_source(r#"f(){ a = "hello" b = "\x21" }"#, "p.b").expect("compiles");
  let code = ir.instructions("f").unwrap_or_default();
  assert_eq!(code[1], ins(IrOp::LoadNumber, &["5"]));
  assert_eq!(ir.string_at(5), Some(&b"!"[..]));
}

#[test]
fn missing_file_is_a_read_error() {
  let err = compile_file(Path::new("definitely/not/here.b")).unwrap_err();
  assert!(matches!(err, CompileError::ReadSource { .. }));
  assert!(err.to_string().contains("definitely/not/here.b"));
}

#[test]
fn compile_file_uses_path_as_source_name() {
  let dir = std::env::temp_dir().join(format!("bfront-test-{}", std::process::id()));
  std::fs::create_dir_all(&dir).expect("temp dir");
  let path = dir.join("bad.b");
  std::fs::write(&path, "main() {\n  a = b\n}\n").expect("write source");

  let err = compile_file(&path).unwrap_err();
  let expected = format!("[ERROR]: main: {}:2: local 'b' does not exist", path.display());
  assert!(err.to_string().contains(&expected), "{err}");

  std::fs::remove_dir_all(&dir).ok();
}

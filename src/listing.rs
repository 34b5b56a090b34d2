//! Plain-text listings of tokens and IR, used by the driver.
//!
//! One instruction per line, operands space-separated after the mnemonic,
//! each label introduced by `name:` the way an assembler listing would be.

use crate::ir::{Instruction, IrInfo, IrValue, Label};
use crate::tokenizer::Token;

/// `line kind text`, one token per line.
pub fn render_tokens(tokens: &[Token]) -> String {
  let mut out = String::new();
  for token in tokens {
    let kind = format!("{:?}", token.kind);
    out.push_str(&format!("{:>4} {kind:<12} {:?}\n", token.line, token.text));
  }
  out
}

fn render_instruction(out: &mut String, ins: &Instruction) {
  out.push_str("    ");
  out.push_str(ins.op.mnemonic());
  for operand in &ins.operands {
    out.push(' ');
    out.push_str(operand);
  }
  out.push('\n');
}

/// Listing for a single label.
pub fn render_label(ir: &IrInfo, label: &Label) -> String {
  let mut out = format!("{}:\n", label.name);
  let instructions = ir.instructions(&label.name).unwrap_or_default();
  for ins in &instructions {
    render_instruction(&mut out, ins);
  }

  // Anything the grouping could not consume is shown raw.
  let consumed: usize = instructions.iter().map(|i| 1 + i.operands.len()).sum();
  for value in label.values.iter().skip(consumed) {
    match value {
      IrValue::Op(op) => out.push_str(&format!("    ; dangling {op}\n")),
      IrValue::Operand(operand) => out.push_str(&format!("    ; stray operand {operand:?}\n")),
    }
  }
  out
}

/// Listing for the whole program: the selected labels (all of them when
/// `only` is empty) followed by the string pool.
pub fn render_program(ir: &IrInfo, only: &[String]) -> String {
  let mut out = String::new();
  for label in ir.labels() {
    if only.is_empty() || only.iter().any(|name| *name == label.name) {
      out.push_str(&render_label(ir, label));
    }
  }

  if !ir.strings.is_empty() {
    out.push_str(".strings:\n");
    let mut offset = 0;
    for string in &ir.strings {
      let text = String::from_utf8_lossy(string);
      out.push_str(&format!("    {offset:>4} {text:?}\n"));
      offset += string.len();
    }
  }
  out
}

//! The generator's output: per-label instruction streams plus the string pool.
//!
//! A label's stream is flat. Operands follow the opcode that consumes them
//! and nothing in the stream records how many there are, so readers rely on
//! `IrOp::arity`. `IrInfo::instructions` does that grouping for them.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrOp {
  LoadNumber,
  LoadStack,
  Deref,
  Assign,
  Add,
  Sub,
  Mul,
  Div,
}

impl IrOp {
  /// Number of operand strings that trail this opcode.
  pub fn arity(self) -> usize {
    match self {
      IrOp::LoadNumber | IrOp::LoadStack | IrOp::Assign => 1,
      IrOp::Deref | IrOp::Add | IrOp::Sub | IrOp::Mul | IrOp::Div => 0,
    }
  }

  pub fn mnemonic(self) -> &'static str {
    match self {
      IrOp::LoadNumber => "load_number",
      IrOp::LoadStack => "load_stack",
      IrOp::Deref => "deref",
      IrOp::Assign => "assign",
      IrOp::Add => "add",
      IrOp::Sub => "sub",
      IrOp::Mul => "mul",
      IrOp::Div => "div",
    }
  }
}

impl fmt::Display for IrOp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.mnemonic())
  }
}

/// One element of a label's stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrValue {
  Op(IrOp),
  Operand(String),
}

impl From<IrOp> for IrValue {
  fn from(op: IrOp) -> Self {
    IrValue::Op(op)
  }
}

impl From<String> for IrValue {
  fn from(operand: String) -> Self {
    IrValue::Operand(operand)
  }
}

impl From<&str> for IrValue {
  fn from(operand: &str) -> Self {
    IrValue::Operand(operand.to_string())
  }
}

/// An opcode grouped with its operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
  pub op: IrOp,
  pub operands: Vec<String>,
}

impl Instruction {
  pub fn new(op: IrOp, operands: &[&str]) -> Self {
    Self {
      op,
      operands: operands.iter().map(|s| s.to_string()).collect(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
  pub name: String,
  pub values: Vec<IrValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IrInfo {
  labels: Vec<Label>,
  pub strings: Vec<Vec<u8>>,
  pub string_ptr: usize,
  /// External names a label refers to. Nothing fills this yet.
  pub referencing: Vec<String>,
}

impl IrInfo {
  pub fn new() -> Self {
    Self::default()
  }

  /// Start (or restart) a label. A repeated name keeps its position but
  /// loses its previous instructions.
  pub fn add_label(&mut self, name: &str) {
    match self.labels.iter_mut().find(|label| label.name == name) {
      Some(label) => label.values.clear(),
      None => self.labels.push(Label {
        name: name.to_string(),
        values: Vec::new(),
      }),
    }
  }

  /// Append to an existing label; unknown labels are ignored.
  pub fn push(&mut self, label: &str, value: IrValue) {
    if let Some(label) = self.labels.iter_mut().rev().find(|l| l.name == label) {
      label.values.push(value);
    }
  }

  /// Labels in insertion order.
  pub fn labels(&self) -> &[Label] {
    &self.labels
  }

  pub fn label(&self, name: &str) -> Option<&[IrValue]> {
    self
      .labels
      .iter()
      .find(|label| label.name == name)
      .map(|label| label.values.as_slice())
  }

  /// Add a decoded literal to the pool and return the offset it starts at.
  pub fn intern_string(&mut self, bytes: Vec<u8>) -> usize {
    let offset = self.string_ptr;
    self.string_ptr += bytes.len();
    self.strings.push(bytes);
    offset
  }

  /// The pool literal that starts exactly at `offset`.
  pub fn string_at(&self, offset: usize) -> Option<&[u8]> {
    let mut start = 0;
    for string in &self.strings {
      if start == offset {
        return Some(string);
      }
      start += string.len();
    }
    None
  }

  /// Group a label's flat stream into instructions using each opcode's arity.
  ///
  /// A stray operand, or an opcode cut short at the end of the stream, ends
  /// the walk; everything decoded up to that point is returned.
  pub fn instructions(&self, name: &str) -> Option<Vec<Instruction>> {
    let values = self.label(name)?;
    let mut out = Vec::new();
    let mut iter = values.iter();
    while let Some(value) = iter.next() {
      let IrValue::Op(op) = value else {
        break;
      };
      let mut operands = Vec::with_capacity(op.arity());
      for _ in 0..op.arity() {
        match iter.next() {
          Some(IrValue::Operand(operand)) => operands.push(operand.clone()),
          _ => return Some(out),
        }
      }
      out.push(Instruction { op: *op, operands });
    }
    Some(out)
  }
}

//! Parameter and local-variable slots for the function being generated.
//!
//! Locals grow downward from the frame base and parameters upward, so a
//! resolved slot is emitted negated for locals and as-is for parameters.
//! Closing a block rewinds the slot counter: slots are reused, never freed.

use std::collections::HashMap;

/// Where a name lives relative to the frame base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
  Local(usize),
  Param(usize),
}

impl Slot {
  /// Signed offset as written into the IR.
  pub fn offset(self) -> i64 {
    match self {
      Slot::Local(index) => -(index as i64),
      Slot::Param(index) => index as i64,
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct ScopeTable {
  params: HashMap<String, usize>,
  scopes: Vec<HashMap<String, usize>>,
  saved_sizes: Vec<usize>,
  size: usize,
}

impl ScopeTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Drop every binding and rewind the slot counter.
  pub fn reset(&mut self) {
    self.params.clear();
    self.scopes.clear();
    self.saved_sizes.clear();
    self.size = 0;
  }

  pub fn push_block(&mut self) {
    self.saved_sizes.push(self.size);
    self.scopes.push(HashMap::new());
  }

  pub fn pop_block(&mut self) {
    if let Some(size) = self.saved_sizes.pop() {
      self.size = size;
    }
    self.scopes.pop();
  }

  /// Bind `name` to the next slot in the innermost scope.
  ///
  /// Returns `None` when no scope is open.
  pub fn declare_local(&mut self, name: &str) -> Option<Slot> {
    let scope = self.scopes.last_mut()?;
    let index = self.size;
    scope.insert(name.to_string(), index);
    self.size += 1;
    Some(Slot::Local(index))
  }

  /// First declared parameter gets the highest index, the last one gets 1.
  pub fn bind_parameters<S: AsRef<str>>(&mut self, names: &[S]) {
    self.params.clear();
    for (name, index) in names.iter().zip((1..=names.len()).rev()) {
      self.params.insert(name.as_ref().to_string(), index);
    }
  }

  pub fn clear_parameters(&mut self) {
    self.params.clear();
  }

  /// Innermost local first, then parameters.
  pub fn lookup(&self, name: &str) -> Option<Slot> {
    for scope in self.scopes.iter().rev() {
      if let Some(&index) = scope.get(name) {
        return Some(Slot::Local(index));
      }
    }
    self.params.get(name).map(|&index| Slot::Param(index))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parameters_count_down_from_len() {
    let mut table = ScopeTable::new();
    table.bind_parameters(&["a", "b", "c"]);
    assert_eq!(table.lookup("a"), Some(Slot::Param(3)));
    assert_eq!(table.lookup("b"), Some(Slot::Param(2)));
    assert_eq!(table.lookup("c"), Some(Slot::Param(1)));
    assert_eq!(table.lookup("d"), None);
  }

  #[test]
  fn offsets_carry_address_space_in_sign() {
    assert_eq!(Slot::Local(2).offset(), -2);
    assert_eq!(Slot::Local(0).offset(), 0);
    assert_eq!(Slot::Param(2).offset(), 2);
  }

  #[test]
  fn no_open_scope_means_no_local() {
    let mut table = ScopeTable::new();
    assert_eq!(table.declare_local("x"), None);
    table.push_block();
    assert_eq!(table.declare_local("x"), Some(Slot::Local(0)));
  }

  #[test]
  fn inner_scope_shadows_and_slots_are_reused() {
    let mut table = ScopeTable::new();
    table.push_block();
    assert_eq!(table.declare_local("x"), Some(Slot::Local(0)));

    table.push_block();
    assert_eq!(table.declare_local("x"), Some(Slot::Local(1)));
    assert_eq!(table.declare_local("y"), Some(Slot::Local(2)));
    assert_eq!(table.lookup("x"), Some(Slot::Local(1)));
    table.pop_block();

    assert_eq!(table.lookup("x"), Some(Slot::Local(0)));
    assert_eq!(table.lookup("y"), None);
    assert_eq!(table.declare_local("z"), Some(Slot::Local(1)));
  }

  #[test]
  fn locals_shadow_parameters() {
    let mut table = ScopeTable::new();
    table.bind_parameters(&["a"]);
    table.push_block();
    table.declare_local("a");
    assert_eq!(table.lookup("a"), Some(Slot::Local(0)));
    table.pop_block();
    assert_eq!(table.lookup("a"), Some(Slot::Param(1)));
  }

  #[test]
  fn reset_forgets_everything() {
    let mut table = ScopeTable::new();
    table.bind_parameters(&["p"]);
    table.push_block();
    table.declare_local("l");
    table.reset();
    assert_eq!(table.declare_local("again"), None);
    assert_eq!(table.lookup("p"), None);
    assert_eq!(table.lookup("l"), None);
  }
}

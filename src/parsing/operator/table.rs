
use super::{Operator, Fixity, Associativity, Precedence};
use crate::ast::Kind;
use crate::parsing::formula::Dialect;

use std::collections::{hash_map, HashMap};

pub const OR_PREC: Precedence = Precedence::new(1);
pub const XOR_PREC: Precedence = Precedence::new(2);
pub const AND_PREC: Precedence = Precedence::new(3);
pub const NOT_PREC: Precedence = Precedence::new(4);
pub const RELATIONAL_PREC: Precedence = Precedence::new(5);
pub const ADDITIVE_PREC: Precedence = Precedence::new(6);
pub const MULTIPLICATIVE_PREC: Precedence = Precedence::new(7);
pub const NEGATION_PREC: Precedence = Precedence::new(8);
pub const POWER_PREC: Precedence = Precedence::new(9);
pub const FACTORIAL_PREC: Precedence = Precedence::new(10);

/// A table of operators, indexed by their symbol.
#[derive(Debug, Clone, Default)]
pub struct OperatorTable {
  by_symbol: HashMap<String, Operator>,
}

impl OperatorTable {
  pub fn new() -> OperatorTable {
    OperatorTable::default()
  }

  pub fn with_capacity(capacity: usize) -> OperatorTable {
    OperatorTable {
      by_symbol: HashMap::with_capacity(capacity),
    }
  }

  pub fn get(&self, symbol: &str) -> Option<&Operator> {
    self.by_symbol.get(symbol)
  }

  pub fn insert(&mut self, op: Operator) {
    self.by_symbol.insert(op.symbol().to_owned(), op);
  }

  /// The operators shared by both grammars.
  pub fn legacy_operators() -> OperatorTable {
    vec![
      Operator::new("+", Fixity::new().with_infix(Kind::Plus, Associativity::Left, ADDITIVE_PREC)),
      Operator::new("-", Fixity::new()
        .with_infix(Kind::Minus, Associativity::Left, ADDITIVE_PREC)
        .with_prefix(Kind::Minus, NEGATION_PREC)),
      Operator::new("*", Fixity::new().with_infix(Kind::Times, Associativity::Left, MULTIPLICATIVE_PREC)),
      Operator::new("/", Fixity::new().with_infix(Kind::Divide, Associativity::Left, MULTIPLICATIVE_PREC)),
      Operator::new("^", Fixity::new().with_infix(Kind::Power, Associativity::Right, POWER_PREC)),
      Operator::new("<", Fixity::new().with_infix(Kind::RelationalLt, Associativity::Left, RELATIONAL_PREC)),
      Operator::new(">", Fixity::new().with_infix(Kind::RelationalGt, Associativity::Left, RELATIONAL_PREC)),
    ].into_iter().collect()
  }

  /// The legacy operators plus the logical, equality, modulo and
  /// factorial operators of the extended grammar.
  pub fn extended_operators() -> OperatorTable {
    let mut table = OperatorTable::legacy_operators();
    table.extend([
      Operator::new("==", Fixity::new().with_infix(Kind::RelationalEq, Associativity::Left, RELATIONAL_PREC)),
      Operator::new("!=", Fixity::new().with_infix(Kind::RelationalNeq, Associativity::Left, RELATIONAL_PREC)),
      Operator::new(">=", Fixity::new().with_infix(Kind::RelationalGeq, Associativity::Left, RELATIONAL_PREC)),
      Operator::new("<=", Fixity::new().with_infix(Kind::RelationalLeq, Associativity::Left, RELATIONAL_PREC)),
      Operator::new("&&", Fixity::new().with_infix(Kind::LogicalAnd, Associativity::Left, AND_PREC)),
      Operator::new("||", Fixity::new().with_infix(Kind::LogicalOr, Associativity::Left, OR_PREC)),
      Operator::new("xor", Fixity::new().with_infix(Kind::LogicalXor, Associativity::Left, XOR_PREC)),
      Operator::new("%", Fixity::new().with_infix(Kind::FunctionRem, Associativity::Left, MULTIPLICATIVE_PREC)),
      Operator::new("!", Fixity::new()
        .with_prefix(Kind::LogicalNot, NOT_PREC)
        .with_postfix(Kind::FunctionFactorial, FACTORIAL_PREC)),
    ]);
    table
  }

  pub fn for_dialect(dialect: Dialect) -> OperatorTable {
    match dialect {
      Dialect::L1 => OperatorTable::legacy_operators(),
      Dialect::L3 => OperatorTable::extended_operators(),
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = &Operator> {
    self.by_symbol.values()
  }

  /// The symbols of every punctuation operator in the table. Word
  /// operators are recognized from identifiers instead.
  pub fn punctuation_symbols(&self) -> impl Iterator<Item = &str> {
    self.iter().filter(|op| !op.is_word()).map(Operator::symbol)
  }
}

impl Extend<Operator> for OperatorTable {
  fn extend<I>(&mut self, iter: I)
  where I: IntoIterator<Item = Operator> {
    for op in iter {
      self.insert(op);
    }
  }
}

impl IntoIterator for OperatorTable {
  type Item = Operator;
  type IntoIter = hash_map::IntoValues<String, Operator>;

  fn into_iter(self) -> Self::IntoIter {
    self.by_symbol.into_values()
  }
}

impl FromIterator<Operator> for OperatorTable {
  fn from_iter<I>(iter: I) -> Self
  where I : IntoIterator<Item = Operator> {
    let iter = iter.into_iter();
    let (len_bound, _) = iter.size_hint();
    let mut table = OperatorTable::with_capacity(len_bound);
    table.extend(iter);
    table
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_legacy_table_lacks_extended_operators() {
    let table = OperatorTable::for_dialect(Dialect::L1);
    for symbol in ["&&", "||", "!", "==", "!=", ">=", "<=", "%"] {
      assert!(table.get(symbol).is_none(), "{symbol} should not be in L1");
    }
    assert!(table.get("^").is_some());
  }

  #[test]
  fn test_extended_table() {
    let table = OperatorTable::for_dialect(Dialect::L3);
    let bang = table.get("!").unwrap();
    assert_eq!(bang.fixity().as_prefix().unwrap().kind(), Kind::LogicalNot);
    assert_eq!(bang.fixity().as_postfix().unwrap().kind(), Kind::FunctionFactorial);
    assert!(table.punctuation_symbols().all(|s| s != "xor"));
  }

  #[test]
  fn test_precedence_order() {
    assert!(OR_PREC < XOR_PREC);
    assert!(XOR_PREC < AND_PREC);
    assert!(AND_PREC < NOT_PREC);
    assert!(NOT_PREC < RELATIONAL_PREC);
    assert!(RELATIONAL_PREC < ADDITIVE_PREC);
    assert!(ADDITIVE_PREC < MULTIPLICATIVE_PREC);
    assert!(MULTIPLICATIVE_PREC < NEGATION_PREC);
    assert!(NEGATION_PREC < POWER_PREC);
    assert!(POWER_PREC < FACTORIAL_PREC);
  }
}

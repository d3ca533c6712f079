
//! Operator declarations for the infix formula grammars.

mod binding;
mod fixity;
mod table;

pub use binding::{Associativity, Precedence};
pub use fixity::{Fixity, FixityType, FixityTypes, EmptyFixity, InfixProperties, PrefixProperties, PostfixProperties};
pub use table::OperatorTable;

/// An operator symbol together with the ways it may be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
  symbol: String,
  fixity: Fixity,
}

impl Operator {
  /// Constructs a new operator with the given properties.
  pub fn new(symbol: impl Into<String>, fixity: Fixity) -> Self {
    Operator {
      symbol: symbol.into(),
      fixity,
    }
  }

  /// The operator as written in formula text.
  pub fn symbol(&self) -> &str {
    &self.symbol
  }

  pub fn fixity(&self) -> &Fixity {
    &self.fixity
  }

  /// Whether the operator is spelled as a word rather than with
  /// punctuation.
  pub fn is_word(&self) -> bool {
    self.symbol.chars().all(|c| c.is_ascii_alphabetic())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ast::Kind;

  #[test]
  fn test_left_assoc_precedence() {
    let op = Operator::new("-", Fixity::new().with_infix(Kind::Minus, Associativity::Left, Precedence::new(1)));
    assert_eq!(op.fixity().as_infix().unwrap().left_precedence(), Precedence::from_raw(10));
    assert_eq!(op.fixity().as_infix().unwrap().right_precedence(), Precedence::from_raw(11));
  }

  #[test]
  fn test_right_assoc_precedence() {
    let op = Operator::new("^", Fixity::new().with_infix(Kind::Power, Associativity::Right, Precedence::new(1)));
    assert_eq!(op.fixity().as_infix().unwrap().left_precedence(), Precedence::from_raw(11));
    assert_eq!(op.fixity().as_infix().unwrap().right_precedence(), Precedence::from_raw(10));
  }

  #[test]
  fn test_none_assoc_precedence() {
    let op = Operator::new("%", Fixity::new().with_infix(Kind::FunctionRem, Associativity::Neither, Precedence::new(1)));
    assert_eq!(op.fixity().as_infix().unwrap().left_precedence(), Precedence::from_raw(11));
    assert_eq!(op.fixity().as_infix().unwrap().right_precedence(), Precedence::from_raw(11));
  }

  #[test]
  fn test_fixity_types() {
    let op = Operator::new("-", Fixity::new()
      .with_infix(Kind::Minus, Associativity::Left, Precedence::new(6))
      .with_prefix(Kind::Minus, Precedence::new(8)));
    assert_eq!(op.fixity().fixity_types(), FixityTypes::PREFIX | FixityTypes::INFIX);
    assert!(!op.fixity().is_postfix());
    assert_eq!(op.fixity().precedence(FixityType::Prefix), Some(Precedence::new(8)));
    assert!(!op.is_word());
    assert!(Operator::new("xor", Fixity::new().with_infix(Kind::LogicalXor, Associativity::Left, Precedence::new(2))).is_word());
  }
}


//! Parsing of infix formula text into expression trees, in either of
//! the two supported grammars.

mod error;
mod lexer;
mod options;
mod parser;

pub use error::ParseError;
pub use lexer::{FormulaLexer, Token, TokenData, NumberLiteral};
pub use options::{Dialect, ParserOptions};
pub use parser::FormulaParser;

use crate::ast::Node;
use crate::compiler::{CompileError, InfixDialect, InfixSettings};
use crate::compiler::infix;
use crate::error::Error;
use crate::parsing::operator::OperatorTable;

/// Parses `text` as a single formula.
pub fn parse(text: &str, options: &ParserOptions) -> Result<Node, ParseError> {
  let table = OperatorTable::for_dialect(options.dialect);
  let node = FormulaParser::new(text, options, &table)?.parse()?;
  tracing::debug!(dialect = %options.dialect, kind = %node.kind(), "parsed formula");
  Ok(node)
}

pub fn parse_with(text: &str, dialect: Dialect, case_sensitive: bool) -> Result<Node, ParseError> {
  parse(text, &ParserOptions::new(dialect, case_sensitive))
}

/// Renders a tree as infix formula text.
pub fn unparse(node: &Node, settings: &InfixSettings) -> Result<String, CompileError> {
  infix::to_formula(node, settings)
}

/// Parses `text`, formats the result in the rendering dialect
/// matching the grammar, and parses that output again.
pub fn round_trip(text: &str, options: &ParserOptions) -> Result<Node, Error> {
  let settings = match options.dialect {
    Dialect::L1 => InfixSettings { dialect: InfixDialect::LibSbml, print_units: false },
    Dialect::L3 => InfixSettings { dialect: InfixDialect::Formula, print_units: true },
  };
  let node = parse(text, options)?;
  let formatted = unparse(&node, &settings)?;
  tracing::trace!(%formatted, "re-parsing formatted formula");
  Ok(parse(&formatted, options)?)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ast::builder::*;
  use crate::ast::Kind;

  #[test]
  fn test_parse_with() {
    let node = parse_with("a + 1", Dialect::L1, true).unwrap();
    assert_eq!(node, plus(name("a"), 1));
  }

  #[test]
  fn test_round_trip_arithmetic() {
    let options = ParserOptions::default();
    for text in ["1 + 2 * 3", "a - (b + c)", "a / (b * c)", "(a + b)^2", "-x / 4", "2^3^4"] {
      let node = parse(text, &options).unwrap();
      assert_eq!(round_trip(text, &options).unwrap(), node, "round trip of {text}");
    }
  }

  #[test]
  fn test_formatted_literals_parse_back() {
    let options = ParserOptions::default();
    let settings = InfixSettings::default();
    let trees = [
      plus(real(1e20), real(1e-7)),
      plus(1, real(-1e20)),
      real(-2.5),
      real(123.456),
      real_e(1.5, -2),
      real_e(2.0, 0),
      real_e(-7.25, 300),
      integer(i64::MAX),
      divide_by(real(0.5), real_e(3.0, 4)),
      minus(5, -3),
      pow(real(-2.5), 2),
      pow(real(2.5), unary_minus(2)),
    ];
    for tree in trees {
      let text = unparse(&tree, &settings).unwrap();
      assert_eq!(parse(&text, &options).unwrap(), tree, "re-parse of {text}");
    }
  }

  #[test]
  fn test_formatted_negation_parses_back() {
    let options = ParserOptions::default();
    let settings = InfixSettings::default();
    let trees = [
      unary_minus(3),
      unary_minus(-3),
      unary_minus(real(2.5)),
      unary_minus(real_e(1.0, 3)),
      times(2, unary_minus(3)),
      minus(1, unary_minus(real_e(1.0, 3))),
      plus(unary_minus(name("x")), unary_minus(4)),
      divide_by(unary_minus(1), unary_minus(real(0.25))),
    ];
    for tree in trees {
      let text = unparse(&tree, &settings).unwrap();
      let parsed = parse(&text, &options).unwrap();
      assert_eq!(parsed, tree, "re-parse of {text}");
    }
    let parsed = parse(&unparse(&times(2, unary_minus(3)), &settings).unwrap(), &options).unwrap();
    assert_eq!(parsed.get_child(1).unwrap().kind(), Kind::Minus);
  }

  #[test]
  fn test_round_trip_keeps_units() {
    let options = ParserOptions::default();
    let node = round_trip("5 mole + x", &options).unwrap();
    assert_eq!(node.get_child(0).unwrap().units(), Some("mole"));
  }

  #[test]
  fn test_round_trip_factorial_of_sum() {
    let options = ParserOptions::default();
    let node = parse("factorial(n + 1)", &options).unwrap();
    assert_eq!(unparse(&node, &InfixSettings::default()).unwrap(), "(n+1)!");
    assert_eq!(round_trip("factorial(n + 1)", &options).unwrap(), node);
  }

  #[test]
  fn test_round_trip_legacy() {
    let options = ParserOptions::new(Dialect::L1, false);
    let node = round_trip("and(a < b, gt(c, 1))", &options).unwrap();
    assert_eq!(node.kind(), Kind::LogicalAnd);
    assert_eq!(node, and([lt(name("a"), name("b")), gt(name("c"), 1)]));
  }

  #[test]
  fn test_unparse_case_insensitive() {
    let settings = InfixSettings::default();
    for text in ["Cos(x)", "COS(x)", "coS(x)"] {
      let node = parse_with(text, Dialect::L3, false).unwrap();
      assert_eq!(unparse(&node, &settings).unwrap(), "cos(x)");
    }
  }
}

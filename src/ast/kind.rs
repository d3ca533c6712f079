
//! Node kinds, the families they are grouped into, and the arity
//! contract attached to each kind.

use serde::{Serialize, Deserialize};
use phf::phf_map;

use std::fmt::{self, Display, Formatter};

pub const URI_TIME_DEFINITION: &str = "http://www.sbml.org/sbml/symbols/time";
pub const URI_DELAY_DEFINITION: &str = "http://www.sbml.org/sbml/symbols/delay";
pub const URI_AVOGADRO_DEFINITION: &str = "http://www.sbml.org/sbml/symbols/avogadro";

/// Every node kind belongs to exactly one family. A node may only
/// change its kind to another kind within the same family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
  Number,
  Reference,
  Constant,
  Arithmetic,
  Relational,
  Logical,
  UnaryFunction,
  BinaryFunction,
  NaryFunction,
  Lambda,
  Qualifier,
  Constructor,
  Unknown,
}

/// The number of children a node of a given kind accepts. The
/// maximum is enforced by strict nodes on every mutation; the minimum
/// is only consulted by [`Node::is_well_formed`](super::Node::is_well_formed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
  min: usize,
  max: Option<usize>,
}

macro_rules! kinds {
  ($($variant:ident => $type_name:literal in $family:ident;)*) => {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    pub enum Kind {
      $($variant,)*
    }

    impl Kind {
      pub const ALL: &'static [Kind] = &[$(Kind::$variant,)*];

      /// The upper-case type name, as used in diagnostics.
      pub fn type_name(self) -> &'static str {
        match self {
          $(Kind::$variant => $type_name,)*
        }
      }

      pub fn family(self) -> Family {
        match self {
          $(Kind::$variant => Family::$family,)*
        }
      }
    }
  }
}

kinds! {
  Integer => "INTEGER" in Number;
  Real => "REAL" in Number;
  RealE => "REAL_E" in Number;
  Rational => "RATIONAL" in Number;
  Name => "NAME" in Reference;
  NameTime => "NAME_TIME" in Reference;
  NameAvogadro => "NAME_AVOGADRO" in Reference;
  ConstantE => "CONSTANT_E" in Constant;
  ConstantPi => "CONSTANT_PI" in Constant;
  ConstantTrue => "CONSTANT_TRUE" in Constant;
  ConstantFalse => "CONSTANT_FALSE" in Constant;
  Plus => "PLUS" in Arithmetic;
  Minus => "MINUS" in Arithmetic;
  Times => "TIMES" in Arithmetic;
  Divide => "DIVIDE" in Arithmetic;
  Sum => "SUM" in Arithmetic;
  Product => "PRODUCT" in Arithmetic;
  RelationalEq => "RELATIONAL_EQ" in Relational;
  RelationalNeq => "RELATIONAL_NEQ" in Relational;
  RelationalGt => "RELATIONAL_GT" in Relational;
  RelationalGeq => "RELATIONAL_GEQ" in Relational;
  RelationalLt => "RELATIONAL_LT" in Relational;
  RelationalLeq => "RELATIONAL_LEQ" in Relational;
  LogicalAnd => "LOGICAL_AND" in Logical;
  LogicalOr => "LOGICAL_OR" in Logical;
  LogicalXor => "LOGICAL_XOR" in Logical;
  LogicalNot => "LOGICAL_NOT" in Logical;
  LogicalImplies => "LOGICAL_IMPLIES" in Logical;
  FunctionAbs => "FUNCTION_ABS" in UnaryFunction;
  FunctionCeiling => "FUNCTION_CEILING" in UnaryFunction;
  FunctionFloor => "FUNCTION_FLOOR" in UnaryFunction;
  FunctionExp => "FUNCTION_EXP" in UnaryFunction;
  FunctionFactorial => "FUNCTION_FACTORIAL" in UnaryFunction;
  FunctionLn => "FUNCTION_LN" in UnaryFunction;
  FunctionRateOf => "FUNCTION_RATE_OF" in UnaryFunction;
  FunctionSin => "FUNCTION_SIN" in UnaryFunction;
  FunctionCos => "FUNCTION_COS" in UnaryFunction;
  FunctionTan => "FUNCTION_TAN" in UnaryFunction;
  FunctionSec => "FUNCTION_SEC" in UnaryFunction;
  FunctionCsc => "FUNCTION_CSC" in UnaryFunction;
  FunctionCot => "FUNCTION_COT" in UnaryFunction;
  FunctionSinh => "FUNCTION_SINH" in UnaryFunction;
  FunctionCosh => "FUNCTION_COSH" in UnaryFunction;
  FunctionTanh => "FUNCTION_TANH" in UnaryFunction;
  FunctionSech => "FUNCTION_SECH" in UnaryFunction;
  FunctionCsch => "FUNCTION_CSCH" in UnaryFunction;
  FunctionCoth => "FUNCTION_COTH" in UnaryFunction;
  FunctionArcsin => "FUNCTION_ARCSIN" in UnaryFunction;
  FunctionArccos => "FUNCTION_ARCCOS" in UnaryFunction;
  FunctionArctan => "FUNCTION_ARCTAN" in UnaryFunction;
  FunctionArcsec => "FUNCTION_ARCSEC" in UnaryFunction;
  FunctionArccsc => "FUNCTION_ARCCSC" in UnaryFunction;
  FunctionArccot => "FUNCTION_ARCCOT" in UnaryFunction;
  FunctionArcsinh => "FUNCTION_ARCSINH" in UnaryFunction;
  FunctionArccosh => "FUNCTION_ARCCOSH" in UnaryFunction;
  FunctionArctanh => "FUNCTION_ARCTANH" in UnaryFunction;
  FunctionArcsech => "FUNCTION_ARCSECH" in UnaryFunction;
  FunctionArccsch => "FUNCTION_ARCCSCH" in UnaryFunction;
  FunctionArccoth => "FUNCTION_ARCCOTH" in UnaryFunction;
  Power => "POWER" in BinaryFunction;
  FunctionPower => "FUNCTION_POWER" in BinaryFunction;
  FunctionLog => "FUNCTION_LOG" in BinaryFunction;
  FunctionRoot => "FUNCTION_ROOT" in BinaryFunction;
  FunctionQuotient => "FUNCTION_QUOTIENT" in BinaryFunction;
  FunctionRem => "FUNCTION_REM" in BinaryFunction;
  FunctionDelay => "FUNCTION_DELAY" in BinaryFunction;
  Function => "FUNCTION" in NaryFunction;
  FunctionPiecewise => "FUNCTION_PIECEWISE" in NaryFunction;
  FunctionMax => "FUNCTION_MAX" in NaryFunction;
  FunctionMin => "FUNCTION_MIN" in NaryFunction;
  FunctionSelector => "FUNCTION_SELECTOR" in NaryFunction;
  Vector => "VECTOR" in NaryFunction;
  Lambda => "LAMBDA" in Lambda;
  QualifierBvar => "QUALIFIER_BVAR" in Qualifier;
  QualifierDegree => "QUALIFIER_DEGREE" in Qualifier;
  QualifierLogbase => "QUALIFIER_LOGBASE" in Qualifier;
  ConstructorPiece => "CONSTRUCTOR_PIECE" in Constructor;
  ConstructorOtherwise => "CONSTRUCTOR_OTHERWISE" in Constructor;
  Unknown => "UNKNOWN" in Unknown;
}

/// Built-in names, keyed by their canonical lower-case spelling. This
/// is the markup element vocabulary, and also the set of names the
/// formula parser treats as reserved function names.
static BUILTIN_NAMES: phf::Map<&'static str, Kind> = phf_map! {
  "plus" => Kind::Plus,
  "minus" => Kind::Minus,
  "times" => Kind::Times,
  "divide" => Kind::Divide,
  "sum" => Kind::Sum,
  "product" => Kind::Product,
  "power" => Kind::FunctionPower,
  "root" => Kind::FunctionRoot,
  "abs" => Kind::FunctionAbs,
  "exp" => Kind::FunctionExp,
  "ln" => Kind::FunctionLn,
  "log" => Kind::FunctionLog,
  "floor" => Kind::FunctionFloor,
  "ceiling" => Kind::FunctionCeiling,
  "factorial" => Kind::FunctionFactorial,
  "quotient" => Kind::FunctionQuotient,
  "rem" => Kind::FunctionRem,
  "max" => Kind::FunctionMax,
  "min" => Kind::FunctionMin,
  "rateOf" => Kind::FunctionRateOf,
  "and" => Kind::LogicalAnd,
  "or" => Kind::LogicalOr,
  "xor" => Kind::LogicalXor,
  "not" => Kind::LogicalNot,
  "implies" => Kind::LogicalImplies,
  "eq" => Kind::RelationalEq,
  "neq" => Kind::RelationalNeq,
  "gt" => Kind::RelationalGt,
  "geq" => Kind::RelationalGeq,
  "lt" => Kind::RelationalLt,
  "leq" => Kind::RelationalLeq,
  "sin" => Kind::FunctionSin,
  "cos" => Kind::FunctionCos,
  "tan" => Kind::FunctionTan,
  "sec" => Kind::FunctionSec,
  "csc" => Kind::FunctionCsc,
  "cot" => Kind::FunctionCot,
  "sinh" => Kind::FunctionSinh,
  "cosh" => Kind::FunctionCosh,
  "tanh" => Kind::FunctionTanh,
  "sech" => Kind::FunctionSech,
  "csch" => Kind::FunctionCsch,
  "coth" => Kind::FunctionCoth,
  "arcsin" => Kind::FunctionArcsin,
  "arccos" => Kind::FunctionArccos,
  "arctan" => Kind::FunctionArctan,
  "arcsec" => Kind::FunctionArcsec,
  "arccsc" => Kind::FunctionArccsc,
  "arccot" => Kind::FunctionArccot,
  "arcsinh" => Kind::FunctionArcsinh,
  "arccosh" => Kind::FunctionArccosh,
  "arctanh" => Kind::FunctionArctanh,
  "arcsech" => Kind::FunctionArcsech,
  "arccsch" => Kind::FunctionArccsch,
  "arccoth" => Kind::FunctionArccoth,
  "piecewise" => Kind::FunctionPiecewise,
  "piece" => Kind::ConstructorPiece,
  "otherwise" => Kind::ConstructorOtherwise,
  "lambda" => Kind::Lambda,
  "bvar" => Kind::QualifierBvar,
  "degree" => Kind::QualifierDegree,
  "logbase" => Kind::QualifierLogbase,
  "selector" => Kind::FunctionSelector,
  "vector" => Kind::Vector,
  "delay" => Kind::FunctionDelay,
  "exponentiale" => Kind::ConstantE,
  "pi" => Kind::ConstantPi,
  "true" => Kind::ConstantTrue,
  "false" => Kind::ConstantFalse,
};

impl Kind {
  /// Looks up a built-in kind by its canonical (case-sensitive) name.
  pub fn from_name(name: &str) -> Option<Kind> {
    BUILTIN_NAMES.get(name).copied()
  }

  /// The canonical lower-case name of this kind. For operators and
  /// built-in functions, this is the markup element name.
  pub fn name(self) -> &'static str {
    match self {
      Kind::Integer => "integer",
      Kind::Real => "real",
      Kind::RealE => "e-notation",
      Kind::Rational => "rational",
      Kind::Name => "ci",
      Kind::NameTime => "time",
      Kind::NameAvogadro => "avogadro",
      Kind::Power => "power",
      Kind::Function => "function",
      Kind::Unknown => "unknown",
      other => {
        // unwrap: every remaining kind has an entry in BUILTIN_NAMES.
        BUILTIN_NAMES.entries()
          .find(|(_, kind)| **kind == other)
          .map(|(name, _)| *name)
          .unwrap()
      }
    }
  }

  pub fn arity(self) -> Arity {
    match self.family() {
      Family::Number | Family::Reference | Family::Constant => Arity::NULLARY,
      Family::UnaryFunction => Arity::UNARY,
      Family::Relational => Arity::at_least(2),
      Family::Lambda => Arity::at_least(1),
      Family::Unknown => Arity::at_least(0),
      Family::Arithmetic => match self {
        Kind::Divide => Arity::BINARY,
        Kind::Minus => Arity::at_least(1),
        _ => Arity::at_least(0),
      },
      Family::Logical => match self {
        Kind::LogicalNot => Arity::UNARY,
        Kind::LogicalImplies => Arity::BINARY,
        _ => Arity::at_least(0),
      },
      Family::BinaryFunction => match self {
        Kind::FunctionLog | Kind::FunctionRoot => Arity::between(1, 2),
        _ => Arity::BINARY,
      },
      Family::NaryFunction => match self {
        Kind::FunctionMax | Kind::FunctionMin | Kind::FunctionSelector => Arity::at_least(1),
        _ => Arity::at_least(0),
      },
      Family::Qualifier => Arity::UNARY,
      Family::Constructor => match self {
        Kind::ConstructorPiece => Arity::BINARY,
        _ => Arity::UNARY,
      },
    }
  }

  /// Whether a node of this kind may hold a child of kind `child`.
  /// Qualifiers and constructors may only appear under the kinds
  /// that interpret them, and a bound variable must be an identifier
  /// or a number.
  pub fn accepts_child(self, child: Kind) -> bool {
    match child.family() {
      Family::Qualifier => matches!(
        (self, child),
        (Kind::Lambda, Kind::QualifierBvar) |
        (Kind::FunctionRoot, Kind::QualifierDegree) |
        (Kind::FunctionLog, Kind::QualifierLogbase) |
        (Kind::Unknown, _)
      ),
      Family::Constructor => matches!(self, Kind::FunctionPiecewise | Kind::Unknown),
      _ => self != Kind::QualifierBvar || child == Kind::Name || child.is_number(),
    }
  }

  pub fn is_number(self) -> bool {
    self.family() == Family::Number
  }

  pub fn is_constant(self) -> bool {
    self.family() == Family::Constant
  }

  pub fn is_relational(self) -> bool {
    self.family() == Family::Relational
  }

  pub fn is_logical(self) -> bool {
    self.family() == Family::Logical
  }

  pub fn is_qualifier(self) -> bool {
    matches!(self.family(), Family::Qualifier | Family::Constructor)
  }

  pub fn is_csymbol(self) -> bool {
    matches!(self, Kind::NameTime | Kind::NameAvogadro | Kind::FunctionDelay)
  }

  /// Sum and difference kinds, which need brackets as the right-hand
  /// operand of another additive operator.
  pub fn is_additive(self) -> bool {
    matches!(self, Kind::Plus | Kind::Minus | Kind::Sum)
  }

  pub fn is_multiplicative(self) -> bool {
    matches!(self, Kind::Times | Kind::Product)
  }

  pub fn is_power(self) -> bool {
    matches!(self, Kind::Power | Kind::FunctionPower)
  }

  /// The trigonometric and hyperbolic functions and their inverses.
  pub fn is_trigonometric(self) -> bool {
    use Kind::*;
    matches!(
      self,
      FunctionSin | FunctionCos | FunctionTan | FunctionSec | FunctionCsc | FunctionCot |
      FunctionSinh | FunctionCosh | FunctionTanh | FunctionSech | FunctionCsch | FunctionCoth |
      FunctionArcsin | FunctionArccos | FunctionArctan | FunctionArcsec | FunctionArccsc | FunctionArccot |
      FunctionArcsinh | FunctionArccosh | FunctionArctanh | FunctionArcsech | FunctionArccsch | FunctionArccoth
    )
  }

  /// The definition URL a csymbol of this kind carries by default.
  pub fn definition_url(self) -> Option<&'static str> {
    match self {
      Kind::NameTime => Some(URI_TIME_DEFINITION),
      Kind::FunctionDelay => Some(URI_DELAY_DEFINITION),
      Kind::NameAvogadro => Some(URI_AVOGADRO_DEFINITION),
      _ => None,
    }
  }
}

impl Arity {
  pub const NULLARY: Arity = Arity { min: 0, max: Some(0) };
  pub const UNARY: Arity = Arity { min: 1, max: Some(1) };
  pub const BINARY: Arity = Arity { min: 2, max: Some(2) };

  pub const fn at_least(min: usize) -> Arity {
    Arity { min, max: None }
  }

  pub const fn between(min: usize, max: usize) -> Arity {
    Arity { min, max: Some(max) }
  }

  pub fn min(self) -> usize {
    self.min
  }

  pub fn max(self) -> Option<usize> {
    self.max
  }

  pub fn admits(self, count: usize) -> bool {
    count >= self.min && self.max.map_or(true, |max| count <= max)
  }

  pub fn exceeded_by(self, count: usize) -> bool {
    self.max.map_or(false, |max| count > max)
  }

  /// Bounded kinds have a fixed maximum and require at least one
  /// child.
  pub fn is_bounded(self) -> bool {
    self.max.is_some() && self.min > 0
  }
}

impl Display for Kind {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.type_name())
  }
}

impl Display for Family {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    fmt::Debug::fmt(self, f)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_kind_count() {
    assert_eq!(Kind::ALL.len(), 79);
  }

  #[test]
  fn test_from_name_round_trip() {
    for kind in Kind::ALL {
      if let Some(found) = Kind::from_name(kind.name()) {
        if *kind != Kind::Power {
          assert_eq!(found, *kind);
        }
      }
    }
    assert_eq!(Kind::from_name("cos"), Some(Kind::FunctionCos));
    assert_eq!(Kind::from_name("Cos"), None);
    assert_eq!(Kind::from_name("exponentiale"), Some(Kind::ConstantE));
  }

  #[test]
  fn test_names() {
    assert_eq!(Kind::FunctionArccoth.name(), "arccoth");
    assert_eq!(Kind::Power.name(), "power");
    assert_eq!(Kind::FunctionPower.name(), "power");
    assert_eq!(Kind::RealE.name(), "e-notation");
    assert_eq!(Kind::FunctionLn.type_name(), "FUNCTION_LN");
    assert_eq!(Kind::RelationalGeq.to_string(), "RELATIONAL_GEQ");
  }

  #[test]
  fn test_arity() {
    assert_eq!(Kind::Integer.arity(), Arity::NULLARY);
    assert_eq!(Kind::FunctionCos.arity(), Arity::UNARY);
    assert_eq!(Kind::Divide.arity(), Arity::BINARY);
    assert_eq!(Kind::FunctionLog.arity(), Arity::between(1, 2));
    assert!(Kind::Plus.arity().admits(0));
    assert!(Kind::Plus.arity().admits(100));
    assert!(!Kind::Minus.arity().admits(0));
    assert!(Kind::FunctionRoot.arity().is_bounded());
    assert!(!Kind::Integer.arity().is_bounded());
    assert!(Kind::LogicalNot.arity().exceeded_by(2));
    assert!(!Kind::LogicalAnd.arity().exceeded_by(2));
  }

  #[test]
  fn test_accepts_child() {
    assert!(Kind::Lambda.accepts_child(Kind::QualifierBvar));
    assert!(!Kind::Plus.accepts_child(Kind::QualifierBvar));
    assert!(Kind::QualifierBvar.accepts_child(Kind::Name));
    assert!(Kind::QualifierBvar.accepts_child(Kind::Integer));
    assert!(Kind::QualifierBvar.accepts_child(Kind::RealE));
    assert!(!Kind::QualifierBvar.accepts_child(Kind::Plus));
    assert!(!Kind::QualifierBvar.accepts_child(Kind::NameTime));
    assert!(Kind::FunctionPiecewise.accepts_child(Kind::ConstructorPiece));
    assert!(!Kind::Times.accepts_child(Kind::ConstructorOtherwise));
    assert!(Kind::FunctionLog.accepts_child(Kind::QualifierLogbase));
    assert!(!Kind::FunctionLog.accepts_child(Kind::QualifierDegree));
  }

  #[test]
  fn test_families() {
    assert_eq!(Kind::FunctionDelay.family(), Family::BinaryFunction);
    assert_eq!(Kind::NameTime.family(), Family::Reference);
    assert!(Kind::FunctionArcsech.is_trigonometric());
    assert!(!Kind::FunctionExp.is_trigonometric());
    assert_eq!(Kind::NameAvogadro.definition_url(), Some(URI_AVOGADRO_DEFINITION));
  }
}

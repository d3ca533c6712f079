
//! Rendering of expression trees as infix formula text.
//!
//! Operands are bracketed only where re-parsing the output would
//! otherwise build a different tree. Each compiled operand is ranked by
//! how tightly its rendered text binds, and a parent brackets any
//! operand that binds more loosely than its own position allows.

use super::{compile, output_sep_by, Backend, BackendValue, CompileError};
use crate::ast::{Kind, Node};

use serde::{Serialize, Deserialize};

/// How logical and relational operators (and a few functions) are
/// written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InfixDialect {
  /// C-like operators: `a && b`, `a == b`, `x^y`.
  #[default]
  Formula,
  /// Function-call forms: `and(a, b)`, `eq(a, b)`, `pow(x, y)`.
  LibSbml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InfixSettings {
  pub dialect: InfixDialect,
  /// Whether numeric literals are followed by their unit id.
  pub print_units: bool,
}

#[derive(Debug, Clone, Default)]
pub struct InfixBackend {
  settings: InfixSettings,
}

type Value = BackendValue<String>;

// Binding strength of rendered text, loosest first.
const LOGICAL: u8 = 1;
const NOT: u8 = 2;
const RELATIONAL: u8 = 3;
const ADDITIVE: u8 = 4;
const MULTIPLICATIVE: u8 = 5;
const UNARY: u8 = 6;
const POWER: u8 = 7;
const POSTFIX: u8 = 8;
const ATOM: u8 = 9;

pub fn to_formula(node: &Node, settings: &InfixSettings) -> Result<String, CompileError> {
  let backend = InfixBackend::new(*settings);
  compile(node, &backend).map(BackendValue::into_value)
}

fn brackets(text: &str) -> String {
  format!("({text})")
}

fn format_real(x: f64) -> String {
  if x.is_nan() {
    String::from("NaN")
  } else if x.is_infinite() {
    String::from(if x > 0.0 { "INF" } else { "-INF" })
  } else {
    // Plain decimal, so the lexer reads the text back as a real and not
    // an e-notation literal.
    let text = x.to_string();
    if text.contains('.') { text } else { format!("{text}.0") }
  }
}

impl InfixBackend {
  pub fn new(settings: InfixSettings) -> Self {
    Self { settings }
  }

  pub fn settings(&self) -> &InfixSettings {
    &self.settings
  }

  fn is_formula(&self) -> bool {
    self.settings.dialect == InfixDialect::Formula
  }

  /// How tightly the rendered text of `value` binds.
  fn level(&self, value: &Value) -> u8 {
    if value.is_negative_number() || value.is_unary_minus() {
      return UNARY;
    }
    let formula = self.is_formula();
    match value.kind() {
      Kind::Plus | Kind::Sum | Kind::Minus => ADDITIVE,
      Kind::Times | Kind::Product | Kind::Divide => MULTIPLICATIVE,
      Kind::Power | Kind::FunctionPower | Kind::FunctionRoot if formula => POWER,
      Kind::FunctionFactorial if formula => POSTFIX,
      Kind::LogicalNot if formula => NOT,
      Kind::LogicalAnd | Kind::LogicalOr | Kind::LogicalXor if formula && value.meta.child_count >= 2 => LOGICAL,
      kind if kind.is_relational() && formula => RELATIONAL,
      _ => ATOM,
    }
  }

  fn bracket_if(&self, value: &Value, cond: bool) -> String {
    if cond {
      brackets(&value.value)
    } else {
      value.value.clone()
    }
  }

  fn with_units(&self, text: String, units: Option<&str>) -> String {
    match units {
      Some(units) if self.settings.print_units => format!("{text} {units}"),
      _ => text,
    }
  }

  fn function(&self, name: &str, arguments: &[Value]) -> String {
    let mut out = format!("{name}(");
    output_sep_by(&mut out, arguments, ", ", |out, arg| out.push_str(&arg.value));
    out.push(')');
    out
  }

  fn function_of(&self, name: &str, argument: &Value) -> String {
    self.function(name, std::slice::from_ref(argument))
  }

  /// `+` and `-` chains. The first operand only needs brackets when it
  /// is looser than a sum; later operands are bracketed when they are
  /// sums, differences or negative.
  fn additive(&self, operands: &[Value], operator: &str) -> String {
    let mut out = String::new();
    for (i, operand) in operands.iter().enumerate() {
      let level = self.level(operand);
      if i == 0 {
        out.push_str(&self.bracket_if(operand, level < ADDITIVE));
      } else {
        out.push_str(operator);
        out.push_str(&self.bracket_if(operand, level <= ADDITIVE || level == UNARY));
      }
    }
    out
  }

  fn unary_function_name(&self, kind: Kind) -> &'static str {
    match kind {
      Kind::FunctionCeiling => "ceil",
      Kind::FunctionArcsin if !self.is_formula() => "asin",
      Kind::FunctionArccos if !self.is_formula() => "acos",
      Kind::FunctionArctan if !self.is_formula() => "atan",
      kind => kind.name(),
    }
  }

  fn relational_operator(kind: Kind) -> &'static str {
    match kind {
      Kind::RelationalEq => " == ",
      Kind::RelationalNeq => " != ",
      Kind::RelationalGeq => " >= ",
      Kind::RelationalGt => " > ",
      Kind::RelationalLeq => " <= ",
      _ => " < ",
    }
  }
}

impl Backend for InfixBackend {
  type Value = String;
  type Error = CompileError;

  fn integer(&self, value: i64, units: Option<&str>) -> Result<String, CompileError> {
    Ok(self.with_units(value.to_string(), units))
  }

  fn real(&self, value: f64, units: Option<&str>) -> Result<String, CompileError> {
    Ok(self.with_units(format_real(value), units))
  }

  fn real_e(&self, mantissa: f64, exponent: i64, units: Option<&str>) -> Result<String, CompileError> {
    Ok(self.with_units(format!("{}E{exponent}", format_real(mantissa)), units))
  }

  fn rational(&self, numerator: i64, denominator: i64, units: Option<&str>) -> Result<String, CompileError> {
    Ok(self.with_units(format!("({numerator}/{denominator})"), units))
  }

  fn identifier(&self, name: &str) -> Result<String, CompileError> {
    Ok(name.to_owned())
  }

  fn symbol_time(&self, name: Option<&str>) -> Result<String, CompileError> {
    Ok(name.unwrap_or("time").to_owned())
  }

  fn symbol_avogadro(&self, name: Option<&str>) -> Result<String, CompileError> {
    Ok(name.unwrap_or("avogadro").to_owned())
  }

  fn constant(&self, kind: Kind) -> Result<String, CompileError> {
    Ok(kind.name().to_owned())
  }

  fn plus(&self, operands: &[Value]) -> Result<String, CompileError> {
    Ok(self.additive(operands, "+"))
  }

  fn minus(&self, operands: &[Value]) -> Result<String, CompileError> {
    Ok(self.additive(operands, "-"))
  }

  fn unary_minus(&self, operand: &Value) -> Result<String, CompileError> {
    let level = self.level(operand);
    // `-3` reads back as a negative literal, `-(3)` as a negation.
    let literal = operand.kind().is_number();
    Ok(format!("-{}", self.bracket_if(operand, level < POWER || level == UNARY || literal)))
  }

  fn times(&self, operands: &[Value]) -> Result<String, CompileError> {
    let mut out = String::new();
    for (i, operand) in operands.iter().enumerate() {
      if i > 0 {
        out.push('*');
      }
      let level = self.level(operand);
      let bracket = level < MULTIPLICATIVE || level == UNARY || (i > 0 && operand.kind() == Kind::Divide);
      out.push_str(&self.bracket_if(operand, bracket));
    }
    Ok(out)
  }

  fn divide(&self, numerator: &Value, denominator: &Value) -> Result<String, CompileError> {
    let num_level = self.level(numerator);
    let den_level = self.level(denominator);
    Ok(format!(
      "{}/{}",
      self.bracket_if(numerator, num_level < MULTIPLICATIVE || num_level == UNARY),
      self.bracket_if(denominator, den_level <= MULTIPLICATIVE || den_level == UNARY),
    ))
  }

  fn power(&self, base: &Value, exponent: &Value) -> Result<String, CompileError> {
    if !self.is_formula() {
      return Ok(self.function("pow", &[base.clone(), exponent.clone()]));
    }
    match exponent.meta.number {
      Some(x) if x == 0.0 => return Ok(String::from("1")),
      Some(x) if x == 1.0 => return Ok(self.bracket_if(base, self.level(base) < ATOM)),
      _ => {}
    }
    Ok(format!(
      "{}^{}",
      self.bracket_if(base, self.level(base) < ATOM),
      self.bracket_if(exponent, self.level(exponent) < ATOM),
    ))
  }

  fn root(&self, degree: Option<&Value>, radicand: &Value) -> Result<String, CompileError> {
    match (degree, self.settings.dialect) {
      (None, InfixDialect::Formula) => Ok(format!("({})^(0.5)", radicand.value)),
      (Some(degree), InfixDialect::Formula) => Ok(format!("({})^(1/({}))", radicand.value, degree.value)),
      (None, InfixDialect::LibSbml) => Ok(self.function_of("sqrt", radicand)),
      (Some(degree), InfixDialect::LibSbml) => Ok(self.function("root", &[degree.clone(), radicand.clone()])),
    }
  }

  fn log(&self, base: Option<&Value>, value: &Value) -> Result<String, CompileError> {
    match base {
      None => Ok(self.function_of("log10", value)),
      Some(base) if !self.is_formula() && base.meta.number == Some(10.0) => Ok(self.function_of("log10", value)),
      Some(base) => Ok(self.function("log", &[base.clone(), value.clone()])),
    }
  }

  fn ln(&self, value: &Value) -> Result<String, CompileError> {
    Ok(self.function_of("log", value))
  }

  fn unary_function(&self, kind: Kind, argument: &Value) -> Result<String, CompileError> {
    if kind == Kind::FunctionFactorial && self.is_formula() {
      let atomic = self.level(argument) == ATOM;
      return Ok(format!("{}!", self.bracket_if(argument, !atomic)));
    }
    Ok(self.function_of(self.unary_function_name(kind), argument))
  }

  fn binary_function(&self, kind: Kind, left: &Value, right: &Value) -> Result<String, CompileError> {
    Ok(self.function(kind.name(), &[left.clone(), right.clone()]))
  }

  fn nary_function(&self, kind: Kind, arguments: &[Value]) -> Result<String, CompileError> {
    Ok(self.function(kind.name(), arguments))
  }

  fn delay(&self, _name: Option<&str>, value: &Value, delay: &Value) -> Result<String, CompileError> {
    Ok(self.function("delay", &[value.clone(), delay.clone()]))
  }

  fn relational(&self, kind: Kind, operands: &[Value]) -> Result<String, CompileError> {
    if !self.is_formula() {
      return Ok(self.function(kind.name(), operands));
    }
    let mut out = String::new();
    output_sep_by(&mut out, operands, Self::relational_operator(kind), |out, operand| {
      out.push_str(&self.bracket_if(operand, self.level(operand) <= RELATIONAL));
    });
    Ok(out)
  }

  fn logical(&self, kind: Kind, operands: &[Value]) -> Result<String, CompileError> {
    let operator = match kind {
      Kind::LogicalAnd => " && ",
      Kind::LogicalOr => " || ",
      Kind::LogicalXor => " xor ",
      _ => return Ok(self.function(kind.name(), operands)),
    };
    if !self.is_formula() || operands.len() < 2 {
      return Ok(self.function(kind.name(), operands));
    }
    let mut out = String::new();
    output_sep_by(&mut out, operands, operator, |out, operand| {
      out.push_str(&self.bracket_if(operand, !operand.is_atomic()));
    });
    Ok(out)
  }

  fn not(&self, operand: &Value) -> Result<String, CompileError> {
    if !self.is_formula() {
      return Ok(self.function_of("not", operand));
    }
    let atomic = self.level(operand) == ATOM && operand.is_atomic();
    Ok(format!("!{}", self.bracket_if(operand, !atomic)))
  }

  fn piecewise(&self, pieces: &[(Value, Value)], otherwise: Option<&Value>) -> Result<String, CompileError> {
    let mut arguments: Vec<Value> = pieces.iter()
      .flat_map(|(value, condition)| [value.clone(), condition.clone()])
      .collect();
    arguments.extend(otherwise.cloned());
    Ok(self.function("piecewise", &arguments))
  }

  fn lambda(&self, parameters: &[Value], body: &Value) -> Result<String, CompileError> {
    let mut arguments = parameters.to_vec();
    arguments.push(body.clone());
    Ok(self.function("lambda", &arguments))
  }

  fn function_call(&self, name: &str, arguments: &[Value]) -> Result<String, CompileError> {
    Ok(self.function(name, arguments))
  }

  fn vector(&self, elements: &[Value]) -> Result<String, CompileError> {
    let mut out = String::from("{");
    output_sep_by(&mut out, elements, ", ", |out, elem| out.push_str(&elem.value));
    out.push('}');
    Ok(out)
  }

  fn selector(&self, operands: &[Value]) -> Result<String, CompileError> {
    let mut out = String::new();
    for (i, operand) in operands.iter().enumerate() {
      if i == 0 {
        out.push_str(&self.bracket_if(operand, self.level(operand) < ATOM));
      } else {
        out.push('[');
        out.push_str(&operand.value);
        out.push(']');
      }
    }
    Ok(out)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ast::builder::*;

  fn legacy(node: &Node) -> String {
    let settings = InfixSettings { dialect: InfixDialect::LibSbml, print_units: false };
    to_formula(node, &settings).unwrap()
  }

  #[test]
  fn test_divide() {
    assert_eq!(divide_by(1, 1).to_formula().unwrap(), "1/1");
    assert_eq!(divide_by(name("a"), times(name("b"), name("c"))).to_formula().unwrap(), "a/(b*c)");
    assert_eq!(divide_by(plus(name("a"), 1), name("b")).to_formula().unwrap(), "(a+1)/b");
  }

  #[test]
  fn test_logarithms() {
    assert_eq!(log(1).to_formula().unwrap(), "log10(1)");
    assert_eq!(ln(1).to_formula().unwrap(), "log(1)");
    assert_eq!(log_base(2, name("x")).to_formula().unwrap(), "log(2, x)");
    assert_eq!(legacy(&log_base(10, name("x"))), "log10(x)");
  }

  #[test]
  fn test_additive_brackets() {
    assert_eq!(minus(name("a"), plus(name("b"), name("c"))).to_formula().unwrap(), "a-(b+c)");
    assert_eq!(plus(plus(name("a"), name("b")), name("c")).to_formula().unwrap(), "a+b+c");
    assert_eq!(plus(name("a"), -5).to_formula().unwrap(), "a+(-5)");
    assert_eq!(plus(name("a"), unary_minus(name("b"))).to_formula().unwrap(), "a+(-b)");
  }

  #[test]
  fn test_multiplicative_brackets() {
    assert_eq!(times(plus(name("a"), 1), name("b")).to_formula().unwrap(), "(a+1)*b");
    assert_eq!(times(name("a"), divide_by(name("b"), name("c"))).to_formula().unwrap(), "a*(b/c)");
    assert_eq!(times(2, unary_minus(name("x"))).to_formula().unwrap(), "2*(-x)");
  }

  #[test]
  fn test_unary_minus() {
    assert_eq!(unary_minus(name("x")).to_formula().unwrap(), "-x");
    assert_eq!(unary_minus(times(name("a"), name("b"))).to_formula().unwrap(), "-(a*b)");
    assert_eq!(unary_minus(pow(name("a"), 2)).to_formula().unwrap(), "-a^2");
    assert_eq!(unary_minus(3).to_formula().unwrap(), "-(3)");
    assert_eq!(unary_minus(-3).to_formula().unwrap(), "-(-3)");
    assert_eq!(times(2, unary_minus(3)).to_formula().unwrap(), "2*(-(3))");
  }

  #[test]
  fn test_power() {
    assert_eq!(pow(name("x"), 0).to_formula().unwrap(), "1");
    assert_eq!(pow(name("x"), 1).to_formula().unwrap(), "x");
    assert_eq!(pow(plus(name("a"), name("b")), 2).to_formula().unwrap(), "(a+b)^2");
    assert_eq!(pow(2, pow(3, 4)).to_formula().unwrap(), "2^(3^4)");
    assert_eq!(pow(name("x"), -1).to_formula().unwrap(), "x^(-1)");
    assert_eq!(legacy(&pow(name("x"), 2)), "pow(x, 2)");
  }

  #[test]
  fn test_roots() {
    assert_eq!(sqrt(name("x")).to_formula().unwrap(), "(x)^(0.5)");
    assert_eq!(root(3, name("x")).to_formula().unwrap(), "(x)^(1/(3))");
    assert_eq!(legacy(&sqrt(name("x"))), "sqrt(x)");
    assert_eq!(legacy(&root(3, name("x"))), "root(3, x)");
  }

  #[test]
  fn test_factorial() {
    let node = unary_function(Kind::FunctionFactorial, name("n"));
    assert_eq!(node.to_formula().unwrap(), "n!");
    let node = unary_function(Kind::FunctionFactorial, plus(name("n"), 1));
    assert_eq!(node.to_formula().unwrap(), "(n+1)!");
    assert_eq!(legacy(&node), "factorial(n+1)");
  }

  #[test]
  fn test_relational_and_logical() {
    assert_eq!(lt(name("a"), name("b")).to_formula().unwrap(), "a < b");
    assert_eq!(neq(plus(name("a"), 1), 2).to_formula().unwrap(), "a+1 != 2");
    let node = and([lt(name("a"), name("b")), name("c")]);
    assert_eq!(node.to_formula().unwrap(), "(a < b) && c");
    assert_eq!(legacy(&node), "and(lt(a, b), c)");
    assert_eq!(xor([name("a"), name("b")]).to_formula().unwrap(), "a xor b");
    assert_eq!(or([name("a")]).to_formula().unwrap(), "or(a)");
  }

  #[test]
  fn test_not() {
    assert_eq!(not(name("a")).to_formula().unwrap(), "!a");
    assert_eq!(not(lt(name("a"), name("b"))).to_formula().unwrap(), "!(a < b)");
    assert_eq!(legacy(&not(name("a"))), "not(a)");
    assert_eq!(plus(not(name("a")), 1).to_formula().unwrap(), "(!a)+1");
  }

  #[test]
  fn test_function_names() {
    assert_eq!(unary_function(Kind::FunctionCeiling, name("x")).to_formula().unwrap(), "ceil(x)");
    assert_eq!(unary_function(Kind::FunctionArcsin, name("x")).to_formula().unwrap(), "arcsin(x)");
    assert_eq!(legacy(&unary_function(Kind::FunctionArcsin, name("x"))), "asin(x)");
    assert_eq!(function_call("f", [name("x"), integer(2)]).to_formula().unwrap(), "f(x, 2)");
    assert_eq!(delay(name("x"), 3).to_formula().unwrap(), "delay(x, 3)");
  }

  #[test]
  fn test_literals() {
    assert_eq!(real(1.5).to_formula().unwrap(), "1.5");
    assert_eq!(real(2.0).to_formula().unwrap(), "2.0");
    assert_eq!(real(f64::INFINITY).to_formula().unwrap(), "INF");
    assert_eq!(real(f64::NEG_INFINITY).to_formula().unwrap(), "-INF");
    assert_eq!(real(f64::NAN).to_formula().unwrap(), "NaN");
    assert_eq!(real_e(1.5, -2).to_formula().unwrap(), "1.5E-2");
    assert_eq!(real_e(1.5, 0).to_formula().unwrap(), "1.5E0");
    assert_eq!(real(1e20).to_formula().unwrap(), "100000000000000000000.0");
    assert_eq!(real(1e-7).to_formula().unwrap(), "0.0000001");
    assert_eq!(real(-2.5).to_formula().unwrap(), "-2.5");
    assert_eq!(real_e(1e30, 2).to_formula().unwrap(), "1000000000000000000000000000000.0E2");
    assert_eq!(rational(1, 2).to_formula().unwrap(), "(1/2)");
    assert_eq!(constant(Kind::ConstantPi).to_formula().unwrap(), "pi");
    assert_eq!(constant(Kind::ConstantE).to_formula().unwrap(), "exponentiale");
  }

  #[test]
  fn test_units() {
    let node = with_units(integer(5), "mole");
    assert_eq!(node.to_formula().unwrap(), "5");
    let settings = InfixSettings { dialect: InfixDialect::Formula, print_units: true };
    assert_eq!(to_formula(&node, &settings).unwrap(), "5 mole");
  }

  #[test]
  fn test_structures() {
    let node = piecewise([integer(1), gt(name("x"), 0), integer(2)]);
    assert_eq!(node.to_formula().unwrap(), "piecewise(1, x > 0, 2)");
    let node = lambda(["x", "y"], plus(name("x"), name("y")));
    assert_eq!(node.to_formula().unwrap(), "lambda(x, y, x+y)");
    let node = vector([integer(1), integer(2)]);
    assert_eq!(node.to_formula().unwrap(), "{1, 2}");
    assert_eq!(selector(name("v"), 1).to_formula().unwrap(), "v[1]");
  }

  #[test]
  fn test_settings_from_json() {
    let settings: InfixSettings = serde_json::from_str(r#"{"dialect":"LibSbml","print_units":true}"#).unwrap();
    assert_eq!(settings, InfixSettings { dialect: InfixDialect::LibSbml, print_units: true });
  }
}

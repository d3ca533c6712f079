
//! Rendering of expression trees as LaTeX math.

use super::{compile, output_sep_by, Backend, BackendValue, CompileError};
use crate::ast::{Kind, Node};
use crate::units::QuantityLookup;

use serde::{Serialize, Deserialize};

const LEFT: &str = "\\left(";
const RIGHT: &str = "\\right)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatexSettings {
  /// Print the human-readable name of a quantity, when the lookup
  /// knows one, instead of its id.
  pub print_names: bool,
  /// Magnitudes at or above this are written in scientific notation.
  pub scientific_upper: f64,
  /// Nonzero magnitudes below this are written in scientific notation.
  pub scientific_lower: f64,
}

pub struct LatexBackend<'a> {
  settings: LatexSettings,
  lookup: Option<&'a dyn QuantityLookup>,
}

type Value = BackendValue<String>;

pub fn to_latex(node: &Node, settings: &LatexSettings) -> Result<String, CompileError> {
  let backend = LatexBackend::new(settings.clone());
  compile(node, &backend).map(BackendValue::into_value)
}

/// As [`to_latex`], resolving display names through `lookup`.
pub fn to_latex_with(
  node: &Node,
  settings: &LatexSettings,
  lookup: &dyn QuantityLookup,
) -> Result<String, CompileError> {
  let backend = LatexBackend::new(settings.clone()).with_lookup(lookup);
  compile(node, &backend).map(BackendValue::into_value)
}

/// Escapes the characters LaTeX treats specially. With `hyphen`, a
/// discretionary hyphen is placed before every escaped character
/// except a leading one, so long ids can break across lines.
pub fn mask_special_chars(text: &str, hyphen: bool) -> String {
  let mut masked = String::with_capacity(text.len());
  let mut prev = None;
  for (i, ch) in text.chars().enumerate() {
    match ch {
      '<' => masked.push_str("$<$"),
      '>' => masked.push_str("$>$"),
      '_' | '\\' | '$' | '&' | '#' | '{' | '}' | '~' | '%' | '^' => {
        if i == 0 || !hyphen {
          masked.push('\\');
        } else if prev != Some('\\') {
          masked.push_str("\\-\\");
        }
        masked.push(ch);
      }
      _ => masked.push(ch),
    }
    prev = Some(ch);
  }
  masked.trim().to_owned()
}

fn brackets(text: &str) -> String {
  format!("{LEFT}{text}{RIGHT}")
}

fn command(name: &str, argument: &str) -> String {
  format!("\\{name}{{{argument}}}")
}

fn mathrm(text: &str) -> String {
  command("mathrm", text)
}

fn mathtt(text: &str) -> String {
  command("mathtt", text)
}

/// Rounds away the noise left by dividing out a power of ten.
fn clean_mantissa(x: f64) -> f64 {
  (x * 1e12).round() / 1e12
}

/// Whether a compiled operand needs brackets after `+`, `-` or
/// `\cdot`.
fn needs_brackets(value: &Value) -> bool {
  value.is_sum_or_difference() || value.is_unary_minus() || value.is_negative_number()
}

impl Default for LatexSettings {
  fn default() -> Self {
    LatexSettings {
      print_names: false,
      scientific_upper: 1e7,
      scientific_lower: 1e-3,
    }
  }
}

impl<'a> LatexBackend<'a> {
  pub fn new(settings: LatexSettings) -> Self {
    Self { settings, lookup: None }
  }

  pub fn with_lookup(mut self, lookup: &'a dyn QuantityLookup) -> Self {
    self.lookup = Some(lookup);
    self
  }

  /// Formats a number, switching to scientific notation outside the
  /// configured range.
  pub fn format_number(&self, x: f64) -> String {
    if x.is_nan() {
      return mathrm("NaN");
    }
    if x.is_infinite() {
      return String::from(if x > 0.0 { "\\infty" } else { "-\\infty" });
    }
    let magnitude = x.abs();
    if x != 0.0 && (magnitude >= self.settings.scientific_upper || magnitude < self.settings.scientific_lower) {
      let exponent = magnitude.log10().floor() as i32;
      let mantissa = clean_mantissa(x / 10f64.powi(exponent));
      let power = format!("10^{{{exponent}}}");
      return if mantissa == 1.0 {
        power
      } else if mantissa == -1.0 {
        format!("-{power}")
      } else {
        format!("{mantissa}\\cdot {power}")
      };
    }
    format!("{x}")
  }

  fn name_or_id(&self, id: &str) -> String {
    let display_name = self.lookup
      .filter(|_| self.settings.print_names)
      .and_then(|lookup| lookup.display_name(id));
    match display_name {
      Some(name) => mathrm(&mask_special_chars(&name, true)),
      None => mathtt(&mask_special_chars(id, true)),
    }
  }

  fn bracket_if(&self, value: &Value, cond: bool) -> String {
    if cond {
      brackets(&value.value)
    } else {
      value.value.clone()
    }
  }

  fn argument_list(&self, arguments: &[Value]) -> String {
    let mut out = String::new();
    output_sep_by(&mut out, arguments, ", ", |out, arg| out.push_str(&arg.value));
    brackets(&out)
  }

  /// `\name{x}` for functions LaTeX has a command for, and
  /// `\mathrm{name}\left(x\right)` otherwise.
  fn named_function(&self, kind: Kind, argument: &Value) -> String {
    let command_name = match kind {
      Kind::FunctionSin | Kind::FunctionCos | Kind::FunctionTan |
      Kind::FunctionSec | Kind::FunctionCsc | Kind::FunctionCot |
      Kind::FunctionSinh | Kind::FunctionCosh | Kind::FunctionTanh | Kind::FunctionCoth |
      Kind::FunctionArcsin | Kind::FunctionArccos | Kind::FunctionArctan |
      Kind::FunctionExp => Some(kind.name()),
      _ => None,
    };
    match command_name {
      Some(name) => command(name, &self.bracket_if(argument, argument.meta.child_count > 1)),
      None => format!("{}{}", mathrm(kind.name()), brackets(&argument.value)),
    }
  }

  fn additive(&self, operands: &[Value], operator: char) -> String {
    let mut out = String::new();
    for (i, operand) in operands.iter().enumerate() {
      if i == 0 {
        out.push_str(&operand.value);
      } else {
        out.push(operator);
        out.push_str(&self.bracket_if(operand, needs_brackets(operand)));
      }
    }
    out
  }
}

impl<'a> Backend for LatexBackend<'a> {
  type Value = String;
  type Error = CompileError;

  fn integer(&self, value: i64, _units: Option<&str>) -> Result<String, CompileError> {
    Ok(value.to_string())
  }

  fn real(&self, value: f64, _units: Option<&str>) -> Result<String, CompileError> {
    Ok(self.format_number(value))
  }

  fn real_e(&self, mantissa: f64, exponent: i64, _units: Option<&str>) -> Result<String, CompileError> {
    Ok(format!("{}\\cdot 10^{{{exponent}}}", self.format_number(mantissa)))
  }

  fn rational(&self, numerator: i64, denominator: i64, _units: Option<&str>) -> Result<String, CompileError> {
    Ok(format!("\\frac{{{numerator}}}{{{denominator}}}"))
  }

  fn identifier(&self, name: &str) -> Result<String, CompileError> {
    Ok(self.name_or_id(name))
  }

  fn symbol_time(&self, name: Option<&str>) -> Result<String, CompileError> {
    Ok(mathrm(&mask_special_chars(name.unwrap_or("time"), true)))
  }

  fn symbol_avogadro(&self, name: Option<&str>) -> Result<String, CompileError> {
    Ok(mask_special_chars(name.unwrap_or("avogadro"), true))
  }

  fn constant(&self, kind: Kind) -> Result<String, CompileError> {
    Ok(match kind {
      Kind::ConstantPi => String::from("\\pi"),
      Kind::ConstantE => mathrm("e"),
      Kind::ConstantTrue => mathrm("true"),
      _ => mathrm("false"),
    })
  }

  fn plus(&self, operands: &[Value]) -> Result<String, CompileError> {
    Ok(self.additive(operands, '+'))
  }

  fn minus(&self, operands: &[Value]) -> Result<String, CompileError> {
    Ok(self.additive(operands, '-'))
  }

  fn unary_minus(&self, operand: &Value) -> Result<String, CompileError> {
    Ok(format!("-{}", self.bracket_if(operand, needs_brackets(operand))))
  }

  fn times(&self, operands: &[Value]) -> Result<String, CompileError> {
    let mut out = String::new();
    output_sep_by(&mut out, operands, "\\cdot ", |out, operand| {
      out.push_str(&self.bracket_if(operand, needs_brackets(operand)));
    });
    Ok(out)
  }

  fn divide(&self, numerator: &Value, denominator: &Value) -> Result<String, CompileError> {
    Ok(format!("\\frac{{{}}}{{{}}}", numerator.value, denominator.value))
  }

  fn power(&self, base: &Value, exponent: &Value) -> Result<String, CompileError> {
    if exponent.meta.number == Some(1.0) {
      return Ok(base.value.clone());
    }
    let bracket = base.meta.child_count > 1 || base.is_unary_minus() || base.is_negative_number();
    Ok(format!("{}^{{{}}}", self.bracket_if(base, bracket), exponent.value))
  }

  fn root(&self, degree: Option<&Value>, radicand: &Value) -> Result<String, CompileError> {
    match degree {
      Some(degree) if degree.meta.number != Some(2.0) => {
        Ok(format!("\\sqrt[{}]{{{}}}", degree.value, radicand.value))
      }
      _ => Ok(command("sqrt", &radicand.value)),
    }
  }

  fn log(&self, base: Option<&Value>, value: &Value) -> Result<String, CompileError> {
    let mut out = String::from("\\log");
    if let Some(base) = base {
      out.push_str(&format!("_{{{}}}", base.value));
    }
    out.push_str(&format!("{{{}}}", self.bracket_if(value, value.meta.child_count > 1)));
    Ok(out)
  }

  fn ln(&self, value: &Value) -> Result<String, CompileError> {
    Ok(command("ln", &self.bracket_if(value, value.meta.child_count > 1)))
  }

  fn unary_function(&self, kind: Kind, argument: &Value) -> Result<String, CompileError> {
    Ok(match kind {
      Kind::FunctionAbs => format!("\\left\\lvert {}\\right\\rvert ", argument.value),
      Kind::FunctionFloor => format!("\\left\\lfloor {}\\right\\rfloor ", argument.value),
      Kind::FunctionCeiling => format!("\\left\\lceil {}\\right\\rceil ", argument.value),
      Kind::FunctionFactorial => format!("{}!", self.bracket_if(argument, !argument.is_atomic())),
      kind => self.named_function(kind, argument),
    })
  }

  fn binary_function(&self, kind: Kind, left: &Value, right: &Value) -> Result<String, CompileError> {
    Ok(format!("{}{}", mathrm(kind.name()), self.argument_list(&[left.clone(), right.clone()])))
  }

  fn nary_function(&self, kind: Kind, arguments: &[Value]) -> Result<String, CompileError> {
    Ok(format!("\\{}{}", kind.name(), self.argument_list(arguments)))
  }

  fn delay(&self, name: Option<&str>, value: &Value, delay: &Value) -> Result<String, CompileError> {
    let name = mask_special_chars(name.unwrap_or("delay"), true);
    Ok(format!("{}{}", mathrm(&name), self.argument_list(&[value.clone(), delay.clone()])))
  }

  fn relational(&self, kind: Kind, operands: &[Value]) -> Result<String, CompileError> {
    let symbol = match kind {
      Kind::RelationalEq => " = ",
      Kind::RelationalNeq => " \\neq ",
      Kind::RelationalGeq => " \\geq ",
      Kind::RelationalGt => " > ",
      Kind::RelationalLeq => " \\leq ",
      _ => " < ",
    };
    let mut out = String::new();
    output_sep_by(&mut out, operands, symbol, |out, operand| {
      out.push_str(&self.bracket_if(operand, operand.kind().is_relational()));
    });
    Ok(out)
  }

  fn logical(&self, kind: Kind, operands: &[Value]) -> Result<String, CompileError> {
    let symbol = match kind {
      Kind::LogicalAnd => "\\wedge ",
      Kind::LogicalOr => "\\lor ",
      Kind::LogicalXor => "\\oplus ",
      _ => "\\Rightarrow ",
    };
    let mut out = String::new();
    output_sep_by(&mut out, operands, symbol, |out, operand| {
      out.push_str(&self.bracket_if(operand, !operand.is_atomic()));
    });
    Ok(out)
  }

  fn not(&self, operand: &Value) -> Result<String, CompileError> {
    Ok(format!("\\neg {}", self.bracket_if(operand, !operand.is_atomic())))
  }

  fn piecewise(&self, pieces: &[(Value, Value)], otherwise: Option<&Value>) -> Result<String, CompileError> {
    let mut lines: Vec<String> = pieces.iter()
      .map(|(value, condition)| format!("{} & \\text{{if\\ }} {}", value.value, condition.value))
      .collect();
    if let Some(otherwise) = otherwise {
      lines.push(format!("{} & \\text{{otherwise}}", otherwise.value));
    }
    let mut out = String::from("\\begin{dcases}\n");
    output_sep_by(&mut out, &lines, "\\\\\n", |out, line| out.push_str(line));
    out.push_str("\n\\end{dcases}");
    Ok(out)
  }

  fn lambda(&self, parameters: &[Value], body: &Value) -> Result<String, CompileError> {
    Ok(format!("\\lambda{} = {}", self.argument_list(parameters), body.value))
  }

  fn function_call(&self, name: &str, arguments: &[Value]) -> Result<String, CompileError> {
    let mut out = self.name_or_id(name);
    if !arguments.is_empty() {
      out.push_str(&self.argument_list(arguments));
    }
    Ok(out)
  }

  fn vector(&self, elements: &[Value]) -> Result<String, CompileError> {
    let mut out = String::from("\\left\\{");
    output_sep_by(&mut out, elements, ", ", |out, elem| out.push_str(&elem.value));
    out.push_str("\\right\\}");
    Ok(out)
  }

  fn selector(&self, operands: &[Value]) -> Result<String, CompileError> {
    let (vector, indices) = operands.split_first().ok_or(CompileError::Malformed {
      kind: Kind::FunctionSelector,
      count: 0,
    })?;
    let mut out = self.bracket_if(vector, !vector.is_atomic());
    if !indices.is_empty() {
      out.push_str("_{");
      output_sep_by(&mut out, indices, ", ", |out, index| out.push_str(&index.value));
      out.push('}');
    }
    Ok(out)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ast::builder::*;
  use crate::units::{QuantityTable, UnitValue};

  #[test]
  fn test_divide() {
    assert_eq!(divide_by(1, 1).to_latex().unwrap(), "\\frac{1}{1}");
  }

  #[test]
  fn test_arithmetic() {
    let node = minus(name("a"), plus(name("b"), 2));
    assert_eq!(node.to_latex().unwrap(), "\\mathtt{a}-\\left(\\mathtt{b}+2\\right)");
    let node = times(2, plus(name("x"), 1));
    assert_eq!(node.to_latex().unwrap(), "2\\cdot \\left(\\mathtt{x}+1\\right)");
    assert_eq!(unary_minus(name("x")).to_latex().unwrap(), "-\\mathtt{x}");
  }

  #[test]
  fn test_power() {
    assert_eq!(pow(name("x"), 2).to_latex().unwrap(), "\\mathtt{x}^{2}");
    assert_eq!(pow(name("x"), 1).to_latex().unwrap(), "\\mathtt{x}");
    assert_eq!(pow(plus(name("x"), 1), 2).to_latex().unwrap(), "\\left(\\mathtt{x}+1\\right)^{2}");
  }

  #[test]
  fn test_roots_and_logs() {
    assert_eq!(sqrt(name("x")).to_latex().unwrap(), "\\sqrt{\\mathtt{x}}");
    assert_eq!(root(3, name("x")).to_latex().unwrap(), "\\sqrt[3]{\\mathtt{x}}");
    assert_eq!(root(2, name("x")).to_latex().unwrap(), "\\sqrt{\\mathtt{x}}");
    assert_eq!(log(name("x")).to_latex().unwrap(), "\\log{\\mathtt{x}}");
    assert_eq!(log_base(2, name("x")).to_latex().unwrap(), "\\log_{2}{\\mathtt{x}}");
    assert_eq!(ln(name("x")).to_latex().unwrap(), "\\ln{\\mathtt{x}}");
  }

  #[test]
  fn test_functions() {
    assert_eq!(unary_function(Kind::FunctionSin, name("x")).to_latex().unwrap(), "\\sin{\\mathtt{x}}");
    assert_eq!(
      unary_function(Kind::FunctionSech, name("x")).to_latex().unwrap(),
      "\\mathrm{sech}\\left(\\mathtt{x}\\right)",
    );
    assert_eq!(
      unary_function(Kind::FunctionAbs, name("x")).to_latex().unwrap(),
      "\\left\\lvert \\mathtt{x}\\right\\rvert ",
    );
    assert_eq!(unary_function(Kind::FunctionFactorial, name("n")).to_latex().unwrap(), "\\mathtt{n}!");
    assert_eq!(
      delay(name("x"), 2).to_latex().unwrap(),
      "\\mathrm{delay}\\left(\\mathtt{x}, 2\\right)",
    );
  }

  #[test]
  fn test_logic() {
    let node = and([lt(name("a"), 1), not(name("b"))]);
    assert_eq!(
      node.to_latex().unwrap(),
      "\\left(\\mathtt{a} < 1\\right)\\wedge \\left(\\neg \\mathtt{b}\\right)",
    );
    assert_eq!(geq(name("a"), 1).to_latex().unwrap(), "\\mathtt{a} \\geq 1");
  }

  #[test]
  fn test_piecewise() {
    let node = piecewise([integer(1), gt(name("x"), 0), integer(0)]);
    assert_eq!(
      node.to_latex().unwrap(),
      "\\begin{dcases}\n1 & \\text{if\\ } \\mathtt{x} > 0\\\\\n0 & \\text{otherwise}\n\\end{dcases}",
    );
  }

  #[test]
  fn test_lambda() {
    let node = lambda(["x"], times(name("x"), 2));
    assert_eq!(node.to_latex().unwrap(), "\\lambda\\left(\\mathtt{x}\\right) = \\mathtt{x}\\cdot 2");
  }

  #[test]
  fn test_scientific_numbers() {
    assert_eq!(real(1.5e8).to_latex().unwrap(), "1.5\\cdot 10^{8}");
    assert_eq!(real(1e8).to_latex().unwrap(), "10^{8}");
    assert_eq!(real(2.5e-4).to_latex().unwrap(), "2.5\\cdot 10^{-4}");
    assert_eq!(real(0.5).to_latex().unwrap(), "0.5");
    assert_eq!(real(3.0).to_latex().unwrap(), "3");
    assert_eq!(real(f64::INFINITY).to_latex().unwrap(), "\\infty");
    assert_eq!(real_e(2.0, 5).to_latex().unwrap(), "2\\cdot 10^{5}");
  }

  #[test]
  fn test_scientific_thresholds() {
    let settings = LatexSettings { scientific_upper: 5.0, scientific_lower: 1.0, ..LatexSettings::default() };
    assert_eq!(to_latex(&real(7.0), &settings).unwrap(), "7\\cdot 10^{0}");
    assert_eq!(to_latex(&real(50.0), &settings).unwrap(), "5\\cdot 10^{1}");
    assert_eq!(to_latex(&real(0.5), &settings).unwrap(), "5\\cdot 10^{-1}");
    assert_eq!(to_latex(&real(3.0), &settings).unwrap(), "3");
    let settings = LatexSettings { scientific_upper: f64::INFINITY, ..LatexSettings::default() };
    assert_eq!(to_latex(&real(1e30), &settings).unwrap(), "1000000000000000000000000000000");
  }

  #[test]
  fn test_mask_special_chars() {
    assert_eq!(mask_special_chars("k_1", true), "k\\-\\_1");
    assert_eq!(mask_special_chars("k_1", false), "k\\_1");
    assert_eq!(mask_special_chars("_a", true), "\\_a");
    assert_eq!(mask_special_chars("a<b", true), "a$<$b");
  }

  #[test]
  fn test_name_mode() {
    let mut table = QuantityTable::new();
    table.insert("k1", UnitValue::dimensionless(), None);
    table.set_display_name("k1", "rate constant");
    let settings = LatexSettings { print_names: true, ..LatexSettings::default() };
    let node = plus(name("k1"), name("k2"));
    assert_eq!(
      to_latex_with(&node, &settings, &table).unwrap(),
      "\\mathrm{rate constant}+\\mathtt{k2}",
    );
    assert_eq!(
      to_latex_with(&node, &LatexSettings::default(), &table).unwrap(),
      "\\mathtt{k1}+\\mathtt{k2}",
    );
  }

  #[test]
  fn test_settings_from_json() {
    let json = r#"{"print_names":true,"scientific_upper":1000.0,"scientific_lower":0.01}"#;
    let settings: LatexSettings = serde_json::from_str(json).unwrap();
    assert!(settings.print_names);
    assert_eq!(real(5000.0).to_latex().unwrap(), "5000");
    assert_eq!(to_latex(&real(5000.0), &settings).unwrap(), "5\\cdot 10^{3}");
  }
}

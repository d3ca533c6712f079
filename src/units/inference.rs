
//! Bottom-up unit inference, as a compiler [`Backend`] whose output
//! is a unit together with a folded numerical value.
//!
//! Quantities whose units cannot be determined carry the invalid unit
//! value. It propagates through arithmetic without raising an error,
//! and only operators that require a dimensionless argument reject
//! it.

use super::kind::{UnitKind, AVOGADRO};
use super::lookup::QuantityLookup;
use super::unit_value::UnitValue;
use crate::ast::{Kind, Node};
use crate::compiler::{compile, Backend, BackendValue, CompileError};

use num::Rational64;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use std::cmp::Ordering;
use std::f64::consts;

#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum UnitError {
  #[error("incompatible units: {left} and {right}")]
  IncompatibleUnits { left: String, right: String },
  #[error("expected a dimensionless quantity, got {unit}")]
  NotDimensionless { unit: String },
  #[error("unresolved reference to '{0}'")]
  UnresolvedReference(String),
  #[error("unknown unit '{0}'")]
  UnknownUnit(String),
  #[error("{0}")]
  Compile(#[from] CompileError),
}

/// The units of a subtree, and its numerical value where that can be
/// folded from literals and known quantities.
#[derive(Debug, Clone, PartialEq)]
pub struct Inference {
  pub unit: UnitValue,
  pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceSettings {
  /// Whether references to undeclared quantities and unknown unit
  /// names are errors. Otherwise, undeclared quantities are treated
  /// as dimensionless with unknown value, and unknown unit names
  /// yield the invalid unit value.
  pub strict: bool,
}

pub struct UnitsBackend<'a> {
  lookup: &'a dyn QuantityLookup,
  settings: InferenceSettings,
}

type Value = BackendValue<Inference>;

pub fn infer(node: &Node, lookup: &dyn QuantityLookup) -> Result<Inference, UnitError> {
  infer_with(node, lookup, &InferenceSettings::default())
}

pub fn infer_with(
  node: &Node,
  lookup: &dyn QuantityLookup,
  settings: &InferenceSettings,
) -> Result<Inference, UnitError> {
  let backend = UnitsBackend::new(lookup, *settings);
  compile(node, &backend).map(BackendValue::into_value)
}

impl Default for InferenceSettings {
  fn default() -> Self {
    InferenceSettings { strict: true }
  }
}

impl Inference {
  pub fn new(unit: UnitValue, value: Option<f64>) -> Self {
    Inference { unit, value }
  }

  pub fn dimensionless(value: Option<f64>) -> Self {
    Self::new(UnitValue::dimensionless(), value)
  }

  fn boolean(value: Option<bool>) -> Self {
    Self::dimensionless(value.map(|b| if b { 1.0 } else { 0.0 }))
  }

  /// The value as a plain number, with any leftover coefficient of a
  /// dimensionless unit (such as `km/m`) multiplied in.
  fn plain_value(&self) -> Option<f64> {
    self.value.map(|v| v * self.unit.to_si().coefficient())
  }

  fn truth(&self) -> Option<bool> {
    self.value.map(|v| v != 0.0)
  }
}

impl<'a> UnitsBackend<'a> {
  pub fn new(lookup: &'a dyn QuantityLookup, settings: InferenceSettings) -> Self {
    UnitsBackend { lookup, settings }
  }

  pub fn settings(&self) -> &InferenceSettings {
    &self.settings
  }

  fn sentinel(&self, reason: &str) -> Inference {
    tracing::debug!(reason, "substituting invalid units");
    Inference::new(UnitValue::invalid(), None)
  }

  fn time_units(&self) -> UnitValue {
    self.lookup.time_units().unwrap_or_else(|| UnitValue::of(UnitKind::Second))
  }

  fn literal(&self, value: f64, units: Option<&str>) -> Result<Inference, UnitError> {
    let Some(id) = units else {
      return Ok(Inference::dimensionless(Some(value)));
    };
    if let Some(unit) = UnitKind::from_name(id).map(UnitValue::of).or_else(|| self.lookup.unit_definition(id)) {
      Ok(Inference::new(unit, Some(value)))
    } else if self.settings.strict {
      Err(UnitError::UnknownUnit(id.to_owned()))
    } else {
      Ok(Inference { value: Some(value), ..self.sentinel(id) })
    }
  }

  fn require_dimensionless(operand: &Value) -> Result<(), UnitError> {
    if operand.value.unit.is_dimensionless_like() {
      Ok(())
    } else {
      Err(UnitError::NotDimensionless { unit: operand.value.unit.to_string() })
    }
  }

  /// Checks that all operands have compatible units and converts
  /// their values to a single common unit. The common unit is that of
  /// the operand whose decimal scale lies nearest the mean scale of
  /// all operands.
  fn unify<'v, I>(operands: I) -> Result<(UnitValue, Vec<Option<f64>>), UnitError>
  where I: IntoIterator<Item = &'v Inference> {
    let operands: Vec<&Inference> = operands.into_iter().collect();
    let valid: Vec<&Inference> = operands.iter().copied().filter(|op| !op.unit.is_invalid()).collect();
    if let Some(first) = valid.first() {
      if let Some(other) = valid.iter().find(|op| !first.unit.compatible(&op.unit)) {
        return Err(UnitError::IncompatibleUnits {
          left: first.unit.to_string(),
          right: other.unit.to_string(),
        });
      }
    }
    if valid.len() < operands.len() || valid.is_empty() {
      let values = operands.iter().map(|op| op.value).collect();
      return Ok((UnitValue::invalid(), values));
    }
    let scales: Vec<f64> = valid.iter().map(|op| op.unit.decimal_scale()).collect();
    let mean = scales.iter().sum::<f64>() / scales.len() as f64;
    let nearest = scales.iter()
      .enumerate()
      .min_by(|(_, a), (_, b)| (*a - mean).abs().partial_cmp(&(*b - mean).abs()).unwrap_or(Ordering::Equal))
      .map_or(0, |(index, _)| index);
    let target = valid[nearest].unit.clone();
    let values = operands.iter()
      .map(|op| op.value.map(|v| v * op.unit.conversion_factor(&target)))
      .collect();
    Ok((target, values))
  }
}

fn all_known(values: Vec<Option<f64>>) -> Option<Vec<f64>> {
  values.into_iter().collect()
}

fn both<T>(a: Option<T>, b: Option<T>) -> Option<(T, T)> {
  a.zip(b)
}

fn to_rational(x: f64) -> Option<Rational64> {
  Rational64::approximate_float(x)
}

/// The largest n whose factorial is finite as an f64.
const MAX_FACTORIAL: f64 = 170.0;

fn factorial(x: f64) -> f64 {
  if x.is_nan() || x < 0.0 || (x.is_finite() && x.fract() != 0.0) {
    f64::NAN
  } else if x > MAX_FACTORIAL {
    f64::INFINITY
  } else {
    (1..=(x as u64)).map(|n| n as f64).product()
  }
}

/// Numerical value of a built-in function of one dimensionless
/// argument.
fn evaluate_unary(kind: Kind, x: f64) -> Option<f64> {
  let value = match kind {
    Kind::FunctionExp => x.exp(),
    Kind::FunctionLn => x.ln(),
    Kind::FunctionFactorial => factorial(x),
    Kind::FunctionSin => x.sin(),
    Kind::FunctionCos => x.cos(),
    Kind::FunctionTan => x.tan(),
    Kind::FunctionSec => x.cos().recip(),
    Kind::FunctionCsc => x.sin().recip(),
    Kind::FunctionCot => x.tan().recip(),
    Kind::FunctionSinh => x.sinh(),
    Kind::FunctionCosh => x.cosh(),
    Kind::FunctionTanh => x.tanh(),
    Kind::FunctionSech => x.cosh().recip(),
    Kind::FunctionCsch => x.sinh().recip(),
    Kind::FunctionCoth => x.tanh().recip(),
    Kind::FunctionArcsin => x.asin(),
    Kind::FunctionArccos => x.acos(),
    Kind::FunctionArctan => x.atan(),
    Kind::FunctionArcsec => x.recip().acos(),
    Kind::FunctionArccsc => x.recip().asin(),
    Kind::FunctionArccot => x.recip().atan(),
    Kind::FunctionArcsinh => x.asinh(),
    Kind::FunctionArccosh => x.acosh(),
    Kind::FunctionArctanh => x.atanh(),
    Kind::FunctionArcsech => x.recip().acosh(),
    Kind::FunctionArccsch => x.recip().asinh(),
    Kind::FunctionArccoth => x.recip().atanh(),
    _ => return None,
  };
  Some(value)
}

fn compare(kind: Kind, a: f64, b: f64) -> bool {
  match kind {
    Kind::RelationalEq => a == b,
    Kind::RelationalNeq => a != b,
    Kind::RelationalGt => a > b,
    Kind::RelationalGeq => a >= b,
    Kind::RelationalLt => a < b,
    Kind::RelationalLeq => a <= b,
    _ => false,
  }
}

impl<'a> Backend for UnitsBackend<'a> {
  type Value = Inference;
  type Error = UnitError;

  fn integer(&self, value: i64, units: Option<&str>) -> Result<Inference, UnitError> {
    self.literal(value as f64, units)
  }

  fn real(&self, value: f64, units: Option<&str>) -> Result<Inference, UnitError> {
    self.literal(value, units)
  }

  fn real_e(&self, mantissa: f64, exponent: i64, units: Option<&str>) -> Result<Inference, UnitError> {
    self.literal(mantissa * 10f64.powf(exponent as f64), units)
  }

  fn rational(&self, numerator: i64, denominator: i64, units: Option<&str>) -> Result<Inference, UnitError> {
    self.literal(numerator as f64 / denominator as f64, units)
  }

  fn identifier(&self, name: &str) -> Result<Inference, UnitError> {
    match self.lookup.resolve(name) {
      Some((unit, value)) => Ok(Inference::new(unit, value)),
      None if self.settings.strict => Err(UnitError::UnresolvedReference(name.to_owned())),
      None => {
        tracing::debug!(name, "undeclared quantity treated as dimensionless");
        Ok(Inference::dimensionless(None))
      }
    }
  }

  fn symbol_time(&self, _name: Option<&str>) -> Result<Inference, UnitError> {
    Ok(Inference::new(self.time_units(), None))
  }

  fn symbol_avogadro(&self, _name: Option<&str>) -> Result<Inference, UnitError> {
    Ok(Inference::new(UnitValue::of(UnitKind::Mole).recip(), Some(AVOGADRO)))
  }

  fn constant(&self, kind: Kind) -> Result<Inference, UnitError> {
    let value = match kind {
      Kind::ConstantE => consts::E,
      Kind::ConstantPi => consts::PI,
      Kind::ConstantTrue => 1.0,
      _ => 0.0,
    };
    Ok(Inference::dimensionless(Some(value)))
  }

  fn plus(&self, operands: &[Value]) -> Result<Inference, UnitError> {
    let (unit, values) = Self::unify(operands.iter().map(|op| &op.value))?;
    let value = all_known(values).map(|values| values.into_iter().sum());
    Ok(Inference::new(unit, value))
  }

  fn minus(&self, operands: &[Value]) -> Result<Inference, UnitError> {
    let (unit, values) = Self::unify(operands.iter().map(|op| &op.value))?;
    let value = all_known(values).and_then(|values| {
      let (first, rest) = values.split_first()?;
      Some(rest.iter().fold(*first, |acc, v| acc - v))
    });
    Ok(Inference::new(unit, value))
  }

  fn unary_minus(&self, operand: &Value) -> Result<Inference, UnitError> {
    Ok(Inference::new(operand.value.unit.clone(), operand.value.value.map(|v| -v)))
  }

  fn times(&self, operands: &[Value]) -> Result<Inference, UnitError> {
    let unit = operands.iter()
      .fold(UnitValue::dimensionless(), |acc, op| acc * op.value.unit.clone());
    let value = operands.iter()
      .map(|op| op.value.value)
      .collect::<Option<Vec<f64>>>()
      .map(|values| values.into_iter().product());
    Ok(Inference::new(unit, value))
  }

  fn divide(&self, numerator: &Value, denominator: &Value) -> Result<Inference, UnitError> {
    let unit = numerator.value.unit.clone() / denominator.value.unit.clone();
    let value = both(numerator.value.value, denominator.value.value).map(|(a, b)| a / b);
    Ok(Inference::new(unit, value))
  }

  fn power(&self, base: &Value, exponent: &Value) -> Result<Inference, UnitError> {
    Self::require_dimensionless(exponent)?;
    let exponent_value = exponent.value.plain_value();
    let value = both(base.value.value, exponent_value).map(|(b, e)| b.powf(e));
    let base_unit = &base.value.unit;
    if base_unit.is_invalid() {
      return Ok(Inference::new(UnitValue::invalid(), value));
    }
    match exponent_value.and_then(to_rational) {
      Some(power) => Ok(Inference::new(base_unit.pow(power), value)),
      None if base_unit.is_dimensionless_like() => Ok(Inference::new(base_unit.clone(), value)),
      None => Ok(Inference { value, ..self.sentinel("exponent is not a known number") }),
    }
  }

  fn root(&self, degree: Option<&Value>, radicand: &Value) -> Result<Inference, UnitError> {
    let degree_value = match degree {
      None => Some(2.0),
      Some(degree) => {
        Self::require_dimensionless(degree)?;
        degree.value.plain_value()
      }
    };
    let value = both(radicand.value.value, degree_value).map(|(x, n)| x.powf(n.recip()));
    let radicand_unit = &radicand.value.unit;
    if radicand_unit.is_invalid() {
      return Ok(Inference::new(UnitValue::invalid(), value));
    }
    match degree_value.and_then(to_rational).filter(|n| *n != Rational64::from_integer(0)) {
      Some(degree) => Ok(Inference::new(radicand_unit.pow(degree.recip()), value)),
      None if radicand_unit.is_dimensionless_like() => Ok(Inference::new(radicand_unit.clone(), value)),
      None => Ok(Inference { value, ..self.sentinel("root degree is not a known number") }),
    }
  }

  fn log(&self, base: Option<&Value>, value: &Value) -> Result<Inference, UnitError> {
    Self::require_dimensionless(value)?;
    let base_value = match base {
      None => Some(10.0),
      Some(base) => {
        Self::require_dimensionless(base)?;
        base.value.plain_value()
      }
    };
    let result = both(value.value.plain_value(), base_value).map(|(x, b)| x.log(b));
    Ok(Inference::dimensionless(result))
  }

  fn ln(&self, value: &Value) -> Result<Inference, UnitError> {
    Self::require_dimensionless(value)?;
    Ok(Inference::dimensionless(value.value.plain_value().map(f64::ln)))
  }

  fn unary_function(&self, kind: Kind, argument: &Value) -> Result<Inference, UnitError> {
    let unit = argument.value.unit.clone();
    let value = argument.value.value;
    match kind {
      Kind::FunctionAbs => Ok(Inference::new(unit, value.map(f64::abs))),
      Kind::FunctionFloor => Ok(Inference::new(unit, value.map(f64::floor))),
      Kind::FunctionCeiling => Ok(Inference::new(unit, value.map(f64::ceil))),
      Kind::FunctionRateOf => Ok(Inference::new(unit / self.time_units(), None)),
      _ => {
        Self::require_dimensionless(argument)?;
        let value = argument.value.plain_value().and_then(|x| evaluate_unary(kind, x));
        Ok(Inference::dimensionless(value))
      }
    }
  }

  fn binary_function(&self, kind: Kind, left: &Value, right: &Value) -> Result<Inference, UnitError> {
    if kind == Kind::FunctionQuotient {
      let unit = left.value.unit.clone() / right.value.unit.clone();
      let value = both(left.value.value, right.value.value).map(|(a, b)| (a / b).floor());
      return Ok(Inference::new(unit, value));
    }
    let (unit, values) = Self::unify([&left.value, &right.value])?;
    let value = all_known(values).map(|values| values[0] % values[1]);
    Ok(Inference::new(unit, value))
  }

  fn nary_function(&self, kind: Kind, arguments: &[Value]) -> Result<Inference, UnitError> {
    let (unit, values) = Self::unify(arguments.iter().map(|arg| &arg.value))?;
    let value = all_known(values).and_then(|values| {
      if kind == Kind::FunctionMax {
        values.into_iter().reduce(f64::max)
      } else {
        values.into_iter().reduce(f64::min)
      }
    });
    Ok(Inference::new(unit, value))
  }

  fn delay(&self, _name: Option<&str>, value: &Value, delay: &Value) -> Result<Inference, UnitError> {
    let time = self.time_units();
    if !delay.value.unit.compatible(&time) {
      return Err(UnitError::IncompatibleUnits {
        left: delay.value.unit.to_string(),
        right: time.to_string(),
      });
    }
    Ok(Inference::new(value.value.unit.clone(), None))
  }

  fn relational(&self, kind: Kind, operands: &[Value]) -> Result<Inference, UnitError> {
    let (_, values) = Self::unify(operands.iter().map(|op| &op.value))?;
    let value = all_known(values).map(|values| {
      values.windows(2).all(|pair| compare(kind, pair[0], pair[1]))
    });
    Ok(Inference::boolean(value))
  }

  fn logical(&self, kind: Kind, operands: &[Value]) -> Result<Inference, UnitError> {
    let truths = operands.iter()
      .map(|op| op.value.truth())
      .collect::<Option<Vec<bool>>>();
    let value = truths.map(|truths| match kind {
      Kind::LogicalAnd => truths.iter().all(|t| *t),
      Kind::LogicalOr => truths.iter().any(|t| *t),
      Kind::LogicalXor => truths.iter().filter(|t| **t).count() % 2 == 1,
      _ => !truths[0] || truths[1],
    });
    Ok(Inference::boolean(value))
  }

  fn not(&self, operand: &Value) -> Result<Inference, UnitError> {
    Ok(Inference::boolean(operand.value.truth().map(|t| !t)))
  }

  fn piecewise(&self, pieces: &[(Value, Value)], otherwise: Option<&Value>) -> Result<Inference, UnitError> {
    for (_, condition) in pieces {
      if !condition.value.unit.is_invalid() {
        Self::require_dimensionless(condition)?;
      }
    }
    let branches = pieces.iter().map(|(value, _)| &value.value).chain(otherwise.map(|o| &o.value));
    let (unit, values) = Self::unify(branches)?;
    let mut result = values.get(pieces.len()).copied().flatten();
    for ((_, condition), value) in pieces.iter().zip(&values) {
      match condition.value.truth() {
        Some(true) => {
          result = *value;
          break;
        }
        Some(false) => {}
        None => {
          result = None;
          break;
        }
      }
    }
    Ok(Inference::new(unit, result))
  }

  fn lambda(&self, _parameters: &[Value], _body: &Value) -> Result<Inference, UnitError> {
    Ok(self.sentinel("lambda"))
  }

  fn opaque_lambda(&self, _parameters: &[&str]) -> Option<Result<Inference, UnitError>> {
    Some(Ok(self.sentinel("lambda")))
  }

  fn function_call(&self, name: &str, _arguments: &[Value]) -> Result<Inference, UnitError> {
    Ok(self.sentinel(name))
  }

  fn vector(&self, _elements: &[Value]) -> Result<Inference, UnitError> {
    Ok(self.sentinel("vector"))
  }

  fn selector(&self, _operands: &[Value]) -> Result<Inference, UnitError> {
    Ok(self.sentinel("selector"))
  }
}

impl Node {
  /// Infers the units of this tree against `lookup`, in strict mode.
  pub fn infer_units(&self, lookup: &dyn QuantityLookup) -> Result<Inference, UnitError> {
    infer(self, lookup)
  }
}

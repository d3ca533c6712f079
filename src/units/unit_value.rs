
use super::kind::UnitKind;

use itertools::Itertools;
use num::{Rational64, Zero, One, ToPrimitive, CheckedAdd, CheckedMul};
use serde::{Serialize, Deserialize};

use std::fmt::{self, Formatter, Display};
use std::ops::{Mul, Div};

/// One unit kind raised to a rational power, with an optional decimal
/// scale and multiplier. A factor stands for
/// `(multiplier * 10^scale * kind)^exponent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factor {
  pub kind: UnitKind,
  pub exponent: Rational64,
  pub scale: i32,
  pub multiplier: f64,
}

/// A unit value is a formal product of [`Factor`] values, times a
/// plain numerical coefficient.
///
/// The invalid unit value is a sentinel for "units unknown". It
/// absorbs any other unit value it is multiplied with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitValue {
  // Sorted by kind. Each kind appears at most once with a nonzero
  // exponent, and dimensionless factors are folded into the
  // coefficient. The invalid value is exactly one invalid factor.
  factors: Vec<Factor>,
  coefficient: f64,
}

impl Factor {
  pub fn new(kind: UnitKind, exponent: i64) -> Self {
    Self::rational(kind, Rational64::from_integer(exponent))
  }

  pub fn rational(kind: UnitKind, exponent: Rational64) -> Self {
    Factor { kind, exponent, scale: 0, multiplier: 1.0 }
  }

  pub fn with_scale(mut self, scale: i32) -> Self {
    self.scale = scale;
    self
  }

  pub fn with_multiplier(mut self, multiplier: f64) -> Self {
    self.multiplier = multiplier;
    self
  }

  /// The numerical part of this factor, `(multiplier * 10^scale)^exponent`.
  pub fn magnitude(&self) -> f64 {
    (self.multiplier * 10f64.powi(self.scale)).powf(ratio_to_f64(self.exponent))
  }

  fn has_unit_magnitude(&self) -> bool {
    self.scale == 0 && self.multiplier == 1.0
  }
}

impl UnitValue {
  /// The product of all of the factors.
  pub fn new(factors: impl IntoIterator<Item = Factor>) -> Self {
    Self::with_coefficient(1.0, factors)
  }

  pub fn with_coefficient(mut coefficient: f64, factors: impl IntoIterator<Item = Factor>) -> Self {
    let factors: Vec<_> = factors.into_iter().collect();
    if factors.iter().any(|f| f.kind == UnitKind::Invalid) {
      return Self::invalid();
    }
    let mut merged = Vec::new();
    for (kind, group) in factors.into_iter().map(|f| (f.kind, f)).into_group_map() {
      let magnitude = group.iter().map(Factor::magnitude).product::<f64>();
      if kind == UnitKind::Dimensionless {
        coefficient *= magnitude;
        continue;
      }
      let exponent = group.iter()
        .try_fold(Rational64::zero(), |acc, f| exponent_sum(acc, f.exponent));
      let Some(exponent) = exponent else {
        return Self::invalid();
      };
      if exponent.is_zero() {
        coefficient *= magnitude;
        continue;
      }
      let first = &group[0];
      if group.iter().all(|f| f.scale == first.scale && f.multiplier == first.multiplier) {
        merged.push(Factor { exponent, ..first.clone() });
      } else {
        coefficient *= magnitude;
        merged.push(Factor::rational(kind, exponent));
      }
    }
    merged.sort_by_key(|f| f.kind);
    UnitValue { factors: merged, coefficient }
  }

  pub fn dimensionless() -> Self {
    UnitValue { factors: Vec::new(), coefficient: 1.0 }
  }

  pub fn invalid() -> Self {
    UnitValue { factors: vec![Factor::new(UnitKind::Invalid, 1)], coefficient: 1.0 }
  }

  /// A single unit kind to the first power.
  pub fn of(kind: UnitKind) -> Self {
    Self::new([Factor::new(kind, 1)])
  }

  pub fn is_invalid(&self) -> bool {
    matches!(self.factors.as_slice(), [f] if f.kind == UnitKind::Invalid)
  }

  /// True if every factor has a dimensionless-like kind. The invalid
  /// unit value is not dimensionless.
  pub fn is_dimensionless_like(&self) -> bool {
    self.factors.iter().all(|f| f.kind.is_dimensionless_like())
  }

  pub fn factors(&self) -> &[Factor] {
    &self.factors
  }

  pub fn coefficient(&self) -> f64 {
    self.coefficient
  }

  /// This unit value raised to a rational power.
  pub fn pow(&self, exponent: Rational64) -> Self {
    if self.is_invalid() {
      return Self::invalid();
    }
    let factors = self.factors.iter()
      .map(|f| exponent_product(f.exponent, exponent).map(|e| Factor { exponent: e, ..f.clone() }))
      .collect::<Option<Vec<_>>>();
    match factors {
      Some(factors) => Self::with_coefficient(self.coefficient.powf(ratio_to_f64(exponent)), factors),
      None => Self::invalid(),
    }
  }

  pub fn recip(&self) -> Self {
    self.pow(-Rational64::one())
  }

  /// Rewrites this unit value in the seven SI base kinds. Scales,
  /// multipliers, and the conversion factors of derived kinds all
  /// end up in the coefficient.
  pub fn to_si(&self) -> Self {
    if self.is_invalid() {
      return Self::invalid();
    }
    let mut coefficient = self.coefficient;
    let mut factors = Vec::new();
    for factor in &self.factors {
      let expansion = factor.kind.to_si();
      let exponent = ratio_to_f64(factor.exponent);
      coefficient *= factor.magnitude() * expansion.multiplier.powf(exponent);
      for (base, power) in expansion.bases {
        match exponent_product(factor.exponent, Rational64::from_integer(*power)) {
          Some(exponent) => factors.push(Factor::rational(*base, exponent)),
          None => return Self::invalid(),
        }
      }
    }
    Self::with_coefficient(coefficient, factors)
  }

  /// The SI base kinds and exponents of this unit value.
  pub fn dimension(&self) -> Vec<(UnitKind, Rational64)> {
    self.to_si().factors.into_iter()
      .map(|f| (f.kind, f.exponent))
      .collect()
  }

  /// Two unit values are compatible if they measure the same
  /// dimension, regardless of scale. The invalid unit value is
  /// compatible with everything.
  pub fn compatible(&self, other: &UnitValue) -> bool {
    self.is_invalid() || other.is_invalid() || self.dimension() == other.dimension()
  }

  /// Two unit values are equivalent if their merged factors name the
  /// same kinds with the same exponents, and their overall magnitudes
  /// agree.
  pub fn equivalent(&self, other: &UnitValue) -> bool {
    if self.is_invalid() || other.is_invalid() {
      return self.is_invalid() && other.is_invalid();
    }
    let same_factors = self.factors.len() == other.factors.len() &&
      self.factors.iter().zip(&other.factors).all(|(a, b)| a.kind == b.kind && a.exponent == b.exponent);
    same_factors && approx::relative_eq!(self.magnitude(), other.magnitude())
  }

  /// The coefficient times the magnitude of every factor.
  pub fn magnitude(&self) -> f64 {
    self.factors.iter().map(Factor::magnitude).fold(self.coefficient, |acc, m| acc * m)
  }

  /// The number that a quantity in `self` must be multiplied by to
  /// express it in `target`. Only meaningful for compatible values.
  pub fn conversion_factor(&self, target: &UnitValue) -> f64 {
    self.to_si().coefficient / target.to_si().coefficient
  }

  /// The base-10 order of magnitude of this unit value relative to
  /// its SI expansion.
  pub fn decimal_scale(&self) -> f64 {
    self.to_si().coefficient.log10()
  }
}

impl Default for UnitValue {
  fn default() -> Self {
    Self::dimensionless()
  }
}

impl From<UnitKind> for UnitValue {
  fn from(kind: UnitKind) -> Self {
    Self::of(kind)
  }
}

impl From<Factor> for UnitValue {
  fn from(factor: Factor) -> Self {
    Self::new([factor])
  }
}

impl<S> Mul<S> for UnitValue
where S: Into<UnitValue> {
  type Output = UnitValue;

  fn mul(self, rhs: S) -> Self::Output {
    let rhs = rhs.into();
    let mut factors = self.factors;
    factors.extend(rhs.factors);
    Self::with_coefficient(self.coefficient * rhs.coefficient, factors)
  }
}

impl<S> Div<S> for UnitValue
where S: Into<UnitValue> {
  type Output = UnitValue;

  #[allow(clippy::suspicious_arithmetic_impl)] // reason: division is multiplication by the reciprocal
  fn div(self, rhs: S) -> Self::Output {
    self * rhs.into().recip()
  }
}

impl Display for Factor {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    if self.has_unit_magnitude() {
      write!(f, "{}", self.kind.symbol())?;
    } else {
      write!(f, "(")?;
      if self.multiplier != 1.0 {
        write!(f, "{}*", self.multiplier)?;
      }
      if self.scale != 0 {
        write!(f, "10^{}*", self.scale)?;
      }
      write!(f, "{})", self.kind.symbol())?;
    }
    if self.exponent.is_integer() {
      if !self.exponent.is_one() {
        write!(f, "^{}", self.exponent)?;
      }
    } else {
      write!(f, "^({})", self.exponent)?;
    }
    Ok(())
  }
}

impl Display for UnitValue {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    if self.is_invalid() {
      return write!(f, "invalid");
    }
    if self.factors.is_empty() {
      return if self.coefficient == 1.0 {
        write!(f, "dimensionless")
      } else {
        write!(f, "{}", self.coefficient)
      };
    }
    if self.coefficient != 1.0 {
      write!(f, "{}*", self.coefficient)?;
    }
    write!(f, "{}", self.factors.iter().join("*"))
  }
}

fn ratio_to_f64(ratio: Rational64) -> f64 {
  ratio.to_f64().unwrap_or(f64::NAN)
}

// Exponents built from approximated floats can have large terms. When
// the exact result does not fit, it is approximated again from floats.

fn exponent_product(a: Rational64, b: Rational64) -> Option<Rational64> {
  a.checked_mul(&b).or_else(|| Rational64::approximate_float(ratio_to_f64(a) * ratio_to_f64(b)))
}

fn exponent_sum(a: Rational64, b: Rational64) -> Option<Rational64> {
  a.checked_add(&b).or_else(|| Rational64::approximate_float(ratio_to_f64(a) + ratio_to_f64(b)))
}

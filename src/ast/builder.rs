
//! Convenience constructors for minimally-shaped subtrees.
//!
//! Every builder produces a strict node whose children already
//! satisfy the kind's contract, so none of them can fail. Operands
//! may be nodes or raw numbers (anything which converts into a
//! [`Node`]).

use super::kind::Kind;
use super::node::{Node, Payload};
use super::error::Property;

fn build<I>(kind: Kind, children: I) -> Node
where I: IntoIterator<Item = Node> {
  Node::from_children(kind, children.into_iter().collect())
}

pub fn integer(n: i64) -> Node {
  Node::number(Payload::Integer(n))
}

pub fn real(x: f64) -> Node {
  Node::number(Payload::Real(x))
}

pub fn real_e(mantissa: f64, exponent: i64) -> Node {
  Node::number(Payload::RealE { mantissa, exponent })
}

pub fn rational(numerator: i64, denominator: i64) -> Node {
  Node::number(Payload::Rational { numerator, denominator })
}

/// A numeric literal carrying an explicit unit id.
pub fn with_units(mut literal: Node, units: impl Into<String>) -> Node {
  literal.set(Property::Units, units);
  literal
}

/// A reference to a named quantity.
pub fn name(id: impl Into<String>) -> Node {
  let mut node = Node::new(Kind::Name);
  node.set(Property::Name, id);
  node
}

pub fn constant(kind: Kind) -> Node {
  debug_assert!(kind.is_constant());
  Node::new(kind)
}

pub fn sum<I>(operands: I) -> Node
where I: IntoIterator<Item = Node> {
  build(Kind::Sum, operands)
}

pub fn product<I>(operands: I) -> Node
where I: IntoIterator<Item = Node> {
  build(Kind::Product, operands)
}

/// An n-ary difference `x0 - x1 - ... - xn`.
pub fn diff<I>(operands: I) -> Node
where I: IntoIterator<Item = Node> {
  build(Kind::Minus, operands)
}

pub fn plus(left: impl Into<Node>, right: impl Into<Node>) -> Node {
  build(Kind::Plus, [left.into(), right.into()])
}

pub fn minus(left: impl Into<Node>, right: impl Into<Node>) -> Node {
  build(Kind::Minus, [left.into(), right.into()])
}

pub fn times(left: impl Into<Node>, right: impl Into<Node>) -> Node {
  build(Kind::Times, [left.into(), right.into()])
}

/// `node / divisor`.
pub fn divide_by(node: impl Into<Node>, divisor: impl Into<Node>) -> Node {
  build(Kind::Divide, [node.into(), divisor.into()])
}

/// The fraction `numerator / denominator`.
pub fn frac(numerator: impl Into<Node>, denominator: impl Into<Node>) -> Node {
  divide_by(numerator, denominator)
}

pub fn pow(base: impl Into<Node>, exponent: impl Into<Node>) -> Node {
  build(Kind::Power, [base.into(), exponent.into()])
}

/// `e^x`, as a power of the constant e.
pub fn exp(exponent: impl Into<Node>) -> Node {
  pow(Node::new(Kind::ConstantE), exponent)
}

pub fn sqrt(radicand: impl Into<Node>) -> Node {
  build(Kind::FunctionRoot, [radicand.into()])
}

pub fn root(degree: impl Into<Node>, radicand: impl Into<Node>) -> Node {
  build(Kind::FunctionRoot, [degree.into(), radicand.into()])
}

/// The base-10 logarithm.
pub fn log(value: impl Into<Node>) -> Node {
  build(Kind::FunctionLog, [value.into()])
}

pub fn log_base(base: impl Into<Node>, value: impl Into<Node>) -> Node {
  build(Kind::FunctionLog, [base.into(), value.into()])
}

/// The natural logarithm, as a logarithm with base e.
pub fn ln(value: impl Into<Node>) -> Node {
  log_base(Node::new(Kind::ConstantE), value)
}

pub fn unary_minus(node: impl Into<Node>) -> Node {
  build(Kind::Minus, [node.into()])
}

/// A piecewise function from alternating value and condition nodes,
/// with an optional trailing otherwise value.
pub fn piecewise<I>(parts: I) -> Node
where I: IntoIterator<Item = Node> {
  build(Kind::FunctionPiecewise, parts)
}

pub fn relational(kind: Kind, left: impl Into<Node>, right: impl Into<Node>) -> Node {
  debug_assert!(kind.is_relational());
  build(kind, [left.into(), right.into()])
}

pub fn eq(left: impl Into<Node>, right: impl Into<Node>) -> Node {
  relational(Kind::RelationalEq, left, right)
}

pub fn neq(left: impl Into<Node>, right: impl Into<Node>) -> Node {
  relational(Kind::RelationalNeq, left, right)
}

pub fn gt(left: impl Into<Node>, right: impl Into<Node>) -> Node {
  relational(Kind::RelationalGt, left, right)
}

pub fn geq(left: impl Into<Node>, right: impl Into<Node>) -> Node {
  relational(Kind::RelationalGeq, left, right)
}

pub fn lt(left: impl Into<Node>, right: impl Into<Node>) -> Node {
  relational(Kind::RelationalLt, left, right)
}

pub fn leq(left: impl Into<Node>, right: impl Into<Node>) -> Node {
  relational(Kind::RelationalLeq, left, right)
}

pub fn and<I>(operands: I) -> Node
where I: IntoIterator<Item = Node> {
  build(Kind::LogicalAnd, operands)
}

pub fn or<I>(operands: I) -> Node
where I: IntoIterator<Item = Node> {
  build(Kind::LogicalOr, operands)
}

pub fn xor<I>(operands: I) -> Node
where I: IntoIterator<Item = Node> {
  build(Kind::LogicalXor, operands)
}

pub fn not(operand: impl Into<Node>) -> Node {
  build(Kind::LogicalNot, [operand.into()])
}

/// A call to a unary built-in function such as `cos` or `abs`.
pub fn unary_function(kind: Kind, argument: impl Into<Node>) -> Node {
  debug_assert_eq!(kind.arity(), super::kind::Arity::UNARY);
  build(kind, [argument.into()])
}

/// `delay(x, d)`, the value of `x` at `d` time units in the past.
pub fn delay(value: impl Into<Node>, delay: impl Into<Node>) -> Node {
  build(Kind::FunctionDelay, [value.into(), delay.into()])
}

/// A lambda over the named parameters.
pub fn lambda<'a, I>(parameters: I, body: Node) -> Node
where I: IntoIterator<Item = &'a str> {
  let bvars = parameters.into_iter().map(|p| build(Kind::QualifierBvar, [name(p)]));
  build(Kind::Lambda, bvars.chain([body]))
}

/// A call to a user-defined function.
pub fn function_call<I>(function: impl Into<String>, arguments: I) -> Node
where I: IntoIterator<Item = Node> {
  let mut node = build(Kind::Function, arguments);
  node.set(Property::Name, function);
  node
}

pub fn vector<I>(elements: I) -> Node
where I: IntoIterator<Item = Node> {
  build(Kind::Vector, elements)
}

pub fn selector(vector: Node, index: impl Into<Node>) -> Node {
  build(Kind::FunctionSelector, [vector, index.into()])
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_exp_is_power_of_e() {
    let node = exp(name("x"));
    assert_eq!(node.kind(), Kind::Power);
    assert_eq!(node.get_child(0).unwrap().kind(), Kind::ConstantE);
    assert!(node.is_well_formed());
  }

  #[test]
  fn test_ln_is_effective_ln() {
    let node = ln(1);
    assert_eq!(node.kind(), Kind::FunctionLn);
    assert_eq!(node.stored_kind(), Kind::FunctionLog);
    assert_eq!(log(1).kind(), Kind::FunctionLog);
  }

  #[test]
  fn test_raw_numeric_operands() {
    let node = frac(1, name("x"));
    assert_eq!(node.children(), &[integer(1), name("x")]);
    let node = times(name("x"), 2.5);
    assert_eq!(node.get_child(1).unwrap(), &real(2.5));
  }

  #[test]
  fn test_builders_are_strict() {
    let mut node = pow(name("x"), 2);
    assert!(node.is_strict());
    assert!(node.add_child(integer(3)).is_err());
  }

  #[test]
  fn test_lambda_shape() {
    let node = lambda(["x", "y"], plus(name("x"), name("y")));
    assert_eq!(node.child_count(), 3);
    assert_eq!(node.get_child(0).unwrap().kind(), Kind::QualifierBvar);
    assert_eq!(node.lambda_parameters(), vec![&name("x"), &name("y")]);
  }

  #[test]
  fn test_function_call_name() {
    let node = function_call("f", [integer(1)]);
    assert_eq!(node.name(), Some("f"));
    assert_eq!(node.kind(), Kind::Function);
  }

  #[test]
  fn test_relationals() {
    assert_eq!(geq(1, 2).kind(), Kind::RelationalGeq);
    assert_eq!(neq(1, 2).kind(), Kind::RelationalNeq);
    assert_eq!(lt(name("a"), 2).child_count(), 2);
  }

  #[test]
  fn test_units_attached() {
    let node = with_units(integer(5), "metre");
    assert_eq!(node.units(), Some("metre"));
  }

  #[test]
  fn test_unary_minus() {
    let node = unary_minus(name("x"));
    assert!(node.is_unary_minus());
    assert!(node.is_well_formed());
  }
}

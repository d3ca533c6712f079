
//! Operator precedence resolution by the shunting yard algorithm.
//!
//! The input is a flat sequence of scalar and operator tokens, with
//! the position of each operator (prefix, infix or postfix) already
//! decided by the caller.

use super::operator::{Operator, PrefixProperties, PostfixProperties, InfixProperties, FixityType, Precedence};
use super::source::Span;

use std::error::{Error as StdError};
use std::fmt::{self, Display, Formatter};

/// A token, for the purposes of the shunting yard algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<T> {
  data: TokenData<T>,
  span: Span,
}

/// Internal type which tracks an output value together with the first
/// token that produced it. Used to produce better error messages.
#[derive(Debug, Clone)]
struct OutputWithToken<T, O> {
  output: O,
  token: Token<T>,
}

#[derive(Clone, Debug)]
struct OpStackValue {
  operator: Operator,
  fixity: FixityType,
  span: Span,
}

/// The contents of a token.
#[derive(Debug, Clone, PartialEq)]
enum TokenData<T> {
  /// A value in the target language.
  Scalar(T),
  /// An operator, together with the position it was used in.
  Operator(Operator, FixityType),
}

#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum ShuntingYardError<T, E: StdError> {
  CustomError(E),
  UnexpectedEOF,
  UnexpectedToken(Token<T>),
}

/// A type implementing this trait is capable of driving the shunting
/// yard algorithm and compiling tokens to a given target language.
pub trait ShuntingYardDriver<T> {
  type Output;
  type Error: StdError;

  fn compile_scalar(&mut self, scalar: T) -> Result<Self::Output, Self::Error>;
  fn compile_infix_op(
    &mut self,
    left: Self::Output,
    infix: &InfixProperties,
    right: Self::Output,
  ) -> Result<Self::Output, Self::Error>;
  fn compile_prefix_op(
    &mut self,
    prefix: &PrefixProperties,
    right: Self::Output,
  ) -> Result<Self::Output, Self::Error>;
  fn compile_postfix_op(
    &mut self,
    left: Self::Output,
    postfix: &PostfixProperties,
  ) -> Result<Self::Output, Self::Error>;
}

impl<T> Token<T> {
  pub fn scalar(data: T, span: Span) -> Self {
    Self { data: TokenData::Scalar(data), span }
  }

  /// Constructs a token representing an operator used in the given
  /// position. Panics if `op` does not support that position.
  pub fn operator(op: Operator, fixity: FixityType, span: Span) -> Self {
    if op.fixity().precedence(fixity).is_none() {
      panic!("Token::operator requires a {:?} operator, got {:?}", fixity, op);
    }
    Self { data: TokenData::Operator(op, fixity), span }
  }

  pub fn infix_operator(op: Operator, span: Span) -> Self {
    Self::operator(op, FixityType::Infix, span)
  }

  pub fn prefix_operator(op: Operator, span: Span) -> Self {
    Self::operator(op, FixityType::Prefix, span)
  }

  pub fn postfix_operator(op: Operator, span: Span) -> Self {
    Self::operator(op, FixityType::Postfix, span)
  }

  pub fn span(&self) -> Span {
    self.span
  }
}

impl OpStackValue {
  fn precedence(&self) -> Precedence {
    // unwrap: Token::operator checks that the fixity exists.
    self.operator.fixity().precedence(self.fixity).unwrap()
  }

  fn into_token<T>(self) -> Token<T> {
    Token { data: TokenData::Operator(self.operator, self.fixity), span: self.span }
  }
}

impl<T: Display> Display for TokenData<T> {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
    match self {
      TokenData::Scalar(s) => s.fmt(f),
      TokenData::Operator(op, _) => op.symbol().fmt(f),
    }
  }
}

impl<T: Display> Display for Token<T> {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
    write!(f, "{}", self.data)
  }
}

impl<T: Display, E: StdError> Display for ShuntingYardError<T, E> {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
    match self {
      ShuntingYardError::CustomError(e) =>
        write!(f, "{}", e),
      ShuntingYardError::UnexpectedEOF =>
        write!(f, "unexpected end of input"),
      ShuntingYardError::UnexpectedToken(t) =>
        write!(f, "unexpected token {} at position {}", t.data, t.span.start),
    }
  }
}

impl<T, E> StdError for ShuntingYardError<T, E>
where T: Display + fmt::Debug,
      E: StdError + 'static {
  fn source(&self) -> Option<&(dyn StdError + 'static)> {
    match self {
      ShuntingYardError::CustomError(e) => Some(e),
      ShuntingYardError::UnexpectedEOF => None,
      ShuntingYardError::UnexpectedToken(_) => None,
    }
  }
}

impl<T, E: StdError> From<E> for ShuntingYardError<T, E> {
  fn from(e: E) -> Self {
    Self::CustomError(e)
  }
}

pub fn parse<T, D, I>(
  driver: &mut D,
  input: I
) -> Result<D::Output, ShuntingYardError<T, D::Error>>
where T: Clone,
      D: ShuntingYardDriver<T>,
      I: IntoIterator<Item = Token<T>> {
  let mut operator_stack: Vec<OpStackValue> = Vec::new();
  let mut output_stack: Vec<OutputWithToken<T, D::Output>> = Vec::new();
  for token in input {
    match token.data {
      TokenData::Scalar(t) => {
        let output = driver.compile_scalar(t.clone())?;
        let token = Token { data: TokenData::Scalar(t), span: token.span };
        output_stack.push(OutputWithToken { output, token });
      }
      TokenData::Operator(op, FixityType::Prefix) => {
        // A prefix operator has no left operand, so nothing on the
        // stack can be resolved yet.
        operator_stack.push(OpStackValue { operator: op, fixity: FixityType::Prefix, span: token.span });
      }
      TokenData::Operator(op, FixityType::Infix) => {
        // unwrap: Token::operator checks that the fixity exists.
        let infix = *op.fixity().as_infix().unwrap();
        pop_while(driver, &mut operator_stack, &mut output_stack, |stack_value| {
          stack_value.precedence() > infix.precedence() ||
            (stack_value.precedence() == infix.precedence() && infix.associativity().is_left_assoc())
        })?;
        operator_stack.push(OpStackValue { operator: op, fixity: FixityType::Infix, span: token.span });
      }
      TokenData::Operator(op, FixityType::Postfix) => {
        // unwrap: Token::operator checks that the fixity exists.
        let postfix = *op.fixity().as_postfix().unwrap();
        pop_while(driver, &mut operator_stack, &mut output_stack, |stack_value| {
          stack_value.precedence() > postfix.precedence()
        })?;
        // Postfix operators apply immediately to whatever is on top
        // of the output stack.
        let stack_value = OpStackValue { operator: op, fixity: FixityType::Postfix, span: token.span };
        let error = ShuntingYardError::UnexpectedToken(stack_value.clone().into_token());
        simplify_operator(driver, &mut output_stack, stack_value, error)?;
      }
    }
  }

  // Pop and resolve remaining operators.
  while let Some(stack_value) = operator_stack.pop() {
    simplify_operator(driver, &mut output_stack, stack_value, ShuntingYardError::UnexpectedEOF)?;
  }

  let final_result = output_stack.pop().ok_or(ShuntingYardError::UnexpectedEOF)?;
  if let Some(remaining_value) = output_stack.pop() {
    return Err(ShuntingYardError::UnexpectedToken(remaining_value.token));
  }
  Ok(final_result.output)
}

fn pop_while<T, D, F>(
  driver: &mut D,
  operator_stack: &mut Vec<OpStackValue>,
  output_stack: &mut Vec<OutputWithToken<T, D::Output>>,
  mut should_pop: F,
) -> Result<(), ShuntingYardError<T, D::Error>>
where T: Clone,
      D: ShuntingYardDriver<T>,
      F: FnMut(&OpStackValue) -> bool {
  while let Some(stack_value) = operator_stack.pop() {
    if should_pop(&stack_value) {
      let error = ShuntingYardError::UnexpectedToken(stack_value.clone().into_token());
      simplify_operator(driver, output_stack, stack_value, error)?;
    } else {
      operator_stack.push(stack_value);
      break;
    }
  }
  Ok(())
}

fn simplify_operator<T, D>(
  driver: &mut D,
  output_stack: &mut Vec<OutputWithToken<T, D::Output>>,
  stack_value: OpStackValue,
  error: ShuntingYardError<T, D::Error>,
) -> Result<(), ShuntingYardError<T, D::Error>>
where T: Clone,
      D: ShuntingYardDriver<T> {
  let fixity = *stack_value.operator.fixity();
  match stack_value.fixity {
    FixityType::Infix => {
      let (arg1, arg2) = output_stack.pop()
        .and_then(|arg2| output_stack.pop().map(|arg1| (arg1, arg2)))
        .ok_or(error)?;
      // unwrap: the stack value was pushed as an infix operator.
      let infix_properties = fixity.as_infix().unwrap();
      let output = driver.compile_infix_op(arg1.output, infix_properties, arg2.output)?;
      output_stack.push(OutputWithToken { output, token: arg1.token });
    }
    FixityType::Prefix => {
      let arg = output_stack.pop().ok_or(error)?;
      // unwrap: the stack value was pushed as a prefix operator.
      let prefix_properties = fixity.as_prefix().unwrap();
      let output = driver.compile_prefix_op(prefix_properties, arg.output)?;
      output_stack.push(OutputWithToken { output, token: stack_value.into_token() });
    }
    FixityType::Postfix => {
      let arg = output_stack.pop().ok_or(error)?;
      // unwrap: the stack value was pushed as a postfix operator.
      let postfix_properties = fixity.as_postfix().unwrap();
      let output = driver.compile_postfix_op(arg.output, postfix_properties)?;
      output_stack.push(OutputWithToken { output, token: arg.token });
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ast::Kind;
  use crate::parsing::source::SourceOffset;
  use crate::parsing::operator::{Precedence, Associativity, Fixity};

  use std::convert::Infallible;

  /// Basic test "expression" type for our unit tests.
  #[derive(Debug, Clone, PartialEq, Eq)]
  enum TestExpr {
    Scalar(i64),
    Op(Kind, Vec<TestExpr>),
  }

  #[derive(Clone, Debug)]
  struct TestDriver;

  impl TestExpr {
    fn infix_op(left: TestExpr, kind: Kind, right: TestExpr) -> Self {
      Self::Op(kind, vec![left, right])
    }

    fn unary_op(kind: Kind, arg: TestExpr) -> Self {
      Self::Op(kind, vec![arg])
    }
  }

  impl ShuntingYardDriver<i64> for TestDriver {
    type Output = TestExpr;
    type Error = Infallible;

    fn compile_scalar(&mut self, scalar: i64) -> Result<Self::Output, Self::Error> {
      Ok(TestExpr::Scalar(scalar))
    }

    fn compile_infix_op(
      &mut self,
      left: Self::Output,
      op: &InfixProperties,
      right: Self::Output,
    ) -> Result<Self::Output, Self::Error> {
      Ok(TestExpr::infix_op(left, op.kind(), right))
    }

    fn compile_prefix_op(
      &mut self,
      op: &PrefixProperties,
      right: Self::Output,
    ) -> Result<Self::Output, Self::Error> {
      Ok(TestExpr::unary_op(op.kind(), right))
    }

    fn compile_postfix_op(
      &mut self,
      left: Self::Output,
      op: &PostfixProperties,
    ) -> Result<Self::Output, Self::Error> {
      Ok(TestExpr::unary_op(op.kind(), left))
    }
  }

  fn plus() -> Operator {
    Operator::new("+", Fixity::new().with_infix(Kind::Plus, Associativity::Both, Precedence::new(10)))
  }

  fn minus() -> Operator {
    Operator::new("-", Fixity::new()
      .with_infix(Kind::Minus, Associativity::Left, Precedence::new(10))
      .with_prefix(Kind::Minus, Precedence::new(25)))
  }

  fn times() -> Operator {
    Operator::new("*", Fixity::new().with_infix(Kind::Times, Associativity::Both, Precedence::new(20)))
  }

  fn pow() -> Operator {
    Operator::new("^", Fixity::new().with_infix(Kind::Power, Associativity::Right, Precedence::new(30)))
  }

  fn bang() -> Operator {
    Operator::new("!", Fixity::new().with_postfix(Kind::FunctionFactorial, Precedence::new(40)))
  }

  fn span(start: usize, end: usize) -> Span {
    Span::new(SourceOffset(start), SourceOffset(end))
  }

  #[test]
  fn test_full_assoc_op() {
    let tokens = vec![
      Token::scalar(1, span(0, 1)),
      Token::infix_operator(plus(), span(1, 2)),
      Token::scalar(2, span(2, 3)),
      Token::infix_operator(plus(), span(3, 4)),
      Token::scalar(3, span(4, 5)),
    ];
    let result = parse(&mut TestDriver, tokens).unwrap();
    assert_eq!(
      TestExpr::infix_op(
        TestExpr::infix_op(TestExpr::Scalar(1), Kind::Plus, TestExpr::Scalar(2)),
        Kind::Plus,
        TestExpr::Scalar(3),
      ),
      result,
    );
  }

  #[test]
  fn test_left_assoc_op() {
    let tokens = vec![
      Token::scalar(1, span(0, 1)),
      Token::infix_operator(minus(), span(1, 2)),
      Token::scalar(2, span(2, 3)),
      Token::infix_operator(minus(), span(3, 4)),
      Token::scalar(3, span(4, 5)),
    ];
    let result = parse(&mut TestDriver, tokens).unwrap();
    assert_eq!(
      TestExpr::infix_op(
        TestExpr::infix_op(TestExpr::Scalar(1), Kind::Minus, TestExpr::Scalar(2)),
        Kind::Minus,
        TestExpr::Scalar(3),
      ),
      result,
    );
  }

  #[test]
  fn test_right_assoc_op() {
    let tokens = vec![
      Token::scalar(1, span(0, 1)),
      Token::infix_operator(pow(), span(1, 2)),
      Token::scalar(2, span(2, 3)),
      Token::infix_operator(pow(), span(3, 4)),
      Token::scalar(3, span(4, 5)),
    ];
    let result = parse(&mut TestDriver, tokens).unwrap();
    assert_eq!(
      TestExpr::infix_op(
        TestExpr::Scalar(1),
        Kind::Power,
        TestExpr::infix_op(TestExpr::Scalar(2), Kind::Power, TestExpr::Scalar(3)),
      ),
      result,
    );
  }

  #[test]
  fn test_differing_precedence() {
    let tokens = vec![
      Token::scalar(1, span(0, 1)),
      Token::infix_operator(plus(), span(1, 2)),
      Token::scalar(2, span(2, 3)),
      Token::infix_operator(times(), span(3, 4)),
      Token::scalar(3, span(4, 5)),
    ];
    let result = parse(&mut TestDriver, tokens).unwrap();
    assert_eq!(
      TestExpr::infix_op(
        TestExpr::Scalar(1),
        Kind::Plus,
        TestExpr::infix_op(TestExpr::Scalar(2), Kind::Times, TestExpr::Scalar(3)),
      ),
      result,
    );
  }

  #[test]
  fn test_prefix_binds_looser_than_power() {
    // -1^2 == -(1^2)
    let tokens = vec![
      Token::prefix_operator(minus(), span(0, 1)),
      Token::scalar(1, span(1, 2)),
      Token::infix_operator(pow(), span(2, 3)),
      Token::scalar(2, span(3, 4)),
    ];
    let result = parse(&mut TestDriver, tokens).unwrap();
    assert_eq!(
      TestExpr::unary_op(
        Kind::Minus,
        TestExpr::infix_op(TestExpr::Scalar(1), Kind::Power, TestExpr::Scalar(2)),
      ),
      result,
    );
  }

  #[test]
  fn test_prefix_binds_tighter_than_times() {
    // -1*2 == (-1)*2
    let tokens = vec![
      Token::prefix_operator(minus(), span(0, 1)),
      Token::scalar(1, span(1, 2)),
      Token::infix_operator(times(), span(2, 3)),
      Token::scalar(2, span(3, 4)),
    ];
    let result = parse(&mut TestDriver, tokens).unwrap();
    assert_eq!(
      TestExpr::infix_op(
        TestExpr::unary_op(Kind::Minus, TestExpr::Scalar(1)),
        Kind::Times,
        TestExpr::Scalar(2),
      ),
      result,
    );
  }

  #[test]
  fn test_postfix_after_power() {
    // 1^2! == 1^(2!)
    let tokens = vec![
      Token::scalar(1, span(0, 1)),
      Token::infix_operator(pow(), span(1, 2)),
      Token::scalar(2, span(2, 3)),
      Token::postfix_operator(bang(), span(3, 4)),
    ];
    let result = parse(&mut TestDriver, tokens).unwrap();
    assert_eq!(
      TestExpr::infix_op(
        TestExpr::Scalar(1),
        Kind::Power,
        TestExpr::unary_op(Kind::FunctionFactorial, TestExpr::Scalar(2)),
      ),
      result,
    );
  }

  #[test]
  fn test_dangling_operator() {
    let tokens = vec![
      Token::scalar(1, span(0, 1)),
      Token::infix_operator(plus(), span(1, 2)),
    ];
    assert!(matches!(parse(&mut TestDriver, tokens), Err(ShuntingYardError::UnexpectedEOF)));
  }

  #[test]
  fn test_adjacent_scalars() {
    let tokens = vec![
      Token::scalar(1, span(0, 1)),
      Token::scalar(2, span(2, 3)),
    ];
    assert!(matches!(parse(&mut TestDriver, tokens), Err(ShuntingYardError::UnexpectedToken(_))));
  }
}

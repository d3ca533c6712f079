
//! Recursive descent over brackets, calls and operands, with the
//! shunting yard algorithm resolving operator precedence between
//! them.

use super::error::ParseError;
use super::lexer::{FormulaLexer, Token, TokenData, NumberLiteral};
use super::options::{Dialect, ParserOptions};
use crate::ast::{Node, Kind, Family, Payload, Property, NodeError};
use crate::ast::builder;
use crate::parsing::operator::{Operator, OperatorTable, InfixProperties, PrefixProperties, PostfixProperties};
use crate::parsing::shunting_yard::{self, ShuntingYardDriver, ShuntingYardError};
use crate::parsing::source::{SourceOffset, Span};

use phf::{phf_map, phf_set};

use std::convert::Infallible;

/// Spellings of the constants and symbols that a case-sensitive
/// parse accepts. Any other capitalization is an ordinary name.
static CANONICAL_SYMBOLS: phf::Set<&'static str> = phf_set! {
  "pi", "e", "exponentiale", "true", "false", "INF", "inf", "infinity",
  "NaN", "nan", "notanumber", "avogadro", "time",
};

/// Call names which are not markup element names but which the
/// grammar accepts anyway.
static CALL_ALIASES: phf::Map<&'static str, Kind> = phf_map! {
  "log10" => Kind::FunctionLog,
  "sqrt" => Kind::FunctionRoot,
  "pow" => Kind::Power,
  "power" => Kind::Power,
  "ceil" => Kind::FunctionCeiling,
  "asin" => Kind::FunctionArcsin,
  "acos" => Kind::FunctionArccos,
  "atan" => Kind::FunctionArctan,
  "asec" => Kind::FunctionArcsec,
  "acsc" => Kind::FunctionArccsc,
  "acot" => Kind::FunctionArccot,
  "asinh" => Kind::FunctionArcsinh,
  "acosh" => Kind::FunctionArccosh,
  "atanh" => Kind::FunctionArctanh,
  "asech" => Kind::FunctionArcsech,
  "acsch" => Kind::FunctionArccsch,
  "acoth" => Kind::FunctionArccoth,
};

#[derive(Debug)]
pub struct FormulaParser<'a> {
  options: &'a ParserOptions,
  table: &'a OperatorTable,
  text: &'a str,
  tokens: Vec<Token>,
  position: usize,
}

/// A parsed operand, remembering whether it was written in
/// parentheses. Parenthesized operands never merge into an enclosing
/// n-ary operator.
#[derive(Debug, Clone)]
struct Operand {
  node: Node,
  grouped: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct FormulaDriver;

impl<'a> FormulaParser<'a> {
  pub fn new(text: &'a str, options: &'a ParserOptions, table: &'a OperatorTable) -> Result<Self, ParseError> {
    let lexer = FormulaLexer::new(table, options.dialect);
    let tokens = lexer.read_tokens(text)?;
    Ok(FormulaParser { options, table, text, tokens, position: 0 })
  }

  /// Parses the whole input as a single expression.
  pub fn parse(mut self) -> Result<Node, ParseError> {
    let node = self.parse_expression()?;
    match self.peek() {
      None => Ok(node),
      Some(token) => match closing_bracket(&token.data) {
        Some(bracket) => Err(ParseError::UnbalancedBracket { bracket, offset: token.span.start }),
        None => Err(self.unexpected(token)),
      },
    }
  }

  fn end(&self) -> SourceOffset {
    SourceOffset(self.text.len())
  }

  fn peek(&self) -> Option<&Token> {
    self.tokens.get(self.position)
  }

  fn peek_at(&self, lookahead: usize) -> Option<&Token> {
    self.tokens.get(self.position + lookahead)
  }

  fn next_token(&mut self) -> Option<Token> {
    let token = self.tokens.get(self.position).cloned();
    if token.is_some() {
      self.position += 1;
    }
    token
  }

  fn unexpected(&self, token: &Token) -> ParseError {
    let span = token.span;
    let text = span.slice(self.text)
      .map(str::to_owned)
      .unwrap_or_else(|| token.data.to_string());
    ParseError::UnexpectedToken { token: text, offset: span.start }
  }

  /// The infix word operator (such as `xor`) spelled by `name`, if
  /// there is one in this grammar.
  fn word_operator(&self, name: &str) -> Option<&Operator> {
    self.table.get(&self.options.lookup_key(name)).filter(|op| op.is_word())
  }

  /// Reads operands and operators up to the next closing bracket,
  /// comma, or the end of input.
  fn parse_expression(&mut self) -> Result<Node, ParseError> {
    let mut yard_tokens: Vec<shunting_yard::Token<Operand>> = Vec::new();
    let mut expecting_operand = true;
    while let Some(token) = self.peek().cloned() {
      if token.data.is_terminator() {
        break;
      }
      if expecting_operand {
        match &token.data {
          TokenData::Operator(op) if op.fixity().is_prefix() => {
            self.position += 1;
            yard_tokens.push(shunting_yard::Token::prefix_operator(op.clone(), token.span));
          }
          TokenData::Operator(_) => {
            return Err(self.unexpected(&token));
          }
          _ => {
            let start = token.span;
            let operand = self.parse_operand()?;
            let span = self.previous_span().map_or(start, |end| start.to(end));
            yard_tokens.push(shunting_yard::Token::scalar(operand, span));
            expecting_operand = false;
          }
        }
      } else {
        match &token.data {
          TokenData::Operator(op) if op.fixity().is_postfix() => {
            self.position += 1;
            yard_tokens.push(shunting_yard::Token::postfix_operator(op.clone(), token.span));
          }
          TokenData::Operator(op) if op.fixity().is_infix() => {
            self.position += 1;
            yard_tokens.push(shunting_yard::Token::infix_operator(op.clone(), token.span));
            expecting_operand = true;
          }
          TokenData::Identifier(name) if self.word_operator(name).is_some() => {
            // unwrap: checked by the match guard.
            let op = self.word_operator(name).unwrap().clone();
            self.position += 1;
            yard_tokens.push(shunting_yard::Token::infix_operator(op, token.span));
            expecting_operand = true;
          }
          _ => {
            return Err(self.unexpected(&token));
          }
        }
      }
    }
    if expecting_operand {
      return Err(match self.peek() {
        Some(token) => self.unexpected(token),
        None => ParseError::UnexpectedEof { offset: self.end() },
      });
    }
    shunting_yard::parse(&mut FormulaDriver, yard_tokens)
      .map(|operand| operand.node)
      .map_err(|err| self.yard_error(err))
  }

  fn previous_span(&self) -> Option<Span> {
    self.position.checked_sub(1).and_then(|i| self.tokens.get(i)).map(|t| t.span)
  }

  fn yard_error(&self, err: ShuntingYardError<Operand, Infallible>) -> ParseError {
    match err {
      ShuntingYardError::CustomError(e) => match e {},
      ShuntingYardError::UnexpectedEOF => ParseError::UnexpectedEof { offset: self.end() },
      ShuntingYardError::UnexpectedToken(token) => {
        let span = token.span();
        ParseError::UnexpectedToken {
          token: self.text.get(span.start.0..span.end.0).unwrap_or_default().to_owned(),
          offset: span.start,
        }
      }
    }
  }

  /// A single operand: a literal, a name, a call, a parenthesized
  /// expression or a vector, followed by any number of `[index]`
  /// selectors.
  fn parse_operand(&mut self) -> Result<Operand, ParseError> {
    let Some(token) = self.next_token() else {
      return Err(ParseError::UnexpectedEof { offset: self.end() });
    };
    let mut operand = match token.data {
      TokenData::Number(literal) => Operand::new(self.parse_number(literal)),
      TokenData::Identifier(name) => {
        if matches!(self.peek(), Some(Token { data: TokenData::LeftParen, .. })) {
          let open = self.next_token().map_or(token.span.start, |t| t.span.start);
          let arguments = self.parse_arguments(TokenData::RightParen, '(', open)?;
          Operand::new(self.call(&name, arguments, token.span.start)?)
        } else {
          Operand::new(self.symbol(&name))
        }
      }
      TokenData::LeftParen => {
        let node = self.parse_expression()?;
        self.expect_closing(TokenData::RightParen, '(', token.span.start)?;
        Operand::grouped(node)
      }
      TokenData::LeftBrace => {
        let elements = self.parse_arguments(TokenData::RightBrace, '{', token.span.start)?;
        Operand::new(builder::vector(elements))
      }
      _ => {
        return Err(self.unexpected(&token));
      }
    };
    while let Some(open) = self.peek().filter(|t| t.data == TokenData::LeftBracket).map(|t| t.span.start) {
      self.position += 1;
      let index = self.parse_expression()?;
      self.expect_closing(TokenData::RightBracket, '[', open)?;
      operand = if operand.node.kind() == Kind::FunctionSelector && !operand.grouped {
        let mut children = operand.node.into_children();
        children.push(index);
        Operand::new(Node::from_children(Kind::FunctionSelector, children))
      } else {
        Operand::new(builder::selector(operand.node, index))
      };
    }
    Ok(operand)
  }

  fn parse_number(&mut self, literal: NumberLiteral) -> Node {
    let mut node = match literal {
      NumberLiteral::Integer(n) => builder::integer(n),
      NumberLiteral::Real(x) => builder::real(x),
      NumberLiteral::RealE { mantissa, exponent } => builder::real_e(mantissa, exponent),
    };
    if self.options.dialect == Dialect::L3 {
      if let Some(units) = self.unit_annotation() {
        self.position += 1;
        node.set(Property::Units, units);
      }
    }
    node
  }

  /// An identifier directly after a number is that number's unit,
  /// unless it opens a call or is an operator word.
  fn unit_annotation(&self) -> Option<String> {
    let TokenData::Identifier(name) = &self.peek()?.data else {
      return None;
    };
    let opens_call = matches!(self.peek_at(1), Some(Token { data: TokenData::LeftParen, .. }));
    if opens_call || self.word_operator(name).is_some() {
      return None;
    }
    Some(name.clone())
  }

  /// Comma-separated expressions up to the given closing token. The
  /// opening token has already been consumed.
  fn parse_arguments(&mut self, closing: TokenData, open: char, open_offset: SourceOffset) -> Result<Vec<Node>, ParseError> {
    let mut arguments = Vec::new();
    if self.peek().map_or(false, |t| t.data == closing) {
      self.position += 1;
      return Ok(arguments);
    }
    loop {
      arguments.push(self.parse_expression()?);
      match self.next_token() {
        Some(Token { data: TokenData::Comma, .. }) => {}
        Some(token) if token.data == closing => return Ok(arguments),
        Some(token) => return Err(self.unexpected(&token)),
        None => return Err(ParseError::UnbalancedBracket { bracket: open, offset: open_offset }),
      }
    }
  }

  fn expect_closing(&mut self, closing: TokenData, open: char, open_offset: SourceOffset) -> Result<(), ParseError> {
    match self.next_token() {
      Some(token) if token.data == closing => Ok(()),
      Some(token) => Err(self.unexpected(&token)),
      None => Err(ParseError::UnbalancedBracket { bracket: open, offset: open_offset }),
    }
  }

  /// A bare identifier: a constant, a csymbol, or a reference to a
  /// named quantity.
  fn symbol(&self, name: &str) -> Node {
    if self.options.case_sensitive && !CANONICAL_SYMBOLS.contains(name) {
      return builder::name(name);
    }
    match name.to_lowercase().as_str() {
      "pi" => builder::constant(Kind::ConstantPi),
      "e" | "exponentiale" => builder::constant(Kind::ConstantE),
      "true" => builder::constant(Kind::ConstantTrue),
      "false" => builder::constant(Kind::ConstantFalse),
      "inf" | "infinity" => builder::real(f64::INFINITY),
      "nan" | "notanumber" => builder::real(f64::NAN),
      "avogadro" => {
        let mut node = Node::new(Kind::NameAvogadro);
        node.set(Property::Name, name);
        node
      }
      "time" => {
        let mut node = Node::new(Kind::NameTime);
        node.set(Property::Name, name);
        node
      }
      _ => builder::name(name),
    }
  }

  /// Resolves a call to a built-in kind, or to a user-defined
  /// function if the name is not built in.
  fn call(&self, name: &str, arguments: Vec<Node>, offset: SourceOffset) -> Result<Node, ParseError> {
    let invalid = |source: NodeError| ParseError::InvalidCall { name: name.to_owned(), offset, source };
    let mut key = self.options.lookup_key(name);
    if !self.options.case_sensitive && key == "rateof" {
      key = String::from("rateOf");
    }
    let kind = match key.as_str() {
      "log" if arguments.len() == 1 => Some(Kind::FunctionLn),
      "log" => Some(Kind::FunctionLog),
      "lambda" => return self.lambda(arguments).map_err(invalid),
      other => CALL_ALIASES.get(other).copied()
        .or_else(|| Kind::from_name(other).filter(|kind| is_callable(*kind))),
    };
    let Some(kind) = kind else {
      tracing::trace!(name, "call to user-defined function");
      return Ok(builder::function_call(name, arguments));
    };
    let count = arguments.len();
    let node = Node::with_children(kind, arguments).map_err(invalid)?;
    if !kind.arity().admits(count) {
      return Err(invalid(NodeError::InvalidArgument(
        format!("{} expects at least {} argument(s), got {}", key, kind.arity().min(), count),
      )));
    }
    Ok(node)
  }

  fn lambda(&self, mut arguments: Vec<Node>) -> Result<Node, NodeError> {
    let Some(body) = arguments.pop() else {
      return Err(NodeError::InvalidArgument(String::from("lambda requires a body")));
    };
    let mut node = Node::new(Kind::Lambda);
    for parameter in arguments {
      node.add_child(Node::with_children(Kind::QualifierBvar, [parameter])?)?;
    }
    node.add_child(body)?;
    Ok(node)
  }
}

/// Kinds which may be written as a function call.
fn is_callable(kind: Kind) -> bool {
  !matches!(
    kind.family(),
    Family::Number | Family::Reference | Family::Constant | Family::Qualifier | Family::Constructor | Family::Unknown
  )
}

fn closing_bracket(data: &TokenData) -> Option<char> {
  match data {
    TokenData::RightParen => Some(')'),
    TokenData::RightBrace => Some('}'),
    TokenData::RightBracket => Some(']'),
    _ => None,
  }
}

impl Operand {
  fn new(node: Node) -> Self {
    Operand { node, grouped: false }
  }

  fn grouped(node: Node) -> Self {
    Operand { node, grouped: true }
  }

  /// Whether this operand continues an n-ary chain of `kind`.
  fn extends_chain(&self, kind: Kind) -> bool {
    !self.grouped && self.node.stored_kind() == kind
  }
}

/// The negation of a numeric literal, keeping its units.
fn negate_literal(node: &Node) -> Node {
  let value = match node.value() {
    Payload::Integer(n) => Payload::Integer(-n),
    Payload::Real(x) => Payload::Real(-x),
    Payload::RealE { mantissa, exponent } => Payload::RealE { mantissa: -mantissa, exponent },
    Payload::Rational { numerator, denominator } => Payload::Rational { numerator: -numerator, denominator },
    Payload::None => Payload::None,
  };
  let mut negated = Node::number(value);
  if let Some(units) = node.units() {
    negated.set(Property::Units, units);
  }
  negated
}

/// `a % b` as `a - b * ceil(a / b)` when exactly one side is
/// negative and `a - b * floor(a / b)` otherwise.
fn modulo(a: Node, b: Node) -> Node {
  let quotient = builder::divide_by(a.clone(), b.clone());
  let truncated_up = builder::minus(
    a.clone(),
    builder::times(b.clone(), builder::unary_function(Kind::FunctionCeiling, quotient.clone())),
  );
  let truncated_down = builder::minus(
    a.clone(),
    builder::times(b.clone(), builder::unary_function(Kind::FunctionFloor, quotient)),
  );
  let signs_differ = builder::xor([builder::lt(a, 0), builder::lt(b, 0)]);
  builder::piecewise([truncated_up, signs_differ, truncated_down])
}

impl ShuntingYardDriver<Operand> for FormulaDriver {
  type Output = Operand;
  type Error = Infallible;

  fn compile_scalar(&mut self, scalar: Operand) -> Result<Operand, Infallible> {
    Ok(scalar)
  }

  fn compile_infix_op(&mut self, left: Operand, infix: &InfixProperties, right: Operand) -> Result<Operand, Infallible> {
    let kind = infix.kind();
    tracing::trace!(%kind, "reducing infix operator");
    let node = match kind {
      Kind::FunctionRem => modulo(left.node, right.node),
      Kind::Plus | Kind::Times | Kind::LogicalAnd | Kind::LogicalOr | Kind::LogicalXor if left.extends_chain(kind) => {
        let mut children = left.node.into_children();
        children.push(right.node);
        Node::from_children(kind, children)
      }
      kind if kind.is_relational() && left.extends_chain(kind) => {
        let mut children = left.node.into_children();
        children.push(right.node);
        Node::from_children(kind, children)
      }
      kind => Node::from_children(kind, vec![left.node, right.node]),
    };
    Ok(Operand::new(node))
  }

  fn compile_prefix_op(&mut self, prefix: &PrefixProperties, right: Operand) -> Result<Operand, Infallible> {
    let kind = prefix.kind();
    tracing::trace!(%kind, "reducing prefix operator");
    let node = match kind {
      Kind::Minus if !right.grouped && right.node.kind().is_number() => negate_literal(&right.node),
      Kind::Minus => builder::unary_minus(right.node),
      Kind::LogicalNot => builder::not(right.node),
      kind => Node::from_children(kind, vec![right.node]),
    };
    Ok(Operand::new(node))
  }

  fn compile_postfix_op(&mut self, left: Operand, postfix: &PostfixProperties) -> Result<Operand, Infallible> {
    let kind = postfix.kind();
    tracing::trace!(%kind, "reducing postfix operator");
    Ok(Operand::new(Node::from_children(kind, vec![left.node])))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ast::builder::*;
  use crate::ast::walker::count_kind;

  fn parse_in(text: &str, dialect: Dialect, case_sensitive: bool) -> Result<Node, ParseError> {
    let options = ParserOptions::new(dialect, case_sensitive);
    let table = OperatorTable::for_dialect(dialect);
    FormulaParser::new(text, &options, &table)?.parse()
  }

  fn parse(text: &str) -> Node {
    parse_in(text, Dialect::L3, false).unwrap()
  }

  #[test]
  fn test_precedence() {
    assert_eq!(parse("1 + 2 * x"), plus(1, times(2, name("x"))));
    assert_eq!(parse("(1 + 2) * x"), times(plus(1, 2), name("x")));
    assert_eq!(parse("2 ^ 3 ^ x"), pow(2, pow(3, name("x"))));
    assert_eq!(parse("a / b / c"), divide_by(divide_by(name("a"), name("b")), name("c")));
  }

  #[test]
  fn test_chains_flatten() {
    assert_eq!(parse("a + b + c"), Node::from_children(Kind::Plus, vec![name("a"), name("b"), name("c")]));
    assert_eq!(parse("(a + b) + c"), plus(plus(name("a"), name("b")), name("c")));
    assert_eq!(parse("a - b - c"), minus(minus(name("a"), name("b")), name("c")));
    assert_eq!(parse("a < b < c"), Node::from_children(Kind::RelationalLt, vec![name("a"), name("b"), name("c")]));
    assert_eq!(parse("a && b && c").child_count(), 3);
  }

  #[test]
  fn test_negation() {
    assert_eq!(parse("-3"), integer(-3));
    assert_eq!(parse("-2.5"), real(-2.5));
    assert_eq!(parse("-x"), unary_minus(name("x")));
    assert_eq!(parse("-(3)"), unary_minus(3));
    assert_eq!(parse("-2^2"), unary_minus(pow(2, 2)));
    assert_eq!(parse("2^-1"), pow(2, -1));
    assert_eq!(parse("-a * b"), times(unary_minus(name("a")), name("b")));
  }

  #[test]
  fn test_logical_operators() {
    assert_eq!(parse("a && b || c"), or([and([name("a"), name("b")]), name("c")]));
    assert_eq!(parse("a xor b"), xor([name("a"), name("b")]));
    assert_eq!(parse("!a"), not(name("a")));
    assert_eq!(parse("!a == b"), not(eq(name("a"), name("b"))));
    assert_eq!(parse("a >= 1 && a != 2"), and([geq(name("a"), 1), neq(name("a"), 2)]));
  }

  #[test]
  fn test_function_call_forms_match_operators() {
    assert_eq!(parse("and(x, y)"), parse("x && y"));
    assert_eq!(parse("eq(x, y)"), parse("x == y"));
    assert_eq!(parse("not(x)"), parse("!x"));
  }

  #[test]
  fn test_factorial() {
    assert_eq!(parse("n!"), unary_function(Kind::FunctionFactorial, name("n")));
    assert_eq!(parse("2^n!"), pow(2, unary_function(Kind::FunctionFactorial, name("n"))));
    assert_eq!(parse("factorial(n + 1)"), unary_function(Kind::FunctionFactorial, plus(name("n"), 1)));
  }

  #[test]
  fn test_modulo_desugars_to_piecewise() {
    let node = parse("x^8%3");
    assert_eq!(node.kind(), Kind::FunctionPiecewise);
    assert_eq!(node.child_count(), 3);
    assert_eq!(count_kind(&node, Kind::FunctionFloor), 1);
    assert_eq!(count_kind(&node, Kind::FunctionCeiling), 1);

    let node = parse("5 + 1 + 8 % 3 + 2");
    assert_eq!(node.kind(), Kind::Plus);
    assert_eq!(node.child_count(), 4);
    assert_eq!(node.get_child(2).unwrap().kind(), Kind::FunctionPiecewise);
  }

  #[test]
  fn test_logarithms_and_roots() {
    assert_eq!(parse("log(x)").kind(), Kind::FunctionLn);
    assert_eq!(parse("ln(x)").kind(), Kind::FunctionLn);
    assert_eq!(parse("log10(x)"), log(name("x")));
    assert_eq!(parse("log(2, x)"), log_base(2, name("x")));
    assert_eq!(parse("sqrt(x)"), sqrt(name("x")));
    assert_eq!(parse("root(3, x)"), root(3, name("x")));
    assert_eq!(parse("pow(x, 2)"), pow(name("x"), 2));
    assert_eq!(parse("ceil(x)"), unary_function(Kind::FunctionCeiling, name("x")));
  }

  #[test]
  fn test_case_insensitive_builtins() {
    for text in ["Cos(x)", "COS(x)", "coS(x)", "cos(x)"] {
      assert_eq!(parse(text), unary_function(Kind::FunctionCos, name("x")));
    }
    assert_eq!(parse("PI"), constant(Kind::ConstantPi));
    assert_eq!(parse("RateOf(x)").kind(), Kind::FunctionRateOf);
  }

  #[test]
  fn test_case_sensitive_builtins() {
    let node = parse_in("Cos(x)", Dialect::L3, true).unwrap();
    assert_eq!(node, function_call("Cos", [name("x")]));
    let node = parse_in("cos(x)", Dialect::L3, true).unwrap();
    assert_eq!(node.kind(), Kind::FunctionCos);
    assert_eq!(parse_in("Pi", Dialect::L3, true).unwrap(), name("Pi"));
    assert_eq!(parse_in("INF", Dialect::L3, true).unwrap(), real(f64::INFINITY));
  }

  #[test]
  fn test_constants_and_symbols() {
    assert_eq!(parse("exponentiale"), constant(Kind::ConstantE));
    assert_eq!(parse("true"), constant(Kind::ConstantTrue));
    assert_eq!(parse("-INF"), real(f64::NEG_INFINITY));
    assert!(parse("NaN").number_value().unwrap().is_nan());
    let node = parse("time");
    assert_eq!(node.kind(), Kind::NameTime);
    assert_eq!(node.name(), Some("time"));
    assert_eq!(parse("avogadro").kind(), Kind::NameAvogadro);
  }

  #[test]
  fn test_numbers_with_units() {
    assert_eq!(parse("5 mole"), with_units(integer(5), "mole"));
    assert_eq!(parse("1.5e3 metre + x"), plus(with_units(real_e(1.5, 3), "metre"), name("x")));
    assert_eq!(parse("-5 mole"), with_units(integer(-5), "mole"));
    assert_eq!(parse("5 xor x"), xor([integer(5), name("x")]));
    assert!(parse_in("5 mole", Dialect::L1, false).is_err());
  }

  #[test]
  fn test_calls() {
    assert_eq!(parse("f(x, 1)"), function_call("f", [name("x"), integer(1)]));
    assert_eq!(parse("g()"), function_call("g", []));
    assert_eq!(parse("delay(x, 2)"), delay(name("x"), 2));
    assert_eq!(parse("lambda(x, y, x + y)"), lambda(["x", "y"], plus(name("x"), name("y"))));
    assert_eq!(parse("max(a, b, c)").child_count(), 3);
    assert_eq!(
      parse("piecewise(1, x > 0, 2)"),
      piecewise([integer(1), gt(name("x"), 0), integer(2)]),
    );
  }

  #[test]
  fn test_vectors_and_selectors() {
    assert_eq!(parse("{1, 2, x}"), vector([integer(1), integer(2), name("x")]));
    assert_eq!(parse("{}"), vector([]));
    assert_eq!(parse("v[1]"), selector(name("v"), 1));
    assert_eq!(
      parse("m[1][2]"),
      Node::from_children(Kind::FunctionSelector, vec![name("m"), integer(1), integer(2)]),
    );
  }

  #[test]
  fn test_invalid_calls() {
    assert!(matches!(
      parse_in("cos(x, y)", Dialect::L3, false),
      Err(ParseError::InvalidCall { source: NodeError::ChildBoundsExceeded { .. }, .. }),
    ));
    assert!(matches!(
      parse_in("cos()", Dialect::L3, false),
      Err(ParseError::InvalidCall { source: NodeError::InvalidArgument(_), .. }),
    ));
    assert!(matches!(
      parse_in("lambda(a + b, x)", Dialect::L3, false),
      Err(ParseError::InvalidCall { source: NodeError::InvalidKind { .. }, .. }),
    ));
    assert!(parse_in("lambda(1, x)", Dialect::L3, false).is_ok());
  }

  #[test]
  fn test_malformed_input() {
    assert_eq!(
      parse_in("(1 + 2", Dialect::L3, false),
      Err(ParseError::UnbalancedBracket { bracket: '(', offset: SourceOffset(0) }),
    );
    assert_eq!(
      parse_in("1 + 2)", Dialect::L3, false),
      Err(ParseError::UnbalancedBracket { bracket: ')', offset: SourceOffset(5) }),
    );
    assert_eq!(
      parse_in("1 +", Dialect::L3, false),
      Err(ParseError::UnexpectedEof { offset: SourceOffset(3) }),
    );
    assert_eq!(
      parse_in("", Dialect::L3, false),
      Err(ParseError::UnexpectedEof { offset: SourceOffset(0) }),
    );
    assert_eq!(
      parse_in("1 2", Dialect::L3, false),
      Err(ParseError::UnexpectedToken { token: String::from("2"), offset: SourceOffset(2) }),
    );
    assert_eq!(
      parse_in("* 2", Dialect::L3, false),
      Err(ParseError::UnexpectedToken { token: String::from("*"), offset: SourceOffset(0) }),
    );
    assert_eq!(
      parse_in("f(1, 2", Dialect::L3, false),
      Err(ParseError::UnbalancedBracket { bracket: '(', offset: SourceOffset(1) }),
    );
  }

  #[test]
  fn test_legacy_dialect() {
    assert_eq!(parse_in("a < b", Dialect::L1, false).unwrap(), lt(name("a"), name("b")));
    assert_eq!(parse_in("and(a, b)", Dialect::L1, false).unwrap(), and([name("a"), name("b")]));
    assert!(matches!(
      parse_in("a == b", Dialect::L1, false),
      Err(ParseError::UnsupportedOperator { .. }),
    ));
    assert!(matches!(
      parse_in("n!", Dialect::L1, false),
      Err(ParseError::UnsupportedOperator { .. }),
    ));
  }
}

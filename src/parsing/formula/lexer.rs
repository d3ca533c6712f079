
use super::error::ParseError;
use super::options::Dialect;
use crate::parsing::operator::{Operator, OperatorTable};
use crate::parsing::source::Span;
use crate::parsing::tokenizer::TokenizerState;
use crate::util::regex_opt_with;

use regex::Regex;
use once_cell::sync::Lazy;

use std::fmt::{self, Display, Formatter};

#[derive(Clone, Debug)]
pub struct FormulaLexer<'a> {
  operator_table: &'a OperatorTable,
  operator_regex: Regex,
  dialect: Dialect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
  pub data: TokenData,
  pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenData {
  Number(NumberLiteral),
  Identifier(String),
  Operator(Operator),
  LeftParen,
  RightParen,
  LeftBrace,
  RightBrace,
  LeftBracket,
  RightBracket,
  Comma,
}

/// A numeric literal, classified by how it was written.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberLiteral {
  Integer(i64),
  Real(f64),
  RealE { mantissa: f64, exponent: i64 },
}

static EXTENDED_OPERATOR_REGEX: Lazy<Regex> = Lazy::new(|| {
  let table = OperatorTable::extended_operators();
  regex_opt_with(table.punctuation_symbols(), |s| format!("^{s}"))
});

impl<'a> FormulaLexer<'a> {
  pub fn new(operator_table: &'a OperatorTable, dialect: Dialect) -> Self {
    let operator_regex = regex_opt_with(operator_table.punctuation_symbols(), |s| format!("^{s}"));
    Self { operator_table, operator_regex, dialect }
  }

  pub fn read_tokens(&self, input: &str) -> Result<Vec<Token>, ParseError> {
    let mut state = TokenizerState::new(input);
    let mut tokens = Vec::new();
    loop {
      state.consume_spaces();
      if state.is_eof() {
        return Ok(tokens);
      }
      tokens.push(self.read_one_token(&mut state)?);
    }
  }

  pub fn read_one_token(&self, state: &mut TokenizerState<'_>) -> Result<Token, ParseError> {
    if let Some(tok) = self.read_char_token(state) {
      Ok(tok)
    } else if let Some(res) = self.read_number_literal(state) {
      res
    } else if let Some(tok) = self.read_identifier(state) {
      Ok(tok)
    } else if let Some(tok) = self.read_operator(state) {
      Ok(tok)
    } else if let Some(m) = state.read_regex(&EXTENDED_OPERATOR_REGEX) {
      Err(ParseError::UnsupportedOperator {
        operator: m.as_str().to_owned(),
        dialect: self.dialect,
        offset: m.start(),
      })
    } else {
      let offset = state.current_pos();
      match state.peek() {
        None => Err(ParseError::UnexpectedEof { offset }),
        Some(character) => Err(ParseError::UnexpectedCharacter { character, offset }),
      }
    }
  }

  fn read_char_token(&self, state: &mut TokenizerState<'_>) -> Option<Token> {
    let data = match state.peek()? {
      '(' => TokenData::LeftParen,
      ')' => TokenData::RightParen,
      '{' => TokenData::LeftBrace,
      '}' => TokenData::RightBrace,
      '[' => TokenData::LeftBracket,
      ']' => TokenData::RightBracket,
      ',' => TokenData::Comma,
      _ => return None,
    };
    let m = state.advance_char()?;
    Some(Token::new(data, m.span()))
  }

  fn read_identifier(&self, state: &mut TokenizerState<'_>) -> Option<Token> {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").unwrap());
    state.read_regex(&RE).map(|m| {
      Token::new(TokenData::Identifier(m.as_str().to_owned()), m.span())
    })
  }

  fn read_operator(&self, state: &mut TokenizerState<'_>) -> Option<Token> {
    let m = state.read_regex(&self.operator_regex)?;
    // unwrap: the regex only matches symbols from the table.
    let operator = self.operator_table.get(m.as_str()).unwrap();
    Some(Token::new(TokenData::Operator(operator.clone()), m.span()))
  }

  fn read_number_literal(&self, state: &mut TokenizerState<'_>) -> Option<Result<Token, ParseError>> {
    static RE: Lazy<Regex> = Lazy::new(|| {
      Regex::new(r"^([0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE]([+-]?[0-9]+))?").unwrap()
    });
    let m = state.read_regex_with_captures(&RE)?;
    let invalid = || ParseError::InvalidNumber { text: m.as_str().to_owned(), offset: m.span().start };
    // unwrap: group 1 is not optional.
    let mantissa = m.get(1).unwrap();
    let literal = match m.get(2) {
      Some(exponent) => {
        let exponent = exponent.parse::<i64>().map_err(|_| invalid());
        let mantissa = mantissa.parse::<f64>().map_err(|_| invalid());
        mantissa.and_then(|mantissa| exponent.map(|exponent| NumberLiteral::RealE { mantissa, exponent }))
      }
      None if mantissa.contains('.') => {
        mantissa.parse::<f64>().map(NumberLiteral::Real).map_err(|_| invalid())
      }
      None => {
        // Integers too large for the node payload fall back to reals.
        mantissa.parse::<i64>().map(NumberLiteral::Integer)
          .or_else(|_| mantissa.parse::<f64>().map(NumberLiteral::Real))
          .map_err(|_| invalid())
      }
    };
    Some(literal.map(|literal| Token::new(TokenData::Number(literal), m.span())))
  }
}

impl Token {
  pub fn new(data: TokenData, span: Span) -> Self {
    Self { data, span }
  }
}

impl TokenData {
  /// Tokens which end an expression without being part of it.
  pub fn is_terminator(&self) -> bool {
    matches!(
      self,
      TokenData::RightParen | TokenData::RightBrace | TokenData::RightBracket | TokenData::Comma
    )
  }
}

impl Display for TokenData {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      TokenData::Number(NumberLiteral::Integer(n)) => write!(f, "{n}"),
      TokenData::Number(NumberLiteral::Real(x)) => write!(f, "{x}"),
      TokenData::Number(NumberLiteral::RealE { mantissa, exponent }) => write!(f, "{mantissa}e{exponent}"),
      TokenData::Identifier(name) => write!(f, "{name}"),
      TokenData::Operator(op) => write!(f, "{}", op.symbol()),
      TokenData::LeftParen => write!(f, "("),
      TokenData::RightParen => write!(f, ")"),
      TokenData::LeftBrace => write!(f, "{{"),
      TokenData::RightBrace => write!(f, "}}"),
      TokenData::LeftBracket => write!(f, "["),
      TokenData::RightBracket => write!(f, "]"),
      TokenData::Comma => write!(f, ","),
    }
  }
}

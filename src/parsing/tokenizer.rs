
//! A cursor over formula text, with regex-driven reads.

use super::source::{SourceOffset, Span};

use regex::{Regex, Captures};
use once_cell::sync::Lazy;

#[derive(Debug, Clone)]
pub struct TokenizerState<'a> {
  input: &'a str,
  position: SourceOffset,
}

#[derive(Debug, Clone)]
pub struct TokenizerMatch<'a> {
  matched_str: &'a str,
  span: Span,
}

#[derive(Debug)]
pub struct TokenizerCaptures<'a> {
  captures: Captures<'a>,
  span: Span,
}

impl<'a> TokenizerState<'a> {
  pub fn new(input: &'a str) -> Self {
    Self {
      input,
      position: SourceOffset(0),
    }
  }

  /// The unread portion of the input.
  pub fn rest(&self) -> &'a str {
    &self.input[self.position.0..]
  }

  pub fn is_eof(&self) -> bool {
    self.rest().is_empty()
  }

  pub fn peek(&self) -> Option<char> {
    self.rest().chars().next()
  }

  pub fn current_pos(&self) -> SourceOffset {
    self.position
  }

  /// Advances past the next `amount` bytes, stopping at the end of
  /// the input, and returns the skipped text.
  pub fn advance(&mut self, amount: usize) -> TokenizerMatch<'a> {
    let rest = self.rest();
    let amount = amount.min(rest.len());
    let start = self.position;
    self.position += amount;
    TokenizerMatch {
      matched_str: &rest[..amount],
      span: Span::new(start, self.position),
    }
  }

  /// Advances past the next character, if there is one.
  pub fn advance_char(&mut self) -> Option<TokenizerMatch<'a>> {
    let ch = self.peek()?;
    Some(self.advance(ch.len_utf8()))
  }

  pub fn read_literal(&mut self, literal: &str) -> Option<TokenizerMatch<'a>> {
    self.rest().starts_with(literal).then(|| self.advance(literal.len()))
  }

  /// If the input at the current position matches the given regex,
  /// returns the matched string and advances past it.
  ///
  /// The regex MUST be anchored at the start of the input.
  pub fn read_regex(&mut self, regex: &Regex) -> Option<TokenizerMatch<'a>> {
    let m = regex.find(self.rest())?;
    debug_assert_eq!(m.start(), 0, "Regex must be anchored at the start of the input");
    Some(self.advance(m.len()))
  }

  pub fn read_regex_with_captures(&mut self, regex: &Regex) -> Option<TokenizerCaptures<'a>> {
    let captures = regex.captures(self.rest())?;
    // unwrap: capture group 0 always exists on a successful match.
    let len = captures.get(0).unwrap().len();
    let span = self.advance(len).span();
    Some(TokenizerCaptures { captures, span })
  }

  pub fn consume_spaces(&mut self) {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*").unwrap());
    self.read_regex(&RE);
  }
}

impl<'h> TokenizerMatch<'h> {
  pub fn as_str(&self) -> &'h str {
    self.matched_str
  }

  pub fn start(&self) -> SourceOffset {
    self.span.start
  }

  pub fn span(&self) -> Span {
    self.span
  }
}

impl<'h> TokenizerCaptures<'h> {
  pub fn as_str(&self) -> &'h str {
    // unwrap: capture group 0 always exists on a successful match.
    self.captures.get(0).unwrap().as_str()
  }

  pub fn get(&self, i: usize) -> Option<&'h str> {
    self.captures.get(i).map(|m| m.as_str())
  }

  pub fn span(&self) -> Span {
    self.span
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_advance_stops_at_end() {
    let mut state = TokenizerState::new("x+1");
    let m = state.advance(2);
    assert_eq!(m.as_str(), "x+");
    assert_eq!(m.span(), Span::new(SourceOffset(0), SourceOffset(2)));
    let m = state.advance(99);
    assert_eq!(m.as_str(), "1");
    assert!(state.is_eof());
    assert_eq!(state.advance(1).as_str(), "");
  }

  #[test]
  fn test_read_literal() {
    let mut state = TokenizerState::new("&&y");
    assert!(state.read_literal("||").is_none());
    assert_eq!(state.current_pos(), SourceOffset(0));
    let m = state.read_literal("&&").unwrap();
    assert_eq!(m.start(), SourceOffset(0));
    assert_eq!(state.rest(), "y");
  }

  #[test]
  fn test_read_regex() {
    let re = Regex::new(r"^[a-z]+").unwrap();
    let mut state = TokenizerState::new("cos(x)");
    assert_eq!(state.read_regex(&re).unwrap().as_str(), "cos");
    assert!(state.read_regex(&re).is_none());
    assert_eq!(state.peek(), Some('('));
  }

  #[test]
  fn test_read_regex_with_captures() {
    let re = Regex::new(r"^([0-9]+)(?:[eE]([+-]?[0-9]+))?").unwrap();
    let mut state = TokenizerState::new("15e-3*x");
    let m = state.read_regex_with_captures(&re).unwrap();
    assert_eq!(m.as_str(), "15e-3");
    assert_eq!(m.get(1), Some("15"));
    assert_eq!(m.get(2), Some("-3"));
    assert_eq!(m.span(), Span::new(SourceOffset(0), SourceOffset(5)));
    assert_eq!(state.rest(), "*x");

    let mut state = TokenizerState::new("x");
    assert!(state.read_regex_with_captures(&re).is_none());
    assert_eq!(state.current_pos(), SourceOffset(0));
  }

  #[test]
  fn test_consume_spaces() {
    let mut state = TokenizerState::new("  a  b");
    state.consume_spaces();
    assert_eq!(state.current_pos(), SourceOffset(2));
    state.consume_spaces();
    assert_eq!(state.current_pos(), SourceOffset(2));
  }

  #[test]
  fn test_advance_char_multibyte() {
    let mut state = TokenizerState::new("µx");
    let m = state.advance_char().unwrap();
    assert_eq!(m.as_str(), "µ");
    assert_eq!(state.peek(), Some('x'));
  }
}

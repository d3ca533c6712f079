
//! Byte positions within formula text, for error reporting.

use std::fmt::{self, Display, Formatter};
use std::ops::AddAssign;

/// A byte offset into the formula being parsed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceOffset(pub usize);

/// A half-open range of offsets, `start` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
  pub start: SourceOffset,
  pub end: SourceOffset,
}

impl Span {
  pub fn new(start: SourceOffset, end: SourceOffset) -> Self {
    Self { start, end }
  }

  /// The smallest span covering both `self` and `other`.
  pub fn to(self, other: Span) -> Span {
    Span::new(self.start.min(other.start), self.end.max(other.end))
  }

  /// The text under this span, if it lies on character boundaries of
  /// `text`.
  pub fn slice(self, text: &str) -> Option<&str> {
    text.get(self.start.0..self.end.0)
  }
}

impl AddAssign<usize> for SourceOffset {
  fn add_assign(&mut self, rhs: usize) {
    self.0 += rhs
  }
}

impl Display for SourceOffset {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_span_to() {
    let a = Span::new(SourceOffset(2), SourceOffset(4));
    let b = Span::new(SourceOffset(6), SourceOffset(9));
    assert_eq!(a.to(b), Span::new(SourceOffset(2), SourceOffset(9)));
    assert_eq!(b.to(a), a.to(b));
  }

  #[test]
  fn test_span_slice() {
    let span = Span::new(SourceOffset(2), SourceOffset(5));
    assert_eq!(span.slice("a+bcd*e"), Some("bcd"));
    assert_eq!(span.slice("ab"), None);
  }
}


use super::options::Dialect;
use crate::ast::NodeError;
use crate::parsing::source::SourceOffset;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ParseError {
  #[error("unexpected character '{character}' at {offset}")]
  UnexpectedCharacter { character: char, offset: SourceOffset },
  #[error("unexpected '{token}' at {offset}")]
  UnexpectedToken { token: String, offset: SourceOffset },
  #[error("unexpected end of input at {offset}")]
  UnexpectedEof { offset: SourceOffset },
  #[error("unbalanced '{bracket}' at {offset}")]
  UnbalancedBracket { bracket: char, offset: SourceOffset },
  #[error("invalid number '{text}' at {offset}")]
  InvalidNumber { text: String, offset: SourceOffset },
  #[error("'{operator}' is not part of the {dialect} grammar, at {offset}")]
  UnsupportedOperator { operator: String, dialect: Dialect, offset: SourceOffset },
  #[error("invalid call to '{name}' at {offset}: {source}")]
  InvalidCall { name: String, offset: SourceOffset, #[source] source: NodeError },
}

impl ParseError {
  /// The position in the input at which the error was detected.
  pub fn offset(&self) -> SourceOffset {
    match self {
      ParseError::UnexpectedCharacter { offset, .. } |
      ParseError::UnexpectedToken { offset, .. } |
      ParseError::UnexpectedEof { offset } |
      ParseError::UnbalancedBracket { offset, .. } |
      ParseError::InvalidNumber { offset, .. } |
      ParseError::UnsupportedOperator { offset, .. } |
      ParseError::InvalidCall { offset, .. } => *offset,
    }
  }
}

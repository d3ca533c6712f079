
use crate::ast::NodeError;
use crate::compiler::CompileError;
use crate::parsing::ParseError;
use crate::units::UnitError;

use thiserror::Error;

/// Any error raised by this crate, for callers that chain parsing,
/// rendering, and unit inference with `?`.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum Error {
  #[error("{0}")]
  Node(#[from] NodeError),
  #[error("{0}")]
  Parse(#[from] ParseError),
  #[error("{0}")]
  Compile(#[from] CompileError),
  #[error("{0}")]
  Unit(#[from] UnitError),
}

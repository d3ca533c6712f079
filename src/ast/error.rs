
use super::kind::Kind;

use thiserror::Error;

use std::fmt::{self, Display, Formatter};

/// The optional string-valued attributes a node can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
  Name,
  Units,
  DefinitionUrl,
  Encoding,
  Id,
  Style,
  Class,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum NodeError {
  #[error("{kind} accepts at most {max} children")]
  ChildBoundsExceeded { kind: Kind, max: usize },
  #[error("child index {index} out of bounds for {kind} with {count} children")]
  IndexOutOfBounds { kind: Kind, index: usize, count: usize },
  #[error("{requested} is not an allowable kind for {context}")]
  InvalidKind { requested: Kind, context: Kind },
  #[error("cannot attach an absent child to {0}")]
  NullChild(Kind),
  #[error("property '{property}' is not set on {kind}")]
  PropertyUndefined { property: Property, kind: Kind },
  #[error("invalid argument: {0}")]
  InvalidArgument(String),
}

impl Property {
  pub fn as_str(self) -> &'static str {
    match self {
      Property::Name => "name",
      Property::Units => "units",
      Property::DefinitionUrl => "definitionURL",
      Property::Encoding => "encoding",
      Property::Id => "id",
      Property::Style => "style",
      Property::Class => "class",
    }
  }
}

impl Display for Property {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

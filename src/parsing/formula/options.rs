
use serde::{Serialize, Deserialize};

use std::fmt::{self, Display, Formatter};

/// The infix grammar to accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Dialect {
  /// The legacy grammar: arithmetic, `^`, `<` and `>`, with every
  /// other operation written as a function call.
  L1,
  /// The extended grammar, which adds `&&`, `||`, `!`, `==`, `!=`,
  /// `>=`, `<=`, `%`, postfix factorial, and units on numbers.
  #[default]
  L3,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
  pub dialect: Dialect,
  /// When false, built-in function and constant names are recognized
  /// in any case.
  pub case_sensitive: bool,
}

impl ParserOptions {
  pub fn new(dialect: Dialect, case_sensitive: bool) -> ParserOptions {
    ParserOptions { dialect, case_sensitive }
  }

  /// Normalizes a name for lookup in the built-in tables.
  pub(super) fn lookup_key(&self, name: &str) -> String {
    if self.case_sensitive {
      name.to_owned()
    } else {
      name.to_lowercase()
    }
  }
}

impl Default for ParserOptions {
  fn default() -> ParserOptions {
    ParserOptions {
      dialect: Dialect::L3,
      case_sensitive: false,
    }
  }
}

impl Display for Dialect {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      Dialect::L1 => write!(f, "L1"),
      Dialect::L3 => write!(f, "L3"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let options = ParserOptions::default();
    assert_eq!(options.dialect, Dialect::L3);
    assert!(!options.case_sensitive);
  }

  #[test]
  fn test_deserialize_partial() {
    let options: ParserOptions = serde_json::from_str(r#"{"dialect": "L1"}"#).unwrap();
    assert_eq!(options, ParserOptions::new(Dialect::L1, false));
  }

  #[test]
  fn test_lookup_key() {
    assert_eq!(ParserOptions::new(Dialect::L3, false).lookup_key("CoS"), "cos");
    assert_eq!(ParserOptions::new(Dialect::L3, true).lookup_key("CoS"), "CoS");
  }
}


/// How an infix operator groups with further applications of itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Associativity {
  /// `a - b - c` is `(a - b) - c`.
  Left,
  /// `a ^ b ^ c` is `a ^ (b ^ c)`.
  Right,
  /// Chains must be bracketed.
  Neither,
  /// Either grouping means the same thing, as for `+`.
  Both,
}

/// Binding strength of an operator. Higher values bind more tightly.
///
/// Levels are spaced ten apart, so that one side of a
/// non-associative operand position can sit one step above the
/// operator's own level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Precedence(u64);

impl Associativity {
  pub const fn is_left_assoc(self) -> bool {
    matches!(self, Associativity::Left | Associativity::Both)
  }

  pub const fn is_right_assoc(self) -> bool {
    matches!(self, Associativity::Right | Associativity::Both)
  }
}

impl Precedence {
  /// Precedence level `n` of the operator table.
  pub const fn new(n: u64) -> Precedence {
    Precedence(n * 10)
  }

  pub const fn from_raw(n: u64) -> Precedence {
    Precedence(n)
  }

  /// The level just above this one, for the side of an operator that
  /// does not associate.
  pub fn incremented(self) -> Precedence {
    Precedence(self.0 + 1)
  }
}

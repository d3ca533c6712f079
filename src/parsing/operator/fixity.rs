
//! Fixity declarations for operators.

use super::binding::{Associativity, Precedence};
use crate::ast::Kind;

use bitflags::bitflags;

/// An operator can be infix, prefix, postfix, or any combination
/// thereof. An operator will always be at least one of prefix,
/// postfix, or infix. Each fixity records the kind of node the
/// operator builds when used that way.
#[derive(Clone, Debug, PartialEq, Eq, Copy)]
pub struct Fixity {
  as_prefix: Option<PrefixProperties>,
  as_infix: Option<InfixProperties>,
  as_postfix: Option<PostfixProperties>,
}

#[derive(Clone, Debug, PartialEq, Eq, Copy)]
pub struct PrefixProperties {
  kind: Kind,
  prec: Precedence,
}

/// Unlike prefix and postfix operators, infix operators have both
/// associativity and precedence.
#[derive(Clone, Debug, PartialEq, Eq, Copy)]
pub struct InfixProperties {
  kind: Kind,
  assoc: Associativity,
  prec: Precedence,
}

#[derive(Clone, Debug, PartialEq, Eq, Copy)]
pub struct PostfixProperties {
  kind: Kind,
  prec: Precedence,
}

/// The position an operator was used in.
#[derive(Clone, Debug, PartialEq, Eq, Copy, Hash)]
pub enum FixityType {
  Prefix,
  Infix,
  Postfix,
}

bitflags! {
  #[derive(Clone, Copy, Debug, PartialEq, Eq)]
  pub struct FixityTypes: u8 {
    const PREFIX  = 0b0001;
    const INFIX   = 0b0010;
    const POSTFIX = 0b0100;
  }
}

/// The type of an "empty" fixity structure. This is an intermediate
/// type which is only used during building of a [`Fixity`]. This type
/// is used to guarantee the precondition that a `Fixity` structure
/// always has at least one valid fixity type (prefix, infix, or
/// postfix).
#[derive(Debug)]
pub struct EmptyFixity {
  data: Fixity,
}

impl Fixity {
  // allow: EmptyFixity is conceptually a Fixity, just with some
  // typechecks. It's intended to be used in a fluent builder style.
  #[allow(clippy::new_ret_no_self)]
  pub fn new() -> EmptyFixity {
    EmptyFixity {
      data: Fixity {
        as_prefix: None,
        as_infix: None,
        as_postfix: None,
      },
    }
  }

  pub fn with_prefix(mut self, kind: Kind, prec: Precedence) -> Fixity {
    self.as_prefix = Some(PrefixProperties { kind, prec });
    self
  }

  pub fn with_infix(mut self, kind: Kind, assoc: Associativity, prec: Precedence) -> Fixity {
    self.as_infix = Some(InfixProperties { kind, assoc, prec });
    self
  }

  pub fn with_postfix(mut self, kind: Kind, prec: Precedence) -> Fixity {
    self.as_postfix = Some(PostfixProperties { kind, prec });
    self
  }

  pub fn as_prefix(&self) -> Option<&PrefixProperties> {
    self.as_prefix.as_ref()
  }

  pub fn as_infix(&self) -> Option<&InfixProperties> {
    self.as_infix.as_ref()
  }

  pub fn as_postfix(&self) -> Option<&PostfixProperties> {
    self.as_postfix.as_ref()
  }

  pub fn is_prefix(&self) -> bool {
    self.as_prefix.is_some()
  }

  pub fn is_infix(&self) -> bool {
    self.as_infix.is_some()
  }

  pub fn is_postfix(&self) -> bool {
    self.as_postfix.is_some()
  }

  /// The precedence of this operator when used in the given position.
  pub fn precedence(&self, fixity_type: FixityType) -> Option<Precedence> {
    match fixity_type {
      FixityType::Prefix => self.as_prefix.map(|p| p.prec),
      FixityType::Infix => self.as_infix.map(|p| p.prec),
      FixityType::Postfix => self.as_postfix.map(|p| p.prec),
    }
  }

  pub fn fixity_types(&self) -> FixityTypes {
    let mut t = FixityTypes::empty();
    if self.as_prefix.is_some() {
      t |= FixityTypes::PREFIX;
    }
    if self.as_infix.is_some() {
      t |= FixityTypes::INFIX;
    }
    if self.as_postfix.is_some() {
      t |= FixityTypes::POSTFIX;
    }
    t
  }
}

impl EmptyFixity {
  pub fn with_prefix(self, kind: Kind, prec: Precedence) -> Fixity {
    self.data.with_prefix(kind, prec)
  }

  pub fn with_infix(self, kind: Kind, assoc: Associativity, prec: Precedence) -> Fixity {
    self.data.with_infix(kind, assoc, prec)
  }

  pub fn with_postfix(self, kind: Kind, prec: Precedence) -> Fixity {
    self.data.with_postfix(kind, prec)
  }
}

impl PrefixProperties {
  pub fn kind(&self) -> Kind {
    self.kind
  }

  pub fn precedence(&self) -> Precedence {
    self.prec
  }
}

impl InfixProperties {
  pub fn kind(&self) -> Kind {
    self.kind
  }

  pub fn associativity(&self) -> Associativity {
    self.assoc
  }

  pub fn precedence(&self) -> Precedence {
    self.prec
  }

  /// The precedence an operand must have to appear on the left of
  /// this operator without parentheses.
  pub fn left_precedence(&self) -> Precedence {
    if self.assoc.is_left_assoc() { self.prec } else { self.prec.incremented() }
  }

  /// The precedence an operand must have to appear on the right of
  /// this operator without parentheses.
  pub fn right_precedence(&self) -> Precedence {
    if self.assoc.is_right_assoc() { self.prec } else { self.prec.incremented() }
  }
}

impl PostfixProperties {
  pub fn kind(&self) -> Kind {
    self.kind
  }

  pub fn precedence(&self) -> Precedence {
    self.prec
  }
}

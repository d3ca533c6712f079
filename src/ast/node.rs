
use super::kind::{Kind, Family, Arity};
use super::error::{NodeError, Property};

use num::rational::Ratio;

use std::f64::consts::{E, PI};

/// The family-specific value carried by a node. Only numeric
/// literals carry anything other than `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payload {
  None,
  Integer(i64),
  Real(f64),
  RealE { mantissa: f64, exponent: i64 },
  Rational { numerator: i64, denominator: i64 },
}

/// The optional string attributes of a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Attributes {
  name: Option<String>,
  units: Option<String>,
  definition_url: Option<String>,
  encoding: Option<String>,
  id: Option<String>,
  style: Option<String>,
  class: Option<String>,
}

/// A node in a mathematical expression tree.
///
/// A node owns its children outright. There is no pointer back to
/// the parent; upward queries go through a [`NodePath`](super::NodePath)
/// from the root instead.
///
/// Nodes are *strict* by default, meaning that every mutation checks
/// the arity contract of the node's kind and fails rather than
/// exceeding it. A non-strict node accepts any number of children.
#[derive(Debug, Clone)]
pub struct Node {
  kind: Kind,
  value: Payload,
  attributes: Attributes,
  strict: bool,
  children: Vec<Node>,
}

/// The branches of a piecewise node, normalized from either of the
/// two accepted layouts.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseParts<'a> {
  pub pieces: Vec<(&'a Node, &'a Node)>,
  pub otherwise: Option<&'a Node>,
}

impl Payload {
  pub fn default_for(kind: Kind) -> Payload {
    match kind {
      Kind::Integer => Payload::Integer(0),
      Kind::Real => Payload::Real(0.0),
      Kind::RealE => Payload::RealE { mantissa: 0.0, exponent: 0 },
      Kind::Rational => Payload::Rational { numerator: 0, denominator: 1 },
      _ => Payload::None,
    }
  }

  pub fn to_f64(self) -> Option<f64> {
    match self {
      Payload::None => None,
      Payload::Integer(n) => Some(n as f64),
      Payload::Real(x) => Some(x),
      Payload::RealE { mantissa, exponent } => Some(mantissa * 10f64.powi(exponent as i32)),
      Payload::Rational { numerator, denominator } => Some(numerator as f64 / denominator as f64),
    }
  }

  /// The kind of numeric literal this payload belongs to.
  pub fn kind(self) -> Option<Kind> {
    match self {
      Payload::None => None,
      Payload::Integer(_) => Some(Kind::Integer),
      Payload::Real(_) => Some(Kind::Real),
      Payload::RealE { .. } => Some(Kind::RealE),
      Payload::Rational { .. } => Some(Kind::Rational),
    }
  }

  /// Converts this payload to the representation used by `kind`. The
  /// conversion may lose precision (a real truncates to an integer).
  fn convert_to(self, kind: Kind) -> Payload {
    let Some(value) = self.to_f64() else {
      return Payload::default_for(kind);
    };
    match kind {
      Kind::Integer => Payload::Integer(value as i64),
      Kind::Real => Payload::Real(value),
      Kind::RealE => {
        if value == 0.0 || !value.is_finite() {
          Payload::RealE { mantissa: value, exponent: 0 }
        } else {
          let exponent = value.abs().log10().floor() as i64;
          Payload::RealE { mantissa: value / 10f64.powi(exponent as i32), exponent }
        }
      }
      Kind::Rational => match self {
        Payload::Rational { .. } => self,
        Payload::Integer(n) => Payload::Rational { numerator: n, denominator: 1 },
        _ => {
          let ratio = Ratio::<i64>::approximate_float(value).unwrap_or_else(|| Ratio::from_integer(0));
          Payload::Rational { numerator: *ratio.numer(), denominator: *ratio.denom() }
        }
      },
      _ => Payload::None,
    }
  }
}

impl Attributes {
  fn get(&self, property: Property) -> &Option<String> {
    match property {
      Property::Name => &self.name,
      Property::Units => &self.units,
      Property::DefinitionUrl => &self.definition_url,
      Property::Encoding => &self.encoding,
      Property::Id => &self.id,
      Property::Style => &self.style,
      Property::Class => &self.class,
    }
  }

  fn get_mut(&mut self, property: Property) -> &mut Option<String> {
    match property {
      Property::Name => &mut self.name,
      Property::Units => &mut self.units,
      Property::DefinitionUrl => &mut self.definition_url,
      Property::Encoding => &mut self.encoding,
      Property::Id => &mut self.id,
      Property::Style => &mut self.style,
      Property::Class => &mut self.class,
    }
  }
}

impl Node {
  /// A new strict node of the given kind with no children. Numeric
  /// kinds start at zero, and csymbol kinds carry their standard
  /// definition URL.
  pub fn new(kind: Kind) -> Node {
    let mut attributes = Attributes::default();
    if let Some(url) = kind.definition_url() {
      attributes.definition_url = Some(url.to_owned());
      attributes.encoding = Some(String::from("text"));
    }
    Node {
      kind,
      value: Payload::default_for(kind),
      attributes,
      strict: true,
      children: Vec::new(),
    }
  }

  /// A new node of the given kind, with each child added in order
  /// under the usual arity checks.
  pub fn with_children<I>(kind: Kind, children: I) -> Result<Node, NodeError>
  where I: IntoIterator<Item = Node> {
    let mut node = Node::new(kind);
    for child in children {
      node.add_child(child)?;
    }
    Ok(node)
  }

  /// Assembles a node from children the caller has already checked
  /// against the kind's contract.
  pub(crate) fn from_children(kind: Kind, children: Vec<Node>) -> Node {
    let mut node = Node::new(kind);
    node.children = children;
    node
  }

  /// A numeric literal node holding `value`.
  pub fn number(value: Payload) -> Node {
    let kind = value.kind().unwrap_or(Kind::Unknown);
    let mut node = Node::new(kind);
    node.value = value;
    node
  }

  /// The effective kind of this node. A binary logarithm whose base
  /// is the constant e reports itself as a natural logarithm; the
  /// answer is always derived from the current children.
  pub fn kind(&self) -> Kind {
    match self.kind {
      Kind::FunctionLog if self.children.len() == 2 &&
        self.children[0].unwrap_qualifier().kind == Kind::ConstantE => Kind::FunctionLn,
      kind => kind,
    }
  }

  /// The kind this node was constructed with, without any derivation.
  pub fn stored_kind(&self) -> Kind {
    self.kind
  }

  pub fn family(&self) -> Family {
    self.kind.family()
  }

  pub fn arity(&self) -> Arity {
    self.kind.arity()
  }

  /// Changes the kind of this node. The new kind must belong to the
  /// same family as the old one. Numeric literals convert their
  /// value to the new representation.
  pub fn set_kind(&mut self, kind: Kind) -> Result<(), NodeError> {
    if kind.family() != self.kind.family() {
      return Err(NodeError::InvalidKind { requested: kind, context: self.kind });
    }
    if kind.is_number() {
      self.value = self.value.convert_to(kind);
    }
    self.kind = kind;
    Ok(())
  }

  pub fn value(&self) -> Payload {
    self.value
  }

  /// Replaces the value of a numeric literal, changing its kind to
  /// match the payload.
  pub fn set_value(&mut self, value: Payload) -> Result<(), NodeError> {
    let Some(kind) = value.kind() else {
      return Err(NodeError::InvalidArgument(String::from("a numeric literal requires a numeric value")));
    };
    if !self.kind.is_number() {
      return Err(NodeError::InvalidKind { requested: kind, context: self.kind });
    }
    self.kind = kind;
    self.value = value;
    Ok(())
  }

  /// The numeric value of this node, if it is a literal or one of
  /// the numeric constants.
  pub fn number_value(&self) -> Option<f64> {
    match self.kind {
      Kind::ConstantPi => Some(PI),
      Kind::ConstantE => Some(E),
      _ => self.value.to_f64(),
    }
  }

  pub fn is_strict(&self) -> bool {
    self.strict
  }

  /// Toggles arity enforcement on this node. Existing children are
  /// never truncated, even if they now exceed the bound.
  pub fn set_strictness(&mut self, strict: bool) {
    self.strict = strict;
  }

  /// Reads an optional attribute. An unset attribute is an error on a
  /// strict node and the empty string on a non-strict one.
  pub fn property(&self, property: Property) -> Result<&str, NodeError> {
    match self.attributes.get(property) {
      Some(value) => Ok(value),
      None if self.strict => Err(NodeError::PropertyUndefined { property, kind: self.kind() }),
      None => {
        tracing::warn!(%property, kind = %self.kind(), "reading unset property from non-strict node");
        Ok("")
      }
    }
  }

  pub fn get(&self, property: Property) -> Option<&str> {
    self.attributes.get(property).as_deref()
  }

  pub fn is_set(&self, property: Property) -> bool {
    self.attributes.get(property).is_some()
  }

  pub fn set(&mut self, property: Property, value: impl Into<String>) {
    *self.attributes.get_mut(property) = Some(value.into());
  }

  pub fn unset(&mut self, property: Property) {
    *self.attributes.get_mut(property) = None;
  }

  pub fn name(&self) -> Option<&str> {
    self.get(Property::Name)
  }

  pub fn units(&self) -> Option<&str> {
    self.get(Property::Units)
  }

  pub fn children(&self) -> &[Node] {
    &self.children
  }

  pub fn child_count(&self) -> usize {
    self.children.len()
  }

  pub fn get_child(&self, index: usize) -> Result<&Node, NodeError> {
    self.children.get(index).ok_or(NodeError::IndexOutOfBounds {
      kind: self.kind,
      index,
      count: self.children.len(),
    })
  }

  pub fn get_child_mut(&mut self, index: usize) -> Result<&mut Node, NodeError> {
    let (kind, count) = (self.kind, self.children.len());
    self.children.get_mut(index).ok_or(NodeError::IndexOutOfBounds { kind, index, count })
  }

  pub fn add_child(&mut self, child: Node) -> Result<(), NodeError> {
    self.check_child(&child)?;
    self.check_capacity(self.children.len() + 1)?;
    self.children.push(child);
    Ok(())
  }

  /// As [`Node::add_child`], but rejects an absent child with
  /// [`NodeError::NullChild`].
  pub fn add_optional_child(&mut self, child: Option<Node>) -> Result<(), NodeError> {
    match child {
      Some(child) => self.add_child(child),
      None => Err(NodeError::NullChild(self.kind)),
    }
  }

  pub fn insert_child(&mut self, index: usize, child: Node) -> Result<(), NodeError> {
    if index > self.children.len() {
      return Err(NodeError::IndexOutOfBounds { kind: self.kind, index, count: self.children.len() });
    }
    self.check_child(&child)?;
    self.check_capacity(self.children.len() + 1)?;
    self.children.insert(index, child);
    Ok(())
  }

  pub fn prepend_child(&mut self, child: Node) -> Result<(), NodeError> {
    self.insert_child(0, child)
  }

  /// Replaces the child at `index`, returning the old child.
  pub fn replace_child(&mut self, index: usize, child: Node) -> Result<Node, NodeError> {
    self.check_child(&child)?;
    let slot = self.get_child_mut(index)?;
    Ok(std::mem::replace(slot, child))
  }

  /// Removes the child at `index`. An out-of-range index is an error
  /// only for strict nodes of a bounded kind; otherwise it reports
  /// `false`.
  pub fn remove_child(&mut self, index: usize) -> Result<bool, NodeError> {
    if index < self.children.len() {
      self.children.remove(index);
      return Ok(true);
    }
    if self.strict && self.kind.arity().is_bounded() {
      return Err(NodeError::IndexOutOfBounds { kind: self.kind, index, count: self.children.len() });
    }
    Ok(false)
  }

  /// Exchanges the children of `self` and `other`. Both sides are
  /// validated before anything moves.
  pub fn swap_children(&mut self, other: &mut Node) -> Result<(), NodeError> {
    self.check_adoption(&other.children)?;
    other.check_adoption(&self.children)?;
    std::mem::swap(&mut self.children, &mut other.children);
    Ok(())
  }

  /// Removes and returns all children, leaving the node empty.
  pub fn take_children(&mut self) -> Vec<Node> {
    std::mem::take(&mut self.children)
  }

  pub fn into_children(self) -> Vec<Node> {
    self.children
  }

  /// Whether this node and all of its descendants satisfy the full
  /// arity contract, including the minimum child count.
  pub fn is_well_formed(&self) -> bool {
    self.kind.arity().admits(self.children.len()) &&
      self.children.iter().all(Node::is_well_formed)
  }

  /// The content of a qualifier or `otherwise` wrapper, or the node
  /// itself if it is not a wrapper.
  pub fn unwrap_qualifier(&self) -> &Node {
    match self.kind {
      Kind::QualifierBvar | Kind::QualifierDegree | Kind::QualifierLogbase | Kind::ConstructorOtherwise
        if self.children.len() == 1 => &self.children[0],
      _ => self,
    }
  }

  /// The explicit base of a logarithm, if there is one. A unary
  /// logarithm has the implicit base 10.
  pub fn log_base(&self) -> Option<&Node> {
    match self.kind {
      Kind::FunctionLog if self.children.len() == 2 => Some(self.children[0].unwrap_qualifier()),
      _ => None,
    }
  }

  /// The explicit degree of a root, if there is one. A unary root is
  /// a square root.
  pub fn root_degree(&self) -> Option<&Node> {
    match self.kind {
      Kind::FunctionRoot if self.children.len() == 2 => Some(self.children[0].unwrap_qualifier()),
      _ => None,
    }
  }

  /// The last child: the argument of a logarithm, the radicand of a
  /// root, or the body of a lambda.
  pub fn last_child(&self) -> Option<&Node> {
    self.children.last()
  }

  pub fn is_square_root(&self) -> bool {
    self.kind == Kind::FunctionRoot && self.children.len() == 1
  }

  pub fn is_unary_minus(&self) -> bool {
    self.kind == Kind::Minus && self.children.len() == 1
  }

  /// The bound variables of a lambda, with any `bvar` wrappers
  /// removed.
  pub fn lambda_parameters(&self) -> Vec<&Node> {
    match self.children.split_last() {
      Some((_, params)) if self.kind == Kind::Lambda =>
        params.iter().map(Node::unwrap_qualifier).collect(),
      _ => Vec::new(),
    }
  }

  /// Normalizes the children of a piecewise node. Children may either
  /// alternate value and condition with an optional trailing
  /// otherwise value, or be `piece` and `otherwise` constructors.
  pub fn piecewise_parts(&self) -> PiecewiseParts<'_> {
    let mut pieces = Vec::new();
    let mut otherwise = None;
    let mut iter = self.children.iter();
    while let Some(child) = iter.next() {
      match child.kind {
        Kind::ConstructorPiece if child.children.len() == 2 => {
          pieces.push((&child.children[0], &child.children[1]));
        }
        Kind::ConstructorOtherwise => {
          otherwise = Some(child.unwrap_qualifier());
        }
        _ => match iter.next() {
          Some(condition) => pieces.push((child, condition)),
          None => otherwise = Some(child),
        },
      }
    }
    PiecewiseParts { pieces, otherwise }
  }

  fn check_child(&self, child: &Node) -> Result<(), NodeError> {
    if self.kind.accepts_child(child.kind) {
      Ok(())
    } else {
      Err(NodeError::InvalidKind { requested: child.kind, context: self.kind })
    }
  }

  fn check_capacity(&self, count: usize) -> Result<(), NodeError> {
    if let Some(max) = self.kind.arity().max().filter(|&max| count > max) {
      if self.strict {
        return Err(NodeError::ChildBoundsExceeded { kind: self.kind, max });
      }
      tracing::debug!(kind = %self.kind, count, max, "child limit exceeded on non-strict node");
    }
    Ok(())
  }

  fn check_adoption(&self, children: &[Node]) -> Result<(), NodeError> {
    children.iter().try_for_each(|child| self.check_child(child))?;
    self.check_capacity(children.len())
  }
}

impl Default for Node {
  fn default() -> Self {
    Node::new(Kind::Unknown)
  }
}

/// Structural equality. Strictness is a mode of the node, not part
/// of its value, and is ignored.
impl PartialEq for Node {
  fn eq(&self, other: &Node) -> bool {
    self.kind == other.kind &&
      self.value == other.value &&
      self.attributes == other.attributes &&
      self.children == other.children
  }
}

impl From<i64> for Node {
  fn from(n: i64) -> Node {
    Node::number(Payload::Integer(n))
  }
}

impl From<i32> for Node {
  fn from(n: i32) -> Node {
    Node::from(i64::from(n))
  }
}

impl From<f64> for Node {
  fn from(x: f64) -> Node {
    Node::number(Payload::Real(x))
  }
}

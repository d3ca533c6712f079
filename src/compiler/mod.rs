
//! Bottom-up compilation of expression trees through a [`Backend`].
//!
//! [`compile`] is the single dispatch point. It compiles the children
//! of a node first, strips any qualifier and constructor wrappers, and
//! then hands the compiled children to the backend operation for the
//! node's kind. Each compiled child arrives as a [`BackendValue`],
//! which carries enough about the child's shape for a backend to
//! decide on brackets without looking back into the tree.

pub mod infix;
pub mod latex;
pub mod mathml;

pub use infix::{InfixBackend, InfixDialect, InfixSettings};
pub use latex::{LatexBackend, LatexSettings};
pub use mathml::{MathmlBackend, MathmlElement, MathmlSettings};

use crate::ast::{Node, Kind, Family, NodeError, Payload, Property};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum CompileError {
  #[error("no rendering for {0} nodes")]
  UnsupportedKind(Kind),
  #[error("malformed {kind} node with {count} children")]
  Malformed { kind: Kind, count: usize },
  #[error("{0}")]
  Node(#[from] NodeError),
}

/// Shape information about a compiled subtree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueMeta {
  /// The effective kind of the compiled node.
  pub kind: Kind,
  pub child_count: usize,
  /// The value of a numeric literal.
  pub number: Option<f64>,
}

/// The output of one backend operation, together with the shape of
/// the node it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendValue<V> {
  pub value: V,
  pub meta: ValueMeta,
}

/// A target representation for expression trees. There is one
/// operation per kind of node (or per family, where the members of a
/// family render alike), each receiving its already-compiled operands.
pub trait Backend {
  type Value: Clone;
  type Error: From<CompileError>;

  fn integer(&self, value: i64, units: Option<&str>) -> Result<Self::Value, Self::Error>;
  fn real(&self, value: f64, units: Option<&str>) -> Result<Self::Value, Self::Error>;
  fn real_e(&self, mantissa: f64, exponent: i64, units: Option<&str>) -> Result<Self::Value, Self::Error>;
  fn rational(&self, numerator: i64, denominator: i64, units: Option<&str>) -> Result<Self::Value, Self::Error>;

  fn identifier(&self, name: &str) -> Result<Self::Value, Self::Error>;
  fn symbol_time(&self, name: Option<&str>) -> Result<Self::Value, Self::Error>;
  fn symbol_avogadro(&self, name: Option<&str>) -> Result<Self::Value, Self::Error>;
  /// One of the four named constants.
  fn constant(&self, kind: Kind) -> Result<Self::Value, Self::Error>;

  fn plus(&self, operands: &[BackendValue<Self::Value>]) -> Result<Self::Value, Self::Error>;
  /// An n-ary difference with at least two operands.
  fn minus(&self, operands: &[BackendValue<Self::Value>]) -> Result<Self::Value, Self::Error>;
  fn unary_minus(&self, operand: &BackendValue<Self::Value>) -> Result<Self::Value, Self::Error>;
  fn times(&self, operands: &[BackendValue<Self::Value>]) -> Result<Self::Value, Self::Error>;
  fn divide(
    &self,
    numerator: &BackendValue<Self::Value>,
    denominator: &BackendValue<Self::Value>,
  ) -> Result<Self::Value, Self::Error>;
  fn power(
    &self,
    base: &BackendValue<Self::Value>,
    exponent: &BackendValue<Self::Value>,
  ) -> Result<Self::Value, Self::Error>;

  /// A root. Without a degree, this is a square root.
  fn root(
    &self,
    degree: Option<&BackendValue<Self::Value>>,
    radicand: &BackendValue<Self::Value>,
  ) -> Result<Self::Value, Self::Error>;
  /// A logarithm. Without a base, this is the base-10 logarithm.
  fn log(
    &self,
    base: Option<&BackendValue<Self::Value>>,
    value: &BackendValue<Self::Value>,
  ) -> Result<Self::Value, Self::Error>;
  fn ln(&self, value: &BackendValue<Self::Value>) -> Result<Self::Value, Self::Error>;

  /// Any unary built-in function, including factorial.
  fn unary_function(&self, kind: Kind, argument: &BackendValue<Self::Value>) -> Result<Self::Value, Self::Error>;
  /// `quotient` and `rem`.
  fn binary_function(
    &self,
    kind: Kind,
    left: &BackendValue<Self::Value>,
    right: &BackendValue<Self::Value>,
  ) -> Result<Self::Value, Self::Error>;
  /// `max` and `min`.
  fn nary_function(&self, kind: Kind, arguments: &[BackendValue<Self::Value>]) -> Result<Self::Value, Self::Error>;
  fn delay(
    &self,
    name: Option<&str>,
    value: &BackendValue<Self::Value>,
    delay: &BackendValue<Self::Value>,
  ) -> Result<Self::Value, Self::Error>;

  fn relational(&self, kind: Kind, operands: &[BackendValue<Self::Value>]) -> Result<Self::Value, Self::Error>;
  /// `and`, `or`, `xor` and `implies`.
  fn logical(&self, kind: Kind, operands: &[BackendValue<Self::Value>]) -> Result<Self::Value, Self::Error>;
  fn not(&self, operand: &BackendValue<Self::Value>) -> Result<Self::Value, Self::Error>;

  /// A piecewise function as (value, condition) pairs, with an
  /// optional fallback value.
  fn piecewise(
    &self,
    pieces: &[(BackendValue<Self::Value>, BackendValue<Self::Value>)],
    otherwise: Option<&BackendValue<Self::Value>>,
  ) -> Result<Self::Value, Self::Error>;
  fn lambda(
    &self,
    parameters: &[BackendValue<Self::Value>],
    body: &BackendValue<Self::Value>,
  ) -> Result<Self::Value, Self::Error>;
  /// Called with the parameter names of a lambda before anything
  /// inside it is compiled. A backend that does not look inside
  /// lambdas returns its result here, and [`Backend::lambda`] is then
  /// skipped along with the parameters and body.
  fn opaque_lambda(&self, _parameters: &[&str]) -> Option<Result<Self::Value, Self::Error>> {
    None
  }
  fn function_call(&self, name: &str, arguments: &[BackendValue<Self::Value>]) -> Result<Self::Value, Self::Error>;
  fn vector(&self, elements: &[BackendValue<Self::Value>]) -> Result<Self::Value, Self::Error>;
  /// A vector (the first operand) indexed by each later operand.
  fn selector(&self, operands: &[BackendValue<Self::Value>]) -> Result<Self::Value, Self::Error>;

  /// Called for kinds with no rendering of their own, such as a stray
  /// qualifier or an unknown node.
  fn unknown(&self, node: &Node) -> Result<Self::Value, Self::Error> {
    Err(CompileError::UnsupportedKind(node.kind()).into())
  }
}

impl ValueMeta {
  pub fn of(node: &Node) -> ValueMeta {
    let kind = node.kind();
    ValueMeta {
      kind,
      child_count: node.child_count(),
      number: if kind.is_number() { node.number_value() } else { None },
    }
  }
}

impl<V> BackendValue<V> {
  pub fn new(value: V, meta: ValueMeta) -> Self {
    BackendValue { value, meta }
  }

  pub fn kind(&self) -> Kind {
    self.meta.kind
  }

  pub fn into_value(self) -> V {
    self.value
  }

  /// A leaf: a literal, a name, or a constant.
  pub fn is_atomic(&self) -> bool {
    self.meta.child_count == 0
  }

  /// A sum, or a difference of at least two terms.
  pub fn is_sum_or_difference(&self) -> bool {
    match self.meta.kind {
      Kind::Plus | Kind::Sum => true,
      Kind::Minus => self.meta.child_count != 1,
      _ => false,
    }
  }

  pub fn is_unary_minus(&self) -> bool {
    self.meta.kind == Kind::Minus && self.meta.child_count == 1
  }

  pub fn is_negative_number(&self) -> bool {
    self.meta.number.map_or(false, |x| x < 0.0)
  }
}

/// Compiles `node` and its subtree through `backend`.
pub fn compile<B>(node: &Node, backend: &B) -> Result<BackendValue<B::Value>, B::Error>
where B: Backend {
  let node = node.unwrap_qualifier();
  let kind = node.kind();
  let count = node.child_count();
  tracing::trace!(%kind, count, "compiling node");
  if kind != Kind::Unknown && !node.arity().admits(count) {
    return Err(CompileError::Malformed { kind, count }.into());
  }
  let children = node.children();
  let value = match kind {
    Kind::Integer | Kind::Real | Kind::RealE | Kind::Rational => {
      let units = node.units();
      match node.value() {
        Payload::Integer(n) => backend.integer(n, units)?,
        Payload::Real(x) => backend.real(x, units)?,
        Payload::RealE { mantissa, exponent } => backend.real_e(mantissa, exponent, units)?,
        Payload::Rational { numerator, denominator } => backend.rational(numerator, denominator, units)?,
        Payload::None => return Err(CompileError::Malformed { kind, count }.into()),
      }
    }
    Kind::Name => {
      let name = node.property(Property::Name).map_err(CompileError::from)?;
      backend.identifier(name)?
    }
    Kind::NameTime => backend.symbol_time(node.name())?,
    Kind::NameAvogadro => backend.symbol_avogadro(node.name())?,
    Kind::ConstantE | Kind::ConstantPi | Kind::ConstantTrue | Kind::ConstantFalse => backend.constant(kind)?,
    Kind::Plus | Kind::Sum => backend.plus(&compile_all(children, backend)?)?,
    Kind::Minus if count == 1 => backend.unary_minus(&compile(&children[0], backend)?)?,
    Kind::Minus => backend.minus(&compile_all(children, backend)?)?,
    Kind::Times | Kind::Product => backend.times(&compile_all(children, backend)?)?,
    Kind::Divide => {
      let (numerator, denominator) = compile_pair(children, backend)?;
      backend.divide(&numerator, &denominator)?
    }
    Kind::Power | Kind::FunctionPower => {
      let (base, exponent) = compile_pair(children, backend)?;
      backend.power(&base, &exponent)?
    }
    Kind::FunctionRoot => {
      let degree = node.root_degree().map(|degree| compile(degree, backend)).transpose()?;
      let radicand = compile(&children[count - 1], backend)?;
      backend.root(degree.as_ref(), &radicand)?
    }
    Kind::FunctionLn => backend.ln(&compile(&children[count - 1], backend)?)?,
    Kind::FunctionLog => {
      let base = node.log_base().map(|base| compile(base, backend)).transpose()?;
      let value = compile(&children[count - 1], backend)?;
      backend.log(base.as_ref(), &value)?
    }
    Kind::FunctionQuotient | Kind::FunctionRem => {
      let (left, right) = compile_pair(children, backend)?;
      backend.binary_function(kind, &left, &right)?
    }
    Kind::FunctionDelay => {
      let (value, delay) = compile_pair(children, backend)?;
      backend.delay(node.name(), &value, &delay)?
    }
    Kind::FunctionMax | Kind::FunctionMin => backend.nary_function(kind, &compile_all(children, backend)?)?,
    Kind::LogicalNot => backend.not(&compile(&children[0], backend)?)?,
    Kind::LogicalAnd | Kind::LogicalOr | Kind::LogicalXor | Kind::LogicalImplies => {
      backend.logical(kind, &compile_all(children, backend)?)?
    }
    kind if kind.is_relational() => backend.relational(kind, &compile_all(children, backend)?)?,
    kind if kind.family() == Family::UnaryFunction => {
      backend.unary_function(kind, &compile(&children[0], backend)?)?
    }
    Kind::FunctionPiecewise => {
      let parts = node.piecewise_parts();
      let pieces = parts.pieces.iter()
        .map(|(value, condition)| Ok((compile(value, backend)?, compile(condition, backend)?)))
        .collect::<Result<Vec<_>, B::Error>>()?;
      let otherwise = parts.otherwise.map(|otherwise| compile(otherwise, backend)).transpose()?;
      backend.piecewise(&pieces, otherwise.as_ref())?
    }
    Kind::Lambda => {
      let names = node.lambda_parameters().into_iter().filter_map(Node::name).collect::<Vec<_>>();
      if let Some(value) = backend.opaque_lambda(&names) {
        return Ok(BackendValue::new(value?, ValueMeta::of(node)));
      }
      let parameters = node.lambda_parameters().into_iter()
        .map(|parameter| compile(parameter, backend))
        .collect::<Result<Vec<_>, B::Error>>()?;
      let body = compile(&children[count - 1], backend)?;
      backend.lambda(&parameters, &body)?
    }
    Kind::Function => {
      let name = node.property(Property::Name).map_err(CompileError::from)?;
      backend.function_call(name, &compile_all(children, backend)?)?
    }
    Kind::Vector => backend.vector(&compile_all(children, backend)?)?,
    Kind::FunctionSelector => backend.selector(&compile_all(children, backend)?)?,
    _ => backend.unknown(node)?,
  };
  Ok(BackendValue::new(value, ValueMeta::of(node)))
}

fn compile_all<B>(nodes: &[Node], backend: &B) -> Result<Vec<BackendValue<B::Value>>, B::Error>
where B: Backend {
  nodes.iter().map(|node| compile(node, backend)).collect()
}

fn compile_pair<B>(nodes: &[Node], backend: &B) -> Result<(BackendValue<B::Value>, BackendValue<B::Value>), B::Error>
where B: Backend {
  Ok((compile(&nodes[0], backend)?, compile(&nodes[1], backend)?))
}

/// Writes each element of `elems` with `printer`, separated by
/// `delimiter`.
pub fn output_sep_by<T, I, F>(
  out: &mut String,
  elems: I,
  delimiter: &str,
  mut printer: F,
)
where I: IntoIterator<Item = T>,
      F: FnMut(&mut String, T) {
  let mut elems = elems.into_iter();
  if let Some(first) = elems.next() {
    printer(out, first);
    for elem in elems {
      out.push_str(delimiter);
      printer(out, elem);
    }
  }
}

impl Node {
  /// Renders this tree as infix formula text with default settings.
  pub fn to_formula(&self) -> Result<String, CompileError> {
    infix::to_formula(self, &InfixSettings::default())
  }

  /// Renders this tree as LaTeX with default settings.
  pub fn to_latex(&self) -> Result<String, CompileError> {
    latex::to_latex(self, &LatexSettings::default())
  }

  /// Renders this tree as a MathML document with default settings.
  pub fn to_mathml(&self) -> Result<String, CompileError> {
    mathml::to_mathml(self, &MathmlSettings::default())
  }
}

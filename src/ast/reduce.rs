
use super::kind::Kind;
use super::node::Node;
use super::error::NodeError;

/// Reduces an n-ary arithmetic node to a chain of binary nodes,
/// folding from the left. `sum(a, b, c, d)` becomes
/// `((a + b) + c) + d`, so the in-order sequence of leaves is
/// unchanged and `k` operands produce exactly `k - 1` binary nodes.
///
/// Sums become PLUS chains, products become TIMES chains, and
/// differences stay MINUS. A node with at most two children is only
/// re-kinded.
pub fn reduce_to_binary(node: Node) -> Result<Node, NodeError> {
  let kind = match node.kind() {
    Kind::Sum | Kind::Plus => Kind::Plus,
    Kind::Product | Kind::Times => Kind::Times,
    Kind::Minus => Kind::Minus,
    other => {
      return Err(NodeError::InvalidArgument(format!("cannot reduce {other} to a binary chain")));
    }
  };
  let children = node.into_children();
  if children.len() <= 2 {
    return Ok(Node::from_children(kind, children));
  }
  let mut iter = children.into_iter();
  // unwrap: there are at least three children.
  let first = iter.next().unwrap();
  let result = iter.fold(first, |acc, child| Node::from_children(kind, vec![acc, child]));
  tracing::trace!(kind = %kind, "reduced n-ary node to binary chain");
  Ok(result)
}

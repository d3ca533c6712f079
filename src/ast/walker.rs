
//! Utility functions for walking a node tree.

use super::error::NodeError;
use super::kind::Kind;
use super::node::Node;

/// Rebuilds the tree bottom-up, passing every node to `f` after its
/// children have been rebuilt. A replacement child must still be an
/// allowable kind for its parent; the arity bound is not rechecked.
pub fn postorder_walk<E, F>(node: Node, mut f: F) -> Result<Node, E>
where F: FnMut(Node) -> Result<Node, E>,
      E: From<NodeError> {
  postorder_walk_impl(node, &mut f)
}

fn postorder_walk_impl<E, F>(mut node: Node, f: &mut F) -> Result<Node, E>
where F: FnMut(Node) -> Result<Node, E>,
      E: From<NodeError> {
  let children = node.take_children();
  for child in children {
    let child = postorder_walk_impl(child, f)?;
    node.set_strictness_scoped(|node| node.add_child(child))?;
  }
  f(node)
}

pub fn postorder_walk_borrowed<F>(node: &Node, mut f: F)
where F: FnMut(&Node) {
  postorder_walk_borrowed_impl(node, &mut f);
}

fn postorder_walk_borrowed_impl<F>(node: &Node, f: &mut F)
where F: FnMut(&Node) {
  for child in node.children() {
    postorder_walk_borrowed_impl(child, f);
  }
  f(node);
}

/// Returns true if any of the nodes of `node` (including `node`
/// itself) satisfies the predicate.
pub fn any<F>(node: &Node, f: F) -> bool
where F: Fn(&Node) -> bool {
  let mut result = false;
  postorder_walk_borrowed(node, |n| {
    if f(n) {
      result = true;
    }
  });
  result
}

/// The number of nodes in the tree whose effective kind is `kind`.
pub fn count_kind(node: &Node, kind: Kind) -> usize {
  let mut count = 0;
  postorder_walk_borrowed(node, |n| {
    if n.kind() == kind {
      count += 1;
    }
  });
  count
}

/// The names of every identifier in the tree, in postorder, with
/// duplicates.
pub fn identifiers(node: &Node) -> Vec<&str> {
  fn go<'a>(node: &'a Node, acc: &mut Vec<&'a str>) {
    for child in node.children() {
      go(child, acc);
    }
    if node.kind() == Kind::Name {
      if let Some(name) = node.name() {
        acc.push(name);
      }
    }
  }

  let mut acc = Vec::new();
  go(node, &mut acc);
  acc
}

impl Node {
  /// Runs `f` with arity enforcement switched off, restoring the
  /// previous strictness afterward.
  pub(crate) fn set_strictness_scoped<T, F>(&mut self, f: F) -> T
  where F: FnOnce(&mut Node) -> T {
    let strict = self.is_strict();
    self.set_strictness(false);
    let result = f(self);
    self.set_strictness(strict);
    result
  }
}


//! Upward queries over a tree without parent pointers.
//!
//! A [`NodePath`] is the sequence of child indices leading from a
//! root node down to one of its descendants. Since a node never knows
//! its parent, any question of the form "what encloses this node" is
//! answered from the root, by following a path.

use super::node::Node;

use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(Vec<usize>);

impl NodePath {
  pub fn root() -> NodePath {
    NodePath(Vec::new())
  }

  pub fn new(indices: Vec<usize>) -> NodePath {
    NodePath(indices)
  }

  pub fn indices(&self) -> &[usize] {
    &self.0
  }

  pub fn is_root(&self) -> bool {
    self.0.is_empty()
  }

  pub fn depth(&self) -> usize {
    self.0.len()
  }

  /// The path to the `index`th child of the node at this path.
  pub fn child(&self, index: usize) -> NodePath {
    let mut indices = self.0.clone();
    indices.push(index);
    NodePath(indices)
  }

  /// The path to the enclosing node, or `None` at the root.
  pub fn parent(&self) -> Option<NodePath> {
    let (_, rest) = self.0.split_last()?;
    Some(NodePath(rest.to_vec()))
  }

  /// The index of this node within its parent, or `None` at the root.
  pub fn last_index(&self) -> Option<usize> {
    self.0.last().copied()
  }
}

impl Display for NodePath {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "/")?;
    for (i, index) in self.0.iter().enumerate() {
      if i > 0 {
        write!(f, "/")?;
      }
      write!(f, "{index}")?;
    }
    Ok(())
  }
}

impl Node {
  pub fn at_path(&self, path: &NodePath) -> Option<&Node> {
    path.indices().iter().try_fold(self, |node, &index| node.children().get(index))
  }

  pub fn at_path_mut(&mut self, path: &NodePath) -> Option<&mut Node> {
    let mut node = self;
    for &index in path.indices() {
      node = node.get_child_mut(index).ok()?;
    }
    Some(node)
  }

  /// The node enclosing the one at `path`. Returns `None` for the
  /// root, or if the path does not exist in this tree.
  pub fn parent_of(&self, path: &NodePath) -> Option<&Node> {
    self.at_path(path)?;
    self.at_path(&path.parent()?)
  }

  /// Every node enclosing the one at `path`, nearest first. The root
  /// is always last.
  pub fn ancestors(&self, path: &NodePath) -> Vec<&Node> {
    let mut result = Vec::with_capacity(path.depth());
    let mut node = self;
    for &index in path.indices() {
      result.push(node);
      match node.children().get(index) {
        Some(child) => node = child,
        None => return Vec::new(),
      }
    }
    result.reverse();
    result
  }

  /// The path of the first node, in preorder, which satisfies the
  /// predicate.
  pub fn find_path<F>(&self, predicate: F) -> Option<NodePath>
  where F: Fn(&Node) -> bool {
    fn go<F>(node: &Node, path: &mut Vec<usize>, predicate: &F) -> bool
    where F: Fn(&Node) -> bool {
      if predicate(node) {
        return true;
      }
      for (i, child) in node.children().iter().enumerate() {
        path.push(i);
        if go(child, path, predicate) {
          return true;
        }
        path.pop();
      }
      false
    }

    let mut path = Vec::new();
    if go(self, &mut path, &predicate) {
      Some(NodePath(path))
    } else {
      None
    }
  }
}

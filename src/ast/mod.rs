
//! The expression tree.

pub mod builder;
pub mod error;
pub mod kind;
pub mod node;
pub mod path;
pub mod reduce;
pub mod walker;

pub use error::{NodeError, Property};
pub use kind::{Kind, Family, Arity};
pub use node::{Node, Payload, PiecewiseParts};
pub use path::NodePath;
pub use reduce::reduce_to_binary;

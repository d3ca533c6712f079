
//! Expression trees for the mathematics of model-exchange documents:
//! a node model, an infix formula parser, renderers to formula text,
//! LaTeX and MathML, and unit inference.

pub mod ast;
pub mod compiler;
pub mod error;
pub mod parsing;
pub mod units;
pub mod util;

pub use ast::{Kind, Node};
pub use error::Error;

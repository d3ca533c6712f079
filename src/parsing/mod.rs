
//! Tokenizing and parsing of infix formulas.

pub mod formula;
pub mod operator;
pub mod shunting_yard;
pub mod source;
pub mod tokenizer;

pub use formula::{parse, parse_with, unparse, round_trip, Dialect, ParserOptions, ParseError};

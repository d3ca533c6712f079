
//! Physical units, and inference of the units of expression trees.

pub mod inference;
pub mod kind;
pub mod lookup;
pub mod unit_value;

pub use inference::{infer, infer_with, Inference, InferenceSettings, UnitError, UnitsBackend};
pub use kind::UnitKind;
pub use lookup::{QuantityLookup, QuantityTable};
pub use unit_value::{Factor, UnitValue};

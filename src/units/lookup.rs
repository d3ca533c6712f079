
use super::unit_value::UnitValue;

use std::collections::HashMap;

/// The context that unit inference and rendering consult to resolve
/// names in a tree.
pub trait QuantityLookup {
  /// The units and, if known, the numerical value of the quantity
  /// named `id`.
  fn resolve(&self, id: &str) -> Option<(UnitValue, Option<f64>)>;

  /// A user-defined unit named `id`, for unit names on literals that
  /// are not predefined unit kinds.
  fn unit_definition(&self, _id: &str) -> Option<UnitValue> {
    None
  }

  /// The units of the simulation time symbol. `None` means seconds.
  fn time_units(&self) -> Option<UnitValue> {
    None
  }

  /// A human-readable name for the quantity named `id`.
  fn display_name(&self, _id: &str) -> Option<String> {
    None
  }
}

/// A [`QuantityLookup`] backed by in-memory tables.
#[derive(Debug, Clone, Default)]
pub struct QuantityTable {
  quantities: HashMap<String, Quantity>,
  unit_definitions: HashMap<String, UnitValue>,
  time_units: Option<UnitValue>,
}

#[derive(Debug, Clone)]
struct Quantity {
  unit: UnitValue,
  value: Option<f64>,
  display_name: Option<String>,
}

impl QuantityTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Declares a quantity, replacing any earlier declaration of the
  /// same id.
  pub fn insert(&mut self, id: impl Into<String>, unit: UnitValue, value: Option<f64>) {
    self.quantities.insert(id.into(), Quantity { unit, value, display_name: None });
  }

  /// Sets the display name of a declared quantity. Returns false if
  /// no quantity has that id.
  pub fn set_display_name(&mut self, id: &str, name: impl Into<String>) -> bool {
    match self.quantities.get_mut(id) {
      Some(quantity) => {
        quantity.display_name = Some(name.into());
        true
      }
      None => false,
    }
  }

  pub fn define_unit(&mut self, id: impl Into<String>, unit: UnitValue) {
    self.unit_definitions.insert(id.into(), unit);
  }

  pub fn set_time_units(&mut self, unit: UnitValue) {
    self.time_units = Some(unit);
  }

  pub fn len(&self) -> usize {
    self.quantities.len()
  }

  pub fn is_empty(&self) -> bool {
    self.quantities.is_empty()
  }
}

impl QuantityLookup for QuantityTable {
  fn resolve(&self, id: &str) -> Option<(UnitValue, Option<f64>)> {
    self.quantities.get(id).map(|q| (q.unit.clone(), q.value))
  }

  fn unit_definition(&self, id: &str) -> Option<UnitValue> {
    self.unit_definitions.get(id).cloned()
  }

  fn time_units(&self) -> Option<UnitValue> {
    self.time_units.clone()
  }

  fn display_name(&self, id: &str) -> Option<String> {
    self.quantities.get(id).and_then(|q| q.display_name.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::units::kind::UnitKind;

  #[test]
  fn test_resolve() {
    let mut table = QuantityTable::new();
    assert!(table.is_empty());
    table.insert("x", UnitValue::of(UnitKind::Metre), Some(2.0));
    assert_eq!(table.len(), 1);
    assert_eq!(table.resolve("x"), Some((UnitValue::of(UnitKind::Metre), Some(2.0))));
    assert_eq!(table.resolve("y"), None);
  }

  #[test]
  fn test_display_name() {
    let mut table = QuantityTable::new();
    table.insert("k1", UnitValue::dimensionless(), None);
    assert_eq!(table.display_name("k1"), None);
    assert!(table.set_display_name("k1", "rate constant"));
    assert!(!table.set_display_name("k2", "other"));
    assert_eq!(table.display_name("k1").as_deref(), Some("rate constant"));
  }

  #[test]
  fn test_definitions_and_time_units() {
    let mut table = QuantityTable::new();
    assert_eq!(table.time_units(), None);
    table.set_time_units(UnitValue::of(UnitKind::Second).pow(num::Rational64::from_integer(1)));
    table.define_unit("per_second", UnitValue::of(UnitKind::Second).recip());
    assert_eq!(table.time_units(), Some(UnitValue::of(UnitKind::Second)));
    assert_eq!(table.unit_definition("per_second").map(|u| u.to_string()).as_deref(), Some("s^-1"));
    assert_eq!(table.unit_definition("furlong"), None);
  }
}


//! The predefined unit kinds of the model-exchange format.

use serde::{Serialize, Deserialize};
use phf::phf_map;

use std::fmt::{self, Formatter, Display};

/// One of the predefined unit kinds. [`UnitKind::Invalid`] is not a
/// real unit; it marks a quantity whose units could not be
/// determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
  Ampere,
  Avogadro,
  Becquerel,
  Candela,
  Coulomb,
  Dimensionless,
  Farad,
  Gram,
  Gray,
  Henry,
  Hertz,
  Item,
  Joule,
  Katal,
  Kelvin,
  Kilogram,
  Litre,
  Lumen,
  Lux,
  Metre,
  Mole,
  Newton,
  Ohm,
  Pascal,
  Radian,
  Second,
  Siemens,
  Sievert,
  Steradian,
  Tesla,
  Volt,
  Watt,
  Weber,
  Invalid,
}

static UNIT_NAMES: phf::Map<&'static str, UnitKind> = phf_map! {
  "ampere" => UnitKind::Ampere,
  "avogadro" => UnitKind::Avogadro,
  "becquerel" => UnitKind::Becquerel,
  "candela" => UnitKind::Candela,
  "coulomb" => UnitKind::Coulomb,
  "dimensionless" => UnitKind::Dimensionless,
  "farad" => UnitKind::Farad,
  "gram" => UnitKind::Gram,
  "gray" => UnitKind::Gray,
  "henry" => UnitKind::Henry,
  "hertz" => UnitKind::Hertz,
  "item" => UnitKind::Item,
  "joule" => UnitKind::Joule,
  "katal" => UnitKind::Katal,
  "kelvin" => UnitKind::Kelvin,
  "kilogram" => UnitKind::Kilogram,
  "litre" => UnitKind::Litre,
  "liter" => UnitKind::Litre,
  "lumen" => UnitKind::Lumen,
  "lux" => UnitKind::Lux,
  "metre" => UnitKind::Metre,
  "meter" => UnitKind::Metre,
  "mole" => UnitKind::Mole,
  "newton" => UnitKind::Newton,
  "ohm" => UnitKind::Ohm,
  "pascal" => UnitKind::Pascal,
  "radian" => UnitKind::Radian,
  "second" => UnitKind::Second,
  "siemens" => UnitKind::Siemens,
  "sievert" => UnitKind::Sievert,
  "steradian" => UnitKind::Steradian,
  "tesla" => UnitKind::Tesla,
  "volt" => UnitKind::Volt,
  "watt" => UnitKind::Watt,
  "weber" => UnitKind::Weber,
  "invalid" => UnitKind::Invalid,
};

/// Avogadro's number, as the value of the `avogadro` unit and of the
/// avogadro symbol.
pub const AVOGADRO: f64 = 6.02214179e23;

/// The expansion of a unit kind in SI base units: a list of base
/// kinds with integer exponents, and the multiplier that scales one
/// of the kind to that product.
#[derive(Debug, Clone, PartialEq)]
pub struct SiExpansion {
  pub bases: &'static [(UnitKind, i64)],
  pub multiplier: f64,
}

impl UnitKind {
  /// Looks up a unit kind by name. Both spellings of metre and litre
  /// are accepted.
  pub fn from_name(name: &str) -> Option<UnitKind> {
    UNIT_NAMES.get(name).copied()
  }

  pub fn name(self) -> &'static str {
    match self {
      UnitKind::Ampere => "ampere",
      UnitKind::Avogadro => "avogadro",
      UnitKind::Becquerel => "becquerel",
      UnitKind::Candela => "candela",
      UnitKind::Coulomb => "coulomb",
      UnitKind::Dimensionless => "dimensionless",
      UnitKind::Farad => "farad",
      UnitKind::Gram => "gram",
      UnitKind::Gray => "gray",
      UnitKind::Henry => "henry",
      UnitKind::Hertz => "hertz",
      UnitKind::Item => "item",
      UnitKind::Joule => "joule",
      UnitKind::Katal => "katal",
      UnitKind::Kelvin => "kelvin",
      UnitKind::Kilogram => "kilogram",
      UnitKind::Litre => "litre",
      UnitKind::Lumen => "lumen",
      UnitKind::Lux => "lux",
      UnitKind::Metre => "metre",
      UnitKind::Mole => "mole",
      UnitKind::Newton => "newton",
      UnitKind::Ohm => "ohm",
      UnitKind::Pascal => "pascal",
      UnitKind::Radian => "radian",
      UnitKind::Second => "second",
      UnitKind::Siemens => "siemens",
      UnitKind::Sievert => "sievert",
      UnitKind::Steradian => "steradian",
      UnitKind::Tesla => "tesla",
      UnitKind::Volt => "volt",
      UnitKind::Watt => "watt",
      UnitKind::Weber => "weber",
      UnitKind::Invalid => "invalid",
    }
  }

  /// The short symbol used when printing unit values.
  pub fn symbol(self) -> &'static str {
    match self {
      UnitKind::Ampere => "A",
      UnitKind::Avogadro => "avogadro",
      UnitKind::Becquerel => "Bq",
      UnitKind::Candela => "cd",
      UnitKind::Coulomb => "C",
      UnitKind::Dimensionless => "1",
      UnitKind::Farad => "F",
      UnitKind::Gram => "g",
      UnitKind::Gray => "Gy",
      UnitKind::Henry => "H",
      UnitKind::Hertz => "Hz",
      UnitKind::Item => "item",
      UnitKind::Joule => "J",
      UnitKind::Katal => "kat",
      UnitKind::Kelvin => "K",
      UnitKind::Kilogram => "kg",
      UnitKind::Litre => "l",
      UnitKind::Lumen => "lm",
      UnitKind::Lux => "lx",
      UnitKind::Metre => "m",
      UnitKind::Mole => "mol",
      UnitKind::Newton => "N",
      UnitKind::Ohm => "ohm",
      UnitKind::Pascal => "Pa",
      UnitKind::Radian => "rad",
      UnitKind::Second => "s",
      UnitKind::Siemens => "S",
      UnitKind::Sievert => "Sv",
      UnitKind::Steradian => "sr",
      UnitKind::Tesla => "T",
      UnitKind::Volt => "V",
      UnitKind::Watt => "W",
      UnitKind::Weber => "Wb",
      UnitKind::Invalid => "invalid",
    }
  }

  /// Kinds that carry no physical dimension. Any of these is accepted
  /// where a dimensionless argument is required.
  pub fn is_dimensionless_like(self) -> bool {
    matches!(self, UnitKind::Dimensionless | UnitKind::Item | UnitKind::Radian | UnitKind::Steradian)
  }

  pub fn is_si_base(self) -> bool {
    matches!(
      self,
      UnitKind::Ampere | UnitKind::Candela | UnitKind::Kelvin | UnitKind::Kilogram |
      UnitKind::Metre | UnitKind::Mole | UnitKind::Second,
    )
  }

  /// The expansion of this kind in the seven SI base kinds. Base kinds
  /// expand to themselves, and dimensionless-like kinds (and the
  /// invalid marker) expand to the empty product.
  pub fn to_si(self) -> SiExpansion {
    use UnitKind::*;
    let (bases, multiplier): (&'static [(UnitKind, i64)], f64) = match self {
      Ampere => (&[(Ampere, 1)], 1.0),
      Candela => (&[(Candela, 1)], 1.0),
      Kelvin => (&[(Kelvin, 1)], 1.0),
      Kilogram => (&[(Kilogram, 1)], 1.0),
      Metre => (&[(Metre, 1)], 1.0),
      Mole => (&[(Mole, 1)], 1.0),
      Second => (&[(Second, 1)], 1.0),
      Avogadro => (&[], AVOGADRO),
      Dimensionless | Item | Radian | Steradian | Invalid => (&[], 1.0),
      Becquerel | Hertz => (&[(Second, -1)], 1.0),
      Coulomb => (&[(Ampere, 1), (Second, 1)], 1.0),
      Farad => (&[(Ampere, 2), (Kilogram, -1), (Metre, -2), (Second, 4)], 1.0),
      Gram => (&[(Kilogram, 1)], 0.001),
      Gray | Sievert => (&[(Metre, 2), (Second, -2)], 1.0),
      Henry => (&[(Ampere, -2), (Kilogram, 1), (Metre, 2), (Second, -2)], 1.0),
      Joule => (&[(Kilogram, 1), (Metre, 2), (Second, -2)], 1.0),
      Katal => (&[(Mole, 1), (Second, -1)], 1.0),
      Litre => (&[(Metre, 3)], 0.001),
      Lumen => (&[(Candela, 1)], 1.0),
      Lux => (&[(Candela, 1), (Metre, -2)], 1.0),
      Newton => (&[(Kilogram, 1), (Metre, 1), (Second, -2)], 1.0),
      Ohm => (&[(Ampere, -2), (Kilogram, 1), (Metre, 2), (Second, -3)], 1.0),
      Pascal => (&[(Kilogram, 1), (Metre, -1), (Second, -2)], 1.0),
      Siemens => (&[(Ampere, 2), (Kilogram, -1), (Metre, -2), (Second, 3)], 1.0),
      Tesla => (&[(Ampere, -1), (Kilogram, 1), (Second, -2)], 1.0),
      Volt => (&[(Ampere, -1), (Kilogram, 1), (Metre, 2), (Second, -3)], 1.0),
      Watt => (&[(Kilogram, 1), (Metre, 2), (Second, -3)], 1.0),
      Weber => (&[(Ampere, -1), (Kilogram, 1), (Metre, 2), (Second, -2)], 1.0),
    };
    SiExpansion { bases, multiplier }
  }
}

impl Display for UnitKind {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_from_name() {
    assert_eq!(UnitKind::from_name("metre"), Some(UnitKind::Metre));
    assert_eq!(UnitKind::from_name("meter"), Some(UnitKind::Metre));
    assert_eq!(UnitKind::from_name("liter"), Some(UnitKind::Litre));
    assert_eq!(UnitKind::from_name("Metre"), None);
    assert_eq!(UnitKind::from_name("furlong"), None);
  }

  #[test]
  fn test_name_round_trips() {
    for name in ["ampere", "gram", "katal", "steradian", "weber", "invalid"] {
      assert_eq!(UnitKind::from_name(name).map(UnitKind::name), Some(name));
    }
  }

  #[test]
  fn test_dimensionless_like() {
    assert!(UnitKind::Radian.is_dimensionless_like());
    assert!(UnitKind::Item.is_dimensionless_like());
    assert!(!UnitKind::Second.is_dimensionless_like());
    assert!(!UnitKind::Invalid.is_dimensionless_like());
  }

  #[test]
  fn test_to_si() {
    assert_eq!(UnitKind::Metre.to_si(), SiExpansion { bases: &[(UnitKind::Metre, 1)], multiplier: 1.0 });
    assert_eq!(UnitKind::Litre.to_si().multiplier, 0.001);
    assert_eq!(UnitKind::Newton.to_si().bases, &[(UnitKind::Kilogram, 1), (UnitKind::Metre, 1), (UnitKind::Second, -2)]);
    assert!(UnitKind::Radian.to_si().bases.is_empty());
  }

  #[test]
  fn test_si_bases_expand_to_themselves() {
    for kind in [UnitKind::Ampere, UnitKind::Kilogram, UnitKind::Second] {
      assert!(kind.is_si_base());
      assert_eq!(kind.to_si().bases, &[(kind, 1)]);
    }
    assert!(!UnitKind::Gram.is_si_base());
  }
}

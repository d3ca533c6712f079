
//! Rendering of expression trees as content MathML.
//!
//! The backend builds a [`MathmlElement`] tree, which is serialised
//! separately so that indentation and the XML declaration stay
//! configurable.

use super::{compile, Backend, BackendValue, CompileError};
use crate::ast::{walker, Kind, Node};

use html_escape::encode_safe;
use serde::{Serialize, Deserialize};

pub const URI_MATHML_DEFINITION: &str = "http://www.w3.org/1998/Math/MathML";
pub const URI_SBML_NAMESPACE: &str = "http://www.sbml.org/sbml/level3/version1/core";
pub const URI_RATE_OF_DEFINITION: &str = "http://www.sbml.org/sbml/symbols/rateOf";

const XML_DECLARATION: &str = "<?xml version='1.0' encoding='UTF-8'?>";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MathmlSettings {
  /// The string written once per nesting level.
  pub indent: String,
  pub xml_declaration: bool,
}

/// One element of a MathML document.
#[derive(Debug, Clone, PartialEq)]
pub struct MathmlElement {
  pub name: String,
  pub attributes: Vec<(String, String)>,
  pub content: MathmlContent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MathmlContent {
  Empty,
  /// Character data, as in `cn` and `ci`. A [`TextPart::Sep`] stands
  /// for an inline `<sep/>`.
  Text(Vec<TextPart>),
  Children(Vec<MathmlElement>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TextPart {
  Text(String),
  Sep,
}

#[derive(Debug, Clone, Default)]
pub struct MathmlBackend;

type Value = BackendValue<MathmlElement>;

/// Compiles `node` into a complete `math` element.
pub fn to_mathml_element(node: &Node) -> Result<MathmlElement, CompileError> {
  let body = compile(node, &MathmlBackend)?.into_value();
  let mut math = MathmlElement::new("math", vec![body])
    .with_attribute("xmlns", URI_MATHML_DEFINITION);
  if walker::any(node, |n| n.units().is_some()) {
    math = math.with_attribute("xmlns:sbml", URI_SBML_NAMESPACE);
  }
  Ok(math)
}

pub fn to_mathml(node: &Node, settings: &MathmlSettings) -> Result<String, CompileError> {
  let math = to_mathml_element(node)?;
  let mut out = String::new();
  if settings.xml_declaration {
    out.push_str(XML_DECLARATION);
    out.push('\n');
  }
  math.write(&mut out, &settings.indent, 0);
  // The root element is not followed by a line break.
  if out.ends_with('\n') {
    out.pop();
  }
  Ok(out)
}

impl Default for MathmlSettings {
  fn default() -> Self {
    MathmlSettings {
      indent: String::from("  "),
      xml_declaration: true,
    }
  }
}

impl MathmlElement {
  pub fn new(name: impl Into<String>, children: Vec<MathmlElement>) -> Self {
    MathmlElement {
      name: name.into(),
      attributes: Vec::new(),
      content: MathmlContent::Children(children),
    }
  }

  /// An element with no content, such as `<plus/>`.
  pub fn empty(name: impl Into<String>) -> Self {
    MathmlElement {
      name: name.into(),
      attributes: Vec::new(),
      content: MathmlContent::Empty,
    }
  }

  pub fn text(name: impl Into<String>, parts: Vec<TextPart>) -> Self {
    MathmlElement {
      name: name.into(),
      attributes: Vec::new(),
      content: MathmlContent::Text(parts),
    }
  }

  pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.attributes.push((key.into(), value.into()));
    self
  }

  pub fn attribute(&self, key: &str) -> Option<&str> {
    self.attributes.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
  }

  pub fn children(&self) -> &[MathmlElement] {
    match &self.content {
      MathmlContent::Children(children) => children,
      _ => &[],
    }
  }

  /// `<apply>` with an empty operator element followed by the
  /// operands.
  pub fn apply<I>(operator: impl Into<String>, operands: I) -> Self
  where I: IntoIterator<Item = MathmlElement> {
    MathmlElement::apply_with(MathmlElement::empty(operator), operands)
  }

  pub fn apply_with<I>(head: MathmlElement, operands: I) -> Self
  where I: IntoIterator<Item = MathmlElement> {
    let children = std::iter::once(head).chain(operands).collect();
    MathmlElement::new("apply", children)
  }

  /// Serialises this element at nesting depth `depth`, followed by a
  /// line break.
  pub fn write(&self, out: &mut String, indent: &str, depth: usize) {
    for _ in 0..depth {
      out.push_str(indent);
    }
    out.push('<');
    out.push_str(&self.name);
    for (key, value) in &self.attributes {
      out.push_str(&format!(" {}=\"{}\"", key, encode_safe(value)));
    }
    match &self.content {
      MathmlContent::Empty => out.push_str("/>"),
      MathmlContent::Text(parts) => {
        out.push('>');
        for part in parts {
          match part {
            TextPart::Text(text) => out.push_str(&format!(" {} ", encode_safe(text))),
            TextPart::Sep => out.push_str("<sep/>"),
          }
        }
        out.push_str(&format!("</{}>", self.name));
      }
      MathmlContent::Children(children) => {
        out.push_str(">\n");
        for child in children {
          child.write(out, indent, depth + 1);
        }
        for _ in 0..depth {
          out.push_str(indent);
        }
        out.push_str(&format!("</{}>", self.name));
      }
    }
    out.push('\n');
  }
}

fn cn(kind: &str, parts: Vec<TextPart>, units: Option<&str>) -> MathmlElement {
  let element = MathmlElement::text("cn", parts).with_attribute("type", kind);
  match units {
    Some(units) => element.with_attribute("sbml:units", units),
    None => element,
  }
}

fn text(value: impl Into<String>) -> TextPart {
  TextPart::Text(value.into())
}

fn csymbol(definition_url: &str, name: &str) -> MathmlElement {
  MathmlElement::text("csymbol", vec![text(name)])
    .with_attribute("encoding", "text")
    .with_attribute("definitionURL", definition_url)
}

fn values(operands: &[Value]) -> impl Iterator<Item = MathmlElement> + '_ {
  operands.iter().map(|operand| operand.value.clone())
}

impl Backend for MathmlBackend {
  type Value = MathmlElement;
  type Error = CompileError;

  fn integer(&self, value: i64, units: Option<&str>) -> Result<MathmlElement, CompileError> {
    Ok(cn("integer", vec![text(value.to_string())], units))
  }

  fn real(&self, value: f64, units: Option<&str>) -> Result<MathmlElement, CompileError> {
    Ok(if value.is_nan() {
      MathmlElement::empty("notanumber")
    } else if value == f64::INFINITY {
      MathmlElement::empty("infinity")
    } else if value == f64::NEG_INFINITY {
      MathmlElement::apply("minus", [MathmlElement::empty("infinity")])
    } else {
      cn("real", vec![text(format!("{value}"))], units)
    })
  }

  fn real_e(&self, mantissa: f64, exponent: i64, units: Option<&str>) -> Result<MathmlElement, CompileError> {
    let parts = vec![text(format!("{mantissa}")), TextPart::Sep, text(exponent.to_string())];
    Ok(cn("e-notation", parts, units))
  }

  fn rational(&self, numerator: i64, denominator: i64, units: Option<&str>) -> Result<MathmlElement, CompileError> {
    let parts = vec![text(numerator.to_string()), TextPart::Sep, text(denominator.to_string())];
    Ok(cn("rational", parts, units))
  }

  fn identifier(&self, name: &str) -> Result<MathmlElement, CompileError> {
    Ok(MathmlElement::text("ci", vec![text(name)]))
  }

  fn symbol_time(&self, name: Option<&str>) -> Result<MathmlElement, CompileError> {
    Ok(csymbol(crate::ast::kind::URI_TIME_DEFINITION, name.unwrap_or("time")))
  }

  fn symbol_avogadro(&self, name: Option<&str>) -> Result<MathmlElement, CompileError> {
    Ok(csymbol(crate::ast::kind::URI_AVOGADRO_DEFINITION, name.unwrap_or("avogadro")))
  }

  fn constant(&self, kind: Kind) -> Result<MathmlElement, CompileError> {
    Ok(MathmlElement::empty(kind.name()))
  }

  fn plus(&self, operands: &[Value]) -> Result<MathmlElement, CompileError> {
    Ok(MathmlElement::apply("plus", values(operands)))
  }

  fn minus(&self, operands: &[Value]) -> Result<MathmlElement, CompileError> {
    Ok(MathmlElement::apply("minus", values(operands)))
  }

  fn unary_minus(&self, operand: &Value) -> Result<MathmlElement, CompileError> {
    Ok(MathmlElement::apply("minus", [operand.value.clone()]))
  }

  fn times(&self, operands: &[Value]) -> Result<MathmlElement, CompileError> {
    Ok(MathmlElement::apply("times", values(operands)))
  }

  fn divide(&self, numerator: &Value, denominator: &Value) -> Result<MathmlElement, CompileError> {
    Ok(MathmlElement::apply("divide", [numerator.value.clone(), denominator.value.clone()]))
  }

  fn power(&self, base: &Value, exponent: &Value) -> Result<MathmlElement, CompileError> {
    Ok(MathmlElement::apply("power", [base.value.clone(), exponent.value.clone()]))
  }

  fn root(&self, degree: Option<&Value>, radicand: &Value) -> Result<MathmlElement, CompileError> {
    let degree = degree.map(|degree| MathmlElement::new("degree", vec![degree.value.clone()]));
    Ok(MathmlElement::apply("root", degree.into_iter().chain([radicand.value.clone()])))
  }

  fn log(&self, base: Option<&Value>, value: &Value) -> Result<MathmlElement, CompileError> {
    let base = base.map(|base| MathmlElement::new("logbase", vec![base.value.clone()]));
    Ok(MathmlElement::apply("log", base.into_iter().chain([value.value.clone()])))
  }

  fn ln(&self, value: &Value) -> Result<MathmlElement, CompileError> {
    Ok(MathmlElement::apply("ln", [value.value.clone()]))
  }

  fn unary_function(&self, kind: Kind, argument: &Value) -> Result<MathmlElement, CompileError> {
    if kind == Kind::FunctionRateOf {
      let head = csymbol(URI_RATE_OF_DEFINITION, "rateOf");
      return Ok(MathmlElement::apply_with(head, [argument.value.clone()]));
    }
    Ok(MathmlElement::apply(kind.name(), [argument.value.clone()]))
  }

  fn binary_function(&self, kind: Kind, left: &Value, right: &Value) -> Result<MathmlElement, CompileError> {
    Ok(MathmlElement::apply(kind.name(), [left.value.clone(), right.value.clone()]))
  }

  fn nary_function(&self, kind: Kind, arguments: &[Value]) -> Result<MathmlElement, CompileError> {
    Ok(MathmlElement::apply(kind.name(), values(arguments)))
  }

  fn delay(&self, name: Option<&str>, value: &Value, delay: &Value) -> Result<MathmlElement, CompileError> {
    let head = csymbol(crate::ast::kind::URI_DELAY_DEFINITION, name.unwrap_or("delay"));
    Ok(MathmlElement::apply_with(head, [value.value.clone(), delay.value.clone()]))
  }

  fn relational(&self, kind: Kind, operands: &[Value]) -> Result<MathmlElement, CompileError> {
    Ok(MathmlElement::apply(kind.name(), values(operands)))
  }

  fn logical(&self, kind: Kind, operands: &[Value]) -> Result<MathmlElement, CompileError> {
    Ok(MathmlElement::apply(kind.name(), values(operands)))
  }

  fn not(&self, operand: &Value) -> Result<MathmlElement, CompileError> {
    Ok(MathmlElement::apply("not", [operand.value.clone()]))
  }

  fn piecewise(&self, pieces: &[(Value, Value)], otherwise: Option<&Value>) -> Result<MathmlElement, CompileError> {
    let mut children: Vec<MathmlElement> = pieces.iter()
      .map(|(value, condition)| MathmlElement::new("piece", vec![value.value.clone(), condition.value.clone()]))
      .collect();
    if let Some(otherwise) = otherwise {
      children.push(MathmlElement::new("otherwise", vec![otherwise.value.clone()]));
    }
    Ok(MathmlElement::new("piecewise", children))
  }

  fn lambda(&self, parameters: &[Value], body: &Value) -> Result<MathmlElement, CompileError> {
    let mut children: Vec<MathmlElement> = parameters.iter()
      .map(|parameter| MathmlElement::new("bvar", vec![parameter.value.clone()]))
      .collect();
    children.push(body.value.clone());
    Ok(MathmlElement::new("lambda", children))
  }

  fn function_call(&self, name: &str, arguments: &[Value]) -> Result<MathmlElement, CompileError> {
    let head = MathmlElement::text("ci", vec![text(name)]);
    Ok(MathmlElement::apply_with(head, values(arguments)))
  }

  fn vector(&self, elements: &[Value]) -> Result<MathmlElement, CompileError> {
    Ok(MathmlElement::new("vector", values(elements).collect()))
  }

  fn selector(&self, operands: &[Value]) -> Result<MathmlElement, CompileError> {
    Ok(MathmlElement::apply("selector", values(operands)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ast::builder::*;

  fn body(node: &Node) -> String {
    let settings = MathmlSettings { indent: String::from("  "), xml_declaration: false };
    to_mathml(node, &settings).unwrap()
  }

  #[test]
  fn test_divide_fixture() {
    let expected = "<?xml version='1.0' encoding='UTF-8'?>\n\
      <math xmlns=\"http://www.w3.org/1998/Math/MathML\">\n  \
        <apply>\n    \
          <divide/>\n    \
          <cn type=\"integer\"> 22 </cn>\n    \
          <cn type=\"integer\"> 7 </cn>\n  \
        </apply>\n\
      </math>";
    assert_eq!(frac(22, 7).to_mathml().unwrap(), expected);
  }

  #[test]
  fn test_divide_one_by_one() {
    let node = divide_by(1, 1);
    let expected = "<?xml version='1.0' encoding='UTF-8'?>\n\
      <math xmlns=\"http://www.w3.org/1998/Math/MathML\">\n  \
        <apply>\n    \
          <divide/>\n    \
          <cn type=\"integer\"> 1 </cn>\n    \
          <cn type=\"integer\"> 1 </cn>\n  \
        </apply>\n\
      </math>";
    assert_eq!(node.to_mathml().unwrap(), expected);
    assert_eq!(node.to_formula().unwrap(), "1/1");
    assert_eq!(node.to_latex().unwrap(), "\\frac{1}{1}");
  }

  #[test]
  fn test_numbers() {
    let math = to_mathml_element(&rational(1, 2)).unwrap();
    let cn = &math.children()[0];
    assert_eq!(cn.attribute("type"), Some("rational"));
    assert!(body(&rational(1, 2)).contains("<cn type=\"rational\"> 1 <sep/> 2 </cn>"));
    assert!(body(&real_e(1.5, 3)).contains("<cn type=\"e-notation\"> 1.5 <sep/> 3 </cn>"));
    assert!(body(&real(0.000166)).contains("<cn type=\"real\"> 0.000166 </cn>"));
    assert!(body(&real(f64::NAN)).contains("<notanumber/>"));
    assert!(body(&real(f64::INFINITY)).contains("<infinity/>"));
    let text = body(&real(f64::NEG_INFINITY));
    assert!(text.contains("<minus/>") && text.contains("<infinity/>"));
  }

  #[test]
  fn test_units_namespace() {
    let node = plus(with_units(integer(5), "mole"), name("x"));
    let text = body(&node);
    assert!(text.starts_with(
      "<math xmlns=\"http://www.w3.org/1998/Math/MathML\" xmlns:sbml=\"http://www.sbml.org/sbml/level3/version1/core\">"
    ));
    assert!(text.contains("<cn type=\"integer\" sbml:units=\"mole\"> 5 </cn>"));
    assert!(!body(&plus(1, 2)).contains("xmlns:sbml"));
  }

  #[test]
  fn test_csymbols() {
    let text = body(&delay(name("x"), 1));
    assert!(text.contains(
      "<csymbol encoding=\"text\" definitionURL=\"http://www.sbml.org/sbml/symbols/delay\"> delay </csymbol>"
    ));
    let text = body(&Node::new(Kind::NameTime));
    assert!(text.contains("definitionURL=\"http://www.sbml.org/sbml/symbols/time\"> time </csymbol>"));
  }

  #[test]
  fn test_qualifiers() {
    let expected = "<math xmlns=\"http://www.w3.org/1998/Math/MathML\">\n\
      \x20 <apply>\n\
      \x20   <log/>\n\
      \x20   <logbase>\n\
      \x20     <cn type=\"integer\"> 2 </cn>\n\
      \x20   </logbase>\n\
      \x20   <ci> x </ci>\n\
      \x20 </apply>\n\
      </math>";
    assert_eq!(body(&log_base(2, name("x"))), expected);
    assert!(body(&root(3, name("x"))).contains("<degree>"));
    assert!(body(&ln(name("x"))).contains("<ln/>"));
  }

  #[test]
  fn test_piecewise_and_lambda() {
    let text = body(&piecewise([integer(1), gt(name("x"), 0), integer(0)]));
    assert!(text.contains("<piecewise>"));
    assert!(text.contains("<piece>"));
    assert!(text.contains("<otherwise>"));
    let math = to_mathml_element(&lambda(["x"], name("x"))).unwrap();
    let lambda = &math.children()[0];
    assert_eq!(lambda.name, "lambda");
    assert_eq!(lambda.children()[0].name, "bvar");
  }

  #[test]
  fn test_escaping() {
    let text = body(&function_call("f<g", [integer(1)]));
    assert!(text.contains("<ci> f&lt;g </ci>"));
  }

  #[test]
  fn test_custom_indent() {
    let settings = MathmlSettings { indent: String::from("\t"), xml_declaration: false };
    let text = to_mathml(&constant(Kind::ConstantPi), &settings).unwrap();
    assert_eq!(text, "<math xmlns=\"http://www.w3.org/1998/Math/MathML\">\n\t<pi/>\n</math>");
  }
}

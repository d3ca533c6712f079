
//! Small helpers shared by the lexers.

use regex::{Regex, escape};

use std::cmp::Reverse;

/// Constructs a regex which matches any string in `options`, trying
/// longer options first. `helper` receives the regex source (a
/// non-capturing group) and may wrap it, for instance in an anchor.
///
/// Panics if `helper` produces an invalid regular expression.
pub fn regex_opt_with<'a, I, F>(options: I, helper: F) -> Regex
where I: IntoIterator<Item = &'a str>,
      F: FnOnce(String) -> String {
  let mut options: Vec<_> = options.into_iter().collect();
  options.sort_by_key(|a| Reverse(a.len()));

  let regex_str = options.into_iter().map(escape).collect::<Vec<_>>().join("|");
  let regex_str = helper(format!("(?:{regex_str})"));
  Regex::new(&regex_str).unwrap_or_else(|_| {
    panic!("Invalid regular expression: {}", regex_str);
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_regex_opt_with_prefers_longer_options() {
    let re = regex_opt_with(["<", "<=", "&&"], |s| format!("^{s}"));
    assert_eq!(re.to_string(), "^(?:<=|&&|<)");
    assert_eq!(re.find("<= 1").map(|m| m.as_str()), Some("<="));
    assert_eq!(re.find("< 1").map(|m| m.as_str()), Some("<"));
    assert!(!re.is_match("a < 1"));
  }

  #[test]
  fn test_regex_opt_with_escapes() {
    let re = regex_opt_with(["^", "*", "("], |s| s);
    assert!(re.is_match("*"));
    assert!(re.is_match("("));
    assert!(!re.is_match("x"));
  }
}

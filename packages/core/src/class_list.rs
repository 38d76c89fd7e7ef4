/// How a single class token is treated when a prefix is applied.
/// Rules are checked in declaration order and the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixDecision {
  /// `[mask-type:luminance]` style tokens. The bracket contents are a raw CSS value.
  ArbitraryValue,
  /// `--my-var`, a custom property reference.
  CustomProperty,
  /// The token already carries the prefix, so prefixing again would double it.
  AlreadyPrefixed,
  Plain,
}

impl PrefixDecision {
  pub fn classify(token: &str, prefix: &str) -> Self {
    if token.starts_with('[') && token.ends_with(']') {
      PrefixDecision::ArbitraryValue
    } else if token.starts_with("--") {
      PrefixDecision::CustomProperty
    } else if token.starts_with(prefix) {
      PrefixDecision::AlreadyPrefixed
    } else {
      PrefixDecision::Plain
    }
  }
}

/// Prefixes every class in a whitespace separated class list
/// Empty tokens are dropped and the survivors are joined with single spaces
/// Example: "bg-red-500  text-sm" with "foo:" -> "foo:bg-red-500 foo:text-sm"
pub fn prefix_classes(class_string: &str, prefix: &str) -> String {
  class_string
    .split_whitespace()
    .map(|token| match PrefixDecision::classify(token, prefix) {
      PrefixDecision::Plain => format!("{prefix}{token}"),
      _ => token.to_string(),
    })
    .collect::<Vec<String>>()
    .join(" ")
}

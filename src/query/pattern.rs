use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::encoding::{decode_component, encode_component};
use crate::error::TreeError;
use crate::node;

/// Segment grammar: optional marker, then skip / wildcard / option list,
/// then an optional `^value`, then the closing marker.
static SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<open>[\[{])?(?:(?P<skip>\\)|(?P<wild>\|)|(?P<keys>[^<>^|\\\[\]{}]+(?:<[^<>^|\\\[\]{}]+)*))(?:\^(?P<value>[^<>^|\\\[\]{}]*))?(?P<close>[\]}])?$",
    )
    .expect("segment grammar is a valid regex")
});

pub(crate) const SKIP: char = '\\';
pub(crate) const WILDCARD: char = '|';
pub(crate) const OPTION_SEPARATOR: char = '<';
pub(crate) const VALUE_SEPARATOR: char = '^';

/// Tag carried by a marked pattern, named after its opening delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// `{...}`
    Brace,
    /// `[...]`
    Bracket,
}

impl Marker {
    pub fn from_open(c: char) -> Option<Self> {
        match c {
            '{' => Some(Marker::Brace),
            '[' => Some(Marker::Bracket),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Marker::Brace => '{',
            Marker::Bracket => '[',
        }
    }

    pub fn closing(self) -> char {
        match self {
            Marker::Brace => '}',
            Marker::Bracket => ']',
        }
    }
}

/// Which keys of a node a pattern selects, before any value constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    Literal(String),
    Options(Vec<String>),
    Wildcard,
}

/// One key-matching level of a query.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValuePattern {
    matcher: Matcher,
    value: Option<Value>,
    marker: Option<Marker>,
}

/// One element of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Zero or more levels until the next pattern matches.
    Skip,
    Match(KeyValuePattern),
}

impl KeyValuePattern {
    pub fn new(matcher: Matcher) -> Self {
        KeyValuePattern {
            matcher,
            value: None,
            marker: None,
        }
    }

    pub fn literal(key: impl Into<String>) -> Self {
        Self::new(Matcher::Literal(key.into()))
    }

    pub fn options<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Matcher::Options(keys.into_iter().map(Into::into).collect()))
    }

    pub fn wildcard() -> Self {
        Self::new(Matcher::Wildcard)
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn set_value(&mut self, value: Option<Value>) {
        self.value = value;
    }

    pub fn marker(&self) -> Option<Marker> {
        self.marker
    }

    /// A bare literal with no constraint or marker, i.e. a plain path key.
    pub fn as_plain_key(&self) -> Option<&str> {
        match (&self.matcher, &self.value, self.marker) {
            (Matcher::Literal(key), None, None) => Some(key),
            _ => None,
        }
    }

    /// Match on the key alone, ignoring any value constraint.
    pub fn matches_key_name(&self, key: &str) -> bool {
        match &self.matcher {
            Matcher::Literal(expected) => expected == key,
            Matcher::Options(options) => options.iter().any(|o| o == key),
            Matcher::Wildcard => true,
        }
    }

    /// Match `key` as a child of `node`, honoring the value constraint.
    pub fn matches_key(&self, node: &Value, key: &str) -> bool {
        if !self.matches_key_name(key) {
            return false;
        }
        match node::child(node, key) {
            Some(actual) => self
                .value
                .as_ref()
                .map_or(true, |expected| value_matches(actual, expected)),
            None => false,
        }
    }

    /// Keys of `node` selected by this pattern, in node order.
    pub fn matching_keys(&self, node: &Value) -> Vec<String> {
        match &self.matcher {
            Matcher::Literal(key) => {
                if self.matches_key(node, key) {
                    vec![key.clone()]
                } else {
                    Vec::new()
                }
            }
            _ => node::child_keys(node)
                .into_iter()
                .filter(|key| self.matches_key(node, key))
                .collect(),
        }
    }
}

/// Structural equality, plus numbers and booleans compared against their
/// text form so that a parsed `^1` matches the number `1`.
fn value_matches(actual: &Value, expected: &Value) -> bool {
    if actual == expected {
        return true;
    }
    match (actual, expected) {
        (Value::Number(n), Value::String(s)) => n.to_string() == *s,
        (Value::Bool(b), Value::String(s)) => b.to_string() == *s,
        _ => false,
    }
}

impl Pattern {
    /// Parse one `>`-delimited query segment.
    pub fn parse(segment: &str) -> Result<Self, TreeError> {
        let caps = SEGMENT
            .captures(segment)
            .ok_or_else(|| TreeError::pattern(segment, "malformed segment"))?;

        let open = caps.name("open").and_then(|m| m.as_str().chars().next());
        let close = caps.name("close").and_then(|m| m.as_str().chars().next());
        let marker = match (open, close) {
            (None, None) => None,
            (Some(open), Some(close)) => match Marker::from_open(open) {
                Some(marker) if marker.closing() == close => Some(marker),
                _ => return Err(TreeError::pattern(segment, "unrecognized marker")),
            },
            _ => return Err(TreeError::pattern(segment, "unbalanced marker")),
        };

        let value = caps.name("value").map(|m| m.as_str());

        if caps.name("skip").is_some() {
            if marker.is_some() {
                return Err(TreeError::pattern(segment, "skip cannot be marked"));
            }
            if value.is_some() {
                return Err(TreeError::pattern(segment, "skip cannot carry a value"));
            }
            return Ok(Pattern::Skip);
        }

        let matcher = if caps.name("wild").is_some() {
            Matcher::Wildcard
        } else {
            let keys = caps.name("keys").map_or("", |m| m.as_str());
            let mut options = keys
                .split(OPTION_SEPARATOR)
                .map(decode_component)
                .collect::<Result<Vec<_>, _>>()?;
            if options.len() == 1 {
                Matcher::Literal(options.remove(0))
            } else {
                Matcher::Options(options)
            }
        };

        let value = value
            .map(|v| decode_component(v).map(Value::String))
            .transpose()?;

        Ok(Pattern::Match(KeyValuePattern {
            matcher,
            value,
            marker,
        }))
    }

    pub fn literal(key: impl Into<String>) -> Self {
        Pattern::Match(KeyValuePattern::literal(key))
    }

    pub fn is_skipper(&self) -> bool {
        matches!(self, Pattern::Skip)
    }

    pub fn marker(&self) -> Option<Marker> {
        match self {
            Pattern::Skip => None,
            Pattern::Match(p) => p.marker(),
        }
    }

    pub fn as_match(&self) -> Option<&KeyValuePattern> {
        match self {
            Pattern::Skip => None,
            Pattern::Match(p) => Some(p),
        }
    }

    pub fn as_match_mut(&mut self) -> Option<&mut KeyValuePattern> {
        match self {
            Pattern::Skip => None,
            Pattern::Match(p) => Some(p),
        }
    }
}

impl From<KeyValuePattern> for Pattern {
    fn from(pattern: KeyValuePattern) -> Self {
        Pattern::Match(pattern)
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Literal(key) => f.write_str(&encode_component(key)),
            Matcher::Options(options) => {
                for (i, option) in options.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{OPTION_SEPARATOR}")?;
                    }
                    f.write_str(&encode_component(option))?;
                }
                Ok(())
            }
            Matcher::Wildcard => write!(f, "{WILDCARD}"),
        }
    }
}

impl fmt::Display for KeyValuePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(marker) = self.marker {
            write!(f, "{}", marker.as_char())?;
        }
        write!(f, "{}", self.matcher)?;
        match &self.value {
            Some(Value::String(s)) => write!(f, "{VALUE_SEPARATOR}{}", encode_component(s))?,
            Some(other) => write!(f, "{VALUE_SEPARATOR}{}", encode_component(&other.to_string()))?,
            None => {}
        }
        if let Some(marker) = self.marker {
            write!(f, "{}", marker.closing())?;
        }
        Ok(())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Skip => write!(f, "{SKIP}"),
            Pattern::Match(p) => write!(f, "{p}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse_match(segment: &str) -> KeyValuePattern {
        match Pattern::parse(segment).unwrap() {
            Pattern::Match(p) => p,
            Pattern::Skip => panic!("expected a key matcher for {segment:?}"),
        }
    }

    #[test]
    fn parse_skip() {
        assert_eq!(Pattern::parse("\\").unwrap(), Pattern::Skip);
        assert!(Pattern::parse("\\").unwrap().is_skipper());
    }

    #[test]
    fn parse_wildcard() {
        assert_eq!(parse_match("|").matcher(), &Matcher::Wildcard);
    }

    #[test]
    fn parse_options() {
        assert_eq!(
            parse_match("a<b<c").matcher(),
            &Matcher::Options(vec!["a".into(), "b".into(), "c".into()])
        );
    }

    #[test]
    fn parse_literal_with_value() {
        let p = parse_match("key^value");
        assert_eq!(p.matcher(), &Matcher::Literal("key".into()));
        assert_eq!(p.value(), Some(&json!("value")));
        assert_eq!(p.marker(), None);
    }

    #[test]
    fn parse_wildcard_and_options_with_value() {
        assert_eq!(parse_match("|^world").value(), Some(&json!("world")));
        let p = parse_match("a<b^1");
        assert_eq!(p.matcher(), &Matcher::Options(vec!["a".into(), "b".into()]));
        assert_eq!(p.value(), Some(&json!("1")));
    }

    #[test]
    fn parse_markers() {
        assert_eq!(parse_match("{|}").marker(), Some(Marker::Brace));
        let p = parse_match("[a^b]");
        assert_eq!(p.marker(), Some(Marker::Bracket));
        assert_eq!(p.matcher(), &Matcher::Literal("a".into()));
        assert_eq!(p.value(), Some(&json!("b")));
    }

    #[test]
    fn parse_decodes_keys_and_values() {
        let p = parse_match("a%3Eb<c%7Cd^x%5Ey");
        assert_eq!(
            p.matcher(),
            &Matcher::Options(vec!["a>b".into(), "c|d".into()])
        );
        assert_eq!(p.value(), Some(&json!("x^y")));
    }

    #[test]
    fn marked_skip_is_rejected() {
        assert!(Pattern::parse("{\\}").is_err());
        assert!(Pattern::parse("[\\]").is_err());
    }

    #[test]
    fn valued_skip_is_rejected() {
        assert!(Pattern::parse("\\^x").is_err());
    }

    #[test]
    fn malformed_segments_are_rejected() {
        for bad in ["a<<b", "<a", "a<", "a^b^c", "|a", "a|", "\\a", "{a]", "{a", "a}", "(a]", "{}", "^x", "a^b%zz"] {
            assert!(Pattern::parse(bad).is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn empty_value_is_allowed() {
        assert_eq!(parse_match("a^").value(), Some(&json!("")));
    }

    #[test]
    fn display_round_trips() {
        for text in ["\\", "|", "a<b<c", "key^value", "|^world", "a<b^1", "{|}", "[a^b]", "a%3Eb^x%5Ey"] {
            assert_eq!(Pattern::parse(text).unwrap().to_string(), text);
        }
    }

    #[test]
    fn display_non_string_value() {
        let p = KeyValuePattern::literal("n").with_value(json!(3));
        assert_eq!(p.to_string(), "n^3");
    }

    #[test]
    fn set_value_changes_constraint() {
        let mut p = KeyValuePattern::wildcard();
        p.set_value(Some(json!("x")));
        assert_eq!(p.to_string(), "|^x");
        p.set_value(None);
        assert_eq!(p.to_string(), "|");
    }

    #[test]
    fn literal_and_options_match_keys() {
        let node = json!({"a": 1, "b": 2, "c": 3});
        assert!(parse_match("a").matches_key(&node, "a"));
        assert!(!parse_match("a").matches_key(&node, "b"));
        assert!(parse_match("a<c").matches_key(&node, "c"));
        assert!(!parse_match("a<c").matches_key(&node, "b"));
        assert!(!parse_match("z").matches_key(&node, "z"));
    }

    #[test]
    fn valued_wildcard_reduces_key_set() {
        let node = json!({"foo": "bar", "hello": "world", "test": 1});
        assert_eq!(parse_match("|^world").matching_keys(&node), vec!["hello"]);
        assert_eq!(parse_match("|").matching_keys(&node), vec!["foo", "hello", "test"]);
    }

    #[test]
    fn value_constraint_compares_scalars_by_text() {
        let node = json!({"n": 1, "flag": true, "s": "1"});
        assert_eq!(parse_match("|^1").matching_keys(&node), vec!["n", "s"]);
        assert_eq!(parse_match("|^true").matching_keys(&node), vec!["flag"]);
    }

    #[test]
    fn options_follow_node_order() {
        let node = json!({"x": 0, "b": 0, "a": 0});
        assert_eq!(parse_match("a<b").matching_keys(&node), vec!["b", "a"]);
    }

    #[test]
    fn array_keys_are_indices() {
        let node = json!(["p", "q", "p"]);
        assert_eq!(parse_match("|^p").matching_keys(&node), vec!["0", "2"]);
        assert_eq!(parse_match("1").matching_keys(&node), vec!["1"]);
    }
}

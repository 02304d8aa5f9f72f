pub mod pattern;

use std::fmt;
use std::str::FromStr;

use crate::encoding::decode_component;
use crate::error::TreeError;
use crate::path::{Path, SEPARATOR};

pub use pattern::{KeyValuePattern, Marker, Matcher, Pattern};

/// Characters that make a string a query rather than a plain path.
const QUERY_CHARS: [char; 4] = ['<', '^', '|', '\\'];

/// True when `text` uses query syntax (options, values, wildcards or skips).
pub fn is_query_text(text: &str) -> bool {
    text.contains(QUERY_CHARS)
}

/// A sequence of patterns, the pattern-matching generalization of a [`Path`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    patterns: Vec<Pattern>,
}

impl Query {
    pub fn new(patterns: Vec<Pattern>) -> Self {
        Query { patterns }
    }

    /// Parse a query string like `users>|>roles>\>admin^true`.
    pub fn parse(input: &str) -> Result<Self, TreeError> {
        if input.is_empty() {
            return Ok(Query::default());
        }
        let patterns = input
            .split(SEPARATOR)
            .map(parse_segment)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Query { patterns })
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn patterns_mut(&mut self) -> &mut [Pattern] {
        &mut self.patterns
    }

    pub fn push(&mut self, pattern: impl Into<Pattern>) {
        self.patterns.push(pattern.into());
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn has_markers(&self) -> bool {
        self.patterns.iter().any(|p| p.marker().is_some())
    }

    /// The longest prefix of plain literal keys.
    pub fn stem_path(&self) -> Path {
        self.patterns
            .iter()
            .map_while(|p| p.as_match().and_then(KeyValuePattern::as_plain_key))
            .collect()
    }

    /// Convert to a path when every pattern is a plain literal key.
    pub fn to_path(&self) -> Result<Path, TreeError> {
        let stem = self.stem_path();
        if stem.len() == self.patterns.len() {
            Ok(stem)
        } else {
            Err(TreeError::NotAPath(self.to_string()))
        }
    }

    /// Single-pass match of this query against a concrete path.
    ///
    /// There is no backtracking: inside a skip, the first key that matches
    /// the next pattern ends the skip. Some paths a backtracking matcher
    /// would accept are rejected, e.g. `\>a>b` against `a>a>b`. Value
    /// constraints are ignored since there is no node to test them on.
    pub fn matches_path(&self, path: &Path) -> bool {
        let keys = path.keys();
        let mut key_pos = 0;
        let mut skipping = false;
        let mut ends_with_skip = false;

        for pattern in &self.patterns {
            match pattern {
                Pattern::Skip => {
                    skipping = true;
                    ends_with_skip = true;
                }
                Pattern::Match(matcher) => {
                    ends_with_skip = false;
                    loop {
                        let Some(key) = keys.get(key_pos) else {
                            return false;
                        };
                        key_pos += 1;
                        if matcher.matches_key_name(key) {
                            skipping = false;
                            break;
                        }
                        if !skipping {
                            return false;
                        }
                    }
                }
            }
        }

        key_pos == keys.len() || ends_with_skip
    }
}

fn parse_segment(segment: &str) -> Result<Pattern, TreeError> {
    if segment.contains(['<', '^', '|', '\\', '{', '[', '}', ']']) {
        Pattern::parse(segment)
    } else {
        Ok(Pattern::literal(decode_component(segment)?))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, pattern) in self.patterns.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            write!(f, "{pattern}")?;
        }
        Ok(())
    }
}

impl FromStr for Query {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Query::parse(s)
    }
}

impl TryFrom<&str> for Query {
    type Error = TreeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Query::parse(s)
    }
}

/// Each element is one already-split segment.
impl TryFrom<Vec<String>> for Query {
    type Error = TreeError;

    fn try_from(segments: Vec<String>) -> Result<Self, Self::Error> {
        let patterns = segments
            .iter()
            .map(|s| parse_segment(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Query { patterns })
    }
}

impl From<Path> for Query {
    fn from(path: Path) -> Self {
        Query {
            patterns: path.into_keys().into_iter().map(Pattern::literal).collect(),
        }
    }
}

impl From<&Path> for Query {
    fn from(path: &Path) -> Self {
        Query {
            patterns: path.iter().cloned().map(Pattern::literal).collect(),
        }
    }
}

impl FromIterator<Pattern> for Query {
    fn from_iter<I: IntoIterator<Item = Pattern>>(iter: I) -> Self {
        Query {
            patterns: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn q(text: &str) -> Query {
        Query::parse(text).unwrap()
    }

    fn p(keys: &[&str]) -> Path {
        Path::from(keys)
    }

    #[test]
    fn parse_mixed_segments() {
        let query = q("a>|>b<c>\\>d^x>{e}");
        assert_eq!(query.len(), 6);
        assert_eq!(query.patterns()[0], Pattern::literal("a"));
        assert_eq!(query.patterns()[1], Pattern::Match(KeyValuePattern::wildcard()));
        assert!(query.patterns()[3].is_skipper());
        assert_eq!(query.patterns()[5].marker(), Some(Marker::Brace));
        assert!(query.has_markers());
    }

    #[test]
    fn parse_empty_is_empty() {
        assert!(q("").is_empty());
        assert!(q("").matches_path(&Path::new()));
    }

    #[test]
    fn parse_propagates_pattern_errors() {
        assert!(Query::parse("a>{\\}>b").is_err());
        assert!(Query::parse("a>x<<y").is_err());
        assert!(Query::parse("a%zz").is_err());
    }

    #[test]
    fn classifies_query_text() {
        assert!(is_query_text("a>|"));
        assert!(is_query_text("a<b"));
        assert!(is_query_text("a^b"));
        assert!(is_query_text("\\>a"));
        assert!(!is_query_text("a>b>c"));
    }

    #[test]
    fn display_round_trips() {
        for text in ["a>b", "a>|>c", "a>\\>c", "a<b", "{|}>|^hello", "x%3Ey>[a^b]>\\"] {
            assert_eq!(q(text).to_string(), text);
        }
    }

    #[test]
    fn stem_path_stops_at_first_pattern() {
        assert_eq!(q("a>b>|>c").stem_path(), p(&["a", "b"]));
        assert_eq!(q("a>b^x>c").stem_path(), p(&["a"]));
        assert_eq!(q("{a}>b").stem_path(), Path::new());
        assert_eq!(q("a>b").stem_path(), p(&["a", "b"]));
    }

    #[test]
    fn to_path_requires_plain_literals() {
        assert_eq!(q("a>b").to_path().unwrap(), p(&["a", "b"]));
        assert!(q("a>|").to_path().is_err());
    }

    #[test]
    fn from_path_and_segments() {
        let from_path = Query::from(p(&["a", "b>c"]));
        assert_eq!(from_path.to_string(), "a>b%3Ec");

        let segments = Query::try_from(vec!["a".to_string(), "|^x".to_string()]).unwrap();
        assert_eq!(segments.to_string(), "a>|^x");
    }

    #[test]
    fn programmatic_value_composition() {
        let mut query = q("users>|>role");
        if let Some(last) = query.patterns_mut().last_mut().and_then(Pattern::as_match_mut) {
            last.set_value(Some(json!("admin")));
        }
        assert_eq!(query.to_string(), "users>|>role^admin");
    }

    #[test]
    fn wildcard_matches_exactly_one_level() {
        let query = q("a>|>c");
        assert!(query.matches_path(&p(&["a", "x", "c"])));
        assert!(query.matches_path(&p(&["a", "zzz", "c"])));
        assert!(!query.matches_path(&p(&["a", "x", "y", "c"])));
        assert!(!query.matches_path(&p(&["a", "c"])));
    }

    #[test]
    fn skip_matches_zero_or_more_levels() {
        let query = q("a>\\>c");
        assert!(query.matches_path(&p(&["a", "c"])));
        assert!(query.matches_path(&p(&["a", "x", "c"])));
        assert!(query.matches_path(&p(&["a", "x", "y", "c"])));
        assert!(!query.matches_path(&p(&["a", "c", "d"])));
        assert!(!query.matches_path(&p(&["a", "x"])));
    }

    #[test]
    fn trailing_skip_accepts_anything_after() {
        let query = q("a>\\");
        assert!(query.matches_path(&p(&["a"])));
        assert!(query.matches_path(&p(&["a", "b", "c"])));
        assert!(!query.matches_path(&p(&["b"])));
    }

    #[test]
    fn options_match_any_listed_key() {
        let query = q("a<b");
        assert!(query.matches_path(&p(&["a"])));
        assert!(query.matches_path(&p(&["b"])));
        assert!(!query.matches_path(&p(&["c"])));
    }

    #[test]
    fn skip_takes_first_match_without_backtracking() {
        let query = q("\\>a>b");
        assert!(query.matches_path(&p(&["x", "a", "b"])));
        assert!(!query.matches_path(&p(&["a", "a", "b"])));
    }

    #[test]
    fn matches_path_ignores_value_constraints() {
        assert!(q("a>b^x").matches_path(&p(&["a", "b"])));
    }

    proptest! {
        #[test]
        fn literal_query_matches_like_path_equality(
            query_keys in prop::collection::vec("[a-c]{1,2}", 0..4),
            path_keys in prop::collection::vec("[a-c]{1,2}", 0..4),
        ) {
            let query = Query::from(Path::from(query_keys.clone()));
            let path = Path::from(path_keys.clone());
            prop_assert_eq!(query.matches_path(&path), query_keys == path_keys);
        }

        #[test]
        fn literal_query_string_round_trip(keys in prop::collection::vec("[a-z0-9 >^|]{1,6}", 1..5)) {
            let path = Path::from(keys);
            let query = Query::parse(&path.to_string()).unwrap();
            prop_assert_eq!(query.to_path().unwrap(), path);
        }
    }
}

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::encoding::{decode_component, encode_component};
use crate::error::TreeError;
use crate::node::{self, kind_name, parse_index};

/// Separator between segments in the string form of a path or query.
pub const SEPARATOR: char = '>';

/// An ordered sequence of plain keys addressing one location in a tree.
///
/// The key vector is the canonical form. The string form joins the
/// percent-encoded keys with `>`.
///
/// `trim_left`, `trim_right`, `append` and `prepend` mutate in place;
/// clone first when the original is still needed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    keys: Vec<String>,
}

impl Path {
    pub fn new() -> Self {
        Path { keys: Vec::new() }
    }

    /// Parse a path string like `users>alice>email`.
    ///
    /// Empty or all-whitespace text is the empty (root) path.
    pub fn parse(input: &str) -> Result<Self, TreeError> {
        if input.trim().is_empty() {
            return Ok(Path::new());
        }
        let keys = input
            .split(SEPARATOR)
            .map(decode_component)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Path { keys })
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn into_keys(self) -> Vec<String> {
        self.keys
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.keys.iter()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.keys.last().map(String::as_str)
    }

    pub fn push(&mut self, key: impl Into<String>) {
        self.keys.push(key.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.keys.pop()
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.keys.truncate(len);
    }

    pub(crate) fn clear(&mut self) {
        self.keys.clear();
    }

    /// Remove `n` keys from the front.
    pub fn trim_left(&mut self, n: usize) -> &mut Self {
        let n = n.min(self.keys.len());
        self.keys.drain(..n);
        self
    }

    /// Remove `n` keys from the back.
    pub fn trim_right(&mut self, n: usize) -> &mut Self {
        let keep = self.keys.len().saturating_sub(n);
        self.keys.truncate(keep);
        self
    }

    pub fn append(&mut self, other: &Path) -> &mut Self {
        self.keys.extend(other.keys.iter().cloned());
        self
    }

    pub fn prepend(&mut self, other: &Path) -> &mut Self {
        self.keys.splice(0..0, other.keys.iter().cloned());
        self
    }

    /// True when `root` is a prefix of this path, including equality.
    pub fn is_relative_to(&self, root: &Path) -> bool {
        self.keys.starts_with(&root.keys)
    }

    pub fn is_root_of(&self, other: &Path) -> bool {
        other.is_relative_to(self)
    }

    /// Follow the path from `context` without building anything.
    ///
    /// A missing key anywhere along the way is `Ok(None)`. Only a scalar
    /// starting context is an error.
    pub fn resolve<'v>(&self, context: &'v Value) -> Result<Option<&'v Value>, TreeError> {
        if self.keys.is_empty() {
            return Ok(Some(context));
        }
        if !node::is_container(context) {
            return Err(TreeError::NotAContainer(kind_name(context)));
        }

        let mut current = context;
        for key in &self.keys {
            match node::child(current, key) {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    pub fn resolve_mut<'v>(
        &self,
        context: &'v mut Value,
    ) -> Result<Option<&'v mut Value>, TreeError> {
        if self.keys.is_empty() {
            return Ok(Some(context));
        }
        if !node::is_container(context) {
            return Err(TreeError::NotAContainer(kind_name(context)));
        }

        let mut current = context;
        for key in &self.keys {
            match node::child_mut(current, key) {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Follow the path from `context`, creating an empty object at every
    /// missing or scalar intermediate step.
    ///
    /// The terminal node is created as an empty object when absent; an
    /// existing terminal is returned untouched.
    pub fn resolve_or_build<'v>(&self, context: &'v mut Value) -> Result<&'v mut Value, TreeError> {
        if !node::is_container(context) && !self.keys.is_empty() {
            return Err(TreeError::NotAContainer(kind_name(context)));
        }

        let mut current = context;
        let mut depth = 0;
        while let Some(key) = self.keys.get(depth) {
            current = match current {
                Value::Object(map) => {
                    depth += 1;
                    map.entry(key.clone())
                        .or_insert_with(|| Value::Object(Map::new()))
                }
                Value::Array(items) => {
                    let index =
                        parse_index(key).ok_or_else(|| TreeError::InvalidIndex(key.clone()))?;
                    if index >= items.len() {
                        items.resize(index, Value::Null);
                        items.push(Value::Object(Map::new()));
                    }
                    depth += 1;
                    &mut items[index]
                }
                // The same key is retried on the fresh object.
                scalar => {
                    *scalar = Value::Object(Map::new());
                    scalar
                }
            };
        }
        Ok(current)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(&encode_component(key))?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl From<Vec<String>> for Path {
    fn from(keys: Vec<String>) -> Self {
        Path { keys }
    }
}

impl From<&[&str]> for Path {
    fn from(keys: &[&str]) -> Self {
        keys.iter().copied().collect()
    }
}

impl<const N: usize> From<[&str; N]> for Path {
    fn from(keys: [&str; N]) -> Self {
        keys.into_iter().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Path {
            keys: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

use std::ops::ControlFlow;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::TreeError;
use crate::format::Format;
use crate::node::{self, parse_index};
use crate::path::Path;
use crate::query::{Marker, Query};
use crate::walk::{IterativeTreeWalker, RecursiveTreeWalker, Visit};
use crate::{output, parser};

/// A nested key/value structure addressed by [`Path`]s and searched with
/// [`Query`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    root: Value,
}

impl Default for Tree {
    fn default() -> Self {
        Tree::new()
    }
}

impl From<Value> for Tree {
    fn from(root: Value) -> Self {
        Tree { root }
    }
}

impl From<Tree> for Value {
    fn from(tree: Tree) -> Self {
        tree.root
    }
}

impl Tree {
    /// An empty object tree.
    pub fn new() -> Self {
        Tree {
            root: Value::Object(Map::new()),
        }
    }

    /// Load a tree from JSON, YAML or TOML text.
    pub fn parse(input: &str, format: Format) -> Result<Self, TreeError> {
        parser::parse(input, format).map(Tree::from)
    }

    pub fn render(&self, format: Format, compact: bool) -> Result<String, TreeError> {
        output::format_value(&self.root, format, compact)
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Value {
        &mut self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    /// The node at `path`, if every key along it exists.
    pub fn get_node(&self, path: &Path) -> Option<&Value> {
        path.resolve(&self.root).ok().flatten()
    }

    pub fn get_node_mut(&mut self, path: &Path) -> Option<&mut Value> {
        path.resolve_mut(&mut self.root).ok().flatten()
    }

    /// Store `value` at `path`, creating missing intermediate objects.
    ///
    /// The empty path replaces the root.
    pub fn set_node(&mut self, path: &Path, value: Value) -> Result<(), TreeError> {
        debug!(%path, "set node");
        let slot = path.resolve_or_build(&mut self.root)?;
        *slot = value;
        Ok(())
    }

    /// The node at `path`, storing `generate()` there first when absent.
    pub fn get_safe_node<F>(&mut self, path: &Path, generate: F) -> Result<&mut Value, TreeError>
    where
        F: FnOnce() -> Value,
    {
        let exists = matches!(path.resolve(&self.root), Ok(Some(_)));
        if !exists {
            debug!(%path, "generating missing node");
            self.set_node(path, generate())?;
        }
        path.resolve_or_build(&mut self.root)
    }

    /// Remove the key at `path` from its parent, returning the old value.
    ///
    /// Sibling order is kept; removing an array element shifts the elements
    /// after it down by one.
    pub fn unset_node(&mut self, path: &Path) -> Option<Value> {
        let (parent, key) = self.parent_of(path)?;
        match parent {
            Value::Object(map) => map.shift_remove(&key),
            Value::Array(items) => {
                let index = parse_index(&key).filter(|&i| i < items.len())?;
                Some(items.remove(index))
            }
            _ => None,
        }
    }

    /// Replace the value at `path` with `null`, keeping the key.
    pub fn unset_key(&mut self, path: &Path) -> Option<Value> {
        let (parent, key) = self.parent_of(path)?;
        node::child_mut(parent, &key).map(|slot| std::mem::replace(slot, Value::Null))
    }

    fn parent_of(&mut self, path: &Path) -> Option<(&mut Value, String)> {
        let key = path.last()?.to_string();
        let mut parent_path = path.clone();
        parent_path.trim_right(1);
        let parent = parent_path.resolve_mut(&mut self.root).ok().flatten()?;
        Some((parent, key))
    }

    /// Run `query` and hand every reported node to `handler`.
    pub fn walk_query<'v, F>(&'v self, query: &Query, handler: F) -> ControlFlow<()>
    where
        F: FnMut(&Visit<'_, 'v>) -> ControlFlow<()>,
    {
        RecursiveTreeWalker::new(query).walk(&self.root, handler)
    }

    /// Visit every node below the root in pre-order.
    pub fn for_each_node<'v, F>(&'v self, handler: F) -> ControlFlow<()>
    where
        F: FnMut(&Visit<'_, 'v>) -> ControlFlow<()>,
    {
        IterativeTreeWalker::new().walk(&self.root, handler)
    }

    /// Every path in the tree, parents before children.
    pub fn all_paths(&self) -> Vec<Path> {
        let mut paths = Vec::new();
        let _ = self.for_each_node(|visit| {
            paths.push(visit.path.clone());
            ControlFlow::Continue(())
        });
        paths
    }

    pub fn query_values(&self, query: &Query) -> Vec<&Value> {
        let mut results = Vec::new();
        let _ = self.walk_query(query, |visit| {
            results.push(visit.node);
            ControlFlow::Continue(())
        });
        results
    }

    /// Keys of the reported nodes; the root has no key and is left out.
    pub fn query_keys(&self, query: &Query) -> Vec<String> {
        let mut results = Vec::new();
        let _ = self.walk_query(query, |visit| {
            if let Some(key) = visit.key {
                results.push(key.to_string());
            }
            ControlFlow::Continue(())
        });
        results
    }

    pub fn query_paths(&self, query: &Query) -> Vec<Path> {
        let mut results = Vec::new();
        let _ = self.walk_query(query, |visit| {
            results.push(visit.path.clone());
            ControlFlow::Continue(())
        });
        results
    }

    pub fn query_key_value_pairs(&self, query: &Query) -> Vec<(String, &Value)> {
        let mut results = Vec::new();
        let _ = self.walk_query(query, |visit| {
            if let Some(key) = visit.key {
                results.push((key.to_string(), visit.node));
            }
            ControlFlow::Continue(())
        });
        results
    }

    pub fn query_path_value_pairs(&self, query: &Query) -> Vec<(Path, &Value)> {
        let mut results = Vec::new();
        let _ = self.walk_query(query, |visit| {
            results.push((visit.path.clone(), visit.node));
            ControlFlow::Continue(())
        });
        results
    }

    /// Marked results grouped by marker, groups in first-seen order.
    pub fn query_groups(&self, query: &Query) -> Vec<(Marker, Vec<&Value>)> {
        let mut groups: Vec<(Marker, Vec<&Value>)> = Vec::new();
        let _ = self.walk_query(query, |visit| {
            let Some(marker) = visit.marker else {
                return ControlFlow::Continue(());
            };
            match groups.iter_mut().find(|(m, _)| *m == marker) {
                Some((_, nodes)) => nodes.push(visit.node),
                None => groups.push((marker, vec![visit.node])),
            }
            ControlFlow::Continue(())
        });
        groups
    }

    /// The first reported node; the walk stops as soon as it is found.
    pub fn query_first(&self, query: &Query) -> Option<&Value> {
        let mut first = None;
        let _ = self.walk_query(query, |visit| {
            first = Some(visit.node);
            ControlFlow::Break(())
        });
        first
    }
}

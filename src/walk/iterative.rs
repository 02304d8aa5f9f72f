use std::ops::ControlFlow;

use serde_json::Value;
use tracing::{debug, trace};

use super::Visit;
use crate::node::{self, child_keys, is_container};
use crate::path::Path;

/// Unguided pre-order walker over every node below the root.
///
/// Descent state lives in explicit per-level stacks (keys to visit, cursor,
/// node) instead of the call stack, so arbitrarily deep trees are walked in
/// heap memory proportional to their depth.
#[derive(Debug, Default)]
pub struct IterativeTreeWalker {
    keys: Vec<Vec<String>>,
    cursors: Vec<usize>,
    path: Path,
}

impl IterativeTreeWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of levels currently on the stack; zero outside a walk.
    pub fn depth(&self) -> usize {
        self.cursors.len()
    }

    /// The live descent path; empty outside a walk.
    pub fn current_path(&self) -> &Path {
        &self.path
    }

    /// Visit every key below `root` exactly once, parents before children.
    ///
    /// The root itself is not reported.
    pub fn walk<'v, F>(&mut self, root: &'v Value, mut handler: F) -> ControlFlow<()>
    where
        F: FnMut(&Visit<'_, 'v>) -> ControlFlow<()>,
    {
        self.reset();
        let mut nodes: Vec<&'v Value> = vec![root];
        self.keys.push(child_keys(root));
        self.cursors.push(0);

        let flow = loop {
            let Some(level) = self.cursors.len().checked_sub(1) else {
                break ControlFlow::Continue(());
            };
            let cursor = self.cursors[level];

            if cursor >= self.keys[level].len() {
                self.keys.pop();
                self.cursors.pop();
                nodes.pop();
                if let Some(parent) = self.cursors.last_mut() {
                    *parent += 1;
                    self.path.pop();
                }
                continue;
            }

            let key = &self.keys[level][cursor];
            let Some(child) = node::child(nodes[level], key) else {
                self.cursors[level] += 1;
                continue;
            };
            self.path.push(key.as_str());

            let visit = Visit {
                key: Some(key.as_str()),
                node: child,
                path: &self.path,
                marker: None,
            };
            if handler(&visit).is_break() {
                debug!(path = %self.path, "full walk stopped by handler");
                break ControlFlow::Break(());
            }

            if is_container(child) {
                trace!(path = %self.path, "descending");
                nodes.push(child);
                self.keys.push(child_keys(child));
                self.cursors.push(0);
            } else {
                self.path.pop();
                self.cursors[level] += 1;
            }
        };

        self.reset();
        flow
    }

    fn reset(&mut self) {
        self.keys.clear();
        self.cursors.clear();
        self.path.clear();
    }
}

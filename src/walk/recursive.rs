use std::ops::ControlFlow;

use serde_json::Value;
use tracing::{debug, trace};

use super::Visit;
use crate::node::{self, child_keys, container_keys, is_container};
use crate::path::Path;
use crate::query::{Marker, Pattern, Query};

/// Query-guided depth-first walker.
///
/// Each recursion step looks at one node, the position in the query, and
/// whether a skip (`\`) is still open:
///
/// - query exhausted outside a skip: report the node, descend no further;
/// - query exhausted inside a skip: report leaves, keep descending into
///   containers as if a trailing skip were present;
/// - any pattern on a leaf: dead end;
/// - skip pattern: open the skip and descend into every child with the
///   next pattern, so a skip always consumes at least one level;
/// - key pattern inside a skip: if no child matches, keep skipping through
///   container children only; otherwise close the skip and descend into the
///   matching children;
/// - key pattern outside a skip: descend into the matching children.
///
/// When the query contains marked patterns, the nodes selected by those
/// patterns are reported instead of the final matches. A marked node is
/// reported once, as soon as the first complete match below it is found,
/// and descent continues below it for any later marked patterns.
pub struct RecursiveTreeWalker<'q> {
    query: &'q Query,
    path: Path,
}

impl<'q> RecursiveTreeWalker<'q> {
    pub fn new(query: &'q Query) -> Self {
        RecursiveTreeWalker {
            query,
            path: Path::new(),
        }
    }

    pub fn query(&self) -> &Query {
        self.query
    }

    /// Walk `root`, calling `handler` for every reported node.
    ///
    /// Returns `ControlFlow::Break(())` when the handler stopped the walk.
    pub fn walk<'v, F>(&mut self, root: &'v Value, handler: F) -> ControlFlow<()>
    where
        F: FnMut(&Visit<'_, 'v>) -> ControlFlow<()>,
    {
        debug!(query = %self.query, "starting query walk");
        self.path.clear();

        let mut descent = Descent {
            patterns: self.query.patterns(),
            report_marks: self.query.has_markers(),
            path: &mut self.path,
            marks: Vec::new(),
            handler,
        };
        let flow = descent.visit(root, 0, false);

        self.path.clear();
        if flow.is_break() {
            debug!(query = %self.query, "query walk stopped by handler");
        }
        flow
    }
}

/// A marked node waiting for a complete match below it.
struct PendingMark<'v> {
    node: &'v Value,
    depth: usize,
    marker: Marker,
    reported: bool,
}

struct Descent<'w, 'v, F> {
    patterns: &'w [Pattern],
    report_marks: bool,
    path: &'w mut Path,
    marks: Vec<PendingMark<'v>>,
    handler: F,
}

impl<'w, 'v, F> Descent<'w, 'v, F>
where
    F: FnMut(&Visit<'_, 'v>) -> ControlFlow<()>,
{
    fn visit(&mut self, node: &'v Value, pos: usize, skipping: bool) -> ControlFlow<()> {
        let patterns = self.patterns;
        let Some(pattern) = patterns.get(pos) else {
            if skipping && is_container(node) {
                trace!(path = %self.path, "query exhausted inside skip, descending");
                let keys = child_keys(node);
                return self.descend(node, &keys, pos, true, None);
            }
            return self.report(node);
        };

        if !is_container(node) {
            trace!(path = %self.path, pos, "leaf reached before query end");
            return ControlFlow::Continue(());
        }

        let matcher = match pattern {
            Pattern::Skip => {
                let keys = child_keys(node);
                return self.descend(node, &keys, pos + 1, true, None);
            }
            Pattern::Match(matcher) => matcher,
        };

        let matched = matcher.matching_keys(node);
        if !matched.is_empty() {
            trace!(path = %self.path, pattern = %matcher, count = matched.len(), "pattern matched");
            return self.descend(node, &matched, pos + 1, false, matcher.marker());
        }
        if skipping {
            let keys = container_keys(node);
            return self.descend(node, &keys, pos, true, None);
        }
        ControlFlow::Continue(())
    }

    fn descend(
        &mut self,
        node: &'v Value,
        keys: &[String],
        pos: usize,
        skipping: bool,
        marker: Option<Marker>,
    ) -> ControlFlow<()> {
        for key in keys {
            let Some(child) = node::child(node, key) else {
                continue;
            };
            self.path.push(key.as_str());
            if let Some(marker) = marker {
                self.marks.push(PendingMark {
                    node: child,
                    depth: self.path.len(),
                    marker,
                    reported: false,
                });
            }

            let flow = self.visit(child, pos, skipping);

            if marker.is_some() {
                self.marks.pop();
            }
            self.path.pop();
            flow?;
        }
        ControlFlow::Continue(())
    }

    fn report(&mut self, node: &'v Value) -> ControlFlow<()> {
        if !self.report_marks {
            let visit = Visit {
                key: self.path.last(),
                node,
                path: &*self.path,
                marker: None,
            };
            return (self.handler)(&visit);
        }

        for mark in self.marks.iter_mut() {
            if mark.reported {
                continue;
            }
            mark.reported = true;

            let mut path = self.path.clone();
            path.truncate(mark.depth);
            let visit = Visit {
                key: path.last(),
                node: mark.node,
                path: &path,
                marker: Some(mark.marker),
            };
            (self.handler)(&visit)?;
        }
        ControlFlow::Continue(())
    }
}

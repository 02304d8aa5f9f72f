//! Depth-first traversal of value trees.
//!
//! [`RecursiveTreeWalker`] follows a [`Query`](crate::Query) and reports only
//! the nodes it selects. [`IterativeTreeWalker`] visits every node with an
//! explicit stack. Both hand each reported node to the caller's handler as a
//! [`Visit`]; the handler returns `ControlFlow::Break(())` to stop the walk.

pub mod iterative;
pub mod recursive;

use serde_json::Value;

use crate::path::Path;
use crate::query::Marker;

pub use iterative::IterativeTreeWalker;
pub use recursive::RecursiveTreeWalker;

/// The traversal state at the moment a handler fires.
///
/// `path` is the walker's live buffer. Clone it to keep it past the call.
#[derive(Debug, Clone, Copy)]
pub struct Visit<'p, 'v> {
    /// Key of `node` in its parent; `None` for the walk root.
    pub key: Option<&'p str>,
    pub node: &'v Value,
    pub path: &'p Path,
    /// Set when the node was reported because a marked pattern selected it.
    pub marker: Option<Marker>,
}

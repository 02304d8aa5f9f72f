//! Nested key/value trees addressed by paths and searched with compact
//! pattern queries.
//!
//! A [`Path`] is a `>`-separated list of keys (`users>alice>email`). A
//! [`Query`] generalizes it with per-level patterns:
//!
//! | segment      | matches                                        |
//! |--------------|------------------------------------------------|
//! | `key`        | exactly `key`                                  |
//! | `a<b<c`      | any of `a`, `b`, `c`                           |
//! | `\|`         | every key                                      |
//! | `\`          | one or more levels, until the next pattern     |
//! | `…^value`    | only keys whose value equals `value`           |
//! | `{…}`, `[…]` | marks the level so its nodes are reported      |
//!
//! [`Query::matches_path`] lets a skip consume zero levels, while the tree
//! walkers always descend at least one level before looking for the next
//! pattern.
//!
//! Keys and values are percent-encoded in the string form, so grammar
//! characters can appear in keys.
//!
//! ```
//! use kvtree::{Query, Tree};
//! use serde_json::json;
//!
//! let tree = Tree::from(json!({
//!     "foo": {"bar": {"2": "woohoo"}, "boo": {"1": "x", "2": 3}},
//!     "moo": {"2": "what"}
//! }));
//! let query: Query = "\\>2".parse().unwrap();
//! assert_eq!(tree.query_values(&query), vec![&json!("woohoo"), &json!(3), &json!("what")]);
//! ```

pub mod encoding;
pub mod error;
pub mod format;
pub mod node;
pub mod output;
pub mod parser;
pub mod path;
pub mod query;
pub mod tree;
pub mod walk;

pub use error::TreeError;
pub use format::Format;
pub use path::Path;
pub use query::{is_query_text, KeyValuePattern, Marker, Matcher, Pattern, Query};
pub use tree::Tree;
pub use walk::{IterativeTreeWalker, RecursiveTreeWalker, Visit};

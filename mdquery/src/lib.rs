//! Path queries over markdown trees built by `mdtree`.
//!
//! A query is a list of [`Matcher`]s, read like a path: `[# Title][## Ingredients].list`.
//! [`query_one`] resolves it to a node, [`query_all`] collects every match of an extractor
//! inside the region it selects, and the `find` helpers decode the result.

pub mod decode;
mod error;
mod find;
mod matcher;
mod query;

pub use error::{DecodeError, Error, FindError, QueryError};
pub use find::{
    FindOptions, NodeUnmarshaler, StringList, find, find_all, find_all_with_options,
    find_with_options, unmarshal,
};
pub use matcher::{Branch, Matcher};
pub use query::{allow_no_match, query_all, query_children, query_one};

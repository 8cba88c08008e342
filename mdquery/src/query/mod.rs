//! The query engine.
//!
//! Works on either a flat parsed document, where a heading's content is its following
//! siblings, or on a tree built by [`mdtree::build_tree`]. For the latter, pass the root
//! branch as `root`.
//!
//! The two forms differ for a non-branch segment that follows a branch segment. In a flat
//! document the nodes under a subheading are still siblings of the outer heading, so
//! `[# A]` then `.list` finds a list under `## B`. In a tree that list sits inside the
//! nested `## B` branch, and [`query_one`] does not descend into sibling nodes, so the same
//! query fails. Name every heading on the way down, or use [`query_all`], which walks into
//! nested branches in both forms.

mod all;

pub use all::{query_all, query_children};

use mdtree::{Document, NodeId, Source};
use tracing::{debug, trace};

use crate::error::{Error, QueryError};
use crate::matcher::Matcher;

/// Find the single node described by `matchers`, searching below `root`.
///
/// Each segment takes the first candidate that matches; a later segment failing never
/// revisits an earlier choice.
pub fn query_one(
    document: &Document,
    root: NodeId,
    source: &Source,
    matchers: &[Matcher],
) -> Result<NodeId, Error> {
    let Some(last) = matchers.len().checked_sub(1) else {
        return Err(Error::EmptyQuery);
    };
    let Some(first) = document.first_child(root) else {
        return Err(Error::EmptyDocument);
    };

    let mut active = 0;
    let mut position = 0;
    let mut flat_branch: Option<&Matcher> = None;
    let mut matched = Vec::with_capacity(matchers.len());
    let mut current = Some(first);

    while let Some(node) = current {
        if let Some(branch) = flat_branch {
            if branch.end_match(document, node) {
                trace!(%node, scope = %branch, "scope closed");
                break;
            }
        }

        let matcher = &matchers[active];
        if !matcher.matches(document, node, position, source) {
            current = next_node_to_process(document, root, node);
            position += 1;
            continue;
        }

        if active == last {
            debug!(%node, query = %path(matchers), "query matched");
            return Ok(node);
        }

        trace!(%node, %matcher, position, "segment matched");
        matched.push(matcher.clone());
        if matcher.is_flat_branch() {
            flat_branch = Some(matcher);
        }
        current = matcher.next_node(document, node);
        active += 1;
        position = 0;
    }

    let err = QueryError::new(matched, matchers[active].clone());
    debug!(error = %err, "query failed");
    Err(err.into())
}

/// Turn a no-match failure into `Ok(None)`. Configuration errors still fail.
pub fn allow_no_match<T>(result: Result<T, Error>) -> Result<Option<T>, Error> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(Error::NoMatch(_)) => Ok(None),
        Err(err) => Err(err),
    }
}

/// The next sibling, or else the next sibling of the nearest ancestor that has one. Never
/// leaves the subtree under `root`.
fn next_node_to_process(document: &Document, root: NodeId, node: NodeId) -> Option<NodeId> {
    let mut current = node;
    loop {
        if current == root {
            return None;
        }
        if let Some(next) = document.next_sibling(current) {
            return Some(next);
        }
        current = document.parent(current)?;
    }
}

fn path(matchers: &[Matcher]) -> String {
    matchers.iter().map(|matcher| matcher.to_string()).collect()
}

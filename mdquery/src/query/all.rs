use std::convert::Infallible;

use mdtree::{Document, NodeId, Source, WalkStatus};
use tracing::{debug, trace};

use super::query_one;
use crate::error::Error;
use crate::matcher::Matcher;

/// Every node matching `extractor` inside the region selected by `matchers`.
///
/// With no matchers the region is everything under `root`. Otherwise the region starts where
/// the last matcher says its content starts and runs until that matcher's scope closes.
/// Matched nodes are not searched further, so nested matches are never reported twice.
pub fn query_all(
    document: &Document,
    root: NodeId,
    source: &Source,
    matchers: &[Matcher],
    extractor: &Matcher,
) -> Result<Vec<NodeId>, Error> {
    let (anchor, scope) = match matchers.last() {
        None => (root, &Matcher::AnyNode),
        Some(last) => (query_one(document, root, source, matchers)?, last),
    };

    let mut found = Vec::new();
    let walked = document.walk_siblings_until::<Infallible, _>(
        scope.next_node(document, anchor),
        &mut |node, entering| {
            if !entering {
                return Ok(WalkStatus::Continue);
            }
            if scope.end_match(document, node) {
                trace!(%node, %scope, "scope closed");
                return Ok(WalkStatus::Stop);
            }
            if extractor.matches(document, node, 0, source) {
                found.push(node);
                return Ok(WalkStatus::SkipChildren);
            }
            Ok(WalkStatus::Continue)
        },
    );
    if let Err(never) = walked {
        match never {}
    }

    debug!(%anchor, %extractor, count = found.len(), "collected matches");
    Ok(found)
}

/// Every node under `parent`, `parent` included, that matches the search target.
///
/// A [`Matcher::SearchFor`] is unwrapped to its target; any other matcher is used as is.
pub fn query_children(
    document: &Document,
    parent: NodeId,
    source: &Source,
    search: &Matcher,
) -> Vec<NodeId> {
    let target = match search {
        Matcher::SearchFor(target) => target.as_ref(),
        other => other,
    };

    let mut found = Vec::new();
    let walked = document.walk::<Infallible, _>(parent, &mut |node, entering| {
        if entering && target.matches(document, node, 0, source) {
            found.push(node);
            return Ok(WalkStatus::SkipChildren);
        }
        Ok(WalkStatus::Continue)
    });
    if let Err(never) = walked {
        match never {}
    }
    found
}

//! Query-then-decode helpers.

use mdtree::{Document, NodeId, Source};
use tracing::debug;

use crate::decode;
use crate::error::{DecodeError, FindError};
use crate::matcher::Matcher;
use crate::query::{allow_no_match, query_all, query_one};

/// Options for the `_with_options` variants of [`find`] and [`find_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// Report a query that finds nothing as an absent value instead of an error.
    pub allow_no_match: bool,
}

impl FindOptions {
    pub fn allow_no_match(mut self) -> Self {
        self.allow_no_match = true;
        self
    }
}

/// Find the node at the end of `matchers` and decode it.
pub fn find<T, F>(
    document: &Document,
    root: NodeId,
    source: &Source,
    matchers: &[Matcher],
    decode: F,
) -> Result<T, FindError>
where
    F: FnOnce(&Document, NodeId, &Source) -> Result<T, DecodeError>,
{
    let node = query_one(document, root, source, matchers)?;
    Ok(decode(document, node, source)?)
}

/// [`find`], returning `None` for a missing node when the options allow it.
pub fn find_with_options<T, F>(
    document: &Document,
    root: NodeId,
    source: &Source,
    matchers: &[Matcher],
    decode: F,
    options: FindOptions,
) -> Result<Option<T>, FindError>
where
    F: FnOnce(&Document, NodeId, &Source) -> Result<T, DecodeError>,
{
    let result = query_one(document, root, source, matchers);
    let node = if options.allow_no_match {
        match allow_no_match(result)? {
            Some(node) => node,
            None => {
                debug!("no match allowed, returning nothing");
                return Ok(None);
            }
        }
    } else {
        result?
    };
    Ok(Some(decode(document, node, source)?))
}

/// Find every `extractor` match in the region selected by `matchers` and decode each one.
///
/// Stops at the first decode failure.
pub fn find_all<T, F>(
    document: &Document,
    root: NodeId,
    source: &Source,
    matchers: &[Matcher],
    extractor: &Matcher,
    decode: F,
) -> Result<Vec<T>, FindError>
where
    F: FnMut(&Document, NodeId, &Source) -> Result<T, DecodeError>,
{
    find_all_with_options(
        document,
        root,
        source,
        matchers,
        extractor,
        decode,
        FindOptions::default(),
    )
}

/// [`find_all`], returning an empty list for a missing region when the options allow it.
pub fn find_all_with_options<T, F>(
    document: &Document,
    root: NodeId,
    source: &Source,
    matchers: &[Matcher],
    extractor: &Matcher,
    mut decode: F,
    options: FindOptions,
) -> Result<Vec<T>, FindError>
where
    F: FnMut(&Document, NodeId, &Source) -> Result<T, DecodeError>,
{
    let result = query_all(document, root, source, matchers, extractor);
    let nodes = if options.allow_no_match {
        allow_no_match(result)?.unwrap_or_default()
    } else {
        result?
    };

    nodes
        .into_iter()
        .map(|node| decode(document, node, source).map_err(FindError::from))
        .collect()
}

/// A type that fills itself in from a matched node.
pub trait NodeUnmarshaler {
    fn unmarshal_node(
        &mut self,
        document: &Document,
        node: NodeId,
        source: &Source,
    ) -> Result<(), DecodeError>;
}

/// The items of a list, one string each.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringList(pub Vec<String>);

impl NodeUnmarshaler for StringList {
    fn unmarshal_node(
        &mut self,
        document: &Document,
        node: NodeId,
        source: &Source,
    ) -> Result<(), DecodeError> {
        self.0.extend(decode::list_items(document, node, source)?);
        Ok(())
    }
}

/// Find the node at the end of `matchers` and hand it to `target`.
pub fn unmarshal<U>(
    document: &Document,
    root: NodeId,
    source: &Source,
    matchers: &[Matcher],
    target: &mut U,
) -> Result<(), FindError>
where
    U: NodeUnmarshaler + ?Sized,
{
    let node = query_one(document, root, source, matchers)?;
    target.unmarshal_node(document, node, source)?;
    Ok(())
}

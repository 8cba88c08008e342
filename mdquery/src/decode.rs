//! Decoders that turn a matched node into a plain value.
//!
//! Each has the shape `fn(&Document, NodeId, &Source) -> Result<T, DecodeError>` so it can be
//! handed straight to [`crate::find`] or [`crate::find_all`].

use std::collections::BTreeMap;

use mdtree::{Document, KindTag, NodeId, NodeKind, Source};

use crate::error::DecodeError;

/// The text of each item of a list, in order.
pub fn list_items(
    document: &Document,
    node: NodeId,
    source: &Source,
) -> Result<Vec<String>, DecodeError> {
    expect_kind(document, node, KindTag::List)?;
    Ok(document
        .list_items(node)
        .map(|item| document.text(item, source))
        .collect())
}

/// All text under a node. Never fails.
pub fn text(document: &Document, node: NodeId, source: &Source) -> Result<String, DecodeError> {
    Ok(document.text(node, source))
}

/// The literal of a hashtag, without the `#`.
pub fn tag(document: &Document, node: NodeId, _source: &Source) -> Result<String, DecodeError> {
    match document.kind(node) {
        NodeKind::Hashtag { tag } => Ok(tag.clone()),
        other => Err(DecodeError::ExpectedKind {
            expected: KindTag::Hashtag,
            got: other.tag(),
        }),
    }
}

/// One map per body row of a table, from column name to cell text.
///
/// Column names come from the header row. A column whose header is blank is keyed by its
/// index instead.
pub fn table_to_map(
    document: &Document,
    node: NodeId,
    source: &Source,
) -> Result<Vec<BTreeMap<String, String>>, DecodeError> {
    expect_kind(document, node, KindTag::Table)?;

    let mut headers = Vec::new();
    let mut rows = Vec::new();
    for (position, row) in document.children(node).enumerate() {
        if position == 0 && matches!(document.kind(row), NodeKind::TableHeader) {
            headers = document
                .children(row)
                .map(|cell| document.text(cell, source))
                .collect();
            continue;
        }

        let record = document
            .children(row)
            .enumerate()
            .map(|(column, cell)| {
                let header = match headers.get(column) {
                    Some(header) if !header.is_empty() => header.clone(),
                    _ => column.to_string(),
                };
                (header, document.text(cell, source))
            })
            .collect();
        rows.push(record);
    }
    Ok(rows)
}

fn expect_kind(
    document: &Document,
    node: NodeId,
    expected: KindTag,
) -> Result<(), DecodeError> {
    let got = document.kind(node).tag();
    if got == expected {
        Ok(())
    } else {
        Err(DecodeError::ExpectedKind { expected, got })
    }
}

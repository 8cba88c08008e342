//! Splits `#tag` literals out of text nodes into `Hashtag` nodes.

use tracing::trace;

use crate::document::{Document, NodeId, NodeKind};
use crate::source::{Segment, Source};

pub(crate) fn split_hashtags(document: &mut Document, source: &Source) {
    let mut targets = Vec::new();
    collect_text_nodes(document, document.root(), &mut targets);

    for node in targets {
        split_node(document, source, node);
    }
}

fn collect_text_nodes(document: &Document, node: NodeId, out: &mut Vec<NodeId>) {
    match document.kind(node) {
        NodeKind::Text { .. } => out.push(node),
        NodeKind::CodeSpan { .. }
        | NodeKind::Link { .. }
        | NodeKind::Image { .. }
        | NodeKind::AutoLink { .. }
        | NodeKind::Hashtag { .. } => {}
        _ => {
            for child in document.children(node) {
                collect_text_nodes(document, child, out);
            }
        }
    }
}

/// Byte range of each hashtag in `text`, `#` included.
fn find_hashtags(text: &[u8]) -> Vec<(usize, usize)> {
    let mut found = Vec::new();
    let mut i = 0;
    while i < text.len() {
        let at_boundary = i == 0 || text[i - 1].is_ascii_whitespace();
        if text[i] != b'#' || !at_boundary {
            i += 1;
            continue;
        }

        let body = text[i + 1..]
            .iter()
            .take_while(|&&b| is_tag_byte(b))
            .count();
        let tag = &text[i + 1..i + 1 + body];
        if body > 0 && !tag.iter().all(u8::is_ascii_digit) {
            found.push((i, i + 1 + body));
        }
        i += 1 + body;
    }
    found
}

fn is_tag_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'/') || b >= 0x80
}

fn split_node(document: &mut Document, source: &Source, node: NodeId) {
    let NodeKind::Text {
        segment,
        soft_line_break,
    } = *document.kind(node)
    else {
        return;
    };

    let found = find_hashtags(segment.value(source));
    if found.is_empty() {
        return;
    }

    let mut pieces = Vec::new();
    let mut cursor = segment.start;
    for (start, stop) in found {
        let (start, stop) = (segment.start + start, segment.start + stop);
        if start > cursor {
            pieces.push(document.create(NodeKind::Text {
                segment: Segment::new(cursor, start),
                soft_line_break: false,
            }));
        }

        let literal = Segment::new(start, stop);
        let tag = Segment::new(start + 1, stop).text(source).into_owned();
        trace!(tag = %tag, "found hashtag");
        let hashtag = document.create(NodeKind::Hashtag { tag });
        let text = document.create(NodeKind::Text {
            segment: literal,
            soft_line_break: false,
        });
        document.append_child(hashtag, text);
        pieces.push(hashtag);
        cursor = stop;
    }
    if cursor < segment.stop {
        pieces.push(document.create(NodeKind::Text {
            segment: Segment::new(cursor, segment.stop),
            soft_line_break: false,
        }));
    }

    if soft_line_break {
        if let Some(&last) = pieces.last() {
            let carrier = match document.kind(last) {
                NodeKind::Hashtag { .. } => document.first_child(last).unwrap_or(last),
                _ => last,
            };
            if let NodeKind::Text {
                soft_line_break, ..
            } = document.kind_mut(carrier)
            {
                *soft_line_break = true;
            }
        }
    }

    for piece in pieces {
        document.insert_before(node, piece);
    }
    document.detach(node);
}

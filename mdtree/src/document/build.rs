//! Helpers for editing a parsed tree.
//!
//! Anything that synthesizes text appends it to the [`Source`] passed in, so the caller
//! must render with that same, now longer, buffer.

use super::{Document, NodeId, NodeKind};
use crate::source::Source;

impl Document {
    /// Append each of `children` to `parent`, in order. Returns `parent` for chaining.
    pub fn append_children(&mut self, parent: NodeId, children: &[NodeId]) -> NodeId {
        for &child in children {
            self.append_child(parent, child);
        }
        parent
    }

    /// A detached text node whose content is appended to `source`.
    pub fn new_text_segment(&mut self, source: &mut Source, text: &str) -> NodeId {
        let segment = source.append(text);
        self.create(NodeKind::Text {
            segment,
            soft_line_break: false,
        })
    }

    /// A single space, for separating inline nodes.
    pub fn new_space(&mut self, source: &mut Source) -> NodeId {
        self.new_text_segment(source, " ")
    }

    /// A detached paragraph holding one line of text.
    pub fn new_paragraph(&mut self, source: &mut Source, text: &str) -> NodeId {
        let segment = source.append(text);
        let paragraph = self.create(NodeKind::Paragraph {
            lines: vec![segment],
        });
        let text = self.create(NodeKind::Text {
            segment,
            soft_line_break: false,
        });
        self.append_children(paragraph, &[text])
    }

    /// A detached tight list item holding one line of text.
    pub fn new_list_item(&mut self, source: &mut Source, text: &str) -> NodeId {
        let item = self.create(NodeKind::ListItem {
            blank_previous_lines: false,
        });
        let block = self.create(NodeKind::TextBlock);
        let text = self.new_text_segment(source, text);
        self.append_child(block, text);
        self.append_children(item, &[block])
    }

    /// A detached hashtag. The child text carries the `#` so it renders verbatim.
    pub fn new_hashtag(&mut self, source: &mut Source, tag: &str) -> NodeId {
        let hashtag = self.create(NodeKind::Hashtag {
            tag: tag.to_string(),
        });
        let text = self.new_text_segment(source, &format!("#{}", tag));
        self.append_children(hashtag, &[text])
    }

    /// The last node inside a heading's flat scope: the sibling right before the next
    /// heading of the same or a higher level, or the final sibling. Returns the heading
    /// itself when its scope is empty and `None` when `heading` is not a heading.
    pub fn last_child_of_heading(&self, heading: NodeId) -> Option<NodeId> {
        let NodeKind::Heading { level } = *self.kind(heading) else {
            return None;
        };

        let mut last = heading;
        while let Some(next) = self.next_sibling(last) {
            if self.heading_level(next).is_some_and(|other| other <= level) {
                break;
            }
            last = next;
        }
        Some(last)
    }

    /// Append `children` to the end of a heading's flat scope, in order.
    ///
    /// Returns false when `heading` is not an attached heading.
    pub fn append_heading_child(&mut self, heading: NodeId, children: &[NodeId]) -> bool {
        let Some(mut last) = self.last_child_of_heading(heading) else {
            return false;
        };
        if self.parent(heading).is_none() {
            return false;
        }

        for &child in children {
            self.insert_after(last, child);
            last = child;
        }
        true
    }
}

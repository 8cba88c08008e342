pub mod build;
pub mod walk;

use std::fmt;

use crate::source::{Segment, Source};

pub use walk::WalkStatus;

/// Handle to a node stored in a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Column alignment of a table, as declared by the delimiter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnAlignment {
    None,
    Left,
    Center,
    Right,
}

/// How a link or image spells out its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStyle {
    /// `[text](destination "title")`, optionally with the destination in `<...>`.
    Inline { angle_brackets: bool },
    /// `[text][label]`
    Reference { label: String },
    /// `[text][]`
    Collapsed,
    /// `[text]`
    Shortcut,
}

impl Default for LinkStyle {
    fn default() -> Self {
        LinkStyle::Inline {
            angle_brackets: false,
        }
    }
}

/// The kind of a node, plus whatever attributes that kind carries.
///
/// Text-bearing kinds hold [`Segment`]s into the document's [`Source`] rather than
/// owned strings.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    // Structure
    Document,
    /// Synthetic heading-rooted subtree built by [`crate::preprocess::build_tree`].
    /// The root branch has level 0.
    Branch {
        level: u8,
    },

    // Blocks
    Heading {
        level: u8,
    },
    /// `lines` holds one segment per source line, with container prefixes stripped.
    Paragraph {
        lines: Vec<Segment>,
    },
    /// Inline content of a tight list item.
    TextBlock,
    List {
        ordered: bool,
        /// `-`, `*` or `+` for bullets; `.` or `)` for ordered lists.
        marker: u8,
        start: u64,
        tight: bool,
    },
    ListItem {
        blank_previous_lines: bool,
    },
    Table {
        alignments: Vec<ColumnAlignment>,
        delimiter_row: Option<Segment>,
    },
    TableHeader,
    TableRow,
    /// `leading` and `trailing` are the padding between the cell's pipes and its content.
    TableCell {
        leading: Option<Segment>,
        trailing: Option<Segment>,
    },
    CodeBlock {
        lines: Vec<Segment>,
    },
    FencedCodeBlock {
        info: Option<Segment>,
        lines: Vec<Segment>,
    },
    HtmlBlock {
        lines: Vec<Segment>,
    },
    ThematicBreak,
    Blockquote,
    /// Placeholder where frontmatter is re-rendered.
    Frontmatter,
    /// One or more adjacent `[label]: destination` lines, kept verbatim.
    LinkDefinition {
        lines: Vec<Segment>,
    },

    // Inlines
    Text {
        segment: Segment,
        soft_line_break: bool,
    },
    /// A hard line break; `marker` is the trailing spaces or backslash before the newline.
    HardBreak {
        marker: Segment,
    },
    Emphasis {
        level: u8,
        marker: u8,
    },
    Strikethrough,
    Link {
        destination: String,
        title: String,
        style: LinkStyle,
    },
    Image {
        destination: String,
        title: String,
        style: LinkStyle,
    },
    AutoLink {
        url: String,
    },
    CodeSpan {
        fence_len: usize,
    },
    RawHtml {
        segments: Vec<Segment>,
    },
    /// `tag` is the literal without the leading `#`. The single child text holds `#tag`.
    Hashtag {
        tag: String,
    },
}

impl NodeKind {
    /// Stable name of the kind, used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Document => "Document",
            NodeKind::Branch { .. } => "Branch",
            NodeKind::Heading { .. } => "Heading",
            NodeKind::Paragraph { .. } => "Paragraph",
            NodeKind::TextBlock => "TextBlock",
            NodeKind::List { .. } => "List",
            NodeKind::ListItem { .. } => "ListItem",
            NodeKind::Table { .. } => "Table",
            NodeKind::TableHeader => "TableHeader",
            NodeKind::TableRow => "TableRow",
            NodeKind::TableCell { .. } => "TableCell",
            NodeKind::CodeBlock { .. } => "CodeBlock",
            NodeKind::FencedCodeBlock { .. } => "FencedCodeBlock",
            NodeKind::HtmlBlock { .. } => "HTMLBlock",
            NodeKind::ThematicBreak => "ThematicBreak",
            NodeKind::Blockquote => "Blockquote",
            NodeKind::Frontmatter => "Frontmatter",
            NodeKind::LinkDefinition { .. } => "LinkDefinition",
            NodeKind::Text { .. } => "Text",
            NodeKind::HardBreak { .. } => "HardBreak",
            NodeKind::Emphasis { .. } => "Emphasis",
            NodeKind::Strikethrough => "Strikethrough",
            NodeKind::Link { .. } => "Link",
            NodeKind::Image { .. } => "Image",
            NodeKind::AutoLink { .. } => "AutoLink",
            NodeKind::CodeSpan { .. } => "CodeSpan",
            NodeKind::RawHtml { .. } => "RawHTML",
            NodeKind::Hashtag { .. } => "Hashtag",
        }
    }

    /// Discriminant-only view, for "is this the same kind of node" checks.
    pub fn tag(&self) -> KindTag {
        match self {
            NodeKind::Document => KindTag::Document,
            NodeKind::Branch { .. } => KindTag::Branch,
            NodeKind::Heading { .. } => KindTag::Heading,
            NodeKind::Paragraph { .. } => KindTag::Paragraph,
            NodeKind::TextBlock => KindTag::TextBlock,
            NodeKind::List { .. } => KindTag::List,
            NodeKind::ListItem { .. } => KindTag::ListItem,
            NodeKind::Table { .. } => KindTag::Table,
            NodeKind::TableHeader => KindTag::TableHeader,
            NodeKind::TableRow => KindTag::TableRow,
            NodeKind::TableCell { .. } => KindTag::TableCell,
            NodeKind::CodeBlock { .. } => KindTag::CodeBlock,
            NodeKind::FencedCodeBlock { .. } => KindTag::FencedCodeBlock,
            NodeKind::HtmlBlock { .. } => KindTag::HtmlBlock,
            NodeKind::ThematicBreak => KindTag::ThematicBreak,
            NodeKind::Blockquote => KindTag::Blockquote,
            NodeKind::Frontmatter => KindTag::Frontmatter,
            NodeKind::LinkDefinition { .. } => KindTag::LinkDefinition,
            NodeKind::Text { .. } => KindTag::Text,
            NodeKind::HardBreak { .. } => KindTag::HardBreak,
            NodeKind::Emphasis { .. } => KindTag::Emphasis,
            NodeKind::Strikethrough => KindTag::Strikethrough,
            NodeKind::Link { .. } => KindTag::Link,
            NodeKind::Image { .. } => KindTag::Image,
            NodeKind::AutoLink { .. } => KindTag::AutoLink,
            NodeKind::CodeSpan { .. } => KindTag::CodeSpan,
            NodeKind::RawHtml { .. } => KindTag::RawHtml,
            NodeKind::Hashtag { .. } => KindTag::Hashtag,
        }
    }
}

/// Attribute-free mirror of [`NodeKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindTag {
    Document,
    Branch,
    Heading,
    Paragraph,
    TextBlock,
    List,
    ListItem,
    Table,
    TableHeader,
    TableRow,
    TableCell,
    CodeBlock,
    FencedCodeBlock,
    HtmlBlock,
    ThematicBreak,
    Blockquote,
    Frontmatter,
    LinkDefinition,
    Text,
    HardBreak,
    Emphasis,
    Strikethrough,
    Link,
    Image,
    AutoLink,
    CodeSpan,
    RawHtml,
    Hashtag,
}

impl fmt::Display for KindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KindTag::HtmlBlock => "HTMLBlock",
            KindTag::RawHtml => "RawHTML",
            other => return write!(f, "{:?}", other),
        };
        f.write_str(name)
    }
}

/// A single node and its links to the rest of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }
}

/// A mutable markdown tree stored as an arena.
///
/// Parent and sibling links are indices, so nodes can be moved around freely without
/// ownership cycles. Detached nodes stay in the arena until the document is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document holding only its root node.
    pub fn new() -> Self {
        Document {
            nodes: vec![Node::new(NodeKind::Document)],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_child(self.root).is_none()
    }

    /// Allocate a detached node.
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind));
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.0].kind
    }

    pub fn kind_name(&self, id: NodeId) -> &'static str {
        self.kind(id).name()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].first_child
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].last_child
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].next_sibling
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].prev_sibling
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        self.nodes[id.0].first_child.is_some()
    }

    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            document: self,
            next: self.first_child(id),
        }
    }

    /// Direct `ListItem` children of a node.
    pub fn list_items(&self, list: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(list)
            .filter(|&child| matches!(self.kind(child), NodeKind::ListItem { .. }))
    }

    /// Heading level of a `Heading` node or a non-root `Branch`.
    pub fn heading_level(&self, id: NodeId) -> Option<u8> {
        match self.kind(id) {
            NodeKind::Heading { level } => Some(*level),
            NodeKind::Branch { level } if *level > 0 => Some(*level),
            _ => None,
        }
    }

    /// Unlink a node from its parent and siblings. Its own children stay attached.
    pub fn detach(&mut self, id: NodeId) {
        let Node {
            parent,
            prev_sibling,
            next_sibling,
            ..
        } = self.nodes[id.0].clone();

        if let Some(prev) = prev_sibling {
            self.nodes[prev.0].next_sibling = next_sibling;
        } else if let Some(parent) = parent {
            self.nodes[parent.0].first_child = next_sibling;
        }

        if let Some(next) = next_sibling {
            self.nodes[next.0].prev_sibling = prev_sibling;
        } else if let Some(parent) = parent {
            self.nodes[parent.0].last_child = prev_sibling;
        }

        let node = &mut self.nodes[id.0];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Append `child` as the last child of `parent`, moving it out of any previous position.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);

        let last = self.nodes[parent.0].last_child;
        {
            let node = &mut self.nodes[child.0];
            node.parent = Some(parent);
            node.prev_sibling = last;
        }
        match last {
            Some(last) => self.nodes[last.0].next_sibling = Some(child),
            None => self.nodes[parent.0].first_child = Some(child),
        }
        self.nodes[parent.0].last_child = Some(child);
    }

    /// Insert `node` directly before `reference`. Returns false if `reference` has no parent.
    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) -> bool {
        let Some(parent) = self.parent(reference) else {
            return false;
        };
        self.detach(node);

        let prev = self.nodes[reference.0].prev_sibling;
        {
            let inserted = &mut self.nodes[node.0];
            inserted.parent = Some(parent);
            inserted.prev_sibling = prev;
            inserted.next_sibling = Some(reference);
        }
        self.nodes[reference.0].prev_sibling = Some(node);
        match prev {
            Some(prev) => self.nodes[prev.0].next_sibling = Some(node),
            None => self.nodes[parent.0].first_child = Some(node),
        }
        true
    }

    /// Insert `node` directly after `reference`. Returns false if `reference` has no parent.
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> bool {
        let Some(parent) = self.parent(reference) else {
            return false;
        };
        self.detach(node);

        let next = self.nodes[reference.0].next_sibling;
        {
            let inserted = &mut self.nodes[node.0];
            inserted.parent = Some(parent);
            inserted.prev_sibling = Some(reference);
            inserted.next_sibling = next;
        }
        self.nodes[reference.0].next_sibling = Some(node);
        match next {
            Some(next) => self.nodes[next.0].prev_sibling = Some(node),
            None => self.nodes[parent.0].last_child = Some(node),
        }
        true
    }

    /// Concatenated text of every leaf under `id`.
    ///
    /// Text segments contribute their bytes, code blocks their lines and autolinks their
    /// url. Line breaks contribute nothing.
    pub fn text(&self, id: NodeId, source: &Source) -> String {
        let mut out = Vec::new();
        self.collect_text(id, source, &mut out);
        String::from_utf8_lossy(&out).into_owned()
    }

    fn collect_text(&self, id: NodeId, source: &Source, out: &mut Vec<u8>) {
        match self.kind(id) {
            NodeKind::Text { segment, .. } => out.extend_from_slice(segment.value(source)),
            NodeKind::CodeBlock { lines } | NodeKind::FencedCodeBlock { lines, .. } => {
                for line in lines {
                    out.extend_from_slice(line.value(source));
                }
            }
            NodeKind::AutoLink { url } => out.extend_from_slice(url.as_bytes()),
            _ => {
                for child in self.children(id) {
                    self.collect_text(child, source, out);
                }
            }
        }
    }

    /// Indented outline of the subtree under `id`, for debugging.
    pub fn dump(&self, id: NodeId, source: &Source) -> String {
        let mut out = String::new();
        self.dump_into(id, source, 0, &mut out);
        out
    }

    fn dump_into(&self, id: NodeId, source: &Source, depth: usize, out: &mut String) {
        use std::fmt::Write;

        let pad = "  ".repeat(depth);
        let _ = match self.kind(id) {
            NodeKind::Text { segment, .. } => {
                writeln!(out, "{}Text {:?}", pad, segment.text(source))
            }
            NodeKind::Heading { level } | NodeKind::Branch { level } => {
                writeln!(out, "{}{} level={}", pad, self.kind_name(id), level)
            }
            NodeKind::Hashtag { tag } => writeln!(out, "{}Hashtag {:?}", pad, tag),
            other => writeln!(out, "{}{}", pad, other.name()),
        };
        for child in self.children(id) {
            self.dump_into(child, source, depth + 1, out);
        }
    }
}

/// Iterator over the direct children of a node.
pub struct Children<'a> {
    document: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.document.next_sibling(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(doc: &mut Document) -> NodeId {
        doc.create(NodeKind::Paragraph { lines: Vec::new() })
    }

    #[test]
    fn append_and_insert_keep_links_consistent() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = paragraph(&mut doc);
        let b = paragraph(&mut doc);
        let c = paragraph(&mut doc);

        doc.append_child(root, a);
        doc.append_child(root, c);
        assert!(doc.insert_before(c, b));

        let order: Vec<_> = doc.children(root).collect();
        assert_eq!(order, vec![a, b, c]);
        assert_eq!(doc.prev_sibling(c), Some(b));
        assert_eq!(doc.next_sibling(a), Some(b));
        assert_eq!(doc.last_child(root), Some(c));
    }

    #[test]
    fn appending_an_attached_node_moves_it() {
        let mut doc = Document::new();
        let root = doc.root();
        let list = doc.create(NodeKind::TextBlock);
        let a = paragraph(&mut doc);
        let b = paragraph(&mut doc);
        doc.append_child(root, a);
        doc.append_child(root, b);
        doc.append_child(root, list);

        doc.append_child(list, a);

        assert_eq!(doc.children(root).collect::<Vec<_>>(), vec![b, list]);
        assert_eq!(doc.parent(a), Some(list));
        assert_eq!(doc.first_child(root), Some(b));
    }

    #[test]
    fn insert_after_detached_reference_is_rejected() {
        let mut doc = Document::new();
        let a = paragraph(&mut doc);
        let b = paragraph(&mut doc);
        assert!(!doc.insert_after(a, b));
    }

    #[test]
    fn text_concatenates_leaves() {
        let mut source = Source::from("");
        let mut doc = Document::new();
        let para = paragraph(&mut doc);
        let hello = doc.new_text_segment(&mut source, "Hello, ");
        let emphasis = doc.create(NodeKind::Emphasis {
            level: 2,
            marker: b'*',
        });
        let world = doc.new_text_segment(&mut source, "world");
        doc.append_child(emphasis, world);
        doc.append_children(para, &[hello, emphasis]);

        assert_eq!(doc.text(para, &source), "Hello, world");
    }
}

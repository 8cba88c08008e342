use std::collections::VecDeque;
use std::ops::Range;

use pulldown_cmark::{
    Alignment, CodeBlockKind, Event, HeadingLevel, LinkType, MetadataBlockKind,
    Parser as CmarkParser, Tag,
};

use crate::document::{ColumnAlignment, Document, LinkStyle, NodeId, NodeKind};
use crate::parser::ParseOptions;
use crate::parser::frontmatter::{Frontmatter, FrontmatterFormat};
use crate::source::Segment;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the node tree for `source` from pulldown-cmark's offset events.
///
/// Markers, padding and delimiter rows are read back out of the source so the tree
/// carries enough to be rendered as it was written.
pub fn build_document(source: &str, options: &ParseOptions) -> (Document, Option<Frontmatter>) {
    let parser = CmarkParser::new_ext(source, options.cmark_options());
    // Definitions produce no events; they are placed back into the tree by position.
    let mut definitions: Vec<Range<usize>> = parser
        .reference_definitions()
        .iter()
        .map(|(_, definition)| definition.span.clone())
        .collect();
    definitions.sort_by_key(|span| span.start);
    let events: Vec<(Event<'_>, Range<usize>)> = parser.into_offset_iter().collect();

    let mut state = ParseState::new(source, definitions);
    for (event, range) in events {
        state.process_event(event, range);
    }
    state.finalize()
}

// ---------------------------------------------------------------------------
// Parse state
// ---------------------------------------------------------------------------

struct ParseState<'a> {
    source: &'a str,
    document: Document,
    /// One entry per open tag. `None` for tags that produce no node.
    stack: Vec<Option<NodeId>>,
    /// Leading and trailing cell padding of the table row being built.
    row_padding: Vec<(Segment, Segment)>,
    metadata: Option<PendingMetadata>,
    frontmatter: Option<Frontmatter>,
    /// Link reference definitions not yet placed, in source order.
    definitions: VecDeque<Range<usize>>,
}

struct PendingMetadata {
    format: FrontmatterFormat,
    span: Range<usize>,
    raw: String,
}

impl<'a> ParseState<'a> {
    fn new(source: &'a str, definitions: Vec<Range<usize>>) -> Self {
        ParseState {
            source,
            document: Document::new(),
            stack: Vec::new(),
            row_padding: Vec::new(),
            metadata: None,
            frontmatter: None,
            definitions: definitions.into(),
        }
    }

    /// Innermost open node, or the document root.
    fn current(&self) -> NodeId {
        self.stack
            .iter()
            .rev()
            .find_map(|node| *node)
            .unwrap_or_else(|| self.document.root())
    }

    fn blockquote_depth(&self) -> usize {
        self.stack
            .iter()
            .flatten()
            .filter(|&&node| matches!(self.document.kind(node), NodeKind::Blockquote))
            .count()
    }

    /// Where inline content goes. Tight list items hold their inlines in a `TextBlock`.
    fn inline_parent(&mut self) -> NodeId {
        let parent = self.current();
        if !matches!(self.document.kind(parent), NodeKind::ListItem { .. }) {
            return parent;
        }

        if let Some(last) = self.document.last_child(parent) {
            if matches!(self.document.kind(last), NodeKind::TextBlock) {
                return last;
            }
        }
        let block = self.document.create(NodeKind::TextBlock);
        self.document.append_child(parent, block);
        block
    }

    fn open(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let node = self.document.create(kind);
        self.document.append_child(parent, node);
        self.stack.push(Some(node));
        node
    }

    fn leaf(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let node = self.document.create(kind);
        self.document.append_child(parent, node);
        node
    }

    fn process_event(&mut self, event: Event<'_>, range: Range<usize>) {
        // A closing tag still owns every definition inside its range.
        let boundary = match event {
            Event::End(_) => range.end,
            _ => range.start,
        };
        self.place_definitions(boundary);

        match event {
            Event::Start(tag) => self.start_tag(tag, range),
            Event::End(_) => self.end_tag(),
            Event::Text(text) => self.text(&text, range),
            Event::Code(_) => self.code_span(range),
            Event::Html(_) => self.html(range),
            Event::InlineHtml(_) => {
                let parent = self.inline_parent();
                self.leaf(
                    parent,
                    NodeKind::RawHtml {
                        segments: vec![range.into()],
                    },
                );
            }
            Event::SoftBreak => self.soft_break(range),
            Event::HardBreak => {
                let parent = self.inline_parent();
                let marker = trim_line_ending(self.source, range);
                self.leaf(parent, NodeKind::HardBreak { marker });
            }
            Event::Rule => {
                let parent = self.current();
                self.leaf(parent, NodeKind::ThematicBreak);
            }
            // Footnotes, math and task lists are not enabled.
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>, range: Range<usize>) {
        let source = self.source;
        match tag {
            Tag::Heading { level, .. } => {
                let parent = self.current();
                self.open(
                    parent,
                    NodeKind::Heading {
                        level: heading_level_to_u8(level),
                    },
                );
            }
            Tag::Paragraph => {
                let parent = self.current();
                if matches!(self.document.kind(parent), NodeKind::ListItem { .. }) {
                    if let Some(list) = self.document.parent(parent) {
                        if let NodeKind::List { tight, .. } = self.document.kind_mut(list) {
                            *tight = false;
                        }
                    }
                }
                let lines = paragraph_lines(source, range, self.blockquote_depth());
                self.open(parent, NodeKind::Paragraph { lines });
            }
            Tag::BlockQuote(_) => {
                let parent = self.current();
                self.open(parent, NodeKind::Blockquote);
            }
            Tag::CodeBlock(CodeBlockKind::Fenced(_)) => {
                let parent = self.current();
                let info = fence_info(source, range.start);
                self.open(
                    parent,
                    NodeKind::FencedCodeBlock {
                        info,
                        lines: Vec::new(),
                    },
                );
            }
            Tag::CodeBlock(CodeBlockKind::Indented) => {
                let parent = self.current();
                self.open(parent, NodeKind::CodeBlock { lines: Vec::new() });
            }
            Tag::HtmlBlock => {
                let parent = self.current();
                self.open(parent, NodeKind::HtmlBlock { lines: Vec::new() });
            }
            Tag::List(start) => {
                let parent = self.current();
                let marker = list_marker(source, range.start);
                self.open(
                    parent,
                    NodeKind::List {
                        ordered: start.is_some(),
                        marker,
                        start: start.unwrap_or(1),
                        tight: true,
                    },
                );
            }
            Tag::Item => {
                let parent = self.current();
                self.open(
                    parent,
                    NodeKind::ListItem {
                        blank_previous_lines: previous_line_is_blank(source, range.start),
                    },
                );
            }
            Tag::Table(alignments) => {
                let parent = self.current();
                let alignments = alignments.iter().map(column_alignment).collect();
                let delimiter_row = next_line(source, range.start);
                self.open(
                    parent,
                    NodeKind::Table {
                        alignments,
                        delimiter_row,
                    },
                );
            }
            Tag::TableHead => {
                self.row_padding = row_padding(source, range.start);
                let parent = self.current();
                self.open(parent, NodeKind::TableHeader);
            }
            Tag::TableRow => {
                self.row_padding = row_padding(source, range.start);
                let parent = self.current();
                self.open(parent, NodeKind::TableRow);
            }
            Tag::TableCell => {
                let parent = self.current();
                let index = self.document.children(parent).count();
                let (leading, trailing) = match self.row_padding.get(index) {
                    Some(&(leading, trailing)) => (Some(leading), Some(trailing)),
                    None => (None, None),
                };
                self.open(parent, NodeKind::TableCell { leading, trailing });
            }
            Tag::Emphasis => self.emphasis(1, range.start),
            Tag::Strong => self.emphasis(2, range.start),
            Tag::Strikethrough => {
                let parent = self.inline_parent();
                self.open(parent, NodeKind::Strikethrough);
            }
            Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            } => {
                let parent = self.inline_parent();
                let kind = match link_type {
                    LinkType::Autolink | LinkType::Email => NodeKind::AutoLink {
                        url: autolink_url(source, range),
                    },
                    _ => NodeKind::Link {
                        destination: dest_url.to_string(),
                        title: title.to_string(),
                        style: link_style(source, range, link_type, &id),
                    },
                };
                self.open(parent, kind);
            }
            Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            } => {
                let parent = self.inline_parent();
                self.open(
                    parent,
                    NodeKind::Image {
                        destination: dest_url.to_string(),
                        title: title.to_string(),
                        style: link_style(source, range, link_type, &id),
                    },
                );
            }
            Tag::MetadataBlock(kind) => {
                let format = match kind {
                    MetadataBlockKind::YamlStyle => FrontmatterFormat::Yaml,
                    MetadataBlockKind::PlusesStyle => FrontmatterFormat::Toml,
                };
                self.metadata = Some(PendingMetadata {
                    format,
                    span: range,
                    raw: String::new(),
                });
                self.stack.push(None);
            }
            _ => self.stack.push(None),
        }
    }

    /// Insert every pending definition that starts before `boundary` into the innermost
    /// open block container. Adjacent definitions share one node.
    fn place_definitions(&mut self, boundary: usize) {
        while self
            .definitions
            .front()
            .is_some_and(|span| span.start < boundary)
        {
            let Some(span) = self.definitions.pop_front() else {
                break;
            };
            let lines = paragraph_lines(self.source, span.clone(), self.blockquote_depth());

            let mut container = self.current();
            let mut before = None;
            while !matches!(
                self.document.kind(container),
                NodeKind::Document | NodeKind::Blockquote | NodeKind::ListItem { .. }
            ) {
                before = Some(container);
                match self.document.parent(container) {
                    Some(parent) => container = parent,
                    None => break,
                }
            }

            let previous = match before {
                Some(block) => self.document.prev_sibling(block),
                None => self.document.last_child(container),
            };
            if let Some(previous) = previous {
                let source = self.source;
                if let NodeKind::LinkDefinition { lines: existing } =
                    self.document.kind_mut(previous)
                {
                    let adjacent = existing.last().is_some_and(|last| {
                        last.stop <= span.start
                            && source.as_bytes()[last.stop..span.start]
                                .iter()
                                .filter(|&&b| b == b'\n')
                                .count()
                                == 1
                    });
                    if adjacent {
                        existing.extend(lines);
                        continue;
                    }
                }
            }

            let node = self.document.create(NodeKind::LinkDefinition { lines });
            match before {
                Some(block) => {
                    self.document.insert_before(block, node);
                }
                None => self.document.append_child(container, node),
            }
        }
    }

    fn emphasis(&mut self, level: u8, pos: usize) {
        let marker = self.source.as_bytes().get(pos).copied().unwrap_or(b'*');
        let parent = self.inline_parent();
        self.open(parent, NodeKind::Emphasis { level, marker });
    }

    fn end_tag(&mut self) {
        self.stack.pop();
        if let Some(pending) = self.metadata.take() {
            self.frontmatter = Some(Frontmatter {
                format: pending.format,
                raw: pending.raw,
                span: pending.span,
            });
        }
    }

    fn text(&mut self, text: &str, range: Range<usize>) {
        if let Some(pending) = self.metadata.as_mut() {
            pending.raw.push_str(text);
            return;
        }

        let current = self.current();
        if let NodeKind::CodeBlock { lines } | NodeKind::FencedCodeBlock { lines, .. } =
            self.document.kind_mut(current)
        {
            lines.push(range.into());
            return;
        }

        let parent = self.inline_parent();
        let source = self.source;
        let gap_is_inline = |stop: usize| {
            stop <= range.start && !source.as_bytes()[stop..range.start].contains(&b'\n')
        };
        if let Some(last) = self.document.last_child(parent) {
            if let NodeKind::Text {
                segment,
                soft_line_break: false,
            } = *self.document.kind(last)
            {
                if gap_is_inline(segment.stop) {
                    if let NodeKind::Text { segment, .. } = self.document.kind_mut(last) {
                        segment.stop = range.end;
                    }
                    return;
                }
            }
        }

        self.leaf(
            parent,
            NodeKind::Text {
                segment: range.into(),
                soft_line_break: false,
            },
        );
    }

    fn code_span(&mut self, range: Range<usize>) {
        let bytes = &self.source.as_bytes()[range.clone()];
        let fence_len = bytes.iter().take_while(|&&b| b == b'`').count();
        let inner = Segment::new(
            range.start + fence_len,
            range.end.saturating_sub(fence_len).max(range.start + fence_len),
        );

        let parent = self.inline_parent();
        let span = self.leaf(parent, NodeKind::CodeSpan { fence_len });
        self.leaf(
            span,
            NodeKind::Text {
                segment: inner,
                soft_line_break: false,
            },
        );
    }

    fn html(&mut self, range: Range<usize>) {
        let current = self.current();
        if let NodeKind::HtmlBlock { lines } = self.document.kind_mut(current) {
            lines.push(range.into());
            return;
        }
        let parent = self.inline_parent();
        self.leaf(
            parent,
            NodeKind::RawHtml {
                segments: vec![range.into()],
            },
        );
    }

    fn soft_break(&mut self, range: Range<usize>) {
        let parent = self.inline_parent();
        if let Some(last) = self.document.last_child(parent) {
            if let NodeKind::Text {
                soft_line_break, ..
            } = self.document.kind_mut(last)
            {
                *soft_line_break = true;
                return;
            }
        }
        self.leaf(
            parent,
            NodeKind::Text {
                segment: Segment::new(range.start, range.start),
                soft_line_break: true,
            },
        );
    }

    fn finalize(mut self) -> (Document, Option<Frontmatter>) {
        self.place_definitions(usize::MAX);
        (self.document, self.frontmatter)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn column_alignment(alignment: &Alignment) -> ColumnAlignment {
    match alignment {
        Alignment::None => ColumnAlignment::None,
        Alignment::Left => ColumnAlignment::Left,
        Alignment::Center => ColumnAlignment::Center,
        Alignment::Right => ColumnAlignment::Right,
    }
}

fn line_start(source: &str, pos: usize) -> usize {
    source.as_bytes()[..pos]
        .iter()
        .rposition(|&b| b == b'\n')
        .map(|p| p + 1)
        .unwrap_or(0)
}

fn line_end(source: &str, pos: usize) -> usize {
    source.as_bytes()[pos..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|p| pos + p)
        .unwrap_or(source.len())
}

/// The source line containing `pos`, without its newline or carriage return.
fn line_at(source: &str, pos: usize) -> Segment {
    let start = line_start(source, pos);
    let mut stop = line_end(source, pos);
    if stop > start && source.as_bytes()[stop - 1] == b'\r' {
        stop -= 1;
    }
    Segment::new(start, stop)
}

/// The line after the one containing `pos`.
fn next_line(source: &str, pos: usize) -> Option<Segment> {
    let end = line_end(source, pos);
    if end >= source.len() {
        return None;
    }
    Some(line_at(source, end + 1))
}

/// Whether the line before the one containing `pos` is empty, ignoring blockquote markers.
fn previous_line_is_blank(source: &str, pos: usize) -> bool {
    let start = line_start(source, pos);
    if start == 0 {
        return false;
    }
    let previous = line_at(source, start - 1);
    source.as_bytes()[previous.start..previous.stop]
        .iter()
        .all(|&b| b == b'>' || b.is_ascii_whitespace())
}

fn trim_line_ending(source: &str, range: Range<usize>) -> Segment {
    let bytes = source.as_bytes();
    let mut stop = range.end;
    while stop > range.start && matches!(bytes[stop - 1], b'\n' | b'\r') {
        stop -= 1;
    }
    Segment::new(range.start, stop)
}

/// Marker character of the list item starting at `pos`: the bullet for unordered lists,
/// the delimiter after the number for ordered ones.
fn list_marker(source: &str, pos: usize) -> u8 {
    source.as_bytes()[pos..]
        .iter()
        .copied()
        .skip_while(|b| b.is_ascii_whitespace())
        .find(|b| !b.is_ascii_digit())
        .unwrap_or(b'-')
}

/// Info string following the opening fence of the code block starting at `pos`.
fn fence_info(source: &str, pos: usize) -> Option<Segment> {
    let line = line_at(source, pos);
    let bytes = source.as_bytes();

    let mut start = pos.max(line.start);
    while start < line.stop && bytes[start].is_ascii_whitespace() {
        start += 1;
    }
    while start < line.stop && matches!(bytes[start], b'`' | b'~') {
        start += 1;
    }
    while start < line.stop && bytes[start].is_ascii_whitespace() {
        start += 1;
    }
    let mut stop = line.stop;
    while stop > start && bytes[stop - 1].is_ascii_whitespace() {
        stop -= 1;
    }

    (stop > start).then(|| Segment::new(start, stop))
}

/// Split a paragraph's source range into lines, dropping continuation indentation and up
/// to `quote_depth` blockquote markers from every line after the first.
fn paragraph_lines(source: &str, range: Range<usize>, quote_depth: usize) -> Vec<Segment> {
    let bytes = source.as_bytes();
    let mut lines = Vec::new();
    let mut start = range.start;

    while start < range.end {
        let stop = line_end(source, start).min(range.end);
        let mut line_start = start;
        if start != range.start {
            for _ in 0..quote_depth {
                while line_start < stop && bytes[line_start] == b' ' {
                    line_start += 1;
                }
                if line_start < stop && bytes[line_start] == b'>' {
                    line_start += 1;
                    if line_start < stop && bytes[line_start] == b' ' {
                        line_start += 1;
                    }
                }
            }
            while line_start < stop && bytes[line_start].is_ascii_whitespace() {
                line_start += 1;
            }
        }
        if stop > line_start {
            lines.push(Segment::new(line_start, stop));
        }
        start = stop + 1;
    }

    lines
}

/// Whitespace between each pair of unescaped pipes on the table row starting at `pos`.
fn row_padding(source: &str, pos: usize) -> Vec<(Segment, Segment)> {
    let line = line_at(source, pos);
    let bytes = source.as_bytes();

    let mut cells = Vec::new();
    let mut cell_start = line.start;
    let mut i = line.start;
    while i < line.stop {
        match bytes[i] {
            b'\\' => i += 1,
            b'|' => {
                cells.push(Segment::new(cell_start, i));
                cell_start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    cells.push(Segment::new(cell_start, line.stop));

    let blank = |cell: &Segment| bytes[cell.start..cell.stop].iter().all(u8::is_ascii_whitespace);
    if cells.len() > 1 && cells.first().is_some_and(blank) {
        cells.remove(0);
    }
    if cells.len() > 1 && cells.last().is_some_and(blank) {
        cells.pop();
    }

    cells
        .into_iter()
        .map(|cell| {
            let content = &bytes[cell.start..cell.stop];
            let leading = content.iter().take_while(|b| b.is_ascii_whitespace()).count();
            let trailing = content
                .iter()
                .rev()
                .take_while(|b| b.is_ascii_whitespace())
                .count()
                .min(content.len() - leading);
            (
                Segment::new(cell.start, cell.start + leading),
                Segment::new(cell.stop - trailing, cell.stop),
            )
        })
        .collect()
}

/// How the link or image spanning `range` names its destination.
fn link_style(source: &str, range: Range<usize>, link_type: LinkType, id: &str) -> LinkStyle {
    match link_type {
        LinkType::Reference | LinkType::ReferenceUnknown => LinkStyle::Reference {
            label: reference_label(source, range).unwrap_or_else(|| id.to_string()),
        },
        LinkType::Collapsed | LinkType::CollapsedUnknown => LinkStyle::Collapsed,
        LinkType::Shortcut | LinkType::ShortcutUnknown => LinkStyle::Shortcut,
        _ => LinkStyle::Inline {
            angle_brackets: destination_in_angle_brackets(source, range),
        },
    }
}

/// The label of a `[text][label]` link, as written.
fn reference_label(source: &str, range: Range<usize>) -> Option<String> {
    let inner = source.get(range)?.strip_suffix(']')?;
    let open = inner.rfind('[')?;
    Some(inner[open + 1..].to_string())
}

/// Whether the inline link spanning `range` wrote its destination as `<...>`.
fn destination_in_angle_brackets(source: &str, range: Range<usize>) -> bool {
    let bytes = &source.as_bytes()[range];
    let mut i = if bytes.starts_with(b"![") { 2 } else { 1 };
    let mut depth = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'[' => depth += 1,
            b']' if depth == 0 => break,
            b']' => depth -= 1,
            _ => {}
        }
        i += 1;
    }

    let rest = bytes.get(i + 1..).unwrap_or_default();
    match rest.split_first() {
        Some((&b'(', after)) => after
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .is_some_and(|&b| b == b'<'),
        _ => false,
    }
}

fn autolink_url(source: &str, range: Range<usize>) -> String {
    source[range]
        .trim_start_matches('<')
        .trim_end_matches('>')
        .to_string()
}

//! Markdown renderer.
//!
//! Rendering a tree straight out of the parser reproduces the source text, so callers can
//! edit a document in place and write it back without disturbing untouched parts. The
//! supported round-trip form is the one this renderer emits: ATX headings, `1.` ordered
//! items, backtick fences and pipe tables with outer pipes. Runs of blank lines between
//! blocks, loose list items included, come back as a single blank line.
//!
//! Content that continues a list item is indented to the item's content column: two
//! columns per enclosing bullet list and three per ordered list, counted up to the nearest
//! blockquote.

use std::io::{self, Write};

use serde::Serialize;

use crate::document::{ColumnAlignment, Document, LinkStyle, NodeId, NodeKind, WalkStatus};
use crate::parser::{Frontmatter, FrontmatterFormat};
use crate::source::{Segment, Source};

/// Errors from rendering or from serializing frontmatter for a render.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to write markdown: {0}")]
    Io(#[from] io::Error),
    #[error("failed to serialize YAML frontmatter: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to serialize TOML frontmatter: {0}")]
    Toml(#[from] toml::ser::Error),
}

/// Writes the textual content of text, code and html nodes.
///
/// Markdown punctuation bypasses the text writer; only content taken from the source
/// buffer goes through it.
pub trait TextWriter {
    fn write_text(&mut self, out: &mut dyn Write, text: &[u8]) -> io::Result<()>;
}

/// Writes text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTextWriter;

impl TextWriter for DefaultTextWriter {
    fn write_text(&mut self, out: &mut dyn Write, text: &[u8]) -> io::Result<()> {
        out.write_all(text)
    }
}

/// Serialized frontmatter, ready to be written between fences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontmatterValue {
    pub format: FrontmatterFormat,
    pub body: String,
}

impl FrontmatterValue {
    pub fn yaml<T: Serialize + ?Sized>(value: &T) -> Result<Self, RenderError> {
        Ok(FrontmatterValue {
            format: FrontmatterFormat::Yaml,
            body: serde_yaml::to_string(value)?,
        })
    }

    pub fn toml<T: Serialize + ?Sized>(value: &T) -> Result<Self, RenderError> {
        Ok(FrontmatterValue {
            format: FrontmatterFormat::Toml,
            body: toml::to_string(value)?,
        })
    }
}

impl From<&Frontmatter> for FrontmatterValue {
    fn from(frontmatter: &Frontmatter) -> Self {
        FrontmatterValue {
            format: frontmatter.format,
            body: frontmatter.raw.clone(),
        }
    }
}

/// Renderer configuration.
pub struct RenderConfig {
    pub text_writer: Box<dyn TextWriter>,
    /// Written in place of the `Frontmatter` placeholder node.
    pub frontmatter: Option<FrontmatterValue>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            text_writer: Box::new(DefaultTextWriter),
            frontmatter: None,
        }
    }
}

impl RenderConfig {
    pub fn with_text_writer(mut self, writer: impl TextWriter + 'static) -> Self {
        self.text_writer = Box::new(writer);
        self
    }

    /// Re-render `value` as YAML frontmatter.
    pub fn with_frontmatter<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, RenderError> {
        self.frontmatter = Some(FrontmatterValue::yaml(value)?);
        Ok(self)
    }

    /// Re-render `value` as `+++` fenced TOML frontmatter.
    pub fn with_toml_frontmatter<T: Serialize + ?Sized>(
        mut self,
        value: &T,
    ) -> Result<Self, RenderError> {
        self.frontmatter = Some(FrontmatterValue::toml(value)?);
        Ok(self)
    }

    /// Write a parsed metadata block back out unchanged.
    pub fn with_parsed_frontmatter(mut self, frontmatter: &Frontmatter) -> Self {
        self.frontmatter = Some(frontmatter.into());
        self
    }
}

/// Renders node trees back to markdown.
#[derive(Default)]
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Renderer { config }
    }

    /// Render `node` and its descendants to `out`.
    pub fn render<W: Write>(
        &mut self,
        document: &Document,
        node: NodeId,
        source: &Source,
        out: &mut W,
    ) -> Result<(), RenderError> {
        self.render_node(document, node, source, out)
    }

    pub fn render_to_string(
        &mut self,
        document: &Document,
        node: NodeId,
        source: &Source,
    ) -> Result<String, RenderError> {
        let mut out = Vec::new();
        self.render_node(document, node, source, &mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    fn render_node(
        &mut self,
        document: &Document,
        node: NodeId,
        source: &Source,
        out: &mut dyn Write,
    ) -> Result<(), RenderError> {
        document.walk(node, &mut |id, entering| {
            self.visit(document, source, out, id, entering)
        })?;
        Ok(())
    }

    fn write_text(&mut self, out: &mut dyn Write, text: &[u8]) -> Result<(), RenderError> {
        self.config.text_writer.write_text(out, text)?;
        Ok(())
    }

    /// Write source lines, indenting the first by `first` columns and the rest by `rest`.
    /// Blank lines are never indented.
    fn write_lines(
        &mut self,
        out: &mut dyn Write,
        source: &Source,
        lines: &[Segment],
        first: usize,
        rest: usize,
    ) -> Result<(), RenderError> {
        for (position, line) in lines.iter().enumerate() {
            let value = line.value(source);
            if !is_blank_line(value) {
                write_spaces(out, if position == 0 { first } else { rest })?;
            }
            self.write_text(out, value)?;
        }
        Ok(())
    }

    fn visit(
        &mut self,
        document: &Document,
        source: &Source,
        out: &mut dyn Write,
        node: NodeId,
        entering: bool,
    ) -> Result<WalkStatus, RenderError> {
        match document.kind(node) {
            NodeKind::Document | NodeKind::Branch { .. } | NodeKind::Hashtag { .. } => {}

            NodeKind::Frontmatter => {
                if entering {
                    self.render_frontmatter(out)?;
                }
            }

            NodeKind::Heading { level } => {
                if entering {
                    write_spaces(out, block_indent_width(document, node))?;
                    out.write_all("#".repeat(usize::from(*level)).as_bytes())?;
                    out.write_all(b" ")?;
                } else if is_followed(document, node) {
                    out.write_all(b"\n\n")?;
                } else {
                    out.write_all(b"\n")?;
                }
            }

            NodeKind::Paragraph { .. } => {
                if entering {
                    write_spaces(out, block_indent_width(document, node))?;
                } else if is_followed(document, node) {
                    out.write_all(b"\n\n")?;
                } else {
                    out.write_all(b"\n")?;
                }
            }

            NodeKind::TextBlock => {
                if !entering
                    && document.next_sibling(node).is_some()
                    && document.has_children(node)
                {
                    out.write_all(b"\n")?;
                }
            }

            NodeKind::List { .. } => {
                if !entering && is_block_level(document, node) && is_followed(document, node) {
                    out.write_all(b"\n")?;
                }
            }

            NodeKind::ListItem { .. } => self.render_list_item(document, out, node, entering)?,

            NodeKind::Blockquote => {
                if entering {
                    let mut inner = Vec::new();
                    for child in document.children(node) {
                        self.render_node(document, child, source, &mut inner)?;
                    }
                    write_quoted(
                        out,
                        &inner,
                        block_indent_width(document, node),
                        indent_width(document, node),
                    )?;
                    return Ok(WalkStatus::SkipChildren);
                }
                if is_followed(document, node) {
                    out.write_all(b"\n")?;
                }
            }

            NodeKind::CodeBlock { lines } => {
                let indent = indent_width(document, node);
                if entering {
                    write_spaces(out, block_indent_width(document, node))?;
                    out.write_all(b"```\n")?;
                    self.write_lines(out, source, lines, indent, indent)?;
                } else {
                    write_spaces(out, indent)?;
                    out.write_all(b"```\n")?;
                    write_block_gap(document, node, out)?;
                }
            }

            NodeKind::FencedCodeBlock { info, lines } => {
                let indent = indent_width(document, node);
                if entering {
                    write_spaces(out, block_indent_width(document, node))?;
                    out.write_all(b"```")?;
                    if let Some(info) = info {
                        self.write_text(out, info.value(source))?;
                    }
                    out.write_all(b"\n")?;
                    self.write_lines(out, source, lines, indent, indent)?;
                } else {
                    write_spaces(out, indent)?;
                    out.write_all(b"```\n")?;
                    write_block_gap(document, node, out)?;
                }
            }

            NodeKind::HtmlBlock { lines } => {
                if entering {
                    let (first, rest) =
                        (block_indent_width(document, node), indent_width(document, node));
                    self.write_lines(out, source, lines, first, rest)?;
                } else {
                    write_block_gap(document, node, out)?;
                }
            }

            NodeKind::LinkDefinition { lines } => {
                if entering {
                    let rest = indent_width(document, node);
                    for (position, line) in lines.iter().enumerate() {
                        let indent = if position == 0 {
                            block_indent_width(document, node)
                        } else {
                            rest
                        };
                        write_spaces(out, indent)?;
                        out.write_all(line.value(source))?;
                        out.write_all(b"\n")?;
                    }
                    write_block_gap(document, node, out)?;
                }
            }

            NodeKind::ThematicBreak => {
                if entering {
                    write_spaces(out, block_indent_width(document, node))?;
                    out.write_all(b"---\n")?;
                    write_block_gap(document, node, out)?;
                }
            }

            // The header writes the delimiter row when it is left.
            NodeKind::Table { .. } => {
                if !entering {
                    write_block_gap(document, node, out)?;
                }
            }

            NodeKind::TableHeader => {
                let table = document.parent(node).unwrap_or(node);
                if entering {
                    write_spaces(out, block_indent_width(document, table))?;
                } else {
                    out.write_all(b"|\n")?;
                    write_spaces(out, indent_width(document, table))?;
                    write_delimiter_row(document, node, source, out)?;
                }
            }

            NodeKind::TableRow => {
                if entering {
                    write_spaces(out, indent_width(document, node))?;
                } else {
                    out.write_all(b"|\n")?;
                }
            }

            NodeKind::TableCell { leading, trailing } => {
                if entering {
                    out.write_all(b"|")?;
                    write_padding(out, source, leading)?;
                } else {
                    write_padding(out, source, trailing)?;
                }
            }

            NodeKind::Text {
                segment,
                soft_line_break,
            } => {
                if entering {
                    self.write_text(out, segment.value(source))?;
                    if *soft_line_break {
                        out.write_all(b"\n")?;
                        write_spaces(out, indent_width(document, node))?;
                    }
                }
            }

            NodeKind::HardBreak { marker } => {
                if entering {
                    out.write_all(marker.value(source))?;
                    out.write_all(b"\n")?;
                    write_spaces(out, indent_width(document, node))?;
                }
            }

            NodeKind::Emphasis { level, marker } => {
                out.write_all(&vec![*marker; usize::from(*level)])?;
            }

            NodeKind::Strikethrough => out.write_all(b"~~")?,

            NodeKind::CodeSpan { fence_len } => {
                out.write_all("`".repeat(*fence_len).as_bytes())?;
            }

            NodeKind::Link {
                destination,
                title,
                style,
            } => {
                if entering {
                    out.write_all(b"[")?;
                } else {
                    out.write_all(b"]")?;
                    write_link_target(out, destination, title, style)?;
                }
            }

            NodeKind::Image {
                destination,
                title,
                style,
            } => {
                if entering {
                    out.write_all(b"![")?;
                    self.write_text(out, document.text(node, source).as_bytes())?;
                    out.write_all(b"]")?;
                    write_link_target(out, destination, title, style)?;
                    return Ok(WalkStatus::SkipChildren);
                }
            }

            NodeKind::AutoLink { url } => {
                if entering {
                    out.write_all(b"<")?;
                    out.write_all(url.as_bytes())?;
                    out.write_all(b">")?;
                    return Ok(WalkStatus::SkipChildren);
                }
            }

            NodeKind::RawHtml { segments } => {
                if entering {
                    for segment in segments {
                        out.write_all(segment.value(source))?;
                    }
                }
            }
        }
        Ok(WalkStatus::Continue)
    }

    fn render_list_item(
        &mut self,
        document: &Document,
        out: &mut dyn Write,
        node: NodeId,
        entering: bool,
    ) -> Result<(), RenderError> {
        let Some(list) = document.parent(node) else {
            return Ok(());
        };
        let NodeKind::List {
            ordered,
            marker,
            tight,
            ..
        } = *document.kind(list)
        else {
            return Ok(());
        };

        if entering {
            let indent = if document.first_child(list) == Some(node) {
                block_indent_width(document, list)
            } else {
                indent_width(document, list)
            };
            write_spaces(out, indent)?;
            if ordered {
                out.write_all(b"1")?;
            }
            out.write_all(&[marker])?;
            if document.has_children(node) {
                out.write_all(b" ")?;
            }
            return Ok(());
        }

        let ends_with_list = document
            .last_child(node)
            .is_some_and(|last| matches!(document.kind(last), NodeKind::List { .. }));
        if ends_with_list {
            return Ok(());
        }
        if !tight {
            let next_is_spaced = document.next_sibling(node).is_some_and(|next| {
                matches!(
                    document.kind(next),
                    NodeKind::ListItem {
                        blank_previous_lines: true
                    }
                )
            });
            if !next_is_spaced {
                return Ok(());
            }
        }
        out.write_all(b"\n")?;
        Ok(())
    }

    fn render_frontmatter(&mut self, out: &mut dyn Write) -> Result<(), RenderError> {
        let Some(frontmatter) = &self.config.frontmatter else {
            return Ok(());
        };
        let fence = frontmatter.format.fence();

        writeln!(out, "{}", fence)?;
        out.write_all(frontmatter.body.as_bytes())?;
        if !frontmatter.body.is_empty() && !frontmatter.body.ends_with('\n') {
            out.write_all(b"\n")?;
        }
        write!(out, "{}\n\n", fence)?;
        Ok(())
    }
}

/// Render with the default configuration.
pub fn render<W: Write>(
    document: &Document,
    node: NodeId,
    source: &Source,
    out: &mut W,
) -> Result<(), RenderError> {
    Renderer::default().render(document, node, source, out)
}

/// Render with the default configuration into a string.
pub fn render_to_string(
    document: &Document,
    node: NodeId,
    source: &Source,
) -> Result<String, RenderError> {
    Renderer::default().render_to_string(document, node, source)
}

/// Whether anything follows `node` in its block context. Branches are transparent, so a
/// node at the end of a branch is followed by whatever follows the branch.
fn is_followed(document: &Document, node: NodeId) -> bool {
    if document.next_sibling(node).is_some() {
        return true;
    }
    match document.parent(node) {
        Some(parent) if matches!(document.kind(parent), NodeKind::Branch { .. }) => {
            is_followed(document, parent)
        }
        _ => false,
    }
}

/// Whether `node` sits at the top level of the document, looking through branches.
fn is_block_level(document: &Document, node: NodeId) -> bool {
    match document.parent(node) {
        Some(parent) => matches!(
            document.kind(parent),
            NodeKind::Document | NodeKind::Branch { .. }
        ),
        None => false,
    }
}

fn write_block_gap(document: &Document, node: NodeId, out: &mut dyn Write) -> io::Result<()> {
    if is_followed(document, node) {
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Content column of `node`: two per enclosing bullet list and three per ordered list.
/// A blockquote writes its own prefix, so lists outside it are not counted.
fn indent_width(document: &Document, node: NodeId) -> usize {
    let mut indent = 0;
    let mut current = document.parent(node);
    while let Some(ancestor) = current {
        match document.kind(ancestor) {
            NodeKind::List { ordered, .. } => indent += if *ordered { 3 } else { 2 },
            NodeKind::Blockquote => break,
            _ => {}
        }
        current = document.parent(ancestor);
    }
    indent
}

/// Indentation before the first line of a block. The first block of a list item shares
/// its line with the item marker.
fn block_indent_width(document: &Document, node: NodeId) -> usize {
    let opens_item = document.parent(node).is_some_and(|parent| {
        matches!(document.kind(parent), NodeKind::ListItem { .. })
            && document.first_child(parent) == Some(node)
    });
    if opens_item {
        0
    } else {
        indent_width(document, node)
    }
}

fn write_spaces(out: &mut dyn Write, count: usize) -> io::Result<()> {
    if count > 0 {
        out.write_all(" ".repeat(count).as_bytes())?;
    }
    Ok(())
}

fn is_blank_line(line: &[u8]) -> bool {
    line.iter().all(|b| matches!(b, b'\n' | b'\r'))
}

/// Prefix every line of `inner` with a blockquote marker, indented by `first` columns on
/// the first line and `rest` after.
fn write_quoted(out: &mut dyn Write, inner: &[u8], first: usize, rest: usize) -> io::Result<()> {
    for (position, line) in inner.split_inclusive(|&b| b == b'\n').enumerate() {
        write_spaces(out, if position == 0 { first } else { rest })?;
        if line == b"\n" {
            out.write_all(b">\n")?;
        } else {
            out.write_all(b"> ")?;
            out.write_all(line)?;
        }
    }
    Ok(())
}

fn write_padding(out: &mut dyn Write, source: &Source, padding: &Option<Segment>) -> io::Result<()> {
    match padding {
        Some(segment) => out.write_all(segment.value(source)),
        None => out.write_all(b" "),
    }
}

/// Everything after a link's closing `]`.
fn write_link_target(
    out: &mut dyn Write,
    destination: &str,
    title: &str,
    style: &LinkStyle,
) -> io::Result<()> {
    match style {
        LinkStyle::Inline { angle_brackets } => {
            out.write_all(b"(")?;
            if *angle_brackets || needs_angle_brackets(destination) {
                let escaped = destination.replace('<', "\\<").replace('>', "\\>");
                write!(out, "<{}>", escaped)?;
            } else {
                out.write_all(destination.as_bytes())?;
            }
            if !title.is_empty() {
                write!(out, " \"{}\"", escape_title(title))?;
            }
            out.write_all(b")")
        }
        LinkStyle::Reference { label } => write!(out, "[{}]", label),
        LinkStyle::Collapsed => out.write_all(b"[]"),
        LinkStyle::Shortcut => Ok(()),
    }
}

/// A bare destination cannot hold whitespace, control characters or unbalanced parentheses.
fn needs_angle_brackets(destination: &str) -> bool {
    if destination.starts_with('<') {
        return true;
    }
    let mut depth = 0usize;
    for c in destination.chars() {
        match c {
            c if c.is_whitespace() || c.is_control() => return true,
            '(' => depth += 1,
            ')' => match depth.checked_sub(1) {
                Some(less) => depth = less,
                None => return true,
            },
            _ => {}
        }
    }
    depth != 0
}

fn escape_title(title: &str) -> String {
    let mut escaped = String::with_capacity(title.len());
    let mut chars = title.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' if chars.peek().is_none_or(|next| next.is_ascii_punctuation()) => {
                escaped.push_str("\\\\")
            }
            other => escaped.push(other),
        }
    }
    escaped
}

fn write_delimiter_row(
    document: &Document,
    header: NodeId,
    source: &Source,
    out: &mut dyn Write,
) -> io::Result<()> {
    let Some(table) = document.parent(header) else {
        return Ok(());
    };
    let NodeKind::Table {
        alignments,
        delimiter_row,
    } = document.kind(table)
    else {
        return Ok(());
    };

    if let Some(row) = delimiter_row {
        out.write_all(row.value(source))?;
        return out.write_all(b"\n");
    }

    for alignment in alignments {
        let cell = match alignment {
            ColumnAlignment::None => "---",
            ColumnAlignment::Left => ":--",
            ColumnAlignment::Center => ":-:",
            ColumnAlignment::Right => "--:",
        };
        write!(out, "|{}", cell)?;
    }
    out.write_all(b"|\n")
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use crate::parser::{ParseOptions, Parser};

    use super::*;

    fn round_trip(text: &str) -> String {
        let parsed = Parser::default().parse(text).unwrap();
        render_to_string(&parsed.document, parsed.document.root(), &parsed.source).unwrap()
    }

    #[test]
    fn heading_and_paragraphs() {
        let text = "# Title\n\nFirst paragraph.\n\nSecond paragraph\nwith a soft break.\n";
        assert_eq!(round_trip(text), text);
    }

    #[test]
    fn nested_lists() {
        let text = "- one\n- two\n  - nested\n  - again\n- three\n\nAfter.\n";
        assert_eq!(round_trip(text), text);
    }

    #[test]
    fn loose_ordered_list() {
        let text = "1. first\n\n1. second\n";
        assert_eq!(round_trip(text), text);
    }

    #[test]
    fn blockquote_with_two_paragraphs() {
        let text = "> one\n> two\n>\n> three\n\nAfter.\n";
        assert_eq!(round_trip(text), text);
    }

    #[test]
    fn inline_markup() {
        let text = "Some *em*, __strong__, `code`, ~~gone~~ and [a link](https://example.com \"Title\").\n";
        assert_eq!(round_trip(text), text);
    }

    #[test]
    fn edited_link_target_is_escaped() {
        let mut source = Source::from("");
        let mut doc = Document::new();
        let paragraph = doc.create(NodeKind::Paragraph { lines: Vec::new() });
        let link = doc.create(NodeKind::Link {
            destination: "my notes.md".to_string(),
            title: "say \"hi\" \\o/".to_string(),
            style: LinkStyle::default(),
        });
        let text = doc.new_text_segment(&mut source, "notes");
        doc.append_child(link, text);
        doc.append_child(paragraph, link);
        let root = doc.root();
        doc.append_child(root, paragraph);

        let out = render_to_string(&doc, root, &source).unwrap();
        assert_eq!(out, "[notes](<my notes.md> \"say \\\"hi\\\" \\o/\")\n");
    }

    #[test]
    fn unbalanced_parentheses_use_angle_brackets() {
        assert!(needs_angle_brackets("a(b"));
        assert!(needs_angle_brackets("a)b"));
        assert!(!needs_angle_brackets("https://example.com/a_(b)"));
    }

    #[test]
    fn angle_bracket_destination_and_escaped_title() {
        let text = "A [link](<u> \"say \\\"hi\\\"\").\n";
        assert_eq!(round_trip(text), text);
    }

    #[test]
    fn reference_links_keep_their_form() {
        let text = "See [the docs][ref], [ref][] and [ref].\n\n[ref]: https://example.com\n";
        assert_eq!(round_trip(text), text);
    }

    #[test]
    fn blank_line_runs_between_items_collapse() {
        assert_eq!(round_trip("- a\n\n\n- b\n"), "- a\n\n- b\n");
    }

    #[test]
    fn table_without_alignment_row_is_synthesized() {
        let mut source = Source::from("");
        let mut doc = Document::new();
        let table = doc.create(NodeKind::Table {
            alignments: vec![ColumnAlignment::Left, ColumnAlignment::Right],
            delimiter_row: None,
        });
        let header = doc.create(NodeKind::TableHeader);
        for name in ["a", "b"] {
            let cell = doc.create(NodeKind::TableCell {
                leading: None,
                trailing: None,
            });
            let text = doc.new_text_segment(&mut source, name);
            doc.append_child(cell, text);
            doc.append_child(header, cell);
        }
        doc.append_child(table, header);
        let root = doc.root();
        doc.append_child(root, table);

        let out = render_to_string(&doc, root, &source).unwrap();
        assert_eq!(out, "| a | b |\n|:--|--:|\n");
    }

    #[derive(Serialize)]
    struct Meta {
        title: String,
    }

    #[test]
    fn frontmatter_is_rendered_from_config() {
        let parsed = Parser::new(ParseOptions::default().with_frontmatter())
            .parse("# Title\n")
            .unwrap();
        let config = RenderConfig::default()
            .with_frontmatter(&Meta {
                title: "Hello".to_string(),
            })
            .unwrap();

        let out = Renderer::new(config)
            .render_to_string(&parsed.document, parsed.document.root(), &parsed.source)
            .unwrap();
        assert_eq!(out, "---\ntitle: Hello\n---\n\n# Title\n");
    }

    #[test]
    fn frontmatter_placeholder_renders_nothing_by_default() {
        let parsed = Parser::new(ParseOptions::default().with_frontmatter())
            .parse("# Title\n")
            .unwrap();
        let out =
            render_to_string(&parsed.document, parsed.document.root(), &parsed.source).unwrap();
        assert_eq!(out, "# Title\n");
    }

    struct Shouting;

    impl TextWriter for Shouting {
        fn write_text(&mut self, out: &mut dyn Write, text: &[u8]) -> io::Result<()> {
            out.write_all(&text.to_ascii_uppercase())
        }
    }

    #[test]
    fn text_writer_sees_only_content() {
        let parsed = Parser::default().parse("# quiet\n\n*words*\n").unwrap();
        let out = Renderer::new(RenderConfig::default().with_text_writer(Shouting))
            .render_to_string(&parsed.document, parsed.document.root(), &parsed.source)
            .unwrap();
        assert_eq!(out, "# QUIET\n\n*WORDS*\n");
    }
}

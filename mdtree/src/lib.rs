pub mod document;
pub mod parser;
pub mod preprocess;
pub mod render;
pub mod source;

pub use document::{
    ColumnAlignment, Document, KindTag, LinkStyle, Node, NodeId, NodeKind, WalkStatus,
};
pub use parser::{ParseError, ParseOptions, ParsedDocument, Parser, parse_markdown};
pub use preprocess::build_tree;
pub use render::{RenderConfig, RenderError, Renderer, render, render_to_string};
pub use source::{Segment, Source};

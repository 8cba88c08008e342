use std::ops::Range;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::document::{Document, NodeKind};
use crate::parser::error::ParseError;

/// Syntax of a metadata block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontmatterFormat {
    /// Fenced by `---`.
    Yaml,
    /// Fenced by `+++`.
    Toml,
}

impl FrontmatterFormat {
    pub fn fence(&self) -> &'static str {
        match self {
            FrontmatterFormat::Yaml => "---",
            FrontmatterFormat::Toml => "+++",
        }
    }
}

/// Metadata captured from the top of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontmatter {
    pub format: FrontmatterFormat,
    /// Block contents without the fences.
    pub raw: String,
    /// Byte span of the whole block, fences included.
    pub span: Range<usize>,
}

impl Frontmatter {
    /// Deserialize the block into any serde type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ParseError> {
        match self.format {
            FrontmatterFormat::Yaml => serde_yaml::from_str(&self.raw).map_err(|err| {
                ParseError::error(
                    format!("invalid YAML frontmatter: {}", err),
                    self.span.clone(),
                )
            }),
            FrontmatterFormat::Toml => toml::from_str(&self.raw).map_err(|err| {
                ParseError::error(
                    format!("invalid TOML frontmatter: {}", err.message()),
                    self.span.clone(),
                )
            }),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ParseError> {
        let result = match self.format {
            FrontmatterFormat::Yaml => self.decode::<serde_yaml::Value>().map(drop),
            FrontmatterFormat::Toml => self.decode::<toml::Table>().map(drop),
        };
        result.map_err(|err| err.with_note("frontmatter must be a key-value document"))
    }
}

/// Put an empty `Frontmatter` node in front of everything else, so the renderer has a
/// place to write metadata back to.
pub(crate) fn insert_placeholder(document: &mut Document) {
    let root = document.root();
    let placeholder = document.create(NodeKind::Frontmatter);
    match document.first_child(root) {
        Some(first) => {
            document.insert_before(first, placeholder);
        }
        None => document.append_child(root, placeholder),
    }
    debug!("inserted frontmatter placeholder");
}

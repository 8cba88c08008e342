pub mod error;
mod frontmatter;
mod hashtag;
mod structural;

pub use error::ParseError;
pub use frontmatter::{Frontmatter, FrontmatterFormat};

use crate::document::Document;
use crate::source::Source;

/// Which markdown extensions the parser enables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// GFM pipe tables.
    pub tables: bool,
    /// `~~struck~~` text.
    pub strikethrough: bool,
    /// `#tag` hashtags, split out of text into `Hashtag` nodes.
    pub hashtags: bool,
    /// `---` YAML and `+++` TOML metadata blocks, plus a `Frontmatter` placeholder node
    /// at the top of the document.
    pub frontmatter: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            tables: true,
            strikethrough: true,
            hashtags: true,
            frontmatter: false,
        }
    }
}

impl ParseOptions {
    pub fn with_frontmatter(mut self) -> Self {
        self.frontmatter = true;
        self
    }

    pub fn without_hashtags(mut self) -> Self {
        self.hashtags = false;
        self
    }

    fn cmark_options(&self) -> pulldown_cmark::Options {
        use pulldown_cmark::Options;

        let mut options = Options::empty();
        if self.tables {
            options |= Options::ENABLE_TABLES;
        }
        if self.strikethrough {
            options |= Options::ENABLE_STRIKETHROUGH;
        }
        if self.frontmatter {
            options |= Options::ENABLE_YAML_STYLE_METADATA_BLOCKS;
            options |= Options::ENABLE_PLUSES_DELIMITED_METADATA_BLOCKS;
        }
        options
    }
}

/// A parsed tree together with the buffer its segments point into.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub document: Document,
    pub source: Source,
    /// Metadata block found at the top of the text, if the option was enabled.
    pub frontmatter: Option<Frontmatter>,
}

/// Parser entry point.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    options: ParseOptions,
}

impl Parser {
    pub fn new(options: ParseOptions) -> Self {
        Parser { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse markdown text into a tree.
    ///
    /// Fails only when a metadata block is present but is not valid YAML or TOML.
    pub fn parse(&self, text: &str) -> Result<ParsedDocument, ParseError> {
        let source = Source::from(text);
        let (mut document, frontmatter) = structural::build_document(text, &self.options);

        if let Some(frontmatter) = &frontmatter {
            frontmatter.validate()?;
        }

        if self.options.hashtags {
            hashtag::split_hashtags(&mut document, &source);
        }

        if self.options.frontmatter {
            frontmatter::insert_placeholder(&mut document);
        }

        Ok(ParsedDocument {
            document,
            source,
            frontmatter,
        })
    }
}

/// Parse with default options.
pub fn parse_markdown(text: &str) -> Result<ParsedDocument, ParseError> {
    Parser::default().parse(text)
}

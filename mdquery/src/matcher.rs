//! Path segments for querying a markdown tree.
//!
//! A query is a slice of [`Matcher`]s. Each one picks a node out of the region left by the
//! previous one and says where the search for the next segment starts.

use std::fmt;

use mdtree::{Document, KindTag, NodeId, NodeKind, Source};

/// Matches a heading by level and name.
///
/// A level of 0 matches any level and a missing name matches any heading text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Branch {
    pub level: u8,
    pub name: Option<String>,
    pub case_insensitive: bool,
}

impl Branch {
    pub fn new(level: u8, name: impl Into<String>) -> Self {
        Branch {
            level,
            name: Some(name.into()),
            case_insensitive: false,
        }
    }

    /// Any heading of `level`.
    pub fn level(level: u8) -> Self {
        Branch {
            level,
            ..Branch::default()
        }
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    fn matches(&self, document: &Document, node: NodeId, source: &Source) -> bool {
        let heading = match document.kind(node) {
            NodeKind::Heading { .. } => node,
            NodeKind::Branch { level } if *level > 0 => match document.first_child(node) {
                Some(heading) => heading,
                None => return false,
            },
            _ => return false,
        };

        let Some(level) = document.heading_level(node) else {
            return false;
        };
        if self.level != 0 && level != self.level {
            return false;
        }

        let Some(name) = &self.name else {
            return true;
        };
        let text = document.text(heading, source);
        if self.case_insensitive {
            text.to_lowercase() == name.to_lowercase()
        } else {
            text == *name
        }
    }

    fn end_match(&self, document: &Document, node: NodeId) -> bool {
        document
            .heading_level(node)
            .is_some_and(|level| level <= self.level)
    }

    fn next_node(&self, document: &Document, node: NodeId) -> Option<NodeId> {
        match document.kind(node) {
            NodeKind::Branch { .. } => document
                .first_child(node)
                .and_then(|heading| document.next_sibling(heading)),
            _ => document.next_sibling(node),
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = if self.level == 0 {
            "#?".to_string()
        } else {
            "#".repeat(usize::from(self.level))
        };
        match &self.name {
            Some(name) => write!(f, "[{} {}]", level, name),
            None => write!(f, "[{}]", level),
        }
    }
}

/// One segment of a query path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// A heading, and everything up to the next heading of the same or a higher level.
    Branch(Branch),
    /// The heading node itself. 0 matches any level.
    Heading { level: u8 },
    List,
    Tag,
    Table,
    NodeOfKind(KindTag),
    /// The inner matcher, but only at the given position since the previous match.
    Index { index: usize, inner: Box<Matcher> },
    AnyNode,
    /// Matches anything as a path segment. [`crate::query_children`] collects every node
    /// under a parent that matches the target.
    SearchFor(Box<Matcher>),
}

impl Matcher {
    pub fn branch(level: u8, name: impl Into<String>) -> Self {
        Matcher::Branch(Branch::new(level, name))
    }

    pub fn index(index: usize, inner: Matcher) -> Self {
        Matcher::Index {
            index,
            inner: Box::new(inner),
        }
    }

    pub fn search_for(target: Matcher) -> Self {
        Matcher::SearchFor(Box::new(target))
    }

    /// Whether `node` satisfies this segment. `index` counts the candidates tried since the
    /// previous segment matched.
    pub fn matches(&self, document: &Document, node: NodeId, index: usize, source: &Source) -> bool {
        match self {
            Matcher::Branch(branch) => branch.matches(document, node, source),
            Matcher::Heading { level } => match document.kind(node) {
                NodeKind::Heading { level: found } => *level == 0 || found == level,
                _ => false,
            },
            Matcher::List => matches!(document.kind(node), NodeKind::List { .. }),
            Matcher::Tag => matches!(document.kind(node), NodeKind::Hashtag { .. }),
            Matcher::Table => matches!(document.kind(node), NodeKind::Table { .. }),
            Matcher::NodeOfKind(kind) => document.kind(node).tag() == *kind,
            Matcher::Index {
                index: wanted,
                inner,
            } => *wanted == index && inner.matches(document, node, index, source),
            Matcher::AnyNode | Matcher::SearchFor(_) => true,
        }
    }

    /// Whether `node` closes the region opened by this segment.
    pub fn end_match(&self, document: &Document, node: NodeId) -> bool {
        match self {
            Matcher::Branch(branch) => branch.end_match(document, node),
            Matcher::Index { inner, .. } => inner.end_match(document, node),
            _ => false,
        }
    }

    /// Where the search for the following segment starts after this one matched `node`.
    pub fn next_node(&self, document: &Document, node: NodeId) -> Option<NodeId> {
        match self {
            Matcher::Branch(branch) => branch.next_node(document, node),
            Matcher::Index { inner, .. } => inner.next_node(document, node),
            _ => document.first_child(node),
        }
    }

    /// Whether the region after a match is made of following siblings rather than children.
    pub fn is_flat_branch(&self) -> bool {
        match self {
            Matcher::Branch(_) => true,
            Matcher::Index { inner, .. } => inner.is_flat_branch(),
            _ => false,
        }
    }
}

impl From<Branch> for Matcher {
    fn from(branch: Branch) -> Self {
        Matcher::Branch(branch)
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Branch(branch) => fmt::Display::fmt(branch, f),
            Matcher::Heading { level: 0 } => f.write_str(".heading(#?)"),
            Matcher::Heading { level } => {
                write!(f, ".heading({})", "#".repeat(usize::from(*level)))
            }
            Matcher::List => f.write_str(".list"),
            Matcher::Tag => f.write_str(".tag"),
            Matcher::Table => f.write_str(".table"),
            Matcher::NodeOfKind(kind) => write!(f, ".kind({})", kind),
            Matcher::Index { index, inner } => write!(f, "[{}]{}", index, inner),
            Matcher::AnyNode => f.write_str(".any"),
            Matcher::SearchFor(target) => write!(f, ".search({})", target),
        }
    }
}

#[cfg(test)]
mod tests {
    use mdtree::Parser;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Matcher::branch(1, "Title"), "[# Title]")]
    #[case(Branch::level(0).into(), "[#?]")]
    #[case(Branch::level(3).into(), "[###]")]
    #[case(Matcher::List, ".list")]
    #[case(Matcher::Tag, ".tag")]
    #[case(Matcher::Table, ".table")]
    #[case(Matcher::Heading { level: 2 }, ".heading(##)")]
    #[case(Matcher::NodeOfKind(KindTag::Paragraph), ".kind(Paragraph)")]
    #[case(Matcher::index(4, Matcher::AnyNode), "[4].any")]
    #[case(Matcher::search_for(Matcher::Tag), ".search(.tag)")]
    fn display(#[case] matcher: Matcher, #[case] expected: &str) {
        assert_eq!(matcher.to_string(), expected);
    }

    #[test]
    fn branch_compares_heading_text() {
        let parsed = Parser::default().parse("## Ingredients\n").unwrap();
        let doc = &parsed.document;
        let heading = doc.first_child(doc.root()).unwrap();

        assert!(Matcher::branch(2, "Ingredients").matches(doc, heading, 0, &parsed.source));
        assert!(Branch::level(0).matches(doc, heading, &parsed.source));
        assert!(!Matcher::branch(2, "ingredients").matches(doc, heading, 0, &parsed.source));
        assert!(
            Matcher::Branch(Branch::new(2, "ingredients").case_insensitive())
                .matches(doc, heading, 0, &parsed.source)
        );
        assert!(!Matcher::branch(3, "Ingredients").matches(doc, heading, 0, &parsed.source));
    }

    #[test]
    fn branch_end_match_uses_level() {
        let parsed = Parser::default().parse("# One\n\n## Two\n\n### Three\n").unwrap();
        let doc = &parsed.document;
        let headings: Vec<_> = doc.children(doc.root()).collect();
        let matcher = Matcher::branch(2, "Two");

        assert!(matcher.end_match(doc, headings[0]));
        assert!(matcher.end_match(doc, headings[1]));
        assert!(!matcher.end_match(doc, headings[2]));
        assert!(!Matcher::Branch(Branch::level(0)).end_match(doc, headings[0]));
    }

    #[test]
    fn index_delegates_traversal() {
        let branch = Matcher::index(0, Matcher::branch(1, "Title"));
        assert!(branch.is_flat_branch());
        assert!(!Matcher::index(0, Matcher::List).is_flat_branch());
    }
}

use mdtree::KindTag;

use crate::matcher::Matcher;

/// A query ran out of document before every segment matched.
///
/// Carries the segments that did match, in order, and the one that did not.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to match query: {} did not have a {}", path(.matches), .failed)]
pub struct QueryError {
    matches: Vec<Matcher>,
    failed: Matcher,
}

impl QueryError {
    pub(crate) fn new(matches: Vec<Matcher>, failed: Matcher) -> Self {
        QueryError { matches, failed }
    }

    pub fn matches(&self) -> &[Matcher] {
        &self.matches
    }

    pub fn failed(&self) -> &Matcher {
        &self.failed
    }
}

fn path(matches: &[Matcher]) -> String {
    let mut out = String::from("document");
    for matcher in matches {
        out.push_str(&matcher.to_string());
    }
    out
}

/// Errors from [`crate::query_one`] and [`crate::query_all`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("no queries provided")]
    EmptyQuery,
    #[error("empty markdown file")]
    EmptyDocument,
    #[error(transparent)]
    NoMatch(#[from] QueryError),
}

impl Error {
    /// True for a query that ran without finding its target, as opposed to a malformed one.
    pub fn is_no_match(&self) -> bool {
        matches!(self, Error::NoMatch(_))
    }
}

/// A matched node could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("expected {expected} node, got {got}")]
    ExpectedKind { expected: KindTag, got: KindTag },
    #[error("{0}")]
    Custom(String),
}

impl DecodeError {
    pub fn custom(message: impl Into<String>) -> Self {
        DecodeError::Custom(message.into())
    }
}

/// Errors from the `find` family, which query and then decode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FindError {
    #[error(transparent)]
    Query(#[from] Error),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl From<QueryError> for FindError {
    fn from(err: QueryError) -> Self {
        FindError::Query(Error::NoMatch(err))
    }
}

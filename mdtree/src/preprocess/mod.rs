//! Turns the flat heading/sibling layout of a parsed document into nested `Branch` nodes.
//!
//! After [`build_tree`], every heading is the first child of its own `Branch`, and the
//! branch holds everything up to the next heading of the same or a higher level. The
//! document root ends up with a single child, the level-0 root branch.

use tracing::debug;

use crate::document::{Document, NodeId, NodeKind};

/// Nest the document's top-level nodes under branches and return the root branch.
///
/// # Panics
///
/// Panics if a heading cannot be placed under any branch, which only happens when the
/// tree already holds a branch with an inconsistent level.
pub fn build_tree(document: &mut Document) -> NodeId {
    let root = document.root();
    let children: Vec<NodeId> = document.children(root).collect();

    let root_branch = document.create(NodeKind::Branch { level: 0 });
    let mut active = root_branch;

    for child in children {
        let NodeKind::Heading { level } = *document.kind(child) else {
            document.append_child(active, child);
            continue;
        };

        active = ascend_to_level(document, active, root_branch, level);

        let branch = document.create(NodeKind::Branch { level });
        document.append_child(branch, child);
        document.append_child(active, branch);
        debug!(level, under = %active, branch = %branch, "opened branch");
        active = branch;
    }

    document.append_child(root, root_branch);
    root_branch
}

/// Walk up from `active` to the nearest branch shallower than `level`.
fn ascend_to_level(document: &Document, mut active: NodeId, root_branch: NodeId, level: u8) -> NodeId {
    loop {
        let NodeKind::Branch { level: active_level } = *document.kind(active) else {
            panic!("branch tree holds a non-branch ancestor {}", active);
        };
        if active_level < level {
            return active;
        }
        if active == root_branch {
            panic!(
                "heading level {} cannot be nested under the root branch",
                level
            );
        }
        match document.parent(active) {
            Some(parent) => active = parent,
            None => panic!("branch {} was detached from the tree", active),
        }
    }
}

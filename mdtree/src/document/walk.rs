use super::{Document, NodeId};

/// What a walk callback wants to happen next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStatus {
    Continue,
    /// Do not descend into the current node. Only meaningful when entering.
    SkipChildren,
    Stop,
}

impl Document {
    /// Depth-first walk of `node` and its descendants.
    ///
    /// The callback sees every node twice, once with `entering == true` before its
    /// children and once with `entering == false` after them.
    pub fn walk<E, F>(&self, node: NodeId, f: &mut F) -> Result<WalkStatus, E>
    where
        F: FnMut(NodeId, bool) -> Result<WalkStatus, E>,
    {
        let status = f(node, true)?;
        if status == WalkStatus::Stop {
            return Ok(WalkStatus::Stop);
        }

        if status != WalkStatus::SkipChildren {
            let mut child = self.first_child(node);
            while let Some(current) = child {
                if self.walk(current, f)? == WalkStatus::Stop {
                    return Ok(WalkStatus::Stop);
                }
                child = self.next_sibling(current);
            }
        }

        if f(node, false)? == WalkStatus::Stop {
            return Ok(WalkStatus::Stop);
        }
        Ok(WalkStatus::Continue)
    }

    /// Walk `start`, then each of its following siblings, until the callback stops.
    pub fn walk_siblings_until<E, F>(&self, start: Option<NodeId>, f: &mut F) -> Result<(), E>
    where
        F: FnMut(NodeId, bool) -> Result<WalkStatus, E>,
    {
        let mut node = start;
        while let Some(current) = node {
            if self.walk(current, f)? == WalkStatus::Stop {
                break;
            }
            node = self.next_sibling(current);
        }
        Ok(())
    }
}

//! Breadth-first traversal over a host hierarchy.
//!
//! Discovery order is level order: the order in which the walker reaches nodes is the order in
//! which node ids are handed out, and therefore the order of `objects` in the document.

use crate::host::SceneHost;
use crate::identity_table::IdentityTable;

use log::trace;
use std::collections::VecDeque;

/// Visits every live node reachable from `roots` in breadth-first order.
///
/// `visitor` returns whether the walk should descend into the node's children. Dead nodes are
/// skipped without calling the visitor, wherever they appear in the queue.
///
/// The hierarchy is assumed to be a tree. A child shared between two parents is visited once per
/// path that reaches it.
pub fn walk_hierarchy<H, I, F>(host: &H, roots: I, mut visitor: F)
where
    H: SceneHost,
    I: IntoIterator<Item = H::Handle>,
    F: FnMut(H::Handle) -> bool,
{
    let mut queue: VecDeque<H::Handle> = roots.into_iter().collect();

    while let Some(cur) = queue.pop_front() {
        if !host.is_alive(cur) {
            trace!("Skipping destroyed node {:?}", cur);
            continue;
        }

        if !visitor(cur) {
            continue;
        }

        queue.extend(
            host.children(cur)
                .into_iter()
                .filter(|&child| host.is_alive(child)),
        );
    }
}

/// Single-root convenience for [`walk_hierarchy`].
pub fn walk_hierarchy_from<H, F>(host: &H, root: H::Handle, visitor: F)
where
    H: SceneHost,
    F: FnMut(H::Handle) -> bool,
{
    walk_hierarchy(host, std::iter::once(root), visitor)
}

/// Discovery pass: interns every reachable node, assigning ids in breadth-first order.
///
/// Returns the number of nodes visited.
pub fn gather_object_ids<H, I>(host: &H, objects: &mut IdentityTable<H::Handle>, roots: I) -> usize
where
    H: SceneHost,
    I: IntoIterator<Item = H::Handle>,
{
    let mut visited = 0;
    walk_hierarchy(host, roots, |node| {
        objects.get_id(Some(node));
        visited += 1;
        true
    });
    visited
}

//! Stable leveled topological sort.

use indexmap::{IndexMap, IndexSet};

use crate::ir::NodeId;

/// Topologically sort the nodes of `deps` (node -> set of nodes that
/// must come first). Nodes at the same depth keep the relative order of
/// `stable`. `None` when the graph has a cycle.
pub fn sort_graph(
    mut deps: IndexMap<NodeId, IndexSet<NodeId>>,
    stable: &[NodeId],
) -> Option<Vec<NodeId>> {
    let position = |n: NodeId| stable.iter().position(|&s| s == n).unwrap_or(usize::MAX);
    let mut out = Vec::with_capacity(deps.len());
    while !deps.is_empty() {
        let mut level: Vec<NodeId> =
            deps.iter().filter(|(_, d)| d.is_empty()).map(|(&n, _)| n).collect();
        if level.is_empty() {
            return None;
        }
        level.sort_by_key(|&n| position(n));
        for &n in &level {
            deps.shift_remove(&n);
        }
        for (_, d) in deps.iter_mut() {
            for n in &level {
                d.shift_remove(n);
            }
        }
        out.extend(level);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_nodes() -> (NodeId, NodeId, NodeId, NodeId) {
        use crate::ir::{NodeKind, Tree};
        let mut t = Tree::new();
        (
            t.add(NodeKind::Null),
            t.add(NodeKind::Null),
            t.add(NodeKind::Null),
            t.add(NodeKind::Null),
        )
    }

    #[test]
    fn dependencies_come_first_and_ties_stay_stable() {
        let (a, b, c, d) = four_nodes();
        let mut deps: IndexMap<NodeId, IndexSet<NodeId>> = IndexMap::new();
        deps.entry(a).or_default();
        deps.entry(b).or_default().insert(a);
        deps.entry(c).or_default();
        deps.entry(d).or_default().insert(b);
        let stable = [c, a, b, d];
        let sorted = sort_graph(deps, &stable).unwrap();
        assert_eq!(sorted, vec![c, a, b, d]);
    }

    #[test]
    fn cycles_are_reported() {
        let (a, b, _, _) = four_nodes();
        let mut deps: IndexMap<NodeId, IndexSet<NodeId>> = IndexMap::new();
        deps.entry(a).or_default().insert(b);
        deps.entry(b).or_default().insert(a);
        assert!(sort_graph(deps, &[a, b]).is_none());
    }
}

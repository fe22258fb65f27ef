//! Branch-merging union of statement trees.
//!
//! Given several trees that share a branching skeleton (the per-target
//! paths rebuilt by the cone refiner, or two synchronous process
//! bodies), produce one tree where actions guarded by structurally equal
//! conditions live under a single branch. Non-mergeable actions keep
//! their relative order.

use crate::ir::{EqualsOptions, NodeId, NodeKind, Tree, f};

/// Options of [`merge_trees`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    /// Merge If/Switch branches with structurally equal conditions
    /// instead of concatenating them.
    pub merge_branches: bool,
}

/// Merge `trees` (all of the same kind: State, If, ...) into the first
/// one. The remaining trees are consumed. Returns the merged root, or
/// `None` when the list is empty.
pub fn merge_trees(tree: &mut Tree, trees: Vec<NodeId>, opts: &MergeOptions) -> Option<NodeId> {
    let mut iter = trees.into_iter();
    let acc = iter.next()?;
    for next in iter {
        merge_into(tree, acc, next, opts);
        tree.delete(next);
    }
    Some(acc)
}

fn actions_field(tree: &Tree, node: NodeId) -> Option<&'static str> {
    match tree.kind(node) {
        NodeKind::State | NodeKind::IfAlt | NodeKind::SwitchAlt | NodeKind::While => {
            Some(f::ACTIONS)
        }
        NodeKind::For => Some(f::FORACTIONS),
        _ => None,
    }
}

fn merge_into(tree: &mut Tree, acc: NodeId, other: NodeId, opts: &MergeOptions) {
    let Some(field) = actions_field(tree, acc) else { return };
    if tree.kind(acc) != tree.kind(other) {
        return;
    }
    let incoming = tree.list_take(other, actions_field(tree, other).unwrap());
    for action in incoming {
        if opts.merge_branches {
            if let Some(existing) = find_mergeable(tree, acc, field, action) {
                merge_branching(tree, existing, action, opts);
                tree.delete(action);
                continue;
            }
        }
        tree.list_push(acc, field, action);
    }
}

/// An existing action in `acc.field` that `action` can merge into: an
/// If/Switch with structurally equal guards.
fn find_mergeable(tree: &Tree, acc: NodeId, field: &str, action: NodeId) -> Option<NodeId> {
    let kind = tree.kind(action);
    if kind != NodeKind::If && kind != NodeKind::Switch {
        return None;
    }
    tree.list(acc, field)
        .iter()
        .copied()
        .find(|&e| tree.kind(e) == kind && same_guards(tree, e, action))
}

fn same_guards(tree: &Tree, a: NodeId, b: NodeId) -> bool {
    let opts = EqualsOptions::default();
    match tree.kind(a) {
        NodeKind::If => {
            let aa = tree.list(a, f::ALTS);
            let bb = tree.list(b, f::ALTS);
            aa.len() == bb.len()
                && aa.iter().zip(bb).all(|(&x, &y)| {
                    match (tree.slot(x, f::CONDITION), tree.slot(y, f::CONDITION)) {
                        (Some(cx), Some(cy)) => tree.equals(cx, cy, &opts),
                        _ => false,
                    }
                })
        }
        NodeKind::Switch => {
            let (ca, cb) = (tree.slot(a, f::CONDITION), tree.slot(b, f::CONDITION));
            match (ca, cb) {
                (Some(x), Some(y)) => tree.equals(x, y, &opts),
                _ => false,
            }
        }
        _ => false,
    }
}

fn merge_branching(tree: &mut Tree, acc: NodeId, other: NodeId, opts: &MergeOptions) {
    match tree.kind(acc) {
        NodeKind::If => {
            let acc_alts: Vec<NodeId> = tree.list(acc, f::ALTS).to_vec();
            let other_alts: Vec<NodeId> = tree.list(other, f::ALTS).to_vec();
            for (a, o) in acc_alts.into_iter().zip(other_alts) {
                merge_into(tree, a, o, opts);
            }
            // Defaults concatenate (with branch merging inside).
            let defaults = tree.list_take(other, f::DEFAULTS);
            for d in defaults {
                if opts.merge_branches {
                    if let Some(existing) = find_mergeable(tree, acc, f::DEFAULTS, d) {
                        merge_branching(tree, existing, d, opts);
                        tree.delete(d);
                        continue;
                    }
                }
                tree.list_push(acc, f::DEFAULTS, d);
            }
        }
        NodeKind::Switch => {
            let acc_alts: Vec<NodeId> = tree.list(acc, f::ALTS).to_vec();
            let other_alts: Vec<NodeId> = tree.list(other, f::ALTS).to_vec();
            let eq = EqualsOptions::default();
            'outer: for o in other_alts {
                for &a in &acc_alts {
                    let conds_a: Vec<NodeId> = tree.list(a, f::CONDITIONS).to_vec();
                    let conds_o: Vec<NodeId> = tree.list(o, f::CONDITIONS).to_vec();
                    let same = conds_a.len() == conds_o.len()
                        && conds_a.iter().zip(&conds_o).all(|(&x, &y)| tree.equals(x, y, &eq));
                    if same {
                        merge_into(tree, a, o, opts);
                        tree.delete(o);
                        continue 'outer;
                    }
                }
                tree.list_push(acc, f::ALTS, o);
            }
            let defaults = tree.list_take(other, f::DEFAULTS);
            for d in defaults {
                tree.list_push(acc, f::DEFAULTS, d);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Operator;
    use crate::ir::Factory;

    fn guarded_assign(
        fac: &mut Factory<'_>,
        cond_name: &str,
        target: &str,
        value: i64,
    ) -> NodeId {
        let c = fac.identifier(cond_name);
        let one = fac.intval(1);
        let cond = fac.expression(c, Operator::Eq, one);
        let lhs = fac.identifier(target);
        let rhs = fac.intval(value);
        let asg = fac.assign(lhs, rhs);
        let alt = fac.if_alt(cond, [asg]);
        fac.if_stm([alt])
    }

    #[test]
    fn equal_guards_collapse_into_one_branch() {
        let mut tree = Tree::new();
        let mut fac = Factory::new(&mut tree);
        let if1 = guarded_assign(&mut fac, "rst", "q", 0);
        let if2 = guarded_assign(&mut fac, "rst", "y", 1);
        let s1 = fac.tree.add(NodeKind::State);
        fac.tree.list_push(s1, f::ACTIONS, if1);
        let s2 = fac.tree.add(NodeKind::State);
        fac.tree.list_push(s2, f::ACTIONS, if2);

        let merged =
            merge_trees(&mut tree, vec![s1, s2], &MergeOptions { merge_branches: true }).unwrap();
        let actions = tree.list(merged, f::ACTIONS).to_vec();
        assert_eq!(actions.len(), 1);
        let alt = tree.list(actions[0], f::ALTS)[0];
        assert_eq!(tree.list(alt, f::ACTIONS).len(), 2);
    }

    #[test]
    fn different_guards_stay_separate() {
        let mut tree = Tree::new();
        let mut fac = Factory::new(&mut tree);
        let if1 = guarded_assign(&mut fac, "rst", "q", 0);
        let if2 = guarded_assign(&mut fac, "clk", "q", 1);
        let s1 = fac.tree.add(NodeKind::State);
        fac.tree.list_push(s1, f::ACTIONS, if1);
        let s2 = fac.tree.add(NodeKind::State);
        fac.tree.list_push(s2, f::ACTIONS, if2);

        let merged =
            merge_trees(&mut tree, vec![s1, s2], &MergeOptions { merge_branches: true }).unwrap();
        assert_eq!(tree.list(merged, f::ACTIONS).len(), 2);
    }
}

//! Tree surgery services shared by the passes: mirrored insertion,
//! cast stripping, syntactic types, constant transformation and folding,
//! argument sorting, deduplicated insertion, branch-merging tree union.

mod constants;
mod merge;
mod sorting;

pub use constants::{
    constant_as_int, simplify, simplify_to_bool, simplify_to_int, transform_constant,
};
pub use merge::{MergeOptions, merge_trees};
pub use sorting::{add_unique_library, sort_parameters};

use crate::ir::{NodeId, NodeKind, Tree, f, schema};
use crate::semantics::Semantics;

/// How [`matched_insert`] behaves when the mirrored position does not
/// exist in the new parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedInsert {
    /// Fail: positions must match exactly.
    Error,
    /// Append to the matching list when the exact position is gone
    /// (used for declarations, which may arrive out of order).
    Expand,
}

/// Insert `new_child` into `new_parent` at the same schema position that
/// `old_child` occupies in `old_parent`. The two parents must be of the
/// same kind. Returns `false` when the position cannot be mirrored.
pub fn matched_insert(
    dst: &mut Tree,
    new_child: NodeId,
    new_parent: NodeId,
    src: &Tree,
    old_child: NodeId,
    old_parent: NodeId,
    mode: MatchedInsert,
) -> bool {
    if dst.kind(new_parent) != src.kind(old_parent) {
        return false;
    }
    let Some(pos) = src.child_position(old_parent, old_child) else {
        return false;
    };
    match pos.list_pos {
        None => {
            dst.set_slot_at(new_parent, pos.field, Some(new_child));
            true
        }
        Some(i) => {
            let len = match &dst.node(new_parent).children[pos.field] {
                crate::ir::Child::List(v) => v.len(),
                _ => return false,
            };
            if i > len && mode == MatchedInsert::Error {
                return false;
            }
            dst.list_insert_at(new_parent, pos.field, i.min(len), new_child);
            true
        }
    }
}

/// Same-tree [`matched_insert`]: mirror `old_child`'s position in
/// `old_parent` onto `new_parent` of the same tree.
pub fn matched_insert_within(
    tree: &mut Tree,
    new_child: NodeId,
    new_parent: NodeId,
    old_child: NodeId,
    old_parent: NodeId,
    mode: MatchedInsert,
) -> bool {
    if tree.kind(new_parent) != tree.kind(old_parent) {
        return false;
    }
    let Some(pos) = tree.child_position(old_parent, old_child) else {
        return false;
    };
    match pos.list_pos {
        None => {
            tree.set_slot_at(new_parent, pos.field, Some(new_child));
            true
        }
        Some(i) => {
            let len = match &tree.node(new_parent).children[pos.field] {
                crate::ir::Child::List(v) => v.len(),
                _ => return false,
            };
            if i > len && mode == MatchedInsert::Error {
                return false;
            }
            tree.list_insert_at(new_parent, pos.field, i.min(len), new_child);
            true
        }
    }
}

/// Look through any stack of casts down to the first non-cast value.
pub fn skip_casts(tree: &Tree, mut value: NodeId) -> NodeId {
    while tree.kind(value) == NodeKind::Cast {
        match tree.slot(value, f::VALUE) {
            Some(v) => value = v,
            None => break,
        }
    }
    value
}

/// The innermost prefix of a chain of member/slice/field accesses.
pub fn terminal_prefix(tree: &Tree, mut value: NodeId) -> NodeId {
    while tree.kind(value).is_prefixed_reference() {
        match tree.slot(value, f::PREFIX) {
            Some(p) => value = p,
            None => break,
        }
    }
    value
}

/// Whether the value sits (possibly through prefixes and casts) on the
/// left-hand side of an assignment.
pub fn is_in_lhs(tree: &Tree, value: NodeId) -> bool {
    let mut cur = value;
    while let Some(p) = tree.parent(cur) {
        if tree.kind(p) == NodeKind::Assign {
            return tree.field_of(p, cur) == Some(f::LEFTHANDSIDE);
        }
        if !tree.kind(p).is_value() {
            return false;
        }
        cur = p;
    }
    false
}

/// Whether the value is (inside) an entry of a sensitivity list.
pub fn is_in_sensitivity_list(tree: &Tree, value: NodeId) -> bool {
    sensitivity_field_of(tree, value).is_some()
}

/// Which sensitivity bucket of the enclosing process/wait the value
/// belongs to, if any.
pub fn sensitivity_field_of(tree: &Tree, value: NodeId) -> Option<&'static str> {
    let mut cur = value;
    while let Some(p) = tree.parent(cur) {
        let pk = tree.kind(p);
        if pk == NodeKind::StateTable || pk == NodeKind::Wait {
            return match tree.field_of(p, cur) {
                Some(fname)
                    if fname == f::SENSITIVITY
                        || fname == f::SENSITIVITYPOS
                        || fname == f::SENSITIVITYNEG =>
                {
                    Some(fname)
                }
                _ => None,
            };
        }
        if !pk.is_value() {
            return None;
        }
        cur = p;
    }
    None
}

/// The symbols written by an assignment's left-hand side (one per concat
/// branch when the target is a concatenation).
pub fn collect_lhs_symbols(tree: &Tree, assign: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let Some(lhs) = tree.slot(assign, f::LEFTHANDSIDE) else {
        return out;
    };
    let mut stack = vec![lhs];
    while let Some(v) = stack.pop() {
        let v = skip_casts(tree, v);
        if tree.kind(v) == NodeKind::Expression
            && tree.operator(v) == crate::base::Operator::Concat
        {
            stack.extend(tree.slot(v, f::VALUE2));
            stack.extend(tree.slot(v, f::VALUE1));
            continue;
        }
        out.push(v);
    }
    out
}

/// Whether dropping the syntactic type of a constant would lose
/// information the value string alone cannot carry.
pub fn needs_syntactic_type(tree: &Tree, cv: NodeId) -> bool {
    matches!(
        tree.kind(cv),
        NodeKind::BitvectorValue | NodeKind::StringValue | NodeKind::TimeValue
    )
}

/// Ensure a constant carries its syntactic type under `sem`. Returns
/// `false` when the node is not a constant or cannot be typed.
pub fn assure_syntactic_type(tree: &mut Tree, value: NodeId, sem: &dyn Semantics) -> bool {
    if !tree.kind(value).is_const_value() {
        return false;
    }
    if tree.slot(value, f::TYPE).is_some() {
        return true;
    }
    match sem.type_for_constant(tree, value) {
        Some(ty) => {
            tree.set_slot(value, f::TYPE, Some(ty));
            true
        }
        None => false,
    }
}

/// Whether a kind uses the expand insertion mode in the standardization
/// mirror (declarations may be materialized out of order).
pub fn matched_insert_mode(kind: NodeKind) -> MatchedInsert {
    if kind.is_declaration() { MatchedInsert::Expand } else { MatchedInsert::Error }
}

/// Sanity helper: the schema arity of two kinds matches (used by debug
/// assertions around mirrored insertion).
pub fn same_shape(a: NodeKind, b: NodeKind) -> bool {
    schema(a).len() == schema(b).len() && a == b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Operator;
    use crate::ir::Factory;

    #[test]
    fn matched_insert_mirrors_slot_and_list_positions() {
        let mut src = Tree::new();
        let mut fac = Factory::new(&mut src);
        let c = fac.identifier("c");
        let a1 = fac.identifier("x");
        let a2 = fac.intval(1);
        let asg = fac.assign(a1, a2);
        let alt = fac.if_alt(c, [asg]);

        let mut dst = Tree::new();
        let alt2 = dst.add(NodeKind::IfAlt);
        let asg2 = dst.add(NodeKind::Assign);
        assert!(matched_insert(&mut dst, asg2, alt2, &src, asg, alt, MatchedInsert::Error));
        assert_eq!(dst.list(alt2, f::ACTIONS), &[asg2]);
    }

    #[test]
    fn lhs_detection_sees_through_members() {
        let mut t = Tree::new();
        let mut fac = Factory::new(&mut t);
        let a = fac.identifier("a");
        let i = fac.intval(3);
        let m = fac.member(a, i);
        let b = fac.identifier("b");
        let asg = fac.assign(m, b);
        let _ = asg;
        assert!(is_in_lhs(&t, a));
        assert!(is_in_lhs(&t, m));
        assert!(!is_in_lhs(&t, b));
    }

    #[test]
    fn concat_targets_are_split() {
        let mut t = Tree::new();
        let mut fac = Factory::new(&mut t);
        let a = fac.identifier("a");
        let b = fac.identifier("b");
        let cc = fac.expression(a, Operator::Concat, b);
        let rhs = fac.intval(0);
        let asg = fac.assign(cc, rhs);
        assert_eq!(collect_lhs_symbols(&t, asg), vec![a, b]);
    }
}

//! Argument sorting against formal declaration order, and deduplicated
//! insertion of library includes.

use crate::ir::{EqualsOptions, Name, NodeId, Tree, f};
use crate::semantics::SortMissing;

/// Sort the referenced assigns of `owner.assigns_field` to match the
/// order of `formals_owner.formals_field`.
///
/// Unnamed actuals are first given the formal name at their position.
/// Depending on `missing`, actuals absent from the list are materialized
/// from the formal's initial value: every one (`All`), none (`Nothing`),
/// or only the ones before the last formal actually bound (`Limited`).
/// Actuals that match no formal keep their relative order at the tail.
pub fn sort_parameters(
    tree: &mut Tree,
    owner: NodeId,
    assigns_field: &str,
    formals_owner: NodeId,
    formals_field: &str,
    name_missing: bool,
    missing: SortMissing,
) -> bool {
    if !tree.has_field(owner, assigns_field) || !tree.has_field(formals_owner, formals_field) {
        return false;
    }
    let formals: Vec<NodeId> = tree.list(formals_owner, formals_field).to_vec();
    let assigns: Vec<NodeId> = tree.list(owner, assigns_field).to_vec();

    // Positional actuals get the formal's name.
    if name_missing {
        for (i, &a) in assigns.iter().enumerate() {
            let unnamed = tree.name(a).map(|n| n.is_empty()).unwrap_or(true);
            if unnamed {
                if let Some(&formal) = formals.get(i) {
                    if let Some(n) = tree.name(formal) {
                        tree.set_name(a, n);
                    }
                }
            }
        }
    }

    let formal_names: Vec<Name> =
        formals.iter().map(|&d| tree.name(d).unwrap_or_default()).collect();
    let mut remaining: Vec<NodeId> = tree.list_take(owner, assigns_field);
    let mut sorted: Vec<NodeId> = Vec::with_capacity(remaining.len());
    let last_bound = formal_names
        .iter()
        .rposition(|n| {
            remaining.iter().any(|&a| tree.name(a).as_deref() == Some(n.as_str()))
        })
        .unwrap_or(0);

    for (i, formal_name) in formal_names.iter().enumerate() {
        if let Some(pos) =
            remaining.iter().position(|&a| tree.name(a).as_deref() == Some(formal_name.as_str()))
        {
            sorted.push(remaining.remove(pos));
            continue;
        }
        let materialize = match missing {
            SortMissing::Nothing => false,
            SortMissing::All => true,
            SortMissing::Limited => i < last_bound,
        };
        if materialize {
            if let Some(init) = tree.slot(formals[i], f::VALUE) {
                let value = tree.copy(init);
                let kind = assign_kind_for(tree, owner, assigns_field);
                let assign = tree.add(kind);
                tree.set_name(assign, formal_name.clone());
                tree.set_slot(assign, f::VALUE, Some(value));
                sorted.push(assign);
            }
        }
    }
    sorted.append(&mut remaining);
    for a in sorted {
        tree.list_push(owner, assigns_field, a);
    }
    true
}

fn assign_kind_for(tree: &Tree, owner: NodeId, field: &str) -> crate::ir::NodeKind {
    use crate::ir::NodeKind;
    if field == f::PORTASSIGNS {
        NodeKind::PortAssign
    } else if field == f::TEMPLATEPARAMETERASSIGNS {
        NodeKind::ValueTPAssign
    } else {
        let _ = (tree, owner);
        NodeKind::ParameterAssign
    }
}

/// Push a library include into `owner.field` unless an equally-named one
/// is already there. Returns `true` when inserted; otherwise the node is
/// deleted.
pub fn add_unique_library(tree: &mut Tree, lib: NodeId, owner: NodeId, field: &str) -> bool {
    let opts = EqualsOptions { check_only_names: true, ..Default::default() };
    let existing: Vec<NodeId> = tree.list(owner, field).to_vec();
    for e in existing {
        if tree.equals(e, lib, &opts) {
            tree.delete(lib);
            return false;
        }
    }
    tree.list_push(owner, field, lib);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Factory, NodeKind};

    #[test]
    fn actuals_are_sorted_to_formal_order() {
        let mut tree = Tree::new();
        let mut fac = Factory::new(&mut tree);
        let ta = fac.int64_type();
        let pa = fac.parameter("a", ta, None);
        let tb = fac.int64_type();
        let pb = fac.parameter("b", tb, None);
        let rt = fac.int64_type();
        let func = fac.function("f", rt, [pa, pb]);

        let vb = fac.intval(2);
        let va = fac.intval(1);
        let call = fac.function_call("f", [(Name::from("b"), vb), (Name::from("a"), va)]);

        assert!(sort_parameters(
            &mut tree,
            call,
            f::PARAMETERASSIGNS,
            func,
            f::PARAMETERS,
            true,
            SortMissing::Nothing,
        ));
        let order: Vec<Name> = tree
            .list(call, f::PARAMETERASSIGNS)
            .iter()
            .map(|&a| tree.name_of(a))
            .collect();
        assert_eq!(order, vec![Name::from("a"), Name::from("b")]);
    }

    #[test]
    fn missing_actuals_come_from_defaults_when_asked() {
        let mut tree = Tree::new();
        let mut fac = Factory::new(&mut tree);
        let ta = fac.int64_type();
        let da = fac.intval(7);
        let pa = fac.parameter("a", ta, Some(da));
        let rt = fac.int64_type();
        let func = fac.function("f", rt, [pa]);
        let call = fac.function_call("f", []);

        sort_parameters(
            &mut tree,
            call,
            f::PARAMETERASSIGNS,
            func,
            f::PARAMETERS,
            true,
            SortMissing::All,
        );
        let assigns = tree.list(call, f::PARAMETERASSIGNS).to_vec();
        assert_eq!(assigns.len(), 1);
        assert_eq!(tree.kind(assigns[0]), NodeKind::ParameterAssign);
        let v = tree.slot(assigns[0], f::VALUE).unwrap();
        assert_eq!(tree.attrs(v), &crate::ir::Attrs::IntValue { value: 7 });
    }
}

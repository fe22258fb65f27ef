//! Mixed-process splitting.
//!
//! A mixed process (synchronous and asynchronous behavior in one body)
//! is not synthesizable as is. The splitter rebuilds it as a group of
//! single-kind processes: per-target logic cones are reconstructed and
//! merged, local variables lifted, one process created per cone,
//! sensitivities trimmed, processes topologically sorted on their
//! variable dependencies, same-clock synchronous processes merged,
//! impacted cones copied in front of reset/clock branches, asynchronous
//! tails folded together, and surviving variables demoted back to locals
//! or promoted to signals. Running the pipeline on an already-split tree
//! is a no-op.

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, warn};

use crate::base::PropertyId;
use crate::ir::{Attrs, NodeId, NodeKind, Tree, f};
use crate::manipulation::{
    MatchedInsert, MergeOptions, collect_lhs_symbols, is_in_lhs, matched_insert_within,
    merge_trees, terminal_prefix,
};
use crate::semantics::resolve::{collect_symbols, declaration_of};
use crate::semantics::typing::{TypeContext, fresh_name};
use crate::semantics::{SemanticError, Semantics};

use super::{
    AnalyzeOptions, ProcessInfos, ProcessKind, ProcessMap, ProcessStyle, ResetKind,
    analyze_processes, sort_graph,
};

/// Split every process classified mixed into asynchronous plus
/// synchronous processes, preserving behavior.
pub fn split_mixed_processes(
    tree: &mut Tree,
    map: &mut ProcessMap,
    sem: &dyn Semantics,
    opts: &AnalyzeOptions,
) -> Result<bool, SemanticError> {
    let _span = tracing::info_span!("split_processes").entered();

    let mixed: Vec<NodeId> = map
        .iter()
        .filter(|(_, i)| {
            matches!(i.process_kind, ProcessKind::Mixed | ProcessKind::DerivedMixed)
        })
        .map(|(&n, _)| n)
        .collect();

    for proc in mixed {
        if tree.kind(proc) != NodeKind::StateTable {
            return Err(SemanticError::structure("only StateTable processes can be split"));
        }
        if !tree.is_in_list(proc) {
            return Err(SemanticError::structure("process to split has no parent list"));
        }
        if tree.list(proc, f::STATES).is_empty() {
            continue;
        }
        if !is_supported_process(tree, proc, sem) {
            if opts.print_warnings {
                warn!(
                    process = %tree.name(proc).unwrap_or_default(),
                    "cannot split process referencing out-of-scope variables"
                );
            }
            continue;
        }

        let original_infos = map.get(&proc).cloned().unwrap_or_default();
        debug!(process = %tree.name(proc).unwrap_or_default(), "splitting mixed process");

        refine_logic_cones(tree, proc, sem)?;

        let mut new_variables = Vec::new();
        lift_local_declarations(tree, proc, &mut new_variables)?;

        let mut new_processes = Vec::new();
        create_new_processes(tree, proc, &original_infos, &mut new_processes, sem)?;

        refine_synch_sensitivities(tree, map, &mut new_processes, sem, opts)?;
        merge_synchs(tree, map, &mut new_processes, sem, opts)?;
        merge_synch_logic_cones(tree, map, &mut new_processes, sem, opts)?;
        merge_asynchs(tree, map, &mut new_processes, sem, opts)?;
        refine_variables(tree, map, &mut new_processes, &new_variables, sem, opts)?;

        tree.detach(proc);
        tree.delete(proc);
        map.shift_remove(&proc);
    }
    Ok(true)
}

// ----------------------------------------------------------------------
// Eligibility
// ----------------------------------------------------------------------

/// References to variables declared outside the process are not
/// splittable.
fn is_supported_process(tree: &mut Tree, proc: NodeId, sem: &dyn Semantics) -> bool {
    let mut ctx = TypeContext::new();
    for sym in collect_symbols(tree, proc) {
        let Some(decl) = declaration_of(tree, sym, sem, &mut ctx) else {
            continue;
        };
        if tree.kind(decl) == NodeKind::Variable && !tree.is_descendant(decl, proc) {
            return false;
        }
    }
    true
}

// ----------------------------------------------------------------------
// Phase 1: logic cones
// ----------------------------------------------------------------------

/// Rebuild the process body as one merged path tree per write target.
fn refine_logic_cones(
    tree: &mut Tree,
    proc: NodeId,
    sem: &dyn Semantics,
) -> Result<(), SemanticError> {
    let mut ctx = TypeContext::new();
    let state = tree.list(proc, f::STATES)[0];

    // Per-target merged paths, in first-write order.
    let mut paths: IndexMap<NodeId, NodeId> = IndexMap::new();

    for node in tree.descendants(state) {
        if !tree.is_alive(node) {
            continue;
        }
        match tree.kind(node) {
            NodeKind::ProcedureCall => {
                return Err(SemanticError::structure(
                    "procedure calls inside mixed processes are not supported",
                ));
            }
            NodeKind::Assign => {
                let copy = tree.copy(node);
                let path_state = build_path(tree, node, copy)?;
                for target in collect_lhs_symbols(tree, node) {
                    let term = terminal_prefix(tree, target);
                    if tree.kind(term) != NodeKind::Identifier {
                        return Err(SemanticError::structure("unsupported write target"));
                    }
                    let decl = declaration_of(tree, term, sem, &mut ctx).ok_or_else(|| {
                        SemanticError::UnresolvedSymbol(tree.name_of(term).to_string())
                    })?;
                    match paths.get(&decl) {
                        None => {
                            let own = tree.copy(path_state);
                            paths.insert(decl, own);
                        }
                        Some(&existing) => {
                            let own = tree.copy(path_state);
                            let merged = merge_trees(
                                tree,
                                vec![existing, own],
                                &MergeOptions { merge_branches: true },
                            )
                            .ok_or_else(|| {
                                SemanticError::structure("path merge produced nothing")
                            })?;
                            paths.insert(decl, merged);
                        }
                    }
                }
                tree.delete(path_state);
            }
            _ => {}
        }
    }

    // Replace the body with the per-target cones.
    for a in tree.list_take(state, f::ACTIONS) {
        tree.delete(a);
    }
    for (_, path_state) in paths {
        for a in tree.list_take(path_state, f::ACTIONS) {
            tree.list_push(state, f::ACTIONS, a);
        }
        tree.delete(path_state);
    }
    Ok(())
}

/// Reconstruct the minimal branch path from the state down to `orig`,
/// with `copy` standing in for it. Returns the copied State.
fn build_path(tree: &mut Tree, orig: NodeId, copy: NodeId) -> Result<NodeId, SemanticError> {
    let parent = tree
        .parent(orig)
        .ok_or_else(|| SemanticError::structure("action outside a process state"))?;
    let parent_copy = tree.copy_shallow(parent);
    match tree.kind(parent) {
        NodeKind::IfAlt | NodeKind::Switch | NodeKind::While => {
            if let Some(c) = tree.slot(parent, f::CONDITION) {
                let cc = tree.copy(c);
                tree.set_slot(parent_copy, f::CONDITION, Some(cc));
            }
        }
        NodeKind::If => {
            // Keep the branch structure: sibling alts survive with their
            // conditions and empty bodies.
            for alt in tree.list(parent, f::ALTS).to_vec() {
                if alt == orig {
                    continue;
                }
                let ac = tree.add(NodeKind::IfAlt);
                if let Some(c) = tree.slot(alt, f::CONDITION) {
                    let cc = tree.copy(c);
                    tree.set_slot(ac, f::CONDITION, Some(cc));
                }
                tree.list_push(parent_copy, f::ALTS, ac);
            }
        }
        NodeKind::SwitchAlt => {
            for c in tree.list(parent, f::CONDITIONS).to_vec() {
                let cc = tree.copy(c);
                tree.list_push(parent_copy, f::CONDITIONS, cc);
            }
        }
        NodeKind::State => {}
        _ => {
            return Err(SemanticError::structure(format!(
                "unexpected parent {:?} on a cone path",
                tree.kind(parent)
            )));
        }
    }

    if !matched_insert_within(tree, copy, parent_copy, orig, parent, MatchedInsert::Expand) {
        return Err(SemanticError::structure("mirrored path insertion failed"));
    }
    if tree.kind(parent) == NodeKind::State {
        return Ok(parent_copy);
    }
    build_path(tree, parent, parent_copy)
}

// ----------------------------------------------------------------------
// Phase 2: lift locals
// ----------------------------------------------------------------------

fn lift_local_declarations(
    tree: &mut Tree,
    proc: NodeId,
    new_variables: &mut Vec<NodeId>,
) -> Result<(), SemanticError> {
    let container = tree
        .nearest_parent(proc, |k| {
            matches!(k, NodeKind::Contents | NodeKind::ForGenerate | NodeKind::IfGenerate)
        })
        .ok_or_else(|| SemanticError::structure("process outside any contents"))?;
    for d in tree.list_take(proc, f::DECLARATIONS) {
        match tree.kind(d) {
            NodeKind::Variable => {
                tree.list_push(container, f::DECLARATIONS, d);
                new_variables.push(d);
            }
            NodeKind::Const | NodeKind::TypeDef => {
                tree.list_push(container, f::DECLARATIONS, d);
            }
            _ => {
                return Err(SemanticError::structure(format!(
                    "unsupported local declaration {:?}",
                    tree.kind(d)
                )));
            }
        }
    }
    Ok(())
}

// ----------------------------------------------------------------------
// Phase 3: one process per cone
// ----------------------------------------------------------------------

fn create_new_processes(
    tree: &mut Tree,
    proc: NodeId,
    original_infos: &ProcessInfos,
    new_processes: &mut Vec<NodeId>,
    sem: &dyn Semantics,
) -> Result<(), SemanticError> {
    let mut ctx = TypeContext::new();
    let parent = tree
        .parent(proc)
        .ok_or_else(|| SemanticError::structure("process without parent"))?;
    let base_name = tree.name_of(proc);
    let flavour = tree.flavour(proc);
    let dont_initialize = match tree.attrs(proc) {
        Attrs::StateTable { dont_initialize, .. } => *dont_initialize,
        _ => false,
    };

    // The original's top-level sensitivity values, for copying entries.
    let sens_entry_of = |tree: &Tree, reference: NodeId| -> Option<(&'static str, NodeId)> {
        let mut v = reference;
        while let Some(p) = tree.parent(v) {
            if !tree.kind(p).is_value() {
                break;
            }
            v = p;
        }
        let field = crate::manipulation::sensitivity_field_of(tree, v)?;
        Some((field, v))
    };

    let state = tree.list(proc, f::STATES)[0];
    let actions = tree.list_take(state, f::ACTIONS);
    for (num, action) in actions.into_iter().enumerate() {
        let name = fresh_name(tree, &format!("{base_name}_{num}"));
        let st = tree.add(NodeKind::StateTable);
        if let Attrs::StateTable { name: n, flavour: fl, dont_initialize: di, .. } =
            tree.attrs_mut(st)
        {
            *n = name.clone();
            *fl = flavour;
            *di = dont_initialize;
        }
        let new_state = tree.add(NodeKind::State);
        tree.set_name(new_state, name);
        tree.list_push(new_state, f::ACTIONS, action);
        tree.list_push(st, f::STATES, new_state);

        // Attach the cone just before the original, so its symbols
        // resolve through the enclosing scopes.
        let pos = tree
            .child_position(parent, proc)
            .ok_or_else(|| SemanticError::structure("process lost its parent"))?;
        let field = tree.fields(parent)[pos.field].name;
        tree.list_insert(parent, field, pos.list_pos.unwrap_or(0), st);

        // Sensitivity: only what this cone actually reads. Signals read
        // without an entry in the original list still awaken the cone.
        let mut wanted: IndexSet<NodeId> = IndexSet::new();
        let mut extra: IndexSet<NodeId> = IndexSet::new();
        for sym in collect_symbols(tree, st) {
            if is_in_lhs(tree, sym) {
                continue;
            }
            if let Some(decl) = declaration_of(tree, sym, sem, &mut ctx) {
                if original_infos.is_in_sensitivity(decl) {
                    wanted.insert(decl);
                } else if matches!(tree.kind(decl), NodeKind::Signal | NodeKind::Port) {
                    extra.insert(decl);
                }
            }
        }
        for decl in extra {
            let name = tree.name_of(decl);
            let entry = tree.add(NodeKind::Identifier);
            tree.set_name(entry, name);
            tree.list_push(st, f::SENSITIVITY, entry);
        }
        for decl in wanted {
            for r in crate::semantics::resolve::references_to(
                tree,
                decl,
                proc,
                Some(proc),
                sem,
                &mut ctx,
            ) {
                let Some((field, entry)) = sens_entry_of(tree, r) else {
                    continue;
                };
                let copy = tree.copy(entry);
                tree.list_push(st, field, copy);
            }
        }

        new_processes.push(st);
        ctx.flush();
    }
    Ok(())
}

// ----------------------------------------------------------------------
// Phase 4: trim synchronous sensitivities, companion asynch resets
// ----------------------------------------------------------------------

fn keep_only(tree: &mut Tree, st: NodeId, field: &str, keep: &[NodeId], sem: &dyn Semantics) {
    let mut ctx = TypeContext::new();
    for entry in tree.list(st, field).to_vec() {
        let term = terminal_prefix(tree, entry);
        let decl = declaration_of(tree, term, sem, &mut ctx);
        let wanted = decl.map(|d| keep.contains(&d)).unwrap_or(false);
        if !wanted {
            tree.list_remove(st, field, entry);
            tree.delete(entry);
        }
    }
}

fn refine_synch_sensitivities(
    tree: &mut Tree,
    map: &mut ProcessMap,
    new_processes: &mut Vec<NodeId>,
    sem: &dyn Semantics,
    opts: &AnalyzeOptions,
) -> Result<(), SemanticError> {
    let mut companions: Vec<(usize, NodeId)> = Vec::new();
    for (i, &st) in new_processes.iter().enumerate() {
        analyze_processes(tree, st, map, sem, opts)?;
        let infos = map.get(&st).cloned().unwrap_or_default();
        let (want_clock, want_reset) = match infos.process_style {
            ProcessStyle::NoStyle => (false, false),
            ProcessStyle::Style1 | ProcessStyle::Style6 => (true, true),
            ProcessStyle::Style2 | ProcessStyle::Style3 => (true, false),
            ProcessStyle::Style4 | ProcessStyle::Style5 => {
                return Err(SemanticError::structure(
                    "unexpected composite style on a split cone",
                ));
            }
        };
        if !want_clock {
            continue;
        }
        let clock = infos
            .clock
            .ok_or_else(|| SemanticError::structure("synchronous cone without clock"))?;
        let mut keep = vec![clock];
        if want_reset {
            let reset = infos
                .reset
                .ok_or_else(|| SemanticError::structure("reset style without reset"))?;
            keep.push(reset);
        }
        keep_only(tree, st, f::SENSITIVITY, &keep, sem);
        keep_only(tree, st, f::SENSITIVITYPOS, &keep, sem);
        keep_only(tree, st, f::SENSITIVITYNEG, &keep, sem);

        map.insert(st, ProcessInfos::default());
        analyze_processes(tree, st, map, sem, opts)?;
        let refined = map.get(&st).cloned().unwrap_or_default();

        let has_asynch_reset_vars = !refined.output_variables.is_empty()
            && refined.reset_kind == ResetKind::AsynchronousReset;
        if has_asynch_reset_vars {
            // The written variables must also appear in an asynchronous
            // reset cone: duplicate the reset branch into a companion
            // process sensitive only to the reset.
            let companion = tree.copy(st);
            let comp_state = tree.list(companion, f::STATES)[0];
            let comp_actions = tree.list(comp_state, f::ACTIONS).to_vec();
            let Some(&if_stm) = comp_actions.first() else { continue };
            if tree.kind(if_stm) != NodeKind::If {
                tree.delete(companion);
                continue;
            }
            for d in tree.list_take(if_stm, f::DEFAULTS) {
                tree.delete(d);
            }
            let alts = tree.list(if_stm, f::ALTS).to_vec();
            for &extra in alts.iter().skip(1) {
                tree.list_remove(if_stm, f::ALTS, extra);
                tree.delete(extra);
            }
            let name = fresh_name(tree, &format!("{}_asynch", tree.name_of(st)));
            tree.set_name(companion, name.clone());
            tree.set_name(comp_state, name);
            tree.add_property_id(companion, PropertyId::SkipFromSynchCone);

            // Insert before the synchronous process, in tree and order;
            // attached first so the sensitivity trim can resolve names.
            let parent = tree.parent(st).unwrap();
            let pos = tree.child_position(parent, st).unwrap();
            let field = tree.fields(parent)[pos.field].name;
            tree.list_insert(parent, field, pos.list_pos.unwrap_or(0), companion);

            let reset = refined.reset.unwrap_or(clock);
            keep_only(tree, companion, f::SENSITIVITY, &[reset], sem);
            keep_only(tree, companion, f::SENSITIVITYPOS, &[reset], sem);
            keep_only(tree, companion, f::SENSITIVITYNEG, &[reset], sem);
            analyze_processes(tree, companion, map, sem, opts)?;
            companions.push((i, companion));
        }
    }
    for (i, companion) in companions.into_iter().rev() {
        new_processes.insert(i, companion);
    }

    // Topological sort on variable write -> read / write -> write
    // dependencies, stable against the current order.
    let mut deps: IndexMap<NodeId, IndexSet<NodeId>> = IndexMap::new();
    for &st in new_processes.iter() {
        deps.entry(st).or_default();
    }
    let infos_of = |map: &ProcessMap, st: NodeId| map.get(&st).cloned().unwrap_or_default();
    for (i, &a) in new_processes.iter().enumerate() {
        for &b in new_processes.iter().skip(i + 1) {
            let ia = infos_of(map, a);
            let ib = infos_of(map, b);
            if intersects(&ia.output_variables, &ib.input_variables) {
                deps.entry(b).or_default().insert(a);
            } else if intersects(&ib.output_variables, &ia.input_variables) {
                deps.entry(a).or_default().insert(b);
            }
        }
    }
    for (i, &a) in new_processes.iter().enumerate() {
        for &b in new_processes.iter().skip(i + 1) {
            let ia = infos_of(map, a);
            let ib = infos_of(map, b);
            if intersects(&ia.output_variables, &ib.output_variables)
                || intersects(&ia.input_variables, &ib.input_variables)
            {
                deps.entry(b).or_default().insert(a);
            }
        }
    }
    let sorted = sort_graph(deps, new_processes)
        .ok_or_else(|| SemanticError::structure("process dependency graph is cyclic"))?;
    if sorted.len() != new_processes.len() {
        return Err(SemanticError::structure("process sorting lost entries"));
    }
    *new_processes = sorted;
    Ok(())
}

fn intersects(a: &IndexSet<NodeId>, b: &IndexSet<NodeId>) -> bool {
    a.iter().any(|x| b.contains(x))
}

// ----------------------------------------------------------------------
// Phase 5: merge same-clock synchronous processes
// ----------------------------------------------------------------------

fn merge_synchs(
    tree: &mut Tree,
    map: &mut ProcessMap,
    new_processes: &mut Vec<NodeId>,
    sem: &dyn Semantics,
    opts: &AnalyzeOptions,
) -> Result<(), SemanticError> {
    let mut trash: Vec<NodeId> = Vec::new();
    let mut prev: Option<NodeId> = None;
    for &st in new_processes.iter().rev() {
        let info = map.get(&st).cloned().unwrap_or_default();
        if matches!(
            info.process_kind,
            ProcessKind::Asynchronous | ProcessKind::Mixed | ProcessKind::DerivedMixed
        ) {
            continue;
        }
        let Some(p) = prev else {
            prev = Some(st);
            continue;
        };
        let pinfo = map.get(&p).cloned().unwrap_or_default();
        if pinfo.process_kind != info.process_kind
            || pinfo.clock != info.clock
            || pinfo.reset != info.reset
        {
            prev = Some(st);
            continue;
        }

        // Same clock, reset and kind: merge the two bodies.
        let st_state = tree.list(st, f::STATES)[0];
        let p_state = tree.list(p, f::STATES)[0];
        tree.detach(st_state);
        tree.detach(p_state);
        let merged = merge_trees(
            tree,
            vec![st_state, p_state],
            &MergeOptions { merge_branches: true },
        )
        .ok_or_else(|| SemanticError::structure("synch merge produced nothing"))?;
        let name = tree.name_of(st);
        tree.set_name(p, name);
        for s in tree.list_take(p, f::STATES) {
            tree.delete(s);
        }
        tree.list_push(p, f::STATES, merged);

        map.insert(p, ProcessInfos::default());
        analyze_processes(tree, p, map, sem, opts)?;
        trash.push(st);
    }
    for st in trash {
        map.shift_remove(&st);
        new_processes.retain(|&x| x != st);
        tree.detach(st);
        tree.delete(st);
    }
    Ok(())
}

// ----------------------------------------------------------------------
// Phase 6: merge impacted cones into synchronous processes
// ----------------------------------------------------------------------

fn requires_merge_of_cone(
    tree: &mut Tree,
    vars: &IndexSet<NodeId>,
    actions: &[NodeId],
    sem: &dyn Semantics,
) -> bool {
    let mut ctx = TypeContext::new();
    for &a in actions {
        for sym in collect_symbols(tree, a) {
            if is_in_lhs(tree, sym) {
                continue;
            }
            if let Some(decl) = declaration_of(tree, sym, sem, &mut ctx) {
                if vars.contains(&decl) {
                    return true;
                }
            }
        }
    }
    false
}

/// Prepend a copy of `from`'s actions to the given action list.
fn merge_cone_before(tree: &mut Tree, from: NodeId, owner: NodeId, field: &str) {
    let from_actions: Vec<NodeId> = tree.list(from, f::ACTIONS).to_vec();
    for (i, a) in from_actions.into_iter().enumerate() {
        let copy = tree.copy(a);
        tree.list_insert(owner, field, i, copy);
    }
}

fn merge_synch_logic_cones(
    tree: &mut Tree,
    map: &mut ProcessMap,
    new_processes: &mut [NodeId],
    sem: &dyn Semantics,
    opts: &AnalyzeOptions,
) -> Result<(), SemanticError> {
    for i in 0..new_processes.len() {
        let st = new_processes[i];
        let info = map.get(&st).cloned().unwrap_or_default();
        if !matches!(
            info.process_kind,
            ProcessKind::Synchronous | ProcessKind::DerivedSynchronous
        ) {
            continue;
        }
        if tree.has_property_id(st, PropertyId::SkipFromSynchCone) {
            continue;
        }
        if info.input_variables.is_empty() {
            continue;
        }
        for j in (0..i).rev() {
            let writer = new_processes[j];
            let winfo = map.get(&writer).cloned().unwrap_or_default();
            if winfo.output_variables.is_empty() {
                continue;
            }
            if tree.has_property_id(writer, PropertyId::SkipFromSynchCone) {
                continue;
            }
            if !intersects(&winfo.output_variables, &info.input_variables) {
                continue;
            }

            let writer_state = tree.list(writer, f::STATES)[0];
            let state = tree.list(st, f::STATES)[0];
            let actions: Vec<NodeId> = tree.list(state, f::ACTIONS).to_vec();
            match info.process_style {
                ProcessStyle::Style1 => {
                    let Some(&if_stm) = actions.first() else { continue };
                    let alts = tree.list(if_stm, f::ALTS).to_vec();
                    let (Some(&reset_alt), Some(&clock_alt)) = (alts.first(), alts.last())
                    else {
                        continue;
                    };
                    for alt in [reset_alt, clock_alt] {
                        let acts: Vec<NodeId> = tree.list(alt, f::ACTIONS).to_vec();
                        if requires_merge_of_cone(tree, &winfo.output_variables, &acts, sem) {
                            merge_cone_before(tree, writer_state, alt, f::ACTIONS);
                        }
                    }
                }
                ProcessStyle::Style2 => {
                    let Some(&outer) = actions.first() else { continue };
                    if info.reset.is_some() {
                        let outer_alts = tree.list(outer, f::ALTS).to_vec();
                        let Some(&clock_alt) = outer_alts.first() else { continue };
                        let clock_acts = tree.list(clock_alt, f::ACTIONS).to_vec();
                        let Some(&inner) = clock_acts.first() else { continue };
                        if tree.kind(inner) == NodeKind::If {
                            let inner_alts = tree.list(inner, f::ALTS).to_vec();
                            if let Some(&reset_alt) = inner_alts.first() {
                                let acts: Vec<NodeId> =
                                    tree.list(reset_alt, f::ACTIONS).to_vec();
                                if requires_merge_of_cone(
                                    tree,
                                    &winfo.output_variables,
                                    &acts,
                                    sem,
                                ) {
                                    merge_cone_before(tree, writer_state, reset_alt, f::ACTIONS);
                                }
                            }
                            let defaults: Vec<NodeId> = tree.list(inner, f::DEFAULTS).to_vec();
                            if requires_merge_of_cone(
                                tree,
                                &winfo.output_variables,
                                &defaults,
                                sem,
                            ) {
                                merge_cone_before(tree, writer_state, inner, f::DEFAULTS);
                            }
                        }
                    } else {
                        let outer_alts = tree.list(outer, f::ALTS).to_vec();
                        let Some(&clock_alt) = outer_alts.last() else { continue };
                        let acts: Vec<NodeId> = tree.list(clock_alt, f::ACTIONS).to_vec();
                        if requires_merge_of_cone(tree, &winfo.output_variables, &acts, sem) {
                            merge_cone_before(tree, writer_state, clock_alt, f::ACTIONS);
                        }
                    }
                }
                ProcessStyle::Style3 => {
                    merge_cone_before(tree, writer_state, state, f::ACTIONS);
                }
                ProcessStyle::Style6 => {
                    let if_stm = actions.first().copied();
                    match if_stm.filter(|&a| tree.kind(a) == NodeKind::If) {
                        Some(if_stm) => {
                            let alts = tree.list(if_stm, f::ALTS).to_vec();
                            if let Some(&reset_alt) = alts.first() {
                                let acts: Vec<NodeId> =
                                    tree.list(reset_alt, f::ACTIONS).to_vec();
                                if requires_merge_of_cone(
                                    tree,
                                    &winfo.output_variables,
                                    &acts,
                                    sem,
                                ) {
                                    merge_cone_before(tree, writer_state, reset_alt, f::ACTIONS);
                                }
                            }
                            let defaults: Vec<NodeId> = tree.list(if_stm, f::DEFAULTS).to_vec();
                            if requires_merge_of_cone(
                                tree,
                                &winfo.output_variables,
                                &defaults,
                                sem,
                            ) {
                                merge_cone_before(tree, writer_state, if_stm, f::DEFAULTS);
                            }
                        }
                        None => {
                            let acts: Vec<NodeId> = tree.list(state, f::ACTIONS).to_vec();
                            if requires_merge_of_cone(tree, &winfo.output_variables, &acts, sem)
                            {
                                merge_cone_before(tree, writer_state, state, f::ACTIONS);
                            }
                        }
                    }
                }
                _ => {
                    return Err(SemanticError::structure(
                        "unexpected style while merging cones",
                    ));
                }
            }

            map.insert(st, ProcessInfos::default());
            analyze_processes(tree, st, map, sem, opts)?;
        }
    }
    Ok(())
}

// ----------------------------------------------------------------------
// Phase 7: fold the asynchronous tail
// ----------------------------------------------------------------------

fn merge_sensitivity(tree: &mut Tree, tgt: NodeId, src: NodeId, field: &str) {
    let existing: Vec<NodeId> = tree.list(tgt, field).to_vec();
    for entry in tree.list_take(src, field) {
        let dup = existing.iter().any(|&e| tree.equal(e, entry));
        if dup {
            tree.delete(entry);
        } else {
            tree.list_push(tgt, field, entry);
        }
    }
}

fn merge_asynchs(
    tree: &mut Tree,
    map: &mut ProcessMap,
    new_processes: &mut Vec<NodeId>,
    sem: &dyn Semantics,
    opts: &AnalyzeOptions,
) -> Result<(), SemanticError> {
    let mut trash: Vec<NodeId> = Vec::new();
    let mut first: Option<NodeId> = None;
    for &st in new_processes.iter().rev() {
        tree.remove_property_id(st, PropertyId::SkipFromSynchCone);
        let info = map.get(&st).cloned().unwrap_or_default();
        if !matches!(
            info.process_kind,
            ProcessKind::Asynchronous | ProcessKind::Mixed | ProcessKind::DerivedMixed
        ) {
            continue;
        }

        let Some(tail) = first else {
            if info.output_variables.is_empty() {
                first = Some(st);
            } else {
                // A terminal cone that only feeds dead variables.
                trash.push(st);
            }
            continue;
        };

        let tail_infos = map.get(&tail).cloned().unwrap_or_default();
        if !info.output_variables.is_empty()
            && !intersects(&info.output_variables, &tail_infos.input_variables)
        {
            trash.push(st);
            continue;
        }

        // Prepend this cone to the tail: actions first, sensitivity
        // unioned.
        merge_sensitivity(tree, st, tail, f::SENSITIVITY);
        merge_sensitivity(tree, st, tail, f::SENSITIVITYPOS);
        merge_sensitivity(tree, st, tail, f::SENSITIVITYNEG);
        let st_state = tree.list(st, f::STATES)[0];
        let tail_state = tree.list(tail, f::STATES)[0];
        for a in tree.list_take(tail_state, f::ACTIONS) {
            tree.list_push(st_state, f::ACTIONS, a);
        }

        let name = tree.name_of(st);
        tree.set_name(tail, name);
        merge_sensitivity(tree, tail, st, f::SENSITIVITY);
        merge_sensitivity(tree, tail, st, f::SENSITIVITYPOS);
        merge_sensitivity(tree, tail, st, f::SENSITIVITYNEG);
        for a in tree.list_take(st_state, f::ACTIONS) {
            tree.list_push(tail_state, f::ACTIONS, a);
        }

        map.insert(tail, ProcessInfos::default());
        analyze_processes(tree, tail, map, sem, opts)?;
        trash.push(st);
    }
    for st in trash {
        map.shift_remove(&st);
        new_processes.retain(|&x| x != st);
        tree.detach(st);
        tree.delete(st);
    }
    Ok(())
}

// ----------------------------------------------------------------------
// Phase 8: demote or promote the lifted variables
// ----------------------------------------------------------------------

fn refine_variables(
    tree: &mut Tree,
    map: &mut ProcessMap,
    new_processes: &mut [NodeId],
    new_variables: &[NodeId],
    sem: &dyn Semantics,
    opts: &AnalyzeOptions,
) -> Result<(), SemanticError> {
    let mut read_set: IndexSet<NodeId> = IndexSet::new();
    let mut write_set: IndexSet<NodeId> = IndexSet::new();
    let mut read_write_set: IndexSet<NodeId> = IndexSet::new();

    for &st in new_processes.iter() {
        let infos = map.get(&st).cloned().unwrap_or_default();
        for &v in new_variables {
            let is_read = infos.input_variables.contains(&v);
            let is_write = infos.output_variables.contains(&v);
            match (is_read, is_write) {
                (true, false) => {
                    read_set.insert(v);
                }
                (false, true) => {
                    write_set.insert(v);
                }
                (true, true) => {
                    read_write_set.insert(v);
                    // Used entirely within one process: keep a local.
                    let copy = tree.copy(v);
                    tree.list_push(st, f::DECLARATIONS, copy);
                }
                (false, false) => {}
            }
        }
    }

    let mut ctx = TypeContext::new();
    for &v in new_variables {
        let is_read = read_set.contains(&v);
        let is_write = write_set.contains(&v);
        if !is_read && !is_write {
            tree.detach(v);
            tree.delete(v);
            continue;
        }
        // Crossing processes: promote to a signal and rename every
        // reference.
        let name = tree.name_of(v);
        let signal_name = fresh_name(tree, &format!("{name}_moved"));
        let root = top_of(tree, v);
        let refs: Vec<NodeId> = new_processes
            .iter()
            .flat_map(|&st| {
                crate::semantics::resolve::references_to(tree, v, root, Some(st), sem, &mut ctx)
            })
            .collect();
        for r in refs {
            if tree.attrs(r).name().is_some() {
                tree.set_name(r, signal_name.clone());
            }
        }
        let ty = tree.set_slot(v, f::TYPE, None);
        let init = tree.set_slot(v, f::VALUE, None);
        let signal = tree.add(NodeKind::Signal);
        tree.set_name(signal, signal_name);
        tree.set_slot(signal, f::TYPE, ty);
        tree.set_slot(signal, f::VALUE, init);
        tree.replace(v, Some(signal));
        tree.delete(v);
        ctx.flush();
    }

    for &st in new_processes.iter() {
        map.insert(st, ProcessInfos::default());
        analyze_processes(tree, st, map, sem, opts)?;
    }
    Ok(())
}

fn top_of(tree: &Tree, id: NodeId) -> NodeId {
    let mut cur = id;
    while let Some(p) = tree.parent(cur) {
        cur = p;
    }
    cur
}

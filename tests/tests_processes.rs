//! Process classification and mixed-process splitting.

mod helpers;

use helpers::{TestSem, build_design};
use hif::analysis::{
    AnalyzeOptions, ProcessKind, ProcessMap, ResetKind, ResetPhase, WorkingEdge,
    analyze_processes, split_mixed_processes,
};
use hif::base::Operator;
use hif::ir::{Factory, Name, NodeId, NodeKind, Tree, f};
use hif::semantics::HifSemantics;

fn opts() -> AnalyzeOptions {
    AnalyzeOptions {
        clock: Some(Name::from("clk")),
        reset: Some(Name::from("rst")),
        skip_standard_declarations: true,
        print_warnings: false,
    }
}

/// Declare bit signals in contents, by name.
fn declare_bits(tree: &mut Tree, contents: NodeId, names: &[&str]) {
    for n in names {
        let mut fac = Factory::new(tree);
        let bt = fac.bit_type(false, false);
        let s = fac.signal(*n, bt, None);
        tree.list_push(contents, f::DECLARATIONS, s);
    }
}

/// `<sig> == <v>` comparison.
fn eq_const(tree: &mut Tree, sig: &str, v: i64) -> NodeId {
    let mut fac = Factory::new(tree);
    let id = fac.identifier(sig);
    let c = fac.intval(v);
    fac.expression(id, Operator::Eq, c)
}

/// `clk'event && clk == 1`.
fn clock_condition(tree: &mut Tree, clk: &str) -> NodeId {
    let event = tree.add(NodeKind::FunctionCall);
    tree.set_name(event, "hif_vhdl_event");
    let inst = tree.add(NodeKind::Identifier);
    tree.set_name(inst, clk);
    tree.set_slot(event, f::INSTANCE, Some(inst));
    let cmp = eq_const(tree, clk, 1);
    let mut fac = Factory::new(tree);
    fac.expression(event, Operator::And, cmp)
}

/// The canonical mixed process:
/// sensitive to `clk` (pos), `rst` (pos), `d` (level);
/// `if (rst == 1) q <= 0; else if (clk'event && clk == 1) q <= d;`
/// followed by `y <= q & d;`.
fn build_mixed_process(tree: &mut Tree, contents: NodeId) -> NodeId {
    declare_bits(tree, contents, &["clk", "rst", "d", "q", "y"]);

    let rst_cond = eq_const(tree, "rst", 1);
    let clk_cond = clock_condition(tree, "clk");
    let mut fac = Factory::new(tree);
    let q1 = fac.identifier("q");
    let zero = fac.intval(0);
    let reset_assign = fac.assign(q1, zero);
    let q2 = fac.identifier("q");
    let d1 = fac.identifier("d");
    let clock_assign = fac.assign(q2, d1);
    let reset_alt = fac.if_alt(rst_cond, [reset_assign]);
    let clock_alt = fac.if_alt(clk_cond, [clock_assign]);
    let if_stm = fac.if_stm([reset_alt, clock_alt]);

    let y = fac.identifier("y");
    let q3 = fac.identifier("q");
    let d2 = fac.identifier("d");
    let and = fac.expression(q3, Operator::BAnd, d2);
    let comb_assign = fac.assign(y, and);

    let st = fac.state_table(
        "proc",
        hif::base::ProcessFlavour::Hdl,
        false,
        [if_stm, comb_assign],
    );
    let mut push_sens = |tree: &mut Tree, field: &str, name: &str| {
        let id = tree.add(NodeKind::Identifier);
        tree.set_name(id, name);
        tree.list_push(st, field, id);
    };
    push_sens(tree, f::SENSITIVITYPOS, "clk");
    push_sens(tree, f::SENSITIVITYPOS, "rst");
    push_sens(tree, f::SENSITIVITY, "d");
    tree.list_push(contents, f::STATETABLES, st);
    st
}

fn name_set(tree: &Tree, decls: impl IntoIterator<Item = NodeId>) -> Vec<String> {
    let mut names: Vec<String> = decls
        .into_iter()
        .map(|d| tree.name(d).unwrap_or_default().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn mixed_process_is_classified_mixed() {
    let sem = HifSemantics::new();
    let mut tree = Tree::new();
    let (system, _view, contents) = build_design(&mut tree);
    let st = build_mixed_process(&mut tree, contents);

    let mut map = ProcessMap::default();
    analyze_processes(&mut tree, system, &mut map, &sem, &opts()).unwrap();
    let infos = &map[&st];
    assert_eq!(infos.process_kind, ProcessKind::Mixed);
    assert_eq!(infos.reset_kind, ResetKind::AsynchronousReset);
    assert_eq!(infos.working_edge, WorkingEdge::Rising);
    assert_eq!(infos.reset_phase, ResetPhase::High);
    assert!(infos.clock.is_some());
    assert!(infos.reset.is_some());
}

#[test]
fn purely_synchronous_process_is_synchronous_style() {
    let sem = HifSemantics::new();
    let mut tree = Tree::new();
    let (system, _view, contents) = build_design(&mut tree);
    declare_bits(&mut tree, contents, &["clk", "d", "q"]);

    let clk_cond = clock_condition(&mut tree, "clk");
    let mut fac = Factory::new(&mut tree);
    let q = fac.identifier("q");
    let d = fac.identifier("d");
    let assign = fac.assign(q, d);
    let alt = fac.if_alt(clk_cond, [assign]);
    let if_stm = fac.if_stm([alt]);
    let st = fac.state_table("ff", hif::base::ProcessFlavour::Hdl, false, [if_stm]);
    let clk_ref = tree.add(NodeKind::Identifier);
    tree.set_name(clk_ref, "clk");
    tree.list_push(st, f::SENSITIVITYPOS, clk_ref);
    tree.list_push(contents, f::STATETABLES, st);

    let mut map = ProcessMap::default();
    analyze_processes(&mut tree, system, &mut map, &sem, &opts()).unwrap();
    let infos = &map[&st];
    assert_eq!(infos.process_kind, ProcessKind::Synchronous);
    assert_eq!(infos.working_edge, WorkingEdge::Rising);
    assert_eq!(infos.reset_kind, ResetKind::NoReset);
}

#[test]
fn wait_statements_are_rejected() {
    let sem = HifSemantics::new();
    let mut tree = Tree::new();
    let (system, _view, contents) = build_design(&mut tree);
    let wait = tree.add(NodeKind::Wait);
    let mut fac = Factory::new(&mut tree);
    let st = fac.state_table("w", hif::base::ProcessFlavour::Hdl, false, [wait]);
    tree.list_push(contents, f::STATETABLES, st);

    let mut map = ProcessMap::default();
    assert!(analyze_processes(&mut tree, system, &mut map, &sem, &opts()).is_err());
}

/// Scenario: the mixed process splits into a synchronous process
/// (sensitivity: clk, rst) computing `q` and an asynchronous one
/// (sensitivity: q, d) computing `y`.
#[test]
fn mixed_process_splits_into_synch_and_asynch() {
    let sem = HifSemantics::new();
    let mut tree = Tree::new();
    let (system, _view, contents) = build_design(&mut tree);
    build_mixed_process(&mut tree, contents);

    let mut map = ProcessMap::default();
    analyze_processes(&mut tree, system, &mut map, &sem, &opts()).unwrap();
    split_mixed_processes(&mut tree, &mut map, &sem, &opts()).unwrap();

    let processes: Vec<NodeId> = tree
        .list(contents, f::STATETABLES)
        .iter()
        .copied()
        .filter(|&p| tree.is_alive(p))
        .collect();
    assert_eq!(processes.len(), 2, "one synchronous plus one asynchronous process");

    let mut synch = None;
    let mut asynch = None;
    for &p in &processes {
        match map[&p].process_kind {
            ProcessKind::Synchronous | ProcessKind::DerivedSynchronous => synch = Some(p),
            ProcessKind::Asynchronous => asynch = Some(p),
            other => panic!("unexpected process kind {other:?}"),
        }
    }
    let synch = synch.expect("a synchronous process");
    let asynch = asynch.expect("an asynchronous process");

    // Synchronous sensitivity: only the clock and reset.
    let si = &map[&synch];
    let mut sens: Vec<NodeId> = si.sensitivity.iter().copied().collect();
    sens.extend(si.rising_sensitivity.iter().copied());
    sens.extend(si.falling_sensitivity.iter().copied());
    assert_eq!(name_set(&tree, sens), vec!["clk".to_string(), "rst".to_string()]);

    // Asynchronous sensitivity: exactly what it reads.
    let ai = &map[&asynch];
    let mut sens: Vec<NodeId> = ai.sensitivity.iter().copied().collect();
    sens.extend(ai.rising_sensitivity.iter().copied());
    sens.extend(ai.falling_sensitivity.iter().copied());
    assert_eq!(name_set(&tree, sens), vec!["d".to_string(), "q".to_string()]);
}

/// Splitting an already-split tree changes nothing.
#[test]
fn splitting_is_idempotent() {
    let sem = HifSemantics::new();
    let mut tree = Tree::new();
    let (system, _view, contents) = build_design(&mut tree);
    build_mixed_process(&mut tree, contents);

    let mut map = ProcessMap::default();
    analyze_processes(&mut tree, system, &mut map, &sem, &opts()).unwrap();
    split_mixed_processes(&mut tree, &mut map, &sem, &opts()).unwrap();

    let count_before = tree
        .list(contents, f::STATETABLES)
        .iter()
        .filter(|&&p| tree.is_alive(p))
        .count();

    let mut map2 = ProcessMap::default();
    analyze_processes(&mut tree, system, &mut map2, &sem, &opts()).unwrap();
    assert!(
        map2.values().all(|i| !matches!(
            i.process_kind,
            ProcessKind::Mixed | ProcessKind::DerivedMixed
        )),
        "nothing is mixed after a split"
    );
    split_mixed_processes(&mut tree, &mut map2, &sem, &opts()).unwrap();
    let count_after = tree
        .list(contents, f::STATETABLES)
        .iter()
        .filter(|&&p| tree.is_alive(p))
        .count();
    assert_eq!(count_before, count_after);
}

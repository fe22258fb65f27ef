//! Standard-symbol mapping: library retargeting and symbol
//! simplification.

mod helpers;

use helpers::{TestSem, build_design, find_kind};
use hif::base::Operator;
use hif::ir::{Factory, NodeKind, Tree, f};
use hif::semantics::Semantics;
use hif::standardization::map_standard_symbols;

/// Scenario: a call to `hif_vhdl_rising_edge(clk)` is replaced by the
/// destination's edge detector, the standard library is swapped for the
/// destination's bundled one, and the include lands in the nearest
/// scope.
#[test]
fn rising_edge_call_is_simplified() {
    let src_sem = TestSem::vhdlish();
    let dst_sem = TestSem::scish();

    let mut tree = Tree::new();
    let (system, view, contents) = build_design(&mut tree);

    // The source's standard library, as a front-end would leave it.
    let std_lib = src_sem
        .standard_library(&mut tree, "hif_vhdl_standard")
        .expect("source bundles its standard library");
    tree.list_push(system, f::LIBRARYDEFS, std_lib);

    // signal clk : bit; process (clk) begin if rising_edge(clk) ... end
    let mut fac = Factory::new(&mut tree);
    let bt = fac.bit_type(true, false);
    let clk = fac.signal("clk", bt, None);
    tree.list_push(contents, f::DECLARATIONS, clk);

    let mut fac = Factory::new(&mut tree);
    let arg = fac.identifier("clk");
    let call = fac.function_call("hif_vhdl_rising_edge", [(hif::ir::Name::from("s"), arg)]);
    let q = fac.identifier("q");
    let one = fac.intval(1);
    let assign = fac.assign(q, one);
    let alt = fac.if_alt(call, [assign]);
    let if_stm = fac.if_stm([alt]);
    let st = fac.state_table("p", hif::base::ProcessFlavour::Hdl, false, [if_stm]);
    tree.list_push(contents, f::STATETABLES, st);
    let mut fac = Factory::new(&mut tree);
    let bt2 = fac.bit_type(false, false);
    let q_decl = fac.signal("q", bt2, None);
    tree.list_push(contents, f::DECLARATIONS, q_decl);

    map_standard_symbols(&mut tree, system, &src_sem, &dst_sem).expect("symbol mapping");

    // The call is gone; an equality expression against '1' replaced it.
    let calls: Vec<_> = find_kind(&tree, system, NodeKind::FunctionCall)
        .into_iter()
        .filter(|&c| tree.name(c).as_deref() == Some("hif_vhdl_rising_edge"))
        .collect();
    assert!(calls.is_empty(), "no lingering references to the source symbol");

    let exprs = find_kind(&tree, system, NodeKind::Expression);
    assert!(
        exprs.iter().any(|&e| tree.operator(e) == Operator::Eq),
        "the edge detector expression was grafted"
    );

    // The replacement is wrapped to preserve the original boolean type.
    let casts = find_kind(&tree, system, NodeKind::Cast);
    assert!(
        casts
            .iter()
            .any(|&c| tree.slot(c, f::TYPE).map(|t| tree.kind(t)) == Some(NodeKind::Bool)),
        "graft is type-preserving"
    );

    // The include was added to the nearest non-contents scope.
    let includes = tree.list(view, f::LIBRARIES);
    assert!(
        includes.iter().any(|&l| tree.name(l).as_deref() == Some("sc_core")),
        "sc_core include added to the view"
    );

    // The destination's bundled library replaced the source's.
    let libdefs = tree.list(system, f::LIBRARYDEFS).to_vec();
    let alive: Vec<_> = libdefs.iter().filter(|&&l| tree.is_alive(l)).collect();
    assert!(
        alive.iter().any(|&&l| tree.name(l).as_deref() == Some("sc_core")),
        "bundled destination library present"
    );
}

//! The full translation pipeline: standardize, map standard symbols,
//! manage casts - then check the §-level output invariants: every
//! expression and assignment of the output is well-typed under the
//! destination semantics.

mod helpers;

use helpers::{TestSem, build_design, find_kind};
use hif::base::Operator;
use hif::ir::{Factory, Name, NodeKind, Tree, f};
use hif::semantics::Semantics;
use hif::semantics::typing::{TypeContext, semantic_type};
use hif::standardization::{manage_casts, map_standard_symbols, standardize_hif};

fn build_source(tree: &mut Tree, src_sem: &TestSem) -> hif::ir::NodeId {
    let (system, _view, contents) = build_design(tree);

    let std_lib = src_sem.standard_library(tree, "hif_vhdl_standard").unwrap();
    tree.list_push(system, f::LIBRARYDEFS, std_lib);

    let mut fac = Factory::new(tree);
    let clk_t = fac.bit_type(true, false);
    let clk = fac.signal("clk", clk_t, None);
    let span = fac.range_downto(3, 0);
    let bv = fac.bitvector_type(span, false, false);
    let x = fac.signal("x", bv, None);
    let q_t = fac.bit_type(true, false);
    let q = fac.signal("q", q_t, None);
    tree.list_push(contents, f::DECLARATIONS, clk);
    tree.list_push(contents, f::DECLARATIONS, x);
    tree.list_push(contents, f::DECLARATIONS, q);

    // x <= x + "0001"  (continuous)
    let mut fac = Factory::new(tree);
    let lhs = fac.identifier("x");
    let a = fac.identifier("x");
    let lit = fac.bitvectorval("0001");
    let sum = fac.expression(a, Operator::Plus, lit);
    let assign = fac.assign(lhs, sum);
    let ga = tree.add(NodeKind::GlobalAction);
    tree.list_push(ga, f::ACTIONS, assign);
    tree.set_slot(contents, f::GLOBALACTION, Some(ga));

    // process (clk) begin if rising_edge(clk) then q <= '1'; end if; end
    let mut fac = Factory::new(tree);
    let arg = fac.identifier("clk");
    let call = fac.function_call("hif_vhdl_rising_edge", [(Name::from("s"), arg)]);
    let q_ref = fac.identifier("q");
    let one = fac.bitval(hif::base::BitConstant::One);
    let ff_assign = fac.assign(q_ref, one);
    let alt = fac.if_alt(call, [ff_assign]);
    let if_stm = fac.if_stm([alt]);
    let st = fac.state_table("ff", hif::base::ProcessFlavour::Hdl, false, [if_stm]);
    let sens = fac.identifier("clk");
    tree.list_push(st, f::SENSITIVITYPOS, sens);
    tree.list_push(contents, f::STATETABLES, st);

    system
}

#[test]
fn pipeline_produces_a_well_typed_destination_tree() {
    let src_sem = TestSem::vhdlish();
    let dst_sem = TestSem::scish();

    let mut src = Tree::new();
    let system = build_source(&mut src, &src_sem);

    let (mut dst, root, mut casts) =
        standardize_hif(&mut src, system, &src_sem, &dst_sem).expect("standardize");
    map_standard_symbols(&mut dst, root, &src_sem, &dst_sem).expect("map symbols");
    manage_casts(&mut dst, root, &src_sem, &dst_sem, &mut casts).expect("manage casts");

    let mut ctx = TypeContext::new();

    // Every expression types under the destination semantics.
    for e in find_kind(&dst, root, NodeKind::Expression) {
        let t1v = dst.slot(e, f::VALUE1).expect("operand 1");
        let t1 = semantic_type(&mut dst, t1v, &dst_sem, &mut ctx).expect("type of operand 1");
        let t2 = match dst.slot(e, f::VALUE2) {
            Some(v) => Some(semantic_type(&mut dst, v, &dst_sem, &mut ctx).unwrap()),
            None => None,
        };
        let op = dst.operator(e);
        assert!(
            dst_sem.expr_type(&mut dst, t1, t2, op, Some(e)).is_some(),
            "expression {op:?} is not typable in the destination"
        );
    }

    // Every assignment target/source pair is assignable.
    for a in find_kind(&dst, root, NodeKind::Assign) {
        let lhs = dst.slot(a, f::LEFTHANDSIDE).unwrap();
        let rhs = dst.slot(a, f::RIGHTHANDSIDE).unwrap();
        let lt = semantic_type(&mut dst, lhs, &dst_sem, &mut ctx).expect("target type");
        let rt = semantic_type(&mut dst, rhs, &dst_sem, &mut ctx).expect("source type");
        assert!(
            dst_sem.expr_type(&mut dst, lt, Some(rt), Operator::Assign, Some(a)).is_some(),
            "assignment is not assignable in the destination"
        );
    }

    // The source symbol is gone and the include arrived.
    assert!(
        find_kind(&dst, root, NodeKind::FunctionCall)
            .into_iter()
            .all(|c| dst.name(c).as_deref() != Some("hif_vhdl_rising_edge")),
        "standard symbol was not mapped away"
    );
    let du = dst.list(root, f::DESIGNUNITS)[0];
    let view = dst.list(du, f::VIEWS)[0];
    assert!(
        dst.list(view, f::LIBRARIES)
            .iter()
            .any(|&l| dst.name(l).as_deref() == Some("sc_core")),
        "destination include missing"
    );
}

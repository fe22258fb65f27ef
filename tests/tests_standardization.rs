//! Standardization scenarios: structural cloning, type remapping, index
//! handling, literal syntactic types.

mod helpers;

use helpers::{TestSem, build_design, contents_of, find_kind, int_value};
use hif::base::{Operator, RangeDirection, TypeVariant};
use hif::ir::{Attrs, Factory, NodeKind, Tree, f};
use hif::semantics::typing::{span_size, type_is_constexpr, type_is_signed, type_span};
use hif::standardization::{manage_casts, standardize_hif};

/// Scenario: `signal x : bitvector(3 downto 0); x <= x + "0001";` from a
/// VHDL-like semantics into a SystemC-like one. The vector becomes
/// bitset-shaped, the literal keeps a matching syntactic type, the plus
/// survives without operand casts, the bounds survive as (3, 0, downto).
#[test]
fn bitvector_arithmetic_maps_without_casts() {
    let src_sem = TestSem::vhdlish();
    let dst_sem = TestSem::scish();

    let mut src = Tree::new();
    let (system, _view, contents) = build_design(&mut src);
    let mut fac = Factory::new(&mut src);
    let span = fac.range_downto(3, 0);
    let bv = fac.bitvector_type(span, false, false);
    let x = fac.signal("x", bv, None);
    src.list_push(contents, f::DECLARATIONS, x);

    let mut fac = Factory::new(&mut src);
    let lhs = fac.identifier("x");
    let op1 = fac.identifier("x");
    let lit = fac.bitvectorval("0001");
    let sum = fac.expression(op1, Operator::Plus, lit);
    let assign = fac.assign(lhs, sum);
    let ga = src.add(NodeKind::GlobalAction);
    src.list_push(ga, f::ACTIONS, assign);
    src.set_slot(contents, f::GLOBALACTION, Some(ga));

    let (dst, root, mut casts) =
        standardize_hif(&mut src, system, &src_sem, &dst_sem).expect("standardization");

    // The signal's type became bitset-shaped with intact bounds.
    let dst_contents = contents_of(&dst, root);
    let dst_x = dst.list(dst_contents, f::DECLARATIONS)[0];
    let dst_ty = dst.slot(dst_x, f::TYPE).unwrap();
    assert_eq!(dst.kind(dst_ty), NodeKind::Bitvector);
    assert_eq!(
        dst.attrs(dst_ty).type_flags().unwrap().variant,
        TypeVariant::SystemCBitvectorBase
    );
    let dst_span = type_span(&dst, dst_ty).unwrap();
    assert_eq!(span_size(&dst, dst_span), Some(4));
    assert!(matches!(dst.attrs(dst_span), Attrs::Range { direction: RangeDirection::Downto }));
    assert_eq!(int_value(&dst, dst.slot(dst_span, f::LEFTBOUND).unwrap()), Some(3));
    assert_eq!(int_value(&dst, dst.slot(dst_span, f::RIGHTBOUND).unwrap()), Some(0));

    // The addition survived: same operator, bare identifier operand.
    let exprs = find_kind(&dst, root, NodeKind::Expression);
    let sum = exprs
        .iter()
        .copied()
        .find(|&e| dst.operator(e) == Operator::Plus)
        .expect("mapped addition");
    let v1 = dst.slot(sum, f::VALUE1).unwrap();
    assert_eq!(dst.kind(v1), NodeKind::Identifier, "operand 1 must not be cast");
    let v2 = dst.slot(sum, f::VALUE2).unwrap();
    assert_eq!(dst.kind(v2), NodeKind::BitvectorValue, "operand 2 must not be cast");

    // The literal's syntactic type agrees with the destination rule.
    let lit_ty = dst.slot(v2, f::TYPE).expect("literal keeps a syntactic type");
    assert_eq!(dst.kind(lit_ty), NodeKind::Bitvector);
    let lit_span = type_span(&dst, lit_ty).unwrap();
    assert_eq!(span_size(&dst, lit_span), Some(4));

    // The cast manager accepts the produced tree.
    let mut dst = dst;
    manage_casts(&mut dst, root, &src_sem, &dst_sem, &mut casts).expect("cast management");
}

/// Scenario: `reg [7:0] a; a[3] = b;` from a rebasing semantics into a
/// non-rebasing one: the index must come through unchanged.
#[test]
fn member_index_survives_when_destination_keeps_bases() {
    let src_sem = TestSem::verilogish();
    let dst_sem = TestSem::vhdlish();

    let mut src = Tree::new();
    let (system, _view, contents) = build_design(&mut src);
    let mut fac = Factory::new(&mut src);
    let span = fac.range_downto(7, 0);
    let bv = fac.bitvector_type(span, false, false);
    let a = fac.signal("a", bv, None);
    let bt = fac.bit_type(false, false);
    let b = fac.signal("b", bt, None);
    src.list_push(contents, f::DECLARATIONS, a);
    src.list_push(contents, f::DECLARATIONS, b);

    let mut fac = Factory::new(&mut src);
    let prefix = fac.identifier("a");
    let idx = fac.intval(3);
    let member = fac.member(prefix, idx);
    let rhs = fac.identifier("b");
    let assign = fac.assign(member, rhs);
    let ga = src.add(NodeKind::GlobalAction);
    src.list_push(ga, f::ACTIONS, assign);
    src.set_slot(contents, f::GLOBALACTION, Some(ga));

    let (dst, root, _casts) =
        standardize_hif(&mut src, system, &src_sem, &dst_sem).expect("standardization");

    let members = find_kind(&dst, root, NodeKind::Member);
    assert_eq!(members.len(), 1);
    let index = dst.slot(members[0], f::INDEX).unwrap();
    assert_eq!(int_value(&dst, index), Some(3), "index must not be rebased");
}

/// Scenario: an `IntValue(5)` with no syntactic type acquires the
/// destination's canonical integer type, constexpr and all.
#[test]
fn bare_literals_acquire_canonical_syntactic_types() {
    let src_sem = TestSem::vhdlish();
    let dst_sem = TestSem::scish();

    let mut src = Tree::new();
    let (system, _view, contents) = build_design(&mut src);
    let mut fac = Factory::new(&mut src);
    let ty = fac.int64_type();
    let five = fac.intval(5);
    let v = fac.variable("v", ty, Some(five));
    src.list_push(contents, f::DECLARATIONS, v);

    let (dst, root, _casts) =
        standardize_hif(&mut src, system, &src_sem, &dst_sem).expect("standardization");

    let dst_contents = contents_of(&dst, root);
    let dst_v = dst.list(dst_contents, f::DECLARATIONS)[0];
    let init = dst.slot(dst_v, f::VALUE).expect("initial value survives");
    let init = hif::manipulation::skip_casts(&dst, init);
    assert_eq!(dst.kind(init), NodeKind::IntValue);
    let ty = dst.slot(init, f::TYPE).expect("canonical syntactic type attached");
    assert_eq!(dst.kind(ty), NodeKind::Int);
    assert!(type_is_constexpr(&dst, ty));
    assert!(type_is_signed(&dst, ty));
    let span = type_span(&dst, ty).unwrap();
    assert_eq!(span_size(&dst, span), Some(64));
}

/// Ports: input ports lose their defaults, outputs gain one.
#[test]
fn port_defaults_are_normalized() {
    let src_sem = TestSem::vhdlish();
    let dst_sem = TestSem::scish();

    let mut src = Tree::new();
    let (system, view, _contents) = build_design(&mut src);
    let entity = src.slot(view, f::ENTITY).unwrap();
    let mut fac = Factory::new(&mut src);
    let bt = fac.bit_type(false, false);
    let stray = fac.bitval(hif::base::BitConstant::One);
    let p_in = fac.port("din", hif::base::PortDirection::In, bt, Some(stray));
    let bt2 = fac.bit_type(false, false);
    let p_out = fac.port("dout", hif::base::PortDirection::Out, bt2, None);
    src.list_push(entity, f::PORTS, p_in);
    src.list_push(entity, f::PORTS, p_out);

    let (dst, root, _casts) =
        standardize_hif(&mut src, system, &src_sem, &dst_sem).expect("standardization");

    let du = dst.list(root, f::DESIGNUNITS)[0];
    let dview = dst.list(du, f::VIEWS)[0];
    let dentity = dst.slot(dview, f::ENTITY).unwrap();
    let ports = dst.list(dentity, f::PORTS);
    assert!(dst.slot(ports[0], f::VALUE).is_none(), "input port keeps no default");
    assert!(dst.slot(ports[1], f::VALUE).is_some(), "output port gains a default");
}

/// Width-mismatched assignments get a right-hand-side cast, and the cast
/// records the pre-mapping source type.
#[test]
fn unassignable_pairs_get_right_hand_casts() {
    let src_sem = TestSem::vhdlish();
    let dst_sem = TestSem::scish();

    let mut src = Tree::new();
    let (system, _view, contents) = build_design(&mut src);
    let mut fac = Factory::new(&mut src);
    let s8 = fac.range_downto(7, 0);
    let bv8 = fac.bitvector_type(s8, false, false);
    let wide = fac.signal("wide", bv8, None);
    let s4 = fac.range_downto(3, 0);
    let bv4 = fac.bitvector_type(s4, false, false);
    let narrow = fac.signal("narrow", bv4, None);
    src.list_push(contents, f::DECLARATIONS, wide);
    src.list_push(contents, f::DECLARATIONS, narrow);

    let mut fac = Factory::new(&mut src);
    let lhs = fac.identifier("wide");
    let rhs = fac.identifier("narrow");
    let assign = fac.assign(lhs, rhs);
    let ga = src.add(NodeKind::GlobalAction);
    src.list_push(ga, f::ACTIONS, assign);
    src.set_slot(contents, f::GLOBALACTION, Some(ga));

    let (dst, root, casts) =
        standardize_hif(&mut src, system, &src_sem, &dst_sem).expect("standardization");

    let assigns = find_kind(&dst, root, NodeKind::Assign);
    assert_eq!(assigns.len(), 1);
    let rhs = dst.slot(assigns[0], f::RIGHTHANDSIDE).unwrap();
    assert_eq!(dst.kind(rhs), NodeKind::Cast, "narrow source must be cast");
    let target = dst.slot(rhs, f::TYPE).unwrap();
    let tspan = type_span(&dst, target).unwrap();
    assert_eq!(span_size(&dst, tspan), Some(8));
    assert!(casts.contains_key(&rhs), "engine casts are recorded in the cast map");
}

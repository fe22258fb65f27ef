//! Precision comparison across type widths.

use once_cell::sync::Lazy;
use rstest::rstest;

use hif::ir::{Factory, Tree};
use hif::semantics::HifSemantics;
use hif::standardization::{PrecisionOrdering, compare_precision};

static SEM: Lazy<HifSemantics> = Lazy::new(HifSemantics::new);

fn int_of_width(tree: &mut Tree, width: i64) -> hif::ir::NodeId {
    let mut fac = Factory::new(tree);
    let span = fac.range_downto(width - 1, 0);
    fac.int_type(Some(span), true)
}

#[rstest]
#[case(4, 8, PrecisionOrdering::Less)]
#[case(8, 4, PrecisionOrdering::Greater)]
#[case(8, 8, PrecisionOrdering::Equal)]
#[case(64, 64, PrecisionOrdering::Equal)]
#[case(1, 64, PrecisionOrdering::Less)]
fn widths_order_as_expected(
    #[case] w1: i64,
    #[case] w2: i64,
    #[case] expected: PrecisionOrdering,
) {
    let mut tree = Tree::new();
    let a = int_of_width(&mut tree, w1);
    let b = int_of_width(&mut tree, w2);
    assert_eq!(compare_precision(&mut tree, a, b, &*SEM), expected);
}

#[rstest]
#[case(4, 8)]
#[case(16, 4)]
#[case(32, 32)]
fn ordering_is_antisymmetric(#[case] w1: i64, #[case] w2: i64) {
    let mut tree = Tree::new();
    let a = int_of_width(&mut tree, w1);
    let b = int_of_width(&mut tree, w2);
    let fwd = compare_precision(&mut tree, a, b, &*SEM);
    let bwd = compare_precision(&mut tree, b, a, &*SEM);
    let expected = match fwd {
        PrecisionOrdering::Less => PrecisionOrdering::Greater,
        PrecisionOrdering::Greater => PrecisionOrdering::Less,
        other => other,
    };
    assert_eq!(bwd, expected);
}

/// Symbolic spans compare equal when they are the same expression, and
/// uncomparable otherwise.
#[test]
fn symbolic_spans_compare_structurally() {
    let sem = &*SEM;
    let mut tree = Tree::new();
    let mut fac = Factory::new(&mut tree);
    let n1 = fac.identifier("n");
    let z1 = fac.intval(0);
    let s1 = fac.range(n1, hif::base::RangeDirection::Downto, z1);
    let a = fac.int_type(Some(s1), true);
    let n2 = fac.identifier("n");
    let z2 = fac.intval(0);
    let s2 = fac.range(n2, hif::base::RangeDirection::Downto, z2);
    let b = fac.int_type(Some(s2), true);
    let m = fac.identifier("m");
    let z3 = fac.intval(0);
    let s3 = fac.range(m, hif::base::RangeDirection::Downto, z3);
    let c = fac.int_type(Some(s3), true);
    assert_eq!(compare_precision(&mut tree, a, b, sem), PrecisionOrdering::Equal);
    assert_eq!(
        compare_precision(&mut tree, a, c, sem),
        PrecisionOrdering::Uncomparable
    );
}

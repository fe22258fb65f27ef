//! Type precision comparison.

use crate::base::Operator;
use crate::ir::{Factory, NodeId, Tree};
use crate::manipulation::{simplify, simplify_to_bool};
use crate::semantics::Semantics;
use crate::semantics::typing::{bound_value, type_span};
use crate::ir::f;

/// Ordering of two types by precision. `Less` means a value of the first
/// type can safely be cast to the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecisionOrdering {
    Less,
    Greater,
    Equal,
    Uncomparable,
}

/// Compare the precision of two types under `sem`.
///
/// Both types must carry a span: two spanless types are equally precise
/// (e.g. Time vs Time), a single spanless one is uncomparable. The
/// comparison evaluates `size1 - size2` under a signed reading and
/// combines the signs of `diff <= 0` and `diff >= 0`.
pub fn compare_precision(
    tree: &mut Tree,
    t1: NodeId,
    t2: NodeId,
    sem: &dyn Semantics,
) -> PrecisionOrdering {
    let (s1, s2) = (type_span(tree, t1), type_span(tree, t2));
    let (s1, s2) = match (s1, s2) {
        (None, None) => return PrecisionOrdering::Equal,
        (Some(a), Some(b)) => (a, b),
        _ => return PrecisionOrdering::Uncomparable,
    };

    let size1 = span_size_value(tree, s1);
    let size2 = span_size_value(tree, s2);
    if tree.equal(size1, size2) {
        return PrecisionOrdering::Equal;
    }

    // diff = size1 - size2, interpreted signed so that e.g. 32 - 64 is
    // genuinely negative.
    let mut fac = Factory::new(tree);
    let diff = fac.expression(size1, Operator::Minus, size2);
    let diff = simplify(tree, diff, sem);

    let mut fac = Factory::new(tree);
    let z1 = fac.intval(0);
    let d1 = fac.tree.copy(diff);
    let less_expr = fac.expression(d1, Operator::Le, z1);
    let less = simplify_to_bool(tree, less_expr, sem);

    let mut fac = Factory::new(tree);
    let z2 = fac.intval(0);
    let greater_expr = fac.expression(diff, Operator::Ge, z2);
    let greater = simplify_to_bool(tree, greater_expr, sem);

    match (less, greater) {
        (Some(true), Some(true)) => PrecisionOrdering::Equal,
        (Some(true), _) => PrecisionOrdering::Less,
        (_, Some(true)) => PrecisionOrdering::Greater,
        _ => PrecisionOrdering::Uncomparable,
    }
}

/// The number of elements a span covers, as a value: a literal when the
/// bounds are literals, the expression `abs(left - right) + 1` otherwise.
fn span_size_value(tree: &mut Tree, span: NodeId) -> NodeId {
    let left = tree.slot(span, f::LEFTBOUND);
    let right = tree.slot(span, f::RIGHTBOUND);
    let mut fac = Factory::new(tree);
    match (left, right) {
        (Some(l), Some(r)) => {
            if let (Some(lv), Some(rv)) =
                (bound_value(fac.tree, l), bound_value(fac.tree, r))
            {
                return fac.intval((lv - rv).abs() + 1);
            }
            let lc = fac.tree.copy(l);
            let rc = fac.tree.copy(r);
            let diff = fac.expression(lc, Operator::Minus, rc);
            let abs = fac.unary(Operator::Abs, diff);
            let one = fac.intval(1);
            fac.expression(abs, Operator::Plus, one)
        }
        _ => fac.intval(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::NodeKind;
    use crate::semantics::HifSemantics;
    use crate::semantics::typing::type_set_signed;

    fn int_with_span(tree: &mut Tree, width: i64, signed: bool) -> NodeId {
        let mut fac = Factory::new(tree);
        let span = fac.range_downto(width - 1, 0);
        fac.int_type(Some(span), signed)
    }

    #[test]
    fn equal_spans_with_different_signedness_compare_equal() {
        let sem = HifSemantics::new();
        let mut tree = Tree::new();
        let a = int_with_span(&mut tree, 8, true);
        let b = int_with_span(&mut tree, 8, false);
        type_set_signed(&mut tree, b, false);
        assert_eq!(compare_precision(&mut tree, a, b, &sem), PrecisionOrdering::Equal);
    }

    #[test]
    fn narrower_is_less_precise() {
        let sem = HifSemantics::new();
        let mut tree = Tree::new();
        let a = int_with_span(&mut tree, 4, true);
        let b = int_with_span(&mut tree, 8, true);
        assert_eq!(compare_precision(&mut tree, a, b, &sem), PrecisionOrdering::Less);
        assert_eq!(compare_precision(&mut tree, b, a, &sem), PrecisionOrdering::Greater);
    }

    #[test]
    fn spanless_pairs_are_equal_single_spanless_is_uncomparable() {
        let sem = HifSemantics::new();
        let mut tree = Tree::new();
        let t1 = tree.add(NodeKind::Time);
        let t2 = tree.add(NodeKind::Time);
        assert_eq!(compare_precision(&mut tree, t1, t2, &sem), PrecisionOrdering::Equal);

        let i = int_with_span(&mut tree, 8, true);
        assert_eq!(compare_precision(&mut tree, t1, i, &sem), PrecisionOrdering::Uncomparable);
    }

    #[test]
    fn comparison_is_antisymmetric_on_itself() {
        let sem = HifSemantics::new();
        let mut tree = Tree::new();
        let a = int_with_span(&mut tree, 16, true);
        let b = tree.copy(a);
        assert_eq!(compare_precision(&mut tree, a, b, &sem), PrecisionOrdering::Equal);
    }
}

//! The neutral HIF reference semantics.
//!
//! This is the rule set trees carry when no front-end language is in
//! force: canonical 64-bit integer constants, VHDL-like vector typing,
//! boolean conditions, identity type mapping, no index rebasing. It is
//! also the reference semantics of the test suite; front-end semantics
//! (VHDL, Verilog, SystemC, ...) live outside this crate and implement
//! the same trait.

use crate::base::{BitConstant, Operator, TimeUnit};
use crate::ir::{Attrs, Factory, NodeId, NodeKind, Tree, f};

use super::typing::{
    span_size, type_is_constexpr, type_is_logic, type_set_constexpr, type_span,
};
use super::{ExprTypeInfo, Semantics, SemanticsOptions};

/// The neutral semantics.
#[derive(Debug, Default)]
pub struct HifSemantics {
    options: SemanticsOptions,
}

impl HifSemantics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Copy of whichever of the two types has the wider span (first wins on
/// ties or when the sizes are not statically known).
fn copy_wider(tree: &mut Tree, t1: NodeId, t2: NodeId) -> NodeId {
    let winner = match (type_span(tree, t1).and_then(|s| span_size(tree, s)),
                        type_span(tree, t2).and_then(|s| span_size(tree, s)))
    {
        (Some(s1), Some(s2)) if s2 > s1 => t2,
        _ => t1,
    };
    tree.copy(winner)
}

fn both_constexpr(tree: &Tree, t1: NodeId, t2: NodeId) -> bool {
    type_is_constexpr(tree, t1) && type_is_constexpr(tree, t2)
}

fn static_sizes_differ(tree: &Tree, t1: NodeId, t2: NodeId) -> bool {
    match (type_span(tree, t1).and_then(|s| span_size(tree, s)),
           type_span(tree, t2).and_then(|s| span_size(tree, s)))
    {
        (Some(a), Some(b)) => a != b,
        _ => false,
    }
}

fn is_numeric(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Int | NodeKind::Real | NodeKind::Signed | NodeKind::Unsigned | NodeKind::Bitvector
    )
}

fn is_vectorish(kind: NodeKind) -> bool {
    matches!(kind, NodeKind::Bitvector | NodeKind::Signed | NodeKind::Unsigned)
}

impl HifSemantics {
    /// Assignability under the neutral rules: same structural class with
    /// compatible flags; statically different vector widths need a cast.
    fn assignable(&self, tree: &mut Tree, target: NodeId, source: NodeId) -> bool {
        let (kt, ks) = (tree.kind(target), tree.kind(source));
        if kt != ks {
            // An integer literal may initialize a real.
            return kt == NodeKind::Real && ks == NodeKind::Int;
        }
        match kt {
            NodeKind::Bit => type_is_logic(tree, target) == type_is_logic(tree, source),
            NodeKind::Bitvector | NodeKind::Signed | NodeKind::Unsigned => {
                type_is_logic(tree, target) == type_is_logic(tree, source)
                    && !static_sizes_differ(tree, target, source)
            }
            NodeKind::Int | NodeKind::Real => !static_sizes_differ(tree, target, source),
            NodeKind::Array => {
                if static_sizes_differ(tree, target, source) {
                    return false;
                }
                match (tree.slot(target, f::TYPE), tree.slot(source, f::TYPE)) {
                    (Some(a), Some(b)) => self.assignable(tree, a, b),
                    _ => false,
                }
            }
            NodeKind::TypeReference | NodeKind::ViewReference => {
                tree.name(target) == tree.name(source)
            }
            NodeKind::Record => {
                let ta: Vec<NodeId> = tree.list(target, f::FIELDS).to_vec();
                let tb: Vec<NodeId> = tree.list(source, f::FIELDS).to_vec();
                ta.len() == tb.len()
                    && ta.iter().zip(&tb).all(|(&a, &b)| {
                        match (tree.slot(a, f::TYPE), tree.slot(b, f::TYPE)) {
                            (Some(x), Some(y)) => self.assignable(tree, x, y),
                            _ => false,
                        }
                    })
            }
            NodeKind::Pointer | NodeKind::Reference | NodeKind::File => {
                match (tree.slot(target, f::TYPE), tree.slot(source, f::TYPE)) {
                    (Some(a), Some(b)) => self.assignable(tree, a, b),
                    _ => false,
                }
            }
            _ => true,
        }
    }

    fn binding(&self, tree: &mut Tree, t1: NodeId, t2: NodeId) -> Option<ExprTypeInfo> {
        if !self.assignable(tree, t1, t2) {
            return None;
        }
        let returned = tree.copy(t1);
        let precision = tree.copy(t1);
        Some(ExprTypeInfo { returned, precision })
    }

    fn arithmetic(
        &self,
        tree: &mut Tree,
        t1: NodeId,
        t2: Option<NodeId>,
        op: Operator,
    ) -> Option<ExprTypeInfo> {
        let k1 = tree.kind(t1);
        let Some(t2) = t2 else {
            // Unary plus/minus/abs.
            if !is_numeric(k1) {
                return None;
            }
            let returned = tree.copy(t1);
            let precision = tree.copy(t1);
            return Some(ExprTypeInfo { returned, precision });
        };
        let k2 = tree.kind(t2);
        let constexpr_ = both_constexpr(tree, t1, t2);
        let result = match (k1, k2) {
            (NodeKind::Int, NodeKind::Int) => {
                let r = copy_wider(tree, t1, t2);
                if let Attrs::Int { signed, .. } = tree.attrs_mut(r) {
                    *signed = true;
                }
                r
            }
            (NodeKind::Real, NodeKind::Real) => copy_wider(tree, t1, t2),
            (NodeKind::Real, NodeKind::Int) => tree.copy(t1),
            (NodeKind::Int, NodeKind::Real) => tree.copy(t2),
            (NodeKind::Signed, NodeKind::Signed)
            | (NodeKind::Unsigned, NodeKind::Unsigned)
            | (NodeKind::Bitvector, NodeKind::Bitvector) => {
                if type_is_logic(tree, t1) != type_is_logic(tree, t2) {
                    return None;
                }
                copy_wider(tree, t1, t2)
            }
            (NodeKind::Bitvector | NodeKind::Signed | NodeKind::Unsigned, NodeKind::Int) => {
                tree.copy(t1)
            }
            (NodeKind::Int, NodeKind::Bitvector | NodeKind::Signed | NodeKind::Unsigned) => {
                tree.copy(t2)
            }
            (NodeKind::Time, NodeKind::Time)
                if matches!(op, Operator::Plus | Operator::Minus) =>
            {
                tree.copy(t1)
            }
            (NodeKind::Time, NodeKind::Int) if matches!(op, Operator::Mult | Operator::Div) => {
                tree.copy(t1)
            }
            _ => return None,
        };
        type_set_constexpr(tree, result, constexpr_);
        let precision = tree.copy(result);
        Some(ExprTypeInfo { returned: result, precision })
    }

    fn logical(
        &self,
        tree: &mut Tree,
        t1: NodeId,
        t2: Option<NodeId>,
    ) -> Option<ExprTypeInfo> {
        let ok = |tree: &Tree, t: NodeId| {
            matches!(tree.kind(t), NodeKind::Bool | NodeKind::Bit)
        };
        if !ok(tree, t1) {
            return None;
        }
        let mut constexpr_ = type_is_constexpr(tree, t1);
        if let Some(t2) = t2 {
            if !ok(tree, t2) {
                return None;
            }
            constexpr_ &= type_is_constexpr(tree, t2);
        }
        let returned = tree.add(NodeKind::Bool);
        type_set_constexpr(tree, returned, constexpr_);
        let precision = tree.copy(returned);
        Some(ExprTypeInfo { returned, precision })
    }

    fn bitwise(
        &self,
        tree: &mut Tree,
        t1: NodeId,
        t2: Option<NodeId>,
    ) -> Option<ExprTypeInfo> {
        let k1 = tree.kind(t1);
        let Some(t2) = t2 else {
            if !matches!(
                k1,
                NodeKind::Bit
                    | NodeKind::Bitvector
                    | NodeKind::Int
                    | NodeKind::Signed
                    | NodeKind::Unsigned
            ) {
                return None;
            }
            let returned = tree.copy(t1);
            let precision = tree.copy(t1);
            return Some(ExprTypeInfo { returned, precision });
        };
        let k2 = tree.kind(t2);
        if k1 != k2 {
            return None;
        }
        let result = match k1 {
            NodeKind::Bit => {
                if type_is_logic(tree, t1) != type_is_logic(tree, t2) {
                    return None;
                }
                tree.copy(t1)
            }
            NodeKind::Bitvector | NodeKind::Signed | NodeKind::Unsigned => {
                if type_is_logic(tree, t1) != type_is_logic(tree, t2)
                    || static_sizes_differ(tree, t1, t2)
                {
                    return None;
                }
                copy_wider(tree, t1, t2)
            }
            NodeKind::Int => copy_wider(tree, t1, t2),
            _ => return None,
        };
        let constexpr_ = both_constexpr(tree, t1, t2);
        type_set_constexpr(tree, result, constexpr_);
        let precision = tree.copy(result);
        Some(ExprTypeInfo { returned: result, precision })
    }

    fn relational(
        &self,
        tree: &mut Tree,
        t1: NodeId,
        t2: NodeId,
        op: Operator,
    ) -> Option<ExprTypeInfo> {
        let (k1, k2) = (tree.kind(t1), tree.kind(t2));
        let comparable = match (k1, k2) {
            (a, b) if a == b => match a {
                NodeKind::Bool | NodeKind::Bit => op.is_equality(),
                NodeKind::Bitvector | NodeKind::Signed | NodeKind::Unsigned => {
                    type_is_logic(tree, t1) == type_is_logic(tree, t2)
                }
                NodeKind::Int
                | NodeKind::Real
                | NodeKind::Char
                | NodeKind::StringT
                | NodeKind::Time => true,
                NodeKind::TypeReference => {
                    op.is_equality() && tree.name(t1) == tree.name(t2)
                }
                _ => false,
            },
            (NodeKind::Int, NodeKind::Real) | (NodeKind::Real, NodeKind::Int) => true,
            (NodeKind::Bitvector | NodeKind::Signed | NodeKind::Unsigned, NodeKind::Int)
            | (NodeKind::Int, NodeKind::Bitvector | NodeKind::Signed | NodeKind::Unsigned) => true,
            _ => false,
        };
        if !comparable {
            return None;
        }
        let constexpr_ = both_constexpr(tree, t1, t2);
        let returned = tree.add(NodeKind::Bool);
        type_set_constexpr(tree, returned, constexpr_);
        let precision = if type_span(tree, t1).is_some() || type_span(tree, t2).is_some() {
            copy_wider(tree, t1, t2)
        } else {
            tree.copy(t1)
        };
        Some(ExprTypeInfo { returned, precision })
    }

    fn shift(&self, tree: &mut Tree, t1: NodeId, t2: NodeId) -> Option<ExprTypeInfo> {
        if !matches!(
            tree.kind(t1),
            NodeKind::Bitvector | NodeKind::Signed | NodeKind::Unsigned | NodeKind::Int
        ) {
            return None;
        }
        if tree.kind(t2) != NodeKind::Int {
            return None;
        }
        let returned = tree.copy(t1);
        let precision = tree.copy(t1);
        Some(ExprTypeInfo { returned, precision })
    }

    fn concat(&self, tree: &mut Tree, t1: NodeId, t2: NodeId) -> Option<ExprTypeInfo> {
        let (k1, k2) = (tree.kind(t1), tree.kind(t2));
        let bit_size = |tree: &Tree, t: NodeId| -> Option<i64> {
            match tree.kind(t) {
                NodeKind::Bit => Some(1),
                NodeKind::Bitvector | NodeKind::Signed | NodeKind::Unsigned => {
                    type_span(tree, t).and_then(|s| span_size(tree, s))
                }
                _ => None,
            }
        };
        let bitish = |k: NodeKind| matches!(k, NodeKind::Bit) || is_vectorish(k);
        if bitish(k1) && bitish(k2) {
            let logic = type_is_logic(tree, t1) || type_is_logic(tree, t2);
            let constexpr_ = both_constexpr(tree, t1, t2);
            let size = match (bit_size(tree, t1), bit_size(tree, t2)) {
                (Some(a), Some(b)) => Some(a + b),
                _ => None,
            };
            let mut fac = Factory::new(tree);
            let bv = match size {
                Some(n) => {
                    let span = fac.range_downto(n - 1, 0);
                    fac.bitvector_type(span, logic, false)
                }
                None => {
                    let span = type_span(fac.tree, t1)?;
                    let span = fac.tree.copy(span);
                    fac.bitvector_type(span, logic, false)
                }
            };
            type_set_constexpr(tree, bv, constexpr_);
            let precision = tree.copy(bv);
            return Some(ExprTypeInfo { returned: bv, precision });
        }
        if k1 == NodeKind::StringT && k2 == NodeKind::StringT {
            let returned = tree.add(NodeKind::StringT);
            let precision = tree.add(NodeKind::StringT);
            return Some(ExprTypeInfo { returned, precision });
        }
        if k1 == NodeKind::Array {
            // Array ++ Array or Array ++ element.
            let n1 = type_span(tree, t1).and_then(|s| span_size(tree, s))?;
            let elem = tree.slot(t1, f::TYPE)?;
            let n2 = if k2 == NodeKind::Array {
                type_span(tree, t2).and_then(|s| span_size(tree, s))?
            } else {
                1
            };
            let elem = tree.copy(elem);
            let mut fac = Factory::new(tree);
            let span = fac.range_upto(0, n1 + n2 - 1);
            let arr = fac.array_type(span, elem);
            let precision = tree.copy(arr);
            return Some(ExprTypeInfo { returned: arr, precision });
        }
        None
    }

    fn reduction(&self, tree: &mut Tree, t1: NodeId) -> Option<ExprTypeInfo> {
        if !matches!(
            tree.kind(t1),
            NodeKind::Bit
                | NodeKind::Bitvector
                | NodeKind::Signed
                | NodeKind::Unsigned
                | NodeKind::Int
        ) {
            return None;
        }
        let logic = type_is_logic(tree, t1);
        let constexpr_ = type_is_constexpr(tree, t1);
        let bit = tree.add(NodeKind::Bit);
        if let Attrs::Bit { logic: l, flags, .. } = tree.attrs_mut(bit) {
            *l = logic;
            flags.constexpr_ = constexpr_;
        }
        let precision = tree.copy(bit);
        Some(ExprTypeInfo { returned: bit, precision })
    }
}

impl Semantics for HifSemantics {
    fn name(&self) -> &'static str {
        "hif"
    }

    fn type_for_constant(&self, tree: &mut Tree, cv: NodeId) -> Option<NodeId> {
        let attrs = tree.attrs(cv).clone();
        let mut fac = Factory::new(tree);
        let ty = match attrs {
            Attrs::BoolValue { .. } => fac.bool_type(),
            Attrs::BitValue { value } => fac.bit_type(value.requires_logic(), false),
            Attrs::IntValue { .. } => fac.int64_type(),
            Attrs::RealValue { .. } => {
                let span = fac.range_downto(63, 0);
                fac.real_type(Some(span))
            }
            Attrs::CharValue { .. } => fac.tree.add(NodeKind::Char),
            Attrs::StringValue { .. } => fac.tree.add(NodeKind::StringT),
            Attrs::TimeValue { .. } => fac.tree.add(NodeKind::Time),
            Attrs::BitvectorValue { value } => {
                let logic = value.chars().any(|c| c != '0' && c != '1');
                let len = value.len().max(1) as i64;
                let span = fac.range_downto(len - 1, 0);
                fac.bitvector_type(span, logic, false)
            }
            _ => return None,
        };
        type_set_constexpr(tree, ty, true);
        Some(ty)
    }

    fn map_type(&self, tree: &mut Tree, ty: NodeId) -> Option<NodeId> {
        Some(tree.copy(ty))
    }

    fn expr_type(
        &self,
        tree: &mut Tree,
        t1: NodeId,
        t2: Option<NodeId>,
        op: Operator,
        _context: Option<NodeId>,
    ) -> Option<ExprTypeInfo> {
        match op {
            o if o.is_binding() => self.binding(tree, t1, t2?),
            Operator::Abs => self.arithmetic(tree, t1, None, op),
            o if o.is_arithmetic() => self.arithmetic(tree, t1, t2, op),
            o if o.is_logical() => self.logical(tree, t1, t2),
            Operator::BNot => self.bitwise(tree, t1, None),
            o if o.is_bitwise() => self.bitwise(tree, t1, t2),
            o if o.is_relational() => self.relational(tree, t1, t2?, op),
            o if o.is_shift() => self.shift(tree, t1, t2?),
            Operator::Concat => self.concat(tree, t1, t2?),
            o if o.is_reduction() => self.reduction(tree, t1),
            Operator::Ref => {
                let inner = tree.copy(t1);
                let p = tree.add(NodeKind::Pointer);
                tree.set_slot(p, f::TYPE, Some(inner));
                let precision = tree.copy(p);
                Some(ExprTypeInfo { returned: p, precision })
            }
            Operator::Deref => {
                if tree.kind(t1) != NodeKind::Pointer {
                    return None;
                }
                let inner = tree.slot(t1, f::TYPE)?;
                let returned = tree.copy(inner);
                let precision = tree.copy(returned);
                Some(ExprTypeInfo { returned, precision })
            }
            Operator::Size => {
                let mut fac = Factory::new(tree);
                let returned = fac.int64_type();
                let precision = tree.copy(returned);
                Some(ExprTypeInfo { returned, precision })
            }
            Operator::Reverse => {
                let returned = tree.copy(t1);
                let precision = tree.copy(t1);
                Some(ExprTypeInfo { returned, precision })
            }
            _ => None,
        }
    }

    fn suggested_type_for_op(
        &self,
        tree: &mut Tree,
        precision: NodeId,
        _op: Operator,
        _operand: Option<NodeId>,
        _context: Option<NodeId>,
        _is_operand1: bool,
    ) -> Option<NodeId> {
        Some(tree.copy(precision))
    }

    fn check_condition(&self, tree: &Tree, ty: NodeId, _context: Option<NodeId>) -> bool {
        matches!(tree.kind(ty), NodeKind::Bool | NodeKind::Bit)
    }

    fn explicit_cast(
        &self,
        tree: &mut Tree,
        value: NodeId,
        target: NodeId,
        _source: Option<NodeId>,
    ) -> Option<NodeId> {
        let ty = tree.copy(target);
        let mut fac = Factory::new(tree);
        Some(fac.cast(ty, value))
    }

    fn explicit_bool_conversion(&self, tree: &mut Tree, value: NodeId) -> Option<NodeId> {
        let mut fac = Factory::new(tree);
        let zero = fac.intval(0);
        Some(fac.expression(value, Operator::Neq, zero))
    }

    fn type_default_value(
        &self,
        tree: &mut Tree,
        ty: NodeId,
        _decl: Option<NodeId>,
    ) -> Option<NodeId> {
        let kind = tree.kind(ty);
        let mut fac = Factory::new(tree);
        let v = match kind {
            NodeKind::Bool => fac.boolval(false),
            NodeKind::Bit => fac.bitval(BitConstant::Zero),
            NodeKind::Int | NodeKind::Signed | NodeKind::Unsigned => fac.intval(0),
            NodeKind::Real => fac.realval(0.0),
            NodeKind::Char => fac.charval('\0'),
            NodeKind::StringT => fac.stringval(""),
            NodeKind::Time => fac.timeval(0.0, TimeUnit::Ns),
            NodeKind::Bitvector => {
                let len = type_span(fac.tree, ty)
                    .and_then(|s| span_size(fac.tree, s))
                    .unwrap_or(1);
                fac.bitvectorval("0".repeat(len as usize))
            }
            NodeKind::Array => {
                let elem = tree.slot(ty, f::TYPE)?;
                let inner = self.type_default_value(tree, elem, None)?;
                let agg = tree.add(NodeKind::Aggregate);
                tree.set_slot(agg, f::OTHERS, Some(inner));
                agg
            }
            NodeKind::Record => {
                let fields: Vec<NodeId> = tree.list(ty, f::FIELDS).to_vec();
                let rv = tree.add(NodeKind::RecordValue);
                for fld in fields {
                    let ft = tree.slot(fld, f::TYPE)?;
                    let dv = self.type_default_value(tree, ft, None)?;
                    let alt = tree.add(NodeKind::RecordValueAlt);
                    if let Some(n) = tree.name(fld) {
                        tree.set_name(alt, n);
                    }
                    tree.set_slot(alt, f::VALUE, Some(dv));
                    tree.list_push(rv, f::ALTS, alt);
                }
                rv
            }
            _ => return None,
        };
        Some(v)
    }

    fn is_type_allowed_as_port(&self, tree: &Tree, ty: NodeId) -> bool {
        !matches!(
            tree.kind(ty),
            NodeKind::Event | NodeKind::File | NodeKind::Pointer | NodeKind::Reference
        )
    }

    fn is_syntactic_type_rebased(&self) -> bool {
        false
    }

    fn is_slice_type_rebased(&self) -> bool {
        false
    }

    fn options(&self) -> &SemanticsOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::typing;

    fn ctx() -> (Tree, HifSemantics) {
        (Tree::new(), HifSemantics::new())
    }

    #[test]
    fn int_constants_get_the_canonical_type() {
        let (mut tree, sem) = ctx();
        let mut fac = Factory::new(&mut tree);
        let five = fac.intval(5);
        let ty = sem.type_for_constant(&mut tree, five).unwrap();
        assert_eq!(tree.kind(ty), NodeKind::Int);
        assert!(typing::type_is_constexpr(&tree, ty));
        assert!(typing::type_is_signed(&tree, ty));
        let span = typing::type_span(&tree, ty).unwrap();
        assert_eq!(typing::span_size(&tree, span), Some(64));
    }

    #[test]
    fn bitvector_plus_bitvector_types() {
        let (mut tree, sem) = ctx();
        let mut fac = Factory::new(&mut tree);
        let s1 = fac.range_downto(3, 0);
        let bv1 = fac.bitvector_type(s1, true, false);
        let s2 = fac.range_downto(3, 0);
        let bv2 = fac.bitvector_type(s2, true, false);
        let info = sem.expr_type(&mut tree, bv1, Some(bv2), Operator::Plus, None).unwrap();
        assert_eq!(tree.kind(info.returned), NodeKind::Bitvector);
        let span = typing::type_span(&tree, info.returned).unwrap();
        assert_eq!(typing::span_size(&tree, span), Some(4));
    }

    #[test]
    fn logical_ops_return_bool_and_reject_vectors() {
        let (mut tree, sem) = ctx();
        let b1 = tree.add(NodeKind::Bool);
        let b2 = tree.add(NodeKind::Bit);
        let info = sem.expr_type(&mut tree, b1, Some(b2), Operator::And, None).unwrap();
        assert_eq!(tree.kind(info.returned), NodeKind::Bool);

        let mut fac = Factory::new(&mut tree);
        let span = fac.range_downto(3, 0);
        let bv = fac.bitvector_type(span, false, false);
        assert!(sem.expr_type(&mut tree, bv, Some(b1), Operator::And, None).is_none());
    }

    #[test]
    fn concat_of_bits_makes_a_bitvector() {
        let (mut tree, sem) = ctx();
        let mut fac = Factory::new(&mut tree);
        let b1 = fac.bit_type(true, false);
        let s = fac.range_downto(3, 0);
        let bv = fac.bitvector_type(s, false, false);
        let info = sem.expr_type(&mut tree, b1, Some(bv), Operator::Concat, None).unwrap();
        assert_eq!(tree.kind(info.returned), NodeKind::Bitvector);
        let span = typing::type_span(&tree, info.returned).unwrap();
        assert_eq!(typing::span_size(&tree, span), Some(5));
        assert!(typing::type_is_logic(&tree, info.returned));
    }

    #[test]
    fn shifts_want_an_integer_count() {
        let (mut tree, sem) = ctx();
        let mut fac = Factory::new(&mut tree);
        let s = fac.range_downto(7, 0);
        let bv = fac.bitvector_type(s, false, false);
        let i = fac.int64_type();
        assert!(sem.expr_type(&mut tree, bv, Some(i), Operator::Sll, None).is_some());
        let b = tree.add(NodeKind::Bool);
        assert!(sem.expr_type(&mut tree, bv, Some(b), Operator::Sll, None).is_none());
    }

    #[test]
    fn defaults_cover_the_scalar_types() {
        let (mut tree, sem) = ctx();
        let bit = tree.add(NodeKind::Bit);
        let v = sem.type_default_value(&mut tree, bit, None).unwrap();
        assert_eq!(tree.kind(v), NodeKind::BitValue);

        let mut fac = Factory::new(&mut tree);
        let s = fac.range_downto(3, 0);
        let bv = fac.bitvector_type(s, false, false);
        let v = sem.type_default_value(&mut tree, bv, None).unwrap();
        assert_eq!(tree.attrs(v), &Attrs::BitvectorValue { value: "0000".into() });
    }

    #[test]
    fn assignability_requires_matching_widths() {
        let (mut tree, sem) = ctx();
        let mut fac = Factory::new(&mut tree);
        let s4 = fac.range_downto(3, 0);
        let bv4 = fac.bitvector_type(s4, false, false);
        let s8 = fac.range_downto(7, 0);
        let bv8 = fac.bitvector_type(s8, false, false);
        let s4b = fac.range_downto(3, 0);
        let bv4b = fac.bitvector_type(s4b, false, false);
        assert!(sem.expr_type(&mut tree, bv4, Some(bv8), Operator::Assign, None).is_none());
        assert!(sem.expr_type(&mut tree, bv4, Some(bv4b), Operator::Assign, None).is_some());
    }
}

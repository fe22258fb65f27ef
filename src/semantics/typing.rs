//! Semantic-type computation and the type utilities shared by the
//! passes.
//!
//! The semantic type of a value is computed on demand under a given
//! [`Semantics`] and cached in a [`TypeContext`]. Cached types are
//! detached nodes allocated in the same tree as the values they
//! describe; they are weak in the ownership sense - flushing the context
//! is always safe and merely forces recomputation.

use rustc_hash::FxHashMap;

use crate::base::{Operator, RangeDirection};
use crate::ir::{Attrs, EqualsOptions, Factory, Name, NodeId, NodeKind, Tree, f};

use super::resolve::{self, DeclCache};
use super::{SemanticError, Semantics};

/// Pass-scoped caches: semantic types and resolved declarations.
///
/// Passes create one context, thread it through, and drop (or flush) it
/// at pass boundaries - there is no process-wide state.
#[derive(Debug, Default)]
pub struct TypeContext {
    types: FxHashMap<NodeId, NodeId>,
    pub decls: DeclCache,
}

impl TypeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every cached semantic type.
    pub fn flush_types(&mut self) {
        self.types.clear();
    }

    /// Drop every cached declaration resolution.
    pub fn flush_decls(&mut self) {
        self.decls.clear();
    }

    /// Drop everything.
    pub fn flush(&mut self) {
        self.flush_types();
        self.flush_decls();
    }

    /// Invalidate the cache entries of one node.
    pub fn invalidate(&mut self, id: NodeId) {
        self.types.remove(&id);
        self.decls.remove(&id);
    }
}

/// The semantic type of a typed object under `sem`, cached in `ctx`.
pub fn semantic_type(
    tree: &mut Tree,
    id: NodeId,
    sem: &dyn Semantics,
    ctx: &mut TypeContext,
) -> Result<NodeId, SemanticError> {
    if let Some(&t) = ctx.types.get(&id) {
        if tree.is_alive(t) {
            return Ok(t);
        }
        ctx.types.remove(&id);
    }
    let ty = compute_type(tree, id, sem, ctx)?;
    ctx.types.insert(id, ty);
    Ok(ty)
}

fn untypable(tree: &Tree, what: &'static str, id: NodeId) -> SemanticError {
    SemanticError::untypable(what, format!("{:?} {}", tree.kind(id), id))
}

fn compute_type(
    tree: &mut Tree,
    id: NodeId,
    sem: &dyn Semantics,
    ctx: &mut TypeContext,
) -> Result<NodeId, SemanticError> {
    let kind = tree.kind(id);
    match kind {
        k if k.is_const_value() => {
            if let Some(t) = tree.slot(id, f::TYPE) {
                return Ok(t);
            }
            sem.type_for_constant(tree, id).ok_or_else(|| untypable(tree, "constant", id))
        }
        NodeKind::Identifier => {
            let decl = resolve::declaration_of(tree, id, sem, ctx)
                .ok_or_else(|| SemanticError::UnresolvedSymbol(tree.name_of(id).to_string()))?;
            declared_type(tree, decl).ok_or_else(|| untypable(tree, "identifier", id))
        }
        NodeKind::FieldReference => {
            let decl = resolve::declaration_of(tree, id, sem, ctx)
                .ok_or_else(|| SemanticError::UnresolvedSymbol(tree.name_of(id).to_string()))?;
            declared_type(tree, decl).ok_or_else(|| untypable(tree, "field reference", id))
        }
        NodeKind::FunctionCall => {
            let decl = resolve::declaration_of(tree, id, sem, ctx)
                .ok_or_else(|| SemanticError::UnresolvedSymbol(tree.name_of(id).to_string()))?;
            tree.slot(decl, f::TYPE).ok_or_else(|| untypable(tree, "function call", id))
        }
        NodeKind::Cast => tree.slot(id, f::TYPE).ok_or_else(|| untypable(tree, "cast", id)),
        NodeKind::Expression => {
            let v1 = tree.slot(id, f::VALUE1).ok_or_else(|| untypable(tree, "expression", id))?;
            let t1 = semantic_type(tree, v1, sem, ctx)?;
            let t2 = match tree.slot(id, f::VALUE2) {
                Some(v2) => Some(semantic_type(tree, v2, sem, ctx)?),
                None => None,
            };
            let op = tree.operator(id);
            let info = sem
                .expr_type(tree, t1, t2, op, Some(id))
                .ok_or_else(|| SemanticError::SourceTyping(format!("{:?} {}", op, id)))?;
            Ok(info.returned)
        }
        NodeKind::Member => {
            let prefix = tree.slot(id, f::PREFIX).ok_or_else(|| untypable(tree, "member", id))?;
            let pt = semantic_type(tree, prefix, sem, ctx)?;
            let base = base_type(tree, pt, sem, ctx)?;
            vector_element_type(tree, base).ok_or_else(|| untypable(tree, "member prefix", id))
        }
        NodeKind::Slice => {
            let prefix = tree.slot(id, f::PREFIX).ok_or_else(|| untypable(tree, "slice", id))?;
            let span = tree.slot(id, f::SPAN).ok_or_else(|| untypable(tree, "slice span", id))?;
            let pt = semantic_type(tree, prefix, sem, ctx)?;
            let base = base_type(tree, pt, sem, ctx)?;
            let sliced = tree.copy(base);
            let new_span = tree.copy(span);
            if !set_type_span(tree, sliced, new_span) {
                return Err(untypable(tree, "slice prefix", id));
            }
            Ok(sliced)
        }
        NodeKind::Aggregate => aggregate_type(tree, id, sem, ctx),
        NodeKind::RecordValue => {
            let record = tree.add(NodeKind::Record);
            let alts: Vec<NodeId> = tree.list(id, f::ALTS).to_vec();
            for alt in alts {
                let value =
                    tree.slot(alt, f::VALUE).ok_or_else(|| untypable(tree, "record alt", alt))?;
                let vt = semantic_type(tree, value, sem, ctx)?;
                let vt = tree.copy(vt);
                let field = tree.add(NodeKind::Field);
                if let Some(n) = tree.name(alt) {
                    tree.set_name(field, n);
                }
                tree.set_slot(field, f::TYPE, Some(vt));
                tree.list_push(record, f::FIELDS, field);
            }
            Ok(record)
        }
        NodeKind::When => {
            let alts: Vec<NodeId> = tree.list(id, f::ALTS).to_vec();
            let first = alts
                .first()
                .and_then(|&a| tree.slot(a, f::VALUE))
                .or_else(|| tree.slot(id, f::DEFAULT))
                .ok_or_else(|| untypable(tree, "when", id))?;
            semantic_type(tree, first, sem, ctx)
        }
        NodeKind::With => {
            let alts: Vec<NodeId> = tree.list(id, f::ALTS).to_vec();
            let first = alts
                .first()
                .and_then(|&a| tree.slot(a, f::VALUE))
                .or_else(|| tree.slot(id, f::DEFAULT))
                .ok_or_else(|| untypable(tree, "with", id))?;
            semantic_type(tree, first, sem, ctx)
        }
        NodeKind::Range => {
            let left =
                tree.slot(id, f::LEFTBOUND).ok_or_else(|| untypable(tree, "range", id))?;
            semantic_type(tree, left, sem, ctx)
        }
        NodeKind::Instance => {
            tree.slot(id, f::REFERENCEDTYPE).ok_or_else(|| untypable(tree, "instance", id))
        }
        k if k.is_referenced_assign() => {
            let decl = resolve::declaration_of(tree, id, sem, ctx)
                .ok_or_else(|| SemanticError::UnresolvedSymbol(tree.name_of(id).to_string()))?;
            declared_type(tree, decl).ok_or_else(|| untypable(tree, "referenced assign", id))
        }
        _ => Err(untypable(tree, "object", id)),
    }
}

fn aggregate_type(
    tree: &mut Tree,
    id: NodeId,
    sem: &dyn Semantics,
    ctx: &mut TypeContext,
) -> Result<NodeId, SemanticError> {
    let alts: Vec<NodeId> = tree.list(id, f::ALTS).to_vec();
    let sample = alts
        .first()
        .and_then(|&a| tree.slot(a, f::VALUE))
        .or_else(|| tree.slot(id, f::OTHERS))
        .ok_or_else(|| untypable(tree, "aggregate", id))?;
    let elem = semantic_type(tree, sample, sem, ctx)?;
    let elem = tree.copy(elem);
    let len = alts.len().max(1) as i64;
    let mut fac = Factory::new(tree);
    if fac.tree.kind(elem) == NodeKind::Bit {
        let span = fac.range_downto(len - 1, 0);
        let logic = matches!(fac.tree.attrs(elem), Attrs::Bit { logic: true, .. });
        let bv = fac.bitvector_type(span, logic, false);
        fac.tree.delete(elem);
        Ok(bv)
    } else {
        let span = fac.range_upto(0, len - 1);
        Ok(fac.array_type(span, elem))
    }
}

/// The declared type of a data declaration (or the return type of a
/// function-ish declaration).
pub fn declared_type(tree: &Tree, decl: NodeId) -> Option<NodeId> {
    if tree.has_field(decl, f::TYPE) { tree.slot(decl, f::TYPE) } else { None }
}

// ----------------------------------------------------------------------
// Type utilities
// ----------------------------------------------------------------------

/// The span (Range) describing the width of a type, when it has one.
pub fn type_span(tree: &Tree, ty: NodeId) -> Option<NodeId> {
    match tree.kind(ty) {
        NodeKind::Array
        | NodeKind::Bitvector
        | NodeKind::Int
        | NodeKind::Real
        | NodeKind::Signed
        | NodeKind::Unsigned => tree.slot(ty, f::SPAN),
        NodeKind::StringT => tree.slot(ty, f::SPANINFORMATION),
        _ => None,
    }
}

/// Install a span on a type, deleting any previous one. Returns `false`
/// when the type cannot carry a span.
pub fn set_type_span(tree: &mut Tree, ty: NodeId, span: NodeId) -> bool {
    let field = match tree.kind(ty) {
        NodeKind::Array
        | NodeKind::Bitvector
        | NodeKind::Int
        | NodeKind::Real
        | NodeKind::Signed
        | NodeKind::Unsigned => f::SPAN,
        NodeKind::StringT => f::SPANINFORMATION,
        _ => return false,
    };
    if let Some(old) = tree.set_slot(ty, field, Some(span)) {
        tree.delete(old);
    }
    true
}

pub fn type_is_signed(tree: &Tree, ty: NodeId) -> bool {
    match tree.attrs(ty) {
        Attrs::Int { signed, .. }
        | Attrs::Array { signed, .. }
        | Attrs::Bitvector { signed, .. } => *signed,
        _ => matches!(tree.kind(ty), NodeKind::Signed | NodeKind::Real),
    }
}

pub fn type_set_signed(tree: &mut Tree, ty: NodeId, value: bool) {
    if let Attrs::Int { signed, .. } | Attrs::Array { signed, .. } | Attrs::Bitvector { signed, .. } =
        tree.attrs_mut(ty)
    {
        *signed = value;
    }
}

pub fn type_is_constexpr(tree: &Tree, ty: NodeId) -> bool {
    tree.attrs(ty).type_flags().map(|fl| fl.constexpr_).unwrap_or(false)
}

pub fn type_set_constexpr(tree: &mut Tree, ty: NodeId, value: bool) {
    if let Some(fl) = tree.attrs_mut(ty).type_flags_mut() {
        fl.constexpr_ = value;
    }
}

pub fn type_is_logic(tree: &Tree, ty: NodeId) -> bool {
    match tree.attrs(ty) {
        Attrs::Bit { logic, .. } | Attrs::Bitvector { logic, .. } => *logic,
        _ => false,
    }
}

/// The integer value of a bound, when it is a plain or cast literal.
pub fn bound_value(tree: &Tree, bound: NodeId) -> Option<i64> {
    let bound = crate::manipulation::skip_casts(tree, bound);
    match tree.attrs(bound) {
        Attrs::IntValue { value } => Some(*value),
        Attrs::BoolValue { value } => Some(*value as i64),
        _ => None,
    }
}

/// Number of elements spanned by a range, when statically known.
pub fn span_size(tree: &Tree, span: NodeId) -> Option<i64> {
    let l = bound_value(tree, tree.slot(span, f::LEFTBOUND)?)?;
    let r = bound_value(tree, tree.slot(span, f::RIGHTBOUND)?)?;
    Some((l - r).abs() + 1)
}

/// The lower bound of a range, honoring its direction.
pub fn range_min_bound(tree: &Tree, span: NodeId) -> Option<NodeId> {
    match range_direction(tree, span) {
        RangeDirection::Upto => tree.slot(span, f::LEFTBOUND),
        RangeDirection::Downto => tree.slot(span, f::RIGHTBOUND),
    }
}

pub fn range_max_bound(tree: &Tree, span: NodeId) -> Option<NodeId> {
    match range_direction(tree, span) {
        RangeDirection::Upto => tree.slot(span, f::RIGHTBOUND),
        RangeDirection::Downto => tree.slot(span, f::LEFTBOUND),
    }
}

pub fn range_direction(tree: &Tree, span: NodeId) -> RangeDirection {
    match tree.attrs(span) {
        Attrs::Range { direction } => *direction,
        _ => RangeDirection::Upto,
    }
}

/// A copy of the wider of two spans. When the sizes cannot be compared
/// statically, the first span wins.
pub fn range_max_span(tree: &mut Tree, r1: NodeId, r2: NodeId) -> NodeId {
    let winner = match (span_size(tree, r1), span_size(tree, r2)) {
        (Some(s1), Some(s2)) if s2 > s1 => r2,
        _ => r1,
    };
    tree.copy(winner)
}

/// Resolve typedefs down to a structural type.
pub fn base_type(
    tree: &mut Tree,
    ty: NodeId,
    sem: &dyn Semantics,
    ctx: &mut TypeContext,
) -> Result<NodeId, SemanticError> {
    let mut cur = ty;
    let mut hops = 0;
    while tree.kind(cur) == NodeKind::TypeReference {
        let decl = resolve::declaration_of(tree, cur, sem, ctx)
            .ok_or_else(|| SemanticError::UnresolvedSymbol(tree.name_of(cur).to_string()))?;
        match tree.kind(decl) {
            NodeKind::TypeDef => {
                cur = tree
                    .slot(decl, f::TYPE)
                    .ok_or_else(|| untypable(tree, "typedef", decl))?;
            }
            _ => break,
        }
        hops += 1;
        if hops > 64 {
            return Err(SemanticError::structure("typedef cycle"));
        }
    }
    Ok(cur)
}

/// The element type of a vector-ish type, as a fresh detached node.
pub fn vector_element_type(tree: &mut Tree, ty: NodeId) -> Option<NodeId> {
    match tree.kind(ty) {
        NodeKind::Array => {
            let inner = tree.slot(ty, f::TYPE)?;
            Some(tree.copy(inner))
        }
        NodeKind::Bitvector => {
            let (logic, resolved) = match tree.attrs(ty) {
                Attrs::Bitvector { logic, resolved, .. } => (*logic, *resolved),
                _ => (false, false),
            };
            let constexpr_ = type_is_constexpr(tree, ty);
            let bit = tree.add(NodeKind::Bit);
            if let Attrs::Bit { logic: l, resolved: r, flags } = tree.attrs_mut(bit) {
                *l = logic;
                *r = resolved;
                flags.constexpr_ = constexpr_;
            }
            Some(bit)
        }
        NodeKind::Signed | NodeKind::Unsigned => {
            let bit = tree.add(NodeKind::Bit);
            if let Attrs::Bit { logic, .. } = tree.attrs_mut(bit) {
                *logic = true;
            }
            Some(bit)
        }
        NodeKind::StringT => Some(tree.add(NodeKind::Char)),
        _ => None,
    }
}

/// Equality of two types ignoring spans.
pub fn same_type_shape(tree: &Tree, a: NodeId, b: NodeId) -> bool {
    tree.equals(a, b, &EqualsOptions { check_spans: false, ..Default::default() })
}

/// Unwrap unary plus around an operator probe: the precision analysis of
/// alt conditions uses `case_eq` over the union of all condition types.
pub fn precision_of_types(
    tree: &mut Tree,
    types: &[NodeId],
    sem: &dyn Semantics,
    context: Option<NodeId>,
) -> Result<Option<NodeId>, SemanticError> {
    let mut acc: Option<NodeId> = None;
    for &t in types {
        acc = Some(match acc {
            None => t,
            Some(prev) => {
                let info = sem
                    .expr_type(tree, prev, Some(t), Operator::CaseEq, context)
                    .ok_or_else(|| {
                        SemanticError::SourceTyping("cannot unify alt condition types".into())
                    })?;
                info.precision
            }
        });
    }
    Ok(acc)
}

/// A fresh name scoped to the tree: `base`, `base_1`, `base_2`, ... the
/// first variant not used by any declaration currently in the tree.
pub fn fresh_name(tree: &Tree, base: &str) -> Name {
    let used: std::collections::HashSet<Name> = (0..tree.len() as u32)
        .map(NodeId)
        .filter(|&id| tree.is_alive(id) && tree.kind(id).is_declaration())
        .filter_map(|id| tree.name(id))
        .collect();
    if !used.contains(base) {
        return Name::from(base);
    }
    let mut i = 1;
    loop {
        let candidate = Name::from(format!("{base}_{i}"));
        if !used.contains(&candidate) {
            return candidate;
        }
        i += 1;
    }
}

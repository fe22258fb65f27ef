//! The standardization engine.
//!
//! A depth-first visit of the source tree materializes, node by node, a
//! destination twin. Each source node is shallow-cloned into the
//! mirrored position (the *tree map* records the pairing), children are
//! visited, and then a kind-specific repair re-establishes the
//! destination semantics: types are remapped, casts inserted, operators
//! retargeted, indices and slices rebased, arguments sorted, port
//! defaults normalized. Every inserted cast records the pre-mapping
//! source type in the cast map for the cast manager.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::base::Operator;
use crate::ir::{
    Attrs, EqualsOptions, Factory, NodeId, NodeKind, Tree, copy_between, copy_shallow_between, f,
};
use crate::manipulation::{
    assure_syntactic_type, matched_insert, matched_insert_mode, needs_syntactic_type, skip_casts,
    sort_parameters, transform_constant,
};
use crate::semantics::resolve::{self, declaration_of};
use crate::semantics::typing::{
    TypeContext, base_type, precision_of_types, range_min_bound, semantic_type, set_type_span,
    span_size, type_is_constexpr, type_is_signed, type_set_constexpr, type_set_signed, type_span,
    vector_element_type,
};
use crate::semantics::{SemanticError, Semantics, SortMissing};

use super::CastMap;

/// Standardize a tree: produce a destination tree whose semantics under
/// `dst_sem` match the source tree's semantics under `src_sem`.
///
/// On success returns the destination tree, its root (the mirrored
/// System), and the cast map consumed by [`manage_casts`]
/// (super::manage_casts). On failure the partially built destination is
/// dropped and the source tree is left semantically untouched.
pub fn standardize_hif(
    src: &mut Tree,
    system: NodeId,
    src_sem: &dyn Semantics,
    dst_sem: &dyn Semantics,
) -> Result<(Tree, NodeId, CastMap), SemanticError> {
    let _span = tracing::info_span!("standardize").entered();
    debug!(from = src_sem.name(), to = dst_sem.name(), "standardization started");

    let mut eng = Standardizer {
        src,
        dst: Tree::new(),
        src_sem,
        dst_sem,
        src_ctx: TypeContext::new(),
        dst_ctx: TypeContext::new(),
        tree_map: FxHashMap::default(),
        cast_map: CastMap::default(),
        can_rebase: true,
    };
    eng.visit(system)?;
    let root = *eng
        .tree_map
        .get(&system)
        .ok_or_else(|| SemanticError::structure("system was not mirrored"))?;

    // Caches are pass-scoped: flush before handing the tree out.
    eng.src_ctx.flush();
    eng.dst_ctx.flush();
    debug!(nodes = eng.dst.len(), casts = eng.cast_map.len(), "standardization finished");
    Ok((eng.dst, root, eng.cast_map))
}

struct AnalyzeInfo {
    op1: Option<NodeId>,
    op2: Option<NodeId>,
    result: Option<NodeId>,
    operator: Operator,
}

struct Standardizer<'a> {
    src: &'a mut Tree,
    dst: Tree,
    src_sem: &'a dyn Semantics,
    dst_sem: &'a dyn Semantics,
    src_ctx: TypeContext,
    dst_ctx: TypeContext,
    /// Injective map from source nodes to their destination twins.
    tree_map: FxHashMap<NodeId, NodeId>,
    cast_map: CastMap,
    /// Cleared while a type is mapped for a bound-detection probe, so the
    /// probe itself is not rebased.
    can_rebase: bool,
}

impl Standardizer<'_> {
    // ------------------------------------------------------------------
    // Tree-map plumbing
    // ------------------------------------------------------------------

    fn mapped(&self, v: NodeId) -> Result<NodeId, SemanticError> {
        self.tree_map
            .get(&v)
            .copied()
            .ok_or_else(|| SemanticError::structure(format!("node {v} not in tree map")))
    }

    fn map_set(&mut self, k: NodeId, v: NodeId) -> Result<(), SemanticError> {
        if !self.src.kind(k).is_map_compatible(self.dst.kind(v)) {
            return Err(SemanticError::structure(format!(
                "tree map pairing of incompatible kinds: {:?} vs {:?}",
                self.src.kind(k),
                self.dst.kind(v)
            )));
        }
        self.tree_map.insert(k, v);
        Ok(())
    }

    fn map_delete(&mut self, v: NodeId) {
        if let Some(o) = self.tree_map.remove(&v) {
            self.dst.delete(o);
        }
    }

    /// Delete the destination subtree mirrored from `v`, erasing every
    /// tree-map entry into it except those that now live inside
    /// `keep` (a replacement subtree).
    fn map_delete_tree(&mut self, v: NodeId, keep: Option<NodeId>) {
        let Some(&dst_root) = self.tree_map.get(&v) else { return };
        for s in self.src.descendants(v) {
            if let Some(&d) = self.tree_map.get(&s) {
                let in_dead = self.dst.is_descendant(d, dst_root);
                let in_kept = keep.is_some_and(|k| self.dst.is_descendant(d, k));
                if in_dead && !in_kept {
                    self.tree_map.remove(&s);
                }
            }
        }
        let dead_casts: Vec<NodeId> = self
            .cast_map
            .keys()
            .copied()
            .filter(|&c| self.dst.is_descendant(c, dst_root))
            .collect();
        for c in dead_casts {
            if let Some(t) = self.cast_map.remove(&c) {
                self.dst.delete(t);
            }
        }
        self.dst.delete(dst_root);
    }

    /// Mirror a node: shallow-clone it at the matched position of the
    /// destination tree. Returns `false` when the node was already
    /// mirrored (it must not be standardized again).
    fn copy_object(&mut self, v: NodeId) -> Result<bool, SemanticError> {
        let mode = matched_insert_mode(self.src.kind(v));
        if let Some(&o) = self.tree_map.get(&v) {
            // Already standardized, probably while resolving a symbol
            // bound before its declaration: just insert into the parent.
            let Some(vp) = self.src.parent(v) else { return Ok(false) };
            if self.dst.parent(o).is_some() {
                return Ok(false);
            }
            let Some(&op) = self.tree_map.get(&vp) else {
                return Ok(false);
            };
            if !matched_insert(&mut self.dst, o, op, self.src, v, vp, mode) {
                return Err(SemanticError::structure(format!("matched insert failed for {v}")));
            }
            return Ok(false);
        }

        let dst_obj = copy_shallow_between(self.src, v, &mut self.dst);
        self.map_set(v, dst_obj)?;
        let Some(vp) = self.src.parent(v) else {
            // Detached scratch (a semantic type being mapped).
            return Ok(true);
        };
        let Some(&np) = self.tree_map.get(&vp) else {
            // Parent not mirrored yet. For container declarations the
            // whole parent must be standardized first so children land
            // in order; anything else proceeds detached.
            if matches!(
                self.src.kind(vp),
                NodeKind::DesignUnit
                    | NodeKind::LibraryDef
                    | NodeKind::View
                    | NodeKind::Enum
                    | NodeKind::Record
                    | NodeKind::TypeDef
            ) {
                self.map_delete(v);
                self.visit(vp)?;
                if !self.tree_map.contains_key(&vp) {
                    return Err(SemanticError::structure(format!("parent of {v} not mirrored")));
                }
                return Ok(false);
            }
            return Ok(true);
        };
        if !matched_insert(&mut self.dst, dst_obj, np, self.src, v, vp, mode) {
            return Err(SemanticError::structure(format!("matched insert failed for {v}")));
        }
        Ok(true)
    }

    /// The destination mapping of a source-side type, as a fresh
    /// detached copy. Rebasing is suspended while the probe runs.
    fn dst_get_type(&mut self, t: NodeId) -> Result<NodeId, SemanticError> {
        let restore = self.can_rebase;
        self.can_rebase = false;
        let out = self.dst_get_type_inner(t);
        self.can_rebase = restore;
        out
    }

    fn dst_get_type_inner(&mut self, t: NodeId) -> Result<NodeId, SemanticError> {
        if let Some(&m) = self.tree_map.get(&t) {
            return Ok(self.dst.copy(m));
        }
        self.visit(t)?;
        let m = self.mapped(t)?;
        let copy = self.dst.copy(m);
        self.map_delete_tree(t, None);
        Ok(copy)
    }

    /// Resolve the declaration of a destination symbol from its source
    /// twin, standardizing the declaration on demand.
    fn dst_get_declaration(&mut self, obj: NodeId) -> Result<(), SemanticError> {
        let dst_obj = self.mapped(obj)?;
        let decl = declaration_of(self.src, obj, self.src_sem, &mut self.src_ctx);

        if self.src.kind(obj) == NodeKind::Instance {
            match self.src.slot(obj, f::REFERENCEDTYPE).map(|rt| self.src.kind(rt)) {
                Some(NodeKind::Library) => return Ok(()),
                Some(NodeKind::TypeReference) if decl.is_none() => return Ok(()),
                _ => {}
            }
        }

        let decl = decl.ok_or_else(|| {
            SemanticError::UnresolvedSymbol(
                self.src.name(obj).unwrap_or_default().to_string(),
            )
        })?;
        if !self.tree_map.contains_key(&decl) {
            self.visit(decl)?;
        }
        let dst_decl = self.mapped(decl)?;
        resolve::set_declaration(&mut self.dst_ctx, dst_obj, dst_decl);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Cast insertion
    // ------------------------------------------------------------------

    /// Wrap the destination twin of `src_val` in a cast to `ty` (a
    /// detached destination type, consumed). Records the pre-mapping
    /// source type in the cast map and repoints the tree map at the
    /// cast.
    fn replace_with_cast(
        &mut self,
        src_val: NodeId,
        dst_val: NodeId,
        ty: NodeId,
    ) -> Result<(), SemanticError> {
        let cast = self.dst.add(NodeKind::Cast);
        self.dst.replace(dst_val, Some(cast));
        self.dst.set_slot(cast, f::TYPE, Some(ty));
        self.dst.set_slot(cast, f::VALUE, Some(dst_val));

        let st = semantic_type(self.src, src_val, self.src_sem, &mut self.src_ctx)?;
        let bt = base_type(self.src, st, self.src_sem, &mut self.src_ctx)?;
        let recorded = copy_between(self.src, bt, &mut self.dst);
        self.cast_map.insert(cast, recorded);

        self.tree_map.insert(src_val, cast);
        self.dst_ctx.flush_types();
        Ok(())
    }

    fn dst_semantic_type(&mut self, dst_val: NodeId) -> Result<NodeId, SemanticError> {
        semantic_type(&mut self.dst, dst_val, self.dst_sem, &mut self.dst_ctx)
    }

    fn src_semantic_type(&mut self, src_val: NodeId) -> Result<NodeId, SemanticError> {
        semantic_type(self.src, src_val, self.src_sem, &mut self.src_ctx)
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    fn visit_children(&mut self, v: NodeId) -> Result<(), SemanticError> {
        for c in self.src.children(v) {
            if self.src.is_alive(c) {
                self.visit(c)?;
            }
        }
        Ok(())
    }

    fn visit(&mut self, v: NodeId) -> Result<(), SemanticError> {
        use NodeKind as K;
        let kind = self.src.kind(v);
        match kind {
            k if k.is_const_value() => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                assure_syntactic_type(self.src, v, self.src_sem);
                self.visit_children(v)?;
                self.map_const_value(v)
            }
            K::Array
            | K::Bit
            | K::Bitvector
            | K::Bool
            | K::Char
            | K::Enum
            | K::Event
            | K::File
            | K::Int
            | K::Pointer
            | K::Real
            | K::Record
            | K::Reference
            | K::Signed
            | K::StringT
            | K::Time
            | K::Unsigned => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                self.map_type_node(v)
            }
            K::Aggregate => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                self.map_aggregate(v)
            }
            K::AggregateAlt => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                for idx in self.src.list(v, f::INDICES).to_vec() {
                    self.map_index(idx)?;
                }
                Ok(())
            }
            K::Alias => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                if self.src.slot(v, f::TYPE).is_none() {
                    return Err(SemanticError::structure("alias without type"));
                }
                self.map_initial_value(v)
            }
            K::Assign => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                self.map_assign(v)
            }
            K::Cast => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                let value = self
                    .src
                    .slot(v, f::VALUE)
                    .ok_or_else(|| SemanticError::structure("cast without value"))?;
                let st = self.src_semantic_type(value)?;
                let bt = base_type(self.src, st, self.src_sem, &mut self.src_ctx)?;
                let recorded = copy_between(self.src, bt, &mut self.dst);
                let dst_cast = self.mapped(v)?;
                self.cast_map.insert(dst_cast, recorded);
                Ok(())
            }
            K::Const => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                if self.src.slot(v, f::VALUE).is_none() {
                    return Err(SemanticError::structure("const without initial value"));
                }
                self.map_initial_value(v)
            }
            K::Contents => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                self.sort_declarations(v, f::DECLARATIONS)
            }
            K::EnumValue => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                if self.src.slot(v, f::VALUE).is_some() {
                    self.map_initial_value(v)?;
                }
                Ok(())
            }
            K::Expression => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                self.map_expression(v)
            }
            K::FunctionCall | K::ProcedureCall => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.sort_call_arguments(v)?;
                self.dst_get_declaration(v)?;
                self.visit_children(v)?;
                self.map_referenced_assign_list(v, f::TEMPLATEPARAMETERASSIGNS, Operator::Conv)?;
                self.map_referenced_assign_list(v, f::PARAMETERASSIGNS, Operator::Conv)
            }
            K::Field => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.assure_initial_value(v)?;
                self.visit_children(v)?;
                self.map_initial_value(v)
            }
            K::FieldReference => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.dst_get_declaration(v)?;
                self.visit_children(v)?;
                self.map_value(v)
            }
            K::For => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                if let Some(cond) = self.src.slot(v, f::CONDITION) {
                    self.map_condition(cond)?;
                }
                self.sort_declarations(v, f::INITDECLARATIONS)
            }
            K::ForGenerate => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                if let Some(cond) = self.src.slot(v, f::CONDITION) {
                    self.map_condition(cond)?;
                }
                self.sort_declarations(v, f::DECLARATIONS)?;
                self.sort_declarations(v, f::INITDECLARATIONS)
            }
            K::Identifier => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.dst_get_declaration(v)?;
                self.visit_children(v)
            }
            K::IfAlt => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                if let Some(cond) = self.src.slot(v, f::CONDITION) {
                    self.map_condition(cond)?;
                }
                Ok(())
            }
            K::IfGenerate => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                if let Some(cond) = self.src.slot(v, f::CONDITION) {
                    self.map_condition(cond)?;
                }
                self.sort_declarations(v, f::DECLARATIONS)
            }
            K::Instance => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.sort_instance_ports(v)?;
                self.dst_get_declaration(v)?;
                self.visit_children(v)?;
                self.map_referenced_assign_list(v, f::PORTASSIGNS, Operator::Bind)
            }
            K::Library => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.dst_get_declaration(v)?;
                self.visit_children(v)
            }
            K::LibraryDef => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                self.sort_declarations(v, f::DECLARATIONS)
            }
            K::Member => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                if let Some(idx) = self.src.slot(v, f::INDEX) {
                    self.map_index(idx)?;
                }
                self.map_member_index(v)
            }
            K::ParameterAssign | K::PortAssign | K::TypeTPAssign | K::ValueTPAssign => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.dst_get_declaration(v)?;
                self.visit_children(v)
            }
            K::Port => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                if self.src.direction(v) == crate::base::PortDirection::In {
                    if let Some(old) = self.src.set_slot(v, f::VALUE, None) {
                        self.src.delete(old);
                    }
                } else {
                    self.assure_initial_value(v)?;
                }
                self.visit_children(v)?;
                if self.src.direction(v) == crate::base::PortDirection::None {
                    return Err(SemanticError::structure("port without direction"));
                }
                if let Some(src_ty) = self.src.slot(v, f::TYPE) {
                    let dst_ty = self.mapped(src_ty)?;
                    if !self.dst_sem.is_type_allowed_as_port(&self.dst, dst_ty) {
                        return Err(SemanticError::MappingFailed(format!(
                            "port type not allowed: {:?}",
                            self.dst.kind(dst_ty)
                        )));
                    }
                }
                if self.src.direction(v) != crate::base::PortDirection::In {
                    self.map_initial_value(v)?;
                }
                Ok(())
            }
            K::Range => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                let left = self.src.slot(v, f::LEFTBOUND);
                let right = self.src.slot(v, f::RIGHTBOUND);
                if let Some(l) = left {
                    self.map_index(l)?;
                }
                if let Some(r) = right {
                    self.map_index(r)?;
                }
                if let (Some(l), Some(r)) = (left, right) {
                    self.make_compatible_bounds(l, r)?;
                }
                Ok(())
            }
            K::Return => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                self.map_return(v)
            }
            K::Signal => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.assure_initial_value(v)?;
                self.visit_children(v)?;
                self.map_initial_value(v)
            }
            K::Slice => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                self.map_slice_span(v)?;
                if self.is_top(v) {
                    self.map_value(v)?;
                }
                Ok(())
            }
            K::StateTable => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                self.remove_list_casts(v, f::SENSITIVITY)?;
                self.remove_list_casts(v, f::SENSITIVITYPOS)?;
                self.remove_list_casts(v, f::SENSITIVITYNEG)?;
                self.sort_declarations(v, f::DECLARATIONS)
            }
            K::Switch => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                self.push_cast_to_conditions(v)
            }
            K::System => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                self.sort_declarations(v, f::DECLARATIONS)
            }
            K::TypeReference => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.sort_typeref_arguments(v)?;
                self.dst_get_declaration(v)?;
                self.visit_children(v)?;
                self.map_referenced_assign_list(v, f::TEMPLATEPARAMETERASSIGNS, Operator::Conv)
            }
            K::ValueTP => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                if self.src.slot(v, f::VALUE).is_some() {
                    self.map_initial_value(v)?;
                }
                Ok(())
            }
            K::Variable => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                let needs_init = match self.src.slot(v, f::TYPE) {
                    Some(ty) => {
                        let bt = base_type(self.src, ty, self.src_sem, &mut self.src_ctx)?;
                        self.src.kind(bt) != NodeKind::ViewReference
                    }
                    None => false,
                };
                if needs_init {
                    self.assure_initial_value(v)?;
                }
                self.visit_children(v)?;
                if self.src.slot(v, f::VALUE).is_some() {
                    self.map_initial_value(v)?;
                }
                Ok(())
            }
            K::View => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                self.sort_declarations(v, f::DECLARATIONS)
            }
            K::ViewReference => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.sort_viewref_arguments(v)?;
                self.dst_get_declaration(v)?;
                self.visit_children(v)?;
                self.map_referenced_assign_list(v, f::TEMPLATEPARAMETERASSIGNS, Operator::Conv)
            }
            K::Wait => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                if let Some(cond) = self.src.slot(v, f::CONDITION) {
                    self.map_condition(cond)?;
                }
                if let Some(rep) = self.src.slot(v, f::REPETITIONS) {
                    self.map_index(rep)?;
                }
                self.remove_list_casts(v, f::SENSITIVITY)
            }
            K::When => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                self.push_cast_to_elements(v)
            }
            K::WhenAlt => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                if let Some(cond) = self.src.slot(v, f::CONDITION) {
                    self.map_condition(cond)?;
                }
                Ok(())
            }
            K::While => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                if let Some(cond) = self.src.slot(v, f::CONDITION) {
                    self.map_condition(cond)?;
                }
                Ok(())
            }
            K::With => {
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)?;
                self.push_cast_to_elements(v)?;
                self.push_cast_to_conditions(v)
            }
            _ => {
                // Break, Continue, Null, Transition, DesignUnit, Entity,
                // Function, Procedure, GlobalAction, If, State, Alts,
                // RecordValue(+Alt), TypeDef, TypeTP, ValueStatement.
                if !self.copy_object(v)? {
                    return Ok(());
                }
                self.visit_children(v)
            }
        }
    }

    // ------------------------------------------------------------------
    // Per-kind repairs
    // ------------------------------------------------------------------

    /// Constants: make syntactic types agree with the destination.
    fn map_const_value(&mut self, o: NodeId) -> Result<(), SemanticError> {
        let dst_obj = self.mapped(o)?;
        let dst_type = self.dst_sem.type_for_constant(&mut self.dst, dst_obj).ok_or_else(|| {
            SemanticError::untypable("constant", format!("{dst_obj}"))
        })?;

        let Some(mapped) = self.dst.slot(dst_obj, f::TYPE) else {
            // The source constant never got a syntactic type: compare the
            // mapped canonical source type with the destination's.
            let src_type =
                self.src_sem.type_for_constant(self.src, o).ok_or_else(|| {
                    SemanticError::untypable("constant", format!("{o}"))
                })?;
            let mapped = self.dst_get_type(src_type)?;
            if self.dst.equal(mapped, dst_type) {
                self.dst.delete(mapped);
                self.dst.delete(dst_type);
                return Ok(());
            }
            match transform_constant(&mut self.dst, dst_obj, mapped) {
                None => {
                    self.dst.set_slot(dst_obj, f::TYPE, Some(dst_type));
                    self.replace_with_cast(o, dst_obj, mapped)?;
                }
                Some(cv) => {
                    self.dst.delete(dst_type);
                    let cv_sem =
                        self.dst_sem.type_for_constant(&mut self.dst, cv).ok_or_else(|| {
                            SemanticError::untypable("constant", format!("{cv}"))
                        })?;
                    if self.dst.equal(mapped, cv_sem) {
                        if let Some(t) = self.dst.set_slot(cv, f::TYPE, None) {
                            self.dst.delete(t);
                        }
                        self.dst.replace(dst_obj, Some(cv));
                        self.map_delete_tree(o, Some(cv));
                        self.map_set(o, cv)?;
                        self.dst.delete(mapped);
                    } else {
                        if let Some(t) = self.dst.set_slot(cv, f::TYPE, Some(cv_sem)) {
                            self.dst.delete(t);
                        }
                        self.dst.replace(dst_obj, Some(cv));
                        self.map_delete_tree(o, Some(cv));
                        self.map_set(o, cv)?;
                        self.replace_with_cast(o, cv, mapped)?;
                    }
                }
            }
            return Ok(());
        };

        // The usual path: the syntactic type was mapped during the
        // children visit; fold the value into it or cast.
        let mapped = self.dst.copy(mapped);
        match transform_constant(&mut self.dst, dst_obj, mapped) {
            None => {
                if let Some(t) = self.dst.set_slot(dst_obj, f::TYPE, Some(dst_type)) {
                    self.dst.delete(t);
                }
                self.replace_with_cast(o, dst_obj, mapped)?;
            }
            Some(cv) => {
                self.dst.delete(dst_type);
                let cv_sem = self.dst_sem.type_for_constant(&mut self.dst, cv).ok_or_else(
                    || SemanticError::untypable("constant", format!("{cv}")),
                )?;
                if self.dst.equal(mapped, cv_sem) {
                    self.dst.delete(cv_sem);
                    self.dst.replace(dst_obj, Some(cv));
                    self.map_delete_tree(o, Some(cv));
                    self.map_set(o, cv)?;
                    self.dst.delete(mapped);
                } else {
                    if let Some(t) = self.dst.set_slot(cv, f::TYPE, Some(cv_sem)) {
                        self.dst.delete(t);
                    }
                    self.dst.replace(dst_obj, Some(cv));
                    self.map_delete_tree(o, Some(cv));
                    self.map_set(o, cv)?;
                    self.replace_with_cast(o, cv, mapped)?;
                }
            }
        }
        Ok(())
    }

    /// Types: replace the mirrored type with the destination mapping and
    /// rebase its span when the two semantics disagree on index bases.
    fn map_type_node(&mut self, o: NodeId) -> Result<(), SemanticError> {
        let dst_obj = self.mapped(o)?;
        let mapped = self.dst_sem.map_type(&mut self.dst, dst_obj).ok_or_else(|| {
            SemanticError::MappingFailed(format!("type {:?}", self.dst.kind(dst_obj)))
        })?;
        if self.dst.parent(dst_obj).is_some() {
            self.dst.replace(dst_obj, Some(mapped));
            self.map_delete_tree(o, Some(mapped));
        } else {
            self.map_delete_tree(o, None);
        }
        self.tree_map.insert(o, mapped);

        if self.can_rebase
            && !self.src_sem.is_syntactic_type_rebased()
            && self.dst_sem.is_syntactic_type_rebased()
        {
            self.rebase_span_to_zero(mapped)?;
        }
        Ok(())
    }

    fn rebase_span_to_zero(&mut self, mapped: NodeId) -> Result<(), SemanticError> {
        let Some(r) = type_span(&self.dst, mapped) else { return Ok(()) };
        if self.is_typed_range(r) {
            return Ok(());
        }
        let Some(min) = range_min_bound(&self.dst, r) else { return Ok(()) };
        if matches!(self.dst.attrs(min), Attrs::IntValue { value: 0 }) {
            return Ok(());
        }
        let min = self.dst.copy(min);
        assure_syntactic_type(&mut self.dst, min, self.dst_sem);
        let left = self
            .dst
            .set_slot(r, f::LEFTBOUND, None)
            .ok_or_else(|| SemanticError::structure("span without left bound"))?;
        let right = self
            .dst
            .set_slot(r, f::RIGHTBOUND, None)
            .ok_or_else(|| SemanticError::structure("span without right bound"))?;
        assure_syntactic_type(&mut self.dst, left, self.dst_sem);
        assure_syntactic_type(&mut self.dst, right, self.dst_sem);
        let min2 = self.dst.copy(min);
        let mut fac = Factory::new(&mut self.dst);
        let new_left = fac.expression(left, Operator::Minus, min);
        let new_right = fac.expression(right, Operator::Minus, min2);
        self.dst.set_slot(r, f::LEFTBOUND, Some(new_left));
        self.dst.set_slot(r, f::RIGHTBOUND, Some(new_right));
        Ok(())
    }

    /// A span whose bounds are both template-parameter identifiers of
    /// the same parameter list is a "typed range" and is never rebased.
    fn is_typed_range(&mut self, span: NodeId) -> bool {
        let lb = self.dst.slot(span, f::LEFTBOUND);
        let rb = self.dst.slot(span, f::RIGHTBOUND);
        let (Some(lb), Some(rb)) = (lb, rb) else { return false };
        if self.dst.kind(lb) != NodeKind::Identifier || self.dst.kind(rb) != NodeKind::Identifier
        {
            return false;
        }
        let ld = declaration_of(&mut self.dst, lb, self.dst_sem, &mut self.dst_ctx);
        let rd = declaration_of(&mut self.dst, rb, self.dst_sem, &mut self.dst_ctx);
        match (ld, rd) {
            (Some(l), Some(r)) => {
                self.dst.kind(l) == NodeKind::ValueTP
                    && self.dst.kind(r) == NodeKind::ValueTP
                    && self.dst.parent(l).is_some()
                    && self.dst.parent(l) == self.dst.parent(r)
            }
            _ => false,
        }
    }

    /// Assignments: strip accidental left-hand-side casts, then cast the
    /// right-hand side when the pair is not assignable.
    fn map_assign(&mut self, o: NodeId) -> Result<(), SemanticError> {
        let dst_obj = self.mapped(o)?;
        let src_lhs = self
            .src
            .slot(o, f::LEFTHANDSIDE)
            .ok_or_else(|| SemanticError::structure("assign without target"))?;

        let dst_lhs = self
            .dst
            .slot(dst_obj, f::LEFTHANDSIDE)
            .ok_or_else(|| SemanticError::structure("assign without target"))?;
        let stripped = skip_casts(&self.dst, dst_lhs);
        if stripped != dst_lhs {
            let copy = self.dst.copy(stripped);
            if let Some(old) = self.dst.set_slot(dst_obj, f::LEFTHANDSIDE, Some(copy)) {
                self.tree_map.insert(src_lhs, old);
                self.map_delete_tree(src_lhs, Some(copy));
            }
            self.tree_map.insert(src_lhs, copy);
            self.dst_ctx.flush_types();
        }

        let dst_lhs = self.dst.slot(dst_obj, f::LEFTHANDSIDE).unwrap();
        let dst_rhs = self
            .dst
            .slot(dst_obj, f::RIGHTHANDSIDE)
            .ok_or_else(|| SemanticError::structure("assign without source"))?;
        let target_ty = self.dst_semantic_type(dst_lhs)?;
        let source_ty = self.dst_semantic_type(dst_rhs)?;
        if self
            .dst_sem
            .expr_type(&mut self.dst, target_ty, Some(source_ty), Operator::Assign, Some(dst_obj))
            .is_some()
        {
            return Ok(());
        }
        let src_rhs = self
            .src
            .slot(o, f::RIGHTHANDSIDE)
            .ok_or_else(|| SemanticError::structure("assign without source"))?;
        let native = self
            .dst
            .attrs(target_ty)
            .type_flags()
            .map(|fl| fl.variant == crate::base::TypeVariant::Native)
            .unwrap_or(true);
        let cast_ty = if native {
            self.dst.copy(target_ty)
        } else {
            self.dst_sem
                .suggested_type_for_op(
                    &mut self.dst,
                    target_ty,
                    Operator::Assign,
                    Some(source_ty),
                    Some(dst_obj),
                    false,
                )
                .ok_or_else(|| SemanticError::MappingFailed("assign target".into()))?
        };
        self.replace_with_cast(src_rhs, dst_rhs, cast_ty)
    }

    /// Conditions: cast to the destination's mapped boolean when the
    /// type is rejected in conditional position.
    fn map_condition(&mut self, o: NodeId) -> Result<(), SemanticError> {
        if self.src.kind(o) == NodeKind::Range {
            // Iteration ranges (for-generate) are not boolean conditions.
            return Ok(());
        }
        let dst_obj = self.mapped(o)?;
        let dst_ty = self.dst_semantic_type(dst_obj)?;
        let parent = self.dst.parent(dst_obj);
        if self.dst_sem.check_condition(&self.dst, dst_ty, parent) {
            return Ok(());
        }
        let constexpr_ = type_is_constexpr(&self.dst, dst_ty);
        let b = self.dst.add(NodeKind::Bool);
        type_set_constexpr(&mut self.dst, b, constexpr_);
        let mapped_bool = self
            .dst_sem
            .map_type(&mut self.dst, b)
            .ok_or_else(|| SemanticError::MappingFailed("boolean".into()))?;
        self.dst.delete(b);
        self.replace_with_cast(o, dst_obj, mapped_bool)
    }

    /// Expressions: the five-step repair ladder.
    fn map_expression(&mut self, o: NodeId) -> Result<(), SemanticError> {
        let dst_obj = self.mapped(o)?;
        self.src_semantic_type(o)?;

        let dst_v1 = self
            .dst
            .slot(dst_obj, f::VALUE1)
            .ok_or_else(|| SemanticError::structure("expression without operand"))?;
        let dst_v1_ty = self.dst_semantic_type(dst_v1)?;
        let dst_v2 = self.dst.slot(dst_obj, f::VALUE2);
        let dst_v2_ty = match dst_v2 {
            Some(v) => Some(self.dst_semantic_type(v)?),
            None => None,
        };

        let src_v1 = self
            .src
            .slot(o, f::VALUE1)
            .ok_or_else(|| SemanticError::structure("expression without operand"))?;
        let t1 = self.src_semantic_type(src_v1)?;
        let src_v2 = self.src.slot(o, f::VALUE2);
        let t2 = match src_v2 {
            Some(v) => Some(self.src_semantic_type(v)?),
            None => None,
        };

        let op = self.src.operator(o);
        let info = self.analyze_expr(t1, t2, op, o)?;

        self.dst.set_operator(dst_obj, info.operator);

        let mut cast_op1 = info.op1.map(|t| self.dst.copy(t));
        let mut cast_op2 = match (dst_v2, info.op2) {
            (Some(_), Some(t)) => Some(self.dst.copy(t)),
            _ => None,
        };

        // Concat must preserve the span of each operand on its cast.
        if info.operator == Operator::Concat {
            if let Some(c1) = cast_op1 {
                self.maintain_span(dst_v1_ty, c1)?;
            }
            if let (Some(ty2), Some(c2)) = (dst_v2_ty, cast_op2) {
                self.maintain_span(ty2, c2)?;
            }
        }

        if let Some(c1) = cast_op1.take() {
            if !self.dst.equal(dst_v1_ty, c1) {
                self.replace_with_cast(src_v1, dst_v1, c1)?;
            } else {
                self.dst.delete(c1);
            }
        }
        if let (Some(c2), Some(dv2), Some(ty2), Some(sv2)) =
            (cast_op2.take(), dst_v2, dst_v2_ty, src_v2)
        {
            if !self.dst.equal(ty2, c2) {
                self.replace_with_cast(sv2, dv2, c2)?;
            } else {
                self.dst.delete(c2);
            }
        }

        if let Some(result_ty) = info.result {
            let dst_ty = self.dst_semantic_type(dst_obj)?;
            if !self.dst.equal(dst_ty, result_ty) {
                let c = self.dst.copy(result_ty);
                self.replace_with_cast(o, dst_obj, c)?;
            }
        }

        // The expression must now be typable in the destination.
        let current = self.mapped(o)?;
        self.dst_semantic_type(current)?;
        Ok(())
    }

    /// The semantics algorithm: decide which casts make `t1 op t2` legal
    /// under the destination semantics.
    fn analyze_expr(
        &mut self,
        t1: NodeId,
        t2: Option<NodeId>,
        op: Operator,
        starting: NodeId,
    ) -> Result<AnalyzeInfo, SemanticError> {
        let mut info =
            AnalyzeInfo { op1: None, op2: None, result: None, operator: op };

        // Step 1: the operation must be legal at the source.
        let src_analysis = self
            .src_sem
            .expr_type(self.src, t1, t2, op, Some(starting))
            .ok_or_else(|| SemanticError::SourceTyping(format!("{op:?} at {starting}")))?;

        // Step 2: map operand and result types.
        let dst_t1 = self.dst_get_type(t1)?;
        let dst_t2 = match t2 {
            Some(t) if t != t1 => Some(self.dst_get_type(t)?),
            Some(_) => Some(self.dst.copy(dst_t1)),
            None => None,
        };
        let dst_result = self.dst_get_type(src_analysis.returned)?;
        let dst_precision = self.dst_get_type(src_analysis.precision)?;

        // Step 2.1: operator retargeting.
        info.operator =
            self.dst_sem.map_operator(op, &self.dst, Some(t1), t2, Some(dst_t1), dst_t2);
        let op = info.operator;

        // Step 3: try the mapped operation as is.
        let dst_starting = self.tree_map.get(&starting).copied();
        let mut dst_analysis =
            self.dst_sem.expr_type(&mut self.dst, dst_t1, dst_t2, op, dst_starting);

        let no_constexpr =
            EqualsOptions { check_constexpr: false, ..Default::default() };

        match dst_analysis {
            Some(ok) => {
                // Allowed: casts only if the precision diverged.
                if !self.dst.equals(dst_precision, ok.precision, &no_constexpr) {
                    if !self.dst.equals(dst_t1, dst_precision, &no_constexpr) {
                        info.op1 = Some(self.dst.copy(dst_precision));
                    }
                    if let Some(t) = dst_t2 {
                        if !self.dst.equals(t, dst_precision, &no_constexpr) {
                            info.op2 = Some(self.dst.copy(dst_precision));
                        }
                    }
                }
            }
            None => {
                // Step 4: pick a cast strategy by operator class.
                let operand_cast = if op.is_relational()
                    || op.is_arithmetic()
                    || op.is_bitwise()
                    || op == Operator::Concat
                {
                    self.dst.copy(dst_precision)
                } else if op.is_logical() {
                    let b = self.src.add(NodeKind::Bool);
                    self.dst_get_type(b)?
                } else if op.is_shift() {
                    let Some(t2v) = dst_t2 else {
                        return Err(SemanticError::MappingFailed(format!(
                            "shift without count at {starting}"
                        )));
                    };
                    let Some(span) = type_span(&self.dst, t2v) else {
                        return Ok(info);
                    };
                    let span = self.dst.copy(span);
                    let signed = type_is_signed(&self.dst, t2v);
                    let constexpr_ = type_is_constexpr(&self.dst, t2v);
                    let mut fac = Factory::new(&mut self.dst);
                    let ii = fac.int_type(Some(span), signed);
                    type_set_constexpr(&mut self.dst, ii, constexpr_);
                    let mapped = self
                        .dst_sem
                        .map_type(&mut self.dst, ii)
                        .ok_or_else(|| SemanticError::MappingFailed("shift count".into()))?;
                    self.dst.delete(ii);
                    mapped
                } else {
                    return Err(SemanticError::MappingFailed(format!(
                        "operator {op:?} at {starting}"
                    )));
                };

                let strategy = self.dst.copy(operand_cast);
                let (mut t1_final, mut t2_final) = if op.is_shift() {
                    (self.dst.copy(dst_t1), Some(operand_cast))
                } else {
                    let second = self.dst.copy(operand_cast);
                    (operand_cast, Some(second))
                };

                dst_analysis = self.dst_sem.expr_type(
                    &mut self.dst,
                    t1_final,
                    t2_final,
                    op,
                    dst_starting,
                );

                if dst_analysis.is_none() {
                    // Last resort: the destination's suggested types.
                    let suggested1 = self
                        .dst_sem
                        .suggested_type_for_op(
                            &mut self.dst,
                            strategy,
                            op,
                            Some(dst_t1),
                            dst_starting,
                            true,
                        )
                        .ok_or_else(|| {
                            SemanticError::MappingFailed(format!("operand 1 of {op:?}"))
                        })?;
                    let suggested2 = match t2_final {
                        Some(_) => Some(
                            self.dst_sem
                                .suggested_type_for_op(
                                    &mut self.dst,
                                    strategy,
                                    op,
                                    dst_t2,
                                    dst_starting,
                                    false,
                                )
                                .ok_or_else(|| {
                                    SemanticError::MappingFailed(format!(
                                        "operand 2 of {op:?}"
                                    ))
                                })?,
                        ),
                        None => None,
                    };
                    dst_analysis = self.dst_sem.expr_type(
                        &mut self.dst,
                        suggested1,
                        suggested2,
                        op,
                        dst_starting,
                    );
                    if dst_analysis.is_none() {
                        return Err(SemanticError::MappingFailed(format!(
                            "no cast strategy legalizes {op:?} at {starting}"
                        )));
                    }
                    t1_final = suggested1;
                    t2_final = suggested2;
                }

                if !self.dst.equal(dst_t1, t1_final) {
                    info.op1 = Some(self.dst.copy(t1_final));
                }
                if let (Some(t), Some(tf)) = (dst_t2, t2_final) {
                    if !self.dst.equal(t, tf) {
                        info.op2 = Some(self.dst.copy(tf));
                    }
                }
            }
        }

        let dst_analysis = dst_analysis
            .ok_or_else(|| SemanticError::MappingFailed(format!("operator {op:?}")))?;

        // Step 5: result cast when the classes differ.
        let no_spans = EqualsOptions { check_spans: false, ..Default::default() };
        if !self.dst.equals(dst_result, dst_analysis.returned, &no_spans) {
            info.result = Some(self.dst.copy(dst_result));
        }

        // Step 6: length handling on spanned results.
        if type_span(&self.dst, dst_result).is_some() {
            self.handle_length(dst_precision, dst_analysis.precision, dst_result, &mut info, op);
        }

        // Step 7: the result precision must survive exactly.
        if info.result.is_none() && !self.dst.equal(dst_result, dst_analysis.returned) {
            info.result = Some(self.dst.copy(dst_result));
        }
        Ok(info)
    }

    /// Step 6: when the destination computes at a different width than
    /// the mapped source precision, widen operands (source wider) or the
    /// result (destination wider).
    fn handle_length(
        &mut self,
        source: NodeId,
        dest: NodeId,
        result_type: NodeId,
        info: &mut AnalyzeInfo,
        op: Operator,
    ) {
        if self.dst.kind(source) == NodeKind::StringT || self.dst.kind(dest) == NodeKind::StringT
        {
            return;
        }
        let (Some(src_span), Some(dst_span)) =
            (type_span(&self.dst, source), type_span(&self.dst, dest))
        else {
            return;
        };
        let (s_src, s_dst) = (span_size(&self.dst, src_span), span_size(&self.dst, dst_span));
        match (s_src, s_dst) {
            (Some(a), Some(b)) if a == b => {}
            (Some(a), Some(b)) if a > b => {
                self.type_set_precision(&mut info.op1, source);
                if !op.is_shift() {
                    self.type_set_precision(&mut info.op2, source);
                }
            }
            (Some(_), Some(_)) => {
                self.type_set_precision(&mut info.result, result_type);
            }
            _ => {
                self.type_set_precision(&mut info.op1, source);
                if !op.is_shift() {
                    self.type_set_precision(&mut info.op2, source);
                }
                self.type_set_precision(&mut info.result, result_type);
            }
        }
    }

    fn type_set_precision(&mut self, slot: &mut Option<NodeId>, precision: NodeId) {
        match *slot {
            None => *slot = Some(self.dst.copy(precision)),
            Some(existing) => {
                if let Some(span) = type_span(&self.dst, precision) {
                    let span = self.dst.copy(span);
                    set_type_span(&mut self.dst, existing, span);
                }
            }
        }
    }

    /// Concat span preservation: the cast type keeps the operand's span
    /// (or collapses to a one-element array for `array & element`).
    fn maintain_span(&mut self, range_type: NodeId, cast_type: NodeId) -> Result<(), SemanticError> {
        let mut span = None;
        if self.dst.kind(cast_type) == NodeKind::Array {
            if let Some(inner) = self.dst.slot(cast_type, f::TYPE) {
                let arr_bt = base_type(&mut self.dst, inner, self.dst_sem, &mut self.dst_ctx)?;
                let range_bt =
                    base_type(&mut self.dst, range_type, self.dst_sem, &mut self.dst_ctx)?;
                let no_constexpr =
                    EqualsOptions { check_constexpr: false, ..Default::default() };
                if self.dst.equals(arr_bt, range_bt, &no_constexpr) {
                    let mut fac = Factory::new(&mut self.dst);
                    span = Some(fac.range_upto(0, 0));
                }
            }
        }
        let span = match span {
            Some(s) => s,
            None => match type_span(&self.dst, range_type) {
                Some(s) => self.dst.copy(s),
                None => return Ok(()),
            },
        };
        set_type_span(&mut self.dst, cast_type, span);
        Ok(())
    }

    /// Indices and bounds: force the destination's mapped integer,
    /// preserving the source index's span.
    fn map_index(&mut self, o: NodeId) -> Result<(), SemanticError> {
        if self.src.kind(o) == NodeKind::Range {
            return Ok(());
        }
        let dst_obj = self.mapped(o)?;
        let dst_ty = self.dst_semantic_type(dst_obj)?;

        let Some(span) = type_span(&self.dst, dst_ty) else {
            return Err(SemanticError::untypable("index span", format!("{dst_obj}")));
        };
        let span = self.dst.copy(span);
        let signed = type_is_signed(&self.dst, dst_ty);
        let constexpr_ = type_is_constexpr(&self.dst, dst_ty);
        let mut fac = Factory::new(&mut self.dst);
        let ii = fac.int_type(Some(span), signed);
        type_set_constexpr(&mut self.dst, ii, constexpr_);
        let mut dummy = self
            .dst_sem
            .map_type(&mut self.dst, ii)
            .ok_or_else(|| SemanticError::MappingFailed("index type".into()))?;
        self.dst.delete(ii);
        if let Some(replacement) = self.dst_sem.bound_type_replacement(&mut self.dst, dummy) {
            self.dst.delete(dummy);
            dummy = replacement;
        }

        if self.dst.equal(dst_ty, dummy) {
            self.dst.delete(dummy);
            if self.dst.kind(dst_obj).is_const_value()
                && !needs_syntactic_type(&self.dst, dst_obj)
            {
                self.handle_bound(o, dst_obj)?;
            }
            return Ok(());
        }

        self.replace_with_cast(o, dst_obj, dummy)?;
        let inner = self.mapped(o)?;
        if let Some(v) = self.dst.slot(inner, f::VALUE) {
            assure_syntactic_type(&mut self.dst, v, self.dst_sem);
        }
        Ok(())
    }

    /// Bounds drop syntactic types the destination derives anyway; a
    /// bound whose syntactic type diverges keeps a cast instead.
    fn handle_bound(&mut self, o: NodeId, dst_cv: NodeId) -> Result<(), SemanticError> {
        let Some(bound_ty) = self.dst.slot(dst_cv, f::TYPE) else {
            return Ok(());
        };
        let sem_ty = self
            .dst_sem
            .type_for_constant(&mut self.dst, dst_cv)
            .ok_or_else(|| SemanticError::untypable("bound", format!("{dst_cv}")))?;
        if self.dst.equal(bound_ty, sem_ty) {
            self.dst.delete(sem_ty);
            if let Some(t) = self.dst.set_slot(dst_cv, f::TYPE, None) {
                self.dst.delete(t);
            }
            return Ok(());
        }
        // Keep the numeric reading: cast the plainly-typed constant back
        // to the declared bound type.
        let cast = self.dst.add(NodeKind::Cast);
        self.dst.replace(dst_cv, Some(cast));
        let old_ty = self.dst.set_slot(dst_cv, f::TYPE, Some(sem_ty));
        self.dst.set_slot(cast, f::VALUE, Some(dst_cv));
        if let Some(t) = old_ty {
            self.dst.set_slot(cast, f::TYPE, Some(t));
        }
        self.tree_map.insert(o, cast);
        self.dst_ctx.flush_types();
        Ok(())
    }

    /// Ranges whose bounds cannot be added under the destination get
    /// both bounds cast to a common precision.
    fn make_compatible_bounds(&mut self, left: NodeId, right: NodeId) -> Result<(), SemanticError> {
        let dst_left = self.mapped(left)?;
        let dst_right = self.mapped(right)?;
        let lt = self.dst_semantic_type(dst_left)?;
        let rt = self.dst_semantic_type(dst_right)?;
        if self
            .dst_sem
            .expr_type(&mut self.dst, lt, Some(rt), Operator::Plus, None)
            .is_some()
        {
            return Ok(());
        }
        let constexpr_ = type_is_constexpr(&self.dst, lt) && type_is_constexpr(&self.dst, rt);
        let signed = type_is_signed(&self.dst, lt) && type_is_signed(&self.dst, rt);
        let (Some(ls), Some(rs)) = (type_span(&self.dst, lt), type_span(&self.dst, rt)) else {
            return Err(SemanticError::untypable("bound span", format!("{dst_left}")));
        };
        let res_span = crate::semantics::typing::range_max_span(&mut self.dst, ls, rs);
        let max_prec = self.dst.copy(lt);
        type_set_constexpr(&mut self.dst, max_prec, constexpr_);
        type_set_signed(&mut self.dst, max_prec, signed);
        set_type_span(&mut self.dst, max_prec, res_span);

        if !self.dst.equal(lt, max_prec) {
            let c = self.dst.copy(max_prec);
            self.replace_with_cast(left, dst_left, c)?;
        }
        if !self.dst.equal(rt, max_prec) {
            let c = self.dst.copy(max_prec);
            self.replace_with_cast(right, dst_right, c)?;
        }
        self.dst.delete(max_prec);
        Ok(())
    }

    /// Values whose mapped type no longer matches the destination type
    /// get a cast (field references, top-level slices).
    fn map_value(&mut self, o: NodeId) -> Result<(), SemanticError> {
        let src_ty = self.src_semantic_type(o)?;
        let dst_obj = self.mapped(o)?;
        let dst_ty = self.dst_semantic_type(dst_obj)?;
        let mapped = self.dst_get_type(src_ty)?;
        if self.dst.equal(dst_ty, mapped) {
            self.dst.delete(mapped);
            return Ok(());
        }
        self.replace_with_cast(o, dst_obj, mapped)
    }

    /// Slices: rebase the span when source and destination disagree on
    /// slice index bases: `new = old - (mapped_min - dst_min)`.
    fn map_slice_span(&mut self, o: NodeId) -> Result<(), SemanticError> {
        let src_tr = self.src_sem.is_syntactic_type_rebased();
        let src_sr = self.src_sem.is_slice_type_rebased();
        let dst_tr = self.dst_sem.is_syntactic_type_rebased();
        let dst_sr = self.dst_sem.is_slice_type_rebased();
        if src_tr == dst_tr && src_sr == dst_sr {
            return Ok(());
        }
        if src_tr && src_sr && !dst_tr && dst_sr {
            return Ok(());
        }

        let src_ty = self.src_semantic_type(o)?;
        let src_prefix = self
            .src
            .slot(o, f::PREFIX)
            .ok_or_else(|| SemanticError::structure("slice without prefix"))?;
        let src_prefix_ty = self.src_semantic_type(src_prefix)?;

        let dst_obj = self.mapped(o)?;
        let dst_ty = self.dst_semantic_type(dst_obj)?;
        let dst_prefix = self
            .dst
            .slot(dst_obj, f::PREFIX)
            .ok_or_else(|| SemanticError::structure("slice without prefix"))?;
        let dst_prefix_ty = self.dst_semantic_type(dst_prefix)?;

        let mapped_ty = self.dst_get_type(src_ty)?;
        let mapped_prefix_ty = self.dst_get_type(src_prefix_ty)?;

        if !src_tr && dst_tr {
            let (Some(mp_span), Some(dp_span)) = (
                type_span(&self.dst, mapped_prefix_ty),
                type_span(&self.dst, dst_prefix_ty),
            ) else {
                return Ok(());
            };
            let Some(mapped_min) = range_min_bound(&self.dst, mp_span) else {
                return Ok(());
            };
            let Some(dst_min) = range_min_bound(&self.dst, dp_span) else {
                return Ok(());
            };
            let mapped_min = self.dst.copy(mapped_min);
            assure_syntactic_type(&mut self.dst, mapped_min, self.dst_sem);
            let dst_min = self.dst.copy(dst_min);
            assure_syntactic_type(&mut self.dst, dst_min, self.dst_sem);

            let span = self
                .dst
                .slot(dst_obj, f::SPAN)
                .ok_or_else(|| SemanticError::structure("slice without span"))?;
            let lb = self
                .dst
                .set_slot(span, f::LEFTBOUND, None)
                .ok_or_else(|| SemanticError::structure("slice span without bounds"))?;
            let rb = self
                .dst
                .set_slot(span, f::RIGHTBOUND, None)
                .ok_or_else(|| SemanticError::structure("slice span without bounds"))?;
            assure_syntactic_type(&mut self.dst, lb, self.dst_sem);
            assure_syntactic_type(&mut self.dst, rb, self.dst_sem);
            let mapped_min2 = self.dst.copy(mapped_min);
            let dst_min2 = self.dst.copy(dst_min);
            let mut fac = Factory::new(&mut self.dst);
            let shift_l = fac.expression(mapped_min, Operator::Minus, dst_min);
            let new_l = fac.expression(lb, Operator::Minus, shift_l);
            let shift_r = fac.expression(mapped_min2, Operator::Minus, dst_min2);
            let new_r = fac.expression(rb, Operator::Minus, shift_r);
            self.dst.set_slot(span, f::LEFTBOUND, Some(new_l));
            self.dst.set_slot(span, f::RIGHTBOUND, Some(new_r));
            self.dst_ctx.flush_types();
        }

        // A cast on the slice itself is needed only when the destination
        // rebases slices but not types, and only at the top of a chain.
        let parent = self.dst.parent(dst_obj);
        let parent_is_access = parent.is_some_and(|p| {
            matches!(self.dst.kind(p), NodeKind::Slice | NodeKind::Member)
        });
        if parent_is_access || dst_tr || !dst_sr || self.dst.equal(dst_ty, mapped_ty) {
            self.dst.delete(mapped_ty);
            return Ok(());
        }
        self.replace_with_cast(o, dst_obj, mapped_ty)
    }

    /// Members: the same index rebase as slices.
    fn map_member_index(&mut self, o: NodeId) -> Result<(), SemanticError> {
        let src_tr = self.src_sem.is_syntactic_type_rebased();
        let src_sr = self.src_sem.is_slice_type_rebased();
        let dst_tr = self.dst_sem.is_syntactic_type_rebased();
        let dst_sr = self.dst_sem.is_slice_type_rebased();
        if src_tr == dst_tr && src_sr == dst_sr {
            return Ok(());
        }
        if src_tr && src_sr && !dst_tr && dst_sr {
            return Ok(());
        }

        let src_prefix = self
            .src
            .slot(o, f::PREFIX)
            .ok_or_else(|| SemanticError::structure("member without prefix"))?;
        let src_prefix_ty = self.src_semantic_type(src_prefix)?;

        let dst_obj = self.mapped(o)?;
        let dst_prefix = self
            .dst
            .slot(dst_obj, f::PREFIX)
            .ok_or_else(|| SemanticError::structure("member without prefix"))?;
        let dst_prefix_ty = self.dst_semantic_type(dst_prefix)?;
        let mapped_prefix_ty = self.dst_get_type(src_prefix_ty)?;

        if !src_tr && dst_tr {
            let (Some(mp_span), Some(dp_span)) = (
                type_span(&self.dst, mapped_prefix_ty),
                type_span(&self.dst, dst_prefix_ty),
            ) else {
                self.dst.delete(mapped_prefix_ty);
                return Ok(());
            };
            let (Some(mapped_min), Some(dst_min)) = (
                range_min_bound(&self.dst, mp_span),
                range_min_bound(&self.dst, dp_span),
            ) else {
                self.dst.delete(mapped_prefix_ty);
                return Ok(());
            };
            let mapped_min = self.dst.copy(mapped_min);
            assure_syntactic_type(&mut self.dst, mapped_min, self.dst_sem);
            let dst_min = self.dst.copy(dst_min);
            assure_syntactic_type(&mut self.dst, dst_min, self.dst_sem);

            let index = self
                .dst
                .slot(dst_obj, f::INDEX)
                .ok_or_else(|| SemanticError::structure("member without index"))?;
            let src_index = self
                .src
                .slot(o, f::INDEX)
                .ok_or_else(|| SemanticError::structure("member without index"))?;
            let mut fac = Factory::new(&mut self.dst);
            let shift = fac.expression(mapped_min, Operator::Minus, dst_min);
            let rebased = self.dst.add(NodeKind::Expression);
            self.dst.set_operator(rebased, Operator::Minus);
            self.dst.set_slot(rebased, f::VALUE2, Some(shift));
            self.dst.replace(index, Some(rebased));
            self.tree_map.insert(src_index, rebased);
            assure_syntactic_type(&mut self.dst, index, self.dst_sem);
            self.dst.set_slot(rebased, f::VALUE1, Some(index));
            self.dst_ctx.flush_types();
        }
        self.dst.delete(mapped_prefix_ty);
        Ok(())
    }

    /// Aggregates: every element and the `others` keep the mapped vector
    /// element type, preserving the array-vs-bitvector distinction.
    fn map_aggregate(&mut self, o: NodeId) -> Result<(), SemanticError> {
        let src_ty = self.src_semantic_type(o)?;
        let mapped = self.dst_get_type(src_ty)?;
        let elem = vector_element_type(&mut self.dst, mapped).ok_or_else(|| {
            SemanticError::untypable("aggregate element", format!("{mapped}"))
        })?;
        self.dst.delete(mapped);
        let dst_obj = self.mapped(o)?;

        let src_alts: Vec<NodeId> = self.src.list(o, f::ALTS).to_vec();
        let dst_alts: Vec<NodeId> = self.dst.list(dst_obj, f::ALTS).to_vec();
        if src_alts.len() != dst_alts.len() {
            return Err(SemanticError::structure("aggregate alts diverged"));
        }
        for (s, d) in src_alts.into_iter().zip(dst_alts) {
            let (Some(sv), Some(dv)) =
                (self.src.slot(s, f::VALUE), self.dst.slot(d, f::VALUE))
            else {
                continue;
            };
            let c = self.dst.copy(elem);
            self.replace_with_cast(sv, dv, c)?;
        }
        if let (Some(src_others), Some(dst_others)) =
            (self.src.slot(o, f::OTHERS), self.dst.slot(dst_obj, f::OTHERS))
        {
            let c = self.dst.copy(elem);
            self.replace_with_cast(src_others, dst_others, c)?;
        }
        self.dst.delete(elem);
        Ok(())
    }

    /// When/With values: align every alt value (and the default) to the
    /// construct's mapped output type.
    fn push_cast_to_elements(&mut self, o: NodeId) -> Result<(), SemanticError> {
        let src_ty = self.src_semantic_type(o)?;
        let mapped = self.dst_get_type(src_ty)?;
        let dst_obj = self.mapped(o)?;

        let src_alts: Vec<NodeId> = self.src.list(o, f::ALTS).to_vec();
        let dst_alts: Vec<NodeId> = self.dst.list(dst_obj, f::ALTS).to_vec();
        if src_alts.len() != dst_alts.len() {
            return Err(SemanticError::structure("alts diverged"));
        }
        for (s, d) in src_alts.into_iter().zip(dst_alts) {
            let (Some(sv), Some(dv)) =
                (self.src.slot(s, f::VALUE), self.dst.slot(d, f::VALUE))
            else {
                continue;
            };
            let c = self.dst.copy(mapped);
            self.replace_with_cast(sv, dv, c)?;
        }
        if let (Some(sd), Some(dd)) =
            (self.src.slot(o, f::DEFAULT), self.dst.slot(dst_obj, f::DEFAULT))
        {
            let c = self.dst.copy(mapped);
            self.replace_with_cast(sd, dd, c)?;
        }
        self.dst.delete(mapped);
        Ok(())
    }

    /// Switch/With conditions: compute the precision of the union of all
    /// alt conditions plus the selector, and cast every diverging piece
    /// to it.
    fn push_cast_to_conditions(&mut self, o: NodeId) -> Result<(), SemanticError> {
        let src_cond = self
            .src
            .slot(o, f::CONDITION)
            .ok_or_else(|| SemanticError::structure("switch without selector"))?;

        // Union of all source condition types plus the selector's.
        let mut alt_types = Vec::new();
        let src_alts: Vec<NodeId> = self.src.list(o, f::ALTS).to_vec();
        for &alt in &src_alts {
            for cond in self.src.list(alt, f::CONDITIONS).to_vec() {
                if self.src.kind(cond) == NodeKind::Range {
                    let lb = self.src.slot(cond, f::LEFTBOUND);
                    let rb = self.src.slot(cond, f::RIGHTBOUND);
                    for b in [lb, rb].into_iter().flatten() {
                        alt_types.push(self.src_semantic_type(b)?);
                    }
                } else {
                    alt_types.push(self.src_semantic_type(cond)?);
                }
            }
        }
        alt_types.push(self.src_semantic_type(src_cond)?);

        let Some(src_precision) =
            precision_of_types(self.src, &alt_types, self.src_sem, Some(o))?
        else {
            return Ok(());
        };
        let common = self.dst_get_type(src_precision)?;

        let dst_obj = self.mapped(o)?;
        let dst_alts: Vec<NodeId> = self.dst.list(dst_obj, f::ALTS).to_vec();
        if src_alts.len() != dst_alts.len() {
            return Err(SemanticError::structure("switch alts diverged"));
        }
        for (sa, da) in src_alts.iter().zip(&dst_alts) {
            let src_conds: Vec<NodeId> = self.src.list(*sa, f::CONDITIONS).to_vec();
            let dst_conds: Vec<NodeId> = self.dst.list(*da, f::CONDITIONS).to_vec();
            if src_conds.len() != dst_conds.len() {
                return Err(SemanticError::structure("switch alt conditions diverged"));
            }
            for (sc, dc) in src_conds.into_iter().zip(dst_conds) {
                if self.dst.kind(dc) == NodeKind::Range {
                    let pairs = [
                        (self.src.slot(sc, f::LEFTBOUND), self.dst.slot(dc, f::LEFTBOUND)),
                        (self.src.slot(sc, f::RIGHTBOUND), self.dst.slot(dc, f::RIGHTBOUND)),
                    ];
                    for (sb, db) in pairs {
                        let (Some(sb), Some(db)) = (sb, db) else { continue };
                        let bt = self.dst_semantic_type(db)?;
                        if self
                            .dst_sem
                            .expr_type(
                                &mut self.dst,
                                common,
                                Some(bt),
                                Operator::CaseEq,
                                Some(db),
                            )
                            .is_none()
                        {
                            let c = self.dst.copy(common);
                            self.replace_with_cast(sb, db, c)?;
                            let inner = self.mapped(sb)?;
                            if let Some(v) = self.dst.slot(inner, f::VALUE) {
                                assure_syntactic_type(&mut self.dst, v, self.dst_sem);
                            }
                        }
                    }
                } else {
                    let ct = self.dst_semantic_type(dc)?;
                    if self
                        .dst_sem
                        .expr_type(&mut self.dst, common, Some(ct), Operator::CaseEq, Some(dc))
                        .is_none()
                    {
                        let c = self.dst.copy(common);
                        self.replace_with_cast(sc, dc, c)?;
                    }
                }
            }
        }

        let dst_cond = self.mapped(src_cond)?;
        self.replace_with_cast(src_cond, dst_cond, common)
    }

    /// Referenced assigns: cast the actual when formal/actual are not
    /// bindable under the destination.
    fn map_referenced_assign_list(
        &mut self,
        owner: NodeId,
        field: &str,
        op: Operator,
    ) -> Result<(), SemanticError> {
        for a in self.src.list(owner, field).to_vec() {
            if self.src.kind(a) == NodeKind::TypeTPAssign {
                continue;
            }
            self.map_referenced_assign(a, op)?;
        }
        Ok(())
    }

    fn map_referenced_assign(&mut self, o: NodeId, op: Operator) -> Result<(), SemanticError> {
        let dst_obj = self.mapped(o)?;
        let src_formal_ty = self.src_semantic_type(o)?;
        let dst_formal_ty = self.dst_get_type(src_formal_ty)?;
        let dst_actual = self
            .dst
            .slot(dst_obj, f::VALUE)
            .ok_or_else(|| SemanticError::structure("referenced assign without value"))?;
        let dst_actual_ty = self.dst_semantic_type(dst_actual)?;
        if self
            .dst_sem
            .expr_type(&mut self.dst, dst_formal_ty, Some(dst_actual_ty), op, Some(dst_obj))
            .is_some()
        {
            self.dst.delete(dst_formal_ty);
            return Ok(());
        }
        let src_actual = self
            .src
            .slot(o, f::VALUE)
            .ok_or_else(|| SemanticError::structure("referenced assign without value"))?;
        self.replace_with_cast(src_actual, dst_actual, dst_formal_ty)
    }

    /// Returns: the value must be assignable to the enclosing function's
    /// return type.
    fn map_return(&mut self, o: NodeId) -> Result<(), SemanticError> {
        let dst_obj = self.mapped(o)?;
        let proc = self.src.nearest_parent_of_kind(o, NodeKind::Procedure);
        let func = self.src.nearest_parent_of_kind(o, NodeKind::Function);
        let st = self.src.nearest_parent_of_kind(o, NodeKind::StateTable);
        let in_thread = st
            .map(|s| self.src.flavour(s) == crate::base::ProcessFlavour::Thread)
            .unwrap_or(false);

        if proc.is_some() || (func.is_none() && in_thread) {
            if self.src.slot(o, f::VALUE).is_some() {
                return Err(SemanticError::structure("procedure return carries a value"));
            }
            return Ok(());
        }
        let Some(func) = func else {
            return Err(SemanticError::structure("return outside a subprogram"));
        };
        let src_value = self
            .src
            .slot(o, f::VALUE)
            .ok_or_else(|| SemanticError::structure("function return without value"))?;
        let dst_func = self.mapped(func)?;
        let dst_func_ty = self
            .dst
            .slot(dst_func, f::TYPE)
            .ok_or_else(|| SemanticError::structure("function without return type"))?;
        let dst_value = self
            .dst
            .slot(dst_obj, f::VALUE)
            .ok_or_else(|| SemanticError::structure("function return without value"))?;
        let dst_value_ty = self.dst_semantic_type(dst_value)?;
        if self
            .dst_sem
            .expr_type(&mut self.dst, dst_func_ty, Some(dst_value_ty), Operator::Conv, Some(dst_obj))
            .is_some()
        {
            return Ok(());
        }
        let c = self.dst.copy(dst_func_ty);
        self.replace_with_cast(src_value, dst_value, c)
    }

    /// Declarations with a type need an initial value in the source
    /// semantics before mirroring.
    fn assure_initial_value(&mut self, o: NodeId) -> Result<(), SemanticError> {
        if self.src.slot(o, f::VALUE).is_some() {
            return Ok(());
        }
        let Some(ty) = self.src.slot(o, f::TYPE) else { return Ok(()) };
        if let Some(v) = self.src_sem.type_default_value(self.src, ty, Some(o)) {
            self.src.set_slot(o, f::VALUE, Some(v));
        }
        Ok(())
    }

    /// Initial values must be assignable to the declared type.
    fn map_initial_value(&mut self, o: NodeId) -> Result<(), SemanticError> {
        if self.src.slot(o, f::VALUE).is_none() {
            return Ok(());
        }
        let dst_obj = self.mapped(o)?;
        let decl_ty = self
            .dst
            .slot(dst_obj, f::TYPE)
            .ok_or_else(|| SemanticError::structure("declaration without type"))?;
        let dst_value = self
            .dst
            .slot(dst_obj, f::VALUE)
            .ok_or_else(|| SemanticError::structure("declaration value diverged"))?;
        let value_ty = self.dst_semantic_type(dst_value)?;
        if self
            .dst_sem
            .expr_type(&mut self.dst, decl_ty, Some(value_ty), Operator::Assign, Some(dst_obj))
            .is_some()
        {
            return Ok(());
        }
        let src_value = self.src.slot(o, f::VALUE).unwrap();
        let c = self.dst.copy(decl_ty);
        self.replace_with_cast(src_value, dst_value, c)
    }

    // ------------------------------------------------------------------
    // Ordering
    // ------------------------------------------------------------------

    /// Re-establish the source order of a declaration list in the
    /// destination (out-of-order materialization appends at the end).
    fn sort_declarations(&mut self, src_owner: NodeId, field: &str) -> Result<(), SemanticError> {
        let dst_owner = self.mapped(src_owner)?;
        let src_list: Vec<NodeId> = self.src.list(src_owner, field).to_vec();
        let mut leftovers = self.dst.list_take(dst_owner, field);
        for s in src_list {
            let d = self.mapped(s)?;
            leftovers.retain(|&x| x != d);
            self.dst.list_push(dst_owner, field, d);
        }
        for extra in leftovers {
            self.dst.list_push(dst_owner, field, extra);
        }
        Ok(())
    }

    /// Sensitivity entries never keep casts: strip them down to the
    /// plain signal references.
    fn remove_list_casts(&mut self, src_owner: NodeId, field: &str) -> Result<(), SemanticError> {
        let dst_owner = self.mapped(src_owner)?;
        let src_list: Vec<NodeId> = self.src.list(src_owner, field).to_vec();
        let dst_list: Vec<NodeId> = self.dst.list(dst_owner, field).to_vec();
        if src_list.len() != dst_list.len() {
            return Err(SemanticError::structure("sensitivity lists diverged"));
        }
        for (s, d) in src_list.into_iter().zip(dst_list) {
            if self.dst.kind(d) != NodeKind::Cast {
                continue;
            }
            let stripped = skip_casts(&self.dst, d);
            let copy = self.dst.copy(stripped);
            self.dst.replace(d, Some(copy));
            self.tree_map.insert(s, d);
            self.map_delete_tree(s, Some(copy));
            self.tree_map.insert(s, copy);
        }
        Ok(())
    }

    fn is_top(&self, o: NodeId) -> bool {
        match self.src.parent(o) {
            Some(p) => {
                !matches!(self.src.kind(p), NodeKind::Slice | NodeKind::Member | NodeKind::Cast)
            }
            None => true,
        }
    }

    // ------------------------------------------------------------------
    // Argument sorting against source declarations
    // ------------------------------------------------------------------

    fn sort_kind_for(&mut self, decl: Option<NodeId>) -> SortMissing {
        match decl {
            Some(d) if self.is_part_of_standard(d) => SortMissing::Nothing,
            _ => self.dst_sem.options().sort_missing,
        }
    }

    fn is_part_of_standard(&self, decl: NodeId) -> bool {
        let mut cur = Some(decl);
        while let Some(n) = cur {
            if self.src.kind(n) == NodeKind::LibraryDef && self.src.is_standard(n) {
                return true;
            }
            cur = self.src.parent(n);
        }
        false
    }

    fn sort_call_arguments(&mut self, call: NodeId) -> Result<(), SemanticError> {
        let Some(decl) = declaration_of(self.src, call, self.src_sem, &mut self.src_ctx) else {
            return Ok(());
        };
        let kind = self.sort_kind_for(Some(decl));
        sort_parameters(self.src, call, f::PARAMETERASSIGNS, decl, f::PARAMETERS, true, kind);
        sort_parameters(
            self.src,
            call,
            f::TEMPLATEPARAMETERASSIGNS,
            decl,
            f::TEMPLATEPARAMETERS,
            true,
            kind,
        );
        Ok(())
    }

    fn sort_instance_ports(&mut self, inst: NodeId) -> Result<(), SemanticError> {
        let decl = declaration_of(self.src, inst, self.src_sem, &mut self.src_ctx);
        let Some(view) = decl else {
            if !self.src.list(inst, f::PORTASSIGNS).is_empty()
                && self
                    .src
                    .slot(inst, f::REFERENCEDTYPE)
                    .map(|rt| self.src.kind(rt) == NodeKind::ViewReference)
                    .unwrap_or(false)
            {
                return Err(SemanticError::UnresolvedSymbol(
                    self.src.name(inst).unwrap_or_default().to_string(),
                ));
            }
            return Ok(());
        };
        if self.src.kind(view) == NodeKind::View {
            if let Some(entity) = self.src.slot(view, f::ENTITY) {
                sort_parameters(
                    self.src,
                    inst,
                    f::PORTASSIGNS,
                    entity,
                    f::PORTS,
                    true,
                    SortMissing::Nothing,
                );
            }
        }
        Ok(())
    }

    fn sort_typeref_arguments(&mut self, tr: NodeId) -> Result<(), SemanticError> {
        let Some(decl) = declaration_of(self.src, tr, self.src_sem, &mut self.src_ctx) else {
            return Ok(());
        };
        if self.src.kind(decl) != NodeKind::TypeDef {
            return Ok(());
        }
        let kind = self.sort_kind_for(Some(decl));
        sort_parameters(
            self.src,
            tr,
            f::TEMPLATEPARAMETERASSIGNS,
            decl,
            f::TEMPLATEPARAMETERS,
            true,
            kind,
        );
        Ok(())
    }

    fn sort_viewref_arguments(&mut self, vr: NodeId) -> Result<(), SemanticError> {
        let Some(decl) = declaration_of(self.src, vr, self.src_sem, &mut self.src_ctx) else {
            return Err(SemanticError::UnresolvedSymbol(
                self.src.name(vr).unwrap_or_default().to_string(),
            ));
        };
        let kind = self.sort_kind_for(Some(decl));
        sort_parameters(
            self.src,
            vr,
            f::TEMPLATEPARAMETERASSIGNS,
            decl,
            f::TEMPLATEPARAMETERS,
            true,
            kind,
        );
        Ok(())
    }
}

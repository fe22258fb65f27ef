//! The cast manager: last pass of standardization.
//!
//! Every cast the engine produced is re-expressed through the
//! destination semantics (`explicit_cast`); conditions that ended up as
//! non-idiomatic boolean casts are rewritten through the source
//! semantics' explicit boolean conversion (e.g. `if (bool(x))` becomes
//! `if (x != 0)`).

use tracing::debug;

use crate::ir::{EqualsOptions, NodeId, NodeKind, Tree, f};
use crate::semantics::typing::{TypeContext, semantic_type, type_is_logic};
use crate::semantics::{SemanticError, Semantics};
use crate::visit::{GuideVisitor, VisitResult, guide_children, guide_visit};

use super::CastMap;

struct ManageCasts<'a> {
    src_sem: &'a dyn Semantics,
    dst_sem: &'a dyn Semantics,
    cast_map: &'a mut CastMap,
    ctx: TypeContext,
}

impl ManageCasts<'_> {
    /// Replace a `cast<Bool>(x)` condition with the source semantics'
    /// boolean conversion when the cast target is not the destination's
    /// mapped boolean (and the context is not a logic ternary).
    fn fix_condition(&mut self, tree: &mut Tree, cond: NodeId) -> Result<(), SemanticError> {
        if tree.kind(cond) == NodeKind::Range {
            return Ok(());
        }
        let cond_type = semantic_type(tree, cond, self.dst_sem, &mut self.ctx)?;
        if tree.kind(cond) != NodeKind::Cast {
            return Ok(());
        }

        if tree.kind(cond_type) == NodeKind::Bit && type_is_logic(tree, cond_type) {
            // Bit-logic ternary conditions stay as they are.
            if let Some(alt) = tree.parent(cond) {
                if tree.kind(alt) == NodeKind::WhenAlt {
                    if let Some(when) = tree.parent(alt) {
                        if matches!(
                            tree.attrs(when),
                            crate::ir::Attrs::When { logic_ternary: true }
                        ) {
                            return Ok(());
                        }
                    }
                }
            }
        }

        let bool_ty = tree.add(NodeKind::Bool);
        let mapped_bool = self
            .dst_sem
            .map_type(tree, bool_ty)
            .ok_or_else(|| SemanticError::structure("destination semantics cannot map Bool"))?;
        let cast_target = tree
            .slot(cond, f::TYPE)
            .ok_or_else(|| SemanticError::structure("cast without target type"))?;
        let opts =
            EqualsOptions { check_spans: false, check_constexpr: false, ..Default::default() };
        let is_idiomatic = tree.equals(cast_target, mapped_bool, &opts);
        tree.delete(mapped_bool);
        tree.delete(bool_ty);
        if is_idiomatic {
            return Ok(());
        }

        let inner = tree
            .set_slot(cond, f::VALUE, None)
            .ok_or_else(|| SemanticError::structure("cast without value"))?;
        let new_cond = self
            .src_sem
            .explicit_bool_conversion(tree, inner)
            .ok_or_else(|| SemanticError::CastNotManaged(format!("condition {cond}")))?;
        tree.replace(cond, Some(new_cond));
        tree.delete(cond);
        self.ctx.flush_types();
        Ok(())
    }

    fn fix_condition_of(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), SemanticError> {
        if let Some(cond) = tree.slot(id, f::CONDITION) {
            self.fix_condition(tree, cond)?;
        }
        Ok(())
    }
}

impl GuideVisitor for ManageCasts<'_> {
    fn visit_if_alt(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        let rv = guide_children(self, tree, id)?;
        self.fix_condition_of(tree, id)?;
        Ok(rv)
    }

    fn visit_if_generate(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        let rv = guide_children(self, tree, id)?;
        self.fix_condition_of(tree, id)?;
        Ok(rv)
    }

    fn visit_for(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        let rv = guide_children(self, tree, id)?;
        self.fix_condition_of(tree, id)?;
        Ok(rv)
    }

    fn visit_for_generate(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        let rv = guide_children(self, tree, id)?;
        self.fix_condition_of(tree, id)?;
        Ok(rv)
    }

    fn visit_when_alt(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        let rv = guide_children(self, tree, id)?;
        self.fix_condition_of(tree, id)?;
        Ok(rv)
    }

    fn visit_cast(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        let rv = guide_children(self, tree, id)?;

        let value = tree
            .set_slot(id, f::VALUE, None)
            .ok_or_else(|| SemanticError::structure("cast without value"))?;
        let target = tree
            .slot(id, f::TYPE)
            .ok_or_else(|| SemanticError::structure("cast without target type"))?;
        let source = self.cast_map.get(&id).copied();
        let replacement = self
            .dst_sem
            .explicit_cast(tree, value, target, source)
            .ok_or_else(|| SemanticError::CastNotManaged(id.to_string()))?;
        if replacement != id {
            tree.replace(id, Some(replacement));
            tree.delete(id);
            self.cast_map.remove(&id);
        }
        self.ctx.flush_types();
        Ok(rv)
    }
}

/// Re-express every cast and condition of the standardized tree in the
/// destination's idiomatic form.
pub fn manage_casts(
    tree: &mut Tree,
    root: NodeId,
    src_sem: &dyn Semantics,
    dst_sem: &dyn Semantics,
    cast_map: &mut CastMap,
) -> Result<(), SemanticError> {
    let _span = tracing::info_span!("manage_casts").entered();
    debug!(casts = cast_map.len(), "explicit cast rewriting");

    // Semantic types computed during standardization may describe
    // pre-rewrite shapes; recompute from scratch.
    let mut pass = ManageCasts { src_sem, dst_sem, cast_map, ctx: TypeContext::new() };
    guide_visit(&mut pass, tree, root)?;
    Ok(())
}

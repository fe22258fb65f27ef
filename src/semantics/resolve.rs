//! Declaration resolution and reference maps.
//!
//! Symbols (identifiers, calls, type references, referenced assigns)
//! resolve to declarations by walking enclosing scopes. Resolutions are
//! cached per pass in the [`TypeContext`](super::typing::TypeContext);
//! passes that move or rename declarations flush the cache.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::ir::{Name, NodeId, NodeKind, Tree, f};

use super::Semantics;
use super::typing::{self, TypeContext};

/// Cache of symbol -> declaration resolutions.
pub type DeclCache = FxHashMap<NodeId, NodeId>;

/// What category of declaration a lookup wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Want {
    Data,
    Function,
    Procedure,
    TypeLike,
}

/// Resolve the declaration a symbol refers to.
pub fn declaration_of(
    tree: &mut Tree,
    sym: NodeId,
    sem: &dyn Semantics,
    ctx: &mut TypeContext,
) -> Option<NodeId> {
    if let Some(&d) = ctx.decls.get(&sym) {
        if tree.is_alive(d) {
            return Some(d);
        }
        ctx.decls.remove(&sym);
    }
    let decl = resolve(tree, sym, sem, ctx)?;
    ctx.decls.insert(sym, decl);
    Some(decl)
}

/// Pre-seed a resolution (used when a pass builds both sides itself).
pub fn set_declaration(ctx: &mut TypeContext, sym: NodeId, decl: NodeId) {
    ctx.decls.insert(sym, decl);
}

fn resolve(
    tree: &mut Tree,
    sym: NodeId,
    sem: &dyn Semantics,
    ctx: &mut TypeContext,
) -> Option<NodeId> {
    match tree.kind(sym) {
        NodeKind::Identifier => {
            let name = tree.name_of(sym);
            scope_lookup(tree, sym, &name, Want::Data)
        }
        NodeKind::FunctionCall => {
            let name = tree.name_of(sym);
            if let Some(lib) = call_prefix_library(tree, sym) {
                return member_lookup(tree, lib, &name, Want::Function);
            }
            scope_lookup(tree, sym, &name, Want::Function)
        }
        NodeKind::ProcedureCall => {
            let name = tree.name_of(sym);
            if let Some(lib) = call_prefix_library(tree, sym) {
                return member_lookup(tree, lib, &name, Want::Procedure);
            }
            scope_lookup(tree, sym, &name, Want::Procedure)
        }
        NodeKind::TypeReference => {
            let name = tree.name_of(sym);
            if let Some(lib) = tr_prefix_library(tree, sym) {
                return member_lookup(tree, lib, &name, Want::TypeLike);
            }
            scope_lookup(tree, sym, &name, Want::TypeLike)
        }
        NodeKind::ViewReference => {
            let (view, du_name) = match tree.attrs(sym) {
                crate::ir::Attrs::ViewReference { name, design_unit } => {
                    (name.clone(), design_unit.clone())
                }
                _ => return None,
            };
            let root = top_of(tree, sym);
            let du = find_design_unit(tree, root, &du_name)?;
            let views: Vec<NodeId> = tree.list(du, f::VIEWS).to_vec();
            views
                .iter()
                .copied()
                .find(|&v| tree.name(v).as_deref() == Some(view.as_str()))
                .or_else(|| views.first().copied())
        }
        NodeKind::Library => {
            let name = tree.name_of(sym);
            let root = top_of(tree, sym);
            find_library_def(tree, root, &name)
        }
        NodeKind::Instance => {
            let rt = tree.slot(sym, f::REFERENCEDTYPE)?;
            match tree.kind(rt) {
                NodeKind::ViewReference | NodeKind::TypeReference | NodeKind::Library => {
                    declaration_of(tree, rt, sem, ctx)
                }
                _ => None,
            }
        }
        NodeKind::FieldReference => {
            let name = tree.name_of(sym);
            let prefix = tree.slot(sym, f::PREFIX)?;
            // Prefix naming a library: scoped access AA::bb.
            if let Some(lib) = prefix_library(tree, prefix, sem, ctx) {
                return member_lookup(tree, lib, &name, Want::Data)
                    .or_else(|| member_lookup(tree, lib, &name, Want::Function))
                    .or_else(|| member_lookup(tree, lib, &name, Want::TypeLike));
            }
            // Otherwise a record field access.
            let pt = typing::semantic_type(tree, prefix, sem, ctx).ok()?;
            let base = typing::base_type(tree, pt, sem, ctx).ok()?;
            if tree.kind(base) == NodeKind::Record {
                let fields: Vec<NodeId> = tree.list(base, f::FIELDS).to_vec();
                return fields
                    .into_iter()
                    .find(|&fld| tree.name(fld).as_deref() == Some(name.as_str()));
            }
            None
        }
        NodeKind::ParameterAssign => {
            let name = tree.name_of(sym);
            let call = tree.parent(sym)?;
            let callee = declaration_of(tree, call, sem, ctx)?;
            list_by_name(tree, callee, f::PARAMETERS, &name)
        }
        NodeKind::PortAssign => {
            let name = tree.name_of(sym);
            let inst = tree.parent(sym)?;
            let view = declaration_of(tree, inst, sem, ctx)?;
            let entity = tree.slot(view, f::ENTITY)?;
            list_by_name(tree, entity, f::PORTS, &name)
        }
        NodeKind::TypeTPAssign | NodeKind::ValueTPAssign => {
            let name = tree.name_of(sym);
            let owner = tree.parent(sym)?;
            let decl = declaration_of(tree, owner, sem, ctx)?;
            if tree.has_field(decl, f::TEMPLATEPARAMETERS) {
                list_by_name(tree, decl, f::TEMPLATEPARAMETERS, &name)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn call_prefix_library(tree: &Tree, call: NodeId) -> Option<NodeId> {
    let inst = tree.slot(call, f::INSTANCE)?;
    instance_library(tree, inst)
}

fn tr_prefix_library(tree: &Tree, tr: NodeId) -> Option<NodeId> {
    let inst = tree.slot(tr, f::INSTANCE)?;
    instance_library(tree, inst)
}

/// If a prefix value designates a library, the LibraryDef it names.
fn prefix_library(
    tree: &mut Tree,
    prefix: NodeId,
    _sem: &dyn Semantics,
    _ctx: &mut TypeContext,
) -> Option<NodeId> {
    instance_library(tree, prefix)
}

fn instance_library(tree: &Tree, node: NodeId) -> Option<NodeId> {
    let lib = match tree.kind(node) {
        NodeKind::Library => node,
        NodeKind::Instance => {
            let rt = tree.slot(node, f::REFERENCEDTYPE)?;
            if tree.kind(rt) == NodeKind::Library { rt } else { return None }
        }
        _ => return None,
    };
    let name = tree.name(lib)?;
    let root = top_of(tree, node);
    find_library_def(tree, root, &name)
}

fn top_of(tree: &Tree, id: NodeId) -> NodeId {
    let mut cur = id;
    while let Some(p) = tree.parent(cur) {
        cur = p;
    }
    cur
}

fn find_library_def(tree: &Tree, root: NodeId, name: &str) -> Option<NodeId> {
    if tree.kind(root) != NodeKind::System {
        return None;
    }
    tree.list(root, f::LIBRARYDEFS)
        .iter()
        .copied()
        .find(|&ld| tree.name(ld).as_deref() == Some(name))
}

fn find_design_unit(tree: &Tree, root: NodeId, name: &str) -> Option<NodeId> {
    if tree.kind(root) != NodeKind::System {
        return None;
    }
    tree.list(root, f::DESIGNUNITS)
        .iter()
        .copied()
        .find(|&du| tree.name(du).as_deref() == Some(name))
        .or_else(|| {
            // Design units may also live inside standard libraries.
            tree.list(root, f::LIBRARYDEFS).iter().copied().find_map(|ld| {
                tree.list(ld, f::DECLARATIONS)
                    .iter()
                    .copied()
                    .find(|&d| {
                        tree.kind(d) == NodeKind::DesignUnit
                            && tree.name(d).as_deref() == Some(name)
                    })
            })
        })
}

/// Lookup of a named declaration inside a library definition.
fn member_lookup(tree: &Tree, libdef: NodeId, name: &str, want: Want) -> Option<NodeId> {
    for &d in tree.list(libdef, f::DECLARATIONS) {
        let dk = tree.kind(d);
        if wants(dk, want) && tree.name(d).as_deref() == Some(name) {
            return Some(d);
        }
        if want == Want::Data && dk == NodeKind::TypeDef {
            if let Some(en) = tree.slot(d, f::TYPE) {
                if tree.kind(en) == NodeKind::Enum {
                    if let Some(ev) = list_by_name(tree, en, f::VALUES, name) {
                        return Some(ev);
                    }
                }
            }
        }
    }
    None
}

fn list_by_name(tree: &Tree, owner: NodeId, field: &str, name: &str) -> Option<NodeId> {
    if !tree.has_field(owner, field) {
        return None;
    }
    tree.list(owner, field).iter().copied().find(|&d| tree.name(d).as_deref() == Some(name))
}

fn wants(kind: NodeKind, want: Want) -> bool {
    match want {
        Want::Data => kind.is_data_declaration(),
        Want::Function => kind == NodeKind::Function,
        Want::Procedure => kind == NodeKind::Procedure,
        Want::TypeLike => kind.is_type_declaration(),
    }
}

/// Walk enclosing scopes from the symbol outwards, scanning each scope's
/// declaration-bearing lists. At the root System the standard libraries
/// are searched last.
fn scope_lookup(tree: &Tree, from: NodeId, name: &str, want: Want) -> Option<NodeId> {
    let mut cur = tree.parent(from);
    let mut last = from;
    while let Some(scope) = cur {
        if let Some(d) = scan_scope(tree, scope, name, want) {
            return Some(d);
        }
        last = scope;
        cur = tree.parent(scope);
    }
    // Root reached: search library defs.
    if tree.kind(last) == NodeKind::System {
        for &ld in tree.list(last, f::LIBRARYDEFS) {
            if let Some(d) = scan_scope(tree, ld, name, want) {
                return Some(d);
            }
        }
    }
    None
}

fn scan_scope(tree: &Tree, scope: NodeId, name: &str, want: Want) -> Option<NodeId> {
    let kind = tree.kind(scope);
    if !kind.is_scope() && kind != NodeKind::For {
        return None;
    }
    for fd in tree.fields(scope) {
        if !fd.list {
            continue;
        }
        for &d in tree.list(scope, fd.name) {
            let dk = tree.kind(d);
            if wants(dk, want) && tree.name(d).as_deref() == Some(name) {
                return Some(d);
            }
            // Enum values surface through their wrapping typedef.
            if want == Want::Data && dk == NodeKind::TypeDef {
                if let Some(en) = tree.slot(d, f::TYPE) {
                    if tree.kind(en) == NodeKind::Enum {
                        if let Some(ev) = list_by_name(tree, en, f::VALUES, name) {
                            return Some(ev);
                        }
                    }
                }
            }
        }
    }
    // A view also exposes its entity's ports and parameters.
    if kind == NodeKind::View && want == Want::Data {
        if let Some(entity) = tree.slot(scope, f::ENTITY) {
            if let Some(d) = list_by_name(tree, entity, f::PORTS, name) {
                return Some(d);
            }
            if let Some(d) = list_by_name(tree, entity, f::PARAMETERS, name) {
                return Some(d);
            }
        }
    }
    None
}

// ----------------------------------------------------------------------
// Reference maps
// ----------------------------------------------------------------------

/// All symbol nodes inside the subtree rooted at `root`.
pub fn collect_symbols(tree: &Tree, root: NodeId) -> Vec<NodeId> {
    tree.descendants(root)
        .into_iter()
        .filter(|&id| tree.is_alive(id) && tree.kind(id).is_symbol())
        .collect()
}

/// Map from each declaration to the symbols resolving to it.
///
/// Declarations inside the subtree appear even when unreferenced, so
/// renaming passes can iterate every declaration deterministically.
pub fn all_references(
    tree: &mut Tree,
    root: NodeId,
    sem: &dyn Semantics,
    ctx: &mut TypeContext,
) -> IndexMap<NodeId, Vec<NodeId>> {
    let mut map: IndexMap<NodeId, Vec<NodeId>> = IndexMap::new();
    for id in tree.descendants(root) {
        if tree.is_alive(id) && tree.kind(id).is_declaration() {
            map.entry(id).or_default();
        }
    }
    for sym in collect_symbols(tree, root) {
        if let Some(decl) = declaration_of(tree, sym, sem, ctx) {
            map.entry(decl).or_default().push(sym);
        }
    }
    map
}

/// The symbols under `scope` (or anywhere when `scope` is `None`) that
/// resolve to `decl`.
pub fn references_to(
    tree: &mut Tree,
    decl: NodeId,
    root: NodeId,
    scope: Option<NodeId>,
    sem: &dyn Semantics,
    ctx: &mut TypeContext,
) -> Vec<NodeId> {
    let walk_root = scope.unwrap_or(root);
    collect_symbols(tree, walk_root)
        .into_iter()
        .filter(|&sym| declaration_of(tree, sym, sem, ctx) == Some(decl))
        .collect()
}

/// A symbol's name, looked through the kinds that carry one.
pub fn symbol_name(tree: &Tree, sym: NodeId) -> Option<Name> {
    tree.name(sym)
}

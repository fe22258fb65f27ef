//! Standard-symbol mapping.
//!
//! After structural standardization, every symbol that resolves into a
//! known standard library is retargeted through the destination
//! semantics' symbol table: renamed in place, replaced by the bundled
//! destination library, simplified into an equivalent IR fragment, or
//! left untouched. Include lines are retargeted and deduplicated into
//! the nearest enclosing scope.

use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::ir::{Attrs, Name, NodeId, NodeKind, Trash, Tree, f};
use crate::semantics::resolve::{self, declaration_of};
use crate::semantics::typing::{TypeContext, semantic_type};
use crate::semantics::{SemanticError, Semantics, SymbolKey, SymbolMapping};

/// Map the standard-library symbols of a standardized tree into the
/// destination semantics.
pub fn map_standard_symbols(
    tree: &mut Tree,
    root: NodeId,
    src_sem: &dyn Semantics,
    dst_sem: &dyn Semantics,
) -> Result<(), SemanticError> {
    let _span = tracing::info_span!("map_symbols").entered();

    let system = if tree.kind(root) == NodeKind::System {
        root
    } else {
        tree.nearest_parent_of_kind(root, NodeKind::System)
            .ok_or_else(|| SemanticError::structure("tree has no System root"))?
    };

    let mut mapper = SymbolMapper {
        tree,
        system,
        src_sem,
        dst_sem,
        ctx: TypeContext::new(),
        references: FxHashMap::default(),
        to_map: FxHashSet::default(),
        to_check: Vec::new(),
        checked: FxHashSet::default(),
        old_names: FxHashMap::default(),
        trash: Trash::new(),
    };

    mapper.collect_references(root)?;
    mapper.fix_standard_libraries()?;
    mapper.fix_symbols()?;

    let SymbolMapper { tree, mut trash, mut ctx, .. } = mapper;
    trash.clear(tree);
    // Renames and grafts invalidated everything cached.
    ctx.flush();
    Ok(())
}

struct SymbolMapper<'a> {
    tree: &'a mut Tree,
    system: NodeId,
    src_sem: &'a dyn Semantics,
    dst_sem: &'a dyn Semantics,
    ctx: TypeContext,
    references: FxHashMap<NodeId, Vec<NodeId>>,
    /// Declarations living in mapped standard libraries.
    to_map: FxHashSet<NodeId>,
    /// Symbols that may need mapping (grows while grafting).
    to_check: Vec<NodeId>,
    checked: FxHashSet<NodeId>,
    old_names: FxHashMap<NodeId, Name>,
    trash: Trash,
}

impl SymbolMapper<'_> {
    fn collect_references(&mut self, root: NodeId) -> Result<(), SemanticError> {
        let map = resolve::all_references(self.tree, root, self.dst_sem, &mut self.ctx);
        for (decl, syms) in map {
            self.references.insert(decl, syms);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Step 2: the libraries themselves
    // ------------------------------------------------------------------

    fn fix_standard_libraries(&mut self) -> Result<(), SemanticError> {
        let libdefs: Vec<NodeId> = self.tree.list(self.system, f::LIBRARYDEFS).to_vec();
        for ld in libdefs {
            if !self.tree.is_standard(ld) {
                continue;
            }
            let name = self.tree.name_of(ld);
            match self.src_sem.standard_library(self.tree, &name) {
                // The probe only establishes that the source knows this
                // library; its fresh copy is not needed.
                Some(probe) => self.tree.delete(probe),
                None => continue,
            }
            self.collect_inner_declarations(ld);
            self.fix_standard_library(ld)?;
        }
        Ok(())
    }

    fn collect_inner_declarations(&mut self, container: NodeId) {
        let decls: Vec<NodeId> = self.tree.list(container, f::DECLARATIONS).to_vec();
        for d in decls {
            match self.tree.kind(d) {
                NodeKind::TypeDef => {
                    if let Some(en) = self.tree.slot(d, f::TYPE) {
                        if self.tree.kind(en) == NodeKind::Enum {
                            for ev in self.tree.list(en, f::VALUES).to_vec() {
                                self.mark_declaration(ev);
                            }
                        }
                    }
                }
                NodeKind::DesignUnit => {
                    for v in self.tree.list(d, f::VIEWS).to_vec() {
                        self.mark_declaration(v);
                    }
                }
                _ => {}
            }
            self.mark_declaration(d);
        }
    }

    fn mark_declaration(&mut self, decl: NodeId) {
        self.to_map.insert(decl);
        if let Some(refs) = self.references.get(&decl) {
            self.to_check.extend(refs.iter().copied());
        }
    }

    fn fix_standard_library(&mut self, decl: NodeId) -> Result<(), SemanticError> {
        let lib_name = self.tree.name_of(decl);
        let key: SymbolKey = (lib_name.clone(), lib_name.clone());
        let mapping = self.dst_sem.map_standard_symbol(self.tree, decl, &key, self.src_sem);
        let (keep, mapped_name, libraries) = match mapping {
            SymbolMapping::Unknown => {
                return Err(SemanticError::structure(format!(
                    "standard library {lib_name} has no known mapping"
                )));
            }
            SymbolMapping::Unsupported => {
                return Err(SemanticError::UnsupportedSymbol(lib_name.to_string()));
            }
            SymbolMapping::Simplified { .. } => return Ok(()),
            SymbolMapping::Map { keep, name, libraries } => (keep, name, libraries),
        };

        // Pull in the destination's bundled implementations.
        for lib in &libraries {
            if let Some(bundled) = self.dst_sem.standard_library(self.tree, lib) {
                let already = self
                    .tree
                    .list(self.system, f::LIBRARYDEFS)
                    .iter()
                    .any(|&l| self.tree.name(l).as_deref() == Some(lib.as_str()));
                if already {
                    self.tree.delete(bundled);
                } else {
                    self.tree.list_insert(self.system, f::LIBRARYDEFS, 0, bundled);
                }
            }
        }

        self.old_names.insert(decl, lib_name.clone());
        if keep {
            self.tree.set_name(decl, mapped_name.clone());
        } else {
            self.trash_with_symbols(decl);
        }

        // Retarget every reference; include lines pointing at bundled
        // libraries disappear (fresh ones are added next to the symbols
        // that need them).
        let refs = self.references.get(&decl).cloned().unwrap_or_default();
        for r in refs {
            if self.tree.attrs(r).name().is_some() {
                self.tree.set_name(r, mapped_name.clone());
            }
            if self.tree.kind(r) != NodeKind::Library || !self.tree.is_in_list(r) {
                continue;
            }
            let Some(parent) = self.tree.parent(r) else { continue };
            if self.tree.field_of(parent, r) != Some(f::LIBRARIES) {
                continue;
            }
            if self.tree.kind(parent) == NodeKind::LibraryDef && self.tree.is_standard(parent) {
                continue;
            }
            let preserved = match self.tree.attrs(r) {
                Attrs::Library { standard, filename, .. } => *standard || !filename.is_empty(),
                _ => false,
            };
            if preserved {
                continue;
            }
            self.tree.detach(r);
            self.trash_with_symbols(r);
        }
        Ok(())
    }

    /// Trash a subtree, marking its inner symbols as already handled.
    fn trash_with_symbols(&mut self, node: NodeId) {
        for sym in resolve::collect_symbols(self.tree, node) {
            self.checked.insert(sym);
        }
        self.trash.throw(node);
    }

    // ------------------------------------------------------------------
    // Step 3: the symbols
    // ------------------------------------------------------------------

    fn fix_symbols(&mut self) -> Result<(), SemanticError> {
        let mut i = 0;
        while i < self.to_check.len() {
            let sym = self.to_check[i];
            i += 1;
            if self.tree.kind(sym) == NodeKind::Instance {
                continue;
            }
            if !self.tree.is_alive(sym) || !self.checked.insert(sym) {
                continue;
            }
            let Some(decl) = declaration_of(self.tree, sym, self.dst_sem, &mut self.ctx)
            else {
                continue;
            };
            if !self.to_map.contains(&decl) {
                continue;
            }
            self.map_symbol(sym, decl)?;
        }
        Ok(())
    }

    fn map_symbol(&mut self, sym: NodeId, decl: NodeId) -> Result<(), SemanticError> {
        match self.tree.kind(decl) {
            NodeKind::EnumValue => self.map_enum_value(sym, decl),
            NodeKind::View => {
                let du = self
                    .tree
                    .parent(decl)
                    .ok_or_else(|| SemanticError::structure("view without design unit"))?;
                self.map_design_unit(sym, du)
            }
            _ => self.map_declaration(sym, decl),
        }
    }

    fn key_for(&self, decl: NodeId) -> Result<SymbolKey, SemanticError> {
        let ld = self
            .tree
            .nearest_parent_of_kind(decl, NodeKind::LibraryDef)
            .ok_or_else(|| SemanticError::structure("standard declaration outside a library"))?;
        let std_name = self
            .old_names
            .get(&ld)
            .cloned()
            .unwrap_or_else(|| self.tree.name_of(ld));
        let decl_name =
            self.old_names.get(&decl).cloned().unwrap_or_else(|| self.tree.name_of(decl));
        Ok((std_name, decl_name))
    }

    fn map_enum_value(&mut self, sym: NodeId, decl: NodeId) -> Result<(), SemanticError> {
        let key = self.key_for(decl)?;
        let mapping = self.dst_sem.map_standard_symbol(self.tree, decl, &key, self.src_sem);
        let (keep, name, libraries) = match mapping {
            SymbolMapping::Unknown | SymbolMapping::Simplified { .. } => return Ok(()),
            SymbolMapping::Unsupported => {
                return Err(SemanticError::UnsupportedSymbol(key.1.to_string()));
            }
            SymbolMapping::Map { keep, name, libraries } => (keep, name, libraries),
        };
        if self.tree.attrs(sym).name().is_some() {
            self.tree.set_name(sym, name.clone());
        }
        self.map_prefix(sym, &libraries);
        if keep {
            self.old_names.entry(decl).or_insert_with(|| self.tree.name_of(decl));
            self.tree.set_name(decl, name);
        } else {
            self.trash_with_symbols(decl);
        }
        Ok(())
    }

    fn map_design_unit(&mut self, sym: NodeId, du: NodeId) -> Result<(), SemanticError> {
        let key = self.key_for(du)?;
        let mapping = self.dst_sem.map_standard_symbol(self.tree, du, &key, self.src_sem);
        let (action_keep, name, libraries) = match mapping {
            SymbolMapping::Unknown => (None, key.1.clone(), vec![key.0.clone()]),
            SymbolMapping::Unsupported => {
                return Err(SemanticError::UnsupportedSymbol(key.1.to_string()));
            }
            SymbolMapping::Simplified { .. } => {
                return Err(SemanticError::structure(
                    "design units cannot be simplified away",
                ));
            }
            SymbolMapping::Map { keep, name, libraries } => (Some(keep), name, libraries),
        };

        if let Attrs::ViewReference { design_unit, .. } = self.tree.attrs_mut(sym) {
            *design_unit = name.clone();
        } else if self.tree.attrs(sym).name().is_some() {
            self.tree.set_name(sym, name.clone());
        }
        self.map_prefix(sym, &libraries);
        let include_scope = self.include_scope_of(sym);
        self.add_includes(include_scope, &libraries);

        match action_keep {
            Some(true) => {
                self.old_names.entry(du).or_insert_with(|| self.tree.name_of(du));
                self.tree.set_name(du, name);
            }
            Some(false) => self.trash_with_symbols(du),
            None => {}
        }
        Ok(())
    }

    fn map_declaration(&mut self, sym: NodeId, decl: NodeId) -> Result<(), SemanticError> {
        let key = self.key_for(decl)?;
        let mapping = self.dst_sem.map_standard_symbol(self.tree, decl, &key, self.src_sem);
        let (action_keep, name, libraries, simplified) = match mapping {
            SymbolMapping::Unknown => (None, key.1.clone(), vec![key.0.clone()], false),
            SymbolMapping::Unsupported => {
                return Err(SemanticError::UnsupportedSymbol(key.1.to_string()));
            }
            SymbolMapping::Simplified { libraries } => {
                (None, key.1.clone(), libraries, true)
            }
            SymbolMapping::Map { keep, name, libraries } => {
                (Some(keep), name, libraries, false)
            }
        };

        // The include scope is found while the symbol is still in
        // place; a graft detaches it.
        let include_scope = self.include_scope_of(sym);
        if simplified {
            self.graft_simplified(sym, &key)?;
        } else {
            if self.tree.attrs(sym).name().is_some() {
                self.tree.set_name(sym, name.clone());
            }
            self.map_prefix(sym, &libraries);
        }
        self.add_includes(include_scope, &libraries);

        match action_keep {
            Some(true) => {
                self.old_names.entry(decl).or_insert_with(|| self.tree.name_of(decl));
                self.tree.set_name(decl, name);
            }
            Some(false) => self.trash_with_symbols(decl),
            None => {}
        }
        Ok(())
    }

    /// Replace a simplified symbol's reference with the destination's
    /// equivalent fragment, preserving the original semantic type
    /// through a cast when the fragment is a value.
    fn graft_simplified(&mut self, sym: NodeId, key: &SymbolKey) -> Result<(), SemanticError> {
        debug!(symbol = %key.1, "grafting simplified symbol");
        let replacement = self
            .dst_sem
            .simplified_symbol(self.tree, key, sym)
            .ok_or_else(|| SemanticError::UnsupportedSymbol(key.1.to_string()))?;

        if self.tree.kind(replacement).is_value() && self.tree.kind(sym).is_value() {
            let orig_ty = semantic_type(self.tree, sym, self.dst_sem, &mut self.ctx)?;
            let ty = self.tree.copy(orig_ty);
            let cast = self.tree.add(NodeKind::Cast);
            self.tree.set_slot(cast, f::TYPE, Some(ty));
            self.tree.replace(sym, Some(cast));
            self.tree.set_slot(cast, f::VALUE, Some(replacement));
            for s in resolve::collect_symbols(self.tree, cast) {
                self.to_check.push(s);
            }
        } else {
            self.tree.replace(sym, Some(replacement));
            for s in resolve::collect_symbols(self.tree, replacement) {
                self.to_check.push(s);
            }
        }
        self.trash_with_symbols(sym);
        self.ctx.flush();
        Ok(())
    }

    /// Rewrite a scoped prefix (`AA::bb`) to the first mapped library.
    fn map_prefix(&mut self, sym: NodeId, libraries: &[Name]) {
        let Some(first) = libraries.first().cloned() else { return };
        let prefix = if self.tree.has_field(sym, f::INSTANCE) {
            self.tree.slot(sym, f::INSTANCE)
        } else if self.tree.has_field(sym, f::PREFIX) {
            self.tree.slot(sym, f::PREFIX)
        } else {
            None
        };
        let Some(prefix) = prefix else { return };
        let lib = match self.tree.kind(prefix) {
            NodeKind::Library => Some(prefix),
            NodeKind::Instance => match self.tree.slot(prefix, f::REFERENCEDTYPE) {
                Some(rt) if self.tree.kind(rt) == NodeKind::Library => Some(rt),
                _ => None,
            },
            _ => None,
        };
        if let Some(lib) = lib {
            let standard = self.dst_sem.is_standard_inclusion(&first, false);
            if let Attrs::Library { name, standard: s, .. } = self.tree.attrs_mut(lib) {
                *name = first;
                *s = standard;
            }
        }
    }

    /// The nearest enclosing scope that carries includes (skipping
    /// Contents).
    fn include_scope_of(&self, sym: NodeId) -> Option<NodeId> {
        let mut scope = self.tree.nearest_parent(sym, |k| k.is_scope());
        while let Some(s) = scope {
            if self.tree.kind(s) != NodeKind::Contents && self.tree.has_field(s, f::LIBRARIES) {
                break;
            }
            scope = self.tree.nearest_parent(s, |k| k.is_scope());
        }
        scope
    }

    /// Deduplicated include insertion.
    fn add_includes(&mut self, scope: Option<NodeId>, libraries: &[Name]) {
        let Some(scope) = scope else { return };
        for lib in libraries {
            let standard = self.dst_sem.is_standard_inclusion(lib, true);
            let filename = self.dst_sem.map_standard_filename(lib);
            let inc = self.tree.add(NodeKind::Library);
            *self.tree.attrs_mut(inc) = Attrs::Library {
                name: lib.clone(),
                filename,
                standard,
                system: true,
            };
            crate::manipulation::add_unique_library(self.tree, inc, scope, f::LIBRARIES);
        }
    }
}

//! Shared fixtures: two small front-end-like semantics built on the
//! neutral rules, and design-tree builders.

use hif::base::{BitConstant, Operator, TypeVariant};
use hif::ir::{Attrs, Factory, Name, NodeId, NodeKind, Tree, f};
use hif::semantics::{
    ExprTypeInfo, HifSemantics, Semantics, SemanticsOptions, SymbolKey, SymbolMapping,
};

/// A configurable semantics for exercising cross-semantics passes: the
/// typing rules are the neutral ones, while index rebasing, vector
/// variants and the standard-symbol table vary per instance.
pub struct TestSem {
    name: &'static str,
    inner: HifSemantics,
    syntactic_rebased: bool,
    slice_rebased: bool,
    vector_variant: Option<TypeVariant>,
    serves_vhdl_std: bool,
    maps_vhdl_std: bool,
}

impl TestSem {
    /// VHDL-like: left-bound indexing, ships `hif_vhdl_standard`.
    pub fn vhdlish() -> Self {
        Self {
            name: "vhdlish",
            inner: HifSemantics::new(),
            syntactic_rebased: false,
            slice_rebased: false,
            vector_variant: None,
            serves_vhdl_std: true,
            maps_vhdl_std: false,
        }
    }

    /// SystemC-like: zero-based indexing, bitset-shaped vectors, maps
    /// the VHDL standard library onto `sc_core`.
    pub fn scish() -> Self {
        Self {
            name: "scish",
            inner: HifSemantics::new(),
            syntactic_rebased: true,
            slice_rebased: true,
            vector_variant: Some(TypeVariant::SystemCBitvectorBase),
            serves_vhdl_std: false,
            maps_vhdl_std: true,
        }
    }

    /// Verilog-like: zero-based vectors, no standard mapping.
    pub fn verilogish() -> Self {
        Self {
            name: "verilogish",
            inner: HifSemantics::new(),
            syntactic_rebased: true,
            slice_rebased: true,
            vector_variant: None,
            serves_vhdl_std: false,
            maps_vhdl_std: false,
        }
    }
}

impl Semantics for TestSem {
    fn name(&self) -> &'static str {
        self.name
    }

    fn type_for_constant(&self, tree: &mut Tree, cv: NodeId) -> Option<NodeId> {
        let ty = self.inner.type_for_constant(tree, cv)?;
        if let Some(variant) = self.vector_variant {
            if tree.kind(ty) == NodeKind::Bitvector {
                if let Some(flags) = tree.attrs_mut(ty).type_flags_mut() {
                    flags.variant = variant;
                }
            }
        }
        Some(ty)
    }

    fn map_type(&self, tree: &mut Tree, ty: NodeId) -> Option<NodeId> {
        let mapped = self.inner.map_type(tree, ty)?;
        if let Some(variant) = self.vector_variant {
            if tree.kind(mapped) == NodeKind::Bitvector {
                if let Some(flags) = tree.attrs_mut(mapped).type_flags_mut() {
                    flags.variant = variant;
                }
            }
        }
        Some(mapped)
    }

    fn expr_type(
        &self,
        tree: &mut Tree,
        t1: NodeId,
        t2: Option<NodeId>,
        op: Operator,
        context: Option<NodeId>,
    ) -> Option<ExprTypeInfo> {
        self.inner.expr_type(tree, t1, t2, op, context)
    }

    fn suggested_type_for_op(
        &self,
        tree: &mut Tree,
        precision: NodeId,
        op: Operator,
        operand: Option<NodeId>,
        context: Option<NodeId>,
        is_operand1: bool,
    ) -> Option<NodeId> {
        self.inner.suggested_type_for_op(tree, precision, op, operand, context, is_operand1)
    }

    fn check_condition(&self, tree: &Tree, ty: NodeId, context: Option<NodeId>) -> bool {
        self.inner.check_condition(tree, ty, context)
    }

    fn explicit_cast(
        &self,
        tree: &mut Tree,
        value: NodeId,
        target: NodeId,
        source: Option<NodeId>,
    ) -> Option<NodeId> {
        self.inner.explicit_cast(tree, value, target, source)
    }

    fn explicit_bool_conversion(&self, tree: &mut Tree, value: NodeId) -> Option<NodeId> {
        self.inner.explicit_bool_conversion(tree, value)
    }

    fn type_default_value(
        &self,
        tree: &mut Tree,
        ty: NodeId,
        decl: Option<NodeId>,
    ) -> Option<NodeId> {
        self.inner.type_default_value(tree, ty, decl)
    }

    fn is_type_allowed_as_port(&self, tree: &Tree, ty: NodeId) -> bool {
        self.inner.is_type_allowed_as_port(tree, ty)
    }

    fn standard_library(&self, tree: &mut Tree, name: &str) -> Option<NodeId> {
        if self.serves_vhdl_std && name == "hif_vhdl_standard" {
            return Some(build_vhdl_standard(tree));
        }
        if self.maps_vhdl_std && name == "sc_core" {
            let mut fac = Factory::new(tree);
            return Some(fac.library_def("sc_core", true));
        }
        None
    }

    fn is_standard_inclusion(&self, name: &str, _system_header: bool) -> bool {
        self.maps_vhdl_std && name == "sc_core"
    }

    fn map_standard_symbol(
        &self,
        _tree: &Tree,
        _decl: NodeId,
        key: &SymbolKey,
        _src: &dyn Semantics,
    ) -> SymbolMapping {
        if !self.maps_vhdl_std || key.0 != "hif_vhdl_standard" {
            return SymbolMapping::Unknown;
        }
        if key.1 == "hif_vhdl_standard" {
            return SymbolMapping::Map {
                keep: false,
                name: Name::from("sc_core"),
                libraries: vec![Name::from("sc_core")],
            };
        }
        if key.1 == "hif_vhdl_rising_edge" {
            return SymbolMapping::Simplified { libraries: vec![Name::from("sc_core")] };
        }
        SymbolMapping::Unknown
    }

    fn simplified_symbol(
        &self,
        tree: &mut Tree,
        key: &SymbolKey,
        src_node: NodeId,
    ) -> Option<NodeId> {
        if key.1 != "hif_vhdl_rising_edge" {
            return None;
        }
        // The destination's edge detector: `<arg> == '1'`.
        let assigns = tree.list(src_node, f::PARAMETERASSIGNS).to_vec();
        let arg = tree.slot(*assigns.first()?, f::VALUE)?;
        let arg = tree.copy(arg);
        let mut fac = Factory::new(tree);
        let one = fac.bitval(BitConstant::One);
        Some(fac.expression(arg, Operator::Eq, one))
    }

    fn map_standard_filename(&self, name: &str) -> String {
        format!("{name}.h")
    }

    fn is_syntactic_type_rebased(&self) -> bool {
        self.syntactic_rebased
    }

    fn is_slice_type_rebased(&self) -> bool {
        self.slice_rebased
    }

    fn options(&self) -> &SemanticsOptions {
        self.inner.options()
    }
}

/// The `hif_vhdl_standard` library: the edge-detection functions.
fn build_vhdl_standard(tree: &mut Tree) -> NodeId {
    let mut fac = Factory::new(tree);
    let ld = fac.library_def("hif_vhdl_standard", true);
    for fname in ["hif_vhdl_rising_edge", "hif_vhdl_falling_edge"] {
        let pt = fac.bit_type(true, false);
        let param = fac.parameter("s", pt, None);
        let rt = fac.bool_type();
        let func = fac.function(fname, rt, [param]);
        fac.tree.attrs_mut(func).set_standard(true);
        fac.tree.list_push(ld, f::DECLARATIONS, func);
    }
    ld
}

/// A System with one DesignUnit ("top", view "rtl"). Returns
/// `(system, view, contents)`.
pub fn build_design(tree: &mut Tree) -> (NodeId, NodeId, NodeId) {
    let mut fac = Factory::new(tree);
    let system = fac.system("design");
    let du = fac.design_unit("top", "rtl");
    tree.list_push(system, f::DESIGNUNITS, du);
    let view = tree.list(du, f::VIEWS)[0];
    let contents = tree.slot(view, f::CONTENTS).unwrap();
    (system, view, contents)
}

/// Navigate `system -> first design unit -> first view -> contents`.
pub fn contents_of(tree: &Tree, system: NodeId) -> NodeId {
    let du = tree.list(system, f::DESIGNUNITS)[0];
    let view = tree.list(du, f::VIEWS)[0];
    tree.slot(view, f::CONTENTS).unwrap()
}

/// All alive nodes of the given kind under `root`.
pub fn find_kind(tree: &Tree, root: NodeId, kind: NodeKind) -> Vec<NodeId> {
    tree.descendants(root)
        .into_iter()
        .filter(|&n| tree.is_alive(n) && tree.kind(n) == kind)
        .collect()
}

/// The i64 payload of an IntValue (possibly behind casts).
pub fn int_value(tree: &Tree, v: NodeId) -> Option<i64> {
    let v = hif::manipulation::skip_casts(tree, v);
    match tree.attrs(v) {
        Attrs::IntValue { value } => Some(*value),
        _ => None,
    }
}

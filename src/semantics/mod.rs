//! The language-semantics interface and its supporting machinery.
//!
//! A [`Semantics`] value encapsulates the rules of one language (or one
//! neutral reference rule set): how constants are typed, how expressions
//! type-check, which types are legal where, how standard symbols map. The
//! standardization engine is parameterized by two of these - source and
//! destination - and never hard-codes a language.

mod error;
pub mod hif;
pub mod resolve;
pub mod typing;

pub use error::SemanticError;
pub use hif::HifSemantics;

use crate::base::Operator;
use crate::ir::{Name, NodeId, Tree};

/// Result of typing an expression: the type of the whole expression and
/// the precision the operation is carried out at.
#[derive(Debug, Clone, Copy)]
pub struct ExprTypeInfo {
    pub returned: NodeId,
    pub precision: NodeId,
}

/// Policy for actual arguments missing from a referenced-assign list when
/// sorting actuals against formal declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMissing {
    /// Leave holes: bind only what is present.
    #[default]
    Nothing,
    /// Materialize every missing actual from the formal's initial value.
    All,
    /// Materialize missing actuals only up to the last bound one.
    Limited,
}

/// Tunables a semantics exposes to the passes.
#[derive(Debug, Clone, Default)]
pub struct SemanticsOptions {
    pub sort_missing: SortMissing,
}

/// Key of a standard-library symbol: `(library name, symbol name)`.
/// A library itself is keyed `(lib, lib)`.
pub type SymbolKey = (Name, Name);

/// Outcome of mapping one standard-library symbol into a destination
/// semantics.
#[derive(Debug, Clone)]
pub enum SymbolMapping {
    /// No rule: keep the symbol untouched.
    Unknown,
    /// The destination cannot express this symbol at all.
    Unsupported,
    /// The symbol disappears; `simplified_symbol` provides a replacement
    /// fragment for each reference.
    Simplified { libraries: Vec<Name> },
    /// Rename in place (`keep == true`) or drop the declaration and rely
    /// on the destination's bundled library (`keep == false`).
    Map { keep: bool, name: Name, libraries: Vec<Name> },
}

/// The rules of one language.
///
/// Methods that construct types or values allocate into the tree passed
/// to them and return detached nodes owned by the caller.
pub trait Semantics {
    /// Diagnostic name of the semantics ("hif", "vhdl", "systemc", ...).
    fn name(&self) -> &'static str;

    /// The canonical type of a literal. `None` when the literal cannot be
    /// typed under this semantics.
    fn type_for_constant(&self, tree: &mut Tree, cv: NodeId) -> Option<NodeId>;

    /// Canonicalization of a type under this semantics. Returns a fresh
    /// detached type.
    fn map_type(&self, tree: &mut Tree, ty: NodeId) -> Option<NodeId>;

    /// The typing rule: type of `t1 op t2` (or `op t1` when `t2` is
    /// `None`). `None` means the operation is not allowed.
    fn expr_type(
        &self,
        tree: &mut Tree,
        t1: NodeId,
        t2: Option<NodeId>,
        op: Operator,
        context: Option<NodeId>,
    ) -> Option<ExprTypeInfo>;

    /// Retarget an operator: given the source operand types and their
    /// mapped forms, which operator does this semantics use?
    fn map_operator(
        &self,
        op: Operator,
        _tree: &Tree,
        _t1: Option<NodeId>,
        _t2: Option<NodeId>,
        _mapped1: Option<NodeId>,
        _mapped2: Option<NodeId>,
    ) -> Operator {
        op
    }

    /// Fallback type to cast an operand to when the destination rejects
    /// the operation even after the standard cast strategies.
    fn suggested_type_for_op(
        &self,
        tree: &mut Tree,
        precision: NodeId,
        op: Operator,
        operand: Option<NodeId>,
        context: Option<NodeId>,
        is_operand1: bool,
    ) -> Option<NodeId>;

    /// Whether the type is legal in a conditional position.
    fn check_condition(&self, tree: &Tree, ty: NodeId, context: Option<NodeId>) -> bool;

    /// Re-express a cast in the idiomatic form of this semantics. `value`
    /// is detached and owned by the callee; the result is detached.
    /// `source` is the pre-mapping type recorded when the cast was
    /// created.
    fn explicit_cast(
        &self,
        tree: &mut Tree,
        value: NodeId,
        target: NodeId,
        source: Option<NodeId>,
    ) -> Option<NodeId>;

    /// Coerce a value into this semantics' boolean form (e.g. `x != 0`).
    fn explicit_bool_conversion(&self, tree: &mut Tree, value: NodeId) -> Option<NodeId>;

    /// The default (initial) value of a type.
    fn type_default_value(
        &self,
        tree: &mut Tree,
        ty: NodeId,
        decl: Option<NodeId>,
    ) -> Option<NodeId>;

    /// Whether a type may appear as a port type.
    fn is_type_allowed_as_port(&self, tree: &Tree, ty: NodeId) -> bool;

    /// `Some(replacement)` when the type is not allowed as a bound and
    /// must be replaced; `None` when it is fine.
    fn bound_type_replacement(&self, _tree: &mut Tree, _ty: NodeId) -> Option<NodeId> {
        None
    }

    /// The bundled implementation of a standard library, if this
    /// semantics ships one. The returned LibraryDef is detached.
    fn standard_library(&self, _tree: &mut Tree, _name: &str) -> Option<NodeId> {
        None
    }

    /// Whether the named library is a standard inclusion of this
    /// semantics (`system_header` distinguishes `<...>` inclusions).
    fn is_standard_inclusion(&self, _name: &str, _system_header: bool) -> bool {
        false
    }

    /// Map one standard-library symbol.
    fn map_standard_symbol(
        &self,
        _tree: &Tree,
        _decl: NodeId,
        _key: &SymbolKey,
        _src: &dyn Semantics,
    ) -> SymbolMapping {
        SymbolMapping::Unknown
    }

    /// Replacement IR fragment for a `Simplified` symbol reference.
    fn simplified_symbol(
        &self,
        _tree: &mut Tree,
        _key: &SymbolKey,
        _src_node: NodeId,
    ) -> Option<NodeId> {
        None
    }

    /// File name under which a mapped library is included.
    fn map_standard_filename(&self, name: &str) -> String {
        name.to_string()
    }

    /// Whether array/vector indices start at the type's left bound
    /// (`false`) or are rebased to zero (`true`).
    fn is_syntactic_type_rebased(&self) -> bool;

    /// Whether a slice keeps the original bounds (`false`) or rebases
    /// them (`true`).
    fn is_slice_type_rebased(&self) -> bool;

    fn options(&self) -> &SemanticsOptions;
}

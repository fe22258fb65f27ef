//! Fluent construction of common IR fragments.
//!
//! The factory wraps a `&mut Tree` and produces attached-ready nodes in a
//! single call. It covers the shapes the passes build over and over:
//! expressions, casts, literals, ranges, declarations, processes.

use crate::base::{
    BitConstant, Operator, PortDirection, ProcessFlavour, RangeDirection, TimeUnit,
};

use super::attrs::{Attrs, Name};
use super::kind::NodeKind;
use super::schema::f;
use super::tree::{NodeId, Tree};

/// Builder over a tree.
pub struct Factory<'t> {
    pub tree: &'t mut Tree,
}

impl<'t> Factory<'t> {
    pub fn new(tree: &'t mut Tree) -> Self {
        Self { tree }
    }

    // --------------------------------------------------------------
    // Values
    // --------------------------------------------------------------

    pub fn identifier(&mut self, name: impl Into<Name>) -> NodeId {
        let id = self.tree.add(NodeKind::Identifier);
        self.tree.set_name(id, name);
        id
    }

    pub fn intval(&mut self, value: i64) -> NodeId {
        let id = self.tree.add(NodeKind::IntValue);
        *self.tree.attrs_mut(id) = Attrs::IntValue { value };
        id
    }

    pub fn realval(&mut self, value: f64) -> NodeId {
        let id = self.tree.add(NodeKind::RealValue);
        *self.tree.attrs_mut(id) = Attrs::RealValue { value };
        id
    }

    pub fn boolval(&mut self, value: bool) -> NodeId {
        let id = self.tree.add(NodeKind::BoolValue);
        *self.tree.attrs_mut(id) = Attrs::BoolValue { value };
        id
    }

    pub fn bitval(&mut self, value: BitConstant) -> NodeId {
        let id = self.tree.add(NodeKind::BitValue);
        *self.tree.attrs_mut(id) = Attrs::BitValue { value };
        id
    }

    pub fn bitvectorval(&mut self, bits: impl Into<String>) -> NodeId {
        let id = self.tree.add(NodeKind::BitvectorValue);
        *self.tree.attrs_mut(id) = Attrs::BitvectorValue { value: bits.into() };
        id
    }

    pub fn stringval(&mut self, value: impl Into<String>) -> NodeId {
        let id = self.tree.add(NodeKind::StringValue);
        *self.tree.attrs_mut(id) = Attrs::StringValue { value: value.into() };
        id
    }

    pub fn charval(&mut self, value: char) -> NodeId {
        let id = self.tree.add(NodeKind::CharValue);
        *self.tree.attrs_mut(id) = Attrs::CharValue { value };
        id
    }

    pub fn timeval(&mut self, value: f64, unit: TimeUnit) -> NodeId {
        let id = self.tree.add(NodeKind::TimeValue);
        *self.tree.attrs_mut(id) = Attrs::TimeValue { value, unit };
        id
    }

    pub fn expression(&mut self, v1: NodeId, op: Operator, v2: NodeId) -> NodeId {
        let id = self.tree.add(NodeKind::Expression);
        self.tree.set_operator(id, op);
        self.tree.set_slot(id, f::VALUE1, Some(v1));
        self.tree.set_slot(id, f::VALUE2, Some(v2));
        id
    }

    pub fn unary(&mut self, op: Operator, v1: NodeId) -> NodeId {
        let id = self.tree.add(NodeKind::Expression);
        self.tree.set_operator(id, op);
        self.tree.set_slot(id, f::VALUE1, Some(v1));
        id
    }

    pub fn cast(&mut self, ty: NodeId, value: NodeId) -> NodeId {
        let id = self.tree.add(NodeKind::Cast);
        self.tree.set_slot(id, f::TYPE, Some(ty));
        self.tree.set_slot(id, f::VALUE, Some(value));
        id
    }

    pub fn member(&mut self, prefix: NodeId, index: NodeId) -> NodeId {
        let id = self.tree.add(NodeKind::Member);
        self.tree.set_slot(id, f::PREFIX, Some(prefix));
        self.tree.set_slot(id, f::INDEX, Some(index));
        id
    }

    pub fn slice(&mut self, prefix: NodeId, span: NodeId) -> NodeId {
        let id = self.tree.add(NodeKind::Slice);
        self.tree.set_slot(id, f::PREFIX, Some(prefix));
        self.tree.set_slot(id, f::SPAN, Some(span));
        id
    }

    pub fn field_reference(&mut self, prefix: NodeId, name: impl Into<Name>) -> NodeId {
        let id = self.tree.add(NodeKind::FieldReference);
        self.tree.set_name(id, name);
        self.tree.set_slot(id, f::PREFIX, Some(prefix));
        id
    }

    pub fn function_call(
        &mut self,
        name: impl Into<Name>,
        args: impl IntoIterator<Item = (Name, NodeId)>,
    ) -> NodeId {
        let id = self.tree.add(NodeKind::FunctionCall);
        self.tree.set_name(id, name);
        for (formal, actual) in args {
            let pa = self.parameter_assign(formal, actual);
            self.tree.list_push(id, f::PARAMETERASSIGNS, pa);
        }
        id
    }

    // --------------------------------------------------------------
    // Types and ranges
    // --------------------------------------------------------------

    pub fn range(&mut self, left: NodeId, direction: RangeDirection, right: NodeId) -> NodeId {
        let id = self.tree.add(NodeKind::Range);
        *self.tree.attrs_mut(id) = Attrs::Range { direction };
        self.tree.set_slot(id, f::LEFTBOUND, Some(left));
        self.tree.set_slot(id, f::RIGHTBOUND, Some(right));
        id
    }

    pub fn range_downto(&mut self, left: i64, right: i64) -> NodeId {
        let l = self.intval(left);
        let r = self.intval(right);
        self.range(l, RangeDirection::Downto, r)
    }

    pub fn range_upto(&mut self, left: i64, right: i64) -> NodeId {
        let l = self.intval(left);
        let r = self.intval(right);
        self.range(l, RangeDirection::Upto, r)
    }

    pub fn bool_type(&mut self) -> NodeId {
        self.tree.add(NodeKind::Bool)
    }

    pub fn bit_type(&mut self, logic: bool, resolved: bool) -> NodeId {
        let id = self.tree.add(NodeKind::Bit);
        if let Attrs::Bit { logic: l, resolved: r, .. } = self.tree.attrs_mut(id) {
            *l = logic;
            *r = resolved;
        }
        id
    }

    pub fn int_type(&mut self, span: Option<NodeId>, signed: bool) -> NodeId {
        let id = self.tree.add(NodeKind::Int);
        if let Attrs::Int { signed: s, .. } = self.tree.attrs_mut(id) {
            *s = signed;
        }
        self.tree.set_slot(id, f::SPAN, span);
        id
    }

    /// The canonical 64-bit signed integer type.
    pub fn int64_type(&mut self) -> NodeId {
        let span = self.range_downto(63, 0);
        self.int_type(Some(span), true)
    }

    pub fn real_type(&mut self, span: Option<NodeId>) -> NodeId {
        let id = self.tree.add(NodeKind::Real);
        self.tree.set_slot(id, f::SPAN, span);
        id
    }

    pub fn bitvector_type(&mut self, span: NodeId, logic: bool, resolved: bool) -> NodeId {
        let id = self.tree.add(NodeKind::Bitvector);
        if let Attrs::Bitvector { logic: l, resolved: r, .. } = self.tree.attrs_mut(id) {
            *l = logic;
            *r = resolved;
        }
        self.tree.set_slot(id, f::SPAN, Some(span));
        id
    }

    pub fn array_type(&mut self, span: NodeId, of: NodeId) -> NodeId {
        let id = self.tree.add(NodeKind::Array);
        self.tree.set_slot(id, f::SPAN, Some(span));
        self.tree.set_slot(id, f::TYPE, Some(of));
        id
    }

    pub fn type_reference(&mut self, name: impl Into<Name>) -> NodeId {
        let id = self.tree.add(NodeKind::TypeReference);
        self.tree.set_name(id, name);
        id
    }

    pub fn viewref(&mut self, design_unit: impl Into<Name>, view: impl Into<Name>) -> NodeId {
        let id = self.tree.add(NodeKind::ViewReference);
        *self.tree.attrs_mut(id) =
            Attrs::ViewReference { name: view.into(), design_unit: design_unit.into() };
        id
    }

    pub fn library(&mut self, name: impl Into<Name>) -> NodeId {
        let id = self.tree.add(NodeKind::Library);
        self.tree.set_name(id, name);
        id
    }

    // --------------------------------------------------------------
    // Actions
    // --------------------------------------------------------------

    pub fn assign(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        let id = self.tree.add(NodeKind::Assign);
        self.tree.set_slot(id, f::LEFTHANDSIDE, Some(lhs));
        self.tree.set_slot(id, f::RIGHTHANDSIDE, Some(rhs));
        id
    }

    pub fn if_stm(&mut self, alts: impl IntoIterator<Item = NodeId>) -> NodeId {
        let id = self.tree.add(NodeKind::If);
        for alt in alts {
            self.tree.list_push(id, f::ALTS, alt);
        }
        id
    }

    pub fn if_alt(
        &mut self,
        condition: NodeId,
        actions: impl IntoIterator<Item = NodeId>,
    ) -> NodeId {
        let id = self.tree.add(NodeKind::IfAlt);
        self.tree.set_slot(id, f::CONDITION, Some(condition));
        for a in actions {
            self.tree.list_push(id, f::ACTIONS, a);
        }
        id
    }

    pub fn return_stm(&mut self, value: Option<NodeId>) -> NodeId {
        let id = self.tree.add(NodeKind::Return);
        self.tree.set_slot(id, f::VALUE, value);
        id
    }

    // --------------------------------------------------------------
    // Declarations and scopes
    // --------------------------------------------------------------

    pub fn parameter_assign(&mut self, name: impl Into<Name>, value: NodeId) -> NodeId {
        let id = self.tree.add(NodeKind::ParameterAssign);
        self.tree.set_name(id, name);
        self.tree.set_slot(id, f::VALUE, Some(value));
        id
    }

    pub fn port_assign(&mut self, name: impl Into<Name>, value: NodeId) -> NodeId {
        let id = self.tree.add(NodeKind::PortAssign);
        self.tree.set_name(id, name);
        self.tree.set_slot(id, f::VALUE, Some(value));
        id
    }

    pub fn signal(&mut self, name: impl Into<Name>, ty: NodeId, init: Option<NodeId>) -> NodeId {
        let id = self.tree.add(NodeKind::Signal);
        self.tree.set_name(id, name);
        self.tree.set_slot(id, f::TYPE, Some(ty));
        self.tree.set_slot(id, f::VALUE, init);
        id
    }

    pub fn variable(&mut self, name: impl Into<Name>, ty: NodeId, init: Option<NodeId>) -> NodeId {
        let id = self.tree.add(NodeKind::Variable);
        self.tree.set_name(id, name);
        self.tree.set_slot(id, f::TYPE, Some(ty));
        self.tree.set_slot(id, f::VALUE, init);
        id
    }

    pub fn port(
        &mut self,
        name: impl Into<Name>,
        direction: PortDirection,
        ty: NodeId,
        init: Option<NodeId>,
    ) -> NodeId {
        let id = self.tree.add(NodeKind::Port);
        *self.tree.attrs_mut(id) = Attrs::PortLike { name: name.into(), direction };
        self.tree.set_slot(id, f::TYPE, Some(ty));
        self.tree.set_slot(id, f::VALUE, init);
        id
    }

    pub fn parameter(&mut self, name: impl Into<Name>, ty: NodeId, init: Option<NodeId>) -> NodeId {
        let id = self.tree.add(NodeKind::Parameter);
        *self.tree.attrs_mut(id) =
            Attrs::PortLike { name: name.into(), direction: PortDirection::In };
        self.tree.set_slot(id, f::TYPE, Some(ty));
        self.tree.set_slot(id, f::VALUE, init);
        id
    }

    pub fn constant(&mut self, name: impl Into<Name>, ty: NodeId, value: NodeId) -> NodeId {
        let id = self.tree.add(NodeKind::Const);
        self.tree.set_name(id, name);
        self.tree.set_slot(id, f::TYPE, Some(ty));
        self.tree.set_slot(id, f::VALUE, Some(value));
        id
    }

    /// A process: a StateTable with one State holding the given actions.
    pub fn state_table(
        &mut self,
        name: impl Into<Name>,
        flavour: ProcessFlavour,
        dont_initialize: bool,
        actions: impl IntoIterator<Item = NodeId>,
    ) -> NodeId {
        let name = name.into();
        let id = self.tree.add(NodeKind::StateTable);
        if let Attrs::StateTable { name: n, flavour: fl, dont_initialize: di, .. } =
            self.tree.attrs_mut(id)
        {
            *n = name.clone();
            *fl = flavour;
            *di = dont_initialize;
        }
        let state = self.tree.add(NodeKind::State);
        self.tree.set_name(state, name);
        for a in actions {
            self.tree.list_push(state, f::ACTIONS, a);
        }
        self.tree.list_push(id, f::STATES, state);
        id
    }

    pub fn function(
        &mut self,
        name: impl Into<Name>,
        return_type: NodeId,
        params: impl IntoIterator<Item = NodeId>,
    ) -> NodeId {
        let id = self.tree.add(NodeKind::Function);
        self.tree.set_name(id, name);
        self.tree.set_slot(id, f::TYPE, Some(return_type));
        for p in params {
            self.tree.list_push(id, f::PARAMETERS, p);
        }
        id
    }

    pub fn library_def(&mut self, name: impl Into<Name>, standard: bool) -> NodeId {
        let id = self.tree.add(NodeKind::LibraryDef);
        self.tree.set_name(id, name);
        self.tree.attrs_mut(id).set_standard(standard);
        id
    }

    pub fn system(&mut self, name: impl Into<Name>) -> NodeId {
        let id = self.tree.add(NodeKind::System);
        self.tree.set_name(id, name);
        id
    }

    /// A DesignUnit wrapping a single View with an Entity and Contents.
    pub fn design_unit(&mut self, name: impl Into<Name>, view_name: impl Into<Name>) -> NodeId {
        let du = self.tree.add(NodeKind::DesignUnit);
        self.tree.set_name(du, name);
        let view = self.tree.add(NodeKind::View);
        self.tree.set_name(view, view_name);
        let entity = self.tree.add(NodeKind::Entity);
        self.tree.set_name(entity, "entity");
        let contents = self.tree.add(NodeKind::Contents);
        self.tree.set_name(contents, "contents");
        self.tree.set_slot(view, f::ENTITY, Some(entity));
        self.tree.set_slot(view, f::CONTENTS, Some(contents));
        self.tree.list_push(du, f::VIEWS, view);
        du
    }
}

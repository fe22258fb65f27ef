//! Visitor dispatch over the closed node-kind set.
//!
//! Three visitor shapes exist, mirroring the three ways passes consume
//! trees:
//!
//! - [`Visitor`] - the flat visitor: one method per kind, default result
//!   `0`, no recursion. The visitor takes total control of traversal.
//! - [`GuideVisitor`] - recurses over all owned children in schema order,
//!   or-accumulating results, with [`GuideVisitor::before`] /
//!   [`GuideVisitor::after`] hooks; `before` returning `true` skips the
//!   subtree.
//! - [`AncestorVisitor`] - routes each concrete kind through its feature
//!   hooks (named object, symbol, type span) and then its abstract
//!   ancestors from most specific to most general.

use crate::ir::{NodeId, NodeKind, Tree};
use crate::semantics::SemanticError;

/// Result of one visit: an accumulated flag word, or a fatal error.
pub type VisitResult = Result<i32, SemanticError>;

macro_rules! visitor_methods {
    ($default:ident) => {
        fn visit_aggregate(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_aggregate_alt(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_alias(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_array(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_assign(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_bit(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_bit_value(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_bitvector(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_bitvector_value(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_bool(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_bool_value(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_break(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_cast(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_char(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_char_value(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_const(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_contents(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_continue(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_design_unit(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_entity(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_enum(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_enum_value(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_event(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_expression(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_field(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_field_reference(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_file(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_for(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_for_generate(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_function(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_function_call(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_global_action(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_identifier(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_if(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_if_alt(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_if_generate(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_instance(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_int(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_int_value(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_library(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_library_def(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_member(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_null(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_parameter(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_parameter_assign(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_pointer(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_port(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_port_assign(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_procedure(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_procedure_call(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_range(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_real(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_real_value(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_record(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_record_value(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_record_value_alt(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_reference(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_return(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_signal(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_signed(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_slice(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_state(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_state_table(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_string(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_string_value(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_switch(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_switch_alt(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_system(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_time(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_time_value(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_transition(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_type_def(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_type_reference(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_type_tp(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_type_tp_assign(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_unsigned(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_value_statement(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_value_tp(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_value_tp_assign(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_variable(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_view(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_view_reference(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_wait(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_when(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_when_alt(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_while(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_with(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
        fn visit_with_alt(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult { self.$default(tree, id) }
    };
}

macro_rules! visitor_dispatch {
    ($fn_name:ident, $trait_name:ident) => {
        /// Dispatch on the node's kind to the matching visitor method.
        pub fn $fn_name<V: $trait_name + ?Sized>(
            v: &mut V,
            tree: &mut Tree,
            id: NodeId,
        ) -> VisitResult {
            match tree.kind(id) {
                NodeKind::Aggregate => v.visit_aggregate(tree, id),
                NodeKind::AggregateAlt => v.visit_aggregate_alt(tree, id),
                NodeKind::Alias => v.visit_alias(tree, id),
                NodeKind::Array => v.visit_array(tree, id),
                NodeKind::Assign => v.visit_assign(tree, id),
                NodeKind::Bit => v.visit_bit(tree, id),
                NodeKind::BitValue => v.visit_bit_value(tree, id),
                NodeKind::Bitvector => v.visit_bitvector(tree, id),
                NodeKind::BitvectorValue => v.visit_bitvector_value(tree, id),
                NodeKind::Bool => v.visit_bool(tree, id),
                NodeKind::BoolValue => v.visit_bool_value(tree, id),
                NodeKind::Break => v.visit_break(tree, id),
                NodeKind::Cast => v.visit_cast(tree, id),
                NodeKind::Char => v.visit_char(tree, id),
                NodeKind::CharValue => v.visit_char_value(tree, id),
                NodeKind::Const => v.visit_const(tree, id),
                NodeKind::Contents => v.visit_contents(tree, id),
                NodeKind::Continue => v.visit_continue(tree, id),
                NodeKind::DesignUnit => v.visit_design_unit(tree, id),
                NodeKind::Entity => v.visit_entity(tree, id),
                NodeKind::Enum => v.visit_enum(tree, id),
                NodeKind::EnumValue => v.visit_enum_value(tree, id),
                NodeKind::Event => v.visit_event(tree, id),
                NodeKind::Expression => v.visit_expression(tree, id),
                NodeKind::Field => v.visit_field(tree, id),
                NodeKind::FieldReference => v.visit_field_reference(tree, id),
                NodeKind::File => v.visit_file(tree, id),
                NodeKind::For => v.visit_for(tree, id),
                NodeKind::ForGenerate => v.visit_for_generate(tree, id),
                NodeKind::Function => v.visit_function(tree, id),
                NodeKind::FunctionCall => v.visit_function_call(tree, id),
                NodeKind::GlobalAction => v.visit_global_action(tree, id),
                NodeKind::Identifier => v.visit_identifier(tree, id),
                NodeKind::If => v.visit_if(tree, id),
                NodeKind::IfAlt => v.visit_if_alt(tree, id),
                NodeKind::IfGenerate => v.visit_if_generate(tree, id),
                NodeKind::Instance => v.visit_instance(tree, id),
                NodeKind::Int => v.visit_int(tree, id),
                NodeKind::IntValue => v.visit_int_value(tree, id),
                NodeKind::Library => v.visit_library(tree, id),
                NodeKind::LibraryDef => v.visit_library_def(tree, id),
                NodeKind::Member => v.visit_member(tree, id),
                NodeKind::Null => v.visit_null(tree, id),
                NodeKind::Parameter => v.visit_parameter(tree, id),
                NodeKind::ParameterAssign => v.visit_parameter_assign(tree, id),
                NodeKind::Pointer => v.visit_pointer(tree, id),
                NodeKind::Port => v.visit_port(tree, id),
                NodeKind::PortAssign => v.visit_port_assign(tree, id),
                NodeKind::Procedure => v.visit_procedure(tree, id),
                NodeKind::ProcedureCall => v.visit_procedure_call(tree, id),
                NodeKind::Range => v.visit_range(tree, id),
                NodeKind::Real => v.visit_real(tree, id),
                NodeKind::RealValue => v.visit_real_value(tree, id),
                NodeKind::Record => v.visit_record(tree, id),
                NodeKind::RecordValue => v.visit_record_value(tree, id),
                NodeKind::RecordValueAlt => v.visit_record_value_alt(tree, id),
                NodeKind::Reference => v.visit_reference(tree, id),
                NodeKind::Return => v.visit_return(tree, id),
                NodeKind::Signal => v.visit_signal(tree, id),
                NodeKind::Signed => v.visit_signed(tree, id),
                NodeKind::Slice => v.visit_slice(tree, id),
                NodeKind::State => v.visit_state(tree, id),
                NodeKind::StateTable => v.visit_state_table(tree, id),
                NodeKind::StringT => v.visit_string(tree, id),
                NodeKind::StringValue => v.visit_string_value(tree, id),
                NodeKind::Switch => v.visit_switch(tree, id),
                NodeKind::SwitchAlt => v.visit_switch_alt(tree, id),
                NodeKind::System => v.visit_system(tree, id),
                NodeKind::Time => v.visit_time(tree, id),
                NodeKind::TimeValue => v.visit_time_value(tree, id),
                NodeKind::Transition => v.visit_transition(tree, id),
                NodeKind::TypeDef => v.visit_type_def(tree, id),
                NodeKind::TypeReference => v.visit_type_reference(tree, id),
                NodeKind::TypeTP => v.visit_type_tp(tree, id),
                NodeKind::TypeTPAssign => v.visit_type_tp_assign(tree, id),
                NodeKind::Unsigned => v.visit_unsigned(tree, id),
                NodeKind::ValueStatement => v.visit_value_statement(tree, id),
                NodeKind::ValueTP => v.visit_value_tp(tree, id),
                NodeKind::ValueTPAssign => v.visit_value_tp_assign(tree, id),
                NodeKind::Variable => v.visit_variable(tree, id),
                NodeKind::View => v.visit_view(tree, id),
                NodeKind::ViewReference => v.visit_view_reference(tree, id),
                NodeKind::Wait => v.visit_wait(tree, id),
                NodeKind::When => v.visit_when(tree, id),
                NodeKind::WhenAlt => v.visit_when_alt(tree, id),
                NodeKind::While => v.visit_while(tree, id),
                NodeKind::With => v.visit_with(tree, id),
                NodeKind::WithAlt => v.visit_with_alt(tree, id),
            }
        }
    };
}

/// The flat visitor: one method per kind, no recursion by default.
pub trait Visitor {
    /// Default behavior of every unoverridden method.
    fn default_visit(&mut self, _tree: &mut Tree, _id: NodeId) -> VisitResult {
        Ok(0)
    }

    visitor_methods!(default_visit);
}

visitor_dispatch!(accept, Visitor);

/// The guide visitor: recurses over all owned children in schema order.
pub trait GuideVisitor {
    /// Called before a node's children. Returning `true` skips the
    /// subtree (including the node's own visit method and `after`).
    fn before(&mut self, _tree: &mut Tree, _id: NodeId) -> Result<bool, SemanticError> {
        Ok(false)
    }

    /// Called after a node's children and visit method.
    fn after(&mut self, _tree: &mut Tree, _id: NodeId) -> VisitResult {
        Ok(0)
    }

    /// Default behavior of every unoverridden method: recurse.
    fn default_visit(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        guide_children(self, tree, id)
    }

    visitor_methods!(default_visit);
}

/// Run a guide visitor over the subtree rooted at `id`.
pub fn guide_visit<V: GuideVisitor + ?Sized>(
    v: &mut V,
    tree: &mut Tree,
    id: NodeId,
) -> VisitResult {
    if v.before(tree, id)? {
        return Ok(0);
    }
    let mut rv = guide_dispatch(v, tree, id)?;
    rv |= v.after(tree, id)?;
    Ok(rv)
}

visitor_dispatch!(guide_dispatch, GuideVisitor);

/// Visit all owned children of `id` in schema order, or-accumulating the
/// results. Overriding methods call this to recurse.
pub fn guide_children<V: GuideVisitor + ?Sized>(
    v: &mut V,
    tree: &mut Tree,
    id: NodeId,
) -> VisitResult {
    let mut rv = 0;
    for child in tree.children(id) {
        if !tree.is_alive(child) {
            continue;
        }
        rv |= guide_visit(v, tree, child)?;
    }
    Ok(rv)
}

/// The ancestor visitor: behavior shared across inheritance families.
///
/// For each concrete kind the dispatcher first invokes the applicable
/// feature hooks (named object, symbol, type span - when
/// [`AncestorVisitor::visit_features`] is `true`), then walks the
/// abstract ancestors from most specific to most general. Default hooks
/// return `0`, so implementors override only the levels they care about.
pub trait AncestorVisitor {
    /// Whether feature hooks are invoked before the ancestor chain.
    fn visit_features(&self) -> bool {
        true
    }

    fn visit_named_object(&mut self, _tree: &mut Tree, _id: NodeId) -> VisitResult {
        Ok(0)
    }

    fn visit_symbol(&mut self, _tree: &mut Tree, _id: NodeId) -> VisitResult {
        Ok(0)
    }

    fn visit_type_span(&mut self, _tree: &mut Tree, _id: NodeId) -> VisitResult {
        Ok(0)
    }

    fn visit_object(&mut self, _tree: &mut Tree, _id: NodeId) -> VisitResult {
        Ok(0)
    }

    fn visit_typed_object(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        self.visit_object(tree, id)
    }

    fn visit_value(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        self.visit_typed_object(tree, id)
    }

    fn visit_const_value(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        self.visit_value(tree, id)
    }

    fn visit_prefixed_reference(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        self.visit_value(tree, id)
    }

    fn visit_action(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        self.visit_object(tree, id)
    }

    fn visit_type(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        self.visit_object(tree, id)
    }

    fn visit_simple_type(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        self.visit_type(tree, id)
    }

    fn visit_composite_type(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        self.visit_type(tree, id)
    }

    fn visit_scoped_type(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        self.visit_type(tree, id)
    }

    fn visit_referenced_type(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        self.visit_type(tree, id)
    }

    fn visit_declaration(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        self.visit_object(tree, id)
    }

    fn visit_data_declaration(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        self.visit_declaration(tree, id)
    }

    fn visit_type_declaration(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        self.visit_declaration(tree, id)
    }

    fn visit_scope(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        self.visit_declaration(tree, id)
    }

    fn visit_base_contents(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        self.visit_scope(tree, id)
    }

    fn visit_generate(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        self.visit_base_contents(tree, id)
    }

    fn visit_sub_program(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        self.visit_scope(tree, id)
    }

    fn visit_alt(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        self.visit_object(tree, id)
    }

    fn visit_referenced_assign(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        self.visit_typed_object(tree, id)
    }

    fn visit_ppassign(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        self.visit_referenced_assign(tree, id)
    }

    fn visit_tpassign(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        self.visit_referenced_assign(tree, id)
    }

    fn visit_global_action(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
        self.visit_object(tree, id)
    }
}

/// Route one node through its features and ancestor chain.
pub fn ancestor_visit<V: AncestorVisitor + ?Sized>(
    v: &mut V,
    tree: &mut Tree,
    id: NodeId,
) -> VisitResult {
    use crate::ir::AncestorClass as A;
    let kind = tree.kind(id);
    let mut rv = 0;
    if v.visit_features() {
        if tree.attrs(id).name().is_some() {
            rv |= v.visit_named_object(tree, id)?;
        }
        if kind.is_symbol() {
            rv |= v.visit_symbol(tree, id)?;
        }
        if kind.has_type_span() {
            rv |= v.visit_type_span(tree, id)?;
        }
    }
    let chain = kind.ancestors();
    rv |= match chain.first() {
        Some(A::Value) => v.visit_value(tree, id)?,
        Some(A::ConstValue) => v.visit_const_value(tree, id)?,
        Some(A::PrefixedReference) => v.visit_prefixed_reference(tree, id)?,
        Some(A::Action) => v.visit_action(tree, id)?,
        Some(A::SimpleType) => v.visit_simple_type(tree, id)?,
        Some(A::CompositeType) => v.visit_composite_type(tree, id)?,
        Some(A::ScopedType) => v.visit_scoped_type(tree, id)?,
        Some(A::ReferencedType) => v.visit_referenced_type(tree, id)?,
        Some(A::DataDeclaration) => v.visit_data_declaration(tree, id)?,
        Some(A::TypeDeclaration) => v.visit_type_declaration(tree, id)?,
        Some(A::BaseContents) => v.visit_base_contents(tree, id)?,
        Some(A::Generate) => v.visit_generate(tree, id)?,
        Some(A::SubProgram) => v.visit_sub_program(tree, id)?,
        Some(A::Scope) => v.visit_scope(tree, id)?,
        Some(A::Alt) => v.visit_alt(tree, id)?,
        Some(A::PPAssign) => v.visit_ppassign(tree, id)?,
        Some(A::TPAssign) => v.visit_tpassign(tree, id)?,
        Some(A::GlobalAction) => v.visit_global_action(tree, id)?,
        _ => v.visit_object(tree, id)?,
    };
    Ok(rv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Operator;
    use crate::ir::Factory;

    struct Counter {
        nodes: usize,
        expressions: usize,
    }

    impl GuideVisitor for Counter {
        fn before(&mut self, _tree: &mut Tree, _id: NodeId) -> Result<bool, SemanticError> {
            self.nodes += 1;
            Ok(false)
        }

        fn visit_expression(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
            self.expressions += 1;
            guide_children(self, tree, id)
        }
    }

    #[test]
    fn guide_visitor_recurses_in_schema_order() {
        let mut tree = Tree::new();
        let mut fac = Factory::new(&mut tree);
        let a = fac.intval(1);
        let b = fac.intval(2);
        let e = fac.expression(a, Operator::Plus, b);
        let ret = fac.return_stm(Some(e));

        let mut counter = Counter { nodes: 0, expressions: 0 };
        guide_visit(&mut counter, &mut tree, ret).unwrap();
        assert_eq!(counter.nodes, 4);
        assert_eq!(counter.expressions, 1);
    }

    struct SkipExpr {
        seen_ints: usize,
    }

    impl GuideVisitor for SkipExpr {
        fn before(&mut self, tree: &mut Tree, id: NodeId) -> Result<bool, SemanticError> {
            Ok(tree.kind(id) == NodeKind::Expression)
        }

        fn visit_int_value(&mut self, tree: &mut Tree, id: NodeId) -> VisitResult {
            self.seen_ints += 1;
            guide_children(self, tree, id)
        }
    }

    #[test]
    fn before_hook_short_circuits_subtrees() {
        let mut tree = Tree::new();
        let mut fac = Factory::new(&mut tree);
        let a = fac.intval(1);
        let b = fac.intval(2);
        let e = fac.expression(a, Operator::Plus, b);
        let ret = fac.return_stm(Some(e));

        let mut v = SkipExpr { seen_ints: 0 };
        guide_visit(&mut v, &mut tree, ret).unwrap();
        assert_eq!(v.seen_ints, 0);
    }

    struct FamilyTally {
        values: usize,
        objects: usize,
        named: usize,
    }

    impl AncestorVisitor for FamilyTally {
        fn visit_named_object(&mut self, _t: &mut Tree, _id: NodeId) -> VisitResult {
            self.named += 1;
            Ok(0)
        }

        fn visit_value(&mut self, t: &mut Tree, id: NodeId) -> VisitResult {
            self.values += 1;
            self.visit_typed_object(t, id)
        }

        fn visit_object(&mut self, _t: &mut Tree, _id: NodeId) -> VisitResult {
            self.objects += 1;
            Ok(0)
        }
    }

    #[test]
    fn ancestor_visitor_routes_features_then_ancestors() {
        let mut tree = Tree::new();
        let mut fac = Factory::new(&mut tree);
        let ident = fac.identifier("x");
        let assign_lhs = fac.identifier("y");
        let assign = fac.assign(assign_lhs, ident);

        let mut v = FamilyTally { values: 0, objects: 0, named: 0 };
        ancestor_visit(&mut v, &mut tree, ident).unwrap();
        assert_eq!((v.values, v.objects, v.named), (1, 1, 1));

        ancestor_visit(&mut v, &mut tree, assign).unwrap();
        // Assign routes through Action -> Object only.
        assert_eq!((v.values, v.objects, v.named), (1, 2, 1));
    }
}

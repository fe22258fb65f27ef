//! The closed set of node kinds and their classification.

/// Tag of every concrete node kind in a HIF tree.
///
/// The set is closed: every node in a tree is exactly one of these. The
/// conceptual inheritance families of the format (Value, Action, Type,
/// Declaration, ...) are exposed as predicates and as [`AncestorClass`]
/// chains rather than as Rust types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Aggregate,
    AggregateAlt,
    Alias,
    Array,
    Assign,
    Bit,
    BitValue,
    Bitvector,
    BitvectorValue,
    Bool,
    BoolValue,
    Break,
    Cast,
    Char,
    CharValue,
    Const,
    Contents,
    Continue,
    DesignUnit,
    Entity,
    Enum,
    EnumValue,
    Event,
    Expression,
    Field,
    FieldReference,
    File,
    For,
    ForGenerate,
    Function,
    FunctionCall,
    GlobalAction,
    Identifier,
    If,
    IfAlt,
    IfGenerate,
    Instance,
    Int,
    IntValue,
    Library,
    LibraryDef,
    Member,
    Null,
    Parameter,
    ParameterAssign,
    Pointer,
    Port,
    PortAssign,
    Procedure,
    ProcedureCall,
    Range,
    Real,
    RealValue,
    Record,
    RecordValue,
    RecordValueAlt,
    Reference,
    Return,
    Signal,
    Signed,
    Slice,
    State,
    StateTable,
    StringT,
    StringValue,
    Switch,
    SwitchAlt,
    System,
    Time,
    TimeValue,
    Transition,
    TypeDef,
    TypeReference,
    TypeTP,
    TypeTPAssign,
    Unsigned,
    ValueStatement,
    ValueTP,
    ValueTPAssign,
    Variable,
    View,
    ViewReference,
    Wait,
    When,
    WhenAlt,
    While,
    With,
    WithAlt,
}

/// Abstract classes of the conceptual hierarchy, used by the ancestor
/// visitor and by the structural checks of the standardization tree map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AncestorClass {
    Object,
    TypedObject,
    Value,
    ConstValue,
    PrefixedReference,
    Action,
    Type,
    SimpleType,
    CompositeType,
    ScopedType,
    ReferencedType,
    Declaration,
    DataDeclaration,
    TypeDeclaration,
    Scope,
    BaseContents,
    Generate,
    SubProgram,
    Alt,
    ReferencedAssign,
    PPAssign,
    TPAssign,
    GlobalAction,
}

impl NodeKind {
    /// The class identifier: also the XML element tag of the node.
    pub fn class_id(self) -> &'static str {
        match self {
            NodeKind::Aggregate => "AGGREGATE",
            NodeKind::AggregateAlt => "AGGREGATEALT",
            NodeKind::Alias => "ALIAS",
            NodeKind::Array => "ARRAY",
            NodeKind::Assign => "ASSIGN",
            NodeKind::Bit => "BIT",
            NodeKind::BitValue => "BITVALUE",
            NodeKind::Bitvector => "BITVECTOR",
            NodeKind::BitvectorValue => "BITVECTORVALUE",
            NodeKind::Bool => "BOOL",
            NodeKind::BoolValue => "BOOLVALUE",
            NodeKind::Break => "BREAK",
            NodeKind::Cast => "CAST",
            NodeKind::Char => "CHAR",
            NodeKind::CharValue => "CHARVALUE",
            NodeKind::Const => "CONST",
            NodeKind::Contents => "CONTENTS",
            NodeKind::Continue => "CONTINUE",
            NodeKind::DesignUnit => "DESIGNUNIT",
            NodeKind::Entity => "ENTITY",
            NodeKind::Enum => "ENUM",
            NodeKind::EnumValue => "ENUMVALUE",
            NodeKind::Event => "EVENT",
            NodeKind::Expression => "EXPRESSION",
            NodeKind::Field => "FIELD",
            NodeKind::FieldReference => "FIELDREFERENCE",
            NodeKind::File => "FILE",
            NodeKind::For => "FOR",
            NodeKind::ForGenerate => "FORGENERATE",
            NodeKind::Function => "FUNCTION",
            NodeKind::FunctionCall => "FUNCTIONCALL",
            NodeKind::GlobalAction => "GLOBALACTION",
            NodeKind::Identifier => "IDENTIFIER",
            NodeKind::If => "IF",
            NodeKind::IfAlt => "IFALT",
            NodeKind::IfGenerate => "IFGENERATE",
            NodeKind::Instance => "INSTANCE",
            NodeKind::Int => "INT",
            NodeKind::IntValue => "INTVALUE",
            NodeKind::Library => "LIBRARY",
            NodeKind::LibraryDef => "LIBRARYDEF",
            NodeKind::Member => "MEMBER",
            NodeKind::Null => "NULL",
            NodeKind::Parameter => "PARAMETER",
            NodeKind::ParameterAssign => "PARAMETERASSIGN",
            NodeKind::Pointer => "POINTER",
            NodeKind::Port => "PORT",
            NodeKind::PortAssign => "PORTASSIGN",
            NodeKind::Procedure => "PROCEDURE",
            NodeKind::ProcedureCall => "PROCEDURECALL",
            NodeKind::Range => "RANGE",
            NodeKind::Real => "REAL",
            NodeKind::RealValue => "REALVALUE",
            NodeKind::Record => "RECORD",
            NodeKind::RecordValue => "RECORDVALUE",
            NodeKind::RecordValueAlt => "RECORDVALUEALT",
            NodeKind::Reference => "REFERENCE",
            NodeKind::Return => "RETURN",
            NodeKind::Signal => "SIGNAL",
            NodeKind::Signed => "SIGNED",
            NodeKind::Slice => "SLICE",
            NodeKind::State => "STATE",
            NodeKind::StateTable => "STATETABLE",
            NodeKind::StringT => "STRING",
            NodeKind::StringValue => "STRINGVALUE",
            NodeKind::Switch => "SWITCH",
            NodeKind::SwitchAlt => "SWITCHALT",
            NodeKind::System => "SYSTEM",
            NodeKind::Time => "TIME",
            NodeKind::TimeValue => "TIMEVALUE",
            NodeKind::Transition => "TRANSITION",
            NodeKind::TypeDef => "TYPEDEF",
            NodeKind::TypeReference => "TYPEREFERENCE",
            NodeKind::TypeTP => "TYPETP",
            NodeKind::TypeTPAssign => "TYPETPASSIGN",
            NodeKind::Unsigned => "UNSIGNED",
            NodeKind::ValueStatement => "VALUESTATEMENT",
            NodeKind::ValueTP => "VALUETP",
            NodeKind::ValueTPAssign => "VALUETPASSIGN",
            NodeKind::Variable => "VARIABLE",
            NodeKind::View => "VIEW",
            NodeKind::ViewReference => "VIEWREFERENCE",
            NodeKind::Wait => "WAIT",
            NodeKind::When => "WHEN",
            NodeKind::WhenAlt => "WHENALT",
            NodeKind::While => "WHILE",
            NodeKind::With => "WITH",
            NodeKind::WithAlt => "WITHALT",
        }
    }

    /// Inverse of [`class_id`](Self::class_id).
    pub fn from_class_id(s: &str) -> Option<Self> {
        ALL_KINDS.iter().copied().find(|k| k.class_id() == s)
    }

    pub fn is_const_value(self) -> bool {
        matches!(
            self,
            NodeKind::BitValue
                | NodeKind::BitvectorValue
                | NodeKind::BoolValue
                | NodeKind::CharValue
                | NodeKind::IntValue
                | NodeKind::RealValue
                | NodeKind::StringValue
                | NodeKind::TimeValue
        )
    }

    pub fn is_prefixed_reference(self) -> bool {
        matches!(self, NodeKind::FieldReference | NodeKind::Member | NodeKind::Slice)
    }

    pub fn is_value(self) -> bool {
        self.is_const_value()
            || self.is_prefixed_reference()
            || matches!(
                self,
                NodeKind::Aggregate
                    | NodeKind::Cast
                    | NodeKind::Expression
                    | NodeKind::FunctionCall
                    | NodeKind::Identifier
                    | NodeKind::Instance
                    | NodeKind::Range
                    | NodeKind::RecordValue
                    | NodeKind::When
                    | NodeKind::With
            )
    }

    pub fn is_action(self) -> bool {
        matches!(
            self,
            NodeKind::Assign
                | NodeKind::Break
                | NodeKind::Continue
                | NodeKind::For
                | NodeKind::If
                | NodeKind::Null
                | NodeKind::ProcedureCall
                | NodeKind::Return
                | NodeKind::Switch
                | NodeKind::Transition
                | NodeKind::ValueStatement
                | NodeKind::Wait
                | NodeKind::While
        )
    }

    pub fn is_simple_type(self) -> bool {
        matches!(
            self,
            NodeKind::Bit
                | NodeKind::Bitvector
                | NodeKind::Bool
                | NodeKind::Char
                | NodeKind::Event
                | NodeKind::Int
                | NodeKind::Real
                | NodeKind::Signed
                | NodeKind::StringT
                | NodeKind::Time
                | NodeKind::Unsigned
        )
    }

    pub fn is_composite_type(self) -> bool {
        matches!(self, NodeKind::Array | NodeKind::File | NodeKind::Pointer | NodeKind::Reference)
    }

    pub fn is_scoped_type(self) -> bool {
        matches!(self, NodeKind::Enum | NodeKind::Record)
    }

    pub fn is_referenced_type(self) -> bool {
        matches!(self, NodeKind::Library | NodeKind::TypeReference | NodeKind::ViewReference)
    }

    pub fn is_type(self) -> bool {
        self.is_simple_type()
            || self.is_composite_type()
            || self.is_scoped_type()
            || self.is_referenced_type()
    }

    pub fn is_data_declaration(self) -> bool {
        matches!(
            self,
            NodeKind::Alias
                | NodeKind::Const
                | NodeKind::EnumValue
                | NodeKind::Field
                | NodeKind::Parameter
                | NodeKind::Port
                | NodeKind::Signal
                | NodeKind::ValueTP
                | NodeKind::Variable
        )
    }

    pub fn is_type_declaration(self) -> bool {
        matches!(self, NodeKind::TypeDef | NodeKind::TypeTP)
    }

    pub fn is_generate(self) -> bool {
        matches!(self, NodeKind::ForGenerate | NodeKind::IfGenerate)
    }

    pub fn is_subprogram(self) -> bool {
        matches!(self, NodeKind::Function | NodeKind::Procedure)
    }

    pub fn is_scope(self) -> bool {
        self.is_generate()
            || self.is_subprogram()
            || matches!(
                self,
                NodeKind::Contents
                    | NodeKind::DesignUnit
                    | NodeKind::Entity
                    | NodeKind::LibraryDef
                    | NodeKind::State
                    | NodeKind::StateTable
                    | NodeKind::System
                    | NodeKind::View
            )
    }

    pub fn is_declaration(self) -> bool {
        self.is_data_declaration() || self.is_type_declaration() || self.is_scope()
    }

    pub fn is_alt(self) -> bool {
        matches!(
            self,
            NodeKind::AggregateAlt
                | NodeKind::IfAlt
                | NodeKind::RecordValueAlt
                | NodeKind::SwitchAlt
                | NodeKind::WhenAlt
                | NodeKind::WithAlt
        )
    }

    pub fn is_ppassign(self) -> bool {
        matches!(self, NodeKind::ParameterAssign | NodeKind::PortAssign)
    }

    pub fn is_tpassign(self) -> bool {
        matches!(self, NodeKind::TypeTPAssign | NodeKind::ValueTPAssign)
    }

    pub fn is_referenced_assign(self) -> bool {
        self.is_ppassign() || self.is_tpassign()
    }

    pub fn is_typed_object(self) -> bool {
        self.is_value() || self.is_referenced_assign()
    }

    /// Nodes that resolve to a declaration (the `ISymbol` feature).
    pub fn is_symbol(self) -> bool {
        self.is_referenced_assign()
            || matches!(
                self,
                NodeKind::FieldReference
                    | NodeKind::FunctionCall
                    | NodeKind::Identifier
                    | NodeKind::Instance
                    | NodeKind::Library
                    | NodeKind::ProcedureCall
                    | NodeKind::TypeReference
                    | NodeKind::ViewReference
            )
    }

    /// Types that carry a span describing vector width (the `ITypeSpan`
    /// feature).
    pub fn has_type_span(self) -> bool {
        matches!(
            self,
            NodeKind::Array
                | NodeKind::Bitvector
                | NodeKind::Int
                | NodeKind::Real
                | NodeKind::Signed
                | NodeKind::StringT
                | NodeKind::Unsigned
        )
    }

    /// The chain of abstract classes from the most specific ancestor up to
    /// `Object` (excluded).
    pub fn ancestors(self) -> &'static [AncestorClass] {
        use AncestorClass as A;
        match self {
            NodeKind::Aggregate
            | NodeKind::Cast
            | NodeKind::Expression
            | NodeKind::FunctionCall
            | NodeKind::Identifier
            | NodeKind::Instance
            | NodeKind::Range
            | NodeKind::RecordValue
            | NodeKind::When
            | NodeKind::With => &[A::Value, A::TypedObject],
            k if k.is_const_value() => &[A::ConstValue, A::Value, A::TypedObject],
            k if k.is_prefixed_reference() => {
                &[A::PrefixedReference, A::Value, A::TypedObject]
            }
            k if k.is_action() => &[A::Action],
            k if k.is_simple_type() => &[A::SimpleType, A::Type],
            k if k.is_composite_type() => &[A::CompositeType, A::Type],
            k if k.is_scoped_type() => &[A::ScopedType, A::Type],
            k if k.is_referenced_type() => &[A::ReferencedType, A::Type],
            k if k.is_data_declaration() => &[A::DataDeclaration, A::Declaration],
            k if k.is_type_declaration() => &[A::TypeDeclaration, A::Declaration],
            NodeKind::Contents => &[A::BaseContents, A::Scope, A::Declaration],
            k if k.is_generate() => &[A::Generate, A::BaseContents, A::Scope, A::Declaration],
            k if k.is_subprogram() => &[A::SubProgram, A::Scope, A::Declaration],
            k if k.is_scope() => &[A::Scope, A::Declaration],
            k if k.is_alt() => &[A::Alt],
            k if k.is_ppassign() => &[A::PPAssign, A::ReferencedAssign, A::TypedObject],
            k if k.is_tpassign() => &[A::TPAssign, A::ReferencedAssign, A::TypedObject],
            NodeKind::GlobalAction => &[A::GlobalAction],
            _ => &[],
        }
    }

    /// Structural compatibility classes checked when two nodes are paired
    /// by the standardization tree map.
    pub fn is_map_compatible(self, other: NodeKind) -> bool {
        self.is_action() == other.is_action()
            && self.is_alt() == other.is_alt()
            && self.is_declaration() == other.is_declaration()
            && (self == NodeKind::GlobalAction) == (other == NodeKind::GlobalAction)
            && self.is_type() == other.is_type()
            && self.is_typed_object() == other.is_typed_object()
    }
}

pub const ALL_KINDS: &[NodeKind] = &[
    NodeKind::Aggregate,
    NodeKind::AggregateAlt,
    NodeKind::Alias,
    NodeKind::Array,
    NodeKind::Assign,
    NodeKind::Bit,
    NodeKind::BitValue,
    NodeKind::Bitvector,
    NodeKind::BitvectorValue,
    NodeKind::Bool,
    NodeKind::BoolValue,
    NodeKind::Break,
    NodeKind::Cast,
    NodeKind::Char,
    NodeKind::CharValue,
    NodeKind::Const,
    NodeKind::Contents,
    NodeKind::Continue,
    NodeKind::DesignUnit,
    NodeKind::Entity,
    NodeKind::Enum,
    NodeKind::EnumValue,
    NodeKind::Event,
    NodeKind::Expression,
    NodeKind::Field,
    NodeKind::FieldReference,
    NodeKind::File,
    NodeKind::For,
    NodeKind::ForGenerate,
    NodeKind::Function,
    NodeKind::FunctionCall,
    NodeKind::GlobalAction,
    NodeKind::Identifier,
    NodeKind::If,
    NodeKind::IfAlt,
    NodeKind::IfGenerate,
    NodeKind::Instance,
    NodeKind::Int,
    NodeKind::IntValue,
    NodeKind::Library,
    NodeKind::LibraryDef,
    NodeKind::Member,
    NodeKind::Null,
    NodeKind::Parameter,
    NodeKind::ParameterAssign,
    NodeKind::Pointer,
    NodeKind::Port,
    NodeKind::PortAssign,
    NodeKind::Procedure,
    NodeKind::ProcedureCall,
    NodeKind::Range,
    NodeKind::Real,
    NodeKind::RealValue,
    NodeKind::Record,
    NodeKind::RecordValue,
    NodeKind::RecordValueAlt,
    NodeKind::Reference,
    NodeKind::Return,
    NodeKind::Signal,
    NodeKind::Signed,
    NodeKind::Slice,
    NodeKind::State,
    NodeKind::StateTable,
    NodeKind::StringT,
    NodeKind::StringValue,
    NodeKind::Switch,
    NodeKind::SwitchAlt,
    NodeKind::System,
    NodeKind::Time,
    NodeKind::TimeValue,
    NodeKind::Transition,
    NodeKind::TypeDef,
    NodeKind::TypeReference,
    NodeKind::TypeTP,
    NodeKind::TypeTPAssign,
    NodeKind::Unsigned,
    NodeKind::ValueStatement,
    NodeKind::ValueTP,
    NodeKind::ValueTPAssign,
    NodeKind::Variable,
    NodeKind::View,
    NodeKind::ViewReference,
    NodeKind::Wait,
    NodeKind::When,
    NodeKind::WhenAlt,
    NodeKind::While,
    NodeKind::With,
    NodeKind::WithAlt,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_ids_round_trip() {
        for &k in ALL_KINDS {
            assert_eq!(NodeKind::from_class_id(k.class_id()), Some(k), "{k:?}");
        }
    }

    #[test]
    fn families_partition_where_expected() {
        for &k in ALL_KINDS {
            // A node is at most one of value / action / type / declaration / alt
            // / referenced-assign, except types that double as values (Range is
            // a value, Library is a type) and scopes that are declarations.
            if k.is_const_value() {
                assert!(k.is_value());
            }
            if k.is_referenced_assign() {
                assert!(k.is_typed_object() && !k.is_value());
            }
        }
        assert!(NodeKind::Range.is_value());
        assert!(NodeKind::Library.is_type() && NodeKind::Library.is_symbol());
        assert!(NodeKind::StateTable.is_scope() && NodeKind::StateTable.is_declaration());
    }

    #[test]
    fn ancestor_chains_end_at_family_roots() {
        assert_eq!(
            NodeKind::BitValue.ancestors(),
            &[AncestorClass::ConstValue, AncestorClass::Value, AncestorClass::TypedObject]
        );
        assert_eq!(
            NodeKind::ForGenerate.ancestors(),
            &[
                AncestorClass::Generate,
                AncestorClass::BaseContents,
                AncestorClass::Scope,
                AncestorClass::Declaration
            ]
        );
    }
}

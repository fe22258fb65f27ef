//! Per-kind field schema: the ordered list of owned children.
//!
//! Each kind owns an ordered sequence of child fields; a field is either a
//! single slot or a child list (BList). The order is the canonical
//! traversal order of the guide visitor, and the field names are the XML
//! child-element tags of the persisted format. This table is the single
//! source of truth shared by traversal, matched insertion, copying,
//! equality and the XML codec.

use super::kind::NodeKind;

/// Definition of one child field of a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name, equal to the XML child-element tag.
    pub name: &'static str,
    /// `true` for a child list (BList), `false` for a single slot.
    pub list: bool,
}

const fn slot(name: &'static str) -> FieldDef {
    FieldDef { name, list: false }
}

const fn list(name: &'static str) -> FieldDef {
    FieldDef { name, list: true }
}

/// Field name constants. Shared by passes and the XML codec.
pub mod f {
    pub const ACTIONS: &str = "ACTIONS";
    pub const ALTS: &str = "ALTS";
    pub const CONDITION: &str = "CONDITION";
    pub const CONDITIONS: &str = "CONDITIONS";
    pub const CONTENTS: &str = "CONTENTS";
    pub const DECLARATIONS: &str = "DECLARATIONS";
    pub const DEFAULT: &str = "DEFAULT";
    pub const DEFAULTS: &str = "DEFAULTS";
    pub const DELAY: &str = "DELAY";
    pub const DESIGNUNITS: &str = "DESIGNUNITS";
    pub const EDGES: &str = "EDGES";
    pub const ENABLINGLABELS: &str = "ENABLINGLABELS";
    pub const ENABLINGS: &str = "ENABLINGS";
    pub const ENTITY: &str = "ENTITY";
    pub const FIELDS: &str = "FIELDS";
    pub const FORACTIONS: &str = "FORACTIONS";
    pub const GENERATES: &str = "GENERATES";
    pub const GLOBALACTION: &str = "GLOBALACTION";
    pub const INDEX: &str = "INDEX";
    pub const INDICES: &str = "INDICES";
    pub const INHERITANCES: &str = "INHERITANCES";
    pub const INITDECLARATIONS: &str = "INITDECLARATIONS";
    pub const INITVALUES: &str = "INITVALUES";
    pub const INSTANCE: &str = "INSTANCE";
    pub const INSTANCES: &str = "INSTANCES";
    pub const INVARIANTS: &str = "INVARIANTS";
    pub const LEFTBOUND: &str = "LEFTBOUND";
    pub const LEFTHANDSIDE: &str = "LEFTHANDSIDE";
    pub const LIBRARIES: &str = "LIBRARIES";
    pub const LIBRARYDEFS: &str = "LIBRARYDEFS";
    pub const OTHERS: &str = "OTHERS";
    pub const PARAMETERASSIGNS: &str = "PARAMETERASSIGNS";
    pub const PARAMETERS: &str = "PARAMETERS";
    pub const PARTIALBIND: &str = "PARTIALBIND";
    pub const PORTASSIGNS: &str = "PORTASSIGNS";
    pub const PORTS: &str = "PORTS";
    pub const PREFIX: &str = "PREFIX";
    pub const RANGE: &str = "RANGE";
    pub const RANGES: &str = "RANGES";
    pub const REFERENCEDTYPE: &str = "REFERENCEDTYPE";
    pub const REPETITIONS: &str = "REPETITIONS";
    pub const RIGHTBOUND: &str = "RIGHTBOUND";
    pub const RIGHTHANDSIDE: &str = "RIGHTHANDSIDE";
    pub const SENSITIVITY: &str = "SENSITIVITY";
    pub const SENSITIVITYNEG: &str = "SENSITIVITYNEG";
    pub const SENSITIVITYPOS: &str = "SENSITIVITYPOS";
    pub const SPAN: &str = "SPAN";
    pub const SPANINFORMATION: &str = "SPAN_INFORMATION";
    pub const STATES: &str = "STATES";
    pub const STATETABLE: &str = "STATETABLE";
    pub const STATETABLES: &str = "STATETABLES";
    pub const STEPACTIONS: &str = "STEPACTIONS";
    pub const TEMPLATEPARAMETERASSIGNS: &str = "TEMPLATEPARAMETERASSIGNS";
    pub const TEMPLATEPARAMETERS: &str = "TEMPLATEPARAMETERS";
    pub const TIME: &str = "TIME";
    pub const TYPE: &str = "TYPE";
    pub const UPDATELABELS: &str = "UPDATELABELS";
    pub const UPDATES: &str = "UPDATES";
    pub const VALUE: &str = "VALUE";
    pub const VALUE1: &str = "VALUE1";
    pub const VALUE2: &str = "VALUE2";
    pub const VALUES: &str = "VALUES";
    pub const VIEWS: &str = "VIEWS";
}

/// Builds a `'static` slice of field defs, forcing promotion of the
/// const-fn-built array so arms of the `schema` match below can return it.
macro_rules! fields {
    ($($x:expr),* $(,)?) => {{
        const FIELD_DEFS: &[FieldDef] = &[$($x),*];
        FIELD_DEFS
    }};
}

/// The ordered child fields of the given kind.
pub fn schema(kind: NodeKind) -> &'static [FieldDef] {
    use f::*;
    match kind {
        NodeKind::Aggregate => fields![list(ALTS), slot(OTHERS)],
        NodeKind::AggregateAlt => fields![list(INDICES), slot(VALUE)],
        NodeKind::Alias
        | NodeKind::Const
        | NodeKind::EnumValue
        | NodeKind::Field
        | NodeKind::Parameter
        | NodeKind::Port
        | NodeKind::Signal
        | NodeKind::ValueTP
        | NodeKind::Variable => fields![slot(RANGE), slot(TYPE), slot(VALUE)],
        NodeKind::Array => fields![slot(SPAN), slot(TYPE)],
        NodeKind::Assign => fields![slot(LEFTHANDSIDE), slot(RIGHTHANDSIDE), slot(DELAY)],
        NodeKind::Bit | NodeKind::Bool | NodeKind::Char | NodeKind::Event | NodeKind::Time => fields![],
        NodeKind::BitValue
        | NodeKind::BitvectorValue
        | NodeKind::BoolValue
        | NodeKind::CharValue
        | NodeKind::IntValue
        | NodeKind::RealValue
        | NodeKind::StringValue
        | NodeKind::TimeValue => fields![slot(TYPE)],
        NodeKind::Bitvector
        | NodeKind::Int
        | NodeKind::Real
        | NodeKind::Signed
        | NodeKind::Unsigned => fields![slot(SPAN)],
        NodeKind::Break | NodeKind::Continue | NodeKind::Identifier | NodeKind::Null => fields![],
        NodeKind::Cast => fields![slot(VALUE), slot(TYPE)],
        NodeKind::Contents => fields![
            list(LIBRARIES),
            list(DECLARATIONS),
            list(STATETABLES),
            list(GENERATES),
            list(INSTANCES),
            slot(GLOBALACTION),
        ],
        NodeKind::DesignUnit => fields![list(VIEWS)],
        NodeKind::Entity => fields![list(PARAMETERS), list(PORTS)],
        NodeKind::Enum => fields![list(VALUES)],
        NodeKind::Expression => fields![slot(VALUE1), slot(VALUE2)],
        NodeKind::FieldReference => fields![slot(PREFIX)],
        NodeKind::File | NodeKind::Pointer | NodeKind::Reference => fields![slot(TYPE)],
        NodeKind::For => fields![
            list(INITDECLARATIONS),
            list(INITVALUES),
            list(STEPACTIONS),
            slot(CONDITION),
            list(FORACTIONS),
        ],
        NodeKind::ForGenerate => fields![
            list(DECLARATIONS),
            list(STATETABLES),
            list(GENERATES),
            list(INSTANCES),
            slot(GLOBALACTION),
            list(INITDECLARATIONS),
            list(INITVALUES),
            list(STEPACTIONS),
            slot(CONDITION),
        ],
        NodeKind::Function => {
            fields![list(TEMPLATEPARAMETERS), list(PARAMETERS), slot(TYPE), slot(STATETABLE)]
        }
        NodeKind::FunctionCall | NodeKind::ProcedureCall => {
            fields![slot(INSTANCE), list(TEMPLATEPARAMETERASSIGNS), list(PARAMETERASSIGNS)]
        }
        NodeKind::GlobalAction => fields![list(ACTIONS)],
        NodeKind::If => fields![list(ALTS), list(DEFAULTS)],
        NodeKind::IfAlt => fields![slot(CONDITION), list(ACTIONS)],
        NodeKind::IfGenerate => fields![
            slot(CONDITION),
            list(DECLARATIONS),
            list(STATETABLES),
            list(GENERATES),
            list(INSTANCES),
            slot(GLOBALACTION),
        ],
        NodeKind::Instance => fields![slot(REFERENCEDTYPE), list(PORTASSIGNS), slot(VALUE)],
        NodeKind::Library => fields![slot(INSTANCE)],
        NodeKind::LibraryDef => fields![list(LIBRARIES), list(DECLARATIONS)],
        NodeKind::Member => fields![slot(PREFIX), slot(INDEX)],
        NodeKind::ParameterAssign | NodeKind::ValueTPAssign => fields![slot(VALUE)],
        NodeKind::PortAssign => fields![slot(TYPE), slot(VALUE), slot(PARTIALBIND)],
        NodeKind::Procedure => fields![list(TEMPLATEPARAMETERS), list(PARAMETERS), slot(STATETABLE)],
        NodeKind::Range => fields![slot(LEFTBOUND), slot(RIGHTBOUND), slot(TYPE)],
        NodeKind::Record => fields![list(FIELDS)],
        NodeKind::RecordValue => fields![list(ALTS)],
        NodeKind::RecordValueAlt => fields![slot(VALUE)],
        NodeKind::Return => fields![slot(VALUE)],
        NodeKind::Slice => fields![slot(PREFIX), slot(SPAN)],
        NodeKind::State => fields![list(ACTIONS), list(INVARIANTS)],
        NodeKind::StateTable => fields![
            list(DECLARATIONS),
            list(SENSITIVITY),
            list(SENSITIVITYPOS),
            list(SENSITIVITYNEG),
            list(STATES),
            list(EDGES),
        ],
        NodeKind::StringT => fields![slot(SPANINFORMATION)],
        NodeKind::Switch => fields![slot(CONDITION), list(ALTS), list(DEFAULTS)],
        NodeKind::SwitchAlt | NodeKind::WithAlt => fields![list(CONDITIONS), slot(VALUE)],
        NodeKind::System => fields![
            list(LIBRARYDEFS),
            list(DESIGNUNITS),
            list(DECLARATIONS),
            list(LIBRARIES),
            list(ACTIONS),
        ],
        NodeKind::Transition => {
            fields![list(ENABLINGLABELS), list(ENABLINGS), list(UPDATELABELS), list(UPDATES)]
        }
        NodeKind::TypeDef => fields![list(TEMPLATEPARAMETERS), slot(RANGE), slot(TYPE)],
        NodeKind::TypeReference => {
            fields![list(TEMPLATEPARAMETERASSIGNS), list(RANGES), slot(INSTANCE)]
        }
        NodeKind::TypeTP | NodeKind::TypeTPAssign => fields![slot(TYPE)],
        NodeKind::ValueStatement => fields![slot(VALUE)],
        NodeKind::View => fields![
            list(TEMPLATEPARAMETERS),
            list(LIBRARIES),
            slot(ENTITY),
            list(DECLARATIONS),
            list(INHERITANCES),
            slot(CONTENTS),
        ],
        NodeKind::ViewReference => fields![list(TEMPLATEPARAMETERASSIGNS), slot(INSTANCE)],
        NodeKind::Wait => fields![
            list(SENSITIVITY),
            list(SENSITIVITYPOS),
            list(SENSITIVITYNEG),
            list(ACTIONS),
            slot(TIME),
            slot(CONDITION),
            slot(REPETITIONS),
        ],
        NodeKind::When => fields![list(ALTS), slot(DEFAULT)],
        NodeKind::WhenAlt => fields![slot(CONDITION), slot(VALUE)],
        NodeKind::While => fields![slot(CONDITION), list(ACTIONS)],
        NodeKind::With => fields![slot(CONDITION), list(ALTS), slot(DEFAULT)],
    }
}

/// Index of a named field within the schema of `kind`.
pub fn field_index(kind: NodeKind, field: &str) -> Option<usize> {
    schema(kind).iter().position(|fd| fd.name == field)
}

#[cfg(test)]
mod tests {
    use super::super::kind::ALL_KINDS;
    use super::*;

    #[test]
    fn every_kind_has_a_schema() {
        for &k in ALL_KINDS {
            let fields = schema(k);
            let mut seen = std::collections::HashSet::new();
            for fd in fields {
                assert!(seen.insert(fd.name), "{k:?} duplicates field {}", fd.name);
            }
        }
    }

    #[test]
    fn data_declarations_share_the_declaration_shape() {
        for k in [NodeKind::Port, NodeKind::Signal, NodeKind::Variable, NodeKind::Const] {
            assert_eq!(schema(k).len(), 3);
            assert_eq!(schema(k)[1].name, f::TYPE);
        }
    }
}

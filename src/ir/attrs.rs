//! Scalar payloads of the node kinds.

use smol_str::SmolStr;

use crate::base::{
    BitConstant, CaseSemantics, LanguageId, Operator, PortDirection, ProcessFlavour,
    RangeDirection, TimeUnit, TypeVariant,
};

use super::kind::NodeKind;

/// Identifier names throughout the IR.
pub type Name = SmolStr;

/// Version stamp carried by `System`, persisted as `formatVersion="M.m"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub format_version_major: u32,
    pub format_version_minor: u32,
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self {
            format_version_major: CURRENT_FORMAT_VERSION.0,
            format_version_minor: CURRENT_FORMAT_VERSION.1,
        }
    }
}

/// Format version emitted by the writer.
pub const CURRENT_FORMAT_VERSION: (u32, u32) = (4, 0);

/// Shared scalar payload of every type node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeFlags {
    pub constexpr_: bool,
    pub variant: TypeVariant,
}

/// The scalar fields of a node, one variant per shape.
///
/// Kinds that share the same scalar layout share a variant; kinds with no
/// scalar fields use [`Attrs::None`].
#[derive(Debug, Clone, PartialEq)]
pub enum Attrs {
    None,
    /// Identifier, FieldReference, FunctionCall, ProcedureCall, Instance,
    /// TypeReference, TypeTPAssign, ValueTPAssign, named declarations,
    /// labels.
    Named { name: Name },
    /// Bool, Char, Event, File, Pointer, Real, Record, Reference, Signed,
    /// String, Time, Unsigned, Enum.
    Type { flags: TypeFlags },
    Bit {
        logic: bool,
        resolved: bool,
        flags: TypeFlags,
    },
    Bitvector {
        logic: bool,
        resolved: bool,
        signed: bool,
        flags: TypeFlags,
    },
    Int {
        signed: bool,
        flags: TypeFlags,
    },
    Array {
        signed: bool,
        flags: TypeFlags,
    },
    BitValue { value: BitConstant },
    BitvectorValue { value: String },
    BoolValue { value: bool },
    CharValue { value: char },
    IntValue { value: i64 },
    RealValue { value: f64 },
    StringValue { value: String },
    TimeValue { value: f64, unit: TimeUnit },
    Expression { operator: Operator },
    Range { direction: RangeDirection },
    /// Port, Parameter, PortAssign, ParameterAssign.
    PortLike { name: Name, direction: PortDirection },
    Library {
        name: Name,
        filename: String,
        standard: bool,
        system: bool,
    },
    LibraryDef {
        name: Name,
        language_id: LanguageId,
        standard: bool,
    },
    StateTable {
        name: Name,
        flavour: ProcessFlavour,
        dont_initialize: bool,
        standard: bool,
    },
    /// Function, Procedure.
    SubProgram { name: Name, standard: bool },
    /// Switch, With.
    Case { case_semantics: CaseSemantics },
    System {
        name: Name,
        language_id: LanguageId,
        version: VersionInfo,
    },
    TypeDef {
        name: Name,
        opaque: bool,
        standard: bool,
    },
    View {
        name: Name,
        language_id: LanguageId,
        standard: bool,
        filename: String,
    },
    ViewReference { name: Name, design_unit: Name },
    When { logic_ternary: bool },
    While { name: Name, do_while: bool },
}

impl Attrs {
    /// The default scalar payload of a freshly created node of `kind`.
    pub fn default_for(kind: NodeKind) -> Attrs {
        use NodeKind as K;
        match kind {
            K::Bit => Attrs::Bit { logic: false, resolved: false, flags: TypeFlags::default() },
            K::Bitvector => Attrs::Bitvector {
                logic: false,
                resolved: false,
                signed: false,
                flags: TypeFlags::default(),
            },
            K::Int => Attrs::Int { signed: true, flags: TypeFlags::default() },
            K::Array => Attrs::Array { signed: false, flags: TypeFlags::default() },
            K::Bool
            | K::Char
            | K::Enum
            | K::Event
            | K::File
            | K::Pointer
            | K::Real
            | K::Record
            | K::Reference
            | K::Signed
            | K::StringT
            | K::Time
            | K::Unsigned => Attrs::Type { flags: TypeFlags::default() },
            K::BitValue => Attrs::BitValue { value: BitConstant::Zero },
            K::BitvectorValue => Attrs::BitvectorValue { value: String::new() },
            K::BoolValue => Attrs::BoolValue { value: false },
            K::CharValue => Attrs::CharValue { value: '\0' },
            K::IntValue => Attrs::IntValue { value: 0 },
            K::RealValue => Attrs::RealValue { value: 0.0 },
            K::StringValue => Attrs::StringValue { value: String::new() },
            K::TimeValue => Attrs::TimeValue { value: 0.0, unit: TimeUnit::Ns },
            K::Expression => Attrs::Expression { operator: Operator::None },
            K::Range => Attrs::Range { direction: RangeDirection::Upto },
            K::Port | K::Parameter | K::PortAssign | K::ParameterAssign => {
                Attrs::PortLike { name: Name::default(), direction: PortDirection::None }
            }
            K::Library => Attrs::Library {
                name: Name::default(),
                filename: String::new(),
                standard: false,
                system: false,
            },
            K::LibraryDef => Attrs::LibraryDef {
                name: Name::default(),
                language_id: LanguageId::Rtl,
                standard: false,
            },
            K::StateTable => Attrs::StateTable {
                name: Name::default(),
                flavour: ProcessFlavour::Hdl,
                dont_initialize: false,
                standard: false,
            },
            K::Function | K::Procedure => {
                Attrs::SubProgram { name: Name::default(), standard: false }
            }
            K::Switch | K::With => Attrs::Case { case_semantics: CaseSemantics::Literal },
            K::System => Attrs::System {
                name: Name::default(),
                language_id: LanguageId::Rtl,
                version: VersionInfo::default(),
            },
            K::TypeDef => Attrs::TypeDef { name: Name::default(), opaque: false, standard: false },
            K::View => Attrs::View {
                name: Name::default(),
                language_id: LanguageId::Rtl,
                standard: false,
                filename: String::new(),
            },
            K::ViewReference => {
                Attrs::ViewReference { name: Name::default(), design_unit: Name::default() }
            }
            K::When => Attrs::When { logic_ternary: false },
            K::While => Attrs::While { name: Name::default(), do_while: false },
            K::Alias
            | K::Break
            | K::Const
            | K::Contents
            | K::Continue
            | K::DesignUnit
            | K::Entity
            | K::EnumValue
            | K::Field
            | K::FieldReference
            | K::For
            | K::ForGenerate
            | K::FunctionCall
            | K::Identifier
            | K::IfGenerate
            | K::Instance
            | K::ProcedureCall
            | K::RecordValueAlt
            | K::Signal
            | K::State
            | K::Transition
            | K::TypeReference
            | K::TypeTP
            | K::TypeTPAssign
            | K::ValueTP
            | K::ValueTPAssign
            | K::Variable => Attrs::Named { name: Name::default() },
            _ => Attrs::None,
        }
    }

    /// The node's name, when the kind carries one.
    pub fn name(&self) -> Option<&Name> {
        match self {
            Attrs::Named { name }
            | Attrs::PortLike { name, .. }
            | Attrs::Library { name, .. }
            | Attrs::LibraryDef { name, .. }
            | Attrs::StateTable { name, .. }
            | Attrs::SubProgram { name, .. }
            | Attrs::System { name, .. }
            | Attrs::TypeDef { name, .. }
            | Attrs::View { name, .. }
            | Attrs::ViewReference { name, .. }
            | Attrs::While { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Set the node's name. Returns `false` when the kind has no name.
    pub fn set_name(&mut self, new: Name) -> bool {
        match self {
            Attrs::Named { name }
            | Attrs::PortLike { name, .. }
            | Attrs::Library { name, .. }
            | Attrs::LibraryDef { name, .. }
            | Attrs::StateTable { name, .. }
            | Attrs::SubProgram { name, .. }
            | Attrs::System { name, .. }
            | Attrs::TypeDef { name, .. }
            | Attrs::View { name, .. }
            | Attrs::ViewReference { name, .. }
            | Attrs::While { name, .. } => {
                *name = new;
                true
            }
            _ => false,
        }
    }

    /// The `standard` flag of library-like declarations.
    pub fn is_standard(&self) -> bool {
        match self {
            Attrs::Library { standard, .. }
            | Attrs::LibraryDef { standard, .. }
            | Attrs::StateTable { standard, .. }
            | Attrs::SubProgram { standard, .. }
            | Attrs::TypeDef { standard, .. }
            | Attrs::View { standard, .. } => *standard,
            _ => false,
        }
    }

    pub fn set_standard(&mut self, value: bool) {
        match self {
            Attrs::Library { standard, .. }
            | Attrs::LibraryDef { standard, .. }
            | Attrs::StateTable { standard, .. }
            | Attrs::SubProgram { standard, .. }
            | Attrs::TypeDef { standard, .. }
            | Attrs::View { standard, .. } => *standard = value,
            _ => {}
        }
    }

    /// The port/parameter direction, when the kind carries one.
    pub fn direction(&self) -> Option<PortDirection> {
        match self {
            Attrs::PortLike { direction, .. } => Some(*direction),
            _ => None,
        }
    }

    pub fn type_flags(&self) -> Option<TypeFlags> {
        match self {
            Attrs::Type { flags }
            | Attrs::Bit { flags, .. }
            | Attrs::Bitvector { flags, .. }
            | Attrs::Int { flags, .. }
            | Attrs::Array { flags, .. } => Some(*flags),
            _ => None,
        }
    }

    pub fn type_flags_mut(&mut self) -> Option<&mut TypeFlags> {
        match self {
            Attrs::Type { flags }
            | Attrs::Bit { flags, .. }
            | Attrs::Bitvector { flags, .. }
            | Attrs::Int { flags, .. }
            | Attrs::Array { flags, .. } => Some(flags),
            _ => None,
        }
    }

    /// Structural equality with an optional blind spot for the constexpr
    /// flag of type nodes.
    pub fn equals(&self, other: &Attrs, check_constexpr: bool) -> bool {
        if check_constexpr {
            return self == other;
        }
        let mut a = self.clone();
        let mut b = other.clone();
        if let Some(fl) = a.type_flags_mut() {
            fl.constexpr_ = false;
        }
        if let Some(fl) = b.type_flags_mut() {
            fl.constexpr_ = false;
        }
        a == b
    }
}

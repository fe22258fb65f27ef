//! Closed enumerations of the format and their canonical strings.
//!
//! Every enum here round-trips through `as_str` / `parse`: the string
//! forms are part of the persisted XML format and must not change.

/// Direction of a range (array or bit span).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RangeDirection {
    /// Range from lower to higher index (`0 to 7`).
    #[default]
    Upto,
    /// Range from higher to lower index (`7 downto 0`).
    Downto,
}

impl RangeDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            RangeDirection::Upto => "UPTO",
            RangeDirection::Downto => "DOWNTO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "UPTO" => Some(RangeDirection::Upto),
            "DOWNTO" => Some(RangeDirection::Downto),
            _ => None,
        }
    }
}

/// Direction of a port or parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PortDirection {
    #[default]
    None,
    In,
    Out,
    Inout,
}

impl PortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            PortDirection::None => "NONE",
            PortDirection::In => "IN",
            PortDirection::Out => "OUT",
            PortDirection::Inout => "INOUT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NONE" => Some(PortDirection::None),
            "IN" => Some(PortDirection::In),
            "OUT" => Some(PortDirection::Out),
            "INOUT" => Some(PortDirection::Inout),
            _ => None,
        }
    }
}

/// Possible values of a single bit in digital logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BitConstant {
    /// Undefined.
    U,
    /// Unknown (X).
    X,
    /// Logical 0.
    #[default]
    Zero,
    /// Logical 1.
    One,
    /// High impedance (Z).
    Z,
    /// Weak unknown.
    W,
    /// Weak 0.
    L,
    /// Weak 1.
    H,
    /// Don't care.
    DontCare,
}

impl BitConstant {
    pub fn as_str(self) -> &'static str {
        match self {
            BitConstant::U => "U",
            BitConstant::X => "X",
            BitConstant::Zero => "0",
            BitConstant::One => "1",
            BitConstant::Z => "Z",
            BitConstant::W => "W",
            BitConstant::L => "L",
            BitConstant::H => "H",
            BitConstant::DontCare => "-",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "U" => Some(BitConstant::U),
            "X" => Some(BitConstant::X),
            "0" => Some(BitConstant::Zero),
            "1" => Some(BitConstant::One),
            "Z" => Some(BitConstant::Z),
            "W" => Some(BitConstant::W),
            "L" => Some(BitConstant::L),
            "H" => Some(BitConstant::H),
            "-" => Some(BitConstant::DontCare),
            _ => None,
        }
    }

    /// Whether the bit reads as true in a two-valued interpretation.
    pub fn is_high(self) -> bool {
        matches!(self, BitConstant::One | BitConstant::H)
    }

    /// Whether the value needs a 9-valued (logic) bit type to be represented.
    pub fn requires_logic(self) -> bool {
        !matches!(self, BitConstant::Zero | BitConstant::One)
    }
}

/// The HIF operator set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Operator {
    #[default]
    None,
    Plus,
    Minus,
    Mult,
    Div,
    /// Logical OR (`||`).
    Or,
    /// Bitwise OR (`|`).
    BOr,
    /// Logical AND (`&&`).
    And,
    /// Bitwise AND (`&`).
    BAnd,
    /// Logical XOR.
    Xor,
    /// Bitwise XOR (`^`).
    BXor,
    /// Logical NOT (`!`).
    Not,
    /// Bitwise NOT (`~`).
    BNot,
    Eq,
    CaseEq,
    Neq,
    CaseNeq,
    Le,
    Ge,
    Lt,
    Gt,
    Sll,
    Srl,
    Sla,
    Sra,
    Rol,
    Ror,
    Mod,
    Rem,
    Pow,
    Abs,
    Concat,
    /// Reference (`@`).
    Ref,
    /// Dereference (`$`).
    Deref,
    /// Reduction AND.
    AndRd,
    /// Reduction OR.
    OrRd,
    /// Reduction XOR.
    XorRd,
    /// Assignability check (`:=`).
    Assign,
    Log,
    /// Conversion check (`<--`).
    Conv,
    /// Bindability check (`-->`).
    Bind,
    Reverse,
    Size,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::None => "NONE",
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Mult => "*",
            Operator::Div => "/",
            Operator::Or => "||",
            Operator::BOr => "|",
            Operator::And => "&&",
            Operator::BAnd => "&",
            Operator::Xor => "^^",
            Operator::BXor => "^",
            Operator::Not => "!",
            Operator::BNot => "~",
            Operator::Eq => "==",
            Operator::CaseEq => "===",
            Operator::Neq => "!=",
            Operator::CaseNeq => "!==",
            Operator::Le => "<=",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Sll => "SLL",
            Operator::Srl => "SRL",
            Operator::Sla => "SLA",
            Operator::Sra => "SRA",
            Operator::Rol => "ROL",
            Operator::Ror => "ROR",
            Operator::Mod => "MOD",
            Operator::Rem => "REM",
            Operator::Pow => "POW",
            Operator::Abs => "ABS",
            Operator::Concat => "CONCAT",
            Operator::Ref => "@",
            Operator::Deref => "$",
            Operator::AndRd => "ANDRD",
            Operator::OrRd => "ORRD",
            Operator::XorRd => "XORRD",
            Operator::Assign => ":=",
            Operator::Log => "LOG",
            Operator::Conv => "<--",
            Operator::Bind => "-->",
            Operator::Reverse => "REVERSE",
            Operator::Size => "SIZE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        ALL_OPERATORS.iter().copied().find(|op| op.as_str() == s)
    }

    /// The `op_xxx` spelling, with an optional prefix and suffix
    /// (e.g. `"<p>op_and<s>"`).
    pub fn to_plain_string(self, prefix: &str, suffix: &str) -> String {
        format!("{prefix}{}{suffix}", self.plain_name())
    }

    /// Parse an `op_xxx` spelling, stripping the given prefix and suffix.
    pub fn from_plain_string(s: &str, prefix: &str, suffix: &str) -> Option<Self> {
        let s = s.strip_prefix(prefix)?;
        let s = s.strip_suffix(suffix)?;
        ALL_OPERATORS.iter().copied().find(|op| op.plain_name() == s)
    }

    pub fn plain_name(self) -> &'static str {
        match self {
            Operator::None => "op_none",
            Operator::Plus => "op_plus",
            Operator::Minus => "op_minus",
            Operator::Mult => "op_mult",
            Operator::Div => "op_div",
            Operator::Or => "op_or",
            Operator::BOr => "op_bor",
            Operator::And => "op_and",
            Operator::BAnd => "op_band",
            Operator::Xor => "op_xor",
            Operator::BXor => "op_bxor",
            Operator::Not => "op_not",
            Operator::BNot => "op_bnot",
            Operator::Eq => "op_eq",
            Operator::CaseEq => "op_case_eq",
            Operator::Neq => "op_neq",
            Operator::CaseNeq => "op_case_neq",
            Operator::Le => "op_le",
            Operator::Ge => "op_ge",
            Operator::Lt => "op_lt",
            Operator::Gt => "op_gt",
            Operator::Sll => "op_sll",
            Operator::Srl => "op_srl",
            Operator::Sla => "op_sla",
            Operator::Sra => "op_sra",
            Operator::Rol => "op_rol",
            Operator::Ror => "op_ror",
            Operator::Mod => "op_mod",
            Operator::Rem => "op_rem",
            Operator::Pow => "op_pow",
            Operator::Abs => "op_abs",
            Operator::Concat => "op_concat",
            Operator::Ref => "op_ref",
            Operator::Deref => "op_deref",
            Operator::AndRd => "op_andrd",
            Operator::OrRd => "op_orrd",
            Operator::XorRd => "op_xorrd",
            Operator::Assign => "op_assign",
            Operator::Log => "op_log",
            Operator::Conv => "op_conv",
            Operator::Bind => "op_bind",
            Operator::Reverse => "op_reverse",
            Operator::Size => "op_size",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Operator::Plus
                | Operator::Minus
                | Operator::Mult
                | Operator::Div
                | Operator::Mod
                | Operator::Rem
                | Operator::Pow
                | Operator::Abs
                | Operator::Log
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, Operator::Or | Operator::And | Operator::Xor | Operator::Not)
    }

    pub fn is_bitwise(self) -> bool {
        matches!(self, Operator::BOr | Operator::BAnd | Operator::BXor | Operator::BNot)
    }

    pub fn is_relational(self) -> bool {
        matches!(
            self,
            Operator::Eq
                | Operator::CaseEq
                | Operator::Neq
                | Operator::CaseNeq
                | Operator::Le
                | Operator::Ge
                | Operator::Lt
                | Operator::Gt
        )
    }

    pub fn is_equality(self) -> bool {
        matches!(self, Operator::Eq | Operator::CaseEq | Operator::Neq | Operator::CaseNeq)
    }

    pub fn is_shift(self) -> bool {
        matches!(
            self,
            Operator::Sll
                | Operator::Srl
                | Operator::Sla
                | Operator::Sra
                | Operator::Rol
                | Operator::Ror
        )
    }

    pub fn is_rotate(self) -> bool {
        matches!(self, Operator::Rol | Operator::Ror)
    }

    pub fn is_reduction(self) -> bool {
        matches!(self, Operator::AndRd | Operator::OrRd | Operator::XorRd)
    }

    pub fn is_unary(self) -> bool {
        matches!(
            self,
            Operator::Not
                | Operator::BNot
                | Operator::Abs
                | Operator::Ref
                | Operator::Deref
                | Operator::AndRd
                | Operator::OrRd
                | Operator::XorRd
                | Operator::Reverse
                | Operator::Size
        )
    }

    /// The relation operators used internally to check binding legality:
    /// `:=` (assignability), `<--` (conversion), `-->` (port binding).
    pub fn is_binding(self) -> bool {
        matches!(self, Operator::Assign | Operator::Conv | Operator::Bind)
    }

    pub fn is_commutative(self) -> bool {
        matches!(
            self,
            Operator::Plus
                | Operator::Mult
                | Operator::Or
                | Operator::BOr
                | Operator::And
                | Operator::BAnd
                | Operator::Xor
                | Operator::BXor
                | Operator::Eq
                | Operator::CaseEq
                | Operator::Neq
                | Operator::CaseNeq
        )
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) const ALL_OPERATORS: &[Operator] = &[
    Operator::None,
    Operator::Plus,
    Operator::Minus,
    Operator::Mult,
    Operator::Div,
    Operator::Or,
    Operator::BOr,
    Operator::And,
    Operator::BAnd,
    Operator::Xor,
    Operator::BXor,
    Operator::Not,
    Operator::BNot,
    Operator::Eq,
    Operator::CaseEq,
    Operator::Neq,
    Operator::CaseNeq,
    Operator::Le,
    Operator::Ge,
    Operator::Lt,
    Operator::Gt,
    Operator::Sll,
    Operator::Srl,
    Operator::Sla,
    Operator::Sra,
    Operator::Rol,
    Operator::Ror,
    Operator::Mod,
    Operator::Rem,
    Operator::Pow,
    Operator::Abs,
    Operator::Concat,
    Operator::Ref,
    Operator::Deref,
    Operator::AndRd,
    Operator::OrRd,
    Operator::XorRd,
    Operator::Assign,
    Operator::Log,
    Operator::Conv,
    Operator::Bind,
    Operator::Reverse,
    Operator::Size,
];

/// Kind of process a `StateTable` models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProcessFlavour {
    /// Like `sc_method`: locals are automatic, re-run on every activation.
    Method,
    /// Like `sc_thread`: runs once from simulation start.
    Thread,
    /// Like a VHDL/Verilog process: sensitivity-driven, locals persist.
    #[default]
    Hdl,
    /// Verilog `initial` block.
    Initial,
    /// Analog process (Verilog-AMS).
    Analog,
}

impl ProcessFlavour {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessFlavour::Method => "METHOD",
            ProcessFlavour::Thread => "THREAD",
            ProcessFlavour::Hdl => "HDL",
            ProcessFlavour::Initial => "INITIAL",
            ProcessFlavour::Analog => "ANALOG",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "METHOD" => Some(ProcessFlavour::Method),
            "THREAD" => Some(ProcessFlavour::Thread),
            "HDL" => Some(ProcessFlavour::Hdl),
            "INITIAL" => Some(ProcessFlavour::Initial),
            "ANALOG" => Some(ProcessFlavour::Analog),
            _ => None,
        }
    }
}

/// Language or abstraction level of a design unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LanguageId {
    #[default]
    Rtl,
    Tlm,
    Cpp,
    C,
    Psl,
    Ams,
}

impl LanguageId {
    pub fn as_str(self) -> &'static str {
        match self {
            LanguageId::Rtl => "RTL",
            LanguageId::Tlm => "TLM",
            LanguageId::Cpp => "CPP",
            LanguageId::C => "C",
            LanguageId::Psl => "PSL",
            LanguageId::Ams => "AMS",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "RTL" => Some(LanguageId::Rtl),
            "TLM" => Some(LanguageId::Tlm),
            "CPP" => Some(LanguageId::Cpp),
            "C" => Some(LanguageId::C),
            "PSL" => Some(LanguageId::Psl),
            "AMS" => Some(LanguageId::Ams),
            _ => None,
        }
    }
}

/// Matching semantics of `Switch` and `With` constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaseSemantics {
    /// Strict matching on each bit.
    #[default]
    Literal,
    /// `casez`: `z` bits are ignored.
    Z,
    /// `casex`: `x` bits are ignored.
    X,
}

impl CaseSemantics {
    pub fn as_str(self) -> &'static str {
        match self {
            CaseSemantics::Literal => "CASE_LITERAL",
            CaseSemantics::Z => "CASE_Z",
            CaseSemantics::X => "CASE_X",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CASE_LITERAL" => Some(CaseSemantics::Literal),
            "CASE_Z" => Some(CaseSemantics::Z),
            "CASE_X" => Some(CaseSemantics::X),
            _ => None,
        }
    }
}

/// Unit of a time literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeUnit {
    Fs,
    Ps,
    #[default]
    Ns,
    Us,
    Ms,
    S,
}

impl TimeUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Fs => "fs",
            TimeUnit::Ps => "ps",
            TimeUnit::Ns => "ns",
            TimeUnit::Us => "us",
            TimeUnit::Ms => "ms",
            TimeUnit::S => "s",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fs" => Some(TimeUnit::Fs),
            "ps" => Some(TimeUnit::Ps),
            "ns" => Some(TimeUnit::Ns),
            "us" => Some(TimeUnit::Us),
            "ms" => Some(TimeUnit::Ms),
            "s" => Some(TimeUnit::S),
            _ => None,
        }
    }
}

/// Variant tag carried by every type node.
///
/// `Native` is the canonical representation; the others mark a type that a
/// back-end must render through a specific wrapper of the destination
/// language (e.g. a Bitvector that must become an `sc_proxy` rather than a
/// `std::bitset`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TypeVariant {
    #[default]
    Native,
    VhdlBitvectorNumericStd,
    SystemCInt,
    SystemCBigInt,
    SystemCBitvectorProxy,
    SystemCBitvectorBase,
    SystemCBitref,
    CIntBitfield,
}

impl TypeVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeVariant::Native => "NATIVE_TYPE",
            TypeVariant::VhdlBitvectorNumericStd => "VHDL_BITVECTOR_NUMERIC_STD",
            TypeVariant::SystemCInt => "SYSTEMC_INT_SC_INT",
            TypeVariant::SystemCBigInt => "SYSTEMC_INT_SC_BIGINT",
            TypeVariant::SystemCBitvectorProxy => "SYSTEMC_BITVECTOR_PROXY",
            TypeVariant::SystemCBitvectorBase => "SYSTEMC_BITVECTOR_BASE",
            TypeVariant::SystemCBitref => "SYSTEMC_BIT_BITREF",
            TypeVariant::CIntBitfield => "C_INT_BITFIELD",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NATIVE_TYPE" => Some(TypeVariant::Native),
            "VHDL_BITVECTOR_NUMERIC_STD" => Some(TypeVariant::VhdlBitvectorNumericStd),
            "SYSTEMC_INT_SC_INT" => Some(TypeVariant::SystemCInt),
            "SYSTEMC_INT_SC_BIGINT" => Some(TypeVariant::SystemCBigInt),
            "SYSTEMC_BITVECTOR_PROXY" => Some(TypeVariant::SystemCBitvectorProxy),
            "SYSTEMC_BITVECTOR_BASE" => Some(TypeVariant::SystemCBitvectorBase),
            "SYSTEMC_BIT_BITREF" => Some(TypeVariant::SystemCBitref),
            "C_INT_BITFIELD" => Some(TypeVariant::CIntBitfield),
            _ => None,
        }
    }
}

/// Well-known property names attachable to any node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyId {
    /// Instance used only as a configuration flag.
    ConfigurationFlag,
    /// Forces the arrow operator (`->`) in C++ back-ends.
    TlmForceArrow,
    /// Macro required by the object.
    RequiredMacro,
    /// Macro required in headers.
    RequiredMacroHh,
    /// Macro required in implementation files.
    RequiredMacroCc,
    /// Marks an unsupported construct.
    Unsupported,
    /// Marks a constexpr call.
    Constexpr,
    /// Standard call with internal array access.
    MethodExplicitParameters,
    /// Marks a temporary object.
    TemporaryObject,
    /// Original bitwidth of a type before manipulation.
    OriginalBitwidth,
    /// Asynchronous companion process carved out of a synchronous cone;
    /// excluded from cone merging by the splitter.
    SkipFromSynchCone,
}

impl PropertyId {
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyId::ConfigurationFlag => "CONFIGURATION_FLAG",
            PropertyId::TlmForceArrow => "TLM_FORCEARROW",
            PropertyId::RequiredMacro => "REQUIRED_MACRO",
            PropertyId::RequiredMacroHh => "REQUIRED_MACRO_HH",
            PropertyId::RequiredMacroCc => "REQUIRED_MACRO_CC",
            PropertyId::Unsupported => "UNSUPPORTED",
            PropertyId::Constexpr => "CONSTEXPR",
            PropertyId::MethodExplicitParameters => "METHOD_EXPLICIT_PARAMETERS",
            PropertyId::TemporaryObject => "TEMPORARY_OBJECT",
            PropertyId::OriginalBitwidth => "ORIGINAL_BITWIDTH",
            PropertyId::SkipFromSynchCone => "SKIP_FROM_SYNCH_CONE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_strings_round_trip() {
        for &op in ALL_OPERATORS {
            assert_eq!(Operator::parse(op.as_str()), Some(op));
            assert_eq!(Operator::from_plain_string(&op.to_plain_string("", ""), "", ""), Some(op));
            assert_eq!(
                Operator::from_plain_string(&op.to_plain_string("hif_", "_op"), "hif_", "_op"),
                Some(op)
            );
        }
    }

    #[test]
    fn bit_constants_round_trip() {
        for s in ["U", "X", "0", "1", "Z", "W", "L", "H", "-"] {
            let b = BitConstant::parse(s).unwrap();
            assert_eq!(b.as_str(), s);
        }
        assert!(BitConstant::parse("q").is_none());
    }

    #[test]
    fn operator_classes_are_disjoint_where_expected() {
        assert!(Operator::Plus.is_arithmetic());
        assert!(!Operator::Plus.is_logical());
        assert!(Operator::And.is_logical());
        assert!(Operator::BAnd.is_bitwise());
        assert!(Operator::Sll.is_shift());
        assert!(Operator::Rol.is_rotate() && Operator::Rol.is_shift());
        assert!(Operator::CaseEq.is_relational());
        assert!(Operator::AndRd.is_reduction() && Operator::AndRd.is_unary());
    }

    #[test]
    fn enum_strings_round_trip() {
        for f in [
            ProcessFlavour::Method,
            ProcessFlavour::Thread,
            ProcessFlavour::Hdl,
            ProcessFlavour::Initial,
            ProcessFlavour::Analog,
        ] {
            assert_eq!(ProcessFlavour::parse(f.as_str()), Some(f));
        }
        for l in [
            LanguageId::Rtl,
            LanguageId::Tlm,
            LanguageId::Cpp,
            LanguageId::C,
            LanguageId::Psl,
            LanguageId::Ams,
        ] {
            assert_eq!(LanguageId::parse(l.as_str()), Some(l));
        }
        for c in [CaseSemantics::Literal, CaseSemantics::Z, CaseSemantics::X] {
            assert_eq!(CaseSemantics::parse(c.as_str()), Some(c));
        }
    }
}

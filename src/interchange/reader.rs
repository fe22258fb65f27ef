//! XML-to-tree deserialization.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::base::{
    BitConstant, CaseSemantics, CodeInfo, LanguageId, Operator, PortDirection, ProcessFlavour,
    RangeDirection, TimeUnit, TypeVariant,
};
use crate::ir::{Attrs, Name, NodeId, NodeKind, Tree, TypeFlags, VersionInfo, f, field_index};
use crate::semantics::Semantics;

use super::XmlError;

/// Options of [`parse_xml_with`].
#[derive(Default)]
pub struct ParseOptions<'a> {
    /// When set, standard library definitions persisted with an empty
    /// body are rehydrated from this semantics' bundled copy.
    pub rehydrate: Option<&'a dyn Semantics>,
}

/// Parse a persisted tree. Returns the tree and its root node.
pub fn parse_xml(input: &str) -> Result<(Tree, NodeId), XmlError> {
    parse_xml_with(input, &mut ParseOptions::default())
}

/// Parse a persisted tree with explicit options.
pub fn parse_xml_with(
    input: &str,
    opts: &mut ParseOptions<'_>,
) -> Result<(Tree, NodeId), XmlError> {
    let dom = parse_dom(input)?;
    let mut tree = Tree::new();
    let version = sniff_version(&dom);
    let root = build_node(&mut tree, &dom, version, opts)?;
    Ok((tree, root))
}

// ----------------------------------------------------------------------
// Lightweight DOM
// ----------------------------------------------------------------------

struct XElem {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<XElem>,
    text: String,
}

impl XElem {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }
}

fn parse_dom(input: &str) -> Result<XElem, XmlError> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);
    let mut stack: Vec<XElem> = Vec::new();
    let mut root: Option<XElem> = None;

    loop {
        match reader.read_event().map_err(XmlError::from)? {
            Event::Start(e) => {
                stack.push(elem_of(&e)?);
            }
            Event::Empty(e) => {
                let elem = elem_of(&e)?;
                attach(&mut stack, &mut root, elem)?;
            }
            Event::End(_) => {
                let elem = stack.pop().ok_or_else(|| XmlError::xml("unbalanced end tag"))?;
                attach(&mut stack, &mut root, elem)?;
            }
            Event::Text(t) => {
                if let Some(top) = stack.last_mut() {
                    let text = t.unescape().map_err(XmlError::from)?;
                    top.text.push_str(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    root.ok_or(XmlError::EmptyDocument)
}

fn elem_of(e: &quick_xml::events::BytesStart<'_>) -> Result<XElem, XmlError> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for a in e.attributes() {
        let a = a.map_err(|err| XmlError::xml(err.to_string()))?;
        let key = String::from_utf8_lossy(a.key.as_ref()).into_owned();
        let value = a.unescape_value().map_err(XmlError::from)?.into_owned();
        attrs.push((key, value));
    }
    Ok(XElem { name, attrs, children: Vec::new(), text: String::new() })
}

fn attach(
    stack: &mut [XElem],
    root: &mut Option<XElem>,
    elem: XElem,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(elem),
        None => {
            if root.is_some() {
                return Err(XmlError::xml("multiple root elements"));
            }
            *root = Some(elem);
        }
    }
    Ok(())
}

fn sniff_version(root: &XElem) -> u32 {
    root.attr("formatVersion")
        .and_then(|v| v.split('.').next())
        .and_then(|v| v.parse().ok())
        .unwrap_or(CURRENT_MAJOR)
}

const CURRENT_MAJOR: u32 = crate::ir::CURRENT_FORMAT_VERSION.0;

// ----------------------------------------------------------------------
// Attribute decoding
// ----------------------------------------------------------------------

fn bool_attr(elem: &XElem, name: &str) -> Result<bool, XmlError> {
    match elem.attr(name) {
        None => Ok(false),
        Some("true") => Ok(true),
        Some("false") => Ok(false),
        Some(other) => Err(XmlError::invalid("boolean", other)),
    }
}

fn name_attr(elem: &XElem) -> Name {
    Name::from(elem.attr("name").unwrap_or_default())
}

fn type_flags(elem: &XElem) -> Result<TypeFlags, XmlError> {
    let variant = match elem.attr("typeVariant") {
        None => TypeVariant::Native,
        Some(s) => TypeVariant::parse(s).ok_or_else(|| XmlError::invalid("typeVariant", s))?,
    };
    Ok(TypeFlags { constexpr_: bool_attr(elem, "constexpr")?, variant })
}

fn attrs_of(kind: NodeKind, elem: &XElem, version: u32) -> Result<Attrs, XmlError> {
    use NodeKind as K;
    let attrs = match kind {
        K::Bit => Attrs::Bit {
            logic: bool_attr(elem, "logic")?,
            resolved: bool_attr(elem, "resolved")?,
            flags: type_flags(elem)?,
        },
        K::Bitvector => Attrs::Bitvector {
            logic: bool_attr(elem, "logic")?,
            resolved: bool_attr(elem, "resolved")?,
            signed: bool_attr(elem, "signed")?,
            flags: type_flags(elem)?,
        },
        K::Int => Attrs::Int { signed: bool_attr(elem, "signed")?, flags: type_flags(elem)? },
        K::Array => {
            Attrs::Array { signed: bool_attr(elem, "signed")?, flags: type_flags(elem)? }
        }
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
        | K::Unsigned => Attrs::Type { flags: type_flags(elem)? },
        K::BitValue => {
            let v = elem.attr("value").ok_or_else(|| XmlError::missing_attribute("value"))?;
            Attrs::BitValue {
                value: BitConstant::parse(v)
                    .ok_or_else(|| XmlError::invalid("bit constant", v))?,
            }
        }
        K::BitvectorValue => Attrs::BitvectorValue {
            value: elem.attr("value").unwrap_or_default().to_string(),
        },
        K::BoolValue => Attrs::BoolValue { value: bool_attr(elem, "value")? },
        K::CharValue => {
            let v = elem.attr("value").unwrap_or_default();
            Attrs::CharValue { value: v.chars().next().unwrap_or('\0') }
        }
        K::IntValue => {
            let v = elem.attr("value").ok_or_else(|| XmlError::missing_attribute("value"))?;
            Attrs::IntValue {
                value: v.parse().map_err(|_| XmlError::invalid("integer", v))?,
            }
        }
        K::RealValue => {
            let v = elem.attr("value").ok_or_else(|| XmlError::missing_attribute("value"))?;
            Attrs::RealValue { value: v.parse().map_err(|_| XmlError::invalid("real", v))? }
        }
        K::StringValue => {
            Attrs::StringValue { value: elem.attr("value").unwrap_or_default().to_string() }
        }
        K::TimeValue => {
            let v = elem.attr("value").unwrap_or("0");
            let unit = elem.attr("unit").unwrap_or("ns");
            Attrs::TimeValue {
                value: v.parse().map_err(|_| XmlError::invalid("time", v))?,
                unit: TimeUnit::parse(unit).ok_or_else(|| XmlError::invalid("unit", unit))?,
            }
        }
        K::Expression => {
            // `operator` in current files, `op` before version 4.
            let op = match (elem.attr("operator"), elem.attr("op")) {
                (Some(s), _) => s,
                (None, Some(s)) if version < 4 => s,
                _ => return Err(XmlError::missing_attribute("operator")),
            };
            Attrs::Expression {
                operator: Operator::parse(op)
                    .ok_or_else(|| XmlError::invalid("operator", op))?,
            }
        }
        K::Range => {
            let d = elem.attr("direction").unwrap_or("UPTO");
            Attrs::Range {
                direction: RangeDirection::parse(d)
                    .ok_or_else(|| XmlError::invalid("direction", d))?,
            }
        }
        K::Port | K::Parameter | K::PortAssign | K::ParameterAssign => {
            let d = elem.attr("direction").unwrap_or("NONE");
            Attrs::PortLike {
                name: name_attr(elem),
                direction: PortDirection::parse(d)
                    .ok_or_else(|| XmlError::invalid("direction", d))?,
            }
        }
        K::Library => Attrs::Library {
            name: name_attr(elem),
            filename: elem.attr("filename").unwrap_or_default().to_string(),
            standard: bool_attr(elem, "standard")?,
            system: bool_attr(elem, "system")?,
        },
        K::LibraryDef => {
            let l = elem.attr("languageID").unwrap_or("RTL");
            Attrs::LibraryDef {
                name: name_attr(elem),
                language_id: LanguageId::parse(l)
                    .ok_or_else(|| XmlError::invalid("languageID", l))?,
                standard: bool_attr(elem, "standard")?,
            }
        }
        K::StateTable => {
            let fl = elem.attr("flavour").unwrap_or("HDL");
            Attrs::StateTable {
                name: name_attr(elem),
                flavour: ProcessFlavour::parse(fl)
                    .ok_or_else(|| XmlError::invalid("flavour", fl))?,
                dont_initialize: bool_attr(elem, "dontInitialize")?,
                standard: bool_attr(elem, "standard")?,
            }
        }
        K::Function | K::Procedure => Attrs::SubProgram {
            name: name_attr(elem),
            standard: bool_attr(elem, "standard")?,
        },
        K::Switch | K::With => {
            let c = elem.attr("caseSemantics").unwrap_or("CASE_LITERAL");
            Attrs::Case {
                case_semantics: CaseSemantics::parse(c)
                    .ok_or_else(|| XmlError::invalid("caseSemantics", c))?,
            }
        }
        K::System => {
            let l = elem.attr("languageID").unwrap_or("RTL");
            let version_info = match elem.attr("formatVersion") {
                None => VersionInfo::default(),
                Some(v) => {
                    let mut parts = v.split('.');
                    let major = parts
                        .next()
                        .and_then(|p| p.parse().ok())
                        .ok_or_else(|| XmlError::invalid("formatVersion", v))?;
                    let minor = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
                    VersionInfo { format_version_major: major, format_version_minor: minor }
                }
            };
            Attrs::System {
                name: name_attr(elem),
                language_id: LanguageId::parse(l)
                    .ok_or_else(|| XmlError::invalid("languageID", l))?,
                version: version_info,
            }
        }
        K::TypeDef => Attrs::TypeDef {
            name: name_attr(elem),
            opaque: bool_attr(elem, "opaque")?,
            standard: bool_attr(elem, "standard")?,
        },
        K::View => {
            let l = elem.attr("languageID").unwrap_or("RTL");
            Attrs::View {
                name: name_attr(elem),
                language_id: LanguageId::parse(l)
                    .ok_or_else(|| XmlError::invalid("languageID", l))?,
                standard: bool_attr(elem, "standard")?,
                filename: elem.attr("filename").unwrap_or_default().to_string(),
            }
        }
        K::ViewReference => Attrs::ViewReference {
            name: name_attr(elem),
            design_unit: Name::from(elem.attr("designUnit").unwrap_or_default()),
        },
        K::When => Attrs::When { logic_ternary: bool_attr(elem, "logicTernary")? },
        K::While => {
            Attrs::While { name: name_attr(elem), do_while: bool_attr(elem, "doWhile")? }
        }
        _ => {
            if matches!(Attrs::default_for(kind), Attrs::Named { .. }) {
                Attrs::Named { name: name_attr(elem) }
            } else {
                Attrs::None
            }
        }
    };
    Ok(attrs)
}

// ----------------------------------------------------------------------
// Node construction
// ----------------------------------------------------------------------

/// Legacy field spellings of pre-4 documents.
fn resolve_field(kind: NodeKind, elem_name: &str, version: u32) -> Option<&'static str> {
    if field_index(kind, elem_name).is_some() {
        return crate::ir::schema(kind).iter().find(|fd| fd.name == elem_name).map(|fd| fd.name);
    }
    if version < 4 {
        let alias = match elem_name {
            "LBOUND" => f::LEFTBOUND,
            "RBOUND" => f::RIGHTBOUND,
            "OP1" => f::VALUE1,
            "OP2" => f::VALUE2,
            "RANGE" if kind == NodeKind::StringT => f::SPANINFORMATION,
            _ => return None,
        };
        if field_index(kind, alias).is_some() {
            return Some(alias);
        }
    }
    None
}

fn build_node(
    tree: &mut Tree,
    elem: &XElem,
    version: u32,
    opts: &mut ParseOptions<'_>,
) -> Result<NodeId, XmlError> {
    let kind = NodeKind::from_class_id(&elem.name)
        .ok_or_else(|| XmlError::UnknownElement(elem.name.clone()))?;
    let id = tree.add(kind);
    *tree.attrs_mut(id) = attrs_of(kind, elem, version)?;

    for child in &elem.children {
        match child.name.as_str() {
            "CODE_INFO" => {
                let file = child.attr("file").unwrap_or_default();
                let line = child.attr("line_number").and_then(|v| v.parse().ok()).unwrap_or(0);
                let column =
                    child.attr("column_number").and_then(|v| v.parse().ok()).unwrap_or(0);
                tree.set_code_info(id, Some(CodeInfo::new(file, line, column)));
            }
            "PROPERTIES" => {
                for prop in &child.children {
                    let name = prop
                        .attr("name")
                        .ok_or_else(|| XmlError::missing_attribute("name"))?
                        .to_string();
                    let value = match prop.children.first() {
                        Some(v) => Some(build_node(tree, v, version, opts)?),
                        None => None,
                    };
                    tree.add_property(id, name, value);
                }
            }
            "COMMENTS" => {
                for c in &child.children {
                    tree.add_comment(id, c.text.clone());
                }
            }
            "ADDITIONAL_KEYWORDS" => {
                for k in &child.children {
                    tree.node_mut(id).additional_keywords.push(k.text.clone());
                }
            }
            other => {
                let field = resolve_field(kind, other, version).ok_or_else(|| {
                    XmlError::UnknownField {
                        parent: elem.name.clone(),
                        child: other.to_string(),
                    }
                })?;
                let is_list = crate::ir::schema(kind)
                    .iter()
                    .find(|fd| fd.name == field)
                    .map(|fd| fd.list)
                    .unwrap_or(false);
                if is_list {
                    for item in &child.children {
                        let c = build_node(tree, item, version, opts)?;
                        tree.list_push(id, field, c);
                    }
                } else {
                    if child.children.len() > 1 {
                        return Err(XmlError::SlotOverflow(field.to_string()));
                    }
                    if let Some(item) = child.children.first() {
                        let c = build_node(tree, item, version, opts)?;
                        tree.set_slot(id, field, Some(c));
                    }
                }
            }
        }
    }

    // A standard library persisted without a body is a placeholder for
    // the destination semantics' bundled copy.
    if kind == NodeKind::LibraryDef
        && tree.is_standard(id)
        && tree.list(id, f::DECLARATIONS).is_empty()
    {
        if let Some(sem) = opts.rehydrate {
            let name = tree.name_of(id);
            if let Some(bundled) = sem.standard_library(tree, &name) {
                for lib in tree.list_take(bundled, f::LIBRARIES) {
                    tree.list_push(id, f::LIBRARIES, lib);
                }
                for d in tree.list_take(bundled, f::DECLARATIONS) {
                    tree.list_push(id, f::DECLARATIONS, d);
                }
                tree.delete(bundled);
            }
        }
    }
    Ok(id)
}

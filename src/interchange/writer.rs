//! Tree-to-XML serialization.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::base::CodeInfo;
use crate::ir::{Attrs, Child, NodeId, Tree, schema};

use super::XmlError;

/// Options of [`write_xml`].
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Pretty-print with two-space indentation.
    pub indent: bool,
    /// Emit the `<?xml ...?>` declaration.
    pub declaration: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { indent: true, declaration: true }
    }
}

/// Serialize the subtree rooted at `node` into `out`.
pub fn write_xml(
    out: &mut dyn std::io::Write,
    tree: &Tree,
    node: NodeId,
    opts: &WriteOptions,
) -> Result<(), XmlError> {
    let bytes = render(tree, node, opts)?;
    out.write_all(&bytes)?;
    Ok(())
}

/// Serialize the subtree rooted at `node` to a string.
pub fn write_xml_string(tree: &Tree, node: NodeId, opts: &WriteOptions) -> Result<String, XmlError> {
    let bytes = render(tree, node, opts)?;
    String::from_utf8(bytes).map_err(|e| XmlError::xml(e.to_string()))
}

fn render(tree: &Tree, node: NodeId, opts: &WriteOptions) -> Result<Vec<u8>, XmlError> {
    let mut writer = if opts.indent {
        Writer::new_with_indent(Vec::new(), b' ', 2)
    } else {
        Writer::new(Vec::new())
    };
    if opts.declaration {
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(XmlError::from)?;
    }
    write_node(&mut writer, tree, node)?;
    Ok(writer.into_inner())
}

fn push_bool(start: &mut BytesStart<'_>, name: &str, value: bool) {
    if value {
        start.push_attribute((name, "true"));
    } else {
        start.push_attribute((name, "false"));
    }
}

fn scalar_attributes(tree: &Tree, node: NodeId, start: &mut BytesStart<'_>) {
    match tree.attrs(node) {
        Attrs::None => {}
        Attrs::Named { name } => start.push_attribute(("name", name.as_str())),
        Attrs::Type { flags } => {
            push_bool(start, "constexpr", flags.constexpr_);
            start.push_attribute(("typeVariant", flags.variant.as_str()));
        }
        Attrs::Bit { logic, resolved, flags } => {
            push_bool(start, "logic", *logic);
            push_bool(start, "resolved", *resolved);
            push_bool(start, "constexpr", flags.constexpr_);
            start.push_attribute(("typeVariant", flags.variant.as_str()));
        }
        Attrs::Bitvector { logic, resolved, signed, flags } => {
            push_bool(start, "logic", *logic);
            push_bool(start, "resolved", *resolved);
            push_bool(start, "signed", *signed);
            push_bool(start, "constexpr", flags.constexpr_);
            start.push_attribute(("typeVariant", flags.variant.as_str()));
        }
        Attrs::Int { signed, flags } | Attrs::Array { signed, flags } => {
            push_bool(start, "signed", *signed);
            push_bool(start, "constexpr", flags.constexpr_);
            start.push_attribute(("typeVariant", flags.variant.as_str()));
        }
        Attrs::BitValue { value } => start.push_attribute(("value", value.as_str())),
        Attrs::BitvectorValue { value } => start.push_attribute(("value", value.as_str())),
        Attrs::BoolValue { value } => push_bool(start, "value", *value),
        Attrs::CharValue { value } => {
            start.push_attribute(("value", value.to_string().as_str()));
        }
        Attrs::IntValue { value } => {
            start.push_attribute(("value", value.to_string().as_str()));
        }
        Attrs::RealValue { value } => {
            start.push_attribute(("value", value.to_string().as_str()));
        }
        Attrs::StringValue { value } => start.push_attribute(("value", value.as_str())),
        Attrs::TimeValue { value, unit } => {
            start.push_attribute(("value", value.to_string().as_str()));
            start.push_attribute(("unit", unit.as_str()));
        }
        Attrs::Expression { operator } => {
            start.push_attribute(("operator", operator.as_str()));
        }
        Attrs::Range { direction } => {
            start.push_attribute(("direction", direction.as_str()));
        }
        Attrs::PortLike { name, direction } => {
            start.push_attribute(("name", name.as_str()));
            start.push_attribute(("direction", direction.as_str()));
        }
        Attrs::Library { name, filename, standard, system } => {
            start.push_attribute(("name", name.as_str()));
            if !filename.is_empty() {
                start.push_attribute(("filename", filename.as_str()));
            }
            push_bool(start, "standard", *standard);
            push_bool(start, "system", *system);
        }
        Attrs::LibraryDef { name, language_id, standard } => {
            start.push_attribute(("name", name.as_str()));
            start.push_attribute(("languageID", language_id.as_str()));
            push_bool(start, "standard", *standard);
        }
        Attrs::StateTable { name, flavour, dont_initialize, standard } => {
            start.push_attribute(("name", name.as_str()));
            start.push_attribute(("flavour", flavour.as_str()));
            push_bool(start, "dontInitialize", *dont_initialize);
            push_bool(start, "standard", *standard);
        }
        Attrs::SubProgram { name, standard } => {
            start.push_attribute(("name", name.as_str()));
            push_bool(start, "standard", *standard);
        }
        Attrs::Case { case_semantics } => {
            start.push_attribute(("caseSemantics", case_semantics.as_str()));
        }
        Attrs::System { name, language_id, version } => {
            start.push_attribute(("name", name.as_str()));
            start.push_attribute(("languageID", language_id.as_str()));
            start.push_attribute((
                "formatVersion",
                format!("{}.{}", version.format_version_major, version.format_version_minor)
                    .as_str(),
            ));
        }
        Attrs::TypeDef { name, opaque, standard } => {
            start.push_attribute(("name", name.as_str()));
            push_bool(start, "opaque", *opaque);
            push_bool(start, "standard", *standard);
        }
        Attrs::View { name, language_id, standard, filename } => {
            start.push_attribute(("name", name.as_str()));
            start.push_attribute(("languageID", language_id.as_str()));
            push_bool(start, "standard", *standard);
            if !filename.is_empty() {
                start.push_attribute(("filename", filename.as_str()));
            }
        }
        Attrs::ViewReference { name, design_unit } => {
            start.push_attribute(("name", name.as_str()));
            start.push_attribute(("designUnit", design_unit.as_str()));
        }
        Attrs::When { logic_ternary } => push_bool(start, "logicTernary", *logic_ternary),
        Attrs::While { name, do_while } => {
            start.push_attribute(("name", name.as_str()));
            push_bool(start, "doWhile", *do_while);
        }
    }
}

fn write_node(
    writer: &mut Writer<Vec<u8>>,
    tree: &Tree,
    node: NodeId,
) -> Result<(), XmlError> {
    let kind = tree.kind(node);
    let tag = kind.class_id();
    let mut start = BytesStart::new(tag);
    scalar_attributes(tree, node, &mut start);

    let has_children = !tree.children(node).is_empty()
        || tree.code_info(node).is_some()
        || !tree.comments(node).is_empty()
        || !tree.node(node).additional_keywords.is_empty()
        || !tree.node(node).properties.is_empty();

    if !has_children {
        writer.write_event(Event::Empty(start)).map_err(XmlError::from)?;
        return Ok(());
    }
    writer.write_event(Event::Start(start)).map_err(XmlError::from)?;

    write_bookkeeping(writer, tree, node)?;

    for (idx, fd) in schema(kind).iter().enumerate() {
        match &tree.node(node).children[idx] {
            Child::Slot(None) => {}
            Child::Slot(Some(c)) => {
                writer
                    .write_event(Event::Start(BytesStart::new(fd.name)))
                    .map_err(XmlError::from)?;
                write_node(writer, tree, *c)?;
                writer
                    .write_event(Event::End(BytesEnd::new(fd.name)))
                    .map_err(XmlError::from)?;
            }
            Child::List(v) => {
                if v.is_empty() {
                    continue;
                }
                writer
                    .write_event(Event::Start(BytesStart::new(fd.name)))
                    .map_err(XmlError::from)?;
                for &c in v {
                    write_node(writer, tree, c)?;
                }
                writer
                    .write_event(Event::End(BytesEnd::new(fd.name)))
                    .map_err(XmlError::from)?;
            }
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new(tag)))
        .map_err(XmlError::from)?;
    Ok(())
}

fn write_bookkeeping(
    writer: &mut Writer<Vec<u8>>,
    tree: &Tree,
    node: NodeId,
) -> Result<(), XmlError> {
    if let Some(CodeInfo { file, line, column }) = tree.code_info(node) {
        let mut ci = BytesStart::new("CODE_INFO");
        ci.push_attribute(("file", file.as_str()));
        ci.push_attribute(("line_number", line.to_string().as_str()));
        ci.push_attribute(("column_number", column.to_string().as_str()));
        writer.write_event(Event::Empty(ci)).map_err(XmlError::from)?;
    }
    if !tree.node(node).properties.is_empty() {
        writer
            .write_event(Event::Start(BytesStart::new("PROPERTIES")))
            .map_err(XmlError::from)?;
        for (name, value) in &tree.node(node).properties {
            let mut p = BytesStart::new("PROPERTY");
            p.push_attribute(("name", name.as_str()));
            match value {
                None => writer.write_event(Event::Empty(p)).map_err(XmlError::from)?,
                Some(v) => {
                    writer.write_event(Event::Start(p)).map_err(XmlError::from)?;
                    write_node(writer, tree, *v)?;
                    writer
                        .write_event(Event::End(BytesEnd::new("PROPERTY")))
                        .map_err(XmlError::from)?;
                }
            }
        }
        writer
            .write_event(Event::End(BytesEnd::new("PROPERTIES")))
            .map_err(XmlError::from)?;
    }
    if !tree.comments(node).is_empty() {
        writer
            .write_event(Event::Start(BytesStart::new("COMMENTS")))
            .map_err(XmlError::from)?;
        for c in tree.comments(node) {
            writer
                .write_event(Event::Start(BytesStart::new("COMMENT")))
                .map_err(XmlError::from)?;
            writer
                .write_event(Event::Text(BytesText::new(c)))
                .map_err(XmlError::from)?;
            writer
                .write_event(Event::End(BytesEnd::new("COMMENT")))
                .map_err(XmlError::from)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("COMMENTS")))
            .map_err(XmlError::from)?;
    }
    if !tree.node(node).additional_keywords.is_empty() {
        writer
            .write_event(Event::Start(BytesStart::new("ADDITIONAL_KEYWORDS")))
            .map_err(XmlError::from)?;
        for k in &tree.node(node).additional_keywords {
            writer
                .write_event(Event::Start(BytesStart::new("KEYWORD")))
                .map_err(XmlError::from)?;
            writer
                .write_event(Event::Text(BytesText::new(k)))
                .map_err(XmlError::from)?;
            writer
                .write_event(Event::End(BytesEnd::new("KEYWORD")))
                .map_err(XmlError::from)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("ADDITIONAL_KEYWORDS")))
            .map_err(XmlError::from)?;
    }
    Ok(())
}

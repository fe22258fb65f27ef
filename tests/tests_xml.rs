//! XML persistence: round-tripping and legacy-format reading.

mod helpers;

use helpers::build_design;
use hif::base::{BitConstant, Operator, PortDirection, RangeDirection};
use hif::interchange::{WriteOptions, parse_xml, write_xml_string};
use hif::ir::{Factory, NodeKind, Tree, equals_between, f};

fn sample_tree() -> (Tree, hif::ir::NodeId) {
    let mut tree = Tree::new();
    let (system, view, contents) = build_design(&mut tree);

    let entity = tree.slot(view, f::ENTITY).unwrap();
    let mut fac = Factory::new(&mut tree);
    let bt = fac.bit_type(true, false);
    let din = fac.port("din", PortDirection::In, bt, None);
    let bt2 = fac.bit_type(true, false);
    let init = fac.bitval(BitConstant::Zero);
    let dout = fac.port("dout", PortDirection::Out, bt2, Some(init));
    tree.list_push(entity, f::PORTS, din);
    tree.list_push(entity, f::PORTS, dout);

    let mut fac = Factory::new(&mut tree);
    let span = fac.range_downto(7, 0);
    let bv = fac.bitvector_type(span, true, false);
    let reg = fac.signal("reg", bv, None);
    tree.list_push(contents, f::DECLARATIONS, reg);

    let mut fac = Factory::new(&mut tree);
    let cond_l = fac.identifier("din");
    let cond_r = fac.bitval(BitConstant::One);
    let cond = fac.expression(cond_l, Operator::Eq, cond_r);
    let lhs = fac.identifier("dout");
    let a = fac.identifier("reg");
    let i = fac.intval(0);
    let bit0 = fac.member(a, i);
    let assign = fac.assign(lhs, bit0);
    let alt = fac.if_alt(cond, [assign]);
    let if_stm = fac.if_stm([alt]);
    let st = fac.state_table("p", hif::base::ProcessFlavour::Hdl, false, [if_stm]);
    let sens = fac.identifier("din");
    tree.list_push(st, f::SENSITIVITY, sens);
    tree.list_push(contents, f::STATETABLES, st);

    tree.add_comment(st, "edge sampler");
    tree.add_property(st, "CONFIGURATION_FLAG", None);
    (tree, system)
}

#[test]
fn trees_round_trip_through_xml() {
    let (tree, system) = sample_tree();
    let xml = write_xml_string(&tree, system, &WriteOptions::default()).unwrap();
    assert!(xml.contains("<SYSTEM"));
    assert!(xml.contains("formatVersion=\"4.0\""));

    let (tree2, root2) = parse_xml(&xml).unwrap();
    assert!(
        equals_between(&tree, system, &tree2, root2, &Default::default()),
        "round-tripped tree differs"
    );

    // And a second pass is byte-stable.
    let xml2 = write_xml_string(&tree2, root2, &WriteOptions::default()).unwrap();
    assert_eq!(xml, xml2);
}

#[test]
fn comments_and_properties_survive() {
    let (tree, system) = sample_tree();
    let xml = write_xml_string(&tree, system, &WriteOptions::default()).unwrap();
    let (tree2, root2) = parse_xml(&xml).unwrap();
    let st = tree2
        .descendants(root2)
        .into_iter()
        .find(|&n| tree2.kind(n) == NodeKind::StateTable)
        .unwrap();
    assert_eq!(tree2.comments(st), &["edge sampler".to_string()]);
    assert!(tree2.has_property(st, "CONFIGURATION_FLAG"));
}

/// Documents written before format version 4 use `LBOUND`/`RBOUND`,
/// `OP1`/`OP2` and the `op` attribute.
#[test]
fn legacy_documents_are_accepted() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<SYSTEM name="legacy" languageID="RTL" formatVersion="1.0">
  <DECLARATIONS>
    <VARIABLE name="v">
      <TYPE>
        <INT signed="true" constexpr="false">
          <SPAN>
            <RANGE direction="DOWNTO">
              <LBOUND><INTVALUE value="7"/></LBOUND>
              <RBOUND><INTVALUE value="0"/></RBOUND>
            </RANGE>
          </SPAN>
        </INT>
      </TYPE>
      <VALUE>
        <EXPRESSION op="+">
          <OP1><INTVALUE value="1"/></OP1>
          <OP2><INTVALUE value="2"/></OP2>
        </EXPRESSION>
      </VALUE>
    </VARIABLE>
  </DECLARATIONS>
</SYSTEM>"#;

    let (tree, root) = parse_xml(xml).unwrap();
    assert_eq!(tree.kind(root), NodeKind::System);
    let v = tree.list(root, f::DECLARATIONS)[0];
    let ty = tree.slot(v, f::TYPE).unwrap();
    let span = tree.slot(ty, f::SPAN).unwrap();
    assert!(matches!(
        tree.attrs(span),
        hif::ir::Attrs::Range { direction: RangeDirection::Downto }
    ));
    assert_eq!(
        helpers::int_value(&tree, tree.slot(span, f::LEFTBOUND).unwrap()),
        Some(7)
    );
    let expr = tree.slot(v, f::VALUE).unwrap();
    assert_eq!(tree.operator(expr), Operator::Plus);
    assert!(tree.slot(expr, f::VALUE1).is_some());
    assert!(tree.slot(expr, f::VALUE2).is_some());
}

#[test]
fn unknown_elements_are_rejected() {
    assert!(parse_xml("<BOGUS/>").is_err());
    assert!(parse_xml("").is_err());
}

/// Round trip through an actual file, the way front-ends hand trees
/// over.
#[test]
fn trees_round_trip_through_files() {
    use std::io::Write as _;

    let (tree, system) = sample_tree();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    hif::interchange::write_xml(&mut file, &tree, system, &WriteOptions::default()).unwrap();
    file.flush().unwrap();

    let content = std::fs::read_to_string(file.path()).unwrap();
    let (tree2, root2) = parse_xml(&content).unwrap();
    assert!(equals_between(&tree, system, &tree2, root2, &Default::default()));
}

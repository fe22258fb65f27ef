//! The arena that owns every node of a HIF tree.
//!
//! Nodes are addressed by [`NodeId`]; parent/child relationships are index
//! links maintained by the structural operations. A node is owned by at
//! most one parent slot or list position at a time: attaching a node
//! somewhere detaches it from wherever it was.

use indexmap::IndexMap;

use crate::base::{CodeInfo, Operator, PortDirection, ProcessFlavour, PropertyId};

use super::attrs::{Attrs, Name};
use super::kind::NodeKind;
use super::schema::{FieldDef, field_index, schema};

/// Index of a node inside its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One child field of a node: a single slot or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    Slot(Option<NodeId>),
    List(Vec<NodeId>),
}

/// A node: kind tag, scalar payload, children per schema, bookkeeping.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) attrs: Attrs,
    pub(crate) children: Vec<Child>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) code_info: Option<CodeInfo>,
    pub(crate) comments: Vec<String>,
    pub(crate) additional_keywords: Vec<String>,
    pub(crate) properties: IndexMap<Name, Option<NodeId>>,
    pub(crate) alive: bool,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        let children = schema(kind)
            .iter()
            .map(|fd| if fd.list { Child::List(Vec::new()) } else { Child::Slot(None) })
            .collect();
        Node {
            kind,
            attrs: Attrs::default_for(kind),
            children,
            parent: None,
            code_info: None,
            comments: Vec::new(),
            additional_keywords: Vec::new(),
            properties: IndexMap::new(),
            alive: true,
        }
    }
}

/// Options for structural equality.
#[derive(Debug, Clone, Copy)]
pub struct EqualsOptions {
    /// Compare the span fields of type nodes.
    pub check_spans: bool,
    /// Compare the constexpr flag of type nodes.
    pub check_constexpr: bool,
    /// Compare only kinds and names, ignoring children and other scalars.
    pub check_only_names: bool,
}

impl Default for EqualsOptions {
    fn default() -> Self {
        Self { check_spans: true, check_constexpr: true, check_only_names: false }
    }
}

/// Exact position of a child inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildPos {
    pub field: usize,
    /// `None` for a slot, `Some(i)` for position `i` of a list.
    pub list_pos: Option<usize>,
}

/// Arena owning all nodes of one tree (plus any detached scratch nodes).
#[derive(Debug, Default, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a fresh, detached node of the given kind.
    pub fn add(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind));
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).alive
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn attrs(&self, id: NodeId) -> &Attrs {
        &self.node(id).attrs
    }

    pub fn attrs_mut(&mut self, id: NodeId) -> &mut Attrs {
        &mut self.node_mut(id).attrs
    }

    pub fn code_info(&self, id: NodeId) -> Option<&CodeInfo> {
        self.node(id).code_info.as_ref()
    }

    pub fn set_code_info(&mut self, id: NodeId, info: Option<CodeInfo>) {
        self.node_mut(id).code_info = info;
    }

    // ------------------------------------------------------------------
    // Field access
    // ------------------------------------------------------------------

    fn field_idx(&self, id: NodeId, field: &str) -> usize {
        match field_index(self.kind(id), field) {
            Some(i) => i,
            None => panic!("node {} ({:?}) has no field {field}", id, self.kind(id)),
        }
    }

    /// The schema of the node's kind.
    pub fn fields(&self, id: NodeId) -> &'static [FieldDef] {
        schema(self.kind(id))
    }

    pub fn has_field(&self, id: NodeId, field: &str) -> bool {
        field_index(self.kind(id), field).is_some()
    }

    /// Read a single-child slot.
    pub fn slot(&self, id: NodeId, field: &str) -> Option<NodeId> {
        match &self.node(id).children[self.field_idx(id, field)] {
            Child::Slot(s) => *s,
            Child::List(_) => panic!("field {field} of {:?} is a list", self.kind(id)),
        }
    }

    /// Write a single-child slot. The previous child (if any) is detached
    /// and returned; the new child is detached from its old parent first.
    pub fn set_slot(&mut self, id: NodeId, field: &str, new: Option<NodeId>) -> Option<NodeId> {
        let idx = self.field_idx(id, field);
        self.set_slot_at(id, idx, new)
    }

    pub(crate) fn set_slot_at(
        &mut self,
        id: NodeId,
        idx: usize,
        new: Option<NodeId>,
    ) -> Option<NodeId> {
        if let Some(n) = new {
            assert!(n != id, "cannot attach {n} to itself");
            self.detach(n);
        }
        let old = match &mut self.node_mut(id).children[idx] {
            Child::Slot(s) => std::mem::replace(s, new),
            Child::List(_) => panic!("field index {idx} of {:?} is a list", self.kind(id)),
        };
        if let Some(o) = old {
            self.node_mut(o).parent = None;
        }
        if let Some(n) = new {
            self.node_mut(n).parent = Some(id);
        }
        old
    }

    /// Read a child list.
    pub fn list(&self, id: NodeId, field: &str) -> &[NodeId] {
        match &self.node(id).children[self.field_idx(id, field)] {
            Child::List(v) => v,
            Child::Slot(_) => panic!("field {field} of {:?} is a slot", self.kind(id)),
        }
    }

    pub fn list_len(&self, id: NodeId, field: &str) -> usize {
        self.list(id, field).len()
    }

    pub fn list_push(&mut self, id: NodeId, field: &str, child: NodeId) {
        let idx = self.field_idx(id, field);
        self.list_insert_at(id, idx, usize::MAX, child);
    }

    pub fn list_insert(&mut self, id: NodeId, field: &str, pos: usize, child: NodeId) {
        let idx = self.field_idx(id, field);
        self.list_insert_at(id, idx, pos, child);
    }

    pub(crate) fn list_insert_at(&mut self, id: NodeId, idx: usize, pos: usize, child: NodeId) {
        assert!(child != id, "cannot attach {child} to itself");
        self.detach(child);
        match &mut self.node_mut(id).children[idx] {
            Child::List(v) => {
                let pos = pos.min(v.len());
                v.insert(pos, child);
            }
            Child::Slot(_) => panic!("field index {idx} of {:?} is a slot", self.kind(id)),
        }
        self.node_mut(child).parent = Some(id);
    }

    /// Remove a child from a list, detaching it. Returns `false` when the
    /// child was not in the list.
    pub fn list_remove(&mut self, id: NodeId, field: &str, child: NodeId) -> bool {
        let idx = self.field_idx(id, field);
        let removed = match &mut self.node_mut(id).children[idx] {
            Child::List(v) => {
                if let Some(pos) = v.iter().position(|&c| c == child) {
                    v.remove(pos);
                    true
                } else {
                    false
                }
            }
            Child::Slot(_) => panic!("field {field} of {:?} is a slot", self.kind(id)),
        };
        if removed {
            self.node_mut(child).parent = None;
        }
        removed
    }

    /// Detach and return all members of a list.
    pub fn list_take(&mut self, id: NodeId, field: &str) -> Vec<NodeId> {
        let idx = self.field_idx(id, field);
        let taken = match &mut self.node_mut(id).children[idx] {
            Child::List(v) => std::mem::take(v),
            Child::Slot(_) => panic!("field {field} of {:?} is a slot", self.kind(id)),
        };
        for &c in &taken {
            self.node_mut(c).parent = None;
        }
        taken
    }

    pub fn list_contains(&self, id: NodeId, field: &str, child: NodeId) -> bool {
        self.list(id, field).contains(&child)
    }

    /// All children in schema order (slots that are present, then the
    /// members of each list, interleaved per field declaration order).
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        for child in &self.node(id).children {
            match child {
                Child::Slot(Some(c)) => out.push(*c),
                Child::Slot(None) => {}
                Child::List(v) => out.extend_from_slice(v),
            }
        }
        out
    }

    /// Locate `child` inside `parent`.
    pub fn child_position(&self, parent: NodeId, child: NodeId) -> Option<ChildPos> {
        for (field, ch) in self.node(parent).children.iter().enumerate() {
            match ch {
                Child::Slot(Some(c)) if *c == child => {
                    return Some(ChildPos { field, list_pos: None });
                }
                Child::List(v) => {
                    if let Some(pos) = v.iter().position(|&c| c == child) {
                        return Some(ChildPos { field, list_pos: Some(pos) });
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Name of the field `child` occupies in `parent`.
    pub fn field_of(&self, parent: NodeId, child: NodeId) -> Option<&'static str> {
        let pos = self.child_position(parent, child)?;
        Some(schema(self.kind(parent))[pos.field].name)
    }

    /// Whether the node sits in a list (rather than a slot) of its parent.
    pub fn is_in_list(&self, id: NodeId) -> bool {
        match self.parent(id) {
            Some(p) => {
                matches!(self.child_position(p, id), Some(ChildPos { list_pos: Some(_), .. }))
            }
            None => false,
        }
    }

    /// Detach the node from its parent, leaving it parentless.
    pub fn detach(&mut self, id: NodeId) {
        let Some(p) = self.parent(id) else { return };
        if let Some(pos) = self.child_position(p, id) {
            match &mut self.node_mut(p).children[pos.field] {
                Child::Slot(s) => *s = None,
                Child::List(v) => {
                    v.retain(|&c| c != id);
                }
            }
        }
        self.node_mut(id).parent = None;
    }

    /// Replace `old` with `new` at old's position; `old` ends up detached.
    /// Returns `false` when `old` has no parent.
    pub fn replace(&mut self, old: NodeId, new: Option<NodeId>) -> bool {
        let Some(p) = self.parent(old) else { return false };
        let Some(pos) = self.child_position(p, old) else { return false };
        match pos.list_pos {
            None => {
                self.set_slot_at(p, pos.field, new);
            }
            Some(i) => {
                match &mut self.node_mut(p).children[pos.field] {
                    Child::List(v) => v.remove(i),
                    Child::Slot(_) => unreachable!(),
                };
                self.node_mut(old).parent = None;
                if let Some(n) = new {
                    self.list_insert_at(p, pos.field, i, n);
                }
            }
        }
        true
    }

    /// Recursively mark the subtree dead. The node is detached first.
    pub fn delete(&mut self, id: NodeId) {
        self.detach(id);
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            if !self.node(n).alive {
                continue;
            }
            self.node_mut(n).alive = false;
            stack.extend(self.children(n));
            let props: Vec<NodeId> =
                self.node(n).properties.values().filter_map(|v| *v).collect();
            stack.extend(props);
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Nearest ancestor (excluding the node) satisfying the predicate.
    pub fn nearest_parent(
        &self,
        id: NodeId,
        mut pred: impl FnMut(NodeKind) -> bool,
    ) -> Option<NodeId> {
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            if pred(self.kind(p)) {
                return Some(p);
            }
            cur = self.parent(p);
        }
        None
    }

    pub fn nearest_parent_of_kind(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.nearest_parent(id, |k| k == kind)
    }

    /// Whether `node` is inside the subtree rooted at `ancestor`
    /// (inclusive).
    pub fn is_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.parent(n);
        }
        false
    }

    /// Pre-order ids of the subtree rooted at `id` (inclusive).
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            let mut children = self.children(n);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    // ------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------

    pub fn add_property(&mut self, id: NodeId, name: impl Into<Name>, value: Option<NodeId>) {
        if let Some(v) = value {
            self.detach(v);
            self.node_mut(v).parent = Some(id);
        }
        self.node_mut(id).properties.insert(name.into(), value);
    }

    pub fn add_property_id(&mut self, id: NodeId, prop: PropertyId) {
        self.add_property(id, prop.as_str(), None);
    }

    pub fn has_property(&self, id: NodeId, name: &str) -> bool {
        self.node(id).properties.contains_key(name)
    }

    pub fn has_property_id(&self, id: NodeId, prop: PropertyId) -> bool {
        self.has_property(id, prop.as_str())
    }

    pub fn remove_property(&mut self, id: NodeId, name: &str) -> bool {
        match self.node_mut(id).properties.shift_remove(name) {
            Some(value) => {
                if let Some(v) = value {
                    self.node_mut(v).parent = None;
                    self.delete(v);
                }
                true
            }
            None => false,
        }
    }

    pub fn remove_property_id(&mut self, id: NodeId, prop: PropertyId) -> bool {
        self.remove_property(id, prop.as_str())
    }

    // ------------------------------------------------------------------
    // Attr conveniences
    // ------------------------------------------------------------------

    pub fn name(&self, id: NodeId) -> Option<Name> {
        self.attrs(id).name().cloned()
    }

    /// The node's name; panics when the kind carries none.
    pub fn name_of(&self, id: NodeId) -> Name {
        self.name(id)
            .unwrap_or_else(|| panic!("node {} ({:?}) has no name", id, self.kind(id)))
    }

    pub fn set_name(&mut self, id: NodeId, name: impl Into<Name>) {
        let name = name.into();
        if !self.attrs_mut(id).set_name(name) {
            panic!("node {} ({:?}) has no name", id, self.kind(id));
        }
    }

    pub fn operator(&self, id: NodeId) -> Operator {
        match self.attrs(id) {
            Attrs::Expression { operator } => *operator,
            _ => panic!("node {} is not an Expression", id),
        }
    }

    pub fn set_operator(&mut self, id: NodeId, op: Operator) {
        match self.attrs_mut(id) {
            Attrs::Expression { operator } => *operator = op,
            _ => panic!("node {} is not an Expression", id),
        }
    }

    pub fn direction(&self, id: NodeId) -> PortDirection {
        self.attrs(id).direction().unwrap_or(PortDirection::None)
    }

    pub fn set_direction(&mut self, id: NodeId, dir: PortDirection) {
        match self.attrs_mut(id) {
            Attrs::PortLike { direction, .. } => *direction = dir,
            _ => panic!("node {} has no direction", id),
        }
    }

    pub fn flavour(&self, id: NodeId) -> ProcessFlavour {
        match self.attrs(id) {
            Attrs::StateTable { flavour, .. } => *flavour,
            _ => panic!("node {} is not a StateTable", id),
        }
    }

    pub fn is_standard(&self, id: NodeId) -> bool {
        self.attrs(id).is_standard()
    }

    // ------------------------------------------------------------------
    // Copying and equality
    // ------------------------------------------------------------------

    /// Deep copy of a subtree inside this tree. The copy is detached.
    pub fn copy(&mut self, id: NodeId) -> NodeId {
        let kind = self.kind(id);
        let new = self.add(kind);
        self.clone_scalars(id, new);
        let children = self.node(id).children.clone();
        for (idx, child) in children.iter().enumerate() {
            match child {
                Child::Slot(Some(c)) => {
                    let nc = self.copy(*c);
                    self.set_slot_at(new, idx, Some(nc));
                }
                Child::Slot(None) => {}
                Child::List(v) => {
                    for &c in v {
                        let nc = self.copy(c);
                        self.list_insert_at(new, idx, usize::MAX, nc);
                    }
                }
            }
        }
        let props: Vec<(Name, Option<NodeId>)> =
            self.node(id).properties.iter().map(|(k, v)| (k.clone(), *v)).collect();
        for (k, v) in props {
            let nv = v.map(|v| self.copy(v));
            self.add_property(new, k, nv);
        }
        new
    }

    /// Shallow copy: scalars, bookkeeping and properties, no children.
    /// The copy is detached and its child fields are empty.
    pub fn copy_shallow(&mut self, id: NodeId) -> NodeId {
        let new = self.add(self.kind(id));
        self.clone_scalars(id, new);
        let props: Vec<(Name, Option<NodeId>)> =
            self.node(id).properties.iter().map(|(k, v)| (k.clone(), *v)).collect();
        for (k, v) in props {
            let nv = v.map(|v| self.copy(v));
            self.add_property(new, k, nv);
        }
        new
    }

    fn clone_scalars(&mut self, from: NodeId, to: NodeId) {
        let (attrs, info, comments, keywords) = {
            let n = self.node(from);
            (n.attrs.clone(), n.code_info.clone(), n.comments.clone(), n.additional_keywords.clone())
        };
        let n = self.node_mut(to);
        n.attrs = attrs;
        n.code_info = info;
        n.comments = comments;
        n.additional_keywords = keywords;
    }

    pub fn comments(&self, id: NodeId) -> &[String] {
        &self.node(id).comments
    }

    pub fn add_comment(&mut self, id: NodeId, text: impl Into<String>) {
        self.node_mut(id).comments.push(text.into());
    }

    /// Structural equality of two subtrees of this tree.
    pub fn equals(&self, a: NodeId, b: NodeId, opts: &EqualsOptions) -> bool {
        equals_between(self, a, self, b, opts)
    }

    /// Structural equality with default options.
    pub fn equal(&self, a: NodeId, b: NodeId) -> bool {
        self.equals(a, b, &EqualsOptions::default())
    }
}

/// Deep copy of a subtree from one tree into another. The copy is
/// detached in `dst`.
pub fn copy_between(src: &Tree, id: NodeId, dst: &mut Tree) -> NodeId {
    let new = dst.add(src.kind(id));
    {
        let n = src.node(id);
        let (attrs, info, comments, keywords) = (
            n.attrs.clone(),
            n.code_info.clone(),
            n.comments.clone(),
            n.additional_keywords.clone(),
        );
        let m = dst.node_mut(new);
        m.attrs = attrs;
        m.code_info = info;
        m.comments = comments;
        m.additional_keywords = keywords;
    }
    for (idx, child) in src.node(id).children.iter().enumerate() {
        match child {
            Child::Slot(Some(c)) => {
                let nc = copy_between(src, *c, dst);
                dst.set_slot_at(new, idx, Some(nc));
            }
            Child::Slot(None) => {}
            Child::List(v) => {
                for &c in v {
                    let nc = copy_between(src, c, dst);
                    dst.list_insert_at(new, idx, usize::MAX, nc);
                }
            }
        }
    }
    for (k, v) in src.node(id).properties.clone() {
        let nv = v.map(|v| copy_between(src, v, dst));
        dst.add_property(new, k, nv);
    }
    new
}

/// Shallow copy of one node (no children, but with properties) from one
/// tree into another.
pub fn copy_shallow_between(src: &Tree, id: NodeId, dst: &mut Tree) -> NodeId {
    let new = dst.add(src.kind(id));
    let n = src.node(id);
    let (attrs, info, comments, keywords) = (
        n.attrs.clone(),
        n.code_info.clone(),
        n.comments.clone(),
        n.additional_keywords.clone(),
    );
    let m = dst.node_mut(new);
    m.attrs = attrs;
    m.code_info = info;
    m.comments = comments;
    m.additional_keywords = keywords;
    for (k, v) in src.node(id).properties.clone() {
        let nv = v.map(|v| copy_between(src, v, dst));
        dst.add_property(new, k, nv);
    }
    new
}

/// Structural equality of subtrees living in possibly different trees.
pub fn equals_between(
    ta: &Tree,
    a: NodeId,
    tb: &Tree,
    b: NodeId,
    opts: &EqualsOptions,
) -> bool {
    let kind = ta.kind(a);
    if kind != tb.kind(b) {
        return false;
    }
    if opts.check_only_names {
        return ta.attrs(a).name() == tb.attrs(b).name();
    }
    if !ta.attrs(a).equals(tb.attrs(b), opts.check_constexpr) {
        return false;
    }
    for (idx, fd) in schema(kind).iter().enumerate() {
        if !opts.check_spans
            && kind.is_type()
            && (fd.name == super::schema::f::SPAN || fd.name == super::schema::f::SPANINFORMATION)
        {
            continue;
        }
        match (&ta.node(a).children[idx], &tb.node(b).children[idx]) {
            (Child::Slot(None), Child::Slot(None)) => {}
            (Child::Slot(Some(ca)), Child::Slot(Some(cb))) => {
                if !equals_between(ta, *ca, tb, *cb, opts) {
                    return false;
                }
            }
            (Child::List(va), Child::List(vb)) => {
                if va.len() != vb.len() {
                    return false;
                }
                for (&ca, &cb) in va.iter().zip(vb) {
                    if !equals_between(ta, ca, tb, cb, opts) {
                        return false;
                    }
                }
            }
            _ => return false,
        }
    }
    true
}

/// Deferred-deletion bag scoped to a pass.
#[derive(Debug, Default)]
pub struct Trash {
    items: Vec<NodeId>,
}

impl Trash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a node for deletion at pass end.
    pub fn throw(&mut self, id: NodeId) {
        self.items.push(id);
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.items.contains(&id)
    }

    /// Release everything collected so far.
    pub fn clear(&mut self, tree: &mut Tree) {
        for id in self.items.drain(..) {
            tree.delete(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::schema::f;
    use super::*;

    #[test]
    fn attach_detach_maintains_parent_links() {
        let mut t = Tree::new();
        let assign = t.add(NodeKind::Assign);
        let lhs = t.add(NodeKind::Identifier);
        let rhs = t.add(NodeKind::IntValue);
        t.set_slot(assign, f::LEFTHANDSIDE, Some(lhs));
        t.set_slot(assign, f::RIGHTHANDSIDE, Some(rhs));
        assert_eq!(t.parent(lhs), Some(assign));
        assert_eq!(t.children(assign), vec![lhs, rhs]);

        let old = t.set_slot(assign, f::RIGHTHANDSIDE, None);
        assert_eq!(old, Some(rhs));
        assert_eq!(t.parent(rhs), None);
    }

    #[test]
    fn attaching_elsewhere_detaches_first() {
        let mut t = Tree::new();
        let a = t.add(NodeKind::Return);
        let b = t.add(NodeKind::Return);
        let v = t.add(NodeKind::IntValue);
        t.set_slot(a, f::VALUE, Some(v));
        t.set_slot(b, f::VALUE, Some(v));
        assert_eq!(t.slot(a, f::VALUE), None);
        assert_eq!(t.parent(v), Some(b));
    }

    #[test]
    fn a_node_is_in_at_most_one_list() {
        let mut t = Tree::new();
        let s1 = t.add(NodeKind::State);
        let s2 = t.add(NodeKind::State);
        let act = t.add(NodeKind::Null);
        t.list_push(s1, f::ACTIONS, act);
        t.list_push(s2, f::ACTIONS, act);
        assert!(t.list(s1, f::ACTIONS).is_empty());
        assert_eq!(t.list(s2, f::ACTIONS), &[act]);
        assert!(t.is_in_list(act));
    }

    #[test]
    fn replace_keeps_list_position() {
        let mut t = Tree::new();
        let st = t.add(NodeKind::State);
        let a = t.add(NodeKind::Null);
        let b = t.add(NodeKind::Break);
        let c = t.add(NodeKind::Continue);
        t.list_push(st, f::ACTIONS, a);
        t.list_push(st, f::ACTIONS, b);
        let new = c;
        assert!(t.replace(b, Some(new)));
        assert_eq!(t.list(st, f::ACTIONS), &[a, new]);
        assert_eq!(t.parent(b), None);
    }

    #[test]
    fn copy_is_deep_and_detached() {
        let mut t = Tree::new();
        let e = t.add(NodeKind::Expression);
        t.set_operator(e, Operator::Plus);
        let l = t.add(NodeKind::IntValue);
        let r = t.add(NodeKind::IntValue);
        t.set_slot(e, f::VALUE1, Some(l));
        t.set_slot(e, f::VALUE2, Some(r));

        let e2 = t.copy(e);
        assert!(t.parent(e2).is_none());
        assert!(t.equal(e, e2));
        assert_ne!(t.slot(e, f::VALUE1), t.slot(e2, f::VALUE1));
    }

    #[test]
    fn equals_can_ignore_spans() {
        let mut t = Tree::new();
        let bv1 = t.add(NodeKind::Bitvector);
        let bv2 = t.add(NodeKind::Bitvector);
        let span = t.add(NodeKind::Range);
        t.set_slot(bv1, f::SPAN, Some(span));
        assert!(!t.equal(bv1, bv2));
        let opts = EqualsOptions { check_spans: false, ..Default::default() };
        assert!(t.equals(bv1, bv2, &opts));
    }

    #[test]
    fn delete_tombstones_the_subtree() {
        let mut t = Tree::new();
        let ret = t.add(NodeKind::Return);
        let v = t.add(NodeKind::IntValue);
        t.set_slot(ret, f::VALUE, Some(v));
        t.delete(ret);
        assert!(!t.is_alive(ret));
        assert!(!t.is_alive(v));
    }
}

//! The HIF node model: kinds, field schema, arena tree, fluent builder.
//!
//! Nodes form a closed set of kinds ([`NodeKind`]), each with a static
//! schema of owned child fields ([`schema`]) whose names double as the
//! XML child-element tags. The [`Tree`] arena owns every node and
//! maintains the single-parent invariant through its structural
//! operations.

mod attrs;
mod factory;
mod kind;
mod schema;
mod tree;

pub use attrs::{Attrs, CURRENT_FORMAT_VERSION, Name, TypeFlags, VersionInfo};
pub use factory::Factory;
pub use kind::{ALL_KINDS, AncestorClass, NodeKind};
pub use schema::{FieldDef, f, field_index, schema};
pub use tree::{
    Child, ChildPos, EqualsOptions, Node, NodeId, Trash, Tree, copy_between,
    copy_shallow_between, equals_between,
};

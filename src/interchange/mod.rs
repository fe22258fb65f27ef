//! XML persistence for HIF trees.
//!
//! One element per node, tagged by the node's class id. Scalar fields
//! become attributes (`"true"`/`"false"` booleans, canonical enum
//! strings); child fields become nested elements named after the field;
//! `CODE_INFO`, `PROPERTIES`, `COMMENTS` and `ADDITIONAL_KEYWORDS`
//! children are emitted uniformly on any node carrying them. The root
//! `SYSTEM` element carries `formatVersion="M.m"`.
//!
//! The reader accepts both the current format (`>= 4`) and the legacy
//! one (`< 4`): `LBOUND`/`RBOUND` for range bounds, `OP1`/`OP2` for
//! expression operands, the `op` attribute for the operator, and
//! `RANGE` for a String's span information.

mod error;
mod reader;
mod writer;

pub use error::XmlError;
pub use reader::{ParseOptions, parse_xml, parse_xml_with};
pub use writer::{WriteOptions, write_xml, write_xml_string};

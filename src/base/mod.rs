//! Foundation types for the HIF toolchain.
//!
//! This module provides the primitives used throughout the IR:
//! - The closed enumerations of the format (directions, bit constants,
//!   operators, process flavours, language ids, case semantics) with their
//!   canonical, round-trippable string forms
//! - [`CodeInfo`] - source location triples attached to nodes
//! - [`PropertyId`] - the well-known property names
//!
//! This module has NO dependencies on other hif modules.

mod code_info;
mod enums;

pub use code_info::CodeInfo;
pub use enums::{
    BitConstant, CaseSemantics, LanguageId, Operator, PortDirection, ProcessFlavour, PropertyId,
    RangeDirection, TimeUnit, TypeVariant,
};

//! # hif-base
//!
//! Core library for the Hardware Intermediate Format (HIF): a typed
//! in-memory IR for hardware description and C-family languages, the
//! cross-semantics standardization engine that rewrites a tree produced
//! under one language's rules into an equivalent tree under another's,
//! and the process analysis passes that recover and split the logical
//! structure of HDL processes.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! interchange → XML persistence of trees
//!   ↓
//! analysis    → process classification and mixed-process splitting
//!   ↓
//! standardization → cross-semantics engine, symbol mapper, cast manager
//!   ↓
//! manipulation → tree surgery: matched insert, folding, argument sorting
//!   ↓
//! visit       → flat / guide / ancestor visitor dispatch
//!   ↓
//! semantics   → Semantics trait, typing context, declaration resolution
//!   ↓
//! ir          → node kinds, field schema, arena tree, builder
//!   ↓
//! base        → primitives: enums, source locations, properties
//! ```

/// Foundation types: enums, canonical strings, source locations
pub mod base;

/// Node model: kinds, field schema, arena tree, fluent builder
pub mod ir;

/// Visitor dispatch: flat, guide, and ancestor visitors
pub mod visit;

/// Language semantics interface, typing context, declaration resolution
pub mod semantics;

/// Tree surgery services shared by the passes
pub mod manipulation;

/// Cross-semantics standardization engine and its companion passes
pub mod standardization;

/// Process classification and mixed-process splitting
pub mod analysis;

/// XML persistence for HIF trees
pub mod interchange;

// Re-export the types nearly every user touches.
pub use base::{
    BitConstant, CaseSemantics, CodeInfo, LanguageId, Operator, PortDirection, ProcessFlavour,
    PropertyId, RangeDirection, TimeUnit, TypeVariant,
};
pub use ir::{Child, Factory, Name, NodeId, NodeKind, Tree};
pub use semantics::{SemanticError, Semantics};

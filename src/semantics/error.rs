//! Error type shared by the semantic passes.

use thiserror::Error;

/// Fatal failures of the semantic passes.
///
/// These correspond to the unrecoverable categories of the error design:
/// ill-typed source trees, missing destination mappings, unsupported
/// standard symbols and broken structural expectations. Recoverable
/// conditions (an unclassifiable process, an unsplittable process) are
/// reported on the log channel instead and never surface here.
#[derive(Debug, Error)]
pub enum SemanticError {
    /// A value the pass must type has no type under the active semantics.
    #[error("cannot type {what} at node {node}")]
    Untypable { what: &'static str, node: String },

    /// The source tree was ill-typed to begin with.
    #[error("operation not allowed in source semantics at node {0}")]
    SourceTyping(String),

    /// No cast strategy makes the operation well-typed in the
    /// destination semantics.
    #[error("cannot map operation into destination semantics: {0}")]
    MappingFailed(String),

    /// `map_standard_symbol` returned `Unsupported`.
    #[error("unsupported standard symbol: {0}")]
    UnsupportedSymbol(String),

    /// A symbol has no resolvable declaration.
    #[error("declaration not found for {0}")]
    UnresolvedSymbol(String),

    /// `explicit_cast` refused a cast the engine produced.
    #[error("cast not managed by destination semantics at node {0}")]
    CastNotManaged(String),

    /// An impossible node configuration.
    #[error("{0}")]
    Structure(String),
}

impl SemanticError {
    pub fn untypable(what: &'static str, node: impl ToString) -> Self {
        SemanticError::Untypable { what, node: node.to_string() }
    }

    pub fn structure(msg: impl Into<String>) -> Self {
        SemanticError::Structure(msg.into())
    }
}

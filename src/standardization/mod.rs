//! Cross-semantics standardization.
//!
//! The engine rewrites a tree produced under a *source* language
//! semantics into a structurally equivalent tree that is well-typed
//! under a *destination* semantics: types are remapped, casts inserted,
//! spans rebased, operators retargeted, arguments sorted. Two companion
//! passes finish the job: the symbol mapper retargets standard-library
//! symbols, the cast manager re-expresses every inserted cast in the
//! destination's idiom.
//!
//! The usual pipeline is:
//!
//! ```text
//! let (mut dst, root, mut casts) = standardize_hif(&mut src, sys, &vhdl, &sc)?;
//! map_standard_symbols(&mut dst, root, &vhdl, &sc)?;
//! manage_casts(&mut dst, root, &vhdl, &sc, &mut casts)?;
//! ```

mod casts;
mod engine;
mod precision;
mod symbols;

pub use casts::manage_casts;
pub use engine::standardize_hif;
pub use precision::{PrecisionOrdering, compare_precision};
pub use symbols::map_standard_symbols;

use rustc_hash::FxHashMap;

use crate::ir::NodeId;

/// For every cast the engine inserted into the destination tree, the
/// original (pre-mapping) source type, copied into the destination
/// arena. The cast manager hands it to `explicit_cast` so a destination
/// semantics knows what the value was cast *from*.
pub type CastMap = FxHashMap<NodeId, NodeId>;

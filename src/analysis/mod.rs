//! Process analysis: classification of HDL-style processes and
//! splitting of mixed processes into synthesizable single-kind ones.

mod processes;
mod sort;
mod split;

pub use processes::analyze_processes;
pub use sort::sort_graph;
pub use split::split_mixed_processes;

use indexmap::{IndexMap, IndexSet};

use crate::ir::{Name, NodeId};

/// Classification of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessKind {
    /// Level-sensitive combinational logic.
    #[default]
    Asynchronous,
    /// Clocked on the declared clock.
    Synchronous,
    /// Clocked on a signal that is not the declared clock.
    DerivedSynchronous,
    /// Both synchronous and asynchronous characteristics; must be split.
    Mixed,
    /// Mixed, with a derived clock.
    DerivedMixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetKind {
    #[default]
    NoReset,
    SynchronousReset,
    AsynchronousReset,
    DerivedSynchronousReset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkingEdge {
    #[default]
    NoEdge,
    Rising,
    Falling,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetPhase {
    #[default]
    NoPhase,
    High,
    Low,
}

/// The canonical body shapes the analyzer recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessStyle {
    #[default]
    NoStyle,
    /// `if (reset == ...) A else if (clock_event && clock == ...) B`
    Style1,
    /// `if (clock == ...) { [if (reset) ... else ...] ... }`
    Style2,
    /// switch on a state register inside a clocked process.
    Style3,
    /// A sequence of Style-1/2 blocks.
    Style4,
    /// A single clocked assignment.
    Style5,
    /// `if (reset) ... else ...` inside a clocked process.
    Style6,
}

/// Everything the analyzer learned about one process.
#[derive(Debug, Clone, Default)]
pub struct ProcessInfos {
    pub process_kind: ProcessKind,
    pub reset_kind: ResetKind,
    pub working_edge: WorkingEdge,
    pub reset_phase: ResetPhase,
    pub process_style: ProcessStyle,
    /// Level-sensitive entries of the sensitivity list (declarations).
    pub sensitivity: IndexSet<NodeId>,
    pub rising_sensitivity: IndexSet<NodeId>,
    pub falling_sensitivity: IndexSet<NodeId>,
    /// Signals and ports read by the body.
    pub inputs: IndexSet<NodeId>,
    /// Signals and ports written by the body.
    pub outputs: IndexSet<NodeId>,
    /// Variables read by the body.
    pub input_variables: IndexSet<NodeId>,
    /// Variables written by the body.
    pub output_variables: IndexSet<NodeId>,
    pub clock: Option<NodeId>,
    pub reset: Option<NodeId>,
}

impl ProcessInfos {
    /// Number of distinct declarations across the three sensitivity
    /// buckets.
    pub fn sensitivity_size(&self) -> usize {
        let mut all = self.sensitivity.clone();
        all.extend(self.rising_sensitivity.iter().copied());
        all.extend(self.falling_sensitivity.iter().copied());
        all.len()
    }

    pub fn is_in_sensitivity(&self, decl: NodeId) -> bool {
        self.sensitivity.contains(&decl)
            || self.rising_sensitivity.contains(&decl)
            || self.falling_sensitivity.contains(&decl)
    }

    /// Some sensitivity entry that is not `other`.
    pub fn other_sensitivity_entry(&self, other: Option<NodeId>) -> Option<NodeId> {
        self.sensitivity
            .iter()
            .chain(self.rising_sensitivity.iter())
            .chain(self.falling_sensitivity.iter())
            .copied()
            .find(|&d| Some(d) != other)
    }
}

/// Options of the analyzer (and, through it, the splitter).
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Name of the design's clock, when known.
    pub clock: Option<Name>,
    /// Name of the design's reset, when known.
    pub reset: Option<Name>,
    /// Ignore symbols resolving into standard libraries.
    pub skip_standard_declarations: bool,
    /// Emit warnings for processes that resist classification.
    pub print_warnings: bool,
}

/// Per-process analysis results, keyed by the process node (a
/// StateTable, or an Assign for global continuous assignments).
pub type ProcessMap = IndexMap<NodeId, ProcessInfos>;

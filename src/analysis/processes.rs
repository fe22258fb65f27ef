//! Process classification.
//!
//! Each process (StateTable with a non-initial flavour) receives a
//! [`ProcessInfos`] record built in two phases: first from its
//! sensitivity lists (intersected with the design's declared clock and
//! reset names), then from the shape of its body, matched against six
//! canonical styles. The two views are merged; a merge conflict
//! invalidates the style.

use tracing::warn;

use crate::base::Operator;
use crate::ir::{NodeId, NodeKind, Tree, f};
use crate::manipulation::{
    constant_as_int, is_in_lhs, sensitivity_field_of, skip_casts,
};
use crate::semantics::resolve::{collect_symbols, declaration_of};
use crate::semantics::typing::TypeContext;
use crate::semantics::{SemanticError, Semantics};

use super::{
    AnalyzeOptions, ProcessInfos, ProcessKind, ProcessMap, ProcessStyle, ResetKind, ResetPhase,
    WorkingEdge,
};

/// Classify every process under `root` into `map`.
///
/// Processes containing `wait` statements are rejected. A process whose
/// body matches no style and is not asynchronous by sensitivity is
/// reported on the log channel and left with its sensitivity-derived
/// classification.
pub fn analyze_processes(
    tree: &mut Tree,
    root: NodeId,
    map: &mut ProcessMap,
    sem: &dyn Semantics,
    opts: &AnalyzeOptions,
) -> Result<bool, SemanticError> {
    let _span = tracing::info_span!("analyze_processes").entered();
    let mut analyzer = Analyzer { tree, sem, opts, ctx: TypeContext::new() };

    for id in analyzer.tree.descendants(root) {
        if !analyzer.tree.is_alive(id) {
            continue;
        }
        match analyzer.tree.kind(id) {
            NodeKind::StateTable => {
                if !analyzer.is_process(id) {
                    continue;
                }
                let infos = analyzer.analyze_process(id)?;
                map.insert(id, infos);
            }
            NodeKind::GlobalAction => {
                for a in analyzer.tree.list(id, f::ACTIONS).to_vec() {
                    if analyzer.tree.kind(a) != NodeKind::Assign {
                        return Err(SemanticError::structure(
                            "global action contains a non-assignment",
                        ));
                    }
                    let infos = analyzer.analyze_global_assign(a)?;
                    map.insert(a, infos);
                }
            }
            _ => {}
        }
    }
    Ok(true)
}

struct Analyzer<'a> {
    tree: &'a mut Tree,
    sem: &'a dyn Semantics,
    opts: &'a AnalyzeOptions,
    ctx: TypeContext,
}

impl Analyzer<'_> {
    /// A process is a StateTable with a non-initial flavour that does
    /// not implement a subprogram body.
    fn is_process(&self, st: NodeId) -> bool {
        if self.tree.flavour(st) == crate::base::ProcessFlavour::Initial {
            return false;
        }
        match self.tree.parent(st) {
            Some(p) => !self.tree.kind(p).is_subprogram(),
            None => true,
        }
    }

    fn analyze_process(&mut self, st: NodeId) -> Result<ProcessInfos, SemanticError> {
        // Wait statements are not supported by the classification.
        if self
            .tree
            .descendants(st)
            .iter()
            .any(|&n| self.tree.is_alive(n) && self.tree.kind(n) == NodeKind::Wait)
        {
            return Err(SemanticError::structure(format!(
                "process {} contains wait statements",
                self.tree.name(st).unwrap_or_default()
            )));
        }
        let mut infos = ProcessInfos::default();
        self.classify_signals(&mut infos, st)?;
        self.classify_wrt_sensitivity(&mut infos);
        self.classify_process_body(&mut infos, st)?;
        Ok(infos)
    }

    fn analyze_global_assign(&mut self, assign: NodeId) -> Result<ProcessInfos, SemanticError> {
        let mut infos = ProcessInfos::default();
        self.classify_signals(&mut infos, assign)?;
        // For continuous assignments every read signal is sensitivity.
        let inputs: Vec<NodeId> = infos.inputs.iter().copied().collect();
        infos.sensitivity.extend(inputs);
        Ok(infos)
    }

    // ------------------------------------------------------------------
    // Phase 0: read/write/sensitivity sets
    // ------------------------------------------------------------------

    fn classify_signals(
        &mut self,
        infos: &mut ProcessInfos,
        proc: NodeId,
    ) -> Result<(), SemanticError> {
        for sym in collect_symbols(self.tree, proc) {
            let Some(decl) = declaration_of(self.tree, sym, self.sem, &mut self.ctx) else {
                continue;
            };
            if self.opts.skip_standard_declarations && self.is_standard_declaration(decl) {
                continue;
            }
            let dk = self.tree.kind(decl);
            let is_var = dk == NodeKind::Variable;
            if !matches!(dk, NodeKind::Signal | NodeKind::Port | NodeKind::Variable) {
                continue;
            }
            if let Some(bucket) = sensitivity_field_of(self.tree, sym) {
                if is_var {
                    return Err(SemanticError::structure(
                        "variable in a sensitivity list",
                    ));
                }
                match bucket {
                    f::SENSITIVITYPOS => infos.rising_sensitivity.insert(decl),
                    f::SENSITIVITYNEG => infos.falling_sensitivity.insert(decl),
                    _ => infos.sensitivity.insert(decl),
                };
            } else if is_in_lhs(self.tree, sym) {
                if is_var {
                    infos.output_variables.insert(decl);
                } else {
                    infos.outputs.insert(decl);
                }
            } else if is_var {
                infos.input_variables.insert(decl);
            } else {
                infos.inputs.insert(decl);
            }
        }
        Ok(())
    }

    fn is_standard_declaration(&self, decl: NodeId) -> bool {
        let mut cur = Some(decl);
        while let Some(n) = cur {
            if self.tree.kind(n) == NodeKind::LibraryDef && self.tree.is_standard(n) {
                return true;
            }
            cur = self.tree.parent(n);
        }
        false
    }

    // ------------------------------------------------------------------
    // Phase 1: sensitivity
    // ------------------------------------------------------------------

    fn classify_wrt_sensitivity(&mut self, infos: &mut ProcessInfos) {
        infos.process_kind = ProcessKind::Asynchronous;
        infos.reset_kind = ResetKind::NoReset;
        infos.working_edge = WorkingEdge::NoEdge;
        infos.reset_phase = ResetPhase::NoPhase;

        if self.opts.clock.is_none() && self.opts.reset.is_none() {
            return;
        }
        let clock_name = self.opts.clock.as_deref();
        let reset_name = self.opts.reset.as_deref();

        let (mut clock_pos, mut clock_neg) = (false, false);
        let (mut reset_pos, mut reset_neg) = (false, false);
        let mut asynch = 0usize;
        let mut asynch_pos = 0usize;
        let mut asynch_neg = 0usize;
        let mut asynch_name: Option<crate::ir::Name> = None;
        let mut asynch_pos_name: Option<crate::ir::Name> = None;
        let mut asynch_neg_name: Option<crate::ir::Name> = None;

        for &d in &infos.sensitivity {
            let n = self.tree.name(d).unwrap_or_default();
            if Some(n.as_str()) == clock_name {
                infos.clock = Some(d);
                clock_pos = true;
                clock_neg = true;
            } else if Some(n.as_str()) == reset_name {
                infos.reset = Some(d);
                reset_pos = true;
                reset_neg = true;
            } else {
                asynch += 1;
                asynch_name = Some(n);
            }
        }
        for &d in &infos.rising_sensitivity {
            let n = self.tree.name(d).unwrap_or_default();
            if Some(n.as_str()) == clock_name {
                infos.clock = Some(d);
                clock_pos = true;
            } else if Some(n.as_str()) == reset_name {
                infos.reset = Some(d);
                reset_pos = true;
            } else {
                asynch_pos += 1;
                asynch_pos_name = Some(n);
            }
        }
        for &d in &infos.falling_sensitivity {
            let n = self.tree.name(d).unwrap_or_default();
            if Some(n.as_str()) == clock_name {
                infos.clock = Some(d);
                clock_neg = true;
            } else if Some(n.as_str()) == reset_name {
                infos.reset = Some(d);
                reset_neg = true;
            } else {
                asynch_neg += 1;
                asynch_neg_name = Some(n);
            }
        }

        match (clock_pos, clock_neg) {
            (true, true) => {
                infos.process_kind = ProcessKind::Synchronous;
                infos.working_edge = WorkingEdge::Both;
            }
            (true, false) => {
                infos.process_kind = ProcessKind::Synchronous;
                infos.working_edge = WorkingEdge::Rising;
            }
            (false, true) => {
                infos.process_kind = ProcessKind::Synchronous;
                infos.working_edge = WorkingEdge::Falling;
            }
            (false, false) => {}
        }
        match (reset_pos, reset_neg) {
            (true, true) => {
                infos.reset_kind = ResetKind::AsynchronousReset;
                infos.reset_phase = ResetPhase::NoPhase;
            }
            (true, false) => {
                infos.reset_kind = ResetKind::AsynchronousReset;
                infos.reset_phase = ResetPhase::High;
            }
            (false, true) => {
                infos.reset_kind = ResetKind::AsynchronousReset;
                infos.reset_phase = ResetPhase::Low;
            }
            (false, false) => {}
        }

        if asynch == 0 && asynch_pos == 0 && asynch_neg == 0 {
            return;
        }
        let same = |a: &Option<crate::ir::Name>, b: &Option<crate::ir::Name>| match (a, b) {
            (Some(x), Some(y)) => x == y,
            _ => true,
        };
        let same_name = same(&asynch_name, &asynch_pos_name)
            && same(&asynch_name, &asynch_neg_name)
            && same(&asynch_pos_name, &asynch_neg_name);
        let one_per_kind = asynch <= 1 && asynch_pos <= 1 && asynch_neg <= 1;
        let just_one_asynch = one_per_kind && same_name;

        if infos.process_kind == ProcessKind::Synchronous {
            if infos.reset_kind == ResetKind::NoReset && just_one_asynch {
                // A single unknown companion signal reads as a secondary
                // (asynchronous) reset.
                infos.reset_kind = ResetKind::AsynchronousReset;
                infos.reset_phase = if asynch == 0 && asynch_pos != 0 && asynch_neg == 0 {
                    ResetPhase::High
                } else if asynch == 0 && asynch_pos == 0 && asynch_neg != 0 {
                    ResetPhase::Low
                } else {
                    ResetPhase::NoPhase
                };
                infos.reset = infos.other_sensitivity_entry(infos.clock);
            } else {
                infos.process_kind = ProcessKind::Mixed;
            }
        } else if infos.reset_kind != ResetKind::NoReset && just_one_asynch {
            // Derived clock.
            infos.process_kind = ProcessKind::DerivedSynchronous;
            infos.working_edge = if asynch == 0 && asynch_pos != 0 && asynch_neg == 0 {
                WorkingEdge::Rising
            } else if asynch == 0 && asynch_pos == 0 && asynch_neg != 0 {
                WorkingEdge::Falling
            } else {
                WorkingEdge::Both
            };
            infos.clock = infos.other_sensitivity_entry(infos.reset);
        } else {
            infos.process_kind = ProcessKind::Asynchronous;
            infos.working_edge = WorkingEdge::NoEdge;
        }
    }

    // ------------------------------------------------------------------
    // Phase 2: body shape
    // ------------------------------------------------------------------

    fn classify_process_body(
        &mut self,
        infos: &mut ProcessInfos,
        proc: NodeId,
    ) -> Result<(), SemanticError> {
        let states: Vec<NodeId> = self.tree.list(proc, f::STATES).to_vec();
        if states.len() > 1 {
            return Err(SemanticError::structure("process with several states"));
        }
        let Some(&state) = states.first() else { return Ok(()) };
        if self.tree.list(state, f::ACTIONS).is_empty() {
            return Ok(());
        }

        if self.style1(infos, state)
            || self.style2(infos, state)
            || self.style3(infos, state)
            || self.style4(infos, state)
            || self.style5(infos, state)
            || self.style6(infos, state)
        {
            return Ok(());
        }

        if !matches!(infos.process_kind, ProcessKind::Asynchronous | ProcessKind::Mixed) {
            if self.opts.print_warnings {
                warn!(
                    process = %self.tree.name(proc).unwrap_or_default(),
                    "process body matches no known style; keeping sensitivity classification"
                );
            }
        }
        Ok(())
    }

    fn merge_infos(
        &self,
        from_sensitivity: &ProcessInfos,
        from_body: &ProcessInfos,
    ) -> Option<ProcessInfos> {
        let mut out = from_sensitivity.clone();
        self.merge_process_kind(&mut out, from_sensitivity, from_body)?;
        merge_reset_kind(&mut out, from_sensitivity, from_body)?;
        merge_edge(&mut out, from_sensitivity, from_body)?;
        merge_phase(&mut out, from_sensitivity, from_body)?;
        merge_style(&mut out, from_sensitivity, from_body)?;
        merge_signals(&mut out, from_sensitivity, from_body)?;
        Some(out)
    }

    fn merge_process_kind(
        &self,
        out: &mut ProcessInfos,
        s: &ProcessInfos,
        b: &ProcessInfos,
    ) -> Option<()> {
        match b.process_kind {
            ProcessKind::Synchronous => {
                if !matches!(s.process_kind, ProcessKind::Synchronous | ProcessKind::Mixed) {
                    return None;
                }
                out.process_kind = s.process_kind;
            }
            ProcessKind::Asynchronous => {
                if s.process_kind != ProcessKind::Asynchronous {
                    return None;
                }
                out.process_kind = ProcessKind::Asynchronous;
            }
            ProcessKind::DerivedSynchronous => {
                if !matches!(
                    s.process_kind,
                    ProcessKind::Asynchronous | ProcessKind::DerivedSynchronous
                ) {
                    return None;
                }
                let size = out.sensitivity_size();
                if size == 0 {
                    return None;
                }
                out.process_kind = if size <= 2 {
                    ProcessKind::DerivedSynchronous
                } else {
                    ProcessKind::DerivedMixed
                };
            }
            ProcessKind::Mixed | ProcessKind::DerivedMixed => return None,
        }
        Some(())
    }

    // ------------------------------------------------------------------
    // Style matchers
    // ------------------------------------------------------------------

    /// `if ... else if ...` (or `if ... else { if ... }`): the reset and
    /// clock alternatives of a Style-1 process.
    fn if_else_if(&self, state: NodeId) -> Option<(NodeId, NodeId)> {
        let actions = self.tree.list(state, f::ACTIONS);
        if actions.len() != 1 {
            return None;
        }
        let if_stm = actions[0];
        if self.tree.kind(if_stm) != NodeKind::If {
            return None;
        }
        let alts = self.tree.list(if_stm, f::ALTS);
        match alts.len() {
            2 => Some((alts[0], alts[1])),
            1 => {
                let defaults = self.tree.list(if_stm, f::DEFAULTS);
                if defaults.len() != 1 {
                    return None;
                }
                let inner = defaults[0];
                if self.tree.kind(inner) != NodeKind::If {
                    return None;
                }
                let inner_alts = self.tree.list(inner, f::ALTS);
                if inner_alts.len() != 1 || !self.tree.list(inner, f::DEFAULTS).is_empty() {
                    return None;
                }
                Some((alts[0], inner_alts[0]))
            }
            _ => None,
        }
    }

    /// A clocked if with an optional inner reset if.
    fn if_opt_if_else(&self, state: NodeId) -> Option<(Option<NodeId>, NodeId)> {
        let actions = self.tree.list(state, f::ACTIONS);
        if actions.len() != 1 {
            return None;
        }
        let if_stm = actions[0];
        if self.tree.kind(if_stm) != NodeKind::If {
            return None;
        }
        let alts = self.tree.list(if_stm, f::ALTS);
        if alts.len() != 1 || !self.tree.list(if_stm, f::DEFAULTS).is_empty() {
            return None;
        }
        let clock_alt = alts[0];
        let mut reset_alt = None;
        let inner_actions = self.tree.list(clock_alt, f::ACTIONS);
        if inner_actions.len() == 1 && self.tree.kind(inner_actions[0]) == NodeKind::If {
            let inner = inner_actions[0];
            let inner_alts = self.tree.list(inner, f::ALTS);
            if inner_alts.len() == 1 && !self.tree.list(inner, f::DEFAULTS).is_empty() {
                reset_alt = Some(inner_alts[0]);
            }
        }
        Some((reset_alt, clock_alt))
    }

    /// `x`, `!x`, `x == 0/1`, `x === 0/1`: the declaration plus whether
    /// the compared phase is zero.
    fn equals_zero_or_one(&mut self, cond: NodeId) -> Option<(NodeId, bool)> {
        let v = skip_casts(self.tree, cond);
        if self.tree.kind(v) == NodeKind::Identifier {
            let d = declaration_of(self.tree, v, self.sem, &mut self.ctx)?;
            return Some((d, false));
        }
        if self.tree.kind(v) != NodeKind::Expression {
            return None;
        }
        let op = self.tree.operator(v);
        if !matches!(op, Operator::Eq | Operator::CaseEq | Operator::Not) {
            return None;
        }
        let v1 = skip_casts(self.tree, self.tree.slot(v, f::VALUE1)?);
        if self.tree.kind(v1) != NodeKind::Identifier {
            return None;
        }
        if op == Operator::Not {
            let d = declaration_of(self.tree, v1, self.sem, &mut self.ctx)?;
            return Some((d, true));
        }
        let v2 = skip_casts(self.tree, self.tree.slot(v, f::VALUE2)?);
        let cv = constant_as_int(self.tree, v2)?;
        if cv != 0 && cv != 1 {
            return None;
        }
        let d = declaration_of(self.tree, v1, self.sem, &mut self.ctx)?;
        Some((d, cv == 0))
    }

    /// `rising_edge(x)` / `falling_edge(x)` standard calls.
    fn rising_falling_edge(&mut self, cond: NodeId) -> Option<(NodeId, bool)> {
        if self.tree.kind(cond) != NodeKind::FunctionCall {
            return None;
        }
        let falling = match self.tree.name(cond)?.as_str() {
            "hif_vhdl_rising_edge" => false,
            "hif_vhdl_falling_edge" => true,
            _ => return None,
        };
        let assigns = self.tree.list(cond, f::PARAMETERASSIGNS);
        if assigns.len() != 1 {
            return None;
        }
        let value = self.tree.slot(assigns[0], f::VALUE)?;
        let id = skip_casts(self.tree, value);
        if self.tree.kind(id) != NodeKind::Identifier {
            return None;
        }
        let d = declaration_of(self.tree, id, self.sem, &mut self.ctx)?;
        Some((d, falling))
    }

    fn check_reset_condition(&mut self, infos: &mut ProcessInfos, cond: NodeId) -> bool {
        let Some((decl, is_zero)) = self.equals_zero_or_one(cond) else {
            return false;
        };
        infos.reset_phase = if is_zero { ResetPhase::Low } else { ResetPhase::High };
        infos.reset = Some(decl);
        infos.reset_kind = if infos.is_in_sensitivity(decl)
            || infos.process_kind == ProcessKind::Asynchronous
        {
            ResetKind::AsynchronousReset
        } else {
            ResetKind::SynchronousReset
        };
        true
    }

    fn check_clock_condition(&mut self, infos: &mut ProcessInfos, cond: NodeId) -> bool {
        let mut found = None;
        let v = skip_casts(self.tree, cond);
        if self.tree.kind(v) == NodeKind::Expression {
            if self.tree.operator(v) != Operator::And {
                return false;
            }
            // clock'event && clock == 0/1
            let Some(v1) = self.tree.slot(v, f::VALUE1) else { return false };
            if self.tree.kind(v1) != NodeKind::FunctionCall
                || self.tree.name(v1).as_deref() != Some("hif_vhdl_event")
            {
                return false;
            }
            let Some(inst) = self.tree.slot(v1, f::INSTANCE) else { return false };
            if self.tree.kind(inst) != NodeKind::Identifier {
                return false;
            }
            let Some(event_decl) =
                declaration_of(self.tree, inst, self.sem, &mut self.ctx)
            else {
                return false;
            };
            let Some(v2) = self.tree.slot(v, f::VALUE2) else { return false };
            let Some((decl, is_zero)) = self.equals_zero_or_one(v2) else {
                return false;
            };
            if event_decl != decl {
                return false;
            }
            found = Some((decl, is_zero));
        } else if self.tree.kind(cond) == NodeKind::FunctionCall {
            found = self.rising_falling_edge(cond);
        }
        let Some((decl, is_zero)) = found else { return false };
        if !infos.is_in_sensitivity(decl) {
            return false;
        }
        let is_main_clock =
            self.opts.clock.as_deref() == self.tree.name(decl).as_deref();
        infos.process_kind = if is_main_clock {
            ProcessKind::Synchronous
        } else {
            ProcessKind::DerivedSynchronous
        };
        infos.working_edge = if is_zero { WorkingEdge::Falling } else { WorkingEdge::Rising };
        infos.clock = Some(decl);
        true
    }

    fn style1(&mut self, infos: &mut ProcessInfos, state: NodeId) -> bool {
        let Some((reset_alt, clock_alt)) = self.if_else_if(state) else {
            return false;
        };
        let mut tmp = infos.clone();
        let Some(clock_cond) = self.tree.slot(clock_alt, f::CONDITION) else {
            return false;
        };
        if !self.check_clock_condition(&mut tmp, clock_cond) {
            return false;
        }
        let Some(reset_cond) = self.tree.slot(reset_alt, f::CONDITION) else {
            return false;
        };
        if !self.check_reset_condition(&mut tmp, reset_cond) {
            return false;
        }
        tmp.process_style = ProcessStyle::Style1;
        match self.merge_infos(infos, &tmp) {
            Some(res) => *infos = res,
            None if self.opts.print_warnings => {
                warn!("unable to classify the process consistently (style 1)");
            }
            None => {}
        }
        true
    }

    fn style2(&mut self, infos: &mut ProcessInfos, state: NodeId) -> bool {
        let Some((reset_alt, clock_alt)) = self.if_opt_if_else(state) else {
            return false;
        };
        let mut tmp = infos.clone();
        let Some(clock_cond) = self.tree.slot(clock_alt, f::CONDITION) else {
            return false;
        };
        if !self.check_clock_condition(&mut tmp, clock_cond) {
            return false;
        }
        if let Some(reset_alt) = reset_alt {
            // An inner if that is not on a reset is a plain branch.
            match self.tree.slot(reset_alt, f::CONDITION) {
                Some(c) if self.check_reset_condition(&mut tmp, c) => {
                    tmp.reset_kind = ResetKind::SynchronousReset;
                }
                _ => tmp.reset_kind = ResetKind::NoReset,
            }
        }
        tmp.process_style = ProcessStyle::Style2;
        match self.merge_infos(infos, &tmp) {
            Some(res) => *infos = res,
            None if self.opts.print_warnings => {
                warn!("unable to classify the process consistently (style 2)");
            }
            None => {}
        }
        true
    }

    fn style3(&mut self, infos: &mut ProcessInfos, state: NodeId) -> bool {
        let actions = self.tree.list(state, f::ACTIONS);
        if actions.len() != 1 || self.tree.kind(actions[0]) != NodeKind::Switch {
            return false;
        }
        // A clocked state machine: exactly one edge-sensitive entry.
        if infos.sensitivity_size() != 1 {
            return false;
        }
        let rising = infos.rising_sensitivity.len() == 1;
        let falling = infos.falling_sensitivity.len() == 1;
        if rising == falling {
            return false;
        }
        let mut tmp = infos.clone();
        let clock = if rising {
            tmp.working_edge = WorkingEdge::Rising;
            *infos.rising_sensitivity.first().unwrap()
        } else {
            tmp.working_edge = WorkingEdge::Falling;
            *infos.falling_sensitivity.first().unwrap()
        };
        tmp.clock = Some(clock);
        tmp.process_kind = if self.opts.clock.as_deref() == self.tree.name(clock).as_deref() {
            ProcessKind::Synchronous
        } else {
            ProcessKind::DerivedSynchronous
        };
        tmp.process_style = ProcessStyle::Style3;
        match self.merge_infos(infos, &tmp) {
            Some(res) => *infos = res,
            None if self.opts.print_warnings => {
                warn!("unable to classify the process consistently (style 3)");
            }
            None => {}
        }
        true
    }

    /// A sequence of Style-1 or Style-2 blocks.
    fn style4(&mut self, infos: &mut ProcessInfos, state: NodeId) -> bool {
        let actions: Vec<NodeId> = self.tree.list(state, f::ACTIONS).to_vec();
        if actions.len() < 2 {
            return false;
        }
        // The process containing the state: scratch states are attached
        // next to the real one so their symbols keep resolving.
        let Some(proc) = self.tree.parent(state) else { return false };
        let mut is1 = false;
        let mut is2 = false;
        let mut infos1 = infos.clone();
        let mut infos2 = infos.clone();
        for a in actions {
            let scratch = self.tree.add(NodeKind::State);
            let copy = self.tree.copy(a);
            self.tree.list_push(scratch, f::ACTIONS, copy);
            self.tree.list_push(proc, f::STATES, scratch);
            is1 |= self.style1(&mut infos1, scratch);
            is2 |= self.style2(&mut infos2, scratch);
            self.tree.list_remove(proc, f::STATES, scratch);
            self.tree.delete(scratch);
        }
        if !is1 && !is2 {
            return false;
        }
        *infos = if is1 { infos1 } else { infos2 };
        infos.process_style = ProcessStyle::Style4;
        true
    }

    /// A bare clocked body (single assignments, no inner if).
    fn style5(&mut self, infos: &mut ProcessInfos, state: NodeId) -> bool {
        let Some(clock) = infos.clock else { return false };
        if infos.process_kind != ProcessKind::Synchronous {
            return false;
        }
        if infos.inputs.contains(&clock) {
            return false;
        }
        let actions = self.tree.list(state, f::ACTIONS);
        if actions.len() == 1 && self.tree.kind(actions[0]) == NodeKind::If {
            return false;
        }
        infos.process_style = ProcessStyle::Style5;
        true
    }

    /// `if (reset) ... else ...` inside a clocked process.
    fn style6(&mut self, infos: &mut ProcessInfos, state: NodeId) -> bool {
        if !matches!(
            infos.process_kind,
            ProcessKind::Synchronous | ProcessKind::Asynchronous
        ) {
            return false;
        }
        let actions = self.tree.list(state, f::ACTIONS);
        if actions.len() != 1 || self.tree.kind(actions[0]) != NodeKind::If {
            return false;
        }
        let if_stm = actions[0];
        let alts: Vec<NodeId> = self.tree.list(if_stm, f::ALTS).to_vec();
        if alts.len() != 1 {
            return false;
        }
        let mut tmp = infos.clone();
        let Some(cond) = self.tree.slot(alts[0], f::CONDITION) else { return false };
        if !self.check_reset_condition(&mut tmp, cond) {
            return false;
        }
        let has_main_clock = tmp.clock.is_some();
        if tmp.clock.is_none() {
            tmp.clock = tmp.other_sensitivity_entry(tmp.reset);
        }
        let Some(clock) = tmp.clock else { return false };
        if tmp.rising_sensitivity.contains(&clock) {
            tmp.process_kind = if has_main_clock {
                ProcessKind::Synchronous
            } else {
                ProcessKind::DerivedSynchronous
            };
            tmp.working_edge = WorkingEdge::Rising;
        } else if tmp.falling_sensitivity.contains(&clock) {
            tmp.process_kind = if has_main_clock {
                ProcessKind::Synchronous
            } else {
                ProcessKind::DerivedSynchronous
            };
            tmp.working_edge = WorkingEdge::Falling;
        } else {
            return false;
        }
        tmp.process_style = ProcessStyle::Style6;
        match self.merge_infos(infos, &tmp) {
            Some(res) => *infos = res,
            None if self.opts.print_warnings => {
                warn!("unable to classify the process consistently (style 6)");
            }
            None => {}
        }
        true
    }
}

// ----------------------------------------------------------------------
// Merge predicates (free functions: they consult only the infos)
// ----------------------------------------------------------------------

fn merge_reset_kind(out: &mut ProcessInfos, s: &ProcessInfos, b: &ProcessInfos) -> Option<()> {
    match b.reset_kind {
        ResetKind::NoReset => {
            if s.reset_kind != ResetKind::NoReset {
                return None;
            }
            out.reset_kind = ResetKind::NoReset;
        }
        ResetKind::SynchronousReset => {
            if s.reset_kind != ResetKind::NoReset {
                return None;
            }
            out.reset_kind = ResetKind::SynchronousReset;
        }
        ResetKind::AsynchronousReset => {
            if s.reset_kind == ResetKind::NoReset {
                // A derived reset: decide from the sensitivity size.
                if out.process_kind == ProcessKind::Asynchronous {
                    return None;
                }
                let size = out.sensitivity_size();
                if size == 0 {
                    return None;
                }
                out.reset_kind = if size == 1 {
                    if matches!(
                        out.process_kind,
                        ProcessKind::Synchronous | ProcessKind::Mixed
                    ) {
                        ResetKind::SynchronousReset
                    } else {
                        ResetKind::DerivedSynchronousReset
                    }
                } else {
                    ResetKind::AsynchronousReset
                };
            } else {
                out.reset_kind = ResetKind::AsynchronousReset;
            }
        }
        ResetKind::DerivedSynchronousReset => {
            if s.reset_kind != ResetKind::NoReset {
                return None;
            }
            out.reset_kind = ResetKind::DerivedSynchronousReset;
        }
    }
    Some(())
}

fn merge_edge(out: &mut ProcessInfos, s: &ProcessInfos, b: &ProcessInfos) -> Option<()> {
    match b.working_edge {
        WorkingEdge::NoEdge => {
            if s.working_edge != WorkingEdge::NoEdge {
                return None;
            }
            out.working_edge = WorkingEdge::NoEdge;
        }
        WorkingEdge::Rising => {
            let derivable = matches!(
                out.process_kind,
                ProcessKind::DerivedSynchronous | ProcessKind::DerivedMixed
            );
            if (s.working_edge == WorkingEdge::NoEdge && !derivable)
                || s.working_edge == WorkingEdge::Falling
            {
                return None;
            }
            out.working_edge = WorkingEdge::Rising;
        }
        WorkingEdge::Falling => {
            let derivable = out.process_kind == ProcessKind::DerivedSynchronous;
            if (s.working_edge == WorkingEdge::NoEdge && !derivable)
                || s.working_edge == WorkingEdge::Rising
            {
                return None;
            }
            out.working_edge = WorkingEdge::Falling;
        }
        WorkingEdge::Both => {
            let derivable = out.process_kind == ProcessKind::DerivedSynchronous;
            if s.working_edge == WorkingEdge::NoEdge && !derivable {
                return None;
            }
            out.working_edge = s.working_edge;
        }
    }
    Some(())
}

fn merge_phase(out: &mut ProcessInfos, s: &ProcessInfos, b: &ProcessInfos) -> Option<()> {
    match b.reset_phase {
        ResetPhase::NoPhase => {
            if s.reset_kind != ResetKind::NoReset {
                return None;
            }
            out.reset_phase = s.reset_phase;
        }
        ResetPhase::High => {
            if s.reset_phase == ResetPhase::Low {
                return None;
            }
            out.reset_phase = ResetPhase::High;
        }
        ResetPhase::Low => {
            if s.reset_phase == ResetPhase::High {
                return None;
            }
            out.reset_phase = ResetPhase::Low;
        }
    }
    Some(())
}

fn merge_style(out: &mut ProcessInfos, s: &ProcessInfos, b: &ProcessInfos) -> Option<()> {
    out.process_style = match (s.process_style, b.process_style) {
        (ProcessStyle::NoStyle, st) | (st, ProcessStyle::NoStyle) => st,
        (a, b) if a == b => a,
        _ => return None,
    };
    Some(())
}

fn merge_signals(out: &mut ProcessInfos, s: &ProcessInfos, b: &ProcessInfos) -> Option<()> {
    let clock_ok = s.clock.is_none() || b.clock.is_none() || s.clock == b.clock;
    let reset_ok = s.reset.is_none() || b.reset.is_none() || s.reset == b.reset;
    if !clock_ok || !reset_ok {
        return None;
    }
    out.clock = b.clock.or(s.clock);
    out.reset = b.reset.or(s.reset);
    Some(())
}

//! Cascade scheduler.
//!
//! One `Cascade` lives for one top-level engine operation (`set_value`,
//! `init`, `check_submit`). It owns the temp-variable scope and the pending
//! queues, and borrows everything else from the engine.
//!
//! Scheduling model:
//!
//! - Every queued field carries a rank. The changed field gets the first
//!   rank, then everything reachable from it over ordering edges (readers
//!   and written fields) in topological order; fields reached later get
//!   fresh ranks at the end.
//! - A pass runs pending fields in rank order, each at most once.
//! - A field dirtied after it already ran in the current pass is queued for
//!   the next pass. That is its one extra evaluation: a field that would
//!   need a third is skipped and a cycle warning is recorded.
//! - Running out of passes (`max_passes`) stops propagation with
//!   `CascadeOverflow`; state is left as the last completed pass wrote it.
//!
//! - `actions.rs`: instruction execution and the evaluation context
//! - `rules.rs`: per-field rule evaluation

mod actions;
mod rules;

use std::collections::BTreeSet;

use form_eval::MethodRegistry;
use form_ir::FieldAttr;
use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::Value;

use crate::config::EngineConfig;
use crate::graph::DependencyGraph;
use crate::logger::EngineLogger;
use crate::program::Program;
use crate::store::FieldStore;
use crate::{FormError, FormResult};

/// Evaluations allowed per field per cascade: the first plus one extra.
const MAX_EVALUATIONS: u8 = 2;

/// What one cascade did.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    /// Fields whose state changed, in declaration order.
    pub updated: Vec<String>,
    /// Passes run.
    pub passes: usize,
    /// Cycle and scheduling warnings, in the order they arose.
    pub warnings: Vec<String>,
}

pub(crate) struct Cascade<'e> {
    store: &'e mut FieldStore,
    program: &'e Program,
    graph: &'e DependencyGraph,
    methods: &'e MethodRegistry,
    logger: &'e EngineLogger,
    sep: &'e str,
    max_passes: usize,

    temps: FxHashMap<String, Value>,
    /// Field whose rules are running; its own writes do not re-queue it.
    current: Option<usize>,

    rank: Vec<Option<usize>>,
    next_rank: usize,
    pending: BTreeSet<(usize, usize)>,
    next_pass: BTreeSet<(usize, usize)>,
    ran: Vec<bool>,
    evaluations: Vec<u8>,
    updated: Vec<bool>,
    warned: Vec<bool>,
    passes: usize,
    warnings: Vec<String>,
}

impl<'e> Cascade<'e> {
    pub(crate) fn new(
        store: &'e mut FieldStore,
        program: &'e Program,
        graph: &'e DependencyGraph,
        methods: &'e MethodRegistry,
        logger: &'e EngineLogger,
        config: &'e EngineConfig,
    ) -> Self {
        let len = store.len();
        Cascade {
            store,
            program,
            graph,
            methods,
            logger,
            sep: &config.key_separator,
            max_passes: config.max_passes,
            temps: FxHashMap::default(),
            current: None,
            rank: vec![None; len],
            next_rank: 0,
            pending: BTreeSet::new(),
            next_pass: BTreeSet::new(),
            ran: vec![false; len],
            evaluations: vec![0; len],
            updated: vec![false; len],
            warned: vec![false; len],
            passes: 0,
            warnings: Vec::new(),
        }
    }

    /// Write a new value from outside any rule.
    pub(crate) fn assign(&mut self, idx: usize, value: Value) -> FormResult<()> {
        if self.store.field_mut(idx).write_attr(FieldAttr::Value, value)? {
            self.updated[idx] = true;
        }
        Ok(())
    }

    /// Queue `root` and then everything it may affect, in dependency order.
    pub(crate) fn seed(&mut self, root: usize) {
        self.schedule(root);
        let closure = self.graph.closure(root);
        let topo = self.graph.topo_order(&closure);
        for idx in topo.cycle_breaks {
            let message = format!(
                "dependency cycle through `{}`; breaking it in declaration order",
                self.store.key(idx)
            );
            self.warn(message);
        }
        for idx in topo.order {
            self.schedule(idx);
        }
    }

    /// Run passes until nothing is pending.
    pub(crate) fn run(&mut self) -> FormResult<()> {
        while !self.pending.is_empty() {
            if self.passes >= self.max_passes {
                return Err(self.overflow());
            }
            self.passes += 1;
            self.ran.fill(false);
            tracing::trace!(pass = self.passes, pending = self.pending.len(), "cascade pass");

            while let Some((_, idx)) = self.pending.pop_first() {
                self.run_field(idx);
            }
            std::mem::swap(&mut self.pending, &mut self.next_pass);
        }
        Ok(())
    }

    pub(crate) fn finish(self) -> CascadeReport {
        let updated = self
            .updated
            .iter()
            .enumerate()
            .filter(|&(_, &changed)| changed)
            .map(|(idx, _)| self.store.key(idx).to_string())
            .collect();
        CascadeReport {
            updated,
            passes: self.passes,
            warnings: self.warnings,
        }
    }

    /// Record a state change on `idx` and queue whatever it may affect.
    fn mark_changed(&mut self, idx: usize, exclude: Option<usize>) {
        self.updated[idx] = true;
        if exclude != Some(idx) {
            self.schedule(idx);
        }
        let graph = self.graph;
        for &dep in graph.dependents(idx) {
            if exclude != Some(dep) {
                self.schedule(dep);
            }
        }
    }

    fn schedule(&mut self, idx: usize) {
        if self.evaluations[idx] >= MAX_EVALUATIONS {
            self.cycle_warning(idx);
            return;
        }
        let entry = (self.rank_of(idx), idx);
        if self.ran[idx] {
            self.next_pass.insert(entry);
        } else {
            self.pending.insert(entry);
        }
    }

    fn rank_of(&mut self, idx: usize) -> usize {
        if let Some(rank) = self.rank[idx] {
            return rank;
        }
        let rank = self.next_rank;
        self.next_rank += 1;
        self.rank[idx] = Some(rank);
        rank
    }

    fn cycle_warning(&mut self, idx: usize) {
        if std::mem::replace(&mut self.warned[idx], true) {
            return;
        }
        let message = format!(
            "cycle detected at `{}`: re-evaluation limit reached, later changes not propagated",
            self.store.key(idx)
        );
        self.warn(message);
    }

    fn warn(&mut self, message: String) {
        self.logger.warn(&message);
        self.warnings.push(message);
    }

    fn overflow(&self) -> FormError {
        let pending: Vec<String> = self
            .pending
            .iter()
            .map(|&(_, idx)| self.store.key(idx).to_string())
            .collect();
        self.logger.error(&format!(
            "cascade stopped after {} passes; still pending: {}",
            self.max_passes,
            pending.join(", ")
        ));
        FormError::CascadeOverflow {
            max_passes: self.max_passes,
            pending,
        }
    }
}

#[cfg(test)]
mod tests;

//! Field dependency graph.
//!
//! A dependent edge `a -> b` means "a change to `a` may change what `b`'s
//! rules do". Dependent edges are the union of declared `dependencies` and
//! every field path found by scanning `b`'s conditions and actions.
//!
//! Ordering edges add `w -> t` for every field `t` that `w`'s rules write,
//! so a written field and its readers are ordered after the writer. They
//! decide the seed closure and topological order but never queue anything.
//!
//! Nodes are declaration indices, so every ordering decision falls back to
//! declaration order.

use std::collections::BTreeSet;

use form_eval::match_field;

use crate::program::Program;
use crate::store::FieldStore;

#[derive(Clone, Debug, Default)]
pub(crate) struct DependencyGraph {
    /// `dependents[a]`: fields whose rules read `a`, ascending.
    dependents: Vec<Vec<usize>>,
    /// `successors[a]`: `dependents[a]` plus the fields `a` writes, ascending.
    successors: Vec<Vec<usize>>,
}

/// Result of ordering a set of fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct TopoOrder {
    pub order: Vec<usize>,
    /// Fields picked while no node was ready, one per broken cycle.
    pub cycle_breaks: Vec<usize>,
}

impl DependencyGraph {
    pub(crate) fn build(store: &FieldStore, program: &Program, sep: &str) -> Self {
        let mut edges: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); store.len()];

        for (idx, field) in store.iter().enumerate() {
            for dep in &field.dependencies {
                if let Some(source) = store.index_of(dep) {
                    edges[source].insert(idx);
                }
            }

            for path in &program.reads[idx].paths {
                let found = match_field(path.segments(), sep, |key| store.contains(key));
                if let Some(source) = found.and_then(|found| store.index_of(&found.key)) {
                    edges[source].insert(idx);
                }
            }
        }

        // A field's own rules always run first when it changes.
        for (idx, set) in edges.iter_mut().enumerate() {
            set.remove(&idx);
        }

        let successors: Vec<Vec<usize>> = edges
            .iter()
            .zip(&program.writes)
            .map(|(reads, writes)| {
                let mut set = reads.clone();
                set.extend(writes.iter().copied());
                set.into_iter().collect::<Vec<_>>()
            })
            .collect();

        DependencyGraph {
            dependents: edges
                .into_iter()
                .map(|set| set.into_iter().collect())
                .collect(),
            successors,
        }
    }

    pub(crate) fn dependents(&self, idx: usize) -> &[usize] {
        self.dependents.get(idx).map_or(&[], Vec::as_slice)
    }

    fn successors(&self, idx: usize) -> &[usize] {
        self.successors.get(idx).map_or(&[], Vec::as_slice)
    }

    /// Every field reachable from `root` over ordering edges, excluding
    /// `root`, ascending.
    pub(crate) fn closure(&self, root: usize) -> Vec<usize> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            for &dep in self.successors(idx) {
                if dep != root && seen.insert(dep) {
                    stack.push(dep);
                }
            }
        }
        seen.into_iter().collect()
    }

    /// Kahn's algorithm over ordering edges restricted to `nodes`, ready
    /// ties taken in declaration order.
    ///
    /// When every remaining node has an unprocessed predecessor the set
    /// contains a cycle; the lowest remaining index is released and
    /// recorded in `cycle_breaks`.
    pub(crate) fn topo_order(&self, nodes: &[usize]) -> TopoOrder {
        let members: BTreeSet<usize> = nodes.iter().copied().collect();
        let mut in_degree: Vec<usize> = vec![0; self.successors.len()];
        for &node in &members {
            for &dep in self.successors(node) {
                if members.contains(&dep) {
                    in_degree[dep] += 1;
                }
            }
        }

        let mut remaining = members.clone();
        let mut ready: BTreeSet<usize> = members
            .iter()
            .copied()
            .filter(|&node| in_degree[node] == 0)
            .collect();
        let mut result = TopoOrder::default();

        while !remaining.is_empty() {
            let next = match ready.pop_first() {
                Some(node) => node,
                None => {
                    let Some(&forced) = remaining.first() else {
                        break;
                    };
                    result.cycle_breaks.push(forced);
                    forced
                }
            };
            remaining.remove(&next);
            result.order.push(next);

            for &dep in self.successors(next) {
                if !remaining.contains(&dep) {
                    continue;
                }
                in_degree[dep] = in_degree[dep].saturating_sub(1);
                if in_degree[dep] == 0 {
                    ready.insert(dep);
                }
            }
        }

        result
    }
}

//! Coverage and defect analysis
//!
//! Shallow coverage and defects are local to a node. Deep coverage is
//! transitive along `Covers` links:
//!
//! ```text
//! deep(n) = shallow(n) && deep(t) for every t in links_by_status(n, Covers)
//! ```
//!
//! On a graph with cycles this is evaluated as the greatest fixed point, so a
//! node is deeply covered exactly when no node reachable from it through
//! `Covers` links (itself included) lacks shallow coverage. Both evaluations
//! below track visited nodes explicitly and never recurse, so they terminate
//! on any graph in O(nodes + edges).

use crate::graph::LinkGraph;
use crate::link_status::LinkStatus;
use crate::linked_item::ItemIndex;
use std::collections::HashSet;
use tracing::debug;

/// Per-node verdicts for a fully linked graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageAnalysis {
    shallow: Vec<bool>,
    deep: Vec<bool>,
    defect: Vec<bool>,
}

impl CoverageAnalysis {
    /// Compute every verdict in one pass.
    ///
    /// Deep coverage starts from "deep iff shallow" and withdraws it from every
    /// node that can reach a node without shallow coverage, walking `Covers`
    /// links backwards.
    pub fn analyze(graph: &LinkGraph) -> Self {
        let len = graph.len();
        let shallow: Vec<bool> = graph.iter().map(|node| node.is_covered_shallow()).collect();
        let defect: Vec<bool> = graph.iter().map(|node| node.is_defect()).collect();

        let mut covered_by: Vec<Vec<ItemIndex>> = vec![Vec::new(); len];
        for source in graph.indices() {
            for target in graph[source].links_by_status(LinkStatus::Covers) {
                covered_by[target.0].push(source);
            }
        }

        let mut deep = shallow.clone();
        let mut pending: Vec<ItemIndex> = graph.indices().filter(|i| !deep[i.0]).collect();
        while let Some(uncovered) = pending.pop() {
            for source in &covered_by[uncovered.0] {
                if deep[source.0] {
                    deep[source.0] = false;
                    pending.push(*source);
                }
            }
        }

        let analysis = CoverageAnalysis {
            shallow,
            deep,
            defect,
        };
        debug!(
            items = len,
            shallow = analysis.shallow_covered_count(),
            deep = analysis.deeply_covered_count(),
            defects = analysis.defect_count(),
            "coverage analysis finished"
        );
        analysis
    }

    pub fn len(&self) -> usize {
        self.deep.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deep.is_empty()
    }

    pub fn is_covered_shallow(&self, index: ItemIndex) -> bool {
        self.shallow[index.0]
    }

    pub fn is_covered_deeply(&self, index: ItemIndex) -> bool {
        self.deep[index.0]
    }

    pub fn is_defect(&self, index: ItemIndex) -> bool {
        self.defect[index.0]
    }

    pub fn shallow_covered_count(&self) -> usize {
        self.shallow.iter().filter(|v| **v).count()
    }

    pub fn deeply_covered_count(&self) -> usize {
        self.deep.iter().filter(|v| **v).count()
    }

    pub fn defect_count(&self) -> usize {
        self.defect.iter().filter(|v| **v).count()
    }
}

/// Deep coverage of one node, visiting only what it can reach.
pub fn deep_coverage_of(graph: &LinkGraph, index: ItemIndex) -> bool {
    let mut visited = HashSet::from([index]);
    let mut stack = vec![index];
    while let Some(current) = stack.pop() {
        let node = &graph[current];
        if !node.is_covered_shallow() {
            return false;
        }
        for target in node.links_by_status(LinkStatus::Covers) {
            if visited.insert(*target) {
                stack.push(*target);
            }
        }
    }
    true
}

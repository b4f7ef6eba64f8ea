//! Tracing: linking plus coverage analysis, and the resulting report

use crate::config::TraceConfig;
use crate::coverage::CoverageAnalysis;
use crate::graph::{LinkGraph, LinkedItemRef};
use crate::item::SpecificationItem;
use crate::item_id::{ArtifactType, ItemReference, SpecificationItemId};
use crate::link_status::LinkStatus;
use crate::linked_item::ItemIndex;
use crate::linker::Linker;
use std::collections::BTreeSet;
use tracing::info;

/// Runs complete analyses with one configuration.
#[derive(Debug, Clone, Default)]
pub struct Tracer {
    config: TraceConfig,
}

impl Tracer {
    pub fn new(config: TraceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Link `items` and analyze the resulting graph.
    pub fn trace(&self, items: Vec<SpecificationItem>) -> Trace {
        let graph = Linker::new(&self.config).link(items);
        let trace = Trace::from_graph(graph);
        info!(
            items = trace.count(),
            defects = trace.defect_count(),
            uncovered = trace.uncovered_count(),
            ok = trace.is_ok(),
            "trace finished"
        );
        trace
    }

    /// Trace independent item collections, each with its own graph.
    ///
    /// Runs in parallel with the `parallel` feature. Results keep the order of
    /// `batches`.
    pub fn trace_all(&self, batches: Vec<Vec<SpecificationItem>>) -> Vec<Trace> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            batches
                .into_par_iter()
                .map(|items| self.trace(items))
                .collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            batches.into_iter().map(|items| self.trace(items)).collect()
        }
    }
}

/// Outcome of one analysis run: the linked graph and every verdict.
#[derive(Debug, Clone)]
pub struct Trace {
    graph: LinkGraph,
    analysis: CoverageAnalysis,
}

impl Trace {
    /// Analyze an already linked graph.
    pub fn from_graph(graph: LinkGraph) -> Self {
        let analysis = CoverageAnalysis::analyze(&graph);
        Self { graph, analysis }
    }

    pub fn graph(&self) -> &LinkGraph {
        &self.graph
    }

    pub fn analysis(&self) -> &CoverageAnalysis {
        &self.analysis
    }

    pub fn item(&self, index: ItemIndex) -> TracedItem<'_> {
        TracedItem {
            node: self.graph.node(index),
            analysis: &self.analysis,
        }
    }

    /// Every item, in input order.
    pub fn items(&self) -> impl Iterator<Item = TracedItem<'_>> {
        self.graph.indices().map(|index| self.item(index))
    }

    /// Items with at least one defective link.
    pub fn defect_items(&self) -> impl Iterator<Item = TracedItem<'_>> {
        self.items().filter(|item| item.is_defect())
    }

    /// Items that are not deeply covered.
    pub fn uncovered_items(&self) -> impl Iterator<Item = TracedItem<'_>> {
        self.items().filter(|item| !item.is_covered_deeply())
    }

    /// IDs carried by more than one item, sorted.
    pub fn duplicate_ids(&self) -> Vec<&SpecificationItemId> {
        let mut ids: Vec<&SpecificationItemId> =
            self.graph.duplicates().map(|(id, _)| id).collect();
        ids.sort();
        ids
    }

    pub fn count(&self) -> usize {
        self.graph.len()
    }

    pub fn defect_count(&self) -> usize {
        self.analysis.defect_count()
    }

    pub fn uncovered_count(&self) -> usize {
        self.count() - self.analysis.deeply_covered_count()
    }

    /// No defects, and every item is deeply covered.
    pub fn is_ok(&self) -> bool {
        self.defect_count() == 0 && self.uncovered_count() == 0
    }

    /// Share of deeply covered items (0.0 - 100.0)
    pub fn coverage_percent(&self) -> f64 {
        if self.count() == 0 {
            return 100.0;
        }
        (self.analysis.deeply_covered_count() as f64 / self.count() as f64) * 100.0
    }
}

/// One item of a [`Trace`] with its verdicts.
#[derive(Debug, Clone, Copy)]
pub struct TracedItem<'t> {
    node: LinkedItemRef<'t>,
    analysis: &'t CoverageAnalysis,
}

impl<'t> TracedItem<'t> {
    pub fn index(&self) -> ItemIndex {
        self.node.index()
    }

    pub fn node(&self) -> LinkedItemRef<'t> {
        self.node
    }

    pub fn item(&self) -> &'t SpecificationItem {
        self.node.item()
    }

    pub fn id(&self) -> &'t SpecificationItemId {
        self.node.item().id()
    }

    pub fn is_covered_shallow(&self) -> bool {
        self.analysis.is_covered_shallow(self.index())
    }

    pub fn is_covered_deeply(&self) -> bool {
        self.analysis.is_covered_deeply(self.index())
    }

    pub fn is_defect(&self) -> bool {
        self.analysis.is_defect(self.index())
    }

    pub fn covered_artifact_types(&self) -> &'t BTreeSet<ArtifactType> {
        self.node.linked_item().covered_artifact_types()
    }

    pub fn uncovered_artifact_types(&self) -> BTreeSet<ArtifactType> {
        self.node.uncovered_artifact_types()
    }

    /// Every resolved link with the item at its other end.
    pub fn links(&self) -> impl Iterator<Item = (LinkStatus, &'t SpecificationItem)> + use<'t> {
        let graph = self.node.graph();
        self.node
            .linked_item()
            .links()
            .map(move |(status, target)| (status, graph[target].item()))
    }

    pub fn orphaned_references(&self) -> &'t [ItemReference] {
        self.node.linked_item().orphaned_references()
    }
}
